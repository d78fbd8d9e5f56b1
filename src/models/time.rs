//! Turn time conversion.
//!
//! # Time Model
//! Turns are integer minutes since midnight. The public surface may
//! render them as `HH:MM`; these helpers are pure and stateless.

use crate::error::TimeError;

/// Minutes in one day.
pub const MINUTES_PER_DAY: i64 = 24 * 60;

/// Parses `HH:MM` into minutes since midnight.
///
/// Accepts one- or two-digit components (`9:05` and `09:05` are equal).
///
/// # Errors
/// - [`TimeError::InvalidFormat`] unless the input is exactly two
///   colon-separated unsigned integers.
/// - [`TimeError::OutOfRange`] when hours ∉ [0, 24) or minutes ∉ [0, 60).
///
/// # Example
/// ```
/// use turnstile_dispatch::models::hhmm_to_minutes;
///
/// assert_eq!(hhmm_to_minutes("10:55"), Ok(655));
/// assert!(hhmm_to_minutes("10:5:1").is_err());
/// ```
pub fn hhmm_to_minutes(input: &str) -> Result<i64, TimeError> {
    let malformed = || TimeError::InvalidFormat(input.to_string());

    let mut parts = input.trim().split(':');
    let (Some(h), Some(m), None) = (parts.next(), parts.next(), parts.next()) else {
        return Err(malformed());
    };

    let hours = parse_component(h).ok_or_else(malformed)?;
    let minutes = parse_component(m).ok_or_else(malformed)?;

    if hours >= 24 || minutes >= 60 {
        return Err(TimeError::OutOfRange { hours, minutes });
    }
    Ok((hours * 60 + minutes) as i64)
}

/// Renders minutes since midnight as `HH:MM`.
///
/// Values outside one day wrap around (a turn pushed past midnight by
/// delays renders as the next morning).
pub fn minutes_to_hhmm(minutes: i64) -> String {
    let m = minutes.rem_euclid(MINUTES_PER_DAY);
    format!("{:02}:{:02}", m / 60, m % 60)
}

/// Digits only. Values too large for `u64` saturate so they still report
/// as out of range.
fn parse_component(s: &str) -> Option<u64> {
    if s.is_empty() || !s.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    Some(s.parse().unwrap_or(u64::MAX))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_valid() {
        assert_eq!(hhmm_to_minutes("00:00"), Ok(0));
        assert_eq!(hhmm_to_minutes("9:05"), Ok(545));
        assert_eq!(hhmm_to_minutes("23:59"), Ok(1439));
    }

    #[test]
    fn test_parse_malformed() {
        for bad in ["", "1055", "10:55:00", "ab:cd", "10:", ":30", "-1:30", "10:+5"] {
            assert_eq!(
                hhmm_to_minutes(bad),
                Err(TimeError::InvalidFormat(bad.to_string())),
                "input {bad:?}"
            );
        }
    }

    #[test]
    fn test_parse_out_of_range() {
        assert_eq!(
            hhmm_to_minutes("24:00"),
            Err(TimeError::OutOfRange {
                hours: 24,
                minutes: 0
            })
        );
        assert_eq!(
            hhmm_to_minutes("12:60"),
            Err(TimeError::OutOfRange {
                hours: 12,
                minutes: 60
            })
        );
    }

    #[test]
    fn test_parse_huge_components_out_of_range() {
        assert_eq!(
            hhmm_to_minutes("99999999999:30"),
            Err(TimeError::OutOfRange {
                hours: 99_999_999_999,
                minutes: 30
            })
        );
        assert_eq!(
            hhmm_to_minutes("10:99999999999999999999999"),
            Err(TimeError::OutOfRange {
                hours: 10,
                minutes: u64::MAX
            })
        );
    }

    #[test]
    fn test_render() {
        assert_eq!(minutes_to_hhmm(0), "00:00");
        assert_eq!(minutes_to_hhmm(655), "10:55");
        assert_eq!(minutes_to_hhmm(MINUTES_PER_DAY + 5), "00:05");
        assert_eq!(minutes_to_hhmm(-5), "23:55");
    }

    #[test]
    fn test_render_then_parse() {
        for m in [0, 1, 59, 60, 719, 1439] {
            assert_eq!(hhmm_to_minutes(&minutes_to_hhmm(m)), Ok(m));
        }
    }
}
