//! Pre-registration checks.
//!
//! Two independent gates, both pure:
//! - [`DocumentChecklist`]: does the client carry every required document?
//! - [`validate_pool`]: is a set of server definitions usable? Detects
//!   duplicate ids, servers with no procedure types, and procedure types
//!   no server covers.

use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};

use crate::models::{ProcedureType, Server};

/// Documents every client must present by default.
pub const DEFAULT_REQUIRED_DOCUMENTS: [&str; 4] = ["Acta de nacimiento", "RFC", "CURP", "INE"];

/// Fixed list of required documents.
///
/// # Example
/// ```
/// use std::collections::HashMap;
/// use turnstile_dispatch::validation::DocumentChecklist;
///
/// let checklist = DocumentChecklist::standard();
/// let answers = HashMap::from([("RFC", true), ("CURP", true), ("INE", true)]);
/// let outcome = checklist.evaluate(&answers);
/// assert!(!outcome.passed);
/// assert_eq!(outcome.missing, vec!["Acta de nacimiento"]);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentChecklist {
    required: Vec<String>,
}

/// Checklist verdict.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChecklistOutcome {
    /// Whether every required document was confirmed.
    pub passed: bool,
    /// Required documents not confirmed, in checklist order.
    pub missing: Vec<String>,
}

impl DocumentChecklist {
    /// Checklist with the given required documents.
    pub fn new<I, S>(required: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            required: required.into_iter().map(Into::into).collect(),
        }
    }

    /// Checklist with [`DEFAULT_REQUIRED_DOCUMENTS`].
    pub fn standard() -> Self {
        Self::new(DEFAULT_REQUIRED_DOCUMENTS)
    }

    /// Required documents, in order.
    pub fn required(&self) -> &[String] {
        &self.required
    }

    /// Evaluates yes/no answers keyed by document name.
    ///
    /// An unanswered document counts as "no".
    pub fn evaluate(&self, answers: &HashMap<&str, bool>) -> ChecklistOutcome {
        let missing: Vec<String> = self
            .required
            .iter()
            .filter(|doc| !answers.get(doc.as_str()).copied().unwrap_or(false))
            .cloned()
            .collect();
        ChecklistOutcome {
            passed: missing.is_empty(),
            missing,
        }
    }

    /// Evaluates the documents a client presented.
    pub fn evaluate_presented<S: AsRef<str>>(&self, presented: &[S]) -> ChecklistOutcome {
        let answers: HashMap<&str, bool> = presented.iter().map(|d| (d.as_ref(), true)).collect();
        self.evaluate(&answers)
    }
}

impl Default for DocumentChecklist {
    fn default() -> Self {
        Self::standard()
    }
}

/// Validation result.
pub type ValidationResult = Result<(), Vec<ValidationError>>;

/// A validation error.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidationError {
    /// Error category.
    pub kind: ValidationErrorKind,
    /// Human-readable description.
    pub message: String,
}

/// Categories of validation errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationErrorKind {
    /// Two servers share the same ID.
    DuplicateId,
    /// A server handles no procedure type.
    NoProcedures,
    /// A procedure type has no server.
    UncoveredProcedure,
}

impl ValidationError {
    fn new(kind: ValidationErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

/// Validates a set of server definitions before building an engine.
///
/// Checks:
/// 1. No duplicate server IDs
/// 2. Every server handles at least one procedure type
/// 3. Every known procedure type is handled by some server
///
/// # Returns
/// `Ok(())` if all checks pass, `Err(errors)` with all detected issues.
pub fn validate_pool(servers: &[Server]) -> ValidationResult {
    let mut errors = Vec::new();

    let mut ids = HashSet::new();
    for s in servers {
        if !ids.insert(s.id.as_str()) {
            errors.push(ValidationError::new(
                ValidationErrorKind::DuplicateId,
                format!("Duplicate server ID: {}", s.id),
            ));
        }
        if s.procedure_types.is_empty() {
            errors.push(ValidationError::new(
                ValidationErrorKind::NoProcedures,
                format!("Server '{}' handles no procedure type", s.id),
            ));
        }
    }

    for ty in ProcedureType::ALL {
        if !servers.iter().any(|s| s.handles(ty)) {
            errors.push(ValidationError::new(
                ValidationErrorKind::UncoveredProcedure,
                format!("No server handles procedure type '{ty}'"),
            ));
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn full_pool() -> Vec<Server> {
        vec![
            Server::new("v1").with_procedure(ProcedureType::BasicDocument),
            Server::new("v2").with_procedures([ProcedureType::Simple, ProcedureType::Complex]),
            Server::new("v3").with_procedure(ProcedureType::Payment),
        ]
    }

    #[test]
    fn test_checklist_all_present() {
        let checklist = DocumentChecklist::standard();
        let outcome = checklist.evaluate_presented(&["INE", "CURP", "RFC", "Acta de nacimiento"]);
        assert!(outcome.passed);
        assert!(outcome.missing.is_empty());
    }

    #[test]
    fn test_checklist_reports_missing_in_order() {
        let checklist = DocumentChecklist::standard();
        let answers = HashMap::from([("Acta de nacimiento", true), ("RFC", false), ("CURP", true)]);
        let outcome = checklist.evaluate(&answers);
        assert!(!outcome.passed);
        assert_eq!(outcome.missing, vec!["RFC", "INE"]);
    }

    #[test]
    fn test_custom_checklist() {
        let checklist = DocumentChecklist::new(["Comprobante de pago"]);
        assert_eq!(checklist.required(), ["Comprobante de pago"]);
        assert!(!checklist.evaluate_presented::<&str>(&[]).passed);
        assert!(DocumentChecklist::new(Vec::<String>::new()).evaluate_presented::<&str>(&[]).passed);
    }

    #[test]
    fn test_valid_pool() {
        assert!(validate_pool(&full_pool()).is_ok());
    }

    #[test]
    fn test_duplicate_server() {
        let mut pool = full_pool();
        pool.push(Server::new("v1").with_procedure(ProcedureType::Payment));
        let errs = validate_pool(&pool).unwrap_err();
        assert!(errs.iter().any(|e| e.kind == ValidationErrorKind::DuplicateId));
    }

    #[test]
    fn test_server_without_procedures() {
        let mut pool = full_pool();
        pool.push(Server::new("idle"));
        let errs = validate_pool(&pool).unwrap_err();
        assert_eq!(errs.len(), 1);
        assert_eq!(errs[0].kind, ValidationErrorKind::NoProcedures);
    }

    #[test]
    fn test_uncovered_procedure() {
        let pool = vec![Server::new("v1").with_procedure(ProcedureType::Simple)];
        let errs = validate_pool(&pool).unwrap_err();
        let uncovered = errs
            .iter()
            .filter(|e| e.kind == ValidationErrorKind::UncoveredProcedure)
            .count();
        assert_eq!(uncovered, 3);
    }

    #[test]
    fn test_multiple_errors() {
        let pool = vec![Server::new("x"), Server::new("x")];
        let errs = validate_pool(&pool).unwrap_err();
        // 1 duplicate + 2 empty servers + 4 uncovered types
        assert_eq!(errs.len(), 7);
    }
}
