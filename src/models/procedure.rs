//! Procedure type model.
//!
//! A procedure type is what the client came to do at the counter. Each
//! type has a reference service time used when the caller does not
//! supply its own estimate.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::DispatchError;

/// Kind of procedure a client requests.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
#[non_exhaustive]
pub enum ProcedureType {
    /// Delivery or review of basic documents.
    BasicDocument,
    /// Simple procedure.
    Simple,
    /// Complex procedure.
    Complex,
    /// Payment collection.
    Payment,
}

impl ProcedureType {
    /// All known procedure types, in canonical order.
    pub const ALL: [ProcedureType; 4] = [
        ProcedureType::BasicDocument,
        ProcedureType::Simple,
        ProcedureType::Complex,
        ProcedureType::Payment,
    ];

    /// Canonical string code.
    pub fn code(&self) -> &'static str {
        match self {
            ProcedureType::BasicDocument => "basic-document",
            ProcedureType::Simple => "simple",
            ProcedureType::Complex => "complex",
            ProcedureType::Payment => "payment",
        }
    }

    /// Reference service time in minutes.
    pub fn standard_duration(&self) -> i64 {
        match self {
            ProcedureType::BasicDocument => 5,
            ProcedureType::Simple => 10,
            ProcedureType::Complex => 20,
            ProcedureType::Payment => 5,
        }
    }
}

impl fmt::Display for ProcedureType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for ProcedureType {
    type Err = DispatchError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "basic-document" | "doc" => Ok(ProcedureType::BasicDocument),
            "simple" => Ok(ProcedureType::Simple),
            "complex" | "complejo" => Ok(ProcedureType::Complex),
            "payment" | "pago" | "pagos" => Ok(ProcedureType::Payment),
            _ => Err(DispatchError::InvalidType(s.to_string())),
        }
    }
}
