//! Reconciliation error types

use thiserror::Error;

/// Errors raised by the reconciliation core
///
/// Unrecognized instructions and unmatched place names are not errors; they
/// surface as `None` and summary notes respectively.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ReconcileError {
    #[error("Malformed generated output: {0}")]
    MalformedOutput(String),

    #[error("Invalid date: {0}")]
    InvalidDate(String),
}
