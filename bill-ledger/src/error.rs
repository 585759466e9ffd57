//! Error taxonomy for bill building and submission.

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BillError {
    /// Bad line-item or tax-rate input. The ledger is never touched.
    #[error("Validation error: {field} {reason}")]
    Validation { field: &'static str, reason: String },

    /// A snapshot was requested before the bill had its metadata and items.
    #[error("Incomplete bill: {}", .0.join(", "))]
    IncompleteBill(Vec<String>),

    #[error("Submission failed: {0}")]
    Submission(#[from] SubmissionError),
}

impl BillError {
    pub(crate) fn validation(field: &'static str, reason: impl Into<String>) -> Self {
        BillError::Validation {
            field,
            reason: reason.into(),
        }
    }
}

/// Failure reported by the persistence collaborator.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SubmissionError {
    #[error("backend rejected bill ({status}): {message}")]
    Rejected { status: u16, message: String },

    #[error("backend unreachable: {0}")]
    Unreachable(String),

    #[error("invalid backend response: {0}")]
    InvalidResponse(String),
}

impl SubmissionError {
    /// Whether the backend refused the caller's credentials.
    pub fn is_unauthorized(&self) -> bool {
        matches!(self, SubmissionError::Rejected { status: 401 | 403, .. })
    }
}
