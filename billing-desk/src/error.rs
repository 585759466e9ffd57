use bill_ledger::{BillError, SubmissionError};
use service_core::error::AppError;

/// Map a ledger failure onto the HTTP error surface.
///
/// Validation problems become 422s. A backend refusal of the caller's
/// credentials surfaces as 401; any other submission failure is a 502.
pub fn into_app_error(err: BillError) -> AppError {
    match err {
        BillError::Validation { .. } | BillError::IncompleteBill(_) => {
            AppError::ValidationError(err.to_string())
        }
        BillError::Submission(submission) => submission_error(submission),
    }
}

pub fn submission_error(err: SubmissionError) -> AppError {
    if err.is_unauthorized() {
        AppError::Unauthorized(anyhow::anyhow!("Backend refused credentials: {}", err))
    } else {
        AppError::BadGateway(err.to_string())
    }
}
