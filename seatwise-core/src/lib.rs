pub mod identity;
pub mod payment;
pub mod queue;

/// Error taxonomy shared by every Seatwise service.
///
/// `Validation` is always raised before any store mutation. `Conflict` means
/// an atomic store precondition failed on live business state (insufficient
/// seats). `ProtocolViolation` flags a structurally invalid downstream
/// response, which usually indicates an inconsistent cross-service state
/// needing operator attention rather than a routine failure.
#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("{0} not found")]
    NotFound(String),

    #[error("Not enough seats available: requested {requested}, available {available}")]
    Conflict { requested: u32, available: i64 },

    #[error("Upstream service error: {0}")]
    Upstream(String),

    #[error("Protocol violation in downstream response: {0}")]
    ProtocolViolation(String),

    #[error("Internal service error: {0}")]
    Internal(String),
}

pub type CoreResult<T> = Result<T, CoreError>;

impl CoreError {
    /// Machine-readable code carried in every error response body.
    pub fn code(&self) -> &'static str {
        match self {
            CoreError::Validation(_) => "VALIDATION_ERROR",
            CoreError::NotFound(_) => "NOT_FOUND",
            CoreError::Conflict { .. } => "CONFLICT",
            CoreError::Upstream(_) => "UPSTREAM_ERROR",
            CoreError::ProtocolViolation(_) => "PROTOCOL_VIOLATION",
            CoreError::Internal(_) => "INTERNAL_ERROR",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn conflict_reports_requested_and_available() {
        let err = CoreError::Conflict { requested: 5, available: 2 };
        assert_eq!(err.code(), "CONFLICT");
        assert!(err.to_string().contains("requested 5"));
        assert!(err.to_string().contains("available 2"));
    }
}
