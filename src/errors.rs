use axum::http::StatusCode;
use thiserror::Error;

/// Failures surfaced by the intake ledger and its stores.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LedgerError {
    #[error("invalid input: {0}")]
    InvalidInput(String),
    #[error("storage unavailable: {0}")]
    StorageUnavailable(String),
}

impl LedgerError {
    pub fn invalid(message: impl Into<String>) -> Self {
        Self::InvalidInput(message.into())
    }

    pub fn unavailable(err: impl std::fmt::Display) -> Self {
        Self::StorageUnavailable(err.to_string())
    }
}

#[derive(Debug)]
pub struct AppError {
    pub status: StatusCode,
    pub message: String,
}

impl AppError {
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            message: message.into(),
        }
    }

    pub fn unavailable(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::SERVICE_UNAVAILABLE,
            message: message.into(),
        }
    }
}

impl From<LedgerError> for AppError {
    fn from(err: LedgerError) -> Self {
        match err {
            LedgerError::InvalidInput(_) => Self::bad_request(err.to_string()),
            LedgerError::StorageUnavailable(_) => {
                Self::unavailable(format!("intake was not recorded: {err}"))
            }
        }
    }
}

impl axum::response::IntoResponse for AppError {
    fn into_response(self) -> axum::response::Response {
        (self.status, self.message).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn storage_failure_maps_to_service_unavailable() {
        let err = AppError::from(LedgerError::unavailable("disk full"));
        assert_eq!(err.status, StatusCode::SERVICE_UNAVAILABLE);
        assert!(err.message.starts_with("intake was not recorded"));
    }

    #[test]
    fn invalid_input_maps_to_bad_request() {
        let err = AppError::from(LedgerError::invalid("amount must be numeric"));
        assert_eq!(err.status, StatusCode::BAD_REQUEST);
        assert!(err.message.contains("amount must be numeric"));
    }
}
