use crate::error::AppError;

/// GET /health
pub async fn health_check() -> &'static str {
    "OK"
}

/// GET /error
///
/// Always fails; used to check error reporting end to end.
pub async fn trigger_error() -> Result<(), AppError> {
    Err(AppError::Internal("You triggered an error".into()))
}
