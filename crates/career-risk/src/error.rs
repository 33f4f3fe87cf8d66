use crate::config::ConfigError;
use crate::telemetry::TelemetryError;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use std::fmt;

/// Input rejected before any numeric work begins.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ValidationError {
    #[error("{field} is required")]
    Missing { field: &'static str },
    #[error("{field} must be a finite number")]
    NotFinite { field: &'static str },
    #[error("{field} must be between {min} and {max} (found {found})")]
    OutOfRange {
        field: &'static str,
        min: f64,
        max: f64,
        found: f64,
    },
    #[error("{field} must contain at least {min} characters")]
    TooShort { field: &'static str, min: usize },
    #[error("{field} must contain at least {min} entries")]
    TooFew { field: &'static str, min: usize },
    #[error("{field} is not in a recognised format")]
    Unparseable { field: &'static str },
}

impl ValidationError {
    pub(crate) fn check_range(
        field: &'static str,
        value: f64,
        min: f64,
        max: f64,
    ) -> Result<f64, ValidationError> {
        if !value.is_finite() {
            return Err(ValidationError::NotFinite { field });
        }
        if value < min || value > max {
            return Err(ValidationError::OutOfRange {
                field,
                min,
                max,
                found: value,
            });
        }
        Ok(value)
    }
}

/// Failures surfaced by the HTTP layer. Callers only see the generic message;
/// the detailed cause goes to the log.
#[derive(Debug)]
pub enum ApiError {
    InvalidRequest,
    Unauthorized,
    RateLimited,
    Internal,
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::InvalidRequest => StatusCode::BAD_REQUEST,
            ApiError::Unauthorized => StatusCode::UNAUTHORIZED,
            ApiError::RateLimited => StatusCode::TOO_MANY_REQUESTS,
            ApiError::Internal => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn message(&self) -> &'static str {
        match self {
            ApiError::InvalidRequest => "Invalid request",
            ApiError::Unauthorized => "Unauthorized",
            ApiError::RateLimited => "Rate limit exceeded",
            ApiError::Internal => "Internal error",
        }
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.message())
    }
}

impl std::error::Error for ApiError {}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = Json(json!({ "error": self.message() }));
        (self.status(), body).into_response()
    }
}

impl From<ValidationError> for ApiError {
    fn from(err: ValidationError) -> Self {
        tracing::debug!(error = %err, "request failed validation");
        ApiError::InvalidRequest
    }
}

/// Process-level failures raised while booting the service or running the CLI.
#[derive(Debug)]
pub enum AppError {
    Config(ConfigError),
    Telemetry(TelemetryError),
    Io(std::io::Error),
    Server(axum::Error),
    Validation(ValidationError),
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::Config(err) => write!(f, "configuration error: {}", err),
            AppError::Telemetry(err) => write!(f, "telemetry error: {}", err),
            AppError::Io(err) => write!(f, "io error: {}", err),
            AppError::Server(err) => write!(f, "server error: {}", err),
            AppError::Validation(err) => write!(f, "invalid input: {}", err),
        }
    }
}

impl std::error::Error for AppError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            AppError::Config(err) => Some(err),
            AppError::Telemetry(err) => Some(err),
            AppError::Io(err) => Some(err),
            AppError::Server(err) => Some(err),
            AppError::Validation(err) => Some(err),
        }
    }
}

impl From<ConfigError> for AppError {
    fn from(value: ConfigError) -> Self {
        Self::Config(value)
    }
}

impl From<TelemetryError> for AppError {
    fn from(value: TelemetryError) -> Self {
        Self::Telemetry(value)
    }
}

impl From<std::io::Error> for AppError {
    fn from(value: std::io::Error) -> Self {
        Self::Io(value)
    }
}

impl From<axum::Error> for AppError {
    fn from(value: axum::Error) -> Self {
        Self::Server(value)
    }
}

impl From<ValidationError> for AppError {
    fn from(value: ValidationError) -> Self {
        Self::Validation(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn api_errors_map_to_envelope_statuses() {
        assert_eq!(ApiError::InvalidRequest.status(), StatusCode::BAD_REQUEST);
        assert_eq!(ApiError::RateLimited.status(), StatusCode::TOO_MANY_REQUESTS);
        assert_eq!(ApiError::Internal.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(ApiError::RateLimited.message(), "Rate limit exceeded");
    }

    #[test]
    fn validation_errors_collapse_to_generic_message() {
        let err: ApiError = ValidationError::TooShort {
            field: "task",
            min: 5,
        }
        .into();
        assert_eq!(err.message(), "Invalid request");
    }

    #[test]
    fn check_range_rejects_nan_and_out_of_bounds() {
        assert!(matches!(
            ValidationError::check_range("score", f64::NAN, 0.0, 100.0),
            Err(ValidationError::NotFinite { field: "score" })
        ));
        assert!(matches!(
            ValidationError::check_range("score", 101.0, 0.0, 100.0),
            Err(ValidationError::OutOfRange { .. })
        ));
        assert_eq!(
            ValidationError::check_range("score", 62.0, 0.0, 100.0),
            Ok(62.0)
        );
    }
}
