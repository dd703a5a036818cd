/// Error handling for the API server
///
/// Handlers return `Result<T, ApiError>`; every library error converts into
/// an `ApiError`, which renders as `{error, message, details?}` with the
/// matching status code.
///
/// # Example
///
/// ```no_run
/// use eduagent_api::error::{ApiError, ApiResult};
/// use axum::Json;
/// use serde_json::{json, Value};
///
/// async fn handler(found: bool) -> ApiResult<Json<Value>> {
///     if !found {
///         return Err(ApiError::NotFound("Roadmap not found".to_string()));
///     }
///     Ok(Json(json!({ "ok": true })))
/// }
/// ```

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use eduagent_relay::RelayError;
use eduagent_shared::auth::{
    authorization::AuthzError, jwt::JwtError, middleware::AuthError, password::PasswordError,
};
use eduagent_shared::models::roadmap::{ProgressError, ProgressUpdateError};
use serde::{Deserialize, Serialize};
use std::fmt;
use validator::ValidationErrors;

/// Message for usernames outside the allowed length
pub const USERNAME_LENGTH_MESSAGE: &str = "Username must be 3-64 characters";

/// API result type alias
pub type ApiResult<T> = Result<T, ApiError>;

/// Unified API error type
#[derive(Debug)]
pub enum ApiError {
    /// Bad request (400)
    BadRequest(String),

    /// Unauthorized (401)
    Unauthorized(String),

    /// Forbidden (403)
    Forbidden(String),

    /// Not found (404)
    NotFound(String),

    /// Conflict (409) - duplicate email or username
    Conflict(String),

    /// Unprocessable entity (422) - validation errors
    ValidationError(Vec<ValidationErrorDetail>),

    /// An AI provider call failed (502)
    UpstreamFailed(String),

    /// The model answered with something that is not JSON (502)
    MalformedAiResponse { message: String, parse_error: String },

    /// Internal server error (500)
    InternalError(String),

    /// Service unavailable (503)
    ServiceUnavailable(String),
}

/// Validation error detail
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationErrorDetail {
    /// Field that failed validation
    pub field: String,

    /// Error message
    pub message: String,
}

/// Extra error information
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ErrorDetails {
    Fields(Vec<ValidationErrorDetail>),
    Text(String),
}

/// Error response format
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// Error code (e.g., "bad_request", "unauthorized")
    pub error: String,

    /// Human-readable error message
    pub message: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<ErrorDetails>,
}

/// Which relay call failed, for the user-facing message
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RelayOperation {
    Generation,
    Chat,
    Voice,
}

impl RelayOperation {
    pub fn failure_message(&self) -> &'static str {
        match self {
            RelayOperation::Generation => "AI Generation Failed",
            RelayOperation::Chat => "AI Chat Failed",
            RelayOperation::Voice => "Voice Synthesis Failed",
        }
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ApiError::BadRequest(msg) => write!(f, "Bad request: {}", msg),
            ApiError::Unauthorized(msg) => write!(f, "Unauthorized: {}", msg),
            ApiError::Forbidden(msg) => write!(f, "Forbidden: {}", msg),
            ApiError::NotFound(msg) => write!(f, "Not found: {}", msg),
            ApiError::Conflict(msg) => write!(f, "Conflict: {}", msg),
            ApiError::ValidationError(errors) => {
                write!(f, "Validation failed: {} errors", errors.len())
            }
            ApiError::UpstreamFailed(msg) => write!(f, "Upstream failure: {}", msg),
            ApiError::MalformedAiResponse { parse_error, .. } => {
                write!(f, "Malformed AI response: {}", parse_error)
            }
            ApiError::InternalError(msg) => write!(f, "Internal error: {}", msg),
            ApiError::ServiceUnavailable(msg) => write!(f, "Service unavailable: {}", msg),
        }
    }
}

impl std::error::Error for ApiError {}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error_code, message, details) = match self {
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, "bad_request", msg, None),
            ApiError::Unauthorized(msg) => (StatusCode::UNAUTHORIZED, "unauthorized", msg, None),
            ApiError::Forbidden(msg) => (StatusCode::FORBIDDEN, "forbidden", msg, None),
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, "not_found", msg, None),
            ApiError::Conflict(msg) => (StatusCode::CONFLICT, "conflict", msg, None),
            ApiError::ValidationError(errors) => (
                StatusCode::UNPROCESSABLE_ENTITY,
                "validation_error",
                "Request validation failed".to_string(),
                Some(ErrorDetails::Fields(errors)),
            ),
            ApiError::UpstreamFailed(msg) => (StatusCode::BAD_GATEWAY, "upstream_error", msg, None),
            ApiError::MalformedAiResponse {
                message,
                parse_error,
            } => (
                StatusCode::BAD_GATEWAY,
                "malformed_ai_response",
                message,
                Some(ErrorDetails::Text(parse_error)),
            ),
            ApiError::InternalError(msg) => {
                // Log internal errors but don't expose details to clients
                tracing::error!("Internal error: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "internal_error",
                    "An internal error occurred".to_string(),
                    None,
                )
            }
            ApiError::ServiceUnavailable(msg) => (
                StatusCode::SERVICE_UNAVAILABLE,
                "service_unavailable",
                msg,
                None,
            ),
        };

        let body = Json(ErrorResponse {
            error: error_code.to_string(),
            message,
            details,
        });

        (status, body).into_response()
    }
}

impl ApiError {
    /// Maps a relay failure to a response for the given operation
    ///
    /// Provider causes are logged here and never sent to the client.
    pub fn from_relay(operation: RelayOperation, err: RelayError) -> Self {
        let message = operation.failure_message();

        match err {
            RelayError::NoProviderAvailable { ref failures } if failures.is_empty() => {
                tracing::error!(operation = message, "No AI provider configured");
                ApiError::ServiceUnavailable("No AI provider available".to_string())
            }
            RelayError::NoProviderAvailable { failures } => {
                for failure in &failures {
                    tracing::error!(operation = message, %failure, "Provider failed");
                }
                ApiError::UpstreamFailed(message.to_string())
            }
            RelayError::Provider { provider, source } => {
                tracing::error!(operation = message, provider = %provider, error = %source, "Provider failed");
                ApiError::UpstreamFailed(message.to_string())
            }
            RelayError::MalformedRoadmap(parse_error) => ApiError::MalformedAiResponse {
                message: format!("{message}: model response was not valid JSON"),
                parse_error,
            },
            RelayError::InvalidInput(msg) => ApiError::BadRequest(msg),
        }
    }
}

/// Convert sqlx errors to API errors
impl From<sqlx::Error> for ApiError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::RowNotFound => ApiError::NotFound("Resource not found".to_string()),
            sqlx::Error::Database(db_err) => {
                match db_err.constraint() {
                    Some("users_email_key") => {
                        return ApiError::Conflict("Email already registered".to_string())
                    }
                    Some("users_username_key") => {
                        return ApiError::Conflict("Username already taken".to_string())
                    }
                    Some("users_username_length") => {
                        return ApiError::ValidationError(vec![ValidationErrorDetail {
                            field: "username".to_string(),
                            message: USERNAME_LENGTH_MESSAGE.to_string(),
                        }])
                    }
                    Some(constraint) if db_err.is_unique_violation() => {
                        return ApiError::Conflict(format!("Constraint violation: {}", constraint))
                    }
                    _ => {}
                }

                ApiError::InternalError(format!("Database error: {}", db_err))
            }
            sqlx::Error::PoolTimedOut | sqlx::Error::Io(_) => {
                tracing::error!(error = %err, "Database unreachable");
                ApiError::ServiceUnavailable("Database unavailable".to_string())
            }
            _ => ApiError::InternalError(format!("Database error: {}", err)),
        }
    }
}

/// Convert request validation errors to API errors
impl From<ValidationErrors> for ApiError {
    fn from(errors: ValidationErrors) -> Self {
        let mut details: Vec<ValidationErrorDetail> = errors
            .field_errors()
            .iter()
            .flat_map(|(field, errors)| {
                errors.iter().map(move |error| ValidationErrorDetail {
                    field: field.to_string(),
                    message: error
                        .message
                        .as_ref()
                        .map(|m| m.to_string())
                        .unwrap_or_else(|| "Validation failed".to_string()),
                })
            })
            .collect();
        details.sort_by(|a, b| a.field.cmp(&b.field));

        ApiError::ValidationError(details)
    }
}

/// Convert auth errors to API errors
impl From<AuthError> for ApiError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::MissingCredentials => {
                ApiError::Unauthorized("No token, authorization denied".to_string())
            }
            AuthError::InvalidFormat(msg) => ApiError::BadRequest(msg),
            AuthError::InvalidToken(msg) => ApiError::Unauthorized(msg),
        }
    }
}

/// Convert authorization errors to API errors
impl From<AuthzError> for ApiError {
    fn from(err: AuthzError) -> Self {
        match err {
            AuthzError::NotOwner { .. } => {
                ApiError::Forbidden("Not authorized to access this resource".to_string())
            }
        }
    }
}

/// Convert password errors to API errors
impl From<PasswordError> for ApiError {
    fn from(err: PasswordError) -> Self {
        ApiError::InternalError(format!("Password operation failed: {}", err))
    }
}

/// Convert JWT errors to API errors
impl From<JwtError> for ApiError {
    fn from(err: JwtError) -> Self {
        match err {
            JwtError::Expired => ApiError::Unauthorized("Token expired".to_string()),
            JwtError::InvalidIssuer { .. } => {
                ApiError::Unauthorized("Invalid token issuer".to_string())
            }
            JwtError::CreateError(msg) => {
                ApiError::InternalError(format!("Token creation failed: {}", msg))
            }
            _ => ApiError::Unauthorized(format!("Invalid token: {}", err)),
        }
    }
}

/// Convert module-addressing errors to API errors
impl From<ProgressError> for ApiError {
    fn from(err: ProgressError) -> Self {
        ApiError::NotFound(err.to_string())
    }
}

impl From<ProgressUpdateError> for ApiError {
    fn from(err: ProgressUpdateError) -> Self {
        match err {
            ProgressUpdateError::NotFound => ApiError::NotFound("Roadmap not found".to_string()),
            ProgressUpdateError::Forbidden(e) => e.into(),
            ProgressUpdateError::Progress(e) => e.into(),
            ProgressUpdateError::Database(e) => e.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use eduagent_relay::providers::ProviderError;
    use eduagent_relay::ProviderFailure;

    #[test]
    fn test_error_display() {
        let err = ApiError::BadRequest("Invalid input".to_string());
        assert_eq!(err.to_string(), "Bad request: Invalid input");

        let err = ApiError::NotFound("Roadmap not found".to_string());
        assert_eq!(err.to_string(), "Not found: Roadmap not found");
    }

    #[test]
    fn test_status_codes() {
        let cases = [
            (ApiError::Unauthorized("x".into()), StatusCode::UNAUTHORIZED),
            (ApiError::Forbidden("x".into()), StatusCode::FORBIDDEN),
            (ApiError::NotFound("x".into()), StatusCode::NOT_FOUND),
            (ApiError::Conflict("x".into()), StatusCode::CONFLICT),
            (ApiError::ValidationError(vec![]), StatusCode::UNPROCESSABLE_ENTITY),
            (ApiError::UpstreamFailed("x".into()), StatusCode::BAD_GATEWAY),
            (ApiError::ServiceUnavailable("x".into()), StatusCode::SERVICE_UNAVAILABLE),
        ];

        for (err, status) in cases {
            assert_eq!(err.into_response().status(), status);
        }
    }

    #[test]
    fn test_relay_mapping() {
        let unconfigured = RelayError::NoProviderAvailable { failures: vec![] };
        assert!(matches!(
            ApiError::from_relay(RelayOperation::Chat, unconfigured),
            ApiError::ServiceUnavailable(_)
        ));

        let all_failed = RelayError::NoProviderAvailable {
            failures: vec![ProviderFailure {
                provider: "groq".to_string(),
                error: ProviderError::EmptyResponse,
            }],
        };
        match ApiError::from_relay(RelayOperation::Chat, all_failed) {
            ApiError::UpstreamFailed(msg) => assert_eq!(msg, "AI Chat Failed"),
            other => panic!("unexpected: {other:?}"),
        }

        let voice = RelayError::Provider {
            provider: "elevenlabs".to_string(),
            source: ProviderError::Request("timeout".to_string()),
        };
        match ApiError::from_relay(RelayOperation::Voice, voice) {
            ApiError::UpstreamFailed(msg) => assert_eq!(msg, "Voice Synthesis Failed"),
            other => panic!("unexpected: {other:?}"),
        }
    }

    #[test]
    fn test_malformed_roadmap_is_distinct() {
        let err = ApiError::from_relay(
            RelayOperation::Generation,
            RelayError::MalformedRoadmap("expected value at line 1 column 1".to_string()),
        );

        match &err {
            ApiError::MalformedAiResponse {
                message,
                parse_error,
            } => {
                assert!(message.starts_with("AI Generation Failed"));
                assert!(parse_error.contains("line 1"));
            }
            other => panic!("unexpected: {other:?}"),
        }
        assert_eq!(err.into_response().status(), StatusCode::BAD_GATEWAY);
    }

    #[test]
    fn test_ownership_is_forbidden() {
        let err: ApiError = AuthzError::NotOwner {
            user_id: uuid::Uuid::new_v4(),
            owner_id: uuid::Uuid::new_v4(),
        }
        .into();
        assert!(matches!(err, ApiError::Forbidden(_)));
    }

    #[test]
    fn test_progress_update_mapping() {
        let cases = [
            (ProgressUpdateError::NotFound, StatusCode::NOT_FOUND),
            (
                ProgressUpdateError::Forbidden(AuthzError::NotOwner {
                    user_id: uuid::Uuid::new_v4(),
                    owner_id: uuid::Uuid::new_v4(),
                }),
                StatusCode::FORBIDDEN,
            ),
            (
                ProgressUpdateError::Progress(ProgressError::PhaseNotFound(4)),
                StatusCode::NOT_FOUND,
            ),
            (
                ProgressUpdateError::Database(sqlx::Error::PoolTimedOut),
                StatusCode::SERVICE_UNAVAILABLE,
            ),
        ];

        for (err, status) in cases {
            assert_eq!(ApiError::from(err).into_response().status(), status);
        }
    }

    #[test]
    fn test_validation_error() {
        let errors = vec![
            ValidationErrorDetail {
                field: "email".to_string(),
                message: "Invalid email format".to_string(),
            },
            ValidationErrorDetail {
                field: "password".to_string(),
                message: "Password too short".to_string(),
            },
        ];

        let err = ApiError::ValidationError(errors);
        assert_eq!(err.to_string(), "Validation failed: 2 errors");
    }
}
