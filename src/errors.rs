use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use crate::models::ErrorBody;
use std::fmt;

/// Application-specific error types.
#[derive(Debug, Clone)]
pub enum AppError {
    /// Bad request error (invalid or missing input).
    BadRequest(String),
    /// Request rejected at the edge (e.g. origin not allowed).
    Forbidden(String),
    /// Resource not found error.
    NotFound(String),
    /// The route exists but not for this method.
    MethodNotAllowed(String),
    /// Request body over the configured limit.
    PayloadTooLarge(String),
    /// Error interacting with an external API. The message is the upstream's own text.
    ExternalApiError(String),
    /// The upstream did not answer within the configured timeout.
    UpstreamTimeout(String),
    /// Every retry attempt failed; `source` is the last failure.
    RetriesExhausted {
        /// Number of attempts performed.
        attempts: u32,
        /// The failure of the final attempt.
        source: Box<AppError>,
    },
    /// Internal server error. The message is logged, never returned.
    InternalError(String),
    /// Error with context chain for better debugging.
    WithContext {
        /// The underlying source of the error.
        source: Box<AppError>,
        /// Additional context message.
        context: String,
    },
}

impl AppError {
    /// Whether this error (or the error it wraps) was caused by an upstream timeout.
    pub fn is_timeout(&self) -> bool {
        match self {
            AppError::UpstreamTimeout(_) => true,
            AppError::RetriesExhausted { source, .. } | AppError::WithContext { source, .. } => {
                source.is_timeout()
            }
            _ => false,
        }
    }
}

impl fmt::Display for AppError {
    /// Formats the error for display.
    ///
    /// Upstream failures display as the bare upstream message so that
    /// `RetriesExhausted` can wrap it without stacking prefixes.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::BadRequest(msg) => write!(f, "{}", msg),
            AppError::Forbidden(msg) => write!(f, "{}", msg),
            AppError::NotFound(msg) => write!(f, "Not found: {}", msg),
            AppError::MethodNotAllowed(msg) => write!(f, "{}", msg),
            AppError::PayloadTooLarge(msg) => write!(f, "{}", msg),
            AppError::ExternalApiError(msg) => write!(f, "{}", msg),
            AppError::UpstreamTimeout(msg) => write!(f, "{}", msg),
            AppError::RetriesExhausted { attempts, source } => {
                write!(f, "Failed after {} attempts: {}", attempts, source)
            }
            AppError::InternalError(msg) => write!(f, "Internal error: {}", msg),
            AppError::WithContext { source, context } => {
                write!(f, "{}: {}", context, source)
            }
        }
    }
}

impl std::error::Error for AppError {}

impl IntoResponse for AppError {
    /// Converts the error into an HTTP response.
    ///
    /// Maps each error variant to an appropriate HTTP status code and JSON body.
    /// Logs errors appropriately based on their severity.
    fn into_response(self) -> Response {
        let (status, error_message) = match &self {
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
            AppError::Forbidden(msg) => {
                tracing::warn!("Forbidden: {}", msg);
                (StatusCode::FORBIDDEN, msg.clone())
            }
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, msg.clone()),
            AppError::MethodNotAllowed(msg) => (StatusCode::METHOD_NOT_ALLOWED, msg.clone()),
            AppError::PayloadTooLarge(msg) => (StatusCode::PAYLOAD_TOO_LARGE, msg.clone()),
            AppError::ExternalApiError(msg) => {
                tracing::error!("External API error: {}", msg);
                (StatusCode::INTERNAL_SERVER_ERROR, msg.clone())
            }
            AppError::UpstreamTimeout(msg) => {
                tracing::error!("Upstream timeout: {}", msg);
                (StatusCode::GATEWAY_TIMEOUT, msg.clone())
            }
            AppError::RetriesExhausted { .. } => {
                tracing::error!("{}", self);
                let status = if self.is_timeout() {
                    StatusCode::GATEWAY_TIMEOUT
                } else {
                    StatusCode::INTERNAL_SERVER_ERROR
                };
                (status, self.to_string())
            }
            AppError::InternalError(msg) => {
                tracing::error!("Internal error: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal server error".to_string(),
                )
            }
            AppError::WithContext { source, context } => {
                // Log full context chain for debugging
                tracing::error!("Error with context: {} -> {}", context, source);
                // Delegate to underlying error's response
                return source.clone().into_response();
            }
        };

        let body = Json(ErrorBody {
            error: error_message,
        });

        (status, body).into_response()
    }
}

impl From<reqwest::Error> for AppError {
    /// Converts a `reqwest::Error` into an `AppError`, keeping timeouts distinct.
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            AppError::UpstreamTimeout("timed out".to_string())
        } else {
            AppError::ExternalApiError(err.to_string())
        }
    }
}

/// Extension trait for adding context to errors.
/// Similar to `anyhow::Context` but for our `AppError` type.
pub trait ResultExt<T> {
    /// Add context to an error.
    ///
    /// # Arguments
    ///
    /// * `context` - The context message to add.
    fn context(self, context: impl Into<String>) -> Result<T, AppError>;
}

impl<T> ResultExt<T> for Result<T, AppError> {
    fn context(self, context: impl Into<String>) -> Result<T, AppError> {
        self.map_err(|e| AppError::WithContext {
            source: Box::new(e),
            context: context.into(),
        })
    }
}
