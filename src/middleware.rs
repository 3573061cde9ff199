//! Request middleware.

use crate::errors::AppError;
use crate::handlers::AppState;
use axum::{
    body::Body,
    extract::{Request, State},
    http::header::ORIGIN,
    middleware::Next,
    response::{IntoResponse, Response},
};
use std::sync::Arc;

/// Rejects browser requests whose `Origin` is not on the allow-list.
///
/// Requests without an `Origin` header (server-to-server, health probes)
/// pass through; CORS headers themselves are handled by `CorsLayer`.
pub async fn origin_guard(
    State(state): State<Arc<AppState>>,
    request: Request<Body>,
    next: Next,
) -> Response {
    if let Some(origin) = request.headers().get(ORIGIN) {
        let allowed = origin
            .to_str()
            .map(|origin| state.config.is_origin_allowed(origin))
            .unwrap_or(false);

        if !allowed {
            return AppError::Forbidden(format!(
                "Origin {} is not allowed",
                String::from_utf8_lossy(origin.as_bytes())
            ))
            .into_response();
        }
    }

    next.run(request).await
}
