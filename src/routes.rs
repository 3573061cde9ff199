use crate::handlers::{self, AppState};
use crate::middleware::origin_guard;
use axum::{
    extract::DefaultBodyLimit,
    http::{header, HeaderValue, Method, StatusCode},
    middleware,
    response::IntoResponse,
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower_http::{
    cors::{AllowOrigin, CorsLayer},
    trace::TraceLayer,
};

/// Request bodies are tiny JSON objects; anything larger is refused.
pub const MAX_BODY_BYTES: usize = 1024 * 1024;

const OPENAPI_SPEC: &str = include_str!("../openapi.yml");

/// Serves the OpenAPI specification YAML bundled with the binary.
async fn serve_openapi_spec() -> impl IntoResponse {
    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, "text/yaml")],
        OPENAPI_SPEC,
    )
}

/// Serves the Swagger UI HTML page.
///
/// The page embeds Swagger UI from a CDN and points it at `serve_openapi_spec`.
async fn serve_swagger_ui() -> impl IntoResponse {
    let html = r#"
<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <title>Portfolio API - Swagger UI</title>
    <link rel="stylesheet" type="text/css" href="https://unpkg.com/swagger-ui-dist@5/swagger-ui.css">
    <style>
        body { margin: 0; padding: 0; }
    </style>
</head>
<body>
    <div id="swagger-ui"></div>
    <script src="https://unpkg.com/swagger-ui-dist@5/swagger-ui-bundle.js"></script>
    <script src="https://unpkg.com/swagger-ui-dist@5/swagger-ui-standalone-preset.js"></script>
    <script>
        window.onload = function() {
            window.ui = SwaggerUIBundle({
                url: "/api-docs/openapi.yml",
                dom_id: '#swagger-ui',
                deepLinking: true,
                presets: [
                    SwaggerUIBundle.presets.apis,
                    SwaggerUIStandalonePreset
                ],
                layout: "StandaloneLayout"
            });
        };
    </script>
</body>
</html>
"#;
    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, "text/html; charset=utf-8")],
        html,
    )
}

/// CORS for the configured frontend origins only.
pub fn cors_layer(origins: &[String]) -> CorsLayer {
    let allowed: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin) {
            Ok(value) => Some(value),
            Err(e) => {
                tracing::warn!("Skipping unusable CORS origin {}: {}", origin, e);
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(allowed))
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE])
}

/// Builds the application router with every route and edge layer except
/// rate limiting, which needs the peer address and is added in `main`.
pub fn build_router(state: Arc<AppState>) -> Router {
    let api_routes = Router::new()
        .route("/api/chat", post(handlers::chat))
        .route("/api/codeforces/:handle", get(handlers::codeforces))
        .route(
            "/api/codeforces/:handle/history",
            get(handlers::codeforces_history),
        )
        .route("/api/leetcode", post(handlers::leetcode))
        .route("/api/codechef/:handle", get(handlers::codechef))
        .route("/api/profile", get(handlers::profile))
        .layer(middleware::from_fn_with_state(state.clone(), origin_guard))
        // Enforced by the `Json` extractor, so oversized bodies still get a JSON 413
        .layer(DefaultBodyLimit::max(MAX_BODY_BYTES));

    let cors = cors_layer(&state.config.allowed_origins);

    Router::new()
        .route("/health", get(handlers::health))
        // API Documentation
        .route("/docs", get(serve_swagger_ui))
        .route("/api-docs/openapi.yml", get(serve_openapi_spec))
        .merge(api_routes)
        .method_not_allowed_fallback(handlers::method_not_allowed)
        .fallback(handlers::not_found)
        .with_state(state)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
}
