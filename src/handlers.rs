use crate::adapters::normalize_identifier;
use crate::chat::ChatService;
use crate::config::Config;
use crate::errors::{AppError, ResultExt};
use crate::gemini_client::GeminiClient;
use crate::models::*;
use crate::profile::Profile;
use crate::services::{upstream_client, CodeChefService, CodeforcesService, LeetCodeService};
use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    Json,
};
use serde_json::Value;
use std::sync::Arc;

/// Shared application state injected into handlers.
///
/// Everything in here is immutable after startup; requests share it without locking.
#[derive(Clone)]
pub struct AppState {
    /// Application configuration.
    pub config: Config,
    /// Static profile dataset (also the chat grounding source).
    pub profile: Arc<Profile>,
    /// Grounded chat over the profile.
    pub chat: ChatService,
    /// Codeforces rating history client.
    pub codeforces: CodeforcesService,
    /// LeetCode stats client.
    pub leetcode: LeetCodeService,
    /// CodeChef profile client.
    pub codechef: CodeChefService,
}

impl AppState {
    /// Builds the state: one Gemini client, one shared upstream client for the stats providers.
    pub fn new(config: Config, profile: Profile) -> Result<Self, AppError> {
        let gemini = GeminiClient::new(&config).context("Initializing Gemini client")?;
        let chat = ChatService::new(gemini, &profile);
        let stats_client =
            upstream_client(&config).context("Initializing stats upstream client")?;

        Ok(Self {
            codeforces: CodeforcesService::new(&config, stats_client.clone()),
            leetcode: LeetCodeService::new(&config, stats_client.clone()),
            codechef: CodeChefService::new(&config, stats_client),
            chat,
            profile: Arc::new(profile),
            config,
        })
    }
}

fn json_body<T>(payload: Result<Json<T>, JsonRejection>) -> Result<T, AppError> {
    payload.map(|Json(body)| body).map_err(|rejection| {
        if rejection.status() == StatusCode::PAYLOAD_TOO_LARGE {
            AppError::PayloadTooLarge("Request body is too large".to_string())
        } else {
            AppError::BadRequest(rejection.body_text())
        }
    })
}

/// Health check endpoint.
///
/// Returns the service status, version, and current server time.
pub async fn health() -> (StatusCode, Json<HealthResponse>) {
    (
        StatusCode::OK,
        Json(HealthResponse {
            status: "healthy".to_string(),
            service: env!("CARGO_PKG_NAME").to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
            timestamp: chrono::Utc::now(),
        }),
    )
}

/// POST /api/chat
///
/// Answers a question about the profile. Blank prompts are rejected before any
/// upstream call; every upstream failure is reported as a generic 500.
pub async fn chat(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<ChatRequest>, JsonRejection>,
) -> Result<Json<ChatResponse>, AppError> {
    let request = json_body(payload)?;
    let prompt = request.prompt.unwrap_or_default();
    tracing::info!("POST /api/chat - prompt length: {}", prompt.trim().len());

    match state.chat.answer(&prompt).await {
        Ok(reply) => Ok(Json(ChatResponse { reply })),
        Err(e @ AppError::BadRequest(_)) => Err(e),
        Err(e) => {
            tracing::error!("Server error calling Gemini API: {}", e);
            Err(AppError::InternalError(e.to_string()))
        }
    }
}

/// GET /api/codeforces/:handle
///
/// Forwards the Codeforces `user.rating` payload verbatim once its status is `OK`.
pub async fn codeforces(
    State(state): State<Arc<AppState>>,
    Path(handle): Path<String>,
) -> Result<Json<Value>, AppError> {
    tracing::info!("GET /api/codeforces/{}", handle);
    let handle = normalize_identifier("Handle", Some(&handle))?;

    let payload = state.codeforces.fetch_rating_payload(&handle).await?;
    Ok(Json(payload))
}

/// GET /api/codeforces/:handle/history
///
/// The rating history alone, in upstream order.
pub async fn codeforces_history(
    State(state): State<Arc<AppState>>,
    Path(handle): Path<String>,
) -> Result<Json<Vec<CodeforcesRatingChange>>, AppError> {
    tracing::info!("GET /api/codeforces/{}/history", handle);
    let handle = normalize_identifier("Handle", Some(&handle))?;

    let changes = state.codeforces.fetch_rating_changes(&handle).await?;
    Ok(Json(changes))
}

/// POST /api/leetcode
///
/// Normalized LeetCode statistics for `username`.
pub async fn leetcode(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<LeetCodeRequest>, JsonRejection>,
) -> Result<Json<LeetCodeStats>, AppError> {
    let request = json_body(payload)?;
    let username = normalize_identifier("Username", request.username.as_deref())?;
    tracing::info!("POST /api/leetcode - username: {}", username);

    let stats = state.leetcode.fetch_stats(&username).await?;
    Ok(Json(stats))
}

/// GET /api/codechef/:handle
///
/// Normalized CodeChef rating profile.
pub async fn codechef(
    State(state): State<Arc<AppState>>,
    Path(handle): Path<String>,
) -> Result<Json<CodeChefStats>, AppError> {
    tracing::info!("GET /api/codechef/{}", handle);
    let handle = normalize_identifier("Handle", Some(&handle))?;

    let stats = state.codechef.fetch_stats(&handle).await?;
    Ok(Json(stats))
}

/// GET /api/profile
///
/// The static profile dataset.
pub async fn profile(State(state): State<Arc<AppState>>) -> Json<Profile> {
    Json(state.profile.as_ref().clone())
}

/// JSON 404 for unknown routes.
pub async fn not_found() -> AppError {
    AppError::NotFound("No such route".to_string())
}

/// JSON 405 for known routes hit with the wrong method.
pub async fn method_not_allowed() -> AppError {
    AppError::MethodNotAllowed("Method not allowed".to_string())
}
