use axum::Router;
use portfolio_api::config::Config;
use portfolio_api::handlers::AppState;
use portfolio_api::profile::Profile;
use portfolio_api::routes::build_router;
use std::net::SocketAddr;
use std::sync::Arc;
use tower_governor::{
    governor::GovernorConfigBuilder, key_extractor::SmartIpKeyExtractor, GovernorLayer,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Main entry point for the application.
///
/// This function initializes the application, including:
/// - Logging and tracing.
/// - Configuration loading (a missing `GEMINI_API_KEY` aborts startup).
/// - The static profile dataset.
/// - Gemini and stats provider clients.
/// - HTTP routes and middleware (CORS, origin guard, rate limiting).
///
/// It then starts the Axum server.
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "portfolio_api=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration
    let config = match Config::from_env() {
        Ok(config) => config,
        Err(e) => {
            tracing::error!("Startup aborted: {}", e);
            return Err(e);
        }
    };

    let profile = Profile::load(config.profile_data_path.as_deref())?;
    tracing::info!("Profile data loaded for {}", profile.user.name);

    let port = config.port;
    let app_state = Arc::new(AppState::new(config, profile)?);
    tracing::info!(
        "✓ Gemini client initialized (model: {})",
        app_state.config.gemini_model
    );

    // Configure rate limiter: 10 requests/second per IP, burst of 20
    let governor_conf = Arc::new(
        GovernorConfigBuilder::default()
            .per_second(10)
            .burst_size(20)
            .key_extractor(SmartIpKeyExtractor)
            .finish()
            .ok_or_else(|| anyhow::anyhow!("Invalid rate limiter configuration"))?,
    );

    let app: Router = build_router(app_state).layer(GovernorLayer {
        config: governor_conf,
    });

    // Start server
    let addr = format!("0.0.0.0:{}", port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("✅ Server listening on {}", addr);

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await?;

    Ok(())
}
