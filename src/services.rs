use crate::adapters;
use crate::config::Config;
use crate::errors::{AppError, ResultExt};
use crate::models::{CodeChefStats, CodeforcesRatingChange, LeetCodeStats};
use crate::retry::{retry_fetch, RetryPolicy};
use reqwest::Client;
use serde_json::Value;
use std::time::Duration;

/// Builds the HTTP client shared by the stats services.
///
/// Every attempt is bounded by the configured upstream timeout; a timed-out
/// attempt counts as a failed attempt for retry purposes.
pub fn upstream_client(config: &Config) -> Result<Client, AppError> {
    Client::builder()
        .timeout(config.upstream_timeout())
        .user_agent(concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")))
        .build()
        .map_err(|e| AppError::InternalError(format!("Failed to create upstream client: {}", e)))
}

fn retry_policy(config: &Config) -> RetryPolicy {
    RetryPolicy::new(
        config.stats_max_retries,
        Duration::from_millis(config.stats_retry_base_delay_ms),
    )
}

/// Upstream error bodies are echoed to clients; keep them short.
const MAX_ERROR_BODY_CHARS: usize = 200;

/// Collapses whitespace and truncates a non-JSON error body (HTML error pages and the like).
fn summarize_body(body: &str) -> String {
    let collapsed = body.split_whitespace().collect::<Vec<_>>().join(" ");
    if collapsed.chars().count() <= MAX_ERROR_BODY_CHARS {
        return collapsed;
    }
    let mut summary: String = collapsed.chars().take(MAX_ERROR_BODY_CHARS).collect();
    summary.push_str("...");
    summary
}

/// GETs `url` and parses the body as JSON.
///
/// Providers report failures inside JSON bodies (Codeforces answers 400 with
/// `{"status":"FAILED","comment":...}`), so a JSON body is returned whatever
/// the status code and left to the adapter to judge. Non-JSON error bodies
/// become `ExternalApiError`.
async fn fetch_json(client: &Client, provider: &str, url: &str) -> Result<Value, AppError> {
    let response = client
        .get(url)
        .send()
        .await
        .map_err(AppError::from)
        .context(format!("{} request", provider))?;

    let status = response.status();
    let body = response
        .text()
        .await
        .map_err(AppError::from)
        .context(format!("{} response", provider))?;

    match serde_json::from_str::<Value>(&body) {
        Ok(payload) => {
            if !status.is_success() {
                tracing::warn!("{} answered {} with a JSON body", provider, status);
            }
            Ok(payload)
        }
        Err(_) if !status.is_success() => {
            tracing::error!("{} returned error {}: {}", provider, status, body);
            Err(AppError::ExternalApiError(format!(
                "{} returned status {}: {}",
                provider,
                status,
                summarize_body(&body)
            )))
        }
        Err(e) => Err(AppError::ExternalApiError(format!(
            "Failed to parse {} response: {}",
            provider, e
        ))),
    }
}

/// Client for the official Codeforces API.
#[derive(Clone)]
pub struct CodeforcesService {
    client: Client,
    base_url: String,
    retry: RetryPolicy,
}

impl CodeforcesService {
    pub fn new(config: &Config, client: Client) -> Self {
        Self {
            client,
            base_url: config.codeforces_base_url.clone(),
            retry: retry_policy(config),
        }
    }

    fn rating_url(&self, handle: &str) -> Result<reqwest::Url, AppError> {
        // Build URL with proper parameter encoding
        reqwest::Url::parse_with_params(
            &format!("{}/user.rating", self.base_url),
            &[("handle", handle)],
        )
        .map_err(|e| AppError::InternalError(format!("Failed to build Codeforces URL: {}", e)))
    }

    /// Fetches the `user.rating` payload for `handle`, retried until its
    /// status is `OK`. The payload is returned exactly as received.
    pub async fn fetch_rating_payload(&self, handle: &str) -> Result<Value, AppError> {
        let url = self.rating_url(handle)?;
        tracing::info!("Fetching Codeforces rating history for: {}", handle);

        let client = &self.client;
        let url = url.as_str();
        retry_fetch(&self.retry, move || async move {
            let payload = fetch_json(client, "Codeforces", url).await?;
            adapters::codeforces_history(&payload)?;
            Ok(payload)
        })
        .await
    }

    /// Fetches the rating history for `handle` as typed entries, in upstream order.
    pub async fn fetch_rating_changes(
        &self,
        handle: &str,
    ) -> Result<Vec<CodeforcesRatingChange>, AppError> {
        let url = self.rating_url(handle)?;
        tracing::info!("Fetching Codeforces rating changes for: {}", handle);

        let client = &self.client;
        let url = url.as_str();
        let changes = retry_fetch(&self.retry, move || async move {
            let payload = fetch_json(client, "Codeforces", url).await?;
            adapters::codeforces_rating_changes(&payload)
        })
        .await?;

        tracing::info!("Codeforces: {} rating changes for {}", changes.len(), handle);
        Ok(changes)
    }
}

/// Client for the community LeetCode stats API.
#[derive(Clone)]
pub struct LeetCodeService {
    client: Client,
    base_url: String,
    retry: RetryPolicy,
}

impl LeetCodeService {
    pub fn new(config: &Config, client: Client) -> Self {
        Self {
            client,
            base_url: config.leetcode_base_url.clone(),
            retry: retry_policy(config),
        }
    }

    /// Fetches and normalizes the statistics of `username`.
    pub async fn fetch_stats(&self, username: &str) -> Result<LeetCodeStats, AppError> {
        let url = format!("{}/{}", self.base_url, username);
        tracing::info!("Fetching LeetCode stats for: {}", username);

        let client = &self.client;
        let url = url.as_str();
        let stats = retry_fetch(&self.retry, move || async move {
            let payload = fetch_json(client, "LeetCode", url).await?;
            adapters::leetcode_stats(&payload)
        })
        .await?;

        tracing::info!(
            "LeetCode: {} solved ({} easy / {} medium / {} hard) for {}",
            stats.total_solved,
            stats.easy_solved,
            stats.medium_solved,
            stats.hard_solved,
            username
        );
        Ok(stats)
    }
}

/// Client for the CodeChef profile proxy.
#[derive(Clone)]
pub struct CodeChefService {
    client: Client,
    base_url: String,
    retry: RetryPolicy,
}

impl CodeChefService {
    pub fn new(config: &Config, client: Client) -> Self {
        Self {
            client,
            base_url: config.codechef_base_url.clone(),
            retry: retry_policy(config),
        }
    }

    /// Fetches and normalizes the profile of `handle`.
    pub async fn fetch_stats(&self, handle: &str) -> Result<CodeChefStats, AppError> {
        let url = format!("{}/user/codechef/{}", self.base_url, handle);
        tracing::info!("Fetching CodeChef profile for: {}", handle);

        let client = &self.client;
        let url = url.as_str();
        let stats = retry_fetch(&self.retry, move || async move {
            let payload = fetch_json(client, "CodeChef", url).await?;
            tracing::debug!("CodeChef API response: {}", payload);
            adapters::codechef_stats(&payload, handle)
        })
        .await?;

        tracing::info!(
            "CodeChef: rating {} (max {}) for {}",
            stats.current_rating,
            stats.highest_rating,
            handle
        );
        Ok(stats)
    }
}
