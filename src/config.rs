use serde::Deserialize;
use std::time::Duration;

pub const DEFAULT_GEMINI_MODEL: &str = "gemini-2.5-flash";
pub const DEFAULT_GEMINI_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";
pub const DEFAULT_CODEFORCES_BASE_URL: &str = "https://codeforces.com/api";
pub const DEFAULT_LEETCODE_BASE_URL: &str = "https://leetcode-stats-api.herokuapp.com";
pub const DEFAULT_CODECHEF_BASE_URL: &str = "https://competeapi.vercel.app";
pub const DEFAULT_ALLOWED_ORIGIN: &str = "http://localhost:5173";

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub port: u16,
    pub gemini_api_key: String,
    pub gemini_model: String,
    pub gemini_base_url: String,
    pub allowed_origins: Vec<String>,
    pub codeforces_base_url: String,
    pub leetcode_base_url: String,
    pub codechef_base_url: String,
    pub upstream_timeout_secs: u64,
    pub stats_max_retries: u32,
    pub stats_retry_base_delay_ms: u64,
    pub profile_data_path: Option<String>,
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();

        let config = Self {
            gemini_api_key: std::env::var("GEMINI_API_KEY")
                .map_err(|_| anyhow::anyhow!("GEMINI_API_KEY is missing from the environment"))
                .and_then(|key| {
                    if key.trim().is_empty() {
                        anyhow::bail!("GEMINI_API_KEY cannot be empty");
                    }
                    Ok(key)
                })?,
            gemini_model: std::env::var("GEMINI_MODEL")
                .ok()
                .filter(|s| !s.trim().is_empty())
                .unwrap_or_else(|| DEFAULT_GEMINI_MODEL.to_string()),
            gemini_base_url: base_url_var("GEMINI_BASE_URL", DEFAULT_GEMINI_BASE_URL)?,
            port: std::env::var("PORT")
                .unwrap_or_else(|_| "5000".to_string())
                .parse()
                .map_err(|_| anyhow::anyhow!("PORT must be a valid number between 1-65535"))?,
            allowed_origins: std::env::var("ALLOWED_ORIGINS")
                .ok()
                .filter(|s| !s.trim().is_empty())
                .map(|raw| parse_origins(&raw))
                .unwrap_or_else(|| Ok(vec![DEFAULT_ALLOWED_ORIGIN.to_string()]))?,
            codeforces_base_url: base_url_var("CODEFORCES_BASE_URL", DEFAULT_CODEFORCES_BASE_URL)?,
            leetcode_base_url: base_url_var("LEETCODE_BASE_URL", DEFAULT_LEETCODE_BASE_URL)?,
            codechef_base_url: base_url_var("CODECHEF_BASE_URL", DEFAULT_CODECHEF_BASE_URL)?,
            upstream_timeout_secs: std::env::var("UPSTREAM_TIMEOUT_SECS")
                .unwrap_or_else(|_| "10".to_string())
                .parse()
                .map_err(|_| anyhow::anyhow!("UPSTREAM_TIMEOUT_SECS must be a positive integer"))
                .and_then(|secs: u64| {
                    if secs == 0 {
                        anyhow::bail!("UPSTREAM_TIMEOUT_SECS must be greater than zero");
                    }
                    Ok(secs)
                })?,
            stats_max_retries: std::env::var("STATS_MAX_RETRIES")
                .unwrap_or_else(|_| "3".to_string())
                .parse()
                .map_err(|_| anyhow::anyhow!("STATS_MAX_RETRIES must be a positive integer"))
                .and_then(|retries: u32| {
                    if retries == 0 {
                        anyhow::bail!("STATS_MAX_RETRIES must be at least 1");
                    }
                    Ok(retries)
                })?,
            stats_retry_base_delay_ms: std::env::var("STATS_RETRY_BASE_DELAY_MS")
                .unwrap_or_else(|_| "1000".to_string())
                .parse()
                .map_err(|_| {
                    anyhow::anyhow!("STATS_RETRY_BASE_DELAY_MS must be a non-negative integer")
                })?,
            profile_data_path: std::env::var("PROFILE_DATA_PATH")
                .ok()
                .filter(|s| !s.trim().is_empty()),
        };

        // Log successful configuration load (without sensitive values)
        tracing::info!("Configuration loaded successfully");
        tracing::debug!("Gemini model: {}", config.gemini_model);
        tracing::debug!("Gemini base URL: {}", config.gemini_base_url);
        tracing::debug!("Allowed origins: {:?}", config.allowed_origins);
        tracing::debug!(
            "Stats upstreams: codeforces={} leetcode={} codechef={}",
            config.codeforces_base_url,
            config.leetcode_base_url,
            config.codechef_base_url
        );
        tracing::debug!(
            "Upstream timeout: {}s, retries: {}, base delay: {}ms",
            config.upstream_timeout_secs,
            config.stats_max_retries,
            config.stats_retry_base_delay_ms
        );
        if let Some(ref path) = config.profile_data_path {
            tracing::info!("Profile data override: {}", path);
        }
        tracing::debug!("Server Port: {}", config.port);

        Ok(config)
    }

    /// A configuration with every default filled in, for tests and tooling.
    pub fn with_api_key(gemini_api_key: impl Into<String>) -> Self {
        Self {
            port: 5000,
            gemini_api_key: gemini_api_key.into(),
            gemini_model: DEFAULT_GEMINI_MODEL.to_string(),
            gemini_base_url: DEFAULT_GEMINI_BASE_URL.to_string(),
            allowed_origins: vec![DEFAULT_ALLOWED_ORIGIN.to_string()],
            codeforces_base_url: DEFAULT_CODEFORCES_BASE_URL.to_string(),
            leetcode_base_url: DEFAULT_LEETCODE_BASE_URL.to_string(),
            codechef_base_url: DEFAULT_CODECHEF_BASE_URL.to_string(),
            upstream_timeout_secs: 10,
            stats_max_retries: 3,
            stats_retry_base_delay_ms: 1000,
            profile_data_path: None,
        }
    }

    pub fn upstream_timeout(&self) -> Duration {
        Duration::from_secs(self.upstream_timeout_secs)
    }

    pub fn is_origin_allowed(&self, origin: &str) -> bool {
        let origin = origin.trim_end_matches('/');
        self.allowed_origins.iter().any(|allowed| allowed == origin)
    }
}

fn base_url_var(name: &str, default: &str) -> anyhow::Result<String> {
    let url = std::env::var(name)
        .ok()
        .filter(|s| !s.trim().is_empty())
        .unwrap_or_else(|| default.to_string());
    if !url.starts_with("http://") && !url.starts_with("https://") {
        anyhow::bail!("{} must start with http:// or https://", name);
    }
    url::Url::parse(&url).map_err(|e| anyhow::anyhow!("{} is not a valid URL: {}", name, e))?;
    Ok(url.trim_end_matches('/').to_string())
}

/// Parses a comma-separated origin allow-list into normalized `scheme://host[:port]` strings.
pub fn parse_origins(raw: &str) -> anyhow::Result<Vec<String>> {
    let mut origins = Vec::new();
    for entry in raw.split(',').map(str::trim).filter(|s| !s.is_empty()) {
        let parsed = url::Url::parse(entry)
            .map_err(|e| anyhow::anyhow!("Invalid origin '{}' in ALLOWED_ORIGINS: {}", entry, e))?;
        if parsed.scheme() != "http" && parsed.scheme() != "https" {
            anyhow::bail!("Origin '{}' must use http or https", entry);
        }
        origins.push(parsed.origin().ascii_serialization());
    }
    if origins.is_empty() {
        anyhow::bail!("ALLOWED_ORIGINS must list at least one origin");
    }
    Ok(origins)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_origins_normalizes() {
        let origins =
            parse_origins("http://localhost:5173/, https://portfolio.example.com").unwrap();
        assert_eq!(
            origins,
            vec![
                "http://localhost:5173".to_string(),
                "https://portfolio.example.com".to_string()
            ]
        );
    }

    #[test]
    fn test_parse_origins_rejects_garbage() {
        assert!(parse_origins("not a url").is_err());
        assert!(parse_origins("ftp://files.example.com").is_err());
        assert!(parse_origins(" , ").is_err());
    }

    #[test]
    fn test_origin_allowed() {
        let config = Config::with_api_key("key");
        assert!(config.is_origin_allowed("http://localhost:5173"));
        assert!(!config.is_origin_allowed("http://evil.example.com"));
    }
}
