use chrono::{DateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

// ============ Request Models ============

/// Body of `POST /api/chat`.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ChatRequest {
    /// Free-text question about the profile.
    #[serde(default)]
    pub prompt: Option<String>,
}

/// Body of `POST /api/leetcode`.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LeetCodeRequest {
    /// LeetCode username.
    #[serde(default)]
    pub username: Option<String>,
}

// ============ Response Models ============

/// Reply of `POST /api/chat`.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ChatResponse {
    pub reply: String,
}

/// Body returned on every failure path.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ErrorBody {
    pub error: String,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub service: String,
    pub version: String,
    pub timestamp: DateTime<Utc>,
}

// ============ Normalized Stats ============

/// Normalized LeetCode statistics.
///
/// Counters default to 0 when the upstream omits them. `submissionCalendar`
/// and `contests` are passed through exactly as the upstream sent them.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LeetCodeStats {
    pub total_solved: u64,
    pub total_questions: u64,
    pub easy_solved: u64,
    pub total_easy: u64,
    pub medium_solved: u64,
    pub total_medium: u64,
    pub hard_solved: u64,
    pub total_hard: u64,
    pub acceptance_rate: f64,
    pub ranking: u64,
    pub contribution_points: u64,
    pub reputation: u64,
    /// Day (epoch seconds, as a string key) to submission count.
    pub submission_calendar: Value,
    pub contests: Value,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub contest_ranking: Option<Value>,
}

/// Normalized CodeChef profile.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CodeChefStats {
    pub current_rating: u64,
    pub highest_rating: u64,
    /// Star rating as displayed by CodeChef, e.g. `3★`.
    pub stars: String,
    pub global_rank: u64,
    pub country_rank: u64,
}

/// One entry of the Codeforces `user.rating` history.
///
/// Fields the service does not interpret are kept in `extra`, so the entry
/// serializes back to exactly what the upstream sent.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CodeforcesRatingChange {
    pub contest_id: u64,
    pub contest_name: String,
    pub handle: String,
    pub rank: u64,
    pub rating_update_time_seconds: i64,
    pub old_rating: i64,
    pub new_rating: i64,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl CodeforcesRatingChange {
    /// When the rating change was applied.
    pub fn rated_at(&self) -> Option<DateTime<Utc>> {
        Utc.timestamp_opt(self.rating_update_time_seconds, 0).single()
    }
}
