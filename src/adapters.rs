//! Provider adapters: pure transforms from raw upstream JSON to the
//! normalized stats shapes.
//!
//! Every adapter either returns a complete, consistent value or an
//! `AppError::ExternalApiError` carrying the message the stats endpoints
//! surface. Nothing here performs I/O; the services in `crate::services`
//! fetch the payloads and feed them through these functions inside the
//! retry loop.
use crate::errors::AppError;
use crate::models::{CodeChefStats, CodeforcesRatingChange, LeetCodeStats};
use regex::Regex;
use serde_json::{json, Value};
use std::sync::OnceLock;

pub const LEETCODE_INVALID_RESPONSE: &str = "Invalid LeetCode API response.";
pub const CODECHEF_INVALID_RESPONSE: &str = "Invalid handle or data missing.";

/// Longest handle/username accepted before anything is sent upstream.
pub const MAX_IDENTIFIER_LEN: usize = 64;

fn identifier_regex() -> &'static Regex {
    static IDENTIFIER: OnceLock<Regex> = OnceLock::new();
    IDENTIFIER.get_or_init(|| Regex::new(r"^[A-Za-z0-9_.\-]+$").unwrap())
}

/// Validates a provider handle/username before it is interpolated into an upstream URL.
///
/// Returns the trimmed identifier, or a `BadRequest` naming `label`.
pub fn normalize_identifier(label: &str, raw: Option<&str>) -> Result<String, AppError> {
    let trimmed = raw.map(str::trim).unwrap_or_default();
    if trimmed.is_empty() {
        return Err(AppError::BadRequest(format!("{} is required", label)));
    }
    // Dot-only identifiers would be resolved as path segments upstream.
    if trimmed.len() > MAX_IDENTIFIER_LEN
        || !identifier_regex().is_match(trimmed)
        || !trimmed.chars().any(|c| c.is_ascii_alphanumeric())
    {
        tracing::warn!("Rejected malformed {}: {:?}", label.to_lowercase(), trimmed);
        return Err(AppError::BadRequest(format!("{} is invalid", label)));
    }
    Ok(trimmed.to_string())
}

// ============ Codeforces ============

/// Extracts the rating history from a Codeforces `user.rating` payload.
///
/// Succeeds only when `status == "OK"`; the `result` array is returned
/// untouched, in upstream order.
pub fn codeforces_history(payload: &Value) -> Result<Vec<Value>, AppError> {
    if payload.get("status").and_then(Value::as_str) != Some("OK") {
        let comment = payload
            .get("comment")
            .and_then(Value::as_str)
            .unwrap_or("no comment from upstream");
        return Err(AppError::ExternalApiError(format!(
            "Codeforces API call failed with status: {}",
            comment
        )));
    }

    match payload.get("result") {
        Some(Value::Array(entries)) => Ok(entries.clone()),
        _ => Err(AppError::ExternalApiError(
            "Codeforces API returned a malformed result".to_string(),
        )),
    }
}

/// Typed view of [`codeforces_history`].
pub fn codeforces_rating_changes(payload: &Value) -> Result<Vec<CodeforcesRatingChange>, AppError> {
    codeforces_history(payload)?
        .into_iter()
        .map(|entry| {
            serde_json::from_value(entry).map_err(|e| {
                AppError::ExternalApiError(format!("Malformed Codeforces rating entry: {}", e))
            })
        })
        .collect()
}

// ============ LeetCode ============

/// Reads a non-negative integer counter. Missing or null yields 0; anything
/// that is not a non-negative integer is `None`.
fn counter(payload: &Value, key: &str) -> Option<u64> {
    match payload.get(key) {
        None | Some(Value::Null) => Some(0),
        Some(value) => as_non_negative_integer(value),
    }
}

fn as_non_negative_integer(value: &Value) -> Option<u64> {
    if let Some(n) = value.as_u64() {
        return Some(n);
    }
    match value.as_f64() {
        Some(f) if f >= 0.0 && f.fract() == 0.0 && f <= u64::MAX as f64 => Some(f as u64),
        _ => None,
    }
}

/// Normalizes a payload from the community LeetCode stats API.
pub fn leetcode_stats(payload: &Value) -> Result<LeetCodeStats, AppError> {
    let invalid = || AppError::ExternalApiError(LEETCODE_INVALID_RESPONSE.to_string());

    if payload.get("status").and_then(Value::as_str) != Some("success") {
        return Err(invalid());
    }
    if matches!(payload.get("totalSolved"), None | Some(Value::Null)) {
        return Err(invalid());
    }

    let count = |key: &str| counter(payload, key).ok_or_else(invalid);

    let acceptance_rate = match payload.get("acceptanceRate") {
        None | Some(Value::Null) => 0.0,
        Some(value) => value.as_f64().ok_or_else(invalid)?,
    };

    Ok(LeetCodeStats {
        total_solved: count("totalSolved")?,
        total_questions: count("totalQuestions")?,
        easy_solved: count("easySolved")?,
        total_easy: count("totalEasy")?,
        medium_solved: count("mediumSolved")?,
        total_medium: count("totalMedium")?,
        hard_solved: count("hardSolved")?,
        total_hard: count("totalHard")?,
        acceptance_rate,
        ranking: count("ranking")?,
        contribution_points: count("contributionPoints")?,
        reputation: count("reputation")?,
        submission_calendar: passthrough(payload, "submissionCalendar", json!({})),
        contests: passthrough(payload, "contests", json!([])),
        contest_ranking: payload
            .get("contestRanking")
            .filter(|value| !value.is_null())
            .cloned(),
    })
}

fn passthrough(payload: &Value, key: &str, default: Value) -> Value {
    match payload.get(key) {
        None | Some(Value::Null) => default,
        Some(value) => value.clone(),
    }
}

// ============ CodeChef ============

/// Checks that a CodeChef payload belongs to `handle` and carries a rating.
///
/// The username comparison ignores case.
pub fn validate_codechef(payload: &Value, handle: &str) -> bool {
    let username_matches = payload
        .get("username")
        .and_then(Value::as_str)
        .is_some_and(|username| username.to_lowercase() == handle.to_lowercase());

    let has_rating = payload
        .get("rating_number")
        .and_then(as_non_negative_integer)
        .is_some_and(|rating| rating > 0);

    username_matches && has_rating
}

/// Ranks arrive as numbers or numeric strings depending on the proxy version.
fn lenient_count(value: Option<&Value>) -> Option<u64> {
    match value? {
        Value::String(s) => s.trim().replace(',', "").parse().ok(),
        other => as_non_negative_integer(other),
    }
}

/// Normalizes a CodeChef proxy payload for `handle`.
pub fn codechef_stats(payload: &Value, handle: &str) -> Result<CodeChefStats, AppError> {
    if !validate_codechef(payload, handle) {
        return Err(AppError::ExternalApiError(
            CODECHEF_INVALID_RESPONSE.to_string(),
        ));
    }

    let current_rating = lenient_count(payload.get("rating_number")).unwrap_or_default();
    let highest_rating = lenient_count(payload.get("max_rank"))
        .filter(|&max| max > 0)
        .unwrap_or(current_rating);

    let stars = match payload.get("rating") {
        Some(Value::String(s)) => s.clone(),
        Some(Value::Number(n)) => n.to_string(),
        _ => String::new(),
    };

    Ok(CodeChefStats {
        current_rating,
        highest_rating,
        stars,
        global_rank: lenient_count(payload.get("global_rank")).unwrap_or_default(),
        country_rank: lenient_count(payload.get("country_rank")).unwrap_or_default(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_identifier() {
        assert_eq!(
            normalize_identifier("Handle", Some("  tourist ")).unwrap(),
            "tourist"
        );
        assert!(matches!(
            normalize_identifier("Handle", Some("   ")),
            Err(AppError::BadRequest(msg)) if msg == "Handle is required"
        ));
        assert!(matches!(
            normalize_identifier("Username", None),
            Err(AppError::BadRequest(msg)) if msg == "Username is required"
        ));
        assert!(normalize_identifier("Handle", Some("../admin")).is_err());
        assert!(normalize_identifier("Handle", Some("a?b=c")).is_err());
        assert!(normalize_identifier("Handle", Some(&"x".repeat(65))).is_err());
        for dots in [".", "..", "...", " .. "] {
            assert!(matches!(
                normalize_identifier("Username", Some(dots)),
                Err(AppError::BadRequest(msg)) if msg == "Username is invalid"
            ));
        }
        assert_eq!(normalize_identifier("Handle", Some("a.b")).unwrap(), "a.b");
        assert_eq!(normalize_identifier("Handle", Some("_1")).unwrap(), "_1");
    }

    #[test]
    fn test_codeforces_ok_returns_result_unchanged() {
        let result = json!([
            {"contestId": 2, "contestName": "B", "newRating": 1500},
            {"contestId": 1, "contestName": "A", "newRating": 1400}
        ]);
        let payload = json!({"status": "OK", "result": result.clone()});

        let history = codeforces_history(&payload).unwrap();
        assert_eq!(Value::Array(history), result);
    }

    #[test]
    fn test_codeforces_failure_uses_comment() {
        let payload = json!({"status": "FAILED", "comment": "handle: User with handle nobody not found"});
        let err = codeforces_history(&payload).unwrap_err();
        assert_eq!(
            err.to_string(),
            "Codeforces API call failed with status: handle: User with handle nobody not found"
        );
    }

    #[test]
    fn test_codeforces_ok_without_array_is_rejected() {
        assert!(codeforces_history(&json!({"status": "OK"})).is_err());
        assert!(codeforces_history(&json!({"status": "OK", "result": {}})).is_err());
    }

    #[test]
    fn test_codeforces_typed_view() {
        let payload = json!({"status": "OK", "result": [{
            "contestId": 1900,
            "contestName": "Codeforces Round 911 (Div. 2)",
            "handle": "someone",
            "rank": 1200,
            "ratingUpdateTimeSeconds": 1701020100,
            "oldRating": 0,
            "newRating": 1380
        }]});
        let changes = codeforces_rating_changes(&payload).unwrap();
        assert_eq!(changes.len(), 1);
        assert_eq!(changes[0].contest_name, "Codeforces Round 911 (Div. 2)");
        assert_eq!(changes[0].new_rating, 1380);

        let broken = json!({"status": "OK", "result": [{"contestName": "no rating"}]});
        assert!(codeforces_rating_changes(&broken).is_err());
    }

    #[test]
    fn test_leetcode_full_payload() {
        let payload = json!({
            "status": "success",
            "message": "retrieved",
            "totalSolved": 412,
            "totalQuestions": 3300,
            "easySolved": 150,
            "totalEasy": 830,
            "mediumSolved": 220,
            "totalMedium": 1730,
            "hardSolved": 42,
            "totalHard": 740,
            "acceptanceRate": 61.5,
            "ranking": 98000,
            "contributionPoints": 120,
            "reputation": 3,
            "submissionCalendar": {"1700000000": 4, "1700086400": 1}
        });

        let stats = leetcode_stats(&payload).unwrap();
        assert_eq!(stats.total_solved, 412);
        assert_eq!(stats.easy_solved, 150);
        assert_eq!(stats.medium_solved, 220);
        assert_eq!(stats.hard_solved, 42);
        assert_eq!(stats.acceptance_rate, 61.5);
        assert_eq!(stats.ranking, 98000);
        assert_eq!(
            stats.submission_calendar,
            json!({"1700000000": 4, "1700086400": 1})
        );
        assert_eq!(stats.contests, json!([]));
        assert!(stats.contest_ranking.is_none());
    }

    #[test]
    fn test_leetcode_defaults_missing_counters() {
        let payload = json!({"status": "success", "totalSolved": 7, "ranking": null});
        let stats = leetcode_stats(&payload).unwrap();
        assert_eq!(stats.total_solved, 7);
        assert_eq!(stats.easy_solved, 0);
        assert_eq!(stats.medium_solved, 0);
        assert_eq!(stats.hard_solved, 0);
        assert_eq!(stats.ranking, 0);
        assert_eq!(stats.contribution_points, 0);
        assert_eq!(stats.reputation, 0);
        assert_eq!(stats.acceptance_rate, 0.0);
        assert_eq!(stats.submission_calendar, json!({}));
        assert_eq!(stats.contests, json!([]));
    }

    #[test]
    fn test_leetcode_missing_total_solved_fails() {
        let payload = json!({"status": "success", "easySolved": 10});
        let err = leetcode_stats(&payload).unwrap_err();
        assert_eq!(err.to_string(), LEETCODE_INVALID_RESPONSE);
    }

    #[test]
    fn test_leetcode_error_status_fails() {
        let payload = json!({"status": "error", "message": "user does not exist", "totalSolved": 0});
        assert!(leetcode_stats(&payload).is_err());
    }

    #[test]
    fn test_leetcode_malformed_counter_is_rejected() {
        let payload = json!({"status": "success", "totalSolved": 3, "hardSolved": -1});
        assert!(leetcode_stats(&payload).is_err());

        let payload = json!({"status": "success", "totalSolved": "many"});
        assert!(leetcode_stats(&payload).is_err());
    }

    #[test]
    fn test_leetcode_passes_contests_verbatim() {
        let contests = json!([{"contestName": "Weekly Contest 400", "rating": 1879.2}]);
        let payload = json!({
            "status": "success",
            "totalSolved": 1,
            "contests": contests.clone(),
            "contestRanking": {"rating": 1879.2, "topPercentage": 9.8}
        });
        let stats = leetcode_stats(&payload).unwrap();
        assert_eq!(stats.contests, contests);
        assert_eq!(
            stats.contest_ranking,
            Some(json!({"rating": 1879.2, "topPercentage": 9.8}))
        );
    }

    #[test]
    fn test_codechef_case_insensitive_username() {
        let payload = json!({
            "username": "RiddhiJainSDE",
            "rating_number": 1742,
            "max_rank": 1801,
            "rating": "3★",
            "global_rank": 12345,
            "country_rank": "9876"
        });

        assert!(validate_codechef(&payload, "riddhijainsde"));
        let stats = codechef_stats(&payload, "riddhijainsde").unwrap();
        assert_eq!(
            stats,
            CodeChefStats {
                current_rating: 1742,
                highest_rating: 1801,
                stars: "3★".to_string(),
                global_rank: 12345,
                country_rank: 9876,
            }
        );
    }

    #[test]
    fn test_codechef_missing_rating_fails() {
        let payload = json!({
            "username": "someone",
            "max_rank": 1801,
            "rating": "3★",
            "global_rank": 12345,
            "country_rank": 9876
        });
        assert!(!validate_codechef(&payload, "someone"));
        let err = codechef_stats(&payload, "someone").unwrap_err();
        assert_eq!(err.to_string(), CODECHEF_INVALID_RESPONSE);
    }

    #[test]
    fn test_codechef_other_username_fails() {
        let payload = json!({"username": "someone_else", "rating_number": 1500});
        assert!(!validate_codechef(&payload, "someone"));
        assert!(!validate_codechef(&json!(null), "someone"));
    }

    #[test]
    fn test_codechef_highest_defaults_to_current() {
        let payload = json!({"username": "someone", "rating_number": 1500, "global_rank": "Inactive"});
        let stats = codechef_stats(&payload, "someone").unwrap();
        assert_eq!(stats.highest_rating, 1500);
        assert_eq!(stats.global_rank, 0);
        assert_eq!(stats.country_rank, 0);
        assert_eq!(stats.stars, "");
    }

    #[test]
    fn test_codechef_zero_max_rank_falls_back_to_current() {
        let payload = json!({"username": "someone", "rating_number": 1500, "max_rank": 0});
        let stats = codechef_stats(&payload, "someone").unwrap();
        assert_eq!(stats.current_rating, 1500);
        assert_eq!(stats.highest_rating, 1500);
    }

    #[test]
    fn test_codechef_zero_rating_is_missing() {
        let payload = json!({"username": "someone", "rating_number": 0, "max_rank": 1600});
        assert!(!validate_codechef(&payload, "someone"));
        let err = codechef_stats(&payload, "someone").unwrap_err();
        assert_eq!(err.to_string(), CODECHEF_INVALID_RESPONSE);
    }
}
