/// Property-based tests using proptest
/// Tests invariants and properties that should hold for all inputs
use portfolio_api::adapters::{
    codechef_stats, codeforces_history, leetcode_stats, normalize_identifier, validate_codechef,
    MAX_IDENTIFIER_LEN,
};
use portfolio_api::chat::extract_reply;
use portfolio_api::retry::RetryPolicy;
use proptest::prelude::*;
use serde_json::{json, Value};
use std::time::Duration;

/// Arbitrary JSON documents, a few levels deep.
fn arb_json() -> impl Strategy<Value = Value> {
    let leaf = prop_oneof![
        Just(Value::Null),
        any::<bool>().prop_map(Value::Bool),
        any::<i64>().prop_map(Value::from),
        any::<f64>().prop_map(Value::from),
        "\\PC{0,12}".prop_map(Value::String),
    ];
    leaf.prop_recursive(3, 32, 6, |inner| {
        prop_oneof![
            prop::collection::vec(inner.clone(), 0..6).prop_map(Value::Array),
            prop::collection::hash_map("[a-zA-Z_]{1,16}", inner, 0..6)
                .prop_map(|m| Value::Object(m.into_iter().collect())),
        ]
    })
}

// Property: Adapters should never panic on whatever an upstream sends
proptest! {
    #[test]
    fn adapters_never_panic(payload in arb_json(), handle in "[a-z]{1,10}") {
        let _ = codeforces_history(&payload);
        let _ = leetcode_stats(&payload);
        let _ = codechef_stats(&payload, &handle);
        let _ = extract_reply(&payload);
    }

    #[test]
    fn extract_reply_joins_every_part(parts in prop::collection::vec("[a-z]{1,8}", 1..5)) {
        let response = json!({
            "candidates": [{"content": {"parts": parts.iter().map(|t| json!({"text": t})).collect::<Vec<_>>()}}]
        });
        prop_assert_eq!(extract_reply(&response), parts.join(" "));
    }
}

// Property: CodeChef handle matching ignores case
proptest! {
    #[test]
    fn codechef_match_is_case_insensitive(
        handle in "[a-z0-9_]{1,20}",
        flips in prop::collection::vec(any::<bool>(), 20),
        rating in 1u64..4000
    ) {
        let recased: String = handle
            .chars()
            .zip(flips.iter())
            .map(|(c, &up)| if up { c.to_ascii_uppercase() } else { c })
            .collect();
        let payload = json!({"username": recased, "rating_number": rating});

        prop_assert!(validate_codechef(&payload, &handle));
        let stats = codechef_stats(&payload, &handle).unwrap();
        prop_assert_eq!(stats.current_rating, rating);
        prop_assert_eq!(stats.highest_rating, rating);
    }

    #[test]
    fn codechef_other_user_is_rejected(a in "[a-z]{3,10}", b in "[a-z]{3,10}") {
        prop_assume!(a != b);
        let payload = json!({"username": a, "rating_number": 1500});
        prop_assert!(!validate_codechef(&payload, &b));
    }
}

// Property: LeetCode counters survive normalization unchanged
proptest! {
    #[test]
    fn leetcode_counters_are_preserved(
        total in 0u64..5000,
        easy in 0u64..1000,
        medium in 0u64..2000,
        hard in 0u64..1000
    ) {
        let payload = json!({
            "status": "success",
            "totalSolved": total,
            "easySolved": easy,
            "mediumSolved": medium,
            "hardSolved": hard
        });
        let stats = leetcode_stats(&payload).unwrap();
        prop_assert_eq!(stats.total_solved, total);
        prop_assert_eq!(stats.easy_solved, easy);
        prop_assert_eq!(stats.medium_solved, medium);
        prop_assert_eq!(stats.hard_solved, hard);
    }
}

// Property: Identifier validation
proptest! {
    #[test]
    fn identifier_validation_never_panics(raw in "\\PC*") {
        let _ = normalize_identifier("Handle", Some(&raw));
    }

    #[test]
    fn valid_identifiers_are_trimmed_and_kept(
        id in "[A-Za-z0-9][A-Za-z0-9_.-]{0,63}",
        pad in " {0,3}"
    ) {
        let raw = format!("{}{}{}", pad, id, pad);
        prop_assert_eq!(normalize_identifier("Handle", Some(&raw)).unwrap(), id);
    }

    #[test]
    fn dot_only_identifiers_are_rejected(dots in "\\.{1,10}") {
        prop_assert!(normalize_identifier("Username", Some(&dots)).is_err());
    }

    #[test]
    fn overlong_identifiers_are_rejected(extra in 1usize..20) {
        let raw = "a".repeat(MAX_IDENTIFIER_LEN + extra);
        prop_assert!(normalize_identifier("Handle", Some(&raw)).is_err());
    }
}

// Property: Backoff doubles per attempt
proptest! {
    #[test]
    fn backoff_doubles(base_ms in 1u64..5000, attempt in 0u32..8) {
        let policy = RetryPolicy::new(3, Duration::from_millis(base_ms));
        prop_assert_eq!(policy.delay_for(attempt + 1), policy.delay_for(attempt) * 2);
        prop_assert_eq!(policy.delay_for(0), Duration::from_millis(base_ms));
    }
}
