//! Property-based tests for bit_log using proptest

use bit_log::core::formatter::{truncate_or_extend, truncate_or_extend_left};
use bit_log::core::Dispatcher;
use bit_log::prelude::*;
use bit_log::{to_level, LevelSpec};
use proptest::prelude::*;
use std::sync::Arc;

fn named_level() -> impl Strategy<Value = LogLevel> {
    prop_oneof![
        Just(LogLevel::TRACE),
        Just(LogLevel::DEBUG),
        Just(LogLevel::INFO),
        Just(LogLevel::WARN),
        Just(LogLevel::ERROR),
        Just(LogLevel::FATAL),
    ]
}

/// Root and one child, outside of any context
fn detached_tree() -> (Arc<Logger>, Arc<Logger>) {
    let dispatcher = Arc::new(Dispatcher::new());
    let root = Arc::new(Logger::new("", None, Arc::clone(&dispatcher)));
    let child = Arc::new(Logger::new("child", Some(Arc::clone(&root)), dispatcher));
    (root, child)
}

// ============================================================================
// LogLevel Tests
// ============================================================================

proptest! {
    /// Names parse back to the level; other spellings are rejected
    #[test]
    fn test_level_name_roundtrip(level in named_level()) {
        prop_assert_eq!(to_level(&LevelSpec::from(level.name())).unwrap(), level);
        prop_assert_eq!(to_level(&LevelSpec::from(i64::from(level.value()))).unwrap(), level);
        prop_assert!(to_level(&LevelSpec::from(level.name().to_lowercase())).is_err());
    }

    /// Ordering follows the numeric value
    #[test]
    fn test_level_ordering(a in named_level(), b in named_level()) {
        prop_assert_eq!(a <= b, a.value() <= b.value());
        prop_assert_eq!(a < b, a.value() < b.value());
    }

    /// Ad-hoc thresholds are named after the highest level at or below them
    #[test]
    fn test_threshold_name(value in 0u32..=1000) {
        let level = LogLevel::threshold(value).unwrap();
        let expected = [
            LogLevel::OFF,
            LogLevel::FATAL,
            LogLevel::ERROR,
            LogLevel::WARN,
            LogLevel::INFO,
            LogLevel::DEBUG,
            LogLevel::TRACE,
        ]
        .into_iter()
        .find(|named| u32::from(named.value()) <= value)
        .unwrap();
        prop_assert_eq!(level.name(), expected.name());
    }

    /// Numbers that are not named levels are rejected by the strict parser
    #[test]
    fn test_unnamed_numbers_rejected(value in 1i64..100_000) {
        prop_assume!(![10, 20, 30, 40, 50, 1000].contains(&value));
        let err = to_level(&LevelSpec::from(value)).unwrap_err();
        prop_assert_eq!(err.to_string(), format!("not a valid LogLevel: '{}'", value));
    }

    /// A call passes the gate iff its severity is at least the effective level
    #[test]
    fn test_should_log(call in named_level(), threshold in named_level()) {
        let (root, child) = detached_tree();
        root.set_level(threshold);
        prop_assert_eq!(child.should_log(call), call >= threshold);
    }
}

// ============================================================================
// Formatting helper Tests
// ============================================================================

proptest! {
    /// Column helpers always produce exactly the requested width
    #[test]
    fn test_column_width(text in "[a-z.]{0,60}", width in 5usize..40) {
        prop_assert_eq!(truncate_or_extend(&text, width).chars().count(), width);
        prop_assert_eq!(truncate_or_extend_left(&text, width).chars().count(), width);
    }

    /// Short text is kept and padded, never shortened
    #[test]
    fn test_column_keeps_short_text(text in "[a-z]{0,20}") {
        let padded = truncate_or_extend(&text, 20);
        prop_assert!(padded.starts_with(&text));
        let padded = truncate_or_extend_left(&text, 20);
        prop_assert!(padded.ends_with(&text));
    }

    /// Flat arrays of numbers render as a comma separated list
    #[test]
    fn test_flat_array_rendering(items in prop::collection::vec(-1000i32..1000, 1..10)) {
        let expected = format!(
            "[ {} ]",
            items.iter().map(|n| n.to_string()).collect::<Vec<_>>().join(", ")
        );
        let value = Value::from(items);
        prop_assert_eq!(bit_log::format_any(&value, false, false).unwrap(), expected);
    }
}
