//! Property-based tests for domain value objects
//!
//! These tests use proptest to verify invariants across many random inputs.

use chrono::{DateTime, Duration, TimeZone, Utc};
use domain::value_objects::{DateRange, Priority, SearchFields, SearchQuery};
use domain::{EventUpdate, NewEvent};
use proptest::prelude::*;

fn instant(secs: i64) -> DateTime<Utc> {
    Utc.timestamp_opt(secs, 0).single().expect("valid timestamp")
}

// Roughly 2000-01-01 .. 2040-01-01
const EPOCH_LO: i64 = 946_684_800;
const EPOCH_HI: i64 = 2_208_988_800;

// ============================================================================
// DateRange Property Tests
// ============================================================================

mod date_range_tests {
    use super::*;

    proptest! {
        #[test]
        fn ordered_bounds_always_build(
            a in EPOCH_LO..EPOCH_HI,
            b in EPOCH_LO..EPOCH_HI
        ) {
            let (lo, hi) = if a <= b { (a, b) } else { (b, a) };
            prop_assert!(DateRange::new(instant(lo), instant(hi)).is_ok());
        }

        #[test]
        fn inverted_bounds_always_rejected(
            lo in EPOCH_LO..EPOCH_HI,
            gap in 1i64..10_000_000
        ) {
            prop_assert!(DateRange::new(instant(lo + gap), instant(lo)).is_err());
        }

        #[test]
        fn contains_matches_half_open_definition(
            lo in EPOCH_LO..EPOCH_HI,
            len in 0i64..1_000_000,
            probe in -2_000_000i64..2_000_000
        ) {
            let range = DateRange::new(instant(lo), instant(lo + len)).expect("range");
            let t = instant(lo + probe);
            let expected = probe >= 0 && probe < len;
            prop_assert_eq!(range.contains(t), expected);
        }

        #[test]
        fn spanning_days_has_exact_length(
            lo in EPOCH_LO..EPOCH_HI,
            days in 0i64..366
        ) {
            let range = DateRange::spanning_days(instant(lo), days).expect("range");
            prop_assert_eq!(range.end() - range.start(), Duration::days(days));
        }
    }
}

// ============================================================================
// Priority Property Tests
// ============================================================================

mod priority_tests {
    use super::*;

    proptest! {
        #[test]
        fn new_accepts_exactly_one_to_nine(value in any::<u8>()) {
            prop_assert_eq!(Priority::new(value).is_ok(), (1..=9).contains(&value));
        }

        #[test]
        fn from_ical_is_always_in_range(value in any::<u8>()) {
            let priority = Priority::from_ical(value);
            prop_assert!((1..=9).contains(&priority.value()));
        }

        #[test]
        fn serde_roundtrip(value in 1u8..=9) {
            let priority = Priority::new(value).expect("priority");
            let json = serde_json::to_string(&priority).expect("serialize");
            let back: Priority = serde_json::from_str(&json).expect("deserialize");
            prop_assert_eq!(back, priority);
        }
    }
}

// ============================================================================
// Event validation Property Tests
// ============================================================================

mod event_validation_tests {
    use super::*;

    proptest! {
        #[test]
        fn start_not_before_end_is_rejected(
            start in EPOCH_LO..EPOCH_HI,
            back in 0i64..1_000_000
        ) {
            let event = NewEvent {
                title: "x".to_string(),
                start: instant(start),
                end: instant(start - back),
                description: None,
                location: None,
                rrule: None,
                reminder_minutes: None,
            };
            prop_assert!(event.validate().is_err());

            let update = EventUpdate {
                start: Some(instant(start)),
                end: Some(instant(start - back)),
                ..EventUpdate::default()
            };
            prop_assert!(update.validate().is_err());
        }
    }
}

// ============================================================================
// SearchQuery Property Tests
// ============================================================================

mod search_query_tests {
    use super::*;

    proptest! {
        #[test]
        fn needle_always_matches_text_containing_it(
            prefix in "[a-zA-Z ]{0,10}",
            needle in "[a-zA-Z]{1,10}",
            suffix in "[a-zA-Z ]{0,10}"
        ) {
            let query = SearchQuery::new(&needle, SearchFields::ALL, None).expect("query");
            let haystack = format!("{prefix}{}{suffix}", needle.to_uppercase());
            prop_assert!(query.matches_text(Some(&haystack)));
        }
    }
}
