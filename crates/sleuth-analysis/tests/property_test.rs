//! Property tests over the lexical surface: arbitrary inputs must never
//! panic, extraction must be idempotent, and literals must never leak.

mod common;

use proptest::prelude::*;
use sleuth_analysis::complexity;
use sleuth_analysis::diff::normalize::normalize_body;
use sleuth_analysis::extractor::{extract, NameResolver};

fn resolver() -> NameResolver {
    NameResolver::from_catalog(&common::school())
}

proptest! {
    #[test]
    fn extractor_never_panics(body in ".{0,400}") {
        let _ = extract("prop", &body, &resolver());
    }

    #[test]
    fn extractor_is_idempotent(body in "[A-Za-z0-9_#@'\\(\\)\\.,= \n]{0,300}") {
        let r = resolver();
        let first = extract("prop", &body, &r);
        let second = extract("prop", &body, &r);
        prop_assert_eq!(first.referenced, second.referenced);
        prop_assert_eq!(first.joins, second.joins);
        prop_assert_eq!(first.anti_patterns, second.anti_patterns);
    }

    #[test]
    fn identifiers_inside_literals_never_resolve(name in "[A-Za-z]{3,12}") {
        // Whatever the literal mentions, only Courses is really referenced.
        let body = format!("SELECT 'FROM {name} JOIN Students' FROM dbo.Courses");
        let result = extract("prop", &body, &resolver());
        prop_assert_eq!(result.referenced.len(), 1);
    }

    #[test]
    fn complexity_never_panics_and_is_bounded(body in ".{0,400}") {
        let c = complexity::analyze(&body);
        // Sum of all dimension caps.
        prop_assert!(c.score() <= 30.0 + 30.0 + 25.0 + 16.0 + 12.0 + 10.0 + 15.0);
    }

    #[test]
    fn complexity_is_monotonic_in_joins(joins in 0usize..30) {
        let base = "SELECT 1 FROM A ".to_string();
        let smaller = complexity::analyze(&(base.clone() + &"JOIN B ON x = y ".repeat(joins)));
        let larger = complexity::analyze(&(base + &"JOIN B ON x = y ".repeat(joins + 1)));
        prop_assert!(larger.score() >= smaller.score());
    }

    #[test]
    fn normalize_is_idempotent(body in ".{0,300}") {
        let once = normalize_body(&body);
        let twice = normalize_body(&once);
        prop_assert_eq!(once, twice);
    }
}
