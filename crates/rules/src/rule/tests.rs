//! Tests for rule construction and matching.

use vigil_core::{Event, Value};

use crate::schema::{RuleDef, RulesDocument};
use crate::variables::VariableResolver;

use super::{MatchError, Rule, RuleConfigError};

fn resolver() -> VariableResolver {
    VariableResolver::builder().node("test-node").build()
}

fn def_from_yaml(yaml: &str) -> RuleDef {
    let doc: RulesDocument =
        RulesDocument::from_yaml(&format!("rules:\n{yaml}")).expect("test yaml");
    doc.rules.into_iter().next().expect("one rule")
}

fn rule_from_yaml(yaml: &str) -> Rule {
    Rule::from_def(&def_from_yaml(yaml)).expect("valid rule")
}

fn tagged_event(tags: &[&str]) -> Event {
    let mut event = Event::new("metrics", "test");
    for tag in tags {
        event.add_tag(tag);
    }
    event
}

// ── Construction ────────────────────────────────────────────────────

#[test]
fn empty_name_is_rejected() {
    let mut def = def_from_yaml("  - name: ok\n    match-tag: ['*']");
    def.name = "  ".to_string();
    assert_eq!(Rule::from_def(&def), Err(RuleConfigError::EmptyName));
}

#[test]
fn operator_without_field_is_rejected() {
    let def = def_from_yaml("  - name: r\n    value-equals: 1");
    assert_eq!(
        Rule::from_def(&def),
        Err(RuleConfigError::OperatorWithoutField {
            rule: "r".to_string(),
            operator: "value-equals",
        })
    );
}

#[test]
fn field_without_operator_is_rejected() {
    let def = def_from_yaml("  - name: r\n    match-field: cpu");
    assert_eq!(
        Rule::from_def(&def),
        Err(RuleConfigError::FieldWithoutOperator {
            rule: "r".to_string(),
            field: "cpu".to_string(),
        })
    );
}

#[test]
fn conflicting_operators_are_rejected() {
    let def = def_from_yaml(
        "  - name: r\n    match-field: cpu\n    value-lt: 1\n    value-gt: 0",
    );
    assert_eq!(
        Rule::from_def(&def),
        Err(RuleConfigError::ConflictingOperators {
            rule: "r".to_string()
        })
    );
}

#[test]
fn no_match_target_is_rejected() {
    let def = def_from_yaml("  - name: r\n    schedule: s");
    assert_eq!(
        Rule::from_def(&def),
        Err(RuleConfigError::NoMatchTarget {
            rule: "r".to_string()
        })
    );
}

#[test]
fn date_operator_requires_format() {
    let def = def_from_yaml(
        "  - name: r\n    match-field: seen\n    date-lt: \"%{#now(-10m)}\"",
    );
    assert_eq!(
        Rule::from_def(&def),
        Err(RuleConfigError::MissingDateFormat {
            rule: "r".to_string(),
            operator: "date-lt",
        })
    );
}

#[test]
fn schedule_and_throttle_are_exposed_by_name() {
    let rule = rule_from_yaml(
        "  - name: r\n    match-tag: ['*']\n    schedule: nightly\n    throttle: mail-guard",
    );
    assert_eq!(rule.schedule(), Some("nightly"));
    assert_eq!(rule.throttle(), Some("mail-guard"));
}

// ── Tag predicate ───────────────────────────────────────────────────

#[test]
fn wildcard_tag_matches_any_tagged_event() {
    let rule = rule_from_yaml("  - name: r\n    match-tag: ['*']");
    let r = resolver();
    assert!(rule.matches(&tagged_event(&["anything"]), &r).unwrap());
    assert!(rule.matches(&tagged_event(&["a", "b"]), &r).unwrap());
}

#[test]
fn wildcard_tag_needs_a_tag_sequence() {
    let rule = rule_from_yaml("  - name: r\n    match-tag: ['*']");
    let r = resolver();
    // No tags field at all.
    assert!(!rule.matches(&Event::new("metrics", "test"), &r).unwrap());
    // Present but empty.
    let mut event = Event::new("metrics", "test");
    event.insert("tags", Vec::<Value>::new());
    assert!(!rule.matches(&event, &r).unwrap());
}

#[test]
fn tag_overlap_matches() {
    let rule = rule_from_yaml("  - name: r\n    match-tag: [cpu, memory]");
    let r = resolver();
    assert!(rule.matches(&tagged_event(&["disk", "memory"]), &r).unwrap());
    assert!(!rule.matches(&tagged_event(&["disk", "net"]), &r).unwrap());
}

// ── Field predicate ─────────────────────────────────────────────────

#[test]
fn equals_coerces_string_and_number() {
    let rule = rule_from_yaml("  - name: r\n    match-field: cpu\n    value-equals: 90");
    let r = resolver();
    let event = Event::default().with_field("cpu", "90");
    assert!(rule.matches(&event, &r).unwrap());
    let event = Event::default().with_field("cpu", 90.0);
    assert!(rule.matches(&event, &r).unwrap());
    let event = Event::default().with_field("cpu", 89.0);
    assert!(!rule.matches(&event, &r).unwrap());
}

#[test]
fn missing_or_null_field_never_matches() {
    let rule = rule_from_yaml("  - name: r\n    match-field: cpu\n    value-equals: 90");
    let r = resolver();
    assert!(!rule.matches(&Event::default(), &r).unwrap());
    let event = Event::default().with_field("cpu", Value::Null);
    assert!(!rule.matches(&event, &r).unwrap());
}

#[test]
fn membership_operators() {
    let rule = rule_from_yaml(
        "  - name: r\n    match-field: level\n    value-in: [warn, error]",
    );
    let r = resolver();
    assert!(rule
        .matches(&Event::default().with_field("level", "error"), &r)
        .unwrap());
    assert!(!rule
        .matches(&Event::default().with_field("level", "info"), &r)
        .unwrap());

    let rule = rule_from_yaml(
        "  - name: r\n    match-field: level\n    value-not-in: [debug, info]",
    );
    assert!(rule
        .matches(&Event::default().with_field("level", "error"), &r)
        .unwrap());
    assert!(!rule
        .matches(&Event::default().with_field("level", "info"), &r)
        .unwrap());
}

#[test]
fn ordering_operators_coerce() {
    let r = resolver();
    let rule = rule_from_yaml("  - name: r\n    match-field: cpu\n    value-gte: 90");
    assert!(rule
        .matches(&Event::default().with_field("cpu", "93.5"), &r)
        .unwrap());
    assert!(!rule
        .matches(&Event::default().with_field("cpu", 89.9), &r)
        .unwrap());

    let rule = rule_from_yaml("  - name: r\n    match-field: cpu\n    value-lt: \"50\"");
    assert!(rule
        .matches(&Event::default().with_field("cpu", 49.0), &r)
        .unwrap());
}

#[test]
fn coercion_failure_is_an_error_not_a_silent_false() {
    let rule = rule_from_yaml("  - name: r\n    match-field: cpu\n    value-gt: 50");
    let r = resolver();
    let event = Event::default().with_field("cpu", "not a number");
    assert!(matches!(
        rule.matches(&event, &r),
        Err(MatchError::Coercion { .. })
    ));
}

#[test]
fn contains_substring_and_numeric() {
    let r = resolver();
    let rule = rule_from_yaml(
        "  - name: r\n    match-field: msg\n    value-contains: timeout",
    );
    assert!(rule
        .matches(&Event::default().with_field("msg", "client timeout after 30s"), &r)
        .unwrap());

    let rule = rule_from_yaml("  - name: r\n    match-field: code\n    value-contains: 2");
    assert!(rule
        .matches(&Event::default().with_field("code", 1024.0), &r)
        .unwrap());
    assert!(!rule
        .matches(&Event::default().with_field("code", 1035.0), &r)
        .unwrap());
}

// ── Sequence fields: all-match semantics ────────────────────────────

#[test]
fn sequence_matches_only_when_every_element_does() {
    let rule = rule_from_yaml("  - name: r\n    match-field: loads\n    value-gte: 10");
    let r = resolver();

    let event = Event::default().with_field("loads", vec![50.0, 90.0, 10.0]);
    assert!(rule.matches(&event, &r).unwrap());

    // One element below threshold sinks the whole match.
    let event = Event::default().with_field("loads", vec![50.0, 5.0, 90.0]);
    assert!(!rule.matches(&event, &r).unwrap());
}

#[test]
fn sequence_equality_all_match() {
    let rule = rule_from_yaml("  - name: r\n    match-field: codes\n    value-equals: 200");
    let r = resolver();
    let event = Event::default().with_field("codes", vec!["200", "200"]);
    assert!(rule.matches(&event, &r).unwrap());
    let event = Event::default().with_field("codes", vec!["200", "500"]);
    assert!(!rule.matches(&event, &r).unwrap());
}

// ── Date operators ──────────────────────────────────────────────────

#[test]
fn date_comparison_against_now_threshold() {
    let fmt = "%Y-%m-%d %H:%M:%S";
    let five_min_ago = (chrono::Utc::now() - chrono::Duration::minutes(5))
        .format(fmt)
        .to_string();

    let rule = rule_from_yaml(
        "  - name: r\n    match-field: seen\n    date-gt: \"%{#now(-10m)}\"\n    date-fmt: \"%Y-%m-%d %H:%M:%S\"",
    );
    let r = resolver();
    let event = Event::default().with_field("seen", five_min_ago.clone());
    // Seen 5 minutes ago is more recent than the 10-minutes-ago threshold.
    assert!(rule.matches(&event, &r).unwrap());

    let rule = rule_from_yaml(
        "  - name: r\n    match-field: seen\n    date-lt: \"%{#now(-10m)}\"\n    date-fmt: \"%Y-%m-%d %H:%M:%S\"",
    );
    let event = Event::default().with_field("seen", five_min_ago);
    assert!(!rule.matches(&event, &r).unwrap());
}

#[test]
fn date_parse_failure_is_an_error() {
    let rule = rule_from_yaml(
        "  - name: r\n    match-field: seen\n    date-gt: \"%{#now(-10m)}\"\n    date-fmt: \"%Y-%m-%d\"",
    );
    let r = resolver();
    let event = Event::default().with_field("seen", "yesterday-ish");
    assert!(matches!(
        rule.matches(&event, &r),
        Err(MatchError::DateParse { .. })
    ));
}

#[test]
fn unresolvable_threshold_is_an_error() {
    let rule = rule_from_yaml(
        "  - name: r\n    match-field: seen\n    date-gt: \"%{no-such-field}\"\n    date-fmt: \"%Y-%m-%d\"",
    );
    let r = resolver();
    let event = Event::default().with_field("seen", "2026-08-01");
    assert!(matches!(
        rule.matches(&event, &r),
        Err(MatchError::Threshold(_))
    ));
}

// ── Composition ─────────────────────────────────────────────────────

#[test]
fn tag_and_field_predicates_compose() {
    let rule = rule_from_yaml(
        "  - name: r\n    match-tag: [metrics]\n    match-field: cpu\n    value-gte: 90",
    );
    let r = resolver();

    let mut event = tagged_event(&["metrics"]);
    event.insert("cpu", 95.0);
    assert!(rule.matches(&event, &r).unwrap());

    // Right field, wrong tag.
    let mut event = tagged_event(&["logs"]);
    event.insert("cpu", 95.0);
    assert!(!rule.matches(&event, &r).unwrap());

    // Right tag, field below threshold.
    let mut event = tagged_event(&["metrics"]);
    event.insert("cpu", 10.0);
    assert!(!rule.matches(&event, &r).unwrap());
}
