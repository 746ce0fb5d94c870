//! Behaviour-driven tests for running rules through the parser.

use rstest::fixture;
use rstest_bdd_macros::{given, scenario, then, when};

use crate::engine::StaticEngine;
use crate::error::RuntimeError;
use crate::parser::Parser;
use crate::test_support;
use crate::Value;

// ---------------------------------------------------------------------------
// Test world
// ---------------------------------------------------------------------------

#[derive(Default)]
struct TestWorld {
    parser: Option<Parser<StaticEngine>>,
    result: Option<Result<Value<'static>, RuntimeError>>,
}

#[fixture]
fn world() -> TestWorld {
    TestWorld::default()
}

fn unquote(text: &str) -> &str {
    text.trim_matches('"')
}

/// Extracts the parse result. Panics if no parse was run.
fn result(world: &TestWorld) -> &Result<Value<'static>, RuntimeError> {
    world.result.as_ref().expect("no parse was run")
}

fn parsing_error(world: &TestWorld) -> &crate::ParsingError {
    result(world)
        .as_ref()
        .err()
        .and_then(RuntimeError::as_parsing_error)
        .expect("expected a parse failure")
}

// ---------------------------------------------------------------------------
// Given steps
// ---------------------------------------------------------------------------

#[given("the fixture matchers")]
fn given_fixture_matchers(world: &mut TestWorld) {
    let engine = test_support::engine().expect("fixture engine");
    world.parser = Some(Parser::new(engine));
}

// ---------------------------------------------------------------------------
// When steps
// ---------------------------------------------------------------------------

#[when("rule {rule} parses {input}")]
fn when_rule_parses(world: &mut TestWorld, rule: String, input: String) {
    let parser = world.parser.as_ref().expect("parser configured");
    let outcome = parser
        .parse(unquote(&rule), unquote(&input).as_bytes())
        .map(Value::into_owned);
    world.result = Some(outcome);
}

// ---------------------------------------------------------------------------
// Then steps
// ---------------------------------------------------------------------------

#[then("the parse succeeds")]
fn then_succeeds(world: &mut TestWorld) {
    assert!(result(world).is_ok(), "expected success, got {:?}", world.result);
}

#[then("label {label} holds {text}")]
fn then_label_holds(world: &mut TestWorld, label: String, text: String) {
    let value = result(world).as_ref().expect("parse succeeded");
    let held = value
        .get(unquote(&label))
        .and_then(Value::text)
        .expect("label holds text");
    assert_eq!(held, unquote(&text));
}

#[then("the parse fails at byte {position}")]
fn then_fails_at(world: &mut TestWorld, position: usize) {
    assert_eq!(parsing_error(world).position(), position);
}

#[then("the failure expects {expectations}")]
fn then_failure_expects(world: &mut TestWorld, expectations: String) {
    assert_eq!(
        parsing_error(world).expectations().join(", "),
        unquote(&expectations)
    );
}

#[then("the parse is aborted by a contract violation in {operation}")]
fn then_contract_violation(world: &mut TestWorld, operation: String) {
    let violation = result(world)
        .as_ref()
        .err()
        .and_then(RuntimeError::as_contract_violation)
        .expect("expected a contract violation");
    assert_eq!(
        violation.operation().map(crate::Operation::name),
        Some(unquote(&operation))
    );
}

#[then("no entry point is found")]
fn then_no_entry_point(world: &mut TestWorld) {
    let err = result(world).as_ref().expect_err("expected an error");
    assert!(!err.is_parse_failure());
    assert!(
        matches!(err, RuntimeError::EntryNotFound { .. }),
        "expected EntryNotFound, got: {err}"
    );
}

// ---------------------------------------------------------------------------
// Scenario registration
// ---------------------------------------------------------------------------

#[scenario(
    path = "tests/features/parsing.feature",
    name = "A matching input yields the labelled capture"
)]
fn matching_input(world: TestWorld) {
    let _ = world;
}

#[scenario(
    path = "tests/features/parsing.feature",
    name = "A failing input reports the furthest failure"
)]
fn failing_input(world: TestWorld) {
    let _ = world;
}

#[scenario(
    path = "tests/features/parsing.feature",
    name = "A backreference must repeat the captured text"
)]
fn backreference(world: TestWorld) {
    let _ = world;
}

#[scenario(
    path = "tests/features/parsing.feature",
    name = "Reserved callbacks abort the parse"
)]
fn reserved_callbacks(world: TestWorld) {
    let _ = world;
}

#[scenario(
    path = "tests/features/parsing.feature",
    name = "Unknown rules are not parse failures"
)]
fn unknown_rules(world: TestWorld) {
    let _ = world;
}
