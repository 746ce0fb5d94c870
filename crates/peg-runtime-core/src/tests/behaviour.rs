//! Behaviour-driven tests for result building and failure reporting.

use rstest::fixture;
use rstest_bdd_macros::{given, scenario, then, when};

use crate::{ContractViolation, ErrorFormatter, FailureTracker, OutputStack, Value};

// ---------------------------------------------------------------------------
// Test world
// ---------------------------------------------------------------------------

#[derive(Default)]
struct TestWorld {
    input: &'static [u8],
    output: Option<OutputStack<'static>>,
    tracker: FailureTracker,
    rejection: Option<ContractViolation>,
}

#[fixture]
fn world() -> TestWorld {
    TestWorld::default()
}

impl TestWorld {
    fn output(&mut self) -> &mut OutputStack<'static> {
        let input = self.input;
        self.output.get_or_insert_with(|| OutputStack::new(input))
    }

    fn apply(&mut self, step: impl FnOnce(&mut OutputStack<'static>) -> Result<(), ContractViolation>) {
        if let Err(violation) = step(self.output()) {
            self.rejection = Some(violation);
        }
    }

    fn result(&mut self) -> Result<Value<'static>, ContractViolation> {
        let input = self.input;
        self.output
            .take()
            .unwrap_or_else(|| OutputStack::new(input))
            .into_result()
    }
}

// Inputs live for the whole test binary so ranges can borrow them.
fn leak(text: &str) -> &'static [u8] {
    Box::leak(text.as_bytes().to_vec().into_boxed_slice())
}

// ---------------------------------------------------------------------------
// Given steps
// ---------------------------------------------------------------------------

#[given("the input {text}")]
fn given_input(world: &mut TestWorld, text: String) {
    world.input = leak(text.trim_matches('"'));
}

// ---------------------------------------------------------------------------
// When steps
// ---------------------------------------------------------------------------

#[when("the range {start} to {end} is pushed")]
fn when_range_pushed(world: &mut TestWorld, start: usize, end: usize) {
    world.apply(|output| output.push_range(start, end));
}

#[when("the top value is labelled {name}")]
fn when_labelled(world: &mut TestWorld, name: String) {
    let label = name.trim_matches('"').to_owned();
    world.apply(|output| output.make_label(&label));
}

#[when("{count} labels are merged")]
fn when_merged(world: &mut TestWorld, count: usize) {
    world.apply(|output| output.merge_labels(count));
}

#[when("{reason} is expected at byte {position}")]
fn when_expected(world: &mut TestWorld, reason: String, position: usize) {
    world.tracker.record(position, reason.trim_matches('"'), true);
}

// ---------------------------------------------------------------------------
// Then steps
// ---------------------------------------------------------------------------

#[then("the result has label {name} with text {text}")]
fn then_label_text(world: &mut TestWorld, name: String, text: String) {
    let output = world.output.as_ref().expect("output stack was used");
    let value = output
        .peek()
        .and_then(|top| top.get(name.trim_matches('"')))
        .and_then(Value::text)
        .expect("label holds text");
    assert_eq!(value, text.trim_matches('"'));
}

#[then("the last operation was rejected as an output underflow")]
fn then_underflow(world: &mut TestWorld) {
    assert!(
        matches!(world.rejection, Some(ContractViolation::OutputUnderflow { .. })),
        "expected an underflow, got {:?}",
        world.rejection
    );
}

#[then("the output stack holds {count} value")]
fn then_stack_len(world: &mut TestWorld, count: usize) {
    assert_eq!(world.output().len(), count);
}

#[then("the result is rejected as unbalanced with {remaining} values")]
fn then_unbalanced(world: &mut TestWorld, remaining: usize) {
    assert_eq!(
        world.result(),
        Err(ContractViolation::UnbalancedResult { remaining })
    );
}

#[then("the failure is reported at line {line}, column {column}")]
fn then_failure_location(world: &mut TestWorld, line: usize, column: usize) {
    let error = ErrorFormatter::default().format(world.input, &world.tracker);
    assert_eq!((error.location().line(), error.location().column()), (line, column));
}

#[then("the failure lists the expectations {expected}")]
fn then_expectations(world: &mut TestWorld, expected: String) {
    let error = ErrorFormatter::default().format(world.input, &world.tracker);
    assert_eq!(error.expectations().join(", "), expected.trim_matches('"'));
}

// ---------------------------------------------------------------------------
// Scenario registration
// ---------------------------------------------------------------------------

#[scenario(
    path = "tests/features/output_building.feature",
    name = "Labelled ranges merge into a single mapping"
)]
fn labelled_ranges_merge(world: TestWorld) {
    let _ = world;
}

#[scenario(
    path = "tests/features/output_building.feature",
    name = "Merging more labels than are present is rejected"
)]
fn merge_underflow_rejected(world: TestWorld) {
    let _ = world;
}

#[scenario(
    path = "tests/features/output_building.feature",
    name = "A successful match must leave exactly one value"
)]
fn unbalanced_result_rejected(world: TestWorld) {
    let _ = world;
}

#[scenario(
    path = "tests/features/output_building.feature",
    name = "The furthest failure wins the diagnostic"
)]
fn furthest_failure_wins(world: TestWorld) {
    let _ = world;
}
