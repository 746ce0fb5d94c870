//! Tests for [`OutputStack`] result-building operations.

use rstest::{fixture, rstest};

use crate::{
    ContractViolation, IdentityFactory, Operation, OutputStack, TaggingFactory, Value, ValueKind,
};

const INPUT: &[u8] = b"a=1;b=2";

#[fixture]
fn output() -> OutputStack<'static> {
    OutputStack::new(INPUT)
}

fn text(value: &str) -> Value<'static> {
    Value::Text(value.to_owned())
}

fn label(output: &mut OutputStack<'static>, name: &str, value: &str) {
    output.push_text(value);
    output.make_label(name).expect("label");
}

#[rstest]
fn array_collects_appended_values_in_push_order(mut output: OutputStack<'static>) {
    output.push_array(false).expect("push array");
    for _ in 0..3 {
        output.push_boolean(true);
        output.append_to_array().expect("append");
    }
    let result = output.into_result().expect("balanced");
    assert_eq!(
        result,
        Value::Array(vec![Value::Boolean(true); 3]),
        "three cycles yield three elements"
    );
}

#[rstest]
fn push_array_can_seed_with_current_value(mut output: OutputStack<'static>) {
    output.push_range(0, 1).expect("range");
    output.push_array(true).expect("seed");
    output.push_range(4, 5).expect("range");
    output.append_to_array().expect("append");
    let result = output.into_result().expect("balanced");
    let texts: Vec<String> = result
        .as_array()
        .expect("array")
        .iter()
        .filter_map(|item| item.text().map(|t| t.into_owned()))
        .collect();
    assert_eq!(texts, ["a", "b"]);
}

#[rstest]
fn append_requires_an_array_beneath(mut output: OutputStack<'static>) {
    output.push_boolean(false);
    output.push_boolean(true);
    let err = output.append_to_array().expect_err("no array");
    assert_eq!(
        err,
        ContractViolation::WrongVariant {
            operation: Operation::AppendToArray,
            expected: "array",
            found: ValueKind::Boolean,
        }
    );
}

#[rstest]
fn make_label_wraps_top_value(mut output: OutputStack<'static>) {
    output.push_range(2, 3).expect("range");
    output.make_label("a").expect("label");
    let result = output.into_result().expect("balanced");
    assert_eq!(
        result.get("a").and_then(Value::text).as_deref(),
        Some("1")
    );
}

#[rstest]
fn merge_labels_unions_distinct_keys(mut output: OutputStack<'static>) {
    label(&mut output, "b", "2");
    label(&mut output, "a", "1");
    output.merge_labels(2).expect("merge");
    let result = output.into_result().expect("balanced");
    assert_eq!(
        result,
        Value::Mapping([(String::from("a"), text("1")), (String::from("b"), text("2"))].into())
    );
}

#[rstest]
fn merge_labels_keeps_the_last_popped_entry_on_collision(mut output: OutputStack<'static>) {
    // Pop order is {a:2} then {a:1}; the mapping merged last wins.
    label(&mut output, "a", "1");
    label(&mut output, "a", "2");
    output.merge_labels(2).expect("merge");
    let result = output.into_result().expect("balanced");
    assert_eq!(result, Value::Mapping([(String::from("a"), text("1"))].into()));
}

#[rstest]
fn merge_labels_accepts_empty_mappings(mut output: OutputStack<'static>) {
    output.push_empty();
    label(&mut output, "a", "1");
    output.merge_labels(2).expect("merge");
    let result = output.into_result().expect("balanced");
    assert_eq!(result, Value::Mapping([(String::from("a"), text("1"))].into()));
}

#[rstest]
fn merge_labels_with_zero_count_pushes_empty_mapping(mut output: OutputStack<'static>) {
    output.merge_labels(0).expect("merge");
    let result = output.into_result().expect("balanced");
    assert_eq!(result, Value::Mapping(Default::default()));
}

#[rstest]
fn merge_labels_checks_count_before_popping(mut output: OutputStack<'static>) {
    label(&mut output, "a", "1");
    let err = output.merge_labels(2).expect_err("underflow");
    assert_eq!(
        err,
        ContractViolation::OutputUnderflow {
            operation: Operation::MergeLabels,
            needed: 2,
            available: 1,
        }
    );
    assert_eq!(output.len(), 1, "nothing popped on underflow");
}

#[rstest]
fn merge_labels_rejects_non_mappings(mut output: OutputStack<'static>) {
    output.push_boolean(true);
    let err = output.merge_labels(1).expect_err("not a mapping");
    assert!(matches!(
        err,
        ContractViolation::WrongVariant {
            found: ValueKind::Boolean,
            ..
        }
    ));
}

#[rstest]
fn make_object_uses_the_identity_factory_by_default(mut output: OutputStack<'static>) {
    output.push_text("payload");
    output.make_object("Thing", &IdentityFactory).expect("object");
    assert_eq!(output.into_result().expect("balanced"), text("payload"));
}

#[rstest]
fn make_object_passes_class_to_the_factory(mut output: OutputStack<'static>) {
    output.push_text("payload");
    output.make_object("Thing", &TaggingFactory).expect("object");
    assert_eq!(
        output.into_result().expect("balanced"),
        Value::Object {
            class: String::from("Thing"),
            payload: Box::new(text("payload")),
        }
    );
}

#[rstest]
fn push_range_rejects_inverted_offsets(mut output: OutputStack<'static>) {
    let err = output.push_range(3, 1).expect_err("inverted");
    assert!(matches!(err, ContractViolation::InvertedRange { .. }));
    assert!(output.is_empty());
}

#[rstest]
#[case::pop(Operation::Pop)]
#[case::make_label(Operation::MakeLabel)]
#[case::push_array(Operation::PushArray)]
#[case::append(Operation::AppendToArray)]
fn operations_on_an_empty_stack_underflow(
    mut output: OutputStack<'static>,
    #[case] operation: Operation,
) {
    let err = match operation {
        Operation::Pop => output.pop(),
        Operation::MakeLabel => output.make_label("x"),
        Operation::PushArray => output.push_array(true),
        _ => output.append_to_array(),
    }
    .expect_err("underflow");
    assert!(
        matches!(err, ContractViolation::OutputUnderflow { operation: reported, .. } if reported == operation),
        "unexpected violation: {err}"
    );
}

#[rstest]
#[case::nothing(0, 0)]
#[case::two_values(2, 2)]
fn unbalanced_results_are_violations(
    mut output: OutputStack<'static>,
    #[case] pushes: usize,
    #[case] remaining: usize,
) {
    for _ in 0..pushes {
        output.push_empty();
    }
    assert_eq!(
        output.into_result(),
        Err(ContractViolation::UnbalancedResult { remaining })
    );
}

#[rstest]
fn pop_discards_the_top_value(mut output: OutputStack<'static>) {
    output.push_boolean(true);
    output.push_boolean(false);
    output.pop().expect("pop");
    assert_eq!(output.peek(), Some(&Value::Boolean(true)));
}
