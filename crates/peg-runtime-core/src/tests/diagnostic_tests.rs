//! Tests for [`Location`], [`ErrorFormatter`] and [`ParsingError`].

use rstest::rstest;
use serde_json::json;

use crate::{ErrorFormatter, FailureTracker, Location};

fn tracker(position: usize, reasons: &[(&str, bool)]) -> FailureTracker {
    let mut tracker = FailureTracker::new();
    for &(reason, is_expectation) in reasons {
        tracker.record(position, reason, is_expectation);
    }
    tracker
}

#[rstest]
#[case::second_line(b"foo\nbar", 5, 2, 2)]
#[case::line_start(b"foo\nbar", 4, 2, 1)]
#[case::first_line(b"foo\nbar", 2, 1, 2)]
#[case::origin(b"foo", 0, 1, 0)]
#[case::third_line(b"a\nb\nc", 4, 3, 1)]
#[case::past_end(b"ab", 9, 1, 2)]
#[case::after_trailing_newline(b"ab\n", 3, 2, 1)]
#[case::consecutive_newlines(b"\n\n", 2, 3, 1)]
fn locate(
    #[case] input: &[u8],
    #[case] position: usize,
    #[case] line: usize,
    #[case] column: usize,
) {
    let location = Location::locate(input, position);
    assert_eq!(location.position(), position);
    assert_eq!((location.line(), location.column()), (line, column));
}

#[test]
fn message_reports_line_column_and_expectations() {
    let error = ErrorFormatter::default().format(
        b"foo\nbar",
        &tracker(5, &[("letter", true), ("digit", true)]),
    );
    insta::assert_snapshot!(
        error.to_string(),
        @r#"at line 2, column 2 (byte 5, after "foo\nb"): expected one of digit, letter"#
    );
}

#[test]
fn other_reasons_precede_expectations() {
    let error = ErrorFormatter::default().format(
        b"x = ;",
        &tracker(4, &[("\"(\"", true), ("missing operand", false)]),
    );
    insta::assert_snapshot!(
        error.to_string(),
        @r#"at line 1, column 4 (byte 4, after "x = "): missing operand / expected one of "(""#
    );
}

#[test]
fn context_is_limited_to_the_trailing_bytes() {
    let input = b"0123456789abcdefghijKLMNOP";
    let error = ErrorFormatter::default().format(input, &tracker(25, &[("end", true)]));
    assert_eq!(error.context(), "56789abcdefghijKLMNO");
}

#[test]
fn context_width_is_configurable() {
    let formatter = ErrorFormatter::new(3);
    let error = formatter.format(b"abcdef", &tracker(5, &[("f", true)]));
    assert_eq!(formatter.context_bytes(), 3);
    assert_eq!(error.context(), "cde");
}

#[test]
fn missing_failure_reports_origin_without_reasons() {
    let error = ErrorFormatter::default().format(b"abc", &FailureTracker::new());
    assert_eq!(error.position(), 0);
    assert!(error.expectations().is_empty());
    assert_eq!(error.reasons(), "no failure reason recorded");
}

#[test]
fn reason_lists_are_sorted_and_deduplicated() {
    let error = ErrorFormatter::default().format(
        b"abc",
        &tracker(
            1,
            &[("z", false), ("b", true), ("a", false), ("b", true), ("a", true)],
        ),
    );
    assert_eq!(error.expectations(), ["a", "b"]);
    assert_eq!(error.other_reasons(), ["a", "z"]);
}

#[test]
fn parsing_error_serialises_structured_fields() {
    let error = ErrorFormatter::default().format(b"ab", &tracker(1, &[("b", true)]));
    let json = serde_json::to_value(&error).expect("serialize");
    assert_eq!(json.pointer("/location/line"), Some(&json!(1)));
    assert_eq!(json.pointer("/location/position"), Some(&json!(1)));
    assert_eq!(json.pointer("/expectations/0"), Some(&json!("b")));
    assert_eq!(json.pointer("/context"), Some(&json!("a")));
}
