//! Invocation-scoped state driven by matcher callbacks.
//!
//! A [`Session`] owns the output stack, the locals stack and the failure
//! tracker for exactly one entry-point call. Callbacks arrive already decoded
//! as [`Call`]s; the first contract violation poisons the session so every
//! later call is ignored until the matcher returns.

use peg_runtime_core::{
    ContractViolation, Factory, FailureTracker, LocalsStack, Operation, OutputStack, Value,
};
use tracing::{debug, warn};

const CALLBACK_TARGET: &str = "peg_runtime::callbacks";

/// A decoded callback with offsets relative to the input start.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Call<'c> {
    PushEmpty,
    PushInputRange { start: usize, end: usize },
    PushBoolean(bool),
    PushString(&'c str),
    PushArray { append_current: bool },
    AppendToArray,
    MakeLabel(&'c str),
    MergeLabels(usize),
    MakeValue,
    MakeObject(&'c str),
    Pop,
    LocalsPush(usize),
    LocalsLoad(usize),
    LocalsPop(usize),
    Match(usize),
    SetAsSource,
    ReadFromSource,
    TraceEnter(&'c str),
    TraceLeave {
        rule: &'c str,
        successful: bool,
    },
    TraceFailure {
        position: usize,
        reason: &'c str,
        is_expectation: bool,
    },
}

impl Call<'_> {
    pub(crate) const fn operation(&self) -> Operation {
        match self {
            Self::PushEmpty => Operation::PushEmpty,
            Self::PushInputRange { .. } => Operation::PushInputRange,
            Self::PushBoolean(_) => Operation::PushBoolean,
            Self::PushString(_) => Operation::PushString,
            Self::PushArray { .. } => Operation::PushArray,
            Self::AppendToArray => Operation::AppendToArray,
            Self::MakeLabel(_) => Operation::MakeLabel,
            Self::MergeLabels(_) => Operation::MergeLabels,
            Self::MakeValue => Operation::MakeValue,
            Self::MakeObject(_) => Operation::MakeObject,
            Self::Pop => Operation::Pop,
            Self::LocalsPush(_) => Operation::LocalsPush,
            Self::LocalsLoad(_) => Operation::LocalsLoad,
            Self::LocalsPop(_) => Operation::LocalsPop,
            Self::Match(_) => Operation::Match,
            Self::SetAsSource => Operation::SetAsSource,
            Self::ReadFromSource => Operation::ReadFromSource,
            Self::TraceEnter(_) => Operation::TraceEnter,
            Self::TraceLeave { .. } => Operation::TraceLeave,
            Self::TraceFailure { .. } => Operation::TraceFailure,
        }
    }
}

/// How an invocation ended.
#[derive(Debug)]
pub(crate) enum Outcome<'a> {
    /// The rule matched and left exactly one value.
    Matched(Value<'a>),
    /// The rule did not match; the tracker holds the furthest failure.
    Failed(FailureTracker),
    /// The matcher broke the callback contract.
    Violated(ContractViolation),
}

pub(crate) struct Session<'a, 'f> {
    input: &'a [u8],
    output: OutputStack<'a>,
    locals: LocalsStack<'a>,
    failures: FailureTracker,
    factory: &'f dyn Factory,
    trace_calls: bool,
    violation: Option<ContractViolation>,
}

impl<'a, 'f> Session<'a, 'f> {
    pub(crate) const fn new(input: &'a [u8], factory: &'f dyn Factory, trace_calls: bool) -> Self {
        Self {
            input,
            output: OutputStack::new(input),
            locals: LocalsStack::new(),
            failures: FailureTracker::new(),
            factory,
            trace_calls,
            violation: None,
        }
    }

    pub(crate) const fn is_poisoned(&self) -> bool {
        self.violation.is_some()
    }

    /// Whether the tracing hooks are observed at all.
    pub(crate) const fn traces(&self) -> bool {
        self.trace_calls
    }

    /// Applies one callback, returning the new position for `match`.
    pub(crate) fn handle(&mut self, call: Call<'_>) -> Option<usize> {
        if self.is_poisoned() {
            return None;
        }
        if self.trace_calls {
            debug!(target: CALLBACK_TARGET, ?call, "callback");
        }
        match self.apply(call) {
            Ok(position) => position,
            Err(violation) => {
                self.reject(violation);
                None
            }
        }
    }

    /// Records a violation; only the first one is kept.
    pub(crate) fn reject(&mut self, violation: ContractViolation) {
        if self.is_poisoned() {
            return;
        }
        warn!(
            target: CALLBACK_TARGET,
            operation = violation.operation().map_or("result", Operation::name),
            %violation,
            "matcher broke the callback contract"
        );
        self.violation = Some(violation);
    }

    pub(crate) fn finish(self, matched: bool) -> Outcome<'a> {
        if let Some(violation) = self.violation {
            return Outcome::Violated(violation);
        }
        if !matched {
            return Outcome::Failed(self.failures);
        }
        match self.output.into_result() {
            Ok(value) => Outcome::Matched(value),
            Err(violation) => Outcome::Violated(violation),
        }
    }

    fn apply(&mut self, call: Call<'_>) -> Result<Option<usize>, ContractViolation> {
        match call {
            Call::PushEmpty => self.output.push_empty(),
            Call::PushInputRange { start, end } => self.output.push_range(start, end)?,
            Call::PushBoolean(flag) => self.output.push_boolean(flag),
            Call::PushString(text) => self.output.push_text(text),
            Call::PushArray { append_current } => self.output.push_array(append_current)?,
            Call::AppendToArray => self.output.append_to_array()?,
            Call::MakeLabel(name) => self.output.make_label(name)?,
            Call::MergeLabels(count) => self.output.merge_labels(count)?,
            Call::MakeObject(class) => self.output.make_object(class, self.factory)?,
            Call::Pop => self.output.pop()?,
            Call::LocalsPush(count) => self.locals.push_from(&mut self.output, count)?,
            Call::LocalsLoad(index) => self.locals.load(index, &mut self.output)?,
            Call::LocalsPop(count) => self.locals.pop(count)?,
            Call::Match(position) => return self.match_at(position),
            Call::MakeValue | Call::SetAsSource | Call::ReadFromSource => {
                return Err(ContractViolation::Unsupported {
                    operation: call.operation(),
                });
            }
            Call::TraceEnter(rule) => {
                if self.trace_calls {
                    debug!(target: CALLBACK_TARGET, rule, "entering rule");
                }
            }
            Call::TraceLeave { rule, successful } => {
                if self.trace_calls {
                    debug!(target: CALLBACK_TARGET, rule, successful, "leaving rule");
                }
            }
            Call::TraceFailure {
                position,
                reason,
                is_expectation,
            } => self.failures.record(position, reason, is_expectation),
        }
        Ok(None)
    }

    /// Compares the input at `position` against a popped range or text.
    fn match_at(&mut self, position: usize) -> Result<Option<usize>, ContractViolation> {
        let expected = self.output.pop_value(Operation::Match)?;
        let bytes = expected
            .as_bytes()
            .ok_or_else(|| ContractViolation::WrongVariant {
                operation: Operation::Match,
                expected: "range or text",
                found: expected.kind(),
            })?;
        let matched = self
            .input
            .get(position..)
            .is_some_and(|rest| rest.starts_with(bytes));
        Ok(matched.then_some(position + bytes.len()))
    }
}
