//! The stack on which a matcher assembles its result tree.
//!
//! Each method corresponds to one result-building callback. The matcher
//! decides the order; the stack only guarantees the documented effect of
//! each call and rejects sequences that would underflow or combine values of
//! the wrong variant.

use std::collections::BTreeMap;

use crate::factory::Factory;
use crate::operation::Operation;
use crate::value::{InputRange, Value};
use crate::violation::ContractViolation;

/// Invocation-scoped stack of [`Value`]s referencing one input buffer.
///
/// # Example
///
/// ```
/// use peg_runtime_core::OutputStack;
///
/// let mut output = OutputStack::new(b"");
/// output.push_array(false).expect("push");
/// for _ in 0..3 {
///     output.push_boolean(true);
///     output.append_to_array().expect("append");
/// }
/// let array = output.into_result().expect("one value");
/// assert_eq!(array.as_array().map(|items| items.len()), Some(3));
/// ```
#[derive(Debug, Clone)]
pub struct OutputStack<'a> {
    input: &'a [u8],
    values: Vec<Value<'a>>,
}

impl<'a> OutputStack<'a> {
    /// Creates an empty stack for ranges over `input`.
    #[must_use]
    pub const fn new(input: &'a [u8]) -> Self {
        Self {
            input,
            values: Vec::new(),
        }
    }

    /// Returns the number of values on the stack.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.values.len()
    }

    /// Returns `true` when the stack holds no values.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Returns the value on top of the stack.
    #[must_use]
    pub fn peek(&self) -> Option<&Value<'a>> {
        self.values.last()
    }

    /// Pushes an arbitrary value.
    pub fn push(&mut self, value: Value<'a>) {
        self.values.push(value);
    }

    /// Pops the top value on behalf of `operation`.
    ///
    /// # Errors
    ///
    /// Returns [`ContractViolation::OutputUnderflow`] when the stack is empty.
    pub fn pop_value(&mut self, operation: Operation) -> Result<Value<'a>, ContractViolation> {
        self.values
            .pop()
            .ok_or(ContractViolation::OutputUnderflow {
                operation,
                needed: 1,
                available: 0,
            })
    }

    /// Pushes [`Value::Empty`].
    pub fn push_empty(&mut self) {
        self.push(Value::Empty);
    }

    /// Pushes a range over `input[start..end]`.
    ///
    /// # Errors
    ///
    /// Returns [`ContractViolation::InvertedRange`] when the offsets are
    /// inverted or exceed the input.
    pub fn push_range(&mut self, start: usize, end: usize) -> Result<(), ContractViolation> {
        let range = InputRange::new(self.input, start, end).ok_or(
            ContractViolation::InvertedRange {
                operation: Operation::PushInputRange,
                start,
                end,
            },
        )?;
        self.push(Value::Range(range));
        Ok(())
    }

    /// Pushes a boolean.
    pub fn push_boolean(&mut self, flag: bool) {
        self.push(Value::Boolean(flag));
    }

    /// Pushes an owned copy of `text`.
    pub fn push_text(&mut self, text: &str) {
        self.push(Value::Text(text.to_owned()));
    }

    /// Pushes a new array.
    ///
    /// With `append_current` the top value is popped and becomes the sole
    /// element; otherwise the array starts empty.
    ///
    /// # Errors
    ///
    /// Returns [`ContractViolation::OutputUnderflow`] when `append_current`
    /// is set and the stack is empty.
    pub fn push_array(&mut self, append_current: bool) -> Result<(), ContractViolation> {
        let items = if append_current {
            vec![self.pop_value(Operation::PushArray)?]
        } else {
            Vec::new()
        };
        self.push(Value::Array(items));
        Ok(())
    }

    /// Pops a value and appends it to the array beneath it.
    ///
    /// # Errors
    ///
    /// Returns a violation when fewer than two values are present or the
    /// second value is not an array.
    pub fn append_to_array(&mut self) -> Result<(), ContractViolation> {
        self.require(Operation::AppendToArray, 2)?;
        let item = self.pop_value(Operation::AppendToArray)?;
        match self.pop_value(Operation::AppendToArray)? {
            Value::Array(mut items) => {
                items.push(item);
                self.push(Value::Array(items));
                Ok(())
            }
            other => Err(ContractViolation::WrongVariant {
                operation: Operation::AppendToArray,
                expected: "array",
                found: other.kind(),
            }),
        }
    }

    /// Pops a value and pushes a single-entry mapping `{name: value}`.
    ///
    /// # Errors
    ///
    /// Returns [`ContractViolation::OutputUnderflow`] on an empty stack.
    pub fn make_label(&mut self, name: &str) -> Result<(), ContractViolation> {
        let value = self.pop_value(Operation::MakeLabel)?;
        self.push(Value::Mapping([(name.to_owned(), value)].into()));
        Ok(())
    }

    /// Pops `count` mappings and pushes their union.
    ///
    /// Mappings are merged in pop order, so on a key collision the entry
    /// from the mapping popped last (the one pushed earliest) wins.
    ///
    /// # Errors
    ///
    /// Returns a violation when fewer than `count` values are present or a
    /// popped value is neither `Empty` nor `Mapping`.
    pub fn merge_labels(&mut self, count: usize) -> Result<(), ContractViolation> {
        self.require(Operation::MergeLabels, count)?;
        let mut merged = BTreeMap::new();
        for _ in 0..count {
            let entries = self
                .pop_value(Operation::MergeLabels)?
                .into_mapping()
                .map_err(|other| ContractViolation::WrongVariant {
                    operation: Operation::MergeLabels,
                    expected: "mapping",
                    found: other.kind(),
                })?;
            merged.extend(entries);
        }
        self.push(Value::Mapping(merged));
        Ok(())
    }

    /// Pops a value and pushes what `factory` builds from it.
    ///
    /// # Errors
    ///
    /// Returns [`ContractViolation::OutputUnderflow`] on an empty stack.
    pub fn make_object(
        &mut self,
        class: &str,
        factory: &dyn Factory,
    ) -> Result<(), ContractViolation> {
        let payload = self.pop_value(Operation::MakeObject)?;
        self.push(factory.make_object(class, payload));
        Ok(())
    }

    /// Discards the top value.
    ///
    /// # Errors
    ///
    /// Returns [`ContractViolation::OutputUnderflow`] on an empty stack.
    pub fn pop(&mut self) -> Result<(), ContractViolation> {
        self.pop_value(Operation::Pop).map(drop)
    }

    /// Consumes the stack, yielding its single remaining value.
    ///
    /// # Errors
    ///
    /// Returns [`ContractViolation::UnbalancedResult`] unless exactly one
    /// value remains.
    pub fn into_result(mut self) -> Result<Value<'a>, ContractViolation> {
        match (self.values.pop(), self.values.len()) {
            (Some(value), 0) => Ok(value),
            (top, below) => Err(ContractViolation::UnbalancedResult {
                remaining: below + usize::from(top.is_some()),
            }),
        }
    }

    const fn require(
        &self,
        operation: Operation,
        needed: usize,
    ) -> Result<(), ContractViolation> {
        let available = self.values.len();
        if available < needed {
            return Err(ContractViolation::OutputUnderflow {
                operation,
                needed,
                available,
            });
        }
        Ok(())
    }
}
