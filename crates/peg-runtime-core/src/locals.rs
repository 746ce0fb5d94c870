//! Scoped bindings used by repetitions and backreferences.
//!
//! Entries are addressed by depth from the top, never by absolute index, so
//! nested scopes opened with [`LocalsStack::push_from`] and closed with
//! [`LocalsStack::pop`] compose without knowing about each other.

use crate::operation::Operation;
use crate::output::OutputStack;
use crate::value::Value;
use crate::violation::ContractViolation;

/// Invocation-scoped stack of local bindings.
///
/// # Example
///
/// ```
/// use peg_runtime_core::{LocalsStack, OutputStack, Value};
///
/// let mut output = OutputStack::new(b"ab");
/// let mut locals = LocalsStack::new();
/// output.push_range(0, 2).expect("push");
/// locals.push_from(&mut output, 1).expect("bind");
/// locals.load(0, &mut output).expect("load");
/// assert_eq!(output.peek().and_then(Value::as_bytes), Some(&b"ab"[..]));
/// locals.pop(1).expect("release");
/// assert!(locals.is_empty());
/// ```
#[derive(Debug, Clone, Default)]
pub struct LocalsStack<'a> {
    values: Vec<Value<'a>>,
}

impl<'a> LocalsStack<'a> {
    /// Creates an empty locals stack.
    #[must_use]
    pub const fn new() -> Self {
        Self { values: Vec::new() }
    }

    /// Returns the number of bound entries.
    #[must_use]
    pub const fn depth(&self) -> usize {
        self.values.len()
    }

    /// Returns `true` when nothing is bound.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Moves `count` values from `output` onto this stack.
    ///
    /// Values are transferred one pop at a time, so the value that was
    /// deepest on the output stack ends up on top here.
    ///
    /// # Errors
    ///
    /// Returns [`ContractViolation::OutputUnderflow`] when `output` holds
    /// fewer than `count` values; nothing is moved in that case.
    pub fn push_from(
        &mut self,
        output: &mut OutputStack<'a>,
        count: usize,
    ) -> Result<(), ContractViolation> {
        let available = output.len();
        if available < count {
            return Err(ContractViolation::OutputUnderflow {
                operation: Operation::LocalsPush,
                needed: count,
                available,
            });
        }
        for _ in 0..count {
            self.values.push(output.pop_value(Operation::LocalsPush)?);
        }
        Ok(())
    }

    /// Copies the entry `index` levels below the top onto `output`.
    ///
    /// # Errors
    ///
    /// Returns [`ContractViolation::LocalsIndexOutOfRange`] when fewer than
    /// `index + 1` entries are bound.
    pub fn load(&self, index: usize, output: &mut OutputStack<'a>) -> Result<(), ContractViolation> {
        let depth = self.values.len();
        let value = depth
            .checked_sub(index.saturating_add(1))
            .and_then(|slot| self.values.get(slot))
            .ok_or(ContractViolation::LocalsIndexOutOfRange { index, depth })?;
        output.push(value.clone());
        Ok(())
    }

    /// Releases the top `count` entries.
    ///
    /// # Errors
    ///
    /// Returns [`ContractViolation::LocalsUnderflow`] when fewer than `count`
    /// entries are bound; nothing is released in that case.
    pub fn pop(&mut self, count: usize) -> Result<(), ContractViolation> {
        let available = self.values.len();
        let keep = available
            .checked_sub(count)
            .ok_or(ContractViolation::LocalsUnderflow {
                operation: Operation::LocalsPop,
                needed: count,
                available,
            })?;
        self.values.truncate(keep);
        Ok(())
    }
}
