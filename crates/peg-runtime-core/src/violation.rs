//! Fatal mismatches between the runtime and a matcher.
//!
//! A contract violation is never a parse failure: it means the matcher issued
//! a callback sequence the runtime cannot honour, so the invocation is
//! abandoned and no value is returned.

use thiserror::Error;

use crate::operation::Operation;
use crate::value::ValueKind;

/// A callback sequence the runtime refuses to execute.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[non_exhaustive]
pub enum ContractViolation {
    /// The output stack held fewer values than the operation consumes.
    #[error("{operation} needs {needed} value(s) on the output stack but {available} are present")]
    OutputUnderflow {
        /// Operation that underflowed.
        operation: Operation,
        /// Values the operation consumes.
        needed: usize,
        /// Values that were on the stack.
        available: usize,
    },

    /// A popped value was not of the variant the operation requires.
    #[error("{operation} expected {expected} on the output stack but found {found}")]
    WrongVariant {
        /// Operation that popped the value.
        operation: Operation,
        /// Description of the accepted variants.
        expected: &'static str,
        /// Variant actually found.
        found: ValueKind,
    },

    /// More locals were released than are bound.
    #[error("{operation} releases {needed} local(s) but only {available} are bound")]
    LocalsUnderflow {
        /// Operation that underflowed.
        operation: Operation,
        /// Entries requested.
        needed: usize,
        /// Entries bound.
        available: usize,
    },

    /// A local was read at a depth beyond the bound entries.
    #[error("localsLoad({index}) reads beyond the {depth} bound local(s)")]
    LocalsIndexOutOfRange {
        /// Requested depth from the top.
        index: usize,
        /// Entries bound.
        depth: usize,
    },

    /// A count argument was negative.
    #[error("{operation} received negative count {count}")]
    NegativeCount {
        /// Operation that received the count.
        operation: Operation,
        /// The count as passed.
        count: i64,
    },

    /// A position pointed outside the input buffer.
    #[error("{operation} received address {address:#x} outside the input buffer")]
    PositionOutOfBounds {
        /// Operation that received the position.
        operation: Operation,
        /// Raw address passed by the matcher.
        address: usize,
    },

    /// A range ended before it started.
    #[error("{operation} received inverted range {start}..{end}")]
    InvertedRange {
        /// Operation that received the range.
        operation: Operation,
        /// Start offset.
        start: usize,
        /// End offset.
        end: usize,
    },

    /// A string argument was null or not valid UTF-8.
    #[error("{operation} received a null or non-UTF-8 string")]
    InvalidString {
        /// Operation that received the string.
        operation: Operation,
    },

    /// A reserved table entry was invoked.
    #[error("{operation} is not supported by this runtime")]
    Unsupported {
        /// The reserved operation.
        operation: Operation,
    },

    /// A callback panicked, typically inside a user factory.
    #[error("{operation} panicked: {message}")]
    CallbackPanicked {
        /// Operation whose handler panicked.
        operation: Operation,
        /// Panic payload, when it was a string.
        message: String,
    },

    /// The matcher reported success without leaving exactly one value.
    #[error("matcher succeeded leaving {remaining} value(s) on the output stack instead of one")]
    UnbalancedResult {
        /// Values left on the output stack.
        remaining: usize,
    },
}

impl ContractViolation {
    /// Returns the operation that triggered the violation.
    ///
    /// [`Self::UnbalancedResult`] is detected after the matcher returns and
    /// belongs to no single operation.
    #[must_use]
    pub const fn operation(&self) -> Option<Operation> {
        match self {
            Self::OutputUnderflow { operation, .. }
            | Self::WrongVariant { operation, .. }
            | Self::LocalsUnderflow { operation, .. }
            | Self::NegativeCount { operation, .. }
            | Self::PositionOutOfBounds { operation, .. }
            | Self::InvertedRange { operation, .. }
            | Self::InvalidString { operation }
            | Self::Unsupported { operation }
            | Self::CallbackPanicked { operation, .. } => Some(*operation),
            Self::LocalsIndexOutOfRange { .. } => Some(Operation::LocalsLoad),
            Self::UnbalancedResult { .. } => None,
        }
    }

    /// Converts a count argument to `usize`.
    ///
    /// # Errors
    ///
    /// Returns [`Self::NegativeCount`] when `count` is below zero.
    pub fn count(operation: Operation, count: i64) -> Result<usize, Self> {
        usize::try_from(count).map_err(|_| Self::NegativeCount { operation, count })
    }
}
