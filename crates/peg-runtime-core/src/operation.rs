//! Names of the callbacks a matcher may invoke, in callback-table order.

use std::fmt;

/// One entry of the callback table.
///
/// The declaration order is the binary order of the table handed to the
/// matcher; [`Operation::ALL`] and [`Operation::slot`] expose it.
///
/// # Example
///
/// ```
/// use peg_runtime_core::Operation;
///
/// assert_eq!(Operation::ALL.len(), 20);
/// assert_eq!(Operation::PushEmpty.slot(), 0);
/// assert_eq!(Operation::TraceFailure.to_string(), "traceFailure");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Operation {
    /// Push an empty mapping.
    PushEmpty,
    /// Push a range of the input.
    PushInputRange,
    /// Push a boolean.
    PushBoolean,
    /// Push a copy of a string.
    PushString,
    /// Push a new array, optionally seeded with the current top value.
    PushArray,
    /// Append the top value to the array beneath it.
    AppendToArray,
    /// Wrap the top value in a single-label mapping.
    MakeLabel,
    /// Merge several mappings into one.
    MergeLabels,
    /// Evaluate embedded value code (reserved).
    MakeValue,
    /// Pass the top value through the factory.
    MakeObject,
    /// Discard the top value.
    Pop,
    /// Move values from the output stack into a new locals scope.
    LocalsPush,
    /// Copy a local binding onto the output stack.
    LocalsLoad,
    /// Close a locals scope.
    LocalsPop,
    /// Match the input against a captured value.
    Match,
    /// Use the top value as the input of a nested grammar (reserved).
    SetAsSource,
    /// Read a label from the nested source (reserved).
    ReadFromSource,
    /// Observe rule entry.
    TraceEnter,
    /// Observe rule exit.
    TraceLeave,
    /// Record a failed match attempt.
    TraceFailure,
}

impl Operation {
    /// Every operation, in table order.
    pub const ALL: [Self; 20] = [
        Self::PushEmpty,
        Self::PushInputRange,
        Self::PushBoolean,
        Self::PushString,
        Self::PushArray,
        Self::AppendToArray,
        Self::MakeLabel,
        Self::MergeLabels,
        Self::MakeValue,
        Self::MakeObject,
        Self::Pop,
        Self::LocalsPush,
        Self::LocalsLoad,
        Self::LocalsPop,
        Self::Match,
        Self::SetAsSource,
        Self::ReadFromSource,
        Self::TraceEnter,
        Self::TraceLeave,
        Self::TraceFailure,
    ];

    /// Returns the zero-based position of this operation in the table.
    #[must_use]
    pub const fn slot(self) -> usize {
        self as usize
    }

    /// Returns the callback name used by matcher modules.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::PushEmpty => "pushEmpty",
            Self::PushInputRange => "pushInputRange",
            Self::PushBoolean => "pushBoolean",
            Self::PushString => "pushString",
            Self::PushArray => "pushArray",
            Self::AppendToArray => "appendToArray",
            Self::MakeLabel => "makeLabel",
            Self::MergeLabels => "mergeLabels",
            Self::MakeValue => "makeValue",
            Self::MakeObject => "makeObject",
            Self::Pop => "pop",
            Self::LocalsPush => "localsPush",
            Self::LocalsLoad => "localsLoad",
            Self::LocalsPop => "localsPop",
            Self::Match => "match",
            Self::SetAsSource => "setAsSource",
            Self::ReadFromSource => "readFromSource",
            Self::TraceEnter => "traceEnter",
            Self::TraceLeave => "traceLeave",
            Self::TraceFailure => "traceFailure",
        }
    }

    /// Returns `true` for table entries with no working implementation.
    #[must_use]
    pub const fn is_reserved(self) -> bool {
        matches!(
            self,
            Self::MakeValue | Self::SetAsSource | Self::ReadFromSource
        )
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
