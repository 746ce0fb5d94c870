//! Rendering of parse failures into user-facing diagnostics.
//!
//! A [`ParsingError`] is the only description of a failed parse: where the
//! furthest failure happened, what input preceded it, and the reasons
//! recorded there. There is no error code beyond that.

use serde::Serialize;

use crate::failure::FailureTracker;

/// Number of bytes preceding the failure shown as context by default.
pub const DEFAULT_CONTEXT_BYTES: usize = 20;

/// Line and column of a byte position.
///
/// `line` is one plus the number of newlines before the position. `column`
/// is the distance from the last newline before the position, or the
/// position itself on the first line.
///
/// # Example
///
/// ```
/// use peg_runtime_core::Location;
///
/// let location = Location::locate(b"foo\nbar", 5);
/// assert_eq!((location.line(), location.column()), (2, 2));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Location {
    position: usize,
    line: usize,
    column: usize,
}

impl Location {
    /// Computes the location of `position` within `input`.
    ///
    /// Positions past the end are measured against the whole input.
    #[must_use]
    pub fn locate(input: &[u8], position: usize) -> Self {
        let before = input.get(..position).unwrap_or(input);
        let line = before.split(|&byte| byte == b'\n').count();
        let column = before
            .iter()
            .rposition(|&byte| byte == b'\n')
            .map_or(before.len(), |newline| before.len() - newline);
        Self {
            position,
            line,
            column,
        }
    }

    /// Returns the absolute byte position.
    #[must_use]
    pub const fn position(&self) -> usize {
        self.position
    }

    /// Returns the one-based line number.
    #[must_use]
    pub const fn line(&self) -> usize {
        self.line
    }

    /// Returns the column number.
    #[must_use]
    pub const fn column(&self) -> usize {
        self.column
    }
}

/// A failed parse, located at the furthest failure position.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, thiserror::Error)]
#[error(
    "at line {}, column {} (byte {}, after {:?}): {}",
    self.location.line,
    self.location.column,
    self.location.position,
    self.context,
    self.reasons()
)]
pub struct ParsingError {
    location: Location,
    context: String,
    expectations: Vec<String>,
    other_reasons: Vec<String>,
}

impl ParsingError {
    /// Returns where the furthest failure happened.
    #[must_use]
    pub const fn location(&self) -> &Location {
        &self.location
    }

    /// Returns the absolute byte position of the failure.
    #[must_use]
    pub const fn position(&self) -> usize {
        self.location.position
    }

    /// Returns the input immediately preceding the failure.
    #[must_use]
    pub fn context(&self) -> &str {
        &self.context
    }

    /// Returns the sorted, deduplicated expectations.
    #[must_use]
    pub fn expectations(&self) -> &[String] {
        &self.expectations
    }

    /// Returns the sorted, deduplicated free-form reasons.
    #[must_use]
    pub fn other_reasons(&self) -> &[String] {
        &self.other_reasons
    }

    /// Joins the reasons into the tail of the message.
    ///
    /// Free-form reasons come first, followed by a single
    /// `expected one of ...` clause, separated by `" / "`.
    #[must_use]
    pub fn reasons(&self) -> String {
        let mut parts = self.other_reasons.clone();
        if !self.expectations.is_empty() {
            parts.push(format!("expected one of {}", self.expectations.join(", ")));
        }
        if parts.is_empty() {
            return String::from("no failure reason recorded");
        }
        parts.join(" / ")
    }
}

/// Builds [`ParsingError`]s from the state of a [`FailureTracker`].
///
/// # Example
///
/// ```
/// use peg_runtime_core::{ErrorFormatter, FailureTracker};
///
/// let mut tracker = FailureTracker::new();
/// tracker.record(5, "digit", true);
/// let error = ErrorFormatter::default().format(b"foo\nbar", &tracker);
/// assert_eq!(
///     error.to_string(),
///     "at line 2, column 2 (byte 5, after \"foo\\nb\"): expected one of digit"
/// );
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ErrorFormatter {
    context_bytes: usize,
}

impl ErrorFormatter {
    /// Creates a formatter showing up to `context_bytes` bytes of context.
    #[must_use]
    pub const fn new(context_bytes: usize) -> Self {
        Self { context_bytes }
    }

    /// Returns the number of context bytes shown.
    #[must_use]
    pub const fn context_bytes(&self) -> usize {
        self.context_bytes
    }

    /// Renders the tracker's furthest failure against `input`.
    ///
    /// A tracker with no recorded failure reports position 0.
    #[must_use]
    pub fn format(&self, input: &[u8], tracker: &FailureTracker) -> ParsingError {
        let location = Location::locate(input, tracker.position().unwrap_or(0));
        let before = input.get(..location.position).unwrap_or(input);
        let context = before
            .get(before.len().saturating_sub(self.context_bytes)..)
            .unwrap_or_default();
        ParsingError {
            location,
            context: String::from_utf8_lossy(context).into_owned(),
            expectations: tracker.expectations().map(str::to_owned).collect(),
            other_reasons: tracker.other_reasons().map(str::to_owned).collect(),
        }
    }
}

impl Default for ErrorFormatter {
    fn default() -> Self {
        Self::new(DEFAULT_CONTEXT_BYTES)
    }
}
