//! Furthest-failure tracking for PEG diagnostics.
//!
//! Only the rightmost position at which any alternative failed is kept,
//! together with every distinct reason recorded there. A record at a smaller
//! position is stale and discarded; a record further right replaces
//! everything collected so far.

use std::collections::BTreeSet;

/// Rightmost failure position and the reasons observed there.
///
/// Reasons are held in ordered sets, so they come out deduplicated and in
/// byte-wise lexical order regardless of the order the matcher reported
/// them.
///
/// # Example
///
/// ```
/// use peg_runtime_core::FailureTracker;
///
/// let mut tracker = FailureTracker::new();
/// tracker.record(5, "digit", true);
/// tracker.record(3, "x", true);
/// tracker.record(5, "letter", true);
/// assert_eq!(tracker.position(), Some(5));
/// assert_eq!(tracker.expectations().collect::<Vec<_>>(), ["digit", "letter"]);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FailureTracker {
    position: Option<usize>,
    expectations: BTreeSet<String>,
    other_reasons: BTreeSet<String>,
}

impl FailureTracker {
    /// Creates a tracker with no failure recorded.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            position: None,
            expectations: BTreeSet::new(),
            other_reasons: BTreeSet::new(),
        }
    }

    /// Records that a match attempt failed at `position` for `reason`.
    ///
    /// Expectations name what would have matched (`"digit"`, `"\"if\""`);
    /// other reasons are free-form messages such as explicit grammar errors.
    pub fn record(&mut self, position: usize, reason: &str, is_expectation: bool) {
        match self.position {
            Some(current) if position < current => return,
            Some(current) if position == current => {}
            _ => {
                self.position = Some(position);
                self.expectations.clear();
                self.other_reasons.clear();
            }
        }
        let reasons = if is_expectation {
            &mut self.expectations
        } else {
            &mut self.other_reasons
        };
        if !reasons.contains(reason) {
            reasons.insert(reason.to_owned());
        }
    }

    /// Returns the furthest failure position, or `None` when nothing failed.
    #[must_use]
    pub const fn position(&self) -> Option<usize> {
        self.position
    }

    /// Returns the expectations recorded at the furthest position.
    pub fn expectations(&self) -> impl ExactSizeIterator<Item = &str> {
        self.expectations.iter().map(String::as_str)
    }

    /// Returns the other reasons recorded at the furthest position.
    pub fn other_reasons(&self) -> impl ExactSizeIterator<Item = &str> {
        self.other_reasons.iter().map(String::as_str)
    }

    /// Returns `true` when no failure has been recorded.
    #[must_use]
    pub const fn is_clear(&self) -> bool {
        self.position.is_none()
    }
}
