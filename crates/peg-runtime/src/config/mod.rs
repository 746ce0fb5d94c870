//! Settings shared by every parse run through a [`Parser`](crate::Parser).
//!
//! The configuration is plain data: embedding applications can deserialize
//! it from their own configuration files, and any omitted field falls back
//! to its default.

use peg_runtime_core::{DEFAULT_CONTEXT_BYTES, ErrorFormatter};
use serde::{Deserialize, Serialize};

/// Suffix appended to a rule name to form its entry-point symbol.
pub const DEFAULT_ENTRY_SUFFIX: &str = "_match";

/// Runtime behaviour switches.
///
/// # Example
///
/// ```
/// use peg_runtime::RuntimeConfig;
///
/// let config: RuntimeConfig =
///     serde_json::from_str(r#"{"trace_callbacks": true}"#).expect("valid config");
/// assert!(config.trace_callbacks());
/// assert_eq!(config.entry_suffix(), "_match");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RuntimeConfig {
    trace_callbacks: bool,
    entry_suffix: String,
    error_context_bytes: usize,
}

impl RuntimeConfig {
    /// Creates the default configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Enables or disables logging of every matcher callback.
    #[must_use]
    pub const fn with_trace_callbacks(mut self, enabled: bool) -> Self {
        self.trace_callbacks = enabled;
        self
    }

    /// Sets the entry-point symbol suffix used by native modules.
    #[must_use]
    pub fn with_entry_suffix(mut self, suffix: impl Into<String>) -> Self {
        self.entry_suffix = suffix.into();
        self
    }

    /// Sets how many bytes of input precede a failure in diagnostics.
    #[must_use]
    pub const fn with_error_context_bytes(mut self, bytes: usize) -> Self {
        self.error_context_bytes = bytes;
        self
    }

    /// Returns whether callbacks are logged.
    #[must_use]
    pub const fn trace_callbacks(&self) -> bool {
        self.trace_callbacks
    }

    /// Returns the entry-point symbol suffix.
    #[must_use]
    pub fn entry_suffix(&self) -> &str {
        &self.entry_suffix
    }

    /// Returns the number of context bytes shown in diagnostics.
    #[must_use]
    pub const fn error_context_bytes(&self) -> usize {
        self.error_context_bytes
    }

    /// Builds the formatter for parse failures.
    #[must_use]
    pub const fn error_formatter(&self) -> ErrorFormatter {
        ErrorFormatter::new(self.error_context_bytes)
    }
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            trace_callbacks: false,
            entry_suffix: String::from(DEFAULT_ENTRY_SUFFIX),
            error_context_bytes: DEFAULT_CONTEXT_BYTES,
        }
    }
}
