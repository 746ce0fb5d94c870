//! Sources of compiled rule entry points.
//!
//! The [`Parser`](crate::Parser) never loads code itself. It asks a
//! [`MatchingEngine`] for the entry point of a rule and calls it. Two
//! engines are provided: [`StaticEngine`] for matchers linked into the
//! process, and [`NativeEngine`] for matchers compiled into a shared library.

mod native;

use std::collections::HashMap;

use crate::abi::EntryPoint;
use crate::error::RuntimeError;

pub use self::native::NativeEngine;

/// Resolves rule names to compiled entry points.
///
/// # Example
///
/// ```
/// use peg_runtime::{EntryPoint, MatchingEngine, RuntimeError};
///
/// struct NoRules;
///
/// impl MatchingEngine for NoRules {
///     fn entry_point(&self, rule: &str) -> Result<EntryPoint, RuntimeError> {
///         Err(RuntimeError::EntryNotFound {
///             rule: rule.to_owned(),
///             symbol: rule.to_owned(),
///         })
///     }
/// }
///
/// assert!(NoRules.entry_point("value").is_err());
/// ```
pub trait MatchingEngine {
    /// Returns the entry point compiled for `rule`.
    ///
    /// # Errors
    ///
    /// Returns [`RuntimeError::EntryNotFound`] when the engine has no such
    /// rule.
    fn entry_point(&self, rule: &str) -> Result<EntryPoint, RuntimeError>;
}

/// Entry points registered by name at run time.
///
/// Duplicate registrations for the same rule are rejected.
#[derive(Debug, Clone, Default)]
pub struct StaticEngine {
    rules: HashMap<String, EntryPoint>,
}

impl StaticEngine {
    /// Creates an engine with no rules.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `entry` under `rule`.
    ///
    /// # Errors
    ///
    /// Returns [`RuntimeError::DuplicateRule`] if the rule is already
    /// registered.
    pub fn register(
        &mut self,
        rule: impl Into<String>,
        entry: EntryPoint,
    ) -> Result<(), RuntimeError> {
        let name = rule.into();
        if self.rules.contains_key(&name) {
            return Err(RuntimeError::DuplicateRule { rule: name });
        }
        self.rules.insert(name, entry);
        Ok(())
    }

    /// Registers `entry` and returns the engine, for building in one
    /// expression.
    ///
    /// # Errors
    ///
    /// As for [`Self::register`].
    pub fn with_rule(
        mut self,
        rule: impl Into<String>,
        entry: EntryPoint,
    ) -> Result<Self, RuntimeError> {
        self.register(rule, entry)?;
        Ok(self)
    }

    /// Returns the registered rule names in unspecified order.
    pub fn rules(&self) -> impl Iterator<Item = &str> {
        self.rules.keys().map(String::as_str)
    }

    /// Returns the number of registered rules.
    #[must_use]
    pub fn len(&self) -> usize {
        self.rules.len()
    }

    /// Returns `true` when no rules are registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}

impl MatchingEngine for StaticEngine {
    fn entry_point(&self, rule: &str) -> Result<EntryPoint, RuntimeError> {
        self.rules
            .get(rule)
            .copied()
            .ok_or_else(|| RuntimeError::EntryNotFound {
                rule: rule.to_owned(),
                symbol: rule.to_owned(),
            })
    }
}
