//! Errors surfaced to callers of the runtime.
//!
//! Parse failures and contract violations are kept in distinct variants so a
//! caller can tell "the input does not match" from "the matcher and runtime
//! disagree". Loader errors are wrapped in `Arc` to satisfy the
//! `result_large_err` Clippy lint and keep the enum cloneable.

use std::path::PathBuf;
use std::sync::Arc;

use peg_runtime_core::{ContractViolation, ParsingError};
use thiserror::Error;

/// Errors arising from loading matchers and running rules.
#[derive(Debug, Clone, Error)]
pub enum RuntimeError {
    /// The rule did not match the input.
    #[error("parse failed {0}")]
    Parse(#[from] ParsingError),

    /// The matcher broke the callback contract while running a rule.
    #[error("matcher for rule '{rule}' broke the callback contract: {source}")]
    Contract {
        /// Rule that was running.
        rule: String,
        /// First violation observed.
        #[source]
        source: ContractViolation,
    },

    /// The matcher module could not be loaded.
    #[error("failed to load matcher module {}: {message}", path.display())]
    ModuleLoad {
        /// Module path.
        path: PathBuf,
        /// Human-readable failure description.
        message: String,
        /// Optional underlying loader error.
        #[source]
        source: Option<Arc<libloading::Error>>,
    },

    /// The module was built against a different callback table.
    #[error(
        "matcher module {} targets ABI v{found_version} with {found_callbacks} callbacks; \
         runtime provides v{expected_version} with {expected_callbacks}",
        path.display()
    )]
    AbiMismatch {
        /// Module path.
        path: PathBuf,
        /// ABI version reported by the module.
        found_version: u32,
        /// Callback count reported by the module.
        found_callbacks: u32,
        /// ABI version of this runtime.
        expected_version: u32,
        /// Callback count of this runtime.
        expected_callbacks: u32,
    },

    /// No entry point exists for the rule.
    #[error("no entry point '{symbol}' for rule '{rule}'")]
    EntryNotFound {
        /// Requested rule.
        rule: String,
        /// Symbol that was looked up.
        symbol: String,
    },

    /// A rule was registered twice with a static engine.
    #[error("rule '{rule}' is already registered")]
    DuplicateRule {
        /// Rule name.
        rule: String,
    },
}

impl RuntimeError {
    /// Returns `true` for an ordinary parse failure, `false` for every
    /// internal or loading error.
    #[must_use]
    pub const fn is_parse_failure(&self) -> bool {
        matches!(self, Self::Parse(_))
    }

    /// Returns the diagnostic of a parse failure.
    #[must_use]
    pub const fn as_parsing_error(&self) -> Option<&ParsingError> {
        match self {
            Self::Parse(error) => Some(error),
            _ => None,
        }
    }

    /// Returns the violation behind a contract error.
    #[must_use]
    pub const fn as_contract_violation(&self) -> Option<&ContractViolation> {
        match self {
            Self::Contract { source, .. } => Some(source),
            _ => None,
        }
    }
}
