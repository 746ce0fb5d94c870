//! The invocation harness: runs one rule over one input.

use std::fmt;
use std::path::Path;

use peg_runtime_core::{Factory, IdentityFactory, Value};
use tracing::debug;

use crate::callbacks;
use crate::config::RuntimeConfig;
use crate::engine::{MatchingEngine, NativeEngine};
use crate::error::RuntimeError;
use crate::session::{Outcome, Session};

const PARSE_TARGET: &str = "peg_runtime::parser";

/// Runs rules from a [`MatchingEngine`] and turns their callbacks into
/// values.
///
/// Every [`Parser::parse`] call builds its own stacks and failure tracker, so
/// one parser can serve concurrent calls from several threads.
///
/// # Example
///
/// ```
/// use peg_runtime::{Parser, StaticEngine};
///
/// let parser = Parser::new(StaticEngine::new());
/// let err = parser.parse("missing", b"input").expect_err("no such rule");
/// assert!(!err.is_parse_failure());
/// ```
pub struct Parser<E> {
    engine: E,
    config: RuntimeConfig,
    factory: Box<dyn Factory>,
}

impl<E> Parser<E> {
    /// Creates a parser with the default configuration and
    /// [`IdentityFactory`].
    #[must_use]
    pub fn new(engine: E) -> Self {
        Self::with_config(engine, RuntimeConfig::default())
    }

    /// Creates a parser with `config` and [`IdentityFactory`].
    #[must_use]
    pub fn with_config(engine: E, config: RuntimeConfig) -> Self {
        Self {
            engine,
            config,
            factory: Box::new(IdentityFactory),
        }
    }

    /// Replaces the factory used by `makeObject`.
    #[must_use]
    pub fn with_factory(mut self, factory: impl Factory + 'static) -> Self {
        self.factory = Box::new(factory);
        self
    }

    /// Returns the matching engine.
    #[must_use]
    pub const fn engine(&self) -> &E {
        &self.engine
    }

    /// Returns the configuration.
    #[must_use]
    pub const fn config(&self) -> &RuntimeConfig {
        &self.config
    }
}

impl<E: MatchingEngine> Parser<E> {
    /// Matches `rule` against the whole of `input`.
    ///
    /// On success the single value the matcher built is returned; ranges in
    /// it borrow `input`.
    ///
    /// # Errors
    ///
    /// Returns [`RuntimeError::Parse`] when the rule does not match,
    /// [`RuntimeError::Contract`] when the matcher misuses the callbacks, and
    /// any error the engine reports while resolving the rule.
    pub fn parse<'a>(&self, rule: &str, input: &'a [u8]) -> Result<Value<'a>, RuntimeError> {
        let entry = self.engine.entry_point(rule)?;
        debug!(
            target: PARSE_TARGET,
            rule,
            input_len = input.len(),
            "invoking matcher"
        );
        let mut session = Session::new(
            input,
            self.factory.as_ref(),
            self.config.trace_callbacks(),
        );
        let matched = callbacks::invoke(entry, input, &mut session);
        match session.finish(matched) {
            Outcome::Matched(value) => {
                debug!(target: PARSE_TARGET, rule, kind = %value.kind(), "rule matched");
                Ok(value)
            }
            Outcome::Failed(failures) => {
                let error = self.config.error_formatter().format(input, &failures);
                debug!(target: PARSE_TARGET, rule, %error, "rule did not match");
                Err(RuntimeError::Parse(error))
            }
            Outcome::Violated(source) => Err(RuntimeError::Contract {
                rule: rule.to_owned(),
                source,
            }),
        }
    }
}

impl<E: fmt::Debug> fmt::Debug for Parser<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Parser")
            .field("engine", &self.engine)
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

/// Loads the matcher module at `module` and matches `rule` against `input`.
///
/// Convenience for one-off parses; load a [`NativeEngine`] once and reuse a
/// [`Parser`] when parsing repeatedly.
///
/// # Errors
///
/// As for [`NativeEngine::load`] and [`Parser::parse`].
///
/// # Safety
///
/// As for [`NativeEngine::load_with_config`].
pub unsafe fn parse<'a>(
    module: impl AsRef<Path>,
    rule: &str,
    input: &'a [u8],
) -> Result<Value<'a>, RuntimeError> {
    // SAFETY: forwarded to the caller.
    let engine = unsafe { NativeEngine::load(module) }?;
    Parser::new(engine).parse(rule, input)
}
