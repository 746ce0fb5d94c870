//! Runtime half of a PEG matcher engine.
//!
//! A grammar compiler turns each rule into native code exposing one entry
//! point. This crate calls those entry points over an input buffer, serves
//! the callbacks they issue while matching, and turns the result into either
//! a [`Value`] or a [`ParsingError`] located at the furthest failure.
//!
//! # Architecture
//!
//! - [`MatchingEngine`] resolves rule names to [`EntryPoint`]s, either from
//!   matchers linked into the process ([`StaticEngine`]) or from a shared
//!   library ([`NativeEngine`]).
//! - [`Parser`] invokes an entry point with a fresh set of stacks per call,
//!   handing the matcher the [`CallbackTable`] and an opaque context pointer.
//! - The data model and the stack machines live in [`peg_runtime_core`] and
//!   are re-exported here.
//!
//! Errors are split along one line: [`RuntimeError::Parse`] means the input
//! does not match the rule; every other variant means the matcher, the
//! module or the runtime is at fault.
//!
//! # Logging
//!
//! Invocations are logged with `tracing` under the `peg_runtime::parser`
//! target. With [`RuntimeConfig::trace_callbacks`] set, every callback is
//! logged under `peg_runtime::callbacks`. Installing a subscriber is left to
//! the embedding application.
//!
//! # Example
//!
//! ```rust,no_run
//! use peg_runtime::{NativeEngine, Parser, RuntimeConfig};
//!
//! let config = RuntimeConfig::default().with_trace_callbacks(true);
//! // SAFETY: `grammar.so` was produced by the matcher compiler.
//! let engine = unsafe { NativeEngine::load_with_config("grammar.so", &config) }
//!     .expect("module loads");
//! let parser = Parser::with_config(engine, config);
//! match parser.parse("document", b"key = value") {
//!     Ok(value) => println!("{}", serde_json::to_string(&value).expect("serialise")),
//!     Err(err) => eprintln!("{err}"),
//! }
//! ```

pub mod abi;
mod callbacks;
pub mod config;
pub mod engine;
pub mod error;
mod parser;
mod session;
#[cfg(any(test, feature = "test-support"))]
pub mod test_support;

pub use peg_runtime_core::{
    ContractViolation, DEFAULT_CONTEXT_BYTES, ErrorFormatter, Factory, FailureTracker,
    IdentityFactory, InputRange, Location, Operation, ParsingError, TaggingFactory, Value,
    ValueKind,
};

pub use self::abi::{ABI_VERSION, AbiDescriptor, CALLBACK_COUNT, CallbackTable, EntryPoint};
pub use self::config::RuntimeConfig;
pub use self::engine::{MatchingEngine, NativeEngine, StaticEngine};
pub use self::error::RuntimeError;
pub use self::parser::{Parser, parse};

#[cfg(test)]
mod tests;
