//! Core data model and state machines for the PEG matcher runtime.
//!
//! A grammar is compiled elsewhere into a matcher module. While it runs, the
//! matcher drives the runtime purely through a fixed sequence of callbacks.
//! This crate holds everything those callbacks act on, independent of how the
//! matcher is loaded or called:
//!
//! - [`Value`] and [`InputRange`]: the tagged result type
//! - [`OutputStack`]: where the result tree is assembled
//! - [`LocalsStack`]: scoped bindings used by repetitions and backreferences
//! - [`FailureTracker`]: the furthest-failure heuristic
//! - [`ErrorFormatter`] and [`ParsingError`]: the user-facing diagnostic
//! - [`Factory`]: the pluggable object constructor used by `makeObject`
//! - [`Operation`]: the callback names in table order
//! - [`ContractViolation`]: fatal runtime/matcher mismatches
//!
//! The FFI boundary itself lives in the `peg_runtime` crate.
//!
//! # Example
//!
//! ```
//! use peg_runtime_core::{OutputStack, Value};
//!
//! let input = b"key=value";
//! let mut output = OutputStack::new(input);
//! output.push_range(4, 9).expect("range in bounds");
//! output.make_label("value").expect("one value on the stack");
//! let result = output.into_result().expect("balanced");
//! assert_eq!(result.get("value").and_then(Value::text).as_deref(), Some("value"));
//! ```

mod diagnostic;
mod factory;
mod failure;
mod locals;
mod operation;
mod output;
mod value;
mod violation;

pub use diagnostic::{DEFAULT_CONTEXT_BYTES, ErrorFormatter, Location, ParsingError};
pub use factory::{Factory, IdentityFactory, TaggingFactory};
pub use failure::FailureTracker;
pub use locals::LocalsStack;
pub use operation::Operation;
pub use output::OutputStack;
pub use value::{InputRange, Value, ValueKind};
pub use violation::ContractViolation;

#[cfg(test)]
mod tests;
