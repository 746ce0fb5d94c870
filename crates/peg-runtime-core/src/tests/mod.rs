//! Unit tests for `peg_runtime_core` types.

mod diagnostic_tests;
mod output_tests;

mod behaviour;
