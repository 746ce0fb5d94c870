//! Binary interface between the runtime and compiled matchers.
//!
//! A matcher is handed one [`CallbackTable`] per invocation and drives the
//! runtime exclusively through it. The table layout is a versioned contract:
//! its header carries [`ABI_VERSION`] and [`CALLBACK_COUNT`], and its slots
//! follow the order of [`Operation::ALL`](peg_runtime_core::Operation::ALL).
//!
//! Every callback takes the opaque context pointer the entry point received
//! as its first argument. Positions cross the boundary as pointers into the
//! input buffer, strings as NUL-terminated UTF-8, and counts as `i64`.

use std::ffi::{c_char, c_void};

use crate::callbacks;

/// Version of the callback table layout implemented by this runtime.
pub const ABI_VERSION: u32 = 1;

/// Number of callback slots in a [`CallbackTable`].
pub const CALLBACK_COUNT: u32 = 20;

/// Name of the symbol a native matcher module exports to describe its ABI.
pub const DESCRIPTOR_SYMBOL: &str = "peg_matcher_abi";

/// Signature of a compiled rule.
///
/// Arguments are the context pointer, the first input byte, the sentinel
/// byte appended after the input, the initial backreference flag, and the
/// callback table. A nonzero return means the rule matched.
pub type EntryPoint = unsafe extern "C" fn(
    ctx: *mut c_void,
    input_start: *const u8,
    input_end: *const u8,
    initial_flag: bool,
    table: *const CallbackTable,
) -> i32;

/// Signature of the [`DESCRIPTOR_SYMBOL`] export.
pub type DescriptorFn = unsafe extern "C" fn() -> AbiDescriptor;

/// ABI a matcher module was compiled against.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AbiDescriptor {
    /// Table layout version.
    pub version: u32,
    /// Number of callbacks the module expects.
    pub callback_count: u32,
}

impl AbiDescriptor {
    /// Descriptor of the table this runtime provides.
    pub const CURRENT: Self = Self {
        version: ABI_VERSION,
        callback_count: CALLBACK_COUNT,
    };

    /// Returns `true` when a module built for `self` can use this runtime.
    #[must_use]
    pub const fn is_compatible(&self) -> bool {
        self.version == ABI_VERSION && self.callback_count == CALLBACK_COUNT
    }
}

/// Ordered function-pointer table handed to every entry point.
#[repr(C)]
#[derive(Debug, Clone, Copy)]
pub struct CallbackTable {
    /// Table layout version, always [`ABI_VERSION`].
    pub version: u32,
    /// Number of callback slots that follow, always [`CALLBACK_COUNT`].
    pub len: u32,
    /// `pushEmpty()`.
    pub push_empty: unsafe extern "C" fn(ctx: *mut c_void),
    /// `pushInputRange(from, to)`.
    pub push_input_range: unsafe extern "C" fn(ctx: *mut c_void, from: *const u8, to: *const u8),
    /// `pushBoolean(value)`.
    pub push_boolean: unsafe extern "C" fn(ctx: *mut c_void, value: bool),
    /// `pushString(value)`.
    pub push_string: unsafe extern "C" fn(ctx: *mut c_void, value: *const c_char),
    /// `pushArray(appendCurrent)`.
    pub push_array: unsafe extern "C" fn(ctx: *mut c_void, append_current: bool),
    /// `appendToArray()`.
    pub append_to_array: unsafe extern "C" fn(ctx: *mut c_void),
    /// `makeLabel(name)`.
    pub make_label: unsafe extern "C" fn(ctx: *mut c_void, name: *const c_char),
    /// `mergeLabels(count)`.
    pub merge_labels: unsafe extern "C" fn(ctx: *mut c_void, count: i64),
    /// `makeValue(code, filename, line)`, reserved.
    pub make_value: unsafe extern "C" fn(
        ctx: *mut c_void,
        code: *const c_char,
        filename: *const c_char,
        line: i64,
    ),
    /// `makeObject(class)`.
    pub make_object: unsafe extern "C" fn(ctx: *mut c_void, class: *const c_char),
    /// `pop()`.
    pub pop: unsafe extern "C" fn(ctx: *mut c_void),
    /// `localsPush(count)`.
    pub locals_push: unsafe extern "C" fn(ctx: *mut c_void, count: i64),
    /// `localsLoad(index)`.
    pub locals_load: unsafe extern "C" fn(ctx: *mut c_void, index: i64),
    /// `localsPop(count)`.
    pub locals_pop: unsafe extern "C" fn(ctx: *mut c_void, count: i64),
    /// `match(position)`, returning the advanced position or null.
    pub match_at: unsafe extern "C" fn(ctx: *mut c_void, position: *const u8) -> *const u8,
    /// `setAsSource()`, reserved.
    pub set_as_source: unsafe extern "C" fn(ctx: *mut c_void),
    /// `readFromSource(name)`, reserved.
    pub read_from_source: unsafe extern "C" fn(ctx: *mut c_void, name: *const c_char),
    /// `traceEnter(rule)`.
    pub trace_enter: unsafe extern "C" fn(ctx: *mut c_void, rule: *const c_char),
    /// `traceLeave(rule, successful)`.
    pub trace_leave: unsafe extern "C" fn(ctx: *mut c_void, rule: *const c_char, successful: bool),
    /// `traceFailure(position, reason, isExpectation)`.
    pub trace_failure: unsafe extern "C" fn(
        ctx: *mut c_void,
        position: *const u8,
        reason: *const c_char,
        is_expectation: bool,
    ),
}

impl CallbackTable {
    /// Builds the table of runtime callbacks.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            version: ABI_VERSION,
            len: CALLBACK_COUNT,
            push_empty: callbacks::push_empty,
            push_input_range: callbacks::push_input_range,
            push_boolean: callbacks::push_boolean,
            push_string: callbacks::push_string,
            push_array: callbacks::push_array,
            append_to_array: callbacks::append_to_array,
            make_label: callbacks::make_label,
            merge_labels: callbacks::merge_labels,
            make_value: callbacks::make_value,
            make_object: callbacks::make_object,
            pop: callbacks::pop,
            locals_push: callbacks::locals_push,
            locals_load: callbacks::locals_load,
            locals_pop: callbacks::locals_pop,
            match_at: callbacks::match_at,
            set_as_source: callbacks::set_as_source,
            read_from_source: callbacks::read_from_source,
            trace_enter: callbacks::trace_enter,
            trace_leave: callbacks::trace_leave,
            trace_failure: callbacks::trace_failure,
        }
    }

    /// Returns the descriptor matching this table's header.
    #[must_use]
    pub const fn descriptor(&self) -> AbiDescriptor {
        AbiDescriptor {
            version: self.version,
            callback_count: self.len,
        }
    }
}

impl Default for CallbackTable {
    fn default() -> Self {
        Self::new()
    }
}

/// The table shared by every invocation; it holds no state.
pub(crate) static RUNTIME_TABLE: CallbackTable = CallbackTable::new();

#[cfg(test)]
mod tests;
