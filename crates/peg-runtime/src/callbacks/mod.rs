//! `extern "C"` trampolines installed in the callback table.
//!
//! Each trampoline recovers the [`Frame`] from the context pointer, decodes
//! its raw arguments into a [`Call`] and hands it to the session. Nothing
//! unwinds out of this module: malformed arguments and panics become
//! contract violations recorded on the session.

use std::any::Any;
use std::ffi::{CStr, c_char, c_void};
use std::panic::{self, AssertUnwindSafe};
use std::ptr;

use peg_runtime_core::{ContractViolation, Operation};

use crate::abi::{EntryPoint, RUNTIME_TABLE};
use crate::session::{Call, Session};

/// The input buffer as seen by the matcher.
#[derive(Debug, Clone, Copy)]
pub(crate) struct Bounds {
    start: *const u8,
    len: usize,
}

impl Bounds {
    /// Converts a matcher position into an offset in `0..=len`.
    fn offset(
        self,
        operation: Operation,
        position: *const u8,
    ) -> Result<usize, ContractViolation> {
        let address = position.addr();
        address
            .checked_sub(self.start.addr())
            .filter(|&offset| offset <= self.len)
            .ok_or(ContractViolation::PositionOutOfBounds { operation, address })
    }
}

/// What the context pointer handed to the matcher points at.
pub(crate) struct Frame<'s, 'a, 'f> {
    bounds: Bounds,
    session: &'s mut Session<'a, 'f>,
}

/// Runs `entry` over `input` and reports whether it claimed a match.
///
/// The matcher sees a private copy of `input` followed by a NUL sentinel;
/// positions are translated back to offsets, so values still borrow the
/// caller's buffer.
pub(crate) fn invoke(entry: EntryPoint, input: &[u8], session: &mut Session<'_, '_>) -> bool {
    let mut buffer = Vec::with_capacity(input.len() + 1);
    buffer.extend_from_slice(input);
    buffer.push(0);
    let start = buffer.as_ptr();
    let bounds = Bounds {
        start,
        len: input.len(),
    };
    let mut frame = Frame { bounds, session };
    let ctx = ptr::from_mut(&mut frame).cast::<c_void>();
    let end = start.wrapping_add(input.len());
    // SAFETY: `entry` follows the matcher ABI. The frame and the buffer
    // outlive the call and the sentinel lies within the buffer.
    let status = unsafe { entry(ctx, start, end, false, &raw const RUNTIME_TABLE) };
    status != 0
}

/// Recovers the frame behind a context pointer.
///
/// # Safety
///
/// `ctx` must be null or the pointer built by [`invoke`] for a call that is
/// still running.
unsafe fn recover_frame<'x>(ctx: *mut c_void) -> Option<&'x mut Frame<'x, 'x, 'x>> {
    // SAFETY: guaranteed by the caller.
    unsafe { ctx.cast::<Frame<'x, 'x, 'x>>().as_mut() }
}

/// Decodes and applies one callback, returning the `match` result.
fn dispatch<'c>(
    frame: &mut Frame<'_, '_, '_>,
    operation: Operation,
    decode: impl FnOnce(Bounds) -> Result<Call<'c>, ContractViolation>,
) -> Option<usize> {
    if frame.session.is_poisoned() {
        return None;
    }
    let bounds = frame.bounds;
    let session = &mut *frame.session;
    let result = panic::catch_unwind(AssertUnwindSafe(|| match decode(bounds) {
        Ok(call) => session.handle(call),
        Err(violation) => {
            session.reject(violation);
            None
        }
    }));
    result.unwrap_or_else(|payload| {
        session.reject(ContractViolation::CallbackPanicked {
            operation,
            message: panic_message(payload.as_ref()),
        });
        None
    })
}

/// Runs [`dispatch`] for callbacks whose result the matcher ignores.
///
/// # Safety
///
/// As for [`recover_frame`].
unsafe fn notify<'c>(
    ctx: *mut c_void,
    operation: Operation,
    decode: impl FnOnce(Bounds) -> Result<Call<'c>, ContractViolation>,
) {
    // SAFETY: forwarded to the caller.
    if let Some(frame) = unsafe { recover_frame(ctx) } {
        dispatch(frame, operation, decode);
    }
}

/// Keeps the frame only when its session observes tracing hooks.
///
/// Rule names are not decoded otherwise, so a matcher passing garbage to a
/// disabled hook cannot change the outcome.
fn traced<'x>(
    frame: Option<&'x mut Frame<'x, 'x, 'x>>,
) -> Option<&'x mut Frame<'x, 'x, 'x>> {
    frame.filter(|candidate| candidate.session.traces())
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    payload
        .downcast_ref::<&str>()
        .map(|message| (*message).to_owned())
        .or_else(|| payload.downcast_ref::<String>().cloned())
        .unwrap_or_else(|| String::from("non-string panic payload"))
}

/// Borrows a matcher-supplied C string.
///
/// # Safety
///
/// A non-null `value` must be NUL-terminated and stay valid for `'c`.
unsafe fn text<'c>(
    operation: Operation,
    value: *const c_char,
) -> Result<&'c str, ContractViolation> {
    if value.is_null() {
        return Err(ContractViolation::InvalidString { operation });
    }
    // SAFETY: guaranteed by the caller.
    unsafe { CStr::from_ptr(value) }
        .to_str()
        .map_err(|_| ContractViolation::InvalidString { operation })
}

pub(crate) unsafe extern "C" fn push_empty(ctx: *mut c_void) {
    // SAFETY: `ctx` comes from the entry point, which received it from `invoke`.
    unsafe { notify(ctx, Operation::PushEmpty, |_| Ok(Call::PushEmpty)) }
}

pub(crate) unsafe extern "C" fn push_input_range(ctx: *mut c_void, from: *const u8, to: *const u8) {
    let operation = Operation::PushInputRange;
    // SAFETY: as for `push_empty`.
    unsafe {
        notify(ctx, operation, |bounds| {
            Ok(Call::PushInputRange {
                start: bounds.offset(operation, from)?,
                end: bounds.offset(operation, to)?,
            })
        });
    }
}

pub(crate) unsafe extern "C" fn push_boolean(ctx: *mut c_void, value: bool) {
    // SAFETY: as for `push_empty`.
    unsafe { notify(ctx, Operation::PushBoolean, |_| Ok(Call::PushBoolean(value))) }
}

pub(crate) unsafe extern "C" fn push_string(ctx: *mut c_void, value: *const c_char) {
    let operation = Operation::PushString;
    // SAFETY: as for `push_empty`; the string is valid for the call.
    unsafe { notify(ctx, operation, |_| text(operation, value).map(Call::PushString)) }
}

pub(crate) unsafe extern "C" fn push_array(ctx: *mut c_void, append_current: bool) {
    // SAFETY: as for `push_empty`.
    unsafe { notify(ctx, Operation::PushArray, |_| Ok(Call::PushArray { append_current })) }
}

pub(crate) unsafe extern "C" fn append_to_array(ctx: *mut c_void) {
    // SAFETY: as for `push_empty`.
    unsafe { notify(ctx, Operation::AppendToArray, |_| Ok(Call::AppendToArray)) }
}

pub(crate) unsafe extern "C" fn make_label(ctx: *mut c_void, name: *const c_char) {
    let operation = Operation::MakeLabel;
    // SAFETY: as for `push_string`.
    unsafe { notify(ctx, operation, |_| text(operation, name).map(Call::MakeLabel)) }
}

pub(crate) unsafe extern "C" fn merge_labels(ctx: *mut c_void, value: i64) {
    let operation = Operation::MergeLabels;
    // SAFETY: as for `push_empty`.
    unsafe {
        notify(ctx, operation, |_| {
            ContractViolation::count(operation, value).map(Call::MergeLabels)
        });
    }
}

pub(crate) unsafe extern "C" fn make_value(
    ctx: *mut c_void,
    _code: *const c_char,
    _filename: *const c_char,
    _line: i64,
) {
    // SAFETY: as for `push_empty`.
    unsafe { notify(ctx, Operation::MakeValue, |_| Ok(Call::MakeValue)) }
}

pub(crate) unsafe extern "C" fn make_object(ctx: *mut c_void, class: *const c_char) {
    let operation = Operation::MakeObject;
    // SAFETY: as for `push_string`.
    unsafe { notify(ctx, operation, |_| text(operation, class).map(Call::MakeObject)) }
}

pub(crate) unsafe extern "C" fn pop(ctx: *mut c_void) {
    // SAFETY: as for `push_empty`.
    unsafe { notify(ctx, Operation::Pop, |_| Ok(Call::Pop)) }
}

pub(crate) unsafe extern "C" fn locals_push(ctx: *mut c_void, value: i64) {
    let operation = Operation::LocalsPush;
    // SAFETY: as for `push_empty`.
    unsafe {
        notify(ctx, operation, |_| {
            ContractViolation::count(operation, value).map(Call::LocalsPush)
        });
    }
}

pub(crate) unsafe extern "C" fn locals_load(ctx: *mut c_void, index: i64) {
    let operation = Operation::LocalsLoad;
    // SAFETY: as for `push_empty`.
    unsafe {
        notify(ctx, operation, |_| {
            ContractViolation::count(operation, index).map(Call::LocalsLoad)
        });
    }
}

pub(crate) unsafe extern "C" fn locals_pop(ctx: *mut c_void, value: i64) {
    let operation = Operation::LocalsPop;
    // SAFETY: as for `push_empty`.
    unsafe {
        notify(ctx, operation, |_| {
            ContractViolation::count(operation, value).map(Call::LocalsPop)
        });
    }
}

pub(crate) unsafe extern "C" fn match_at(ctx: *mut c_void, position: *const u8) -> *const u8 {
    let operation = Operation::Match;
    // SAFETY: as for `push_empty`.
    let Some(frame) = (unsafe { recover_frame(ctx) }) else {
        return ptr::null();
    };
    let start = frame.bounds.start;
    dispatch(frame, operation, |bounds| {
        bounds.offset(operation, position).map(Call::Match)
    })
    .map_or(ptr::null(), |offset| start.wrapping_add(offset))
}

pub(crate) unsafe extern "C" fn set_as_source(ctx: *mut c_void) {
    // SAFETY: as for `push_empty`.
    unsafe { notify(ctx, Operation::SetAsSource, |_| Ok(Call::SetAsSource)) }
}

pub(crate) unsafe extern "C" fn read_from_source(ctx: *mut c_void, _name: *const c_char) {
    // SAFETY: as for `push_empty`.
    unsafe { notify(ctx, Operation::ReadFromSource, |_| Ok(Call::ReadFromSource)) }
}

pub(crate) unsafe extern "C" fn trace_enter(ctx: *mut c_void, rule: *const c_char) {
    let operation = Operation::TraceEnter;
    // SAFETY: as for `push_empty`.
    let Some(frame) = traced(unsafe { recover_frame(ctx) }) else {
        return;
    };
    // SAFETY: the rule name is valid for the call.
    dispatch(frame, operation, |_| unsafe { text(operation, rule) }.map(Call::TraceEnter));
}

pub(crate) unsafe extern "C" fn trace_leave(
    ctx: *mut c_void,
    rule: *const c_char,
    successful: bool,
) {
    let operation = Operation::TraceLeave;
    // SAFETY: as for `push_empty`.
    let Some(frame) = traced(unsafe { recover_frame(ctx) }) else {
        return;
    };
    dispatch(frame, operation, |_| {
        Ok(Call::TraceLeave {
            // SAFETY: the rule name is valid for the call.
            rule: unsafe { text(operation, rule) }?,
            successful,
        })
    });
}

pub(crate) unsafe extern "C" fn trace_failure(
    ctx: *mut c_void,
    position: *const u8,
    reason: *const c_char,
    is_expectation: bool,
) {
    let operation = Operation::TraceFailure;
    // SAFETY: as for `push_string`.
    unsafe {
        notify(ctx, operation, |bounds| {
            Ok(Call::TraceFailure {
                position: bounds.offset(operation, position)?,
                reason: text(operation, reason)?,
                is_expectation,
            })
        });
    }
}
