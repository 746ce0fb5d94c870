//! Hand-compiled matchers that drive the real callback table.
//!
//! Each `*_match` function is what a grammar compiler would emit for a tiny
//! grammar, written out by hand. They let tests exercise the complete
//! invocation path (entry point, trampolines, session) without a compiler
//! or a shared library. [`engine`] registers all of them.

use std::ffi::{CStr, c_void};

use crate::abi::{CallbackTable, EntryPoint};
use crate::engine::StaticEngine;
use crate::error::RuntimeError;

/// Every fixture rule paired with its entry point.
pub const RULES: [(&str, EntryPoint); 9] = [
    ("greeting", greeting_match),
    ("digits", digits_match),
    ("assignment", assignment_match),
    ("point", point_match),
    ("reserved", reserved_match),
    ("unbalanced", unbalanced_match),
    ("underflow", underflow_match),
    ("out_of_bounds", out_of_bounds_match),
    ("negative_count", negative_count_match),
];

/// Builds a [`StaticEngine`] holding every rule in [`RULES`].
///
/// # Errors
///
/// Never fails in practice; registration errors are propagated as is.
pub fn engine() -> Result<StaticEngine, RuntimeError> {
    RULES
        .into_iter()
        .try_fold(StaticEngine::new(), |engine, (rule, entry)| {
            engine.with_rule(rule, entry)
        })
}

/// The arguments of one entry-point call, with typed helpers over the table.
struct Driver<'t> {
    ctx: *mut c_void,
    table: &'t CallbackTable,
    start: *const u8,
    len: usize,
}

impl Driver<'_> {
    /// # Safety
    ///
    /// The arguments must be those the runtime passed to an entry point.
    unsafe fn new(
        ctx: *mut c_void,
        start: *const u8,
        end: *const u8,
        table: *const CallbackTable,
    ) -> Option<Self> {
        // SAFETY: the runtime passes a live table.
        let callbacks = unsafe { table.as_ref() }?;
        Some(Self {
            ctx,
            table: callbacks,
            start,
            len: end.addr().checked_sub(start.addr())?,
        })
    }

    const fn at(&self, offset: usize) -> *const u8 {
        self.start.wrapping_add(offset)
    }

    fn byte(&self, offset: usize) -> Option<u8> {
        // SAFETY: offsets below `len` lie inside the input buffer.
        (offset < self.len).then(|| unsafe { self.start.add(offset).read() })
    }

    fn scan(&self, from: usize, accept: impl Fn(u8) -> bool) -> usize {
        (from..self.len)
            .find(|&offset| self.byte(offset).is_none_or(|byte| !accept(byte)))
            .unwrap_or(self.len)
    }

    fn push_empty(&self) {
        // SAFETY: table entries accept the context they were handed.
        unsafe { (self.table.push_empty)(self.ctx) }
    }

    fn push_range(&self, from: usize, to: usize) {
        // SAFETY: as for `push_empty`.
        unsafe { (self.table.push_input_range)(self.ctx, self.at(from), self.at(to)) }
    }

    fn push_boolean(&self, value: bool) {
        // SAFETY: as for `push_empty`.
        unsafe { (self.table.push_boolean)(self.ctx, value) }
    }

    fn push_array(&self, append_current: bool) {
        // SAFETY: as for `push_empty`.
        unsafe { (self.table.push_array)(self.ctx, append_current) }
    }

    fn append_to_array(&self) {
        // SAFETY: as for `push_empty`.
        unsafe { (self.table.append_to_array)(self.ctx) }
    }

    fn make_label(&self, name: &CStr) {
        // SAFETY: as for `push_empty`.
        unsafe { (self.table.make_label)(self.ctx, name.as_ptr()) }
    }

    fn merge_labels(&self, count: i64) {
        // SAFETY: as for `push_empty`.
        unsafe { (self.table.merge_labels)(self.ctx, count) }
    }

    fn make_object(&self, class: &CStr) {
        // SAFETY: as for `push_empty`.
        unsafe { (self.table.make_object)(self.ctx, class.as_ptr()) }
    }

    fn pop(&self) {
        // SAFETY: as for `push_empty`.
        unsafe { (self.table.pop)(self.ctx) }
    }

    fn locals_push(&self, count: i64) {
        // SAFETY: as for `push_empty`.
        unsafe { (self.table.locals_push)(self.ctx, count) }
    }

    fn locals_load(&self, index: i64) {
        // SAFETY: as for `push_empty`.
        unsafe { (self.table.locals_load)(self.ctx, index) }
    }

    fn locals_pop(&self, count: i64) {
        // SAFETY: as for `push_empty`.
        unsafe { (self.table.locals_pop)(self.ctx, count) }
    }

    /// Returns the offset after the match, or `None` for no match.
    fn match_at(&self, offset: usize) -> Option<usize> {
        // SAFETY: as for `push_empty`.
        let next = unsafe { (self.table.match_at)(self.ctx, self.at(offset)) };
        (!next.is_null()).then(|| next.addr() - self.start.addr())
    }

    fn set_as_source(&self) {
        // SAFETY: as for `push_empty`.
        unsafe { (self.table.set_as_source)(self.ctx) }
    }

    fn trace_enter(&self, rule: &CStr) {
        // SAFETY: as for `push_empty`.
        unsafe { (self.table.trace_enter)(self.ctx, rule.as_ptr()) }
    }

    fn trace_leave(&self, rule: &CStr, successful: bool) -> i32 {
        // SAFETY: as for `push_empty`.
        unsafe { (self.table.trace_leave)(self.ctx, rule.as_ptr(), successful) }
        i32::from(successful)
    }

    fn expected(&self, offset: usize, reason: &CStr) {
        // SAFETY: as for `push_empty`.
        unsafe { (self.table.trace_failure)(self.ctx, self.at(offset), reason.as_ptr(), true) }
    }

    fn failed(&self, offset: usize, reason: &CStr) {
        // SAFETY: as for `push_empty`.
        unsafe { (self.table.trace_failure)(self.ctx, self.at(offset), reason.as_ptr(), false) }
    }
}

macro_rules! driver {
    ($ctx:ident, $start:ident, $end:ident, $table:ident) => {
        // SAFETY: the caller upholds the entry-point contract.
        match unsafe { Driver::new($ctx, $start, $end, $table) } {
            Some(driver) => driver,
            None => return 0,
        }
    };
}

/// `greeting <- "hello " name:[a-z]+ !.`
///
/// Yields `{name: <range>}`.
///
/// # Safety
///
/// Must only be called as an [`EntryPoint`] by the runtime.
pub unsafe extern "C" fn greeting_match(
    ctx: *mut c_void,
    start: *const u8,
    end: *const u8,
    _initial_flag: bool,
    table: *const CallbackTable,
) -> i32 {
    let matcher = driver!(ctx, start, end, table);
    matcher.trace_enter(c"greeting");
    if let Some(offset) = b"hello "
        .iter()
        .enumerate()
        .position(|(offset, &byte)| matcher.byte(offset) != Some(byte))
    {
        matcher.expected(offset, c"\"hello \"");
        return matcher.trace_leave(c"greeting", false);
    }
    let name_end = matcher.scan(6, |byte| byte.is_ascii_lowercase());
    if name_end == 6 {
        matcher.expected(6, c"[a-z]");
        return matcher.trace_leave(c"greeting", false);
    }
    if name_end != matcher.len {
        matcher.expected(name_end, c"[a-z]");
        matcher.expected(name_end, c"end of input");
        return matcher.trace_leave(c"greeting", false);
    }
    matcher.push_range(6, name_end);
    matcher.make_label(c"name");
    matcher.trace_leave(c"greeting", true)
}

/// `digits <- (digit:[0-9])* !.`
///
/// Yields an array holding one range per digit.
///
/// # Safety
///
/// Must only be called as an [`EntryPoint`] by the runtime.
pub unsafe extern "C" fn digits_match(
    ctx: *mut c_void,
    start: *const u8,
    end: *const u8,
    _initial_flag: bool,
    table: *const CallbackTable,
) -> i32 {
    let matcher = driver!(ctx, start, end, table);
    matcher.push_array(false);
    let stop = matcher.scan(0, |byte| byte.is_ascii_digit());
    for offset in 0..stop {
        matcher.push_range(offset, offset + 1);
        matcher.append_to_array();
    }
    matcher.expected(stop, c"digit");
    if stop != matcher.len {
        matcher.expected(stop, c"end of input");
        matcher.pop();
        return 0;
    }
    1
}

/// `assignment <- key:[a-z]+ '=' value:$key !.`
///
/// The value must repeat the key, which is matched as a backreference
/// through the locals stack. Yields `{key: <range>, value: <range>}`.
///
/// # Safety
///
/// Must only be called as an [`EntryPoint`] by the runtime.
pub unsafe extern "C" fn assignment_match(
    ctx: *mut c_void,
    start: *const u8,
    end: *const u8,
    _initial_flag: bool,
    table: *const CallbackTable,
) -> i32 {
    let matcher = driver!(ctx, start, end, table);
    let key_end = matcher.scan(0, |byte| byte.is_ascii_lowercase());
    if key_end == 0 {
        matcher.expected(0, c"[a-z]");
        return 0;
    }
    matcher.push_range(0, key_end);
    matcher.locals_push(1);
    if matcher.byte(key_end) != Some(b'=') {
        matcher.expected(key_end, c"[a-z]");
        matcher.expected(key_end, c"\"=\"");
        matcher.locals_pop(1);
        return 0;
    }
    let value_start = key_end + 1;
    matcher.locals_load(0);
    let Some(value_end) = matcher.match_at(value_start) else {
        matcher.failed(value_start, c"value must repeat the key");
        matcher.locals_pop(1);
        return 0;
    };
    if value_end != matcher.len {
        matcher.expected(value_end, c"end of input");
        matcher.locals_pop(1);
        return 0;
    }
    matcher.locals_load(0);
    matcher.make_label(c"key");
    matcher.push_range(value_start, value_end);
    matcher.make_label(c"value");
    matcher.merge_labels(2);
    matcher.locals_pop(1);
    1
}

/// `point <- x:[0-9] ',' y:[0-9] !. <Point>`
///
/// Yields whatever the factory builds for class `Point` from `{x, y}`.
///
/// # Safety
///
/// Must only be called as an [`EntryPoint`] by the runtime.
pub unsafe extern "C" fn point_match(
    ctx: *mut c_void,
    start: *const u8,
    end: *const u8,
    _initial_flag: bool,
    table: *const CallbackTable,
) -> i32 {
    let matcher = driver!(ctx, start, end, table);
    let shape: [(&CStr, fn(u8) -> bool); 3] = [
        (c"[0-9]", |byte| byte.is_ascii_digit()),
        (c"\",\"", |byte| byte == b','),
        (c"[0-9]", |byte| byte.is_ascii_digit()),
    ];
    for (offset, (reason, accept)) in shape.into_iter().enumerate() {
        if !matcher.byte(offset).is_some_and(accept) {
            matcher.expected(offset, reason);
            return 0;
        }
    }
    if matcher.len != 3 {
        matcher.expected(3, c"end of input");
        return 0;
    }
    matcher.push_empty();
    matcher.push_range(0, 1);
    matcher.make_label(c"x");
    matcher.push_range(2, 3);
    matcher.make_label(c"y");
    matcher.merge_labels(3);
    matcher.make_object(c"Point");
    1
}

/// Invokes the reserved `setAsSource` callback.
///
/// # Safety
///
/// Must only be called as an [`EntryPoint`] by the runtime.
pub unsafe extern "C" fn reserved_match(
    ctx: *mut c_void,
    start: *const u8,
    end: *const u8,
    _initial_flag: bool,
    table: *const CallbackTable,
) -> i32 {
    let matcher = driver!(ctx, start, end, table);
    matcher.push_range(0, matcher.len);
    matcher.set_as_source();
    1
}

/// Claims success while leaving two values on the output stack.
///
/// # Safety
///
/// Must only be called as an [`EntryPoint`] by the runtime.
pub unsafe extern "C" fn unbalanced_match(
    ctx: *mut c_void,
    start: *const u8,
    end: *const u8,
    _initial_flag: bool,
    table: *const CallbackTable,
) -> i32 {
    let matcher = driver!(ctx, start, end, table);
    matcher.push_boolean(true);
    matcher.push_boolean(false);
    1
}

/// Pops from an empty output stack, then carries on as if nothing happened.
///
/// # Safety
///
/// Must only be called as an [`EntryPoint`] by the runtime.
pub unsafe extern "C" fn underflow_match(
    ctx: *mut c_void,
    start: *const u8,
    end: *const u8,
    _initial_flag: bool,
    table: *const CallbackTable,
) -> i32 {
    let matcher = driver!(ctx, start, end, table);
    matcher.pop();
    matcher.push_empty();
    1
}

/// Pushes a range ending one byte past the sentinel.
///
/// # Safety
///
/// Must only be called as an [`EntryPoint`] by the runtime.
pub unsafe extern "C" fn out_of_bounds_match(
    ctx: *mut c_void,
    start: *const u8,
    end: *const u8,
    _initial_flag: bool,
    table: *const CallbackTable,
) -> i32 {
    let matcher = driver!(ctx, start, end, table);
    matcher.push_range(0, matcher.len + 1);
    1
}

/// Merges a negative number of labels.
///
/// # Safety
///
/// Must only be called as an [`EntryPoint`] by the runtime.
pub unsafe extern "C" fn negative_count_match(
    ctx: *mut c_void,
    start: *const u8,
    end: *const u8,
    _initial_flag: bool,
    table: *const CallbackTable,
) -> i32 {
    let matcher = driver!(ctx, start, end, table);
    matcher.push_empty();
    matcher.merge_labels(-1);
    1
}
