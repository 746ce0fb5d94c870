//! A matcher module exporting one rule, `word`: an input made only of ASCII
//! letters, captured under the label `w`.
//!
//! Built with `--cfg stale_abi` the module advertises an older table layout.

#![allow(dead_code)]

use std::ffi::{c_char, c_void};

#[repr(C)]
pub struct AbiDescriptor {
    version: u32,
    callback_count: u32,
}

#[repr(C)]
pub struct CallbackTable {
    version: u32,
    len: u32,
    push_empty: unsafe extern "C" fn(*mut c_void),
    push_input_range: unsafe extern "C" fn(*mut c_void, *const u8, *const u8),
    building: [*const c_void; 4],
    make_label: unsafe extern "C" fn(*mut c_void, *const c_char),
    rest: [*const c_void; 12],
    trace_failure: unsafe extern "C" fn(*mut c_void, *const u8, *const c_char, bool),
}

#[unsafe(no_mangle)]
pub extern "C" fn peg_matcher_abi() -> AbiDescriptor {
    AbiDescriptor {
        version: if cfg!(stale_abi) { 0 } else { 1 },
        callback_count: 20,
    }
}

/// # Safety
///
/// Called by the runtime with a live table and `start <= end`.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn word_match(
    ctx: *mut c_void,
    start: *const u8,
    end: *const u8,
    _initial_flag: bool,
    table: *const CallbackTable,
) -> i32 {
    let Some(table) = (unsafe { table.as_ref() }) else {
        return 0;
    };
    let len = end.addr() - start.addr();
    let input = unsafe { std::slice::from_raw_parts(start, len) };
    let letters = input.iter().take_while(|byte| byte.is_ascii_alphabetic()).count();
    if letters == 0 || letters < len {
        unsafe { (table.trace_failure)(ctx, start.add(letters), c"letter".as_ptr(), true) };
        return 0;
    }
    unsafe {
        (table.push_input_range)(ctx, start, end);
        (table.make_label)(ctx, c"w".as_ptr());
    }
    1
}
