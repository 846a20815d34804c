//! Command-line argument capture and the `args` primitive
//!
//! `ekans_initialize` stores the program arguments once at startup; the
//! `args` primitive later materializes them as a proper list of Strings,
//! excluding the program name, in their original order.

use crate::argv::require_arity;
use ekans_core::{EkansValue, Tag, create_cons_cell, create_nil_value, create_text_value};
use std::ffi::{CStr, c_char};
use std::ptr;
use std::sync::OnceLock;

/// Global storage for command-line arguments
static ARGS: OnceLock<Vec<String>> = OnceLock::new();

/// Capture C-style argc/argv. Called once from `ekans_initialize` before
/// any compiled code runs; later calls are ignored.
///
/// # Safety
/// `argv` must hold `argc` valid NUL-terminated strings (it may be null
/// when `argc` is 0).
pub(crate) unsafe fn capture(argc: i32, argv: *const *const c_char) {
    let args: Vec<String> = (0..argc)
        .map(|i| {
            let p = unsafe { *argv.offset(i as isize) };
            if p.is_null() {
                String::new()
            } else {
                unsafe { CStr::from_ptr(p).to_string_lossy().into_owned() }
            }
        })
        .collect();
    let _ = ARGS.set(args);
}

/// `args`: the program arguments, excluding argv[0], as a list of
/// Strings in order.
///
/// # Safety
/// `env` must be a live argument environment, `out` a live handle.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn ekans_args(env: *mut EkansValue, out: *mut *mut EkansValue) {
    unsafe {
        require_arity(env, 0, "args");

        let mut result: *mut EkansValue = ptr::null_mut();
        create_nil_value(&mut result);
        if let Some(captured) = ARGS.get() {
            // Built back to front so the list head is argv[1].
            for a in captured.iter().skip(1).rev() {
                let mut s: *mut EkansValue = ptr::null_mut();
                create_text_value(Tag::String, a.as_bytes(), &mut s);
                let mut cell: *mut EkansValue = ptr::null_mut();
                create_cons_cell(s, result, &mut cell);
                result = cell;
            }
        }
        *out = result;
    }
}

// Short name for internal use
pub use ekans_args as args;
