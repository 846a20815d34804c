//! Shared fixtures for the in-crate tests
//!
//! Tests touch the process-global heap and root stack, so every test that
//! uses these helpers is `#[serial]` and ends with `sweep_everything` to
//! hand the next test an empty heap.

use ekans_core::{EkansValue, create_number_value, gc, heap, set_environment};
use std::ptr;

/// Re-link the heap sentinels; idempotent across tests.
pub(crate) unsafe fn init() {
    unsafe { heap::install_sentinels() };
}

/// Build an argument environment holding `args` in order, the way a
/// closure call site would.
pub(crate) unsafe fn arg_env(args: &[*mut EkansValue]) -> *mut EkansValue {
    let mut env: *mut EkansValue = ptr::null_mut();
    unsafe {
        ekans_core::create_environment(ptr::null_mut(), args.len() as i32, &mut env);
        for (i, &a) in args.iter().enumerate() {
            set_environment(env, i as i32, a);
        }
    }
    env
}

/// A freshly allocated Number.
pub(crate) unsafe fn number(v: i64) -> *mut EkansValue {
    let mut n: *mut EkansValue = ptr::null_mut();
    unsafe { create_number_value(v, &mut n) };
    n
}

/// Collect with whatever roots remain; tests that popped all of theirs
/// leave the heap empty for the next one.
pub(crate) unsafe fn sweep_everything() {
    unsafe {
        gc::collect();
        assert_eq!(heap::live_count(), 0, "test leaked rooted values");
    }
}
