//! Runtime initialization and finalization
//!
//! A compiled program's entry point forwards argc/argv to
//! `ekans_initialize` before its first allocation and calls
//! `ekans_finalize` on the way out. Finalization runs one last collection;
//! with every root popped by then, that collection frees every remaining
//! allocation and leaves the heap list empty.

use crate::args;
use crate::report;
use ekans_core::{gc, heap};
use std::ffi::c_char;

/// Install the heap sentinels and capture the program arguments.
///
/// # Safety
/// `argv` must hold `argc` valid NUL-terminated strings (it may be null
/// when `argc` is 0). Must be called before any other runtime operation.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn ekans_initialize(argc: i32, argv: *const *const c_char) {
    unsafe {
        heap::install_sentinels();
        args::capture(argc, argv);
    }
}

/// Collect everything that is no longer rooted and emit the `EKANS_REPORT`
/// at-exit report. Freed values are unlinked before they are freed, so a
/// double free cannot occur.
///
/// # Safety
/// All root registrations must have been popped; no runtime operation may
/// follow except a fresh `ekans_initialize`.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn ekans_finalize() {
    unsafe {
        gc::collect();
    }
    report::emit_at_exit();
}

// Short names for internal use
pub use ekans_finalize as finalize;
pub use ekans_initialize as initialize;
