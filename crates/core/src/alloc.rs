//! Fail-fast allocation wrappers
//!
//! The runtime allocates through thin wrappers over the system allocator.
//! Allocation failure prints a short message to standard error and exits
//! non-zero; there is no recovery path for OOM.
//!
//! Lifetime counters feed the `EKANS_REPORT` at-exit report.

use crate::error::fatal;
use std::ffi::c_void;
use std::sync::atomic::{AtomicU64, Ordering};

/// Successful allocations since process start.
pub static TOTAL_ALLOCATIONS: AtomicU64 = AtomicU64::new(0);

/// Bytes requested from the system allocator since process start.
pub static TOTAL_BYTES: AtomicU64 = AtomicU64::new(0);

/// Allocate `size` bytes or terminate the process.
pub fn brutal_malloc(size: usize) -> *mut c_void {
    let result = unsafe { libc::malloc(size) };
    if result.is_null() {
        fatal("failed to allocate memory");
    }
    TOTAL_ALLOCATIONS.fetch_add(1, Ordering::Relaxed);
    TOTAL_BYTES.fetch_add(size as u64, Ordering::Relaxed);
    result
}

/// Allocate a zero-initialized array of `count` elements of `size` bytes
/// each, or terminate the process.
pub fn brutal_calloc(count: usize, size: usize) -> *mut c_void {
    let result = unsafe { libc::calloc(count, size) };
    if result.is_null() {
        fatal("failed to allocate memory");
    }
    TOTAL_ALLOCATIONS.fetch_add(1, Ordering::Relaxed);
    TOTAL_BYTES.fetch_add((count * size) as u64, Ordering::Relaxed);
    result
}

/// Return memory obtained from `brutal_malloc`/`brutal_calloc`.
///
/// # Safety
/// `ptr` must have come from one of the wrappers above and must not be
/// freed twice.
pub unsafe fn brutal_free(ptr: *mut c_void) {
    unsafe { libc::free(ptr) }
}
