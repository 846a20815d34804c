//! The heap list
//!
//! Every live value is a member of a single process-wide doubly-linked
//! list, threaded through the values' own `prev`/`next` fields, with a
//! preallocated sentinel head and tail. New allocations are appended just
//! before the tail in O(1).
//!
//! The list gives the collector a complete enumeration of the allocated
//! set, independent of reachability; it is the only discovery mechanism
//! for unreachable objects. The sentinels are never collected and never
//! appear as values.

use crate::alloc::brutal_malloc;
use crate::error::fatal;
use crate::value::{EkansValue, Payload, Tag};
use std::mem::size_of;
use std::ptr;

// Process-wide sentinels, allocated on the first initialization.
// Raw pointers only; they are read and written by value from the single
// mutator thread.
static mut HEAP_HEAD: *mut EkansValue = ptr::null_mut();
static mut HEAP_TAIL: *mut EkansValue = ptr::null_mut();

fn alloc_sentinel() -> *mut EkansValue {
    let v = brutal_malloc(size_of::<EkansValue>()) as *mut EkansValue;
    unsafe {
        // The tag and payload of a sentinel are never inspected.
        (*v).tag = Tag::Nil as u32;
        (*v).payload = Payload { number: 0 };
        (*v).prev = ptr::null_mut();
        (*v).next = ptr::null_mut();
    }
    v
}

/// Install the sentinels, or re-link them on repeated initialization.
///
/// After this call `head.next == tail` and `tail.prev == head`: the heap
/// list is empty.
///
/// # Safety
/// Must only be called from the mutator thread.
pub unsafe fn install_sentinels() {
    unsafe {
        if HEAP_HEAD.is_null() {
            HEAP_HEAD = alloc_sentinel();
            HEAP_TAIL = alloc_sentinel();
        }
        let head = HEAP_HEAD;
        let tail = HEAP_TAIL;
        (*head).prev = ptr::null_mut();
        (*head).next = tail;
        (*tail).prev = head;
        (*tail).next = ptr::null_mut();
    }
}

/// The head sentinel; null before the first initialization.
///
/// # Safety
/// Must only be called from the mutator thread.
pub unsafe fn head() -> *mut EkansValue {
    unsafe { HEAP_HEAD }
}

/// The tail sentinel; null before the first initialization.
///
/// # Safety
/// Must only be called from the mutator thread.
pub unsafe fn tail() -> *mut EkansValue {
    unsafe { HEAP_TAIL }
}

/// Link a freshly allocated value just before the tail sentinel.
///
/// # Safety
/// `new_value` must point to an allocated value that is not yet in the
/// list; the runtime must have been initialized.
pub unsafe fn append(new_value: *mut EkansValue) {
    unsafe {
        let tail = HEAP_TAIL;
        if tail.is_null() {
            fatal("runtime used before initialization");
        }
        (*new_value).prev = (*tail).prev;
        (*new_value).next = tail;
        (*(*new_value).prev).next = new_value;
        (*(*new_value).next).prev = new_value;
    }
}

/// Number of values currently in the heap list.
///
/// # Safety
/// Must only be called from the mutator thread, after initialization.
pub unsafe fn live_count() -> usize {
    let mut count = 0;
    unsafe {
        let mut cur = (*HEAP_HEAD).next;
        while cur != HEAP_TAIL {
            count += 1;
            cur = (*cur).next;
        }
    }
    count
}
