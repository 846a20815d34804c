//! Mark-and-sweep collector
//!
//! `ekans_collect` marks everything reachable from the registered root
//! slots, then sweeps the heap list and reclaims whatever was not marked.
//! Collection runs only when the mutator asks for it (or during
//! finalization); constructors never trigger it, so between any two
//! mutator-visible operations there is at most one collection and its
//! result depends only on the current root set and heap list.
//!
//! Mark traversal short-circuits on already-marked objects, which is what
//! makes cycles through pairs, environments, and closures terminate.
//! Sweep captures each node's successor before touching the node, since
//! unmarked nodes are unlinked and freed in place.

use crate::alloc::brutal_free;
use crate::error::fatal;
use crate::heap;
use crate::roots;
use crate::value::{self, EkansValue, Tag};
use std::ffi::c_void;
use std::sync::atomic::{AtomicU64, Ordering};

/// Collections run since process start.
pub static COLLECTIONS: AtomicU64 = AtomicU64::new(0);

/// Values reclaimed across all collections.
pub static VALUES_FREED: AtomicU64 = AtomicU64::new(0);

/// Run a full collection: mark from the root slots, then sweep.
///
/// # Safety
/// Must only be called from the mutator thread, at a point where every
/// live local is registered; the runtime must be initialized.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn ekans_collect() {
    if unsafe { heap::tail() }.is_null() {
        fatal("runtime used before initialization");
    }
    unsafe {
        mark();
        sweep();
    }
    COLLECTIONS.fetch_add(1, Ordering::Relaxed);
}

unsafe fn mark() {
    unsafe {
        let mut cur = roots::top();
        while !cur.is_null() {
            let obj = *(*cur).slot;
            if !obj.is_null() {
                mark_recursively(obj);
            }
            cur = (*cur).next;
        }
    }
}

/// Set the mark bit on `obj`, then recurse through the references its
/// variant holds. Already-marked objects are never re-entered.
pub(crate) unsafe fn mark_recursively(obj: *mut EkansValue) {
    unsafe {
        if value::marked(obj) {
            return;
        }
        value::mark_this(obj);
        if value::is(obj, Tag::Closure) {
            mark_recursively((*obj).payload.closure.env);
        } else if value::is(obj, Tag::Environment) {
            let e = (*obj).payload.environment;
            mark_recursively(e.parent);
            for i in 0..e.binding_count {
                mark_recursively(*e.bindings.add(i as usize));
            }
        } else if value::is(obj, Tag::Pair) {
            mark_recursively((*obj).payload.pair.head);
            mark_recursively((*obj).payload.pair.tail);
        }
    }
}

unsafe fn sweep() {
    let mut freed: u64 = 0;
    unsafe {
        let tail = heap::tail();
        let mut cur = (*heap::head()).next;
        while cur != tail {
            let next = (*cur).next;
            if value::marked(cur) {
                value::reset_this(cur);
            } else {
                free_value(cur);
                freed += 1;
            }
            cur = next;
        }
    }
    VALUES_FREED.fetch_add(freed, Ordering::Relaxed);
}

/// Free `v`'s owned buffers, unlink it from the heap list, free it.
unsafe fn free_value(v: *mut EkansValue) {
    unsafe {
        if value::is(v, Tag::Environment) {
            brutal_free((*v).payload.environment.bindings as *mut c_void);
        }
        if value::is(v, Tag::String) || value::is(v, Tag::Symbol) {
            brutal_free((*v).payload.text as *mut c_void);
        }
        (*(*v).prev).next = (*v).next;
        (*(*v).next).prev = (*v).prev;
        brutal_free(v as *mut c_void);
    }
}

// Short name for internal use
pub use ekans_collect as collect;
