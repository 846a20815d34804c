//! Explicit root registry
//!
//! The mutator never hands the collector a value directly. It registers
//! the *address of a stack variable* that holds a value reference, so the
//! collector sees through any later store to that variable. This is what
//! makes the collector precise without stack scanning.
//!
//! Discipline required of generated code and of hand-written callers that
//! allocate:
//! - every local that may hold a value across a call that can collect must
//!   be registered before that call;
//! - registrations are popped last-in-first-out, balanced with the
//!   variable's scope;
//! - the variable is initialized to null before registering, so a
//!   half-built expression is safe to trace.

use crate::error::fatal;
use crate::value::EkansValue;
use std::ptr;

/// One record on the root stack: the address of a mutator-owned handle.
#[repr(C)]
pub struct StackSlot {
    pub slot: *mut *mut EkansValue,
    pub next: *mut StackSlot,
}

// Top of the process-wide root stack. Accessed by value only, from the
// single mutator thread.
static mut STACK_SLOTS: *mut StackSlot = ptr::null_mut();

/// Register the address of a mutator-stack variable as a root.
///
/// # Safety
/// `slot` must point to a `*mut EkansValue` variable that is initialized
/// (null meaning "no value yet") and stays valid until the matching
/// `ekans_pop_stack_slot`.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn ekans_push_stack_slot(slot: *mut *mut EkansValue) {
    unsafe {
        let top = Box::into_raw(Box::new(StackSlot {
            slot,
            next: STACK_SLOTS,
        }));
        STACK_SLOTS = top;
    }
}

/// Pop the top `count` root registrations, last-in-first-out.
///
/// # Safety
/// At least `count` slots must be registered.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn ekans_pop_stack_slot(count: i32) {
    for _ in 0..count {
        unsafe {
            let top = STACK_SLOTS;
            if top.is_null() {
                fatal("root stack underflow");
            }
            STACK_SLOTS = (*top).next;
            drop(Box::from_raw(top));
        }
    }
}

/// Top of the root stack, for the collector's mark phase.
///
/// # Safety
/// Must only be called from the mutator thread.
pub unsafe fn top() -> *mut StackSlot {
    unsafe { STACK_SLOTS }
}

/// Number of registered roots.
///
/// # Safety
/// Must only be called from the mutator thread.
pub unsafe fn depth() -> usize {
    let mut count = 0;
    unsafe {
        let mut cur = STACK_SLOTS;
        while !cur.is_null() {
            count += 1;
            cur = (*cur).next;
        }
    }
    count
}

// Short names for internal use
pub use ekans_pop_stack_slot as pop_stack_slot;
pub use ekans_push_stack_slot as push_stack_slot;

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    #[test]
    #[serial]
    fn test_push_pop_balanced() {
        unsafe {
            let base = depth();
            let mut a: *mut EkansValue = ptr::null_mut();
            let mut b: *mut EkansValue = ptr::null_mut();
            push_stack_slot(&mut a);
            push_stack_slot(&mut b);
            assert_eq!(depth(), base + 2);

            // Last-in-first-out: the top record is b's slot.
            assert_eq!((*top()).slot, &mut b as *mut *mut EkansValue);

            pop_stack_slot(2);
            assert_eq!(depth(), base);
        }
    }

    #[test]
    #[serial]
    fn test_slot_sees_through_updates() {
        unsafe {
            let mut a: *mut EkansValue = ptr::null_mut();
            push_stack_slot(&mut a);

            // The registry records the address, not the current value.
            a = 0x1000 as *mut EkansValue;
            assert_eq!(*(*top()).slot, a);

            pop_stack_slot(1);
        }
    }
}
