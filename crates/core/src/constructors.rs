//! Value constructors
//!
//! One constructor per variant. Each allocates the value, writes the tag
//! and payload (copying owned buffers), stores the result through the
//! caller's out-handle, and only then appends to the heap list. Storing
//! first means a collection later in the same expression can already reach
//! the new object through the caller's root slot.
//!
//! Constructors never trigger a collection; the only safe points are
//! explicit `ekans_collect` and finalization. The caller must have
//! registered the out-handle as a root before calling if the new object
//! has to survive a later collection in the same expression.

use crate::alloc::brutal_malloc;
use crate::heap;
use crate::value::{EkansValue, PairData, Tag};
use std::ffi::{CStr, c_char};
use std::mem::size_of;
use std::ptr;

pub(crate) fn alloc_value(tag: Tag) -> *mut EkansValue {
    let result = brutal_malloc(size_of::<EkansValue>()) as *mut EkansValue;
    unsafe {
        (*result).tag = tag as u32;
    }
    result
}

/// Allocate a Number value.
///
/// # Safety
/// `out` must point to a live handle; the runtime must be initialized.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn ekans_create_number_value(v: i64, out: *mut *mut EkansValue) {
    let result = alloc_value(Tag::Number);
    unsafe {
        (*result).payload.number = v;
        *out = result;
        heap::append(result);
    }
}

/// Allocate a Boolean value.
///
/// # Safety
/// `out` must point to a live handle; the runtime must be initialized.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn ekans_create_boolean_value(v: bool, out: *mut *mut EkansValue) {
    let result = alloc_value(Tag::Boolean);
    unsafe {
        (*result).payload.boolean = v;
        *out = result;
        heap::append(result);
    }
}

/// Allocate a Character value. The character model is single-byte.
///
/// # Safety
/// `out` must point to a live handle; the runtime must be initialized.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn ekans_create_char_value(v: u8, out: *mut *mut EkansValue) {
    let result = alloc_value(Tag::Character);
    unsafe {
        (*result).payload.character = v;
        *out = result;
        heap::append(result);
    }
}

/// Allocate a String value, copying the NUL-terminated bytes at `s`.
///
/// # Safety
/// `s` must be a valid NUL-terminated string; `out` must point to a live
/// handle; the runtime must be initialized.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn ekans_create_string_value(s: *const c_char, out: *mut *mut EkansValue) {
    unsafe { create_text_value(Tag::String, CStr::from_ptr(s).to_bytes(), out) }
}

/// Allocate a Symbol value, copying the NUL-terminated bytes at `s`.
/// Symbols are not interned; equality stays byte equality.
///
/// # Safety
/// `s` must be a valid NUL-terminated string; `out` must point to a live
/// handle; the runtime must be initialized.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn ekans_create_symbol_value(s: *const c_char, out: *mut *mut EkansValue) {
    unsafe { create_text_value(Tag::Symbol, CStr::from_ptr(s).to_bytes(), out) }
}

/// Allocate the empty-list marker.
///
/// # Safety
/// `out` must point to a live handle; the runtime must be initialized.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn ekans_create_nil_value(out: *mut *mut EkansValue) {
    let result = alloc_value(Tag::Nil);
    unsafe {
        *out = result;
        heap::append(result);
    }
}

/// Allocate a Pair holding non-owning references to `head` and `tail`.
///
/// # Safety
/// `head` and `tail` must be live values; `out` must point to a live
/// handle; the runtime must be initialized.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn ekans_create_cons_cell(
    head: *mut EkansValue,
    tail: *mut EkansValue,
    out: *mut *mut EkansValue,
) {
    let result = alloc_value(Tag::Pair);
    unsafe {
        (*result).payload.pair = PairData { head, tail };
        *out = result;
        heap::append(result);
    }
}

/// Build a String or Symbol value from a Rust byte slice. Shared by the
/// ABI constructors and the primitives that assemble strings out of
/// internal builders.
///
/// The value owns a fresh NUL-terminated copy of `bytes`; sweep frees it.
///
/// # Safety
/// `tag` must be `Tag::String` or `Tag::Symbol`; `out` must point to a
/// live handle; the runtime must be initialized.
pub unsafe fn create_text_value(tag: Tag, bytes: &[u8], out: *mut *mut EkansValue) {
    debug_assert!(tag == Tag::String || tag == Tag::Symbol);
    let result = alloc_value(tag);
    let buf = brutal_malloc(bytes.len() + 1) as *mut u8;
    unsafe {
        ptr::copy_nonoverlapping(bytes.as_ptr(), buf, bytes.len());
        *buf.add(bytes.len()) = 0;
        (*result).payload.text = buf as *mut c_char;
        *out = result;
        heap::append(result);
    }
}

// Short names for internal use
pub use ekans_create_boolean_value as create_boolean_value;
pub use ekans_create_char_value as create_char_value;
pub use ekans_create_cons_cell as create_cons_cell;
pub use ekans_create_nil_value as create_nil_value;
pub use ekans_create_number_value as create_number_value;
pub use ekans_create_string_value as create_string_value;
pub use ekans_create_symbol_value as create_symbol_value;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::{is, text_bytes};
    use serial_test::serial;

    #[test]
    #[serial]
    fn test_constructor_appends_before_tail() {
        unsafe {
            heap::install_sentinels();

            let mut a: *mut EkansValue = ptr::null_mut();
            let mut b: *mut EkansValue = ptr::null_mut();
            ekans_create_number_value(1, &mut a);
            ekans_create_number_value(2, &mut b);

            // Allocation order is list order: head, a, b, tail.
            assert_eq!((*heap::head()).next, a);
            assert_eq!((*a).next, b);
            assert_eq!((*b).next, heap::tail());
            assert_eq!((*b).prev, a);
            assert_eq!((*a).prev, heap::head());

            crate::gc::ekans_collect();
        }
    }

    #[test]
    #[serial]
    fn test_constructor_payloads() {
        unsafe {
            heap::install_sentinels();

            let mut n: *mut EkansValue = ptr::null_mut();
            let mut b: *mut EkansValue = ptr::null_mut();
            let mut c: *mut EkansValue = ptr::null_mut();
            let mut nil: *mut EkansValue = ptr::null_mut();
            ekans_create_number_value(-42, &mut n);
            ekans_create_boolean_value(true, &mut b);
            ekans_create_char_value(b'x', &mut c);
            ekans_create_nil_value(&mut nil);

            assert!(is(n, Tag::Number));
            assert_eq!((*n).payload.number, -42);
            assert!(is(b, Tag::Boolean));
            assert!((*b).payload.boolean);
            assert!(is(c, Tag::Character));
            assert_eq!((*c).payload.character, b'x');
            assert!(is(nil, Tag::Nil));

            crate::gc::ekans_collect();
        }
    }

    #[test]
    #[serial]
    fn test_text_value_owns_a_copy() {
        unsafe {
            heap::install_sentinels();

            let bytes = b"gapry".to_vec();
            let mut s: *mut EkansValue = ptr::null_mut();
            create_text_value(Tag::String, &bytes, &mut s);
            drop(bytes);

            assert!(is(s, Tag::String));
            assert_eq!(text_bytes(s), b"gapry");

            crate::gc::ekans_collect();
        }
    }

    #[test]
    #[serial]
    fn test_cons_cell_links_head_and_tail() {
        unsafe {
            heap::install_sentinels();

            let mut a: *mut EkansValue = ptr::null_mut();
            let mut b: *mut EkansValue = ptr::null_mut();
            let mut c: *mut EkansValue = ptr::null_mut();
            ekans_create_number_value(1, &mut a);
            ekans_create_nil_value(&mut b);
            ekans_create_cons_cell(a, b, &mut c);

            assert!(is(c, Tag::Pair));
            assert_eq!((*c).payload.pair.head, a);
            assert_eq!((*c).payload.pair.tail, b);

            crate::gc::ekans_collect();
        }
    }
}
