//! Tagged heap value model for Ekans
//!
//! Every heap object is an `EkansValue`: a variant tag, a payload selected
//! by the tag, and the intrusive `prev`/`next` links that thread the object
//! into the process-wide heap list.
//!
//! The collector's mark bit is folded into the high bit of the tag word
//! rather than kept in an external bitmap, so variant tests must mask it
//! out. Outside a collection cycle the mark bit is always zero.
//!
//! A null `*mut EkansValue` is not itself a value: it encodes "no binding
//! yet" inside an environment and "no parent" on the root environment.

use std::ffi::{CStr, c_char};

/// High bit of the tag word, reserved for the collector's mark phase.
pub const MARK_BIT: u32 = 1 << 31;

/// Variant discriminant stored in the low bits of the tag word.
#[repr(u32)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tag {
    Number = 0,
    Boolean = 1,
    Character = 2,
    String = 3,
    Symbol = 4,
    Nil = 5,
    Pair = 6,
    Environment = 7,
    Closure = 8,
}

/// Signature of compiled closure bodies: the argument environment goes in,
/// the result comes out through the caller-provided handle.
pub type EkansFunction = unsafe extern "C" fn(*mut EkansValue, *mut *mut EkansValue);

/// Payload of a `Tag::Pair` value: two non-owning value references.
#[repr(C)]
#[derive(Clone, Copy)]
pub struct PairData {
    pub head: *mut EkansValue,
    pub tail: *mut EkansValue,
}

/// Payload of a `Tag::Environment` value.
///
/// `bindings` is an owned, zero-initialized array of `binding_count`
/// value references; null entries are bindings that have not been
/// evaluated yet. `parent` is null on the root environment.
#[repr(C)]
#[derive(Clone, Copy)]
pub struct EnvironmentData {
    pub parent: *mut EkansValue,
    pub bindings: *mut *mut EkansValue,
    pub binding_count: i32,
}

/// Payload of a `Tag::Closure` value: the captured environment plus the
/// compiled function.
#[repr(C)]
#[derive(Clone, Copy)]
pub struct ClosureData {
    pub env: *mut EkansValue,
    pub function: EkansFunction,
}

/// Payload storage, selected by the tag.
///
/// `text` (String/Symbol) and `environment.bindings` point at owned
/// buffers; the sweep phase frees them before freeing the value itself.
#[repr(C)]
pub union Payload {
    pub number: i64,
    pub boolean: bool,
    pub character: u8,
    pub text: *mut c_char,
    pub pair: PairData,
    pub environment: EnvironmentData,
    pub closure: ClosureData,
}

/// A heap object.
///
/// Layout is `#[repr(C)]` so generated code and the runtime agree on field
/// offsets. `prev`/`next` are owned by the heap list; nothing else may
/// touch them.
#[repr(C)]
pub struct EkansValue {
    pub tag: u32,
    pub payload: Payload,
    pub prev: *mut EkansValue,
    pub next: *mut EkansValue,
}

/// Test the variant of `v`, ignoring the mark bit.
///
/// # Safety
/// `v` must point to a live value.
pub unsafe fn is(v: *const EkansValue, tag: Tag) -> bool {
    debug_assert!(!v.is_null());
    unsafe { ((*v).tag | MARK_BIT) == (tag as u32 | MARK_BIT) }
}

/// The variant tag of `v` with the mark bit masked out.
///
/// # Safety
/// `v` must point to a live value.
pub unsafe fn tag_of(v: *const EkansValue) -> u32 {
    unsafe { (*v).tag & !MARK_BIT }
}

/// Set the mark bit.
///
/// # Safety
/// `v` must point to a live value.
pub unsafe fn mark_this(v: *mut EkansValue) {
    unsafe {
        (*v).tag |= MARK_BIT;
    }
}

/// Clear the mark bit.
///
/// # Safety
/// `v` must point to a live value.
pub unsafe fn reset_this(v: *mut EkansValue) {
    unsafe {
        (*v).tag &= !MARK_BIT;
    }
}

/// True when the mark bit is set, or when `v` is absent. Treating absent
/// references as trivially live lets traversal recurse without null checks.
///
/// # Safety
/// `v` must be null or point to a live value.
pub unsafe fn marked(v: *const EkansValue) -> bool {
    v.is_null() || unsafe { (*v).tag & MARK_BIT != 0 }
}

/// The byte content of a String or Symbol value, up to the first NUL.
///
/// # Safety
/// `v` must be a live String or Symbol value; the returned slice is only
/// valid until the value is swept.
pub unsafe fn text_bytes<'a>(v: *const EkansValue) -> &'a [u8] {
    debug_assert!(unsafe { is(v, Tag::String) || is(v, Tag::Symbol) });
    unsafe { CStr::from_ptr((*v).payload.text).to_bytes() }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::mem::{align_of, size_of};
    use std::ptr;

    fn number(n: i64) -> EkansValue {
        EkansValue {
            tag: Tag::Number as u32,
            payload: Payload { number: n },
            prev: ptr::null_mut(),
            next: ptr::null_mut(),
        }
    }

    #[test]
    fn test_value_layout() {
        // Generated code relies on this exact layout: 4-byte tag (+pad),
        // 24-byte payload (environment is the widest arm), two links.
        assert_eq!(size_of::<Payload>(), 24);
        assert_eq!(size_of::<EkansValue>(), 48);
        assert_eq!(align_of::<EkansValue>(), 8);
    }

    #[test]
    fn test_is_insensitive_to_mark_bit() {
        let mut v = number(7);
        unsafe {
            assert!(is(&v, Tag::Number));
            assert!(!is(&v, Tag::Boolean));

            mark_this(&mut v);
            assert!(is(&v, Tag::Number));
            assert!(!is(&v, Tag::Pair));

            reset_this(&mut v);
            assert!(is(&v, Tag::Number));
            assert_eq!(v.tag, Tag::Number as u32);
        }
    }

    #[test]
    fn test_mark_reset_round_trip() {
        let mut v = number(0);
        unsafe {
            assert!(!marked(&v));
            mark_this(&mut v);
            assert!(marked(&v));
            reset_this(&mut v);
            assert!(!marked(&v));
        }
    }

    #[test]
    fn test_absent_reference_is_trivially_marked() {
        unsafe {
            assert!(marked(ptr::null()));
        }
    }

    #[test]
    fn test_tag_of_masks_mark_bit() {
        let mut v = number(1);
        unsafe {
            mark_this(&mut v);
            assert_eq!(tag_of(&v), Tag::Number as u32);
            assert_ne!(v.tag, Tag::Number as u32);
        }
    }
}
