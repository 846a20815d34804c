//! List primitives
//!
//! Pairs are built by `cons` and the variadic `list` constructor; proper
//! lists end in Nil. `member` deliberately answers with a Boolean rather
//! than the matching tail.
//!
//! None of these trigger a collection, so the intermediate cells built by
//! the right-to-left constructors need no root registrations.

use crate::argv::{arg, require_arity};
use crate::arithmetic::values_equal;
use ekans_core::{
    EkansValue, Tag, binding_count, create_boolean_value, create_cons_cell, create_nil_value,
    fatal, is,
};
use std::ptr;

pub(crate) unsafe fn car_of(v: *mut EkansValue, op: &str) -> *mut EkansValue {
    unsafe {
        if !is(v, Tag::Pair) {
            fatal(format!("{op} requires its 1st argument to be a pair"));
        }
        (*v).payload.pair.head
    }
}

pub(crate) unsafe fn cdr_of(v: *mut EkansValue, op: &str) -> *mut EkansValue {
    unsafe {
        if !is(v, Tag::Pair) {
            fatal(format!("{op} requires its 1st argument to be a pair"));
        }
        (*v).payload.pair.tail
    }
}

/// `cons` on two values of any variant.
///
/// # Safety
/// `env` must be a live argument environment, `out` a live handle.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn ekans_list_cons(env: *mut EkansValue, out: *mut *mut EkansValue) {
    unsafe {
        require_arity(env, 2, "cons");
        create_cons_cell(arg(env, 0), arg(env, 1), out);
    }
}

/// `list`: a proper list of the arguments, built right-to-left onto Nil.
///
/// # Safety
/// `env` must be a live argument environment, `out` a live handle.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn ekans_list_constructor(env: *mut EkansValue, out: *mut *mut EkansValue) {
    unsafe {
        let mut result: *mut EkansValue = ptr::null_mut();
        create_nil_value(&mut result);
        for i in (0..binding_count(env)).rev() {
            let mut cell: *mut EkansValue = ptr::null_mut();
            create_cons_cell(arg(env, i), result, &mut cell);
            result = cell;
        }
        *out = result;
    }
}

/// `null?`: true iff the argument is Nil.
///
/// # Safety
/// `env` must be a live argument environment, `out` a live handle.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn ekans_is_null(env: *mut EkansValue, out: *mut *mut EkansValue) {
    unsafe {
        require_arity(env, 1, "is_null");
        create_boolean_value(is(arg(env, 0), Tag::Nil), out);
    }
}

/// `pair?`: true iff the argument is a Pair.
///
/// # Safety
/// `env` must be a live argument environment, `out` a live handle.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn ekans_is_pair(env: *mut EkansValue, out: *mut *mut EkansValue) {
    unsafe {
        require_arity(env, 1, "is_pair");
        create_boolean_value(is(arg(env, 0), Tag::Pair), out);
    }
}

/// `car` of a Pair.
///
/// # Safety
/// `env` must be a live argument environment, `out` a live handle.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn ekans_car(env: *mut EkansValue, out: *mut *mut EkansValue) {
    unsafe {
        require_arity(env, 1, "car");
        *out = car_of(arg(env, 0), "car");
    }
}

/// `cdr` of a Pair.
///
/// # Safety
/// `env` must be a live argument environment, `out` a live handle.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn ekans_cdr(env: *mut EkansValue, out: *mut *mut EkansValue) {
    unsafe {
        require_arity(env, 1, "cdr");
        *out = cdr_of(arg(env, 0), "cdr");
    }
}

/// `member`: true iff some element of the list equals the target.
///
/// Unlike the namesake in similar languages this answers with a Boolean,
/// not the matching tail. The list must end with Nil.
///
/// # Safety
/// `env` must be a live argument environment, `out` a live handle.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn ekans_member(env: *mut EkansValue, out: *mut *mut EkansValue) {
    unsafe {
        require_arity(env, 2, "member");
        let target = arg(env, 0);
        let mut list = arg(env, 1);

        while is(list, Tag::Pair) {
            if values_equal(target, (*list).payload.pair.head) {
                create_boolean_value(true, out);
                return;
            }
            list = (*list).payload.pair.tail;
        }
        if !is(list, Tag::Nil) {
            fatal("the list passed to member must end with nil");
        }
        create_boolean_value(false, out);
    }
}

/// Apply a car/cdr path to a value, rightmost letter first, as the name
/// of the accessor spells it.
unsafe fn walk(mut v: *mut EkansValue, path: &[u8], op: &str) -> *mut EkansValue {
    unsafe {
        for step in path.iter().rev() {
            v = match step {
                b'a' => car_of(v, op),
                _ => cdr_of(v, op),
            };
        }
    }
    v
}

macro_rules! nested_accessor {
    ($abi:ident, $name:literal, $path:literal) => {
        /// Nested car/cdr accessor; the name spells the path.
        ///
        /// # Safety
        /// `env` must be a live argument environment, `out` a live handle.
        #[unsafe(no_mangle)]
        pub unsafe extern "C" fn $abi(env: *mut EkansValue, out: *mut *mut EkansValue) {
            unsafe {
                require_arity(env, 1, $name);
                *out = walk(arg(env, 0), $path, $name);
            }
        }
    };
}

nested_accessor!(ekans_cadr, "cadr", b"ad");
nested_accessor!(ekans_caddr, "caddr", b"add");
nested_accessor!(ekans_cddr, "cddr", b"dd");
nested_accessor!(ekans_cdadr, "cdadr", b"dad");
nested_accessor!(ekans_cddadr, "cddadr", b"ddad");
nested_accessor!(ekans_caadr, "caadr", b"aad");
nested_accessor!(ekans_caar, "caar", b"aa");
nested_accessor!(ekans_cdar, "cdar", b"da");
nested_accessor!(ekans_cdddr, "cdddr", b"ddd");
nested_accessor!(ekans_cadddr, "cadddr", b"addd");

// Short names for internal use
pub use ekans_caadr as caadr;
pub use ekans_caar as caar;
pub use ekans_cadddr as cadddr;
pub use ekans_caddr as caddr;
pub use ekans_cadr as cadr;
pub use ekans_car as car;
pub use ekans_cdadr as cdadr;
pub use ekans_cdar as cdar;
pub use ekans_cddadr as cddadr;
pub use ekans_cdddr as cdddr;
pub use ekans_cddr as cddr;
pub use ekans_cdr as cdr;
pub use ekans_is_null as is_null;
pub use ekans_is_pair as is_pair;
pub use ekans_list_cons as list_cons;
pub use ekans_list_constructor as list_constructor;
pub use ekans_member as member;
