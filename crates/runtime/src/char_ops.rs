//! Character primitives
//!
//! The character model is single-byte; comparisons are plain byte
//! comparisons.

use crate::argv::{char_arg, require_arity};
use ekans_core::{EkansValue, create_boolean_value, create_number_value};

/// `char<=` on two Characters.
///
/// # Safety
/// `env` must be a live argument environment, `out` a live handle.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn ekans_char_le(env: *mut EkansValue, out: *mut *mut EkansValue) {
    unsafe {
        require_arity(env, 2, "char_le");
        let a = char_arg(env, 0, "char_le");
        let b = char_arg(env, 1, "char_le");
        create_boolean_value(a <= b, out);
    }
}

/// `char>=` on two Characters.
///
/// # Safety
/// `env` must be a live argument environment, `out` a live handle.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn ekans_char_ge(env: *mut EkansValue, out: *mut *mut EkansValue) {
    unsafe {
        require_arity(env, 2, "char_ge");
        let a = char_arg(env, 0, "char_ge");
        let b = char_arg(env, 1, "char_ge");
        create_boolean_value(a >= b, out);
    }
}

/// `char->int`: the byte value of a Character as a Number.
///
/// # Safety
/// `env` must be a live argument environment, `out` a live handle.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn ekans_char_to_int(env: *mut EkansValue, out: *mut *mut EkansValue) {
    unsafe {
        require_arity(env, 1, "char_to_int");
        let c = char_arg(env, 0, "char_to_int");
        create_number_value(c as i64, out);
    }
}

// Short names for internal use
pub use ekans_char_ge as char_ge;
pub use ekans_char_le as char_le;
pub use ekans_char_to_int as char_to_int;
