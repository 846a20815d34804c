//! Env-as-argv helpers shared by the primitives
//!
//! Every primitive receives an environment acting as its argument vector
//! and writes its result through an out-handle. There is no second calling
//! convention: the environment's binding count is the authoritative arity
//! at the call site, and these helpers enforce it.

use ekans_core::{EkansValue, Tag, binding_at, binding_count, fatal, is, text_bytes};

/// Fatal unless the argument vector holds exactly `expected` bindings.
pub(crate) unsafe fn require_arity(env: *mut EkansValue, expected: i32, op: &str) {
    let count = unsafe { binding_count(env) };
    if count != expected {
        fatal(format!("{op} requires exactly {expected} arguments"));
    }
}

/// Fatal unless the argument vector holds at least `expected` bindings.
pub(crate) unsafe fn require_at_least(env: *mut EkansValue, expected: i32, op: &str) {
    let count = unsafe { binding_count(env) };
    if count < expected {
        fatal(format!("{op} requires at least {expected} arguments"));
    }
}

/// The argument at `index`. An absent binding here means generated code
/// broke the call protocol.
pub(crate) unsafe fn arg(env: *mut EkansValue, index: i32) -> *mut EkansValue {
    let v = unsafe { binding_at(env, index) };
    if v.is_null() {
        fatal("accessing a definition before evaluation");
    }
    v
}

pub(crate) fn ordinal(index: i32) -> String {
    match index {
        0 => "1st".to_string(),
        1 => "2nd".to_string(),
        2 => "3rd".to_string(),
        n => format!("{}th", n + 1),
    }
}

/// The argument at `index`, required to be a Number.
pub(crate) unsafe fn number_arg(env: *mut EkansValue, index: i32, op: &str) -> i64 {
    unsafe {
        let v = arg(env, index);
        if !is(v, Tag::Number) {
            fatal(format!(
                "{op} requires its {} argument to be a number",
                ordinal(index)
            ));
        }
        (*v).payload.number
    }
}

/// The argument at `index`, required to be a Boolean.
pub(crate) unsafe fn boolean_arg(env: *mut EkansValue, index: i32, op: &str) -> bool {
    unsafe {
        let v = arg(env, index);
        if !is(v, Tag::Boolean) {
            fatal(format!(
                "{op} requires its {} argument to be a boolean",
                ordinal(index)
            ));
        }
        (*v).payload.boolean
    }
}

/// The argument at `index`, required to be a Character.
pub(crate) unsafe fn char_arg(env: *mut EkansValue, index: i32, op: &str) -> u8 {
    unsafe {
        let v = arg(env, index);
        if !is(v, Tag::Character) {
            fatal(format!(
                "{op} requires its {} argument to be a character",
                ordinal(index)
            ));
        }
        (*v).payload.character
    }
}

/// The bytes of the argument at `index`, required to be a String.
pub(crate) unsafe fn string_arg<'a>(env: *mut EkansValue, index: i32, op: &str) -> &'a [u8] {
    unsafe {
        let v = arg(env, index);
        if !is(v, Tag::String) {
            fatal(format!(
                "{op} requires its {} argument to be a string",
                ordinal(index)
            ));
        }
        text_bytes(v)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ordinal_spelling() {
        assert_eq!(ordinal(0), "1st");
        assert_eq!(ordinal(1), "2nd");
        assert_eq!(ordinal(2), "3rd");
        assert_eq!(ordinal(3), "4th");
        assert_eq!(ordinal(9), "10th");
    }
}
