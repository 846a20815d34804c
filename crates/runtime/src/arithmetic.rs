//! Arithmetic, comparison, and equality primitives
//!
//! These functions are exported with C ABI for generated code to call,
//! each with the uniform primitive signature: an environment acting as the
//! argument vector in, the result out through a handle.
//!
//! # Overflow Behavior
//!
//! Sums and differences wrap; multiplication is checked and overflow is
//! fatal; division by zero is fatal and `i64::MIN / -1` wraps rather than
//! trapping. Division truncates toward zero.

use crate::argv::{arg, boolean_arg, number_arg, require_arity, require_at_least};
use ekans_core::{
    EkansValue, Tag, binding_count, create_boolean_value, create_number_value, fatal, is, tag_of,
    text_bytes,
};

unsafe fn fold_operand(env: *mut EkansValue, index: i32, op: &str) -> i64 {
    unsafe {
        let v = arg(env, index);
        if !is(v, Tag::Number) {
            fatal(format!("not a number encountered in {op}"));
        }
        (*v).payload.number
    }
}

/// `+`: sum of any number of Numbers; the empty sum is 0.
///
/// # Safety
/// `env` must be a live argument environment, `out` a live handle.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn ekans_plus(env: *mut EkansValue, out: *mut *mut EkansValue) {
    unsafe {
        let mut sum: i64 = 0;
        for i in 0..binding_count(env) {
            sum = sum.wrapping_add(fold_operand(env, i, "+"));
        }
        create_number_value(sum, out);
    }
}

/// `-`: left fold of subtraction over at least one Number.
///
/// # Safety
/// `env` must be a live argument environment, `out` a live handle.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn ekans_subtract(env: *mut EkansValue, out: *mut *mut EkansValue) {
    unsafe {
        require_at_least(env, 1, "-");
        let mut diff = fold_operand(env, 0, "-");
        for i in 1..binding_count(env) {
            diff = diff.wrapping_sub(fold_operand(env, i, "-"));
        }
        create_number_value(diff, out);
    }
}

/// `*`: product of any number of Numbers; the empty product is 1.
/// Overflow is fatal.
///
/// # Safety
/// `env` must be a live argument environment, `out` a live handle.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn ekans_multiply(env: *mut EkansValue, out: *mut *mut EkansValue) {
    unsafe {
        let mut product: i64 = 1;
        for i in 0..binding_count(env) {
            let operand = fold_operand(env, i, "*");
            product = match product.checked_mul(operand) {
                Some(p) => p,
                None => fatal("integer overflow encountered in *"),
            };
        }
        create_number_value(product, out);
    }
}

/// `/`: left fold of truncating division over at least one Number.
/// Division by zero is fatal.
///
/// # Safety
/// `env` must be a live argument environment, `out` a live handle.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn ekans_division(env: *mut EkansValue, out: *mut *mut EkansValue) {
    unsafe {
        require_at_least(env, 1, "/");
        let mut quotient = fold_operand(env, 0, "/");
        for i in 1..binding_count(env) {
            let operand = fold_operand(env, i, "/");
            if operand == 0 {
                fatal("division by zero encountered in /");
            }
            // wrapping_div covers the i64::MIN / -1 edge case
            quotient = quotient.wrapping_div(operand);
        }
        create_number_value(quotient, out);
    }
}

/// `<` on two Numbers.
///
/// # Safety
/// `env` must be a live argument environment, `out` a live handle.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn ekans_less(env: *mut EkansValue, out: *mut *mut EkansValue) {
    unsafe {
        require_arity(env, 2, "<");
        let a = number_arg(env, 0, "<");
        let b = number_arg(env, 1, "<");
        create_boolean_value(a < b, out);
    }
}

/// `>` on two Numbers.
///
/// # Safety
/// `env` must be a live argument environment, `out` a live handle.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn ekans_greater(env: *mut EkansValue, out: *mut *mut EkansValue) {
    unsafe {
        require_arity(env, 2, ">");
        let a = number_arg(env, 0, ">");
        let b = number_arg(env, 1, ">");
        create_boolean_value(a > b, out);
    }
}

/// `not` on one Boolean.
///
/// # Safety
/// `env` must be a live argument environment, `out` a live handle.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn ekans_not(env: *mut EkansValue, out: *mut *mut EkansValue) {
    unsafe {
        require_arity(env, 1, "not");
        let v = boolean_arg(env, 0, "not");
        create_boolean_value(!v, out);
    }
}

/// Polymorphic equality shared by `equals` and `member`.
///
/// Values of different variants are unequal; Numbers and Characters
/// compare by value, Strings and Symbols by byte equality. Comparing any
/// other variant is fatal rather than silently false.
pub(crate) unsafe fn values_equal(a: *mut EkansValue, b: *mut EkansValue) -> bool {
    unsafe {
        if tag_of(a) != tag_of(b) {
            return false;
        }
        if is(a, Tag::Number) {
            (*a).payload.number == (*b).payload.number
        } else if is(a, Tag::Character) {
            (*a).payload.character == (*b).payload.character
        } else if is(a, Tag::String) || is(a, Tag::Symbol) {
            text_bytes(a) == text_bytes(b)
        } else {
            fatal("unsupported type encountered in equals");
        }
    }
}

/// `=` on two values.
///
/// # Safety
/// `env` must be a live argument environment, `out` a live handle.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn ekans_equals(env: *mut EkansValue, out: *mut *mut EkansValue) {
    unsafe {
        require_arity(env, 2, "equals");
        let result = values_equal(arg(env, 0), arg(env, 1));
        create_boolean_value(result, out);
    }
}

/// Truth test used by generated branch code. Anything but a Boolean is a
/// type error in the compiled program.
///
/// # Safety
/// `v` must be a live value.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn ekans_is_true(v: *mut EkansValue) -> bool {
    unsafe {
        if !is(v, Tag::Boolean) {
            fatal("not a boolean encountered in is_true");
        }
        (*v).payload.boolean
    }
}

// Short names for internal use
pub use ekans_division as division;
pub use ekans_equals as equals;
pub use ekans_greater as greater;
pub use ekans_is_true as is_true;
pub use ekans_less as less;
pub use ekans_multiply as multiply;
pub use ekans_not as not;
pub use ekans_plus as plus;
pub use ekans_subtract as subtract;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{arg_env, init, number, sweep_everything};
    use serial_test::serial;
    use std::ptr;

    #[test]
    #[serial]
    fn test_plus_sums_all_operands() {
        unsafe {
            init();
            let env = arg_env(&[number(1), number(2), number(3)]);
            let mut result: *mut EkansValue = ptr::null_mut();
            plus(env, &mut result);
            assert_eq!((*result).payload.number, 6);
            sweep_everything();
        }
    }

    #[test]
    #[serial]
    fn test_plus_empty_sum_is_zero() {
        unsafe {
            init();
            let env = arg_env(&[]);
            let mut result: *mut EkansValue = ptr::null_mut();
            plus(env, &mut result);
            assert_eq!((*result).payload.number, 0);
            sweep_everything();
        }
    }

    #[test]
    #[serial]
    fn test_subtract_left_fold() {
        unsafe {
            init();
            let env = arg_env(&[number(10), number(3), number(2)]);
            let mut result: *mut EkansValue = ptr::null_mut();
            subtract(env, &mut result);
            assert_eq!((*result).payload.number, 5);
            sweep_everything();
        }
    }

    #[test]
    #[serial]
    fn test_multiply_and_division() {
        unsafe {
            init();
            let env = arg_env(&[number(6), number(7)]);
            let mut result: *mut EkansValue = ptr::null_mut();
            multiply(env, &mut result);
            assert_eq!((*result).payload.number, 42);

            let env = arg_env(&[number(-10), number(3)]);
            division(env, &mut result);
            assert_eq!((*result).payload.number, -3); // truncates toward zero

            sweep_everything();
        }
    }

    #[test]
    #[serial]
    fn test_multiply_empty_product_is_one() {
        unsafe {
            init();
            let env = arg_env(&[]);
            let mut result: *mut EkansValue = ptr::null_mut();
            multiply(env, &mut result);
            assert_eq!((*result).payload.number, 1);
            sweep_everything();
        }
    }

    #[test]
    #[serial]
    fn test_division_min_by_minus_one_wraps() {
        unsafe {
            init();
            let env = arg_env(&[number(i64::MIN), number(-1)]);
            let mut result: *mut EkansValue = ptr::null_mut();
            division(env, &mut result);
            assert_eq!((*result).payload.number, i64::MIN);
            sweep_everything();
        }
    }

    #[test]
    #[serial]
    fn test_comparisons() {
        unsafe {
            init();
            let mut result: *mut EkansValue = ptr::null_mut();

            less(arg_env(&[number(1), number(2)]), &mut result);
            assert!((*result).payload.boolean);
            less(arg_env(&[number(2), number(1)]), &mut result);
            assert!(!(*result).payload.boolean);

            greater(arg_env(&[number(2), number(1)]), &mut result);
            assert!((*result).payload.boolean);

            sweep_everything();
        }
    }

    #[test]
    #[serial]
    fn test_not() {
        unsafe {
            init();
            let mut b: *mut EkansValue = ptr::null_mut();
            create_boolean_value(false, &mut b);
            let mut result: *mut EkansValue = ptr::null_mut();
            not(arg_env(&[b]), &mut result);
            assert!((*result).payload.boolean);
            sweep_everything();
        }
    }

    #[test]
    #[serial]
    fn test_equals_by_value_and_bytes() {
        unsafe {
            init();
            let mut result: *mut EkansValue = ptr::null_mut();

            equals(arg_env(&[number(5), number(5)]), &mut result);
            assert!((*result).payload.boolean);

            // Mismatched variants are unequal, not fatal.
            let mut c: *mut EkansValue = ptr::null_mut();
            ekans_core::create_char_value(b'5', &mut c);
            equals(arg_env(&[number(5), c]), &mut result);
            assert!(!(*result).payload.boolean);

            let mut s1: *mut EkansValue = ptr::null_mut();
            let mut s2: *mut EkansValue = ptr::null_mut();
            ekans_core::create_text_value(Tag::String, b"abc", &mut s1);
            ekans_core::create_text_value(Tag::String, b"abc", &mut s2);
            equals(arg_env(&[s1, s2]), &mut result);
            assert!((*result).payload.boolean);

            let mut sym: *mut EkansValue = ptr::null_mut();
            ekans_core::create_text_value(Tag::Symbol, b"abc", &mut sym);
            equals(arg_env(&[s1, sym]), &mut result);
            assert!(!(*result).payload.boolean);

            sweep_everything();
        }
    }

    #[test]
    #[serial]
    fn test_is_true() {
        unsafe {
            init();
            let mut t: *mut EkansValue = ptr::null_mut();
            create_boolean_value(true, &mut t);
            assert!(is_true(t));
            let mut f: *mut EkansValue = ptr::null_mut();
            create_boolean_value(false, &mut f);
            assert!(!is_true(f));
            sweep_everything();
        }
    }
}
