//! Environment frames and closures
//!
//! An environment is a fixed-size indexed frame of value references with a
//! parent link; generated code resolves a variable as (levels up the
//! parent chain, index into the frame). The same frames double as the
//! argument vectors of closure calls: the caller builds an environment
//! whose size equals the argument count, writes each argument into a
//! binding slot, and invokes the closure's function on it.
//!
//! Bindings start out null ("no value yet"); reading one before it has
//! been written is a use-before-initialize bug in the generated code and
//! is fatal.

use crate::alloc::brutal_calloc;
use crate::constructors::alloc_value;
use crate::error::fatal;
use crate::heap;
use crate::value::{ClosureData, EkansFunction, EkansValue, EnvironmentData, Tag, is};
use std::mem::size_of;

/// Allocate an environment with `size` zero-initialized bindings.
///
/// `parent` may be null for the root environment.
///
/// # Safety
/// `parent` must be null or a live Environment; `out` must point to a
/// live handle; the runtime must be initialized.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn ekans_create_environment(
    parent: *mut EkansValue,
    size: i32,
    out: *mut *mut EkansValue,
) {
    unsafe {
        if !parent.is_null() && !is(parent, Tag::Environment) {
            fatal("parent of an environment must be an environment");
        }
    }
    if size < 0 {
        fatal(format!("environment size cannot be negative: {size}"));
    }
    let result = alloc_value(Tag::Environment);
    let bindings =
        brutal_calloc(size as usize, size_of::<*mut EkansValue>()) as *mut *mut EkansValue;
    unsafe {
        (*result).payload.environment = EnvironmentData {
            parent,
            bindings,
            binding_count: size,
        };
        *out = result;
        heap::append(result);
    }
}

/// Overwrite the binding at `index` in place.
///
/// # Safety
/// `env` must be a live Environment; `value` must be a live value.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn ekans_set_environment(
    env: *mut EkansValue,
    index: i32,
    value: *mut EkansValue,
) {
    unsafe {
        if !is(env, Tag::Environment) {
            fatal("set_environment requires an environment");
        }
        let e = (*env).payload.environment;
        if index < 0 || index >= e.binding_count {
            fatal(format!(
                "binding index {index} out of range for environment of size {}",
                e.binding_count
            ));
        }
        *e.bindings.add(index as usize) = value;
    }
}

/// Read a binding, walking `levels_up` parent links first.
///
/// Each step of the walk must land on an environment; walking off the
/// chain is a bug in the generated code. Reading a binding that was never
/// written is fatal: it means a definition was accessed before its
/// evaluation.
///
/// # Safety
/// `env` must be a live Environment; `out` must point to a live handle.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn ekans_get_environment(
    env: *mut EkansValue,
    levels_up: i32,
    index: i32,
    out: *mut *mut EkansValue,
) {
    unsafe {
        if !is(env, Tag::Environment) {
            fatal("get_environment requires an environment");
        }
        let mut env = env;
        let mut levels = levels_up;
        while levels > 0 {
            env = (*env).payload.environment.parent;
            if env.is_null() || !is(env, Tag::Environment) {
                fatal("walked off the environment chain");
            }
            levels -= 1;
        }
        let e = (*env).payload.environment;
        if index < 0 || index >= e.binding_count {
            fatal(format!(
                "binding index {index} out of range for environment of size {}",
                e.binding_count
            ));
        }
        let binding = *e.bindings.add(index as usize);
        if binding.is_null() {
            fatal("accessing a definition before evaluation");
        }
        *out = binding;
    }
}

/// Allocate a closure over `env` and `function`.
///
/// # Safety
/// `env` must be a live Environment; `out` must point to a live handle;
/// the runtime must be initialized.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn ekans_create_closure(
    env: *mut EkansValue,
    function: EkansFunction,
    out: *mut *mut EkansValue,
) {
    unsafe {
        if !is(env, Tag::Environment) {
            fatal("closure environment must be an environment");
        }
    }
    let result = alloc_value(Tag::Closure);
    unsafe {
        (*result).payload.closure = ClosureData { env, function };
        *out = result;
        heap::append(result);
    }
}

/// Extract the captured environment of a closure.
///
/// # Safety
/// `val` must be a live value; `out` must point to a live handle.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn ekans_closure_of(val: *mut EkansValue, out: *mut *mut EkansValue) {
    unsafe {
        if !is(val, Tag::Closure) {
            fatal("not a function encountered in a call");
        }
        *out = (*val).payload.closure.env;
    }
}

/// Extract the code pointer of a closure. The only producing operation in
/// the ABI that does not go through an out-handle.
///
/// # Safety
/// `val` must be a live value.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn ekans_function_of(val: *mut EkansValue) -> EkansFunction {
    unsafe {
        if !is(val, Tag::Closure) {
            fatal("not a function encountered in a call");
        }
        (*val).payload.closure.function
    }
}

/// The binding count of an environment: the authoritative arity when the
/// environment is an argument vector.
///
/// # Safety
/// `env` must be a live Environment.
pub unsafe fn binding_count(env: *const EkansValue) -> i32 {
    debug_assert!(unsafe { is(env, Tag::Environment) });
    unsafe { (*env).payload.environment.binding_count }
}

/// The binding at `index`, which may be null if never written.
///
/// # Safety
/// `env` must be a live Environment and `index` in range.
pub unsafe fn binding_at(env: *const EkansValue, index: i32) -> *mut EkansValue {
    unsafe {
        let e = (*env).payload.environment;
        debug_assert!(index >= 0 && index < e.binding_count);
        *e.bindings.add(index as usize)
    }
}

// Short names for internal use
pub use ekans_closure_of as closure_of;
pub use ekans_create_closure as create_closure;
pub use ekans_create_environment as create_environment;
pub use ekans_function_of as function_of;
pub use ekans_get_environment as get_environment;
pub use ekans_set_environment as set_environment;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constructors::create_number_value;
    use crate::gc::ekans_collect;
    use crate::heap::install_sentinels;
    use serial_test::serial;
    use std::ptr;

    #[test]
    #[serial]
    fn test_bindings_start_absent() {
        unsafe {
            install_sentinels();

            let mut env: *mut EkansValue = ptr::null_mut();
            create_environment(ptr::null_mut(), 3, &mut env);

            for i in 0..3 {
                assert!(binding_at(env, i).is_null());
            }
            assert_eq!(binding_count(env), 3);

            ekans_collect();
        }
    }

    #[test]
    #[serial]
    fn test_set_then_get() {
        unsafe {
            install_sentinels();

            let mut env: *mut EkansValue = ptr::null_mut();
            create_environment(ptr::null_mut(), 2, &mut env);
            let mut n: *mut EkansValue = ptr::null_mut();
            create_number_value(7, &mut n);
            set_environment(env, 1, n);

            let mut got: *mut EkansValue = ptr::null_mut();
            get_environment(env, 0, 1, &mut got);
            assert_eq!(got, n);

            ekans_collect();
        }
    }

    #[test]
    #[serial]
    fn test_get_walks_parent_chain() {
        unsafe {
            install_sentinels();

            let mut global: *mut EkansValue = ptr::null_mut();
            create_environment(ptr::null_mut(), 1, &mut global);
            let mut n: *mut EkansValue = ptr::null_mut();
            create_number_value(99, &mut n);
            set_environment(global, 0, n);

            let mut inner: *mut EkansValue = ptr::null_mut();
            create_environment(global, 1, &mut inner);
            let mut innermost: *mut EkansValue = ptr::null_mut();
            create_environment(inner, 1, &mut innermost);

            let mut got: *mut EkansValue = ptr::null_mut();
            get_environment(innermost, 2, 0, &mut got);
            assert_eq!(got, n);

            ekans_collect();
        }
    }

    #[test]
    #[serial]
    fn test_closure_round_trip() {
        unsafe extern "C" fn nop(_env: *mut EkansValue, _out: *mut *mut EkansValue) {}

        unsafe {
            install_sentinels();

            let mut env: *mut EkansValue = ptr::null_mut();
            create_environment(ptr::null_mut(), 0, &mut env);
            let mut clo: *mut EkansValue = ptr::null_mut();
            create_closure(env, nop, &mut clo);

            let mut captured: *mut EkansValue = ptr::null_mut();
            closure_of(clo, &mut captured);
            assert_eq!(captured, env);
            assert_eq!(function_of(clo) as usize, nop as usize);

            ekans_collect();
        }
    }
}
