//! The `args` primitive against a captured argv.
//!
//! Argument capture is once-per-process, so these assertions live in their
//! own integration test binary.

use ekans_core::text_bytes;
use ekans_runtime::{
    EkansValue, Tag, create_environment, finalize, initialize, is,
};
use std::ffi::{CString, c_char};
use std::ptr;

#[test]
fn test_args_excludes_program_name_and_keeps_order() {
    let owned: Vec<CString> = ["ekans-program", "alpha", "beta", "gamma"]
        .iter()
        .map(|s| CString::new(*s).unwrap())
        .collect();
    let argv: Vec<*const c_char> = owned.iter().map(|c| c.as_ptr()).collect();

    unsafe {
        initialize(argv.len() as i32, argv.as_ptr());

        let mut env: *mut EkansValue = ptr::null_mut();
        create_environment(ptr::null_mut(), 0, &mut env);
        let mut list: *mut EkansValue = ptr::null_mut();
        ekans_runtime::args(env, &mut list);

        let mut seen = Vec::new();
        let mut cur = list;
        while is(cur, Tag::Pair) {
            let head = (*cur).payload.pair.head;
            assert!(is(head, Tag::String));
            seen.push(String::from_utf8_lossy(text_bytes(head)).into_owned());
            cur = (*cur).payload.pair.tail;
        }
        assert!(is(cur, Tag::Nil));
        assert_eq!(seen, vec!["alpha", "beta", "gamma"]);

        finalize();
    }
}
