//! File primitives
//!
//! Whole-file read and write on caller-supplied paths; no transactional
//! guarantees. Open, read, and write failures are fatal like every other
//! runtime error.

use crate::argv::{require_arity, string_arg};
use ekans_core::{EkansValue, Tag, create_nil_value, create_text_value, fatal};
use std::fs;

/// `read-file`: the entire contents of a file as a String.
///
/// # Safety
/// `env` must be a live argument environment, `out` a live handle.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn ekans_read_file(env: *mut EkansValue, out: *mut *mut EkansValue) {
    unsafe {
        require_arity(env, 1, "read_file");
        let path = String::from_utf8_lossy(string_arg(env, 0, "read_file")).into_owned();

        let contents = match fs::read(&path) {
            Ok(bytes) => bytes,
            Err(_) => fatal(format!("failed to open file {path}")),
        };
        create_text_value(Tag::String, &contents, out);
    }
}

/// `write-file`: replace the contents of a file with a String; the result
/// is Nil.
///
/// # Safety
/// `env` must be a live argument environment, `out` a live handle.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn ekans_write_file(env: *mut EkansValue, out: *mut *mut EkansValue) {
    unsafe {
        require_arity(env, 2, "write_file");
        let path = String::from_utf8_lossy(string_arg(env, 0, "write_file")).into_owned();
        let contents = string_arg(env, 1, "write_file");

        if fs::write(&path, contents).is_err() {
            fatal(format!("failed to open file {path}"));
        }
        create_nil_value(out);
    }
}

// Short names for internal use
pub use ekans_read_file as read_file;
pub use ekans_write_file as write_file;
