//! String primitives
//!
//! `format`, `list->string`, and `string-append` assemble their results in
//! a plain growable byte buffer, then hand the bytes to the String
//! constructor; the buffer itself is never a heap value and drops when the
//! primitive returns.

use crate::argv::{arg, require_at_least, string_arg};
use crate::print::write_display_form;
use ekans_core::{
    EkansValue, Tag, binding_count, create_char_value, create_cons_cell, create_nil_value,
    create_text_value, fatal, is,
};
use std::ptr;

/// `string->list`: the characters of a String as a proper list, built
/// right-to-left so the list reads left-to-right.
///
/// # Safety
/// `env` must be a live argument environment, `out` a live handle.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn ekans_string_to_list(env: *mut EkansValue, out: *mut *mut EkansValue) {
    unsafe {
        crate::argv::require_arity(env, 1, "string_to_list");
        let bytes = string_arg(env, 0, "string_to_list");

        let mut result: *mut EkansValue = ptr::null_mut();
        create_nil_value(&mut result);
        for &b in bytes.iter().rev() {
            let mut c: *mut EkansValue = ptr::null_mut();
            create_char_value(b, &mut c);
            let mut cell: *mut EkansValue = ptr::null_mut();
            create_cons_cell(c, result, &mut cell);
            result = cell;
        }
        *out = result;
    }
}

/// `list->string`: the display forms of the elements of a proper list,
/// concatenated into one String.
///
/// # Safety
/// `env` must be a live argument environment, `out` a live handle.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn ekans_list_to_string(env: *mut EkansValue, out: *mut *mut EkansValue) {
    unsafe {
        crate::argv::require_arity(env, 1, "list_to_string");
        let mut list = arg(env, 0);
        if !is(list, Tag::Pair) {
            fatal("list_to_string requires its 1st argument to be a pair");
        }

        let mut buf = Vec::new();
        while is(list, Tag::Pair) {
            write_display_form((*list).payload.pair.head, &mut buf);
            list = (*list).payload.pair.tail;
        }
        if !is(list, Tag::Nil) {
            fatal("the list passed to list_to_string must end with nil");
        }
        create_text_value(Tag::String, &buf, out);
    }
}

/// `string-append`: concatenation of any number of Strings; the empty
/// append is the empty String.
///
/// # Safety
/// `env` must be a live argument environment, `out` a live handle.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn ekans_string_append(env: *mut EkansValue, out: *mut *mut EkansValue) {
    unsafe {
        let mut buf = Vec::new();
        for i in 0..binding_count(env) {
            buf.extend_from_slice(string_arg(env, i, "string_append"));
        }
        create_text_value(Tag::String, &buf, out);
    }
}

/// `format`: replace each `~a` in the format string, left to right, with
/// the display form of the next argument. Running out of arguments is
/// fatal; extra arguments are ignored.
///
/// # Safety
/// `env` must be a live argument environment, `out` a live handle.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn ekans_format(env: *mut EkansValue, out: *mut *mut EkansValue) {
    unsafe {
        require_at_least(env, 1, "format");
        let fmt = string_arg(env, 0, "format");
        let arg_count = binding_count(env);

        let mut buf = Vec::new();
        let mut arg_index: i32 = 1;
        let mut i = 0;
        while i < fmt.len() {
            if fmt[i] == b'~' && i + 1 < fmt.len() && fmt[i + 1] == b'a' {
                if arg_index >= arg_count {
                    fatal("too few arguments encountered in format");
                }
                write_display_form(arg(env, arg_index), &mut buf);
                arg_index += 1;
                i += 2;
            } else {
                buf.push(fmt[i]);
                i += 1;
            }
        }
        create_text_value(Tag::String, &buf, out);
    }
}

// Short names for internal use
pub use ekans_format as format_op;
pub use ekans_list_to_string as list_to_string;
pub use ekans_string_append as string_append;
pub use ekans_string_to_list as string_to_list;
