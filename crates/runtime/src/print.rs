//! The printer
//!
//! Two renderings of a value:
//!
//! - the *human* form, used by `print_ekans_value` and `failfast`: pairs
//!   open with `'(`, Nil is `'()`, characters are `#\c`, symbols are
//!   quoted `'name`, strings keep their double quotes;
//! - the *display* form, used by `format` and `list->string`: bare atoms,
//!   pairs open with `(`, Nil is `()`.
//!
//! Both render into a plain byte buffer so non-ASCII bytes pass through
//! untouched; the buffer is not a heap value and drops at the end of the
//! primitive that used it.

use ekans_core::{EkansValue, Tag, fatal, is, text_bytes};
use std::io::Write;

/// Write the display form of `v` into `out`.
pub(crate) unsafe fn write_display_form(v: *mut EkansValue, out: &mut Vec<u8>) {
    unsafe {
        if is(v, Tag::Number) {
            let _ = write!(out, "{}", (*v).payload.number);
        } else if is(v, Tag::Boolean) {
            out.extend_from_slice(if (*v).payload.boolean { b"#t" } else { b"#f" });
        } else if is(v, Tag::Character) {
            out.push((*v).payload.character);
        } else if is(v, Tag::String) || is(v, Tag::Symbol) {
            out.extend_from_slice(text_bytes(v));
        } else if is(v, Tag::Pair) {
            out.push(b'(');
            let mut v = v;
            loop {
                write_display_form((*v).payload.pair.head, out);
                v = (*v).payload.pair.tail;
                if is(v, Tag::Nil) {
                    out.push(b')');
                    break;
                } else if is(v, Tag::Pair) {
                    out.push(b' ');
                } else {
                    out.extend_from_slice(b" . ");
                    write_display_form(v, out);
                    out.push(b')');
                    break;
                }
            }
        } else if is(v, Tag::Nil) {
            out.extend_from_slice(b"()");
        } else {
            fatal("unsupported type encountered when formatting a value");
        }
    }
}

/// Write the human form of `v` into `out`.
pub(crate) unsafe fn write_human_form(v: *mut EkansValue, out: &mut Vec<u8>) {
    unsafe {
        if is(v, Tag::Number) {
            let _ = write!(out, "{}", (*v).payload.number);
        } else if is(v, Tag::Boolean) {
            out.extend_from_slice(if (*v).payload.boolean { b"#t" } else { b"#f" });
        } else if is(v, Tag::Character) {
            out.extend_from_slice(b"#\\");
            out.push((*v).payload.character);
        } else if is(v, Tag::Symbol) {
            out.push(b'\'');
            out.extend_from_slice(text_bytes(v));
        } else if is(v, Tag::String) {
            out.push(b'"');
            out.extend_from_slice(text_bytes(v));
            out.push(b'"');
        } else if is(v, Tag::Pair) {
            out.extend_from_slice(b"'(");
            let mut v = v;
            loop {
                write_human_form((*v).payload.pair.head, out);
                v = (*v).payload.pair.tail;
                if is(v, Tag::Nil) {
                    out.push(b')');
                    break;
                } else if is(v, Tag::Pair) {
                    out.push(b' ');
                } else {
                    out.extend_from_slice(b" . ");
                    write_human_form(v, out);
                    out.push(b')');
                    break;
                }
            }
        } else if is(v, Tag::Nil) {
            out.extend_from_slice(b"'()");
        } else {
            fatal("unsupported type encountered in print");
        }
    }
}

/// Write the human form of `v` to standard output, no trailing newline.
/// Used for nested printing.
///
/// # Safety
/// `v` must be a live value.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn ekans_print_ekans_value_helper(v: *mut EkansValue) {
    let mut buf = Vec::new();
    unsafe { write_human_form(v, &mut buf) };
    let mut stdout = std::io::stdout().lock();
    let _ = stdout.write_all(&buf);
}

/// Write the human form of `v` to standard output with a trailing newline.
///
/// # Safety
/// `v` must be a live value.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn ekans_print_ekans_value(v: *mut EkansValue) {
    let mut buf = Vec::new();
    unsafe { write_human_form(v, &mut buf) };
    buf.push(b'\n');
    let mut stdout = std::io::stdout().lock();
    let _ = stdout.write_all(&buf);
}

// Short names for internal use
pub use ekans_print_ekans_value as print_ekans_value;
pub use ekans_print_ekans_value_helper as print_ekans_value_helper;
