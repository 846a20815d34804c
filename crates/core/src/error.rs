//! Fatal diagnostics
//!
//! The Ekans language does not support handling errors, so when a runtime
//! contract is violated all there is to do is print the problem and quit
//! the process with a non-zero exit code. Nothing is raised, caught, or
//! returned to generated code; the ABI stays uniformly "returns a value".

use std::fmt::Display;
use std::process;

/// Print `Error: <msg>` on a single line to standard error and terminate
/// the process with exit status 1.
pub fn fatal(msg: impl Display) -> ! {
    eprintln!("Error: {msg}");
    process::exit(1);
}
