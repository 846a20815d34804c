//! Ekans Core: the managed object system for the Ekans runtime
//!
//! This crate owns everything that makes values live and die: the tagged
//! heap value model, the intrusive heap list that enumerates every
//! allocation, the explicit root registry the mutator pushes its stack
//! slots onto, and the mark-and-sweep collector that traces from those
//! slots.
//!
//! Key design principles:
//! - EkansValue: tagged heap object; the mark bit lives in the tag word
//! - Every allocation is threaded onto one doubly-linked heap list
//! - Roots are explicit: generated code registers the addresses of its
//!   stack variables, so the collector sees through updates
//! - Collection happens only at explicit safe points, never inside a
//!   constructor
//!
//! # Modules
//!
//! - `value`: tag, payload union, mark-bit operations
//! - `alloc`: fail-fast wrappers over the system allocator
//! - `heap`: sentinel-delimited heap list
//! - `roots`: push/pop of mutator stack slots
//! - `gc`: mark and sweep
//! - `constructors`: one allocation routine per variant
//! - `environment`: frames, lexical walks, closures
//! - `error`: fatal diagnostics

pub mod alloc;
pub mod constructors;
pub mod environment;
pub mod error;
pub mod gc;
pub mod heap;
pub mod roots;

pub mod value;

// Re-export key types and functions
pub use value::{
    ClosureData, EkansFunction, EkansValue, EnvironmentData, MARK_BIT, PairData, Payload, Tag, is,
    mark_this, marked, reset_this, tag_of, text_bytes,
};

pub use error::fatal;

pub use alloc::{brutal_calloc, brutal_free, brutal_malloc};

// Constructors (exported for generated code)
pub use constructors::{
    create_boolean_value, create_char_value, create_cons_cell, create_nil_value,
    create_number_value, create_string_value, create_symbol_value, create_text_value,
};

// Environment and closure operations (exported for generated code)
pub use environment::{
    binding_at, binding_count, closure_of, create_closure, create_environment, function_of,
    get_environment, set_environment,
};

// Root protocol and collector (exported for generated code)
pub use gc::collect;
pub use roots::{pop_stack_slot, push_stack_slot};
