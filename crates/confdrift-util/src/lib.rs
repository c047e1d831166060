//! confdrift-util — leaf utilities shared across the confdrift workspace.
//!
//! Everything in this crate is dependency-free and purely functional: stable
//! sorting primitives used by the collation serializer, and JSON string
//! escaping used to build canonical serialized text.

pub mod sort;
pub mod strings;

pub use sort::{insertion_sort, insertion_sort_by};
pub use strings::escape;
