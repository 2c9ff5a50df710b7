//! Construction and access control for frozen configuration namespaces.
//!
//! A [`Registry`] turns an ordered list of declarations into an immutable
//! [`Namespace`]: names are checked against the query surface and against each
//! other, inherited members are merged, and nested namespaces learn their
//! parent. Reads resolve deferred values and computed members on the fly;
//! writes and deletes always fail. [`Namespace::prefetch`] resolves a whole
//! tree at once and reports every environment failure together.

#![warn(missing_docs, clippy::pedantic)]

mod member;
mod namespace;
mod registry;
mod render;

pub use member::{Computed, Entry, Member};
pub use namespace::Namespace;
pub use registry::{Base, Definition, Registry};
