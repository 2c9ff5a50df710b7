//! Environment accessors binding namespace members to a key/value source.
//!
//! [`Environment`] resolves immediately and fails at definition time;
//! [`LazyEnvironment`] hands out [`Deferred`](cabinet_primitives::Deferred)
//! values that resolve on first read, so a definition may reference keys that
//! do not exist yet.

#![warn(missing_docs, clippy::pedantic)]

mod eager;
mod lazy;
mod lookup;
mod source;

pub use eager::Environment;
pub use lazy::LazyEnvironment;
pub use lookup::TupleOptions;
pub use source::{HostSource, Source};
