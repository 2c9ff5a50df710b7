//! Core shared types for frozen configuration namespaces.

#![warn(missing_docs, clippy::pedantic)]

mod capability;
mod deferred;
mod error;
mod ids;
mod names;
mod value;

/// Capability tags distinguishing sections from configs.
pub use capability::{Capabilities, Capability};
/// Cached, on-demand computed values.
pub use deferred::Deferred;
/// Error taxonomy and result alias shared across the workspace.
pub use error::{EnvError, Error, ParseError, Result, StructureError, ValidationError};
/// Identity of the registry that built a namespace.
pub use ids::RegistryId;
/// Member-name rules applied at construction time.
pub use names::{RESERVED_NAMES, is_dunder, is_reserved};
/// Scalar values stored in namespaces.
pub use value::{Value, repr_str};
