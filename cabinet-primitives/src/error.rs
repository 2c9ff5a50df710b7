//! Error taxonomy shared by every cabinet crate.
//!
//! Two families hang off the root [`Error`]: structure errors describe
//! programming defects in a definition or in how a frozen namespace is used,
//! environment errors describe deployment defects in the key/value source.
//! Only the latter are collected by the prefetch pass.

use thiserror::Error;

use crate::value::repr_str;

/// Result alias used throughout the workspace.
pub type Result<T> = std::result::Result<T, Error>;

/// Root error category.
#[derive(Debug, Error)]
pub enum Error {
    /// Construction or access-control violation.
    #[error(transparent)]
    Structure(#[from] StructureError),

    /// Key/value source lookup or parsing failure.
    #[error(transparent)]
    Environment(#[from] EnvError),

    /// Aggregate of environment failures found by a prefetch pass.
    #[error(transparent)]
    Validation(#[from] ValidationError),
}

impl Error {
    /// Returns `true` for errors caused by the key/value source, including the
    /// aggregate produced by prefetch.
    #[must_use]
    pub const fn is_environment(&self) -> bool {
        matches!(self, Self::Environment(_) | Self::Validation(_))
    }

    /// Returns `true` for errors caused by the definition or its usage.
    #[must_use]
    pub const fn is_structure(&self) -> bool {
        matches!(self, Self::Structure(_) | Self::Validation(_))
    }
}

impl From<ParseError> for Error {
    fn from(value: ParseError) -> Self {
        Self::Environment(EnvError::Parse(value))
    }
}

/// Errors raised while building or accessing a namespace.
#[derive(Debug, Error)]
pub enum StructureError {
    /// Read of a member that was never declared or inherited.
    #[error("'{name}' does not exist in {owner}")]
    MissingMember {
        /// Requested member name.
        name: String,
        /// Repr of the namespace that was queried.
        owner: String,
    },

    /// Write of a new member after construction.
    #[error("Attempted to add '{name}' to {owner} at runtime")]
    RuntimeAdd {
        /// Member name the caller tried to add.
        name: String,
        /// Repr of the frozen namespace.
        owner: String,
    },

    /// Write over an existing member after construction.
    #[error("Attempted to override '{name}' in {owner}")]
    RuntimeOverride {
        /// Member name the caller tried to replace.
        name: String,
        /// Repr of the frozen namespace.
        owner: String,
    },

    /// Removal of a member after construction.
    #[error("Attempted to remove '{name}' from {owner}")]
    RuntimeRemove {
        /// Member name the caller tried to remove.
        name: String,
        /// Repr of the frozen namespace.
        owner: String,
    },

    /// The same name was declared twice in one definition body.
    #[error("Attempted to reuse '{name}' in '{declaring}'")]
    DuplicateName {
        /// Redeclared member name.
        name: String,
        /// Name of the definition being built.
        declaring: String,
    },

    /// A declared name collides with the namespace query surface.
    #[error("Attempted to use reserved '{name}' in '{declaring}'")]
    ReservedName {
        /// Offending member name.
        name: String,
        /// Name of the definition being built.
        declaring: String,
    },

    /// A base is not a namespace of this registry or a capability root.
    #[error("Attempted to inherit {base}")]
    Inheritance {
        /// Repr of the rejected base.
        base: String,
    },

    /// A pure config received a member that is not a section.
    #[error("Attempted to add non-Section '{name}' to {owner}")]
    InvalidMember {
        /// Offending member name.
        name: String,
        /// Repr of the config being built.
        owner: String,
    },

    /// A computed member failed while being evaluated.
    #[error("Failed to compute '{name}' in {owner}: {message}")]
    Computation {
        /// Name of the computed member.
        name: String,
        /// Repr of the namespace the member was read from.
        owner: String,
        /// Message of the underlying failure.
        message: String,
    },

    /// A computed member was declared without a function.
    #[error("Use computed(fn) instead of computed() for '{name}'")]
    MissingComputation {
        /// Name of the computed member.
        name: String,
    },
}

/// Errors raised while resolving a value from a key/value source.
#[derive(Debug, Error)]
pub enum EnvError {
    /// The (prefixed) key is absent and no default was supplied.
    #[error("{} does not exist", repr_str(.name))]
    MissingKey {
        /// Key that was looked up, prefix included.
        name: String,
    },

    /// The raw string could not be parsed.
    #[error(transparent)]
    Parse(#[from] ParseError),
}

/// Failure of a string-to-value parser.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct ParseError {
    message: String,
}

impl ParseError {
    /// Creates the canonical `Failed to parse '<raw>' as <kind>` error.
    #[must_use]
    pub fn new(raw: &str, kind: impl AsRef<str>) -> Self {
        Self {
            message: format!("Failed to parse {} as {}", repr_str(raw), kind.as_ref()),
        }
    }

    /// Wraps an element failure of a composite parser.
    #[must_use]
    pub fn nested(raw: &str, kind: impl AsRef<str>, inner: &ParseError) -> Self {
        Self {
            message: format!(
                "Failed to parse {} as {}: {}",
                repr_str(raw),
                kind.as_ref(),
                inner.message
            ),
        }
    }

    /// Returns the rendered message.
    #[must_use]
    pub fn message(&self) -> &str {
        &self.message
    }
}

/// Aggregate raised by prefetch when at least one member failed to resolve.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{}", bulleted(.failures))]
pub struct ValidationError {
    failures: Vec<String>,
}

impl ValidationError {
    /// Creates the aggregate from `<qualified-name>.<member>: <message>` lines.
    #[must_use]
    pub fn new(failures: Vec<String>) -> Self {
        Self { failures }
    }

    /// Returns the collected failures in traversal order.
    #[must_use]
    pub fn failures(&self) -> &[String] {
        &self.failures
    }
}

fn bulleted(failures: &[String]) -> String {
    let mut message = String::from("Failed to prefetch:");
    for failure in failures {
        message.push_str("\n- ");
        message.push_str(failure);
    }
    message
}
