//! Declarative, immutable configuration namespaces.
//!
//! Depend on this crate via `cargo add cabinet`. It bundles the internal
//! crates behind feature flags: the frozen namespace engine (`registry`), the
//! environment accessors (`env`) and the string parsers they use (`parsers`).
//!
//! ```
//! use std::collections::HashMap;
//!
//! use cabinet::env::LazyEnvironment;
//! use cabinet::registry::Registry;
//!
//! let env = LazyEnvironment::new(HashMap::from([("PORT".to_owned(), "8080".to_owned())]));
//! let registry = Registry::new();
//! let main = registry
//!     .section("Main")
//!     .member("API_HOST", env.str("HOST", Some("localhost")))
//!     .member("API_PORT", env.int("PORT", None))
//!     .build()
//!     .unwrap();
//! let config = registry.config("Config").nested(main).build().unwrap();
//!
//! config.prefetch().unwrap();
//! assert_eq!(
//!     config.render(),
//!     "class Config:\n    class Main:\n        API_HOST = 'localhost'\n        API_PORT = 8080"
//! );
//! ```

#![warn(missing_docs, clippy::pedantic)]

/// Re-export shared primitives for convenience.
pub use cabinet_primitives as primitives;

/// Errors and the result alias, at the crate root.
pub use cabinet_primitives::{Error, Result};

/// String parsers (enabled by `parsers` feature).
#[cfg(feature = "parsers")]
pub use cabinet_parsers as parsers;

/// Eager and lazy environment accessors (enabled by `env` feature).
#[cfg(feature = "env")]
pub use cabinet_env as env;

/// Namespace construction and access (enabled by `registry` feature).
#[cfg(feature = "registry")]
pub use cabinet_registry as registry;
