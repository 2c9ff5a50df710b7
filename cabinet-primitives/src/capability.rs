//! Capability tags carried by namespaces.

use std::fmt::{self, Display, Formatter};

use serde::{Deserialize, Serialize};

/// One of the two standard capability roots a namespace may inherit from.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
pub enum Capability {
    /// Arbitrary scalar, computed and nested members.
    Section,
    /// Members restricted to section-capable namespaces.
    Config,
}

impl Capability {
    /// Returns the root name used in reprs and error messages.
    #[must_use]
    pub const fn root_name(self) -> &'static str {
        match self {
            Self::Section => "Section",
            Self::Config => "Config",
        }
    }
}

impl Display for Capability {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(self.root_name())
    }
}

/// Set of capabilities attached to a namespace.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Hash, Serialize, Deserialize)]
pub struct Capabilities {
    section: bool,
    config: bool,
}

impl Capabilities {
    /// Empty set.
    pub const NONE: Self = Self {
        section: false,
        config: false,
    };

    /// Section only.
    pub const SECTION: Self = Self {
        section: true,
        config: false,
    };

    /// Config only.
    pub const CONFIG: Self = Self {
        section: false,
        config: true,
    };

    /// Section and config at once.
    pub const HYBRID: Self = Self {
        section: true,
        config: true,
    };

    /// Returns the set extended with `capability`.
    #[must_use]
    pub const fn with(self, capability: Capability) -> Self {
        match capability {
            Capability::Section => Self {
                section: true,
                ..self
            },
            Capability::Config => Self {
                config: true,
                ..self
            },
        }
    }

    /// Returns the union of both sets.
    #[must_use]
    pub const fn union(self, other: Self) -> Self {
        Self {
            section: self.section || other.section,
            config: self.config || other.config,
        }
    }

    /// Returns `true` when `capability` is part of the set.
    #[must_use]
    pub const fn contains(self, capability: Capability) -> bool {
        match capability {
            Capability::Section => self.section,
            Capability::Config => self.config,
        }
    }

    /// Returns `true` when members are restricted to sections.
    #[must_use]
    pub const fn is_pure_config(self) -> bool {
        self.config && !self.section
    }

    /// Returns `true` when neither capability is present.
    #[must_use]
    pub const fn is_empty(self) -> bool {
        !self.section && !self.config
    }
}

impl From<Capability> for Capabilities {
    fn from(value: Capability) -> Self {
        Self::NONE.with(value)
    }
}
