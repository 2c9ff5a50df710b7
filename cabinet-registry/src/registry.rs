//! Definition builder and the construction algorithm producing frozen
//! namespaces.

use std::fmt::{self, Display, Formatter};
use std::sync::OnceLock;

use cabinet_primitives::{
    Capabilities, Capability, Error, RegistryId, Result, StructureError, is_dunder, is_reserved,
};
use indexmap::IndexMap;
use tracing::debug;

use crate::member::{Computed, Entry, Member};
use crate::namespace::{Inner, Namespace};

/// Something a definition inherits from.
#[derive(Clone, Debug)]
pub enum Base {
    /// The section capability root.
    Section,
    /// The config capability root.
    Config,
    /// A namespace built earlier.
    Namespace(Namespace),
    /// Any other type, named for diagnostics. Always rejected.
    Foreign(String),
}

impl Display for Base {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Self::Section => f.write_str("<Section>"),
            Self::Config => f.write_str("<Config>"),
            Self::Namespace(namespace) => fmt::Debug::fmt(namespace, f),
            Self::Foreign(name) => f.write_str(name),
        }
    }
}

impl From<Capability> for Base {
    fn from(value: Capability) -> Self {
        match value {
            Capability::Section => Self::Section,
            Capability::Config => Self::Config,
        }
    }
}

impl From<Namespace> for Base {
    fn from(value: Namespace) -> Self {
        Self::Namespace(value)
    }
}

impl From<&Namespace> for Base {
    fn from(value: &Namespace) -> Self {
        Self::Namespace(value.clone())
    }
}

/// Builds frozen namespaces.
///
/// Every namespace remembers the registry that built it; inheriting from a
/// namespace of another registry is rejected.
///
/// ```
/// use cabinet_registry::Registry;
///
/// let registry = Registry::new();
/// let main = registry
///     .section("Main")
///     .member("API_HOST", "localhost")
///     .member("API_PORT", 8080)
///     .build()
///     .unwrap();
///
/// assert_eq!(main.get_attr("API_PORT").unwrap().to_string(), "8080");
/// assert!(main.set_attr("API_PORT", 80).is_err());
/// ```
#[derive(Clone, Debug, Default)]
pub struct Registry {
    id: RegistryId,
}

impl Registry {
    /// Creates a registry with a fresh identity.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the identity stamped on every namespace this registry builds.
    #[must_use]
    pub fn id(&self) -> RegistryId {
        self.id
    }

    /// Starts a definition inheriting from the section root.
    pub fn section(&self, name: impl Into<String>) -> Definition<'_> {
        self.derive(name, [Base::Section])
    }

    /// Starts a definition inheriting from the config root.
    pub fn config(&self, name: impl Into<String>) -> Definition<'_> {
        self.derive(name, [Base::Config])
    }

    /// Starts a definition inheriting from both roots.
    pub fn hybrid(&self, name: impl Into<String>) -> Definition<'_> {
        self.derive(name, [Base::Config, Base::Section])
    }

    /// Starts a definition with explicit bases, in precedence order.
    pub fn derive<I>(&self, name: impl Into<String>, bases: I) -> Definition<'_>
    where
        I: IntoIterator,
        I::Item: Into<Base>,
    {
        Definition {
            registry: self,
            name: name.into(),
            bases: bases.into_iter().map(Into::into).collect(),
            members: Vec::new(),
        }
    }

    /// Builds a namespace from its bases and its ordered member declarations.
    ///
    /// # Errors
    ///
    /// Returns a [`StructureError`] when a computed member has no function, a
    /// base cannot be inherited, a name is reserved or declared twice, or a
    /// pure config declares something other than a section.
    pub fn build(
        &self,
        name: impl Into<String>,
        bases: Vec<Base>,
        members: Vec<(String, Member)>,
    ) -> Result<Namespace> {
        let name = name.into();

        for (key, member) in &members {
            if matches!(member, Member::Computed(computed) if !computed.is_set()) {
                return Err(StructureError::MissingComputation { name: key.clone() }.into());
            }
        }

        let (capabilities, parents) = self.resolve_bases(&bases)?;

        let mut metadata = IndexMap::new();
        let mut declared = Vec::with_capacity(members.len());
        for (key, member) in members {
            if is_dunder(&key) {
                metadata.insert(key, member);
            } else {
                declared.push((key, member));
            }
        }

        if let Some((key, _)) = declared.iter().find(|(key, _)| is_reserved(key)) {
            return Err(StructureError::ReservedName {
                name: key.clone(),
                declaring: name,
            }
            .into());
        }

        let mut own = IndexMap::with_capacity(declared.len());
        for (key, member) in declared {
            if own.contains_key(&key) {
                return Err(StructureError::DuplicateName {
                    name: key,
                    declaring: name,
                }
                .into());
            }
            own.insert(key, member);
        }

        if capabilities.is_pure_config() {
            if let Some((key, _)) = own.iter().find(|(_, member)| !member.is_section()) {
                return Err(StructureError::InvalidMember {
                    name: key.clone(),
                    owner: format!("<{name}>"),
                }
                .into());
            }
        }

        let ancestors = linearize(&parents).ok_or_else(|| inheritance_error(&bases))?;
        let members = merge(&parents, &ancestors, &own);

        let namespace = Namespace::from_inner(Inner {
            name,
            registry: self.id,
            capabilities,
            ancestors,
            own,
            members,
            metadata,
            parent: OnceLock::new(),
        });
        for nested in namespace.own_namespaces() {
            nested.attach(&namespace);
        }

        debug!(
            namespace = %namespace.name(),
            capabilities = ?namespace.capabilities(),
            members = namespace.len(),
            "namespace frozen"
        );
        Ok(namespace)
    }

    fn resolve_bases(&self, bases: &[Base]) -> Result<(Capabilities, Vec<Namespace>)> {
        if bases.is_empty() {
            return Err(inheritance_error(bases));
        }

        let mut capabilities = Capabilities::NONE;
        let mut roots = Capabilities::NONE;
        let mut parents: Vec<Namespace> = Vec::new();
        for base in bases {
            match base {
                Base::Section if !roots.contains(Capability::Section) => {
                    roots = roots.with(Capability::Section);
                    capabilities = capabilities.with(Capability::Section);
                }
                Base::Config if !roots.contains(Capability::Config) => {
                    roots = roots.with(Capability::Config);
                    capabilities = capabilities.with(Capability::Config);
                }
                Base::Namespace(namespace)
                    if namespace.registry_id() == self.id && !parents.contains(namespace) =>
                {
                    capabilities = capabilities.union(namespace.capabilities());
                    parents.push(namespace.clone());
                }
                other => {
                    return Err(StructureError::Inheritance {
                        base: other.to_string(),
                    }
                    .into());
                }
            }
        }
        Ok((capabilities, parents))
    }
}

fn inheritance_error(bases: &[Base]) -> Error {
    let listed: Vec<String> = bases.iter().map(ToString::to_string).collect();
    StructureError::Inheritance {
        base: format!("({})", listed.join(", ")),
    }
    .into()
}

/// C3 linearisation of the namespace bases, nearest first. `None` when the
/// hierarchy has no consistent order.
fn linearize(parents: &[Namespace]) -> Option<Vec<Namespace>> {
    let mut sequences: Vec<Vec<Namespace>> = parents
        .iter()
        .map(|parent| {
            let mut sequence = Vec::with_capacity(parent.ancestors().len() + 1);
            sequence.push(parent.clone());
            sequence.extend(parent.ancestors().iter().cloned());
            sequence
        })
        .collect();
    sequences.push(parents.to_vec());

    let mut order = Vec::new();
    loop {
        sequences.retain(|sequence| !sequence.is_empty());
        if sequences.is_empty() {
            return Some(order);
        }

        let head = sequences
            .iter()
            .map(|sequence| &sequence[0])
            .find(|candidate| {
                !sequences
                    .iter()
                    .any(|sequence| sequence[1..].contains(*candidate))
            })?
            .clone();

        for sequence in &mut sequences {
            if sequence[0] == head {
                sequence.remove(0);
            }
        }
        order.push(head);
    }
}

/// Inherited names first, in base order, then the body's new names. Values
/// come from the body, else from the nearest ancestor declaring the name.
fn merge(
    parents: &[Namespace],
    ancestors: &[Namespace],
    own: &IndexMap<String, Member>,
) -> IndexMap<String, Member> {
    let mut members = IndexMap::new();
    for parent in parents {
        for key in parent.member_names() {
            if members.contains_key(key) {
                continue;
            }
            if let Some(member) = ancestors
                .iter()
                .find_map(|ancestor| ancestor.own_member(key))
            {
                members.insert(key.clone(), member.clone());
            }
        }
    }
    for (key, member) in own {
        members.insert(key.clone(), member.clone());
    }
    members
}

/// Ordered member declarations for one namespace.
///
/// Duplicates are kept until [`Definition::build`] so that they can be
/// reported.
#[must_use = "a definition does nothing until built"]
pub struct Definition<'r> {
    registry: &'r Registry,
    name: String,
    bases: Vec<Base>,
    members: Vec<(String, Member)>,
}

impl Definition<'_> {
    /// Declares a member.
    pub fn member(mut self, name: impl Into<String>, member: impl Into<Member>) -> Self {
        self.members.push((name.into(), member.into()));
        self
    }

    /// Declares a nested namespace under its own name.
    pub fn nested(self, namespace: Namespace) -> Self {
        let name = namespace.name().to_owned();
        self.member(name, namespace)
    }

    /// Declares a computed member.
    pub fn computed<F, R>(self, name: impl Into<String>, func: F) -> Self
    where
        F: Fn(&Namespace) -> anyhow::Result<R> + Send + Sync + 'static,
        R: Into<Entry>,
    {
        self.member(name, Computed::new(func))
    }

    /// Sets the `__doc__` metadata.
    pub fn doc(self, text: impl Into<String>) -> Self {
        self.member("__doc__", text.into())
    }

    /// Validates the declarations and freezes the namespace.
    ///
    /// # Errors
    ///
    /// See [`Registry::build`].
    pub fn build(self) -> Result<Namespace> {
        self.registry.build(self.name, self.bases, self.members)
    }
}

impl fmt::Debug for Definition<'_> {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        let names: Vec<&str> = self.members.iter().map(|(name, _)| name.as_str()).collect();
        f.debug_struct("Definition")
            .field("name", &self.name)
            .field("bases", &self.bases)
            .field("members", &names)
            .finish_non_exhaustive()
    }
}
