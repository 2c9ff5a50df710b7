//! Frozen namespaces and their read-only query surface.

use std::collections::HashSet;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::{Arc, OnceLock, Weak};

use cabinet_primitives::{
    Capabilities, Capability, Error, RegistryId, Result, StructureError, ValidationError,
};
use indexmap::IndexMap;
use tracing::{debug, trace, warn};

use crate::member::{Entry, Member};

/// Handle to an immutable namespace.
///
/// Handles are cheap to clone; equality is identity, so two handles compare
/// equal only when they denote the same namespace.
#[derive(Clone)]
pub struct Namespace {
    inner: Arc<Inner>,
}

pub(crate) struct Inner {
    pub(crate) name: String,
    pub(crate) registry: RegistryId,
    pub(crate) capabilities: Capabilities,
    /// Linearised namespace ancestors, nearest first, excluding the
    /// namespace itself.
    pub(crate) ancestors: Vec<Namespace>,
    pub(crate) own: IndexMap<String, Member>,
    pub(crate) members: IndexMap<String, Member>,
    pub(crate) metadata: IndexMap<String, Member>,
    pub(crate) parent: OnceLock<Weak<Inner>>,
}

impl Namespace {
    pub(crate) fn from_inner(inner: Inner) -> Self {
        Self {
            inner: Arc::new(inner),
        }
    }

    /// Links a nested namespace to the namespace that declared it. Happens
    /// once; a second declaring namespace keeps the first link.
    pub(crate) fn attach(&self, parent: &Self) {
        if self
            .inner
            .parent
            .set(Arc::downgrade(&parent.inner))
            .is_err()
        {
            warn!(
                namespace = %self.qualified_name(),
                declared_in = %parent.inner.name,
                "nested namespace already owned, keeping existing parent"
            );
        }
    }

    pub(crate) fn own_member(&self, name: &str) -> Option<&Member> {
        self.inner.own.get(name)
    }

    pub(crate) fn own_namespaces(&self) -> impl Iterator<Item = &Namespace> {
        self.inner.own.values().filter_map(|member| match member {
            Member::Namespace(nested) => Some(nested),
            _ => None,
        })
    }

    pub(crate) fn ancestors(&self) -> &[Namespace] {
        &self.inner.ancestors
    }

    pub(crate) fn member_names(&self) -> impl Iterator<Item = &String> {
        self.inner.members.keys()
    }

    pub(crate) fn repr(&self) -> String {
        format!("<{}>", self.qualified_name())
    }

    /// Returns the declared name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.inner.name
    }

    /// Returns the dot-joined path from the root namespace.
    #[must_use]
    pub fn qualified_name(&self) -> String {
        let mut names = vec![self.inner.name.as_str()];
        let mut current = self.inner.parent.get().and_then(Weak::upgrade);
        let mut chain = Vec::new();
        while let Some(inner) = current {
            current = inner.parent.get().and_then(Weak::upgrade);
            chain.push(inner);
        }
        names.extend(chain.iter().map(|inner| inner.name.as_str()));
        names.reverse();
        names.join(".")
    }

    /// Returns the namespace that declared this one, if it is still alive.
    #[must_use]
    pub fn parent(&self) -> Option<Self> {
        self.inner
            .parent
            .get()
            .and_then(Weak::upgrade)
            .map(|inner| Self { inner })
    }

    /// Returns the capability set.
    #[must_use]
    pub fn capabilities(&self) -> Capabilities {
        self.inner.capabilities
    }

    /// Returns `true` when the namespace carries `capability`.
    #[must_use]
    pub fn has_capability(&self, capability: Capability) -> bool {
        self.inner.capabilities.contains(capability)
    }

    /// Returns `true` when `other` is one of this namespace's ancestors.
    #[must_use]
    pub fn inherits_from(&self, other: &Self) -> bool {
        self.inner.ancestors.contains(other)
    }

    /// Returns the identity of the registry that built this namespace.
    #[must_use]
    pub fn registry_id(&self) -> RegistryId {
        self.inner.registry
    }

    /// Returns `__dunder__` metadata declared in the body.
    #[must_use]
    pub fn metadata(&self, name: &str) -> Option<&Member> {
        self.inner.metadata.get(name)
    }

    /// Reads a member.
    ///
    /// Deferred values are resolved (and cached) and computed members are
    /// evaluated against `self`; everything else is returned as declared.
    ///
    /// # Errors
    ///
    /// Returns [`StructureError::MissingMember`] for unknown names,
    /// [`StructureError::Computation`] when a computed member fails, and the
    /// environment error of a deferred value that cannot be resolved.
    pub fn get_attr(&self, name: &str) -> Result<Entry> {
        trace!(namespace = %self.inner.name, member = name, "member read");
        let member = self.inner.members.get(name).ok_or_else(|| {
            Error::from(StructureError::MissingMember {
                name: name.to_owned(),
                owner: self.repr(),
            })
        })?;
        member.resolve(name, self)
    }

    /// Alias of [`Namespace::get_attr`].
    ///
    /// # Errors
    ///
    /// See [`Namespace::get_attr`].
    pub fn get_item(&self, name: &str) -> Result<Entry> {
        self.get_attr(name)
    }

    /// Always fails: namespaces are frozen.
    ///
    /// # Errors
    ///
    /// Returns [`StructureError::RuntimeOverride`] for existing names and
    /// [`StructureError::RuntimeAdd`] otherwise.
    pub fn set_attr(&self, name: &str, _value: impl Into<Member>) -> Result<()> {
        let name = name.to_owned();
        let owner = self.repr();
        let err = if self.contains(&name) {
            StructureError::RuntimeOverride { name, owner }
        } else {
            StructureError::RuntimeAdd { name, owner }
        };
        Err(err.into())
    }

    /// Alias of [`Namespace::set_attr`].
    ///
    /// # Errors
    ///
    /// See [`Namespace::set_attr`].
    pub fn set_item(&self, name: &str, value: impl Into<Member>) -> Result<()> {
        self.set_attr(name, value)
    }

    /// Always fails: namespaces are frozen.
    ///
    /// # Errors
    ///
    /// Returns [`StructureError::RuntimeRemove`].
    pub fn del_attr(&self, name: &str) -> Result<()> {
        Err(StructureError::RuntimeRemove {
            name: name.to_owned(),
            owner: self.repr(),
        }
        .into())
    }

    /// Alias of [`Namespace::del_attr`].
    ///
    /// # Errors
    ///
    /// See [`Namespace::del_attr`].
    pub fn del_item(&self, name: &str) -> Result<()> {
        self.del_attr(name)
    }

    /// Number of members, inherited ones included.
    #[must_use]
    pub fn len(&self) -> usize {
        self.inner.members.len()
    }

    /// Returns `true` without members.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.inner.members.is_empty()
    }

    /// Returns `true` when `name` is a member.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.inner.members.contains_key(name)
    }

    /// Member names in declaration order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.inner.members.keys().map(String::as_str)
    }

    /// Same as [`Namespace::keys`].
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.keys()
    }

    /// Resolves every member, in declaration order.
    ///
    /// # Errors
    ///
    /// Returns the first resolution failure.
    pub fn values(&self) -> Result<Vec<Entry>> {
        self.keys().map(|name| self.get_attr(name)).collect()
    }

    /// Resolves every member and pairs it with its name.
    ///
    /// # Errors
    ///
    /// Returns the first resolution failure.
    pub fn items(&self) -> Result<Vec<(String, Entry)>> {
        self.keys()
            .map(|name| Ok((name.to_owned(), self.get_attr(name)?)))
            .collect()
    }

    /// Reads `name` if it is a member.
    ///
    /// # Errors
    ///
    /// Absence yields `Ok(None)`; failures resolving a present member are
    /// returned as is.
    pub fn get(&self, name: &str) -> Result<Option<Entry>> {
        if self.contains(name) {
            self.get_attr(name).map(Some)
        } else {
            Ok(None)
        }
    }

    /// Reads `name`, falling back to `default` if it is not a member.
    ///
    /// # Errors
    ///
    /// See [`Namespace::get`].
    pub fn get_or(&self, name: &str, default: impl Into<Entry>) -> Result<Entry> {
        Ok(self.get(name)?.unwrap_or_else(|| default.into()))
    }

    /// Reads every member of this namespace and of every nested namespace.
    ///
    /// Environment failures are collected as `<qualified-name>.<member>:
    /// <message>` lines and reported together once the traversal is done.
    /// Nested namespaces are visited even when their siblings fail.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError`] listing every environment failure, or the
    /// first non-environment error, which aborts the traversal.
    pub fn prefetch(&self) -> Result<()> {
        let mut visited = HashSet::new();
        let mut failures = Vec::new();
        self.collect_failures(&mut visited, &mut failures)?;
        debug!(
            namespace = %self.qualified_name(),
            namespaces = visited.len(),
            failures = failures.len(),
            "prefetch complete"
        );
        if failures.is_empty() {
            Ok(())
        } else {
            Err(ValidationError::new(failures).into())
        }
    }

    fn collect_failures(
        &self,
        visited: &mut HashSet<Namespace>,
        failures: &mut Vec<String>,
    ) -> Result<()> {
        if !visited.insert(self.clone()) {
            return Ok(());
        }
        let qualified = self.qualified_name();
        for name in self.keys() {
            match self.get_attr(name) {
                Ok(Entry::Namespace(nested)) => nested.collect_failures(visited, failures)?,
                Ok(Entry::Value(_)) => {}
                Err(Error::Environment(err)) => failures.push(format!("{qualified}.{name}: {err}")),
                Err(err) => return Err(err),
            }
        }
        Ok(())
    }
}

impl PartialEq for Namespace {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }
}

impl Eq for Namespace {}

impl Hash for Namespace {
    fn hash<H: Hasher>(&self, state: &mut H) {
        Arc::as_ptr(&self.inner).hash(state);
    }
}

impl fmt::Debug for Namespace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.repr())
    }
}

impl<'a> IntoIterator for &'a Namespace {
    type Item = &'a str;
    type IntoIter = Box<dyn Iterator<Item = &'a str> + 'a>;

    fn into_iter(self) -> Self::IntoIter {
        Box::new(self.keys())
    }
}
