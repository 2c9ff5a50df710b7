//! Declared members and the entries they resolve to.

use std::fmt::{self, Display, Formatter};
use std::sync::Arc;

use cabinet_primitives::{Capability, Deferred, Result, StructureError, Value};

use crate::namespace::Namespace;

type ComputeFn = dyn Fn(&Namespace) -> anyhow::Result<Entry> + Send + Sync;

/// What a read returns: a plain value or a nested namespace.
#[derive(Clone, Debug, PartialEq)]
pub enum Entry {
    /// Scalar value.
    Value(Value),
    /// Nested namespace.
    Namespace(Namespace),
}

impl Entry {
    /// Returns the scalar, if any.
    #[must_use]
    pub fn as_value(&self) -> Option<&Value> {
        match self {
            Self::Value(value) => Some(value),
            Self::Namespace(_) => None,
        }
    }

    /// Returns the nested namespace, if any.
    #[must_use]
    pub fn as_namespace(&self) -> Option<&Namespace> {
        match self {
            Self::Namespace(namespace) => Some(namespace),
            Self::Value(_) => None,
        }
    }

    /// Consumes the entry and returns the scalar, if any.
    #[must_use]
    pub fn into_value(self) -> Option<Value> {
        match self {
            Self::Value(value) => Some(value),
            Self::Namespace(_) => None,
        }
    }

    /// Consumes the entry and returns the nested namespace, if any.
    #[must_use]
    pub fn into_namespace(self) -> Option<Namespace> {
        match self {
            Self::Namespace(namespace) => Some(namespace),
            Self::Value(_) => None,
        }
    }
}

impl Display for Entry {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Self::Value(value) => Display::fmt(value, f),
            Self::Namespace(namespace) => fmt::Debug::fmt(namespace, f),
        }
    }
}

impl PartialEq<Value> for Entry {
    fn eq(&self, other: &Value) -> bool {
        self.as_value() == Some(other)
    }
}

impl From<Value> for Entry {
    fn from(value: Value) -> Self {
        Self::Value(value)
    }
}

impl From<Namespace> for Entry {
    fn from(value: Namespace) -> Self {
        Self::Namespace(value)
    }
}

/// Function evaluated against the reading namespace on every access.
///
/// Results are never cached. Under inheritance the function sees the derived
/// namespace it was read from, not the one that declared it.
#[derive(Clone)]
pub struct Computed {
    func: Option<Arc<ComputeFn>>,
}

impl Computed {
    /// Wraps `func`.
    pub fn new<F, R>(func: F) -> Self
    where
        F: Fn(&Namespace) -> anyhow::Result<R> + Send + Sync + 'static,
        R: Into<Entry>,
    {
        let func: Arc<ComputeFn> =
            Arc::new(move |namespace: &Namespace| func(namespace).map(Into::<Entry>::into));
        Self { func: Some(func) }
    }

    /// A marker without a function. Building a definition that contains one
    /// fails with [`StructureError::MissingComputation`].
    #[must_use]
    pub const fn unset() -> Self {
        Self { func: None }
    }

    /// Returns `true` when a function is attached.
    #[must_use]
    pub const fn is_set(&self) -> bool {
        self.func.is_some()
    }

    pub(crate) fn evaluate(&self, name: &str, owner: &Namespace) -> Result<Entry> {
        let Some(func) = &self.func else {
            return Err(StructureError::MissingComputation {
                name: name.to_owned(),
            }
            .into());
        };
        func(owner).map_err(|err| {
            StructureError::Computation {
                name: name.to_owned(),
                owner: owner.repr(),
                message: err.to_string(),
            }
            .into()
        })
    }
}

impl fmt::Debug for Computed {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.debug_struct("Computed")
            .field("set", &self.is_set())
            .finish()
    }
}

/// A declared member as stored in a frozen namespace.
///
/// Reads match on the variant: deferred values resolve through their cache,
/// computed members run against the reading namespace, the rest is returned
/// as is.
#[derive(Clone)]
pub enum Member {
    /// Plain value.
    Value(Value),
    /// Value resolved and cached on first read.
    Deferred(Deferred<Value>),
    /// Value recomputed on every read.
    Computed(Computed),
    /// Nested namespace.
    Namespace(Namespace),
}

impl Member {
    /// Returns `true` for nested namespaces carrying the section capability.
    #[must_use]
    pub fn is_section(&self) -> bool {
        matches!(self, Self::Namespace(ns) if ns.has_capability(Capability::Section))
    }

    pub(crate) fn resolve(&self, name: &str, owner: &Namespace) -> Result<Entry> {
        match self {
            Self::Value(value) => Ok(Entry::Value(value.clone())),
            Self::Deferred(deferred) => deferred.get().map(Entry::Value),
            Self::Computed(computed) => computed.evaluate(name, owner),
            Self::Namespace(namespace) => Ok(Entry::Namespace(namespace.clone())),
        }
    }
}

impl fmt::Debug for Member {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Self::Value(value) => f.debug_tuple("Value").field(value).finish(),
            Self::Deferred(deferred) => fmt::Debug::fmt(deferred, f),
            Self::Computed(computed) => fmt::Debug::fmt(computed, f),
            Self::Namespace(namespace) => fmt::Debug::fmt(namespace, f),
        }
    }
}

impl From<Value> for Member {
    fn from(value: Value) -> Self {
        Self::Value(value)
    }
}

impl From<Deferred<Value>> for Member {
    fn from(value: Deferred<Value>) -> Self {
        Self::Deferred(value)
    }
}

impl From<Computed> for Member {
    fn from(value: Computed) -> Self {
        Self::Computed(value)
    }
}

impl From<Namespace> for Member {
    fn from(value: Namespace) -> Self {
        Self::Namespace(value)
    }
}

impl From<&Namespace> for Member {
    fn from(value: &Namespace) -> Self {
        Self::Namespace(value.clone())
    }
}

impl From<Entry> for Member {
    fn from(value: Entry) -> Self {
        match value {
            Entry::Value(value) => Self::Value(value),
            Entry::Namespace(namespace) => Self::Namespace(namespace),
        }
    }
}

macro_rules! scalar_conversions {
    ($($ty:ty),* $(,)?) => {
        $(
            impl From<$ty> for Entry {
                fn from(value: $ty) -> Self {
                    Self::Value(Value::from(value))
                }
            }

            impl From<$ty> for Member {
                fn from(value: $ty) -> Self {
                    Self::Value(Value::from(value))
                }
            }
        )*
    };
}

scalar_conversions!((), bool, i64, i32, u16, f64, &str, String, Vec<Value>);
