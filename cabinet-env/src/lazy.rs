//! Accessor deferring lookups until first read.

use std::fmt;
use std::sync::Arc;

use cabinet_parsers::{
    ParseResult, parse_as_is, parse_bool, parse_float, parse_int, parse_int_radix, parse_none,
    parse_str,
};
use cabinet_primitives::{Deferred, Result, Value};

use crate::lookup::{Lookup, TupleOptions, binding_label};
use crate::source::{HostSource, Source};

/// Lazy accessor: typed helpers return [`Deferred`] values.
///
/// Nothing is read from the source until the deferred value is resolved, so a
/// definition may bind keys that are only provided later. [`LazyEnvironment::get`]
/// still resolves immediately.
#[derive(Clone)]
pub struct LazyEnvironment {
    lookup: Lookup,
}

impl LazyEnvironment {
    /// Creates an accessor over `source`.
    #[must_use]
    pub fn new(source: impl Source + 'static) -> Self {
        Self::from_shared(Arc::new(source))
    }

    /// Creates an accessor over an already shared source.
    #[must_use]
    pub fn from_shared(source: Arc<dyn Source>) -> Self {
        Self::from_lookup(Lookup::new(source))
    }

    /// Creates an accessor over the host process environment.
    #[must_use]
    pub fn from_host() -> Self {
        Self::new(HostSource)
    }

    pub(crate) fn from_lookup(lookup: Lookup) -> Self {
        Self { lookup }
    }

    /// Prepends `prefix` to every looked-up name.
    #[must_use]
    pub fn with_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.lookup.set_prefix(prefix.into());
        self
    }

    /// Returns the configured prefix.
    #[must_use]
    pub fn prefix(&self) -> &str {
        self.lookup.prefix()
    }

    /// Looks up `name` right away.
    ///
    /// # Errors
    ///
    /// Returns [`EnvError::MissingKey`](cabinet_primitives::EnvError::MissingKey)
    /// when the key is absent and `default` is `None`, or the parser's error.
    pub fn get<T, P>(&self, name: &str, default: Option<T>, parser: P) -> Result<T>
    where
        P: Fn(&str) -> ParseResult<T>,
    {
        self.lookup.resolve(name, default, parser)
    }

    /// Binds `name` to a deferred lookup that parses with `parser` on first
    /// resolution.
    pub fn bind<T, P>(&self, name: &str, default: Option<T>, parser: P) -> Deferred<Value>
    where
        T: Into<Value> + Clone + Send + Sync + 'static,
        P: Fn(&str) -> ParseResult<T> + Send + Sync + 'static,
    {
        let label = binding_label(name, default.clone().map(Into::<Value>::into).as_ref());
        let lookup = self.lookup.clone();
        let name = name.to_owned();
        Deferred::new(label, move || {
            lookup
                .resolve(&name, default.clone(), &parser)
                .map(Into::into)
        })
    }

    /// Binds the raw string.
    pub fn raw(&self, name: &str, default: Option<&str>) -> Deferred<Value> {
        self.bind(name, default.map(str::to_owned), parse_as_is)
    }

    /// Binds `none`/`null`/`nil`.
    pub fn none(&self, name: &str, default: Option<()>) -> Deferred<Value> {
        self.bind(name, default, parse_none)
    }

    /// Binds a boolean.
    pub fn bool(&self, name: &str, default: Option<bool>) -> Deferred<Value> {
        self.bind(name, default, parse_bool)
    }

    /// Binds a base-10 integer.
    pub fn int(&self, name: &str, default: Option<i64>) -> Deferred<Value> {
        self.bind(name, default, parse_int)
    }

    /// Binds an integer in `base`.
    pub fn int_radix(&self, name: &str, default: Option<i64>, base: u32) -> Deferred<Value> {
        self.bind(name, default, move |raw| parse_int_radix(raw, base))
    }

    /// Binds a float.
    pub fn float(&self, name: &str, default: Option<f64>) -> Deferred<Value> {
        self.bind(name, default, parse_float)
    }

    /// Binds the trimmed, non-empty string.
    pub fn str(&self, name: &str, default: Option<&str>) -> Deferred<Value> {
        self.bind(name, default.map(str::to_owned), parse_str)
    }

    /// Binds a tuple.
    pub fn tuple(
        &self,
        name: &str,
        default: Option<Vec<Value>>,
        options: &TupleOptions,
    ) -> Deferred<Value> {
        let options = options.clone();
        self.bind(name, default.map(Value::Tuple), move |raw| options.parse(raw))
    }
}

impl Default for LazyEnvironment {
    fn default() -> Self {
        Self::from_host()
    }
}

impl fmt::Debug for LazyEnvironment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LazyEnvironment")
            .field("prefix", &self.lookup.prefix())
            .finish_non_exhaustive()
    }
}
