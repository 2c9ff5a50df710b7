//! Lookup logic shared by the eager and lazy accessors.

use std::fmt;
use std::sync::Arc;

use cabinet_parsers::{ParseResult, parse_str};
use cabinet_primitives::{EnvError, Error, Result, Value, repr_str};
use tracing::trace;

type ElementParser = dyn Fn(&str) -> ParseResult<Value> + Send + Sync;

/// Source plus optional prefix.
#[derive(Clone)]
pub(crate) struct Lookup {
    source: Arc<dyn crate::Source>,
    prefix: String,
}

impl Lookup {
    pub(crate) fn new(source: Arc<dyn crate::Source>) -> Self {
        Self {
            source,
            prefix: String::new(),
        }
    }

    pub(crate) fn set_prefix(&mut self, prefix: String) {
        self.prefix = prefix;
    }

    pub(crate) fn prefix(&self) -> &str {
        &self.prefix
    }

    fn key(&self, name: &str) -> String {
        format!("{}{name}", self.prefix)
    }

    /// Looks up the prefixed `name`. A present key is parsed; an absent key
    /// yields `default` as is, or [`EnvError::MissingKey`] without one.
    pub(crate) fn resolve<T, P>(&self, name: &str, default: Option<T>, parser: P) -> Result<T>
    where
        P: Fn(&str) -> ParseResult<T>,
    {
        let key = self.key(name);
        trace!(key = %key, "environment lookup");
        match self.source.var(&key)? {
            Some(raw) => Ok(parser(&raw)?),
            None => default.ok_or_else(|| Error::from(EnvError::MissingKey { name: key })),
        }
    }
}

/// Describes a binding for `Debug` output of deferred values.
pub(crate) fn binding_label(name: &str, default: Option<&Value>) -> String {
    match default {
        Some(value) => format!("{}, default={value}", repr_str(name)),
        None => repr_str(name),
    }
}

/// Separator and element parser for tuple lookups.
///
/// ```
/// use cabinet_env::TupleOptions;
/// use cabinet_parsers::parse_int;
///
/// let options = TupleOptions::new()
///     .separator(" ")
///     .subparser(|raw| parse_int(raw).map(Into::into));
/// assert_eq!(options.separator_str(), " ");
/// ```
#[derive(Clone)]
pub struct TupleOptions {
    separator: String,
    subparser: Arc<ElementParser>,
}

impl TupleOptions {
    /// Comma-separated, non-empty trimmed strings.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the element separator.
    #[must_use]
    pub fn separator(mut self, separator: impl Into<String>) -> Self {
        self.separator = separator.into();
        self
    }

    /// Sets the parser applied to every element.
    #[must_use]
    pub fn subparser<F>(mut self, subparser: F) -> Self
    where
        F: Fn(&str) -> ParseResult<Value> + Send + Sync + 'static,
    {
        self.subparser = Arc::new(subparser);
        self
    }

    /// Returns the configured separator.
    #[must_use]
    pub fn separator_str(&self) -> &str {
        &self.separator
    }

    pub(crate) fn parse(&self, raw: &str) -> ParseResult<Value> {
        cabinet_parsers::parse_tuple(raw, &self.separator, |part| (self.subparser)(part))
            .map(Value::Tuple)
    }
}

impl Default for TupleOptions {
    fn default() -> Self {
        Self {
            separator: ",".to_owned(),
            subparser: Arc::new(|raw: &str| parse_str(raw).map(Value::Str)),
        }
    }
}

impl fmt::Debug for TupleOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TupleOptions")
            .field("separator", &self.separator)
            .finish_non_exhaustive()
    }
}
