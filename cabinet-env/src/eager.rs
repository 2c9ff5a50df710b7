//! Accessor resolving values at definition time.

use std::fmt;
use std::sync::Arc;

use cabinet_parsers::{
    ParseResult, parse_as_is, parse_bool, parse_float, parse_int, parse_int_radix, parse_none,
    parse_str,
};
use cabinet_primitives::{Result, Value};

use crate::lazy::LazyEnvironment;
use crate::lookup::{Lookup, TupleOptions};
use crate::source::{HostSource, Source};

/// Eager accessor: every lookup happens immediately.
///
/// A missing key without default, or an unparsable value, fails right where
/// the member is declared.
///
/// ```
/// use std::collections::HashMap;
///
/// use cabinet_env::Environment;
///
/// let env = Environment::new(HashMap::from([("APP_PORT".to_owned(), "8080".to_owned())]))
///     .with_prefix("APP_");
/// assert_eq!(env.int("PORT", None).unwrap(), 8080);
/// assert_eq!(env.str("HOST", Some("localhost")).unwrap(), "localhost");
/// ```
#[derive(Clone)]
pub struct Environment {
    lookup: Lookup,
}

impl Environment {
    /// Creates an accessor over `source`.
    #[must_use]
    pub fn new(source: impl Source + 'static) -> Self {
        Self::from_shared(Arc::new(source))
    }

    /// Creates an accessor over an already shared source.
    #[must_use]
    pub fn from_shared(source: Arc<dyn Source>) -> Self {
        Self {
            lookup: Lookup::new(source),
        }
    }

    /// Creates an accessor over the host process environment.
    #[must_use]
    pub fn from_host() -> Self {
        Self::new(HostSource)
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

    /// Returns a lazy accessor over the same source and prefix.
    #[must_use]
    pub fn lazy(&self) -> LazyEnvironment {
        LazyEnvironment::from_lookup(self.lookup.clone())
    }

    /// Looks up `name` and applies `parser` to the raw value.
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

    /// Returns the raw string.
    ///
    /// # Errors
    ///
    /// See [`Environment::get`].
    pub fn raw(&self, name: &str, default: Option<&str>) -> Result<String> {
        self.get(name, default.map(str::to_owned), parse_as_is)
    }

    /// Parses `none`/`null`/`nil`.
    ///
    /// # Errors
    ///
    /// See [`Environment::get`].
    pub fn none(&self, name: &str, default: Option<()>) -> Result<Value> {
        self.get(name, default, parse_none).map(Value::from)
    }

    /// Parses a boolean.
    ///
    /// # Errors
    ///
    /// See [`Environment::get`].
    pub fn bool(&self, name: &str, default: Option<bool>) -> Result<bool> {
        self.get(name, default, parse_bool)
    }

    /// Parses a base-10 integer.
    ///
    /// # Errors
    ///
    /// See [`Environment::get`].
    pub fn int(&self, name: &str, default: Option<i64>) -> Result<i64> {
        self.get(name, default, parse_int)
    }

    /// Parses an integer in `base`.
    ///
    /// # Errors
    ///
    /// See [`Environment::get`].
    pub fn int_radix(&self, name: &str, default: Option<i64>, base: u32) -> Result<i64> {
        self.get(name, default, |raw| parse_int_radix(raw, base))
    }

    /// Parses a float.
    ///
    /// # Errors
    ///
    /// See [`Environment::get`].
    pub fn float(&self, name: &str, default: Option<f64>) -> Result<f64> {
        self.get(name, default, parse_float)
    }

    /// Returns the trimmed, non-empty string.
    ///
    /// # Errors
    ///
    /// See [`Environment::get`].
    pub fn str(&self, name: &str, default: Option<&str>) -> Result<String> {
        self.get(name, default.map(str::to_owned), parse_str)
    }

    /// Splits and parses a tuple.
    ///
    /// # Errors
    ///
    /// See [`Environment::get`].
    pub fn tuple(
        &self,
        name: &str,
        default: Option<Vec<Value>>,
        options: &TupleOptions,
    ) -> Result<Value> {
        self.get(name, default.map(Value::Tuple), |raw| options.parse(raw))
    }
}

impl Default for Environment {
    fn default() -> Self {
        Self::from_host()
    }
}

impl fmt::Debug for Environment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Environment")
            .field("prefix", &self.lookup.prefix())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::collections::HashMap;

    use cabinet_parsers::parse_int;
    use cabinet_primitives::{EnvError, Error};

    fn env(pairs: &[(&str, &str)]) -> Environment {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| ((*k).to_owned(), (*v).to_owned()))
            .collect();
        Environment::new(map)
    }

    #[test]
    fn get_parses_present_key() {
        let env = env(&[("<key>", "1234")]);
        assert_eq!(env.get("<key>", None, parse_int).unwrap(), 1234);
        assert_eq!(env.raw("<key>", None).unwrap(), "1234");
    }

    #[test]
    fn missing_key_without_default_fails() {
        let env = env(&[]);
        let err = env.raw("<key>", None).expect_err("missing");
        assert!(matches!(
            err,
            Error::Environment(EnvError::MissingKey { ref name }) if name == "<key>"
        ));
        assert_eq!(err.to_string(), "'<key>' does not exist");
    }

    #[test]
    fn default_is_returned_unparsed() {
        let env = env(&[("API_HOST", "127.0.0.1")]);
        assert_eq!(env.str("HOST", Some("localhost")).unwrap(), "localhost");
        assert_eq!(env.raw("HOST", Some("  spaced ")).unwrap(), "  spaced ");
        assert_eq!(env.none("HOST", Some(())).unwrap(), Value::None);
    }

    #[test]
    fn typed_helpers() {
        let env = env(&[
            ("NONE", "None"),
            ("BOOL", "True"),
            ("INT", "42"),
            ("HEX", "ff"),
            ("FLOAT", "3.14"),
            ("STR", "banana "),
            ("TUPLE", "first, second"),
            ("WORDS", "first second"),
        ]);

        assert_eq!(env.none("NONE", None).unwrap(), Value::None);
        assert!(env.bool("BOOL", None).unwrap());
        assert_eq!(env.int("INT", None).unwrap(), 42);
        assert_eq!(env.int_radix("HEX", None, 16).unwrap(), 255);
        assert!((env.float("FLOAT", None).unwrap() - 3.14).abs() < f64::EPSILON);
        assert_eq!(env.str("STR", None).unwrap(), "banana");
        assert_eq!(
            env.tuple("TUPLE", None, &TupleOptions::new()).unwrap(),
            Value::from(vec!["first", "second"])
        );
        assert_eq!(
            env.tuple("WORDS", None, &TupleOptions::new().separator(" "))
                .unwrap(),
            Value::from(vec!["first", "second"])
        );
    }

    #[test]
    fn parse_failure_is_environment_error() {
        let env = env(&[("PORT", "number")]);
        let err = env.int("PORT", None).expect_err("not an int");
        assert!(err.is_environment());
        assert_eq!(err.to_string(), "Failed to parse 'number' as int");
    }

    #[test]
    fn prefix_is_applied() {
        let env = env(&[("APP_NAME", "banana")]).with_prefix("APP_");
        assert_eq!(env.prefix(), "APP_");
        assert_eq!(env.raw("NAME", None).unwrap(), "banana");

        let err = env.raw("HOST", None).expect_err("missing");
        assert_eq!(err.to_string(), "'APP_HOST' does not exist");
    }
}
