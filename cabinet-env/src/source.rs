//! Key/value sources consulted by the accessors.

use std::collections::{BTreeMap, HashMap};
use std::hash::BuildHasher;
use std::sync::{Arc, RwLock};

use cabinet_primitives::{EnvError, ParseError};

/// Read-only view of string keys to string values.
pub trait Source: Send + Sync {
    /// Returns the raw value stored under `key`, or `None` when it is absent.
    ///
    /// # Errors
    ///
    /// Returns an [`EnvError`] when the key is present but its value cannot be
    /// read as a string.
    fn var(&self, key: &str) -> Result<Option<String>, EnvError>;
}

/// The host process environment.
#[derive(Clone, Copy, Debug, Default)]
pub struct HostSource;

impl Source for HostSource {
    fn var(&self, key: &str) -> Result<Option<String>, EnvError> {
        match std::env::var_os(key) {
            Some(raw) => raw
                .into_string()
                .map(Some)
                .map_err(|raw| ParseError::new(&raw.to_string_lossy(), "str").into()),
            None => Ok(None),
        }
    }
}

impl<S> Source for HashMap<String, String, S>
where
    S: BuildHasher + Send + Sync,
{
    fn var(&self, key: &str) -> Result<Option<String>, EnvError> {
        Ok(self.get(key).cloned())
    }
}

impl Source for BTreeMap<String, String> {
    fn var(&self, key: &str) -> Result<Option<String>, EnvError> {
        Ok(self.get(key).cloned())
    }
}

impl<S: Source + ?Sized> Source for Arc<S> {
    fn var(&self, key: &str) -> Result<Option<String>, EnvError> {
        (**self).var(key)
    }
}

/// Shared mutable sources, mostly useful to tests that change values between
/// reads.
impl<S: Source> Source for RwLock<S> {
    fn var(&self, key: &str) -> Result<Option<String>, EnvError> {
        self.read().expect("environment source poisoned").var(key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn maps_are_sources() {
        let map: HashMap<String, String> = [("HOST".to_owned(), "localhost".to_owned())].into();
        assert_eq!(map.var("HOST").unwrap().as_deref(), Some("localhost"));
        assert_eq!(map.var("PORT").unwrap(), None);

        let tree: BTreeMap<String, String> = [("PORT".to_owned(), "80".to_owned())].into();
        assert_eq!(tree.var("PORT").unwrap().as_deref(), Some("80"));
    }

    #[test]
    fn shared_source_sees_updates() {
        let shared = Arc::new(RwLock::new(HashMap::<String, String>::new()));
        assert_eq!(shared.var("KEY").unwrap(), None);

        shared
            .write()
            .unwrap()
            .insert("KEY".to_owned(), "value".to_owned());
        assert_eq!(shared.var("KEY").unwrap().as_deref(), Some("value"));
    }

    #[test]
    fn host_source_reads_process_environment() {
        assert_eq!(HostSource.var("CABINET_SOURCE_SURELY_UNSET").unwrap(), None);
        let path = HostSource.var("PATH").unwrap();
        assert_eq!(path, std::env::var("PATH").ok());
    }

    #[cfg(unix)]
    #[test]
    fn host_source_reports_non_unicode_values() {
        use std::ffi::OsStr;
        use std::os::unix::ffi::OsStrExt;

        let key = "CABINET_SOURCE_NON_UNICODE";
        // SAFETY: the key is unique to this test and no other thread reads it.
        unsafe { std::env::set_var(key, OsStr::from_bytes(b"ab\xffcd")) };

        let err = HostSource.var(key).expect_err("non-unicode value must fail");
        assert!(matches!(err, EnvError::Parse(_)));
        assert_eq!(err.to_string(), "Failed to parse 'ab\u{fffd}cd' as str");

        // SAFETY: as above.
        unsafe { std::env::remove_var(key) };
    }
}
