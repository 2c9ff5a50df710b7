//! Cached, on-demand computed values.

use std::fmt;
use std::sync::{Arc, RwLock};

use tracing::trace;

use crate::error::Result;

type Accessor<T> = dyn Fn() -> Result<T> + Send + Sync;

/// Wraps an accessor and caches its first successful result.
///
/// Clones share one cache, so a member inherited by several namespaces is
/// resolved once for all of them.
///
/// ```
/// use cabinet_primitives::Deferred;
///
/// let value = Deferred::new("answer", || Ok(42));
/// assert!(!value.is_resolved());
/// assert_eq!(value.get().unwrap(), 42);
/// assert!(value.is_resolved());
/// ```
pub struct Deferred<T> {
    inner: Arc<DeferredInner<T>>,
}

struct DeferredInner<T> {
    label: String,
    accessor: Box<Accessor<T>>,
    cache: RwLock<Option<T>>,
}

impl<T: Clone> Deferred<T> {
    /// Creates a deferred value. `label` describes the bound arguments and
    /// only shows up in `Debug` output.
    pub fn new<F>(label: impl Into<String>, accessor: F) -> Self
    where
        F: Fn() -> Result<T> + Send + Sync + 'static,
    {
        Self {
            inner: Arc::new(DeferredInner {
                label: label.into(),
                accessor: Box::new(accessor),
                cache: RwLock::new(None),
            }),
        }
    }

    /// Returns the cached value, invoking the accessor on first use.
    ///
    /// Failures are not cached; the next call retries.
    ///
    /// # Errors
    ///
    /// Propagates the accessor's error.
    ///
    /// # Panics
    ///
    /// Panics if the cache lock is poisoned.
    pub fn get(&self) -> Result<T> {
        {
            let cache = self.inner.cache.read().expect("deferred cache poisoned");
            if let Some(value) = cache.as_ref() {
                return Ok(value.clone());
            }
        }
        self.fetch()
    }

    /// Invokes the accessor unconditionally and replaces the cache.
    ///
    /// Concurrent first reads may both invoke the accessor; the last write
    /// wins the cache slot.
    ///
    /// # Errors
    ///
    /// Propagates the accessor's error; the cache is left untouched.
    ///
    /// # Panics
    ///
    /// Panics if the cache lock is poisoned.
    pub fn fetch(&self) -> Result<T> {
        trace!(label = %self.inner.label, "resolving deferred value");
        let value = (self.inner.accessor)()?;
        let mut cache = self.inner.cache.write().expect("deferred cache poisoned");
        *cache = Some(value.clone());
        Ok(value)
    }

    /// Returns `true` once a value has been cached.
    ///
    /// # Panics
    ///
    /// Panics if the cache lock is poisoned.
    #[must_use]
    pub fn is_resolved(&self) -> bool {
        self.inner
            .cache
            .read()
            .expect("deferred cache poisoned")
            .is_some()
    }

    /// Returns the description given at construction.
    #[must_use]
    pub fn label(&self) -> &str {
        &self.inner.label
    }
}

impl<T> Clone for Deferred<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<T> fmt::Debug for Deferred<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Deferred({})", self.inner.label)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::sync::atomic::{AtomicI64, AtomicUsize, Ordering};

    use crate::error::{EnvError, Error};

    fn counter_backed(source: &Arc<AtomicI64>) -> Deferred<i64> {
        let source = Arc::clone(source);
        Deferred::new("counter", move || Ok(source.load(Ordering::SeqCst)))
    }

    #[test]
    fn get_caches_first_result() {
        let source = Arc::new(AtomicI64::new(1));
        let value = counter_backed(&source);
        assert_eq!(value.get().unwrap(), 1);

        source.store(2, Ordering::SeqCst);
        assert_eq!(value.get().unwrap(), 1);
    }

    #[test]
    fn fetch_always_recomputes() {
        let source = Arc::new(AtomicI64::new(1));
        let value = counter_backed(&source);
        assert_eq!(value.fetch().unwrap(), 1);

        source.store(2, Ordering::SeqCst);
        assert_eq!(value.fetch().unwrap(), 2);
    }

    #[test]
    fn fetch_updates_cache_for_get() {
        let source = Arc::new(AtomicI64::new(1));
        let value = counter_backed(&source);
        assert_eq!(value.get().unwrap(), 1);

        source.store(2, Ordering::SeqCst);
        assert_eq!(value.fetch().unwrap(), 2);
        assert_eq!(value.get().unwrap(), 2);
    }

    #[test]
    fn clones_share_cache() {
        let calls = Arc::new(AtomicUsize::new(0));
        let counted = Arc::clone(&calls);
        let value = Deferred::new("shared", move || {
            counted.fetch_add(1, Ordering::SeqCst);
            Ok("banana".to_owned())
        });
        let twin = value.clone();

        assert_eq!(value.get().unwrap(), "banana");
        assert_eq!(twin.get().unwrap(), "banana");
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert!(twin.is_resolved());
    }

    #[test]
    fn failures_are_not_cached() {
        let calls = Arc::new(AtomicUsize::new(0));
        let counted = Arc::clone(&calls);
        let value: Deferred<String> = Deferred::new("'HOST'", move || {
            counted.fetch_add(1, Ordering::SeqCst);
            Err(Error::from(EnvError::MissingKey {
                name: "HOST".into(),
            }))
        });

        let err = value.get().expect_err("missing key");
        assert_eq!(err.to_string(), "'HOST' does not exist");
        value.get().expect_err("still missing");
        assert_eq!(calls.load(Ordering::SeqCst), 2);
        assert!(!value.is_resolved());
    }

    #[test]
    fn debug_shows_label() {
        let value = Deferred::new("'HOST', default='localhost'", || Ok(0_i64));
        assert_eq!(format!("{value:?}"), "Deferred('HOST', default='localhost')");
    }

    #[test]
    fn concurrent_first_reads_agree() {
        let calls = Arc::new(AtomicUsize::new(0));
        let counted = Arc::clone(&calls);
        let value = Deferred::new("'PORT'", move || {
            counted.fetch_add(1, Ordering::SeqCst);
            Ok(7_i64)
        });

        std::thread::scope(|scope| {
            let readers: Vec<_> = (0..8).map(|_| scope.spawn(|| value.get().unwrap())).collect();
            for reader in readers {
                assert_eq!(reader.join().unwrap(), 7);
            }
        });

        assert!(value.is_resolved());
        let runs = calls.load(Ordering::SeqCst);
        assert!((1..=8).contains(&runs));
        assert_eq!(value.get().unwrap(), 7);
        assert_eq!(calls.load(Ordering::SeqCst), runs);
    }
}
