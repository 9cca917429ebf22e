//! Diagnostic observers for resolution and build events.
//!
//! Observers are attached to a [`ServiceCollection`](crate::ServiceCollection)
//! and carried over to the provider it builds. With no observers attached the
//! provider skips timing and notification entirely.

use std::sync::Arc;
use std::time::Duration;

use crate::error::DiError;

/// Hooks called around service resolution.
///
/// Calls are made synchronously on the resolving thread, so implementations
/// should stay cheap.
///
/// # Examples
///
/// ```
/// use depgraph_di::{DiObserver, DiError, ServiceCollection, Resolver, NO_DEPS};
/// use std::sync::Arc;
/// use std::sync::atomic::{AtomicU64, Ordering};
/// use std::time::Duration;
///
/// struct CountingObserver {
///     resolutions: Arc<AtomicU64>,
/// }
///
/// impl DiObserver for CountingObserver {
///     fn resolving(&self, _key: &str) {
///         self.resolutions.fetch_add(1, Ordering::Relaxed);
///     }
///     fn resolved(&self, _key: &str, _duration: Duration) {}
///     fn resolution_failed(&self, _key: &str, _error: &DiError) {}
/// }
///
/// let resolutions = Arc::new(AtomicU64::new(0));
/// let mut services = ServiceCollection::new();
/// services.add_observer(Arc::new(CountingObserver { resolutions: resolutions.clone() }));
/// services.register_factory("answer", NO_DEPS, |_| Ok(42u32)).unwrap();
///
/// let provider = services.build().unwrap();
/// provider.resolve::<u32>("answer").unwrap();
/// assert_eq!(resolutions.load(Ordering::Relaxed), 1);
/// ```
pub trait DiObserver: Send + Sync {
    /// Called before a resolution starts.
    fn resolving(&self, key: &str);

    /// Called after a resolution succeeded.
    fn resolved(&self, key: &str, duration: Duration);

    /// Called when a resolution returned an error.
    fn resolution_failed(&self, key: &str, error: &DiError);

    /// Called once when a provider was built, with the order nodes were wrapped in.
    fn graph_built(&self, order: &[String]) {
        let _ = order;
    }
}

/// Observer list shared by a collection and its provider.
#[derive(Clone, Default)]
pub(crate) struct Observers {
    observers: Vec<Arc<dyn DiObserver>>,
}

impl Observers {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn add(&mut self, observer: Arc<dyn DiObserver>) {
        self.observers.push(observer);
    }

    #[inline]
    pub(crate) fn has_observers(&self) -> bool {
        !self.observers.is_empty()
    }

    #[inline]
    pub(crate) fn resolving(&self, key: &str) {
        for observer in &self.observers {
            observer.resolving(key);
        }
    }

    #[inline]
    pub(crate) fn resolved(&self, key: &str, duration: Duration) {
        for observer in &self.observers {
            observer.resolved(key, duration);
        }
    }

    #[inline]
    pub(crate) fn resolution_failed(&self, key: &str, error: &DiError) {
        for observer in &self.observers {
            observer.resolution_failed(key, error);
        }
    }

    pub(crate) fn graph_built(&self, order: &[String]) {
        for observer in &self.observers {
            observer.graph_built(order);
        }
    }

    pub(crate) fn len(&self) -> usize {
        self.observers.len()
    }
}

/// Built-in observer forwarding every hook to `tracing`.
///
/// Resolutions are emitted at `TRACE`, failures at `WARN` and finished builds
/// at `DEBUG`, all under the `depgraph_di` target with the key as a field.
///
/// # Examples
///
/// ```
/// use depgraph_di::{ServiceCollection, LoggingObserver};
/// use std::sync::Arc;
///
/// let mut services = ServiceCollection::new();
/// services.add_observer(Arc::new(LoggingObserver::new()));
/// let provider = services.build().unwrap();
/// ```
#[derive(Debug, Clone)]
pub struct LoggingObserver {
    prefix: String,
}

impl LoggingObserver {
    /// Creates a logging observer with the default prefix.
    pub fn new() -> Self {
        Self {
            prefix: "[depgraph-di]".to_string(),
        }
    }

    /// Creates a logging observer with a custom prefix.
    pub fn with_prefix(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
        }
    }
}

impl Default for LoggingObserver {
    fn default() -> Self {
        Self::new()
    }
}

impl DiObserver for LoggingObserver {
    fn resolving(&self, key: &str) {
        tracing::trace!(target: "depgraph_di", key, "{} resolving", self.prefix);
    }

    fn resolved(&self, key: &str, duration: Duration) {
        tracing::trace!(
            target: "depgraph_di",
            key,
            elapsed_us = duration.as_micros() as u64,
            "{} resolved",
            self.prefix
        );
    }

    fn resolution_failed(&self, key: &str, error: &DiError) {
        tracing::warn!(target: "depgraph_di", key, %error, "{} resolution failed", self.prefix);
    }

    fn graph_built(&self, order: &[String]) {
        tracing::debug!(
            target: "depgraph_di",
            services = order.len(),
            order = ?order,
            "{} provider built",
            self.prefix
        );
    }
}
