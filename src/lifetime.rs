//! Service lifetime definitions.

use std::fmt;

/// Service lifetimes controlling instance caching behavior
///
/// # Examples
///
/// ```rust
/// use depgraph_di::{ServiceCollection, Resolver, Lifetime};
/// use std::sync::Arc;
/// use std::sync::atomic::{AtomicU32, Ordering};
///
/// let counter = Arc::new(AtomicU32::new(0));
/// let c = counter.clone();
///
/// let mut services = ServiceCollection::new();
/// services.register_factory("config", Vec::<&str>::new(), |_| {
///     Ok("postgres://localhost".to_string())
/// }).unwrap();
/// services.register_transient_factory("request", Vec::<&str>::new(), move |_| {
///     Ok(c.fetch_add(1, Ordering::SeqCst))
/// }).unwrap();
///
/// let provider = services.build().unwrap();
///
/// // Singleton: same instance every time
/// let a = provider.resolve::<String>("config").unwrap();
/// let b = provider.resolve::<String>("config").unwrap();
/// assert!(Arc::ptr_eq(&a, &b));
///
/// // Transient: rebuilt on every resolution
/// let r1 = provider.resolve::<u32>("request").unwrap();
/// let r2 = provider.resolve::<u32>("request").unwrap();
/// assert_ne!(*r1, *r2);
/// assert_eq!(Lifetime::default(), Lifetime::Singleton);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Lifetime {
    /// Single instance per provider, cached after the first build
    ///
    /// The instance is stored on the service's node, so every resolution
    /// through any path returns the same `Arc`.
    #[default]
    Singleton,
    /// New instance per resolution, never cached
    ///
    /// Dependencies are re-resolved on every build; singleton dependencies
    /// still come from their own cache.
    Transient,
}

impl Lifetime {
    /// Lower-case name used in diagnostics and graph exports.
    pub fn as_str(&self) -> &'static str {
        match self {
            Lifetime::Singleton => "singleton",
            Lifetime::Transient => "transient",
        }
    }
}

impl fmt::Display for Lifetime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
