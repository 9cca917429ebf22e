//! Service provider module for dependency injection.
//!
//! This module contains the ServiceProvider type produced by
//! [`ServiceCollection::build`](crate::ServiceCollection::build).

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Instant;

use crate::args::{AnyArc, Args};
use crate::async_factories::BoxFuture;
use crate::error::{DiError, DiResult};
use crate::factory::ServiceFactory;
use crate::graph_export::DependencyGraph;
use crate::observer::Observers;
use crate::traits::{Resolver, ResolverCore};

/// Service provider for resolving dependencies from the DI container.
///
/// A provider is immutable after build: its key to factory map never changes.
/// The only state mutated afterwards is each singleton's cache, which is
/// filled at most once.
///
/// # Thread Safety
///
/// ServiceProvider is `Send + Sync` and cheap to clone (it uses `Arc`
/// internally); clones share the same singleton instances.
///
/// # Examples
///
/// ```
/// use depgraph_di::{ServiceCollection, Resolver};
/// use std::sync::Arc;
///
/// struct Database { url: String }
/// struct UserService { db: Arc<Database> }
///
/// let mut collection = ServiceCollection::new();
/// let db = Database { url: "postgres://localhost".to_string() };
/// collection.register_instance("Database", db).unwrap();
/// collection.register_transient_factory("UserService", ["Database"], |args| {
///     Ok(UserService { db: args.get::<Database>(0)? })
/// }).unwrap();
///
/// let provider = collection.build().unwrap();
/// let user_service = provider.resolve::<UserService>("UserService").unwrap();
/// assert_eq!(user_service.db.url, "postgres://localhost");
/// ```
#[derive(Clone)]
pub struct ServiceProvider {
    inner: Arc<ProviderInner>,
}

struct ProviderInner {
    factories: HashMap<String, Arc<ServiceFactory>>,
    order: Vec<String>,
    observers: Observers,
}

impl Drop for ProviderInner {
    // Dependents go first, so no unit ever releases the last handle to a
    // dependency and dropping a long chain does not recurse.
    fn drop(&mut self) {
        for key in self.order.iter().rev() {
            self.factories.remove(key);
        }
    }
}

impl ServiceProvider {
    pub(crate) fn new(
        factories: HashMap<String, Arc<ServiceFactory>>,
        order: Vec<String>,
        observers: Observers,
    ) -> Self {
        Self {
            inner: Arc::new(ProviderInner {
                factories,
                order,
                observers,
            }),
        }
    }

    /// Returns true when `key` is registered.
    pub fn contains(&self, key: &str) -> bool {
        self.inner.factories.contains_key(key)
    }

    /// Number of registered services.
    pub fn len(&self) -> usize {
        self.inner.factories.len()
    }

    /// Returns true when nothing was registered.
    pub fn is_empty(&self) -> bool {
        self.inner.factories.is_empty()
    }

    /// Keys in the order their instantiation units were wrapped.
    ///
    /// Every key appears after all of its dependencies.
    pub fn build_order(&self) -> &[String] {
        &self.inner.order
    }

    /// Snapshot of the declared dependencies of every registered service.
    pub fn dependency_graph(&self) -> DependencyGraph {
        let mut graph = DependencyGraph::new();
        for factory in self.inner.factories.values() {
            graph.insert(factory.key().to_string(), factory.dependencies().to_vec());
        }
        graph
    }

    #[inline]
    fn factory(&self, key: &str) -> DiResult<&Arc<ServiceFactory>> {
        self.inner
            .factories
            .get(key)
            .ok_or_else(|| DiError::ServiceNotRegistered(key.to_string()))
    }

    fn resolve_any_impl(&self, key: &str, args: &Args) -> DiResult<AnyArc> {
        tracing::trace!(key, extra = args.len(), "resolving service");
        let result = self.factory(key).and_then(|factory| factory.build(args));
        if let Err(error) = &result {
            tracing::warn!(key, %error, "service resolution failed");
        }
        result
    }

    /// Dumps every registration with its kind, lifetime, cache state and
    /// dependencies, in build order.
    #[cfg(feature = "diagnostics")]
    pub fn to_debug_string(&self) -> String {
        let mut s = String::new();
        s.push_str("=== Service Provider Debug ===\n");
        for key in &self.inner.order {
            if let Some(factory) = self.inner.factories.get(key) {
                s.push_str(&format!(
                    "  {}: {} {} [{}]{}\n",
                    key,
                    factory.lifetime(),
                    factory.kind(),
                    factory.dependencies().join(", "),
                    if factory.is_cached() { " (cached)" } else { "" }
                ));
            }
        }
        s
    }
}

impl ResolverCore for ServiceProvider {
    fn resolve_any(&self, key: &str, args: &Args) -> DiResult<AnyArc> {
        let observers = &self.inner.observers;
        if !observers.has_observers() {
            return self.resolve_any_impl(key, args);
        }

        let start = Instant::now();
        observers.resolving(key);
        let result = self.resolve_any_impl(key, args);
        match &result {
            Ok(_) => observers.resolved(key, start.elapsed()),
            Err(error) => observers.resolution_failed(key, error),
        }
        result
    }

    fn resolve_any_async(&self, key: &str, args: Args) -> BoxFuture<'static, DiResult<AnyArc>> {
        let inner = Arc::clone(&self.inner);
        let key = key.to_string();
        Box::pin(async move {
            let observers = &inner.observers;
            let start = Instant::now();
            if observers.has_observers() {
                observers.resolving(&key);
            }

            tracing::trace!(key = %key, extra = args.len(), "resolving service asynchronously");
            let result = match inner.factories.get(&key) {
                Some(factory) => factory.build_async(args).await,
                None => Err(DiError::ServiceNotRegistered(key.clone())),
            };
            if let Err(error) = &result {
                tracing::warn!(key = %key, %error, "service resolution failed");
            }

            if observers.has_observers() {
                match &result {
                    Ok(_) => observers.resolved(&key, start.elapsed()),
                    Err(error) => observers.resolution_failed(&key, error),
                }
            }
            result
        })
    }

    fn contains(&self, key: &str) -> bool {
        ServiceProvider::contains(self, key)
    }
}

impl Resolver for ServiceProvider {}

impl std::fmt::Debug for ServiceProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ServiceProvider")
            .field("services", &self.inner.order)
            .field("observers", &self.inner.observers.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{ServiceCollection, NO_DEPS};

    #[test]
    fn provider_is_send_sync_and_clone() {
        fn assert_send_sync<T: Send + Sync + Clone>() {}
        assert_send_sync::<ServiceProvider>();
    }

    #[test]
    fn clones_share_singletons() {
        let mut services = ServiceCollection::new();
        services
            .register_factory("Counter", NO_DEPS, |_| Ok(String::from("shared")))
            .unwrap();
        let provider = services.build().unwrap();
        let clone = provider.clone();

        let a = provider.resolve::<String>("Counter").unwrap();
        let b = clone.resolve::<String>("Counter").unwrap();
        assert!(Arc::ptr_eq(&a, &b));
    }

    #[test]
    fn unknown_key_is_not_registered() {
        let provider = ServiceCollection::new().build().unwrap();
        assert!(provider.is_empty());
        assert_eq!(
            provider.resolve::<u8>("Nope").unwrap_err(),
            DiError::ServiceNotRegistered("Nope".into())
        );
    }

    #[test]
    fn wrong_type_is_a_mismatch() {
        let mut services = ServiceCollection::new();
        services.register_instance("Port", 8080u16).unwrap();
        let provider = services.build().unwrap();

        assert!(matches!(
            provider.resolve::<String>("Port"),
            Err(DiError::TypeMismatch(_))
        ));
    }

    #[test]
    fn dependency_graph_matches_the_builder_snapshot() {
        let mut services = ServiceCollection::new();
        services.register_instance("Config", "prod").unwrap();
        services.register_factory("Repo", ["Config"], |_| Ok(1u8)).unwrap();
        services
            .register_transient_factory("Handler", ["Repo", "Config"], |_| Ok(2u8))
            .unwrap();
        services.register_factory("Standalone", NO_DEPS, |_| Ok(3u8)).unwrap();

        let before = services.dependency_graph();
        let provider = services.build().unwrap();
        let after = provider.dependency_graph();

        assert_eq!(after, before);
        assert_eq!(after.len(), 4);
        assert_eq!(
            after.dependencies_of("Handler"),
            Some(&["Repo".to_string(), "Config".to_string()][..])
        );
    }

    #[cfg(feature = "diagnostics")]
    #[test]
    fn debug_string_lists_services_in_build_order() {
        let mut services = ServiceCollection::new();
        services.register_factory("B", ["A"], |_| Ok(1u8)).unwrap();
        services.register_instance("A", 0u8).unwrap();
        let provider = services.build().unwrap();

        let dump = provider.to_debug_string();
        let a = dump.find("  A:").unwrap();
        let b = dump.find("  B:").unwrap();
        assert!(a < b);
        assert!(dump.contains("B: singleton factory [A]"));
        assert!(dump.contains("A: singleton instance [] (cached)"));
    }
}
