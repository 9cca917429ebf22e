//! Service collection module for dependency injection.
//!
//! This module contains the ServiceCollection type, the graph builder that
//! accepts registrations and validates them into a
//! [`ServiceProvider`](crate::ServiceProvider).

use std::collections::HashMap;
use std::sync::Arc;

use crate::args::{AnyArc, Args};
use crate::async_factories::{erase, AsyncFactory};
use crate::descriptors::{Injectable, ServiceDescriptor};
use crate::error::{DiError, DiResult};
use crate::factory::ServiceFactory;
use crate::graph_export::DependencyGraph;
use crate::internal::{detect_cycles, topological_sort, validate_dependencies_exist};
use crate::key::{key_names, InjectKey};
use crate::lifetime::Lifetime;
use crate::observer::{DiObserver, Observers};
use crate::provider::ServiceProvider;
use crate::registration::{ConstructorFn, DependencyNode, Registry, ServiceType};

/// Graph builder collecting service registrations.
///
/// Registrations may arrive in any order; dependencies are only checked when
/// [`build`](Self::build) runs. Each key can be registered once.
///
/// # Examples
///
/// ```rust
/// use depgraph_di::{ServiceCollection, Resolver};
///
/// let mut services = ServiceCollection::new();
/// services
///     .register_factory("Greeting", ["Name"], |args| {
///         Ok(format!("Hello, {}", args.get::<String>(0)?))
///     })?
///     .register_instance("Name", "World".to_string())?;
///
/// let provider = services.build()?;
/// assert_eq!(*provider.resolve::<String>("Greeting")?, "Hello, World");
/// # Ok::<(), depgraph_di::DiError>(())
/// ```
#[derive(Default)]
pub struct ServiceCollection {
    registry: Registry,
    observers: Observers,
}

impl ServiceCollection {
    /// Creates a new empty service collection.
    pub fn new() -> Self {
        Self {
            registry: Registry::new(),
            observers: Observers::new(),
        }
    }

    // ----- Instances -----

    /// Registers a ready-made value under `key`.
    ///
    /// Instances have no dependencies and are always singletons; every
    /// resolution returns the same `Arc`. Any key may be used, which covers
    /// named instances such as configuration values.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # use depgraph_di::{ServiceCollection, Resolver};
    /// # use std::sync::Arc;
    /// let mut services = ServiceCollection::new();
    /// services.register_instance("db.url", "postgres://localhost".to_string()).unwrap();
    ///
    /// let provider = services.build().unwrap();
    /// let a = provider.resolve_named::<String>("db.url").unwrap();
    /// let b = provider.resolve_named::<String>("db.url").unwrap();
    /// assert!(Arc::ptr_eq(&a, &b));
    /// ```
    pub fn register_instance<T>(
        &mut self,
        key: impl Into<InjectKey>,
        value: T,
    ) -> DiResult<&mut Self>
    where
        T: Send + Sync + 'static,
    {
        let node = DependencyNode::instance(Arc::new(value));
        self.insert(key.into().name().to_string(), node)
    }

    // ----- Constructor-style services -----

    /// Registers an [`Injectable`] type as a singleton.
    pub fn register<T: Injectable>(&mut self) -> DiResult<&mut Self> {
        self.register_injectable::<T>(Lifetime::Singleton)
    }

    /// Registers an [`Injectable`] type as transient.
    pub fn register_transient<T: Injectable>(&mut self) -> DiResult<&mut Self> {
        self.register_injectable::<T>(Lifetime::Transient)
    }

    fn register_injectable<T: Injectable>(&mut self, lifetime: Lifetime) -> DiResult<&mut Self> {
        self.register_descriptor_with_lifetime(&T::descriptor(), lifetime, T::construct)
    }

    /// Registers a singleton constructor for an explicit descriptor.
    ///
    /// The constructor receives the descriptor's dependencies in declared
    /// order, followed by any call-time arguments.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # use depgraph_di::{ServiceCollection, ServiceDescriptor, Resolver, args};
    /// struct Clock;
    /// struct Scheduler { tick_ms: u64 }
    ///
    /// let clock = ServiceDescriptor::leaf("Clock");
    /// let scheduler = ServiceDescriptor::new("Scheduler", [&clock]);
    ///
    /// let mut services = ServiceCollection::new();
    /// services.register_descriptor(&clock, |_| Ok(Clock)).unwrap();
    /// services.register_descriptor(&scheduler, |args| {
    ///     let _clock = args.get::<Clock>(0)?;
    ///     Ok(Scheduler { tick_ms: *args.get::<u64>(1)? })
    /// }).unwrap();
    ///
    /// let provider = services.build().unwrap();
    /// let s = provider.resolve_factory::<Scheduler>(&scheduler, args![250u64]).unwrap();
    /// assert_eq!(s.tick_ms, 250);
    /// ```
    pub fn register_descriptor<T, F>(
        &mut self,
        descriptor: &ServiceDescriptor,
        ctor: F,
    ) -> DiResult<&mut Self>
    where
        T: Send + Sync + 'static,
        F: Fn(&Args) -> DiResult<T> + Send + Sync + 'static,
    {
        self.register_descriptor_with_lifetime(descriptor, Lifetime::Singleton, ctor)
    }

    /// Registers a constructor for an explicit descriptor with the given lifetime.
    pub fn register_descriptor_with_lifetime<T, F>(
        &mut self,
        descriptor: &ServiceDescriptor,
        lifetime: Lifetime,
        ctor: F,
    ) -> DiResult<&mut Self>
    where
        T: Send + Sync + 'static,
        F: Fn(&Args) -> DiResult<T> + Send + Sync + 'static,
    {
        let node = DependencyNode::with_type(
            ServiceType::Constructor(erase_sync(ctor)),
            descriptor.dependency_keys(),
            lifetime,
        );
        self.insert(descriptor.key.clone(), node)
    }

    // ----- Factories -----

    /// Registers a singleton factory.
    ///
    /// `inject` lists the dependency keys (or descriptors) whose instances are
    /// passed to the factory first, in that order. Call-time arguments follow.
    pub fn register_factory<T, F>(
        &mut self,
        key: impl Into<InjectKey>,
        inject: impl IntoIterator<Item = impl Into<InjectKey>>,
        factory: F,
    ) -> DiResult<&mut Self>
    where
        T: Send + Sync + 'static,
        F: Fn(&Args) -> DiResult<T> + Send + Sync + 'static,
    {
        self.insert_factory(
            key.into(),
            key_names(inject),
            Lifetime::Singleton,
            ServiceType::Factory(erase_sync(factory)),
        )
    }

    /// Registers a transient factory, invoked on every resolution.
    pub fn register_transient_factory<T, F>(
        &mut self,
        key: impl Into<InjectKey>,
        inject: impl IntoIterator<Item = impl Into<InjectKey>>,
        factory: F,
    ) -> DiResult<&mut Self>
    where
        T: Send + Sync + 'static,
        F: Fn(&Args) -> DiResult<T> + Send + Sync + 'static,
    {
        self.insert_factory(
            key.into(),
            key_names(inject),
            Lifetime::Transient,
            ServiceType::Factory(erase_sync(factory)),
        )
    }

    /// Registers a singleton async factory.
    ///
    /// Services built this way, and anything depending on them, must be
    /// resolved through [`resolve_async`](crate::Resolver::resolve_async) until
    /// the singleton is cached.
    pub fn register_async_factory<T, F>(
        &mut self,
        key: impl Into<InjectKey>,
        inject: impl IntoIterator<Item = impl Into<InjectKey>>,
        factory: F,
    ) -> DiResult<&mut Self>
    where
        T: Send + Sync + 'static,
        F: AsyncFactory<T> + 'static,
    {
        self.insert_factory(
            key.into(),
            key_names(inject),
            Lifetime::Singleton,
            ServiceType::AsyncFactory(erase::<T, F>(factory)),
        )
    }

    /// Registers a transient async factory.
    pub fn register_transient_async_factory<T, F>(
        &mut self,
        key: impl Into<InjectKey>,
        inject: impl IntoIterator<Item = impl Into<InjectKey>>,
        factory: F,
    ) -> DiResult<&mut Self>
    where
        T: Send + Sync + 'static,
        F: AsyncFactory<T> + 'static,
    {
        self.insert_factory(
            key.into(),
            key_names(inject),
            Lifetime::Transient,
            ServiceType::AsyncFactory(erase::<T, F>(factory)),
        )
    }

    fn insert_factory(
        &mut self,
        key: InjectKey,
        dependencies: Vec<String>,
        lifetime: Lifetime,
        service_type: ServiceType,
    ) -> DiResult<&mut Self> {
        let node = DependencyNode::with_type(service_type, dependencies, lifetime);
        self.insert(key.name().to_string(), node)
    }

    fn insert(&mut self, key: String, node: DependencyNode) -> DiResult<&mut Self> {
        tracing::debug!(
            key = %key,
            kind = node.service_type.as_ref().map(ServiceType::kind).unwrap_or("instance"),
            lifetime = %node.lifetime,
            factory = node.is_factory(),
            dependencies = ?node.dependencies,
            "registering service"
        );
        self.registry.insert(key, node)?;
        Ok(self)
    }

    // ----- Observer Management -----

    /// Adds a diagnostic observer for resolution events.
    ///
    /// Observers are handed to the built provider. Calls are synchronous, so
    /// keep implementations lightweight.
    pub fn add_observer(&mut self, observer: Arc<dyn DiObserver>) -> &mut Self {
        self.observers.add(observer);
        self
    }

    // ----- Introspection -----

    /// Snapshot of every registered key and its declared dependencies.
    ///
    /// The snapshot is independent of the collection.
    pub fn dependency_graph(&self) -> DependencyGraph {
        let mut graph = DependencyGraph::new();
        for (key, node) in self.registry.iter() {
            graph.insert(key.clone(), node.dependencies.clone());
        }
        graph
    }

    /// Keys in registration order.
    pub fn registered_keys(&self) -> &[String] {
        self.registry.keys()
    }

    /// Returns true when `key` is already registered.
    pub fn contains(&self, key: &str) -> bool {
        self.registry.contains_key(key)
    }

    /// Number of registered services.
    pub fn len(&self) -> usize {
        self.registry.len()
    }

    /// Returns true when nothing has been registered yet.
    pub fn is_empty(&self) -> bool {
        self.registry.len() == 0
    }

    /// Runs the build-time checks without consuming the collection.
    ///
    /// Reports the same errors [`build`](Self::build) would, in the same order:
    /// missing dependencies first, then cycles.
    pub fn validate(&self) -> DiResult<()> {
        validate_dependencies_exist(&self.registry)?;
        detect_cycles(&self.registry)
    }

    // ----- Build -----

    /// Validates the graph and produces a provider.
    ///
    /// Fails with [`DiError::MissingDependency`] if any declared dependency is
    /// unregistered, otherwise with [`DiError::CircularDependency`] if the
    /// graph has a cycle. On success every node is wrapped, in topological
    /// order, into an instantiation unit bound to its dependencies' units.
    /// Nothing is constructed until the first resolution.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use depgraph_di::{DiError, ServiceCollection};
    ///
    /// let mut services = ServiceCollection::new();
    /// services.register_factory("X", ["Y"], |_| Ok(()))?;
    /// services.register_factory("Y", ["X"], |_| Ok(()))?;
    ///
    /// let err = services.build().unwrap_err();
    /// assert_eq!(err, DiError::CircularDependency(vec!["X".into(), "Y".into(), "X".into()]));
    /// # Ok::<(), DiError>(())
    /// ```
    pub fn build(mut self) -> DiResult<ServiceProvider> {
        tracing::debug!(services = self.registry.len(), "building service provider");

        let order = match self.validate().and_then(|_| topological_sort(&self.registry)) {
            Ok(order) => order,
            Err(error) => {
                tracing::debug!(%error, "dependency graph rejected");
                return Err(error);
            }
        };

        let mut factories: HashMap<String, Arc<ServiceFactory>> =
            HashMap::with_capacity(order.len());
        for key in &order {
            let node = self
                .registry
                .take(key)
                .ok_or_else(|| DiError::ServiceNotRegistered(key.clone()))?;
            let injected = node
                .dependencies
                .iter()
                .map(|dependency| {
                    factories
                        .get(dependency)
                        .cloned()
                        .ok_or_else(|| DiError::MissingDependency {
                            service: key.clone(),
                            dependency: dependency.clone(),
                        })
                })
                .collect::<DiResult<Vec<_>>>()?;
            let unit = ServiceFactory::new(key.clone(), node, injected);
            factories.insert(key.clone(), Arc::new(unit));
        }

        tracing::debug!(order = ?order, "service provider built");
        self.observers.graph_built(&order);
        Ok(ServiceProvider::new(factories, order, self.observers))
    }
}

/// Erases a typed synchronous constructor or factory.
fn erase_sync<T, F>(f: F) -> ConstructorFn
where
    T: Send + Sync + 'static,
    F: Fn(&Args) -> DiResult<T> + Send + Sync + 'static,
{
    Arc::new(move |args: &Args| -> DiResult<AnyArc> { Ok(Arc::new(f(args)?)) })
}

impl std::fmt::Debug for ServiceCollection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ServiceCollection")
            .field("services", &self.registry.keys())
            .field("observers", &self.observers.len())
            .finish()
    }
}
