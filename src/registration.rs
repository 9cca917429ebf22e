//! Service registration types.

use std::collections::HashMap;
use std::sync::Arc;

use once_cell::sync::OnceCell;

use crate::args::{AnyArc, Args};
use crate::async_factories::BoxFuture;
use crate::error::{DiError, DiResult};
use crate::lifetime::Lifetime;

/// Type-erased synchronous constructor or factory
pub(crate) type ConstructorFn = Arc<dyn Fn(&Args) -> DiResult<AnyArc> + Send + Sync>;

/// Type-erased asynchronous factory
pub(crate) type AsyncFactoryFn =
    Arc<dyn Fn(Args) -> BoxFuture<'static, DiResult<AnyArc>> + Send + Sync>;

/// How a node produces its instance
#[derive(Clone)]
pub(crate) enum ServiceType {
    /// Descriptor-backed constructor, called with dependencies then extras
    Constructor(ConstructorFn),
    /// User factory bound to its dependencies, then called with extras
    Factory(ConstructorFn),
    /// User factory returning a future
    AsyncFactory(AsyncFactoryFn),
}

impl ServiceType {
    pub(crate) fn kind(&self) -> &'static str {
        match self {
            ServiceType::Constructor(_) => "constructor",
            ServiceType::Factory(_) => "factory",
            ServiceType::AsyncFactory(_) => "async-factory",
        }
    }
}

/// One registered service in the dependency graph
pub(crate) struct DependencyNode {
    /// Canonical dependency keys in positional order
    pub(crate) dependencies: Vec<String>,
    /// Absent only for ready-made instances
    pub(crate) service_type: Option<ServiceType>,
    /// Instance cache; filled up front for instances and on first build for singletons
    pub(crate) instance: OnceCell<AnyArc>,
    /// Set once the instance was supplied or the node was wrapped for resolution
    pub(crate) is_registered: bool,
    pub(crate) lifetime: Lifetime,
}

impl DependencyNode {
    pub(crate) fn instance(value: AnyArc) -> Self {
        Self {
            dependencies: Vec::new(),
            service_type: None,
            instance: OnceCell::with_value(value),
            is_registered: true,
            lifetime: Lifetime::Singleton,
        }
    }

    pub(crate) fn with_type(
        service_type: ServiceType,
        dependencies: Vec<String>,
        lifetime: Lifetime,
    ) -> Self {
        Self {
            dependencies,
            service_type: Some(service_type),
            instance: OnceCell::new(),
            is_registered: false,
            lifetime,
        }
    }

    /// True for factory-style registrations, sync or async.
    pub(crate) fn is_factory(&self) -> bool {
        matches!(
            self.service_type,
            Some(ServiceType::Factory(_)) | Some(ServiceType::AsyncFactory(_))
        )
    }

    #[inline(always)]
    pub(crate) fn cached(&self) -> Option<AnyArc> {
        self.instance.get().cloned()
    }

    /// Stores a freshly built singleton, returning whichever instance won the race.
    pub(crate) fn store(&self, built: AnyArc) -> AnyArc {
        if self.lifetime != Lifetime::Singleton {
            return built;
        }
        match self.instance.try_insert(built) {
            Ok(stored) => stored.clone(),
            Err((existing, _)) => existing.clone(),
        }
    }
}

/// Service registry holding all nodes of one builder
///
/// Registration order is kept alongside the map so graph traversals and
/// error reports are deterministic.
#[derive(Default)]
pub(crate) struct Registry {
    nodes: HashMap<String, DependencyNode>,
    order: Vec<String>,
}

impl Registry {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Inserts a node, refusing to overwrite an existing key.
    pub(crate) fn insert(&mut self, key: String, node: DependencyNode) -> DiResult<()> {
        if self.nodes.contains_key(&key) {
            return Err(DiError::DuplicateRegistration(key));
        }
        self.order.push(key.clone());
        self.nodes.insert(key, node);
        Ok(())
    }

    #[inline(always)]
    pub(crate) fn get(&self, key: &str) -> Option<&DependencyNode> {
        self.nodes.get(key)
    }

    #[inline(always)]
    pub(crate) fn contains_key(&self, key: &str) -> bool {
        self.nodes.contains_key(key)
    }

    /// Declared dependencies of `key`, empty when unknown.
    pub(crate) fn dependencies(&self, key: &str) -> &[String] {
        self.get(key)
            .map(|node| node.dependencies.as_slice())
            .unwrap_or(&[])
    }

    /// Keys in registration order
    pub(crate) fn keys(&self) -> &[String] {
        &self.order
    }

    /// Iterator over all key-node pairs in registration order
    pub(crate) fn iter(&self) -> impl Iterator<Item = (&String, &DependencyNode)> {
        self.order
            .iter()
            .filter_map(move |key| self.nodes.get(key).map(|node| (key, node)))
    }

    pub(crate) fn len(&self) -> usize {
        self.order.len()
    }

    pub(crate) fn take(&mut self, key: &str) -> Option<DependencyNode> {
        self.nodes.remove(key)
    }
}
