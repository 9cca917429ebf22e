//! Instantiation units produced by the graph build.
//!
//! Every registered node is wrapped into a [`ServiceFactory`] holding the
//! already wrapped factories of its dependencies. Resolution is a walk over
//! these units: each one builds its dependencies first, then itself. The walk
//! keeps pending units on a heap stack, so deep chains do not grow the
//! thread's call stack.

use std::mem;
use std::sync::Arc;

use crate::args::{AnyArc, Args};
use crate::async_factories::BoxFuture;
use crate::error::{DiError, DiResult};
use crate::lifetime::Lifetime;
use crate::registration::{ConstructorFn, DependencyNode, ServiceType};

/// A node bound to the factories of its dependencies.
pub(crate) struct ServiceFactory {
    key: String,
    node: DependencyNode,
    injected: Vec<Arc<ServiceFactory>>,
}

/// A user factory with its resolved dependencies, waiting for call-time arguments.
struct BoundFactory<'a> {
    factory: &'a ConstructorFn,
    injected: Vec<AnyArc>,
}

impl BoundFactory<'_> {
    fn call(self, extra: &Args) -> DiResult<AnyArc> {
        (self.factory)(&Args::bind(self.injected, extra))
    }
}

/// A unit whose dependencies are being collected.
struct Frame {
    unit: Arc<ServiceFactory>,
    injected: Vec<AnyArc>,
}

impl Frame {
    fn enter(unit: Arc<ServiceFactory>, allow_async: bool) -> DiResult<Self> {
        match &unit.node.service_type {
            None => return Err(DiError::ServiceTypeMissing(unit.key.clone())),
            Some(ServiceType::AsyncFactory(_)) if !allow_async => {
                return Err(DiError::AsyncResolutionRequired(unit.key.clone()))
            }
            Some(_) => {}
        }
        Ok(Self {
            injected: Vec::with_capacity(unit.injected.len()),
            unit,
        })
    }

    /// The next dependency still to be built
    fn pending(&self) -> Option<Arc<ServiceFactory>> {
        self.unit.injected.get(self.injected.len()).cloned()
    }

    fn finish(self, extra: &Args) -> DiResult<AnyArc> {
        let built = match &self.unit.node.service_type {
            Some(ServiceType::Constructor(ctor)) => ctor(&Args::bind(self.injected, extra))?,
            Some(ServiceType::Factory(factory)) => BoundFactory {
                factory,
                injected: self.injected,
            }
            .call(extra)?,
            Some(ServiceType::AsyncFactory(_)) => {
                return Err(DiError::AsyncResolutionRequired(self.unit.key.clone()))
            }
            None => return Err(DiError::ServiceTypeMissing(self.unit.key.clone())),
        };
        Ok(self.unit.node.store(built))
    }

    async fn finish_async(self, extra: Args) -> DiResult<AnyArc> {
        let factory = match &self.unit.node.service_type {
            Some(ServiceType::AsyncFactory(factory)) => Some(Arc::clone(factory)),
            _ => None,
        };
        match factory {
            Some(factory) => {
                let built = factory(Args::bind(self.injected, &extra)).await?;
                Ok(self.unit.node.store(built))
            }
            None => self.finish(&extra),
        }
    }
}

impl ServiceFactory {
    /// Wraps `node`, marking it registered.
    ///
    /// `injected` must line up with `node.dependencies`.
    pub(crate) fn new(
        key: String,
        mut node: DependencyNode,
        injected: Vec<Arc<ServiceFactory>>,
    ) -> Self {
        debug_assert_eq!(node.dependencies.len(), injected.len());
        node.is_registered = true;
        Self { key, node, injected }
    }

    #[inline]
    pub(crate) fn key(&self) -> &str {
        &self.key
    }

    #[inline]
    pub(crate) fn lifetime(&self) -> Lifetime {
        self.node.lifetime
    }

    pub(crate) fn dependencies(&self) -> &[String] {
        &self.node.dependencies
    }

    pub(crate) fn kind(&self) -> &'static str {
        self.node
            .service_type
            .as_ref()
            .map(ServiceType::kind)
            .unwrap_or("instance")
    }

    /// True once a singleton has been built or an instance was supplied.
    pub(crate) fn is_cached(&self) -> bool {
        self.node.instance.get().is_some()
    }

    /// Builds the service synchronously.
    ///
    /// Dependencies are built with no extra arguments; `extra` is appended
    /// after them for this node only.
    pub(crate) fn build(self: &Arc<Self>, extra: &Args) -> DiResult<AnyArc> {
        if let Some(instance) = self.node.cached() {
            return Ok(instance);
        }

        let mut parents: Vec<Frame> = Vec::new();
        let mut current = Frame::enter(Arc::clone(self), false)?;
        loop {
            if let Some(dependency) = current.pending() {
                match dependency.node.cached() {
                    Some(instance) => current.injected.push(instance),
                    None => {
                        let next = Frame::enter(dependency, false)?;
                        parents.push(mem::replace(&mut current, next));
                    }
                }
                continue;
            }

            let built = if parents.is_empty() {
                current.finish(extra)?
            } else {
                current.finish(&Args::new())?
            };
            match parents.pop() {
                Some(mut parent) => {
                    parent.injected.push(built);
                    current = parent;
                }
                None => return Ok(built),
            }
        }
    }

    /// Builds the service, awaiting async factories along the way.
    ///
    /// Dependencies go through the same async walk, so a synchronous service
    /// may depend on an async one when resolved this way.
    pub(crate) fn build_async(
        self: &Arc<Self>,
        extra: Args,
    ) -> BoxFuture<'static, DiResult<AnyArc>> {
        let this = Arc::clone(self);
        let mut extra = Some(extra);
        Box::pin(async move {
            if let Some(instance) = this.node.cached() {
                return Ok(instance);
            }

            let mut parents: Vec<Frame> = Vec::new();
            let mut current = Frame::enter(this, true)?;
            loop {
                if let Some(dependency) = current.pending() {
                    match dependency.node.cached() {
                        Some(instance) => current.injected.push(instance),
                        None => {
                            let next = Frame::enter(dependency, true)?;
                            parents.push(mem::replace(&mut current, next));
                        }
                    }
                    continue;
                }

                let extra = if parents.is_empty() {
                    extra.take().unwrap_or_default()
                } else {
                    Args::new()
                };
                let built = current.finish_async(extra).await?;
                match parents.pop() {
                    Some(mut parent) => {
                        parent.injected.push(built);
                        current = parent;
                    }
                    None => return Ok(built),
                }
            }
        })
    }
}

impl std::fmt::Debug for ServiceFactory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ServiceFactory")
            .field("key", &self.key)
            .field("kind", &self.kind())
            .field("lifetime", &self.lifetime())
            .field("dependencies", &self.node.dependencies)
            .field("cached", &self.is_cached())
            .finish()
    }
}
