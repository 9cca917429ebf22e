//! Resolver traits for service resolution.

use std::any::type_name;
use std::sync::Arc;

use crate::args::{AnyArc, Args};
use crate::async_factories::BoxFuture;
use crate::descriptors::{Injectable, ServiceDescriptor};
use crate::error::{DiError, DiResult};
use crate::key::InjectKey;

/// Object-safe resolution primitives.
///
/// Everything here works on canonical string keys and type-erased values.
/// [`Resolver`] layers typed access on top.
pub trait ResolverCore: Send + Sync {
    /// Builds (or returns the cached) instance for `key`, appending `args`
    /// after its resolved dependencies.
    fn resolve_any(&self, key: &str, args: &Args) -> DiResult<AnyArc>;

    /// Async counterpart of [`resolve_any`](Self::resolve_any); awaits async
    /// factories anywhere in the dependency chain.
    fn resolve_any_async(&self, key: &str, args: Args) -> BoxFuture<'static, DiResult<AnyArc>>;

    /// Returns true when `key` is registered.
    fn contains(&self, key: &str) -> bool;
}

/// Typed resolution API.
///
/// All methods canonicalize their key (plain name or descriptor) and share
/// the same lookup, so they differ only in how the key and arguments are
/// supplied.
///
/// # Examples
///
/// ```
/// use depgraph_di::{ServiceCollection, Resolver, args};
/// use std::sync::Arc;
///
/// let mut services = ServiceCollection::new();
/// services.register_instance("A", "Hello").unwrap();
/// services.register_transient_factory("B", ["A"], |args| {
///     let a = args.get::<&str>(0)?;
///     let c = args.get::<&str>(1)?;
///     Ok(format!("{} {}", a, c))
/// }).unwrap();
///
/// let provider = services.build().unwrap();
/// let b = provider.resolve_with::<String>("B", args!["World"]).unwrap();
/// assert_eq!(*b, "Hello World");
/// ```
pub trait Resolver: ResolverCore {
    /// Resolves `key` with no extra arguments.
    fn resolve<T: Send + Sync + 'static>(&self, key: impl Into<InjectKey>) -> DiResult<Arc<T>> {
        self.resolve_with(key, Args::new())
    }

    /// Resolves `key`, passing `args` after the resolved dependencies.
    fn resolve_with<T: Send + Sync + 'static>(
        &self,
        key: impl Into<InjectKey>,
        args: Args,
    ) -> DiResult<Arc<T>> {
        let key = key.into();
        downcast(self.resolve_any(key.name(), &args)?)
    }

    /// Resolves `key` through the async path.
    fn resolve_async<T: Send + Sync + 'static>(
        &self,
        key: impl Into<InjectKey>,
        args: Args,
    ) -> BoxFuture<'static, DiResult<Arc<T>>> {
        let key = key.into();
        let pending = self.resolve_any_async(key.name(), args);
        Box::pin(async move { downcast(pending.await?) })
    }

    /// Resolves a service registered under an arbitrary name.
    fn resolve_named<T: Send + Sync + 'static>(&self, name: &str) -> DiResult<Arc<T>> {
        downcast(self.resolve_any(name, &Args::new())?)
    }

    /// Resolves the service a descriptor stands for.
    fn resolve_factory<T: Send + Sync + 'static>(
        &self,
        descriptor: &ServiceDescriptor,
        args: Args,
    ) -> DiResult<Arc<T>> {
        downcast(self.resolve_any(&descriptor.key, &args)?)
    }

    /// Async variant of [`resolve_factory`](Self::resolve_factory).
    fn resolve_factory_async<T: Send + Sync + 'static>(
        &self,
        descriptor: &ServiceDescriptor,
        args: Args,
    ) -> BoxFuture<'static, DiResult<Arc<T>>> {
        let pending = self.resolve_any_async(&descriptor.key, args);
        Box::pin(async move { downcast(pending.await?) })
    }

    /// Resolves an [`Injectable`] type by its key.
    fn get<T: Injectable>(&self) -> DiResult<Arc<T>> {
        downcast(self.resolve_any(T::KEY, &Args::new())?)
    }

    /// Resolves an [`Injectable`] type, panicking on failure.
    ///
    /// # Panics
    ///
    /// Panics if the service is not registered or cannot be built.
    fn get_required<T: Injectable>(&self) -> Arc<T> {
        self.get::<T>()
            .unwrap_or_else(|e| panic!("Failed to resolve {}: {}", T::KEY, e))
    }
}

fn downcast<T: Send + Sync + 'static>(any: AnyArc) -> DiResult<Arc<T>> {
    any.downcast::<T>()
        .map_err(|_| DiError::TypeMismatch(type_name::<T>()))
}
