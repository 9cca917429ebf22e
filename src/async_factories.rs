//! Async factory support for dependency injection.
//!
//! This module provides async factory capabilities for services that require
//! asynchronous initialization such as database connections, network handshakes,
//! or authentication flows.

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use async_trait::async_trait;

use crate::args::{AnyArc, Args};
use crate::error::DiResult;
use crate::registration::AsyncFactoryFn;

/// Boxed, sendable future used across the async resolution path.
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// Trait for factories that create services asynchronously.
///
/// The factory receives its resolved dependencies followed by any call-time
/// arguments, exactly like a synchronous factory, but returns a future.
/// Closures returning futures implement this trait automatically.
///
/// # Examples
///
/// ```
/// use depgraph_di::{AsyncFactory, Args, DiResult, ServiceCollection, Resolver, args};
/// use async_trait::async_trait;
/// use std::sync::Arc;
///
/// struct DatabasePool {
///     connection_string: String,
/// }
///
/// struct PoolFactory;
///
/// #[async_trait]
/// impl AsyncFactory<DatabasePool> for PoolFactory {
///     async fn create(&self, args: Args) -> DiResult<DatabasePool> {
///         let host = args.get::<String>(0)?;
///         tokio::time::sleep(std::time::Duration::from_millis(10)).await;
///         Ok(DatabasePool { connection_string: format!("postgres://{}", host) })
///     }
/// }
///
/// # #[tokio::main]
/// # async fn main() -> DiResult<()> {
/// let mut services = ServiceCollection::new();
/// services.register_instance("Host", "localhost".to_string())?;
/// services.register_async_factory::<DatabasePool, _>("Pool", ["Host"], PoolFactory)?;
///
/// let provider = services.build()?;
/// let pool = provider.resolve_async::<DatabasePool>("Pool", args![]).await?;
/// assert_eq!(pool.connection_string, "postgres://localhost");
/// # Ok(())
/// # }
/// ```
#[async_trait]
pub trait AsyncFactory<T: Send + Sync + 'static>: Send + Sync {
    /// Creates a new instance of the service asynchronously.
    async fn create(&self, args: Args) -> DiResult<T>;
}

/// Helper impl for creating async factories from closures.
#[async_trait]
impl<T, F, Fut> AsyncFactory<T> for F
where
    T: Send + Sync + 'static,
    F: Fn(Args) -> Fut + Send + Sync,
    Fut: Future<Output = DiResult<T>> + Send,
{
    async fn create(&self, args: Args) -> DiResult<T> {
        self(args).await
    }
}

/// Erases an async factory into the form stored on a dependency node.
pub(crate) fn erase<T, F>(factory: F) -> AsyncFactoryFn
where
    T: Send + Sync + 'static,
    F: AsyncFactory<T> + 'static,
{
    let factory = Arc::new(factory);
    Arc::new(move |args: Args| -> BoxFuture<'static, DiResult<AnyArc>> {
        let factory = factory.clone();
        Box::pin(async move {
            let value = <F as AsyncFactory<T>>::create(&*factory, args).await?;
            Ok(Arc::new(value) as AnyArc)
        })
    })
}

/// Macro for creating async factories from async closures.
///
/// # Examples
///
/// ```
/// use depgraph_di::{async_factory, ServiceCollection, NO_DEPS};
///
/// let mut services = ServiceCollection::new();
/// services.register_async_factory::<String, _>("Greeting", NO_DEPS, async_factory!(|args| async {
///     format!("initialized with {} extra args", args.len())
/// })).unwrap();
/// ```
#[macro_export]
macro_rules! async_factory {
    (|$args:ident| async $body:block) => {
        move |$args: $crate::Args| async move { Ok::<_, $crate::DiError>($body) }
    };
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::DiError;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::time::Duration;

    struct AsyncService {
        value: String,
    }

    struct AsyncServiceFactory {
        init_count: Arc<AtomicU32>,
    }

    #[async_trait]
    impl AsyncFactory<AsyncService> for AsyncServiceFactory {
        async fn create(&self, args: Args) -> DiResult<AsyncService> {
            tokio::time::sleep(Duration::from_millis(10)).await;
            self.init_count.fetch_add(1, Ordering::Relaxed);
            let suffix = args.get::<&str>(0)?;
            Ok(AsyncService {
                value: format!("async initialized {}", suffix),
            })
        }
    }

    #[tokio::test]
    async fn test_erased_factory_wraps_value() {
        let init_count = Arc::new(AtomicU32::new(0));
        let erased = erase::<AsyncService, _>(AsyncServiceFactory {
            init_count: init_count.clone(),
        });

        let any = erased(Args::new().with("once")).await.unwrap();
        let service = any.downcast::<AsyncService>().ok().unwrap();

        assert_eq!(service.value, "async initialized once");
        assert_eq!(init_count.load(Ordering::Relaxed), 1);
    }

    #[tokio::test]
    async fn test_async_factory_from_closure() {
        let factory = |args: Args| async move {
            tokio::time::sleep(Duration::from_millis(5)).await;
            Ok::<_, DiError>(format!("closure async service ({})", args.len()))
        };

        let service = factory.create(Args::new()).await.unwrap();
        assert_eq!(service, "closure async service (0)");
    }

    #[tokio::test]
    async fn test_erased_factory_propagates_errors() {
        let erased = erase::<u8, _>(|_: Args| async move {
            Err::<u8, _>(DiError::factory_failed("Flaky", "handshake timed out"))
        });

        let err = erased(Args::new()).await.err().unwrap();
        assert_eq!(err.to_string(), "Factory for Flaky failed: handshake timed out");
    }
}
