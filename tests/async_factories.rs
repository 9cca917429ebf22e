use async_trait::async_trait;
use depgraph_di::{
    args, async_factory, Args, AsyncFactory, DiError, DiResult, Resolver, ServiceCollection,
    ServiceDescriptor, NO_DEPS,
};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

struct Connection {
    dsn: String,
    label: String,
}

struct ConnectionFactory {
    opened: Arc<AtomicUsize>,
}

#[async_trait]
impl AsyncFactory<Connection> for ConnectionFactory {
    async fn create(&self, args: Args) -> DiResult<Connection> {
        let dsn = args.get::<String>(0)?;
        tokio::time::sleep(Duration::from_millis(5)).await;
        self.opened.fetch_add(1, Ordering::SeqCst);
        let label = args
            .get::<&str>(1)
            .map(|l| l.to_string())
            .unwrap_or_else(|_| "default".into());
        Ok(Connection {
            dsn: dsn.to_string(),
            label,
        })
    }
}

fn services(opened: Arc<AtomicUsize>) -> ServiceCollection {
    let mut sc = ServiceCollection::new();
    sc.register_instance("Dsn", "postgres://localhost/app".to_string())
        .unwrap();
    sc.register_async_factory::<Connection, _>("Connection", ["Dsn"], ConnectionFactory { opened })
        .unwrap();
    sc.register_factory("Repository", ["Connection"], |args| {
        let conn = args.get::<Connection>(0)?;
        Ok(format!("repo on {}", conn.dsn))
    })
    .unwrap();
    sc
}

#[tokio::test]
async fn async_singleton_is_awaited_once() {
    let opened = Arc::new(AtomicUsize::new(0));
    let provider = services(opened.clone()).build().unwrap();

    let a = provider
        .resolve_async::<Connection>("Connection", args![])
        .await
        .unwrap();
    let b = provider
        .resolve_async::<Connection>("Connection", args!["ignored"])
        .await
        .unwrap();

    assert!(Arc::ptr_eq(&a, &b));
    assert_eq!(a.label, "default");
    assert_eq!(opened.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn sync_resolution_of_async_chain_requires_async_path() {
    let provider = services(Arc::new(AtomicUsize::new(0))).build().unwrap();

    assert_eq!(
        provider.resolve::<String>("Repository").unwrap_err(),
        DiError::AsyncResolutionRequired("Connection".into())
    );

    let repo = provider
        .resolve_async::<String>("Repository", Args::new())
        .await
        .unwrap();
    assert_eq!(*repo, "repo on postgres://localhost/app");

    // Both singletons are cached now, so the sync path works
    let again = provider.resolve::<String>("Repository").unwrap();
    assert!(Arc::ptr_eq(&repo, &again));
}

#[tokio::test]
async fn extra_args_reach_async_factory() {
    let mut sc = ServiceCollection::new();
    sc.register_instance("Dsn", "sqlite::memory:".to_string()).unwrap();
    sc.register_transient_async_factory::<Connection, _>(
        "Connection",
        ["Dsn"],
        ConnectionFactory {
            opened: Arc::new(AtomicUsize::new(0)),
        },
    )
    .unwrap();

    let provider = sc.build().unwrap();
    let descriptor = ServiceDescriptor::new("Connection", ["Dsn"]);
    let conn = provider
        .resolve_factory_async::<Connection>(&descriptor, args!["reporting"])
        .await
        .unwrap();
    let other = provider
        .resolve_async::<Connection>("Connection", args![])
        .await
        .unwrap();

    assert_eq!(conn.label, "reporting");
    assert_eq!(other.label, "default");
    assert!(!Arc::ptr_eq(&conn, &other));
}

#[tokio::test]
async fn async_factory_macro_and_errors() {
    let mut sc = ServiceCollection::new();
    sc.register_async_factory::<String, _>(
        "Banner",
        NO_DEPS,
        async_factory!(|args| async { format!("{} args", args.len()) }),
    )
    .unwrap();
    sc.register_async_factory::<u8, _>("Broken", NO_DEPS, |_: Args| async {
        Err::<u8, _>(DiError::factory_failed("Broken", "handshake refused"))
    })
    .unwrap();

    let provider = sc.build().unwrap();
    assert_eq!(
        *provider.resolve_async::<String>("Banner", args![1u8, 2u8]).await.unwrap(),
        "2 args"
    );

    let err = provider.resolve_async::<u8>("Broken", args![]).await.unwrap_err();
    assert_eq!(err.to_string(), "Factory for Broken failed: handshake refused");

    // Failures are not cached; the next call runs the factory again
    assert!(provider.resolve_async::<u8>("Broken", args![]).await.is_err());
}

#[tokio::test]
async fn unknown_key_fails_async_resolution() {
    let provider = ServiceCollection::new().build().unwrap();
    assert_eq!(
        provider.resolve_async::<u8>("Nope", args![]).await.unwrap_err(),
        DiError::ServiceNotRegistered("Nope".into())
    );
}

#[tokio::test]
async fn concurrent_async_resolutions_share_one_instance() {
    let opened = Arc::new(AtomicUsize::new(0));
    let provider = services(opened.clone()).build().unwrap();

    let handles: Vec<_> = (0..8)
        .map(|_| {
            let provider = provider.clone();
            tokio::spawn(async move {
                provider
                    .resolve_async::<Connection>("Connection", args![])
                    .await
                    .unwrap()
            })
        })
        .collect();

    let mut results = Vec::new();
    for handle in handles {
        results.push(handle.await.unwrap());
    }

    // Racing first builds may open more than once, but all see the winner
    assert!(opened.load(Ordering::SeqCst) >= 1);
    for conn in &results {
        assert!(Arc::ptr_eq(conn, &results[0]));
    }
}
