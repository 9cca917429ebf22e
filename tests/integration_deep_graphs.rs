use depgraph_di::{args, DiError, Resolver, ServiceCollection};

const DEPTH: u64 = 10_000;

/// `svc0` is an instance; every `svcN` adds one to `svcN-1`.
fn chain(depth: u64) -> ServiceCollection {
    let mut services = ServiceCollection::new();
    services.register_instance("svc0", 0u64).unwrap();
    for i in 1..=depth {
        services
            .register_factory(format!("svc{i}"), [format!("svc{}", i - 1)], |args| {
                Ok(*args.get::<u64>(0)? + 1)
            })
            .unwrap();
    }
    services
}

/// Same chain, registered from the top down, with every link transient.
fn transient_chain_top_down(depth: u64) -> ServiceCollection {
    let mut services = ServiceCollection::new();
    for i in (1..=depth).rev() {
        services
            .register_transient_factory(format!("svc{i}"), [format!("svc{}", i - 1)], |args| {
                Ok(*args.get::<u64>(0)? + 1)
            })
            .unwrap();
    }
    services.register_instance("svc0", 0u64).unwrap();
    services
}

#[test]
fn deep_chain_builds_and_resolves() {
    let services = chain(DEPTH);
    services.validate().unwrap();

    let provider = services.build().unwrap();
    assert_eq!(provider.len() as u64, DEPTH + 1);
    assert_eq!(provider.build_order().first().map(String::as_str), Some("svc0"));

    let top = format!("svc{DEPTH}");
    assert_eq!(*provider.resolve::<u64>(&top).unwrap(), DEPTH);
    // Every link is a cached singleton now
    assert_eq!(*provider.resolve::<u64>("svc5000").unwrap(), 5_000);
}

#[test]
fn deep_transient_chain_resolves_repeatedly() {
    let provider = transient_chain_top_down(DEPTH).build().unwrap();
    let top = format!("svc{DEPTH}");
    for _ in 0..3 {
        assert_eq!(*provider.resolve::<u64>(&top).unwrap(), DEPTH);
    }
}

#[tokio::test]
async fn deep_chain_resolves_asynchronously() {
    let provider = transient_chain_top_down(DEPTH).build().unwrap();
    let top = format!("svc{DEPTH}");
    let value = provider.resolve_async::<u64>(&top, args![]).await.unwrap();
    assert_eq!(*value, DEPTH);
}

#[test]
fn failure_at_the_bottom_of_a_deep_chain_is_returned() {
    let mut services = ServiceCollection::new();
    services
        .register_factory("svc0", depgraph_di::NO_DEPS, |_| {
            Err::<u64, _>(DiError::factory_failed("svc0", "unavailable"))
        })
        .unwrap();
    for i in 1..=DEPTH {
        services
            .register_factory(format!("svc{i}"), [format!("svc{}", i - 1)], |args| {
                Ok(*args.get::<u64>(0)? + 1)
            })
            .unwrap();
    }
    let provider = services.build().unwrap();

    assert_eq!(
        provider.resolve::<u64>(&format!("svc{DEPTH}")).unwrap_err(),
        DiError::FactoryFailed {
            service: "svc0".into(),
            message: "unavailable".into(),
        }
    );
}

#[test]
fn deep_cycle_is_reported_with_its_path() {
    let mut services = ServiceCollection::new();
    for i in 1..=DEPTH {
        services
            .register_factory(format!("svc{i}"), [format!("svc{}", i - 1)], |_| Ok(0u64))
            .unwrap();
    }
    services
        .register_factory("svc0", [format!("svc{DEPTH}")], |_| Ok(0u64))
        .unwrap();

    match services.build().unwrap_err() {
        DiError::CircularDependency(path) => {
            // svc1 -> svc0 -> svc10000 -> ... -> svc2 -> svc1
            assert_eq!(path.len() as u64, DEPTH + 2);
            assert_eq!(path[0], "svc1");
            assert_eq!(path[1], "svc0");
            assert_eq!(path.last().map(String::as_str), Some("svc1"));
        }
        other => panic!("expected a cycle, got {other}"),
    }
}
