#![no_main]

use depgraph_di::{DiError, Resolver, ServiceCollection};
use libfuzzer_sys::fuzz_target;

// Each byte pair is an edge `svc{a % 16} -> svc{b % 16}`; keys may be left
// unregistered or form cycles. Build must either fail with a graph error or
// produce a provider on which every service resolves.
fuzz_target!(|data: &[u8]| {
    let mut edges = vec![Vec::new(); 16];
    let mut registered = [false; 16];
    for pair in data.chunks_exact(2) {
        let from = (pair[0] % 16) as usize;
        let to = (pair[1] % 16) as usize;
        registered[from] = true;
        if pair[1] & 0x80 == 0 {
            registered[to] = true;
        }
        edges[from].push(format!("svc{}", to));
    }

    let mut services = ServiceCollection::new();
    for (i, deps) in edges.iter().enumerate() {
        if !registered[i] {
            continue;
        }
        services
            .register_factory(format!("svc{}", i), deps.clone(), |args| Ok(args.len()))
            .unwrap();
    }

    match services.build() {
        Ok(provider) => {
            let graph = provider.dependency_graph();
            for key in provider.build_order() {
                let declared = graph.dependencies_of(key).unwrap().len();
                assert_eq!(*provider.resolve::<usize>(key).unwrap(), declared);
            }
        }
        Err(DiError::MissingDependency { .. }) => {}
        Err(DiError::CircularDependency(path)) => {
            let last = path.last().unwrap();
            assert!(path[..path.len() - 1].contains(last));
        }
        Err(other) => panic!("unexpected build error: {}", other),
    }
});
