/// Concurrent access integration tests
///
/// These tests verify that depgraph-di behaves correctly when one provider is
/// shared across threads: singletons converge on one instance, transients stay
/// independent and resolution never blocks on a lock held by a constructor.

use depgraph_di::{args, Resolver, ServiceCollection, ServiceProvider, NO_DEPS};
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Arc, Barrier};
use std::thread;
use std::time::Duration;

#[derive(Debug)]
pub struct CounterService {
    count: AtomicU32,
}

impl CounterService {
    pub fn increment(&self) -> u32 {
        self.count.fetch_add(1, Ordering::SeqCst) + 1
    }

    pub fn get_count(&self) -> u32 {
        self.count.load(Ordering::SeqCst)
    }
}

fn provider(constructions: Arc<AtomicU32>) -> ServiceProvider {
    let mut sc = ServiceCollection::new();
    sc.register_factory("Counter", NO_DEPS, move |_| {
        constructions.fetch_add(1, Ordering::SeqCst);
        // Widen the race window between first resolutions
        thread::sleep(Duration::from_millis(5));
        Ok(CounterService {
            count: AtomicU32::new(0),
        })
    })
    .unwrap();
    sc.register_transient_factory("Request", ["Counter"], |args| {
        let counter = args.get::<CounterService>(0)?;
        let caller = args.get::<usize>(1).map(|c| *c).unwrap_or(usize::MAX);
        Ok((counter.increment(), caller))
    })
    .unwrap();
    sc.build().unwrap()
}

#[test]
fn racing_first_resolutions_converge_on_one_singleton() {
    let constructions = Arc::new(AtomicU32::new(0));
    let provider = provider(constructions.clone());
    let barrier = Barrier::new(16);

    let resolved: Vec<Arc<CounterService>> = crossbeam_utils::thread::scope(|s| {
        let handles: Vec<_> = (0..16)
            .map(|_| {
                let provider = &provider;
                let barrier = &barrier;
                s.spawn(move |_| {
                    barrier.wait();
                    provider.resolve::<CounterService>("Counter").unwrap()
                })
            })
            .collect();
        handles.into_iter().map(|h| h.join().unwrap()).collect()
    })
    .unwrap();

    // No lock is held around construction, so the constructor may run more
    // than once, but every caller observes the same cached winner.
    assert!(constructions.load(Ordering::SeqCst) >= 1);
    for service in &resolved {
        assert!(Arc::ptr_eq(service, &resolved[0]));
    }
    assert!(Arc::ptr_eq(
        &resolved[0],
        &provider.resolve::<CounterService>("Counter").unwrap()
    ));
}

#[test]
fn transients_are_independent_across_threads() {
    let provider = provider(Arc::new(AtomicU32::new(0)));
    let per_thread = 25usize;

    let results: Vec<Vec<(u32, usize)>> = crossbeam_utils::thread::scope(|s| {
        let handles: Vec<_> = (0..8usize)
            .map(|t| {
                let provider = &provider;
                s.spawn(move |_| {
                    (0..per_thread)
                        .map(|_| {
                            *provider
                                .resolve_with::<(u32, usize)>("Request", args![t])
                                .unwrap()
                        })
                        .collect::<Vec<_>>()
                })
            })
            .collect();
        handles.into_iter().map(|h| h.join().unwrap()).collect()
    })
    .unwrap();

    let mut tickets: Vec<u32> = Vec::new();
    for (t, thread_results) in results.iter().enumerate() {
        assert_eq!(thread_results.len(), per_thread);
        for &(ticket, caller) in thread_results {
            assert_eq!(caller, t, "extra args must not leak between threads");
            tickets.push(ticket);
        }
    }

    // Every transient hit the shared singleton exactly once
    tickets.sort_unstable();
    let expected: Vec<u32> = (1..=(8 * per_thread) as u32).collect();
    assert_eq!(tickets, expected);

    let counter = provider.resolve::<CounterService>("Counter").unwrap();
    assert_eq!(counter.get_count(), (8 * per_thread) as u32);
}

#[test]
fn provider_clones_move_across_std_threads() {
    let provider = provider(Arc::new(AtomicU32::new(0)));
    let handles: Vec<_> = (0..4)
        .map(|_| {
            let provider = provider.clone();
            thread::spawn(move || provider.resolve::<CounterService>("Counter").unwrap())
        })
        .collect();

    let first = provider.resolve::<CounterService>("Counter").unwrap();
    for handle in handles {
        assert!(Arc::ptr_eq(&handle.join().unwrap(), &first));
    }
}
