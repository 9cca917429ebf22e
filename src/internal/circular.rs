//! Circular dependency detection over the registered graph.

use std::collections::HashSet;

use crate::error::{DiError, DiResult};
use crate::registration::Registry;

/// Depth-first walk state shared across all roots of one check.
///
/// The walk keeps its own stack instead of recursing, so chain length is
/// bounded by memory rather than by the thread's stack.
struct CycleWalk<'a> {
    registry: &'a Registry,
    /// Keys on the current traversal path, each with the index of the next
    /// dependency to visit
    stack: Vec<(&'a str, usize)>,
    on_stack: HashSet<&'a str>,
    /// Keys whose whole subtree is known to be acyclic
    done: HashSet<&'a str>,
}

impl<'a> CycleWalk<'a> {
    fn new(registry: &'a Registry) -> Self {
        Self {
            registry,
            stack: Vec::new(),
            on_stack: HashSet::new(),
            done: HashSet::new(),
        }
    }

    fn enter(&mut self, key: &'a str) -> DiResult<()> {
        if self.on_stack.contains(key) {
            let mut path: Vec<String> = self.stack.iter().map(|(k, _)| k.to_string()).collect();
            path.push(key.to_string());
            return Err(DiError::CircularDependency(path));
        }
        if !self.done.contains(key) {
            self.stack.push((key, 0));
            self.on_stack.insert(key);
        }
        Ok(())
    }

    fn walk(&mut self, root: &'a str) -> DiResult<()> {
        let registry = self.registry;
        self.enter(root)?;

        while let Some((key, next)) = self.stack.last_mut() {
            let key: &'a str = *key;
            let dependency = registry.dependencies(key).get(*next);
            *next += 1;

            match dependency {
                Some(dependency) => self.enter(dependency)?,
                None => {
                    self.stack.pop();
                    self.on_stack.remove(key);
                    self.done.insert(key);
                }
            }
        }
        Ok(())
    }
}

/// Fails with the full traversal path on the first cycle found.
///
/// Roots are taken in registration order, so the reported path is stable for a
/// given sequence of registrations. The path starts at the root the walk began
/// from and ends with the key that was revisited, e.g. `["A", "B", "C", "B"]`.
pub(crate) fn detect_cycles(registry: &Registry) -> DiResult<()> {
    let mut walk = CycleWalk::new(registry);
    for key in registry.keys() {
        walk.walk(key)?;
    }
    Ok(())
}
