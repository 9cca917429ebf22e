//! Existence validation and topological ordering of the registered graph.

use std::collections::HashSet;

use crate::error::{DiError, DiResult};
use crate::registration::Registry;

/// Checks every declared dependency against the registry.
///
/// Nodes and their dependencies are scanned in registration and declaration
/// order; the first unknown dependency is reported.
pub(crate) fn validate_dependencies_exist(registry: &Registry) -> DiResult<()> {
    for (key, node) in registry.iter() {
        if let Some(missing) = node
            .dependencies
            .iter()
            .find(|dependency| !registry.contains_key(dependency))
        {
            return Err(DiError::MissingDependency {
                service: key.clone(),
                dependency: missing.clone(),
            });
        }
    }
    Ok(())
}

/// Orders keys so that every key comes after all of its dependencies.
///
/// Expects a validated, acyclic registry. A cycle reaching this point is still
/// reported rather than looping. The post-order walk uses an explicit stack.
pub(crate) fn topological_sort(registry: &Registry) -> DiResult<Vec<String>> {
    let mut order = Vec::with_capacity(registry.len());
    let mut visited: HashSet<&str> = HashSet::with_capacity(registry.len());
    let mut in_progress: HashSet<&str> = HashSet::new();
    let mut stack: Vec<(&str, usize)> = Vec::new();

    for root in registry.keys() {
        if visited.contains(root.as_str()) {
            continue;
        }
        in_progress.insert(root.as_str());
        stack.push((root.as_str(), 0));

        while let Some((key, next)) = stack.last_mut() {
            let key: &str = *key;
            let dependency = registry.dependencies(key).get(*next);
            *next += 1;

            match dependency {
                Some(dependency) if visited.contains(dependency.as_str()) => {}
                Some(dependency) => {
                    if !in_progress.insert(dependency.as_str()) {
                        return Err(DiError::CircularDependency(vec![dependency.clone()]));
                    }
                    stack.push((dependency.as_str(), 0));
                }
                None => {
                    stack.pop();
                    in_progress.remove(key);
                    visited.insert(key);
                    order.push(key.to_string());
                }
            }
        }
    }
    Ok(order)
}
