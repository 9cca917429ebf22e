//! Dependency graph snapshots and export formats.
//!
//! A [`DependencyGraph`] is a plain copy of the declared edges: service key to
//! ordered dependency keys. It is advisory output for inspection and tooling;
//! mutating it has no effect on the collection it was taken from.
//!
//! DOT rendering is always available. JSON and YAML serialization are behind
//! the `graph-export` feature.

use std::collections::BTreeMap;
use std::fmt::Write as _;

#[cfg(feature = "graph-export")]
use serde::{Deserialize, Serialize};

/// Snapshot of service keys and their declared dependencies.
///
/// Keys iterate in sorted order so output is stable across runs.
///
/// # Examples
///
/// ```
/// use depgraph_di::ServiceCollection;
///
/// let mut services = ServiceCollection::new();
/// services.register_instance("A", "Hello").unwrap();
/// services.register_factory("B", ["A"], |_| Ok(())).unwrap();
///
/// let graph = services.dependency_graph();
/// assert_eq!(graph.dependencies_of("B"), Some(&["A".to_string()][..]));
/// assert_eq!(graph.dependents_of("A"), vec!["B"]);
/// assert!(graph.to_dot().contains("\"B\" -> \"A\";"));
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "graph-export", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "graph-export", serde(transparent))]
pub struct DependencyGraph {
    edges: BTreeMap<String, Vec<String>>,
}

impl DependencyGraph {
    /// Creates an empty graph.
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn insert(&mut self, key: String, dependencies: Vec<String>) {
        self.edges.insert(key, dependencies);
    }

    /// Declared dependencies of `key`, in positional order.
    pub fn dependencies_of(&self, key: &str) -> Option<&[String]> {
        self.edges.get(key).map(Vec::as_slice)
    }

    /// Keys that list `key` among their dependencies.
    pub fn dependents_of(&self, key: &str) -> Vec<&str> {
        self.edges
            .iter()
            .filter(|(_, dependencies)| dependencies.iter().any(|d| d == key))
            .map(|(dependent, _)| dependent.as_str())
            .collect()
    }

    /// All `(service, dependency)` pairs.
    pub fn edges(&self) -> impl Iterator<Item = (&str, &str)> {
        self.edges.iter().flat_map(|(key, dependencies)| {
            dependencies
                .iter()
                .map(move |dependency| (key.as_str(), dependency.as_str()))
        })
    }

    /// Iterates keys with their dependency lists.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &[String])> {
        self.edges
            .iter()
            .map(|(key, dependencies)| (key.as_str(), dependencies.as_slice()))
    }

    /// Returns true when `key` is in the snapshot.
    pub fn contains(&self, key: &str) -> bool {
        self.edges.contains_key(key)
    }

    /// Number of services in the snapshot.
    pub fn len(&self) -> usize {
        self.edges.len()
    }

    /// Returns true when the snapshot has no services.
    pub fn is_empty(&self) -> bool {
        self.edges.is_empty()
    }

    /// The underlying map.
    pub fn as_map(&self) -> &BTreeMap<String, Vec<String>> {
        &self.edges
    }

    /// Renders the graph in Graphviz DOT format.
    pub fn to_dot(&self) -> String {
        let mut output = String::new();
        output.push_str("digraph DependencyGraph {\n");
        output.push_str("  rankdir=TB;\n");
        output.push_str("  node [shape=box];\n\n");

        for key in self.edges.keys() {
            let _ = writeln!(output, "  \"{}\";", escape(key));
        }

        output.push('\n');

        for (from, to) in self.edges() {
            let _ = writeln!(output, "  \"{}\" -> \"{}\";", escape(from), escape(to));
        }

        output.push_str("}\n");
        output
    }

    /// Serializes the graph as pretty-printed JSON.
    #[cfg(feature = "graph-export")]
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }

    /// Serializes the graph as YAML.
    #[cfg(feature = "graph-export")]
    pub fn to_yaml(&self) -> Result<String, serde_yaml::Error> {
        serde_yaml::to_string(self)
    }
}

impl<K, D> FromIterator<(K, D)> for DependencyGraph
where
    K: Into<String>,
    D: IntoIterator,
    D::Item: Into<String>,
{
    fn from_iter<I: IntoIterator<Item = (K, D)>>(iter: I) -> Self {
        Self {
            edges: iter
                .into_iter()
                .map(|(key, deps)| (key.into(), deps.into_iter().map(Into::into).collect()))
                .collect(),
        }
    }
}

fn escape(key: &str) -> String {
    key.replace('\\', "\\\\").replace('"', "\\\"")
}
