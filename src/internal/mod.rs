//! Internal implementation details.

pub(crate) mod circular;
pub(crate) mod ordering;

pub(crate) use circular::detect_cycles;
pub(crate) use ordering::{topological_sort, validate_dependencies_exist};
