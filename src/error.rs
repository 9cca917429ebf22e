//! Error types for the dependency injection container.

use thiserror::Error;

/// Dependency injection errors
///
/// Every failure in depgraph-di is reported through this enum. Registration
/// errors surface from the `register*` methods, graph errors from
/// [`ServiceCollection::build`](crate::ServiceCollection::build), and the rest
/// from resolution. None of them are retried internally; they are meant to be
/// treated as fatal configuration errors at application start-up.
///
/// # Examples
///
/// ```rust
/// use depgraph_di::{DiError, ServiceCollection};
///
/// let mut services = ServiceCollection::new();
/// services.register_factory("B", ["A"], |_| Ok(())).unwrap();
///
/// match services.build() {
///     Err(DiError::MissingDependency { service, dependency }) => {
///         assert_eq!(service, "B");
///         assert_eq!(dependency, "A");
///     }
///     _ => unreachable!(),
/// }
/// ```
///
/// ```rust
/// use depgraph_di::DiError;
///
/// let circular = DiError::CircularDependency(vec!["X".into(), "Y".into(), "X".into()]);
/// assert_eq!(circular.to_string(), "Circular dependency detected: X -> Y -> X");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DiError {
    /// A key was registered twice on the same builder
    #[error("Service {0} already registered")]
    DuplicateRegistration(String),
    /// A declared dependency has no registered node
    #[error("Service {service} depends on {dependency}, but {dependency} is not registered")]
    MissingDependency {
        /// The service declaring the dependency
        service: String,
        /// The dependency key that is not registered
        dependency: String,
    },
    /// Dependency chain revisits a service on the current path (includes path)
    #[error("Circular dependency detected: {}", .0.join(" -> "))]
    CircularDependency(Vec<String>),
    /// Key is absent from the built provider
    #[error("Service {0} not registered")]
    ServiceNotRegistered(String),
    /// Node reached instantiation with neither a cached instance nor a service type
    #[error("Service type not found for service {0}")]
    ServiceTypeMissing(String),
    /// The orchestrator was asked for a provider before `setup`
    #[error("ServiceOrchestrator is not set up. Call setup() first.")]
    NotConfigured,
    /// Downcast to the requested type failed
    #[error("Type mismatch for: {0}")]
    TypeMismatch(&'static str),
    /// Positional argument lookup out of range
    #[error("Argument {index} missing: only {len} arguments supplied")]
    ArgumentMissing {
        /// Requested position
        index: usize,
        /// Number of arguments available
        len: usize,
    },
    /// Service is produced by an async factory and was resolved synchronously
    #[error("Service {0} is built by an async factory, use resolve_async")]
    AsyncResolutionRequired(String),
    /// A user factory reported a failure
    #[error("Factory for {service} failed: {message}")]
    FactoryFailed {
        /// The service whose factory failed
        service: String,
        /// Error message reported by the factory
        message: String,
    },
}

impl DiError {
    /// Wraps an arbitrary factory error for `service`.
    ///
    /// ```rust
    /// use depgraph_di::DiError;
    ///
    /// let err = DiError::factory_failed("Db", "connection refused");
    /// assert_eq!(err.to_string(), "Factory for Db failed: connection refused");
    /// ```
    pub fn factory_failed(service: impl Into<String>, error: impl std::fmt::Display) -> Self {
        DiError::FactoryFailed {
            service: service.into(),
            message: error.to_string(),
        }
    }

    /// Returns true for errors raised while validating the graph in `build()`.
    pub fn is_graph_error(&self) -> bool {
        matches!(
            self,
            DiError::MissingDependency { .. } | DiError::CircularDependency(_)
        )
    }
}

/// Result type for DI operations
///
/// A convenience alias for `Result<T, DiError>` used throughout depgraph-di.
///
/// ```rust
/// use depgraph_di::{DiResult, DiError};
///
/// fn lookup(found: bool) -> DiResult<&'static str> {
///     if found { Ok("service") } else { Err(DiError::ServiceNotRegistered("svc".into())) }
/// }
///
/// assert!(lookup(true).is_ok());
/// assert!(lookup(false).is_err());
/// ```
pub type DiResult<T> = Result<T, DiError>;
