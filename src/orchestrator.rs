//! Lazily built, memoized provider behind a configuration function.

use std::sync::{Arc, Mutex, PoisonError};

use once_cell::sync::OnceCell;

use crate::collection::ServiceCollection;
use crate::error::{DiError, DiResult};
use crate::provider::ServiceProvider;

type ConfigureFn = Arc<dyn Fn(&mut ServiceCollection) -> DiResult<()> + Send + Sync>;

/// Owns the configuration step and the provider it produces.
///
/// [`setup`](Self::setup) stores a configuration function without doing any
/// graph work. The first [`get_provider`](Self::get_provider) call runs it
/// against a fresh [`ServiceCollection`], builds, and keeps the provider;
/// later calls return the same provider. A failed configuration or build is
/// returned to the caller and the next call tries again.
///
/// # Examples
///
/// ```
/// use depgraph_di::{ServiceOrchestrator, Resolver, DiError};
///
/// let orchestrator = ServiceOrchestrator::new();
/// assert_eq!(orchestrator.get_provider().unwrap_err(), DiError::NotConfigured);
///
/// orchestrator.setup(|services| {
///     services.register_instance("port", 8080u16)?;
///     Ok(())
/// });
///
/// let provider = orchestrator.get_provider().unwrap();
/// assert_eq!(*provider.resolve::<u16>("port").unwrap(), 8080);
/// ```
#[derive(Default)]
pub struct ServiceOrchestrator {
    configure: Mutex<Option<ConfigureFn>>,
    provider: OnceCell<ServiceProvider>,
}

impl ServiceOrchestrator {
    /// Creates an orchestrator with no configuration function.
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores the configuration function, replacing any earlier one.
    ///
    /// Has no effect on a provider that was already built.
    pub fn setup<F>(&self, configure: F)
    where
        F: Fn(&mut ServiceCollection) -> DiResult<()> + Send + Sync + 'static,
    {
        let mut slot = self.configure.lock().unwrap_or_else(PoisonError::into_inner);
        *slot = Some(Arc::new(configure));
        tracing::debug!("service orchestrator configured");
    }

    /// Returns the memoized provider, building it on first use.
    ///
    /// Concurrent first calls are serialized, so the configuration function
    /// runs at most once per successful build. The function runs outside the
    /// configuration lock and may call back into the orchestrator, except for
    /// `get_provider` itself.
    pub fn get_provider(&self) -> DiResult<ServiceProvider> {
        self.provider
            .get_or_try_init(|| {
                let configure = self
                    .configure
                    .lock()
                    .unwrap_or_else(PoisonError::into_inner)
                    .clone()
                    .ok_or(DiError::NotConfigured)?;

                let mut services = ServiceCollection::new();
                configure(&mut services)?;
                tracing::debug!(services = services.len(), "orchestrator building provider");
                services.build()
            })
            .cloned()
    }

    /// True once [`setup`](Self::setup) has stored a configuration function.
    pub fn is_configured(&self) -> bool {
        self.configure
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .is_some()
    }

    /// True once a provider has been built and memoized.
    pub fn is_built(&self) -> bool {
        self.provider.get().is_some()
    }
}

impl std::fmt::Debug for ServiceOrchestrator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ServiceOrchestrator")
            .field("configured", &self.is_configured())
            .field("built", &self.is_built())
            .finish()
    }
}
