//! Service descriptors: identity plus statically declared dependencies.

use crate::args::Args;
use crate::error::DiResult;
use crate::key::InjectKey;

/// A token carrying a service's canonical key and its ordered dependency list.
///
/// Descriptors replace constructor reflection: the registering code states up
/// front which services a constructor needs and in which positional order.
/// Dependency entries may be plain keys or further descriptors.
///
/// # Examples
///
/// ```rust
/// use depgraph_di::{ServiceDescriptor, InjectKey};
///
/// let db = ServiceDescriptor::new("Database", Vec::<InjectKey>::new());
/// let repo = ServiceDescriptor::new("Repository", [InjectKey::from(&db), "Clock".into()]);
///
/// assert_eq!(repo.key, "Repository");
/// assert_eq!(repo.dependency_keys(), vec!["Database".to_string(), "Clock".to_string()]);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ServiceDescriptor {
    /// Canonical service key
    pub key: String,
    /// Dependencies in constructor parameter order
    pub dependencies: Vec<InjectKey>,
}

impl ServiceDescriptor {
    /// Creates a descriptor from a key and any iterable of keys or descriptors.
    pub fn new<I, K>(key: impl Into<String>, dependencies: I) -> Self
    where
        I: IntoIterator<Item = K>,
        K: Into<InjectKey>,
    {
        Self {
            key: key.into(),
            dependencies: dependencies.into_iter().map(Into::into).collect(),
        }
    }

    /// Creates a descriptor without dependencies.
    pub fn leaf(key: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            dependencies: Vec::new(),
        }
    }

    /// Canonical keys of the declared dependencies, in order.
    pub fn dependency_keys(&self) -> Vec<String> {
        crate::key::key_names(&self.dependencies)
    }
}

/// A type that describes itself to the container.
///
/// Implementors name their key, list their dependencies and build themselves
/// from the positional [`Args`] the container supplies: resolved
/// dependencies first, then any call-time arguments.
///
/// # Examples
///
/// ```rust
/// use depgraph_di::{Injectable, InjectKey, Args, DiResult, ServiceCollection, Resolver};
/// use std::sync::Arc;
///
/// struct Config { url: String }
/// impl Injectable for Config {
///     const KEY: &'static str = "Config";
///     fn construct(_: &Args) -> DiResult<Self> {
///         Ok(Config { url: "postgres://localhost".into() })
///     }
/// }
///
/// struct Database { config: Arc<Config> }
/// impl Injectable for Database {
///     const KEY: &'static str = "Database";
///     fn dependencies() -> Vec<InjectKey> {
///         vec![InjectKey::of::<Config>()]
///     }
///     fn construct(args: &Args) -> DiResult<Self> {
///         Ok(Database { config: args.get(0)? })
///     }
/// }
///
/// let mut services = ServiceCollection::new();
/// services.register::<Database>().unwrap();
/// services.register::<Config>().unwrap();
///
/// let provider = services.build().unwrap();
/// let db = provider.get_required::<Database>();
/// assert_eq!(db.config.url, "postgres://localhost");
/// ```
pub trait Injectable: Sized + Send + Sync + 'static {
    /// Canonical service key.
    const KEY: &'static str;

    /// Dependencies in `construct` argument order.
    fn dependencies() -> Vec<InjectKey> {
        Vec::new()
    }

    /// Builds the service from resolved dependencies followed by extra arguments.
    fn construct(args: &Args) -> DiResult<Self>;

    /// The descriptor value for this type.
    fn descriptor() -> ServiceDescriptor {
        ServiceDescriptor {
            key: Self::KEY.to_string(),
            dependencies: Self::dependencies(),
        }
    }
}
