//! # depgraph-di
//!
//! Keyed dependency injection with a validated dependency graph.
//!
//! ## Features
//!
//! - **Keyed services**: services are named by string keys or by
//!   [`ServiceDescriptor`] tokens that carry their dependency list
//! - **Validated at build time**: missing dependencies and cycles are reported
//!   before anything is constructed, cycles with the full path
//! - **Lazy, ordered construction**: dependencies are built first, in the
//!   order they were declared
//! - **Lifetimes**: singleton (cached once) and transient (rebuilt every time)
//! - **Extra arguments**: call-time arguments are appended after the resolved
//!   dependencies
//! - **Async factories**: services needing async initialization resolve through
//!   `resolve_async`
//!
//! ## Quick Start
//!
//! ```rust
//! use depgraph_di::{ServiceCollection, Resolver, args};
//!
//! let mut services = ServiceCollection::new();
//! services.register_instance("A", "Hello").unwrap();
//! services.register_factory("B", ["A"], |args| {
//!     let greeting = args.get::<&str>(0)?;
//!     let name = args.get::<&str>(1)?;
//!     Ok(format!("{} {}", greeting, name))
//! }).unwrap();
//!
//! let provider = services.build().unwrap();
//! let b = provider.resolve_with::<String>("B", args!["World"]).unwrap();
//! assert_eq!(*b, "Hello World");
//! ```
//!
//! ## Typed Services
//!
//! ```rust
//! use depgraph_di::{Injectable, InjectKey, Args, DiResult, ServiceCollection, Resolver};
//! use std::sync::Arc;
//!
//! struct Config { url: String }
//! impl Injectable for Config {
//!     const KEY: &'static str = "Config";
//!     fn construct(_: &Args) -> DiResult<Self> {
//!         Ok(Config { url: "postgres://localhost".into() })
//!     }
//! }
//!
//! struct Repository { config: Arc<Config> }
//! impl Injectable for Repository {
//!     const KEY: &'static str = "Repository";
//!     fn dependencies() -> Vec<InjectKey> {
//!         vec![InjectKey::of::<Config>()]
//!     }
//!     fn construct(args: &Args) -> DiResult<Self> {
//!         Ok(Repository { config: args.get(0)? })
//!     }
//! }
//!
//! let mut services = ServiceCollection::new();
//! services.register::<Repository>().unwrap();
//! services.register::<Config>().unwrap();
//!
//! let provider = services.build().unwrap();
//! assert_eq!(provider.get_required::<Repository>().config.url, "postgres://localhost");
//! ```
//!
//! ## Cargo Features
//!
//! - `diagnostics`: [`ServiceProvider::to_debug_string`]
//! - `graph-export`: JSON and YAML output for [`DependencyGraph`]

pub mod args;
pub mod async_factories;
pub mod collection;
pub mod descriptors;
pub mod error;
pub mod graph_export;
pub mod key;
pub mod lifetime;
pub mod observer;
pub mod orchestrator;
pub mod provider;
pub mod traits;

mod factory;
mod internal;
mod registration;

pub use args::{AnyArc, Args};
pub use async_factories::{AsyncFactory, BoxFuture};
pub use collection::ServiceCollection;
pub use descriptors::{Injectable, ServiceDescriptor};
pub use error::{DiError, DiResult};
pub use graph_export::DependencyGraph;
pub use key::{key_name, InjectKey, NO_DEPS};
pub use lifetime::Lifetime;
pub use observer::{DiObserver, LoggingObserver};
pub use orchestrator::ServiceOrchestrator;
pub use provider::ServiceProvider;
pub use traits::{Resolver, ResolverCore};
