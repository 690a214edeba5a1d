//! # ferrous-container
//!
//! A runtime dependency injection container with automatic constructor
//! injection and lazily bootstrapped service providers.
//!
//! ## Features
//!
//! - **Keyed bindings**: values, factories and classes under string, integer,
//!   type or interface keys
//! - **Automatic injection**: parameters resolved by explicit argument, declared
//!   type or name, with defaults as the fallback
//! - **Shared bindings**: resolved once, then memoized
//! - **Aliases and delegates**: indirection inside a container and lookup chains
//!   across containers
//! - **Service providers**: modular registration, deferred until first use
//! - **Facades and macros**: named shortcuts and extension functions
//!
//! ## Quick Start
//!
//! ```rust
//! use ferrous_container::{Binding, Callable, Container, DiResult, Injectable, Parameter, ResolvedArgs, Signature};
//! use std::sync::Arc;
//!
//! struct Database {
//!     url: Arc<String>,
//! }
//!
//! impl Injectable for Database {
//!     fn signature() -> Signature {
//!         Signature::new().with(Parameter::new("db.url"))
//!     }
//!
//!     fn construct(args: ResolvedArgs) -> DiResult<Self> {
//!         Ok(Self { url: args.get("db.url")? })
//!     }
//! }
//!
//! struct UserService {
//!     db: Arc<Database>,
//! }
//!
//! impl Injectable for UserService {
//!     fn signature() -> Signature {
//!         Signature::new().with(Parameter::class::<Database>("db"))
//!     }
//!
//!     fn construct(args: ResolvedArgs) -> DiResult<Self> {
//!         Ok(Self { db: args.get("db")? })
//!     }
//! }
//!
//! let container = Container::new();
//! container.add("db.url", Binding::value("postgres://localhost".to_string()));
//!
//! // Neither class is bound: both are constructed from their signatures
//! let users = container.make::<UserService>().unwrap();
//! assert_eq!(users.db.url.as_str(), "postgres://localhost");
//!
//! // Factories declare their parameters the same way
//! container.share("greeting", Callable::new(|args| {
//!     Ok(format!("connected to {}", args.get::<String>("db.url")?))
//! }).param("db.url"));
//! assert_eq!(container.get::<String>("greeting").unwrap().as_str(), "connected to postgres://localhost");
//! ```
//!
//! ## Service Providers
//!
//! ```rust
//! use ferrous_container::{Arguments, Container, DiResult, Provided, ProviderRef, ServiceProvider};
//!
//! #[derive(Default)]
//! struct CacheProvider;
//!
//! impl ServiceProvider for CacheProvider {
//!     fn register(&self, container: &Container) -> DiResult<()> {
//!         container.add_value("cache.driver", "memory".to_string());
//!         Ok(())
//!     }
//!
//!     // Declaring bindings defers the provider until one is requested
//!     fn provides(&self) -> Vec<Provided> {
//!         vec![Provided::facade("cache", "cache.driver")]
//!     }
//! }
//!
//! let container = Container::new();
//! container.add_service_provider(ProviderRef::of::<CacheProvider>()).unwrap();
//! assert!(container.has_facade("cache"));
//!
//! container.bootstrap().unwrap();
//! assert_eq!(container.facade_as::<String>("cache").unwrap().as_str(), "memory");
//! ```
//!
//! ## Logging
//!
//! The container emits `tracing` events (resolution at `trace`, aliases,
//! delegates and memoization at `debug`, provider lifecycle at `info`).
//! Attach a [`TracingObserver`] or a custom [`ContainerObserver`] for
//! per-resolution timing.

pub mod callable;
pub mod config;
pub mod container;
pub mod descriptors;
pub mod error;
pub mod key;
pub mod lifetime;
pub mod observer;
pub mod services;
pub mod signature;
pub mod traits;

mod internal;
mod registration;

pub use callable::{Arguments, Callable, Invocable, ResolvedArgs};
pub use config::{
    ConfigRepository, ConfigServiceProvider, ConfigSource, ConfigValue, EnvironmentConfigSource,
    MapConfigSource,
};
#[cfg(feature = "config")]
pub use config::JsonConfigSource;
pub use container::Container;
pub use descriptors::{BindingDescriptor, BindingKind};
pub use error::{DiError, DiResult};
pub use internal::AnyArc;
pub use key::Key;
pub use lifetime::Lifetime;
pub use observer::{ContainerObserver, TracingObserver};
pub use registration::Binding;
pub use services::{macro_fn, Facade, MacroFn, Mixin, Provided, ProviderRef, ProviderState, ServiceProvider};
pub use signature::{ClassInfo, Injectable, Inspection, Parameter, Signature, TypeHint};
pub use traits::{ContainerLike, Resolver};
