//! Service bootstrap layer: providers, facades and macros.

mod bootstrap;
mod facade;
mod macros;
mod provider;

pub use bootstrap::ProviderState;
pub(crate) use bootstrap::ProviderRegistry;
pub use facade::Facade;
pub use macros::{macro_fn, MacroFn, Mixin};
pub use provider::{Provided, ProviderRef, ServiceProvider};
