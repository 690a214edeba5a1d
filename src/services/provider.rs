//! The service provider protocol.

use std::borrow::Cow;
use std::fmt;
use std::sync::Arc;

use crate::callable::{downcast_interface, Arguments};
use crate::{Container, DiError, DiResult, Key};

/// A modular unit that registers bindings on a container.
///
/// Every hook has a default, so a provider only implements what it needs.
/// A provider that declares at least one binding in [`provides`](Self::provides)
/// or one macro in [`macros`](Self::macros) is *deferred*: bootstrap skips it
/// and it is registered (and booted) the first time one of those is requested.
///
/// # Examples
///
/// ```
/// use ferrous_container::{Container, DiResult, Provided, ProviderRef, ServiceProvider};
/// use std::sync::atomic::{AtomicUsize, Ordering};
/// use std::sync::Arc;
///
/// static REGISTERED: AtomicUsize = AtomicUsize::new(0);
///
/// #[derive(Default)]
/// struct MailProvider;
///
/// impl ServiceProvider for MailProvider {
///     fn register(&self, container: &Container) -> DiResult<()> {
///         REGISTERED.fetch_add(1, Ordering::SeqCst);
///         container.add_value("mailer", "smtp".to_string());
///         Ok(())
///     }
///
///     fn provides(&self) -> Vec<Provided> {
///         vec![Provided::from("mailer")]
///     }
/// }
///
/// let container = Container::new();
/// container.add_service_provider(ProviderRef::of::<MailProvider>()).unwrap();
/// container.bootstrap().unwrap();
///
/// assert_eq!(REGISTERED.load(Ordering::SeqCst), 0);
/// assert!(container.has("mailer"));
/// assert_eq!(container.get::<String>("mailer").unwrap().as_str(), "smtp");
/// assert_eq!(REGISTERED.load(Ordering::SeqCst), 1);
/// ```
pub trait ServiceProvider: Send + Sync + 'static {
    /// Identity used to register a provider at most once.
    fn name(&self) -> Cow<'static, str> {
        Cow::Borrowed(std::any::type_name::<Self>())
    }

    fn register(&self, _container: &Container) -> DiResult<()> {
        Ok(())
    }

    /// Runs once after registration, with the arguments given to `bootstrap_with`.
    fn boot(&self, _container: &Container, _args: &Arguments) -> DiResult<()> {
        Ok(())
    }

    /// Bindings this provider promises; non-empty means deferred.
    fn provides(&self) -> Vec<Provided> {
        Vec::new()
    }

    /// Macros this provider promises; non-empty means deferred.
    fn macros(&self) -> Vec<Cow<'static, str>> {
        Vec::new()
    }
}

/// A binding declared by a deferred provider, optionally exposed as a facade.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Provided {
    key: Key,
    facade: Option<Cow<'static, str>>,
}

impl Provided {
    pub fn key(key: impl Into<Key>) -> Self {
        Self {
            key: key.into(),
            facade: None,
        }
    }

    /// Declares `key` and a facade named `name` resolving to it.
    pub fn facade(name: impl Into<Cow<'static, str>>, key: impl Into<Key>) -> Self {
        Self {
            key: key.into(),
            facade: Some(name.into()),
        }
    }

    pub fn binding(&self) -> &Key {
        &self.key
    }

    pub fn facade_name(&self) -> Option<&str> {
        self.facade.as_deref()
    }

    pub(crate) fn into_parts(self) -> (Key, Option<Cow<'static, str>>) {
        (self.key, self.facade)
    }
}

impl From<&'static str> for Provided {
    fn from(key: &'static str) -> Self {
        Provided::key(key)
    }
}

impl From<Key> for Provided {
    fn from(key: Key) -> Self {
        Provided::key(key)
    }
}

/// How a provider is handed to the container.
#[derive(Clone)]
pub enum ProviderRef {
    /// An already constructed provider
    Instance(Arc<dyn ServiceProvider>),
    /// A provider type, constructed when the reference is added
    Lazy {
        name: &'static str,
        make: fn() -> Arc<dyn ServiceProvider>,
    },
    /// A container key whose value is an `Arc<dyn ServiceProvider>`
    Binding(Key),
}

fn construct<P: ServiceProvider + Default>() -> Arc<dyn ServiceProvider> {
    Arc::new(P::default())
}

impl ProviderRef {
    pub fn instance<P: ServiceProvider>(provider: P) -> Self {
        ProviderRef::Instance(Arc::new(provider))
    }

    pub fn of<P: ServiceProvider + Default>() -> Self {
        ProviderRef::Lazy {
            name: std::any::type_name::<P>(),
            make: construct::<P>,
        }
    }

    /// Provider bound in the container under `key`, e.g. with
    /// `Binding::interface::<dyn ServiceProvider>(..)`.
    pub fn binding(key: impl Into<Key>) -> Self {
        ProviderRef::Binding(key.into())
    }

    /// Materializes the provider; only binding references touch the container.
    pub(crate) fn materialize(&self, container: &Container) -> DiResult<Arc<dyn ServiceProvider>> {
        match self {
            ProviderRef::Instance(provider) => Ok(provider.clone()),
            ProviderRef::Lazy { make, .. } => Ok(make()),
            ProviderRef::Binding(key) => {
                let invalid = || DiError::InvalidProvider(key.display_name().into_owned());
                let value = container.get_any(key).map_err(|err| match err {
                    DiError::NotFound(_) | DiError::UnboundInterface(_) => invalid(),
                    other => other,
                })?;
                downcast_interface::<dyn ServiceProvider>(value).map_err(|_| invalid())
            }
        }
    }
}

impl From<Arc<dyn ServiceProvider>> for ProviderRef {
    fn from(provider: Arc<dyn ServiceProvider>) -> Self {
        ProviderRef::Instance(provider)
    }
}

impl From<Key> for ProviderRef {
    fn from(key: Key) -> Self {
        ProviderRef::Binding(key)
    }
}

impl fmt::Debug for ProviderRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProviderRef::Instance(provider) => f.debug_tuple("Instance").field(&provider.name()).finish(),
            ProviderRef::Lazy { name, .. } => f.debug_tuple("Lazy").field(name).finish(),
            ProviderRef::Binding(key) => f.debug_tuple("Binding").field(key).finish(),
        }
    }
}
