//! The container handle and its binding API.
//!
//! Resolution lives in `resolve`, indexed-access sugar in `access`; the
//! service bootstrap layer adds its methods from `crate::services`.

use std::any::Any;
use std::borrow::Cow;
use std::fmt;
use std::sync::Arc;

use parking_lot::{Mutex, ReentrantMutex, RwLock};

use crate::callable::{downcast, downcast_interface, Arguments, Invocable};
use crate::descriptors::{BindingDescriptor, BindingKind};
use crate::internal::{new_map, AnyArc, Map};
use crate::observer::{ContainerObserver, Observers};
use crate::registration::{Binding, BindingStore};
use crate::services::{Facade, MacroFn, ProviderRef, ProviderRegistry};
use crate::signature::{ClassInfo, Injectable};
use crate::traits::ContainerLike;
use crate::{DiResult, Key, Lifetime};

mod access;
mod resolve;

/// Dependency injection container.
///
/// Stores bindings under [`Key`]s and resolves them on demand, building
/// factory and class dependencies from their declared [`Signature`](crate::Signature)s.
/// Service providers, facades and macros are layered on the same handle.
///
/// # Thread Safety
///
/// `Container` is `Send + Sync` and cheap to clone: clones share the same
/// bindings. Internal locks are never held while factories, providers,
/// delegates, macros or observers run, so any of them may call back into the
/// container. Provider registration and boot are serialized so each provider
/// runs them at most once, even under concurrent first access.
///
/// # Examples
///
/// ```
/// use ferrous_container::{Arguments, Binding, Callable, Container};
/// use std::sync::Arc;
///
/// struct Database {
///     url: String,
/// }
///
/// let container = Container::new();
/// container.add("db.url", Binding::value("postgres://localhost".to_string()));
/// container.share(
///     "db",
///     Callable::new(|args| Ok(Database { url: args.get::<String>("db.url")?.to_string() }))
///         .param("db.url"),
/// );
///
/// let db = container.get::<Database>("db").unwrap();
/// assert_eq!(db.url, "postgres://localhost");
/// assert!(Arc::ptr_eq(&db, &container.get::<Database>("db").unwrap()));
///
/// // Explicit arguments win over bindings
/// let args = Arguments::new().with("db.url", "sqlite::memory:".to_string());
/// container.add(
///     "scratch",
///     Callable::new(|args| Ok(Database { url: args.get::<String>("db.url")?.to_string() }))
///         .param("db.url"),
/// );
/// assert_eq!(container.get_with::<Database>("scratch", &args).unwrap().url, "sqlite::memory:");
/// ```
#[derive(Clone)]
pub struct Container {
    inner: Arc<ContainerInner>,
}

pub(crate) struct ContainerInner {
    pub(crate) store: RwLock<BindingStore>,
    pub(crate) classes: RwLock<Map<Key, ClassInfo>>,
    pub(crate) facades: RwLock<Map<Cow<'static, str>, Facade>>,
    pub(crate) macros: RwLock<Map<Cow<'static, str>, MacroFn>>,
    pub(crate) services: Mutex<ProviderRegistry>,
    /// Serializes provider registration, boot and promotion
    pub(crate) promotion: ReentrantMutex<()>,
    pub(crate) observers: RwLock<Observers>,
}

impl Container {
    pub fn new() -> Self {
        Self {
            inner: Arc::new(ContainerInner {
                store: RwLock::new(BindingStore::new()),
                classes: RwLock::new(new_map()),
                facades: RwLock::new(new_map()),
                macros: RwLock::new(new_map()),
                services: Mutex::new(ProviderRegistry::new()),
                promotion: ReentrantMutex::new(()),
                observers: RwLock::new(Observers::new()),
            }),
        }
    }

    /// Container with providers already queued for [`bootstrap`](Self::bootstrap).
    pub fn with_providers(providers: impl IntoIterator<Item = ProviderRef>) -> DiResult<Self> {
        let container = Self::new();
        container.add_service_providers(providers)?;
        Ok(container)
    }

    #[inline]
    pub(crate) fn inner(&self) -> &ContainerInner {
        &self.inner
    }

    /// Snapshot of the observer list, safe to notify without holding a lock.
    #[inline]
    pub(crate) fn observers(&self) -> Observers {
        self.inner.observers.read().clone()
    }

    // ----- Binding -----

    /// Binds `key` transiently, replacing whatever was there.
    pub fn add(&self, key: impl Into<Key>, binding: impl Into<Binding>) -> &Self {
        self.bind(key.into(), binding.into(), Lifetime::Transient)
    }

    /// Binds `key` as shared: the first resolution is memoized.
    pub fn share(&self, key: impl Into<Key>, binding: impl Into<Binding>) -> &Self {
        self.bind(key.into(), binding.into(), Lifetime::Shared)
    }

    /// Shorthand for `add(key, Binding::value(value))`.
    pub fn add_value<T: Any + Send + Sync>(&self, key: impl Into<Key>, value: T) -> &Self {
        self.add(key, Binding::value(value))
    }

    fn bind(&self, key: Key, binding: Binding, lifetime: Lifetime) -> &Self {
        tracing::trace!(key = %key, kind = ?binding.kind(), ?lifetime, "binding");
        self.inner.store.write().insert(key, binding, lifetime);
        self
    }

    /// Points `alias` at `target`, dropping any entry `alias` had of its own.
    pub fn alias(&self, alias: impl Into<Key>, target: impl Into<Key>) -> &Self {
        self.alias_many([alias.into()], target)
    }

    pub fn alias_many(&self, aliases: impl IntoIterator<Item = Key>, target: impl Into<Key>) -> &Self {
        let target = target.into();
        let mut store = self.inner.store.write();
        for alias in aliases {
            tracing::trace!(alias = %alias, target = %target, "aliasing");
            store.alias(alias, target.clone());
        }
        self
    }

    /// Removes the local entry; delegates are no longer consulted for `key`.
    pub fn remove(&self, key: impl Into<Key>) -> &Self {
        let key = key.into();
        if !self.inner.store.write().remove(&key) {
            tracing::trace!(key = %key, "nothing local to remove");
        }
        self
    }

    /// Appends a container to the delegate chain.
    pub fn delegate<C: ContainerLike + 'static>(&self, delegate: C) -> &Self {
        self.delegate_shared(Arc::new(delegate))
    }

    pub fn delegate_shared(&self, delegate: Arc<dyn ContainerLike>) -> &Self {
        self.inner.store.write().delegate(delegate);
        self
    }

    /// Adds `T` to the class catalog so its type key is constructible.
    pub fn register_class<T: Injectable>(&self) -> &Self {
        self.register_class_info(ClassInfo::of::<T>())
    }

    /// Adds a constructor-less `T` (built from `Default`) to the class catalog.
    pub fn register_bare_class<T: Default + Send + Sync + 'static>(&self) -> &Self {
        self.register_class_info(ClassInfo::bare::<T>())
    }

    pub fn register_class_info(&self, info: ClassInfo) -> &Self {
        self.inner.classes.write().insert(info.key(), info);
        self
    }

    /// True when `key` names a catalogued class or is bound to one.
    pub fn is_class(&self, key: impl Into<Key>) -> bool {
        let key = key.into();
        if self.inner.classes.read().contains_key(&key) {
            return true;
        }
        self.inner.store.read().kind_of(&key) == Some(BindingKind::Class)
    }

    /// Local entries, sorted by key.
    pub fn descriptors(&self) -> Vec<BindingDescriptor> {
        self.inner.store.read().descriptors()
    }

    pub fn add_observer(&self, observer: Arc<dyn ContainerObserver>) -> &Self {
        self.inner.observers.write().add(observer);
        self
    }

    // ----- Resolution -----

    /// True when `key` resolves to something: a local entry, a delegate entry,
    /// or a binding some deferred provider declares. One alias hop is followed
    /// for all three.
    pub fn has(&self, key: impl Into<Key>) -> bool {
        let key = key.into();
        if self.has_binding(&key) {
            return true;
        }
        let target = self.inner.store.read().alias_target(&key).unwrap_or(key);
        self.is_deferred_binding(&target)
    }

    pub fn get_any(&self, key: impl Into<Key>) -> DiResult<AnyArc> {
        self.get_any_with(key, &Arguments::new())
    }

    pub fn get_any_with(&self, key: impl Into<Key>, args: &Arguments) -> DiResult<AnyArc> {
        self.resolve_key(&key.into(), None, args)
    }

    /// Resolves `key` and downcasts it to `T`.
    pub fn get<T: Any + Send + Sync>(&self, key: impl Into<Key>) -> DiResult<Arc<T>> {
        downcast(self.get_any(key)?)
    }

    pub fn get_with<T: Any + Send + Sync>(&self, key: impl Into<Key>, args: &Arguments) -> DiResult<Arc<T>> {
        downcast(self.get_any_with(key, args)?)
    }

    /// Resolves a trait object bound with [`Binding::interface`].
    pub fn get_interface<I: ?Sized + Send + Sync + 'static>(&self, key: impl Into<Key>) -> DiResult<Arc<I>> {
        downcast_interface(self.get_any(key)?)
    }

    /// Like [`get`](Self::get), but any failure becomes `None`.
    pub fn try_get<T: Any + Send + Sync>(&self, key: impl Into<Key>) -> Option<Arc<T>> {
        self.get(key).ok()
    }

    /// Resolves `T` by its type key, constructing it when nothing is bound.
    pub fn make<T: Injectable>(&self) -> DiResult<Arc<T>> {
        self.make_with(&Arguments::new())
    }

    pub fn make_with<T: Injectable>(&self, args: &Arguments) -> DiResult<Arc<T>> {
        let info = ClassInfo::of::<T>();
        downcast(self.resolve_key(&info.key(), Some(&info), args)?)
    }

    /// Invokes `callable` with its parameters resolved.
    pub fn call(&self, callable: &dyn Invocable, args: &Arguments) -> DiResult<AnyArc> {
        self.invoke(callable, args)
    }

    pub fn call_as<T: Any + Send + Sync>(&self, callable: &dyn Invocable, args: &Arguments) -> DiResult<Arc<T>> {
        downcast(self.call(callable, args)?)
    }
}

impl Default for Container {
    fn default() -> Self {
        Self::new()
    }
}

impl ContainerLike for Container {
    fn contains(&self, key: &Key) -> bool {
        self.has(key)
    }

    fn resolve_any(&self, key: &Key, args: &Arguments) -> DiResult<AnyArc> {
        self.get_any_with(key, args)
    }
}

impl fmt::Debug for Container {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let store = self.inner.store.read();
        f.debug_struct("Container")
            .field("bindings", &store.len())
            .field("bootstrapped", &self.inner.services.lock().is_bootstrapped())
            .finish_non_exhaustive()
    }
}
