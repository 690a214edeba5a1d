//! Diagnostic observers for resolution and provider lifecycle events.

use std::borrow::Cow;
use std::sync::Arc;
use std::time::Duration;

use crate::{DiError, Key};

/// Observer trait for container events.
///
/// Observers are called synchronously, outside every container lock, so they
/// may freely call back into the container. Keep them lightweight: a resolution
/// with observers attached pays for each call.
///
/// Only `resolving` and `resolved` are required; the lifecycle hooks default
/// to no-ops.
///
/// # Examples
///
/// ```
/// use ferrous_container::{Binding, Container, ContainerObserver, Key};
/// use std::sync::{Arc, Mutex};
/// use std::time::Duration;
///
/// #[derive(Default)]
/// struct Recorder {
///     seen: Mutex<Vec<String>>,
/// }
///
/// impl ContainerObserver for Recorder {
///     fn resolving(&self, key: &Key) {
///         self.seen.lock().unwrap().push(key.to_string());
///     }
///
///     fn resolved(&self, _key: &Key, _duration: Duration) {}
/// }
///
/// let recorder = Arc::new(Recorder::default());
/// let container = Container::new();
/// container.add_observer(recorder.clone());
/// container.add("foo", Binding::value(1u8));
///
/// container.get_any("foo").unwrap();
/// assert_eq!(*recorder.seen.lock().unwrap(), vec!["foo".to_string()]);
/// ```
pub trait ContainerObserver: Send + Sync {
    /// A keyed resolution is starting.
    fn resolving(&self, key: &Key);

    /// A keyed resolution succeeded after `duration`.
    fn resolved(&self, key: &Key, duration: Duration);

    /// A keyed resolution failed.
    fn failed(&self, _key: &Key, _error: &DiError) {}

    /// A provider's `register` completed.
    fn provider_registered(&self, _provider: &str) {}

    /// A provider was deferred until one of `keys` (or its macros) is used.
    fn provider_deferred(&self, _provider: &str, _keys: &[Key]) {}

    /// A deferred provider is being forced into registration by `trigger`.
    fn provider_promoted(&self, _provider: &str, _trigger: &str) {}

    /// A provider's `boot` completed.
    fn provider_booted(&self, _provider: &str) {}
}

/// Registered observers.
///
/// Cloning is cheap; the container snapshots the list before notifying so no
/// lock is held while observers run.
#[derive(Clone, Default)]
pub(crate) struct Observers {
    observers: Arc<Vec<Arc<dyn ContainerObserver>>>,
}

impl Observers {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn add(&mut self, observer: Arc<dyn ContainerObserver>) {
        Arc::make_mut(&mut self.observers).push(observer);
    }

    #[inline]
    pub(crate) fn has_observers(&self) -> bool {
        !self.observers.is_empty()
    }

    #[inline]
    pub(crate) fn resolving(&self, key: &Key) {
        for observer in self.observers.iter() {
            observer.resolving(key);
        }
    }

    #[inline]
    pub(crate) fn resolved(&self, key: &Key, duration: Duration) {
        for observer in self.observers.iter() {
            observer.resolved(key, duration);
        }
    }

    #[inline]
    pub(crate) fn failed(&self, key: &Key, error: &DiError) {
        for observer in self.observers.iter() {
            observer.failed(key, error);
        }
    }

    pub(crate) fn provider_registered(&self, provider: &str) {
        for observer in self.observers.iter() {
            observer.provider_registered(provider);
        }
    }

    pub(crate) fn provider_deferred(&self, provider: &str, keys: &[Key]) {
        for observer in self.observers.iter() {
            observer.provider_deferred(provider, keys);
        }
    }

    pub(crate) fn provider_promoted(&self, provider: &str, trigger: &str) {
        for observer in self.observers.iter() {
            observer.provider_promoted(provider, trigger);
        }
    }

    pub(crate) fn provider_booted(&self, provider: &str) {
        for observer in self.observers.iter() {
            observer.provider_booted(provider);
        }
    }
}

/// Built-in observer forwarding every event to `tracing`.
///
/// Events carry a `container` field with the observer's label, so several
/// containers in one process can be told apart.
///
/// ```
/// use ferrous_container::{Container, TracingObserver};
/// use std::sync::Arc;
///
/// let container = Container::new();
/// container.add_observer(Arc::new(TracingObserver::with_label("app")));
/// ```
pub struct TracingObserver {
    label: Cow<'static, str>,
}

impl TracingObserver {
    pub fn new() -> Self {
        Self::with_label("ferrous-container")
    }

    pub fn with_label(label: impl Into<Cow<'static, str>>) -> Self {
        Self {
            label: label.into(),
        }
    }

    pub fn label(&self) -> &str {
        &self.label
    }
}

impl Default for TracingObserver {
    fn default() -> Self {
        Self::new()
    }
}

impl ContainerObserver for TracingObserver {
    fn resolving(&self, key: &Key) {
        tracing::trace!(container = %self.label, key = %key, "resolving");
    }

    fn resolved(&self, key: &Key, duration: Duration) {
        tracing::debug!(container = %self.label, key = %key, ?duration, "resolved");
    }

    fn failed(&self, key: &Key, error: &DiError) {
        tracing::warn!(container = %self.label, key = %key, %error, "resolution failed");
    }

    fn provider_registered(&self, provider: &str) {
        tracing::info!(container = %self.label, provider, "provider registered");
    }

    fn provider_deferred(&self, provider: &str, keys: &[Key]) {
        tracing::info!(container = %self.label, provider, deferred_keys = keys.len(), "provider deferred");
    }

    fn provider_promoted(&self, provider: &str, trigger: &str) {
        tracing::info!(container = %self.label, provider, trigger, "deferred provider promoted");
    }

    fn provider_booted(&self, provider: &str) {
        tracing::info!(container = %self.label, provider, "provider booted");
    }
}
