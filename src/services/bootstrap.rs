//! Provider registration, deferral, promotion and boot.
//!
//! All provider code runs under the container's re-entrant promotion gate, so
//! concurrent first access registers and boots each provider exactly once,
//! while a provider may still resolve (and promote) from inside its own hooks.
//! The registry mutex itself is only held for bookkeeping.

use std::borrow::Cow;
use std::sync::Arc;

use crate::callable::Arguments;
use crate::internal::{new_map, Map};
use crate::services::{Facade, Provided, ProviderRef, ServiceProvider};
use crate::{Container, DiResult, Key};

/// Lifecycle of a provider inside a container.
///
/// `Pending → Registered → Booted`, with `Deferred` as the side branch for
/// providers waiting on their first use. `Registering` is only observable
/// while the provider's own `register` hook runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ProviderState {
    Pending,
    Deferred,
    Registering,
    Registered,
    Booted,
}

struct ProviderRecord {
    id: Cow<'static, str>,
    source: ProviderRef,
    instance: Option<Arc<dyn ServiceProvider>>,
    state: ProviderState,
}

/// Bookkeeping for every provider added to a container.
pub(crate) struct ProviderRegistry {
    records: Vec<ProviderRecord>,
    /// Indices in the order their registration completed
    registration_order: Vec<usize>,
    deferred_bindings: Map<Key, usize>,
    deferred_macros: Map<Cow<'static, str>, usize>,
    bootstrapped: bool,
}

impl ProviderRegistry {
    pub(crate) fn new() -> Self {
        Self {
            records: Vec::new(),
            registration_order: Vec::new(),
            deferred_bindings: new_map(),
            deferred_macros: new_map(),
            bootstrapped: false,
        }
    }

    pub(crate) fn is_bootstrapped(&self) -> bool {
        self.bootstrapped
    }

    fn position(&self, id: &str) -> Option<usize> {
        self.records.iter().position(|record| record.id == id)
    }

    fn set_state(&mut self, index: usize, state: ProviderState) {
        self.records[index].state = state;
    }

    fn pending(&self) -> Vec<usize> {
        self.records
            .iter()
            .enumerate()
            .filter(|(_, record)| record.state == ProviderState::Pending)
            .map(|(index, _)| index)
            .collect()
    }
}

impl Container {
    /// Queues a provider; registers (and boots) it right away once bootstrapped.
    ///
    /// Adding a provider whose identity is already known is a no-op.
    pub fn add_service_provider(&self, provider: ProviderRef) -> DiResult<&Self> {
        self.add_service_provider_with(provider, &Arguments::new())
    }

    /// Like [`add_service_provider`](Self::add_service_provider), passing
    /// `args` to `boot` when the provider is booted immediately.
    pub fn add_service_provider_with(&self, provider: ProviderRef, args: &Arguments) -> DiResult<&Self> {
        let _gate = self.inner().promotion.lock();

        let (id, instance) = match &provider {
            ProviderRef::Binding(key) => (Cow::Owned(key.display_name().into_owned()), None),
            other => {
                let instance = other.materialize(self)?;
                (instance.name(), Some(instance))
            }
        };

        let (index, bootstrapped) = {
            let mut services = self.inner().services.lock();
            if services.position(&id).is_some() {
                tracing::debug!(provider = %id, "provider already added");
                return Ok(self);
            }
            services.records.push(ProviderRecord {
                id: id.clone(),
                source: provider,
                instance: instance.clone(),
                state: ProviderState::Pending,
            });
            (services.records.len() - 1, services.bootstrapped)
        };
        tracing::debug!(provider = %id, "provider added");

        // Facades are known as soon as the provider is
        if let Some(instance) = &instance {
            self.add_declared_facades(instance.provides());
        }

        if bootstrapped && self.register_provider(index, false)? == ProviderState::Registered {
            self.boot_provider(index, args)?;
        }
        Ok(self)
    }

    pub fn add_service_providers(&self, providers: impl IntoIterator<Item = ProviderRef>) -> DiResult<&Self> {
        for provider in providers {
            self.add_service_provider(provider)?;
        }
        Ok(self)
    }

    /// Registers every pending provider, then boots the registered ones.
    pub fn bootstrap(&self) -> DiResult<&Self> {
        self.bootstrap_with(&Arguments::new())
    }

    /// Registers whatever is still pending and boots whatever is still
    /// registered, so repeated calls are cheap and retry earlier failures.
    ///
    /// Providers register in insertion order, each either registering fully
    /// or deferring; a registration failure stops the pass. Boot follows
    /// registration completion order and keeps going past a failing provider,
    /// returning the first boot error once every other provider had its turn.
    /// `args` reach every `boot` hook run here.
    pub fn bootstrap_with(&self, args: &Arguments) -> DiResult<&Self> {
        let _gate = self.inner().promotion.lock();

        let (pending, first_run) = {
            let services = self.inner().services.lock();
            (services.pending(), !services.bootstrapped)
        };
        tracing::debug!(providers = pending.len(), first_run, "bootstrapping container");

        for index in pending {
            self.register_provider(index, false)?;
        }

        let order = {
            let mut services = self.inner().services.lock();
            services.bootstrapped = true;
            services.registration_order.clone()
        };
        let mut first_error = None;
        for index in order {
            if let Err(err) = self.boot_provider(index, args) {
                first_error.get_or_insert(err);
            }
        }
        if let Some(err) = first_error {
            return Err(err);
        }

        if first_run {
            tracing::info!("container bootstrapped");
        }
        Ok(self)
    }

    pub fn is_bootstrapped(&self) -> bool {
        self.inner().services.lock().bootstrapped
    }

    /// State of the provider with identity `name` (its `ServiceProvider::name`,
    /// or the key it was bound under).
    pub fn provider_state(&self, name: &str) -> Option<ProviderState> {
        let services = self.inner().services.lock();
        services.position(name).map(|index| services.records[index].state)
    }

    pub(crate) fn is_deferred_binding(&self, key: &Key) -> bool {
        self.inner().services.lock().deferred_bindings.contains_key(key)
    }

    pub(crate) fn is_deferred_macro(&self, name: &str) -> bool {
        self.inner().services.lock().deferred_macros.contains_key(name)
    }

    /// Promotes the provider that declared `key`; false when none did.
    pub(crate) fn promote_deferred_binding(&self, key: &Key) -> DiResult<bool> {
        let index = self.inner().services.lock().deferred_bindings.get(key).copied();
        match index {
            Some(index) => {
                self.promote_provider(index, &key.display_name())?;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    pub(crate) fn promote_deferred_macro(&self, name: &str) -> DiResult<bool> {
        let index = self.inner().services.lock().deferred_macros.get(name).copied();
        match index {
            Some(index) => {
                self.promote_provider(index, name)?;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    fn promote_provider(&self, index: usize, trigger: &str) -> DiResult<()> {
        let _gate = self.inner().promotion.lock();

        let (state, id) = {
            let services = self.inner().services.lock();
            let record = &services.records[index];
            (record.state, record.id.clone())
        };
        // Someone else got here first
        if state != ProviderState::Deferred {
            return Ok(());
        }

        tracing::info!(provider = %id, trigger, "promoting deferred provider");
        self.observers().provider_promoted(&id, trigger);

        if self.register_provider(index, true)? == ProviderState::Registered && self.is_bootstrapped() {
            self.boot_provider(index, &Arguments::new())?;
        }
        Ok(())
    }

    /// Registers or defers one provider; `force` skips the deferral check.
    fn register_provider(&self, index: usize, force: bool) -> DiResult<ProviderState> {
        let (state, source, instance, id) = {
            let services = self.inner().services.lock();
            let record = &services.records[index];
            (record.state, record.source.clone(), record.instance.clone(), record.id.clone())
        };
        match state {
            ProviderState::Pending => {}
            ProviderState::Deferred if force => {}
            other => return Ok(other),
        }

        let provider = match instance {
            Some(provider) => provider,
            None => {
                let provider = source.materialize(self)?;
                self.inner().services.lock().records[index].instance = Some(provider.clone());
                provider
            }
        };

        if !force {
            let provided = provider.provides();
            let macros = provider.macros();
            if !provided.is_empty() || !macros.is_empty() {
                self.defer_provider(index, &id, provided, macros);
                return Ok(ProviderState::Deferred);
            }
        }

        self.inner().services.lock().set_state(index, ProviderState::Registering);
        tracing::debug!(provider = %id, "registering provider");
        if let Err(err) = provider.register(self) {
            tracing::warn!(provider = %id, error = %err, "provider registration failed");
            self.inner().services.lock().set_state(index, state);
            return Err(err);
        }

        {
            let mut services = self.inner().services.lock();
            services.set_state(index, ProviderState::Registered);
            services.registration_order.push(index);
        }
        tracing::info!(provider = %id, "provider registered");
        self.observers().provider_registered(&id);
        Ok(ProviderState::Registered)
    }

    fn defer_provider(&self, index: usize, id: &str, provided: Vec<Provided>, macros: Vec<Cow<'static, str>>) {
        let keys: Vec<Key> = provided.iter().map(|p| p.binding().clone()).collect();
        {
            let mut services = self.inner().services.lock();
            for key in &keys {
                services.deferred_bindings.insert(key.clone(), index);
            }
            for name in macros {
                services.deferred_macros.insert(name, index);
            }
            services.set_state(index, ProviderState::Deferred);
        }
        self.add_declared_facades(provided);

        tracing::info!(provider = id, deferred_keys = keys.len(), "provider deferred");
        self.observers().provider_deferred(id, &keys);
    }

    fn add_declared_facades(&self, provided: Vec<Provided>) {
        let mut facades = self.inner().facades.write();
        for declared in provided {
            if let (key, Some(name)) = declared.into_parts() {
                facades.insert(name, Facade::Key(key));
            }
        }
    }

    fn boot_provider(&self, index: usize, args: &Arguments) -> DiResult<()> {
        let (provider, id) = {
            let mut services = self.inner().services.lock();
            let record = &mut services.records[index];
            if record.state != ProviderState::Registered {
                return Ok(());
            }
            let Some(provider) = record.instance.clone() else {
                return Ok(());
            };
            // Marked first so a re-entrant bootstrap cannot boot it twice
            record.state = ProviderState::Booted;
            (provider, record.id.clone())
        };

        tracing::debug!(provider = %id, "booting provider");
        if let Err(err) = provider.boot(self, args) {
            tracing::warn!(provider = %id, error = %err, "provider boot failed");
            self.inner().services.lock().set_state(index, ProviderState::Registered);
            return Err(err);
        }
        self.observers().provider_booted(&id);
        Ok(())
    }
}
