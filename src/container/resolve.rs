//! The resolution engine.

use std::time::Instant;

use crate::callable::{Arguments, Invocable, ResolvedArgs};
use crate::internal::AnyArc;
use crate::registration::{Binding, Entry, Lookup, Memoized};
use crate::signature::{ClassInfo, Inspection, Signature, TypeHint};
use crate::{Container, DiError, DiResult, Key};

impl Container {
    /// Presence check: one alias hop, then local entries, then delegates.
    pub(crate) fn has_binding(&self, key: &Key) -> bool {
        let (target, delegates) = {
            let store = self.inner().store.read();
            let target = store.alias_target(key).unwrap_or_else(|| key.clone());
            if store.contains_local(&target) {
                return true;
            }
            let delegates = store.delegates_for(&target);
            (target, delegates)
        };
        delegates.iter().any(|delegate| delegate.contains(&target))
    }

    /// Keyed resolution, observed and with deferred-provider promotion.
    ///
    /// `hint` carries the class recipe when the caller knows `key` is a
    /// constructible class (a class-typed parameter or `make`).
    pub(crate) fn resolve_key(&self, key: &Key, hint: Option<&ClassInfo>, args: &Arguments) -> DiResult<AnyArc> {
        let observers = self.observers();
        if !observers.has_observers() {
            return self.resolve_promoting(key, hint, args);
        }

        let start = Instant::now();
        observers.resolving(key);
        let result = self.resolve_promoting(key, hint, args);
        match &result {
            Ok(_) => observers.resolved(key, start.elapsed()),
            Err(err) => observers.failed(key, err),
        }
        result
    }

    fn resolve_promoting(&self, key: &Key, hint: Option<&ClassInfo>, args: &Arguments) -> DiResult<AnyArc> {
        match self.resolve_local(key, hint, args) {
            Err(err) if err.is_not_found() => {
                // Retried exactly once after a deferred provider claims the key
                if self.promote_deferred_binding(key)? {
                    self.resolve_local(key, hint, args)
                } else {
                    Err(err)
                }
            }
            result => result,
        }
    }

    fn resolve_local(&self, key: &Key, hint: Option<&ClassInfo>, args: &Arguments) -> DiResult<AnyArc> {
        tracing::trace!(key = %key, "resolving");

        // The guard must be gone before any user code runs
        let lookup = self.inner().store.read().lookup(key);

        match lookup {
            Lookup::Alias(target) => {
                tracing::debug!(alias = %key, target = %target, "following alias");
                self.resolve_key(&target, None, args)
            }
            Lookup::Local(entry) => self.resolve_entry(key, entry, args),
            Lookup::Delegates(delegates) => {
                for delegate in &delegates {
                    if delegate.contains(key) {
                        tracing::debug!(key = %key, "resolving through delegate");
                        return delegate.resolve_any(key, args);
                    }
                }
                self.resolve_unbound(key, hint, args)
            }
        }
    }

    fn resolve_entry(&self, key: &Key, entry: Entry, args: &Arguments) -> DiResult<AnyArc> {
        let produced = match &entry.binding {
            Binding::Value(value) => return Ok(value.clone()),
            Binding::Factory(callable) => self.invoke(callable, args),
            Binding::Class(info) => self.instantiate(info, args),
        }
        .map_err(|err| DiError::binding_resolution(key.display_name(), err))?;

        if !entry.lifetime.is_shared() {
            return Ok(produced);
        }

        // Double-checked: never hold the lock while invoking the factory
        let memoized = self.inner().store.write().memoize(key, entry.generation, produced.clone());
        match memoized {
            Memoized::Stored => {
                tracing::debug!(key = %key, "memoized shared binding");
                Ok(produced)
            }
            Memoized::Existing(value) => Ok(value),
            Memoized::Replaced => {
                tracing::debug!(key = %key, "binding replaced during resolution; result not cached");
                Ok(produced)
            }
        }
    }

    /// Nothing bound anywhere: construct a known class or report the miss.
    fn resolve_unbound(&self, key: &Key, hint: Option<&ClassInfo>, args: &Arguments) -> DiResult<AnyArc> {
        let class = match hint {
            Some(info) => Some(*info),
            None => self.inner().classes.read().get(key).copied(),
        };

        if let Some(info) = class {
            tracing::trace!(key = %key, class = info.name(), "constructing unbound class");
            return self
                .instantiate(&info, args)
                .map_err(|err| DiError::binding_resolution(key.display_name(), err));
        }

        match key {
            Key::Interface(name) => Err(DiError::UnboundInterface(*name)),
            _ => Err(DiError::NotFound(key.display_name().into_owned())),
        }
    }

    pub(crate) fn instantiate(&self, info: &ClassInfo, args: &Arguments) -> DiResult<AnyArc> {
        match info.inspect() {
            Inspection::Direct => info.instantiate(ResolvedArgs::new()),
            Inspection::Parameters(signature) => {
                let resolved = self.resolve_parameters(&signature, args)?;
                info.instantiate(resolved)
            }
        }
    }

    pub(crate) fn invoke(&self, callable: &dyn Invocable, args: &Arguments) -> DiResult<AnyArc> {
        let resolved = self.resolve_parameters(&callable.signature(), args)?;
        callable.invoke(self, resolved)
    }

    /// Explicit argument, else the declared type (or name) as a key, else the default.
    fn resolve_parameters(&self, signature: &Signature, args: &Arguments) -> DiResult<ResolvedArgs> {
        let mut resolved = ResolvedArgs::new();
        let nested = Arguments::new();

        for parameter in signature {
            if let Some(value) = args.get(parameter.name()) {
                resolved.push(parameter.owned_name(), value.clone());
                continue;
            }

            let hint = parameter.type_hint().and_then(TypeHint::class);
            let value = match self.resolve_key(&parameter.lookup_key(), hint, &nested) {
                Ok(value) => value,
                Err(err) => match parameter.default_value() {
                    Some(default) => {
                        tracing::trace!(parameter = parameter.name(), error = %err, "falling back to default");
                        default.clone()
                    }
                    None => return Err(err),
                },
            };
            resolved.push(parameter.owned_name(), value);
        }

        Ok(resolved)
    }
}
