//! Binding storage: entries, aliases and the delegate chain.

use std::any::Any;
use std::sync::Arc;

use crate::callable::Callable;
use crate::descriptors::{BindingDescriptor, BindingKind};
use crate::internal::{new_map, new_set, AnyArc, Map, Set};
use crate::key::Key;
use crate::lifetime::Lifetime;
use crate::signature::{ClassInfo, Injectable};
use crate::traits::ContainerLike;

/// Payload of a container entry.
///
/// # Examples
///
/// ```rust
/// use ferrous_container::{Binding, Callable, Container};
/// use std::sync::Arc;
///
/// trait Greeter: Send + Sync {
///     fn greet(&self) -> String;
/// }
///
/// struct English;
/// impl Greeter for English {
///     fn greet(&self) -> String { "hello".into() }
/// }
///
/// let container = Container::new();
/// container.add("answer", Binding::value(42u32));
/// container.add("double", Callable::new(|args| Ok(*args.get::<u32>("answer")? * 2)).param("answer"));
/// container.add(
///     ferrous_container::Key::interface::<dyn Greeter>(),
///     Binding::interface::<dyn Greeter>(Arc::new(English)),
/// );
///
/// assert_eq!(*container.get::<u32>("double").unwrap(), 84);
/// let greeter = container.get_interface::<dyn Greeter>(ferrous_container::Key::interface::<dyn Greeter>()).unwrap();
/// assert_eq!(greeter.greet(), "hello");
/// ```
#[derive(Debug, Clone)]
pub enum Binding {
    /// Concrete value, returned verbatim
    Value(AnyArc),
    /// Closure invoked with its resolved parameters
    Factory(Callable),
    /// Class instantiated through its constructor signature
    Class(ClassInfo),
}

impl Binding {
    pub fn value<T: Any + Send + Sync>(value: T) -> Self {
        Binding::Value(Arc::new(value))
    }

    /// Trait object value, retrievable with `get_interface`.
    pub fn interface<I: ?Sized + Send + Sync + 'static>(value: Arc<I>) -> Self {
        Binding::Value(Arc::new(value))
    }

    pub fn class<T: Injectable>() -> Self {
        Binding::Class(ClassInfo::of::<T>())
    }

    pub fn bare_class<T: Default + Send + Sync + 'static>() -> Self {
        Binding::Class(ClassInfo::bare::<T>())
    }

    pub fn kind(&self) -> BindingKind {
        match self {
            Binding::Value(_) => BindingKind::Value,
            Binding::Factory(_) => BindingKind::Factory,
            Binding::Class(_) => BindingKind::Class,
        }
    }
}

impl From<Callable> for Binding {
    fn from(callable: Callable) -> Self {
        Binding::Factory(callable)
    }
}

impl From<ClassInfo> for Binding {
    fn from(info: ClassInfo) -> Self {
        Binding::Class(info)
    }
}

/// Stored entry: payload, lifetime and the generation it was written in.
#[derive(Debug, Clone)]
pub(crate) struct Entry {
    pub(crate) binding: Binding,
    pub(crate) lifetime: Lifetime,
    pub(crate) generation: u64,
}

/// Entry table
///
/// Small tables stay in a Vec (linear scan beats hashing below the threshold);
/// anything past it spills into a map.
pub(crate) struct Registry {
    small: Vec<(Key, Entry)>,
    large: Map<Key, Entry>,
    small_threshold: usize,
}

impl Registry {
    pub(crate) fn new() -> Self {
        Self {
            small: Vec::new(),
            large: new_map(),
            small_threshold: 16,
        }
    }

    pub(crate) fn insert(&mut self, key: Key, entry: Entry) {
        if let Some(pos) = self.small.iter().position(|(k, _)| k == &key) {
            self.small[pos] = (key, entry);
        } else if self.small.len() < self.small_threshold && !self.large.contains_key(&key) {
            self.small.push((key, entry));
        } else {
            self.large.insert(key, entry);
        }
    }

    #[inline(always)]
    pub(crate) fn get(&self, key: &Key) -> Option<&Entry> {
        for (k, entry) in &self.small {
            if k == key {
                return Some(entry);
            }
        }
        self.large.get(key)
    }

    pub(crate) fn get_mut(&mut self, key: &Key) -> Option<&mut Entry> {
        for (k, entry) in &mut self.small {
            if k == key {
                return Some(entry);
            }
        }
        self.large.get_mut(key)
    }

    #[inline(always)]
    pub(crate) fn contains_key(&self, key: &Key) -> bool {
        self.get(key).is_some()
    }

    pub(crate) fn remove(&mut self, key: &Key) -> Option<Entry> {
        if let Some(pos) = self.small.iter().position(|(k, _)| k == key) {
            return Some(self.small.swap_remove(pos).1);
        }
        self.large.remove(key)
    }

    pub(crate) fn iter(&self) -> impl Iterator<Item = (&Key, &Entry)> {
        self.small.iter().map(|(k, e)| (k, e)).chain(self.large.iter())
    }

    pub(crate) fn len(&self) -> usize {
        self.small.len() + self.large.len()
    }
}

/// Outcome of a local lookup.
pub(crate) enum Lookup {
    /// Redirect to another key
    Alias(Key),
    Local(Entry),
    /// No local entry; these delegates may still hold the key
    Delegates(Vec<Arc<dyn ContainerLike>>),
}

/// Outcome of writing back a shared resolution.
pub(crate) enum Memoized {
    /// The value now replaces the factory/class payload
    Stored,
    /// Another caller memoized first; its value wins
    Existing(AnyArc),
    /// The entry was rebound or removed meanwhile; nothing cached
    Replaced,
}

/// Everything the binding store keeps under one lock.
pub(crate) struct BindingStore {
    entries: Registry,
    aliases: Map<Key, Key>,
    delegates: Vec<Arc<dyn ContainerLike>>,
    ignore_in_delegates: Set<Key>,
    next_generation: u64,
}

impl BindingStore {
    pub(crate) fn new() -> Self {
        Self {
            entries: Registry::new(),
            aliases: new_map(),
            delegates: Vec::new(),
            ignore_in_delegates: new_set(),
            next_generation: 0,
        }
    }

    /// Overwrites `key`, dropping any alias or memoized value.
    pub(crate) fn insert(&mut self, key: Key, binding: Binding, lifetime: Lifetime) {
        self.aliases.remove(&key);
        self.next_generation += 1;
        let entry = Entry {
            binding,
            lifetime,
            generation: self.next_generation,
        };
        self.entries.insert(key, entry);
    }

    pub(crate) fn alias(&mut self, alias: Key, target: Key) {
        self.entries.remove(&alias);
        self.aliases.insert(alias, target);
    }

    /// Local removal; the key stays hidden from delegates afterwards.
    pub(crate) fn remove(&mut self, key: &Key) -> bool {
        let removed = self.entries.remove(key).is_some();
        let unaliased = self.aliases.remove(key).is_some();
        self.ignore_in_delegates.insert(key.clone());
        removed || unaliased
    }

    pub(crate) fn delegate(&mut self, delegate: Arc<dyn ContainerLike>) {
        self.delegates.push(delegate);
    }

    pub(crate) fn alias_target(&self, key: &Key) -> Option<Key> {
        self.aliases.get(key).cloned()
    }

    pub(crate) fn contains_local(&self, key: &Key) -> bool {
        self.entries.contains_key(key)
    }

    pub(crate) fn kind_of(&self, key: &Key) -> Option<BindingKind> {
        self.entries.get(key).map(|entry| entry.binding.kind())
    }

    pub(crate) fn lookup(&self, key: &Key) -> Lookup {
        if let Some(target) = self.aliases.get(key) {
            return Lookup::Alias(target.clone());
        }
        match self.entries.get(key) {
            Some(entry) => Lookup::Local(entry.clone()),
            None => Lookup::Delegates(self.delegates_for(key)),
        }
    }

    pub(crate) fn delegates_for(&self, key: &Key) -> Vec<Arc<dyn ContainerLike>> {
        if self.ignore_in_delegates.contains(key) {
            Vec::new()
        } else {
            self.delegates.clone()
        }
    }

    /// Writes a shared result back if the entry is still the one resolved.
    pub(crate) fn memoize(&mut self, key: &Key, generation: u64, value: AnyArc) -> Memoized {
        match self.entries.get_mut(key) {
            Some(entry) if entry.generation == generation => match &entry.binding {
                Binding::Value(existing) => Memoized::Existing(existing.clone()),
                _ => {
                    entry.binding = Binding::Value(value);
                    Memoized::Stored
                }
            },
            _ => Memoized::Replaced,
        }
    }

    /// Next free integer key: one past the highest, or zero.
    pub(crate) fn next_index(&self) -> usize {
        self.entries
            .iter()
            .filter_map(|(key, _)| key.as_index())
            .max()
            .map_or(0, |max| max + 1)
    }

    /// Binds under the next free integer key and returns that key.
    pub(crate) fn push(&mut self, binding: Binding) -> Key {
        let key = Key::Index(self.next_index());
        self.insert(key.clone(), binding, Lifetime::Transient);
        key
    }

    pub(crate) fn descriptors(&self) -> Vec<BindingDescriptor> {
        let mut descriptors: Vec<_> = self
            .entries
            .iter()
            .map(|(key, entry)| BindingDescriptor {
                key: key.clone(),
                kind: entry.binding.kind(),
                lifetime: entry.lifetime,
            })
            .collect();
        descriptors.sort_by(|a, b| a.key.cmp(&b.key));
        descriptors
    }

    pub(crate) fn len(&self) -> usize {
        self.entries.len()
    }
}
