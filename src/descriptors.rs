//! Binding descriptors for introspection and diagnostics.

use crate::key::Key;
use crate::lifetime::Lifetime;

/// Kind of payload an entry currently holds.
///
/// A shared factory or class reports `Value` once it has been resolved, since
/// the produced value replaces the payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BindingKind {
    Value,
    Factory,
    Class,
}

/// Snapshot of one local entry.
///
/// # Examples
///
/// ```rust
/// use ferrous_container::{Binding, BindingKind, Callable, Container, Key, Lifetime};
///
/// let container = Container::new();
/// container.add("port", Binding::value(8080u16));
/// container.share("client", Callable::new(|_| Ok(String::from("client"))));
///
/// let descriptors = container.descriptors();
/// assert_eq!(descriptors.len(), 2);
///
/// let client = descriptors.iter().find(|d| d.key == Key::from("client")).unwrap();
/// assert_eq!(client.kind, BindingKind::Factory);
/// assert!(client.is_shared());
///
/// container.get_any("client").unwrap();
/// let client = container.descriptors().into_iter().find(|d| d.key == Key::from("client")).unwrap();
/// assert_eq!(client.kind, BindingKind::Value);
/// assert_eq!(client.lifetime, Lifetime::Shared);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BindingDescriptor {
    pub key: Key,
    pub kind: BindingKind,
    pub lifetime: Lifetime,
}

impl BindingDescriptor {
    pub fn is_shared(&self) -> bool {
        self.lifetime.is_shared()
    }

    /// Display form of the key.
    pub fn name(&self) -> String {
        self.key.display_name().into_owned()
    }
}
