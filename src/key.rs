//! Binding key types for the dependency injection container.

use std::any::TypeId;
use std::borrow::Cow;
use std::fmt;

/// Key for binding storage and lookup.
///
/// Keys identify entries in the container. Plain strings and integers convert
/// into keys directly, so most call sites never spell a variant out.
///
/// # Key Types
///
/// - **Name**: free-form string keys (`"foo"`, `"config.db.url"`)
/// - **Index**: integer keys, produced by [`Container::push`](crate::Container::push)
/// - **Type**: a concrete (class) type, usable for automatic construction
/// - **Interface**: a trait object type, which can only be bound explicitly
///
/// # Examples
///
/// ```rust
/// use ferrous_container::Key;
///
/// struct Database;
/// trait Logger {}
///
/// assert_eq!(Key::from("foo"), Key::name("foo"));
/// assert_eq!(Key::from(3usize), Key::Index(3));
/// assert!(Key::of::<Database>().is_type());
/// assert!(Key::interface::<dyn Logger>().is_interface());
/// assert_eq!(Key::from("foo").to_string(), "foo");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Key {
    /// String key
    Name(Cow<'static, str>),
    /// Integer key
    Index(usize),
    /// Concrete type key with TypeId and name for diagnostics
    Type(TypeId, &'static str),
    /// Trait object key, identified by its type name
    Interface(&'static str),
}

impl Key {
    /// Builds a string key.
    pub fn name(name: impl Into<Cow<'static, str>>) -> Self {
        Key::Name(name.into())
    }

    /// Key of a concrete type.
    #[inline(always)]
    pub fn of<T: 'static>() -> Self {
        Key::Type(TypeId::of::<T>(), std::any::type_name::<T>())
    }

    /// Key of a trait object (`Key::interface::<dyn Logger>()`).
    #[inline(always)]
    pub fn interface<I: ?Sized + 'static>() -> Self {
        Key::Interface(std::any::type_name::<I>())
    }

    /// Human-readable form used in logs and error messages.
    pub fn display_name(&self) -> Cow<'_, str> {
        match self {
            Key::Name(name) => Cow::Borrowed(name.as_ref()),
            Key::Index(index) => Cow::Owned(index.to_string()),
            Key::Type(_, name) | Key::Interface(name) => Cow::Borrowed(name),
        }
    }

    pub fn is_type(&self) -> bool {
        matches!(self, Key::Type(..))
    }

    pub fn is_interface(&self) -> bool {
        matches!(self, Key::Interface(_))
    }

    pub fn as_index(&self) -> Option<usize> {
        match self {
            Key::Index(index) => Some(*index),
            _ => None,
        }
    }
}

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.display_name())
    }
}

impl From<&'static str> for Key {
    fn from(name: &'static str) -> Self {
        Key::Name(Cow::Borrowed(name))
    }
}

impl From<String> for Key {
    fn from(name: String) -> Self {
        Key::Name(Cow::Owned(name))
    }
}

impl From<Cow<'static, str>> for Key {
    fn from(name: Cow<'static, str>) -> Self {
        Key::Name(name)
    }
}

impl From<usize> for Key {
    fn from(index: usize) -> Self {
        Key::Index(index)
    }
}

impl From<&Key> for Key {
    fn from(key: &Key) -> Self {
        key.clone()
    }
}
