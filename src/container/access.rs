//! Indexed-access sugar over the binding API.

use crate::internal::AnyArc;
use crate::registration::Binding;
use crate::{Container, DiResult, Key};

impl Container {
    /// Same as [`add`](Self::add).
    pub fn set(&self, key: impl Into<Key>, binding: impl Into<Binding>) -> &Self {
        self.add(key, binding)
    }

    /// Binds under the next integer key (one past the highest, or 0) and returns it.
    ///
    /// ```
    /// use ferrous_container::{Binding, Container, Key};
    ///
    /// let container = Container::new();
    /// assert_eq!(container.push(Binding::value("a")), Key::Index(0));
    /// container.set(7usize, Binding::value("b"));
    /// assert_eq!(container.push(Binding::value("c")), Key::Index(8));
    /// assert_eq!(*container.at::<&str>(8usize).unwrap(), "c");
    /// ```
    pub fn push(&self, binding: impl Into<Binding>) -> Key {
        let key = self.inner().store.write().push(binding.into());
        tracing::trace!(key = %key, "pushed binding");
        key
    }

    /// Same as [`has`](Self::has).
    pub fn contains(&self, key: impl Into<Key>) -> bool {
        self.has(key)
    }

    /// Same as [`remove`](Self::remove).
    pub fn unset(&self, key: impl Into<Key>) -> &Self {
        self.remove(key)
    }

    /// Typed [`get`](Self::get).
    pub fn at<T: std::any::Any + Send + Sync>(&self, key: impl Into<Key>) -> DiResult<std::sync::Arc<T>> {
        self.get(key)
    }

    /// Untyped [`get_any`](Self::get_any).
    pub fn at_any(&self, key: impl Into<Key>) -> DiResult<AnyArc> {
        self.get_any(key)
    }
}
