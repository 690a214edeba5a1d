//! Resolver traits shared by the container and its delegates.

use std::any::Any;
use std::sync::Arc;

use crate::callable::{downcast, downcast_interface, Arguments};
use crate::error::DiResult;
use crate::internal::AnyArc;
use crate::key::Key;

/// Object-safe lookup interface.
///
/// Anything implementing this can sit in a container's delegate chain. The
/// delegating container first asks `contains`, and only then `resolve_any`.
///
/// # Examples
///
/// ```rust
/// use ferrous_container::{AnyArc, Arguments, Container, ContainerLike, DiError, DiResult, Key};
/// use std::sync::Arc;
///
/// struct Fixed;
///
/// impl ContainerLike for Fixed {
///     fn contains(&self, key: &Key) -> bool {
///         *key == Key::from("answer")
///     }
///
///     fn resolve_any(&self, key: &Key, _args: &Arguments) -> DiResult<AnyArc> {
///         if self.contains(key) {
///             Ok(Arc::new(42u32))
///         } else {
///             Err(DiError::NotFound(key.to_string()))
///         }
///     }
/// }
///
/// let container = Container::new();
/// container.delegate(Fixed);
/// assert!(container.has("answer"));
/// assert_eq!(*container.get::<u32>("answer").unwrap(), 42);
/// ```
pub trait ContainerLike: Send + Sync {
    /// Presence check; must not resolve anything.
    fn contains(&self, key: &Key) -> bool;

    /// Resolves `key` with explicit arguments.
    fn resolve_any(&self, key: &Key, args: &Arguments) -> DiResult<AnyArc>;
}

/// Typed helpers over [`ContainerLike`].
///
/// Implemented for every `ContainerLike`, including trait objects, so a
/// delegate handed around as `Arc<dyn ContainerLike>` resolves typed values too.
pub trait Resolver: ContainerLike {
    /// Resolves and downcasts a concrete value.
    fn resolve<T: Any + Send + Sync>(&self, key: impl Into<Key>) -> DiResult<Arc<T>> {
        downcast(self.resolve_any(&key.into(), &Arguments::new())?)
    }

    /// Resolves a trait object bound with `Binding::interface`.
    fn resolve_interface<I: ?Sized + Send + Sync + 'static>(&self, key: impl Into<Key>) -> DiResult<Arc<I>> {
        downcast_interface(self.resolve_any(&key.into(), &Arguments::new())?)
    }

    /// Like [`resolve`](Self::resolve), but `None` instead of an error.
    fn try_resolve<T: Any + Send + Sync>(&self, key: impl Into<Key>) -> Option<Arc<T>> {
        self.resolve(key).ok()
    }
}

impl<C: ContainerLike + ?Sized> Resolver for C {}
