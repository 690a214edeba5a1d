//! Binding lifetime definitions.

/// Binding lifetimes controlling instance caching behavior
///
/// A key is either shared or transient, never both: the lifetime lives on the
/// entry itself, so re-adding a key always replaces it.
///
/// # Examples
///
/// ```rust
/// use ferrous_container::{Binding, Callable, Container};
/// use std::sync::Arc;
///
/// struct Clock(std::time::Instant);
///
/// let container = Container::new();
///
/// // Shared: the factory runs once, its result is memoized
/// container.share("clock", Callable::new(|_| Ok(Clock(std::time::Instant::now()))));
/// let a = container.get::<Clock>("clock").unwrap();
/// let b = container.get::<Clock>("clock").unwrap();
/// assert!(Arc::ptr_eq(&a, &b));
///
/// // Transient: the factory runs on every resolution
/// container.add("clock", Callable::new(|_| Ok(Clock(std::time::Instant::now()))));
/// let c = container.get::<Clock>("clock").unwrap();
/// let d = container.get::<Clock>("clock").unwrap();
/// assert!(!Arc::ptr_eq(&c, &d));
/// # let _ = Binding::value(1u8);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Lifetime {
    /// Resolved afresh on every request
    ///
    /// Factories and classes bound transiently are invoked each time the key
    /// is requested. Plain values are returned as-is either way.
    #[default]
    Transient,
    /// Resolved once, then memoized in place of the factory
    ///
    /// The first successful resolution replaces the payload with the produced
    /// value; every later request returns that same instance.
    Shared,
}

impl Lifetime {
    pub fn is_shared(self) -> bool {
        self == Lifetime::Shared
    }
}
