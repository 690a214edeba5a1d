//! Named shortcuts to keys or callables.

use std::any::Any;
use std::borrow::Cow;
use std::sync::Arc;

use crate::callable::{downcast, Arguments, Callable};
use crate::internal::AnyArc;
use crate::registration::Binding;
use crate::{Container, DiError, DiResult, Key};

/// What a facade name stands for.
///
/// # Examples
///
/// ```
/// use ferrous_container::{Binding, Callable, Container, Facade};
///
/// let container = Container::new();
/// container.add("config.app.name", Binding::value("demo".to_string()));
/// container.add_facade("app_name", "config.app.name");
/// container.add_facade("motd", Callable::new(|args| {
///     Ok(format!("welcome to {}", args.get::<String>("config.app.name")?))
/// }).param("config.app.name"));
///
/// assert_eq!(container.facade_as::<String>("app_name").unwrap().as_str(), "demo");
/// assert_eq!(container.facade_as::<String>("motd").unwrap().as_str(), "welcome to demo");
/// assert!(container.facade("missing").is_err());
/// ```
#[derive(Debug, Clone)]
pub enum Facade {
    /// Resolved with `get`
    Key(Key),
    /// Invoked with `call`
    Callable(Callable),
}

impl From<Key> for Facade {
    fn from(key: Key) -> Self {
        Facade::Key(key)
    }
}

impl From<&'static str> for Facade {
    fn from(key: &'static str) -> Self {
        Facade::Key(Key::from(key))
    }
}

impl From<Callable> for Facade {
    fn from(callable: Callable) -> Self {
        Facade::Callable(callable)
    }
}

impl Container {
    pub fn add_facade(&self, name: impl Into<Cow<'static, str>>, facade: impl Into<Facade>) -> &Self {
        self.inner().facades.write().insert(name.into(), facade.into());
        self
    }

    pub fn add_facades<N, F>(&self, facades: impl IntoIterator<Item = (N, F)>) -> &Self
    where
        N: Into<Cow<'static, str>>,
        F: Into<Facade>,
    {
        let mut table = self.inner().facades.write();
        for (name, facade) in facades {
            table.insert(name.into(), facade.into());
        }
        drop(table);
        self
    }

    /// [`add`](Self::add) under `name`, plus a facade of the same name.
    ///
    /// ```
    /// use ferrous_container::{Binding, Container};
    ///
    /// let container = Container::new();
    /// container.add_facaded("mailer", Binding::value("smtp"));
    /// container.alias_facaded(["postman"], "mailer");
    ///
    /// assert_eq!(*container.facade_as::<&str>("mailer").unwrap(), "smtp");
    /// assert_eq!(*container.facade_as::<&str>("postman").unwrap(), "smtp");
    /// ```
    pub fn add_facaded(&self, name: impl Into<Cow<'static, str>>, binding: impl Into<Binding>) -> &Self {
        let name = name.into();
        self.add_facade(name.clone(), Key::Name(name.clone()));
        self.add(Key::Name(name), binding)
    }

    /// [`share`](Self::share) under `name`, plus a facade of the same name.
    pub fn share_facaded(&self, name: impl Into<Cow<'static, str>>, binding: impl Into<Binding>) -> &Self {
        let name = name.into();
        self.add_facade(name.clone(), Key::Name(name.clone()));
        self.share(Key::Name(name), binding)
    }

    /// [`alias_many`](Self::alias_many), plus a facade per alias that
    /// resolves `target` directly.
    pub fn alias_facaded<N>(&self, aliases: impl IntoIterator<Item = N>, target: impl Into<Key>) -> &Self
    where
        N: Into<Cow<'static, str>>,
    {
        let target = target.into();
        let names: Vec<Cow<'static, str>> = aliases.into_iter().map(Into::into).collect();
        self.add_facades(names.iter().map(|name| (name.clone(), Facade::Key(target.clone()))));
        self.alias_many(names.into_iter().map(Key::Name), target)
    }

    pub fn has_facade(&self, name: &str) -> bool {
        self.inner().facades.read().contains_key(name)
    }

    /// Resolves the facade `name`.
    pub fn facade(&self, name: &str) -> DiResult<AnyArc> {
        let facade = self
            .inner()
            .facades
            .read()
            .get(name)
            .cloned()
            .ok_or_else(|| DiError::UndefinedFacade(name.to_string()))?;

        match facade {
            Facade::Key(key) => self.get_any(key),
            Facade::Callable(callable) => self.call(&callable, &Arguments::new()),
        }
    }

    pub fn facade_as<T: Any + Send + Sync>(&self, name: &str) -> DiResult<Arc<T>> {
        downcast(self.facade(name)?)
    }
}
