//! Named extension functions callable on the container.

use std::any::Any;
use std::borrow::Cow;
use std::sync::Arc;

use crate::callable::downcast;
use crate::internal::AnyArc;
use crate::{Container, DiError, DiResult};

/// A macro body: receives the container and positional arguments.
pub type MacroFn = Arc<dyn Fn(&Container, &[AnyArc]) -> DiResult<AnyArc> + Send + Sync>;

/// Wraps a closure as a [`MacroFn`].
pub fn macro_fn<F>(f: F) -> MacroFn
where
    F: Fn(&Container, &[AnyArc]) -> DiResult<AnyArc> + Send + Sync + 'static,
{
    Arc::new(f)
}

/// A bundle of macros registered together with [`Container::mixin`].
///
/// # Examples
///
/// ```
/// use ferrous_container::{macro_fn, AnyArc, Container, MacroFn, Mixin};
/// use std::borrow::Cow;
/// use std::sync::Arc;
///
/// struct Strings;
///
/// impl Mixin for Strings {
///     fn macros(&self) -> Vec<(Cow<'static, str>, MacroFn)> {
///         vec![(
///             Cow::Borrowed("shout"),
///             macro_fn(|_, args| {
///                 let word = args[0].clone().downcast::<String>().map_err(|_| {
///                     ferrous_container::DiError::TypeMismatch("String")
///                 })?;
///                 Ok(Arc::new(word.to_uppercase()) as AnyArc)
///             }),
///         )]
///     }
/// }
///
/// let container = Container::new();
/// container.mixin(&Strings, true);
///
/// let args: Vec<AnyArc> = vec![Arc::new("hey".to_string())];
/// let loud = container.call_macro_as::<String>("shout", &args).unwrap();
/// assert_eq!(loud.as_str(), "HEY");
/// ```
pub trait Mixin {
    fn macros(&self) -> Vec<(Cow<'static, str>, MacroFn)>;
}

impl Container {
    /// Registers `f` under `name`, replacing any previous macro.
    pub fn add_macro<F>(&self, name: impl Into<Cow<'static, str>>, f: F) -> &Self
    where
        F: Fn(&Container, &[AnyArc]) -> DiResult<AnyArc> + Send + Sync + 'static,
    {
        self.inner().macros.write().insert(name.into(), Arc::new(f));
        self
    }

    /// True for registered macros and for macros a deferred provider declares.
    pub fn has_macro(&self, name: &str) -> bool {
        self.inner().macros.read().contains_key(name) || self.is_deferred_macro(name)
    }

    /// Calls the macro `name`, promoting its deferred provider on a miss.
    pub fn call_macro(&self, name: &str, args: &[AnyArc]) -> DiResult<AnyArc> {
        if !self.inner().macros.read().contains_key(name) {
            self.promote_deferred_macro(name)?;
        }

        let body = self
            .inner()
            .macros
            .read()
            .get(name)
            .cloned()
            .ok_or_else(|| DiError::UndefinedMacro(name.to_string()))?;
        tracing::trace!(name, "calling macro");
        body(self, args)
    }

    pub fn call_macro_as<T: Any + Send + Sync>(&self, name: &str, args: &[AnyArc]) -> DiResult<Arc<T>> {
        downcast(self.call_macro(name, args)?)
    }

    /// Registers every macro `source` exposes; existing ones survive unless `overwrite`.
    pub fn mixin(&self, source: &dyn Mixin, overwrite: bool) -> &Self {
        let macros = source.macros();
        let mut table = self.inner().macros.write();
        for (name, body) in macros {
            if overwrite || !table.contains_key(&name) {
                table.insert(name, body);
            }
        }
        drop(table);
        self
    }
}
