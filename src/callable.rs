//! Callables, explicit arguments and resolved argument lists.

use std::any::Any;
use std::borrow::Cow;
use std::fmt;
use std::sync::Arc;

use smallvec::SmallVec;

use crate::internal::{new_map, AnyArc, Map};
use crate::signature::{Injectable, Parameter, Signature};
use crate::{Container, DiError, DiResult};

pub(crate) fn downcast<T: Any + Send + Sync>(value: AnyArc) -> DiResult<Arc<T>> {
    value
        .downcast::<T>()
        .map_err(|_| DiError::TypeMismatch(std::any::type_name::<T>()))
}

// Interface values are stored as Arc<Arc<dyn Trait>>
pub(crate) fn downcast_interface<I: ?Sized + Send + Sync + 'static>(value: AnyArc) -> DiResult<Arc<I>> {
    value
        .downcast::<Arc<I>>()
        .map(|outer| (*outer).clone())
        .map_err(|_| DiError::TypeMismatch(std::any::type_name::<I>()))
}

/// Explicit arguments, matched against parameters by name.
///
/// An explicit argument always wins over container resolution and is passed
/// through verbatim.
///
/// # Examples
///
/// ```rust
/// use ferrous_container::Arguments;
///
/// let args = Arguments::new().with("foo", "bar".to_string()).with("retries", 3u32);
/// assert!(args.contains("foo"));
/// assert_eq!(args.len(), 2);
/// ```
#[derive(Debug, Clone, Default)]
pub struct Arguments {
    values: Map<Cow<'static, str>, AnyArc>,
}

impl Arguments {
    pub fn new() -> Self {
        Self { values: new_map() }
    }

    pub fn with<T: Any + Send + Sync>(self, name: impl Into<Cow<'static, str>>, value: T) -> Self {
        self.with_any(name, Arc::new(value))
    }

    pub fn with_any(mut self, name: impl Into<Cow<'static, str>>, value: AnyArc) -> Self {
        self.insert(name, value);
        self
    }

    pub fn insert(&mut self, name: impl Into<Cow<'static, str>>, value: AnyArc) {
        self.values.insert(name.into(), value);
    }

    pub fn get(&self, name: &str) -> Option<&AnyArc> {
        self.values.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.values.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

/// Parameters after resolution, in signature order.
#[derive(Debug, Clone, Default)]
pub struct ResolvedArgs {
    values: SmallVec<[(Cow<'static, str>, AnyArc); 4]>,
}

impl ResolvedArgs {
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn push(&mut self, name: Cow<'static, str>, value: AnyArc) {
        self.values.push((name, value));
    }

    /// Typed value of the named parameter.
    pub fn get<T: Any + Send + Sync>(&self, name: &str) -> DiResult<Arc<T>> {
        downcast(self.get_any(name)?)
    }

    /// Trait object value of the named parameter.
    pub fn interface<I: ?Sized + Send + Sync + 'static>(&self, name: &str) -> DiResult<Arc<I>> {
        downcast_interface(self.get_any(name)?)
    }

    pub fn get_any(&self, name: &str) -> DiResult<AnyArc> {
        self.values
            .iter()
            .find(|(param, _)| param == name)
            .map(|(_, value)| value.clone())
            .ok_or_else(|| DiError::MissingArgument(name.to_string()))
    }

    /// Typed value by position.
    pub fn at<T: Any + Send + Sync>(&self, index: usize) -> DiResult<Arc<T>> {
        let value = self
            .values
            .get(index)
            .map(|(_, value)| value.clone())
            .ok_or_else(|| DiError::MissingArgument(format!("#{}", index)))?;
        downcast(value)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.values.iter().map(|(name, _)| name.as_ref())
    }
}

/// Anything the container can invoke after resolving its parameters.
///
/// Implement this for "invocable objects"; closures go through [`Callable`].
///
/// # Examples
///
/// ```rust
/// use ferrous_container::{AnyArc, Container, DiResult, Invocable, Parameter, ResolvedArgs, Signature, Arguments};
/// use std::borrow::Cow;
/// use std::sync::Arc;
///
/// struct Greeter;
///
/// impl Invocable for Greeter {
///     fn signature(&self) -> Cow<'_, Signature> {
///         Cow::Owned(Signature::new().with(Parameter::new("name")))
///     }
///
///     fn invoke(&self, _container: &Container, args: ResolvedArgs) -> DiResult<AnyArc> {
///         let name = args.get::<String>("name")?;
///         Ok(Arc::new(format!("hello {}", name)))
///     }
/// }
///
/// let container = Container::new();
/// container.add_value("name", "world".to_string());
/// let greeting = container.call_as::<String>(&Greeter, &Arguments::new()).unwrap();
/// assert_eq!(greeting.as_str(), "hello world");
/// ```
pub trait Invocable: Send + Sync {
    fn signature(&self) -> Cow<'_, Signature>;

    fn invoke(&self, container: &Container, args: ResolvedArgs) -> DiResult<AnyArc>;
}

type Body = dyn Fn(&Container, ResolvedArgs) -> DiResult<AnyArc> + Send + Sync;

/// A closure paired with its declared parameter list.
///
/// Parameters are appended in order with the builder methods; the closure
/// receives them resolved.
///
/// # Examples
///
/// ```rust
/// use ferrous_container::{Arguments, Callable, Container};
///
/// let container = Container::new();
/// container.add_value("greeting", "hello".to_string());
///
/// let shout = Callable::new(|args| {
///     let greeting = args.get::<String>("greeting")?;
///     let target = args.get::<String>("target")?;
///     Ok(format!("{} {}!", greeting, target))
/// })
/// .param("greeting")
/// .default("target", "world".to_string());
///
/// let result = container.call_as::<String>(&shout, &Arguments::new()).unwrap();
/// assert_eq!(result.as_str(), "hello world!");
///
/// let args = Arguments::new().with("target", "rust".to_string());
/// let result = container.call_as::<String>(&shout, &args).unwrap();
/// assert_eq!(result.as_str(), "hello rust!");
/// ```
#[derive(Clone)]
pub struct Callable {
    signature: Signature,
    body: Arc<Body>,
}

impl Callable {
    /// Closure over resolved arguments; starts with an empty signature.
    pub fn new<T, F>(f: F) -> Self
    where
        T: Any + Send + Sync,
        F: Fn(ResolvedArgs) -> DiResult<T> + Send + Sync + 'static,
    {
        Self::from_any(move |_, args| f(args).map(|value| Arc::new(value) as AnyArc))
    }

    /// Closure handed the container itself instead of resolved arguments.
    pub fn with_container<T, F>(f: F) -> Self
    where
        T: Any + Send + Sync,
        F: Fn(&Container) -> DiResult<T> + Send + Sync + 'static,
    {
        Self::from_any(move |container, _| f(container).map(|value| Arc::new(value) as AnyArc))
    }

    /// Raw form: the closure returns an already type-erased value.
    pub fn from_any<F>(f: F) -> Self
    where
        F: Fn(&Container, ResolvedArgs) -> DiResult<AnyArc> + Send + Sync + 'static,
    {
        Self {
            signature: Signature::new(),
            body: Arc::new(f),
        }
    }

    pub fn from_invocable<I: Invocable + 'static>(invocable: I) -> Self {
        let signature = invocable.signature().into_owned();
        let mut callable = Self::from_any(move |container, args| invocable.invoke(container, args));
        callable.signature = signature;
        callable
    }

    pub fn parameter(mut self, parameter: Parameter) -> Self {
        self.signature.push(parameter);
        self
    }

    /// Untyped parameter, resolved by name.
    pub fn param(self, name: impl Into<Cow<'static, str>>) -> Self {
        self.parameter(Parameter::new(name))
    }

    /// Untyped parameter with a fallback value.
    pub fn default<T: Any + Send + Sync>(self, name: impl Into<Cow<'static, str>>, value: T) -> Self {
        self.parameter(Parameter::new(name).with_default(value))
    }

    pub fn class<T: Injectable>(self, name: impl Into<Cow<'static, str>>) -> Self {
        self.parameter(Parameter::class::<T>(name))
    }

    pub fn typed<T: 'static>(self, name: impl Into<Cow<'static, str>>) -> Self {
        self.parameter(Parameter::typed::<T>(name))
    }

    pub fn interface<I: ?Sized + 'static>(self, name: impl Into<Cow<'static, str>>) -> Self {
        self.parameter(Parameter::interface::<I>(name))
    }

    pub fn signature(&self) -> &Signature {
        &self.signature
    }
}

impl Invocable for Callable {
    fn signature(&self) -> Cow<'_, Signature> {
        Cow::Borrowed(&self.signature)
    }

    fn invoke(&self, container: &Container, args: ResolvedArgs) -> DiResult<AnyArc> {
        (self.body)(container, args)
    }
}

impl fmt::Debug for Callable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Callable")
            .field("signature", &self.signature)
            .finish_non_exhaustive()
    }
}
