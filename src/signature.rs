//! Parameter signatures for factories, classes and invocables.
//!
//! Rust has no runtime reflection, so every constructible thing declares its
//! parameters up front. The resolver reads these descriptors in order and
//! resolves each one against the container.

use std::any::{Any, TypeId};
use std::borrow::Cow;
use std::fmt;
use std::sync::Arc;

use smallvec::SmallVec;

use crate::callable::ResolvedArgs;
use crate::internal::AnyArc;
use crate::{DiResult, Key};

/// Declared type of a parameter.
///
/// When no explicit argument is supplied, the declared type is used as the
/// lookup key. A `Class` hint additionally knows how to build the type, so an
/// unbound class parameter is constructed on the fly.
#[derive(Debug, Clone, Copy)]
pub enum TypeHint {
    /// Constructible class
    Class(ClassInfo),
    /// Concrete type that must be bound (or registered as a class)
    Type(TypeId, &'static str),
    /// Trait object; only resolvable through a binding
    Interface(&'static str),
}

impl TypeHint {
    /// Key used to look the parameter up.
    pub fn key(&self) -> Key {
        match self {
            TypeHint::Class(info) => info.key(),
            TypeHint::Type(id, name) => Key::Type(*id, name),
            TypeHint::Interface(name) => Key::Interface(name),
        }
    }

    pub fn class(&self) -> Option<&ClassInfo> {
        match self {
            TypeHint::Class(info) => Some(info),
            _ => None,
        }
    }
}

/// A single parameter descriptor: name, optional declared type, optional default.
#[derive(Debug, Clone)]
pub struct Parameter {
    name: Cow<'static, str>,
    hint: Option<TypeHint>,
    default: Option<AnyArc>,
}

impl Parameter {
    /// Untyped parameter, resolved by its own name.
    pub fn new(name: impl Into<Cow<'static, str>>) -> Self {
        Self {
            name: name.into(),
            hint: None,
            default: None,
        }
    }

    /// Parameter declaring a constructible class.
    pub fn class<T: Injectable>(name: impl Into<Cow<'static, str>>) -> Self {
        Self::hinted(name, TypeHint::Class(ClassInfo::of::<T>()))
    }

    /// Parameter declaring a class without a constructor (built from `Default`).
    pub fn bare_class<T: Default + Send + Sync + 'static>(name: impl Into<Cow<'static, str>>) -> Self {
        Self::hinted(name, TypeHint::Class(ClassInfo::bare::<T>()))
    }

    /// Parameter declaring a concrete type that is expected to be bound.
    pub fn typed<T: 'static>(name: impl Into<Cow<'static, str>>) -> Self {
        Self::hinted(
            name,
            TypeHint::Type(TypeId::of::<T>(), std::any::type_name::<T>()),
        )
    }

    /// Parameter declaring a trait object (`Parameter::interface::<dyn Logger>("logger")`).
    pub fn interface<I: ?Sized + 'static>(name: impl Into<Cow<'static, str>>) -> Self {
        Self::hinted(name, TypeHint::Interface(std::any::type_name::<I>()))
    }

    fn hinted(name: impl Into<Cow<'static, str>>, hint: TypeHint) -> Self {
        Self {
            name: name.into(),
            hint: Some(hint),
            default: None,
        }
    }

    /// Value substituted when resolution of this parameter fails.
    pub fn with_default<T: Any + Send + Sync>(self, value: T) -> Self {
        self.with_default_any(Arc::new(value))
    }

    pub fn with_default_any(mut self, value: AnyArc) -> Self {
        self.default = Some(value);
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub(crate) fn owned_name(&self) -> Cow<'static, str> {
        self.name.clone()
    }

    pub fn type_hint(&self) -> Option<&TypeHint> {
        self.hint.as_ref()
    }

    pub fn default_value(&self) -> Option<&AnyArc> {
        self.default.as_ref()
    }

    pub fn has_default(&self) -> bool {
        self.default.is_some()
    }

    /// The declared type's key, or the parameter name when untyped.
    pub fn lookup_key(&self) -> Key {
        match &self.hint {
            Some(hint) => hint.key(),
            None => Key::Name(self.name.clone()),
        }
    }
}

/// Ordered parameter list of a constructor or callable.
///
/// # Examples
///
/// ```rust
/// use ferrous_container::{Parameter, Signature};
///
/// struct Mailer;
///
/// let signature = Signature::new()
///     .with(Parameter::typed::<Mailer>("mailer"))
///     .with(Parameter::new("retries").with_default(3u32));
///
/// assert_eq!(signature.len(), 2);
/// assert_eq!(signature.names().collect::<Vec<_>>(), ["mailer", "retries"]);
/// assert!(signature.get(1).unwrap().has_default());
/// ```
#[derive(Debug, Clone, Default)]
pub struct Signature {
    params: SmallVec<[Parameter; 4]>,
}

impl Signature {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a parameter, builder style.
    pub fn with(mut self, parameter: Parameter) -> Self {
        self.params.push(parameter);
        self
    }

    pub fn push(&mut self, parameter: Parameter) {
        self.params.push(parameter);
    }

    pub fn len(&self) -> usize {
        self.params.len()
    }

    pub fn is_empty(&self) -> bool {
        self.params.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Parameter> {
        self.params.get(index)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Parameter> {
        self.params.iter()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.params.iter().map(Parameter::name)
    }
}

impl FromIterator<Parameter> for Signature {
    fn from_iter<I: IntoIterator<Item = Parameter>>(iter: I) -> Self {
        Self {
            params: iter.into_iter().collect(),
        }
    }
}

impl<'a> IntoIterator for &'a Signature {
    type Item = &'a Parameter;
    type IntoIter = std::slice::Iter<'a, Parameter>;

    fn into_iter(self) -> Self::IntoIter {
        self.params.iter()
    }
}

/// A type the container can construct on its own.
///
/// The signature describes the constructor's parameters; `construct` receives
/// them resolved, in the same order.
///
/// # Examples
///
/// ```rust
/// use ferrous_container::{Container, DiResult, Injectable, Parameter, ResolvedArgs, Signature};
/// use std::sync::Arc;
///
/// #[derive(Default)]
/// struct Config;
///
/// struct Repository {
///     config: Arc<Config>,
///     table: Arc<String>,
/// }
///
/// impl Injectable for Repository {
///     fn signature() -> Signature {
///         Signature::new()
///             .with(Parameter::bare_class::<Config>("config"))
///             .with(Parameter::new("table").with_default("users".to_string()))
///     }
///
///     fn construct(args: ResolvedArgs) -> DiResult<Self> {
///         Ok(Self { config: args.get("config")?, table: args.get("table")? })
///     }
/// }
///
/// let container = Container::new();
/// let repository = container.make::<Repository>().unwrap();
/// assert_eq!(repository.table.as_str(), "users");
/// ```
pub trait Injectable: Send + Sync + Sized + 'static {
    /// Constructor parameters; empty means "instantiate directly".
    fn signature() -> Signature {
        Signature::new()
    }

    /// Builds the value from resolved constructor arguments.
    fn construct(args: ResolvedArgs) -> DiResult<Self>;
}

#[derive(Clone, Copy)]
enum Constructor {
    Absent(fn() -> AnyArc),
    Declared {
        signature: fn() -> Signature,
        construct: fn(ResolvedArgs) -> DiResult<AnyArc>,
    },
}

/// Result of inspecting a class constructor.
#[derive(Debug, Clone)]
pub enum Inspection {
    /// No constructor, or one without parameters
    Direct,
    /// Constructor parameters that must be resolved first
    Parameters(Signature),
}

/// Construction recipe of a class type.
#[derive(Clone, Copy)]
pub struct ClassInfo {
    type_id: TypeId,
    name: &'static str,
    constructor: Constructor,
}

fn construct_erased<T: Injectable>(args: ResolvedArgs) -> DiResult<AnyArc> {
    T::construct(args).map(|value| Arc::new(value) as AnyArc)
}

fn default_erased<T: Default + Send + Sync + 'static>() -> AnyArc {
    Arc::new(T::default())
}

impl ClassInfo {
    /// Class with a declared constructor.
    pub fn of<T: Injectable>() -> Self {
        Self {
            type_id: TypeId::of::<T>(),
            name: std::any::type_name::<T>(),
            constructor: Constructor::Declared {
                signature: T::signature,
                construct: construct_erased::<T>,
            },
        }
    }

    /// Class without a constructor.
    pub fn bare<T: Default + Send + Sync + 'static>() -> Self {
        Self {
            type_id: TypeId::of::<T>(),
            name: std::any::type_name::<T>(),
            constructor: Constructor::Absent(default_erased::<T>),
        }
    }

    pub fn key(&self) -> Key {
        Key::Type(self.type_id, self.name)
    }

    pub fn type_id(&self) -> TypeId {
        self.type_id
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Distinguishes direct instantiation from the full resolution path.
    pub fn inspect(&self) -> Inspection {
        match self.constructor {
            Constructor::Absent(_) => Inspection::Direct,
            Constructor::Declared { signature, .. } => {
                let signature = signature();
                if signature.is_empty() {
                    Inspection::Direct
                } else {
                    Inspection::Parameters(signature)
                }
            }
        }
    }

    pub(crate) fn instantiate(&self, args: ResolvedArgs) -> DiResult<AnyArc> {
        match self.constructor {
            Constructor::Absent(make) => Ok(make()),
            Constructor::Declared { construct, .. } => construct(args),
        }
    }
}

impl fmt::Debug for ClassInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let constructor = match self.constructor {
            Constructor::Absent(_) => "absent",
            Constructor::Declared { .. } => "declared",
        };
        f.debug_struct("ClassInfo")
            .field("name", &self.name)
            .field("constructor", &constructor)
            .finish()
    }
}
