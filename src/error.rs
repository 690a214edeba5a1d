//! Error types for the dependency injection container.

use std::sync::Arc;

/// Dependency injection errors
///
/// Two kinds matter to the resolution engine: the "not found" family
/// ([`DiError::NotFound`] and [`DiError::UnboundInterface`]), which the service
/// bootstrap layer intercepts to promote deferred providers, and
/// [`DiError::BindingResolution`], which wraps any failure raised while a
/// factory was invoked or a class was instantiated.
///
/// # Examples
///
/// ```rust
/// use ferrous_container::{Container, DiError};
///
/// let container = Container::new();
/// match container.get_any("nonexistent.key") {
///     Err(DiError::NotFound(key)) => {
///         assert_eq!(key, "nonexistent.key");
///     }
///     _ => unreachable!(),
/// }
/// ```
///
/// ```rust
/// use ferrous_container::DiError;
///
/// let not_found = DiError::NotFound("baz".to_string());
/// assert_eq!(not_found.to_string(), "baz is not managed by the container.");
///
/// let wrapped = DiError::binding_resolution("closure", not_found);
/// assert_eq!(wrapped.to_string(), "Failed to resolve closure from the container.");
/// assert!(!wrapped.is_not_found());
/// ```
#[derive(Debug, Clone, thiserror::Error)]
pub enum DiError {
    /// Key is neither bound, aliased, delegate-visible nor constructible
    #[error("{0} is not managed by the container.")]
    NotFound(String),
    /// Interface requested without any binding for it
    #[error("Failed to resolve interface {0}.")]
    UnboundInterface(&'static str),
    /// Invoking a factory or instantiating a class failed
    #[error("Failed to resolve {key} from the container.")]
    BindingResolution {
        key: String,
        #[source]
        source: Box<DiError>,
    },
    /// Type downcast failed
    #[error("Type mismatch for: {0}")]
    TypeMismatch(&'static str),
    /// A resolved argument list has no parameter with this name
    #[error("Missing argument: {0}")]
    MissingArgument(String),
    /// Provider reference does not point at a service provider
    #[error("{0} is not a valid service provider")]
    InvalidProvider(String),
    /// Facade accessed without being defined
    #[error("Facade {0} is not defined.")]
    UndefinedFacade(String),
    /// Macro called without being defined
    #[error("Call to undefined macro {0}().")]
    UndefinedMacro(String),
    /// Failure raised by user code (factories, constructors, providers)
    #[error(transparent)]
    Custom(Arc<dyn std::error::Error + Send + Sync + 'static>),
}

impl DiError {
    /// Wraps `source` as the cause of a failed resolution of `key`.
    pub fn binding_resolution(key: impl Into<String>, source: DiError) -> Self {
        DiError::BindingResolution {
            key: key.into(),
            source: Box::new(source),
        }
    }

    /// Wraps an arbitrary error raised by user code.
    ///
    /// ```rust
    /// use ferrous_container::DiError;
    ///
    /// let err = DiError::custom("database unreachable");
    /// assert_eq!(err.to_string(), "database unreachable");
    /// ```
    pub fn custom(error: impl Into<Box<dyn std::error::Error + Send + Sync + 'static>>) -> Self {
        DiError::Custom(Arc::from(error.into()))
    }

    /// True for the errors a deferred provider may still satisfy.
    pub fn is_not_found(&self) -> bool {
        matches!(self, DiError::NotFound(_) | DiError::UnboundInterface(_))
    }

    /// Walks `BindingResolution` wrappers down to the original failure.
    pub fn root_cause(&self) -> &DiError {
        match self {
            DiError::BindingResolution { source, .. } => source.root_cause(),
            other => other,
        }
    }
}

/// Result type for DI operations
///
/// A convenience alias for `Result<T, DiError>` used throughout the crate.
pub type DiResult<T> = Result<T, DiError>;
