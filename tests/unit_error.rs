/// Unit tests for DiError
///
/// Display strings, classification helpers and source chains.

use ferrous_container::DiError;
use std::error::Error;

#[test]
fn test_not_found_display() {
    let err = DiError::NotFound("baz".to_string());
    assert_eq!(err.to_string(), "baz is not managed by the container.");
}

#[test]
fn test_unbound_interface_display() {
    let err = DiError::UnboundInterface("dyn app::Logger");
    assert_eq!(err.to_string(), "Failed to resolve interface dyn app::Logger.");
}

#[test]
fn test_binding_resolution_display() {
    let err = DiError::binding_resolution("app::Mailer", DiError::NotFound("smtp.host".to_string()));
    assert_eq!(err.to_string(), "Failed to resolve app::Mailer from the container.");
}

#[test]
fn test_provider_facade_and_macro_display() {
    assert_eq!(
        DiError::InvalidProvider("providers.cache".to_string()).to_string(),
        "providers.cache is not a valid service provider"
    );
    assert_eq!(
        DiError::UndefinedFacade("Cache".to_string()).to_string(),
        "Facade Cache is not defined."
    );
    assert_eq!(
        DiError::UndefinedMacro("shout".to_string()).to_string(),
        "Call to undefined macro shout()."
    );
}

#[test]
fn test_argument_errors_display() {
    assert_eq!(DiError::TypeMismatch("u32").to_string(), "Type mismatch for: u32");
    assert_eq!(
        DiError::MissingArgument("url".to_string()).to_string(),
        "Missing argument: url"
    );
}

#[test]
fn test_custom_is_transparent() {
    let io = std::io::Error::new(std::io::ErrorKind::NotFound, "config.json missing");
    let err = DiError::custom(io);
    assert_eq!(err.to_string(), "config.json missing");
}

#[test]
fn test_is_not_found() {
    assert!(DiError::NotFound("a".to_string()).is_not_found());
    assert!(DiError::UnboundInterface("dyn A").is_not_found());

    let wrapped = DiError::binding_resolution("b", DiError::NotFound("a".to_string()));
    assert!(!wrapped.is_not_found());
    assert!(!DiError::UndefinedFacade("F".to_string()).is_not_found());
}

#[test]
fn test_source_chain() {
    let inner = DiError::NotFound("db.url".to_string());
    let middle = DiError::binding_resolution("app::Database", inner);
    let outer = DiError::binding_resolution("app::Repository", middle);

    let source = outer.source().expect("outer has a source");
    assert_eq!(source.to_string(), "Failed to resolve app::Database from the container.");
    assert!(matches!(outer.root_cause(), DiError::NotFound(key) if key == "db.url"));
}

#[test]
fn test_root_cause_of_unwrapped_error_is_itself() {
    let err = DiError::UndefinedMacro("m".to_string());
    assert!(matches!(err.root_cause(), DiError::UndefinedMacro(_)));
}

#[test]
fn test_errors_are_cloneable() {
    let err = DiError::custom("boom");
    let copy = err.clone();
    assert_eq!(err.to_string(), copy.to_string());
}
