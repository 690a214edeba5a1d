/// Core binding and resolution behavior
///
/// Values, factories, classes, explicit arguments, defaults and the error
/// messages reported when something cannot be resolved.

use ferrous_container::{
    AnyArc, Arguments, Binding, BindingKind, Callable, Container, DiError, DiResult, Injectable,
    Invocable, Key, Parameter, ResolvedArgs, Signature,
};
use std::borrow::Cow;
use std::sync::Arc;

// ===== Fixtures =====

#[derive(Debug, Default)]
struct WithoutConstructor;

#[derive(Debug)]
struct WithZeroParams;

impl Injectable for WithZeroParams {
    fn construct(_args: ResolvedArgs) -> DiResult<Self> {
        Ok(WithZeroParams)
    }
}

#[derive(Debug)]
struct WithTwoParams {
    _bare: Arc<WithoutConstructor>,
    _zero: Arc<WithZeroParams>,
}

impl Injectable for WithTwoParams {
    fn signature() -> Signature {
        Signature::new()
            .with(Parameter::bare_class::<WithoutConstructor>("bare"))
            .with(Parameter::class::<WithZeroParams>("zero"))
    }

    fn construct(args: ResolvedArgs) -> DiResult<Self> {
        Ok(Self {
            _bare: args.get("bare")?,
            _zero: args.get("zero")?,
        })
    }
}

#[derive(Debug)]
struct Foobar {
    foo: Arc<String>,
}

impl Injectable for Foobar {
    fn signature() -> Signature {
        Signature::new().with(Parameter::new("foo"))
    }

    fn construct(args: ResolvedArgs) -> DiResult<Self> {
        Ok(Self { foo: args.get("foo")? })
    }
}

#[derive(Debug)]
struct WithManagedParams {
    foobar: Arc<Foobar>,
}

impl Injectable for WithManagedParams {
    fn signature() -> Signature {
        Signature::new().with(Parameter::class::<Foobar>("foobar"))
    }

    fn construct(args: ResolvedArgs) -> DiResult<Self> {
        Ok(Self { foobar: args.get("foobar")? })
    }
}

#[derive(Debug)]
struct WithOptionalParams {
    a: Arc<String>,
}

impl Injectable for WithOptionalParams {
    fn signature() -> Signature {
        Signature::new().with(Parameter::new("a").with_default("b".to_string()))
    }

    fn construct(args: ResolvedArgs) -> DiResult<Self> {
        Ok(Self { a: args.get("a")? })
    }
}

#[derive(Debug)]
struct MixedParams {
    foo: Arc<String>,
}

impl Injectable for MixedParams {
    fn signature() -> Signature {
        Signature::new()
            .with(Parameter::class::<WithTwoParams>("w2"))
            .with(Parameter::new("foo"))
    }

    fn construct(args: ResolvedArgs) -> DiResult<Self> {
        args.get::<WithTwoParams>("w2")?;
        Ok(Self { foo: args.get("foo")? })
    }
}

trait Contract: Send + Sync {
    fn id(&self) -> &'static str;
}

#[derive(Debug, Default)]
struct Concrete;

impl Contract for Concrete {
    fn id(&self) -> &'static str {
        "concrete"
    }
}

struct ContractParam {
    contract: Arc<dyn Contract>,
}

impl Injectable for ContractParam {
    fn signature() -> Signature {
        Signature::new().with(Parameter::interface::<dyn Contract>("contract"))
    }

    fn construct(args: ResolvedArgs) -> DiResult<Self> {
        Ok(Self {
            contract: args.interface("contract")?,
        })
    }
}

struct InvocableWithParams;

impl Invocable for InvocableWithParams {
    fn signature(&self) -> Cow<'_, Signature> {
        Cow::Owned(Signature::new().with(Parameter::class::<WithTwoParams>("w2")))
    }

    fn invoke(&self, _container: &Container, args: ResolvedArgs) -> DiResult<AnyArc> {
        args.get::<WithTwoParams>("w2")?;
        Ok(Arc::new("invoke + params"))
    }
}

fn same_object<T: ?Sized>(a: &Arc<T>, b: &Arc<T>) -> bool {
    Arc::as_ptr(a) as *const () == Arc::as_ptr(b) as *const ()
}

// ===== Bindings =====

#[test]
fn test_adds_and_retrieves_a_value() {
    let container = Container::new();
    container.add("foo", Binding::value("bar"));

    assert_eq!(*container.get::<&str>("foo").unwrap(), "bar");
    assert!(container.has("foo"));
    assert!(!container.has("bar"));
}

#[test]
fn test_value_is_never_invoked() {
    let container = Container::new();
    let invocable = Arc::new(InvocableWithParams);
    container.add("invocable", Binding::value(invocable.clone()));

    let first = container.get::<Arc<InvocableWithParams>>("invocable").unwrap();
    let second = container.get::<Arc<InvocableWithParams>>("invocable").unwrap();
    assert!(Arc::ptr_eq(&first, &second));
    assert!(Arc::ptr_eq(&*first, &invocable));
}

#[test]
fn test_resolves_a_closure() {
    let container = Container::new();
    container.add("closure", Callable::new(|_| Ok("b")));
    assert_eq!(*container.get::<&str>("closure").unwrap(), "b");

    container.add(
        Key::of::<Foobar>(),
        Callable::new(|_| Ok(Foobar { foo: Arc::new("baz".to_string()) })),
    );
    assert_eq!(container.get::<Foobar>(Key::of::<Foobar>()).unwrap().foo.as_str(), "baz");
}

#[test]
fn test_resolves_a_closure_with_class_params() {
    let container = Container::new();
    container.add(
        "closure",
        Callable::new(|args| {
            args.get::<WithTwoParams>("w2")?;
            Ok("foobar")
        })
        .class::<WithTwoParams>("w2"),
    );

    assert_eq!(*container.get::<&str>("closure").unwrap(), "foobar");
}

#[test]
fn test_closure_can_use_the_container() {
    let container = Container::new();
    container.add("base", Binding::value(20u32));
    container.add(
        "derived",
        Callable::with_container(|c| Ok(*c.get::<u32>("base")? + 1)),
    );

    assert_eq!(*container.get::<u32>("derived").unwrap(), 21);
}

#[test]
fn test_type_mismatch_is_reported() {
    let container = Container::new();
    container.add("foo", Binding::value(1u8));

    let err = container.get::<String>("foo").unwrap_err();
    assert!(matches!(err, DiError::TypeMismatch(_)));
}

// ===== Classes =====

#[test]
fn test_makes_unbound_classes() {
    let container = Container::new();

    assert!(container.make::<WithZeroParams>().is_ok());
    assert!(container.make::<WithTwoParams>().is_ok());
}

#[test]
fn test_class_params_can_be_managed() {
    let container = Container::new();
    container.add("foo", Binding::value("bar".to_string()));

    assert_eq!(container.make::<Foobar>().unwrap().foo.as_str(), "bar");
    let managed = container.make::<WithManagedParams>().unwrap();
    assert_eq!(managed.foobar.foo.as_str(), "bar");
}

#[test]
fn test_optional_params_fall_back_to_default() {
    let container = Container::new();
    assert_eq!(container.make::<WithOptionalParams>().unwrap().a.as_str(), "b");

    container.add("a", Binding::value("c".to_string()));
    assert_eq!(container.make::<WithOptionalParams>().unwrap().a.as_str(), "c");
}

#[test]
fn test_registered_class_resolves_by_type_key() {
    let container = Container::new();
    let key = Key::of::<WithTwoParams>();

    assert!(matches!(container.get_any(key.clone()), Err(DiError::NotFound(_))));
    assert!(!container.is_class(key.clone()));

    container.register_class::<WithTwoParams>();
    assert!(container.is_class(key.clone()));
    assert!(container.get::<WithTwoParams>(key).is_ok());
}

#[test]
fn test_class_bindings_respect_lifetime() {
    let container = Container::new();
    let key = Key::of::<WithZeroParams>();

    container.add(key.clone(), Binding::class::<WithZeroParams>());
    let a = container.get::<WithZeroParams>(key.clone()).unwrap();
    let b = container.get::<WithZeroParams>(key.clone()).unwrap();
    assert!(!Arc::ptr_eq(&a, &b));
    assert!(container.is_class(key.clone()));

    container.share(key.clone(), Binding::class::<WithZeroParams>());
    let a = container.get::<WithZeroParams>(key.clone()).unwrap();
    let b = container.get::<WithZeroParams>(key).unwrap();
    assert!(Arc::ptr_eq(&a, &b));
}

#[test]
fn test_resolves_an_interface() {
    let container = Container::new();
    container.register_bare_class::<Concrete>();

    let concrete: Arc<dyn Contract> = container.get::<Concrete>(Key::of::<Concrete>()).unwrap();
    container.add(
        Key::interface::<dyn Contract>(),
        Binding::interface::<dyn Contract>(concrete),
    );

    let param = container.make::<ContractParam>().unwrap();
    assert_eq!(param.contract.id(), "concrete");
}

#[test]
fn test_shared_interfaces() {
    let container = Container::new();
    container.register_bare_class::<Concrete>();
    let key = Key::interface::<dyn Contract>();

    let factory = || {
        Callable::with_container(|c| {
            let concrete: Arc<dyn Contract> = c.get::<Concrete>(Key::of::<Concrete>())?;
            Ok(concrete)
        })
    };

    container.share(key.clone(), factory());
    let first = container.make::<ContractParam>().unwrap();
    let second = container.make::<ContractParam>().unwrap();
    assert!(same_object(&first.contract, &second.contract));

    container.add(key, factory());
    let first = container.make::<ContractParam>().unwrap();
    let second = container.make::<ContractParam>().unwrap();
    assert!(!same_object(&first.contract, &second.contract));
}

// ===== Calls and explicit arguments =====

#[test]
fn test_calls_a_closure_directly() {
    let container = Container::new();
    let closure = Callable::new(|_| Ok("foobar")).class::<WithTwoParams>("w2");

    let result = container.call_as::<&str>(&closure, &Arguments::new()).unwrap();
    assert_eq!(*result, "foobar");
}

#[test]
fn test_calls_an_invocable_directly() {
    let container = Container::new();

    let result = container
        .call_as::<&str>(&InvocableWithParams, &Arguments::new())
        .unwrap();
    assert_eq!(*result, "invoke + params");

    let wrapped = Callable::from_invocable(InvocableWithParams);
    assert_eq!(wrapped.signature().len(), 1);
    container.add("wrapped", wrapped);
    assert_eq!(*container.get::<&str>("wrapped").unwrap(), "invoke + params");
}

#[test]
fn test_explicit_arguments() {
    let container = Container::new();
    let args = Arguments::new().with("foo", "bar".to_string());

    assert_eq!(container.make_with::<Foobar>(&args).unwrap().foo.as_str(), "bar");
    assert_eq!(container.make_with::<MixedParams>(&args).unwrap().foo.as_str(), "bar");

    let closure = Callable::new(|args| Ok(args.get::<String>("foo")?.to_string()))
        .class::<WithTwoParams>("w2")
        .default("bar", Option::<String>::None)
        .param("foo");
    container.add("baz", closure.clone());

    assert_eq!(container.get_with::<String>("baz", &args).unwrap().as_str(), "bar");
    assert_eq!(container.call_as::<String>(&closure, &args).unwrap().as_str(), "bar");
}

#[test]
fn test_explicit_argument_beats_binding() {
    let container = Container::new();
    container.add("foo", Binding::value("bound".to_string()));

    let args = Arguments::new().with("foo", "explicit".to_string());
    assert_eq!(container.make_with::<Foobar>(&args).unwrap().foo.as_str(), "explicit");
    assert_eq!(container.make::<Foobar>().unwrap().foo.as_str(), "bound");
}

#[test]
fn test_explicit_arguments_do_not_leak_into_nested_resolution() {
    let container = Container::new();
    let args = Arguments::new().with("foo", "bar".to_string());

    // `foo` is a parameter of Foobar, one level below the call
    let err = container.make_with::<WithManagedParams>(&args).unwrap_err();
    assert!(matches!(err.root_cause(), DiError::NotFound(key) if key == "foo"));
}

#[test]
fn test_typed_parameters_resolve_by_type_key() {
    struct Port(u16);

    let container = Container::new();
    container.add(Key::of::<Port>(), Binding::value(Port(8080)));
    let endpoint = Callable::new(|args| Ok(format!("localhost:{}", args.get::<Port>("port")?.0)))
        .typed::<Port>("port");

    let result = container.call_as::<String>(&endpoint, &Arguments::new()).unwrap();
    assert_eq!(result.as_str(), "localhost:8080");
}

#[test]
fn test_resolved_args_by_position() {
    let container = Container::new();
    container.add("a", Binding::value(1u8));
    container.add("b", Binding::value(2u8));

    let sum = Callable::new(|args| {
        assert_eq!(args.names().collect::<Vec<_>>(), ["a", "b"]);
        Ok(*args.at::<u8>(0)? + *args.at::<u8>(1)?)
    })
    .param("a")
    .param("b");

    assert_eq!(*container.call_as::<u8>(&sum, &Arguments::new()).unwrap(), 3);
}

// ===== Lifetimes =====

#[test]
fn test_singletons() {
    let container = Container::new();

    container.share("shared", Callable::new(|_| Ok(WithZeroParams)));
    let first = container.get::<WithZeroParams>("shared").unwrap();
    let second = container.get::<WithZeroParams>("shared").unwrap();
    assert!(Arc::ptr_eq(&first, &second));

    container.add("shared", Callable::new(|_| Ok(WithZeroParams)));
    let first = container.get::<WithZeroParams>("shared").unwrap();
    let second = container.get::<WithZeroParams>("shared").unwrap();
    assert!(!Arc::ptr_eq(&first, &second));
}

#[test]
fn test_shared_entry_reports_value_after_resolution() {
    let container = Container::new();
    container.share("lazy", Callable::new(|_| Ok(7u8)));
    assert_eq!(container.descriptors()[0].kind, BindingKind::Factory);

    container.get_any("lazy").unwrap();
    let descriptor = &container.descriptors()[0];
    assert_eq!(descriptor.kind, BindingKind::Value);
    assert!(descriptor.is_shared());
}

#[test]
fn test_failed_shared_resolution_is_not_memoized() {
    let container = Container::new();
    container.share("needs.dep", Callable::new(|args| Ok(*args.get::<u8>("dep")?)).param("dep"));

    assert!(container.get_any("needs.dep").is_err());
    container.add("dep", Binding::value(5u8));
    assert_eq!(*container.get::<u8>("needs.dep").unwrap(), 5);
}

// ===== Errors =====

#[test]
fn test_not_found_message() {
    let container = Container::new();
    let err = container.get_any("baz").unwrap_err();

    assert!(err.is_not_found());
    assert_eq!(err.to_string(), "baz is not managed by the container.");
}

#[test]
fn test_unresolvable_class_message() {
    let container = Container::new();
    let err = container.make::<Foobar>().unwrap_err();

    assert_eq!(
        err.to_string(),
        format!("Failed to resolve {} from the container.", std::any::type_name::<Foobar>())
    );
    assert!(!err.is_not_found());
    assert!(matches!(err.root_cause(), DiError::NotFound(key) if key == "foo"));
}

#[test]
fn test_unbound_interface_message() {
    let container = Container::new();
    let err = container.get_any(Key::interface::<dyn Contract>()).unwrap_err();

    assert!(err.is_not_found());
    assert_eq!(
        err.to_string(),
        format!("Failed to resolve interface {}.", std::any::type_name::<dyn Contract>())
    );
}

#[test]
fn test_factory_failure_is_wrapped() {
    let container = Container::new();
    container.add("boom", Callable::new(|_| Err::<u8, _>(DiError::custom("kaput"))));

    match container.get_any("boom").unwrap_err() {
        DiError::BindingResolution { key, source } => {
            assert_eq!(key, "boom");
            assert_eq!(source.to_string(), "kaput");
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[test]
fn test_missing_factory_parameter_is_wrapped() {
    let container = Container::new();
    container.add("outer", Callable::new(|_| Ok(())).param("missing"));

    let err = container.get_any("outer").unwrap_err();
    assert_eq!(err.to_string(), "Failed to resolve outer from the container.");
    assert!(matches!(err.root_cause(), DiError::NotFound(key) if key == "missing"));
}

#[test]
fn test_direct_call_failures_are_not_wrapped() {
    let container = Container::new();

    let failing = Callable::new(|_| Err::<u8, _>(DiError::custom("kaput")));
    let err = container.call(&failing, &Arguments::new()).unwrap_err();
    assert_eq!(err.to_string(), "kaput");

    let needy = Callable::new(|_| Ok(())).param("missing");
    let err = container.call(&needy, &Arguments::new()).unwrap_err();
    assert!(matches!(err, DiError::NotFound(ref key) if key == "missing"));
}

#[test]
fn test_try_get_swallows_errors() {
    let container = Container::new();
    container.add("n", Binding::value(3i64));

    assert_eq!(container.try_get::<i64>("n").as_deref(), Some(&3));
    assert!(container.try_get::<i64>("missing").is_none());
}
