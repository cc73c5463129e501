//! Implementation swapping.

use swizzle::{
    Catalog, Invoker, MethodKey, Registrar, Scope, SwapError, SwapPolicy, Swapper, Value,
};

mod common;
use common::{calc, double, label, shapes};

fn call_i64(class: &swizzle::Class, selector: &str, arg: i64) -> Value {
    Invoker::new()
        .invoke_on_instance(&class.instantiate(), selector, &[Value::I64(arg)], true)
        .unwrap()
        .unwrap()
}

fn call_str(target: impl Into<Value>, scope: Scope, selector: &str) -> Value {
    let invoker = Invoker::new();
    let result = match scope {
        Scope::Instance => invoker.invoke_on_instance(target, selector, &[], true),
        Scope::Type => invoker.invoke_on_type(target, selector, &[], true),
    };
    result.unwrap().unwrap()
}

#[test]
fn test_swap_redirects_both_selectors() {
    let class = calc();
    Registrar::new().add_instance_method(&class, "double:", double());

    Swapper::new()
        .swap_instance_methods(&class, "double:", "negate:")
        .unwrap();
    assert_eq!(call_i64(&class, "double:", 21), Value::I64(-21));
    assert_eq!(call_i64(&class, "negate:", 21), Value::I64(42));
}

#[test]
fn test_swap_is_an_involution() {
    let class = calc();
    Registrar::new().add_instance_method(&class, "double:", double());
    let before_double = class.lookup(&MethodKey::instance("double:")).unwrap().1;
    let before_negate = class.lookup(&MethodKey::instance("negate:")).unwrap().1;

    let swapper = Swapper::new();
    swapper.swap_instance_methods(&class, "double:", "negate:").unwrap();
    swapper.swap_instance_methods(&class, "double:", "negate:").unwrap();

    let after_double = class.lookup(&MethodKey::instance("double:")).unwrap().1;
    let after_negate = class.lookup(&MethodKey::instance("negate:")).unwrap().1;
    assert!(after_double.ptr_eq(&before_double));
    assert!(after_negate.ptr_eq(&before_negate));
}

#[test]
fn test_swap_keeps_descriptor_identity() {
    let class = calc();
    Registrar::new().add_instance_method(&class, "double:", double());
    let catalog = Catalog::new();
    let before = catalog.instance_method(&class, "double:").unwrap();

    Swapper::new().swap_instance_methods(&class, "double:", "negate:").unwrap();

    let after = catalog.instance_method(&class, "double:").unwrap();
    assert_eq!(after.owner, before.owner);
    assert_eq!(after.class, before.class);
    assert_eq!(after.key, before.key);
    assert!(!after.implementation.ptr_eq(&before.implementation));
}

#[test]
fn test_swap_class_methods() {
    let (shape, _, _) = shapes();
    Registrar::new().add_class_method(&shape, "family", label("quadrilateral"));

    Swapper::new().swap_class_methods(&shape, "kind", "family").unwrap();
    assert_eq!(call_str(&shape, Scope::Type, "kind"), Value::from("quadrilateral"));
    assert_eq!(call_str(&shape, Scope::Type, "family"), Value::from("polygon"));
}

#[test]
fn test_unresolved_selector_fails() {
    let class = calc();
    let err = Swapper::new()
        .swap_class_methods(&class, "negate:", "add:to:")
        .unwrap_err();
    assert!(matches!(err, SwapError::SelectorNotFound { scope: Scope::Type, .. }));
}

// Giving an inherited selector a local entry before swapping is a chosen
// behaviour, not one inherited from any platform contract. These tests pin it.
mod inherited {
    use super::*;

    #[test]
    fn test_swap_is_local_to_the_subclass() {
        let (shape, circle, square) = shapes();

        Swapper::new()
            .swap_instance_methods(&circle, "describe", "loud_describe")
            .unwrap();

        assert_eq!(
            call_str(&circle.instantiate(), Scope::Instance, "describe"),
            Value::from("CIRCLE")
        );
        assert_eq!(
            call_str(&circle.instantiate(), Scope::Instance, "loud_describe"),
            Value::from("shape")
        );
        assert_eq!(
            call_str(&shape.instantiate(), Scope::Instance, "describe"),
            Value::from("shape")
        );
        assert_eq!(
            call_str(&square.instantiate(), Scope::Instance, "describe"),
            Value::from("shape")
        );
        assert!(circle.table().contains(&MethodKey::instance("describe")));
    }

    #[test]
    fn test_in_place_policy_reaches_siblings() {
        let (_, circle, square) = shapes();

        Swapper::with_policy(SwapPolicy::InPlace)
            .swap_instance_methods(&circle, "describe", "loud_describe")
            .unwrap();

        assert!(!circle.table().contains(&MethodKey::instance("describe")));
        assert_eq!(
            call_str(&square.instantiate(), Scope::Instance, "describe"),
            Value::from("CIRCLE")
        );
    }
}

#[test]
fn test_swap_across_classes_and_scopes() {
    let (shape, circle, _) = shapes();
    let catalog = Catalog::new();

    let loud = catalog.instance_method(&circle, "loud_describe").unwrap();
    let kind = catalog.class_method(&shape, "kind").unwrap();
    Swapper::new().swap_methods(&loud, &kind).unwrap();

    assert_eq!(
        call_str(&circle.instantiate(), Scope::Instance, "loud_describe"),
        Value::from("polygon")
    );
    assert_eq!(call_str(&shape, Scope::Type, "kind"), Value::from("CIRCLE"));
}
