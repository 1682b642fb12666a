use super::*;
use crate::test_helpers::{registry, registry_with, Counter};
use pretty_assertions::assert_eq;
use std::cell::RefCell;
use std::rc::Rc;
use vista_meta::{PropertyDef, TypeBuilder};

#[test]
fn types_are_found_by_name() {
    let (registry, types) = registry();
    assert_eq!(registry.type_named("Library"), Some(types.library));
    assert_eq!(registry.type_named("Person"), Some(types.person));
    assert_eq!(registry.type_named("Mode"), Some(types.mode));
    assert_eq!(registry.type_named("Nope"), None);
    assert_eq!(registry.type_name(&Ty::Object(types.counter)), "Counter");
}

#[test]
fn duplicate_registration_is_refused() {
    let (registry, _) = registry();
    let err = registry
        .register(TypeBuilder::<Counter>::object("Counter"))
        .unwrap_err();
    assert!(matches!(err, EngineError::DuplicateType { .. }), "{err:?}");
}

#[test]
fn entry_types_become_roots_once() {
    let (registry, types) = registry();
    let added = registry.import_entry_types(&[types.counter, types.person]).unwrap();
    let headers: Vec<String> = added.iter().map(Node::header).collect();
    assert_eq!(headers, vec!["Origin", "Create"]);

    let again = registry.import_entry_types(&[types.counter]).unwrap();
    assert!(again.is_empty());
    assert_eq!(registry.roots().len(), 2);

    let origin = registry.lookup_by_name("Origin").unwrap();
    assert_eq!(origin.as_object().unwrap().value().unwrap(), Value::Int(0));
    assert!(registry.lookup_by_name("Missing").is_none());
}

#[test]
fn unknown_entry_type_is_an_error() {
    let (registry, _) = registry();
    let err = registry
        .import_entry_types(&[TypeIdx::from_raw(99)])
        .unwrap_err();
    assert!(matches!(err, EngineError::InvalidType { .. }), "{err:?}");
}

#[test]
fn instance_descriptor_wins_over_defaults() {
    let (registry, _) = registry();
    let counter = Value::shared(Counter::new(0));
    registry
        .attach_descriptor(&counter, Descriptor::new("Main counter").description("the one"))
        .unwrap();
    let node = registry.add_value("counter", counter.clone());
    assert_eq!(node.header(), "Main counter");
    assert_eq!(node.description(), "the one");
    assert_eq!(node.name().as_deref(), Some("counter"));
    assert!(registry.lookup_by_name("counter").is_some());
    assert!(registry.lookup_by_name("Main counter").is_some());
    assert!(registry.detach_descriptor(&counter).is_some());
}

#[test]
fn primitives_cannot_carry_descriptors() {
    let (registry, _) = registry();
    let err = registry
        .attach_descriptor(&Value::Int(1), Descriptor::new("one"))
        .unwrap_err();
    assert!(matches!(err, EngineError::NotAReferenceValue { .. }), "{err:?}");
}

#[test]
fn find_returns_the_member_owner() {
    let (registry, _) = registry();
    let counter = Value::shared(Counter::new(0));
    assert!(registry.find(&counter).is_none());
    let node = registry.add_value("counter", counter.clone());
    assert!(registry.find(&counter).unwrap().ptr_eq(&node));
    assert!(registry.find(&Value::shared(Counter::new(0))).is_none());

    let number = registry.add_value("n", Value::Int(3));
    assert!(registry.find(&Value::Int(3)).unwrap().ptr_eq(&number));
}

#[test]
fn refresh_all_rebuilds_children() {
    let (registry, _) = registry();
    let counter = Counter::new(1);
    let root = registry.add_value("counter", Value::shared(counter.clone()));
    let stale = root.child("Doubled").unwrap().unwrap();
    assert_eq!(stale.value().unwrap(), Value::Int(2));
    counter.set_count(5);

    registry.refresh_all().unwrap();
    let fresh = root.child("Doubled").unwrap().unwrap();
    assert!(!fresh.ptr_eq(&stale));
    assert_eq!(fresh.value().unwrap(), Value::Int(10));
}

#[test]
fn refresh_all_reports_the_first_failure() {
    let (registry, _) = registry();
    let healthy = registry.add_value("counter", Value::shared(Counter::new(0)));
    let broken = PropertyDef::from_parts(
        "Broken",
        Ty::Int,
        |_| Err(vista_types::errors::domain("boom")),
        None,
        Some(Descriptor::new("Broken")),
    );
    registry.add_root(ObjectNode::property(
        registry.context(),
        Value::Void,
        Rc::new(broken),
        Descriptor::new("Broken"),
        None,
    ));

    let err = registry.refresh_all().unwrap_err();
    assert!(matches!(err, EngineError::Domain { .. }), "{err:?}");
    assert!(healthy.is_loaded());
    assert_eq!(
        registry.captured_warnings(),
        vec!["Broken: refresh failed: boom".to_string()]
    );
}

#[test]
fn warnings_reach_subscribers_whatever_the_sink() {
    let (registry, _) = registry_with(WarningSink::Silent, true);
    let seen: Rc<RefCell<Vec<String>>> = Rc::default();
    let sink = seen.clone();
    let _subscription = registry.on_warning(move |warning| {
        sink.borrow_mut().push(format!("{} / {}", warning.node.header(), warning.message));
    });
    let node = registry.add_value("n", Value::Int(1));
    node.warn("first");
    assert_eq!(*seen.borrow(), vec!["n / first".to_string()]);
    assert!(registry.captured_warnings().is_empty());
}

#[test]
fn buffered_warnings_can_be_cleared() {
    let (registry, _) = registry();
    registry.add_value("n", Value::Int(1)).warn("noted");
    assert_eq!(registry.captured_warnings(), vec!["n: noted".to_string()]);
    registry.clear_warnings();
    assert!(registry.captured_warnings().is_empty());
}

#[test]
fn custom_provider_order_applies() {
    let registry = Registry::builder()
        .providers(vec![Provider::Declaration])
        .warnings(WarningSink::Silent)
        .build();
    let value = Value::shared(Counter::new(0));
    registry
        .attach_descriptor(&value, Descriptor::new("ignored"))
        .unwrap();
    let node = registry.add_value("plain", value);
    assert_eq!(node.header(), "plain");
}

#[test]
fn removing_roots() {
    let (registry, _) = registry();
    let node = Node::Object(registry.add_value("n", Value::Int(1)));
    assert!(registry.remove_root(&node));
    assert!(!registry.remove_root(&node));
    assert!(registry.roots().is_empty());
}
