use pretty_assertions::assert_eq;
use vista::prelude::*;
use vista::SourceKind;

use crate::common::world;

#[test]
fn increment_twice_then_read_value() {
    let w = world();
    let main = w
        .registry
        .lookup_by_name("Main")
        .and_then(|node| node.as_object().cloned())
        .unwrap();
    let value = main.child("Value").unwrap().unwrap();
    assert_eq!(value.value().unwrap(), Value::Int(0));

    let increment = main.operation("Increment").unwrap().unwrap();
    increment.invoke().unwrap();
    increment.invoke().unwrap();

    assert_eq!(value.value().unwrap(), Value::Int(2));
    assert_eq!(w.main.get(), 2);
    assert!(increment.return_slot().is_leaf());
}

#[test]
fn add_returns_a_result_node() {
    let w = world();
    let add = w.static_method("Add");
    assert_eq!(add.signature(), "Add(a: int, b: int) -> int");
    add.set_parameter(Value::Int(2), 0).unwrap();
    add.set_parameter(Value::Int(3), 1).unwrap();

    let result = add.invoke().unwrap();

    assert_eq!(result.source_kind(), SourceKind::ReturnValueBacked);
    assert_eq!(result.value().unwrap(), Value::Int(5));
    assert!(result.is_read_only());
    assert!(add.successor().unwrap().ptr_eq(&result));
}

#[test]
fn invoke_requires_every_argument() {
    let w = world();
    let add = w.static_method("Add");
    add.set_parameter(Value::Int(2), 0).unwrap();

    let err = add.invoke().unwrap_err();
    assert!(
        matches!(&err, EngineError::MissingArgument { index: 1, name } if name == "b"),
        "{err:?}"
    );

    add.set_parameter(Value::Int(40), 1).unwrap();
    assert_eq!(add.invoke().unwrap().value().unwrap(), Value::Int(42));
}

#[test]
fn mistyped_argument_leaves_the_slot_alone() {
    let w = world();
    let add = w.static_method("Add");
    let err = add.set_parameter(Value::string("two"), 0).unwrap_err();
    assert!(matches!(err, EngineError::TypeMismatch { .. }), "{err:?}");
    assert_eq!(add.parameter(0).unwrap().value().unwrap(), Value::Void);
    assert!(!add.can_assign(&Value::Bool(true), 1).unwrap());
}

#[test]
fn importing_again_adds_nothing() {
    let w = world();
    let before = w.registry.roots().len();
    assert!(w.registry.import_entry_types(&[w.counter]).unwrap().is_empty());
    assert_eq!(w.registry.roots().len(), before);
    assert_eq!(w.registry.roots_of_kind::<MethodNode>().len(), 2);
}

#[test]
fn candidates_offer_matching_roots() {
    let w = world();
    let add = w.static_method("Add");
    w.root("seven", Value::Int(7));
    let fitting: Vec<String> = add
        .candidates(&w.registry, 0)
        .unwrap()
        .into_iter()
        .filter(|(_, fits)| *fits)
        .map(|(node, _)| node.header())
        .collect();
    assert_eq!(fitting, vec!["seven"]);
}
