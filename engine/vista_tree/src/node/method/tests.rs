use super::*;
use crate::test_helpers::{registry, Counter};
use crate::Registry;
use pretty_assertions::assert_eq;
use vista_types::EngineError;

fn counter_root(registry: &Registry, start: i64) -> (Rc<Counter>, ObjectNode) {
    let counter = Counter::new(start);
    let node = registry.add_value("counter", Value::shared(counter.clone()));
    (counter, node)
}

fn operation(node: &ObjectNode, name: &str) -> MethodNode {
    node.operation(name).unwrap().unwrap()
}

#[test]
fn add_returns_the_sum() {
    let (registry, _) = registry();
    let (_, root) = counter_root(&registry, 0);
    let add = operation(&root, "Add");
    assert_eq!(add.signature(), "Add(a: int, b: int) -> int");
    assert_eq!(add.parameters().len(), 2);
    assert_eq!(add.parameters()[0].header(), "a");

    add.set_parameter(Value::Int(2), 0).unwrap();
    add.set_parameter(Value::Int(3), 1).unwrap();
    let result = add.invoke().unwrap();

    assert_eq!(result.value().unwrap(), Value::Int(5));
    assert!(result.ptr_eq(add.return_slot()));
    assert!(add.successor().unwrap().ptr_eq(&result));
    assert!(matches!(root.successor(), Some(Node::Method(m)) if m.ptr_eq(&add)));
    assert!(add.owner().unwrap().ptr_eq(&root));
}

#[test]
fn empty_argument_is_a_missing_argument() {
    let (registry, _) = registry();
    let (_, root) = counter_root(&registry, 0);
    let add = operation(&root, "Add");
    add.set_parameter(Value::Int(2), 0).unwrap();

    let err = add.invoke().unwrap_err();
    assert!(matches!(err, EngineError::MissingArgument { index: 1, .. }), "{err:?}");
    assert!(add.successor().is_none());
}

#[test]
fn incompatible_argument_is_refused() {
    let (registry, _) = registry();
    let (_, root) = counter_root(&registry, 0);
    let add = operation(&root, "Add");

    assert!(!add.can_assign(&Value::string("x"), 0).unwrap());
    assert!(add.can_assign(&Value::Int(1), 0).unwrap());
    let err = add.set_parameter(Value::string("x"), 0).unwrap_err();
    assert!(matches!(err, EngineError::TypeMismatch { .. }), "{err:?}");
    assert_eq!(add.parameters()[0].value().unwrap(), Value::Void);

    let err = add.can_assign(&Value::Int(1), 5).unwrap_err();
    assert!(matches!(err, EngineError::IndexOutOfRange { index: 5, len: 2 }), "{err:?}");
}

#[test]
fn void_operation_mutates_the_receiver() {
    let (registry, _) = registry();
    let (counter, root) = counter_root(&registry, 0);
    let count = root.child("Count").unwrap().unwrap();
    count.value().unwrap();
    let increment = operation(&root, "Increment");

    increment.invoke().unwrap();
    let result = increment.invoke().unwrap();

    assert_eq!(counter.count(), 2);
    assert_eq!(count.value().unwrap(), Value::Int(2));
    assert!(increment.returns_void());
    assert!(result.is_leaf());
    assert_eq!(result.value().unwrap(), Value::Void);
}

#[test]
fn chain_replays_the_invocation() {
    let (registry, _) = registry();
    let (counter, root) = counter_root(&registry, 0);
    operation(&root, "Increment").invoke().unwrap();

    root.instantiate_successor().unwrap();
    assert_eq!(counter.count(), 2);
}

#[test]
fn clearing_parameters_empties_every_slot() {
    let (registry, _) = registry();
    let (_, root) = counter_root(&registry, 0);
    let add = operation(&root, "Add");
    add.set_parameter(Value::Int(1), 0).unwrap();
    add.set_parameter(Value::Int(1), 1).unwrap();
    add.clear_parameters();
    assert!(add.invoke().is_err());
}

#[test]
fn candidates_mark_fitting_roots() {
    let (registry, types) = registry();
    let (_, root) = counter_root(&registry, 0);
    let add = operation(&root, "Add");
    registry.add_value("four", Value::Int(4));
    registry.add_value("text", Value::string("x"));
    registry.import_entry_types(&[types.counter]).unwrap();

    let marks: Vec<(String, bool)> = add
        .candidates(&registry, 1)
        .unwrap()
        .into_iter()
        .map(|(node, fits)| (node.header(), fits))
        .collect();
    assert_eq!(
        marks,
        vec![
            ("counter".to_string(), false),
            ("four".to_string(), true),
            ("text".to_string(), false),
            ("Origin".to_string(), true),
            ("Create".to_string(), false),
        ]
    );
}
