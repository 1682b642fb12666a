use std::cell::RefCell;
use std::rc::Rc;

use pretty_assertions::assert_eq;
use vista::prelude::*;
use vista::CollectionAction;

use crate::common::{world, world_with, Counter, Holder, Shelf};

fn numbers(root: &ObjectNode) -> CollectionNode {
    root.child("Numbers").unwrap().unwrap().as_collection().unwrap()
}

fn ints(collection: &CollectionNode) -> Vec<i64> {
    collection
        .elements()
        .unwrap()
        .iter()
        .map(|e| e.value_as::<i64>().unwrap().unwrap())
        .collect()
}

#[test]
fn property_write_round_trips() {
    let w = world_with(false);
    let counter = Value::shared(Counter::new(1));
    let first = w.root("first", counter.clone()).child("Value").unwrap().unwrap();
    first.set_value(9).unwrap();

    let fresh = w.root("second", counter).child("Value").unwrap().unwrap();
    assert!(!fresh.ptr_eq(&first));
    assert_eq!(fresh.value().unwrap(), Value::Int(9));
}

#[test]
fn element_write_round_trips() {
    let w = world_with(false);
    let shelf = Shelf::new(&[1, 2, 3]);
    let first = numbers(&w.root("first", Value::shared(shelf.clone())));
    first.get(1).unwrap().set_value(20).unwrap();

    assert_eq!(shelf.numbers.get(1), Some(Value::Int(20)));
    let fresh = numbers(&w.root("second", Value::shared(shelf)));
    assert_eq!(ints(&fresh), vec![1, 20, 3]);
}

#[test]
fn read_only_member_refuses_writes() {
    let w = world();
    let holder = Holder::new("gear");
    let locked = w
        .root("holder", Value::shared(holder.clone()))
        .child("Locked")
        .unwrap()
        .unwrap();
    assert!(locked.is_read_only());

    let err = locked.set_value(8).unwrap_err();

    assert!(matches!(err, EngineError::ReadOnly { .. }), "{err:?}");
    assert_eq!(holder.locked.get(), 7);
    assert_eq!(locked.value().unwrap(), Value::Int(7));
}

#[test]
fn collection_follows_its_source() {
    let w = world();
    let shelf = Shelf::new(&[1, 2]);
    let collection = numbers(&w.root("shelf", Value::shared(shelf.clone())));
    assert_eq!(ints(&collection), vec![1, 2]);
    let events = Rc::new(RefCell::new(Vec::new()));
    let log = events.clone();
    let _subscription = collection.on_collection_changed(move |event| {
        log.borrow_mut().push((event.action, event.index));
    });

    shelf.numbers.push(Value::Int(3)).unwrap();
    shelf.numbers.remove_at(0).unwrap();

    assert_eq!(ints(&collection), vec![2, 3]);
    assert_eq!(
        *events.borrow(),
        vec![(CollectionAction::Add, 2), (CollectionAction::Remove, 0)]
    );
}

#[test]
fn reordering_the_source_is_refused() {
    let w = world();
    let shelf = Shelf::new(&[1, 2]);
    let collection = numbers(&w.root("shelf", Value::shared(shelf.clone())));
    collection.elements().unwrap();

    assert!(shelf.numbers.move_item(0, 1).is_err());
    assert_eq!(ints(&collection), vec![1, 2]);
    assert_eq!(shelf.numbers.snapshot(), vec![Value::Int(1), Value::Int(2)]);
}

#[test]
fn values_stay_cached_between_reads() {
    let w = world();
    let shelf = Shelf::new(&[5]);
    let root = w.root("shelf", Value::shared(shelf));
    let node = root.child("Numbers").unwrap().unwrap();
    let first = node.value().unwrap();
    let second = node.value().unwrap();
    assert_eq!(first, second);
    assert!(first.same_identity(&second));
}
