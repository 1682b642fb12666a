use std::cell::RefCell;
use std::rc::Rc;

use pretty_assertions::assert_eq;
use vista::prelude::*;

use crate::common::{world, Shelf};

fn numbers(w: &crate::common::World, values: &[i64]) -> (Rc<Shelf>, CollectionNode) {
    let shelf = Shelf::new(values);
    let collection = w
        .root("shelf", Value::shared(shelf.clone()))
        .child("Numbers")
        .unwrap()
        .unwrap()
        .as_collection()
        .unwrap();
    (shelf, collection)
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
fn filter_even_numbers() {
    vista::init_tracing();
    let w = world();
    let (shelf, collection) = numbers(&w, &[1, 2, 3, 4, 5]);
    let even = Operand::invoke(&w.static_method("IsEven"), [Operand::Element]).into();

    let result = collection.filter(&even).unwrap().unwrap();

    assert_eq!(ints(&result), vec![2, 4]);
    assert_eq!(ints(&collection), vec![1, 2, 3, 4, 5]);
    assert_eq!(shelf.numbers.len(), 5);
}

#[test]
fn sort_and_select_leave_the_source_alone() {
    let w = world();
    let (_, collection) = numbers(&w, &[3, 1, 2]);

    let sorted = collection
        .sort(&Operand::Element.into(), SortOrder::Descending)
        .unwrap()
        .unwrap();
    assert_eq!(ints(&sorted), vec![3, 2, 1]);

    let parity = collection
        .select(&Operand::invoke(&w.static_method("IsEven"), [Operand::Element]).into())
        .unwrap()
        .unwrap();
    let parity: Vec<Option<bool>> = parity
        .elements()
        .unwrap()
        .iter()
        .map(|e| e.value_as::<bool>().unwrap())
        .collect();
    assert_eq!(parity, vec![Some(false), Some(false), Some(true)]);
    assert_eq!(ints(&collection), vec![3, 1, 2]);
}

#[test]
fn query_on_a_scalar_goes_to_the_warning_channel() {
    let w = world();
    let seen = Rc::new(RefCell::new(Vec::new()));
    let sink = seen.clone();
    let _subscription = w.registry.on_warning(move |warning| {
        sink.borrow_mut().push((warning.node.header(), warning.message.clone()));
    });
    let scalar = w.root("five", Value::Int(5));

    let result = vista::filter(&scalar, &Operand::literal(true).into()).unwrap();

    assert!(result.is_none());
    assert_eq!(
        *seen.borrow(),
        vec![(
            "five".to_string(),
            "`filter` needs a collection, found int".to_string()
        )]
    );
}

#[test]
fn filter_results_can_be_queried_again() {
    let w = world();
    let (_, collection) = numbers(&w, &[6, 1, 4, 3, 2]);
    let even = Operand::invoke(&w.static_method("IsEven"), [Operand::Element]).into();

    let evens = collection.filter(&even).unwrap().unwrap();
    let ordered = evens
        .sort(&Operand::Element.into(), SortOrder::Ascending)
        .unwrap()
        .unwrap();
    assert_eq!(ints(&ordered), vec![2, 4, 6]);
}
