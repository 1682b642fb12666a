// Test code uses unwrap/expect for clarity - panics provide good test failure messages
#![allow(clippy::unwrap_used, clippy::expect_used)]

//! Property tests for collection sync and lazy loading.

use proptest::prelude::*;
use vista::{ListRef, Registry, Ty, Value};

#[derive(Clone, Debug)]
enum Edit {
    Push(i64),
    Insert(usize, i64),
    RemoveAt(usize),
}

fn edit() -> impl Strategy<Value = Edit> {
    prop_oneof![
        any::<i64>().prop_map(Edit::Push),
        (any::<usize>(), any::<i64>()).prop_map(|(at, n)| Edit::Insert(at, n)),
        any::<usize>().prop_map(Edit::RemoveAt),
    ]
}

fn apply(list: &ListRef, edit: &Edit) {
    let len = list.len();
    match *edit {
        Edit::Push(n) => list.push(Value::Int(n)).unwrap(),
        Edit::Insert(at, n) => list.insert(at % (len + 1), Value::Int(n)).unwrap(),
        Edit::RemoveAt(at) if len > 0 => {
            list.remove_at(at % len).unwrap();
        }
        Edit::RemoveAt(_) => {}
    }
}

proptest! {
    #[test]
    fn elements_track_every_edit(
        start in prop::collection::vec(any::<i64>(), 0..8),
        edits in prop::collection::vec(edit(), 0..24),
    ) {
        let registry = Registry::new();
        let list = ListRef::observable(Ty::Int, start.into_iter().map(Value::Int).collect());
        let node = registry
            .add_value("list", Value::List(list.clone()))
            .as_collection()
            .unwrap();
        node.elements().unwrap();

        for edit in &edits {
            apply(&list, edit);
            let mirrored: Vec<Value> = node
                .elements()
                .unwrap()
                .iter()
                .map(|e| e.value().unwrap())
                .collect();
            prop_assert_eq!(mirrored.len(), list.len());
            prop_assert_eq!(mirrored, list.snapshot());
        }
    }

    #[test]
    fn reads_are_idempotent(values in prop::collection::vec(any::<i64>(), 0..8)) {
        let registry = Registry::new();
        let node = registry.add_value("list", Value::list(Ty::Int, values.into_iter().map(Value::Int).collect()));
        let collection = node.as_collection().unwrap();

        let first = node.value().unwrap();
        let second = node.value().unwrap();
        prop_assert!(first.same_identity(&second));

        let a = collection.elements().unwrap();
        let b = collection.elements().unwrap();
        prop_assert_eq!(a.len(), b.len());
        for (x, y) in a.iter().zip(&b) {
            prop_assert!(x.ptr_eq(y));
            prop_assert_eq!(x.value().unwrap(), y.value().unwrap());
        }
    }
}
