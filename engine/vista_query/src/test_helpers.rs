//! Fixtures for the query tests.

#![allow(clippy::unwrap_used)]

use std::any::Any;
use std::cell::Cell;
use std::rc::Rc;

use vista_meta::{Descriptor, Method, Property, Static, TypeBuilder};
use vista_tree::{CollectionNode, MethodNode, Node, Registry, WarningSink};
use vista_types::errors::domain;
use vista_types::{Ty, TypeIdx};
use vista_value::{ChangeNotifier, DomainObject, PropertyChanged, Value};

pub(crate) struct Item {
    name: String,
    qty: Cell<i64>,
    changes: ChangeNotifier<PropertyChanged>,
}

impl Item {
    pub(crate) fn new(name: &str, qty: i64) -> Rc<Self> {
        Rc::new(Item {
            name: name.to_string(),
            qty: Cell::new(qty),
            changes: ChangeNotifier::new(),
        })
    }

    pub(crate) fn qty(&self) -> i64 {
        self.qty.get()
    }

    fn restock(&self, amount: i64) {
        self.qty.set(self.qty.get() + amount);
        let _ = self.changes.emit(&PropertyChanged::new("Qty"));
    }
}

impl DomainObject for Item {
    fn as_any(&self) -> &dyn Any {
        self
    }

    fn notifier(&self) -> Option<&ChangeNotifier<PropertyChanged>> {
        Some(&self.changes)
    }

    fn display(&self) -> String {
        self.name.clone()
    }
}

pub(crate) struct Fixture {
    pub(crate) registry: Registry,
    pub(crate) item: TypeIdx,
    pub(crate) is_even: MethodNode,
    pub(crate) add: MethodNode,
}

impl Fixture {
    pub(crate) fn numbers(&self, values: &[i64]) -> CollectionNode {
        let items = values.iter().copied().map(Value::Int).collect();
        self.registry
            .add_value("numbers", Value::list(Ty::Int, items))
            .as_collection()
            .unwrap()
    }

    pub(crate) fn items(&self, items: &[Rc<Item>]) -> CollectionNode {
        let values = items.iter().cloned().map(Value::shared).collect();
        self.registry
            .add_value("items", Value::list(Ty::Object(self.item), values))
            .as_collection()
            .unwrap()
    }
}

pub(crate) fn fixture() -> Fixture {
    let registry = Registry::builder().warnings(WarningSink::buffered()).build();
    let item = registry
        .register(
            TypeBuilder::<Item>::object("Item")
                .property(
                    Property::new("Name", Ty::Str, |i: &Item| i.name.as_str().into())
                        .visible(Descriptor::new("Name")),
                )
                .property(
                    Property::new("Qty", Ty::Int, |i: &Item| i.qty().into())
                        .visible(Descriptor::new("Qty")),
                )
                .method(
                    Method::new("Restock", |i: &Item, args: &[Value]| {
                        let amount = args[0].as_int().ok_or_else(|| domain("not an int"))?;
                        i.restock(amount);
                        Ok(Value::Void)
                    })
                    .param("amount", Ty::Int)
                    .visible(Descriptor::new("Restock")),
                )
                .method(
                    Method::new("IsLow", |i: &Item, _: &[Value]| Ok(Value::Bool(i.qty() < 3)))
                        .returns(Ty::Bool)
                        .visible(Descriptor::new("IsLow")),
                )
                .static_method(
                    Method::new("IsEven", |_: &Static, args: &[Value]| {
                        let n = args[0].as_int().ok_or_else(|| domain("not an int"))?;
                        Ok(Value::Bool(n % 2 == 0))
                    })
                    .param("n", Ty::Int)
                    .returns(Ty::Bool)
                    .visible(Descriptor::new("IsEven")),
                )
                .static_method(
                    Method::new("Add", |_: &Static, args: &[Value]| {
                        let (Some(a), Some(b)) = (args[0].as_int(), args[1].as_int()) else {
                            return Err(domain("not an int"));
                        };
                        Ok(Value::Int(a + b))
                    })
                    .param("a", Ty::Int)
                    .param("b", Ty::Int)
                    .returns(Ty::Int)
                    .visible(Descriptor::new("Add")),
                ),
        )
        .unwrap();
    registry.import_entry_types(&[item]).unwrap();
    let Some(Node::Method(is_even)) = registry.lookup_by_name("IsEven") else {
        panic!("IsEven was not imported");
    };
    let Some(Node::Method(add)) = registry.lookup_by_name("Add") else {
        panic!("Add was not imported");
    };
    Fixture {
        registry,
        item,
        is_even,
        add,
    }
}
