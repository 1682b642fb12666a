//! Domain fixtures shared by the unit tests.

#![allow(clippy::unwrap_used)]

use std::any::Any;
use std::cell::{Cell, RefCell};
use std::rc::Rc;

use vista_meta::{Descriptor, Method, Property, Static, TypeBuilder};
use vista_types::errors::domain;
use vista_types::{Ty, TypeIdx};
use vista_value::{
    ChangeNotifier, DomainObject, ListRef, MapRef, ObjectRef, PropertyChanged, Value,
};

use crate::{Registry, WarningSink};

pub(crate) struct Counter {
    count: Cell<i64>,
    mode: Cell<u64>,
    changes: ChangeNotifier<PropertyChanged>,
}

impl Counter {
    pub(crate) fn new(start: i64) -> Rc<Self> {
        Rc::new(Counter {
            count: Cell::new(start),
            mode: Cell::new(0),
            changes: ChangeNotifier::new(),
        })
    }

    pub(crate) fn count(&self) -> i64 {
        self.count.get()
    }

    pub(crate) fn set_count(&self, count: i64) {
        self.count.set(count);
        let _ = self.changes.emit(&PropertyChanged::new("Count"));
    }

    pub(crate) fn increment(&self) {
        self.set_count(self.count() + 1);
    }
}

impl DomainObject for Counter {
    fn as_any(&self) -> &dyn Any {
        self
    }

    fn notifier(&self) -> Option<&ChangeNotifier<PropertyChanged>> {
        Some(&self.changes)
    }
}

pub(crate) struct Library {
    pub(crate) books: ListRef,
    pub(crate) stock: MapRef,
}

impl Library {
    pub(crate) fn new(books: &[&str]) -> Rc<Self> {
        Rc::new(Library {
            books: ListRef::observable(Ty::Str, books.iter().map(|b| Value::string(b)).collect()),
            stock: MapRef::observable(Ty::Str, Ty::Int, Vec::new()),
        })
    }
}

impl DomainObject for Library {
    fn as_any(&self) -> &dyn Any {
        self
    }
}

pub(crate) struct Person {
    pub(crate) name: String,
    pub(crate) friend: RefCell<Option<ObjectRef>>,
}

impl Person {
    pub(crate) fn new(name: &str) -> Rc<Self> {
        Rc::new(Person {
            name: name.to_string(),
            friend: RefCell::new(None),
        })
    }
}

impl DomainObject for Person {
    fn as_any(&self) -> &dyn Any {
        self
    }

    fn display(&self) -> String {
        self.name.clone()
    }
}

pub(crate) struct Types {
    pub(crate) counter: TypeIdx,
    pub(crate) library: TypeIdx,
    pub(crate) person: TypeIdx,
    pub(crate) mode: TypeIdx,
}

fn shown(header: &str) -> Descriptor {
    Descriptor::new(header)
}

pub(crate) fn registry_with(sink: WarningSink, share: bool) -> (Registry, Types) {
    let registry = Registry::builder().warnings(sink).share_members(share).build();
    let mode = registry
        .register_enum("Mode", &["Idle", "Running", "Done"], false)
        .unwrap();
    let counter_idx = registry.next_type_idx();
    let counter = registry
        .register(
            TypeBuilder::<Counter>::object("Counter")
                .property(
                    Property::new("Count", Ty::Int, |c: &Counter| c.count().into())
                        .set(|c: &Counter, v: Value| {
                            let n = v.as_int().ok_or_else(|| domain("not an int"))?;
                            if n < 0 {
                                return Err(domain("count cannot be negative"));
                            }
                            c.set_count(n);
                            Ok(())
                        })
                        .visible(shown("Count")),
                )
                .property(
                    Property::new("Mode", Ty::Enum(mode), move |c: &Counter| {
                        Value::variant(mode, c.mode.get())
                    })
                    .set(|c: &Counter, v: Value| {
                        c.mode.set(v.as_enum().map_or(0, |e| e.bits));
                        Ok(())
                    })
                    .visible(shown("Mode")),
                )
                .property(
                    Property::new("Secret", Ty::Int, |_: &Counter| Value::Int(42))
                        .visible(Descriptor::hidden()),
                )
                .property(
                    Property::new("Doubled", Ty::Int, |c: &Counter| (c.count() * 2).into())
                        .visible(shown("Doubled")),
                )
                .method(
                    Method::new("Increment", |c: &Counter, _: &[Value]| {
                        c.increment();
                        Ok(Value::Void)
                    })
                    .visible(shown("Increment")),
                )
                .method(
                    Method::new("Add", |_: &Counter, args: &[Value]| {
                        let sum = args.iter().filter_map(Value::as_int).sum::<i64>();
                        Ok(sum.into())
                    })
                    .param("a", Ty::Int)
                    .param("b", Ty::Int)
                    .returns(Ty::Int)
                    .visible(shown("Add")),
                )
                .static_property(
                    Property::new("Origin", Ty::Int, |_: &Static| Value::Int(0))
                        .visible(shown("Origin")),
                )
                .static_method(
                    Method::new("Create", |_: &Static, _: &[Value]| {
                        Ok(Value::shared(Counter::new(0)))
                    })
                    .returns(Ty::Object(counter_idx))
                    .visible(shown("Create")),
                ),
        )
        .unwrap();
    let library = registry
        .register(
            TypeBuilder::<Library>::object("Library")
                .property(
                    Property::new("Books", Ty::list(Ty::Str), |l: &Library| {
                        l.books.clone().into()
                    })
                    .visible(shown("Books")),
                )
                .property(
                    Property::new("Stock", Ty::map(Ty::Str, Ty::Int), |l: &Library| {
                        l.stock.clone().into()
                    })
                    .visible(shown("Stock")),
                ),
        )
        .unwrap();
    let person_idx = registry.next_type_idx();
    let person = registry
        .register(
            TypeBuilder::<Person>::object("Person")
                .property(
                    Property::new("Name", Ty::Str, |p: &Person| p.name.as_str().into())
                        .visible(shown("Name")),
                )
                .property(
                    Property::new("Friend", Ty::Object(person_idx), |p: &Person| {
                        p.friend.borrow().clone().map_or(Value::Void, Value::Object)
                    })
                    .visible(shown("Friend")),
                ),
        )
        .unwrap();
    (
        registry,
        Types {
            counter,
            library,
            person,
            mode,
        },
    )
}

pub(crate) fn registry() -> (Registry, Types) {
    registry_with(WarningSink::buffered(), true)
}
