//! A counter, a shelf of numbers and a holder with a labelled part.

use std::any::Any;
use std::cell::Cell;
use std::rc::Rc;

use vista::errors::domain;
use vista::prelude::*;
use vista::{ChangeNotifier, ListRef, PropertyChanged, TypeIdx, VisibleInfo, WarningSink};

pub struct Counter {
    value: Cell<i64>,
    changes: ChangeNotifier<PropertyChanged>,
}

impl Counter {
    pub fn new(start: i64) -> Rc<Self> {
        Rc::new(Counter {
            value: Cell::new(start),
            changes: ChangeNotifier::new(),
        })
    }

    pub fn get(&self) -> i64 {
        self.value.get()
    }

    fn set(&self, value: i64) {
        self.value.set(value);
        let _ = self.changes.emit(&PropertyChanged::new("Value"));
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

pub struct Shelf {
    pub numbers: ListRef,
}

impl Shelf {
    pub fn new(numbers: &[i64]) -> Rc<Self> {
        Rc::new(Shelf {
            numbers: ListRef::observable(Ty::Int, numbers.iter().copied().map(Value::Int).collect()),
        })
    }
}

impl DomainObject for Shelf {
    fn as_any(&self) -> &dyn Any {
        self
    }
}

pub struct Part {
    label: String,
}

impl DomainObject for Part {
    fn as_any(&self) -> &dyn Any {
        self
    }

    fn visible(&self) -> Option<VisibleInfo> {
        Some(VisibleInfo {
            header: format!("{} (self-described)", self.label),
            ..VisibleInfo::default()
        })
    }
}

pub struct Holder {
    pub part: Value,
    pub locked: Cell<i64>,
}

impl Holder {
    pub fn new(label: &str) -> Rc<Self> {
        Rc::new(Holder {
            part: Value::object(Part {
                label: label.to_string(),
            }),
            locked: Cell::new(7),
        })
    }
}

impl DomainObject for Holder {
    fn as_any(&self) -> &dyn Any {
        self
    }
}

pub struct World {
    pub registry: Registry,
    pub counter: TypeIdx,
    pub main: Rc<Counter>,
}

impl World {
    pub fn root(&self, header: &str, value: Value) -> ObjectNode {
        self.registry.add_value(header, value)
    }

    pub fn static_method(&self, name: &str) -> MethodNode {
        self.registry
            .lookup_by_name(name)
            .and_then(|node| node.as_method().cloned())
            .expect("static method is a root")
    }
}

fn shown(header: &str) -> Descriptor {
    Descriptor::new(header)
}

fn int_arg(args: &[Value], index: usize) -> EngineResult<i64> {
    args[index].as_int().ok_or_else(|| domain("expected an int"))
}

/// Register the domain. `share` turns the identity-keyed member cache on.
pub fn world_with(share: bool) -> World {
    let registry = Registry::builder()
        .warnings(WarningSink::buffered())
        .share_members(share)
        .build();
    let main = Counter::new(0);
    let main_value = Value::shared(main.clone());
    let counter_idx = registry.next_type_idx();
    let counter = registry
        .register(
            TypeBuilder::<Counter>::object("Counter")
                .property(
                    Property::new("Value", Ty::Int, |c: &Counter| c.get().into())
                        .set(|c: &Counter, v: Value| {
                            c.set(v.as_int().ok_or_else(|| domain("expected an int"))?);
                            Ok(())
                        })
                        .visible(shown("Value")),
                )
                .method(
                    Method::new("Increment", |c: &Counter, _: &[Value]| {
                        c.set(c.get() + 1);
                        Ok(Value::Void)
                    })
                    .visible(shown("Increment")),
                )
                .static_property(
                    Property::new("Main", Ty::Object(counter_idx), move |_: &Static| {
                        main_value.clone()
                    })
                    .visible(shown("Main")),
                )
                .static_method(
                    Method::new("Add", |_: &Static, args: &[Value]| {
                        Ok(Value::Int(int_arg(args, 0)? + int_arg(args, 1)?))
                    })
                    .param("a", Ty::Int)
                    .param("b", Ty::Int)
                    .returns(Ty::Int)
                    .visible(shown("Add")),
                )
                .static_method(
                    Method::new("IsEven", |_: &Static, args: &[Value]| {
                        Ok(Value::Bool(int_arg(args, 0)? % 2 == 0))
                    })
                    .param("n", Ty::Int)
                    .returns(Ty::Bool)
                    .visible(shown("IsEven")),
                ),
        )
        .unwrap();
    registry
        .register(
            TypeBuilder::<Shelf>::object("Shelf").property(
                Property::new("Numbers", Ty::list(Ty::Int), |s: &Shelf| {
                    s.numbers.clone().into()
                })
                .visible(shown("Numbers")),
            ),
        )
        .unwrap();
    let part = registry
        .register(
            TypeBuilder::<Part>::object("Part").property(
                Property::new("Label", Ty::Str, |p: &Part| p.label.as_str().into())
                    .visible(shown("Label")),
            ),
        )
        .unwrap();
    registry
        .register(
            TypeBuilder::<Holder>::object("Holder")
                .property(
                    Property::new("Part", Ty::Object(part), |h: &Holder| h.part.clone())
                        .visible(shown("Declared part")),
                )
                .property(
                    Property::new("Spare", Ty::Object(part), |_: &Holder| Value::Void)
                        .visible(shown("Spare part")),
                )
                .property(
                    Property::new("Locked", Ty::Int, |h: &Holder| h.locked.get().into())
                        .visible(shown("Locked")),
                )
                .property(
                    Property::new("Internal", Ty::Int, |_: &Holder| Value::Int(0))
                        .visible(Descriptor::hidden()),
                ),
        )
        .unwrap();
    registry.import_entry_types(&[counter]).unwrap();
    World {
        registry,
        counter,
        main,
    }
}

pub fn world() -> World {
    world_with(true)
}
