use super::*;
use pretty_assertions::assert_eq;
use std::cell::Cell;

struct Lamp {
    lit: Cell<bool>,
    events: ChangeNotifier<PropertyChanged>,
}

impl DomainObject for Lamp {
    fn as_any(&self) -> &dyn Any {
        self
    }

    fn notifier(&self) -> Option<&ChangeNotifier<PropertyChanged>> {
        Some(&self.events)
    }
}

struct Tag(&'static str);

impl DomainObject for Tag {
    fn as_any(&self) -> &dyn Any {
        self
    }

    fn equals(&self, other: &dyn DomainObject) -> bool {
        other
            .as_any()
            .downcast_ref::<Tag>()
            .is_some_and(|o| o.0 == self.0)
    }
}

#[test]
fn downcast_to_concrete_type() {
    let lamp = ObjectRef::new(Lamp {
        lit: Cell::new(true),
        events: ChangeNotifier::new(),
    });
    assert!(lamp.downcast_ref::<Lamp>().unwrap().lit.get());
    assert!(lamp.downcast_ref::<Tag>().is_none());
    assert_eq!(lamp.rust_type(), TypeId::of::<Lamp>());
}

#[test]
fn identity_follows_allocation() {
    let a = ObjectRef::new(Tag("x"));
    let b = a.clone();
    let c = ObjectRef::new(Tag("x"));
    assert_eq!(a.identity(), b.identity());
    assert_ne!(a.identity(), c.identity());
    assert!(a.ptr_eq(&b));
    assert!(!a.ptr_eq(&c));
}

#[test]
fn domain_equality_is_consulted() {
    let a = ObjectRef::new(Tag("x"));
    let c = ObjectRef::new(Tag("x"));
    let d = ObjectRef::new(Tag("y"));
    assert_eq!(a, c);
    assert_ne!(a, d);
}

#[test]
fn default_display_is_short_type_name() {
    assert_eq!(ObjectRef::new(Tag("x")).get().display(), "Tag");
}

#[test]
fn weak_tracks_liveness() {
    let a = ObjectRef::new(Tag("x"));
    let weak = WeakValue(WeakKind::Object(a.downgrade()));
    assert!(weak.is_alive());
    drop(a);
    assert!(!weak.is_alive());
}
