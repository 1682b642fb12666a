//! Domain objects and identity.

use std::any::{Any, TypeId};
use std::fmt;
use std::rc::{Rc, Weak};

use crate::collection::{ListCell, MapCell, PairCell};
use crate::notify::ChangeNotifier;

/// A property of a domain object changed.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PropertyChanged {
    pub name: String,
}

impl PropertyChanged {
    pub fn new(name: impl Into<String>) -> Self {
        PropertyChanged { name: name.into() }
    }
}

/// Display metadata a domain object supplies about itself.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct VisibleInfo {
    pub name: Option<String>,
    pub header: String,
    pub description: String,
}

/// A user type that can sit in a projected graph.
///
/// Domain objects are shared through [`ObjectRef`] and mutated through
/// interior mutability. Only `as_any` is required.
pub trait DomainObject: Any {
    fn as_any(&self) -> &dyn Any;

    /// Property change notifications, if the type raises them.
    fn notifier(&self) -> Option<&ChangeNotifier<PropertyChanged>> {
        None
    }

    /// Self-description, consulted before any static declaration.
    fn visible(&self) -> Option<VisibleInfo> {
        None
    }

    /// Domain equality. Identity is always equal regardless.
    fn equals(&self, _other: &dyn DomainObject) -> bool {
        false
    }

    /// Default preview text.
    fn display(&self) -> String {
        self.type_name().rsplit("::").next().unwrap_or_default().to_string()
    }

    fn type_name(&self) -> &'static str {
        std::any::type_name::<Self>()
    }
}

/// Address-based identity of a reference value.
///
/// Only meaningful while the value is alive; pair it with a [`WeakValue`]
/// when storing it.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct IdentityKey(usize);

impl IdentityKey {
    pub(crate) fn of<T: ?Sized>(rc: &Rc<T>) -> Self {
        IdentityKey(Rc::as_ptr(rc).cast::<()>() as usize)
    }
}

/// Shared handle to a domain object.
#[derive(Clone)]
pub struct ObjectRef(Rc<dyn DomainObject>);

impl ObjectRef {
    pub fn new<T: DomainObject>(object: T) -> Self {
        ObjectRef(Rc::new(object))
    }

    /// Share an object the caller keeps its own handle to.
    pub fn from_rc<T: DomainObject>(object: Rc<T>) -> Self {
        ObjectRef(object)
    }

    pub fn downcast_ref<T: 'static>(&self) -> Option<&T> {
        self.0.as_any().downcast_ref::<T>()
    }

    pub fn get(&self) -> &dyn DomainObject {
        &*self.0
    }

    /// Rust type of the concrete object.
    pub fn rust_type(&self) -> TypeId {
        self.0.as_any().type_id()
    }

    pub fn identity(&self) -> IdentityKey {
        IdentityKey::of(&self.0)
    }

    pub fn ptr_eq(&self, other: &ObjectRef) -> bool {
        self.identity() == other.identity()
    }

    pub(crate) fn downgrade(&self) -> Weak<dyn DomainObject> {
        Rc::downgrade(&self.0)
    }
}

impl PartialEq for ObjectRef {
    fn eq(&self, other: &Self) -> bool {
        self.ptr_eq(other) || self.0.equals(other.get())
    }
}

impl fmt::Debug for ObjectRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Object({})", self.0.display())
    }
}

/// Non-owning handle to a reference value.
#[derive(Clone)]
pub struct WeakValue(pub(crate) WeakKind);

#[derive(Clone)]
pub(crate) enum WeakKind {
    Object(Weak<dyn DomainObject>),
    List(Weak<ListCell>),
    Map(Weak<MapCell>),
    Pair(Weak<PairCell>),
}

impl WeakValue {
    pub fn is_alive(&self) -> bool {
        match &self.0 {
            WeakKind::Object(w) => w.strong_count() > 0,
            WeakKind::List(w) => w.strong_count() > 0,
            WeakKind::Map(w) => w.strong_count() > 0,
            WeakKind::Pair(w) => w.strong_count() > 0,
        }
    }
}

impl fmt::Debug for WeakValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let kind = match &self.0 {
            WeakKind::Object(_) => "Object",
            WeakKind::List(_) => "List",
            WeakKind::Map(_) => "Map",
            WeakKind::Pair(_) => "Pair",
        };
        write!(f, "WeakValue::{kind}(alive: {})", self.is_alive())
    }
}

#[cfg(test)]
mod tests;
