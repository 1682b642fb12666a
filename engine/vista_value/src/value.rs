//! The runtime value of a slot.

use std::fmt;
use std::rc::Rc;

use vista_types::{Ty, TypeIdx, TypeTable};

use crate::collection::{ListRef, MapRef, PairRef};
use crate::object::{DomainObject, IdentityKey, ObjectRef, WeakKind, WeakValue};

/// Payload of an enum value.
///
/// `bits` is an ordinal for plain enums and a variant bit set for flag enums.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct EnumValue {
    pub ty: TypeIdx,
    pub bits: u64,
}

/// A value held by a slot.
///
/// Primitives are stored inline. Collections and objects are shared handles;
/// cloning a `Value` never deep-copies domain state.
#[derive(Clone, Default)]
pub enum Value {
    /// Nothing loaded or assigned yet, or the result of a `void` operation.
    #[default]
    Void,
    Bool(bool),
    Int(i64),
    Double(f64),
    Str(Rc<str>),
    Enum(EnumValue),
    List(ListRef),
    Map(MapRef),
    Pair(PairRef),
    Object(ObjectRef),
}

// Factory methods

impl Value {
    #[inline]
    pub fn string(s: impl AsRef<str>) -> Self {
        Value::Str(Rc::from(s.as_ref()))
    }

    pub fn object<T: DomainObject>(object: T) -> Self {
        Value::Object(ObjectRef::new(object))
    }

    /// Wrap an object the caller keeps a handle to.
    pub fn shared<T: DomainObject>(object: Rc<T>) -> Self {
        Value::Object(ObjectRef::from_rc(object))
    }

    /// Observable list.
    pub fn list(elem: Ty, items: Vec<Value>) -> Self {
        Value::List(ListRef::observable(elem, items))
    }

    /// List without change notifications.
    pub fn plain_list(elem: Ty, items: Vec<Value>) -> Self {
        Value::List(ListRef::plain(elem, items))
    }

    /// Observable map.
    pub fn map(key: Ty, value: Ty, entries: Vec<(Value, Value)>) -> Self {
        Value::Map(MapRef::observable(key, value, entries))
    }

    pub fn variant(ty: TypeIdx, ordinal: u64) -> Self {
        Value::Enum(EnumValue { ty, bits: ordinal })
    }

    /// Flag enum value from variant positions.
    pub fn flags(ty: TypeIdx, positions: &[u32]) -> Self {
        let bits = positions
            .iter()
            .filter(|p| **p < 64)
            .fold(0u64, |acc, p| acc | (1u64 << p));
        Value::Enum(EnumValue { ty, bits })
    }
}

// Accessors

impl Value {
    #[inline]
    pub fn is_void(&self) -> bool {
        matches!(self, Value::Void)
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_int(&self) -> Option<i64> {
        match self {
            Value::Int(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_double(&self) -> Option<f64> {
        match self {
            Value::Double(d) => Some(*d),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Str(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_enum(&self) -> Option<EnumValue> {
        match self {
            Value::Enum(e) => Some(*e),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&ListRef> {
        match self {
            Value::List(l) => Some(l),
            _ => None,
        }
    }

    pub fn as_map(&self) -> Option<&MapRef> {
        match self {
            Value::Map(m) => Some(m),
            _ => None,
        }
    }

    pub fn as_pair(&self) -> Option<&PairRef> {
        match self {
            Value::Pair(p) => Some(p),
            _ => None,
        }
    }

    pub fn as_object(&self) -> Option<&ObjectRef> {
        match self {
            Value::Object(o) => Some(o),
            _ => None,
        }
    }

    /// Identity of reference values; `None` for primitives and enums.
    pub fn identity(&self) -> Option<IdentityKey> {
        match self {
            Value::List(l) => Some(l.identity()),
            Value::Map(m) => Some(m.identity()),
            Value::Pair(p) => Some(p.identity()),
            Value::Object(o) => Some(o.identity()),
            _ => None,
        }
    }

    pub fn downgrade(&self) -> Option<WeakValue> {
        match self {
            Value::List(l) => Some(l.downgrade()),
            Value::Map(m) => Some(m.downgrade()),
            Value::Pair(p) => Some(p.downgrade()),
            Value::Object(o) => Some(WeakValue(WeakKind::Object(o.downgrade()))),
            _ => None,
        }
    }

    /// Same allocation (reference values) or same primitive.
    pub fn same_identity(&self, other: &Value) -> bool {
        match (self.identity(), other.identity()) {
            (Some(a), Some(b)) => a == b,
            (None, None) => self == other,
            _ => false,
        }
    }

    /// The dynamic type of this value.
    ///
    /// Objects of an unregistered Rust type come back as [`Ty::Opaque`].
    pub fn runtime_ty(&self, types: &TypeTable) -> Ty {
        match self {
            Value::Void => Ty::Void,
            Value::Bool(_) => Ty::Bool,
            Value::Int(_) => Ty::Int,
            Value::Double(_) => Ty::Double,
            Value::Str(_) => Ty::Str,
            Value::Enum(e) => Ty::Enum(e.ty),
            Value::List(l) => l.ty(),
            Value::Map(m) => m.ty(),
            Value::Pair(p) => p.ty(),
            Value::Object(o) => types
                .by_rust_type(o.rust_type())
                .map_or_else(|| Ty::opaque(o.get().type_name()), Ty::Object),
        }
    }

    /// Short label of the variant, for diagnostics.
    pub fn kind_name(&self) -> &'static str {
        match self {
            Value::Void => "void",
            Value::Bool(_) => "bool",
            Value::Int(_) => "int",
            Value::Double(_) => "double",
            Value::Str(_) => "str",
            Value::Enum(_) => "enum",
            Value::List(_) => "list",
            Value::Map(_) => "map",
            Value::Pair(_) => "pair",
            Value::Object(_) => "object",
        }
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Void, Value::Void) => true,
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::Int(a), Value::Int(b)) => a == b,
            (Value::Double(a), Value::Double(b)) => a == b,
            (Value::Str(a), Value::Str(b)) => a == b,
            (Value::Enum(a), Value::Enum(b)) => a == b,
            (Value::List(a), Value::List(b)) => a.identity() == b.identity(),
            (Value::Map(a), Value::Map(b)) => a.identity() == b.identity(),
            (Value::Pair(a), Value::Pair(b)) => a.identity() == b.identity(),
            (Value::Object(a), Value::Object(b)) => a == b,
            _ => false,
        }
    }
}

impl fmt::Debug for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Void => write!(f, "Void"),
            Value::Bool(b) => write!(f, "Bool({b})"),
            Value::Int(n) => write!(f, "Int({n})"),
            Value::Double(d) => write!(f, "Double({d})"),
            Value::Str(s) => write!(f, "Str({s:?})"),
            Value::Enum(e) => write!(f, "Enum({:?}, {})", e.ty, e.bits),
            Value::List(l) => write!(f, "List({l:?})"),
            Value::Map(m) => write!(f, "Map({m:?})"),
            Value::Pair(p) => write!(f, "Pair({p:?})"),
            Value::Object(o) => write!(f, "{o:?}"),
        }
    }
}

/// Preview rendering without type information.
///
/// Enum variant names need the type table; the tree renders those itself.
impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Void => Ok(()),
            Value::Bool(b) => write!(f, "{b}"),
            Value::Int(n) => write!(f, "{n}"),
            Value::Double(d) => write!(f, "{d}"),
            Value::Str(s) => f.write_str(s),
            Value::Enum(e) => write!(f, "#{}", e.bits),
            Value::List(l) => write!(f, "[{} items]", l.len()),
            Value::Map(m) => write!(f, "{{{} entries}}", m.len()),
            Value::Pair(p) => write!(f, "{}: {}", p.key(), p.value()),
            Value::Object(o) => f.write_str(&o.get().display()),
        }
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Value::Int(n)
    }
}

impl From<i32> for Value {
    fn from(n: i32) -> Self {
        Value::Int(i64::from(n))
    }
}

impl From<f64> for Value {
    fn from(d: f64) -> Self {
        Value::Double(d)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::string(s)
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Str(Rc::from(s))
    }
}

impl From<ObjectRef> for Value {
    fn from(o: ObjectRef) -> Self {
        Value::Object(o)
    }
}

impl From<ListRef> for Value {
    fn from(l: ListRef) -> Self {
        Value::List(l)
    }
}

impl From<MapRef> for Value {
    fn from(m: MapRef) -> Self {
        Value::Map(m)
    }
}

/// Typed extraction from a [`Value`].
pub trait FromValue: Sized {
    fn from_value(value: &Value) -> Option<Self>;
}

impl FromValue for Value {
    fn from_value(value: &Value) -> Option<Self> {
        Some(value.clone())
    }
}

impl FromValue for bool {
    fn from_value(value: &Value) -> Option<Self> {
        value.as_bool()
    }
}

impl FromValue for i64 {
    fn from_value(value: &Value) -> Option<Self> {
        value.as_int()
    }
}

impl FromValue for f64 {
    fn from_value(value: &Value) -> Option<Self> {
        value.as_double()
    }
}

impl FromValue for String {
    fn from_value(value: &Value) -> Option<Self> {
        value.as_str().map(str::to_string)
    }
}

impl FromValue for EnumValue {
    fn from_value(value: &Value) -> Option<Self> {
        value.as_enum()
    }
}

impl FromValue for ObjectRef {
    fn from_value(value: &Value) -> Option<Self> {
        value.as_object().cloned()
    }
}

impl FromValue for ListRef {
    fn from_value(value: &Value) -> Option<Self> {
        value.as_list().cloned()
    }
}

impl FromValue for MapRef {
    fn from_value(value: &Value) -> Option<Self> {
        value.as_map().cloned()
    }
}
