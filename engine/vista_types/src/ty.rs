//! Type descriptors.

use std::fmt;

/// Index of an object or enum type in a [`TypeTable`](crate::TypeTable).
///
/// Indices are handed out in registration order and are only meaningful
/// for the table that issued them.
#[derive(Copy, Clone, Eq, PartialEq, Hash, PartialOrd, Ord)]
#[repr(transparent)]
pub struct TypeIdx(u32);

impl TypeIdx {
    /// Create an index from a raw position.
    #[inline]
    pub const fn from_raw(raw: u32) -> Self {
        TypeIdx(raw)
    }

    /// Raw position in the table.
    #[inline]
    pub const fn raw(self) -> u32 {
        self.0
    }

    #[inline]
    pub(crate) fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Debug for TypeIdx {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "TypeIdx({})", self.0)
    }
}

/// The static type of a slot or value.
///
/// Primitive types are inline. Registered types carry their [`TypeIdx`].
/// `Opaque` names something the engine cannot project; it exists so that a
/// registration can describe such a member and the classifier can refuse it
/// by name.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum Ty {
    /// No value (operation results only).
    Void,
    Bool,
    Int,
    Double,
    Str,
    /// Ordered, one-dimensional list of elements.
    List(Box<Ty>),
    /// Insertion-ordered dictionary, projected as a sequence of pairs.
    Map(Box<Ty>, Box<Ty>),
    /// One key/value entry of a map.
    Pair(Box<Ty>, Box<Ty>),
    /// A registered domain object type.
    Object(TypeIdx),
    /// A registered enum type.
    Enum(TypeIdx),
    /// A foreign type the engine does not support.
    Opaque(Box<str>),
}

impl Ty {
    /// `List<elem>`.
    pub fn list(elem: Ty) -> Self {
        Ty::List(Box::new(elem))
    }

    /// `Map<key, value>`.
    pub fn map(key: Ty, value: Ty) -> Self {
        Ty::Map(Box::new(key), Box::new(value))
    }

    /// `Pair<key, value>`.
    pub fn pair(key: Ty, value: Ty) -> Self {
        Ty::Pair(Box::new(key), Box::new(value))
    }

    /// An unsupported foreign type.
    pub fn opaque(name: impl Into<Box<str>>) -> Self {
        Ty::Opaque(name.into())
    }

    #[inline]
    pub fn is_void(&self) -> bool {
        matches!(self, Ty::Void)
    }

    /// Element type of a collection type, as seen by the tree.
    ///
    /// Maps project to their pair type.
    pub fn element(&self) -> Option<Ty> {
        match self {
            Ty::List(elem) => Some((**elem).clone()),
            Ty::Map(key, value) => Some(Ty::Pair(key.clone(), value.clone())),
            _ => None,
        }
    }

    /// Registered type index, for object and enum types.
    pub fn type_idx(&self) -> Option<TypeIdx> {
        match self {
            Ty::Object(idx) | Ty::Enum(idx) => Some(*idx),
            _ => None,
        }
    }
}
