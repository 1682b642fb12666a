//! Type classification, identity and subtyping.
//!
//! The tree only ever reasons about seven categories. Primitive categories
//! compare structurally; collection, object and enum categories compare by
//! exact type, and only objects participate in subtyping.

use std::fmt;

use crate::errors::{invalid_type, EngineResult};
use crate::{Ty, TypeTable};

/// Category of a type, as far as the tree is concerned.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum TypeClass {
    Bool,
    Int,
    Double,
    String,
    Collection,
    Object,
    Enum,
}

impl TypeClass {
    /// Copied by value; never has members or elements.
    pub fn is_primitive(self) -> bool {
        matches!(
            self,
            TypeClass::Bool | TypeClass::Int | TypeClass::Double | TypeClass::String
        )
    }

    /// Leaf classes render as a single value in a tree.
    pub fn is_leaf(self) -> bool {
        self.is_primitive() || self == TypeClass::Enum
    }

    /// Has identity and may be shared between several slots.
    pub fn is_reference(self) -> bool {
        matches!(self, TypeClass::Collection | TypeClass::Object)
    }

    /// Values of the class have a total order usable as a sort key.
    pub fn is_orderable(self) -> bool {
        !self.is_reference()
    }
}

impl fmt::Display for TypeClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            TypeClass::Bool => "bool",
            TypeClass::Int => "int",
            TypeClass::Double => "double",
            TypeClass::String => "string",
            TypeClass::Collection => "collection",
            TypeClass::Object => "object",
            TypeClass::Enum => "enum",
        })
    }
}

/// Classify `ty`, refusing anything outside the supported categories.
pub fn classify(ty: &Ty) -> EngineResult<TypeClass> {
    match ty {
        Ty::Bool => Ok(TypeClass::Bool),
        Ty::Int => Ok(TypeClass::Int),
        Ty::Double => Ok(TypeClass::Double),
        Ty::Str => Ok(TypeClass::String),
        Ty::List(_) | Ty::Map(..) => Ok(TypeClass::Collection),
        Ty::Pair(..) | Ty::Object(_) => Ok(TypeClass::Object),
        Ty::Enum(_) => Ok(TypeClass::Enum),
        Ty::Void => Err(invalid_type("void")),
        Ty::Opaque(name) => Err(invalid_type(name.as_ref())),
    }
}

impl TypeTable {
    /// Same type, per category rules.
    ///
    /// Unsupported types are never the same as anything.
    pub fn is_same(&self, a: &Ty, b: &Ty) -> bool {
        match (classify(a), classify(b)) {
            (Ok(ca), Ok(cb)) if ca == cb => {
                if ca.is_primitive() {
                    true
                } else {
                    a == b
                }
            }
            _ => false,
        }
    }

    /// `a` is `target` or one of its subtypes.
    ///
    /// Primitives match exactly. Objects walk the base chain. Collections
    /// are invariant in their element types.
    pub fn is_derived_from(&self, a: &Ty, target: &Ty) -> bool {
        let (Ok(ca), Ok(ct)) = (classify(a), classify(target)) else {
            return false;
        };
        if ca != ct {
            return false;
        }
        match (a, target) {
            (Ty::Object(sub), Ty::Object(sup)) => self.ancestors(*sub).any(|idx| idx == *sup),
            _ if ca.is_primitive() => a == target,
            _ => self.is_same(a, target),
        }
    }

    /// A value of type `source` may be stored into a slot of type `target`.
    #[inline]
    pub fn is_assignable(&self, target: &Ty, source: &Ty) -> bool {
        self.is_derived_from(source, target)
    }
}
