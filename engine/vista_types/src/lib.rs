//! Vista Types - type table and classifier for the vista engine.
//!
//! Every domain value the engine touches has a [`Ty`]. The classifier maps a
//! `Ty` onto one of seven [`TypeClass`]es, which is all the tree needs to
//! decide between value and reference handling:
//!
//! - `Bool`, `Int`, `Double`, `String`: leaf values, copied in and out
//! - `Enum`: leaf values with a fixed candidate list
//! - `Collection`: lists and maps, projected element by element
//! - `Object`: registered domain types, projected member by member
//!
//! Anything else (`void`, opaque foreign types) is rejected with
//! [`EngineError::InvalidType`].
//!
//! Object and enum types live in a [`TypeTable`] and are referenced by a
//! 32-bit [`TypeIdx`]. Subtyping is single inheritance through
//! [`TypeDef::base`].

mod classify;
pub mod errors;
mod table;
mod ty;

pub use classify::{classify, TypeClass};
pub use errors::{EngineError, EngineResult};
pub use table::{EnumInfo, TypeDef, TypeKind, TypeTable};
pub use ty::{Ty, TypeIdx};
