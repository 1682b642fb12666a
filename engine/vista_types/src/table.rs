//! Table of registered object and enum types.
//!
//! # Design
//!
//! - Definitions stored densely, addressed by [`TypeIdx`]
//! - Dual indexing: `BTreeMap` by name for sorted iteration, `FxHashMap`
//!   by Rust `TypeId` so a domain object can find its own definition

use std::any::TypeId;
use std::collections::BTreeMap;

use rustc_hash::FxHashMap;

use crate::errors::{duplicate_type, EngineResult};
use crate::{Ty, TypeIdx};

/// Variant list of a registered enum.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct EnumInfo {
    /// Variant names, in declaration order.
    pub variants: Vec<String>,
    /// Bit-flag enum: a value may combine several variants.
    pub flags: bool,
}

impl EnumInfo {
    /// Render an enum payload as variant names.
    ///
    /// Plain enums treat `bits` as an ordinal. Flag enums treat bit `i` as
    /// variant `i` and join the set variants with ` | `.
    pub fn render(&self, bits: u64) -> String {
        if self.flags {
            let names: Vec<&str> = self
                .variants
                .iter()
                .enumerate()
                .filter(|(i, _)| *i < 64 && bits & (1u64 << i) != 0)
                .map(|(_, v)| v.as_str())
                .collect();
            if names.is_empty() {
                String::from("(none)")
            } else {
                names.join(" | ")
            }
        } else {
            usize::try_from(bits)
                .ok()
                .and_then(|i| self.variants.get(i))
                .cloned()
                .unwrap_or_else(|| format!("#{bits}"))
        }
    }
}

/// What a registered type is.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum TypeKind {
    Object,
    Enum(EnumInfo),
}

/// A registered type.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct TypeDef {
    pub name: String,
    pub kind: TypeKind,
    /// Direct supertype, for object types.
    pub base: Option<TypeIdx>,
}

/// All object and enum types known to one engine instance.
#[derive(Clone, Debug, Default)]
pub struct TypeTable {
    defs: Vec<TypeDef>,
    by_name: BTreeMap<String, TypeIdx>,
    by_rust: FxHashMap<TypeId, TypeIdx>,
}

impl TypeTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register the object type backed by Rust type `T`.
    pub fn declare_object<T: 'static>(
        &mut self,
        name: &str,
        base: Option<TypeIdx>,
    ) -> EngineResult<TypeIdx> {
        let idx = self.push(TypeDef {
            name: name.to_string(),
            kind: TypeKind::Object,
            base,
        })?;
        self.by_rust.insert(TypeId::of::<T>(), idx);
        tracing::debug!(name, ?idx, ?base, "declared object type");
        Ok(idx)
    }

    /// Register an enum type.
    pub fn declare_enum(&mut self, name: &str, info: EnumInfo) -> EngineResult<TypeIdx> {
        let idx = self.push(TypeDef {
            name: name.to_string(),
            kind: TypeKind::Enum(info),
            base: None,
        })?;
        tracing::debug!(name, ?idx, "declared enum type");
        Ok(idx)
    }

    fn push(&mut self, def: TypeDef) -> EngineResult<TypeIdx> {
        if self.by_name.contains_key(&def.name) {
            return Err(duplicate_type(def.name));
        }
        let raw = u32::try_from(self.defs.len()).map_err(|_| duplicate_type(def.name.clone()))?;
        let idx = TypeIdx::from_raw(raw);
        self.by_name.insert(def.name.clone(), idx);
        self.defs.push(def);
        Ok(idx)
    }

    /// Index the next declaration will receive, for types that refer to
    /// themselves.
    pub fn next_idx(&self) -> TypeIdx {
        TypeIdx::from_raw(u32::try_from(self.defs.len()).unwrap_or(u32::MAX))
    }

    pub fn get(&self, idx: TypeIdx) -> Option<&TypeDef> {
        self.defs.get(idx.index())
    }

    pub fn lookup(&self, name: &str) -> Option<TypeIdx> {
        self.by_name.get(name).copied()
    }

    /// The registered type for a Rust type, if any.
    pub fn by_rust_type(&self, id: TypeId) -> Option<TypeIdx> {
        self.by_rust.get(&id).copied()
    }

    pub fn enum_info(&self, idx: TypeIdx) -> Option<&EnumInfo> {
        match &self.get(idx)?.kind {
            TypeKind::Enum(info) => Some(info),
            TypeKind::Object => None,
        }
    }

    /// `idx` followed by its supertypes, nearest first.
    pub fn ancestors(&self, idx: TypeIdx) -> impl Iterator<Item = TypeIdx> + '_ {
        let mut next = Some(idx);
        // Bounded by table size so a malformed base chain cannot spin.
        let mut budget = self.defs.len() + 1;
        std::iter::from_fn(move || {
            if budget == 0 {
                return None;
            }
            budget -= 1;
            let current = next?;
            next = self.get(current).and_then(|def| def.base);
            Some(current)
        })
    }

    /// Registered type names in sorted order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.by_name.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.defs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.defs.is_empty()
    }

    /// Human-readable name of a type.
    pub fn name_of(&self, ty: &Ty) -> String {
        match ty {
            Ty::Void => "void".into(),
            Ty::Bool => "bool".into(),
            Ty::Int => "int".into(),
            Ty::Double => "double".into(),
            Ty::Str => "str".into(),
            Ty::List(elem) => format!("[{}]", self.name_of(elem)),
            Ty::Map(k, v) => format!("{{{}: {}}}", self.name_of(k), self.name_of(v)),
            Ty::Pair(k, v) => format!("({}, {})", self.name_of(k), self.name_of(v)),
            Ty::Object(idx) | Ty::Enum(idx) => self
                .get(*idx)
                .map_or_else(|| format!("{idx:?}"), |def| def.name.clone()),
            Ty::Opaque(name) => name.to_string(),
        }
    }
}
