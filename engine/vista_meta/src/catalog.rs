//! Per-type member tables.

use std::marker::PhantomData;
use std::rc::Rc;

use rustc_hash::FxHashMap;
use vista_types::errors::{domain, EngineResult};
use vista_types::{EnumInfo, Ty, TypeIdx, TypeTable};
use vista_value::{DomainObject, Value};

use crate::member::{Method, MethodDef, Property, PropertyDef, Static};
use crate::Descriptor;

/// Registration of one object type.
pub struct TypeBuilder<T> {
    name: String,
    base: Option<TypeIdx>,
    properties: Vec<PropertyDef>,
    methods: Vec<MethodDef>,
    static_properties: Vec<PropertyDef>,
    static_methods: Vec<MethodDef>,
    _type: PhantomData<fn(&T)>,
}

impl<T: DomainObject> TypeBuilder<T> {
    pub fn object(name: impl Into<String>) -> Self {
        TypeBuilder {
            name: name.into(),
            base: None,
            properties: Vec::new(),
            methods: Vec::new(),
            static_properties: Vec::new(),
            static_methods: Vec::new(),
            _type: PhantomData,
        }
    }

    /// Inherit members of a previously registered type.
    #[must_use]
    pub fn extends(mut self, base: TypeIdx) -> Self {
        self.base = Some(base);
        self
    }

    #[must_use]
    pub fn property(mut self, property: Property<T>) -> Self {
        self.properties.push(property.into_def(false));
        self
    }

    #[must_use]
    pub fn method(mut self, method: Method<T>) -> Self {
        self.methods.push(method.into_def(false));
        self
    }

    #[must_use]
    pub fn static_property(mut self, property: Property<Static>) -> Self {
        self.static_properties.push(property.into_def(true));
        self
    }

    #[must_use]
    pub fn static_method(mut self, method: Method<Static>) -> Self {
        self.static_methods.push(method.into_def(true));
        self
    }
}

#[derive(Default)]
struct Members {
    properties: Vec<Rc<PropertyDef>>,
    methods: Vec<Rc<MethodDef>>,
}

/// Type table plus member tables, built once at registration time.
#[derive(Default)]
pub struct Catalog {
    types: TypeTable,
    instance: FxHashMap<TypeIdx, Members>,
    statics: FxHashMap<TypeIdx, Members>,
}

impl Catalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn types(&self) -> &TypeTable {
        &self.types
    }

    pub fn register<T: DomainObject>(&mut self, builder: TypeBuilder<T>) -> EngineResult<TypeIdx> {
        let idx = self.types.declare_object::<T>(&builder.name, builder.base)?;
        tracing::debug!(
            name = %builder.name,
            properties = builder.properties.len(),
            methods = builder.methods.len(),
            statics = builder.static_properties.len() + builder.static_methods.len(),
            "registered type"
        );
        self.instance.insert(
            idx,
            Members {
                properties: builder.properties.into_iter().map(Rc::new).collect(),
                methods: builder.methods.into_iter().map(Rc::new).collect(),
            },
        );
        self.statics.insert(
            idx,
            Members {
                properties: builder.static_properties.into_iter().map(Rc::new).collect(),
                methods: builder.static_methods.into_iter().map(Rc::new).collect(),
            },
        );
        Ok(idx)
    }

    pub fn register_enum(
        &mut self,
        name: &str,
        variants: &[&str],
        flags: bool,
    ) -> EngineResult<TypeIdx> {
        self.types.declare_enum(
            name,
            EnumInfo {
                variants: variants.iter().map(|v| (*v).to_string()).collect(),
                flags,
            },
        )
    }

    /// Instance properties visible on `ty`, base members first.
    ///
    /// A derived property with the same name replaces the inherited one in
    /// place.
    pub fn properties_of(&self, ty: &Ty) -> Vec<Rc<PropertyDef>> {
        match ty {
            Ty::Object(idx) => self.collect_inherited(*idx, |m| &m.properties, |p| &p.name),
            Ty::Pair(key, value) => pair_members((**key).clone(), (**value).clone()),
            _ => Vec::new(),
        }
    }

    /// Instance methods visible on `ty`, base members first.
    pub fn methods_of(&self, ty: &Ty) -> Vec<Rc<MethodDef>> {
        match ty {
            Ty::Object(idx) => self.collect_inherited(*idx, |m| &m.methods, |m| &m.name),
            _ => Vec::new(),
        }
    }

    pub fn static_properties(&self, idx: TypeIdx) -> Vec<Rc<PropertyDef>> {
        self.statics
            .get(&idx)
            .map(|m| m.properties.clone())
            .unwrap_or_default()
    }

    pub fn static_methods(&self, idx: TypeIdx) -> Vec<Rc<MethodDef>> {
        self.statics
            .get(&idx)
            .map(|m| m.methods.clone())
            .unwrap_or_default()
    }

    pub fn find_property(&self, ty: &Ty, name: &str) -> Option<Rc<PropertyDef>> {
        self.properties_of(ty).into_iter().find(|p| p.name == name)
    }

    pub fn find_method(&self, ty: &Ty, name: &str) -> Option<Rc<MethodDef>> {
        self.methods_of(ty).into_iter().find(|m| m.name == name)
    }

    fn collect_inherited<M>(
        &self,
        idx: TypeIdx,
        list: impl Fn(&Members) -> &Vec<Rc<M>>,
        name: impl Fn(&M) -> &String,
    ) -> Vec<Rc<M>> {
        let chain: Vec<TypeIdx> = self.types.ancestors(idx).collect();
        let mut out: Vec<Rc<M>> = Vec::new();
        for ty in chain.iter().rev() {
            let Some(members) = self.instance.get(ty) else {
                continue;
            };
            for member in list(members) {
                match out.iter().position(|m| name(m) == name(member)) {
                    Some(pos) => out[pos] = Rc::clone(member),
                    None => out.push(Rc::clone(member)),
                }
            }
        }
        out
    }
}

/// Built-in members of a map entry: read-only `Key`, writable `Value`.
fn pair_members(key_ty: Ty, value_ty: Ty) -> Vec<Rc<PropertyDef>> {
    fn pair(receiver: &Value) -> EngineResult<&vista_value::PairRef> {
        receiver
            .as_pair()
            .ok_or_else(|| domain("receiver is not a map entry"))
    }

    let key = PropertyDef::from_parts(
        "Key",
        key_ty,
        |receiver| Ok(pair(receiver)?.key()),
        None,
        Some(Descriptor::new("Key")),
    );
    let value = PropertyDef::from_parts(
        "Value",
        value_ty,
        |receiver| Ok(pair(receiver)?.value()),
        Some(Rc::new(|receiver: &Value, value: Value| {
            pair(receiver)?.set_value(value);
            Ok(())
        })),
        Some(Descriptor::new("Value")),
    );
    vec![Rc::new(key), Rc::new(value)]
}
