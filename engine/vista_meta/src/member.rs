//! Property and method definitions.
//!
//! User closures are typed against the receiver (`&T` for instance members,
//! [`Static`] for static ones) and erased into `Rc<dyn Fn>` over [`Value`]s
//! when the member is built.

use std::fmt;
use std::marker::PhantomData;
use std::rc::Rc;

use smallvec::SmallVec;
use vista_types::errors::{arity_mismatch, receiver_mismatch, EngineResult};
use vista_types::{Ty, TypeTable};
use vista_value::{DomainObject, ObjectRef, Value};

use crate::Descriptor;

/// Receiver of static members.
#[derive(Copy, Clone, Debug, Default)]
pub struct Static;

/// Something a member closure can be called on.
pub trait Receiver: 'static {
    fn extract(value: &Value) -> EngineResult<&Self>;
}

impl<T: DomainObject> Receiver for T {
    fn extract(value: &Value) -> EngineResult<&Self> {
        value
            .as_object()
            .and_then(ObjectRef::downcast_ref::<T>)
            .ok_or_else(|| receiver_mismatch(std::any::type_name::<T>()))
    }
}

impl Receiver for Static {
    fn extract(_: &Value) -> EngineResult<&Self> {
        Ok(&Static)
    }
}

type Getter = Rc<dyn Fn(&Value) -> EngineResult<Value>>;
type Setter = Rc<dyn Fn(&Value, Value) -> EngineResult<()>>;
type Invoker = Rc<dyn Fn(&Value, &[Value]) -> EngineResult<Value>>;

/// A registered property.
pub struct PropertyDef {
    pub name: String,
    pub ty: Ty,
    pub declared: Option<Descriptor>,
    pub is_static: bool,
    getter: Getter,
    setter: Option<Setter>,
}

impl PropertyDef {
    /// Read the property from `receiver` (`Value::Void` for statics).
    pub fn get(&self, receiver: &Value) -> EngineResult<Value> {
        (self.getter)(receiver)
    }

    /// Write the property. Callers check [`is_writable`](Self::is_writable) first.
    pub fn set(&self, receiver: &Value, value: Value) -> EngineResult<()> {
        match &self.setter {
            Some(setter) => setter(receiver, value),
            None => Err(vista_types::errors::read_only(self.name.clone())),
        }
    }

    pub fn is_writable(&self) -> bool {
        self.setter.is_some()
    }

    /// Build a property directly from erased closures.
    pub fn from_parts(
        name: impl Into<String>,
        ty: Ty,
        getter: impl Fn(&Value) -> EngineResult<Value> + 'static,
        setter: Option<Rc<dyn Fn(&Value, Value) -> EngineResult<()>>>,
        declared: Option<Descriptor>,
    ) -> Self {
        PropertyDef {
            name: name.into(),
            ty,
            declared,
            is_static: false,
            getter: Rc::new(getter),
            setter,
        }
    }
}

impl fmt::Debug for PropertyDef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PropertyDef")
            .field("name", &self.name)
            .field("ty", &self.ty)
            .field("writable", &self.is_writable())
            .field("static", &self.is_static)
            .finish_non_exhaustive()
    }
}

/// Builder for a property on receiver `R`.
pub struct Property<R> {
    def: PropertyDef,
    _receiver: PhantomData<fn(&R)>,
}

impl<R: Receiver> Property<R> {
    pub fn new(name: impl Into<String>, ty: Ty, get: impl Fn(&R) -> Value + 'static) -> Self {
        Self::try_new(name, ty, move |r| Ok(get(r)))
    }

    /// Property whose getter may fail.
    pub fn try_new(
        name: impl Into<String>,
        ty: Ty,
        get: impl Fn(&R) -> EngineResult<Value> + 'static,
    ) -> Self {
        Property {
            def: PropertyDef {
                name: name.into(),
                ty,
                declared: None,
                is_static: false,
                getter: Rc::new(move |receiver: &Value| get(R::extract(receiver)?)),
                setter: None,
            },
            _receiver: PhantomData,
        }
    }

    #[must_use]
    pub fn set(mut self, set: impl Fn(&R, Value) -> EngineResult<()> + 'static) -> Self {
        self.def.setter = Some(Rc::new(move |receiver: &Value, value: Value| {
            set(R::extract(receiver)?, value)
        }));
        self
    }

    /// Static declaration used by the resolver's last tier.
    #[must_use]
    pub fn visible(mut self, descriptor: Descriptor) -> Self {
        self.def.declared = Some(descriptor);
        self
    }

    pub(crate) fn into_def(self, is_static: bool) -> PropertyDef {
        PropertyDef {
            is_static,
            ..self.def
        }
    }
}

/// A formal parameter.
#[derive(Clone, Debug)]
pub struct ParamDef {
    pub name: String,
    pub ty: Ty,
    pub declared: Option<Descriptor>,
}

impl ParamDef {
    pub fn new(name: impl Into<String>, ty: Ty) -> Self {
        ParamDef {
            name: name.into(),
            ty,
            declared: None,
        }
    }

    #[must_use]
    pub fn visible(mut self, descriptor: Descriptor) -> Self {
        self.declared = Some(descriptor);
        self
    }
}

/// A registered operation.
pub struct MethodDef {
    pub name: String,
    pub params: SmallVec<[ParamDef; 4]>,
    pub ret: Ty,
    pub declared: Option<Descriptor>,
    pub is_static: bool,
    invoker: Invoker,
}

impl MethodDef {
    /// Call the operation. Argument count must match the parameter list.
    pub fn invoke(&self, receiver: &Value, args: &[Value]) -> EngineResult<Value> {
        if args.len() != self.params.len() {
            return Err(arity_mismatch(&self.name, self.params.len(), args.len()));
        }
        (self.invoker)(receiver, args)
    }

    pub fn returns_void(&self) -> bool {
        self.ret.is_void()
    }

    /// `Name(a: int, b: int) -> int`.
    pub fn signature(&self, types: &TypeTable) -> String {
        let params: Vec<String> = self
            .params
            .iter()
            .map(|p| format!("{}: {}", p.name, types.name_of(&p.ty)))
            .collect();
        let mut text = format!("{}({})", self.name, params.join(", "));
        if !self.ret.is_void() {
            text.push_str(" -> ");
            text.push_str(&types.name_of(&self.ret));
        }
        text
    }
}

impl fmt::Debug for MethodDef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MethodDef")
            .field("name", &self.name)
            .field("params", &self.params)
            .field("ret", &self.ret)
            .field("static", &self.is_static)
            .finish_non_exhaustive()
    }
}

/// Builder for an operation on receiver `R`.
pub struct Method<R> {
    def: MethodDef,
    _receiver: PhantomData<fn(&R)>,
}

impl<R: Receiver> Method<R> {
    /// A `void` operation with no parameters; add them with [`param`](Self::param).
    pub fn new(
        name: impl Into<String>,
        invoke: impl Fn(&R, &[Value]) -> EngineResult<Value> + 'static,
    ) -> Self {
        Method {
            def: MethodDef {
                name: name.into(),
                params: SmallVec::new(),
                ret: Ty::Void,
                declared: None,
                is_static: false,
                invoker: Rc::new(move |receiver: &Value, args: &[Value]| {
                    invoke(R::extract(receiver)?, args)
                }),
            },
            _receiver: PhantomData,
        }
    }

    #[must_use]
    pub fn param(mut self, name: impl Into<String>, ty: Ty) -> Self {
        self.def.params.push(ParamDef::new(name, ty));
        self
    }

    #[must_use]
    pub fn param_def(mut self, param: ParamDef) -> Self {
        self.def.params.push(param);
        self
    }

    #[must_use]
    pub fn returns(mut self, ty: Ty) -> Self {
        self.def.ret = ty;
        self
    }

    #[must_use]
    pub fn visible(mut self, descriptor: Descriptor) -> Self {
        self.def.declared = Some(descriptor);
        self
    }

    pub(crate) fn into_def(self, is_static: bool) -> MethodDef {
        MethodDef {
            is_static,
            ..self.def
        }
    }
}
