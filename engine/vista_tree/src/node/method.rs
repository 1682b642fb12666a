//! Method nodes: invokable operations.

use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::{Rc, Weak};

use smallvec::SmallVec;
use vista_meta::{Descriptor, MethodDef};
use vista_types::errors::{index_out_of_range, missing_argument, type_mismatch};
use vista_types::EngineResult;
use vista_value::Value;

use super::object::NodeCore;
use super::{Node, ObjectNode};
use crate::context::Context;
use crate::registry::Registry;

struct MethodCore {
    ctx: Context,
    def: Rc<MethodDef>,
    /// `Value::Void` for static operations.
    receiver: Value,
    info: RefCell<Descriptor>,
    enabled: Cell<bool>,
    owner: Weak<NodeCore>,
    parameters: SmallVec<[ObjectNode; 4]>,
    return_slot: ObjectNode,
    successor: RefCell<Option<ObjectNode>>,
}

/// An operation bound to its receiver, with one placeholder per argument and
/// a read-only slot for the result.
#[derive(Clone)]
pub struct MethodNode(Rc<MethodCore>);

impl MethodNode {
    pub(crate) fn bound(
        ctx: &Context,
        receiver: Value,
        def: Rc<MethodDef>,
        mut info: Descriptor,
        owner: Option<&ObjectNode>,
    ) -> Self {
        if info.name.is_none() {
            info.name = Some(def.name.clone());
        }
        if info.header.is_empty() {
            info.header.clone_from(&def.name);
        }
        let parameters = def
            .params
            .iter()
            .map(|param| {
                let mut info = param
                    .declared
                    .clone()
                    .unwrap_or_else(|| Descriptor::new(param.name.clone()));
                if info.name.is_none() {
                    info.name = Some(param.name.clone());
                }
                ObjectNode::placeholder_with(ctx, param.ty.clone(), info)
            })
            .collect();
        let return_slot = ObjectNode::return_slot(ctx, def.ret.clone());
        let enabled = info.interactive;
        MethodNode(Rc::new(MethodCore {
            ctx: ctx.clone(),
            def,
            receiver,
            info: RefCell::new(info),
            enabled: Cell::new(enabled),
            owner: owner.map_or_else(Weak::new, ObjectNode::downgrade),
            parameters,
            return_slot,
            successor: RefCell::new(None),
        }))
    }

    pub fn ptr_eq(&self, other: &MethodNode) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }

    pub fn header(&self) -> String {
        self.0.info.borrow().header.clone()
    }

    pub fn name(&self) -> Option<String> {
        self.0.info.borrow().name.clone()
    }

    pub fn description(&self) -> String {
        self.0.info.borrow().description.clone()
    }

    /// Human-readable signature, e.g. `Add(a: int, b: int) -> int`.
    pub fn signature(&self) -> String {
        self.0.ctx.with_types(|types| self.0.def.signature(types))
    }

    pub fn def(&self) -> &MethodDef {
        &self.0.def
    }

    pub fn is_enabled(&self) -> bool {
        self.0.enabled.get()
    }

    pub fn set_enabled(&self, enabled: bool) {
        self.0.enabled.set(enabled);
    }

    /// The node whose value this operation was found on.
    pub fn owner(&self) -> Option<ObjectNode> {
        self.0.owner.upgrade().map(ObjectNode::from_core)
    }

    pub fn receiver(&self) -> &Value {
        &self.0.receiver
    }

    pub fn parameters(&self) -> &[ObjectNode] {
        &self.0.parameters
    }

    pub fn parameter(&self, index: usize) -> EngineResult<&ObjectNode> {
        self.0
            .parameters
            .get(index)
            .ok_or_else(|| index_out_of_range(index, self.0.parameters.len()))
    }

    pub fn return_slot(&self) -> &ObjectNode {
        &self.0.return_slot
    }

    pub fn returns_void(&self) -> bool {
        self.0.def.returns_void()
    }

    pub fn successor(&self) -> Option<ObjectNode> {
        self.0.successor.borrow().clone()
    }

    /// Whether `value` could be bound to argument `index`.
    pub fn can_assign(&self, value: &Value, index: usize) -> EngineResult<bool> {
        let parameter = self.parameter(index)?;
        Ok(!value.is_void() && self.0.ctx.is_assignable(&parameter.ty(), value))
    }

    /// Bind argument `index`. An incompatible value is refused and the slot
    /// keeps its previous content.
    pub fn set_parameter(&self, value: Value, index: usize) -> EngineResult<()> {
        if !self.can_assign(&value, index)? {
            let parameter = self.parameter(index)?;
            let found = self.0.ctx.runtime_ty(&value);
            return Err(type_mismatch(
                self.0.ctx.type_name(&parameter.ty()),
                self.0.ctx.type_name(&found),
            ));
        }
        self.parameter(index)?.rebind(value)
    }

    /// Empty every argument slot.
    pub fn clear_parameters(&self) {
        for parameter in &self.0.parameters {
            parameter.store(Value::Void);
        }
    }

    /// Call the operation with the bound arguments.
    ///
    /// The result lands in [`return_slot`](Self::return_slot), which becomes
    /// this node's successor; this node in turn becomes its owner's.
    #[tracing::instrument(level = "debug", skip_all, fields(method = %self.0.def.name))]
    pub fn invoke(&self) -> EngineResult<ObjectNode> {
        let mut args: SmallVec<[Value; 4]> = SmallVec::with_capacity(self.0.parameters.len());
        for (index, (parameter, def)) in self.0.parameters.iter().zip(&self.0.def.params).enumerate() {
            let value = parameter.value()?;
            if value.is_void() {
                return Err(missing_argument(index, def.name.clone()));
            }
            args.push(value);
        }
        let result = self.0.def.invoke(&self.0.receiver, &args)?;
        tracing::debug!(result = %self.0.ctx.render(&result), "invoked");
        self.0.return_slot.store(result);
        *self.0.successor.borrow_mut() = Some(self.0.return_slot.clone());
        if let Some(owner) = self.owner() {
            owner.set_successor(Node::Method(self.clone()));
        }
        Ok(self.0.return_slot.clone())
    }

    /// Invoke again and follow the result's own chain.
    pub fn instantiate_successor(&self) -> EngineResult<ObjectNode> {
        let result = self.invoke()?;
        if self.returns_void() {
            Ok(result)
        } else {
            result.instantiate_successor()
        }
    }

    /// Every root of `registry`, paired with whether its value fits argument
    /// `index`. Method roots never fit.
    pub fn candidates(&self, registry: &Registry, index: usize) -> EngineResult<Vec<(Node, bool)>> {
        self.parameter(index)?;
        Ok(registry
            .roots()
            .into_iter()
            .map(|root| {
                let fits = match &root {
                    Node::Object(node) => node
                        .value()
                        .is_ok_and(|value| self.can_assign(&value, index).unwrap_or(false)),
                    Node::Method(_) => false,
                };
                (root, fits)
            })
            .collect())
    }

    /// Publish a soft failure against this node.
    pub fn warn(&self, message: impl Into<String>) {
        self.0.ctx.warn(Node::Method(self.clone()), message);
    }
}

impl fmt::Debug for MethodNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MethodNode")
            .field("header", &self.header())
            .field("signature", &self.signature())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests;
