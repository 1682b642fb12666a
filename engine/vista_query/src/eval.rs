//! Per-element evaluation.
//!
//! A [`Scope`] owns one placeholder node typed as the collection's element.
//! Each element is bound into it by reference before the expression is
//! walked, so `Operand::Element` always reads the placeholder. Every query
//! call builds its own scope; bindings never leak from one query into
//! another.

use smallvec::SmallVec;
use vista_tree::{Context, MethodNode, ObjectNode};
use vista_types::errors::{
    malformed_expression, missing_argument, type_mismatch, unknown_member, EngineResult,
};
use vista_types::Ty;
use vista_value::Value;

use crate::expr::{Expr, Operand};
use crate::stack::ensure_sufficient_stack;

pub(crate) struct Scope {
    ctx: Context,
    element: ObjectNode,
}

impl Scope {
    pub(crate) fn new(ctx: &Context, element_ty: Ty) -> Self {
        Scope {
            ctx: ctx.clone(),
            element: ObjectNode::placeholder(ctx, element_ty, "element"),
        }
    }

    /// Make `element` the current element.
    pub(crate) fn bind(&self, element: &ObjectNode) -> EngineResult<()> {
        self.element.set_reference_to(element)
    }

    pub(crate) fn eval(&self, expr: &Expr) -> EngineResult<Value> {
        ensure_sufficient_stack(|| self.eval_inner(expr))
    }

    /// Evaluate `expr` as a condition.
    pub(crate) fn test(&self, expr: &Expr) -> EngineResult<bool> {
        let value = self.eval(expr)?;
        value.as_bool().ok_or_else(|| {
            malformed_expression(format!("`{expr}` produced {}, not bool", value.kind_name()))
        })
    }

    fn eval_inner(&self, expr: &Expr) -> EngineResult<Value> {
        match expr {
            Expr::And(left, right) => Ok(Value::Bool(self.test(left)? && self.test(right)?)),
            Expr::Or(left, right) => Ok(Value::Bool(self.test(left)? || self.test(right)?)),
            Expr::Not(inner) => Ok(Value::Bool(!self.test(inner)?)),
            Expr::Eq(left, right) => Ok(Value::Bool(self.eval(left)? == self.eval(right)?)),
            Expr::Val(operand) => self.operand(operand),
        }
    }

    fn operand(&self, operand: &Operand) -> EngineResult<Value> {
        match operand {
            Operand::Element => self.element.value(),
            Operand::Literal(value) => Ok(value.clone()),
            Operand::Member(target, name) => {
                let receiver = self.operand(target)?;
                // An empty slot has no members; the whole path is empty.
                if receiver.is_void() {
                    return Ok(Value::Void);
                }
                let ty = self.ctx.runtime_ty(&receiver);
                let property = self.ctx.catalog().find_property(&ty, name);
                let property =
                    property.ok_or_else(|| unknown_member(self.ctx.type_name(&ty), name.as_str()))?;
                property.get(&receiver)
            }
            Operand::Call {
                target,
                method,
                args,
            } => {
                let receiver = self.operand(target)?;
                if receiver.is_void() {
                    return Ok(Value::Void);
                }
                let ty = self.ctx.runtime_ty(&receiver);
                let def = self.ctx.catalog().find_method(&ty, method);
                let def =
                    def.ok_or_else(|| unknown_member(self.ctx.type_name(&ty), method.as_str()))?;
                let args = args
                    .iter()
                    .map(|arg| self.operand(arg))
                    .collect::<EngineResult<Vec<_>>>()?;
                def.invoke(&receiver, &args)
            }
            Operand::Invoke { method, args } => {
                let mut values: SmallVec<[Value; 4]> = SmallVec::with_capacity(args.len());
                for (index, arg) in args.iter().enumerate() {
                    let value = self.operand(arg)?;
                    self.check_argument(method, &value, index)?;
                    values.push(value);
                }
                // The node's argument slots and result slot stay untouched.
                method.def().invoke(method.receiver(), &values)
            }
        }
    }

    fn check_argument(&self, method: &MethodNode, value: &Value, index: usize) -> EngineResult<()> {
        if method.can_assign(value, index)? {
            return Ok(());
        }
        let param = &method.def().params[index];
        if value.is_void() {
            return Err(missing_argument(index, param.name.clone()));
        }
        Err(type_mismatch(
            self.ctx.type_name(&param.ty),
            self.ctx.type_name(&self.ctx.runtime_ty(value)),
        ))
    }
}
