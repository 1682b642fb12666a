//! Static checking of query expressions.
//!
//! An expression is typed against the collection's element type before any
//! element is bound. Anything that could not be evaluated at all (an
//! unknown member, a wrong argument count, a non-boolean under `and`) is an
//! error here. Whether the overall result suits the query operator is left
//! to the operator, which reports a mismatch as a warning.

use vista_meta::MethodDef;
use vista_tree::Context;
use vista_types::errors::{
    arity_mismatch, malformed_expression, type_mismatch, unknown_member, EngineResult,
};
use vista_types::Ty;

use crate::expr::{Expr, Operand};
use crate::stack::ensure_sufficient_stack;

pub(crate) struct Checker<'a> {
    ctx: &'a Context,
    element: &'a Ty,
}

impl<'a> Checker<'a> {
    pub(crate) fn new(ctx: &'a Context, element: &'a Ty) -> Self {
        Checker { ctx, element }
    }

    /// Result type of `expr`.
    pub(crate) fn infer(&self, expr: &Expr) -> EngineResult<Ty> {
        ensure_sufficient_stack(|| self.infer_inner(expr))
    }

    fn infer_inner(&self, expr: &Expr) -> EngineResult<Ty> {
        match expr {
            Expr::And(left, right) => {
                self.expect_bool("and", left)?;
                self.expect_bool("and", right)?;
                Ok(Ty::Bool)
            }
            Expr::Or(left, right) => {
                self.expect_bool("or", left)?;
                self.expect_bool("or", right)?;
                Ok(Ty::Bool)
            }
            Expr::Not(inner) => {
                self.expect_bool("not", inner)?;
                Ok(Ty::Bool)
            }
            Expr::Eq(left, right) => {
                let (lt, rt) = (self.infer(left)?, self.infer(right)?);
                if !self.comparable(&lt, &rt) {
                    return Err(malformed_expression(format!(
                        "cannot compare {} with {}",
                        self.ctx.type_name(&lt),
                        self.ctx.type_name(&rt)
                    )));
                }
                Ok(Ty::Bool)
            }
            Expr::Val(operand) => self.operand(operand),
        }
    }

    fn expect_bool(&self, op: &str, expr: &Expr) -> EngineResult<()> {
        let ty = self.infer(expr)?;
        if ty == Ty::Bool {
            Ok(())
        } else {
            Err(malformed_expression(format!(
                "`{op}` needs bool operands, `{expr}` is {}",
                self.ctx.type_name(&ty)
            )))
        }
    }

    /// Either side may be stored into the other; `void` compares with anything.
    fn comparable(&self, left: &Ty, right: &Ty) -> bool {
        left.is_void()
            || right.is_void()
            || self.ctx.with_types(|types| {
                types.is_assignable(left, right) || types.is_assignable(right, left)
            })
    }

    fn operand(&self, operand: &Operand) -> EngineResult<Ty> {
        match operand {
            Operand::Element => Ok(self.element.clone()),
            Operand::Literal(value) => Ok(self.ctx.runtime_ty(value)),
            Operand::Member(target, name) => {
                let owner = self.operand(target)?;
                let property = self.ctx.catalog().find_property(&owner, name);
                property
                    .map(|p| p.ty.clone())
                    .ok_or_else(|| unknown_member(self.ctx.type_name(&owner), name.as_str()))
            }
            Operand::Call {
                target,
                method,
                args,
            } => {
                let owner = self.operand(target)?;
                let def = self.ctx.catalog().find_method(&owner, method);
                let def =
                    def.ok_or_else(|| unknown_member(self.ctx.type_name(&owner), method.as_str()))?;
                self.arguments(&def, args)?;
                Ok(def.ret.clone())
            }
            Operand::Invoke { method, args } => {
                self.arguments(method.def(), args)?;
                Ok(method.def().ret.clone())
            }
        }
    }

    fn arguments(&self, def: &MethodDef, args: &[Operand]) -> EngineResult<()> {
        if args.len() != def.params.len() {
            return Err(arity_mismatch(&def.name, def.params.len(), args.len()));
        }
        for (param, arg) in def.params.iter().zip(args) {
            let found = self.operand(arg)?;
            let fits = self
                .ctx
                .with_types(|types| types.is_assignable(&param.ty, &found));
            if !fits {
                return Err(type_mismatch(
                    self.ctx.type_name(&param.ty),
                    self.ctx.type_name(&found),
                ));
            }
        }
        Ok(())
    }
}
