//! Query expression trees.
//!
//! An [`Expr`] is evaluated once per element of a collection. Its leaves are
//! [`Operand`]s: the current element, a literal, a member or method reached
//! from another operand, or a call of an already resolved [`MethodNode`]
//! (typically a static operation found among the registry roots).
//!
//! ```text
//! // element.Qty == 0 or element.IsLow()
//! Expr::or(
//!     Expr::eq(Operand::Element.member("Qty"), Operand::literal(0)),
//!     Operand::Element.call("IsLow", []),
//! )
//! ```

use std::fmt;

use vista_tree::MethodNode;
use vista_value::Value;

/// Boolean structure over operands.
#[derive(Clone, Debug)]
pub enum Expr {
    And(Box<Expr>, Box<Expr>),
    Or(Box<Expr>, Box<Expr>),
    Not(Box<Expr>),
    /// Value equality of the two sides.
    Eq(Box<Expr>, Box<Expr>),
    Val(Operand),
}

/// A value reachable from the element being evaluated.
#[derive(Clone, Debug)]
pub enum Operand {
    /// The element currently bound.
    Element,
    Literal(Value),
    /// A property of the target.
    Member(Box<Operand>, String),
    /// An instance operation of the target.
    Call {
        target: Box<Operand>,
        method: String,
        args: Vec<Operand>,
    },
    /// A resolved operation node; arguments are bound into its parameters.
    Invoke {
        method: MethodNode,
        args: Vec<Operand>,
    },
}

impl Expr {
    pub fn and(left: impl Into<Expr>, right: impl Into<Expr>) -> Self {
        Expr::And(Box::new(left.into()), Box::new(right.into()))
    }

    pub fn or(left: impl Into<Expr>, right: impl Into<Expr>) -> Self {
        Expr::Or(Box::new(left.into()), Box::new(right.into()))
    }

    pub fn not(inner: impl Into<Expr>) -> Self {
        Expr::Not(Box::new(inner.into()))
    }

    pub fn eq(left: impl Into<Expr>, right: impl Into<Expr>) -> Self {
        Expr::Eq(Box::new(left.into()), Box::new(right.into()))
    }

    /// Nesting depth; a single operand is depth 1.
    pub fn depth(&self) -> usize {
        let mut depth = 0;
        let mut stack: Vec<(&Expr, usize)> = vec![(self, 1)];
        while let Some((expr, level)) = stack.pop() {
            depth = depth.max(level);
            match expr {
                Expr::And(l, r) | Expr::Or(l, r) | Expr::Eq(l, r) => {
                    stack.push((&**l, level + 1));
                    stack.push((&**r, level + 1));
                }
                Expr::Not(inner) => stack.push((&**inner, level + 1)),
                Expr::Val(_) => {}
            }
        }
        depth
    }
}

impl From<Operand> for Expr {
    fn from(operand: Operand) -> Self {
        Expr::Val(operand)
    }
}

impl Operand {
    pub fn literal(value: impl Into<Value>) -> Self {
        Operand::Literal(value.into())
    }

    /// `self.name`
    #[must_use]
    pub fn member(self, name: impl Into<String>) -> Self {
        Operand::Member(Box::new(self), name.into())
    }

    /// `self.method(args)`
    #[must_use]
    pub fn call(self, method: impl Into<String>, args: impl IntoIterator<Item = Operand>) -> Self {
        Operand::Call {
            target: Box::new(self),
            method: method.into(),
            args: args.into_iter().collect(),
        }
    }

    pub fn invoke(method: &MethodNode, args: impl IntoIterator<Item = Operand>) -> Self {
        Operand::Invoke {
            method: method.clone(),
            args: args.into_iter().collect(),
        }
    }
}

fn write_args(f: &mut fmt::Formatter<'_>, args: &[Operand]) -> fmt::Result {
    f.write_str("(")?;
    for (i, arg) in args.iter().enumerate() {
        if i > 0 {
            f.write_str(", ")?;
        }
        write!(f, "{arg}")?;
    }
    f.write_str(")")
}

impl fmt::Display for Operand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Operand::Element => f.write_str("element"),
            Operand::Literal(Value::Str(s)) => write!(f, "{s:?}"),
            Operand::Literal(value) => write!(f, "{value}"),
            Operand::Member(target, name) => write!(f, "{target}.{name}"),
            Operand::Call {
                target,
                method,
                args,
            } => {
                write!(f, "{target}.{method}")?;
                write_args(f, args)
            }
            Operand::Invoke { method, args } => {
                f.write_str(&method.header())?;
                write_args(f, args)
            }
        }
    }
}

impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Expr::And(l, r) => write!(f, "({l} and {r})"),
            Expr::Or(l, r) => write!(f, "({l} or {r})"),
            Expr::Not(inner) => write!(f, "not {inner}"),
            Expr::Eq(l, r) => write!(f, "{l} == {r}"),
            Expr::Val(operand) => write!(f, "{operand}"),
        }
    }
}
