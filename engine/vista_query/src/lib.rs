//! Vista Query - queries over collection nodes.
//!
//! A query walks the element nodes of a [`CollectionNode`](vista_tree::CollectionNode),
//! binds each one into a per-query placeholder and evaluates an [`Expr`]
//! against it:
//!
//! - [`filter`]: elements whose predicate holds
//! - [`select`]: one mapped value per element
//! - [`sort`]: elements ordered by a key, stable
//! - [`for_each`]: side effects only
//!
//! The same operators are available as methods through [`CollectionQuery`].

mod check;
mod eval;
mod expr;
mod ops;
mod query;
mod stack;

#[cfg(test)]
mod test_helpers;

pub use expr::{Expr, Operand};
pub use ops::{filter, for_each, select, sort, SortOrder};
pub use query::CollectionQuery;
pub use stack::ensure_sufficient_stack;
