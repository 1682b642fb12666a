//! Method-call syntax for the query operators.

use vista_tree::CollectionNode;
use vista_types::EngineResult;

use crate::expr::Expr;
use crate::ops::{self, SortOrder};

/// Query operators on a [`CollectionNode`].
///
/// ```text
/// let even = numbers.filter(&Expr::or(
///     Expr::eq(Operand::Element, Operand::literal(2)),
///     Expr::eq(Operand::Element, Operand::literal(4)),
/// ))?;
/// ```
pub trait CollectionQuery {
    fn filter(&self, predicate: &Expr) -> EngineResult<Option<CollectionNode>>;

    fn for_each(&self, action: &Expr) -> EngineResult<Option<usize>>;

    fn select(&self, mapping: &Expr) -> EngineResult<Option<CollectionNode>>;

    fn sort(&self, key: &Expr, order: SortOrder) -> EngineResult<Option<CollectionNode>>;
}

impl CollectionQuery for CollectionNode {
    fn filter(&self, predicate: &Expr) -> EngineResult<Option<CollectionNode>> {
        ops::filter(self.as_object(), predicate)
    }

    fn for_each(&self, action: &Expr) -> EngineResult<Option<usize>> {
        ops::for_each(self.as_object(), action)
    }

    fn select(&self, mapping: &Expr) -> EngineResult<Option<CollectionNode>> {
        ops::select(self.as_object(), mapping)
    }

    fn sort(&self, key: &Expr, order: SortOrder) -> EngineResult<Option<CollectionNode>> {
        ops::sort(self.as_object(), key, order)
    }
}
