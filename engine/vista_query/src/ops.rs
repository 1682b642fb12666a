//! Query operators.
//!
//! Every operator takes the node to query and checks its expression against
//! the element type first. A node that is not a collection, or an expression
//! whose result does not suit the operator, is reported on the warning
//! channel and the operator returns `Ok(None)`. Evaluation failures of the
//! expression itself are errors.
//!
//! Results are new read-only collection nodes; the queried collection and
//! its source are never modified. `filter` and `sort` share the original
//! element nodes, `select` holds fresh values.

use std::cmp::Ordering;

use vista_tree::{CollectionNode, ObjectNode};
use vista_types::errors::EngineResult;
use vista_types::{classify, Ty};
use vista_value::Value;

use crate::check::Checker;
use crate::eval::Scope;
use crate::expr::Expr;

/// Direction of [`sort`].
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub enum SortOrder {
    #[default]
    Ascending,
    Descending,
}

fn collection_of(source: &ObjectNode, operation: &str) -> Option<CollectionNode> {
    let collection = source.as_collection();
    if collection.is_none() {
        source.warn(format!(
            "`{operation}` needs a collection, found {}",
            source.context().type_name(&source.ty())
        ));
    }
    collection
}

/// Elements of `source` for which `predicate` holds, in their original order.
#[tracing::instrument(level = "debug", skip_all, fields(node = %source.header(), depth = predicate.depth()))]
pub fn filter(source: &ObjectNode, predicate: &Expr) -> EngineResult<Option<CollectionNode>> {
    let Some(collection) = collection_of(source, "filter") else {
        return Ok(None);
    };
    let ctx = collection.context();
    let element_ty = collection.element_ty();
    let ty = Checker::new(ctx, &element_ty).infer(predicate)?;
    if ty != Ty::Bool {
        collection.warn(format!(
            "filter predicate `{predicate}` yields {}, not bool",
            ctx.type_name(&ty)
        ));
        return Ok(None);
    }

    let scope = Scope::new(ctx, element_ty.clone());
    let mut kept = Vec::new();
    for element in collection.elements()? {
        scope.bind(&element)?;
        if scope.test(predicate)? {
            kept.push(element);
        }
    }
    tracing::debug!(kept = kept.len(), "filtered");
    CollectionNode::derived(ctx, element_ty, kept).map(Some)
}

/// Evaluate `action` once per element for its side effects.
///
/// Returns the number of elements visited.
#[tracing::instrument(level = "debug", skip_all, fields(node = %source.header()))]
pub fn for_each(source: &ObjectNode, action: &Expr) -> EngineResult<Option<usize>> {
    let Some(collection) = collection_of(source, "for_each") else {
        return Ok(None);
    };
    let element_ty = collection.element_ty();
    Checker::new(collection.context(), &element_ty).infer(action)?;

    let scope = Scope::new(collection.context(), element_ty);
    let elements = collection.elements()?;
    for element in &elements {
        scope.bind(element)?;
        scope.eval(action)?;
    }
    Ok(Some(elements.len()))
}

/// `mapping` applied to every element, in the original order.
#[tracing::instrument(level = "debug", skip_all, fields(node = %source.header()))]
pub fn select(source: &ObjectNode, mapping: &Expr) -> EngineResult<Option<CollectionNode>> {
    let Some(collection) = collection_of(source, "select") else {
        return Ok(None);
    };
    let ctx = collection.context();
    let element_ty = collection.element_ty();
    let ty = Checker::new(ctx, &element_ty).infer(mapping)?;
    if ty.is_void() {
        collection.warn(format!("select mapping `{mapping}` yields no value"));
        return Ok(None);
    }

    let scope = Scope::new(ctx, element_ty);
    let mut values = Vec::new();
    for element in collection.elements()? {
        scope.bind(&element)?;
        values.push(scope.eval(mapping)?);
    }
    Ok(Some(CollectionNode::from_values(ctx, ty, values)))
}

/// Elements of `source` ordered by `key`. Equal keys keep their original
/// order.
#[tracing::instrument(level = "debug", skip_all, fields(node = %source.header(), ?order))]
pub fn sort(
    source: &ObjectNode,
    key: &Expr,
    order: SortOrder,
) -> EngineResult<Option<CollectionNode>> {
    let Some(collection) = collection_of(source, "sort") else {
        return Ok(None);
    };
    let ctx = collection.context();
    let element_ty = collection.element_ty();
    let ty = Checker::new(ctx, &element_ty).infer(key)?;
    if !classify(&ty).is_ok_and(|class| class.is_orderable()) {
        collection.warn(format!(
            "sort key `{key}` yields {}, which has no order",
            ctx.type_name(&ty)
        ));
        return Ok(None);
    }

    let scope = Scope::new(ctx, element_ty.clone());
    let mut keyed = Vec::new();
    for element in collection.elements()? {
        scope.bind(&element)?;
        keyed.push((scope.eval(key)?, element));
    }
    keyed.sort_by(|(a, _), (b, _)| match order {
        SortOrder::Ascending => compare_keys(a, b),
        SortOrder::Descending => compare_keys(b, a),
    });
    let sorted = keyed.into_iter().map(|(_, element)| element).collect();
    CollectionNode::derived(ctx, element_ty, sorted).map(Some)
}

/// Total order over key values. Empty keys sort first.
fn compare_keys(a: &Value, b: &Value) -> Ordering {
    match (a, b) {
        (Value::Bool(a), Value::Bool(b)) => a.cmp(b),
        (Value::Int(a), Value::Int(b)) => a.cmp(b),
        (Value::Double(a), Value::Double(b)) => a.total_cmp(b),
        (Value::Str(a), Value::Str(b)) => a.cmp(b),
        (Value::Enum(a), Value::Enum(b)) => a.bits.cmp(&b.bits),
        (Value::Void, Value::Void) => Ordering::Equal,
        (Value::Void, _) => Ordering::Less,
        (_, Value::Void) => Ordering::Greater,
        _ => Ordering::Equal,
    }
}
