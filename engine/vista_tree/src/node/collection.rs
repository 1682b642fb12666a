//! Collection nodes.
//!
//! A collection node keeps one element node per item of its source and
//! follows the source's change notifications:
//!
//! | source change  | tree reaction                                     |
//! |----------------|---------------------------------------------------|
//! | added          | new element node at the same index, `Add` event   |
//! | removed        | matching element node dropped, `Remove` event     |
//! | written back   | element value updated in place                    |
//! | replace / move / reset | refused; the source rolls the change back |
//!
//! A removal with no matching element is reported on the warning channel.

use std::cell::RefCell;
use std::fmt;
use std::ops::Deref;

use vista_types::errors::index_out_of_range;
use vista_types::{EngineResult, Ty};
use vista_value::{ChangeNotifier, ChangeRejected, CollectionChange, ListRef, Subscription, Value};

use super::object::Slot;
use super::{Node, ObjectNode};
use crate::context::Context;

pub(crate) struct ElementState {
    items: RefCell<Option<Vec<ObjectNode>>>,
    subscription: RefCell<Option<Subscription>>,
    changed: ChangeNotifier<CollectionEvent>,
}

impl ElementState {
    pub(super) fn new() -> Self {
        ElementState {
            items: RefCell::new(None),
            subscription: RefCell::new(None),
            changed: ChangeNotifier::new(),
        }
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum CollectionAction {
    Add,
    Remove,
}

/// An element node entered or left a collection.
#[derive(Clone, Debug)]
pub struct CollectionEvent {
    pub action: CollectionAction,
    pub item: ObjectNode,
    pub index: usize,
}

/// An [`ObjectNode`] over a list or map.
#[derive(Clone)]
pub struct CollectionNode(ObjectNode);

impl Deref for CollectionNode {
    type Target = ObjectNode;

    fn deref(&self) -> &ObjectNode {
        &self.0
    }
}

impl ObjectNode {
    fn element_state(&self) -> Option<&ElementState> {
        self.0.collection.as_ref()
    }

    /// Element type of the source, falling back to the declared type.
    fn source_element_ty(&self) -> Ty {
        match self.cached_value() {
            Some(Value::List(list)) => list.elem_ty().clone(),
            Some(Value::Map(map)) => map.ty().element().unwrap_or(Ty::Void),
            _ => self.0.ty.element().unwrap_or(Ty::Void),
        }
    }

    /// Index of `element` among this collection's element nodes.
    pub(crate) fn position_of(&self, element: &ObjectNode) -> Option<usize> {
        let state = self.element_state()?;
        let items = state.items.borrow();
        items.as_ref()?.iter().position(|item| item.ptr_eq(element))
    }

    /// Rebuild the element nodes from `value` and follow its changes.
    pub(super) fn materialize_elements(&self, value: &Value) {
        let Some(state) = self.element_state() else {
            return;
        };
        let ctx = self.context().clone();
        let (items, notifier, read_only) = match value {
            Value::List(list) => (list.snapshot(), list.notifier(), false),
            // Pairs are edited through their `Value` member, never replaced.
            Value::Map(map) => (
                map.pairs().into_iter().map(Value::Pair).collect(),
                map.notifier(),
                true,
            ),
            _ => (Vec::new(), None, false),
        };
        let elem_ty = self.source_element_ty();
        let elements: Vec<ObjectNode> = items
            .into_iter()
            .map(|item| ObjectNode::element(&ctx, item, elem_ty.clone(), read_only, self))
            .collect();
        tracing::debug!(collection = %self.header(), count = elements.len(), "elements materialized");
        let previous = state.items.replace(Some(elements));
        drop(previous);

        let subscription = notifier.map(|notifier| {
            let weak = self.downgrade();
            notifier.subscribe_checked(move |change| match weak.upgrade() {
                Some(core) => ObjectNode::from_core(core).on_source_change(change),
                None => Ok(()),
            })
        });
        let previous = state.subscription.replace(subscription);
        drop(previous);
    }

    fn on_source_change(&self, change: &CollectionChange) -> Result<(), ChangeRejected> {
        match change {
            CollectionChange::Added { index, item } => {
                self.insert_element(*index, item.clone());
                Ok(())
            }
            CollectionChange::Removed { index, item } => {
                self.remove_element(*index, item);
                Ok(())
            }
            CollectionChange::WrittenBack { index, new, .. } => {
                self.update_element(*index, new);
                Ok(())
            }
            CollectionChange::Replaced { .. }
            | CollectionChange::Moved { .. }
            | CollectionChange::Reset => {
                tracing::error!(
                    collection = %self.header(),
                    kind = change.kind(),
                    "unsupported change to a projected collection"
                );
                Err(ChangeRejected::new(format!(
                    "`{}` changes are not supported on a projected collection",
                    change.kind()
                )))
            }
        }
    }

    fn insert_element(&self, index: usize, item: Value) {
        let Some(state) = self.element_state() else {
            return;
        };
        let read_only = matches!(self.cached_value(), Some(Value::Map(_)));
        let node = ObjectNode::element(self.context(), item, self.source_element_ty(), read_only, self);
        let index = {
            let mut items = state.items.borrow_mut();
            let items = items.get_or_insert_with(Vec::new);
            let index = index.min(items.len());
            items.insert(index, node.clone());
            index
        };
        self.emit_collection_event(CollectionAction::Add, node, index);
    }

    fn remove_element(&self, index: usize, item: &Value) {
        let Some(state) = self.element_state() else {
            return;
        };
        let removed = {
            let mut items = state.items.borrow_mut();
            items.as_mut().and_then(|items| {
                let holds = |node: &ObjectNode| node.cached_value().as_ref() == Some(item);
                let position = if items.get(index).is_some_and(holds) {
                    Some(index)
                } else {
                    items.iter().position(holds)
                };
                position.map(|position| (position, items.remove(position)))
            })
        };
        match removed {
            Some((index, node)) => self.emit_collection_event(CollectionAction::Remove, node, index),
            None => self.warn(format!(
                "removed item {} has no element node",
                self.context().render(item)
            )),
        }
    }

    fn update_element(&self, index: usize, value: &Value) {
        let node = self
            .element_state()
            .and_then(|state| state.items.borrow().as_ref().and_then(|items| items.get(index).cloned()));
        match node {
            Some(node) if node.is_writing() => {}
            Some(node) => {
                node.assign(value.clone());
                node.notify_value_changed();
            }
            None => self.warn(format!("written-back index {index} has no element node")),
        }
    }

    fn emit_collection_event(&self, action: CollectionAction, item: ObjectNode, index: usize) {
        let Some(state) = self.element_state() else {
            return;
        };
        let event = CollectionEvent {
            action,
            item,
            index,
        };
        if let Err(rejected) = state.changed.emit(&event) {
            tracing::debug!(%rejected, "collection subscriber refused");
        }
    }
}

impl CollectionNode {
    pub(crate) fn wrap(node: ObjectNode) -> Self {
        CollectionNode(node)
    }

    /// A read-only result collection over existing element nodes.
    ///
    /// The element nodes are shared, not copied: they stay children of the
    /// collection they came from.
    pub fn derived(ctx: &Context, elem_ty: Ty, elements: Vec<ObjectNode>) -> EngineResult<Self> {
        let values = elements
            .iter()
            .map(ObjectNode::value)
            .collect::<EngineResult<Vec<_>>>()?;
        let node = ObjectNode::result(ctx, Ty::list(elem_ty.clone()), Value::List(ListRef::plain(elem_ty, values)));
        node.0.loaded.set(true);
        if let Some(state) = node.element_state() {
            state.items.replace(Some(elements));
        }
        Ok(CollectionNode(node))
    }

    /// A read-only result collection over fresh values.
    pub fn from_values(ctx: &Context, elem_ty: Ty, values: Vec<Value>) -> Self {
        let list = ListRef::plain(elem_ty.clone(), values);
        CollectionNode(ObjectNode::result(ctx, Ty::list(elem_ty), Value::List(list)))
    }

    pub fn as_object(&self) -> &ObjectNode {
        &self.0
    }

    pub fn into_object(self) -> ObjectNode {
        self.0
    }

    pub fn element_ty(&self) -> Ty {
        self.0.source_element_ty()
    }

    /// Element nodes, materialized on first call.
    pub fn elements(&self) -> EngineResult<Vec<ObjectNode>> {
        self.0.value()?;
        Ok(self
            .0
            .element_state()
            .and_then(|state| state.items.borrow().clone())
            .unwrap_or_default())
    }

    pub fn len(&self) -> EngineResult<usize> {
        Ok(self.elements()?.len())
    }

    pub fn is_empty(&self) -> EngineResult<bool> {
        Ok(self.len()? == 0)
    }

    /// Element node at `index`; it becomes this node's successor.
    pub fn get(&self, index: usize) -> EngineResult<ObjectNode> {
        let elements = self.elements()?;
        let node = elements
            .get(index)
            .cloned()
            .ok_or_else(|| index_out_of_range(index, elements.len()))?;
        self.0.set_successor(Node::Object(node.clone()));
        Ok(node)
    }

    /// Append an element node without touching the source.
    pub fn add(&self, node: ObjectNode) -> EngineResult<()> {
        self.0.value()?;
        let Some(state) = self.0.element_state() else {
            return Ok(());
        };
        node.set_parent(&self.0);
        let index = {
            let mut items = state.items.borrow_mut();
            let items = items.get_or_insert_with(Vec::new);
            items.push(node.clone());
            items.len() - 1
        };
        self.0.emit_collection_event(CollectionAction::Add, node, index);
        Ok(())
    }

    /// Remove an element node without touching the source.
    ///
    /// The node itself is matched first, then any element with an equal
    /// value. Returns `false`, with a warning, when nothing matches.
    pub fn remove(&self, node: &ObjectNode) -> EngineResult<bool> {
        self.0.value()?;
        let target = node.value()?;
        let removed = self.0.element_state().and_then(|state| {
            let mut items = state.items.borrow_mut();
            let items = items.as_mut()?;
            let position = items
                .iter()
                .position(|item| item.ptr_eq(node))
                .or_else(|| {
                    items
                        .iter()
                        .position(|item| item.cached_value().as_ref() == Some(&target))
                })?;
            Some((position, items.remove(position)))
        });
        match removed {
            Some((index, removed)) => {
                self.0.emit_collection_event(CollectionAction::Remove, removed, index);
                Ok(true)
            }
            None => {
                self.0.warn(format!(
                    "no element matches {}",
                    self.0.context().render(&target)
                ));
                Ok(false)
            }
        }
    }

    pub fn on_collection_changed(
        &self,
        callback: impl Fn(&CollectionEvent) + 'static,
    ) -> Subscription {
        match self.0.element_state() {
            Some(state) => state.changed.subscribe(callback),
            None => Subscription::empty(),
        }
    }

    /// Whether the source reports its changes.
    pub fn is_observed(&self) -> bool {
        self.0
            .element_state()
            .is_some_and(|state| state.subscription.borrow().is_some())
    }

    /// The slot this collection was reached through.
    pub fn is_result(&self) -> bool {
        matches!(self.0 .0.slot, Slot::ReturnValue)
    }
}

impl fmt::Debug for CollectionNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("CollectionNode").field(&self.0).finish()
    }
}
