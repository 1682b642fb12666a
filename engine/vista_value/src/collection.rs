//! Engine-provided collections.
//!
//! Domain types that want their collections projected hold a [`ListRef`] or
//! [`MapRef`]. Observable collections announce every mutation as a
//! [`CollectionChange`]; plain ones do not, and a tree over them only sees
//! changes on refresh.
//!
//! Subscribers may refuse a change. The collection then undoes the mutation
//! and returns [`ChangeRejected`] to whoever attempted it, so source and
//! projection never drift apart.

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use vista_types::Ty;

use crate::notify::{ChangeNotifier, ChangeRejected};
use crate::object::{IdentityKey, PropertyChanged, WeakKind, WeakValue};
use crate::Value;

/// One mutation of a collection.
#[derive(Clone, Debug, PartialEq)]
pub enum CollectionChange {
    Added { index: usize, item: Value },
    Removed { index: usize, item: Value },
    /// Domain code overwrote an item in place.
    Replaced { index: usize, old: Value, new: Value },
    Moved { from: usize, to: usize, item: Value },
    /// The whole content was swapped.
    Reset,
    /// The engine wrote an element back through a tree node.
    WrittenBack { index: usize, old: Value, new: Value },
}

impl CollectionChange {
    pub fn kind(&self) -> &'static str {
        match self {
            CollectionChange::Added { .. } => "add",
            CollectionChange::Removed { .. } => "remove",
            CollectionChange::Replaced { .. } => "replace",
            CollectionChange::Moved { .. } => "move",
            CollectionChange::Reset => "reset",
            CollectionChange::WrittenBack { .. } => "write-back",
        }
    }

    /// The change that undoes this one.
    pub fn inverse(&self) -> CollectionChange {
        match self {
            CollectionChange::Added { index, item } => CollectionChange::Removed {
                index: *index,
                item: item.clone(),
            },
            CollectionChange::Removed { index, item } => CollectionChange::Added {
                index: *index,
                item: item.clone(),
            },
            CollectionChange::Replaced { index, old, new } => CollectionChange::Replaced {
                index: *index,
                old: new.clone(),
                new: old.clone(),
            },
            CollectionChange::Moved { from, to, item } => CollectionChange::Moved {
                from: *to,
                to: *from,
                item: item.clone(),
            },
            CollectionChange::Reset => CollectionChange::Reset,
            CollectionChange::WrittenBack { index, old, new } => CollectionChange::WrittenBack {
                index: *index,
                old: new.clone(),
                new: old.clone(),
            },
        }
    }
}

fn out_of_range(index: usize, len: usize) -> ChangeRejected {
    ChangeRejected::new(format!("index {index} out of range (length {len})"))
}

pub(crate) struct ListCell {
    elem: Ty,
    items: RefCell<Vec<Value>>,
    changes: Option<ChangeNotifier<CollectionChange>>,
}

/// Shared, ordered list of values.
#[derive(Clone)]
pub struct ListRef(Rc<ListCell>);

impl ListRef {
    /// A list that announces its mutations.
    pub fn observable(elem: Ty, items: Vec<Value>) -> Self {
        Self::build(elem, items, Some(ChangeNotifier::new()))
    }

    /// A list without change notifications.
    pub fn plain(elem: Ty, items: Vec<Value>) -> Self {
        Self::build(elem, items, None)
    }

    fn build(elem: Ty, items: Vec<Value>, changes: Option<ChangeNotifier<CollectionChange>>) -> Self {
        ListRef(Rc::new(ListCell {
            elem,
            items: RefCell::new(items),
            changes,
        }))
    }

    pub fn elem_ty(&self) -> &Ty {
        &self.0.elem
    }

    pub fn ty(&self) -> Ty {
        Ty::list(self.0.elem.clone())
    }

    pub fn notifier(&self) -> Option<&ChangeNotifier<CollectionChange>> {
        self.0.changes.as_ref()
    }

    pub fn len(&self) -> usize {
        self.0.items.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.items.borrow().is_empty()
    }

    pub fn get(&self, index: usize) -> Option<Value> {
        self.0.items.borrow().get(index).cloned()
    }

    /// Copy of the current items.
    pub fn snapshot(&self) -> Vec<Value> {
        self.0.items.borrow().clone()
    }

    pub fn index_of(&self, value: &Value) -> Option<usize> {
        self.0.items.borrow().iter().position(|item| item == value)
    }

    pub fn push(&self, item: Value) -> Result<(), ChangeRejected> {
        let index = {
            let mut items = self.0.items.borrow_mut();
            items.push(item.clone());
            items.len() - 1
        };
        self.publish(&CollectionChange::Added { index, item }, |items| {
            items.remove(index);
        })
    }

    pub fn insert(&self, index: usize, item: Value) -> Result<(), ChangeRejected> {
        {
            let mut items = self.0.items.borrow_mut();
            if index > items.len() {
                return Err(out_of_range(index, items.len()));
            }
            items.insert(index, item.clone());
        }
        self.publish(&CollectionChange::Added { index, item }, |items| {
            items.remove(index);
        })
    }

    pub fn remove_at(&self, index: usize) -> Result<Value, ChangeRejected> {
        let item = {
            let mut items = self.0.items.borrow_mut();
            if index >= items.len() {
                return Err(out_of_range(index, items.len()));
            }
            items.remove(index)
        };
        let restore = item.clone();
        self.publish(
            &CollectionChange::Removed {
                index,
                item: item.clone(),
            },
            |items| items.insert(index, restore),
        )?;
        Ok(item)
    }

    /// Remove the first item equal to `value`. Returns whether one was found.
    pub fn remove(&self, value: &Value) -> Result<bool, ChangeRejected> {
        match self.index_of(value) {
            Some(index) => self.remove_at(index).map(|_| true),
            None => Ok(false),
        }
    }

    /// Remove every item, last first, announcing each removal.
    pub fn clear(&self) -> Result<(), ChangeRejected> {
        while let Some(last) = self.len().checked_sub(1) {
            self.remove_at(last)?;
        }
        Ok(())
    }

    pub fn replace(&self, index: usize, item: Value) -> Result<Value, ChangeRejected> {
        let old = self.swap(index, item.clone())?;
        let restore = old.clone();
        self.publish(
            &CollectionChange::Replaced {
                index,
                old: old.clone(),
                new: item,
            },
            |items| items[index] = restore,
        )?;
        Ok(old)
    }

    pub fn move_item(&self, from: usize, to: usize) -> Result<(), ChangeRejected> {
        let item = {
            let mut items = self.0.items.borrow_mut();
            let len = items.len();
            if from >= len || to >= len {
                return Err(out_of_range(from.max(to), len));
            }
            let item = items.remove(from);
            items.insert(to, item.clone());
            item
        };
        self.publish(&CollectionChange::Moved { from, to, item }, |items| {
            let item = items.remove(to);
            items.insert(from, item);
        })
    }

    /// Swap the whole content at once.
    pub fn reset(&self, items: Vec<Value>) -> Result<(), ChangeRejected> {
        let previous = self.0.items.replace(items);
        self.publish(&CollectionChange::Reset, |items| *items = previous)
    }

    /// Engine write-back of one element, announced as its own change kind.
    pub fn write_back(&self, index: usize, item: Value) -> Result<Value, ChangeRejected> {
        let old = self.swap(index, item.clone())?;
        let restore = old.clone();
        self.publish(
            &CollectionChange::WrittenBack {
                index,
                old: old.clone(),
                new: item,
            },
            |items| items[index] = restore,
        )?;
        Ok(old)
    }

    fn swap(&self, index: usize, item: Value) -> Result<Value, ChangeRejected> {
        let mut items = self.0.items.borrow_mut();
        let len = items.len();
        let slot = items.get_mut(index).ok_or_else(|| out_of_range(index, len))?;
        Ok(std::mem::replace(slot, item))
    }

    fn publish(
        &self,
        change: &CollectionChange,
        undo: impl FnOnce(&mut Vec<Value>),
    ) -> Result<(), ChangeRejected> {
        let Some(changes) = &self.0.changes else {
            return Ok(());
        };
        tracing::trace!(kind = change.kind(), "list change");
        let result = changes.emit_with_rollback(change, || {
            undo(&mut self.0.items.borrow_mut());
            change.inverse()
        });
        if let Err(rejected) = &result {
            tracing::debug!(kind = change.kind(), %rejected, "list change rolled back");
        }
        result
    }

    pub fn identity(&self) -> IdentityKey {
        IdentityKey::of(&self.0)
    }

    pub(crate) fn downgrade(&self) -> WeakValue {
        WeakValue(WeakKind::List(Rc::downgrade(&self.0)))
    }
}

impl fmt::Debug for ListRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.0.items.borrow().iter()).finish()
    }
}

pub(crate) struct PairCell {
    key: Value,
    value: RefCell<Value>,
    key_ty: Ty,
    value_ty: Ty,
    events: ChangeNotifier<PropertyChanged>,
}

/// One map entry. Identity is stable for the life of the entry.
#[derive(Clone)]
pub struct PairRef(Rc<PairCell>);

impl PairRef {
    fn new(key: Value, value: Value, key_ty: Ty, value_ty: Ty) -> Self {
        PairRef(Rc::new(PairCell {
            key,
            value: RefCell::new(value),
            key_ty,
            value_ty,
            events: ChangeNotifier::new(),
        }))
    }

    pub fn key(&self) -> Value {
        self.0.key.clone()
    }

    pub fn value(&self) -> Value {
        self.0.value.borrow().clone()
    }

    pub fn ty(&self) -> Ty {
        Ty::pair(self.0.key_ty.clone(), self.0.value_ty.clone())
    }

    pub fn value_ty(&self) -> &Ty {
        &self.0.value_ty
    }

    /// Overwrite the entry's value, announcing it as a `Value` property change.
    pub fn set_value(&self, value: Value) -> Value {
        let old = self.0.value.replace(value);
        if let Err(rejected) = self.0.events.emit(&PropertyChanged::new("Value")) {
            tracing::warn!(%rejected, "pair value change refused by a subscriber");
        }
        old
    }

    pub fn notifier(&self) -> &ChangeNotifier<PropertyChanged> {
        &self.0.events
    }

    pub fn identity(&self) -> IdentityKey {
        IdentityKey::of(&self.0)
    }

    pub(crate) fn downgrade(&self) -> WeakValue {
        WeakValue(WeakKind::Pair(Rc::downgrade(&self.0)))
    }
}

impl fmt::Debug for PairRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}: {:?}", self.0.key, self.0.value.borrow())
    }
}

pub(crate) struct MapCell {
    key_ty: Ty,
    value_ty: Ty,
    entries: RefCell<Vec<PairRef>>,
    changes: Option<ChangeNotifier<CollectionChange>>,
}

/// Shared, insertion-ordered dictionary.
///
/// Changes are announced with [`Value::Pair`] items so a tree can mirror
/// them as pair nodes.
#[derive(Clone)]
pub struct MapRef(Rc<MapCell>);

impl MapRef {
    pub fn observable(key_ty: Ty, value_ty: Ty, entries: Vec<(Value, Value)>) -> Self {
        Self::build(key_ty, value_ty, entries, Some(ChangeNotifier::new()))
    }

    pub fn plain(key_ty: Ty, value_ty: Ty, entries: Vec<(Value, Value)>) -> Self {
        Self::build(key_ty, value_ty, entries, None)
    }

    fn build(
        key_ty: Ty,
        value_ty: Ty,
        entries: Vec<(Value, Value)>,
        changes: Option<ChangeNotifier<CollectionChange>>,
    ) -> Self {
        let mut pairs: Vec<PairRef> = Vec::with_capacity(entries.len());
        for (key, value) in entries {
            // Later duplicates win, keeping the first position.
            if let Some(existing) = pairs.iter().find(|p| p.0.key == key) {
                existing.0.value.replace(value);
            } else {
                pairs.push(PairRef::new(key, value, key_ty.clone(), value_ty.clone()));
            }
        }
        MapRef(Rc::new(MapCell {
            key_ty,
            value_ty,
            entries: RefCell::new(pairs),
            changes,
        }))
    }

    pub fn ty(&self) -> Ty {
        Ty::map(self.0.key_ty.clone(), self.0.value_ty.clone())
    }

    pub fn notifier(&self) -> Option<&ChangeNotifier<CollectionChange>> {
        self.0.changes.as_ref()
    }

    pub fn len(&self) -> usize {
        self.0.entries.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.entries.borrow().is_empty()
    }

    /// Entries in insertion order.
    pub fn pairs(&self) -> Vec<PairRef> {
        self.0.entries.borrow().clone()
    }

    pub fn get(&self, key: &Value) -> Option<Value> {
        self.find(key).map(|pair| pair.value())
    }

    fn find(&self, key: &Value) -> Option<PairRef> {
        self.0
            .entries
            .borrow()
            .iter()
            .find(|pair| pair.0.key == *key)
            .cloned()
    }

    /// Insert or overwrite. Overwriting keeps the entry and returns the old value.
    pub fn insert(&self, key: Value, value: Value) -> Result<Option<Value>, ChangeRejected> {
        if let Some(pair) = self.find(&key) {
            return Ok(Some(pair.set_value(value)));
        }
        let pair = PairRef::new(key, value, self.0.key_ty.clone(), self.0.value_ty.clone());
        let index = {
            let mut entries = self.0.entries.borrow_mut();
            entries.push(pair.clone());
            entries.len() - 1
        };
        self.publish(
            &CollectionChange::Added {
                index,
                item: Value::Pair(pair),
            },
            |entries| {
                entries.remove(index);
            },
        )?;
        Ok(None)
    }

    pub fn remove(&self, key: &Value) -> Result<Option<Value>, ChangeRejected> {
        let Some(index) = self.0.entries.borrow().iter().position(|p| p.0.key == *key) else {
            return Ok(None);
        };
        let pair = self.0.entries.borrow_mut().remove(index);
        let restore = pair.clone();
        self.publish(
            &CollectionChange::Removed {
                index,
                item: Value::Pair(pair.clone()),
            },
            |entries| entries.insert(index, restore),
        )?;
        Ok(Some(pair.value()))
    }

    fn publish(
        &self,
        change: &CollectionChange,
        undo: impl FnOnce(&mut Vec<PairRef>),
    ) -> Result<(), ChangeRejected> {
        let Some(changes) = &self.0.changes else {
            return Ok(());
        };
        tracing::trace!(kind = change.kind(), "map change");
        let result = changes.emit_with_rollback(change, || {
            undo(&mut self.0.entries.borrow_mut());
            change.inverse()
        });
        if let Err(rejected) = &result {
            tracing::debug!(kind = change.kind(), %rejected, "map change rolled back");
        }
        result
    }

    pub fn identity(&self) -> IdentityKey {
        IdentityKey::of(&self.0)
    }

    pub(crate) fn downgrade(&self) -> WeakValue {
        WeakValue(WeakKind::Map(Rc::downgrade(&self.0)))
    }
}

impl fmt::Debug for MapRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.0.entries.borrow().iter()).finish()
    }
}
