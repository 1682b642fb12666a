//! Member lists of object and pair values.
//!
//! The first node to load a given domain object owns its member list: the
//! child nodes, the operation nodes, and the one subscription to the
//! object's property-changed notifications. Other nodes loading the same
//! object alias the owner through a weak link. If the owner is gone or has
//! been rebound to something else, the alias takes ownership on its next
//! enumeration.

use std::rc::Weak;

use vista_meta::Subject;
use vista_types::{classify, Ty};
use vista_value::{ChangeNotifier, PropertyChanged, Subscription, Value};

use super::object::NodeCore;
use super::{MethodNode, ObjectNode};

pub(crate) enum MemberBinding {
    /// The value has no members (primitives, enums, collections, void).
    Unbound,
    Own(MemberSet),
    Alias(Weak<NodeCore>),
}

pub(crate) struct MemberSet {
    receiver: Value,
    ty: Ty,
    children: Option<Vec<ObjectNode>>,
    operations: Option<Vec<MethodNode>>,
    _subscription: Option<Subscription>,
}

impl MemberSet {
    fn new(owner: &ObjectNode, receiver: Value) -> Self {
        let ty = owner.context().runtime_ty(&receiver);
        let subscription = notifier_of(&receiver).map(|notifier| {
            let weak = owner.downgrade();
            notifier.subscribe(move |event: &PropertyChanged| {
                if let Some(core) = weak.upgrade() {
                    ObjectNode::from_core(core).on_member_changed(&event.name);
                }
            })
        });
        MemberSet {
            receiver,
            ty,
            children: None,
            operations: None,
            _subscription: subscription,
        }
    }

    fn clear(&mut self) {
        self.children = None;
        self.operations = None;
    }
}

fn has_members(value: &Value) -> bool {
    matches!(value, Value::Object(_) | Value::Pair(_))
}

fn notifier_of(value: &Value) -> Option<&ChangeNotifier<PropertyChanged>> {
    match value {
        Value::Object(object) => object.get().notifier(),
        Value::Pair(pair) => Some(pair.notifier()),
        _ => None,
    }
}

impl ObjectNode {
    /// Whether this node owns the member list of `value`.
    pub(crate) fn owns_members_of(&self, value: &Value) -> bool {
        matches!(&*self.0.members.borrow(), MemberBinding::Own(set) if set.receiver.same_identity(value))
    }

    fn set_binding(&self, binding: MemberBinding) {
        let previous = std::mem::replace(&mut *self.0.members.borrow_mut(), binding);
        drop(previous);
    }

    fn take_ownership(&self, value: &Value) {
        self.set_binding(MemberBinding::Own(MemberSet::new(self, value.clone())));
        if self.context().config().share_members {
            self.context().claim_canonical(value, self);
        }
    }

    fn clear_members(&self) {
        if let MemberBinding::Own(set) = &mut *self.0.members.borrow_mut() {
            set.clear();
        }
    }

    fn alias_target(&self) -> Option<ObjectNode> {
        match &*self.0.members.borrow() {
            MemberBinding::Alias(weak) => weak.upgrade().map(ObjectNode::from_core),
            MemberBinding::Unbound | MemberBinding::Own(_) => None,
        }
    }

    pub(super) fn bind_members(&self, value: &Value, refresh: bool) {
        if !has_members(value) {
            self.set_binding(MemberBinding::Unbound);
            return;
        }
        if self.owns_members_of(value) {
            if refresh {
                self.clear_members();
            }
            return;
        }
        if let Some(owner) = self.alias_target().filter(|owner| owner.owns_members_of(value)) {
            if refresh {
                owner.clear_members();
            }
            return;
        }
        if self.context().config().share_members {
            if let Some(owner) = self.context().canonical_node(value) {
                if !owner.ptr_eq(self) {
                    self.set_binding(MemberBinding::Alias(owner.downgrade()));
                    return;
                }
            }
        }
        self.take_ownership(value);
    }

    /// The node whose member list this node presents.
    fn member_owner(&self) -> Option<ObjectNode> {
        let alias = match &*self.0.members.borrow() {
            MemberBinding::Unbound => return None,
            MemberBinding::Own(_) => return Some(self.clone()),
            MemberBinding::Alias(weak) => weak.upgrade().map(ObjectNode::from_core),
        };
        let value = self.cached_value()?;
        if let Some(owner) = alias.filter(|owner| owner.owns_members_of(&value)) {
            return Some(owner);
        }
        tracing::trace!(node = %self.header(), "member owner gone, taking over");
        self.take_ownership(&value);
        Some(self.clone())
    }

    pub(super) fn member_children(&self) -> Vec<ObjectNode> {
        self.member_owner()
            .map(|owner| owner.own_children())
            .unwrap_or_default()
    }

    pub(super) fn member_operations(&self) -> Vec<MethodNode> {
        self.member_owner()
            .map(|owner| owner.own_operations())
            .unwrap_or_default()
    }

    fn own_receiver(&self) -> Option<(Value, Ty)> {
        match &*self.0.members.borrow() {
            MemberBinding::Own(set) => Some((set.receiver.clone(), set.ty.clone())),
            MemberBinding::Unbound | MemberBinding::Alias(_) => None,
        }
    }

    fn own_children(&self) -> Vec<ObjectNode> {
        if let MemberBinding::Own(MemberSet {
            children: Some(children),
            ..
        }) = &*self.0.members.borrow()
        {
            return children.clone();
        }
        let Some((receiver, ty)) = self.own_receiver() else {
            return Vec::new();
        };
        let ctx = self.context().clone();
        let defs = ctx.catalog().properties_of(&ty);
        let mut children = Vec::with_capacity(defs.len());
        for def in defs {
            let resolved = ctx.resolver().resolve(&Subject {
                value: None,
                declared: def.declared.as_ref(),
            });
            let Some(resolved) = resolved else {
                continue;
            };
            if let Err(err) = classify(&def.ty) {
                self.warn(format!("member `{}` skipped: {err}", def.name));
                continue;
            }
            children.push(ObjectNode::property(
                &ctx,
                receiver.clone(),
                def,
                resolved.descriptor,
                Some(self),
            ));
        }
        tracing::debug!(node = %self.header(), count = children.len(), "children materialized");
        if let MemberBinding::Own(set) = &mut *self.0.members.borrow_mut() {
            set.children = Some(children.clone());
        }
        children
    }

    fn own_operations(&self) -> Vec<MethodNode> {
        if let MemberBinding::Own(MemberSet {
            operations: Some(operations),
            ..
        }) = &*self.0.members.borrow()
        {
            return operations.clone();
        }
        let Some((receiver, ty)) = self.own_receiver() else {
            return Vec::new();
        };
        let ctx = self.context().clone();
        let defs = ctx.catalog().methods_of(&ty);
        let operations: Vec<MethodNode> = defs
            .into_iter()
            .filter_map(|def| {
                let resolved = ctx.resolver().resolve(&Subject {
                    value: None,
                    declared: def.declared.as_ref(),
                })?;
                Some(MethodNode::bound(
                    &ctx,
                    receiver.clone(),
                    def,
                    resolved.descriptor,
                    Some(self),
                ))
            })
            .collect();
        if let MemberBinding::Own(set) = &mut *self.0.members.borrow_mut() {
            set.operations = Some(operations.clone());
        }
        operations
    }

    /// A property of the owned value changed: refresh that child and pass
    /// the news on. Children not yet materialized need nothing.
    fn on_member_changed(&self, name: &str) {
        let child = match &*self.0.members.borrow() {
            MemberBinding::Own(set) => set.children.as_ref().and_then(|children| {
                children
                    .iter()
                    .find(|child| child.property_name() == Some(name))
                    .cloned()
            }),
            MemberBinding::Unbound | MemberBinding::Alias(_) => None,
        };
        let Some(child) = child else {
            return;
        };
        if child.is_writing() || !child.is_loaded() {
            return;
        }
        match child.refresh() {
            Ok(()) => child.notify_value_changed(),
            Err(err) => child.warn(format!("refresh after change of `{name}` failed: {err}")),
        }
    }
}
