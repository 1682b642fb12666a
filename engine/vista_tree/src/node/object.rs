//! Object nodes: one slot of the domain graph.

use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::{Rc, Weak};

use vista_meta::{Descriptor, PropertyDef, Subject};
use vista_types::errors::{
    detached_node, read_only, return_value_read_only, type_mismatch, unsupported_change,
};
use vista_types::{classify, EngineResult, Ty, TypeClass};
use vista_value::{ChangeNotifier, FromValue, Subscription, Value};

use super::collection::ElementState;
use super::members::MemberBinding;
use super::{CollectionNode, MethodNode, Node, NodeFlags, SourceKind};
use crate::context::Context;

/// Where a node reads and writes its value.
pub(crate) enum Slot {
    Property { receiver: Value, def: Rc<PropertyDef> },
    Element,
    ReturnValue,
    Parameter,
}

pub(crate) struct NodeCore {
    pub(super) ctx: Context,
    pub(super) slot: Slot,
    /// Declared type of the slot; the loaded value may be a subtype.
    pub(super) ty: Ty,
    pub(super) info: RefCell<Descriptor>,
    pub(super) flags: Cell<NodeFlags>,
    pub(super) loaded: Cell<bool>,
    pub(super) parent: RefCell<Weak<NodeCore>>,
    /// Last loaded value. Element, result and argument slots also park their
    /// not-yet-loaded value here.
    pub(super) cache: RefCell<Option<Value>>,
    pub(super) members: RefCell<MemberBinding>,
    pub(super) successor: RefCell<Option<Node>>,
    pub(super) value_changed: ChangeNotifier<ObjectNode>,
    pub(super) collection: Option<ElementState>,
}

/// A node whose value is one slot of the domain graph.
///
/// Cloning is cheap and yields a handle to the same node.
#[derive(Clone)]
pub struct ObjectNode(pub(super) Rc<NodeCore>);

/// Sets [`NodeFlags::WRITING`] for the duration of a write.
struct WritingGuard<'a>(&'a ObjectNode);

impl<'a> WritingGuard<'a> {
    fn new(node: &'a ObjectNode) -> Self {
        node.update_flags(|flags| flags.union(NodeFlags::WRITING));
        WritingGuard(node)
    }
}

impl Drop for WritingGuard<'_> {
    fn drop(&mut self) {
        self.0.update_flags(|flags| flags.difference(NodeFlags::WRITING));
    }
}

impl ObjectNode {
    fn build(
        ctx: &Context,
        slot: Slot,
        ty: Ty,
        info: Descriptor,
        read_only: bool,
        parent: Option<&ObjectNode>,
    ) -> Self {
        let mut flags = NodeFlags::empty();
        if read_only {
            flags |= NodeFlags::READ_ONLY;
        }
        if info.interactive && !read_only {
            flags |= NodeFlags::ENABLED;
        }
        let collection = matches!(classify(&ty), Ok(TypeClass::Collection)).then(ElementState::new);
        ObjectNode(Rc::new(NodeCore {
            ctx: ctx.clone(),
            slot,
            ty,
            info: RefCell::new(info),
            flags: Cell::new(flags),
            loaded: Cell::new(false),
            parent: RefCell::new(parent.map_or_else(Weak::new, ObjectNode::downgrade)),
            cache: RefCell::new(None),
            members: RefCell::new(MemberBinding::Unbound),
            successor: RefCell::new(None),
            value_changed: ChangeNotifier::new(),
            collection,
        }))
    }

    pub(crate) fn property(
        ctx: &Context,
        receiver: Value,
        def: Rc<PropertyDef>,
        mut info: Descriptor,
        parent: Option<&ObjectNode>,
    ) -> Self {
        if info.name.is_none() {
            info.name = Some(def.name.clone());
        }
        if info.header.is_empty() {
            info.header.clone_from(&def.name);
        }
        let ty = def.ty.clone();
        let read_only = !def.is_writable();
        Self::build(ctx, Slot::Property { receiver, def }, ty, info, read_only, parent)
    }

    pub(crate) fn element(
        ctx: &Context,
        value: Value,
        ty: Ty,
        read_only: bool,
        parent: &ObjectNode,
    ) -> Self {
        let info = Descriptor::new(ctx.render(&value));
        let node = Self::build(ctx, Slot::Element, ty, info, read_only, Some(parent));
        node.park(value);
        node
    }

    /// An empty, writable argument slot of type `ty`.
    pub fn placeholder(ctx: &Context, ty: Ty, header: impl Into<String>) -> Self {
        Self::placeholder_with(ctx, ty, Descriptor::new(header))
    }

    pub(crate) fn placeholder_with(ctx: &Context, ty: Ty, info: Descriptor) -> Self {
        Self::build(ctx, Slot::Parameter, ty, info, false, None)
    }

    /// A read-only node holding a computed value.
    pub fn result(ctx: &Context, ty: Ty, value: Value) -> Self {
        let node = Self::build(ctx, Slot::ReturnValue, ty, Descriptor::new("result"), true, None);
        node.park(value);
        node
    }

    pub(crate) fn return_slot(ctx: &Context, ty: Ty) -> Self {
        Self::build(ctx, Slot::ReturnValue, ty, Descriptor::new("return"), true, None)
    }

    pub(crate) fn from_core(core: Rc<NodeCore>) -> Self {
        ObjectNode(core)
    }

    pub(crate) fn downgrade(&self) -> Weak<NodeCore> {
        Rc::downgrade(&self.0)
    }

    /// Same node, not merely an equal value.
    pub fn ptr_eq(&self, other: &ObjectNode) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }

    pub fn context(&self) -> &Context {
        &self.0.ctx
    }

    // Presentation

    pub fn header(&self) -> String {
        self.0.info.borrow().header.clone()
    }

    pub fn name(&self) -> Option<String> {
        self.0.info.borrow().name.clone()
    }

    pub fn description(&self) -> String {
        self.0.info.borrow().description.clone()
    }

    /// The descriptor currently presenting this node.
    pub fn info(&self) -> Descriptor {
        self.0.info.borrow().clone()
    }

    /// Render the value for display, clipped to the configured limit.
    pub fn preview(&self) -> EngineResult<String> {
        let value = self.value()?;
        let formatter = self.0.info.borrow().preview.clone();
        let text = match formatter {
            Some(format) => format(&value),
            None => self.0.ctx.render(&value),
        };
        Ok(self.0.ctx.config().clip_preview(text))
    }

    // Classification

    pub fn source_kind(&self) -> SourceKind {
        match self.0.slot {
            Slot::Property { .. } => SourceKind::PropertyBacked,
            Slot::Element => SourceKind::ElementBacked,
            Slot::ReturnValue => SourceKind::ReturnValueBacked,
            Slot::Parameter => SourceKind::ParameterPlaceholder,
        }
    }

    /// Declared type of the slot.
    pub fn ty(&self) -> Ty {
        self.0.ty.clone()
    }

    pub fn type_class(&self) -> EngineResult<TypeClass> {
        classify(&self.0.ty)
    }

    /// No children to expand: primitives, enums and empty result slots.
    pub fn is_leaf(&self) -> bool {
        self.0.ty.is_void() || matches!(classify(&self.0.ty), Ok(class) if class.is_leaf())
    }

    pub fn is_collection(&self) -> bool {
        self.0.collection.is_some()
    }

    pub fn as_collection(&self) -> Option<CollectionNode> {
        self.is_collection().then(|| CollectionNode::wrap(self.clone()))
    }

    /// Variant names offered for an enum-typed slot.
    pub fn enum_candidates(&self) -> Vec<String> {
        self.enum_info().map(|info| info.variants).unwrap_or_default()
    }

    /// Whether several enum variants may be chosen at once.
    pub fn is_multi_select(&self) -> bool {
        self.enum_info().is_some_and(|info| info.flags)
    }

    fn enum_info(&self) -> Option<vista_types::EnumInfo> {
        let idx = match &self.0.ty {
            Ty::Enum(idx) => *idx,
            _ => return None,
        };
        self.0.ctx.with_types(|types| types.enum_info(idx).cloned())
    }

    // Flags

    pub fn flags(&self) -> NodeFlags {
        self.0.flags.get()
    }

    fn update_flags(&self, f: impl FnOnce(NodeFlags) -> NodeFlags) {
        self.0.flags.set(f(self.0.flags.get()));
    }

    pub fn is_read_only(&self) -> bool {
        self.flags().contains(NodeFlags::READ_ONLY)
    }

    pub fn is_enabled(&self) -> bool {
        self.flags().contains(NodeFlags::ENABLED)
    }

    /// Toggle interactivity. A read-only node cannot be enabled; the request
    /// is reported as a warning and ignored.
    pub fn set_enabled(&self, enabled: bool) {
        if enabled && self.is_read_only() {
            self.warn("a read-only node cannot be enabled");
            return;
        }
        self.update_flags(|mut flags| {
            flags.set(NodeFlags::ENABLED, enabled);
            flags
        });
    }

    pub(crate) fn is_writing(&self) -> bool {
        self.flags().contains(NodeFlags::WRITING)
    }

    // Structure

    pub fn parent(&self) -> Option<ObjectNode> {
        self.0.parent.borrow().upgrade().map(ObjectNode)
    }

    pub(crate) fn set_parent(&self, parent: &ObjectNode) {
        *self.0.parent.borrow_mut() = parent.downgrade();
    }

    /// The node most recently navigated to from this one.
    pub fn successor(&self) -> Option<Node> {
        self.0.successor.borrow().clone()
    }

    pub(crate) fn set_successor(&self, successor: Node) {
        *self.0.successor.borrow_mut() = Some(successor);
    }

    /// Re-run the navigation chain from this node and return where it ends.
    ///
    /// Object successors are refreshed in place; a method successor is
    /// invoked again.
    pub fn instantiate_successor(&self) -> EngineResult<ObjectNode> {
        let mut current = self.clone();
        loop {
            match current.successor() {
                None => return Ok(current),
                Some(Node::Object(next)) => {
                    next.refresh()?;
                    current = next;
                }
                Some(Node::Method(method)) => return method.instantiate_successor(),
            }
        }
    }

    /// Property and collection-element children, materialized on first call.
    pub fn children(&self) -> EngineResult<Vec<ObjectNode>> {
        self.value()?;
        Ok(self.member_children())
    }

    /// Operations of the loaded value, materialized on first call.
    pub fn operations(&self) -> EngineResult<Vec<MethodNode>> {
        self.value()?;
        Ok(self.member_operations())
    }

    /// Child by member name, falling back to header. A found child becomes
    /// this node's successor.
    pub fn child(&self, name: &str) -> EngineResult<Option<ObjectNode>> {
        let children = self.children()?;
        let found = children
            .iter()
            .find(|child| child.name().as_deref() == Some(name))
            .or_else(|| children.iter().find(|child| child.header() == name))
            .cloned();
        if let Some(child) = &found {
            self.set_successor(Node::Object(child.clone()));
        }
        Ok(found)
    }

    pub fn operation(&self, name: &str) -> EngineResult<Option<MethodNode>> {
        let operations = self.operations()?;
        Ok(operations
            .iter()
            .find(|op| op.name().as_deref() == Some(name))
            .or_else(|| operations.iter().find(|op| op.header() == name))
            .cloned())
    }

    pub(crate) fn property_name(&self) -> Option<&str> {
        match &self.0.slot {
            Slot::Property { def, .. } => Some(def.name.as_str()),
            _ => None,
        }
    }

    // Value

    /// The slot's value, loading it on first access.
    pub fn value(&self) -> EngineResult<Value> {
        if self.0.loaded.get() {
            if let Some(value) = self.cached_value() {
                return Ok(value);
            }
        }
        self.load()
    }

    /// Typed view of the value; `None` if it has a different shape.
    pub fn value_as<T: FromValue>(&self) -> EngineResult<Option<T>> {
        Ok(T::from_value(&self.value()?))
    }

    pub fn is_loaded(&self) -> bool {
        self.0.loaded.get()
    }

    pub(crate) fn cached_value(&self) -> Option<Value> {
        self.0.cache.borrow().clone()
    }

    /// Store a value to be bound on first access.
    pub(super) fn park(&self, value: Value) {
        *self.0.cache.borrow_mut() = Some(value);
    }

    #[tracing::instrument(level = "debug", skip_all, fields(node = %self.header()))]
    fn load(&self) -> EngineResult<Value> {
        let value = self.read_source()?;
        self.bind(value.clone(), false);
        Ok(value)
    }

    fn read_source(&self) -> EngineResult<Value> {
        match &self.0.slot {
            Slot::Property { receiver, def } => def.get(receiver),
            Slot::Element | Slot::ReturnValue | Slot::Parameter => {
                Ok(self.cached_value().unwrap_or_default())
            }
        }
    }

    /// Make `value` the node's value: cache it, attach members and elements,
    /// and re-resolve presentation.
    pub(super) fn bind(&self, value: Value, refresh: bool) {
        *self.0.cache.borrow_mut() = Some(value.clone());
        self.0.loaded.set(true);
        self.bind_members(&value, refresh);
        self.resolve_info(&value);
        if self.is_collection() {
            self.materialize_elements(&value);
        }
    }

    /// Replace the value without writing to the source.
    pub(super) fn assign(&self, value: Value) {
        if self.0.loaded.get() {
            self.bind(value, false);
        } else {
            self.park(value);
        }
    }

    fn resolve_info(&self, value: &Value) {
        let declared = match &self.0.slot {
            Slot::Property { def, .. } => def.declared.clone(),
            _ => None,
        };
        let resolved = self.0.ctx.resolver().resolve(&Subject {
            value: Some(value),
            declared: declared.as_ref(),
        });
        let mut info = self.0.info.borrow_mut();
        match resolved {
            Some(resolved) => {
                let name = info.name.take();
                let header = std::mem::take(&mut info.header);
                *info = resolved.descriptor;
                if info.name.is_none() {
                    info.name = name;
                }
                if info.header.is_empty() {
                    info.header = header;
                }
            }
            None if matches!(self.0.slot, Slot::Element) => {
                info.header = self.0.ctx.render(value);
            }
            None => {}
        }
    }

    /// Write a new value through to the domain.
    ///
    /// Equal values are ignored. Property slots call the setter, element
    /// slots write back into the parent collection, argument slots only
    /// update the node. Value-changed subscribers are notified afterwards.
    #[tracing::instrument(level = "debug", skip_all, fields(node = %self.header()))]
    pub fn set_value(&self, value: impl Into<Value>) -> EngineResult<()> {
        let value = value.into();
        let current = self.value()?;
        if current == value {
            return Ok(());
        }
        if self.is_read_only() {
            return Err(match self.0.slot {
                Slot::ReturnValue => return_value_read_only(self.header()),
                _ => read_only(self.header()),
            });
        }
        self.check_assignable(&value)?;
        self.write_through(&current, &value)?;
        self.bind(value, false);
        self.notify_value_changed();
        Ok(())
    }

    fn check_assignable(&self, value: &Value) -> EngineResult<()> {
        if value.is_void() || self.0.ctx.is_assignable(&self.0.ty, value) {
            return Ok(());
        }
        let found = self.0.ctx.runtime_ty(value);
        Err(type_mismatch(
            self.0.ctx.type_name(&self.0.ty),
            self.0.ctx.type_name(&found),
        ))
    }

    fn write_through(&self, current: &Value, value: &Value) -> EngineResult<()> {
        let _writing = WritingGuard::new(self);
        match &self.0.slot {
            Slot::Property { receiver, def } => def.set(receiver, value.clone()),
            Slot::Element => self.write_back(current, value),
            Slot::ReturnValue | Slot::Parameter => Ok(()),
        }
    }

    fn write_back(&self, current: &Value, value: &Value) -> EngineResult<()> {
        let detached = || detached_node(self.header());
        let parent = self.parent().ok_or_else(detached)?;
        let Some(Value::List(list)) = parent.cached_value() else {
            return Err(detached());
        };
        let index = parent
            .position_of(self)
            .filter(|&i| list.get(i).as_ref() == Some(current))
            .or_else(|| list.index_of(current))
            .ok_or_else(detached)?;
        list.write_back(index, value.clone())
            .map(drop)
            .map_err(|rejected| unsupported_change(rejected.reason))
    }

    /// Bind this slot to whatever `other` holds.
    ///
    /// Argument and result slots rebind in memory; other slots write through
    /// as with [`set_value`](Self::set_value).
    pub fn set_reference_to(&self, other: &ObjectNode) -> EngineResult<()> {
        let value = other.value()?;
        self.rebind(value)
    }

    /// Rebind an argument or result slot without touching the domain.
    pub fn rebind(&self, value: Value) -> EngineResult<()> {
        match self.0.slot {
            Slot::Parameter => {
                self.check_assignable(&value)?;
                self.store(value);
                Ok(())
            }
            Slot::ReturnValue => {
                self.store(value);
                Ok(())
            }
            Slot::Property { .. } | Slot::Element => self.set_value(value),
        }
    }

    /// Bind and notify.
    pub(crate) fn store(&self, value: Value) {
        self.bind(value, false);
        self.notify_value_changed();
    }

    /// Re-read the value and drop materialized children and elements.
    ///
    /// Does not notify; the caller decides whether the refresh is news.
    #[tracing::instrument(level = "debug", skip_all, fields(node = %self.header()))]
    pub fn refresh(&self) -> EngineResult<()> {
        let value = self.read_source()?;
        self.bind(value, true);
        Ok(())
    }

    // Events

    pub fn on_value_changed(&self, callback: impl Fn(&ObjectNode) + 'static) -> Subscription {
        self.0.value_changed.subscribe(callback)
    }

    pub(crate) fn notify_value_changed(&self) {
        if let Err(rejected) = self.0.value_changed.emit(self) {
            tracing::debug!(%rejected, "value-changed subscriber refused");
        }
    }

    /// Publish a soft failure against this node.
    pub fn warn(&self, message: impl Into<String>) {
        self.0.ctx.warn(Node::Object(self.clone()), message);
    }
}

impl fmt::Debug for ObjectNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ObjectNode")
            .field("header", &self.header())
            .field("source", &self.source_kind())
            .field("ty", &self.0.ty)
            .field("loaded", &self.is_loaded())
            .finish_non_exhaustive()
    }
}
