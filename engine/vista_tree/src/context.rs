//! State shared by every node of one registry.
//!
//! Nodes hold a [`Context`] rather than the [`Registry`](crate::Registry), so
//! the registry's root list never forms a reference cycle with the nodes in
//! it.

use std::cell::{Ref, RefCell, RefMut};
use std::rc::{Rc, Weak};

use rustc_hash::FxHashMap;
use vista_meta::{Catalog, VisibilityResolver};
use vista_types::{EngineResult, Ty, TypeTable};
use vista_value::{ChangeNotifier, IdentityKey, Subscription, Value};

use crate::config::EngineConfig;
use crate::node::{Node, NodeCore, ObjectNode};
use crate::warning::{Warning, WarningSink};

struct ContextCore {
    catalog: RefCell<Catalog>,
    resolver: RefCell<VisibilityResolver>,
    warnings: ChangeNotifier<Warning>,
    sink: WarningSink,
    /// Identity of a domain object to the node that owns its member list.
    canonical: RefCell<FxHashMap<IdentityKey, Weak<NodeCore>>>,
    config: EngineConfig,
}

/// Handle to the catalog, resolver, warning channel and identity cache.
#[derive(Clone)]
pub struct Context(Rc<ContextCore>);

impl Context {
    pub(crate) fn new(
        config: EngineConfig,
        resolver: VisibilityResolver,
        sink: WarningSink,
    ) -> Self {
        Context(Rc::new(ContextCore {
            catalog: RefCell::new(Catalog::new()),
            resolver: RefCell::new(resolver),
            warnings: ChangeNotifier::new(),
            sink,
            canonical: RefCell::new(FxHashMap::default()),
            config,
        }))
    }

    pub fn config(&self) -> &EngineConfig {
        &self.0.config
    }

    pub fn catalog(&self) -> Ref<'_, Catalog> {
        self.0.catalog.borrow()
    }

    pub(crate) fn catalog_mut(&self) -> RefMut<'_, Catalog> {
        self.0.catalog.borrow_mut()
    }

    pub fn resolver(&self) -> Ref<'_, VisibilityResolver> {
        self.0.resolver.borrow()
    }

    pub(crate) fn resolver_mut(&self) -> RefMut<'_, VisibilityResolver> {
        self.0.resolver.borrow_mut()
    }

    /// Run `f` against the type table.
    pub fn with_types<R>(&self, f: impl FnOnce(&TypeTable) -> R) -> R {
        f(self.catalog().types())
    }

    pub fn runtime_ty(&self, value: &Value) -> Ty {
        self.with_types(|types| value.runtime_ty(types))
    }

    pub fn type_name(&self, ty: &Ty) -> String {
        self.with_types(|types| types.name_of(ty))
    }

    pub fn is_assignable(&self, target: &Ty, value: &Value) -> bool {
        self.with_types(|types| types.is_assignable(target, &value.runtime_ty(types)))
    }

    /// Human-readable rendering of a value; enums show their variant names.
    pub fn render(&self, value: &Value) -> String {
        match value {
            Value::Enum(e) => self.with_types(|types| {
                types
                    .enum_info(e.ty)
                    .map_or_else(|| value.to_string(), |info| info.render(e.bits))
            }),
            Value::Pair(pair) => {
                format!("{}: {}", self.render(&pair.key()), self.render(&pair.value()))
            }
            _ => value.to_string(),
        }
    }

    /// Publish a soft failure.
    pub fn warn(&self, node: Node, message: impl Into<String>) {
        let message = message.into();
        self.0.sink.publish(&node.header(), &message);
        let warning = Warning { node, message };
        if let Err(rejected) = self.0.warnings.emit(&warning) {
            tracing::debug!(%rejected, "warning subscriber refused");
        }
    }

    pub fn on_warning(&self, callback: impl Fn(&Warning) + 'static) -> Subscription {
        self.0.warnings.subscribe(callback)
    }

    pub fn captured_warnings(&self) -> Vec<String> {
        self.0.sink.captured()
    }

    pub fn clear_warnings(&self) {
        self.0.sink.clear();
    }

    /// Node currently owning the members of `value`, if still bound to it.
    pub(crate) fn canonical_node(&self, value: &Value) -> Option<ObjectNode> {
        let key = value.identity()?;
        let node = self.0.canonical.borrow().get(&key).and_then(Weak::upgrade)?;
        let node = ObjectNode::from_core(node);
        node.owns_members_of(value).then_some(node)
    }

    pub(crate) fn claim_canonical(&self, value: &Value, node: &ObjectNode) {
        if let Some(key) = value.identity() {
            let mut canonical = self.0.canonical.borrow_mut();
            canonical.retain(|_, weak| weak.strong_count() > 0);
            canonical.insert(key, node.downgrade());
        }
    }

    /// Identity-cache entries whose node is still alive.
    pub fn cached_identities(&self) -> usize {
        self.0
            .canonical
            .borrow()
            .values()
            .filter(|weak| weak.strong_count() > 0)
            .count()
    }

    pub(crate) fn register_with<R>(
        &self,
        f: impl FnOnce(&mut Catalog) -> EngineResult<R>,
    ) -> EngineResult<R> {
        f(&mut self.catalog_mut())
    }
}
