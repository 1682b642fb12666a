//! The registry: types, roots and the warning channel.
//!
//! A [`Registry`] is the consumer's entry point. It owns the catalog of
//! registered types, the root nodes shown at the top of the tree, and the
//! soft-failure channel every node reports into.

use std::cell::RefCell;

use rustc_hash::FxHashSet;
use vista_meta::{Descriptor, Provider, Subject, TypeBuilder, VisibilityResolver};
use vista_types::errors::invalid_type;
use vista_types::{classify, EngineError, EngineResult, Ty, TypeIdx};
use vista_value::{DomainObject, Subscription, Value};

use crate::config::EngineConfig;
use crate::context::Context;
use crate::node::{MethodNode, Node, ObjectNode, RootKind};
use crate::warning::{Warning, WarningSink};

/// Builder for [`Registry`].
#[derive(Default)]
pub struct RegistryBuilder {
    config: EngineConfig,
    sink: WarningSink,
    providers: Option<Vec<Provider>>,
}

impl RegistryBuilder {
    #[must_use]
    pub fn config(mut self, config: EngineConfig) -> Self {
        self.config = config;
        self
    }

    /// Let nodes over the same domain object share member nodes.
    #[must_use]
    pub fn share_members(mut self, share: bool) -> Self {
        self.config.share_members = share;
        self
    }

    #[must_use]
    pub fn preview_limit(mut self, limit: usize) -> Self {
        self.config.preview_limit = Some(limit);
        self
    }

    #[must_use]
    pub fn warnings(mut self, sink: WarningSink) -> Self {
        self.sink = sink;
        self
    }

    /// Replace the metadata provider order.
    #[must_use]
    pub fn providers(mut self, order: Vec<Provider>) -> Self {
        self.providers = Some(order);
        self
    }

    pub fn build(self) -> Registry {
        let resolver = match self.providers {
            Some(order) => VisibilityResolver::with_order(order),
            None => VisibilityResolver::new(),
        };
        tracing::debug!(config = ?self.config, sink = ?self.sink, "registry built");
        Registry {
            ctx: Context::new(self.config, resolver, self.sink),
            roots: RefCell::new(Vec::new()),
            imported: RefCell::new(FxHashSet::default()),
        }
    }
}

/// Registered types and the roots of the tree.
pub struct Registry {
    ctx: Context,
    roots: RefCell<Vec<Node>>,
    imported: RefCell<FxHashSet<TypeIdx>>,
}

impl Default for Registry {
    fn default() -> Self {
        Self::new()
    }
}

impl Registry {
    pub fn new() -> Self {
        RegistryBuilder::default().build()
    }

    pub fn builder() -> RegistryBuilder {
        RegistryBuilder::default()
    }

    pub fn context(&self) -> &Context {
        &self.ctx
    }

    // Types

    /// Register a domain type and its members.
    pub fn register<T: DomainObject>(&self, builder: TypeBuilder<T>) -> EngineResult<TypeIdx> {
        self.ctx.register_with(|catalog| catalog.register(builder))
    }

    pub fn register_enum(&self, name: &str, variants: &[&str], flags: bool) -> EngineResult<TypeIdx> {
        self.ctx
            .register_with(|catalog| catalog.register_enum(name, variants, flags))
    }

    /// Index the next registration will receive.
    pub fn next_type_idx(&self) -> TypeIdx {
        self.ctx.with_types(vista_types::TypeTable::next_idx)
    }

    /// Registered type by name.
    pub fn type_named(&self, name: &str) -> Option<TypeIdx> {
        self.ctx.with_types(|types| types.lookup(name))
    }

    /// Add the exposed static properties and operations of each type as
    /// roots. A type imported earlier is skipped. Returns the new roots.
    #[tracing::instrument(level = "debug", skip_all, fields(count = types.len()))]
    pub fn import_entry_types(&self, types: &[TypeIdx]) -> EngineResult<Vec<Node>> {
        let mut added = Vec::new();
        for &idx in types {
            if self.ctx.with_types(|table| table.get(idx).is_none()) {
                return Err(invalid_type(format!("{idx:?}")));
            }
            if !self.imported.borrow_mut().insert(idx) {
                tracing::debug!(ty = ?idx, "already imported");
                continue;
            }
            let (properties, methods) = {
                let catalog = self.ctx.catalog();
                (catalog.static_properties(idx), catalog.static_methods(idx))
            };
            for def in properties {
                let Some(resolved) = self.resolve_declared(def.declared.as_ref()) else {
                    continue;
                };
                if let Err(err) = classify(&def.ty) {
                    tracing::warn!(property = %def.name, %err, "static property skipped");
                    continue;
                }
                let node = ObjectNode::property(&self.ctx, Value::Void, def, resolved, None);
                added.push(Node::Object(node));
            }
            for def in methods {
                let Some(resolved) = self.resolve_declared(def.declared.as_ref()) else {
                    continue;
                };
                let node = MethodNode::bound(&self.ctx, Value::Void, def, resolved, None);
                added.push(Node::Method(node));
            }
        }
        self.roots.borrow_mut().extend(added.iter().cloned());
        Ok(added)
    }

    fn resolve_declared(&self, declared: Option<&Descriptor>) -> Option<Descriptor> {
        self.ctx
            .resolver()
            .resolve(&Subject {
                value: None,
                declared,
            })
            .map(|resolved| resolved.descriptor)
    }

    // Roots

    pub fn add_root(&self, node: impl Into<Node>) {
        self.roots.borrow_mut().push(node.into());
    }

    /// Add `value` as a writable root slot named `header`.
    pub fn add_value(&self, header: impl Into<String>, value: Value) -> ObjectNode {
        let header = header.into();
        let ty = self.ctx.runtime_ty(&value);
        let node = ObjectNode::placeholder_with(&self.ctx, ty, Descriptor::new(header.clone()).named(header));
        node.store(value);
        self.add_root(node.clone());
        node
    }

    /// Detach a root. Returns whether it was present.
    pub fn remove_root(&self, node: &Node) -> bool {
        let mut roots = self.roots.borrow_mut();
        let before = roots.len();
        roots.retain(|root| !root.ptr_eq(node));
        roots.len() != before
    }

    pub fn roots(&self) -> Vec<Node> {
        self.roots.borrow().clone()
    }

    /// Roots of one node kind, in root order.
    pub fn roots_of_kind<K: RootKind>(&self) -> Vec<K> {
        self.roots.borrow().iter().filter_map(K::from_node).collect()
    }

    /// Root by name, falling back to header.
    pub fn lookup_by_name(&self, name: &str) -> Option<Node> {
        let roots = self.roots.borrow();
        roots
            .iter()
            .find(|root| root.name().as_deref() == Some(name))
            .or_else(|| roots.iter().find(|root| root.header() == name))
            .cloned()
    }

    /// The node presenting `value`, if one was already materialized.
    ///
    /// Finds the node owning the value's members first, then any loaded
    /// root holding the same value. Never loads anything.
    pub fn find(&self, value: &Value) -> Option<ObjectNode> {
        if let Some(node) = self.ctx.canonical_node(value) {
            return Some(node);
        }
        self.roots
            .borrow()
            .iter()
            .filter_map(Node::as_object)
            .find(|node| node.is_loaded() && node.cached_value().is_some_and(|v| v.same_identity(value)))
            .cloned()
    }

    /// Refresh every object root. All roots are attempted; the first error
    /// is returned.
    pub fn refresh_all(&self) -> EngineResult<()> {
        let mut first: Option<EngineError> = None;
        for root in self.roots_of_kind::<ObjectNode>() {
            if let Err(err) = root.refresh() {
                root.warn(format!("refresh failed: {err}"));
                first.get_or_insert(err);
                continue;
            }
            root.notify_value_changed();
        }
        first.map_or(Ok(()), Err)
    }

    // Metadata

    /// Attach a descriptor to one runtime value.
    pub fn attach_descriptor(&self, target: &Value, descriptor: Descriptor) -> EngineResult<()> {
        self.ctx.resolver_mut().instances_mut().attach(target, descriptor)
    }

    pub fn detach_descriptor(&self, target: &Value) -> Option<Descriptor> {
        self.ctx.resolver_mut().instances_mut().detach(target)
    }

    // Warnings

    pub fn on_warning(&self, callback: impl Fn(&Warning) + 'static) -> Subscription {
        self.ctx.on_warning(callback)
    }

    /// Lines captured by a buffering sink.
    pub fn captured_warnings(&self) -> Vec<String> {
        self.ctx.captured_warnings()
    }

    pub fn clear_warnings(&self) {
        self.ctx.clear_warnings();
    }

    /// Name of a type, for diagnostics.
    pub fn type_name(&self, ty: &Ty) -> String {
        self.ctx.type_name(ty)
    }
}

#[cfg(test)]
mod tests;
