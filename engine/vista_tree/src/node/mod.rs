//! Tree nodes.
//!
//! Three node kinds project the domain graph:
//!
//! - [`ObjectNode`]: one value reached through a property, a collection
//!   element, an operation's result, or an argument slot
//! - [`CollectionNode`]: an [`ObjectNode`] whose value is a list or map,
//!   mirroring the source's additions and removals as element nodes
//! - [`MethodNode`]: an invokable operation with argument placeholders and a
//!   result slot
//!
//! Everything is lazy. A node reads its value on first access, and its
//! children and elements on first enumeration.
//!
//! # Ownership
//!
//! Parents own their children strongly and are referenced back weakly. The
//! successor link (the node most recently navigated to from this one) always
//! points down the tree, so it is held strongly as well.

use bitflags::bitflags;
use vista_types::EngineResult;

mod collection;
mod members;
mod method;
mod object;

pub use collection::{CollectionAction, CollectionEvent, CollectionNode};
pub use method::MethodNode;
pub(crate) use object::NodeCore;
pub use object::ObjectNode;

bitflags! {
    /// Per-node state bits.
    #[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
    pub struct NodeFlags: u8 {
        /// Writes are refused.
        const READ_ONLY = 1 << 0;
        /// Interactive; a read-only node may still be enabled for display.
        const ENABLED = 1 << 1;
        /// A write through this node is in flight; echoes are ignored.
        const WRITING = 1 << 2;
    }
}

/// Where an [`ObjectNode`]'s value comes from.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum SourceKind {
    /// A property read from a receiver.
    PropertyBacked,
    /// An element of a parent collection.
    ElementBacked,
    /// The result of an invocation or a query.
    ReturnValueBacked,
    /// An argument slot or template binding.
    ParameterPlaceholder,
}

/// Any node that can sit in the registry's root list.
#[derive(Clone, Debug)]
pub enum Node {
    Object(ObjectNode),
    Method(MethodNode),
}

impl Node {
    pub fn header(&self) -> String {
        match self {
            Node::Object(node) => node.header(),
            Node::Method(node) => node.header(),
        }
    }

    pub fn name(&self) -> Option<String> {
        match self {
            Node::Object(node) => node.name(),
            Node::Method(node) => node.name(),
        }
    }

    pub fn description(&self) -> String {
        match self {
            Node::Object(node) => node.description(),
            Node::Method(node) => node.description(),
        }
    }

    pub fn is_enabled(&self) -> bool {
        match self {
            Node::Object(node) => node.is_enabled(),
            Node::Method(node) => node.is_enabled(),
        }
    }

    pub fn parent(&self) -> Option<ObjectNode> {
        match self {
            Node::Object(node) => node.parent(),
            Node::Method(node) => node.owner(),
        }
    }

    /// Re-execute the chain of navigations started at this node.
    pub fn instantiate_successor(&self) -> EngineResult<Node> {
        match self {
            Node::Object(node) => node.instantiate_successor().map(Node::Object),
            Node::Method(node) => node.instantiate_successor().map(Node::Object),
        }
    }

    pub fn as_object(&self) -> Option<&ObjectNode> {
        match self {
            Node::Object(node) => Some(node),
            Node::Method(_) => None,
        }
    }

    pub fn as_method(&self) -> Option<&MethodNode> {
        match self {
            Node::Method(node) => Some(node),
            Node::Object(_) => None,
        }
    }

    pub fn as_collection(&self) -> Option<CollectionNode> {
        self.as_object().and_then(ObjectNode::as_collection)
    }

    /// Same node, not merely an equal value.
    pub fn ptr_eq(&self, other: &Node) -> bool {
        match (self, other) {
            (Node::Object(a), Node::Object(b)) => a.ptr_eq(b),
            (Node::Method(a), Node::Method(b)) => a.ptr_eq(b),
            _ => false,
        }
    }
}

impl From<ObjectNode> for Node {
    fn from(node: ObjectNode) -> Self {
        Node::Object(node)
    }
}

impl From<CollectionNode> for Node {
    fn from(node: CollectionNode) -> Self {
        Node::Object(node.into_object())
    }
}

impl From<MethodNode> for Node {
    fn from(node: MethodNode) -> Self {
        Node::Method(node)
    }
}

/// Node kinds that can be picked out of a root list.
pub trait RootKind: Sized {
    fn from_node(node: &Node) -> Option<Self>;
}

impl RootKind for Node {
    fn from_node(node: &Node) -> Option<Self> {
        Some(node.clone())
    }
}

impl RootKind for ObjectNode {
    fn from_node(node: &Node) -> Option<Self> {
        node.as_object().cloned()
    }
}

impl RootKind for CollectionNode {
    fn from_node(node: &Node) -> Option<Self> {
        node.as_collection()
    }
}

impl RootKind for MethodNode {
    fn from_node(node: &Node) -> Option<Self> {
        node.as_method().cloned()
    }
}
