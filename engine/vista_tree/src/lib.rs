//! Vista Tree - lazy node tree over a domain object graph.
//!
//! # Architecture
//!
//! - [`Registry`]: registered types, root nodes, warning channel
//! - [`ObjectNode`] / [`CollectionNode`] / [`MethodNode`]: the tree
//! - [`Context`]: catalog, visibility resolver and identity cache shared by
//!   every node of one registry
//!
//! ```text
//! Registry ──roots──▶ ObjectNode ──children──▶ ObjectNode ...
//!                        │  └──operations──▶ MethodNode ──return──▶ ObjectNode
//!                        └──elements (collections)──▶ ObjectNode ...
//! ```
//!
//! Nodes are created on demand. Reading a node's value, its children or its
//! elements materializes exactly that level and no further.
//!
//! # Failure modes
//!
//! Hard failures (bad types, read-only writes, missing arguments) come back
//! as [`EngineError`](vista_types::EngineError). Soft ones (a removal the
//! tree cannot match, enabling a read-only node) are published as
//! [`Warning`]s and the operation continues.

mod config;
mod context;
mod node;
mod registry;
mod warning;

#[cfg(test)]
mod test_helpers;

pub use config::EngineConfig;
pub use context::Context;
pub use node::{
    CollectionAction, CollectionEvent, CollectionNode, MethodNode, Node, NodeFlags, ObjectNode,
    RootKind, SourceKind,
};
pub use registry::{Registry, RegistryBuilder};
pub use warning::{Warning, WarningBuffer, WarningSink};
