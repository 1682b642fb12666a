//! Vista - lazy projection of a domain object graph into a navigable,
//! editable tree.
//!
//! Domain types are registered once through a small DSL; the [`Registry`]
//! then exposes their static members as root nodes, and every node
//! materializes its own children, elements and operations only when asked.
//!
//! ```text
//! let registry = Registry::new();
//! let counter = registry.register(
//!     TypeBuilder::<Counter>::object("Counter")
//!         .property(Property::new("Value", Ty::Int, |c: &Counter| c.get().into())
//!             .visible(Descriptor::new("Value")))
//!         .method(Method::new("Increment", |c: &Counter, _| { c.increment(); Ok(Value::Void) })
//!             .visible(Descriptor::new("Increment"))),
//! )?;
//! let root = registry.add_value("counter", Value::shared(Counter::new()));
//! root.operation("Increment")?.unwrap().invoke()?;
//! assert_eq!(root.child("Value")?.unwrap().value()?, Value::Int(1));
//! ```
//!
//! # Crates
//!
//! | crate | role |
//! |-------|------|
//! | `vista_types` | type classifier, error taxonomy |
//! | `vista_value` | runtime values, observable collections, change notification |
//! | `vista_meta` | registration DSL, visibility resolver |
//! | `vista_tree` | object, collection and method nodes, registry |
//! | `vista_query` | filter, select, sort, for-each |

mod logging;

pub use logging::init_tracing;

pub use vista_meta::{
    Catalog, Descriptor, InstanceTable, MetadataProvider, Method, MethodDef, ParamDef,
    PreviewFormatter, Property, PropertyDef, Provider, Receiver, Resolved, Static, Subject, Tier,
    TypeBuilder, VisibilityResolver,
};
pub use vista_query::{filter, for_each, select, sort, CollectionQuery, Expr, Operand, SortOrder};
pub use vista_tree::{
    CollectionAction, CollectionEvent, CollectionNode, Context, EngineConfig, MethodNode, Node,
    NodeFlags, ObjectNode, Registry, RegistryBuilder, RootKind, SourceKind, Warning, WarningBuffer,
    WarningSink,
};
pub use vista_types::{classify, errors, EngineError, EngineResult, Ty, TypeClass, TypeIdx};
pub use vista_value::{
    ChangeNotifier, ChangeRejected, CollectionChange, DomainObject, FromValue, IdentityKey,
    ListRef, MapRef, ObjectRef, PairRef, PropertyChanged, Subscription, Value, VisibleInfo,
};

/// Everything needed to register types and walk a tree.
pub mod prelude {
    pub use crate::{
        CollectionNode, CollectionQuery, Descriptor, DomainObject, EngineError, EngineResult,
        Expr, Method, MethodNode, Node, ObjectNode, Operand, Property, Registry, SortOrder, Static,
        Ty, TypeBuilder, Value,
    };
}
