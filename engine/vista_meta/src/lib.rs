//! Vista Meta - what the tree may show of a domain type.
//!
//! Rust has no runtime reflection, so every projected type is described once,
//! up front, through a small registration DSL:
//!
//! ```text
//! TypeBuilder::<Counter>::object("Counter")
//!     .property(Property::new("Value", Ty::Int, |c: &Counter| c.value().into())
//!         .set(|c, v| c.set(v))
//!         .visible(Descriptor::new("Value")))
//!     .method(Method::new("Increment", |c: &Counter, _| c.increment())
//!         .visible(Descriptor::new("Increment")))
//! ```
//!
//! The resulting [`Catalog`] owns the type table and per-type member lists.
//! Whether and how a member is shown is decided by the
//! [`VisibilityResolver`], which consults an ordered list of metadata
//! providers: the per-instance side table, the object's own
//! [`DomainObject::visible`](vista_value::DomainObject::visible), then the
//! member's static declaration.

mod catalog;
mod descriptor;
mod member;
mod resolver;

pub use catalog::{Catalog, TypeBuilder};
pub use descriptor::{Descriptor, PreviewFormatter};
pub use member::{Method, MethodDef, ParamDef, Property, PropertyDef, Receiver, Static};
pub use resolver::{
    InstanceTable, MetadataProvider, Provider, Resolved, Subject, Tier, VisibilityResolver,
};
