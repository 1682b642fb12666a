//! Vista Value - runtime values of a projected domain graph.
//!
//! # Architecture
//!
//! - [`Value`]: every slot value, primitives inline, references shared
//! - [`ObjectRef`]: handle to a user domain object implementing [`DomainObject`]
//! - [`ListRef`] / [`MapRef`] / [`PairRef`]: engine-provided collections,
//!   either observable or plain
//! - [`ChangeNotifier`] / [`Subscription`]: the observer primitive used by
//!   domain objects, collections and the tree itself
//!
//! Reference values have identity ([`IdentityKey`]); two handles to the same
//! allocation are the same value even if the domain would call them unequal.
//!
//! # Threading
//!
//! Everything here is `Rc`-based and therefore `!Send`. A graph and every
//! tree projected from it stay on the thread that built them.

mod collection;
mod notify;
mod object;
mod value;

pub use collection::{CollectionChange, ListRef, MapRef, PairRef};
pub use notify::{ChangeNotifier, ChangeRejected, Subscription};
pub use object::{DomainObject, IdentityKey, ObjectRef, PropertyChanged, VisibleInfo, WeakValue};
pub use value::{EnumValue, FromValue, Value};
