//! Visibility resolution.
//!
//! Metadata comes from an ordered list of providers. The first provider that
//! returns an *enabled* descriptor wins; a disabled hit falls through to the
//! next provider. If nobody enables the member it is not exposed.
//!
//! Default order, most specific first:
//!
//! 1. [`Tier::Instance`]: the identity-keyed side table, for values created
//!    at runtime that cannot carry declarations
//! 2. [`Tier::Interface`]: [`DomainObject::visible`](vista_value::DomainObject::visible)
//! 3. [`Tier::Declaration`]: the descriptor attached at registration

use std::fmt;

use rustc_hash::FxHashMap;
use vista_types::errors::{not_a_reference_value, EngineResult};
use vista_value::{IdentityKey, Value, WeakValue};

use crate::Descriptor;

/// What is being resolved: a member's declaration and, once loaded, its value.
#[derive(Clone, Copy, Debug, Default)]
pub struct Subject<'a> {
    pub value: Option<&'a Value>,
    pub declared: Option<&'a Descriptor>,
}

/// Which provider produced a descriptor.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Tier {
    Instance,
    Interface,
    Declaration,
    Custom,
}

/// A user-supplied metadata source.
pub trait MetadataProvider {
    fn lookup(&self, subject: &Subject<'_>) -> Option<Descriptor>;
}

/// One entry in the resolution order.
pub enum Provider {
    Instance,
    Interface,
    Declaration,
    Custom(Box<dyn MetadataProvider>),
}

impl Provider {
    fn tier(&self) -> Tier {
        match self {
            Provider::Instance => Tier::Instance,
            Provider::Interface => Tier::Interface,
            Provider::Declaration => Tier::Declaration,
            Provider::Custom(_) => Tier::Custom,
        }
    }
}

impl fmt::Debug for Provider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self.tier())
    }
}

/// Resolution result for an exposed member.
#[derive(Clone, Debug)]
pub struct Resolved {
    pub descriptor: Descriptor,
    pub tier: Tier,
}

/// Identity-keyed side table of descriptors.
///
/// Entries hold their target weakly; a dead entry is ignored and pruned on
/// the next insert, so an address reused by a new allocation never inherits
/// a stale descriptor.
#[derive(Default)]
pub struct InstanceTable {
    entries: FxHashMap<IdentityKey, (WeakValue, Descriptor)>,
}

impl InstanceTable {
    pub fn attach(&mut self, target: &Value, descriptor: Descriptor) -> EngineResult<()> {
        let (Some(key), Some(weak)) = (target.identity(), target.downgrade()) else {
            return Err(not_a_reference_value(target.kind_name()));
        };
        self.entries.retain(|_, (weak, _)| weak.is_alive());
        self.entries.insert(key, (weak, descriptor));
        Ok(())
    }

    pub fn detach(&mut self, target: &Value) -> Option<Descriptor> {
        let key = target.identity()?;
        self.entries.remove(&key).map(|(_, d)| d)
    }

    pub fn get(&self, target: &Value) -> Option<&Descriptor> {
        let key = target.identity()?;
        match self.entries.get(&key) {
            Some((weak, descriptor)) if weak.is_alive() => Some(descriptor),
            _ => None,
        }
    }

    /// Number of live entries.
    pub fn len(&self) -> usize {
        self.entries.values().filter(|(w, _)| w.is_alive()).count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Ordered metadata providers plus the side table they may consult.
pub struct VisibilityResolver {
    order: Vec<Provider>,
    instances: InstanceTable,
}

impl VisibilityResolver {
    pub fn new() -> Self {
        Self::with_order(vec![
            Provider::Instance,
            Provider::Interface,
            Provider::Declaration,
        ])
    }

    pub fn with_order(order: Vec<Provider>) -> Self {
        VisibilityResolver {
            order,
            instances: InstanceTable::default(),
        }
    }

    pub fn instances(&self) -> &InstanceTable {
        &self.instances
    }

    pub fn instances_mut(&mut self) -> &mut InstanceTable {
        &mut self.instances
    }

    /// First enabled descriptor in provider order, or `None` if hidden.
    pub fn resolve(&self, subject: &Subject<'_>) -> Option<Resolved> {
        for provider in &self.order {
            let found = match provider {
                Provider::Instance => subject
                    .value
                    .and_then(|v| self.instances.get(v))
                    .cloned(),
                Provider::Interface => subject
                    .value
                    .and_then(Value::as_object)
                    .and_then(|o| o.get().visible())
                    .map(Descriptor::from),
                Provider::Declaration => subject.declared.cloned(),
                Provider::Custom(custom) => custom.lookup(subject),
            };
            match found {
                Some(descriptor) if descriptor.enabled => {
                    tracing::trace!(tier = ?provider.tier(), header = %descriptor.header, "resolved");
                    return Some(Resolved {
                        descriptor,
                        tier: provider.tier(),
                    });
                }
                Some(_) => {
                    tracing::trace!(tier = ?provider.tier(), "disabled descriptor skipped");
                }
                None => {}
            }
        }
        None
    }
}

impl Default for VisibilityResolver {
    fn default() -> Self {
        Self::new()
    }
}
