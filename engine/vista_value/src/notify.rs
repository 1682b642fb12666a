//! Synchronous observer lists.
//!
//! A [`ChangeNotifier`] owns its subscriber list. Subscribing hands back a
//! [`Subscription`] guard; dropping the guard unsubscribes. Emission snapshots
//! the list first, so callbacks may subscribe, unsubscribe or emit again
//! without tripping a `RefCell` borrow.

use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::{Rc, Weak};

/// A subscriber refused a change.
///
/// Collections surface this to the domain code that attempted the mutation
/// after rolling the mutation back.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
#[error("change rejected: {reason}")]
pub struct ChangeRejected {
    pub reason: String,
}

impl ChangeRejected {
    #[cold]
    pub fn new(reason: impl Into<String>) -> Self {
        ChangeRejected {
            reason: reason.into(),
        }
    }
}

type Callback<E> = Rc<dyn Fn(&E) -> Result<(), ChangeRejected>>;
type Delivered<E> = Vec<(Rc<Cell<bool>>, Callback<E>)>;

struct Entry<E> {
    id: u64,
    live: Rc<Cell<bool>>,
    callback: Callback<E>,
}

struct Subscribers<E> {
    next_id: Cell<u64>,
    entries: RefCell<Vec<Entry<E>>>,
}

/// List of callbacks interested in events of type `E`.
pub struct ChangeNotifier<E: 'static> {
    inner: Rc<Subscribers<E>>,
}

impl<E: 'static> ChangeNotifier<E> {
    pub fn new() -> Self {
        ChangeNotifier {
            inner: Rc::new(Subscribers {
                next_id: Cell::new(0),
                entries: RefCell::new(Vec::new()),
            }),
        }
    }

    /// Subscribe a callback that always accepts.
    pub fn subscribe(&self, callback: impl Fn(&E) + 'static) -> Subscription {
        self.subscribe_checked(move |event| {
            callback(event);
            Ok(())
        })
    }

    /// Subscribe a callback that may refuse the event.
    pub fn subscribe_checked(
        &self,
        callback: impl Fn(&E) -> Result<(), ChangeRejected> + 'static,
    ) -> Subscription {
        let id = self.inner.next_id.get();
        self.inner.next_id.set(id.wrapping_add(1));
        let live = Rc::new(Cell::new(true));
        self.inner.entries.borrow_mut().push(Entry {
            id,
            live: Rc::clone(&live),
            callback: Rc::new(callback),
        });

        let list: Weak<Subscribers<E>> = Rc::downgrade(&self.inner);
        Subscription::new(move || {
            live.set(false);
            if let Some(list) = list.upgrade() {
                list.entries.borrow_mut().retain(|entry| entry.id != id);
            }
        })
    }

    /// Deliver `event` to every live subscriber, in subscription order.
    ///
    /// All subscribers run even if one refuses; the first refusal is returned.
    pub fn emit(&self, event: &E) -> Result<(), ChangeRejected> {
        self.dispatch(event).map_err(|(rejected, _)| rejected)
    }

    /// Deliver `event`; if any subscriber refuses, run `rollback` and deliver
    /// the event it returns to the subscribers that had accepted `event`.
    ///
    /// The reverting event cannot be refused.
    pub fn emit_with_rollback(
        &self,
        event: &E,
        rollback: impl FnOnce() -> E,
    ) -> Result<(), ChangeRejected> {
        let (rejected, accepted) = match self.dispatch(event) {
            Ok(()) => return Ok(()),
            Err(refusal) => refusal,
        };
        let revert = rollback();
        for (live, callback) in accepted {
            if live.get() {
                let _ = callback(&revert);
            }
        }
        Err(rejected)
    }

    fn dispatch(&self, event: &E) -> Result<(), (ChangeRejected, Delivered<E>)> {
        let snapshot: Delivered<E> = self
            .inner
            .entries
            .borrow()
            .iter()
            .map(|entry| (Rc::clone(&entry.live), Rc::clone(&entry.callback)))
            .collect();

        let mut accepted = Vec::with_capacity(snapshot.len());
        let mut refusal = None;
        for (live, callback) in snapshot {
            // Unsubscribed by an earlier callback in this same dispatch.
            if !live.get() {
                continue;
            }
            match callback(event) {
                Ok(()) => accepted.push((live, callback)),
                Err(rejected) => {
                    refusal.get_or_insert(rejected);
                }
            }
        }
        match refusal {
            None => Ok(()),
            Some(rejected) => Err((rejected, accepted)),
        }
    }

    pub fn subscriber_count(&self) -> usize {
        self.inner.entries.borrow().len()
    }
}

impl<E: 'static> Default for ChangeNotifier<E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E: 'static> fmt::Debug for ChangeNotifier<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ChangeNotifier({} subscribers)", self.subscriber_count())
    }
}

/// Guard for one subscription. Unsubscribes on drop.
#[must_use = "dropping a Subscription unsubscribes immediately"]
pub struct Subscription {
    cancel: Option<Box<dyn FnOnce()>>,
}

impl Subscription {
    pub fn new(cancel: impl FnOnce() + 'static) -> Self {
        Subscription {
            cancel: Some(Box::new(cancel)),
        }
    }

    /// A guard that is not attached to anything.
    pub fn empty() -> Self {
        Subscription { cancel: None }
    }

    /// Unsubscribe now.
    pub fn cancel(mut self) {
        self.run_cancel();
    }

    fn run_cancel(&mut self) {
        if let Some(cancel) = self.cancel.take() {
            cancel();
        }
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.run_cancel();
    }
}

impl fmt::Debug for Subscription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscription")
            .field("active", &self.cancel.is_some())
            .finish()
    }
}
