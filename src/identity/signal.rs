//! Reactive identity value.
//!
//! `IdentitySignal` is the writable side owned by the authentication
//! subsystem. Everyone else gets an `IdentityReader`. Writes notify observers
//! synchronously, in subscription order, before the write returns. Observers
//! may write the signal again; the nested write finishes its own notification
//! round first.

use std::cell::RefCell;
use std::collections::BTreeMap;
use std::fmt;
use std::rc::{Rc, Weak};

use crate::error::IdentityFetchError;
use crate::rights;
use crate::types::{AuthorityExpression, Identity, IdentityState};

type Observer = Rc<dyn Fn(&IdentityState)>;

#[derive(Default)]
struct SignalInner {
    state: IdentityState,
    version: u64,
    next_observer: u64,
    observers: BTreeMap<u64, Observer>,
}

/// Writable identity signal. Cloning shares the same underlying value.
#[derive(Clone, Default)]
pub struct IdentitySignal {
    inner: Rc<RefCell<SignalInner>>,
}

impl IdentitySignal {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_state(state: IdentityState) -> Self {
        let signal = Self::default();
        signal.inner.borrow_mut().state = state;
        signal
    }

    /// Read-only view for gates, routers and views.
    pub fn reader(&self) -> IdentityReader {
        IdentityReader { inner: self.inner.clone() }
    }

    pub fn authenticate(&self, identity: Identity) {
        tracing::debug!(login = %identity.login, "identity authenticated");
        self.set(IdentityState::Present(identity));
    }

    pub fn logout(&self) {
        tracing::debug!("identity cleared");
        self.set(IdentityState::Absent);
    }

    pub fn fail(&self, reason: impl Into<String>) {
        let err = IdentityFetchError(reason.into());
        tracing::warn!(error = %err, "identity fetch failed");
        self.set(IdentityState::Failed(err));
    }

    /// Replaces the state and notifies every observer.
    ///
    /// Observers are notified even when the new state equals the old one: a
    /// token refresh replaces the identity and downstream values must be
    /// recomputed rather than served from a cache.
    pub fn set(&self, state: IdentityState) {
        let ids: Vec<u64> = {
            let mut inner = self.inner.borrow_mut();
            inner.state = state;
            inner.version += 1;
            inner.observers.keys().copied().collect()
        };
        // Each observer reads the latest state, so a nested write made by an
        // earlier observer is what later observers see. An observer dropped by
        // an earlier one in this round is skipped.
        for id in ids {
            let next = {
                let inner = self.inner.borrow();
                inner.observers.get(&id).map(|observer| (observer.clone(), inner.state.clone()))
            };
            if let Some((observer, snapshot)) = next {
                observer(&snapshot);
            }
        }
    }

    pub fn version(&self) -> u64 {
        self.inner.borrow().version
    }
}

impl fmt::Debug for IdentitySignal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let inner = self.inner.borrow();
        f.debug_struct("IdentitySignal")
            .field("state", &inner.state)
            .field("version", &inner.version)
            .field("observers", &inner.observers.len())
            .finish()
    }
}

/// Read-only handle on the identity signal.
#[derive(Clone)]
pub struct IdentityReader {
    inner: Rc<RefCell<SignalInner>>,
}

impl IdentityReader {
    pub fn current(&self) -> IdentityState {
        self.inner.borrow().state.clone()
    }

    pub fn is_authenticated(&self) -> bool {
        self.inner.borrow().state.identity().is_some()
    }

    /// Same outcome as `rights::permits` over the current state.
    pub fn has_any_authority(&self, required: &AuthorityExpression) -> bool {
        let inner = self.inner.borrow();
        rights::permits(&inner.state, required)
    }

    pub fn version(&self) -> u64 {
        self.inner.borrow().version
    }

    /// Registers `observer` to run after every write. The observer stays
    /// registered until the returned `Subscription` is dropped.
    pub fn subscribe<F>(&self, observer: F) -> Subscription
    where
        F: Fn(&IdentityState) + 'static,
    {
        let mut inner = self.inner.borrow_mut();
        let id = inner.next_observer;
        inner.next_observer += 1;
        inner.observers.insert(id, Rc::new(observer));
        Subscription { id, signal: Rc::downgrade(&self.inner) }
    }

    pub fn observer_count(&self) -> usize {
        self.inner.borrow().observers.len()
    }
}

impl fmt::Debug for IdentityReader {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("IdentityReader").field("state", &self.inner.borrow().state).finish()
    }
}

/// Observer registration. Dropping it unsubscribes.
#[must_use = "dropping a Subscription unsubscribes immediately"]
pub struct Subscription {
    id: u64,
    signal: Weak<RefCell<SignalInner>>,
}

impl Subscription {
    pub fn cancel(self) {}
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if let Some(inner) = self.signal.upgrade() {
            if let Ok(mut inner) = inner.try_borrow_mut() {
                inner.observers.remove(&self.id);
            } else {
                tracing::error!(observer = self.id, "subscription dropped while signal borrowed");
            }
        }
    }
}

impl fmt::Debug for Subscription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscription").field("id", &self.id).finish()
    }
}
