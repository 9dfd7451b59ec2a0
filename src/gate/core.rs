//!
//! The authority gate: mounts a view region's content while the current
//! identity satisfies the required authorities, and unmounts it otherwise.
//!
//! The gate subscribes to the identity signal and reconciles synchronously on
//! every write, so an identity change and the matching mount/unmount happen in
//! the same turn. Reconciliation is serialized per gate: a trigger that arrives
//! while a transition is still running (content that logs the user out while
//! being mounted, say) is queued and applied once that transition finishes.

use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::{Rc, Weak};

use uuid::Uuid;

use crate::gate::region::{ContentTemplate, ViewRegion};
use crate::identity::{IdentityReader, Subscription};
use crate::rights;
use crate::types::AuthorityExpression;

struct GateView {
    region: ViewRegion,
    template: Box<dyn ContentTemplate>,
}

struct GateInner {
    identity: IdentityReader,
    required: RefCell<AuthorityExpression>,
    view: RefCell<GateView>,
    subscription: RefCell<Option<Subscription>>,
    reconciling: Cell<bool>,
    pending: Cell<bool>,
    destroyed: Cell<bool>,
}

impl GateInner {
    fn evaluate(&self) -> bool {
        let state = self.identity.current();
        let required = self.required.borrow();
        rights::permits(&state, &required)
    }

    fn reconcile(&self) {
        if self.destroyed.get() {
            return;
        }
        if self.reconciling.get() {
            self.pending.set(true);
            return;
        }
        self.reconciling.set(true);
        loop {
            self.pending.set(false);
            if self.destroyed.get() {
                break;
            }
            self.apply();
            if !self.pending.get() {
                break;
            }
        }
        self.reconciling.set(false);
        if self.destroyed.get() {
            self.view.borrow_mut().region.unmount();
        }
    }

    fn destroy(&self) {
        if self.destroyed.replace(true) {
            return;
        }
        self.subscription.borrow_mut().take();
        if !self.reconciling.get() {
            self.view.borrow_mut().region.unmount();
        }
        tracing::debug!("gate destroyed");
    }

    fn apply(&self) {
        let permitted = self.evaluate();
        let mut view = self.view.borrow_mut();
        let GateView { region, template } = &mut *view;
        let changed = if permitted { region.mount(&**template) } else { region.unmount() };
        if changed {
            tracing::debug!(
                region = %region.name(),
                mounted = permitted,
                transitions = region.transitions(),
                "gate reconciled"
            );
        }
    }
}

/// Conditionally mounts a region's content based on the current identity.
///
/// Dropping the gate destroys it.
pub struct AuthorityGate {
    inner: Rc<GateInner>,
}

impl AuthorityGate {
    /// Attaches a gate to `region` and reconciles immediately.
    pub fn attach<T>(
        identity: &IdentityReader,
        required: impl Into<AuthorityExpression>,
        region: ViewRegion,
        template: T,
    ) -> Self
    where
        T: ContentTemplate + 'static,
    {
        let inner = Rc::new(GateInner {
            identity: identity.clone(),
            required: RefCell::new(required.into()),
            view: RefCell::new(GateView { region, template: Box::new(template) }),
            subscription: RefCell::new(None),
            reconciling: Cell::new(false),
            pending: Cell::new(false),
            destroyed: Cell::new(false),
        });

        let weak: Weak<GateInner> = Rc::downgrade(&inner);
        let subscription = identity.subscribe(move |_| {
            if let Some(gate) = weak.upgrade() {
                gate.reconcile();
            }
        });
        *inner.subscription.borrow_mut() = Some(subscription);

        inner.reconcile();
        AuthorityGate { inner }
    }

    /// Whether the current identity satisfies the required authorities.
    pub fn evaluate(&self) -> bool {
        self.inner.evaluate()
    }

    /// Brings the region in line with `evaluate()`. Redundant calls are no-ops.
    pub fn reconcile(&self) {
        self.inner.reconcile();
    }

    /// Re-supplies the required authorities and reconciles.
    pub fn set_required(&self, required: impl Into<AuthorityExpression>) {
        *self.inner.required.borrow_mut() = required.into();
        self.inner.reconcile();
    }

    pub fn required(&self) -> AuthorityExpression {
        self.inner.required.borrow().clone()
    }

    pub fn is_mounted(&self) -> bool {
        self.inner.view.borrow().region.is_mounted()
    }

    pub fn mounted_id(&self) -> Option<Uuid> {
        self.inner.view.borrow().region.mounted_id()
    }

    pub fn transitions(&self) -> u64 {
        self.inner.view.borrow().region.transitions()
    }

    pub fn is_destroyed(&self) -> bool {
        self.inner.destroyed.get()
    }

    /// Unmounts the content and stops observing the identity. Any
    /// reconciliation still queued becomes a no-op.
    pub fn destroy(&self) {
        self.inner.destroy();
    }

    /// Weak handle the guarded content can use to reach its own gate.
    pub fn handle(&self) -> GateHandle {
        GateHandle { inner: Rc::downgrade(&self.inner) }
    }
}

impl Drop for AuthorityGate {
    fn drop(&mut self) {
        self.destroy();
    }
}

/// Non-owning handle on a gate. Every call is a no-op once the gate is gone.
#[derive(Clone)]
pub struct GateHandle {
    inner: Weak<GateInner>,
}

impl GateHandle {
    pub fn reconcile(&self) {
        if let Some(gate) = self.inner.upgrade() {
            gate.reconcile();
        }
    }

    pub fn destroy(&self) {
        if let Some(gate) = self.inner.upgrade() {
            gate.destroy();
        }
    }

    pub fn is_alive(&self) -> bool {
        self.inner.upgrade().is_some_and(|gate| !gate.destroyed.get())
    }
}

impl fmt::Debug for GateHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GateHandle").field("alive", &self.is_alive()).finish()
    }
}

impl fmt::Debug for AuthorityGate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let view = self.inner.view.borrow();
        f.debug_struct("AuthorityGate")
            .field("required", &self.inner.required.borrow())
            .field("region", &view.region)
            .field("destroyed", &self.inner.destroyed.get())
            .finish()
    }
}
