//! View regions and the content mounted into them.
//!
//! A `ViewRegion` is an anchor that owns zero or one `MountedView`. Content is
//! produced by a `ContentTemplate`, which receives a fresh `ViewScope` to hang
//! its listeners and child subscriptions on. Unmounting releases the scope, so
//! nothing the content registered outlives it.

use std::fmt;

use uuid::Uuid;

use crate::identity::Subscription;

/// A live piece of mounted content.
pub trait ViewInstance {
    /// Called once, right before the instance's scope is released.
    fn on_destroy(&mut self) {}
}

impl ViewInstance for () {}

impl ViewInstance for Box<dyn ViewInstance> {
    fn on_destroy(&mut self) {
        (**self).on_destroy();
    }
}

/// Factory for the guarded content.
pub trait ContentTemplate {
    fn instantiate(&self, scope: &mut ViewScope) -> Box<dyn ViewInstance>;
}

impl<F, V> ContentTemplate for F
where
    F: Fn(&mut ViewScope) -> V,
    V: ViewInstance + 'static,
{
    fn instantiate(&self, scope: &mut ViewScope) -> Box<dyn ViewInstance> {
        Box::new(self(scope))
    }
}

/// Template that mounts nothing but an empty marker instance.
#[derive(Default, Debug, Clone, Copy)]
pub struct EmptyTemplate;

impl ContentTemplate for EmptyTemplate {
    fn instantiate(&self, _scope: &mut ViewScope) -> Box<dyn ViewInstance> {
        Box::new(())
    }
}

/// Resources owned by one mounted instance.
#[derive(Default)]
pub struct ViewScope {
    subscriptions: Vec<Subscription>,
    cleanups: Vec<Box<dyn FnOnce()>>,
}

impl ViewScope {
    /// Keeps `subscription` alive for as long as the instance is mounted.
    pub fn hold(&mut self, subscription: Subscription) {
        self.subscriptions.push(subscription);
    }

    /// Runs `cleanup` when the instance is unmounted.
    pub fn on_release<F: FnOnce() + 'static>(&mut self, cleanup: F) {
        self.cleanups.push(Box::new(cleanup));
    }

    pub fn resource_count(&self) -> usize {
        self.subscriptions.len() + self.cleanups.len()
    }

    fn release(&mut self) {
        while let Some(sub) = self.subscriptions.pop() {
            drop(sub);
        }
        while let Some(cleanup) = self.cleanups.pop() {
            cleanup();
        }
    }
}

impl fmt::Debug for ViewScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ViewScope")
            .field("subscriptions", &self.subscriptions.len())
            .field("cleanups", &self.cleanups.len())
            .finish()
    }
}

/// One mounted instance of the guarded content.
pub struct MountedView {
    id: Uuid,
    instance: Box<dyn ViewInstance>,
    scope: ViewScope,
}

impl MountedView {
    pub fn id(&self) -> Uuid {
        self.id
    }

    fn destroy(mut self) {
        self.instance.on_destroy();
        self.scope.release();
    }
}

impl fmt::Debug for MountedView {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MountedView").field("id", &self.id).field("scope", &self.scope).finish()
    }
}

/// Anchor where guarded content is inserted.
#[derive(Debug)]
pub struct ViewRegion {
    name: String,
    mounted: Option<MountedView>,
    transitions: u64,
}

impl ViewRegion {
    pub fn new(name: impl Into<String>) -> Self {
        ViewRegion { name: name.into(), mounted: None, transitions: 0 }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn is_mounted(&self) -> bool {
        self.mounted.is_some()
    }

    pub fn mounted_id(&self) -> Option<Uuid> {
        self.mounted.as_ref().map(MountedView::id)
    }

    /// Number of mount and unmount transitions so far.
    pub fn transitions(&self) -> u64 {
        self.transitions
    }

    /// Mounts a new instance from `template`. Returns `false` without touching
    /// the existing instance when one is already mounted.
    pub fn mount(&mut self, template: &dyn ContentTemplate) -> bool {
        if self.mounted.is_some() {
            return false;
        }
        let mut scope = ViewScope::default();
        let instance = template.instantiate(&mut scope);
        let view = MountedView { id: Uuid::new_v4(), instance, scope };
        tracing::debug!(region = %self.name, view = %view.id, "mounted view");
        self.mounted = Some(view);
        self.transitions += 1;
        true
    }

    /// Destroys the mounted instance, if any. Returns whether one was removed.
    pub fn unmount(&mut self) -> bool {
        let Some(view) = self.mounted.take() else {
            return false;
        };
        tracing::debug!(region = %self.name, view = %view.id, "unmounting view");
        view.destroy();
        self.transitions += 1;
        true
    }
}

impl Drop for ViewRegion {
    fn drop(&mut self) {
        if let Some(view) = self.mounted.take() {
            view.destroy();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::identity::IdentitySignal;
    use std::cell::{Cell, RefCell};
    use std::rc::Rc;

    struct Flagged(Rc<Cell<bool>>);

    impl ViewInstance for Flagged {
        fn on_destroy(&mut self) {
            self.0.set(true);
        }
    }

    #[test]
    fn test_mount_is_idempotent() {
        let mut region = ViewRegion::new("admin-menu");
        assert!(region.mount(&EmptyTemplate));
        let first = region.mounted_id();
        assert!(!region.mount(&EmptyTemplate));
        assert_eq!(region.mounted_id(), first);
        assert_eq!(region.transitions(), 1);
    }

    #[test]
    fn test_unmount_while_absent_is_noop() {
        let mut region = ViewRegion::new("r");
        assert!(!region.unmount());
        assert_eq!(region.transitions(), 0);
    }

    #[test]
    fn test_unmount_releases_scope_and_destroys_instance() {
        let destroyed = Rc::new(Cell::new(false));
        let released = Rc::new(Cell::new(false));
        let (d, r) = (destroyed.clone(), released.clone());
        let template = move |scope: &mut ViewScope| {
            let r = r.clone();
            scope.on_release(move || r.set(true));
            Flagged(d.clone())
        };

        let mut region = ViewRegion::new("r");
        region.mount(&template);
        assert!(!destroyed.get());
        assert!(region.unmount());
        assert!(destroyed.get());
        assert!(released.get());
        assert!(!region.is_mounted());
    }

    #[test]
    fn test_dropping_region_releases_content() {
        let released = Rc::new(Cell::new(false));
        let r = released.clone();
        let template = move |scope: &mut ViewScope| {
            let r = r.clone();
            scope.on_release(move || r.set(true));
        };
        {
            let mut region = ViewRegion::new("r");
            region.mount(&template);
        }
        assert!(released.get());
    }

    #[test]
    fn test_release_drops_subscriptions_then_runs_cleanups_in_reverse() {
        let signal = IdentitySignal::new();
        let reader = signal.reader();
        let log: Rc<RefCell<Vec<String>>> = Rc::default();
        let (template_reader, template_log) = (reader.clone(), log.clone());
        let template = move |scope: &mut ViewScope| {
            scope.hold(template_reader.subscribe(|_| {}));
            scope.hold(template_reader.subscribe(|_| {}));
            for name in ["first", "second"] {
                let (reader, log) = (template_reader.clone(), template_log.clone());
                scope.on_release(move || {
                    log.borrow_mut().push(format!("{name}:{}", reader.observer_count()));
                });
            }
        };

        let mut region = ViewRegion::new("r");
        region.mount(&template);
        assert_eq!(reader.observer_count(), 2);
        region.unmount();
        assert_eq!(*log.borrow(), ["second:0", "first:0"]);
    }
}
