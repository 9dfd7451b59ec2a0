//! Instrumented templates and loaders for tests and benches.

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use futures::channel::oneshot;
use futures::future::{FutureExt, LocalBoxFuture};

use crate::error::LoadFailure;
use crate::gate::{ContentTemplate, ViewInstance, ViewScope};
use crate::routing::{FeatureModule, ModuleLoader};

#[derive(Debug, Default)]
struct Counters {
    live: Cell<usize>,
    peak: Cell<usize>,
    created: Cell<usize>,
    destroyed: Cell<usize>,
}

/// Template whose instances report how many of them are alive at once.
#[derive(Debug, Clone, Default)]
pub struct RecordingTemplate {
    counters: Rc<Counters>,
}

impl RecordingTemplate {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn live(&self) -> usize {
        self.counters.live.get()
    }

    /// Highest number of simultaneously live instances ever observed.
    pub fn peak(&self) -> usize {
        self.counters.peak.get()
    }

    pub fn created(&self) -> usize {
        self.counters.created.get()
    }

    pub fn destroyed(&self) -> usize {
        self.counters.destroyed.get()
    }
}

struct RecordedInstance {
    counters: Rc<Counters>,
}

impl ViewInstance for RecordedInstance {
    fn on_destroy(&mut self) {
        self.counters.live.set(self.counters.live.get() - 1);
        self.counters.destroyed.set(self.counters.destroyed.get() + 1);
    }
}

impl ContentTemplate for RecordingTemplate {
    fn instantiate(&self, _scope: &mut ViewScope) -> Box<dyn ViewInstance> {
        let c = &self.counters;
        c.live.set(c.live.get() + 1);
        c.created.set(c.created.get() + 1);
        c.peak.set(c.peak.get().max(c.live.get()));
        Box::new(RecordedInstance { counters: c.clone() })
    }
}

type Outcome = Result<FeatureModule, LoadFailure>;

/// Loader that resolves only when the test says so, and counts how many times
/// it was actually invoked.
#[derive(Clone, Default)]
pub struct ManualLoader {
    invocations: Rc<Cell<usize>>,
    waiting: Rc<RefCell<Vec<oneshot::Sender<Outcome>>>>,
}

impl ManualLoader {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn invocations(&self) -> usize {
        self.invocations.get()
    }

    pub fn pending(&self) -> usize {
        self.waiting.borrow().len()
    }

    /// Settles every in-flight invocation with `outcome`.
    pub fn settle(&self, outcome: Outcome) {
        for tx in self.waiting.borrow_mut().drain(..) {
            let _ = tx.send(outcome.clone());
        }
    }
}

impl ModuleLoader for ManualLoader {
    fn load(&self) -> LocalBoxFuture<'static, Outcome> {
        self.invocations.set(self.invocations.get() + 1);
        let (tx, rx) = oneshot::channel();
        self.waiting.borrow_mut().push(tx);
        async move {
            rx.await.unwrap_or_else(|_| Err(LoadFailure::new("loader dropped")))
        }
        .boxed_local()
    }
}
