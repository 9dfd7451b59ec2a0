//! Route composer: the immutable route table plus a single-flight module cache.
//!
//! `load()` runs a loader at most once at a time. Callers that arrive while a
//! load is in flight share it and see the same outcome. Successful modules
//! stay cached for the composer's lifetime; failures are evicted so the next
//! navigation retries.

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::{Rc, Weak};

use futures::future::{self, FutureExt, LocalBoxFuture, Shared};

use crate::error::ModuleLoadError;
use crate::routing::loader::{FeatureModule, LoaderId, LoaderRef};
use crate::routing::table::{Resolution, RouteTable};

pub type LoadResult = Result<Rc<FeatureModule>, ModuleLoadError>;

type SharedLoad = Shared<LocalBoxFuture<'static, LoadResult>>;

enum Slot {
    Loading(SharedLoad),
    Ready(Rc<FeatureModule>),
}

type Cache = RefCell<HashMap<LoaderId, Slot>>;

#[derive(Debug)]
pub struct RouteComposer {
    table: RouteTable,
    cache: Rc<Cache>,
}

impl RouteComposer {
    /// Freezes `table`; no entries can be added afterwards.
    pub fn new(table: RouteTable) -> Self {
        RouteComposer { table, cache: Rc::new(RefCell::new(HashMap::new())) }
    }

    pub fn table(&self) -> &RouteTable {
        &self.table
    }

    pub fn resolve(&self, path: &str) -> Resolution<'_> {
        self.table.resolve(path)
    }

    /// Loads the module behind `loader`, coalescing with any load already in
    /// flight for the same reference.
    pub fn load(&self, loader: &LoaderRef) -> LocalBoxFuture<'static, LoadResult> {
        if let Some(existing) = self.lookup(loader) {
            return existing;
        }

        // The cache is not borrowed while the loader runs, so the loader may
        // query the composer or preload other modules.
        let shared = start_load(loader, Rc::downgrade(&self.cache));
        self.cache.borrow_mut().insert(loader.id(), Slot::Loading(shared.clone()));
        shared.boxed_local()
    }

    fn lookup(&self, loader: &LoaderRef) -> Option<LocalBoxFuture<'static, LoadResult>> {
        match self.cache.borrow().get(&loader.id())? {
            Slot::Ready(module) => Some(future::ready(Ok(module.clone())).boxed_local()),
            Slot::Loading(in_flight) => {
                tracing::trace!(segment = %loader.segment(), "joining in-flight module load");
                Some(in_flight.clone().boxed_local())
            }
        }
    }

    pub fn is_cached(&self, loader: &LoaderRef) -> bool {
        matches!(self.cache.borrow().get(&loader.id()), Some(Slot::Ready(_)))
    }

    pub fn is_loading(&self, loader: &LoaderRef) -> bool {
        matches!(self.cache.borrow().get(&loader.id()), Some(Slot::Loading(_)))
    }

    /// Drops a cached module so the next `load()` runs the loader again. An
    /// in-flight load is left alone. Returns whether anything was dropped.
    pub fn reset(&self, loader: &LoaderRef) -> bool {
        let mut cache = self.cache.borrow_mut();
        if matches!(cache.get(&loader.id()), Some(Slot::Ready(_))) {
            cache.remove(&loader.id());
            tracing::debug!(segment = %loader.segment(), "module cache reset");
            true
        } else {
            false
        }
    }
}

fn start_load(loader: &LoaderRef, cache: Weak<Cache>) -> SharedLoad {
    let id = loader.id();
    let segment = loader.segment().clone();
    tracing::debug!(segment = %segment, loader = %id, "loading module");
    let fetch = loader.invoke();

    async move {
        let result = fetch
            .await
            .map(Rc::new)
            .map_err(|failure| ModuleLoadError { segment: segment.clone(), reason: failure.0 });

        if let Some(cache) = cache.upgrade() {
            let mut cache = cache.borrow_mut();
            match &result {
                Ok(module) => {
                    tracing::info!(segment = %segment, module = %module.name, "module loaded");
                    cache.insert(id, Slot::Ready(module.clone()));
                }
                Err(err) => {
                    tracing::warn!(segment = %segment, error = %err, "module load failed");
                    cache.remove(&id);
                }
            }
        }
        result
    }
    .boxed_local()
    .shared()
}

impl std::fmt::Debug for Slot {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Slot::Loading(_) => f.write_str("Loading"),
            Slot::Ready(module) => f.debug_tuple("Ready").field(&module.name).finish(),
        }
    }
}
