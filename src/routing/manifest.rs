//! Route manifest: the route table declared as JSON.
//!
//! ```json
//! { "routes": [
//!     { "segment": "book", "loader": "book", "metadata": { "title": "Books", "authorities": ["ROLE_USER"] } }
//! ] }
//! ```
//!
//! Loader keys are bound to code through a `LoaderRegistry`.

use std::collections::HashMap;
use std::fmt;
use std::path::Path;
use std::rc::Rc;

use crate::error::ManifestError;
use crate::routing::loader::{ModuleLoader, RouteMetadata};
use crate::routing::table::RouteTable;

#[derive(Debug, Clone, Default, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct RouteManifest {
    #[serde(default)]
    pub routes: Vec<ManifestRoute>,
}

#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct ManifestRoute {
    pub segment: String,
    /// Key into the `LoaderRegistry`.
    pub loader: String,
    #[serde(default)]
    pub metadata: RouteMetadata,
}

impl RouteManifest {
    pub fn from_json_str(json: &str) -> Result<Self, ManifestError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, ManifestError> {
        let text = std::fs::read_to_string(path.as_ref())?;
        Self::from_json_str(&text)
    }

    /// Registers every route, in manifest order, against `registry`.
    pub fn build_table(&self, registry: &LoaderRegistry) -> Result<RouteTable, ManifestError> {
        let mut table = RouteTable::new();
        for route in &self.routes {
            let loader = registry
                .get(&route.loader)
                .ok_or_else(|| ManifestError::UnknownLoader(route.loader.clone()))?;
            table.register_shared(&route.segment, route.metadata.clone(), loader)?;
        }
        tracing::debug!(routes = table.len(), "route table built from manifest");
        Ok(table)
    }
}

/// Named loaders that manifests can refer to.
#[derive(Default)]
pub struct LoaderRegistry {
    loaders: HashMap<String, Rc<dyn ModuleLoader>>,
}

impl LoaderRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds `loader` under `key`, replacing any previous loader with that key.
    pub fn insert<L>(&mut self, key: impl Into<String>, loader: L) -> &mut Self
    where
        L: ModuleLoader + 'static,
    {
        self.loaders.insert(key.into(), Rc::new(loader));
        self
    }

    fn get(&self, key: &str) -> Option<Rc<dyn ModuleLoader>> {
        self.loaders.get(key).cloned()
    }
}

impl fmt::Debug for LoaderRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut keys: Vec<_> = self.loaders.keys().collect();
        keys.sort();
        f.debug_struct("LoaderRegistry").field("keys", &keys).finish()
    }
}
