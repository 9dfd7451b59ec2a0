//! Lazily loaded feature modules and the loaders that produce them.

use std::collections::BTreeMap;
use std::fmt;
use std::future::Future;
use std::rc::Rc;

use futures::future::{FutureExt, LocalBoxFuture};
use uuid::Uuid;

use crate::error::LoadFailure;
use crate::routing::segment::{path_components, Segment};
use crate::types::AuthorityExpression;

/// Declarative per-route data. The composer never interprets `extra`; it is
/// handed to the router collaborator as-is.
#[derive(Debug, Clone, Default, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct RouteMetadata {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    /// Authorities required to activate the route. `None` means public.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub authorities: Option<AuthorityExpression>,
    #[serde(flatten)]
    pub extra: BTreeMap<String, serde_json::Value>,
}

impl RouteMetadata {
    pub fn titled(title: impl Into<String>) -> Self {
        RouteMetadata { title: Some(title.into()), ..Default::default() }
    }

    pub fn requiring(mut self, authorities: impl Into<AuthorityExpression>) -> Self {
        self.authorities = Some(authorities.into());
        self
    }

    pub fn with(mut self, key: impl Into<String>, value: serde_json::Value) -> Self {
        self.extra.insert(key.into(), value);
        self
    }
}

/// A view inside a feature module: list, detail, or dialog.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct ViewRoute {
    /// Remainder pattern relative to the module's segment. `:name` components
    /// capture a parameter; `""` is the module's index view.
    pub pattern: String,
    #[serde(default)]
    pub metadata: RouteMetadata,
}

impl ViewRoute {
    pub fn new(pattern: impl Into<String>, metadata: RouteMetadata) -> Self {
        ViewRoute { pattern: pattern.into(), metadata }
    }

    fn capture(&self, components: &[&str]) -> Option<BTreeMap<String, String>> {
        let pattern = path_components(&self.pattern);
        if pattern.len() != components.len() {
            return None;
        }
        let mut params = BTreeMap::new();
        for (expected, actual) in pattern.iter().zip(components) {
            match expected.strip_prefix(':') {
                Some(name) => {
                    params.insert(name.to_string(), (*actual).to_string());
                }
                None if expected == actual => {}
                None => return None,
            }
        }
        Some(params)
    }
}

/// What a loader produces: a named feature area and its nested views.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct FeatureModule {
    pub name: String,
    #[serde(default)]
    pub views: Vec<ViewRoute>,
}

/// A view selected by the remainder of a navigation path.
#[derive(Debug, Clone, PartialEq)]
pub struct ViewMatch<'a> {
    pub view: &'a ViewRoute,
    pub params: BTreeMap<String, String>,
}

impl FeatureModule {
    pub fn new(name: impl Into<String>) -> Self {
        FeatureModule { name: name.into(), views: Vec::new() }
    }

    pub fn with_view(mut self, pattern: impl Into<String>, metadata: RouteMetadata) -> Self {
        self.views.push(ViewRoute::new(pattern, metadata));
        self
    }

    /// First view, in declaration order, whose pattern matches `remainder`.
    pub fn match_view(&self, remainder: &str) -> Option<ViewMatch<'_>> {
        let components = path_components(remainder);
        self.views
            .iter()
            .find_map(|view| view.capture(&components).map(|params| ViewMatch { view, params }))
    }
}

/// Produces a feature module on demand.
///
/// Implementations should not cache: the composer decides when a loader runs.
pub trait ModuleLoader {
    fn load(&self) -> LocalBoxFuture<'static, Result<FeatureModule, LoadFailure>>;
}

impl<F, Fut> ModuleLoader for F
where
    F: Fn() -> Fut,
    Fut: Future<Output = Result<FeatureModule, LoadFailure>> + 'static,
{
    fn load(&self) -> LocalBoxFuture<'static, Result<FeatureModule, LoadFailure>> {
        self().boxed_local()
    }
}

/// Identity of one registered loader. Load results are cached per id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct LoaderId(Uuid);

impl fmt::Display for LoaderId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

/// Deferred-module reference handed out by route resolution.
#[derive(Clone)]
pub struct LoaderRef {
    id: LoaderId,
    segment: Segment,
    loader: Rc<dyn ModuleLoader>,
}

impl LoaderRef {
    pub(crate) fn new(segment: Segment, loader: Rc<dyn ModuleLoader>) -> Self {
        LoaderRef { id: LoaderId(Uuid::new_v4()), segment, loader }
    }

    pub fn id(&self) -> LoaderId {
        self.id
    }

    pub fn segment(&self) -> &Segment {
        &self.segment
    }

    pub(crate) fn invoke(&self) -> LocalBoxFuture<'static, Result<FeatureModule, LoadFailure>> {
        self.loader.load()
    }
}

impl PartialEq for LoaderRef {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for LoaderRef {}

impl fmt::Debug for LoaderRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LoaderRef").field("id", &self.id).field("segment", &self.segment).finish()
    }
}
