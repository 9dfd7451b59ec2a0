//! The route table: top-level segments mapped to lazy loaders.

use std::rc::Rc;

use crate::error::RouteError;
use crate::routing::loader::{LoaderRef, ModuleLoader, RouteMetadata};
use crate::routing::segment::{path_components, Segment};

/// One entry of the application's top-level navigation contract.
#[derive(Debug, Clone)]
pub struct RouteEntry {
    pub segment: Segment,
    pub metadata: RouteMetadata,
    pub loader: LoaderRef,
}

/// Result of resolving a navigation path.
#[derive(Debug, Clone, PartialEq)]
pub enum Resolution<'a> {
    Matched(RouteMatch<'a>),
    /// No registered segment owns the path. Not an error.
    NoMatch,
}

impl<'a> Resolution<'a> {
    pub fn matched(self) -> Option<RouteMatch<'a>> {
        match self {
            Resolution::Matched(m) => Some(m),
            Resolution::NoMatch => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct RouteMatch<'a> {
    pub entry: &'a RouteEntry,
    /// Path components after the matched segment, joined with `/`.
    pub remainder: String,
}

impl<'a> RouteMatch<'a> {
    pub fn loader(&self) -> &'a LoaderRef {
        &self.entry.loader
    }
}

impl PartialEq for RouteEntry {
    fn eq(&self, other: &Self) -> bool {
        self.segment == other.segment && self.loader == other.loader
    }
}

/// Ordered (segment, metadata, loader) entries. Each segment appears once.
#[derive(Debug, Clone, Default)]
pub struct RouteTable {
    entries: Vec<RouteEntry>,
}

impl RouteTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `loader` under `segment` with empty metadata.
    pub fn register<L>(&mut self, segment: &str, loader: L) -> Result<LoaderRef, RouteError>
    where
        L: ModuleLoader + 'static,
    {
        self.register_with(segment, RouteMetadata::default(), loader)
    }

    pub fn register_with<L>(
        &mut self,
        segment: &str,
        metadata: RouteMetadata,
        loader: L,
    ) -> Result<LoaderRef, RouteError>
    where
        L: ModuleLoader + 'static,
    {
        self.register_shared(segment, metadata, Rc::new(loader))
    }

    pub(crate) fn register_shared(
        &mut self,
        segment: &str,
        metadata: RouteMetadata,
        loader: Rc<dyn ModuleLoader>,
    ) -> Result<LoaderRef, RouteError> {
        let segment = Segment::parse(segment)?;
        if self.entries.iter().any(|e| e.segment == segment) {
            return Err(RouteError::DuplicateSegment(segment));
        }
        let loader = LoaderRef::new(segment.clone(), loader);
        tracing::debug!(segment = %segment, loader = %loader.id(), "registered route");
        self.entries.push(RouteEntry { segment, metadata, loader: loader.clone() });
        Ok(loader)
    }

    /// Finds the longest registered segment that prefixes `path` on whole
    /// components. Never invokes the loader.
    pub fn resolve(&self, path: &str) -> Resolution<'_> {
        let components = path_components(path);
        let best = self
            .entries
            .iter()
            .filter(|entry| {
                let depth = entry.segment.depth();
                depth <= components.len() && entry.segment.components().eq(components[..depth].iter().copied())
            })
            .max_by_key(|entry| entry.segment.depth());

        match best {
            Some(entry) => {
                let remainder = components[entry.segment.depth()..].join("/");
                Resolution::Matched(RouteMatch { entry, remainder })
            }
            None => Resolution::NoMatch,
        }
    }

    pub fn get(&self, segment: &str) -> Option<&RouteEntry> {
        self.entries.iter().find(|e| e.segment.as_str() == segment)
    }

    pub fn entries(&self) -> &[RouteEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::LoadFailure;
    use crate::routing::loader::FeatureModule;

    fn loader(name: &'static str) -> impl ModuleLoader {
        move || async move { Ok::<_, LoadFailure>(FeatureModule::new(name)) }
    }

    #[test]
    fn test_duplicate_segment_is_rejected() {
        let mut table = RouteTable::new();
        table.register("book", loader("l1")).unwrap();
        let err = table.register("book", loader("l2")).unwrap_err();
        assert_eq!(err, RouteError::DuplicateSegment(Segment::parse("book").unwrap()));
        assert_eq!(table.len(), 1);
    }

    #[test]
    fn test_resolve_matches_segment_prefix() {
        let mut table = RouteTable::new();
        let book = table.register("book", loader("book")).unwrap();
        let m = table.resolve("book/5").matched().unwrap();
        assert_eq!(m.loader(), &book);
        assert_eq!(m.remainder, "5");
    }

    #[test]
    fn test_resolve_prefers_longest_segment() {
        let mut table = RouteTable::new();
        table.register("admin", loader("admin")).unwrap();
        let metrics = table.register("admin/metrics", loader("metrics")).unwrap();
        let m = table.resolve("/admin/metrics/jvm").matched().unwrap();
        assert_eq!(m.loader(), &metrics);
        assert_eq!(m.remainder, "jvm");
        assert_eq!(table.resolve("admin/users").matched().unwrap().entry.segment.as_str(), "admin");
    }

    #[test]
    fn test_resolve_respects_component_boundaries() {
        let mut table = RouteTable::new();
        table.register("book", loader("book")).unwrap();
        assert_eq!(table.resolve("books"), Resolution::NoMatch);
        assert_eq!(table.resolve("unknown-path"), Resolution::NoMatch);
        assert_eq!(table.resolve(""), Resolution::NoMatch);
    }

    #[test]
    fn test_entries_keep_registration_order_and_metadata() {
        let mut table = RouteTable::new();
        table.register_with("book", RouteMetadata::titled("Books"), loader("book")).unwrap();
        table.register("author", loader("author")).unwrap();
        let segments: Vec<_> = table.entries().iter().map(|e| e.segment.as_str()).collect();
        assert_eq!(segments, vec!["book", "author"]);
        assert_eq!(table.get("book").unwrap().metadata.title.as_deref(), Some("Books"));
    }
}
