//! Navigation on top of the route composer.
//!
//! A navigation resolves the path, checks the segment's required authorities,
//! loads the feature module, picks the nested view and checks the view's own
//! authorities. Signed-out users hitting a protected route get
//! `LoginRequired` and the path is remembered for the post-login redirect.

use std::cell::RefCell;
use std::collections::BTreeMap;
use std::rc::Rc;

use crate::error::ModuleLoadError;
use crate::identity::IdentityReader;
use crate::routing::composer::RouteComposer;
use crate::routing::loader::{FeatureModule, RouteMetadata, ViewRoute};
use crate::routing::segment::Segment;
use crate::types::AuthorityExpression;

/// A successfully activated route.
#[derive(Debug, Clone, PartialEq)]
pub struct Activation {
    pub segment: Segment,
    pub segment_metadata: RouteMetadata,
    pub module: Rc<FeatureModule>,
    pub view: ViewRoute,
    pub params: BTreeMap<String, String>,
}

impl Activation {
    /// Page title: the view's own title, else the segment's.
    pub fn title(&self) -> Option<&str> {
        self.view.metadata.title.as_deref().or(self.segment_metadata.title.as_deref())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Navigation {
    Activated(Activation),
    NotFound { path: String },
    /// Signed in, but without any of the required authorities.
    AccessDenied { path: String },
    /// The route is protected and nobody is signed in.
    LoginRequired { path: String },
}

enum Access {
    Granted,
    Denied,
    LoginRequired,
}

#[derive(Debug)]
pub struct Router {
    composer: RouteComposer,
    identity: IdentityReader,
    stored_url: RefCell<Option<String>>,
}

impl Router {
    pub fn new(composer: RouteComposer, identity: IdentityReader) -> Self {
        Router { composer, identity, stored_url: RefCell::new(None) }
    }

    pub fn composer(&self) -> &RouteComposer {
        &self.composer
    }

    /// Navigates to `path`. Only a failed module load is an error; every other
    /// outcome is a `Navigation`.
    pub async fn navigate(&self, path: &str) -> Result<Navigation, ModuleLoadError> {
        let Some(matched) = self.composer.resolve(path).matched() else {
            tracing::debug!(path, "no route owns path");
            return Ok(Navigation::NotFound { path: path.to_string() });
        };
        let entry = matched.entry;
        let remainder = matched.remainder;

        if let Some(blocked) = self.guard(entry.metadata.authorities.as_ref(), path) {
            return Ok(blocked);
        }

        let module = self.composer.load(&entry.loader).await?;

        // The identity may have changed while the module was loading.
        if let Some(blocked) = self.guard(entry.metadata.authorities.as_ref(), path) {
            return Ok(blocked);
        }

        let Some(view_match) = module.match_view(&remainder) else {
            tracing::debug!(path, segment = %entry.segment, "no view matches remainder");
            return Ok(Navigation::NotFound { path: path.to_string() });
        };
        if let Some(blocked) = self.guard(view_match.view.metadata.authorities.as_ref(), path) {
            return Ok(blocked);
        }

        let activation = Activation {
            segment: entry.segment.clone(),
            segment_metadata: entry.metadata.clone(),
            view: view_match.view.clone(),
            params: view_match.params,
            module: module.clone(),
        };
        tracing::debug!(path, segment = %activation.segment, view = %activation.view.pattern, "route activated");
        Ok(Navigation::Activated(activation))
    }

    /// Returns and clears the URL remembered by the last `LoginRequired`.
    pub fn take_stored_url(&self) -> Option<String> {
        self.stored_url.borrow_mut().take()
    }

    fn guard(&self, required: Option<&AuthorityExpression>, path: &str) -> Option<Navigation> {
        match self.access(required) {
            Access::Granted => None,
            Access::Denied => {
                tracing::debug!(path, "access denied");
                Some(Navigation::AccessDenied { path: path.to_string() })
            }
            Access::LoginRequired => {
                *self.stored_url.borrow_mut() = Some(path.to_string());
                Some(Navigation::LoginRequired { path: path.to_string() })
            }
        }
    }

    fn access(&self, required: Option<&AuthorityExpression>) -> Access {
        let Some(required) = required else {
            return Access::Granted;
        };
        if !self.identity.is_authenticated() {
            return Access::LoginRequired;
        }
        if self.identity.has_any_authority(required) {
            Access::Granted
        } else {
            Access::Denied
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::LoadFailure;
    use crate::identity::IdentitySignal;
    use crate::rights::core::{ADMIN, USER};
    use crate::routing::table::RouteTable;
    use crate::types::Identity;
    use futures::executor::block_on;

    fn book_module() -> FeatureModule {
        FeatureModule::new("book")
            .with_view("", RouteMetadata::titled("Books"))
            .with_view(":id/view", RouteMetadata::default())
            .with_view(":id/delete", RouteMetadata::titled("Delete").requiring(ADMIN))
    }

    fn router(signal: &IdentitySignal) -> Router {
        let mut table = RouteTable::new();
        table
            .register_with("book", RouteMetadata::titled("Book").requiring(USER), || async {
                Ok::<_, LoadFailure>(book_module())
            })
            .unwrap();
        table
            .register("about", || async { Ok::<_, LoadFailure>(FeatureModule::new("about").with_view("", RouteMetadata::default())) })
            .unwrap();
        Router::new(RouteComposer::new(table), signal.reader())
    }

    #[test]
    fn test_activates_nested_view() {
        let signal = IdentitySignal::new();
        signal.authenticate(Identity::new("u", [USER]));
        let router = router(&signal);

        let Navigation::Activated(a) = block_on(router.navigate("/book/7/view")).unwrap() else {
            panic!("expected activation");
        };
        assert_eq!(a.segment.as_str(), "book");
        assert_eq!(a.params.get("id").map(String::as_str), Some("7"));
        assert_eq!(a.title(), Some("Book"));
    }

    #[test]
    fn test_public_route_needs_no_identity() {
        let signal = IdentitySignal::new();
        let router = router(&signal);
        assert!(matches!(block_on(router.navigate("about")).unwrap(), Navigation::Activated(_)));
    }

    #[test]
    fn test_login_required_stores_url() {
        let signal = IdentitySignal::new();
        let router = router(&signal);
        let nav = block_on(router.navigate("book/7/view?tab=2")).unwrap();
        assert_eq!(nav, Navigation::LoginRequired { path: "book/7/view?tab=2".into() });
        assert_eq!(router.take_stored_url().as_deref(), Some("book/7/view?tab=2"));
        assert_eq!(router.take_stored_url(), None);
        // Nothing was fetched for a blocked navigation.
        let book = &router.composer().table().entries()[0].loader;
        assert!(!router.composer().is_cached(book));
    }

    #[test]
    fn test_view_authorities_are_enforced() {
        let signal = IdentitySignal::new();
        signal.authenticate(Identity::new("u", [USER]));
        let router = router(&signal);
        assert_eq!(
            block_on(router.navigate("book/7/delete")).unwrap(),
            Navigation::AccessDenied { path: "book/7/delete".into() }
        );

        signal.authenticate(Identity::new("a", [ADMIN, USER]));
        let Navigation::Activated(a) = block_on(router.navigate("book/7/delete")).unwrap() else {
            panic!("expected activation");
        };
        assert_eq!(a.title(), Some("Delete"));
    }

    #[test]
    fn test_unknown_paths_are_not_found() {
        let signal = IdentitySignal::new();
        signal.authenticate(Identity::new("u", [USER]));
        let router = router(&signal);
        assert_eq!(
            block_on(router.navigate("unknown-path")).unwrap(),
            Navigation::NotFound { path: "unknown-path".into() }
        );
        assert_eq!(
            block_on(router.navigate("book/7/history")).unwrap(),
            Navigation::NotFound { path: "book/7/history".into() }
        );
    }

    #[test]
    fn test_load_failure_propagates() {
        let signal = IdentitySignal::new();
        let mut table = RouteTable::new();
        table.register("broken", || async { Err::<FeatureModule, _>(LoadFailure::new("404")) }).unwrap();
        let router = Router::new(RouteComposer::new(table), signal.reader());
        let err = block_on(router.navigate("broken")).unwrap_err();
        assert_eq!(err.segment.as_str(), "broken");
        assert_eq!(err.reason, "404");
    }
}
