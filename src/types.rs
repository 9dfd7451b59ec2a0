//! Shared data types: authorities, authority expressions, and the identity record.

use std::collections::BTreeSet;
use std::fmt;

use crate::error::IdentityFetchError;

/// A named permission string identifying one capability (e.g. `ROLE_ADMIN`).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, serde::Serialize, serde::Deserialize)]
#[serde(transparent)]
pub struct Authority(String);

impl Authority {
    pub fn new(name: impl Into<String>) -> Self {
        Authority(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Authority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Authority {
    fn from(name: &str) -> Self {
        Authority(name.to_string())
    }
}

impl From<String> for Authority {
    fn from(name: String) -> Self {
        Authority(name)
    }
}

/// The required-permission input of a gate or route.
///
/// Alternatives are OR-ed: holding any one of them is enough. An empty
/// `AnyOf` requires only that someone is signed in.
///
/// Deserializes from either a JSON string or a JSON array of strings.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(untagged)]
pub enum AuthorityExpression {
    Single(Authority),
    AnyOf(Vec<Authority>),
}

impl AuthorityExpression {
    /// Expression that any authenticated identity satisfies.
    pub fn authenticated() -> Self {
        AuthorityExpression::AnyOf(Vec::new())
    }

    pub fn is_empty(&self) -> bool {
        match self {
            AuthorityExpression::Single(_) => false,
            AuthorityExpression::AnyOf(list) => list.is_empty(),
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = &Authority> {
        let slice: &[Authority] = match self {
            AuthorityExpression::Single(one) => std::slice::from_ref(one),
            AuthorityExpression::AnyOf(list) => list,
        };
        slice.iter()
    }

    pub fn contains(&self, authority: &Authority) -> bool {
        self.iter().any(|a| a == authority)
    }
}

impl Default for AuthorityExpression {
    fn default() -> Self {
        AuthorityExpression::authenticated()
    }
}

impl From<&str> for AuthorityExpression {
    fn from(name: &str) -> Self {
        AuthorityExpression::Single(Authority::from(name))
    }
}

impl From<Authority> for AuthorityExpression {
    fn from(authority: Authority) -> Self {
        AuthorityExpression::Single(authority)
    }
}

impl From<Vec<&str>> for AuthorityExpression {
    fn from(names: Vec<&str>) -> Self {
        names.into_iter().map(Authority::from).collect()
    }
}

impl FromIterator<Authority> for AuthorityExpression {
    fn from_iter<I: IntoIterator<Item = Authority>>(iter: I) -> Self {
        AuthorityExpression::AnyOf(iter.into_iter().collect())
    }
}

/// The authenticated session record.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Identity {
    pub login: String,
    #[serde(default)]
    pub authorities: BTreeSet<Authority>,
}

impl Identity {
    pub fn new<I, A>(login: impl Into<String>, authorities: I) -> Self
    where
        I: IntoIterator<Item = A>,
        A: Into<Authority>,
    {
        Identity {
            login: login.into(),
            authorities: authorities.into_iter().map(Into::into).collect(),
        }
    }
}

/// What the authentication subsystem currently knows about the user.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum IdentityState {
    /// Nobody is signed in.
    #[default]
    Absent,
    Present(Identity),
    /// The last identity fetch failed. Readers treat this like `Absent`.
    Failed(IdentityFetchError),
}

impl IdentityState {
    pub fn identity(&self) -> Option<&Identity> {
        match self {
            IdentityState::Present(identity) => Some(identity),
            IdentityState::Absent | IdentityState::Failed(_) => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_expression_deserializes_from_string_or_array() {
        let single: AuthorityExpression = serde_json::from_str("\"ROLE_USER\"").unwrap();
        assert_eq!(single, AuthorityExpression::from("ROLE_USER"));

        let many: AuthorityExpression =
            serde_json::from_str("[\"ROLE_ADMIN\", \"ROLE_USER\"]").unwrap();
        assert_eq!(many, AuthorityExpression::from(vec!["ROLE_ADMIN", "ROLE_USER"]));

        let none: AuthorityExpression = serde_json::from_str("[]").unwrap();
        assert!(none.is_empty());
    }

    #[test]
    fn test_single_expression_is_never_empty() {
        let expr = AuthorityExpression::from("ROLE_USER");
        assert!(!expr.is_empty());
        assert_eq!(expr.iter().count(), 1);
        assert!(expr.contains(&Authority::from("ROLE_USER")));
    }

    #[test]
    fn test_failed_state_has_no_identity() {
        let failed = IdentityState::Failed(IdentityFetchError("timeout".into()));
        assert!(failed.identity().is_none());
        assert!(IdentityState::Absent.identity().is_none());

        let present = IdentityState::Present(Identity::new("admin", ["ROLE_ADMIN"]));
        assert_eq!(present.identity().map(|i| i.login.as_str()), Some("admin"));
    }

    #[test]
    fn test_identity_without_authorities_field_deserializes() {
        let identity: Identity = serde_json::from_str(r#"{"login":"anon"}"#).unwrap();
        assert!(identity.authorities.is_empty());
    }
}
