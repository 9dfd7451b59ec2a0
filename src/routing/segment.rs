//! Route segments and navigation path splitting.

use std::fmt;

use crate::error::RouteError;

/// A registered path segment, e.g. `book` or `admin/metrics`.
///
/// One or more `/`-separated components; each component is non-empty and
/// free of whitespace, `?` and `#`.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize, serde::Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Segment(String);

impl Segment {
    pub fn parse(text: &str) -> Result<Self, RouteError> {
        let invalid = |reason: &str| RouteError::InvalidSegment {
            segment: text.to_string(),
            reason: reason.to_string(),
        };
        if text.is_empty() {
            return Err(invalid("segment must not be empty"));
        }
        if text.starts_with('/') || text.ends_with('/') {
            return Err(invalid("segment must not start or end with `/`"));
        }
        for component in text.split('/') {
            if component.is_empty() {
                return Err(invalid("segment contains an empty component"));
            }
            if component.chars().any(|c| c.is_whitespace() || c == '?' || c == '#') {
                return Err(invalid("segment contains whitespace, `?` or `#`"));
            }
        }
        Ok(Segment(text.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn components(&self) -> impl Iterator<Item = &str> {
        self.0.split('/')
    }

    pub fn depth(&self) -> usize {
        self.components().count()
    }
}

impl fmt::Display for Segment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for Segment {
    type Error = RouteError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Segment::parse(&value)
    }
}

impl From<Segment> for String {
    fn from(segment: Segment) -> Self {
        segment.0
    }
}

/// Splits a navigation path into components.
///
/// The query string and fragment are dropped, and leading, trailing and
/// repeated `/` are ignored: `/book//5/?page=2` yields `["book", "5"]`.
pub fn path_components(path: &str) -> Vec<&str> {
    let end = path.find(['?', '#']).unwrap_or(path.len());
    path[..end].split('/').filter(|c| !c.is_empty()).collect()
}
