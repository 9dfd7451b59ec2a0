//!
//! Defines error types for the gate and the route composer.

use crate::routing::Segment;

/// Errors raised while assembling a route table.
///
/// Both variants are construction-time failures: application assembly is
/// expected to abort on them.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RouteError {
    /// The same segment was registered twice within one table.
    #[error("segment `{0}` is already registered")]
    DuplicateSegment(Segment),
    /// The segment text is not a valid path segment.
    #[error("invalid segment `{segment}`: {reason}")]
    InvalidSegment { segment: String, reason: String },
}

/// A lazy loader failed to produce its feature module.
///
/// Recoverable: the composer never caches this outcome, so the next `load()`
/// for the same loader re-attempts.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("failed to load module for segment `{segment}`: {reason}")]
pub struct ModuleLoadError {
    pub segment: Segment,
    pub reason: String,
}

/// Failure reported by a loader before it is tagged with its segment.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{0}")]
pub struct LoadFailure(pub String);

impl LoadFailure {
    pub fn new(reason: impl Into<String>) -> Self {
        LoadFailure(reason.into())
    }
}

/// The authentication collaborator could not establish the current identity.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("identity fetch failed: {0}")]
pub struct IdentityFetchError(pub String);

/// Permission could not be evaluated. Never escapes the gate: it is logged and
/// treated as a deny.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PermissionEvaluationError {
    #[error("identity unavailable: {0}")]
    IdentityUnavailable(#[from] IdentityFetchError),
}

/// Errors raised while reading or binding a route manifest.
#[derive(Debug, thiserror::Error)]
pub enum ManifestError {
    #[error("failed to read manifest: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse manifest: {0}")]
    Parse(#[from] serde_json::Error),
    /// The manifest names a loader key nobody registered.
    #[error("no loader registered under `{0}`")]
    UnknownLoader(String),
    #[error(transparent)]
    Route(#[from] RouteError),
}
