#![forbid(unsafe_code)]
#![deny(clippy::all)]
#![deny(deprecated)]

//!
//! Authgate-Core: capability-gated view composition and lazy route composition.
//!
//! Two pieces, both single-threaded and in-process:
//! - the [`gate::AuthorityGate`], which mounts or unmounts a view region as the
//!   signed-in identity gains or loses the required authorities, and
//! - the [`routing::RouteComposer`], which maps top-level path segments to
//!   lazily loaded feature modules and loads each one at most once at a time.

// Authorities, authority expressions and the identity record.
pub mod types;

pub use types::{Authority, AuthorityExpression, Identity, IdentityState};

// Permission algebra shared by gates, readers and routers.
pub mod rights;

// Reactive identity signal (authentication collaborator).
pub mod identity;

// Error types.
pub mod error;

// Authority gate and view regions.
pub mod gate;

// Route table, single-flight module loading, navigation, manifests.
pub mod routing;

#[cfg(feature = "subscriber")]
pub mod logging;

#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;
