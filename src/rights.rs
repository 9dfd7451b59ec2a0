//!
//! Permission algebra.
//! Decides whether an identity satisfies an authority expression. Both the
//! gate and the identity reader's `has_any_authority` go through here, so they
//! always agree.

use crate::error::PermissionEvaluationError;
use crate::types::{AuthorityExpression, Identity, IdentityState};

/// Well-known authority names.
pub mod core {
    /// Granted to every signed-in user.
    pub const USER: &str = "ROLE_USER";
    /// Granted to administrators.
    pub const ADMIN: &str = "ROLE_ADMIN";
    /// Placeholder authority for unauthenticated sessions. Holding it does not
    /// make an identity present.
    pub const ANONYMOUS: &str = "ROLE_ANONYMOUS";
}

/// Checks whether `identity` satisfies `required`.
///
/// # Arguments
/// * `identity` - The signed-in identity, or `None` when nobody is signed in.
/// * `required` - The alternatives that grant access (OR semantics).
///
/// # Returns
/// `false` when `identity` is absent. `true` when `required` is empty and an
/// identity is present. Otherwise `true` iff the identity holds at least one
/// of the required authorities.
#[inline]
pub fn evaluate(identity: Option<&Identity>, required: &AuthorityExpression) -> bool {
    let Some(identity) = identity else {
        return false;
    };
    if required.is_empty() {
        return true;
    }
    required.iter().any(|a| identity.authorities.contains(a))
}

/// Like [`evaluate`], but reports a failed identity fetch instead of folding
/// it into a deny.
pub fn try_evaluate(
    state: &IdentityState,
    required: &AuthorityExpression,
) -> Result<bool, PermissionEvaluationError> {
    match state {
        IdentityState::Failed(err) => Err(err.clone().into()),
        other => Ok(evaluate(other.identity(), required)),
    }
}

/// Fail-closed evaluation over an identity state.
///
/// An evaluation error is logged and treated as a deny.
pub fn permits(state: &IdentityState, required: &AuthorityExpression) -> bool {
    match try_evaluate(state, required) {
        Ok(granted) => granted,
        Err(err) => {
            tracing::warn!(error = %err, "permission evaluation failed, denying");
            false
        }
    }
}
