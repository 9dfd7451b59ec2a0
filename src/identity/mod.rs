//! Identity collaborator: the reactive "current account" value.
//!
//! Only the authentication subsystem writes it; gates and routers read it.

pub mod signal;

pub use signal::{IdentityReader, IdentitySignal, Subscription};
