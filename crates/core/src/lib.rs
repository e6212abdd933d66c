//! `policygate-core` — shared domain value types.
//!
//! This crate contains **pure** value types used across the authorization
//! pipeline (no IO, no transport concerns).

pub mod decision;
pub mod id;
pub mod identity;

pub use decision::PolicyDecision;
pub use id::{OrgId, PrincipalId};
pub use identity::CallerIdentity;
