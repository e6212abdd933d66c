//! `policygate-auth` — the per-request decision-resolution pipeline.
//!
//! Every request is resolved to a [`PolicyDecision`](policygate_core::PolicyDecision)
//! before business logic runs: the [`gate`] selects a backend from the two
//! feature flags, the selected resolver ([`rbac`] or [`rebac`]) queries its
//! backend, and [`host_groups`] canonicalizes the returned scope
//! identifiers. Any error anywhere in the pipeline fails closed.
//!
//! This crate is transport-agnostic: backend clients and the HTTP surface
//! are collaborators behind the [`rbac::RbacBackend`] and
//! [`rebac::RebacBackend`] traits.

pub mod config;
pub mod error;
pub mod gate;
pub mod host_groups;
pub mod rbac;
pub mod rebac;

pub use config::AuthConfig;
pub use error::{GateError, HostGroupParseError, ResolveError};
pub use gate::{Backend, GateOutcome, PermissionGate, select_backend};
pub use host_groups::normalize_host_groups;
pub use rbac::{RbacBackend, RbacRaw, RbacResolver};
pub use rebac::{ObjectRef, ObjectType, RebacBackend, RebacResolver, Subject};
