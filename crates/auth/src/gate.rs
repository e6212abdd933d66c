//! The per-request decision gate.
//!
//! Entry point of the pipeline: selects allow-all, a bypass, or exactly one
//! backend, runs the matching resolver, and converts every failure into a
//! denial. No retries anywhere; a single backend failure is terminal for
//! the request.

use std::sync::Arc;

use policygate_core::{CallerIdentity, PolicyDecision};

use crate::config::AuthConfig;
use crate::error::GateError;
use crate::rbac::{RbacBackend, RbacResolver};
use crate::rebac::{RebacBackend, RebacResolver};

/// Exact-match operational status path, always allowed through.
pub const STATUS_PATH: &str = "/api/policies/v1.0/status";
/// Administrative path prefix, always allowed through.
pub const ADMIN_PREFIX: &str = "/admin";

/// The backend active for a request. Exactly one is ever selected, as a
/// pure function of the two feature flags.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Backend {
    AllowAll,
    Rbac,
    Rebac,
}

/// Derive the active backend from the configuration flags.
///
/// Both flags disabled is the explicit escape hatch (allow all); both
/// enabled breaks the flags' mutual-exclusion contract and is fatal.
pub fn select_backend(config: &AuthConfig) -> Result<Backend, GateError> {
    match (config.rbac_enabled, config.rebac_enabled) {
        (false, false) => Ok(Backend::AllowAll),
        (true, false) => Ok(Backend::Rbac),
        (false, true) => Ok(Backend::Rebac),
        (true, true) => Err(GateError::ConflictingBackends),
    }
}

/// Outcome of gating one request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GateOutcome {
    /// Allow the request and publish this decision to the request's
    /// principal handles.
    Granted(PolicyDecision),
    /// Allowlisted path: proceed without computing or publishing anything.
    Bypassed,
    /// Reject with access denied. Deliberately indistinguishable between
    /// "denied by policy" and "backend failure" so backend health never
    /// leaks to callers.
    Denied,
}

/// Per-request authorization gate over the two resolvers.
pub struct PermissionGate {
    config: AuthConfig,
    rbac: RbacResolver,
    rebac: RebacResolver,
}

impl PermissionGate {
    pub fn new(
        config: AuthConfig,
        rbac_client: Arc<dyn RbacBackend>,
        rebac_client: Arc<dyn RebacBackend>,
    ) -> Self {
        Self {
            rbac: RbacResolver::new(rbac_client, config.clone()),
            rebac: RebacResolver::new(rebac_client, config.clone()),
            config,
        }
    }

    /// Gate one request.
    ///
    /// The allow-all check runs before path matching: with no backend
    /// configured, even allowlisted paths receive the published allow-all
    /// decision. The allowlist in turn runs before flag validation, so
    /// operational paths stay reachable under a misconfigured flag pair.
    /// `identity` may be absent for allowlisted paths; if a decision is
    /// required and no identity is available, the request is denied.
    pub async fn evaluate(
        &self,
        path: &str,
        identity: Option<&CallerIdentity>,
    ) -> Result<GateOutcome, GateError> {
        if !self.config.rbac_enabled && !self.config.rebac_enabled {
            return Ok(GateOutcome::Granted(PolicyDecision::allow_all()));
        }

        if is_always_allowed(path) {
            return Ok(GateOutcome::Bypassed);
        }

        let backend = match select_backend(&self.config) {
            Ok(backend) => backend,
            Err(e) => {
                tracing::error!(error = %e, "authorization misconfigured");
                return Err(e);
            }
        };

        let Some(identity) = identity else {
            tracing::warn!(path, "authorization required but no caller identity present");
            return Ok(GateOutcome::Denied);
        };

        let resolved = match backend {
            Backend::Rbac => {
                self.rbac
                    .resolve(&identity.raw_identity, &identity.org_id)
                    .await
            }
            Backend::Rebac => {
                self.rebac
                    .resolve(&identity.principal_id, &identity.org_id)
                    .await
            }
            // Handled above; selection is a closed choice.
            Backend::AllowAll => return Ok(GateOutcome::Granted(PolicyDecision::allow_all())),
        };

        match resolved {
            Ok(decision) => Ok(GateOutcome::Granted(decision)),
            // Already logged at the failure site; fail closed.
            Err(_) => Ok(GateOutcome::Denied),
        }
    }
}

fn is_always_allowed(path: &str) -> bool {
    path == STATUS_PATH || path.starts_with(ADMIN_PREFIX)
}
