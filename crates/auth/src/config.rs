//! Process-wide authorization settings.

use std::time::Duration;

use policygate_core::OrgId;

/// Backend selection flags and slow-call warning settings.
///
/// The two enable flags are intended to be mutually exclusive; with both
/// disabled every request is allowed (the escape hatch for environments
/// with no authorization backend at all). Defaults match the deployed
/// service: RBAC on, ReBAC off, slow-call warning at 1 second.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthConfig {
    pub rbac_enabled: bool,
    pub rebac_enabled: bool,
    pub warn_slow: bool,
    pub warn_slow_threshold: Duration,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            rbac_enabled: true,
            rebac_enabled: false,
            warn_slow: true,
            warn_slow_threshold: Duration::from_secs(1),
        }
    }
}

impl AuthConfig {
    /// Emit the advisory slow-backend warning when enabled and the call
    /// exceeded the tolerance. Observability only; never affects the
    /// decision.
    pub(crate) fn warn_if_slow(&self, backend: &'static str, elapsed: Duration, org_id: &OrgId) {
        if self.warn_slow && elapsed > self.warn_slow_threshold {
            tracing::warn!(
                backend,
                elapsed_ms = elapsed.as_millis() as u64,
                org_id = %org_id,
                "slow authorization backend call"
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_deployed_service() {
        let config = AuthConfig::default();
        assert!(config.rbac_enabled);
        assert!(!config.rebac_enabled);
        assert!(config.warn_slow);
        assert_eq!(config.warn_slow_threshold, Duration::from_secs(1));
    }
}
