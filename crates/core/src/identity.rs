use serde::{Deserialize, Serialize};

use crate::id::{OrgId, PrincipalId};

/// The caller's identity as established by the upstream identity layer.
///
/// `raw_identity` is the unmodified identity credential (header payload)
/// forwarded verbatim to the attribute-based backend; this service never
/// decodes it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CallerIdentity {
    pub raw_identity: String,
    pub principal_id: PrincipalId,
    pub org_id: OrgId,
}

impl CallerIdentity {
    pub fn new(
        raw_identity: impl Into<String>,
        principal_id: impl Into<PrincipalId>,
        org_id: impl Into<OrgId>,
    ) -> Self {
        Self {
            raw_identity: raw_identity.into(),
            principal_id: principal_id.into(),
            org_id: org_id.into(),
        }
    }
}
