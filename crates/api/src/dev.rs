//! Dev collaborators: in-memory backends and a header-based identity layer.
//!
//! These stand in for the real backend clients and the identity platform so
//! the server runs end-to-end locally and black-box tests have realistic
//! fakes. They are not implementations of the external services.

use std::collections::HashMap;

use axum::middleware::Next;
use axum::response::Response;

use policygate_auth::rbac::{RbacBackend, RbacRaw};
use policygate_auth::rebac::{ObjectRef, ObjectType, RebacBackend, Subject};
use policygate_core::CallerIdentity;

use crate::context::SecurityContext;
use crate::principal::PrincipalHandle;

/// What a principal is granted in the in-memory backends.
#[derive(Debug, Clone)]
pub struct Grant {
    pub can_read_policies: bool,
    pub can_write_policies: bool,
    pub host_group_ids: Option<Vec<Option<String>>>,
}

/// In-memory relationship-based backend keyed by principal id.
#[derive(Debug, Clone, Default)]
pub struct InMemoryRebac {
    grants: HashMap<String, Grant>,
}

impl InMemoryRebac {
    pub fn new() -> Self {
        Self::default()
    }

    /// The grants the local server boots with.
    pub fn seeded() -> Self {
        let mut backend = Self::new();
        backend.grant(
            "jdoe",
            Grant {
                can_read_policies: true,
                can_write_policies: true,
                host_group_ids: Some(vec![
                    Some("f3f5bfbe-80c3-4e09-be3e-17ec5ab360c6".to_string()),
                    Some("b757589c-b927-42cc-80d1-a13747f253f9".to_string()),
                    Some("d45f6c91-8371-4c7b-8cfe-367b111ceaa6".to_string()),
                ]),
            },
        );
        backend
    }

    pub fn grant(&mut self, principal_id: impl Into<String>, grant: Grant) {
        self.grants.insert(principal_id.into(), grant);
    }

    fn grant_for(&self, subject: &Subject) -> Option<&Grant> {
        if subject.object_ref.object_type != ObjectType::principal() {
            return None;
        }
        self.grants.get(&subject.object_ref.id)
    }
}

#[async_trait::async_trait]
impl RebacBackend for InMemoryRebac {
    async fn check_access(
        &self,
        object: &ObjectRef,
        relation: &str,
        subject: &Subject,
    ) -> anyhow::Result<bool> {
        if object.object_type != ObjectType::tenant() {
            return Ok(false);
        }
        let Some(grant) = self.grant_for(subject) else {
            return Ok(false);
        };
        Ok(match relation {
            "policies_can_read" => grant.can_read_policies,
            "policies_can_write" => grant.can_write_policies,
            _ => false,
        })
    }

    async fn list_resources(
        &self,
        object_type: &ObjectType,
        _relation: &str,
        subject: &Subject,
    ) -> anyhow::Result<Option<Vec<Option<String>>>> {
        if *object_type != ObjectType::workspace() {
            return Ok(None);
        }
        Ok(self
            .grant_for(subject)
            .and_then(|grant| grant.host_group_ids.clone()))
    }
}

/// In-memory attribute-based backend keyed by the raw identity credential.
///
/// Unknown identities get an empty access list (a decision with no
/// capabilities), not an error.
#[derive(Debug, Clone, Default)]
pub struct InMemoryRbac {
    access: HashMap<String, RbacRaw>,
}

impl InMemoryRbac {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, identity_header: impl Into<String>, raw: RbacRaw) {
        self.access.insert(identity_header.into(), raw);
    }
}

#[async_trait::async_trait]
impl RbacBackend for InMemoryRbac {
    async fn get_access(&self, identity_header: &str) -> anyhow::Result<RbacRaw> {
        Ok(self.access.get(identity_header).cloned().unwrap_or_default())
    }
}

pub const IDENTITY_HEADER: &str = "x-rh-identity";
pub const DEV_PRINCIPAL_HEADER: &str = "x-dev-principal";
pub const DEV_ORG_HEADER: &str = "x-dev-org";

/// Dev identity layer: derives the caller identity from plain headers and
/// installs fresh per-request principal handles.
///
/// Both publication routes (the injected handle and the one inside the
/// security context) resolve to the same state here, as they commonly do
/// in production identity layers; the middleware must not rely on that.
pub async fn dev_identity_middleware(
    mut req: axum::http::Request<axum::body::Body>,
    next: Next,
) -> Response {
    // The closure borrows `req`, so it must go out of scope before the await
    // below or the returned future is not Send.
    let identity = {
        let header = |name: &str, default: &str| {
            req.headers()
                .get(name)
                .and_then(|v| v.to_str().ok())
                .unwrap_or(default)
                .to_string()
        };

        CallerIdentity::new(
            header(IDENTITY_HEADER, "dev-identity"),
            header(DEV_PRINCIPAL_HEADER, "jdoe"),
            header(DEV_ORG_HEADER, "123456"),
        )
    };

    let user = PrincipalHandle::default();
    req.extensions_mut().insert(identity);
    req.extensions_mut().insert(user.clone());
    req.extensions_mut().insert(SecurityContext::new(user));

    next.run(req).await
}

#[cfg(test)]
mod tests {
    use super::*;

    use policygate_core::PrincipalId;

    #[tokio::test]
    async fn seeded_rebac_answers_for_known_principal() {
        let backend = InMemoryRebac::seeded();
        let subject = Subject::from_principal(&PrincipalId::new("jdoe"));
        let org = ObjectRef::new("123456", ObjectType::tenant());

        assert!(backend
            .check_access(&org, "policies_can_read", &subject)
            .await
            .unwrap());
        let groups = backend
            .list_resources(&ObjectType::workspace(), "", &subject)
            .await
            .unwrap();
        assert_eq!(groups.map(|g| g.len()), Some(3));
    }

    #[tokio::test]
    async fn unknown_principal_gets_nothing() {
        let backend = InMemoryRebac::seeded();
        let subject = Subject::from_principal(&PrincipalId::new("mallory"));
        let org = ObjectRef::new("123456", ObjectType::tenant());

        assert!(!backend
            .check_access(&org, "policies_can_write", &subject)
            .await
            .unwrap());
        assert_eq!(
            backend
                .list_resources(&ObjectType::workspace(), "", &subject)
                .await
                .unwrap(),
            None
        );
    }
}
