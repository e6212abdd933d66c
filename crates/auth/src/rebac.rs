//! Relationship-based ("ReBAC") resolution.
//!
//! The relationship graph models organizations, workspaces, and principals
//! as typed objects; access questions are answered by relation traversal.
//! One resolution issues three calls (can-read, can-write, workspace
//! listing) and assembles them into the same canonical decision shape as
//! the attribute-based path. A failure in any of the three aborts the whole
//! resolution; partial authorization state is never assembled.

use std::sync::Arc;
use std::time::Instant;

use serde::{Deserialize, Serialize};

use policygate_core::{OrgId, PolicyDecision, PrincipalId};

use crate::config::AuthConfig;
use crate::error::ResolveError;
use crate::host_groups::normalize_host_groups;

const NAMESPACE: &str = "rbac";
const READ_RELATION: &str = "policies_can_read";
const WRITE_RELATION: &str = "policies_can_write";

/// A class of entity in the relationship graph.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ObjectType {
    pub namespace: String,
    pub name: String,
}

impl ObjectType {
    pub fn new(namespace: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            namespace: namespace.into(),
            name: name.into(),
        }
    }

    pub fn tenant() -> Self {
        Self::new(NAMESPACE, "tenant")
    }

    pub fn principal() -> Self {
        Self::new(NAMESPACE, "principal")
    }

    pub fn workspace() -> Self {
        Self::new(NAMESPACE, "workspace")
    }
}

/// A specific entity instance in the relationship graph.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ObjectRef {
    pub id: String,
    pub object_type: ObjectType,
}

impl ObjectRef {
    pub fn new(id: impl Into<String>, object_type: ObjectType) -> Self {
        Self {
            id: id.into(),
            object_type,
        }
    }
}

/// The caller expressed as a graph entity, optionally qualified by a
/// relation (e.g. "member").
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Subject {
    pub object_ref: ObjectRef,
    pub relation: Option<String>,
}

impl Subject {
    pub fn from_principal(principal_id: &PrincipalId) -> Self {
        Self {
            object_ref: ObjectRef::new(principal_id.as_str(), ObjectType::principal()),
            relation: None,
        }
    }
}

/// Client for the relationship-based authorization backend.
#[async_trait::async_trait]
pub trait RebacBackend: Send + Sync {
    async fn check_access(
        &self,
        object: &ObjectRef,
        relation: &str,
        subject: &Subject,
    ) -> anyhow::Result<bool>;

    /// Identifiers of all objects of `object_type` the subject can access.
    /// `None` means the backend holds no listing for the subject.
    async fn list_resources(
        &self,
        object_type: &ObjectType,
        relation: &str,
        subject: &Subject,
    ) -> anyhow::Result<Option<Vec<Option<String>>>>;
}

/// Resolves a [`PolicyDecision`] through the relationship-based backend.
pub struct RebacResolver {
    client: Arc<dyn RebacBackend>,
    config: AuthConfig,
}

impl RebacResolver {
    pub fn new(client: Arc<dyn RebacBackend>, config: AuthConfig) -> Self {
        Self { client, config }
    }

    /// Three sequential backend calls, all-or-nothing, timed as one unit.
    pub async fn resolve(
        &self,
        principal_id: &PrincipalId,
        org_id: &OrgId,
    ) -> Result<PolicyDecision, ResolveError> {
        let started = Instant::now();
        let result = self.resolve_inner(principal_id, org_id).await;
        self.config.warn_if_slow("rebac", started.elapsed(), org_id);
        result
    }

    async fn resolve_inner(
        &self,
        principal_id: &PrincipalId,
        org_id: &OrgId,
    ) -> Result<PolicyDecision, ResolveError> {
        let subject = Subject::from_principal(principal_id);
        let org = ObjectRef::new(org_id.as_str(), ObjectType::tenant());

        let backend_failed = |e: anyhow::Error| {
            tracing::warn!(org_id = %org_id, error = %e, "ReBAC call failed");
            ResolveError::BackendUnavailable(e.to_string())
        };

        let can_read = self
            .client
            .check_access(&org, READ_RELATION, &subject)
            .await
            .map_err(backend_failed)?;
        let can_write = self
            .client
            .check_access(&org, WRITE_RELATION, &subject)
            .await
            .map_err(backend_failed)?;
        let raw_groups = self
            .client
            .list_resources(&ObjectType::workspace(), "", &subject)
            .await
            .map_err(backend_failed)?;

        let host_group_ids = normalize_host_groups(raw_groups).map_err(|e| {
            tracing::warn!(org_id = %org_id, error = %e, "ReBAC host group parsing failed");
            e
        })?;

        Ok(PolicyDecision::new(can_read, can_write, host_group_ids))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    const GROUP_ONE: &str = "f3f5bfbe-80c3-4e09-be3e-17ec5ab360c6";
    const GROUP_TWO: &str = "b757589c-b927-42cc-80d1-a13747f253f9";

    /// Scripted backend: per-relation answers plus a listing outcome.
    struct ScriptedBackend {
        can_read: anyhow::Result<bool>,
        can_write: anyhow::Result<bool>,
        resources: anyhow::Result<Option<Vec<Option<String>>>>,
    }

    impl ScriptedBackend {
        fn granting(resources: Option<Vec<Option<String>>>) -> Self {
            Self {
                can_read: Ok(true),
                can_write: Ok(false),
                resources: Ok(resources),
            }
        }
    }

    #[async_trait::async_trait]
    impl RebacBackend for ScriptedBackend {
        async fn check_access(
            &self,
            object: &ObjectRef,
            relation: &str,
            subject: &Subject,
        ) -> anyhow::Result<bool> {
            assert_eq!(object.object_type, ObjectType::tenant());
            assert_eq!(subject.object_ref.object_type, ObjectType::principal());
            let outcome = match relation {
                READ_RELATION => &self.can_read,
                WRITE_RELATION => &self.can_write,
                other => panic!("unexpected relation {other:?}"),
            };
            match outcome {
                Ok(allowed) => Ok(*allowed),
                Err(e) => Err(anyhow::Error::msg(e.to_string())),
            }
        }

        async fn list_resources(
            &self,
            object_type: &ObjectType,
            relation: &str,
            subject: &Subject,
        ) -> anyhow::Result<Option<Vec<Option<String>>>> {
            assert_eq!(*object_type, ObjectType::workspace());
            assert_eq!(relation, "");
            assert_eq!(subject.object_ref.object_type, ObjectType::principal());
            match &self.resources {
                Ok(groups) => Ok(groups.clone()),
                Err(e) => Err(anyhow::Error::msg(e.to_string())),
            }
        }
    }

    fn resolver(backend: ScriptedBackend) -> RebacResolver {
        RebacResolver::new(Arc::new(backend), AuthConfig::default())
    }

    fn principal() -> PrincipalId {
        PrincipalId::new("jdoe")
    }

    fn org() -> OrgId {
        OrgId::new("123456")
    }

    #[test]
    fn subject_uses_fixed_principal_type() {
        let subject = Subject::from_principal(&principal());
        assert_eq!(subject.object_ref.id, "jdoe");
        assert_eq!(subject.object_ref.object_type, ObjectType::new("rbac", "principal"));
        assert_eq!(subject.relation, None);
    }

    #[tokio::test]
    async fn assembles_decision_from_three_calls() {
        let backend = ScriptedBackend::granting(Some(vec![
            Some(GROUP_ONE.to_string()),
            None,
            Some(GROUP_TWO.to_string()),
            Some(GROUP_ONE.to_string()),
        ]));

        let decision = resolver(backend).resolve(&principal(), &org()).await.unwrap();

        assert!(decision.can_read);
        assert!(!decision.can_write);
        assert_eq!(
            decision.host_group_ids,
            Some(vec![
                Some(Uuid::parse_str(GROUP_ONE).unwrap()),
                None,
                Some(Uuid::parse_str(GROUP_TWO).unwrap()),
            ])
        );
    }

    #[tokio::test]
    async fn missing_listing_means_unrestricted() {
        let decision = resolver(ScriptedBackend::granting(None))
            .resolve(&principal(), &org())
            .await
            .unwrap();
        assert_eq!(decision.host_group_ids, None);
    }

    #[tokio::test]
    async fn listing_failure_aborts_despite_successful_checks() {
        let backend = ScriptedBackend {
            can_read: Ok(true),
            can_write: Ok(true),
            resources: Err(anyhow::Error::msg("stream reset")),
        };

        let err = resolver(backend).resolve(&principal(), &org()).await.unwrap_err();
        assert!(matches!(err, ResolveError::BackendUnavailable(_)));
    }

    #[tokio::test]
    async fn check_failure_aborts_resolution() {
        let backend = ScriptedBackend {
            can_read: Err(anyhow::Error::msg("connection refused")),
            can_write: Ok(true),
            resources: Ok(None),
        };

        let err = resolver(backend).resolve(&principal(), &org()).await.unwrap_err();
        assert!(matches!(err, ResolveError::BackendUnavailable(_)));
    }

    #[tokio::test]
    async fn malformed_listing_aborts_resolution() {
        let backend = ScriptedBackend::granting(Some(vec![Some("baduuid".to_string())]));

        let err = resolver(backend).resolve(&principal(), &org()).await.unwrap_err();
        assert!(matches!(err, ResolveError::MalformedResponse(_)));
    }
}
