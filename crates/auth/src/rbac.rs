//! Attribute-based ("RBAC") resolution.
//!
//! The legacy backend is asked once per request, with the caller's raw
//! identity credential, and answers with the full access list for that
//! identity. The pipeline only ever asks two fixed capability questions of
//! that response and extracts the host-group scoping attached to it.

use std::sync::Arc;
use std::time::Instant;

use serde::{Deserialize, Serialize};

use policygate_core::{OrgId, PolicyDecision};

use crate::config::AuthConfig;
use crate::error::ResolveError;
use crate::host_groups::normalize_host_groups;

/// Application segment of the capability pair checked for every request.
pub const APPLICATION: &str = "policies";
/// Resource segment of the capability pair checked for every request.
pub const RESOURCE: &str = "policies";

const HOST_GROUP_ATTRIBUTE: &str = "group.id";

/// Client for the attribute-based authorization backend.
///
/// Implemented by the transport layer; fails with an opaque error the
/// resolver logs but never interprets.
#[async_trait::async_trait]
pub trait RbacBackend: Send + Sync {
    async fn get_access(&self, identity_header: &str) -> anyhow::Result<RbacRaw>;
}

/// Raw response of the attribute-based backend.
///
/// Access entries carry permission strings of the form
/// `application:resource:verb` (with `*` wildcards on resource and verb)
/// and, optionally, attribute filters restricting an access to a set of
/// host groups. Treat this as opaque outside this module: the only
/// supported queries are the capability checks and host-group extraction.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RbacRaw {
    pub data: Vec<RbacAccess>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RbacAccess {
    pub permission: String,
    #[serde(default, rename = "resourceDefinitions")]
    pub resource_definitions: Vec<RbacResourceDefinition>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RbacResourceDefinition {
    #[serde(rename = "attributeFilter")]
    pub attribute_filter: RbacAttributeFilter,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RbacAttributeFilter {
    pub key: String,
    pub operation: String,
    pub value: Vec<Option<String>>,
}

impl RbacRaw {
    pub fn can_read(&self, application: &str, resource: &str) -> bool {
        self.can_perform(application, resource, "read")
    }

    pub fn can_write(&self, application: &str, resource: &str) -> bool {
        self.can_perform(application, resource, "write")
    }

    fn can_perform(&self, application: &str, resource: &str, verb: &str) -> bool {
        self.data
            .iter()
            .any(|access| permission_matches(&access.permission, application, resource, verb))
    }

    /// Raw host-group identifiers granted to this identity, in response
    /// order. `None` when no access carries a `group.id` filter, meaning
    /// the identity is not host-group restricted.
    pub fn host_group_ids(&self) -> Option<Vec<Option<String>>> {
        let mut found = false;
        let mut ids = Vec::new();
        for access in &self.data {
            for definition in &access.resource_definitions {
                if definition.attribute_filter.key == HOST_GROUP_ATTRIBUTE {
                    found = true;
                    ids.extend(definition.attribute_filter.value.iter().cloned());
                }
            }
        }
        found.then_some(ids)
    }
}

fn permission_matches(permission: &str, application: &str, resource: &str, verb: &str) -> bool {
    let mut parts = permission.splitn(3, ':');
    let (Some(p_app), Some(p_resource), Some(p_verb)) = (parts.next(), parts.next(), parts.next())
    else {
        return false;
    };

    p_app == application
        && (p_resource == "*" || p_resource == resource)
        && (p_verb == "*" || p_verb == verb)
}

/// Resolves a [`PolicyDecision`] through the attribute-based backend.
pub struct RbacResolver {
    client: Arc<dyn RbacBackend>,
    config: AuthConfig,
}

impl RbacResolver {
    pub fn new(client: Arc<dyn RbacBackend>, config: AuthConfig) -> Self {
        Self { client, config }
    }

    /// One backend call, then capability derivation and host-group
    /// normalization. Any failure rejects the whole resolution; the
    /// caller never sees a partially valid decision.
    pub async fn resolve(
        &self,
        identity_header: &str,
        org_id: &OrgId,
    ) -> Result<PolicyDecision, ResolveError> {
        let started = Instant::now();
        let result = self.client.get_access(identity_header).await;
        self.config.warn_if_slow("rbac", started.elapsed(), org_id);

        let raw = result.map_err(|e| {
            tracing::warn!(org_id = %org_id, error = %e, "RBAC call failed");
            ResolveError::BackendUnavailable(e.to_string())
        })?;

        let host_group_ids = normalize_host_groups(raw.host_group_ids()).map_err(|e| {
            tracing::warn!(org_id = %org_id, error = %e, "RBAC host group parsing failed");
            e
        })?;

        Ok(PolicyDecision::new(
            raw.can_read(APPLICATION, RESOURCE),
            raw.can_write(APPLICATION, RESOURCE),
            host_group_ids,
        ))
    }
}
