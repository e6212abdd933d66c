//! Router wiring: every route sits behind the permission middleware.

use std::sync::Arc;

use axum::{Extension, Json, Router, routing::get};
use serde_json::{Value, json};

use policygate_auth::{PermissionGate, gate::STATUS_PATH};

use crate::middleware::{self, GateState};
use crate::principal::PrincipalHandle;

/// Build the HTTP router over a configured gate.
///
/// The identity layer (installing `CallerIdentity` and the principal
/// handles) is the caller's responsibility and must wrap the returned
/// router; see [`crate::dev::dev_identity_middleware`] for the local one.
pub fn build_app(gate: Arc<PermissionGate>) -> Router {
    Router::new()
        .route(STATUS_PATH, get(status))
        .route("/api/policies/v1.0/access", get(current_access))
        .layer(axum::middleware::from_fn_with_state(
            GateState { gate },
            middleware::permission_middleware,
        ))
}

async fn status() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}

/// Echo the authorization state published onto the request's principal.
async fn current_access(Extension(principal): Extension<PrincipalHandle>) -> Json<Value> {
    let snapshot = principal.snapshot();
    Json(json!({
        "can_read_policies": snapshot.can_read_policies,
        "can_write_policies": snapshot.can_write_policies,
        "host_group_ids": snapshot.host_group_ids,
    }))
}
