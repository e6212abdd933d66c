//! Permission middleware: runs the decision gate before any handler.

use std::sync::Arc;

use axum::{
    extract::State,
    http::StatusCode,
    middleware::Next,
    response::{IntoResponse, Response},
};
use serde_json::json;

use policygate_auth::{GateOutcome, PermissionGate};
use policygate_core::CallerIdentity;

use crate::context::SecurityContext;
use crate::principal::{PrincipalHandle, publish_decision};

#[derive(Clone)]
pub struct GateState {
    pub gate: Arc<PermissionGate>,
}

/// Gate every request before it reaches business logic.
///
/// Identity and principal handles are request extensions installed by the
/// upstream identity layer. Rejections carry a uniform body: a caller can
/// never tell a policy denial from a backend failure.
pub async fn permission_middleware(
    State(state): State<GateState>,
    req: axum::http::Request<axum::body::Body>,
    next: Next,
) -> Result<Response, Response> {
    let path = req.uri().path().to_string();
    let identity = req.extensions().get::<CallerIdentity>().cloned();

    let outcome = state
        .gate
        .evaluate(&path, identity.as_ref())
        .await
        .map_err(|e| {
            tracing::error!(error = %e, path, "permission gate configuration error");
            json_error(
                StatusCode::INTERNAL_SERVER_ERROR,
                "configuration_error",
                "authorization misconfigured",
            )
        })?;

    match outcome {
        GateOutcome::Bypassed => Ok(next.run(req).await),
        GateOutcome::Denied => Err(json_error(
            StatusCode::FORBIDDEN,
            "forbidden",
            "access denied",
        )),
        GateOutcome::Granted(decision) => {
            let Some(user) = req.extensions().get::<PrincipalHandle>().cloned() else {
                tracing::error!(path, "principal handle missing from request extensions");
                return Err(json_error(
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "wiring_error",
                    "request principal not installed",
                ));
            };

            // Fan out to every handle the request exposes.
            match req.extensions().get::<SecurityContext>() {
                Some(security) => {
                    publish_decision(&decision, &[&user, security.user_principal()])
                }
                None => publish_decision(&decision, &[&user]),
            }

            Ok(next.run(req).await)
        }
    }
}

pub fn json_error(status: StatusCode, code: &'static str, message: impl Into<String>) -> Response {
    (
        status,
        axum::Json(json!({
            "error": code,
            "message": message.into(),
        })),
    )
        .into_response()
}
