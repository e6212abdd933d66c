//! HTTP surface of the authorization gate: axum middleware, request
//! principal handles, decision publication, and the dev wiring used by the
//! server binary and black-box tests.

pub mod app;
pub mod context;
pub mod dev;
pub mod middleware;
pub mod principal;

pub use context::SecurityContext;
pub use middleware::{GateState, permission_middleware};
pub use principal::{PrincipalHandle, RequestPrincipal, publish_decision};
