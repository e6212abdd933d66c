use std::sync::Arc;
use std::time::Duration;

use policygate_api::{app, dev};
use policygate_auth::{AuthConfig, PermissionGate};

#[tokio::main]
async fn main() {
    policygate_observability::init();

    let config = config_from_env();
    tracing::info!(
        rbac_enabled = config.rbac_enabled,
        rebac_enabled = config.rebac_enabled,
        "starting policygate"
    );

    let gate = Arc::new(PermissionGate::new(
        config,
        Arc::new(dev::InMemoryRbac::new()),
        Arc::new(dev::InMemoryRebac::seeded()),
    ));

    let app = app::build_app(gate).layer(axum::middleware::from_fn(dev::dev_identity_middleware));

    let listener = tokio::net::TcpListener::bind("0.0.0.0:8080")
        .await
        .expect("failed to bind 0.0.0.0:8080");

    tracing::info!("listening on {}", listener.local_addr().unwrap());

    axum::serve(listener, app).await.unwrap();
}

fn config_from_env() -> AuthConfig {
    let defaults = AuthConfig::default();
    AuthConfig {
        rbac_enabled: env_flag("RBAC_ENABLED", defaults.rbac_enabled),
        rebac_enabled: env_flag("REBAC_ENABLED", defaults.rebac_enabled),
        warn_slow: env_flag("AUTH_WARN_SLOW", defaults.warn_slow),
        warn_slow_threshold: std::env::var("AUTH_WARN_SLOW_MS")
            .ok()
            .and_then(|v| v.parse().ok())
            .map(Duration::from_millis)
            .unwrap_or(defaults.warn_slow_threshold),
    }
}

fn env_flag(name: &str, default: bool) -> bool {
    match std::env::var(name) {
        Ok(value) => match value.parse() {
            Ok(flag) => flag,
            Err(_) => {
                tracing::warn!(name, value, "ignoring unparseable boolean flag");
                default
            }
        },
        Err(_) => default,
    }
}
