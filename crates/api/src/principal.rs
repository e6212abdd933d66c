//! Per-request principal state and decision publication.

use std::sync::{Arc, Mutex};

use uuid::Uuid;

use policygate_core::PolicyDecision;

/// Mutable authorization state of the request's principal.
///
/// Starts with no capabilities; only [`publish_decision`] writes it, and
/// only after a fully successful resolution.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RequestPrincipal {
    pub can_read_policies: bool,
    pub can_write_policies: bool,
    pub host_group_ids: Option<Vec<Option<Uuid>>>,
}

/// Cloneable shared handle to a [`RequestPrincipal`].
///
/// A request may expose two handles to "its" principal (one injected as a
/// request extension, one inside the security context); they are not
/// assumed to alias the same state.
#[derive(Debug, Clone, Default)]
pub struct PrincipalHandle(Arc<Mutex<RequestPrincipal>>);

impl PrincipalHandle {
    pub fn new(principal: RequestPrincipal) -> Self {
        Self(Arc::new(Mutex::new(principal)))
    }

    pub fn set_policy_access(
        &self,
        can_read: bool,
        can_write: bool,
        host_group_ids: Option<Vec<Option<Uuid>>>,
    ) {
        let mut principal = self.lock();
        principal.can_read_policies = can_read;
        principal.can_write_policies = can_write;
        principal.host_group_ids = host_group_ids;
    }

    pub fn snapshot(&self) -> RequestPrincipal {
        self.lock().clone()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, RequestPrincipal> {
        // Recover from poisoning; the state is plain data.
        match self.0.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }
}

/// Fan-out write of one decision to every principal handle of the request.
///
/// Each handle is written explicitly; correctness never relies on two
/// handles sharing state.
pub fn publish_decision(decision: &PolicyDecision, handles: &[&PrincipalHandle]) {
    for handle in handles {
        handle.set_policy_access(
            decision.can_read,
            decision.can_write,
            decision.host_group_ids.clone(),
        );
    }
}
