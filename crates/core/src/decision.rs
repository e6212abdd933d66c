use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Canonical per-request authorization decision.
///
/// `host_group_ids` distinguishes three shapes:
/// - `None`: no host-group restriction at all,
/// - `Some(vec![])`: restricted to no groups (sees nothing),
/// - a `None` element: the "ungrouped" bucket, a real grant like any group.
///
/// A decision is produced fresh per request and owned by that request until
/// published; it is never persisted or cached.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PolicyDecision {
    pub can_read: bool,
    pub can_write: bool,
    pub host_group_ids: Option<Vec<Option<Uuid>>>,
}

impl PolicyDecision {
    pub fn new(can_read: bool, can_write: bool, host_group_ids: Option<Vec<Option<Uuid>>>) -> Self {
        Self {
            can_read,
            can_write,
            host_group_ids,
        }
    }

    /// The decision used when no authorization backend is configured.
    pub fn allow_all() -> Self {
        Self {
            can_read: true,
            can_write: true,
            host_group_ids: None,
        }
    }
}
