//! Error taxonomy of the decision-resolution pipeline.
//!
//! Every variant here converts to request rejection; none is retried.
//! Backend internals are logged at the failure site and reduced to a
//! message string so they can never leak to the request caller.

use thiserror::Error;

/// A host-group identifier returned by a backend failed to parse as a UUID.
///
/// Normalization is all-or-nothing: one malformed element aborts the entire
/// resolution, never yielding a partial scope list.
#[derive(Debug, Error)]
#[error("malformed host group id {value:?}")]
pub struct HostGroupParseError {
    pub value: String,
    #[source]
    pub source: uuid::Error,
}

/// Failure of a single resolution attempt.
#[derive(Debug, Error)]
pub enum ResolveError {
    /// The backend call itself failed (network, deserialization, timeout).
    #[error("authorization backend call failed: {0}")]
    BackendUnavailable(String),

    /// The backend answered, but with data the resolver cannot interpret.
    #[error("malformed authorization backend response: {0}")]
    MalformedResponse(#[from] HostGroupParseError),
}

/// Fatal gate-level failure, distinct from a normal access denial.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum GateError {
    /// Both backend flags are enabled; the flags are mutually exclusive by
    /// contract, so this is a deployment misconfiguration and must surface
    /// as an internal error rather than a silent allow or deny.
    #[error("conflicting authorization backends: rbac and rebac are both enabled")]
    ConflictingBackends,
}
