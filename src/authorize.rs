//! Scope-satisfaction capability, consumed read-only by the artifact service.
//!
//! Authentication, scope expansion, and signature verification happen
//! upstream of this crate; we only need the final boolean decision.

use async_trait::async_trait;

/// Claim bag presented to the authorizer for a single request.
#[derive(Debug, Clone, Default)]
pub struct ClaimBag {
    pub task_id: Option<String>,
    pub run_id: Option<u32>,
    pub worker_group: Option<String>,
    pub worker_id: Option<String>,
    pub name: String,
}

#[async_trait]
pub trait Authorizer: Send + Sync {
    /// Returns whether the presented claims satisfy the scopes required for
    /// this operation. A caller that returns `false` is responsible for
    /// having already produced the rejection response upstream; the service
    /// itself only short-circuits.
    async fn satisfies(&self, claims: &ClaimBag) -> bool;
}

/// Authorizes every request. Useful for local development and as the
/// default in tests that don't exercise the authorization boundary.
#[derive(Debug, Clone, Default)]
pub struct AllowAllAuthorizer;

#[async_trait]
impl Authorizer for AllowAllAuthorizer {
    async fn satisfies(&self, _claims: &ClaimBag) -> bool {
        true
    }
}

/// Denies every request; used by tests exercising the authorization boundary.
#[derive(Debug, Clone, Default)]
pub struct DenyAllAuthorizer;

#[async_trait]
impl Authorizer for DenyAllAuthorizer {
    async fn satisfies(&self, _claims: &ClaimBag) -> bool {
        false
    }
}
