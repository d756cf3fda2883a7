//! Claim domain types: the error taxonomy and the derived lifecycle status.
//!
//! A claim moves `created -> redeemed` exactly once; `expired` is never a
//! stored flag but always recomputed from `expires_at` against the current
//! clock, so a stale cached state can never authorize a redemption.

pub mod code;

use serde::{Deserialize, Serialize};

use crate::storage::HostClaim;

/// Default validity window for a freshly issued claim, in seconds.
pub const DEFAULT_CLAIM_TTL_SECS: i64 = 600;

/// Default cap on concurrently-active (unexpired, unredeemed) claims per user.
pub const DEFAULT_MAX_ACTIVE_CLAIMS: u32 = 10;

/// Typed outcomes of claim operations.
///
/// Each variant is surfaced to callers distinctly; operator tooling reacts
/// differently to a code that never existed, one that ran out of time, and
/// one that was already consumed.
#[derive(Debug, thiserror::Error)]
pub enum ClaimError {
    /// No claim with this code exists.
    #[error("claim code not found")]
    NotFound,

    /// The claim's validity window has elapsed.
    #[error("claim code expired")]
    Expired,

    /// The code was already exchanged for a host.
    #[error("claim code already redeemed")]
    AlreadyRedeemed,

    /// The issuer already has the maximum number of pending claims.
    #[error("active claim limit reached ({limit})")]
    ActiveLimitReached { limit: u32 },

    /// Code generation kept colliding with active claims.
    #[error("could not allocate an unused code after {attempts} attempts")]
    CodeExhausted { attempts: u32 },

    /// Transient persistence failure; safe to retry with backoff.
    #[error("storage unavailable: {0}")]
    StoreUnavailable(String),
}

impl From<sqlx::Error> for ClaimError {
    fn from(e: sqlx::Error) -> Self {
        Self::StoreUnavailable(e.to_string())
    }
}

impl From<netherlink_core::DatabaseError> for ClaimError {
    fn from(e: netherlink_core::DatabaseError) -> Self {
        Self::StoreUnavailable(e.to_string())
    }
}

/// Operator-facing view of where a claim is in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ClaimStatus {
    /// Issued, unredeemed, still inside its validity window.
    Pending,
    /// Never redeemed and the window has elapsed.
    Expired,
    /// Redeemed; a host record is bound to it.
    Linked,
}

impl ClaimStatus {
    /// Derive the status of a stored claim at time `now`.
    pub const fn of(claim: &HostClaim, now: i64) -> Self {
        if claim.redeemed_at.is_some() {
            Self::Linked
        } else if now >= claim.expires_at {
            Self::Expired
        } else {
            Self::Pending
        }
    }
}
