//! HTTP error mapping for the hub API.
//!
//! Every failure carries a stable machine-readable `error` code; the claim
//! taxonomy is never collapsed into a generic failure, and failure bodies
//! never mention the issuing user.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;
use tracing::warn;

use crate::claim::ClaimError;
use crate::storage::DatabaseError;

/// API-level error outcomes.
#[derive(Debug)]
pub enum ApiError {
    /// Missing or invalid bearer token on an operator endpoint.
    Unauthorized,
    /// Unknown claim code or host id.
    NotFound,
    /// The claim's validity window has elapsed.
    Expired,
    /// The claim was already exchanged for a host.
    AlreadyRedeemed,
    /// The caller holds too many pending claims.
    TooManyActiveClaims { limit: u32 },
    /// Transient persistence failure; safe to retry with backoff.
    StoreUnavailable(String),
}

impl From<ClaimError> for ApiError {
    fn from(e: ClaimError) -> Self {
        match e {
            ClaimError::NotFound => Self::NotFound,
            ClaimError::Expired => Self::Expired,
            ClaimError::AlreadyRedeemed => Self::AlreadyRedeemed,
            ClaimError::ActiveLimitReached { limit } => Self::TooManyActiveClaims { limit },
            ClaimError::CodeExhausted { .. } | ClaimError::StoreUnavailable(_) => {
                Self::StoreUnavailable(e.to_string())
            }
        }
    }
}

impl From<DatabaseError> for ApiError {
    fn from(e: DatabaseError) -> Self {
        match e {
            DatabaseError::NotFound(_) => Self::NotFound,
            _ => Self::StoreUnavailable(e.to_string()),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self {
            Self::Unauthorized => (
                StatusCode::UNAUTHORIZED,
                Json(json!({ "error": "unauthorized" })),
            )
                .into_response(),
            Self::NotFound => (
                StatusCode::NOT_FOUND,
                Json(json!({ "error": "not_found" })),
            )
                .into_response(),
            Self::Expired => (StatusCode::GONE, Json(json!({ "error": "expired" }))).into_response(),
            Self::AlreadyRedeemed => (
                StatusCode::CONFLICT,
                Json(json!({ "error": "already_redeemed" })),
            )
                .into_response(),
            Self::TooManyActiveClaims { limit } => (
                StatusCode::TOO_MANY_REQUESTS,
                Json(json!({ "error": "too_many_active_claims", "limit": limit })),
            )
                .into_response(),
            Self::StoreUnavailable(detail) => {
                warn!(error = %detail, "storage unavailable");
                (
                    StatusCode::SERVICE_UNAVAILABLE,
                    Json(json!({ "error": "store_unavailable" })),
                )
                    .into_response()
            }
        }
    }
}
