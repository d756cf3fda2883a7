//! Claim issuance endpoints (operator-facing, authenticated).

use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use serde::Serialize;
use tracing::{info, instrument};

use netherlink_core::db::unix_timestamp;

use crate::auth::AuthUser;
use crate::claim::ClaimStatus;
use crate::storage::HostClaim;

use super::AppState;
use super::error::ApiError;

/// Freshly issued claim, surfaced verbatim for the operator to copy into the
/// remote host's configuration.
#[derive(Debug, Serialize)]
pub struct IssuedClaim {
    pub code: String,
    pub expires_at: i64,
}

/// Status view of one claim, for "still waiting" / "expired" / "linked"
/// display.
#[derive(Debug, Serialize)]
pub struct ClaimView {
    pub code: String,
    pub status: ClaimStatus,
    pub issued_at: i64,
    pub expires_at: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub host_id: Option<String>,
}

impl ClaimView {
    fn from_claim(claim: HostClaim, now: i64) -> Self {
        Self {
            status: ClaimStatus::of(&claim, now),
            code: claim.code,
            issued_at: claim.issued_at,
            expires_at: claim.expires_at,
            host_id: claim.host_id,
        }
    }
}

/// `POST /v1/claims` — mint a new claim code for the caller.
#[instrument(skip(state, user), fields(user_id = %user.0.sub))]
pub async fn create_claim(
    State(state): State<AppState>,
    user: AuthUser,
) -> Result<(StatusCode, Json<IssuedClaim>), ApiError> {
    let claim = state
        .db
        .create_claim(&user.0.sub, state.claim_ttl_secs, state.max_active_claims)
        .await?;

    info!(expires_at = claim.expires_at, "Claim issued");

    Ok((
        StatusCode::CREATED,
        Json(IssuedClaim {
            code: claim.code,
            expires_at: claim.expires_at,
        }),
    ))
}

/// `GET /v1/claims` — the caller's claims, newest first.
#[instrument(skip(state, user), fields(user_id = %user.0.sub))]
pub async fn list_claims(
    State(state): State<AppState>,
    user: AuthUser,
) -> Result<Json<Vec<ClaimView>>, ApiError> {
    let now = unix_timestamp();
    let claims = state.db.list_claims(&user.0.sub).await?;

    Ok(Json(
        claims
            .into_iter()
            .map(|c| ClaimView::from_claim(c, now))
            .collect(),
    ))
}

/// `GET /v1/claims/{code}` — status of one of the caller's claims.
#[instrument(skip(state, user, code), fields(user_id = %user.0.sub))]
pub async fn get_claim(
    State(state): State<AppState>,
    user: AuthUser,
    Path(code): Path<String>,
) -> Result<Json<ClaimView>, ApiError> {
    let claim = state.db.get_claim(&code, &user.0.sub).await?;

    Ok(Json(ClaimView::from_claim(claim, unix_timestamp())))
}

/// `DELETE /v1/claims/{code}` — revoke a still-pending claim.
#[instrument(skip(state, user, code), fields(user_id = %user.0.sub))]
pub async fn revoke_claim(
    State(state): State<AppState>,
    user: AuthUser,
    Path(code): Path<String>,
) -> Result<StatusCode, ApiError> {
    if state.db.revoke_claim(&code, &user.0.sub).await? {
        info!("Claim revoked");
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(ApiError::NotFound)
    }
}
