//! Redemption and host registry endpoints.

use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use serde::Deserialize;
use tracing::{info, instrument};

use crate::auth::AuthUser;
use crate::storage::{Host, HostDescriptor};

use super::AppState;
use super::error::ApiError;

/// Redemption request sent by the host agent itself.
#[derive(Debug, Deserialize)]
pub struct RedeemRequest {
    pub code: String,
    #[serde(flatten)]
    pub host: HostDescriptor,
}

/// `POST /v1/hosts/redeem` — exchange a claim code for a host registration.
///
/// Reachable without a session; the code itself is the credential. The agent
/// retains the returned host id for heartbeat calls.
#[instrument(skip(state, req))]
pub async fn redeem(
    State(state): State<AppState>,
    Json(req): Json<RedeemRequest>,
) -> Result<(StatusCode, Json<Host>), ApiError> {
    let host = state.db.redeem_claim(&req.code, &req.host).await?;

    info!(host_id = %host.id, name = %host.name, "Host linked");

    Ok((StatusCode::CREATED, Json(host)))
}

/// `GET /v1/hosts` — the caller's registered hosts, newest first.
#[instrument(skip(state, user), fields(user_id = %user.0.sub))]
pub async fn list_hosts(
    State(state): State<AppState>,
    user: AuthUser,
) -> Result<Json<Vec<Host>>, ApiError> {
    let hosts = state.db.list_hosts(&user.0.sub).await?;
    Ok(Json(hosts))
}

/// `POST /v1/hosts/{id}/heartbeat` — agent liveness ping.
#[instrument(skip(state, id))]
pub async fn heartbeat(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    if state.db.touch_host_heartbeat(&id).await? {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(ApiError::NotFound)
    }
}
