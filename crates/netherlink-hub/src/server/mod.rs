//! HTTP API for the Netherlink hub.

mod claims;
mod error;
mod hosts;

pub use error::ApiError;

use std::sync::Arc;

use axum::Router;
use axum::routing::{get, post};
use tower_http::cors::CorsLayer;

use crate::auth::JwtManager;
use crate::storage::HubDatabase;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub db: HubDatabase,
    pub jwt: Arc<JwtManager>,
    /// Validity window for freshly issued claims, in seconds.
    pub claim_ttl_secs: i64,
    /// Cap on concurrently-active claims per user.
    pub max_active_claims: u32,
}

/// `GET /healthz`
async fn healthz() -> &'static str {
    "ok"
}

/// Build the hub router.
///
/// The dashboard calls the operator endpoints from the browser, so CORS is
/// permissive; redemption and heartbeat carry their own credential (the
/// claim code and the host id) instead of a session.
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/healthz", get(healthz))
        .route(
            "/v1/claims",
            post(claims::create_claim).get(claims::list_claims),
        )
        .route(
            "/v1/claims/{code}",
            get(claims::get_claim).delete(claims::revoke_claim),
        )
        .route("/v1/hosts", get(hosts::list_hosts))
        .route("/v1/hosts/redeem", post(hosts::redeem))
        .route("/v1/hosts/{id}/heartbeat", post(hosts::heartbeat))
        .layer(CorsLayer::permissive())
        .with_state(state)
}
