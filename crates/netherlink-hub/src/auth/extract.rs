//! Bearer-token extraction for operator endpoints.

use axum::extract::FromRequestParts;
use axum::http::request::Parts;

use crate::server::{ApiError, AppState};

use super::claims::Claims;

/// Authenticated caller identity, extracted from the `Authorization` header.
///
/// Endpoints taking this extractor reject anonymous callers with a 401
/// before the handler body runs.
pub struct AuthUser(pub Claims);

impl FromRequestParts<AppState> for AuthUser {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let token = parts
            .headers
            .get("authorization")
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.strip_prefix("Bearer "))
            .ok_or(ApiError::Unauthorized)?;

        let claims = state
            .jwt
            .validate(token)
            .map_err(|_| ApiError::Unauthorized)?;

        if !claims.is_access() {
            return Err(ApiError::Unauthorized);
        }

        Ok(Self(claims))
    }
}
