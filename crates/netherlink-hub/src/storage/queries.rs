//! Database queries for the Netherlink hub.

use netherlink_core::db::unix_timestamp;

use crate::claim::{ClaimError, code};

use super::db::{DatabaseError, HubDatabase};
use super::models::{Host, HostClaim, HostDescriptor};

/// How many freshly generated codes to try before giving up on insertion.
const MAX_CODE_ATTEMPTS: u32 = 5;

impl HubDatabase {
    // =========================================================================
    // Claim queries
    // =========================================================================

    /// Issue a new claim for `issued_by`, valid for `ttl_secs`.
    ///
    /// Generates a fresh code and retries on collision against currently
    /// active (unexpired, unredeemed) claims. `max_active` caps how many
    /// pending claims a single user may hold at once.
    pub async fn create_claim(
        &self,
        issued_by: &str,
        ttl_secs: i64,
        max_active: u32,
    ) -> Result<HostClaim, ClaimError> {
        let active = self.count_active_claims(issued_by).await?;
        if active >= i64::from(max_active) {
            return Err(ClaimError::ActiveLimitReached { limit: max_active });
        }

        for _ in 0..MAX_CODE_ATTEMPTS {
            let candidate = code::generate_code();
            if let Some(claim) = self.try_insert_claim(&candidate, issued_by, ttl_secs).await? {
                return Ok(claim);
            }
        }

        Err(ClaimError::CodeExhausted {
            attempts: MAX_CODE_ATTEMPTS,
        })
    }

    /// Insert a claim with the given code unless an active claim already
    /// carries it. Returns `None` on collision.
    ///
    /// The collision check and the insert share one transaction, so two
    /// issuers can never both hold the same active code.
    pub async fn try_insert_claim(
        &self,
        claim_code: &str,
        issued_by: &str,
        ttl_secs: i64,
    ) -> Result<Option<HostClaim>, ClaimError> {
        let now = unix_timestamp();
        let mut tx = self.pool().begin().await?;

        let collision: Option<(i64,)> = sqlx::query_as(
            "SELECT 1 FROM host_claims WHERE code = ? AND redeemed_at IS NULL AND expires_at > ? LIMIT 1",
        )
        .bind(claim_code)
        .bind(now)
        .fetch_optional(&mut *tx)
        .await?;

        if collision.is_some() {
            return Ok(None);
        }

        let id = uuid::Uuid::new_v4().to_string();
        sqlx::query(
            "INSERT INTO host_claims (id, code, issued_by, issued_at, expires_at) VALUES (?, ?, ?, ?, ?)",
        )
        .bind(&id)
        .bind(claim_code)
        .bind(issued_by)
        .bind(now)
        .bind(now + ttl_secs)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;

        let claim = sqlx::query_as::<_, HostClaim>("SELECT * FROM host_claims WHERE id = ?")
            .bind(&id)
            .fetch_one(self.pool())
            .await?;
        Ok(Some(claim))
    }

    /// Exchange a valid code for a newly registered host.
    ///
    /// Runs in a single transaction: the host row and the claim's
    /// `redeemed_at`/`host_id` transition commit together or not at all. The
    /// conditional update is the authoritative check; under concurrent
    /// redemption of the same code exactly one caller wins and the rest see
    /// [`ClaimError::AlreadyRedeemed`].
    pub async fn redeem_claim(
        &self,
        claim_code: &str,
        descriptor: &HostDescriptor,
    ) -> Result<Host, ClaimError> {
        let now = unix_timestamp();
        let mut tx = self.pool().begin().await?;

        // Active codes are unique, and only the newest row for a code can be
        // active, so the newest row decides which failure the caller sees.
        let claim = sqlx::query_as::<_, HostClaim>(
            "SELECT * FROM host_claims WHERE code = ? ORDER BY issued_at DESC, id DESC LIMIT 1",
        )
        .bind(claim_code)
        .fetch_optional(&mut *tx)
        .await?;

        let Some(claim) = claim else {
            return Err(ClaimError::NotFound);
        };
        if claim.redeemed_at.is_some() {
            return Err(ClaimError::AlreadyRedeemed);
        }
        if now >= claim.expires_at {
            return Err(ClaimError::Expired);
        }

        let host_id = uuid::Uuid::new_v4().to_string();
        sqlx::query(
            "INSERT INTO netherhosts (id, name, description, domain_cert, owner_id, verified, created_at) VALUES (?, ?, ?, ?, ?, 1, ?)",
        )
        .bind(&host_id)
        .bind(&descriptor.name)
        .bind(&descriptor.description)
        .bind(&descriptor.domain_cert)
        .bind(&claim.issued_by)
        .bind(now)
        .execute(&mut *tx)
        .await?;

        let updated = sqlx::query(
            "UPDATE host_claims SET redeemed_at = ?, host_id = ? WHERE id = ? AND redeemed_at IS NULL AND expires_at > ?",
        )
        .bind(now)
        .bind(&host_id)
        .bind(&claim.id)
        .bind(now)
        .execute(&mut *tx)
        .await?;

        if updated.rows_affected() == 0 {
            // Lost the race; the uncommitted host row rolls back with the
            // transaction.
            return Err(ClaimError::AlreadyRedeemed);
        }

        tx.commit().await?;

        self.get_host(&host_id).await.map_err(ClaimError::from)
    }

    /// Look up the issuer's own claim by code, for status display.
    pub async fn get_claim(&self, claim_code: &str, issued_by: &str) -> Result<HostClaim, ClaimError> {
        sqlx::query_as::<_, HostClaim>(
            "SELECT * FROM host_claims WHERE code = ? AND issued_by = ? ORDER BY issued_at DESC, id DESC LIMIT 1",
        )
        .bind(claim_code)
        .bind(issued_by)
        .fetch_optional(self.pool())
        .await?
        .ok_or(ClaimError::NotFound)
    }

    /// List a user's claims, newest first.
    pub async fn list_claims(&self, issued_by: &str) -> Result<Vec<HostClaim>, ClaimError> {
        let claims = sqlx::query_as::<_, HostClaim>(
            "SELECT * FROM host_claims WHERE issued_by = ? ORDER BY issued_at DESC, id DESC",
        )
        .bind(issued_by)
        .fetch_all(self.pool())
        .await?;

        Ok(claims)
    }

    /// Revoke a still-pending claim by forcing its expiry to now.
    ///
    /// Only the issuer may revoke, and only while the claim is unredeemed and
    /// inside its window. Returns whether a claim was revoked.
    pub async fn revoke_claim(&self, claim_code: &str, issued_by: &str) -> Result<bool, ClaimError> {
        let now = unix_timestamp();
        let result = sqlx::query(
            "UPDATE host_claims SET expires_at = ? WHERE code = ? AND issued_by = ? AND redeemed_at IS NULL AND expires_at > ?",
        )
        .bind(now)
        .bind(claim_code)
        .bind(issued_by)
        .bind(now)
        .execute(self.pool())
        .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Count a user's active (unexpired, unredeemed) claims.
    pub async fn count_active_claims(&self, issued_by: &str) -> Result<i64, ClaimError> {
        let now = unix_timestamp();
        let row: (i64,) = sqlx::query_as(
            "SELECT COUNT(*) FROM host_claims WHERE issued_by = ? AND redeemed_at IS NULL AND expires_at > ?",
        )
        .bind(issued_by)
        .bind(now)
        .fetch_one(self.pool())
        .await?;

        Ok(row.0)
    }

    // =========================================================================
    // Host queries
    // =========================================================================

    /// Get a host by ID.
    pub async fn get_host(&self, id: &str) -> Result<Host, DatabaseError> {
        sqlx::query_as::<_, Host>("SELECT * FROM netherhosts WHERE id = ?")
            .bind(id)
            .fetch_optional(self.pool())
            .await?
            .ok_or_else(|| DatabaseError::NotFound(format!("Host {id}")))
    }

    /// List hosts for an owner, newest first.
    pub async fn list_hosts(&self, owner_id: &str) -> Result<Vec<Host>, DatabaseError> {
        let hosts = sqlx::query_as::<_, Host>(
            "SELECT * FROM netherhosts WHERE owner_id = ? ORDER BY created_at DESC, id DESC",
        )
        .bind(owner_id)
        .fetch_all(self.pool())
        .await?;

        Ok(hosts)
    }

    /// Update a host's `last_heartbeat` timestamp. Returns whether the host
    /// exists.
    pub async fn touch_host_heartbeat(&self, id: &str) -> Result<bool, DatabaseError> {
        let now = unix_timestamp();

        let result = sqlx::query("UPDATE netherhosts SET last_heartbeat = ? WHERE id = ?")
            .bind(now)
            .bind(id)
            .execute(self.pool())
            .await?;

        Ok(result.rows_affected() > 0)
    }
}
