//! Data models for Netherlink hub storage.

use serde::{Deserialize, Serialize};

/// A single-use authorization token binding one remote host to one account.
///
/// Rows are never deleted; redeemed and expired claims stay behind for audit.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct HostClaim {
    pub id: String,
    pub code: String,
    pub issued_by: String,
    pub issued_at: i64,
    pub expires_at: i64,
    pub redeemed_at: Option<i64>,
    pub host_id: Option<String>,
}

/// A registered host agent.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Host {
    pub id: String,
    pub name: String,
    pub description: Option<String>,
    pub domain_cert: Option<String>,
    pub owner_id: String,
    pub verified: i64,
    pub last_heartbeat: Option<i64>,
    pub created_at: i64,
}

/// Host-supplied attributes presented at redemption time.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HostDescriptor {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub domain_cert: Option<String>,
}
