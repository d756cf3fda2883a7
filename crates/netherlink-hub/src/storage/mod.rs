//! SQLite storage for the Netherlink hub.
//!
//! Provides persistence for host claims and the host registry. The claims
//! table is owned exclusively by this module; all state transitions go
//! through its queries.

mod db;
mod models;
mod queries;


pub use db::{DatabaseError, HubDatabase};
pub use models::*;
