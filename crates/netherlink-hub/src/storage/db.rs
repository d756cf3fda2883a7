//! SQLite database for the Netherlink hub.

pub use netherlink_core::db::DatabaseError;

netherlink_core::define_database!(HubDatabase, "Hub database migrations complete");
