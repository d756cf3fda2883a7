//! `Netherlink` Core Library
//!
//! Shared functionality for `Netherlink` components:
//! - `SQLite` pool helpers and common database errors
//! - Tracing/logging initialization

pub mod db;
pub mod tracing_init;

pub use db::{DatabaseError, unix_timestamp};
