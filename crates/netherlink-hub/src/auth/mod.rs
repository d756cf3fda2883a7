//! Authentication for operator endpoints.
//!
//! The hub does not manage login sessions itself; it validates bearer tokens
//! minted by the surrounding session provider using a shared secret.

pub mod claims;
pub mod extract;
pub mod jwt;

pub use claims::Claims;
pub use extract::AuthUser;
pub use jwt::JwtManager;
