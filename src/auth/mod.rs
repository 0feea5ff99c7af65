//! Auth Module
//!
//! Signup/signin plus bearer-token resolution for the rest of the API.
//! Tokens are opaque session tokens: the raw token goes to the client,
//! only its SHA-256 digest is stored, and every session carries an expiry.
//!
//! # Usage
//!
//! ```rust,ignore
//! use signet::auth;
//!
//! let app = Router::new()
//!     .nest("/auth", auth::routes())
//!     .with_state(app_state);
//! ```

mod extract;
mod handler;
mod lib;
mod routes;

pub use extract::AuthUser;
pub use lib::*;
pub use routes::routes;

/// Returns the migrations for the auth module.
///
/// These should be run during application startup, before any other
/// module's migrations (the users table is referenced elsewhere).
pub fn migrations() -> &'static [(&'static str, &'static str)] {
    &[
        ("auth_001_users.sql", include_str!("migrations/001_users.sql")),
        ("auth_002_sessions.sql", include_str!("migrations/002_sessions.sql")),
    ]
}
