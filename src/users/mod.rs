//! Users Module
//!
//! Profile routes for the authenticated user (`/users/me`). The users table
//! itself is owned by the auth module's migrations.

mod handler;
mod lib;
mod routes;

pub use lib::*;
pub use routes::routes;
