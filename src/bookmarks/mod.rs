//! Bookmarks Module
//!
//! Per-user CRUD over bookmark records (title, optional description, link).
//! Every operation is scoped to the requesting user: a bookmark is only ever
//! visible to, and mutable by, the user who created it. Lookups by another
//! user behave exactly like lookups of a record that does not exist, so the
//! existence of someone else's bookmark is never revealed.
//!
//! # Usage
//!
//! ```rust,ignore
//! use signet::bookmarks;
//!
//! let app = Router::new()
//!     .nest("/bookmarks", bookmarks::routes())
//!     .with_state(app_state);
//! ```

mod handler;
mod lib;
mod routes;

pub use lib::*;
pub use routes::routes;

/// Returns the migrations for the bookmarks module.
pub fn migrations() -> &'static [(&'static str, &'static str)] {
    &[(
        "bookmarks_001_schema.sql",
        include_str!("migrations/001_schema.sql"),
    )]
}
