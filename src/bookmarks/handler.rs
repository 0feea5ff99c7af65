use axum::{
    Json,
    extract::{Path, State},
    response::Response,
};

use super::{Bookmarks, CreateBookmark, UpdateBookmark};
use crate::api::{bad_request, created, internal_error, no_content, not_found, success};
use crate::auth::AuthUser;
use crate::handler::AppState;
use crate::unpack_error;

pub async fn list_bookmarks(State(state): State<AppState>, AuthUser(user): AuthUser) -> Response {
    let lib = Bookmarks::new(state.db.connection());

    match lib.list(user.id).await {
        Ok(bookmarks) => success(bookmarks),
        Err(e) => {
            tracing::error!("failed to list bookmarks for user {}: {}", user.id, unpack_error(&*e));
            internal_error("failed to list bookmarks")
        }
    }
}

/// Absent (or not owned) resolves to a 200 with null data, matching the
/// list/get contract; only mutations answer 404.
pub async fn get_bookmark(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Path(id): Path<i32>,
) -> Response {
    let lib = Bookmarks::new(state.db.connection());

    match lib.get_by_id(user.id, id).await {
        Ok(bookmark) => success(bookmark),
        Err(e) => {
            tracing::error!("failed to get bookmark {}: {}", id, unpack_error(&*e));
            internal_error("failed to get bookmark")
        }
    }
}

pub async fn create_bookmark(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Json(payload): Json<CreateBookmark>,
) -> Response {
    if payload.title.is_empty() {
        return bad_request("title is required");
    }
    if payload.link.is_empty() {
        return bad_request("link is required");
    }

    let lib = Bookmarks::new(state.db.connection());

    match lib.create(user.id, payload).await {
        Ok(bookmark) => created(bookmark),
        Err(e) => {
            tracing::error!("failed to create bookmark for user {}: {}", user.id, unpack_error(&*e));
            internal_error("failed to create bookmark")
        }
    }
}

pub async fn update_bookmark(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Path(id): Path<i32>,
    Json(payload): Json<UpdateBookmark>,
) -> Response {
    let lib = Bookmarks::new(state.db.connection());

    match lib.update(user.id, id, payload).await {
        Ok(Some(bookmark)) => success(bookmark),
        Ok(None) => not_found("bookmark not found"),
        Err(e) => {
            tracing::error!("failed to update bookmark {}: {}", id, unpack_error(&*e));
            internal_error("failed to update bookmark")
        }
    }
}

pub async fn delete_bookmark(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Path(id): Path<i32>,
) -> Response {
    let lib = Bookmarks::new(state.db.connection());

    match lib.delete(user.id, id).await {
        Ok(Some(_)) => no_content(),
        Ok(None) => not_found("bookmark not found"),
        Err(e) => {
            tracing::error!("failed to delete bookmark {}: {}", id, unpack_error(&*e));
            internal_error("failed to delete bookmark")
        }
    }
}
