use std::sync::Arc;

use axum::{Json, Router, response::IntoResponse, routing::get};
use tracing::info;

use crate::api::ApiResponse;
use crate::db::Database;

#[derive(Clone)]
pub struct AppState {
    pub db: Arc<Database>,
    pub session_ttl_hours: i64,
}

/// Assembles every module's routes into the application router. The caller
/// supplies the state (and any outer layers such as CORS).
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(healthcheck))
        .nest("/auth", crate::auth::routes())
        .nest("/users", crate::users::routes())
        .nest("/bookmarks", crate::bookmarks::routes())
}

pub async fn healthcheck() -> impl IntoResponse {
    info!("got healthcheck request");
    Json(ApiResponse { data: "ok" })
}
