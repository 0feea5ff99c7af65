use axum::{Json, extract::State, response::Response};

use super::{UpdateUser, UserError, Users};
use crate::api::{bad_request, forbidden, internal_error, not_found, success};
use crate::auth::AuthUser;
use crate::handler::AppState;
use crate::unpack_error;

pub async fn get_me(AuthUser(user): AuthUser) -> Response {
    success(user)
}

pub async fn update_me(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Json(payload): Json<UpdateUser>,
) -> Response {
    if let Some(email) = &payload.email {
        if email.is_empty() || !email.contains('@') {
            return bad_request("email is invalid");
        }
    }

    let users = Users::new(state.db.connection());

    match users.update(user.id, payload).await {
        Ok(Some(updated)) => success(updated),
        Ok(None) => not_found("user not found"),
        Err(UserError::EmailTaken) => forbidden("email taken"),
        Err(e) => {
            tracing::error!("failed to update user {}: {}", user.id, unpack_error(&e));
            internal_error("failed to update user")
        }
    }
}
