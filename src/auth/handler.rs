use axum::{Json, extract::State, response::Response};
use serde::Serialize;

use super::{Auth, AuthError, Credentials};
use crate::api::{bad_request, created, forbidden, internal_error, success};
use crate::handler::AppState;
use crate::unpack_error;

#[derive(Debug, Serialize)]
pub struct TokenResponse {
    pub access_token: String,
}

fn validate_credentials(input: &Credentials) -> Result<(), &'static str> {
    if input.email.is_empty() || !input.email.contains('@') {
        return Err("email is invalid");
    }
    if input.password.is_empty() {
        return Err("password is required");
    }
    Ok(())
}

pub async fn signup(State(state): State<AppState>, Json(payload): Json<Credentials>) -> Response {
    if let Err(msg) = validate_credentials(&payload) {
        return bad_request(msg);
    }

    let auth = Auth::new(state.db.connection());

    match auth.signup(payload).await {
        Ok(user) => created(user),
        Err(AuthError::CredentialsTaken) => forbidden("credentials taken"),
        Err(e) => {
            tracing::error!("failed to sign up: {}", unpack_error(&e));
            internal_error("failed to sign up")
        }
    }
}

pub async fn signin(State(state): State<AppState>, Json(payload): Json<Credentials>) -> Response {
    if let Err(msg) = validate_credentials(&payload) {
        return bad_request(msg);
    }

    let auth = Auth::with_session_ttl(state.db.connection(), state.session_ttl_hours);

    match auth.signin(payload).await {
        Ok(access_token) => success(TokenResponse { access_token }),
        Err(AuthError::CredentialsIncorrect) => forbidden("credentials incorrect"),
        Err(e) => {
            tracing::error!("failed to sign in: {}", unpack_error(&e));
            internal_error("failed to sign in")
        }
    }
}
