use axum::{
    async_trait,
    extract::FromRequestParts,
    http::{header, request::Parts},
    response::Response,
};

use super::{Auth, User};
use crate::api::{internal_error, unauthorized};
use crate::handler::AppState;
use crate::unpack_error;

/// Authenticated caller, resolved from the `Authorization: Bearer <token>`
/// header. Handlers take this as an extractor; routes without it are public.
#[derive(Debug, Clone)]
pub struct AuthUser(pub User);

#[async_trait]
impl FromRequestParts<AppState> for AuthUser {
    type Rejection = Response;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let token = parts
            .headers
            .get(header::AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .and_then(|value| value.strip_prefix("Bearer "))
            .ok_or_else(|| unauthorized("missing bearer token"))?;

        let auth = Auth::new(state.db.connection());

        match auth.resolve_token(token).await {
            Ok(Some(user)) => Ok(AuthUser(user)),
            Ok(None) => Err(unauthorized("invalid or expired token")),
            Err(e) => {
                tracing::error!("failed to resolve bearer token: {}", unpack_error(&e));
                Err(internal_error("failed to resolve bearer token"))
            }
        }
    }
}
