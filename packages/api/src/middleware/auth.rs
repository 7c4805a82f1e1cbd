use axum::{extract::FromRequestParts, http::request::Parts};
use jsonwebtoken::{decode, DecodingKey, Validation};
use serde::Deserialize;

use crate::{error::ApiError, state::AppState};

#[derive(Debug, Deserialize)]
struct Claims {
    sub: String,
    #[allow(dead_code)]
    exp: usize,
}

/// Caller identity taken from the Authorization bearer token. Requests
/// without a valid token are rejected before any state change.
#[derive(Debug, Clone)]
pub struct AuthenticatedUser {
    pub user_id: String,
}

impl FromRequestParts<AppState> for AuthenticatedUser {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let auth_header = parts
            .headers
            .get("Authorization")
            .ok_or(ApiError::NotAuthenticated)?
            .to_str()
            .map_err(|_| ApiError::NotAuthenticated)?;

        let token = auth_header
            .strip_prefix("Bearer ")
            .ok_or(ApiError::NotAuthenticated)?;

        let user_id = user_id_from_token(token, &state.jwt_secret)?;
        Ok(AuthenticatedUser { user_id })
    }
}

pub fn user_id_from_token(token: &str, secret: &str) -> Result<String, ApiError> {
    let token_data = decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &Validation::default(),
    )
    .map_err(|_| ApiError::NotAuthenticated)?;

    if token_data.claims.sub.is_empty() {
        return Err(ApiError::NotAuthenticated);
    }
    Ok(token_data.claims.sub)
}
