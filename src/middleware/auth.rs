use axum::{extract::FromRequestParts, http::request::Parts, http::HeaderMap};
use uuid::Uuid;

use crate::auth::{decode_jwt, Claims};
use crate::error::ApiError;

/// Authenticated caller identity extracted from a bearer JWT.
///
/// Handlers receive the principal as an explicit argument; nothing is stored
/// in ambient request state.
#[derive(Clone, Debug, PartialEq)]
pub struct Principal {
    pub id: Uuid,
    pub username: String,
}

impl From<Claims> for Principal {
    fn from(claims: Claims) -> Self {
        Self {
            id: claims.sub,
            username: claims.username,
        }
    }
}

/// Extractor for routes that require an authenticated caller.
/// Missing, invalid, expired, or inactive credentials reject with 401.
#[derive(Clone, Debug)]
pub struct AuthUser(pub Principal);

/// Extractor for routes that serve anonymous callers too. Absent credentials
/// resolve to `None`; so do invalid tokens and inactive accounts, which the
/// policy layer treats the same as anonymous.
#[derive(Clone, Debug)]
pub struct MaybePrincipal(pub Option<Principal>);

impl MaybePrincipal {
    pub fn as_ref(&self) -> Option<&Principal> {
        self.0.as_ref()
    }
}

#[axum::async_trait]
impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let token = extract_bearer_token(&parts.headers).map_err(ApiError::unauthorized)?;

        let claims = decode_jwt(&token)
            .map_err(|e| ApiError::unauthorized(format!("Invalid credentials: {}", e)))?;

        if !claims.active {
            return Err(ApiError::unauthorized("Account is inactive"));
        }

        Ok(AuthUser(Principal::from(claims)))
    }
}

#[axum::async_trait]
impl<S> FromRequestParts<S> for MaybePrincipal
where
    S: Send + Sync,
{
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let principal = extract_bearer_token(&parts.headers)
            .ok()
            .and_then(|token| decode_jwt(&token).ok())
            .filter(|claims| claims.active)
            .map(Principal::from);

        Ok(MaybePrincipal(principal))
    }
}

/// Extract the bearer token from the Authorization header
fn extract_bearer_token(headers: &HeaderMap) -> Result<String, String> {
    let auth_header = headers
        .get("authorization")
        .ok_or_else(|| "Missing Authorization header".to_string())?;

    let auth_str = auth_header
        .to_str()
        .map_err(|_| "Invalid Authorization header format".to_string())?;

    if let Some(token) = auth_str.strip_prefix("Bearer ") {
        if token.trim().is_empty() {
            return Err("Empty bearer token".to_string());
        }
        Ok(token.to_string())
    } else {
        Err("Authorization header must use Bearer token format".to_string())
    }
}
