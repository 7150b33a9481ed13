//! Bearer token extractor
//!
//! Token enforcement is an exposed capability, not a blanket guarantee:
//! only handlers that take `AuthUser` require a valid token.

use axum::{
    extract::FromRequestParts,
    http::{header::AUTHORIZATION, request::Parts},
};
use serde::Serialize;
use std::collections::BTreeSet;

use crate::error::AppError;
use crate::state::HasServices;
use crate::token::Claims;

/// Authenticated caller extracted from a bearer token
#[derive(Debug, Clone, Serialize)]
pub struct AuthUser {
    /// Username from the token's `sub` claim
    pub username: String,
    /// Role names as minted into the token
    pub roles: BTreeSet<String>,
}

impl From<Claims> for AuthUser {
    fn from(claims: Claims) -> Self {
        Self {
            username: claims.sub,
            roles: claims.roles,
        }
    }
}

impl AuthUser {
    /// Check if the caller carries a specific role
    pub fn has_role(&self, role: &str) -> bool {
        self.roles.contains(role)
    }
}

/// Pull the bearer value out of the Authorization header
fn extract_bearer_token(parts: &Parts) -> Result<&str, AppError> {
    parts
        .headers
        .get(AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .ok_or_else(|| AppError::Unauthorized("Missing bearer token".to_string()))
}

impl<S> FromRequestParts<S> for AuthUser
where
    S: HasServices + Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let token = extract_bearer_token(parts)?;
        let claims = state.token_service().verify(token)?;
        Ok(AuthUser::from(claims))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn claims(roles: &[&str]) -> Claims {
        Claims {
            sub: "alice".to_string(),
            roles: roles.iter().map(|s| s.to_string()).collect(),
            iss: "wardgate-test".to_string(),
            iat: 0,
            exp: i64::MAX,
        }
    }

    #[test]
    fn test_auth_user_from_claims() {
        let user = AuthUser::from(claims(&["ADMIN", "NURSE"]));
        assert_eq!(user.username, "alice");
        assert!(user.has_role("ADMIN"));
        assert!(!user.has_role("DOCTOR"));
    }

    #[test]
    fn test_extract_bearer_token() {
        let request = axum::http::Request::builder()
            .header(AUTHORIZATION, "Bearer abc.def.ghi")
            .body(())
            .unwrap();
        let (parts, _) = request.into_parts();

        assert_eq!(extract_bearer_token(&parts).unwrap(), "abc.def.ghi");
    }

    #[test]
    fn test_extract_bearer_token_missing_header() {
        let request = axum::http::Request::builder().body(()).unwrap();
        let (parts, _) = request.into_parts();

        assert!(extract_bearer_token(&parts).is_err());
    }

    #[test]
    fn test_extract_bearer_token_wrong_scheme() {
        let request = axum::http::Request::builder()
            .header(AUTHORIZATION, "Basic dXNlcjpwYXNz")
            .body(())
            .unwrap();
        let (parts, _) = request.into_parts();

        assert!(extract_bearer_token(&parts).is_err());
    }
}
