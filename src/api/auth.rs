//! Registration, login and introspection handlers

use crate::domain::{LoginInput, RegisterInput, UserWithRoles};
use crate::error::Result;
use crate::middleware::AuthUser;
use crate::state::HasServices;
use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

#[derive(Debug, Serialize, Deserialize)]
pub struct LoginResponse {
    pub token: String,
    pub roles: Vec<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct MeResponse {
    pub username: String,
    pub roles: Vec<String>,
}

/// Create a user and attach its roles
pub async fn register<S: HasServices>(
    State(state): State<S>,
    Json(input): Json<RegisterInput>,
) -> Result<Json<UserWithRoles>> {
    let user = state.auth_service().register(input).await?;
    Ok(Json(user))
}

/// Verify credentials and issue a signed token
pub async fn login<S: HasServices>(
    State(state): State<S>,
    Json(input): Json<LoginInput>,
) -> Result<Json<LoginResponse>> {
    let UserWithRoles { user, roles } = state.auth_service().authenticate(input).await?;
    let role_set: BTreeSet<String> = roles.iter().cloned().collect();
    let token = state.token_service().mint(&user.username, role_set)?;
    Ok(Json(LoginResponse { token, roles }))
}

/// Return the identity carried by the presented token
pub async fn me(auth: AuthUser) -> Json<MeResponse> {
    Json(MeResponse {
        username: auth.username,
        roles: auth.roles.into_iter().collect(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_login_response_serialization() {
        let response = LoginResponse {
            token: "abc.def.ghi".to_string(),
            roles: vec!["ADMIN".to_string()],
        };

        let json = serde_json::to_string(&response).unwrap();
        assert!(json.contains("abc.def.ghi"));
        assert!(json.contains("ADMIN"));
    }

    #[test]
    fn test_me_response_roles_are_plain_strings() {
        let response = MeResponse {
            username: "alice".to_string(),
            roles: vec!["ADMIN".to_string(), "USER".to_string()],
        };

        let json = serde_json::to_value(&response).unwrap();
        assert_eq!(json["roles"][0], "ADMIN");
        assert_eq!(json["roles"][1], "USER");
    }
}
