//! Authenticated user and login DTOs.

use serde::{Deserialize, Serialize};

use crate::types::EntityId;

/// The signed-in user as returned by `GET /api/auth/me`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: EntityId,
    pub email: String,
    pub username: String,
    #[serde(default = "default_active")]
    pub is_active: bool,
}

fn default_active() -> bool {
    true
}

/// Body of `POST /api/auth/google`: the identity-provider ID token.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GoogleLogin {
    #[serde(rename = "idToken")]
    pub id_token: String,
}

/// Bearer token issued by the backend.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenResponse {
    pub access_token: String,
    #[serde(default = "default_token_type")]
    pub token_type: String,
}

fn default_token_type() -> String {
    "bearer".to_string()
}
