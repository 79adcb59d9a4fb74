use serde::{Deserialize, Serialize};

use crate::accounts::PublicAccount;

/// Request body for signup.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SignupRequest {
    pub username: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
}

/// Request body for password login.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Profile as reported by the identity provider after a federated sign-in.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct GoogleRequest {
    pub name: Option<String>,
    pub email: String,
    pub photo: Option<String>,
}

/// Plain confirmation body.
#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub success: bool,
    pub message: String,
}

impl MessageResponse {
    pub fn ok(message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: message.into(),
        }
    }
}

/// Returned when a session is issued; the account fields sit at top level.
#[derive(Debug, Serialize)]
pub struct SessionResponse {
    pub success: bool,
    pub message: String,
    #[serde(flatten)]
    pub account: PublicAccount,
}
