//! # Authentication Backend Contract

use crate::rpc::{call, BoxedChannel, RpcResult};
use serde::{Deserialize, Serialize};

/// User registration payload
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RegisterRequest {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
    #[serde(default)]
    pub phone: String,
    #[serde(default)]
    pub date_of_birth: String,
    #[serde(default)]
    pub street_line1: String,
    #[serde(default)]
    pub street_line2: String,
    #[serde(default)]
    pub city: String,
    #[serde(default)]
    pub province: String,
    #[serde(default)]
    pub postal_code: String,
    #[serde(default)]
    pub country: String,
}

/// Login with email or username
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LoginRequest {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: String,
}

#[derive(Debug, Serialize)]
struct VerifyTokenRequest<'a> {
    token: &'a str,
}

/// Client for `auth.AuthService`
#[derive(Clone)]
pub struct AuthClient {
    channel: BoxedChannel,
}

impl AuthClient {
    pub const SERVICE: &'static str = "auth.AuthService";

    pub fn new(channel: BoxedChannel) -> Self {
        Self { channel }
    }

    pub async fn register(&self, request: &RegisterRequest) -> RpcResult {
        call(&*self.channel, "Register", request).await
    }

    pub async fn login(&self, request: &LoginRequest) -> RpcResult {
        call(&*self.channel, "Login", request).await
    }

    /// Reply payload carries `user_id` and `role` on success
    pub async fn verify_token(&self, token: &str) -> RpcResult {
        call(&*self.channel, "VerifyToken", &VerifyTokenRequest { token }).await
    }
}
