use std::fmt;

use serde::{Deserialize, Serialize};

/// A simulated account whose credentials are derived from its numeric id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SimulatedUser {
    pub id: u32,
}

impl SimulatedUser {
    pub fn new(id: u32) -> Self {
        Self { id }
    }

    pub fn username(&self) -> String {
        format!("user{}", self.id)
    }

    pub fn email(&self) -> String {
        format!("user{}@example.com", self.id)
    }

    pub fn password(&self) -> String {
        format!("password{}", self.id)
    }

    pub fn register_request(&self) -> RegisterRequest {
        RegisterRequest {
            username: self.username(),
            email: self.email(),
            password: self.password(),
        }
    }

    pub fn login_request(&self) -> LoginRequest {
        LoginRequest {
            username: self.username(),
            password: self.password(),
        }
    }
}

impl fmt::Display for SimulatedUser {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "User {}", self.id)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegisterRequest {
    pub username: String,
    pub email: String,
    pub password: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RegisterResponse {
    #[serde(default)]
    pub message: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginResponse {
    pub access_token: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserProfile {
    pub id: i64,
    pub username: String,
    pub email: String,
}

/// Bearer token handed out by the user service at login.
#[derive(Clone, PartialEq, Eq)]
pub struct AuthToken(String);

impl AuthToken {
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn bearer(&self) -> String {
        format!("Bearer {}", self.0)
    }
}

impl From<LoginResponse> for AuthToken {
    fn from(response: LoginResponse) -> Self {
        Self(response.access_token)
    }
}

// Tokens end up in logs via `{:?}` on sessions; keep them out.
impl fmt::Debug for AuthToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("AuthToken(***)")
    }
}
