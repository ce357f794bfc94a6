// src/models/user.rs

use serde::{Deserialize, Serialize};
use validator::Validate;

/// Which account collection a user belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Learner,
    Teacher,
}

impl Role {
    pub fn as_str(self) -> &'static str {
        match self {
            Role::Learner => "learner",
            Role::Teacher => "teacher",
        }
    }

    pub fn parse(input: &str) -> Option<Role> {
        match input {
            "learner" => Some(Role::Learner),
            "teacher" => Some(Role::Teacher),
            _ => None,
        }
    }
}

/// A stored account record. Lives in either the learner or the teacher collection.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Account {
    pub name: String,

    /// Trimmed and lower-cased; unique across both collections.
    pub email: String,

    /// Argon2 PHC string.
    pub password_hash: String,

    pub role: Role,

    pub created_at: chrono::DateTime<chrono::Utc>,
}

impl Account {
    pub fn profile(&self) -> CurrentUser {
        CurrentUser {
            name: self.name.clone(),
            email: self.email.clone(),
            role: self.role,
        }
    }
}

/// The signed-in identity: what the current-user record holds and what every
/// authenticated handler receives.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CurrentUser {
    pub name: String,
    pub email: String,
    pub role: Role,
}

pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

/// DTO for creating a new account (Registration).
#[derive(Debug, Deserialize, Validate)]
pub struct RegisterRequest {
    #[validate(length(
        min = 2,
        max = 60,
        message = "Name length must be between 2 and 60 characters."
    ))]
    pub name: String,
    #[validate(email(message = "A valid email address is required."))]
    pub email: String,
    #[validate(length(
        min = 6,
        max = 128,
        message = "Password length must be between 6 and 128 characters."
    ))]
    pub password: String,
    pub role: Role,
}

/// DTO for account login.
#[derive(Debug, Deserialize, Validate)]
pub struct LoginRequest {
    #[validate(length(min = 1, max = 254))]
    pub email: String,
    #[validate(length(min = 1, max = 128))]
    pub password: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct LoginResponse {
    pub token: String,
    #[serde(rename = "type")]
    pub token_type: String,
    pub user: CurrentUser,
}
