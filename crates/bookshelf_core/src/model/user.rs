//! User account domain model.
//!
//! # Responsibility
//! - Define the stored account record plus registration, update and login
//!   payloads.
//!
//! # Invariants
//! - `role` is forced to [`DEFAULT_ROLE`] on registration and never comes from
//!   caller input.
//! - Inside the repository boundary `User::password` holds the credential
//!   hash; outside the service boundary it is always empty.
//!
//! # See also
//! - `service::user_service` for where the password is cleared.

use serde::{Deserialize, Serialize};

/// Store-assigned user identifier.
pub type UserId = i64;

/// Role assigned to every newly registered account.
pub const DEFAULT_ROLE: &str = "user";

/// Stored account record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: UserId,
    pub username: String,
    pub email: String,
    /// Credential hash while inside the store boundary; empty once returned.
    #[serde(default)]
    pub password: String,
    pub role: String,
}

impl User {
    /// Returns this record with the password field cleared.
    pub fn without_password(mut self) -> Self {
        self.password.clear();
        self
    }
}

/// Registration payload.
///
/// Carries no role: unknown JSON fields such as `role` are ignored on decode.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewUser {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

impl NewUser {
    pub fn new(
        username: impl Into<String>,
        email: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        Self {
            username: username.into(),
            email: email.into(),
            password: password.into(),
        }
    }
}

/// Sparse update payload; `None` leaves the stored field untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserUpdate {
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub password: Option<String>,
}

/// Credential check payload for login.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoginRequest {
    #[serde(default)]
    pub identifier: String,
    #[serde(default)]
    pub password: String,
}
