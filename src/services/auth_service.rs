//! Domain service for registration and authentication.
//!
//! Credentials are hashed with Argon2id; the role is decided once, at
//! registration, from the bootstrap admin name.

use thiserror::Error;

use crate::db::User;

/// Errors specific to authentication operations.
#[derive(Debug, Error)]
pub enum AuthError {
    #[error("Username already exists")]
    DuplicateUser(String),

    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Database error: {0}")]
    Database(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<sea_orm::DbErr> for AuthError {
    fn from(err: sea_orm::DbErr) -> Self {
        Self::Database(err.to_string())
    }
}

impl From<anyhow::Error> for AuthError {
    fn from(err: anyhow::Error) -> Self {
        Self::Internal(format!("{err:#}"))
    }
}

/// Usernames are case-insensitive identities.
#[must_use]
pub fn normalize_username(raw: &str) -> String {
    raw.trim().to_lowercase()
}

/// Domain service trait for authentication.
#[async_trait::async_trait]
pub trait AuthService: Send + Sync {
    /// Creates an account and returns the stored record.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::DuplicateUser`] if the lowercased name is taken.
    async fn register(&self, username: &str, password: &str) -> Result<User, AuthError>;

    /// Verifies credentials and returns the matching user.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::InvalidCredentials`] for an unknown user or wrong password.
    async fn authenticate(&self, username: &str, password: &str) -> Result<User, AuthError>;

    /// Every registered user, in registration order.
    async fn list_users(&self) -> Result<Vec<User>, AuthError>;
}
