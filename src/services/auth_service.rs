//! Domain service for signup, signin, and password updates.

use thiserror::Error;

use crate::db::UserDirectoryError;
use crate::models::User;

/// Errors specific to authentication operations.
#[derive(Debug, Error)]
pub enum AuthError {
    #[error("Email already registered!")]
    EmailTaken,

    #[error("Email not registered!")]
    EmailNotRegistered,

    #[error("Invalid credentials!")]
    InvalidCredentials,

    #[error(transparent)]
    Directory(#[from] UserDirectoryError),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<anyhow::Error> for AuthError {
    fn from(err: anyhow::Error) -> Self {
        Self::Internal(err.to_string())
    }
}

/// Domain service trait for authentication.
#[async_trait::async_trait]
pub trait AuthService: Send + Sync {
    /// Registers a new account with role USER.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::EmailTaken`] when any user already holds the
    /// email.
    async fn signup(&self, email: &str, password: &str) -> Result<User, AuthError>;

    /// Verifies credentials and returns the user.
    ///
    /// Every successful signin by the configured super-admin email promotes
    /// that user to SUPER_ADMIN through the directory's system promotion
    /// path; the promotion is a no-op once the role is held.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::EmailNotRegistered`] for unknown emails and
    /// [`AuthError::InvalidCredentials`] on a password mismatch.
    async fn signin(&self, email: &str, password: &str) -> Result<User, AuthError>;

    /// Hashes and stores a new password for the user.
    async fn update_password(&self, user_id: i32, new_password: &str) -> Result<User, AuthError>;
}
