//! `SeaORM` implementation of the `AuthService` trait.

use anyhow::Context;
use tokio::task;

use crate::db::{RoleUpdateOptions, Store, UserUpdate};
use crate::models::{User, UserRole};
use crate::services::auth_service::{AuthError, AuthService};
use crate::services::password;

pub struct SeaOrmAuthService {
    store: Store,
    admin_email: Option<String>,
}

impl SeaOrmAuthService {
    #[must_use]
    pub const fn new(store: Store, admin_email: Option<String>) -> Self {
        Self { store, admin_email }
    }

    /// Key derivation is CPU-bound, so it runs on the blocking pool
    /// rather than the async runtime.
    async fn hash_on_blocking_pool(password: &str) -> Result<String, AuthError> {
        let password = password.to_string();
        let hashed = task::spawn_blocking(move || password::hash_password(&password))
            .await
            .context("Password hashing task panicked")
            .map_err(|e| AuthError::Internal(e.to_string()))??;
        Ok(hashed)
    }
}

#[async_trait::async_trait]
impl AuthService for SeaOrmAuthService {
    async fn signup(&self, email: &str, password: &str) -> Result<User, AuthError> {
        let existing = self.store.find_users_by_email(email).await?;
        if !existing.is_empty() {
            return Err(AuthError::EmailTaken);
        }

        let hashed = Self::hash_on_blocking_pool(password).await?;
        let user = self.store.create_user(email, &hashed).await?;
        Ok(user)
    }

    async fn signin(&self, email: &str, password: &str) -> Result<User, AuthError> {
        let user = self
            .store
            .find_users_by_email(email)
            .await?
            .into_iter()
            .next()
            .ok_or(AuthError::EmailNotRegistered)?;

        let stored = user.password.clone();
        let candidate = password.to_string();
        let is_valid = task::spawn_blocking(move || password::verify_password(&candidate, &stored))
            .await
            .context("Password verification task panicked")
            .map_err(|e| AuthError::Internal(e.to_string()))??;

        if !is_valid {
            return Err(AuthError::InvalidCredentials);
        }

        // Runs on every signin by the configured admin email, not only the
        // first; the directory's same-role short-circuit makes it idempotent.
        if self.admin_email.as_deref() == Some(user.email.as_str())
            && user.role != UserRole::SuperAdmin
        {
            let promoted = self
                .store
                .update_user_role(
                    user.id,
                    UserRole::SuperAdmin,
                    Some(RoleUpdateOptions {
                        actor_email: user.email.clone(),
                        allow_system_promotion: true,
                    }),
                )
                .await?;
            return Ok(promoted);
        }

        Ok(user)
    }

    async fn update_password(&self, user_id: i32, new_password: &str) -> Result<User, AuthError> {
        let hashed = Self::hash_on_blocking_pool(new_password).await?;

        let user = self
            .store
            .update_user(
                user_id,
                UserUpdate {
                    password: Some(hashed),
                    ..Default::default()
                },
            )
            .await?;

        Ok(user)
    }
}
