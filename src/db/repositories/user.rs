use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, ModelTrait, QueryFilter, Set,
};
use thiserror::Error;
use tracing::info;

use crate::entities::users;
use crate::models::{User, UserRole};

/// Errors raised by user directory operations.
#[derive(Debug, Error)]
pub enum UserDirectoryError {
    #[error("User not found")]
    NotFound,

    #[error("{0}")]
    Forbidden(String),

    #[error("Database error: {0}")]
    Database(#[from] sea_orm::DbErr),
}

/// Partial attribute set for `update`. Role changes go through
/// `update_role` exclusively.
#[derive(Debug, Default, Clone)]
pub struct UserUpdate {
    pub email: Option<String>,
    pub password: Option<String>,
}

/// Options for `update_role`. `allow_system_promotion` is only ever set by
/// the signin flow; nothing reachable from the HTTP surface supplies it.
#[derive(Debug, Clone)]
pub struct RoleUpdateOptions {
    pub actor_email: String,
    pub allow_system_promotion: bool,
}

pub struct UserRepository {
    conn: DatabaseConnection,
}

impl UserRepository {
    #[must_use]
    pub const fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }

    fn map_model(model: users::Model) -> Result<User, UserDirectoryError> {
        let role = model
            .role
            .parse::<UserRole>()
            .map_err(sea_orm::DbErr::Custom)?;

        Ok(User {
            id: model.id,
            email: model.email,
            password: model.password,
            role,
        })
    }

    /// Insert a new user. The password is expected to already be hashed by
    /// the auth service.
    pub async fn create(
        &self,
        email: &str,
        hashed_password: &str,
    ) -> Result<User, UserDirectoryError> {
        let model = users::ActiveModel {
            email: Set(email.to_string()),
            password: Set(hashed_password.to_string()),
            role: Set(UserRole::User.as_str().to_string()),
            ..Default::default()
        }
        .insert(&self.conn)
        .await?;

        info!("Created user {} ({})", model.id, model.email);
        Self::map_model(model)
    }

    /// Exact-match email lookup. Email is not unique, so this can return
    /// more than one row.
    pub async fn find_by_email(&self, email: &str) -> Result<Vec<User>, UserDirectoryError> {
        let rows = users::Entity::find()
            .filter(users::Column::Email.eq(email))
            .all(&self.conn)
            .await?;

        rows.into_iter().map(Self::map_model).collect()
    }

    /// Lookup by id. An id of 0 is treated as "not found" without touching
    /// the database.
    pub async fn find_by_id(&self, id: i32) -> Result<Option<User>, UserDirectoryError> {
        if id == 0 {
            return Ok(None);
        }

        let row = users::Entity::find_by_id(id).one(&self.conn).await?;
        row.map(Self::map_model).transpose()
    }

    /// Merge the given attributes into an existing row.
    pub async fn update(&self, id: i32, attrs: UserUpdate) -> Result<User, UserDirectoryError> {
        let row = users::Entity::find_by_id(id)
            .one(&self.conn)
            .await?
            .ok_or(UserDirectoryError::NotFound)?;

        let mut active: users::ActiveModel = row.into();
        if let Some(email) = attrs.email {
            active.email = Set(email);
        }
        if let Some(password) = attrs.password {
            active.password = Set(password);
        }

        let updated = active.update(&self.conn).await?;
        Self::map_model(updated)
    }

    /// Role state machine.
    ///
    /// Same-role calls return the current row without writing. A transition
    /// to `SUPER_ADMIN` is only allowed when the system promotion flag is
    /// set and the actor is the target user (self-promotion on signin).
    pub async fn update_role(
        &self,
        id: i32,
        new_role: UserRole,
        options: Option<RoleUpdateOptions>,
    ) -> Result<User, UserDirectoryError> {
        let row = users::Entity::find_by_id(id)
            .one(&self.conn)
            .await?
            .ok_or(UserDirectoryError::NotFound)?;

        if row.role == new_role.as_str() {
            return Self::map_model(row);
        }

        if new_role == UserRole::SuperAdmin {
            let Some(options) = options.filter(|o| o.allow_system_promotion) else {
                return Err(UserDirectoryError::Forbidden(
                    "SUPER_ADMIN role cannot be assigned manually".to_string(),
                ));
            };

            if options.actor_email != row.email {
                return Err(UserDirectoryError::Forbidden(
                    "SUPER_ADMIN can only self-promote".to_string(),
                ));
            }
        }

        let email = row.email.clone();
        let mut active: users::ActiveModel = row.into();
        active.role = Set(new_role.as_str().to_string());

        let updated = active.update(&self.conn).await?;
        info!("Role of {email} is now {new_role}");
        Self::map_model(updated)
    }

    /// Hard delete. Returns the pre-deletion snapshot.
    pub async fn remove(&self, id: i32) -> Result<User, UserDirectoryError> {
        let row = users::Entity::find_by_id(id)
            .one(&self.conn)
            .await?
            .ok_or(UserDirectoryError::NotFound)?;

        let snapshot = Self::map_model(row.clone())?;
        row.delete(&self.conn).await?;

        info!("Removed user {} ({})", snapshot.id, snapshot.email);
        Ok(snapshot)
    }
}
