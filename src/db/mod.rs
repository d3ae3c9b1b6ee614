use anyhow::Result;
use sea_orm::{ConnectOptions, ConnectionTrait, Database, DatabaseConnection, Statement};
use std::path::Path;
use std::time::Duration;
use tracing::info;

pub mod migrator;
pub mod repositories;

pub use repositories::report::ReportStoreError;
pub use repositories::user::{RoleUpdateOptions, UserDirectoryError, UserUpdate};

use crate::models::{EstimateQuery, NewReport, Report, User, UserRole};

/// Facade over the database connection. All persistence flows through the
/// per-aggregate repositories below.
#[derive(Clone)]
pub struct Store {
    pub conn: DatabaseConnection,
}

impl Store {
    pub async fn new(db_url: &str) -> Result<Self> {
        Self::with_pool_options(db_url, 5, 1).await
    }

    pub async fn with_pool_options(
        db_url: &str,
        max_connections: u32,
        min_connections: u32,
    ) -> Result<Self> {
        use sea_orm_migration::MigratorTrait;

        if !db_url.contains(":memory:") {
            let path_str = db_url.trim_start_matches("sqlite:");
            if let Some(parent) = Path::new(path_str).parent() {
                tokio::fs::create_dir_all(parent).await.ok();
            }
            if !Path::new(path_str).exists() {
                std::fs::File::create(path_str)?;
            }
        }

        let mut opt = ConnectOptions::new(db_url.to_string());
        opt.max_connections(max_connections)
            .min_connections(min_connections)
            .connect_timeout(Duration::from_secs(10))
            .acquire_timeout(Duration::from_secs(10))
            .idle_timeout(Duration::from_secs(300))
            .max_lifetime(Duration::from_secs(600))
            .sqlx_logging(false);

        let conn = Database::connect(opt).await?;

        migrator::Migrator::up(&conn, None).await?;

        info!(
            "Database connected & migrations applied (pool: {}-{})",
            min_connections, max_connections
        );

        Ok(Self { conn })
    }

    pub async fn ping(&self) -> Result<()> {
        let backend = self.conn.get_database_backend();
        self.conn
            .query_one(Statement::from_string(backend, "SELECT 1".to_string()))
            .await?;
        Ok(())
    }

    fn user_repo(&self) -> repositories::user::UserRepository {
        repositories::user::UserRepository::new(self.conn.clone())
    }

    fn report_repo(&self) -> repositories::report::ReportRepository {
        repositories::report::ReportRepository::new(self.conn.clone())
    }

    // -- User directory ----------------------------------------------------

    pub async fn create_user(
        &self,
        email: &str,
        hashed_password: &str,
    ) -> Result<User, UserDirectoryError> {
        self.user_repo().create(email, hashed_password).await
    }

    pub async fn find_users_by_email(&self, email: &str) -> Result<Vec<User>, UserDirectoryError> {
        self.user_repo().find_by_email(email).await
    }

    pub async fn find_user_by_id(&self, id: i32) -> Result<Option<User>, UserDirectoryError> {
        self.user_repo().find_by_id(id).await
    }

    pub async fn update_user(
        &self,
        id: i32,
        attrs: UserUpdate,
    ) -> Result<User, UserDirectoryError> {
        self.user_repo().update(id, attrs).await
    }

    pub async fn update_user_role(
        &self,
        id: i32,
        new_role: UserRole,
        options: Option<RoleUpdateOptions>,
    ) -> Result<User, UserDirectoryError> {
        self.user_repo().update_role(id, new_role, options).await
    }

    pub async fn remove_user(&self, id: i32) -> Result<User, UserDirectoryError> {
        self.user_repo().remove(id).await
    }

    // -- Report store ------------------------------------------------------

    pub async fn create_report(
        &self,
        fields: &NewReport,
        user_id: i32,
    ) -> Result<Report, ReportStoreError> {
        self.report_repo().create(fields, user_id).await
    }

    pub async fn change_report_approval(
        &self,
        id: i32,
        approved: bool,
    ) -> Result<Report, ReportStoreError> {
        self.report_repo().change_approval(id, approved).await
    }

    pub async fn estimate_price(
        &self,
        query: &EstimateQuery,
    ) -> Result<Option<f64>, ReportStoreError> {
        self.report_repo().estimate(query).await
    }
}
