use axum::{
    Router,
    http::HeaderValue,
    middleware,
    routing::{get, patch, post},
};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tower_sessions::{Expiry, MemoryStore, SessionManagerLayer};

use crate::config::Config;
use crate::db::Store;
use crate::services::{AuthService, SeaOrmAuthService};

pub mod auth;
mod error;
pub mod reports;
mod types;
mod validation;

pub use error::ApiError;
pub use types::*;

pub struct AppState {
    config: Config,
    store: Store,
    auth: Arc<dyn AuthService>,
}

impl AppState {
    #[must_use]
    pub const fn config(&self) -> &Config {
        &self.config
    }

    #[must_use]
    pub const fn store(&self) -> &Store {
        &self.store
    }

    #[must_use]
    pub fn auth(&self) -> &Arc<dyn AuthService> {
        &self.auth
    }
}

/// Composition root: store → auth service → shared state, in dependency
/// order.
pub async fn create_app_state(config: Config) -> anyhow::Result<Arc<AppState>> {
    let store = Store::with_pool_options(
        &config.general.database_path,
        config.general.max_db_connections,
        config.general.min_db_connections,
    )
    .await?;

    let auth = Arc::new(SeaOrmAuthService::new(
        store.clone(),
        config.application.admin_email.clone(),
    )) as Arc<dyn AuthService>;

    Ok(Arc::new(AppState {
        config,
        store,
        auth,
    }))
}

pub fn router(state: Arc<AppState>) -> Router {
    let (cors_origins, secure_cookies, session_ttl_minutes) = (
        state.config().server.cors_allowed_origins.clone(),
        state.config().server.secure_cookies,
        state.config().server.session_ttl_minutes,
    );

    let session_store = MemoryStore::default();
    let session_layer = SessionManagerLayer::new(session_store)
        .with_secure(secure_cookies)
        .with_same_site(tower_sessions::cookie::SameSite::Lax)
        .with_expiry(Expiry::OnInactivity(time::Duration::minutes(
            session_ttl_minutes,
        )));

    let protected_routes = create_protected_router(state.clone());

    let cors_layer = if cors_origins.contains(&"*".to_string()) {
        CorsLayer::new().allow_origin(Any)
    } else {
        let origins: Vec<HeaderValue> =
            cors_origins.iter().filter_map(|s| s.parse().ok()).collect();
        CorsLayer::new().allow_origin(origins)
    };

    Router::new()
        .merge(protected_routes)
        .route("/auth/register", post(auth::register))
        .route("/auth/login", post(auth::login))
        .layer(session_layer)
        .with_state(state)
        .layer(cors_layer.allow_methods(Any).allow_headers(Any))
        .layer(TraceLayer::new_for_http())
}

fn create_protected_router(state: Arc<AppState>) -> Router<Arc<AppState>> {
    Router::new()
        .route("/auth/logout", post(auth::logout))
        .route("/auth/whoami", get(auth::whoami))
        .route("/auth/password", patch(auth::update_password))
        .route("/auth", get(auth::find_all_users))
        .route(
            "/auth/{id}",
            get(auth::find_user).delete(auth::remove_user),
        )
        .route("/auth/{id}/role", patch(auth::update_role))
        .route(
            "/reports",
            post(reports::create_report).get(reports::get_estimate),
        )
        .route("/reports/{id}", patch(reports::approve_report))
        .route_layer(middleware::from_fn_with_state(
            state,
            auth::require_session,
        ))
}
