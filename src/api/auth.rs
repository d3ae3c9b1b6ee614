use axum::{
    Extension, Json,
    extract::{Path, Query, Request, State},
    middleware::Next,
    response::{IntoResponse, Response},
};
use std::sync::Arc;
use tower_sessions::Session;

use super::types::{CredentialsRequest, EmailQuery, UpdatePasswordRequest, UpdateRoleRequest, UserDto};
use super::{ApiError, AppState, validation};
use crate::models::{User, UserRole};

/// Session key holding the signed-in user's id.
pub const SESSION_USER_KEY: &str = "userId";

// ============================================================================
// Middleware & guards
// ============================================================================

/// The request's resolved user, inserted into extensions by
/// [`require_session`].
#[derive(Debug, Clone)]
pub struct CurrentUser(pub User);

/// Resolves the current user from the session once per request and passes
/// it down via request extensions. A missing or stale session is a guard
/// rejection (403), not an internal error.
pub async fn require_session(
    State(state): State<Arc<AppState>>,
    session: Session,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let user_id: Option<i32> = session
        .get(SESSION_USER_KEY)
        .await
        .map_err(|e| ApiError::internal(format!("Session error: {e}")))?;

    let Some(user_id) = user_id else {
        return Err(ApiError::forbidden("Not signed in"));
    };

    let Some(user) = state.store().find_user_by_id(user_id).await? else {
        // The session outlived the account.
        return Err(ApiError::forbidden("Not signed in"));
    };

    request.extensions_mut().insert(CurrentUser(user));
    Ok(next.run(request).await)
}

/// Super-admin access is tied to the configured admin email, not to the
/// SUPER_ADMIN role.
pub fn require_super_admin(state: &AppState, user: &User) -> Result<(), ApiError> {
    match state.config().application.admin_email.as_deref() {
        Some(admin_email) if admin_email == user.email => Ok(()),
        _ => Err(ApiError::forbidden("Super-admin access required")),
    }
}

pub fn require_role(user: &User, allowed: &[UserRole]) -> Result<(), ApiError> {
    if allowed.contains(&user.role) {
        Ok(())
    } else {
        Err(ApiError::forbidden(format!(
            "Role {} is not allowed here",
            user.role
        )))
    }
}

// ============================================================================
// Handlers
// ============================================================================

/// POST /auth/register
/// Create an account and sign it in.
pub async fn register(
    State(state): State<Arc<AppState>>,
    session: Session,
    Json(payload): Json<CredentialsRequest>,
) -> Result<Json<UserDto>, ApiError> {
    let email = validation::validate_email(&payload.email)?;
    let password = validation::validate_password(&payload.password)?;

    let user = state.auth().signup(email, password).await?;

    session
        .insert(SESSION_USER_KEY, user.id)
        .await
        .map_err(|e| ApiError::internal(format!("Failed to create session: {e}")))?;

    Ok(Json(user.into()))
}

/// POST /auth/login
pub async fn login(
    State(state): State<Arc<AppState>>,
    session: Session,
    Json(payload): Json<CredentialsRequest>,
) -> Result<Json<UserDto>, ApiError> {
    let email = validation::validate_email(&payload.email)?;
    let password = validation::validate_password(&payload.password)?;

    let user = state.auth().signin(email, password).await?;

    session
        .insert(SESSION_USER_KEY, user.id)
        .await
        .map_err(|e| ApiError::internal(format!("Failed to create session: {e}")))?;

    tracing::info!("User {} signed in", user.id);
    Ok(Json(user.into()))
}

/// POST /auth/logout
pub async fn logout(session: Session) -> impl IntoResponse {
    let _ = session.flush().await;
    axum::http::StatusCode::OK
}

/// GET /auth/whoami
pub async fn whoami(Extension(CurrentUser(user)): Extension<CurrentUser>) -> Json<UserDto> {
    Json(user.into())
}

/// GET /auth/{id} (super-admin only)
pub async fn find_user(
    State(state): State<Arc<AppState>>,
    Extension(CurrentUser(current)): Extension<CurrentUser>,
    Path(id): Path<i32>,
) -> Result<Json<UserDto>, ApiError> {
    require_super_admin(&state, &current)?;
    let id = validation::validate_id(id)?;

    let user = state
        .store()
        .find_user_by_id(id)
        .await?
        .ok_or_else(|| ApiError::NotFound("User not found!".to_string()))?;

    Ok(Json(user.into()))
}

/// GET /auth?email= (super-admin only)
///
/// Email is not unique, so this returns a list.
pub async fn find_all_users(
    State(state): State<Arc<AppState>>,
    Extension(CurrentUser(current)): Extension<CurrentUser>,
    Query(query): Query<EmailQuery>,
) -> Result<Json<Vec<UserDto>>, ApiError> {
    require_super_admin(&state, &current)?;

    let users = state.store().find_users_by_email(&query.email).await?;
    Ok(Json(users.into_iter().map(UserDto::from).collect()))
}

/// PATCH /auth/password
/// Update the signed-in user's own password.
pub async fn update_password(
    State(state): State<Arc<AppState>>,
    Extension(CurrentUser(current)): Extension<CurrentUser>,
    Json(payload): Json<UpdatePasswordRequest>,
) -> Result<Json<UserDto>, ApiError> {
    let password = validation::validate_password(&payload.password)?;

    let user = state.auth().update_password(current.id, password).await?;

    tracing::info!("Password changed for user {}", user.id);
    Ok(Json(user.into()))
}

/// PATCH /auth/{id}/role (super-admin only)
///
/// The system promotion flag is never supplied here, so a SUPER_ADMIN
/// assignment through this route is always rejected by the directory.
pub async fn update_role(
    State(state): State<Arc<AppState>>,
    Extension(CurrentUser(current)): Extension<CurrentUser>,
    Path(id): Path<i32>,
    Json(payload): Json<UpdateRoleRequest>,
) -> Result<Json<UserDto>, ApiError> {
    require_super_admin(&state, &current)?;
    let id = validation::validate_id(id)?;

    let user = state
        .store()
        .update_user_role(id, payload.role, None)
        .await?;

    Ok(Json(user.into()))
}

/// DELETE /auth/{id} (super-admin only)
/// Hard delete; responds with the removed user's snapshot.
pub async fn remove_user(
    State(state): State<Arc<AppState>>,
    Extension(CurrentUser(current)): Extension<CurrentUser>,
    Path(id): Path<i32>,
) -> Result<Json<UserDto>, ApiError> {
    require_super_admin(&state, &current)?;
    let id = validation::validate_id(id)?;

    let removed = state.store().remove_user(id).await?;
    Ok(Json(removed.into()))
}
