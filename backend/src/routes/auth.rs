//! Authentication routes
//!
//! Registration, password login and the caller's own profile.

use super::extract::{ApiForm, ApiJson};
use crate::auth::AuthUser;
use crate::error::ApiResult;
use crate::services::{AuthService, UserService};
use crate::state::AppState;
use axum::{
    extract::State,
    routing::{get, post},
    Json, Router,
};
use userbase_shared::types::{AccessToken, LoginRequest, RegisterRequest, UserResponse};

/// Create auth routes
pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/register", post(register))
        .route("/login", post(login))
        .route("/me", get(me))
}

/// Register a new user
///
/// POST /auth/register
async fn register(
    State(state): State<AppState>,
    ApiJson(req): ApiJson<RegisterRequest>,
) -> ApiResult<Json<UserResponse>> {
    let profile = AuthService::register(state.store(), req).await?;
    Ok(Json(profile.into()))
}

/// Login with username and password (form-encoded)
///
/// POST /auth/login
async fn login(
    State(state): State<AppState>,
    ApiForm(req): ApiForm<LoginRequest>,
) -> ApiResult<Json<AccessToken>> {
    let token = AuthService::login(state.store(), state.jwt(), &req.username, &req.password).await?;
    Ok(Json(token))
}

/// Get the caller's own profile
///
/// GET /auth/me
async fn me(State(state): State<AppState>, auth: AuthUser) -> ApiResult<Json<UserResponse>> {
    let profile = UserService::get(state.store(), auth.id()).await?;
    Ok(Json(profile.into()))
}
