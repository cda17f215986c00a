//! User profile routes
//!
//! All endpoints require a bearer token. Updates and deletes are limited
//! to the caller's own identity.

use super::extract::{ApiJson, ApiPath, ApiQuery};
use crate::auth::AuthUser;
use crate::error::ApiResult;
use crate::services::UserService;
use crate::state::AppState;
use axum::{
    extract::State,
    http::StatusCode,
    routing::get,
    Json, Router,
};
use userbase_shared::types::{ListUsersQuery, UpdateUserRequest, UserResponse};

/// Create user routes
pub fn user_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(list_users))
        .route("/:id", get(get_user).put(update_user).delete(delete_user))
}

/// GET /users - List users
async fn list_users(
    State(state): State<AppState>,
    _auth: AuthUser,
    ApiQuery(query): ApiQuery<ListUsersQuery>,
) -> ApiResult<Json<Vec<UserResponse>>> {
    let profiles = UserService::list(state.store(), &query).await?;
    Ok(Json(profiles.into_iter().map(UserResponse::from).collect()))
}

/// GET /users/:id - Get one user
async fn get_user(
    State(state): State<AppState>,
    _auth: AuthUser,
    ApiPath(id): ApiPath<i64>,
) -> ApiResult<Json<UserResponse>> {
    let profile = UserService::get(state.store(), id).await?;
    Ok(Json(profile.into()))
}

/// PUT /users/:id - Update own profile
async fn update_user(
    State(state): State<AppState>,
    auth: AuthUser,
    ApiPath(id): ApiPath<i64>,
    ApiJson(req): ApiJson<UpdateUserRequest>,
) -> ApiResult<Json<UserResponse>> {
    let profile = UserService::update(state.store(), &auth, id, req).await?;
    Ok(Json(profile.into()))
}

/// DELETE /users/:id - Delete own account
async fn delete_user(
    State(state): State<AppState>,
    auth: AuthUser,
    ApiPath(id): ApiPath<i64>,
) -> ApiResult<StatusCode> {
    UserService::delete(state.store(), &auth, id).await?;
    Ok(StatusCode::NO_CONTENT)
}
