//! User service for profile reads and owner-scoped changes

use crate::auth::{AuthUser, PasswordService};
use crate::error::{ApiError, ApiResult};
use crate::repositories::{IdentityChanges, IdentityProfile, IdentityStore};
use tracing::info;
use userbase_shared::types::{ListUsersQuery, UpdateUserRequest};
use userbase_shared::validation::validate_update;
use validator::ValidateEmail;

/// User service
pub struct UserService;

impl UserService {
    /// List profiles, one page at a time
    pub async fn list(
        store: &dyn IdentityStore,
        query: &ListUsersQuery,
    ) -> ApiResult<Vec<IdentityProfile>> {
        Ok(store.list_profiles(query.offset(), query.page_size()).await?)
    }

    /// Get one profile
    pub async fn get(store: &dyn IdentityStore, id: i64) -> ApiResult<IdentityProfile> {
        store
            .find_profile(id)
            .await?
            .ok_or_else(|| ApiError::NotFound("User not found".to_string()))
    }

    /// Update the caller's own profile
    ///
    /// A missing target is reported before ownership is checked.
    pub async fn update(
        store: &dyn IdentityStore,
        caller: &AuthUser,
        id: i64,
        req: UpdateUserRequest,
    ) -> ApiResult<IdentityProfile> {
        Self::ensure_owner(store, caller, id).await?;

        if req.is_empty() {
            return Self::get(store, id).await;
        }

        validate_update(&req).map_err(ApiError::Validation)?;
        if let Some(email) = &req.email {
            if !email.validate_email() {
                return Err(ApiError::Validation("email: Invalid email format".to_string()));
            }
        }

        let password_hash = match req.password {
            Some(password) => Some(PasswordService::hash_async(password).await?),
            None => None,
        };

        let changes = IdentityChanges {
            name: req.name,
            username: req.username,
            email: req.email,
            phone: req.phone,
            website: req.website,
            password_hash,
        };

        let profile = store
            .update(id, &changes)
            .await?
            .ok_or_else(|| ApiError::NotFound("User not found".to_string()))?;

        info!(identity_id = id, "Updated identity");
        Ok(profile)
    }

    /// Delete the caller's own account and its profile sub-records
    pub async fn delete(store: &dyn IdentityStore, caller: &AuthUser, id: i64) -> ApiResult<()> {
        Self::ensure_owner(store, caller, id).await?;

        if !store.delete(id).await? {
            return Err(ApiError::NotFound("User not found".to_string()));
        }

        info!(identity_id = id, "Deleted identity");
        Ok(())
    }

    async fn ensure_owner(store: &dyn IdentityStore, caller: &AuthUser, id: i64) -> ApiResult<()> {
        if store.find_by_id(id).await?.is_none() {
            return Err(ApiError::NotFound("User not found".to_string()));
        }
        if caller.id() != id {
            return Err(ApiError::Forbidden(
                "Not allowed to modify another user".to_string(),
            ));
        }
        Ok(())
    }
}
