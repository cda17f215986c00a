//! Authentication service: registration, login and token authentication
//!
//! Password hashing and verification run on the blocking thread pool.
//! Token issuance and verification are pure computation on pre-computed
//! keys.

use crate::auth::{JwtService, PasswordService};
use crate::error::{ApiError, ApiResult};
use crate::repositories::{IdentityProfile, IdentityRecord, IdentityStore, NewIdentity};
use tracing::{debug, info};
use userbase_shared::types::{AccessToken, RegisterRequest};
use userbase_shared::validation::validate_registration;
use userbase_shared::AuthError;
use validator::ValidateEmail;

/// Token type reported to clients
pub const TOKEN_TYPE: &str = "bearer";

/// Authentication service
pub struct AuthService;

impl AuthService {
    /// Register a new identity with its address, geo and company
    ///
    /// Fails with `DuplicateCredential` if the username or the email is
    /// already taken; nothing is written in that case.
    pub async fn register(
        store: &dyn IdentityStore,
        req: RegisterRequest,
    ) -> ApiResult<IdentityProfile> {
        let result = Self::register_inner(store, req).await;

        let outcome = match &result {
            Ok(_) => "success",
            Err(ApiError::DuplicateCredential) => "duplicate",
            Err(ApiError::Validation(_)) => "invalid",
            Err(_) => "error",
        };
        metrics::counter!("userbase_registrations_total", "outcome" => outcome).increment(1);

        result
    }

    async fn register_inner(
        store: &dyn IdentityStore,
        mut req: RegisterRequest,
    ) -> ApiResult<IdentityProfile> {
        validate_registration(&req).map_err(ApiError::Validation)?;
        if !req.email.validate_email() {
            return Err(ApiError::Validation("email: Invalid email format".to_string()));
        }

        if store
            .find_by_username_or_email(&req.username, &req.email)
            .await?
            .is_some()
        {
            return Err(ApiError::DuplicateCredential);
        }

        let password = std::mem::take(&mut req.password);
        let password_hash = PasswordService::hash_async(password).await?;

        // A concurrent registration can still win the race; the unique
        // constraints turn that into `Duplicate` and roll the insert back.
        let profile = store
            .insert_with_profile(&NewIdentity::from_registration(req, password_hash))
            .await?;

        info!(identity_id = profile.identity.id, "Registered identity");
        Ok(profile)
    }

    /// Verify credentials and issue an access token
    ///
    /// Unknown usernames and wrong passwords produce the same error.
    pub async fn login(
        store: &dyn IdentityStore,
        jwt: &JwtService,
        username: &str,
        password: &str,
    ) -> ApiResult<AccessToken> {
        let result = Self::login_inner(store, jwt, username, password).await;

        let outcome = match &result {
            Ok(_) => "success",
            Err(ApiError::InvalidCredentials) => "rejected",
            Err(_) => "error",
        };
        metrics::counter!("userbase_logins_total", "outcome" => outcome).increment(1);

        result
    }

    async fn login_inner(
        store: &dyn IdentityStore,
        jwt: &JwtService,
        username: &str,
        password: &str,
    ) -> ApiResult<AccessToken> {
        let Some(identity) = store.find_by_username(username).await? else {
            PasswordService::verify_dummy_async(password.to_string()).await?;
            return Err(AuthError::InvalidCredentials.into());
        };

        let valid =
            PasswordService::verify_async(password.to_string(), identity.password_hash.clone())
                .await?;
        if !valid {
            debug!(identity_id = identity.id, "Password mismatch");
            return Err(AuthError::InvalidCredentials.into());
        }

        let access_token = jwt.issue(identity.id)?;

        Ok(AccessToken {
            access_token,
            token_type: TOKEN_TYPE.to_string(),
            expires_in: jwt.access_token_expiry_secs(),
        })
    }

    /// Resolve a presented bearer token to a stored identity
    ///
    /// Every failure becomes `Unauthenticated`; the cause is only logged.
    pub async fn authenticate(
        store: &dyn IdentityStore,
        jwt: &JwtService,
        token: Option<&str>,
    ) -> ApiResult<IdentityRecord> {
        let result = match token {
            None => Err(AuthError::MissingToken),
            Some(token) => match jwt.verify(token) {
                Ok(id) => store.find_by_id(id).await?.ok_or(AuthError::UnknownSubject),
                Err(e) => Err(e),
            },
        };

        result.map_err(|e| {
            metrics::counter!("userbase_auth_rejections_total").increment(1);
            ApiError::from(e)
        })
    }
}
