//! Session gate
//!
//! Every identity-scoped handler takes an [`AuthUser`], so it cannot run
//! unless the request carried a valid bearer token for an identity that
//! still exists.

use crate::error::ApiError;
use crate::repositories::IdentityRecord;
use crate::services::AuthService;
use crate::state::AppState;
use axum::{
    extract::FromRef,
    http::{header::AUTHORIZATION, request::Parts, HeaderMap},
};

/// Authenticated identity resolved from the bearer token
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub identity: IdentityRecord,
}

impl AuthUser {
    #[inline]
    pub fn id(&self) -> i64 {
        self.identity.id
    }
}

/// Extract the token from an `Authorization: Bearer <token>` header
///
/// Any other scheme, or an empty token, counts as no token.
pub fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    let value = headers.get(AUTHORIZATION)?.to_str().ok()?;
    let (scheme, token) = value.split_once(' ')?;
    let token = token.trim();

    if scheme.eq_ignore_ascii_case("bearer") && !token.is_empty() {
        Some(token)
    } else {
        None
    }
}

#[axum::async_trait]
impl<S> axum::extract::FromRequestParts<S> for AuthUser
where
    AppState: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let app_state = AppState::from_ref(state);
        let token = bearer_token(&parts.headers);

        let identity =
            AuthService::authenticate(app_state.store(), app_state.jwt(), token).await?;

        Ok(AuthUser { identity })
    }
}
