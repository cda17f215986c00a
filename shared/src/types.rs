//! API request and response types

use serde::{Deserialize, Serialize};

/// Default page size for identity listings
pub const DEFAULT_PAGE_LIMIT: i64 = 100;

/// Largest page size a client may request
pub const MAX_PAGE_LIMIT: i64 = 100;

/// Pagination parameters for `GET /users`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ListUsersQuery {
    #[serde(default)]
    pub skip: Option<i64>,
    #[serde(default)]
    pub limit: Option<i64>,
}

impl ListUsersQuery {
    /// Offset clamped to be non-negative
    pub fn offset(&self) -> i64 {
        self.skip.unwrap_or(0).max(0)
    }

    /// Page size clamped to `1..=MAX_PAGE_LIMIT`
    pub fn page_size(&self) -> i64 {
        self.limit.unwrap_or(DEFAULT_PAGE_LIMIT).clamp(1, MAX_PAGE_LIMIT)
    }
}

/// API error response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: ErrorDetail,
}

/// Error detail
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorDetail {
    pub code: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub field: Option<String>,
}

/// Welcome message returned from `/`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WelcomeResponse {
    pub message: String,
}

// ============================================================================
// Authentication Types
// ============================================================================

/// Access token response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccessToken {
    pub access_token: String,
    /// Always `"bearer"`
    pub token_type: String,
    /// Seconds until the token expires
    pub expires_in: i64,
}

/// Login form (`application/x-www-form-urlencoded`)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

/// Geolocation supplied at registration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeoInput {
    pub lat: String,
    pub lng: String,
}

/// Address supplied at registration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AddressInput {
    pub street: String,
    pub suite: String,
    pub city: String,
    pub zipcode: String,
    pub geo: GeoInput,
}

/// Employer supplied at registration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompanyInput {
    pub name: String,
    #[serde(rename = "catchPhrase")]
    pub catch_phrase: String,
    pub bs: String,
}

/// Registration request
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegisterRequest {
    pub name: String,
    pub username: String,
    pub email: String,
    pub password: String,
    pub phone: String,
    pub website: String,
    pub address: AddressInput,
    pub company: CompanyInput,
}

/// Partial profile update; absent fields are left unchanged
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateUserRequest {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub website: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
}

impl UpdateUserRequest {
    /// True when the request would not change anything
    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.username.is_none()
            && self.email.is_none()
            && self.phone.is_none()
            && self.website.is_none()
            && self.password.is_none()
    }
}

// ============================================================================
// User Profile Types
// ============================================================================

/// Geolocation response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeoResponse {
    pub id: i64,
    pub address_id: i64,
    pub lat: String,
    pub lng: String,
}

/// Address response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AddressResponse {
    pub id: i64,
    pub user_id: i64,
    pub street: String,
    pub suite: String,
    pub city: String,
    pub zipcode: String,
    pub geo: GeoResponse,
}

/// Company response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompanyResponse {
    pub id: i64,
    pub user_id: i64,
    pub name: String,
    #[serde(rename = "catchPhrase")]
    pub catch_phrase: String,
    pub bs: String,
}

/// User response; never carries the password or its hash
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserResponse {
    pub id: i64,
    pub name: String,
    pub username: String,
    pub email: String,
    pub phone: String,
    pub website: String,
    pub address: AddressResponse,
    pub company: CompanyResponse,
}
