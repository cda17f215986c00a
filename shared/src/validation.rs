//! Input validation functions
//!
//! This module provides validation utilities for user input.

use crate::types::{RegisterRequest, UpdateUserRequest};
use regex_lite::Regex;
use std::sync::OnceLock;

/// Longest accepted username
pub const MAX_USERNAME_LEN: usize = 64;

fn email_regex() -> &'static Regex {
    static EMAIL: OnceLock<Regex> = OnceLock::new();
    EMAIL.get_or_init(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("valid email regex"))
}

/// Validate email format
pub fn validate_email(email: &str) -> Result<(), String> {
    if email.is_empty() {
        return Err("Email cannot be empty".to_string());
    }
    if email.len() > 255 {
        return Err("Email too long".to_string());
    }
    if !email_regex().is_match(email) {
        return Err("Invalid email format".to_string());
    }
    Ok(())
}

/// Validate password strength
pub fn validate_password(password: &str) -> Result<(), String> {
    let len = password.chars().count();
    if len < 8 {
        return Err("Password must be at least 8 characters".to_string());
    }
    if len > 128 {
        return Err("Password too long".to_string());
    }
    Ok(())
}

/// Validate username: 1-64 ASCII letters, digits, '.', '_' or '-'
pub fn validate_username(username: &str) -> Result<(), String> {
    if username.is_empty() {
        return Err("Username cannot be empty".to_string());
    }
    if username.chars().count() > MAX_USERNAME_LEN {
        return Err(format!("Username must be at most {} characters", MAX_USERNAME_LEN));
    }
    if !username
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-'))
    {
        return Err("Username may only contain letters, digits, '.', '_' and '-'".to_string());
    }
    Ok(())
}

/// Validate that a free-text field is present
pub fn validate_required(field: &str, value: &str) -> Result<(), String> {
    if value.trim().is_empty() {
        return Err(format!("{} cannot be empty", field));
    }
    Ok(())
}

/// Validate a full registration payload
///
/// Returns the first problem found, prefixed with the offending field.
pub fn validate_registration(req: &RegisterRequest) -> Result<(), String> {
    validate_username(&req.username).map_err(|e| format!("username: {}", e))?;
    validate_email(&req.email).map_err(|e| format!("email: {}", e))?;
    validate_password(&req.password).map_err(|e| format!("password: {}", e))?;
    validate_required("name", &req.name)?;
    validate_required("phone", &req.phone)?;
    validate_required("website", &req.website)?;
    validate_required("address.street", &req.address.street)?;
    validate_required("address.suite", &req.address.suite)?;
    validate_required("address.city", &req.address.city)?;
    validate_required("address.zipcode", &req.address.zipcode)?;
    validate_required("address.geo.lat", &req.address.geo.lat)?;
    validate_required("address.geo.lng", &req.address.geo.lng)?;
    validate_required("company.name", &req.company.name)?;
    validate_required("company.catchPhrase", &req.company.catch_phrase)?;
    validate_required("company.bs", &req.company.bs)?;
    Ok(())
}

/// Validate the fields present in a partial update
pub fn validate_update(req: &UpdateUserRequest) -> Result<(), String> {
    if let Some(username) = &req.username {
        validate_username(username).map_err(|e| format!("username: {}", e))?;
    }
    if let Some(email) = &req.email {
        validate_email(email).map_err(|e| format!("email: {}", e))?;
    }
    if let Some(password) = &req.password {
        validate_password(password).map_err(|e| format!("password: {}", e))?;
    }
    if let Some(name) = &req.name {
        validate_required("name", name)?;
    }
    if let Some(phone) = &req.phone {
        validate_required("phone", phone)?;
    }
    if let Some(website) = &req.website {
        validate_required("website", website)?;
    }
    Ok(())
}
