//! Authentication module
//!
//! Provides JWT-based bearer authentication with argon2 password hashing.

mod jwt;
mod middleware;
mod password;

pub use jwt::{Claims, JwtService};
pub use middleware::{bearer_token, AuthUser};
pub use password::PasswordService;
