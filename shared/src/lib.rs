//! Userbase Shared Library
//!
//! Wire types, input validation and authentication errors shared by the
//! backend and its API clients.

pub mod errors;
pub mod types;
pub mod validation;

// Re-export commonly used items
pub use errors::*;
pub use types::*;
