//! Database repositories
//!
//! Identities are reached through the [`IdentityStore`] trait so that the
//! services do not depend on a particular backend. [`PgIdentityStore`] is
//! the production implementation; [`MemoryIdentityStore`] backs tests and
//! local experiments.

use async_trait::async_trait;
use thiserror::Error;

pub mod identity;
pub mod memory;

pub use identity::{
    AddressRecord, CompanyRecord, GeoRecord, IdentityChanges, IdentityProfile, IdentityRecord,
    NewAddress, NewCompany, NewIdentity, PgIdentityStore,
};
pub use memory::MemoryIdentityStore;

/// Repository error
#[derive(Error, Debug)]
pub enum RepoError {
    /// A unique column (username or email) already holds this value
    #[error("Username or email already registered")]
    Duplicate,

    #[error("Database error: {0}")]
    Database(#[source] sqlx::Error),
}

impl From<sqlx::Error> for RepoError {
    fn from(err: sqlx::Error) -> Self {
        if let sqlx::Error::Database(db_err) = &err {
            if db_err.is_unique_violation() {
                return RepoError::Duplicate;
            }
        }
        RepoError::Database(err)
    }
}

/// Persistence interface for identities and their profile sub-records
///
/// Every write that touches more than one table is atomic: either all rows
/// are written (or removed) or none are.
#[async_trait]
pub trait IdentityStore: Send + Sync {
    /// Find an identity holding either the username or the email
    async fn find_by_username_or_email(
        &self,
        username: &str,
        email: &str,
    ) -> Result<Option<IdentityRecord>, RepoError>;

    async fn find_by_username(&self, username: &str) -> Result<Option<IdentityRecord>, RepoError>;

    async fn find_by_id(&self, id: i64) -> Result<Option<IdentityRecord>, RepoError>;

    /// Identity together with its address, geo and company
    async fn find_profile(&self, id: i64) -> Result<Option<IdentityProfile>, RepoError>;

    /// Profiles ordered by identity id
    async fn list_profiles(&self, skip: i64, limit: i64) -> Result<Vec<IdentityProfile>, RepoError>;

    /// Insert identity, address, geo and company in one transaction
    async fn insert_with_profile(&self, new: &NewIdentity) -> Result<IdentityProfile, RepoError>;

    /// Insert many identities in one transaction; all or none persist
    async fn insert_batch(&self, identities: &[NewIdentity]) -> Result<usize, RepoError>;

    /// Apply a partial update; `None` if the identity does not exist
    async fn update(
        &self,
        id: i64,
        changes: &IdentityChanges,
    ) -> Result<Option<IdentityProfile>, RepoError>;

    /// Delete the identity and its sub-records; `false` if it did not exist
    async fn delete(&self, id: i64) -> Result<bool, RepoError>;

    async fn count(&self) -> Result<i64, RepoError>;

    /// Cheap round trip used by the readiness probe
    async fn ping(&self) -> Result<(), RepoError>;
}
