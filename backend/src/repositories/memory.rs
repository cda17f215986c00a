//! In-memory identity store
//!
//! Mirrors the PostgreSQL store's behaviour, including unique username and
//! email and all-or-nothing multi-record writes, without needing a database.

use super::{
    AddressRecord, CompanyRecord, GeoRecord, IdentityChanges, IdentityProfile, IdentityRecord,
    IdentityStore, NewIdentity, RepoError,
};
use async_trait::async_trait;
use chrono::Utc;
use std::collections::BTreeMap;
use tokio::sync::RwLock;

#[derive(Default)]
struct Sequences {
    user: i64,
    address: i64,
    geo: i64,
    company: i64,
}

fn next(seq: &mut i64) -> i64 {
    *seq += 1;
    *seq
}

#[derive(Default)]
struct State {
    seq: Sequences,
    profiles: BTreeMap<i64, IdentityProfile>,
}

impl State {
    fn conflicts(&self, username: &str, email: &str, except: Option<i64>) -> bool {
        self.profiles.values().any(|p| {
            Some(p.identity.id) != except
                && (p.identity.username == username || p.identity.email == email)
        })
    }

    fn insert(&mut self, new: &NewIdentity) -> IdentityProfile {
        let now = Utc::now();
        let user_id = next(&mut self.seq.user);
        let address_id = next(&mut self.seq.address);

        let profile = IdentityProfile {
            identity: IdentityRecord {
                id: user_id,
                name: new.name.clone(),
                username: new.username.clone(),
                email: new.email.clone(),
                password_hash: new.password_hash.clone(),
                phone: new.phone.clone(),
                website: new.website.clone(),
                created_at: now,
                updated_at: now,
            },
            address: AddressRecord {
                id: address_id,
                user_id,
                street: new.address.street.clone(),
                suite: new.address.suite.clone(),
                city: new.address.city.clone(),
                zipcode: new.address.zipcode.clone(),
            },
            geo: GeoRecord {
                id: next(&mut self.seq.geo),
                address_id,
                lat: new.address.lat.clone(),
                lng: new.address.lng.clone(),
            },
            company: CompanyRecord {
                id: next(&mut self.seq.company),
                user_id,
                name: new.company.name.clone(),
                catch_phrase: new.company.catch_phrase.clone(),
                bs: new.company.bs.clone(),
            },
        };

        self.profiles.insert(user_id, profile.clone());
        profile
    }
}

/// Identity store held entirely in process memory
#[derive(Default)]
pub struct MemoryIdentityStore {
    state: RwLock<State>,
}

impl MemoryIdentityStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl IdentityStore for MemoryIdentityStore {
    async fn find_by_username_or_email(
        &self,
        username: &str,
        email: &str,
    ) -> Result<Option<IdentityRecord>, RepoError> {
        let state = self.state.read().await;
        Ok(state
            .profiles
            .values()
            .find(|p| p.identity.username == username || p.identity.email == email)
            .map(|p| p.identity.clone()))
    }

    async fn find_by_username(&self, username: &str) -> Result<Option<IdentityRecord>, RepoError> {
        let state = self.state.read().await;
        Ok(state
            .profiles
            .values()
            .find(|p| p.identity.username == username)
            .map(|p| p.identity.clone()))
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<IdentityRecord>, RepoError> {
        let state = self.state.read().await;
        Ok(state.profiles.get(&id).map(|p| p.identity.clone()))
    }

    async fn find_profile(&self, id: i64) -> Result<Option<IdentityProfile>, RepoError> {
        let state = self.state.read().await;
        Ok(state.profiles.get(&id).cloned())
    }

    async fn list_profiles(&self, skip: i64, limit: i64) -> Result<Vec<IdentityProfile>, RepoError> {
        let state = self.state.read().await;
        Ok(state
            .profiles
            .values()
            .skip(skip.max(0) as usize)
            .take(limit.max(0) as usize)
            .cloned()
            .collect())
    }

    async fn insert_with_profile(&self, new: &NewIdentity) -> Result<IdentityProfile, RepoError> {
        let mut state = self.state.write().await;
        if state.conflicts(&new.username, &new.email, None) {
            return Err(RepoError::Duplicate);
        }
        Ok(state.insert(new))
    }

    async fn insert_batch(&self, identities: &[NewIdentity]) -> Result<usize, RepoError> {
        let mut state = self.state.write().await;

        // Check the whole batch, including against itself, before writing anything.
        for (i, new) in identities.iter().enumerate() {
            let clashes_in_batch = identities[..i]
                .iter()
                .any(|other| other.username == new.username || other.email == new.email);
            if clashes_in_batch || state.conflicts(&new.username, &new.email, None) {
                return Err(RepoError::Duplicate);
            }
        }

        for new in identities {
            state.insert(new);
        }
        Ok(identities.len())
    }

    async fn update(
        &self,
        id: i64,
        changes: &IdentityChanges,
    ) -> Result<Option<IdentityProfile>, RepoError> {
        let mut state = self.state.write().await;

        let Some(current) = state.profiles.get(&id) else {
            return Ok(None);
        };
        let username = changes
            .username
            .clone()
            .unwrap_or_else(|| current.identity.username.clone());
        let email = changes
            .email
            .clone()
            .unwrap_or_else(|| current.identity.email.clone());

        if state.conflicts(&username, &email, Some(id)) {
            return Err(RepoError::Duplicate);
        }

        let Some(profile) = state.profiles.get_mut(&id) else {
            return Ok(None);
        };
        let identity = &mut profile.identity;
        identity.username = username;
        identity.email = email;
        if let Some(name) = &changes.name {
            identity.name = name.clone();
        }
        if let Some(phone) = &changes.phone {
            identity.phone = phone.clone();
        }
        if let Some(website) = &changes.website {
            identity.website = website.clone();
        }
        if let Some(hash) = &changes.password_hash {
            identity.password_hash = hash.clone();
        }
        identity.updated_at = Utc::now();

        Ok(Some(profile.clone()))
    }

    async fn delete(&self, id: i64) -> Result<bool, RepoError> {
        let mut state = self.state.write().await;
        Ok(state.profiles.remove(&id).is_some())
    }

    async fn count(&self) -> Result<i64, RepoError> {
        let state = self.state.read().await;
        Ok(state.profiles.len() as i64)
    }

    async fn ping(&self) -> Result<(), RepoError> {
        Ok(())
    }
}
