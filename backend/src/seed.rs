//! Sample data import
//!
//! On first start the store is filled with the user list published by
//! JSONPlaceholder (or any service answering in the same format). Every
//! imported identity gets the configured default password. The import is a
//! single transaction and is skipped when the store already has identities.

use crate::auth::PasswordService;
use crate::config::SeedConfig;
use crate::repositories::{IdentityStore, NewAddress, NewCompany, NewIdentity};
use anyhow::{Context, Result};
use serde::Deserialize;
use std::time::Duration;
use tracing::info;
use userbase_shared::types::{AddressInput, CompanyInput};

/// One entry of the `/users` source document
#[derive(Debug, Clone, Deserialize)]
pub struct SeedUser {
    pub name: String,
    pub username: String,
    pub email: String,
    pub phone: String,
    pub website: String,
    pub address: AddressInput,
    pub company: CompanyInput,
}

impl SeedUser {
    fn into_new_identity(self, password_hash: String) -> NewIdentity {
        NewIdentity {
            name: self.name,
            username: self.username,
            email: self.email,
            password_hash,
            phone: self.phone,
            website: self.website,
            address: NewAddress {
                street: self.address.street,
                suite: self.address.suite,
                city: self.address.city,
                zipcode: self.address.zipcode,
                lat: self.address.geo.lat,
                lng: self.address.geo.lng,
            },
            company: NewCompany {
                name: self.company.name,
                catch_phrase: self.company.catch_phrase,
                bs: self.company.bs,
            },
        }
    }
}

/// Download the user list from `url`
pub async fn fetch_users(url: &str) -> Result<Vec<SeedUser>> {
    let client = reqwest::Client::builder()
        .timeout(Duration::from_secs(10))
        .build()?;

    let users = client
        .get(url)
        .send()
        .await
        .with_context(|| format!("Failed to reach seed source {}", url))?
        .error_for_status()?
        .json::<Vec<SeedUser>>()
        .await
        .context("Seed source returned an unexpected document")?;

    Ok(users)
}

/// Import the sample users unless the store already holds identities
///
/// Returns the number of identities written.
pub async fn seed_if_empty(store: &dyn IdentityStore, config: &SeedConfig) -> Result<usize> {
    if store.count().await? > 0 {
        info!("Store already populated, skipping sample data import");
        return Ok(0);
    }

    let users = fetch_users(&config.source_url).await?;

    // One hash shared by all imported accounts; they all start with the same password.
    let password_hash = PasswordService::hash_async(config.default_password.clone()).await?;
    let identities: Vec<NewIdentity> = users
        .into_iter()
        .map(|u| u.into_new_identity(password_hash.clone()))
        .collect();

    let inserted = store.insert_batch(&identities).await?;
    info!(count = inserted, source = %config.source_url, "Imported sample users");

    Ok(inserted)
}
