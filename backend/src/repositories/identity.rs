//! Identity repository for database operations

use super::{IdentityStore, RepoError};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{PgPool, Postgres, Transaction};
use userbase_shared::types::{
    AddressResponse, CompanyResponse, GeoResponse, RegisterRequest, UserResponse,
};

/// Identity record from database
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct IdentityRecord {
    pub id: i64,
    pub name: String,
    pub username: String,
    pub email: String,
    pub password_hash: String,
    pub phone: String,
    pub website: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Address record from database
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct AddressRecord {
    pub id: i64,
    pub user_id: i64,
    pub street: String,
    pub suite: String,
    pub city: String,
    pub zipcode: String,
}

/// Geolocation record from database
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct GeoRecord {
    pub id: i64,
    pub address_id: i64,
    pub lat: String,
    pub lng: String,
}

/// Company record from database
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct CompanyRecord {
    pub id: i64,
    pub user_id: i64,
    pub name: String,
    pub catch_phrase: String,
    pub bs: String,
}

/// An identity with all of its profile sub-records
#[derive(Debug, Clone)]
pub struct IdentityProfile {
    pub identity: IdentityRecord,
    pub address: AddressRecord,
    pub geo: GeoRecord,
    pub company: CompanyRecord,
}

impl From<IdentityProfile> for UserResponse {
    fn from(profile: IdentityProfile) -> Self {
        let IdentityProfile {
            identity,
            address,
            geo,
            company,
        } = profile;

        UserResponse {
            id: identity.id,
            name: identity.name,
            username: identity.username,
            email: identity.email,
            phone: identity.phone,
            website: identity.website,
            address: AddressResponse {
                id: address.id,
                user_id: address.user_id,
                street: address.street,
                suite: address.suite,
                city: address.city,
                zipcode: address.zipcode,
                geo: GeoResponse {
                    id: geo.id,
                    address_id: geo.address_id,
                    lat: geo.lat,
                    lng: geo.lng,
                },
            },
            company: CompanyResponse {
                id: company.id,
                user_id: company.user_id,
                name: company.name,
                catch_phrase: company.catch_phrase,
                bs: company.bs,
            },
        }
    }
}

/// Input for creating an address together with its geolocation
#[derive(Debug, Clone)]
pub struct NewAddress {
    pub street: String,
    pub suite: String,
    pub city: String,
    pub zipcode: String,
    pub lat: String,
    pub lng: String,
}

/// Input for creating a company
#[derive(Debug, Clone)]
pub struct NewCompany {
    pub name: String,
    pub catch_phrase: String,
    pub bs: String,
}

/// Input for creating an identity with its profile
#[derive(Debug, Clone)]
pub struct NewIdentity {
    pub name: String,
    pub username: String,
    pub email: String,
    pub password_hash: String,
    pub phone: String,
    pub website: String,
    pub address: NewAddress,
    pub company: NewCompany,
}

impl NewIdentity {
    /// Build from a registration request; the plaintext password is dropped
    pub fn from_registration(req: RegisterRequest, password_hash: String) -> Self {
        Self {
            name: req.name,
            username: req.username,
            email: req.email,
            password_hash,
            phone: req.phone,
            website: req.website,
            address: NewAddress {
                street: req.address.street,
                suite: req.address.suite,
                city: req.address.city,
                zipcode: req.address.zipcode,
                lat: req.address.geo.lat,
                lng: req.address.geo.lng,
            },
            company: NewCompany {
                name: req.company.name,
                catch_phrase: req.company.catch_phrase,
                bs: req.company.bs,
            },
        }
    }
}

/// Input for updating an identity
#[derive(Debug, Clone, Default)]
pub struct IdentityChanges {
    pub name: Option<String>,
    pub username: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub website: Option<String>,
    pub password_hash: Option<String>,
}

/// Joined row used to assemble an [`IdentityProfile`]
#[derive(sqlx::FromRow)]
struct ProfileRow {
    id: i64,
    name: String,
    username: String,
    email: String,
    password_hash: String,
    phone: String,
    website: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    address_id: i64,
    street: String,
    suite: String,
    city: String,
    zipcode: String,
    geo_id: i64,
    lat: String,
    lng: String,
    company_id: i64,
    company_name: String,
    catch_phrase: String,
    bs: String,
}

impl From<ProfileRow> for IdentityProfile {
    fn from(row: ProfileRow) -> Self {
        IdentityProfile {
            address: AddressRecord {
                id: row.address_id,
                user_id: row.id,
                street: row.street,
                suite: row.suite,
                city: row.city,
                zipcode: row.zipcode,
            },
            geo: GeoRecord {
                id: row.geo_id,
                address_id: row.address_id,
                lat: row.lat,
                lng: row.lng,
            },
            company: CompanyRecord {
                id: row.company_id,
                user_id: row.id,
                name: row.company_name,
                catch_phrase: row.catch_phrase,
                bs: row.bs,
            },
            identity: IdentityRecord {
                id: row.id,
                name: row.name,
                username: row.username,
                email: row.email,
                password_hash: row.password_hash,
                phone: row.phone,
                website: row.website,
                created_at: row.created_at,
                updated_at: row.updated_at,
            },
        }
    }
}

const IDENTITY_COLUMNS: &str =
    "id, name, username, email, password_hash, phone, website, created_at, updated_at";

const PROFILE_SELECT: &str = r#"
    SELECT u.id, u.name, u.username, u.email, u.password_hash, u.phone, u.website,
           u.created_at, u.updated_at,
           a.id AS address_id, a.street, a.suite, a.city, a.zipcode,
           g.id AS geo_id, g.lat, g.lng,
           c.id AS company_id, c.name AS company_name, c.catch_phrase, c.bs
    FROM users u
    JOIN addresses a ON a.user_id = u.id
    JOIN geos g ON g.address_id = a.id
    JOIN companies c ON c.user_id = u.id
"#;

/// PostgreSQL-backed identity store
#[derive(Clone)]
pub struct PgIdentityStore {
    pool: PgPool,
}

impl PgIdentityStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Write the four rows of one identity inside an open transaction
    async fn insert_profile(
        tx: &mut Transaction<'_, Postgres>,
        new: &NewIdentity,
    ) -> Result<IdentityProfile, RepoError> {
        let identity = sqlx::query_as::<_, IdentityRecord>(&format!(
            r#"
            INSERT INTO users (name, username, email, password_hash, phone, website)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING {}
            "#,
            IDENTITY_COLUMNS
        ))
        .bind(&new.name)
        .bind(&new.username)
        .bind(&new.email)
        .bind(&new.password_hash)
        .bind(&new.phone)
        .bind(&new.website)
        .fetch_one(&mut **tx)
        .await?;

        let address = sqlx::query_as::<_, AddressRecord>(
            r#"
            INSERT INTO addresses (user_id, street, suite, city, zipcode)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id, user_id, street, suite, city, zipcode
            "#,
        )
        .bind(identity.id)
        .bind(&new.address.street)
        .bind(&new.address.suite)
        .bind(&new.address.city)
        .bind(&new.address.zipcode)
        .fetch_one(&mut **tx)
        .await?;

        let geo = sqlx::query_as::<_, GeoRecord>(
            r#"
            INSERT INTO geos (address_id, lat, lng)
            VALUES ($1, $2, $3)
            RETURNING id, address_id, lat, lng
            "#,
        )
        .bind(address.id)
        .bind(&new.address.lat)
        .bind(&new.address.lng)
        .fetch_one(&mut **tx)
        .await?;

        let company = sqlx::query_as::<_, CompanyRecord>(
            r#"
            INSERT INTO companies (user_id, name, catch_phrase, bs)
            VALUES ($1, $2, $3, $4)
            RETURNING id, user_id, name, catch_phrase, bs
            "#,
        )
        .bind(identity.id)
        .bind(&new.company.name)
        .bind(&new.company.catch_phrase)
        .bind(&new.company.bs)
        .fetch_one(&mut **tx)
        .await?;

        Ok(IdentityProfile {
            identity,
            address,
            geo,
            company,
        })
    }
}

#[async_trait]
impl IdentityStore for PgIdentityStore {
    async fn find_by_username_or_email(
        &self,
        username: &str,
        email: &str,
    ) -> Result<Option<IdentityRecord>, RepoError> {
        let identity = sqlx::query_as::<_, IdentityRecord>(&format!(
            "SELECT {} FROM users WHERE username = $1 OR email = $2 LIMIT 1",
            IDENTITY_COLUMNS
        ))
        .bind(username)
        .bind(email)
        .fetch_optional(&self.pool)
        .await?;

        Ok(identity)
    }

    async fn find_by_username(&self, username: &str) -> Result<Option<IdentityRecord>, RepoError> {
        let identity = sqlx::query_as::<_, IdentityRecord>(&format!(
            "SELECT {} FROM users WHERE username = $1",
            IDENTITY_COLUMNS
        ))
        .bind(username)
        .fetch_optional(&self.pool)
        .await?;

        Ok(identity)
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<IdentityRecord>, RepoError> {
        let identity = sqlx::query_as::<_, IdentityRecord>(&format!(
            "SELECT {} FROM users WHERE id = $1",
            IDENTITY_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(identity)
    }

    async fn find_profile(&self, id: i64) -> Result<Option<IdentityProfile>, RepoError> {
        let row = sqlx::query_as::<_, ProfileRow>(&format!("{} WHERE u.id = $1", PROFILE_SELECT))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(row.map(IdentityProfile::from))
    }

    async fn list_profiles(&self, skip: i64, limit: i64) -> Result<Vec<IdentityProfile>, RepoError> {
        let rows = sqlx::query_as::<_, ProfileRow>(&format!(
            "{} ORDER BY u.id OFFSET $1 LIMIT $2",
            PROFILE_SELECT
        ))
        .bind(skip)
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(IdentityProfile::from).collect())
    }

    async fn insert_with_profile(&self, new: &NewIdentity) -> Result<IdentityProfile, RepoError> {
        // Dropping the transaction on an early return rolls it back.
        let mut tx = self.pool.begin().await?;
        let profile = Self::insert_profile(&mut tx, new).await?;
        tx.commit().await?;

        Ok(profile)
    }

    async fn insert_batch(&self, identities: &[NewIdentity]) -> Result<usize, RepoError> {
        let mut tx = self.pool.begin().await?;
        for new in identities {
            Self::insert_profile(&mut tx, new).await?;
        }
        tx.commit().await?;

        Ok(identities.len())
    }

    async fn update(
        &self,
        id: i64,
        changes: &IdentityChanges,
    ) -> Result<Option<IdentityProfile>, RepoError> {
        let updated = sqlx::query_scalar::<_, i64>(
            r#"
            UPDATE users SET
                name = COALESCE($2, name),
                username = COALESCE($3, username),
                email = COALESCE($4, email),
                phone = COALESCE($5, phone),
                website = COALESCE($6, website),
                password_hash = COALESCE($7, password_hash),
                updated_at = NOW()
            WHERE id = $1
            RETURNING id
            "#,
        )
        .bind(id)
        .bind(changes.name.as_deref())
        .bind(changes.username.as_deref())
        .bind(changes.email.as_deref())
        .bind(changes.phone.as_deref())
        .bind(changes.website.as_deref())
        .bind(changes.password_hash.as_deref())
        .fetch_optional(&self.pool)
        .await?;

        match updated {
            Some(id) => self.find_profile(id).await,
            None => Ok(None),
        }
    }

    async fn delete(&self, id: i64) -> Result<bool, RepoError> {
        let mut tx = self.pool.begin().await?;

        sqlx::query(
            "DELETE FROM geos WHERE address_id IN (SELECT id FROM addresses WHERE user_id = $1)",
        )
        .bind(id)
        .execute(&mut *tx)
        .await?;

        sqlx::query("DELETE FROM addresses WHERE user_id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        sqlx::query("DELETE FROM companies WHERE user_id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        let result = sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;

        Ok(result.rows_affected() > 0)
    }

    async fn count(&self) -> Result<i64, RepoError> {
        let count = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM users")
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }

    async fn ping(&self) -> Result<(), RepoError> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use userbase_shared::types::{AddressInput, CompanyInput, GeoInput};

    fn sample_profile() -> IdentityProfile {
        let now = Utc::now();
        IdentityProfile {
            identity: IdentityRecord {
                id: 1,
                name: "Leanne Graham".to_string(),
                username: "Bret".to_string(),
                email: "Sincere@april.biz".to_string(),
                password_hash: "$argon2id$v=19$secret".to_string(),
                phone: "1-770-736-8031 x56442".to_string(),
                website: "hildegard.org".to_string(),
                created_at: now,
                updated_at: now,
            },
            address: AddressRecord {
                id: 10,
                user_id: 1,
                street: "Kulas Light".to_string(),
                suite: "Apt. 556".to_string(),
                city: "Gwenborough".to_string(),
                zipcode: "92998-3874".to_string(),
            },
            geo: GeoRecord {
                id: 20,
                address_id: 10,
                lat: "-37.3159".to_string(),
                lng: "81.1496".to_string(),
            },
            company: CompanyRecord {
                id: 30,
                user_id: 1,
                name: "Romaguera-Crona".to_string(),
                catch_phrase: "Multi-layered client-server neural-net".to_string(),
                bs: "harness real-time e-markets".to_string(),
            },
        }
    }

    #[test]
    fn test_response_excludes_password_hash() {
        let response = UserResponse::from(sample_profile());
        let json = serde_json::to_value(&response).unwrap();

        assert_eq!(json["username"], "Bret");
        assert_eq!(json["address"]["geo"]["address_id"], 10);
        assert_eq!(json["company"]["catchPhrase"], "Multi-layered client-server neural-net");
        assert!(json.get("password").is_none());
        assert!(json.get("password_hash").is_none());
        assert!(!json.to_string().contains("argon2"));
    }

    #[test]
    fn test_new_identity_from_registration() {
        let req = RegisterRequest {
            name: "Test User".to_string(),
            username: "testuser".to_string(),
            email: "test@example.com".to_string(),
            password: "password123".to_string(),
            phone: "123".to_string(),
            website: "test.com".to_string(),
            address: AddressInput {
                street: "s".to_string(),
                suite: "su".to_string(),
                city: "c".to_string(),
                zipcode: "z".to_string(),
                geo: GeoInput {
                    lat: "1.5".to_string(),
                    lng: "2.5".to_string(),
                },
            },
            company: CompanyInput {
                name: "co".to_string(),
                catch_phrase: "cp".to_string(),
                bs: "bs".to_string(),
            },
        };

        let new = NewIdentity::from_registration(req, "hash".to_string());
        assert_eq!(new.password_hash, "hash");
        assert_eq!(new.address.lat, "1.5");
        assert_eq!(new.company.catch_phrase, "cp");
    }

    // Tests against PostgreSQL live in tests/postgres_integration_test.rs
}
