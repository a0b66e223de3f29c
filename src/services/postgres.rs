use std::collections::HashMap;
use std::time::Duration;

use async_trait::async_trait;
use sqlx::postgres::{PgPoolOptions, PgRow};
use sqlx::{PgPool, Row};
use uuid::Uuid;

use crate::core::filters::AttributeFilterSet;
use crate::models::{BoundingBox, Organization, OrganizationWithPets, Pet, PetListing};
use crate::services::store::{OrganizationStore, StoreError};

// Ids are compared as UUIDs so the primary-key and foreign-key indexes apply;
// only the selected columns are cast to text.

// NUMERIC coordinates are cast to float8 here; distance math runs on f64.
const ORGANIZATION_COLUMNS: &str = r#"
    id::text AS id, name, email, password_hash, whatsapp, address, city,
    latitude::float8 AS latitude, longitude::float8 AS longitude, created_at
"#;

const PET_COLUMNS: &str = r#"
    id::text AS id, name, species, breed, age, size, description,
    organization_id::text AS organization_id, created_at
"#;

/// PostgreSQL-backed organization store
pub struct PostgresStore {
    pool: PgPool,
}

impl PostgresStore {
    /// Create a new store from a connection string
    pub async fn new(
        database_url: &str,
        max_connections: u32,
        min_connections: u32,
        acquire_timeout: Duration,
        idle_timeout: Duration,
    ) -> Result<Self, StoreError> {
        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .min_connections(min_connections)
            .acquire_timeout(acquire_timeout)
            .idle_timeout(idle_timeout)
            .test_before_acquire(true)
            .connect(database_url)
            .await?;

        // Run migrations on startup
        sqlx::migrate!("./migrations").run(&pool).await?;

        Ok(Self { pool })
    }

    /// Create a new store from settings
    pub async fn from_settings(
        url: &str,
        max_connections: Option<u32>,
        min_connections: Option<u32>,
        acquire_timeout_secs: Option<u64>,
        idle_timeout_secs: Option<u64>,
    ) -> Result<Self, StoreError> {
        tracing::info!("Connecting to PostgreSQL");

        Self::new(
            url,
            max_connections.unwrap_or(10),
            min_connections.unwrap_or(1),
            Duration::from_secs(acquire_timeout_secs.unwrap_or(5)),
            Duration::from_secs(idle_timeout_secs.unwrap_or(600)),
        )
        .await
    }

    /// Load pets for the given organizations, applying the optional filter
    /// in SQL, and attach them.
    async fn attach_pets(
        &self,
        organizations: Vec<Organization>,
        filter: Option<&AttributeFilterSet>,
    ) -> Result<Vec<OrganizationWithPets>, StoreError> {
        if organizations.is_empty() {
            return Ok(Vec::new());
        }

        let ids: Vec<Uuid> = organizations
            .iter()
            .filter_map(|org| Uuid::parse_str(&org.id).ok())
            .collect();
        let filter = filter.cloned().unwrap_or_default();

        let query = format!(
            r#"
            SELECT {columns}
            FROM pets
            WHERE organization_id = ANY($1)
              AND ($2::text IS NULL OR species = $2)
              AND ($3::text IS NULL OR breed = $3)
              AND ($4::text IS NULL OR age = $4)
              AND ($5::text IS NULL OR size = $5)
            ORDER BY created_at, id
            "#,
            columns = PET_COLUMNS
        );

        let rows = sqlx::query(&query)
            .bind(ids)
            .bind(filter.species)
            .bind(filter.breed)
            .bind(filter.age)
            .bind(filter.size)
            .fetch_all(&self.pool)
            .await?;

        let mut pets_by_org: HashMap<String, Vec<Pet>> = HashMap::new();
        for row in &rows {
            let pet = pet_from_row(row)?;
            pets_by_org.entry(pet.organization_id.clone()).or_default().push(pet);
        }

        Ok(organizations
            .into_iter()
            .map(|organization| {
                let pets = pets_by_org.remove(&organization.id).unwrap_or_default();
                OrganizationWithPets { organization, pets }
            })
            .collect())
    }

    async fn fetch_organization_row(&self, id: &str) -> Result<Option<Organization>, StoreError> {
        // A malformed id can't match any row
        let Ok(id) = Uuid::parse_str(id) else {
            return Ok(None);
        };

        let query = format!(
            "SELECT {columns} FROM organizations WHERE id = $1",
            columns = ORGANIZATION_COLUMNS
        );

        let row = sqlx::query(&query).bind(id).fetch_optional(&self.pool).await?;
        row.as_ref().map(organization_from_row).transpose().map_err(Into::into)
    }
}

fn organization_from_row(row: &PgRow) -> Result<Organization, sqlx::Error> {
    Ok(Organization {
        id: row.try_get("id")?,
        name: row.try_get("name")?,
        email: row.try_get("email")?,
        password_hash: row.try_get("password_hash")?,
        whatsapp: row.try_get("whatsapp")?,
        address: row.try_get("address")?,
        city: row.try_get("city")?,
        latitude: row.try_get("latitude")?,
        longitude: row.try_get("longitude")?,
        created_at: row.try_get("created_at")?,
    })
}

fn pet_from_row(row: &PgRow) -> Result<Pet, sqlx::Error> {
    Ok(Pet {
        id: row.try_get("id")?,
        name: row.try_get("name")?,
        species: row.try_get("species")?,
        breed: row.try_get("breed")?,
        age: row.try_get("age")?,
        size: row.try_get("size")?,
        description: row.try_get("description")?,
        organization_id: row.try_get("organization_id")?,
        created_at: row.try_get("created_at")?,
    })
}

fn parse_new_id(id: &str) -> Result<Uuid, StoreError> {
    Uuid::parse_str(id).map_err(|e| StoreError::Conflict(format!("id {} is not a UUID: {}", id, e)))
}

fn organizations_from_rows(rows: &[PgRow]) -> Result<Vec<Organization>, sqlx::Error> {
    rows.iter().map(organization_from_row).collect()
}

#[async_trait]
impl OrganizationStore for PostgresStore {
    async fn fetch_organizations(
        &self,
        city: Option<&str>,
    ) -> Result<Vec<OrganizationWithPets>, StoreError> {
        let query = format!(
            r#"
            SELECT {columns}
            FROM organizations
            WHERE ($1::text IS NULL OR city = $1)
            ORDER BY created_at, id
            "#,
            columns = ORGANIZATION_COLUMNS
        );

        let rows = sqlx::query(&query).bind(city).fetch_all(&self.pool).await?;
        let organizations = organizations_from_rows(&rows)?;

        tracing::debug!("Fetched {} organizations (city: {:?})", organizations.len(), city);

        self.attach_pets(organizations, None).await
    }

    async fn fetch_organizations_within(
        &self,
        bounds: &BoundingBox,
        city: Option<&str>,
    ) -> Result<Vec<OrganizationWithPets>, StoreError> {
        let query = format!(
            r#"
            SELECT {columns}
            FROM organizations
            WHERE latitude::float8 BETWEEN $1 AND $2
              AND longitude::float8 BETWEEN $3 AND $4
              AND ($5::text IS NULL OR city = $5)
            ORDER BY created_at, id
            "#,
            columns = ORGANIZATION_COLUMNS
        );

        let rows = sqlx::query(&query)
            .bind(bounds.min_lat)
            .bind(bounds.max_lat)
            .bind(bounds.min_lon)
            .bind(bounds.max_lon)
            .bind(city)
            .fetch_all(&self.pool)
            .await?;
        let organizations = organizations_from_rows(&rows)?;

        tracing::debug!("Fetched {} organizations inside {:?}", organizations.len(), bounds);

        self.attach_pets(organizations, None).await
    }

    async fn fetch_organization_by_id(
        &self,
        id: &str,
    ) -> Result<Option<OrganizationWithPets>, StoreError> {
        match self.fetch_organization_row(id).await? {
            Some(organization) => Ok(self.attach_pets(vec![organization], None).await?.pop()),
            None => Ok(None),
        }
    }

    async fn fetch_organizations_with_filtered_pets(
        &self,
        city: &str,
        filter: Option<&AttributeFilterSet>,
    ) -> Result<Vec<OrganizationWithPets>, StoreError> {
        let query = format!(
            r#"
            SELECT {columns}
            FROM organizations
            WHERE city = $1
            ORDER BY created_at, id
            "#,
            columns = ORGANIZATION_COLUMNS
        );

        let rows = sqlx::query(&query).bind(city).fetch_all(&self.pool).await?;
        let organizations = organizations_from_rows(&rows)?;

        self.attach_pets(organizations, filter).await
    }

    async fn fetch_pet_by_id(&self, id: &str) -> Result<Option<PetListing>, StoreError> {
        let Ok(id) = Uuid::parse_str(id) else {
            return Ok(None);
        };

        let query = format!("SELECT {columns} FROM pets WHERE id = $1", columns = PET_COLUMNS);

        let row = sqlx::query(&query).bind(id).fetch_optional(&self.pool).await?;
        let pet = match row {
            Some(row) => pet_from_row(&row)?,
            None => return Ok(None),
        };

        let organization = self
            .fetch_organization_row(&pet.organization_id)
            .await?
            .ok_or_else(|| {
                StoreError::Unavailable(format!("pet {} references a missing organization", pet.id))
            })?;

        Ok(Some(PetListing { pet, organization }))
    }

    async fn fetch_pets_by_organization(
        &self,
        organization_id: &str,
    ) -> Result<Vec<PetListing>, StoreError> {
        let organization = match self.fetch_organization_row(organization_id).await? {
            Some(organization) => organization,
            None => return Ok(Vec::new()),
        };
        let owner_id = Uuid::parse_str(&organization.id)
            .map_err(|e| StoreError::Unavailable(format!("stored organization id is not a UUID: {}", e)))?;

        let query = format!(
            "SELECT {columns} FROM pets WHERE organization_id = $1 ORDER BY created_at, id",
            columns = PET_COLUMNS
        );

        let rows = sqlx::query(&query)
            .bind(owner_id)
            .fetch_all(&self.pool)
            .await?;

        rows.iter()
            .map(|row| {
                Ok(PetListing {
                    pet: pet_from_row(row)?,
                    organization: organization.clone(),
                })
            })
            .collect::<Result<Vec<_>, sqlx::Error>>()
            .map_err(Into::into)
    }

    async fn create_organization(&self, organization: Organization) -> Result<Organization, StoreError> {
        let id = parse_new_id(&organization.id)?;
        let query = format!(
            r#"
            INSERT INTO organizations
                (id, name, email, password_hash, whatsapp, address, city, latitude, longitude)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8::float8::numeric, $9::float8::numeric)
            RETURNING {columns}
            "#,
            columns = ORGANIZATION_COLUMNS
        );

        let row = sqlx::query(&query)
            .bind(id)
            .bind(&organization.name)
            .bind(&organization.email)
            .bind(&organization.password_hash)
            .bind(&organization.whatsapp)
            .bind(&organization.address)
            .bind(&organization.city)
            .bind(organization.latitude)
            .bind(organization.longitude)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| {
                if let sqlx::Error::Database(db) = &e {
                    if db.is_unique_violation() {
                        return StoreError::Conflict(format!("email {} already registered", organization.email));
                    }
                }
                StoreError::Sqlx(e)
            })?;

        tracing::info!("Created organization {} in {}", organization.id, organization.city);

        organization_from_row(&row).map_err(Into::into)
    }

    async fn create_pet(&self, pet: Pet) -> Result<Pet, StoreError> {
        let id = parse_new_id(&pet.id)?;
        let owner_id = parse_new_id(&pet.organization_id)?;
        let query = format!(
            r#"
            INSERT INTO pets
                (id, name, species, breed, age, size, description, organization_id)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING {columns}
            "#,
            columns = PET_COLUMNS
        );

        let row = sqlx::query(&query)
            .bind(id)
            .bind(&pet.name)
            .bind(&pet.species)
            .bind(&pet.breed)
            .bind(&pet.age)
            .bind(&pet.size)
            .bind(&pet.description)
            .bind(owner_id)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| {
                if let sqlx::Error::Database(db) = &e {
                    if db.is_foreign_key_violation() {
                        return StoreError::Conflict(format!("organization {} does not exist", pet.organization_id));
                    }
                }
                StoreError::Sqlx(e)
            })?;

        tracing::info!("Created pet {} for organization {}", pet.id, pet.organization_id);

        pet_from_row(&row).map_err(Into::into)
    }

    /// Health check for the database connection
    async fn health_check(&self) -> Result<bool, StoreError> {
        sqlx::query("SELECT 1")
            .fetch_one(&self.pool)
            .await
            .map(|_| true)
            .map_err(Into::into)
    }
}
