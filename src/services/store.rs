use async_trait::async_trait;
use thiserror::Error;

use crate::core::distance::is_within_bounding_box;
use crate::core::filters::AttributeFilterSet;
use crate::models::{BoundingBox, Organization, OrganizationWithPets, Pet, PetListing};

/// Errors raised by a persistent store
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("SQLx error: {0}")]
    Sqlx(#[from] sqlx::Error),

    #[error("Migration error: {0}")]
    Migrate(#[from] sqlx::migrate::MigrateError),

    /// A write collided with existing data (duplicate email, missing owner)
    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Store unavailable: {0}")]
    Unavailable(String),
}

/// Access to organizations and their pets
///
/// Each read is expected to return a point-in-time consistent view. The
/// search layer never retries; any retry policy belongs to the
/// implementation.
#[async_trait]
pub trait OrganizationStore: Send + Sync {
    /// All organizations, optionally scoped to a city, with all their pets
    async fn fetch_organizations(
        &self,
        city: Option<&str>,
    ) -> Result<Vec<OrganizationWithPets>, StoreError>;

    /// Organizations located inside `bounds`, optionally scoped to a city
    ///
    /// Stores with a spatial capability should override this; the default
    /// fetches the city and tests each organization against the box.
    async fn fetch_organizations_within(
        &self,
        bounds: &BoundingBox,
        city: Option<&str>,
    ) -> Result<Vec<OrganizationWithPets>, StoreError> {
        let organizations = self.fetch_organizations(city).await?;
        Ok(organizations
            .into_iter()
            .filter(|org| is_within_bounding_box(org.organization.coordinate(), bounds))
            .collect())
    }

    async fn fetch_organization_by_id(
        &self,
        id: &str,
    ) -> Result<Option<OrganizationWithPets>, StoreError>;

    /// Organizations in `city`, each carrying only the pets matching `filter`
    ///
    /// Organizations without matching pets are still returned, with an
    /// empty pet list.
    async fn fetch_organizations_with_filtered_pets(
        &self,
        city: &str,
        filter: Option<&AttributeFilterSet>,
    ) -> Result<Vec<OrganizationWithPets>, StoreError>;

    async fn fetch_pet_by_id(&self, id: &str) -> Result<Option<PetListing>, StoreError>;

    async fn fetch_pets_by_organization(
        &self,
        organization_id: &str,
    ) -> Result<Vec<PetListing>, StoreError>;

    /// Persist a new organization and return it as stored
    ///
    /// Emails are unique; a duplicate yields [`StoreError::Conflict`].
    async fn create_organization(&self, organization: Organization) -> Result<Organization, StoreError>;

    /// Persist a new pet under its `organization_id` and return it as stored
    async fn create_pet(&self, pet: Pet) -> Result<Pet, StoreError>;

    async fn health_check(&self) -> Result<bool, StoreError>;
}
