use std::fmt;
use std::sync::Arc;

use uuid::Uuid;

use crate::error::SearchError;
use crate::models::{
    Coordinate, CreatePetRequest, Organization, Pet, RegisterOrganizationRequest,
};
use crate::services::{OrganizationStore, StoreError};

/// Writes new organizations and pets into the store
///
/// Ids are assigned here as v4 UUIDs; creation timestamps come from the
/// store.
#[derive(Clone)]
pub struct Registry {
    store: Arc<dyn OrganizationStore>,
}

impl fmt::Debug for Registry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Registry").finish_non_exhaustive()
    }
}

fn conflict_or_store(err: StoreError) -> SearchError {
    match err {
        StoreError::Conflict(message) => SearchError::Conflict(message),
        other => SearchError::Store(other),
    }
}

impl Registry {
    pub fn new(store: Arc<dyn OrganizationStore>) -> Self {
        Self { store }
    }

    /// Create an organization; a duplicate email is a [`SearchError::Conflict`]
    pub async fn register_organization(
        &self,
        request: RegisterOrganizationRequest,
    ) -> Result<Organization, SearchError> {
        let location = Coordinate::validated(request.latitude, request.longitude)?;

        let organization = Organization {
            id: Uuid::new_v4().to_string(),
            name: request.name,
            email: request.email,
            password_hash: request.password_hash,
            whatsapp: request.whatsapp,
            address: request.address,
            city: request.city,
            latitude: location.latitude,
            longitude: location.longitude,
            created_at: None,
        };

        let created = self
            .store
            .create_organization(organization)
            .await
            .map_err(conflict_or_store)?;

        tracing::info!("Registered organization {} ({})", created.id, created.city);

        Ok(created)
    }

    /// Add a pet to an existing organization
    pub async fn add_pet(
        &self,
        organization_id: &str,
        request: CreatePetRequest,
    ) -> Result<Pet, SearchError> {
        if self.store.fetch_organization_by_id(organization_id).await?.is_none() {
            return Err(SearchError::NotFound(format!("organization {}", organization_id)));
        }

        let pet = Pet {
            id: Uuid::new_v4().to_string(),
            name: request.name,
            species: request.species,
            breed: request.breed.filter(|breed| !breed.is_empty()),
            age: request.age,
            size: request.size,
            description: request.description,
            organization_id: organization_id.to_string(),
            created_at: None,
        };

        let created = self.store.create_pet(pet).await.map_err(conflict_or_store)?;

        tracing::info!("Added pet {} to organization {}", created.id, organization_id);

        Ok(created)
    }
}
