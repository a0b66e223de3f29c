use async_trait::async_trait;
use parking_lot::RwLock;

use crate::core::filters::{matches, AttributeFilterSet};
use crate::models::{Organization, OrganizationWithPets, Pet, PetListing};
use crate::services::store::{OrganizationStore, StoreError};

/// Store holding organizations and pets in memory
///
/// Used for tests, benchmarks and local runs without PostgreSQL. Results
/// come back in insertion order; every read clones a snapshot under the
/// read lock.
#[derive(Debug, Default)]
pub struct InMemoryStore {
    organizations: RwLock<Vec<OrganizationWithPets>>,
}

impl InMemoryStore {
    pub fn new(organizations: Vec<OrganizationWithPets>) -> Self {
        Self {
            organizations: RwLock::new(organizations),
        }
    }

    /// Number of organizations held
    pub fn len(&self) -> usize {
        self.organizations.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.organizations.read().is_empty()
    }
}

fn in_city<'a>(
    organizations: &'a [OrganizationWithPets],
    city: Option<&'a str>,
) -> impl Iterator<Item = &'a OrganizationWithPets> + 'a {
    organizations
        .iter()
        .filter(move |org| city.map_or(true, |c| org.organization.city == c))
}

#[async_trait]
impl OrganizationStore for InMemoryStore {
    async fn fetch_organizations(
        &self,
        city: Option<&str>,
    ) -> Result<Vec<OrganizationWithPets>, StoreError> {
        let organizations = self.organizations.read();
        Ok(in_city(&organizations, city).cloned().collect())
    }

    async fn fetch_organization_by_id(
        &self,
        id: &str,
    ) -> Result<Option<OrganizationWithPets>, StoreError> {
        Ok(self
            .organizations
            .read()
            .iter()
            .find(|org| org.organization.id == id)
            .cloned())
    }

    async fn fetch_organizations_with_filtered_pets(
        &self,
        city: &str,
        filter: Option<&AttributeFilterSet>,
    ) -> Result<Vec<OrganizationWithPets>, StoreError> {
        let organizations = self.organizations.read();
        Ok(in_city(&organizations, Some(city))
            .map(|org| OrganizationWithPets {
                organization: org.organization.clone(),
                pets: org
                    .pets
                    .iter()
                    .filter(|pet| filter.map_or(true, |f| matches(*pet, f)))
                    .cloned()
                    .collect(),
            })
            .collect())
    }

    async fn fetch_pet_by_id(&self, id: &str) -> Result<Option<PetListing>, StoreError> {
        Ok(self.organizations.read().iter().find_map(|org| {
            org.pets.iter().find(|pet| pet.id == id).map(|pet| PetListing {
                pet: pet.clone(),
                organization: org.organization.clone(),
            })
        }))
    }

    async fn fetch_pets_by_organization(
        &self,
        organization_id: &str,
    ) -> Result<Vec<PetListing>, StoreError> {
        Ok(self
            .organizations
            .read()
            .iter()
            .filter(|org| org.organization.id == organization_id)
            .flat_map(|org| {
                org.pets.iter().map(move |pet| PetListing {
                    pet: pet.clone(),
                    organization: org.organization.clone(),
                })
            })
            .collect())
    }

    async fn create_organization(&self, mut organization: Organization) -> Result<Organization, StoreError> {
        let mut organizations = self.organizations.write();
        if organizations
            .iter()
            .any(|org| org.organization.email == organization.email)
        {
            return Err(StoreError::Conflict(format!(
                "email {} already registered",
                organization.email
            )));
        }

        if organization.created_at.is_none() {
            organization.created_at = Some(chrono::Utc::now());
        }
        organizations.push(OrganizationWithPets {
            organization: organization.clone(),
            pets: Vec::new(),
        });

        Ok(organization)
    }

    async fn create_pet(&self, mut pet: Pet) -> Result<Pet, StoreError> {
        let mut organizations = self.organizations.write();
        let owner = organizations
            .iter_mut()
            .find(|org| org.organization.id == pet.organization_id)
            .ok_or_else(|| {
                StoreError::Conflict(format!("organization {} does not exist", pet.organization_id))
            })?;

        if pet.created_at.is_none() {
            pet.created_at = Some(chrono::Utc::now());
        }
        owner.pets.push(pet.clone());

        Ok(pet)
    }

    async fn health_check(&self) -> Result<bool, StoreError> {
        Ok(true)
    }
}
