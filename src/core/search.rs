use std::fmt;
use std::sync::Arc;

use serde::Deserialize;

use crate::core::{
    distance::{calculate_bounding_box, haversine_distance},
    filters::AttributeFilterSet,
    ranker::{distance_within, rank_by_proximity, sort_by_distance},
};
use crate::error::SearchError;
use crate::models::{Coordinate, Organization, OrganizationWithPets, PetListing, ProximityResult};
use crate::services::OrganizationStore;

/// How candidate organizations are pulled from the store
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FetchStrategy {
    /// Every organization in the city (or the whole store)
    #[default]
    Scan,
    /// Only organizations inside the search circle's bounding box
    BoundingBox,
}

/// Proximity search over organizations and their pets
///
/// Holds no per-query state; every call is an independent read over the
/// store's snapshot at call time.
///
/// # Query flow
/// 1. Fetch candidates (city scope, attribute filter pushed to the store)
/// 2. Distance-annotate and drop everything outside the radius
/// 3. Sort ascending by distance
#[derive(Clone)]
pub struct ProximitySearch {
    store: Arc<dyn OrganizationStore>,
    strategy: FetchStrategy,
}

impl fmt::Debug for ProximitySearch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProximitySearch")
            .field("strategy", &self.strategy)
            .finish_non_exhaustive()
    }
}

fn ensure_origin(origin: Coordinate) -> Result<(), SearchError> {
    if origin.is_valid() {
        Ok(())
    } else {
        Err(SearchError::InvalidInput(format!(
            "origin out of range: ({}, {})",
            origin.latitude, origin.longitude
        )))
    }
}

fn ensure_radius(max_distance_km: f64) -> Result<(), SearchError> {
    if max_distance_km.is_finite() {
        Ok(())
    } else {
        Err(SearchError::InvalidInput(format!(
            "max distance must be finite, got {}",
            max_distance_km
        )))
    }
}

impl ProximitySearch {
    pub fn new(store: Arc<dyn OrganizationStore>) -> Self {
        Self::with_strategy(store, FetchStrategy::default())
    }

    pub fn with_strategy(store: Arc<dyn OrganizationStore>, strategy: FetchStrategy) -> Self {
        Self { store, strategy }
    }

    pub fn strategy(&self) -> FetchStrategy {
        self.strategy
    }

    /// Organizations within `max_distance_km` of `origin`, nearest first
    ///
    /// Without a city the candidate set is the entire store.
    pub async fn find_nearby_organizations(
        &self,
        origin: Coordinate,
        max_distance_km: f64,
        city: Option<&str>,
    ) -> Result<Vec<ProximityResult<OrganizationWithPets>>, SearchError> {
        ensure_origin(origin)?;
        ensure_radius(max_distance_km)?;

        let candidates = match self.strategy {
            FetchStrategy::BoundingBox => {
                let bounds = calculate_bounding_box(origin, max_distance_km.max(0.0));
                if bounds.is_degenerate() {
                    tracing::debug!("Bounding box {:?} not usable, scanning", bounds);
                    self.store.fetch_organizations(city).await?
                } else {
                    self.store.fetch_organizations_within(&bounds, city).await?
                }
            }
            FetchStrategy::Scan => self.store.fetch_organizations(city).await?,
        };

        let total_candidates = candidates.len();
        let ranked = rank_by_proximity(
            origin,
            max_distance_km,
            candidates.into_iter().map(|org| {
                let point = org.organization.coordinate();
                (org, point)
            }),
        );

        tracing::debug!(
            "Nearby organizations: {} of {} candidates within {} km (city: {:?})",
            ranked.len(),
            total_candidates,
            max_distance_km,
            city
        );

        Ok(ranked)
    }

    /// Distance from `origin` to a single organization, without radius filtering
    pub async fn get_organization_distance(
        &self,
        organization_id: &str,
        origin: Coordinate,
    ) -> Result<ProximityResult<Organization>, SearchError> {
        ensure_origin(origin)?;

        let organization = self.find_organization(organization_id).await?.organization;
        let distance_km = haversine_distance(origin, organization.coordinate());

        Ok(ProximityResult::new(organization, distance_km))
    }

    /// Pets of organizations within the radius, nearest organization first
    ///
    /// Proximity is judged at the organization's location: a matching pet
    /// of an out-of-radius organization is never returned. Pets of the same
    /// organization share its distance and stay adjacent.
    pub async fn find_nearby_pets(
        &self,
        origin: Coordinate,
        max_distance_km: f64,
        city: &str,
        filter: Option<&AttributeFilterSet>,
    ) -> Result<Vec<ProximityResult<PetListing>>, SearchError> {
        ensure_origin(origin)?;
        ensure_radius(max_distance_km)?;

        let filter = filter.filter(|f| !f.is_empty());
        let organizations = self
            .store
            .fetch_organizations_with_filtered_pets(city, filter)
            .await?;

        let ranked = rank_by_proximity(
            origin,
            max_distance_km,
            organizations.into_iter().map(|org| {
                let point = org.organization.coordinate();
                (org, point)
            }),
        );
        let nearby_organizations = ranked.len();

        let mut pets: Vec<ProximityResult<PetListing>> = ranked
            .into_iter()
            .flat_map(|result| {
                let distance_km = result.distance_km;
                let OrganizationWithPets { organization, pets } = result.entity;
                pets.into_iter().map(move |pet| {
                    ProximityResult::new(
                        PetListing {
                            pet,
                            organization: organization.clone(),
                        },
                        distance_km,
                    )
                })
            })
            .collect();

        sort_by_distance(&mut pets);

        tracing::debug!(
            "Nearby pets: {} pets from {} organizations within {} km of ({}, {}) in {}",
            pets.len(),
            nearby_organizations,
            max_distance_km,
            origin.latitude,
            origin.longitude,
            city
        );

        Ok(pets)
    }

    /// Pets in `city` matching `filter`
    ///
    /// When both `origin` and `max_distance_km` are given, pets whose
    /// organization lies outside the radius are dropped. The result is not
    /// ordered by distance.
    pub async fn find_pets_by_attributes(
        &self,
        city: &str,
        filter: &AttributeFilterSet,
        origin: Option<Coordinate>,
        max_distance_km: Option<f64>,
    ) -> Result<Vec<PetListing>, SearchError> {
        let radius = match (origin, max_distance_km) {
            (Some(origin), Some(max_distance_km)) => {
                ensure_origin(origin)?;
                ensure_radius(max_distance_km)?;
                Some((origin, max_distance_km))
            }
            _ => None,
        };

        let filter = Some(filter).filter(|f| !f.is_empty());
        let organizations = self
            .store
            .fetch_organizations_with_filtered_pets(city, filter)
            .await?;

        let pets: Vec<PetListing> = organizations
            .into_iter()
            .filter(|org| match radius {
                Some((origin, max_distance_km)) => {
                    distance_within(origin, max_distance_km, org.organization.coordinate()).is_some()
                }
                None => true,
            })
            .flat_map(|OrganizationWithPets { organization, pets }| {
                pets.into_iter().map(move |pet| PetListing {
                    pet,
                    organization: organization.clone(),
                })
            })
            .collect();

        tracing::debug!("Pet search in {}: {} matches", city, pets.len());

        Ok(pets)
    }

    /// Single organization with its pets
    pub async fn find_organization(
        &self,
        organization_id: &str,
    ) -> Result<OrganizationWithPets, SearchError> {
        self.store
            .fetch_organization_by_id(organization_id)
            .await?
            .ok_or_else(|| SearchError::NotFound(format!("organization {}", organization_id)))
    }

    pub async fn find_organizations_by_city(
        &self,
        city: &str,
    ) -> Result<Vec<OrganizationWithPets>, SearchError> {
        Ok(self.store.fetch_organizations(Some(city)).await?)
    }

    pub async fn find_pet(&self, pet_id: &str) -> Result<PetListing, SearchError> {
        self.store
            .fetch_pet_by_id(pet_id)
            .await?
            .ok_or_else(|| SearchError::NotFound(format!("pet {}", pet_id)))
    }

    pub async fn find_pets_by_organization(
        &self,
        organization_id: &str,
    ) -> Result<Vec<PetListing>, SearchError> {
        Ok(self.store.fetch_pets_by_organization(organization_id).await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Pet;
    use crate::services::InMemoryStore;

    fn create_organization(id: &str, city: &str, lat: f64, lon: f64, pets: Vec<Pet>) -> OrganizationWithPets {
        OrganizationWithPets {
            organization: Organization {
                id: id.to_string(),
                name: format!("Org {}", id),
                email: format!("{}@example.org", id),
                password_hash: "hash".to_string(),
                whatsapp: "+1 555 0100".to_string(),
                address: "Main St".to_string(),
                city: city.to_string(),
                latitude: lat,
                longitude: lon,
                created_at: None,
            },
            pets,
        }
    }

    fn create_pet(id: &str, org_id: &str, species: &str) -> Pet {
        Pet {
            id: id.to_string(),
            name: format!("Pet {}", id),
            species: species.to_string(),
            breed: None,
            age: "adult".to_string(),
            size: "medium".to_string(),
            description: None,
            organization_id: org_id.to_string(),
            created_at: None,
        }
    }

    fn search(orgs: Vec<OrganizationWithPets>) -> ProximitySearch {
        ProximitySearch::new(Arc::new(InMemoryStore::new(orgs)))
    }

    #[test]
    fn test_origin_point_included() {
        let search = search(vec![create_organization("a", "Nowhere", 0.0, 0.0, vec![])]);

        let result = tokio_test::block_on(search.find_nearby_organizations(
            Coordinate::new(0.0, 0.0),
            0.0,
            None,
        ))
        .unwrap();

        assert_eq!(result.len(), 1);
        assert_eq!(result[0].distance_km, 0.0);
    }

    #[test]
    fn test_invalid_origin_rejected() {
        let search = search(vec![]);

        let err = tokio_test::block_on(search.find_nearby_organizations(
            Coordinate::new(f64::NAN, 0.0),
            10.0,
            None,
        ))
        .unwrap_err();

        assert!(matches!(err, SearchError::InvalidInput(_)));
    }

    #[test]
    fn test_nearby_pets_use_organization_distance() {
        let search = search(vec![create_organization(
            "a",
            "Springfield",
            0.01,
            0.0,
            vec![create_pet("p1", "a", "dog"), create_pet("p2", "a", "cat")],
        )]);

        let pets = tokio_test::block_on(search.find_nearby_pets(
            Coordinate::new(0.0, 0.0),
            5.0,
            "Springfield",
            None,
        ))
        .unwrap();

        assert_eq!(pets.len(), 2);
        assert_eq!(pets[0].distance_km, pets[1].distance_km);
        assert_eq!(pets[0].entity.organization.id, "a");
    }

    #[test]
    fn test_pet_not_found() {
        let search = search(vec![]);

        let err = tokio_test::block_on(search.find_pet("missing")).unwrap_err();
        assert!(matches!(err, SearchError::NotFound(_)));
    }
}
