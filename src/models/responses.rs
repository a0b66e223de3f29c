use serde::{Deserialize, Serialize};

use crate::models::domain::{
    Organization, OrganizationWithPets, Pet, PetListing, ProximityResult,
};

/// Response for nearby organization search
#[derive(Debug, Clone, Serialize)]
pub struct NearbyOrganizationsResponse {
    pub organizations: Vec<ProximityResult<OrganizationWithPets>>,
}

/// Response for organization listings without distance
#[derive(Debug, Clone, Serialize)]
pub struct OrganizationsResponse {
    pub organizations: Vec<OrganizationWithPets>,
}

/// Single organization profile
#[derive(Debug, Clone, Serialize)]
pub struct OrganizationResponse {
    pub organization: OrganizationWithPets,
}

/// Organization plus its distance from the caller
#[derive(Debug, Clone, Serialize)]
pub struct OrganizationDistanceResponse {
    pub organization: Organization,
    pub distance: f64,
}

impl From<ProximityResult<Organization>> for OrganizationDistanceResponse {
    fn from(value: ProximityResult<Organization>) -> Self {
        Self {
            organization: value.entity,
            distance: value.distance_km,
        }
    }
}

/// Response for nearby pet search
#[derive(Debug, Clone, Serialize)]
pub struct NearbyPetsResponse {
    pub pets: Vec<ProximityResult<PetListing>>,
}

/// Response for attribute pet search and per-organization listings
#[derive(Debug, Clone, Serialize)]
pub struct PetsResponse {
    pub pets: Vec<PetListing>,
}

/// Single pet details
#[derive(Debug, Clone, Serialize)]
pub struct PetResponse {
    pub pet: PetListing,
}

/// Response for `POST /register`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegisteredOrganizationResponse {
    #[serde(rename = "organizationId")]
    pub organization_id: String,
}

/// Response for `POST /pets`
#[derive(Debug, Clone, Serialize)]
pub struct CreatedPetResponse {
    pub pet: Pet,
}

/// Health check response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub timestamp: chrono::DateTime<chrono::Utc>,
}

/// Error response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
    pub status_code: u16,
}
