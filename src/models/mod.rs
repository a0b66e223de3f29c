// Model exports
pub mod domain;
pub mod requests;
pub mod responses;

pub use domain::{BoundingBox, Coordinate, Organization, OrganizationWithPets, Pet, PetListing, ProximityResult};
pub use requests::{
    CreatePetRequest, NearbyOrganizationsQuery, NearbyPetsQuery, OrganizationDistanceQuery,
    RegisterOrganizationRequest, SearchPetsQuery,
};
pub use responses::{
    CreatedPetResponse, ErrorResponse, HealthResponse, NearbyOrganizationsResponse, NearbyPetsResponse,
    OrganizationDistanceResponse, OrganizationResponse, OrganizationsResponse, PetResponse,
    PetsResponse, RegisteredOrganizationResponse,
};
