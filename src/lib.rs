//! Pet Radar - proximity search for adoptable pets
//!
//! This library provides the geospatial search engine behind the pet
//! adoption directory: great-circle distance, attribute filtering, and
//! radius-bounded ranking of organizations and their pets.

pub mod config;
pub mod core;
pub mod error;
pub mod models;
pub mod routes;
pub mod services;

// Re-export commonly used types
pub use crate::core::{haversine_distance, rank_by_proximity, AttributeFilterSet, FetchStrategy, ProximitySearch, Registry};
pub use error::SearchError;
pub use models::{Coordinate, Organization, OrganizationWithPets, Pet, PetListing, ProximityResult};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_library_exports() {
        let here = Coordinate::new(-23.5505, -46.6333);
        assert_eq!(haversine_distance(here, here), 0.0);
    }
}
