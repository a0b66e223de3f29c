use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::core::filters::AttributeFilterSet;
use crate::models::domain::Coordinate;

/// Query for `GET /organizations/nearby`
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct NearbyOrganizationsQuery {
    #[validate(range(min = -90.0, max = 90.0))]
    pub latitude: f64,
    #[validate(range(min = -180.0, max = 180.0))]
    pub longitude: f64,
    #[validate(range(min = 0.0))]
    #[serde(rename = "maxDistance")]
    pub max_distance: f64,
    #[serde(default)]
    pub city: Option<String>,
}

impl NearbyOrganizationsQuery {
    pub fn origin(&self) -> Coordinate {
        Coordinate::new(self.latitude, self.longitude)
    }
}

/// Query for `GET /organizations/{id}/distance`
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct OrganizationDistanceQuery {
    #[validate(range(min = -90.0, max = 90.0))]
    pub latitude: f64,
    #[validate(range(min = -180.0, max = 180.0))]
    pub longitude: f64,
}

impl OrganizationDistanceQuery {
    pub fn origin(&self) -> Coordinate {
        Coordinate::new(self.latitude, self.longitude)
    }
}

/// Query for `GET /pets/nearby`
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct NearbyPetsQuery {
    #[validate(range(min = -90.0, max = 90.0))]
    pub latitude: f64,
    #[validate(range(min = -180.0, max = 180.0))]
    pub longitude: f64,
    #[validate(range(min = 0.0))]
    #[serde(rename = "maxDistance")]
    pub max_distance: f64,
    #[validate(length(min = 1))]
    pub city: String,
    #[serde(default)]
    pub species: Option<String>,
    #[serde(default)]
    pub breed: Option<String>,
    #[serde(default)]
    pub age: Option<String>,
    #[serde(default)]
    pub size: Option<String>,
}

impl NearbyPetsQuery {
    pub fn origin(&self) -> Coordinate {
        Coordinate::new(self.latitude, self.longitude)
    }

    pub fn attributes(&self) -> AttributeFilterSet {
        AttributeFilterSet::from_parts(&self.species, &self.breed, &self.age, &self.size)
    }
}

/// Query for `GET /pets/search`
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct SearchPetsQuery {
    #[validate(length(min = 1))]
    pub city: String,
    #[serde(default)]
    pub species: Option<String>,
    #[serde(default)]
    pub breed: Option<String>,
    #[serde(default)]
    pub age: Option<String>,
    #[serde(default)]
    pub size: Option<String>,
    #[validate(range(min = -90.0, max = 90.0))]
    #[serde(default)]
    pub latitude: Option<f64>,
    #[validate(range(min = -180.0, max = 180.0))]
    #[serde(default)]
    pub longitude: Option<f64>,
    #[validate(range(min = 0.0))]
    #[serde(rename = "maxDistance", default)]
    pub max_distance: Option<f64>,
}

impl SearchPetsQuery {
    /// Origin is only meaningful when both halves were supplied
    pub fn origin(&self) -> Option<Coordinate> {
        match (self.latitude, self.longitude) {
            (Some(lat), Some(lon)) => Some(Coordinate::new(lat, lon)),
            _ => None,
        }
    }

    pub fn attributes(&self) -> AttributeFilterSet {
        AttributeFilterSet::from_parts(&self.species, &self.breed, &self.age, &self.size)
    }
}

/// Body for `POST /register`
///
/// The password hash is produced by the identity provider; this service
/// only stores it.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct RegisterOrganizationRequest {
    #[validate(length(min = 1))]
    pub name: String,
    #[validate(email)]
    pub email: String,
    #[validate(length(min = 1))]
    #[serde(alias = "password_hash", rename = "passwordHash")]
    pub password_hash: String,
    #[validate(length(min = 1))]
    pub address: String,
    #[validate(length(min = 1))]
    pub city: String,
    #[validate(length(min = 1))]
    pub whatsapp: String,
    #[validate(range(min = -90.0, max = 90.0))]
    pub latitude: f64,
    #[validate(range(min = -180.0, max = 180.0))]
    pub longitude: f64,
}

impl RegisterOrganizationRequest {
    pub fn location(&self) -> Coordinate {
        Coordinate::new(self.latitude, self.longitude)
    }
}

/// Body for `POST /pets`; the owner comes from the bearer token
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct CreatePetRequest {
    #[validate(length(min = 1))]
    pub name: String,
    #[validate(length(min = 1))]
    pub species: String,
    #[serde(default)]
    pub breed: Option<String>,
    #[validate(length(min = 1))]
    pub age: String,
    #[validate(length(min = 1))]
    pub size: String,
    #[serde(default)]
    pub description: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_nearby_query_rejects_out_of_range_latitude() {
        let query = NearbyOrganizationsQuery {
            latitude: 120.0,
            longitude: 0.0,
            max_distance: 10.0,
            city: None,
        };
        assert!(query.validate().is_err());
    }

    #[test]
    fn test_search_query_origin_requires_both_halves() {
        let query = SearchPetsQuery {
            city: "Springfield".to_string(),
            species: None,
            breed: None,
            age: None,
            size: None,
            latitude: Some(1.0),
            longitude: None,
            max_distance: Some(5.0),
        };
        assert!(query.origin().is_none());
        assert!(query.validate().is_ok());
    }

    #[test]
    fn test_register_request_rejects_bad_email() {
        let request: RegisterOrganizationRequest = serde_json::from_value(serde_json::json!({
            "name": "Happy Paws",
            "email": "not-an-email",
            "passwordHash": "$2b$06$abc",
            "address": "Rua A, 10",
            "city": "Campinas",
            "whatsapp": "+55 19 99999-0000",
            "latitude": -22.9,
            "longitude": -47.06
        }))
        .unwrap();

        assert!(request.validate().is_err());
    }
}
