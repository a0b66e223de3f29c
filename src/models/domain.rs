use serde::{Deserialize, Serialize};

use crate::error::SearchError;

/// Geographic point in decimal degrees
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinate {
    pub latitude: f64,
    pub longitude: f64,
}

impl Coordinate {
    pub const fn new(latitude: f64, longitude: f64) -> Self {
        Self { latitude, longitude }
    }

    /// Build a coordinate, rejecting non-finite or out-of-range values
    pub fn validated(latitude: f64, longitude: f64) -> Result<Self, SearchError> {
        let coordinate = Self::new(latitude, longitude);
        if coordinate.is_valid() {
            Ok(coordinate)
        } else {
            Err(SearchError::InvalidInput(format!(
                "coordinate out of range: ({}, {})",
                latitude, longitude
            )))
        }
    }

    pub fn is_valid(&self) -> bool {
        self.latitude.is_finite()
            && self.longitude.is_finite()
            && (-90.0..=90.0).contains(&self.latitude)
            && (-180.0..=180.0).contains(&self.longitude)
    }
}

impl From<Coordinate> for geo::Point<f64> {
    fn from(value: Coordinate) -> Self {
        geo::Point::new(value.longitude, value.latitude)
    }
}

/// Adoption organization (shelter, NGO, rescue group)
///
/// Coordinates are persisted as fixed-precision decimals and converted to
/// `f64` when loaded; the precision loss only affects distance math.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Organization {
    pub id: String,
    pub name: String,
    pub email: String,
    #[serde(skip_serializing, default)]
    pub password_hash: String,
    #[serde(default)]
    pub whatsapp: String,
    pub address: String,
    pub city: String,
    pub latitude: f64,
    pub longitude: f64,
    #[serde(rename = "createdAt", default)]
    pub created_at: Option<chrono::DateTime<chrono::Utc>>,
}

impl Organization {
    pub fn coordinate(&self) -> Coordinate {
        Coordinate::new(self.latitude, self.longitude)
    }
}

/// Adoptable pet, always owned by exactly one organization
///
/// `age` (puppy, adult, senior) and `size` (small, medium, large) are kept
/// as free text; filtering compares them verbatim.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Pet {
    pub id: String,
    pub name: String,
    pub species: String,
    #[serde(default)]
    pub breed: Option<String>,
    pub age: String,
    pub size: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(rename = "organizationId")]
    pub organization_id: String,
    #[serde(rename = "createdAt", default)]
    pub created_at: Option<chrono::DateTime<chrono::Utc>>,
}

/// Organization as fetched with its (possibly pre-filtered) pets
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrganizationWithPets {
    #[serde(flatten)]
    pub organization: Organization,
    #[serde(default)]
    pub pets: Vec<Pet>,
}

/// Pet together with a back-reference to its owning organization
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PetListing {
    #[serde(flatten)]
    pub pet: Pet,
    pub organization: Organization,
}

/// Entity annotated with its distance from the search origin.
/// Never persisted.
#[derive(Debug, Clone, Serialize)]
pub struct ProximityResult<T> {
    #[serde(flatten)]
    pub entity: T,
    #[serde(rename = "distanceKm")]
    pub distance_km: f64,
}

impl<T> ProximityResult<T> {
    pub fn new(entity: T, distance_km: f64) -> Self {
        Self { entity, distance_km }
    }
}

/// Geospatial bounding box
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundingBox {
    pub min_lat: f64,
    pub max_lat: f64,
    pub min_lon: f64,
    pub max_lon: f64,
}

impl BoundingBox {
    /// True when the box can't be expressed as plain lat/lon ranges
    /// (it reaches over a pole or the antimeridian).
    pub fn is_degenerate(&self) -> bool {
        let bounds = [self.min_lat, self.max_lat, self.min_lon, self.max_lon];
        bounds.iter().any(|v| !v.is_finite())
            || self.min_lat < -90.0
            || self.max_lat > 90.0
            || self.min_lon < -180.0
            || self.max_lon > 180.0
    }
}
