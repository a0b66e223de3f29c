// Integration tests for Pet Radar

use std::sync::Arc;

use async_trait::async_trait;
use pet_radar::core::{AttributeFilterSet, FetchStrategy, ProximitySearch, Registry};
use pet_radar::models::{
    BoundingBox, Coordinate, CreatePetRequest, Organization, OrganizationWithPets, Pet, PetListing,
    RegisterOrganizationRequest,
};
use pet_radar::services::{InMemoryStore, OrganizationStore, StoreError};
use pet_radar::SearchError;

/// Springfield, IL
const SPRINGFIELD: Coordinate = Coordinate::new(39.7817, -89.6501);

/// Kilometers per degree of latitude on the 6371 km sphere
const KM_PER_DEGREE: f64 = 111.194_926_6;

fn north_of(origin: Coordinate, km: f64) -> Coordinate {
    Coordinate::new(origin.latitude + km / KM_PER_DEGREE, origin.longitude)
}

fn create_test_organization(id: &str, city: &str, at: Coordinate, pets: Vec<Pet>) -> OrganizationWithPets {
    OrganizationWithPets {
        organization: Organization {
            id: id.to_string(),
            name: format!("Shelter {}", id),
            email: format!("{}@shelter.org", id),
            password_hash: "$2b$06$hash".to_string(),
            whatsapp: "+1 555 0100".to_string(),
            address: format!("{} Main St", id),
            city: city.to_string(),
            latitude: at.latitude,
            longitude: at.longitude,
            created_at: None,
        },
        pets,
    }
}

fn create_test_pet(id: &str, org_id: &str, species: &str, age: &str) -> Pet {
    Pet {
        id: id.to_string(),
        name: format!("Pet {}", id),
        species: species.to_string(),
        breed: None,
        age: age.to_string(),
        size: "medium".to_string(),
        description: None,
        organization_id: org_id.to_string(),
        created_at: None,
    }
}

/// Three Springfield shelters at 5, 12 and 50 km plus one in another city
fn springfield_fixture() -> Vec<OrganizationWithPets> {
    vec![
        create_test_organization(
            "far",
            "Springfield",
            north_of(SPRINGFIELD, 50.0),
            vec![create_test_pet("far-cat", "far", "cat", "adult")],
        ),
        create_test_organization(
            "mid",
            "Springfield",
            north_of(SPRINGFIELD, 12.0),
            vec![
                create_test_pet("mid-dog", "mid", "dog", "puppy"),
                create_test_pet("mid-cat", "mid", "cat", "senior"),
            ],
        ),
        create_test_organization(
            "near",
            "Springfield",
            north_of(SPRINGFIELD, 5.0),
            vec![
                create_test_pet("near-dog-1", "near", "dog", "adult"),
                create_test_pet("near-dog-2", "near", "dog", "puppy"),
            ],
        ),
        create_test_organization(
            "elsewhere",
            "Shelbyville",
            north_of(SPRINGFIELD, 3.0),
            vec![create_test_pet("shelby-cat", "elsewhere", "cat", "adult")],
        ),
    ]
}

fn search_over(orgs: Vec<OrganizationWithPets>) -> ProximitySearch {
    ProximitySearch::new(Arc::new(InMemoryStore::new(orgs)))
}

/// Store whose every call fails
struct UnreachableStore;

#[async_trait]
impl OrganizationStore for UnreachableStore {
    async fn fetch_organizations(&self, _city: Option<&str>) -> Result<Vec<OrganizationWithPets>, StoreError> {
        Err(StoreError::Unavailable("connection refused".to_string()))
    }

    async fn fetch_organization_by_id(&self, _id: &str) -> Result<Option<OrganizationWithPets>, StoreError> {
        Err(StoreError::Unavailable("connection refused".to_string()))
    }

    async fn fetch_organizations_with_filtered_pets(
        &self,
        _city: &str,
        _filter: Option<&AttributeFilterSet>,
    ) -> Result<Vec<OrganizationWithPets>, StoreError> {
        Err(StoreError::Unavailable("connection refused".to_string()))
    }

    async fn fetch_pet_by_id(&self, _id: &str) -> Result<Option<PetListing>, StoreError> {
        Err(StoreError::Unavailable("connection refused".to_string()))
    }

    async fn fetch_pets_by_organization(&self, _organization_id: &str) -> Result<Vec<PetListing>, StoreError> {
        Err(StoreError::Unavailable("connection refused".to_string()))
    }

    async fn create_organization(&self, _organization: Organization) -> Result<Organization, StoreError> {
        Err(StoreError::Unavailable("connection refused".to_string()))
    }

    async fn create_pet(&self, _pet: Pet) -> Result<Pet, StoreError> {
        Err(StoreError::Unavailable("connection refused".to_string()))
    }

    async fn health_check(&self) -> Result<bool, StoreError> {
        Err(StoreError::Unavailable("connection refused".to_string()))
    }
}

/// Store that panics unless only bounding-box fetches are used
struct BoxOnlyStore(InMemoryStore);

#[async_trait]
impl OrganizationStore for BoxOnlyStore {
    async fn fetch_organizations(&self, _city: Option<&str>) -> Result<Vec<OrganizationWithPets>, StoreError> {
        panic!("full scan requested");
    }

    async fn fetch_organizations_within(
        &self,
        bounds: &BoundingBox,
        city: Option<&str>,
    ) -> Result<Vec<OrganizationWithPets>, StoreError> {
        let all = self.0.fetch_organizations(city).await?;
        Ok(all
            .into_iter()
            .filter(|org| pet_radar::core::is_within_bounding_box(org.organization.coordinate(), bounds))
            .collect())
    }

    async fn fetch_organization_by_id(&self, id: &str) -> Result<Option<OrganizationWithPets>, StoreError> {
        self.0.fetch_organization_by_id(id).await
    }

    async fn fetch_organizations_with_filtered_pets(
        &self,
        city: &str,
        filter: Option<&AttributeFilterSet>,
    ) -> Result<Vec<OrganizationWithPets>, StoreError> {
        self.0.fetch_organizations_with_filtered_pets(city, filter).await
    }

    async fn fetch_pet_by_id(&self, id: &str) -> Result<Option<PetListing>, StoreError> {
        self.0.fetch_pet_by_id(id).await
    }

    async fn fetch_pets_by_organization(&self, organization_id: &str) -> Result<Vec<PetListing>, StoreError> {
        self.0.fetch_pets_by_organization(organization_id).await
    }

    async fn create_organization(&self, organization: Organization) -> Result<Organization, StoreError> {
        self.0.create_organization(organization).await
    }

    async fn create_pet(&self, pet: Pet) -> Result<Pet, StoreError> {
        self.0.create_pet(pet).await
    }

    async fn health_check(&self) -> Result<bool, StoreError> {
        Ok(true)
    }
}

#[tokio::test]
async fn test_origin_organization_distance_zero() {
    let search = search_over(vec![create_test_organization("zero", "Null Island", Coordinate::new(0.0, 0.0), vec![])]);

    let result = search
        .find_nearby_organizations(Coordinate::new(0.0, 0.0), 0.0, None)
        .await
        .unwrap();

    assert_eq!(result.len(), 1);
    assert_eq!(result[0].distance_km, 0.0);
}

#[tokio::test]
async fn test_sao_paulo_rio_radius() {
    let sao_paulo = Coordinate::new(-23.5505, -46.6333);
    let rio = Coordinate::new(-22.9068, -43.1729);
    let search = search_over(vec![create_test_organization("rio", "Rio de Janeiro", rio, vec![])]);

    let within_100 = search.find_nearby_organizations(sao_paulo, 100.0, None).await.unwrap();
    assert!(within_100.is_empty());

    let within_400 = search.find_nearby_organizations(sao_paulo, 400.0, None).await.unwrap();
    assert_eq!(within_400.len(), 1);
    let distance = within_400[0].distance_km;
    assert!(distance > 357.0 && distance < 361.0, "Expected ~360km, got {}", distance);
}

#[tokio::test]
async fn test_springfield_nearby_organizations() {
    let search = search_over(springfield_fixture());

    let result = search
        .find_nearby_organizations(SPRINGFIELD, 20.0, Some("Springfield"))
        .await
        .unwrap();

    let ids: Vec<&str> = result.iter().map(|r| r.entity.organization.id.as_str()).collect();
    assert_eq!(ids, vec!["near", "mid"]);
    assert!((result[0].distance_km - 5.0).abs() < 0.01);
    assert!((result[1].distance_km - 12.0).abs() < 0.01);
}

#[tokio::test]
async fn test_nearby_organizations_without_city_scans_everything() {
    let search = search_over(springfield_fixture());

    let result = search.find_nearby_organizations(SPRINGFIELD, 20.0, None).await.unwrap();

    let ids: Vec<&str> = result.iter().map(|r| r.entity.organization.id.as_str()).collect();
    assert_eq!(ids, vec!["elsewhere", "near", "mid"]);
}

#[tokio::test]
async fn test_bounding_box_strategy_matches_scan() {
    let fixture = springfield_fixture();
    let scan = search_over(fixture.clone());
    let boxed = ProximitySearch::with_strategy(
        Arc::new(BoxOnlyStore(InMemoryStore::new(fixture))),
        FetchStrategy::BoundingBox,
    );

    for radius in [1.0, 4.0, 10.0, 20.0, 60.0] {
        let expected = scan.find_nearby_organizations(SPRINGFIELD, radius, None).await.unwrap();
        let actual = boxed.find_nearby_organizations(SPRINGFIELD, radius, None).await.unwrap();

        let expected_ids: Vec<&str> = expected.iter().map(|r| r.entity.organization.id.as_str()).collect();
        let actual_ids: Vec<&str> = actual.iter().map(|r| r.entity.organization.id.as_str()).collect();
        assert_eq!(expected_ids, actual_ids, "radius {}", radius);
    }
}

#[tokio::test]
async fn test_bounding_box_strategy_matches_scan_at_high_latitude() {
    let arctic = Coordinate::new(70.0, 0.0);
    let fixture = vec![
        // ~498.5 km away, near the circle's eastern extreme
        create_test_organization("east-edge", "Arctic", Coordinate::new(70.3, 13.2), vec![]),
        create_test_organization("west-edge", "Arctic", Coordinate::new(70.3, -13.2), vec![]),
        create_test_organization("north", "Arctic", Coordinate::new(74.4, 0.0), vec![]),
        create_test_organization("outside", "Arctic", Coordinate::new(70.0, 14.0), vec![]),
    ];
    let scan = search_over(fixture.clone());
    let boxed = ProximitySearch::with_strategy(
        Arc::new(BoxOnlyStore(InMemoryStore::new(fixture))),
        FetchStrategy::BoundingBox,
    );

    for radius in [100.0, 300.0, 500.0] {
        let expected = scan.find_nearby_organizations(arctic, radius, None).await.unwrap();
        let actual = boxed.find_nearby_organizations(arctic, radius, None).await.unwrap();

        let expected_ids: Vec<&str> = expected.iter().map(|r| r.entity.organization.id.as_str()).collect();
        let actual_ids: Vec<&str> = actual.iter().map(|r| r.entity.organization.id.as_str()).collect();
        assert_eq!(expected_ids, actual_ids, "radius {}", radius);
    }

    let within_500 = boxed.find_nearby_organizations(arctic, 500.0, None).await.unwrap();
    let ids: Vec<&str> = within_500.iter().map(|r| r.entity.organization.id.as_str()).collect();
    assert!(ids.contains(&"east-edge"));
    assert!(ids.contains(&"west-edge"));
    assert!(!ids.contains(&"outside"));
}

#[tokio::test]
async fn test_organization_distance_not_found() {
    let search = search_over(springfield_fixture());

    let err = search
        .get_organization_distance("does-not-exist", SPRINGFIELD)
        .await
        .unwrap_err();

    assert!(matches!(err, SearchError::NotFound(_)));
}

#[tokio::test]
async fn test_organization_distance_ignores_radius() {
    let search = search_over(springfield_fixture());

    let result = search.get_organization_distance("far", SPRINGFIELD).await.unwrap();

    assert_eq!(result.entity.id, "far");
    assert!((result.distance_km - 50.0).abs() < 0.01);
}

#[tokio::test]
async fn test_nearby_pets_sorted_and_grouped() {
    let search = search_over(springfield_fixture());

    let pets = search
        .find_nearby_pets(SPRINGFIELD, 20.0, "Springfield", None)
        .await
        .unwrap();

    let ids: Vec<&str> = pets.iter().map(|r| r.entity.pet.id.as_str()).collect();
    assert_eq!(ids, vec!["near-dog-1", "near-dog-2", "mid-dog", "mid-cat"]);

    for pair in pets.windows(2) {
        assert!(pair[0].distance_km <= pair[1].distance_km);
    }
    for result in &pets {
        assert_eq!(result.entity.pet.organization_id, result.entity.organization.id);
    }
    assert_eq!(pets[0].distance_km, pets[1].distance_km);
}

#[tokio::test]
async fn test_nearby_pets_excludes_out_of_radius_organizations() {
    let search = search_over(springfield_fixture());
    let cats = AttributeFilterSet::default().with_species("cat");

    let pets = search
        .find_nearby_pets(SPRINGFIELD, 20.0, "Springfield", Some(&cats))
        .await
        .unwrap();

    // "far-cat" matches the filter but its shelter is 50 km away; the
    // near shelter passes the radius check but has no cats.
    let ids: Vec<&str> = pets.iter().map(|r| r.entity.pet.id.as_str()).collect();
    assert_eq!(ids, vec!["mid-cat"]);
}

#[tokio::test]
async fn test_nearby_pets_empty_is_not_an_error() {
    let search = search_over(springfield_fixture());
    let birds = AttributeFilterSet::default().with_species("bird");

    let pets = search
        .find_nearby_pets(SPRINGFIELD, 100.0, "Springfield", Some(&birds))
        .await
        .unwrap();

    assert!(pets.is_empty());
}

#[tokio::test]
async fn test_find_pets_by_attributes_without_origin() {
    let search = search_over(springfield_fixture());
    let puppies = AttributeFilterSet::default().with_age("puppy");

    let pets = search
        .find_pets_by_attributes("Springfield", &puppies, None, None)
        .await
        .unwrap();

    let mut ids: Vec<&str> = pets.iter().map(|p| p.pet.id.as_str()).collect();
    ids.sort();
    assert_eq!(ids, vec!["mid-dog", "near-dog-2"]);
}

#[tokio::test]
async fn test_find_pets_by_attributes_with_radius() {
    let search = search_over(springfield_fixture());
    let cats = AttributeFilterSet::default().with_species("cat");

    let pets = search
        .find_pets_by_attributes("Springfield", &cats, Some(SPRINGFIELD), Some(20.0))
        .await
        .unwrap();
    let ids: Vec<&str> = pets.iter().map(|p| p.pet.id.as_str()).collect();
    assert_eq!(ids, vec!["mid-cat"]);

    // Radius without an origin is ignored
    let pets = search
        .find_pets_by_attributes("Springfield", &cats, None, Some(20.0))
        .await
        .unwrap();
    assert_eq!(pets.len(), 2);
}

#[tokio::test]
async fn test_store_failure_propagates() {
    let search = ProximitySearch::new(Arc::new(UnreachableStore));

    let err = search
        .find_nearby_organizations(SPRINGFIELD, 10.0, None)
        .await
        .unwrap_err();
    assert!(matches!(err, SearchError::Store(StoreError::Unavailable(_))));

    let err = search
        .find_nearby_pets(SPRINGFIELD, 10.0, "Springfield", None)
        .await
        .unwrap_err();
    assert!(matches!(err, SearchError::Store(_)));
}

#[tokio::test]
async fn test_invalid_origin_rejected_before_store_call() {
    // UnreachableStore would turn any store call into a Store error
    let search = ProximitySearch::new(Arc::new(UnreachableStore));

    let err = search
        .find_nearby_organizations(Coordinate::new(95.0, 0.0), 10.0, None)
        .await
        .unwrap_err();
    assert!(matches!(err, SearchError::InvalidInput(_)));

    let err = search
        .find_nearby_pets(SPRINGFIELD, f64::NAN, "Springfield", None)
        .await
        .unwrap_err();
    assert!(matches!(err, SearchError::InvalidInput(_)));
}

#[tokio::test]
async fn test_pet_lookup_and_organization_listing() {
    let search = search_over(springfield_fixture());

    let pet = search.find_pet("mid-cat").await.unwrap();
    assert_eq!(pet.organization.id, "mid");

    let listing = search.find_pets_by_organization("near").await.unwrap();
    assert_eq!(listing.len(), 2);

    let city = search.find_organizations_by_city("Shelbyville").await.unwrap();
    assert_eq!(city.len(), 1);
    assert_eq!(city[0].pets.len(), 1);
}

#[tokio::test]
async fn test_registered_pets_show_up_in_nearby_search() {
    let store: Arc<dyn OrganizationStore> = Arc::new(InMemoryStore::new(springfield_fixture()));
    let registry = Registry::new(store.clone());
    let search = ProximitySearch::new(store);

    let at = north_of(SPRINGFIELD, 8.0);
    let organization = registry
        .register_organization(RegisterOrganizationRequest {
            name: "Second Chance".to_string(),
            email: "hello@secondchance.org".to_string(),
            password_hash: "$2b$06$hash".to_string(),
            address: "9 Elm St".to_string(),
            city: "Springfield".to_string(),
            whatsapp: "+1 217 555 0199".to_string(),
            latitude: at.latitude,
            longitude: at.longitude,
        })
        .await
        .unwrap();

    let pet = registry
        .add_pet(
            &organization.id,
            CreatePetRequest {
                name: "Biscuit".to_string(),
                species: "rabbit".to_string(),
                breed: None,
                age: "adult".to_string(),
                size: "small".to_string(),
                description: Some("Loves carrots".to_string()),
            },
        )
        .await
        .unwrap();

    let rabbits = AttributeFilterSet::default().with_species("rabbit");
    let pets = search
        .find_nearby_pets(SPRINGFIELD, 20.0, "Springfield", Some(&rabbits))
        .await
        .unwrap();

    assert_eq!(pets.len(), 1);
    assert_eq!(pets[0].entity.pet.id, pet.id);
    assert_eq!(pets[0].entity.organization.id, organization.id);
    assert!((pets[0].distance_km - 8.0).abs() < 0.01);

    let ids: Vec<String> = search
        .find_nearby_organizations(SPRINGFIELD, 20.0, Some("Springfield"))
        .await
        .unwrap()
        .into_iter()
        .map(|r| r.entity.organization.id)
        .collect();
    assert_eq!(ids, vec!["near".to_string(), organization.id.clone(), "mid".to_string()]);
}

#[tokio::test]
async fn test_registration_store_failure_propagates() {
    let registry = Registry::new(Arc::new(UnreachableStore));

    let err = registry
        .add_pet(
            "0b9f7c1e-8f25-4a53-9d3e-5c1f2a6e7b01",
            CreatePetRequest {
                name: "Biscuit".to_string(),
                species: "rabbit".to_string(),
                breed: None,
                age: "adult".to_string(),
                size: "small".to_string(),
                description: None,
            },
        )
        .await
        .unwrap_err();

    assert!(matches!(err, SearchError::Store(StoreError::Unavailable(_))));
}
