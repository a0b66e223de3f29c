use serde::{Deserialize, Serialize};

use crate::models::Pet;

/// Optional equality constraints on pet attributes
///
/// Absent fields impose no constraint; present fields require an exact,
/// case-sensitive match.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttributeFilterSet {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub species: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub breed: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub age: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size: Option<String>,
}

impl AttributeFilterSet {
    /// Build from raw request values; empty strings count as absent
    pub fn from_parts(
        species: &Option<String>,
        breed: &Option<String>,
        age: &Option<String>,
        size: &Option<String>,
    ) -> Self {
        let keep = |value: &Option<String>| value.clone().filter(|v| !v.is_empty());
        Self {
            species: keep(species),
            breed: keep(breed),
            age: keep(age),
            size: keep(size),
        }
    }

    pub fn with_species(mut self, species: impl Into<String>) -> Self {
        self.species = Some(species.into());
        self
    }

    pub fn with_breed(mut self, breed: impl Into<String>) -> Self {
        self.breed = Some(breed.into());
        self
    }

    pub fn with_age(mut self, age: impl Into<String>) -> Self {
        self.age = Some(age.into());
        self
    }

    pub fn with_size(mut self, size: impl Into<String>) -> Self {
        self.size = Some(size.into());
        self
    }

    pub fn is_empty(&self) -> bool {
        self.species.is_none() && self.breed.is_none() && self.age.is_none() && self.size.is_none()
    }
}

/// Anything carrying the filterable pet attributes
pub trait PetAttributes {
    fn species(&self) -> Option<&str>;
    fn breed(&self) -> Option<&str>;
    fn age(&self) -> Option<&str>;
    fn size(&self) -> Option<&str>;
}

impl PetAttributes for Pet {
    fn species(&self) -> Option<&str> {
        Some(&self.species)
    }

    fn breed(&self) -> Option<&str> {
        self.breed.as_deref()
    }

    fn age(&self) -> Option<&str> {
        Some(&self.age)
    }

    fn size(&self) -> Option<&str> {
        Some(&self.size)
    }
}

impl PetAttributes for AttributeFilterSet {
    fn species(&self) -> Option<&str> {
        self.species.as_deref()
    }

    fn breed(&self) -> Option<&str> {
        self.breed.as_deref()
    }

    fn age(&self) -> Option<&str> {
        self.age.as_deref()
    }

    fn size(&self) -> Option<&str> {
        self.size.as_deref()
    }
}

#[inline]
fn field_matches(wanted: Option<&str>, actual: Option<&str>) -> bool {
    match wanted {
        None => true,
        Some(wanted) => actual == Some(wanted),
    }
}

/// Check a candidate against an attribute filter (AND of equalities)
#[inline]
pub fn matches<C: PetAttributes + ?Sized>(candidate: &C, filter: &AttributeFilterSet) -> bool {
    field_matches(filter.species.as_deref(), candidate.species())
        && field_matches(filter.breed.as_deref(), candidate.breed())
        && field_matches(filter.age.as_deref(), candidate.age())
        && field_matches(filter.size.as_deref(), candidate.size())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn create_test_pet(species: &str, breed: Option<&str>, age: &str, size: &str) -> Pet {
        Pet {
            id: "pet-1".to_string(),
            name: "Rex".to_string(),
            species: species.to_string(),
            breed: breed.map(str::to_string),
            age: age.to_string(),
            size: size.to_string(),
            description: None,
            organization_id: "org-1".to_string(),
            created_at: None,
        }
    }

    #[test]
    fn test_empty_filter_matches_everything() {
        let pet = create_test_pet("dog", None, "adult", "large");
        assert!(matches(&pet, &AttributeFilterSet::default()));
    }

    #[test]
    fn test_species_filter() {
        let dog = create_test_pet("dog", Some("beagle"), "puppy", "small");
        let cat = create_test_pet("cat", None, "adult", "small");
        let filter = AttributeFilterSet::default().with_species("dog");

        assert!(matches(&dog, &filter));
        assert!(!matches(&cat, &filter));
    }

    #[test]
    fn test_filter_is_case_sensitive() {
        let dog = create_test_pet("dog", None, "adult", "medium");
        let filter = AttributeFilterSet::default().with_species("Dog");

        assert!(!matches(&dog, &filter));
    }

    #[test]
    fn test_breed_filter_requires_breed() {
        let mixed = create_test_pet("dog", None, "adult", "medium");
        let filter = AttributeFilterSet::default().with_breed("poodle");

        assert!(!matches(&mixed, &filter));
    }

    #[test]
    fn test_all_fields_conjunction() {
        let pet = create_test_pet("dog", Some("poodle"), "senior", "small");
        let filter = AttributeFilterSet::default()
            .with_species("dog")
            .with_breed("poodle")
            .with_age("senior")
            .with_size("small");
        assert!(matches(&pet, &filter));

        let wrong_size = filter.clone().with_size("large");
        assert!(!matches(&pet, &wrong_size));
    }

    #[test]
    fn test_from_parts_drops_empty_values() {
        let filter = AttributeFilterSet::from_parts(
            &Some("cat".to_string()),
            &Some(String::new()),
            &None,
            &None,
        );
        assert_eq!(filter, AttributeFilterSet::default().with_species("cat"));
        assert!(!filter.is_empty());
    }
}
