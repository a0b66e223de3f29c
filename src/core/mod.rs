// Core algorithm exports
pub mod distance;
pub mod filters;
pub mod ranker;
pub mod registry;
pub mod search;

pub use distance::{calculate_bounding_box, haversine_distance, is_within_bounding_box};
pub use filters::{matches, AttributeFilterSet, PetAttributes};
pub use ranker::{distance_within, rank_by_proximity, sort_by_distance};
pub use registry::Registry;
pub use search::{FetchStrategy, ProximitySearch};
