// Service exports
pub mod auth;
pub mod memory;
pub mod postgres;
pub mod store;

pub use auth::{AuthError, Claims, TokenVerifier};
pub use memory::InMemoryStore;
pub use postgres::PostgresStore;
pub use store::{OrganizationStore, StoreError};
