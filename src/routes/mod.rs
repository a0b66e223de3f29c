// Route exports
pub mod organizations;
pub mod pets;

use std::sync::Arc;

use actix_web::{http::header::AUTHORIZATION, http::StatusCode, web, HttpRequest, HttpResponse};
use validator::ValidationErrors;

use crate::core::{ProximitySearch, Registry};
use crate::error::SearchError;
use crate::models::ErrorResponse;
use crate::services::{Claims, OrganizationStore, TokenVerifier};

/// Application state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn OrganizationStore>,
    pub search: ProximitySearch,
    pub registry: Registry,
    pub verifier: Arc<TokenVerifier>,
    /// Largest search radius accepted from clients
    pub max_distance_km: f64,
}

impl AppState {
    pub fn new(store: Arc<dyn OrganizationStore>, search: ProximitySearch, verifier: TokenVerifier, max_distance_km: f64) -> Self {
        Self {
            registry: Registry::new(store.clone()),
            store,
            search,
            verifier: Arc::new(verifier),
            max_distance_km,
        }
    }
}

pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api/v1")
            .configure(organizations::configure)
            .configure(pets::configure),
    );
}

pub(crate) fn error_response(status: StatusCode, error: &str, message: String) -> HttpResponse {
    HttpResponse::build(status).json(ErrorResponse {
        error: error.to_string(),
        message,
        status_code: status.as_u16(),
    })
}

pub(crate) fn validation_error(errors: ValidationErrors) -> HttpResponse {
    error_response(StatusCode::BAD_REQUEST, "Validation failed", errors.to_string())
}

/// Claims of the bearer token on `req`, or a 401 response
pub(crate) fn authenticate(state: &AppState, req: &HttpRequest) -> Result<Claims, HttpResponse> {
    let header = req.headers().get(AUTHORIZATION).and_then(|v| v.to_str().ok());
    state.verifier.verify_header(header).map_err(|e| {
        tracing::debug!("Rejected token on {}: {}", req.path(), e);
        error_response(StatusCode::UNAUTHORIZED, "Unauthorized", e.to_string())
    })
}

/// Reject radii above the configured cap
pub(crate) fn check_radius(state: &AppState, max_distance_km: f64) -> Result<(), HttpResponse> {
    if max_distance_km > state.max_distance_km {
        return Err(error_response(
            StatusCode::BAD_REQUEST,
            "Validation failed",
            format!("maxDistance must not exceed {} km", state.max_distance_km),
        ));
    }
    Ok(())
}

/// Path ids are UUIDs; normalize to the canonical hyphenated form
pub(crate) fn parse_id(raw: &str, what: &str) -> Result<String, HttpResponse> {
    uuid::Uuid::parse_str(raw)
        .map(|id| id.to_string())
        .map_err(|_| {
            error_response(
                StatusCode::BAD_REQUEST,
                "Validation failed",
                format!("{} must be a UUID", what),
            )
        })
}

pub(crate) fn search_error(err: SearchError) -> HttpResponse {
    let status = StatusCode::from_u16(err.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    match &err {
        SearchError::NotFound(what) => {
            tracing::debug!("Not found: {}", what);
            error_response(status, "Not found", err.to_string())
        }
        SearchError::InvalidInput(_) => error_response(status, "Invalid input", err.to_string()),
        SearchError::Conflict(_) => error_response(status, "Conflict", err.to_string()),
        SearchError::Store(e) => {
            tracing::error!("Store failure: {}", e);
            error_response(status, "Store failure", e.to_string())
        }
    }
}
