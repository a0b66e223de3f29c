use actix_web::{web, HttpRequest, HttpResponse, Responder};
use validator::Validate;

use crate::models::{
    HealthResponse, NearbyOrganizationsQuery, NearbyOrganizationsResponse, OrganizationDistanceQuery,
    OrganizationDistanceResponse, OrganizationResponse, OrganizationsResponse, PetsResponse,
    RegisterOrganizationRequest, RegisteredOrganizationResponse,
};
use crate::routes::{authenticate, check_radius, parse_id, search_error, validation_error, AppState};

/// Configure health and organization routes
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg
        .route("/health", web::get().to(health_check))
        .route("/register", web::post().to(register_organization))
        .route("/organizations/me", web::get().to(get_profile))
        .route("/organizations/nearby", web::get().to(nearby_organizations))
        .route("/organizations/city/{city}", web::get().to(organizations_by_city))
        .route("/organizations/{id}", web::get().to(get_organization))
        .route("/organizations/{id}/distance", web::get().to(organization_distance))
        .route("/organizations/{id}/pets", web::get().to(organization_pets));
}

/// Health check endpoint
async fn health_check(state: web::Data<AppState>) -> impl Responder {
    let store_healthy = state.store.health_check().await.unwrap_or(false);

    let status = if store_healthy { "healthy" } else { "degraded" };

    HttpResponse::Ok().json(HealthResponse {
        status: status.to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        timestamp: chrono::Utc::now(),
    })
}

/// Register a new organization
///
/// POST /api/v1/register
async fn register_organization(
    state: web::Data<AppState>,
    body: web::Json<RegisterOrganizationRequest>,
) -> HttpResponse {
    if let Err(errors) = body.validate() {
        return validation_error(errors);
    }

    match state.registry.register_organization(body.into_inner()).await {
        Ok(organization) => HttpResponse::Created().json(RegisteredOrganizationResponse {
            organization_id: organization.id,
        }),
        Err(e) => search_error(e),
    }
}

/// Profile of the organization owning the bearer token
///
/// GET /api/v1/organizations/me
async fn get_profile(state: web::Data<AppState>, req: HttpRequest) -> HttpResponse {
    let claims = match authenticate(&state, &req) {
        Ok(claims) => claims,
        Err(response) => return response,
    };

    match state.search.find_organization(&claims.sub).await {
        Ok(organization) => HttpResponse::Ok().json(OrganizationResponse { organization }),
        Err(e) => search_error(e),
    }
}

/// Organizations near a point
///
/// GET /api/v1/organizations/nearby?latitude=..&longitude=..&maxDistance=..&city=..
async fn nearby_organizations(
    state: web::Data<AppState>,
    query: web::Query<NearbyOrganizationsQuery>,
) -> HttpResponse {
    if let Err(errors) = query.validate() {
        return validation_error(errors);
    }
    if let Err(response) = check_radius(&state, query.max_distance) {
        return response;
    }

    tracing::info!(
        "Nearby organizations: ({}, {}) within {} km, city: {:?}",
        query.latitude,
        query.longitude,
        query.max_distance,
        query.city
    );

    match state
        .search
        .find_nearby_organizations(query.origin(), query.max_distance, query.city.as_deref())
        .await
    {
        Ok(organizations) => HttpResponse::Ok().json(NearbyOrganizationsResponse { organizations }),
        Err(e) => search_error(e),
    }
}

/// GET /api/v1/organizations/city/{city}
async fn organizations_by_city(state: web::Data<AppState>, path: web::Path<String>) -> HttpResponse {
    let city = path.into_inner();

    match state.search.find_organizations_by_city(&city).await {
        Ok(organizations) => HttpResponse::Ok().json(OrganizationsResponse { organizations }),
        Err(e) => search_error(e),
    }
}

/// GET /api/v1/organizations/{id}
async fn get_organization(state: web::Data<AppState>, path: web::Path<String>) -> HttpResponse {
    let id = match parse_id(&path, "organizationId") {
        Ok(id) => id,
        Err(response) => return response,
    };

    match state.search.find_organization(&id).await {
        Ok(organization) => HttpResponse::Ok().json(OrganizationResponse { organization }),
        Err(e) => search_error(e),
    }
}

/// Distance between the caller and one organization
///
/// GET /api/v1/organizations/{id}/distance?latitude=..&longitude=..
async fn organization_distance(
    state: web::Data<AppState>,
    path: web::Path<String>,
    query: web::Query<OrganizationDistanceQuery>,
) -> HttpResponse {
    let id = match parse_id(&path, "organizationId") {
        Ok(id) => id,
        Err(response) => return response,
    };
    if let Err(errors) = query.validate() {
        return validation_error(errors);
    }

    match state.search.get_organization_distance(&id, query.origin()).await {
        Ok(result) => HttpResponse::Ok().json(OrganizationDistanceResponse::from(result)),
        Err(e) => search_error(e),
    }
}

/// GET /api/v1/organizations/{id}/pets
async fn organization_pets(state: web::Data<AppState>, path: web::Path<String>) -> HttpResponse {
    let id = match parse_id(&path, "organizationId") {
        Ok(id) => id,
        Err(response) => return response,
    };

    match state.search.find_pets_by_organization(&id).await {
        Ok(pets) => HttpResponse::Ok().json(PetsResponse { pets }),
        Err(e) => search_error(e),
    }
}
