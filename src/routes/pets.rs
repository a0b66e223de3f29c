use actix_web::{web, HttpRequest, HttpResponse};
use validator::Validate;

use crate::models::{
    CreatePetRequest, CreatedPetResponse, NearbyPetsQuery, NearbyPetsResponse, PetResponse, PetsResponse,
    SearchPetsQuery,
};
use crate::routes::{authenticate, check_radius, parse_id, search_error, validation_error, AppState};

/// Configure pet routes
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg
        .route("/pets", web::post().to(create_pet))
        .route("/pets/search", web::get().to(search_pets))
        .route("/pets/nearby", web::get().to(nearby_pets))
        .route("/pets/{id}", web::get().to(get_pet));
}

/// Add a pet to the organization owning the bearer token
///
/// POST /api/v1/pets
async fn create_pet(
    state: web::Data<AppState>,
    req: HttpRequest,
    body: web::Json<CreatePetRequest>,
) -> HttpResponse {
    let claims = match authenticate(&state, &req) {
        Ok(claims) => claims,
        Err(response) => return response,
    };
    if let Err(errors) = body.validate() {
        return validation_error(errors);
    }
    let organization_id = match parse_id(&claims.sub, "sub") {
        Ok(id) => id,
        Err(response) => return response,
    };

    match state.registry.add_pet(&organization_id, body.into_inner()).await {
        Ok(pet) => HttpResponse::Created().json(CreatedPetResponse { pet }),
        Err(e) => search_error(e),
    }
}

/// Pets in a city matching attribute filters, optionally within a radius
///
/// GET /api/v1/pets/search?city=..&species=..&breed=..&age=..&size=..&latitude=..&longitude=..&maxDistance=..
async fn search_pets(state: web::Data<AppState>, query: web::Query<SearchPetsQuery>) -> HttpResponse {
    if let Err(errors) = query.validate() {
        return validation_error(errors);
    }
    if let Some(max_distance) = query.max_distance {
        if let Err(response) = check_radius(&state, max_distance) {
            return response;
        }
    }

    let filter = query.attributes();
    match state
        .search
        .find_pets_by_attributes(&query.city, &filter, query.origin(), query.max_distance)
        .await
    {
        Ok(pets) => HttpResponse::Ok().json(PetsResponse { pets }),
        Err(e) => search_error(e),
    }
}

/// Pets near a point, nearest organization first
///
/// GET /api/v1/pets/nearby?latitude=..&longitude=..&maxDistance=..&city=..&species=..
async fn nearby_pets(state: web::Data<AppState>, query: web::Query<NearbyPetsQuery>) -> HttpResponse {
    if let Err(errors) = query.validate() {
        return validation_error(errors);
    }
    if let Err(response) = check_radius(&state, query.max_distance) {
        return response;
    }

    let filter = query.attributes();
    tracing::info!(
        "Nearby pets: ({}, {}) within {} km in {}, filter: {:?}",
        query.latitude,
        query.longitude,
        query.max_distance,
        query.city,
        filter
    );

    match state
        .search
        .find_nearby_pets(query.origin(), query.max_distance, &query.city, Some(&filter))
        .await
    {
        Ok(pets) => HttpResponse::Ok().json(NearbyPetsResponse { pets }),
        Err(e) => search_error(e),
    }
}

/// GET /api/v1/pets/{id}
async fn get_pet(state: web::Data<AppState>, path: web::Path<String>) -> HttpResponse {
    let id = match parse_id(&path, "petId") {
        Ok(id) => id,
        Err(response) => return response,
    };

    match state.search.find_pet(&id).await {
        Ok(pet) => HttpResponse::Ok().json(PetResponse { pet }),
        Err(e) => search_error(e),
    }
}
