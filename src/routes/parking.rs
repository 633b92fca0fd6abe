use crate::models::{
    AvailabilityResponse, ErrorResponse, HealthResponse, RateLimitedResponse, SearchRecord,
    SearchRequest, UpdateAvailabilityRequest,
};
use crate::models::domain::Origin;
use crate::services::coordinator::{Coordinator, Event};
use crate::services::history::{HistorySink, InMemoryHistory};
use crate::services::proxy::{SearchOutcome, SearchProxy};
use crate::services::repository::{LotRepository, RepositoryError};
use actix_web::{web, HttpResponse, Responder};
use std::sync::Arc;
use validator::Validate;

/// Application state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    pub proxy: Arc<SearchProxy>,
    pub coordinator: Arc<Coordinator>,
    pub repository: Arc<dyn LotRepository>,
    pub history: Arc<InMemoryHistory>,
}

/// Configure all parking-related routes
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg
        .route("/health", web::get().to(health_check))
        .route("/search/nearest", web::post().to(find_nearest))
        .route("/search/history", web::get().to(search_history))
        .route("/parking/{id}/availability", web::patch().to(update_availability));
}

/// Health check endpoint
async fn health_check() -> impl Responder {
    HttpResponse::Ok().json(HealthResponse {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        timestamp: chrono::Utc::now(),
    })
}

/// Find the nearest parking lot
///
/// POST /api/v1/search/nearest
///
/// Request body:
/// ```json
/// {
///   "latitude": 3.4516,
///   "longitude": -76.5320,
///   "filters": { "max_distance": 2.0, "max_price": 5000 },
///   "identity": "string"
/// }
/// ```
async fn find_nearest(
    state: web::Data<AppState>,
    req: web::Json<SearchRequest>,
) -> impl Responder {
    if let Err(errors) = req.validate() {
        tracing::info!("Validation failed for search request: {:?}", errors);
        return HttpResponse::BadRequest().json(ErrorResponse {
            error: "Validation failed".to_string(),
            message: errors.to_string(),
            status_code: 400,
        });
    }

    let origin = Origin::new(req.latitude, req.longitude);
    let filters = req.filter_spec();

    state.coordinator.dispatch(
        "api",
        Event::SearchRequested {
            latitude: origin.lat,
            longitude: origin.lng,
            identity: req.identity.clone(),
        },
    );

    let outcome = match state
        .proxy
        .find_nearest(origin, &filters, req.identity.as_deref())
    {
        Ok(outcome) => outcome,
        Err(e) => {
            tracing::error!("Search failed: {}", e);
            return HttpResponse::InternalServerError().json(ErrorResponse {
                error: "Search failed".to_string(),
                message: e.to_string(),
                status_code: 500,
            });
        }
    };

    match outcome {
        SearchOutcome::RateLimited { retry_after_secs } => {
            HttpResponse::TooManyRequests().json(RateLimitedResponse {
                error: "Rate limit exceeded".to_string(),
                retry_after: retry_after_secs,
            })
        }
        SearchOutcome::NotFound => {
            state.history.record(SearchRecord {
                latitude: origin.lat,
                longitude: origin.lng,
                lot_id: None,
                timestamp: chrono::Utc::now(),
            });
            HttpResponse::NotFound().json(ErrorResponse {
                error: "No parking found".to_string(),
                message: "No available parking lots match the given filters".to_string(),
                status_code: 404,
            })
        }
        SearchOutcome::Found(result) => {
            state.history.record(SearchRecord {
                latitude: origin.lat,
                longitude: origin.lng,
                lot_id: Some(result.id.clone()),
                timestamp: chrono::Utc::now(),
            });
            state.coordinator.dispatch(
                "api",
                Event::RouteCalculated {
                    lot_id: result.id.clone(),
                    distance_km: result.distance_km,
                },
            );
            HttpResponse::Ok().json(result)
        }
    }
}

/// Update a lot's availability and notify subscribers
///
/// PATCH /api/v1/parking/{id}/availability
///
/// Request body:
/// ```json
/// { "is_available": false }
/// ```
async fn update_availability(
    state: web::Data<AppState>,
    path: web::Path<String>,
    req: web::Json<UpdateAvailabilityRequest>,
) -> impl Responder {
    let lot_id = path.into_inner();

    let previous = match state.repository.get(&lot_id) {
        Ok(lot) => lot.is_available,
        Err(RepositoryError::NotFound(_)) => {
            return HttpResponse::NotFound().json(ErrorResponse {
                error: "Lot not found".to_string(),
                message: format!("No parking lot with id {}", lot_id),
                status_code: 404,
            });
        }
        Err(e) => {
            tracing::error!("Failed to look up lot {}: {}", lot_id, e);
            return HttpResponse::InternalServerError().json(ErrorResponse {
                error: "Repository failure".to_string(),
                message: e.to_string(),
                status_code: 500,
            });
        }
    };

    let updated = match state.repository.set_availability(&lot_id, req.is_available) {
        Ok(lot) => lot,
        Err(e) => {
            tracing::error!("Failed to update lot {}: {}", lot_id, e);
            return HttpResponse::InternalServerError().json(ErrorResponse {
                error: "Repository failure".to_string(),
                message: e.to_string(),
                status_code: 500,
            });
        }
    };

    state.coordinator.dispatch(
        "api",
        Event::AvailabilityChanged {
            lot_id: updated.id.clone(),
            is_available: updated.is_available,
            previous: Some(previous),
        },
    );

    HttpResponse::Ok().json(AvailabilityResponse {
        id: updated.id,
        name: updated.name,
        is_available: updated.is_available,
    })
}

#[derive(Debug, serde::Deserialize)]
struct HistoryQuery {
    limit: Option<usize>,
}

/// Latest search history records
///
/// GET /api/v1/search/history?limit=10
async fn search_history(
    state: web::Data<AppState>,
    query: web::Query<HistoryQuery>,
) -> impl Responder {
    let limit = query.limit.unwrap_or(10);
    let records = state.history.recent(limit);
    HttpResponse::Ok().json(serde_json::json!({
        "history": records,
        "count": records.len(),
    }))
}
