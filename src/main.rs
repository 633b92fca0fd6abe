mod config;
mod core;
mod models;
mod routes;
mod services;

use actix_cors::Cors;
use actix_web::{error, http::StatusCode, middleware, web, App, HttpResponse, HttpServer};
use config::Settings;
use core::{GeoAdapter, SearchFacade};
use routes::parking::AppState;
use services::{
    Coordinator, InMemoryHistory, InMemoryLotRepository, LotRepository, NotificationHub,
    RealtimePushSubscriber, SearchProxy,
};
use std::sync::Arc;
use std::time::Duration;
use tracing::info;

/// JSON error response for JSON payload errors
#[derive(Debug, serde::Serialize)]
pub struct JsonError {
    pub error: String,
    pub message: String,
    pub status_code: u16,
}

impl std::fmt::Display for JsonError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.error, self.message)
    }
}

impl std::error::Error for JsonError {}

impl error::ResponseError for JsonError {
    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(StatusCode::from_u16(self.status_code).unwrap_or(StatusCode::BAD_REQUEST))
            .content_type("application/json")
            .json(self)
    }
}

/// Handle JSON payload errors
pub fn handle_json_payload_error(err: error::JsonPayloadError, req: &actix_web::HttpRequest) -> actix_web::Error {
    tracing::info!("JSON payload error on {}: {}", req.path(), err);
    JsonError {
        error: "invalid_json".to_string(),
        message: format!("Invalid JSON: {}", err),
        status_code: 400,
    }
    .into()
}

/// Handle query payload errors
pub fn handle_query_payload_error(err: error::QueryPayloadError, _req: &actix_web::HttpRequest) -> actix_web::Error {
    JsonError {
        error: "invalid_query".to_string(),
        message: format!("Invalid query: {}", err),
        status_code: 400,
    }
    .into()
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    // Load .env file if present
    dotenv::dotenv().ok();

    // Load configuration
    let settings = Settings::load().unwrap_or_else(|e| {
        eprintln!("Failed to load configuration: {}", e);
        panic!("Configuration error: {}", e);
    });

    // Initialize logging
    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&settings.logging.level)),
        )
        .with_target(false)
        .with_level(true);

    if settings.logging.format == "pretty" {
        subscriber.pretty().init();
    } else {
        subscriber.init();
    }

    info!("Starting parkfinder search service...");

    // Composition root: every shared component is constructed here and
    // handed down by reference, never reached through a global
    let repository: Arc<dyn LotRepository> = Arc::new(InMemoryLotRepository::with_seed_data());
    info!("Lot repository initialized with seed data");

    let provider = Arc::new(GeoAdapter::simulated(settings.search.route_segments));
    let facade = Arc::new(SearchFacade::new(repository.clone(), provider));

    let proxy = Arc::new(SearchProxy::new(
        facade,
        Duration::from_secs(settings.search.cache_ttl_secs),
        Duration::from_secs(settings.search.rate_limit_secs),
    ));
    info!(
        "Search proxy initialized (TTL: {}s, rate limit: {}s)",
        settings.search.cache_ttl_secs, settings.search.rate_limit_secs
    );

    let hub = Arc::new(NotificationHub::new());
    hub.subscribe(Arc::new(RealtimePushSubscriber));
    info!("Notification hub initialized ({} subscribers)", hub.subscriber_count());

    let coordinator = Arc::new(Coordinator::new(hub, proxy.clone()));
    let history = Arc::new(InMemoryHistory::new(settings.search.history_capacity));

    let app_state = AppState {
        proxy,
        coordinator,
        repository,
        history,
    };

    // Configure HTTP server
    let host = settings.server.host.clone();
    let port = settings.server.port;
    let workers = settings.server.workers.unwrap_or(4);

    info!("Starting HTTP server on {}:{}", host, port);

    HttpServer::new(move || {
        let cors = Cors::permissive();

        App::new()
            .app_data(web::Data::new(app_state.clone()))
            .app_data(web::JsonConfig::default().error_handler(handle_json_payload_error))
            .app_data(web::QueryConfig::default().error_handler(handle_query_payload_error))
            .wrap(cors)
            .wrap(middleware::Logger::default())
            .wrap(middleware::Compress::default())
            .configure(routes::configure_routes)
    })
    .workers(workers)
    .bind((host, port))?
    .run()
    .await
}
