use crate::{
    climate::{self, Climate},
    db::{self, MeasurementData, SqliteMeasurements},
    index_handler, precipitation, routes, stations, temperature_between, temperature_since, tobs,
};
use anyhow::{anyhow, Context};
use axum::{
    body::Body,
    extract::Request,
    middleware::{self, Next},
    response::IntoResponse,
    routing::get,
    Router,
};
use hyper::{header::ACCEPT, Method};
use log::info;
use std::sync::Arc;
use surfsup_core::is_file;
use tower_http::cors::{Any, CorsLayer};
use utoipa::OpenApi;
use utoipa_scalar::{Scalar, Servable};

#[derive(Clone)]
pub struct AppState {
    pub remote_url: String,
    pub climate: Arc<Climate>,
}

impl AppState {
    pub fn new(remote_url: String, store: Arc<dyn MeasurementData>) -> Self {
        Self {
            remote_url,
            climate: Arc::new(Climate::new(store)),
        }
    }
}

#[derive(OpenApi)]
#[openapi(
    paths(
        routes::observations::climate_routes::precipitation,
        routes::observations::climate_routes::stations,
        routes::observations::climate_routes::tobs,
        routes::observations::climate_routes::temperature_since,
        routes::observations::climate_routes::temperature_between,
    ),
    components(
        schemas(
                climate::TemperatureStats,
                db::Station,
                routes::ErrorResponse,
        )
    ),
    tags(
        (name = "hawaii climate api", description = "a read-only RESTful api over historical Hawaii precipitation and temperature observations")
    )
)]
struct ApiDoc;

pub async fn build_app_state(
    remote_url: String,
    database: String,
    max_connections: u32,
) -> Result<AppState, anyhow::Error> {
    if !is_file(&database) {
        return Err(anyhow!("dataset not found at {}", database));
    }

    let store = SqliteMeasurements::connect(&database, max_connections)
        .await
        .with_context(|| format!("error opening dataset {}", database))?;

    Ok(AppState::new(remote_url, Arc::new(store)))
}

pub fn app(app_state: AppState) -> Router {
    let api_docs = ApiDoc::openapi();
    let cors = CorsLayer::new()
        .allow_methods([Method::GET, Method::OPTIONS])
        .allow_headers([ACCEPT])
        .allow_origin(Any);

    Router::new()
        .route("/", get(index_handler))
        .route("/api/v1.0/precipitation", get(precipitation))
        .route("/api/v1.0/stations", get(stations))
        .route("/api/v1.0/tobs", get(tobs))
        .route("/api/v1.0/{start_date}", get(temperature_since))
        .route("/api/v1.0/{start_date}/{end_date}", get(temperature_between))
        .with_state(Arc::new(app_state))
        .layer(middleware::from_fn(log_request))
        .merge(Scalar::with_url("/docs", api_docs))
        .layer(cors)
}

async fn log_request(request: Request<Body>, next: Next) -> impl IntoResponse {
    let now = time::OffsetDateTime::now_utc();
    let method = request.method().clone();
    let path = request
        .uri()
        .path_and_query()
        .map(|p| p.as_str().to_owned())
        .unwrap_or_default();
    info!(target: "http_request", "new request, {} {}", method.as_str(), path);

    let response = next.run(request).await;
    let response_time = time::OffsetDateTime::now_utc() - now;
    info!(target: "http_response", "response, {} {}, code: {}, time: {}", method.as_str(), path, response.status().as_str(), response_time);

    response
}
