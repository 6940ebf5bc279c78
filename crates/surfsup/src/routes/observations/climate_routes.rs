use axum::{
    extract::{Path, State},
    Json,
};
use log::debug;
use std::{collections::BTreeMap, sync::Arc};

use crate::{
    climate::{DailyValues, Error, TemperatureStats},
    dates::{format_date, parse_date},
    AppState, ErrorResponse,
};

fn keyed_by_date<T>(daily: DailyValues<T>) -> BTreeMap<String, T> {
    daily
        .into_iter()
        .map(|(date, value)| (format_date(date), value))
        .collect()
}

#[utoipa::path(
    get,
    path = "/api/v1.0/precipitation",
    responses(
        (status = OK, description = "Daily precipitation for the 12 months ending on the most recent measurement", body = BTreeMap<String, Option<f64>>),
        (status = NOT_FOUND, description = "Dataset holds no measurements", body = ErrorResponse),
        (status = INTERNAL_SERVER_ERROR, description = "Failed to read measurements", body = ErrorResponse)
    ))]
pub async fn precipitation(
    State(state): State<Arc<AppState>>,
) -> Result<Json<BTreeMap<String, Option<f64>>>, Error> {
    let end_date = state.climate.most_recent_date(None).await?;
    let daily = state.climate.precipitation_for_year(end_date).await?;
    Ok(Json(keyed_by_date(daily)))
}

#[utoipa::path(
    get,
    path = "/api/v1.0/stations",
    responses(
        (status = OK, description = "Weather stations as id to station code", body = BTreeMap<i64, String>),
        (status = INTERNAL_SERVER_ERROR, description = "Failed to read stations", body = ErrorResponse)
    ))]
pub async fn stations(
    State(state): State<Arc<AppState>>,
) -> Result<Json<BTreeMap<i64, String>>, Error> {
    Ok(Json(state.climate.stations().await?))
}

#[utoipa::path(
    get,
    path = "/api/v1.0/tobs",
    responses(
        (status = OK, description = "Daily temperature observations of the most active station for its last 12 months of data", body = BTreeMap<String, f64>),
        (status = NOT_FOUND, description = "Dataset holds no measurements", body = ErrorResponse),
        (status = INTERNAL_SERVER_ERROR, description = "Failed to read measurements", body = ErrorResponse)
    ))]
pub async fn tobs(
    State(state): State<Arc<AppState>>,
) -> Result<Json<BTreeMap<String, f64>>, Error> {
    let station = state.climate.most_active_station().await?;
    let end_date = state.climate.most_recent_date(Some(&station)).await?;
    debug!("most active station {} last reported {}", station, end_date);
    let daily = state
        .climate
        .temperature_for_year(end_date, &station)
        .await?;
    Ok(Json(keyed_by_date(daily)))
}

#[utoipa::path(
    get,
    path = "/api/v1.0/{start_date}",
    params(
        ("start_date" = String, Path, description = "First day of the period, YYYY-MM-DD"),
    ),
    responses(
        (status = OK, description = "Temperature low, high and average from the start date onward", body = TemperatureStats),
        (status = BAD_REQUEST, description = "Malformed start date", body = ErrorResponse),
        (status = NOT_FOUND, description = "No measurements in the period", body = ErrorResponse),
        (status = INTERNAL_SERVER_ERROR, description = "Failed to read measurements", body = ErrorResponse)
    ))]
pub async fn temperature_since(
    State(state): State<Arc<AppState>>,
    Path(start_date): Path<String>,
) -> Result<Json<TemperatureStats>, Error> {
    let start = parse_date(&start_date)?;
    let stats = state.climate.temperature_stats(start, None, None).await?;
    Ok(Json(stats))
}

#[utoipa::path(
    get,
    path = "/api/v1.0/{start_date}/{end_date}",
    params(
        ("start_date" = String, Path, description = "First day of the period, YYYY-MM-DD"),
        ("end_date" = String, Path, description = "Last day of the period, YYYY-MM-DD"),
    ),
    responses(
        (status = OK, description = "Temperature low, high and average over the inclusive period", body = TemperatureStats),
        (status = BAD_REQUEST, description = "Malformed date or end date before start date", body = ErrorResponse),
        (status = NOT_FOUND, description = "No measurements in the period", body = ErrorResponse),
        (status = INTERNAL_SERVER_ERROR, description = "Failed to read measurements", body = ErrorResponse)
    ))]
pub async fn temperature_between(
    State(state): State<Arc<AppState>>,
    Path((start_date, end_date)): Path<(String, String)>,
) -> Result<Json<TemperatureStats>, Error> {
    let start = parse_date(&start_date)?;
    let end = parse_date(&end_date)?;
    let stats = state
        .climate
        .temperature_stats(start, Some(end), None)
        .await?;
    Ok(Json(stats))
}
