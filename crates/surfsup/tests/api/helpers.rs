use async_trait::async_trait;
use axum::{
    body::{to_bytes, Body},
    http::{Request, StatusCode},
    Router,
};
use hyper::{header, Method};
use mockall::mock;
use serde_json::Value;
use sqlx::sqlite::{SqlitePool, SqlitePoolOptions};
use std::sync::Arc;
use surfsup::{
    app,
    db::{self, Measurement, StationActivity, TemperatureSummary},
    AppState, MeasurementData, MeasurementFilter, Station,
};
use time::Date;
use tower::ServiceExt;

mock! {
    pub MeasurementAccess {}
    #[async_trait]
    impl MeasurementData for MeasurementAccess {
        async fn latest_date(&self, station: Option<String>) -> Result<Option<Date>, db::Error>;
        async fn station_activity(&self) -> Result<Vec<StationActivity>, db::Error>;
        async fn measurements(&self, filter: &MeasurementFilter) -> Result<Vec<Measurement>, db::Error>;
        async fn temperature_summary(&self, filter: &MeasurementFilter) -> Result<TemperatureSummary, db::Error>;
        async fn stations(&self) -> Result<Vec<Station>, db::Error>;
    }
}

pub struct TestApp {
    pub app: Router,
}

pub async fn spawn_app(store: Arc<dyn MeasurementData>) -> TestApp {
    let state = AppState::new(String::from("http://127.0.0.1:5000"), store);
    TestApp { app: app(state) }
}

impl TestApp {
    pub async fn get(&self, uri: &str) -> (StatusCode, String) {
        let request = Request::builder()
            .method(Method::GET)
            .uri(uri)
            .header(header::ACCEPT, "application/json")
            .body(Body::empty())
            .unwrap();

        let response = self
            .app
            .clone()
            .oneshot(request)
            .await
            .expect("Failed to execute request.");

        let status = response.status();
        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, String::from_utf8(body.to_vec()).unwrap())
    }

    pub async fn get_json(&self, uri: &str) -> (StatusCode, Value) {
        let (status, body) = self.get(uri).await;
        let json = serde_json::from_str(&body)
            .unwrap_or_else(|e| panic!("body of {uri} is not json ({e}): {body}"));
        (status, json)
    }
}

pub fn measurement(station: &str, date: Date, prcp: Option<f64>, tobs: f64) -> Measurement {
    Measurement {
        station: station.to_string(),
        date,
        prcp,
        tobs,
    }
}

/// Single connection pool so every query sees the same in-memory database.
pub async fn memory_pool() -> SqlitePool {
    SqlitePoolOptions::new()
        .max_connections(1)
        .idle_timeout(None)
        .max_lifetime(None)
        .connect("sqlite::memory:")
        .await
        .expect("Failed to open in-memory sqlite")
}

pub async fn create_tables(pool: &SqlitePool) {
    sqlx::query(
        "CREATE TABLE measurement (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            station TEXT NOT NULL,
            date TEXT NOT NULL,
            prcp FLOAT,
            tobs FLOAT NOT NULL
        )",
    )
    .execute(pool)
    .await
    .unwrap();

    sqlx::query(
        "CREATE TABLE station (
            id INTEGER PRIMARY KEY,
            station TEXT NOT NULL,
            name TEXT,
            latitude FLOAT,
            longitude FLOAT,
            elevation FLOAT
        )",
    )
    .execute(pool)
    .await
    .unwrap();
}

pub async fn insert_measurement(pool: &SqlitePool, row: &Measurement) {
    sqlx::query("INSERT INTO measurement (station, date, prcp, tobs) VALUES (?, ?, ?, ?)")
        .bind(&row.station)
        .bind(surfsup::dates::format_date(row.date))
        .bind(row.prcp)
        .bind(row.tobs)
        .execute(pool)
        .await
        .unwrap();
}

pub async fn insert_station(pool: &SqlitePool, id: i64, station: &str) {
    sqlx::query("INSERT INTO station (id, station, name) VALUES (?, ?, ?)")
        .bind(id)
        .bind(station)
        .bind(format!("{} test station", station))
        .execute(pool)
        .await
        .unwrap();
}
