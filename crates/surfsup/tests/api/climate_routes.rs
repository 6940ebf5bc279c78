use crate::helpers::{measurement, spawn_app, MockMeasurementAccess};
use axum::http::StatusCode;
use serde_json::json;
use std::sync::Arc;
use surfsup::{
    db::{self, StationActivity, TemperatureSummary},
    Station,
};
use time::macros::date;

#[tokio::test]
async fn index_lists_routes() {
    let test_app = spawn_app(Arc::new(MockMeasurementAccess::new())).await;

    let (status, html) = test_app.get("/").await;

    assert_eq!(status, StatusCode::OK);
    assert!(html.contains("Welcome to the Hawaii Weather API!"));
    assert!(html.contains("/api/v1.0/precipitation"));
    assert!(html.contains("/api/v1.0/YYYY-MM-DD/YYYY-MM-DD"));
}

#[tokio::test]
async fn precipitation_covers_year_before_latest_date() {
    let mut store = MockMeasurementAccess::new();
    store
        .expect_latest_date()
        .withf(|station| station.is_none())
        .times(1)
        .returning(|_| Ok(Some(date!(2017 - 08 - 23))));
    store
        .expect_measurements()
        .withf(|filter| {
            filter.start == Some(date!(2016 - 08 - 23))
                && filter.end == Some(date!(2017 - 08 - 23))
                && filter.station.is_none()
        })
        .times(1)
        .returning(|_| {
            Ok(vec![
                measurement("USC00519397", date!(2016 - 08 - 23), Some(0.0), 81.0),
                measurement("USC00513117", date!(2016 - 08 - 23), Some(0.15), 76.0),
                measurement("USC00519397", date!(2017 - 08 - 23), None, 81.0),
            ])
        });

    let test_app = spawn_app(Arc::new(store)).await;
    let (status, body) = test_app.get_json("/api/v1.0/precipitation").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body,
        json!({
            "2016-08-23": 0.15,
            "2017-08-23": null,
        })
    );
}

#[tokio::test]
async fn precipitation_on_empty_dataset_is_not_found() {
    let mut store = MockMeasurementAccess::new();
    store.expect_latest_date().returning(|_| Ok(None));
    store.expect_measurements().times(0);

    let test_app = spawn_app(Arc::new(store)).await;
    let (status, body) = test_app.get_json("/api/v1.0/precipitation").await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert!(body["error"].as_str().unwrap().contains("No measurements"));
}

#[tokio::test]
async fn stations_map_id_to_code() {
    let mut store = MockMeasurementAccess::new();
    store.expect_stations().times(1).returning(|| {
        Ok(vec![
            Station {
                id: 1,
                station: String::from("USC00519397"),
            },
            Station {
                id: 2,
                station: String::from("USC00513117"),
            },
        ])
    });

    let test_app = spawn_app(Arc::new(store)).await;
    let (status, body) = test_app.get_json("/api/v1.0/stations").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "1": "USC00519397", "2": "USC00513117" }));
}

#[tokio::test]
async fn tobs_uses_most_active_station_and_its_latest_date() {
    let mut store = MockMeasurementAccess::new();
    store.expect_station_activity().times(1).returning(|| {
        Ok(vec![
            StationActivity {
                station: String::from("USC00519397"),
                observations: 2724,
            },
            StationActivity {
                station: String::from("USC00519281"),
                observations: 2772,
            },
        ])
    });
    store
        .expect_latest_date()
        .withf(|station| station.as_deref() == Some("USC00519281"))
        .times(1)
        .returning(|_| Ok(Some(date!(2017 - 08 - 18))));
    store
        .expect_measurements()
        .withf(|filter| {
            filter.start == Some(date!(2016 - 08 - 18))
                && filter.end == Some(date!(2017 - 08 - 18))
                && filter.station.as_deref() == Some("USC00519281")
        })
        .times(1)
        .returning(|_| {
            Ok(vec![
                measurement("USC00519281", date!(2016 - 08 - 18), None, 80.0),
                measurement("USC00519281", date!(2017 - 08 - 18), None, 79.0),
            ])
        });

    let test_app = spawn_app(Arc::new(store)).await;
    let (status, body) = test_app.get_json("/api/v1.0/tobs").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "2016-08-18": 80.0, "2017-08-18": 79.0 }));
}

#[tokio::test]
async fn start_date_returns_temperature_stats() {
    let mut store = MockMeasurementAccess::new();
    store
        .expect_temperature_summary()
        .withf(|filter| {
            filter.start == Some(date!(2017 - 08 - 01))
                && filter.end.is_none()
                && filter.station.is_none()
        })
        .times(1)
        .returning(|_| {
            Ok(TemperatureSummary {
                observations: 3,
                low: Some(60.0),
                high: Some(80.0),
                average: Some(70.0),
            })
        });

    let test_app = spawn_app(Arc::new(store)).await;
    let (status, body) = test_app.get_json("/api/v1.0/2017-08-01").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "low": 60.0, "high": 80.0, "avg": "70.00" }));
}

#[tokio::test]
async fn malformed_start_date_is_bad_request() {
    let mut store = MockMeasurementAccess::new();
    store.expect_temperature_summary().times(0);

    let test_app = spawn_app(Arc::new(store)).await;
    let (status, body) = test_app.get_json("/api/v1.0/08-23-2017").await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(
        body,
        json!({
            "input": "08-23-2017",
            "error": "Incorrect date format, should be YYYY-MM-DD",
        })
    );
}

#[tokio::test]
async fn date_range_returns_temperature_stats() {
    let mut store = MockMeasurementAccess::new();
    store
        .expect_temperature_summary()
        .withf(|filter| {
            filter.start == Some(date!(2017 - 08 - 01))
                && filter.end == Some(date!(2017 - 08 - 07))
                && filter.station.is_none()
        })
        .times(1)
        .returning(|_| {
            Ok(TemperatureSummary {
                observations: 42,
                low: Some(72.0),
                high: Some(87.0),
                average: Some(79.238095238),
            })
        });

    let test_app = spawn_app(Arc::new(store)).await;
    let (status, body) = test_app.get_json("/api/v1.0/2017-08-01/2017-08-07").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "low": 72.0, "high": 87.0, "avg": "79.24" }));
}

#[tokio::test]
async fn reversed_range_is_rejected_without_query() {
    let mut store = MockMeasurementAccess::new();
    store.expect_temperature_summary().times(0);

    let test_app = spawn_app(Arc::new(store)).await;
    let (status, body) = test_app.get_json("/api/v1.0/2017-08-23/2017-08-01").await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(
        body,
        json!({
            "start_date": "2017-08-23",
            "end_date": "2017-08-01",
            "error": "End date can't precede start date.",
        })
    );
}

#[tokio::test]
async fn malformed_end_date_is_bad_request() {
    let mut store = MockMeasurementAccess::new();
    store.expect_temperature_summary().times(0);

    let test_app = spawn_app(Arc::new(store)).await;
    let (status, body) = test_app.get_json("/api/v1.0/2017-08-01/2017-02-30").await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["input"], "2017-02-30");
}

#[tokio::test]
async fn empty_window_is_not_found() {
    let mut store = MockMeasurementAccess::new();
    store.expect_temperature_summary().times(1).returning(|_| {
        Ok(TemperatureSummary {
            observations: 0,
            low: None,
            high: None,
            average: None,
        })
    });

    let test_app = spawn_app(Arc::new(store)).await;
    let (status, body) = test_app.get_json("/api/v1.0/2030-01-01").await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert!(body["error"].as_str().unwrap().contains("since 2030-01-01"));
}

#[tokio::test]
async fn store_failure_is_internal_error() {
    let mut store = MockMeasurementAccess::new();
    store
        .expect_stations()
        .times(1)
        .returning(|| Err(db::Error::Query(sqlx::Error::PoolTimedOut)));

    let test_app = spawn_app(Arc::new(store)).await;
    let (status, body) = test_app.get_json("/api/v1.0/stations").await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body, json!({ "error": "Failed to read measurements" }));
}
