use crate::{
    dates::{self, trailing_window_start},
    db::{self, MeasurementData, MeasurementFilter, StationActivity},
};
use log::{debug, warn};
use serde::{Deserialize, Serialize};
use std::{cmp::Reverse, collections::BTreeMap, sync::Arc};
use time::Date;
use utoipa::ToSchema;

#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error(transparent)]
    InvalidDate(#[from] dates::Error),
    #[error("End date can't precede start date.")]
    InvalidRange { start: Date, end: Date },
    #[error("No measurements found {0}")]
    NoData(String),
    #[error("Failed to read measurements: {0}")]
    Store(#[from] db::Error),
}

/// Daily values keyed by calendar date, in date order.
pub type DailyValues<T> = BTreeMap<Date, T>;

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, ToSchema)]
pub struct TemperatureStats {
    pub low: f64,
    pub high: f64,
    /// Mean temperature rounded to two decimal places
    #[schema(example = "70.00")]
    pub avg: String,
}

/// Read-only aggregations over the measurement store.
///
/// Holds no state besides the store handle, so one instance is shared by
/// every request.
pub struct Climate {
    store: Arc<dyn MeasurementData>,
}

impl Climate {
    pub fn new(store: Arc<dyn MeasurementData>) -> Self {
        Self { store }
    }

    pub async fn most_recent_date(&self, station: Option<&str>) -> Result<Date, Error> {
        self.store
            .latest_date(station.map(str::to_owned))
            .await?
            .ok_or_else(|| {
                let scope = match station {
                    Some(station) => format!("for station {}", station),
                    None => "in dataset".to_string(),
                };
                warn!("no measurements {}", scope);
                Error::NoData(scope)
            })
    }

    /// Precipitation for every day in the trailing 12 months ending on
    /// `end_date`. When several stations report the same day the value of
    /// the lowest station identifier is kept; missing readings stay `None`.
    pub async fn precipitation_for_year(
        &self,
        end_date: Date,
    ) -> Result<DailyValues<Option<f64>>, Error> {
        let start = trailing_window_start(end_date)?;
        let mut rows = self
            .store
            .measurements(&MeasurementFilter::between(start, end_date))
            .await?;
        rows.sort_by(|a, b| (a.date, &a.station).cmp(&(b.date, &b.station)));
        debug!(
            "precipitation window {} to {}: {} rows",
            start,
            end_date,
            rows.len()
        );

        let mut daily = DailyValues::new();
        for row in rows {
            daily.entry(row.date).or_insert(row.prcp);
        }
        Ok(daily)
    }

    /// Station with the most measurement rows, ties broken by the smallest
    /// station identifier.
    pub async fn most_active_station(&self) -> Result<String, Error> {
        let activity = self.store.station_activity().await?;
        rank_stations(activity)
            .into_iter()
            .next()
            .map(|a| a.station)
            .ok_or_else(|| Error::NoData("in dataset".to_string()))
    }

    pub async fn temperature_for_year(
        &self,
        end_date: Date,
        station: &str,
    ) -> Result<DailyValues<f64>, Error> {
        let start = trailing_window_start(end_date)?;
        let filter = MeasurementFilter::between(start, end_date).for_station(station);
        let rows = self.store.measurements(&filter).await?;

        let mut daily = DailyValues::new();
        for row in rows {
            daily.entry(row.date).or_insert(row.tobs);
        }
        Ok(daily)
    }

    pub async fn temperature_stats(
        &self,
        start: Date,
        end: Option<Date>,
        station: Option<&str>,
    ) -> Result<TemperatureStats, Error> {
        if let Some(end) = end {
            if end < start {
                return Err(Error::InvalidRange { start, end });
            }
        }

        let filter = MeasurementFilter {
            start: Some(start),
            end,
            station: station.map(str::to_owned),
        };
        let summary = self.store.temperature_summary(&filter).await?;

        match (summary.observations, summary.low, summary.high, summary.average) {
            (n, Some(low), Some(high), Some(average)) if n > 0 => Ok(TemperatureStats {
                low,
                high,
                avg: format!("{:.2}", average),
            }),
            _ => {
                let scope = match end {
                    Some(end) => format!("between {} and {}", start, end),
                    None => format!("since {}", start),
                };
                warn!("temperature stats requested over empty window {}", scope);
                Err(Error::NoData(scope))
            }
        }
    }

    /// Station table as `id -> station code`.
    pub async fn stations(&self) -> Result<BTreeMap<i64, String>, Error> {
        let stations = self.store.stations().await?;
        Ok(stations.into_iter().map(|s| (s.id, s.station)).collect())
    }
}

/// Orders stations by row count descending, then identifier ascending.
pub fn rank_stations(mut activity: Vec<StationActivity>) -> Vec<StationActivity> {
    activity.sort_by(|a, b| {
        (Reverse(a.observations), &a.station).cmp(&(Reverse(b.observations), &b.station))
    });
    activity
}
