use crate::{dates::format_date, db::schema::verify_schema};
use async_trait::async_trait;
use log::{debug, info};
use regex::Regex;
use scooby::postgres::{select, Aliasable, Orderable, Parameters, Select};
use serde::{Deserialize, Serialize};
use sqlx::{
    sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions},
    FromRow,
};
use std::{str::FromStr, sync::OnceLock, time::Duration};
use time::Date;
use utoipa::ToSchema;

use super::SchemaError;

#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("Failed to query sqlite: {0}")]
    Query(#[from] sqlx::Error),
    #[error("Dataset does not match the expected schema: {0}")]
    Schema(#[from] SchemaError),
}

/// One daily observation for one station.
#[derive(Debug, Clone, PartialEq, FromRow)]
pub struct Measurement {
    pub station: String,
    pub date: Date,
    pub prcp: Option<f64>,
    pub tobs: f64,
}

#[derive(Debug, Clone, PartialEq, FromRow, Serialize, Deserialize, ToSchema)]
pub struct Station {
    pub id: i64,
    pub station: String,
}

/// Number of measurement rows reported by a station.
#[derive(Debug, Clone, PartialEq, FromRow)]
pub struct StationActivity {
    pub station: String,
    pub observations: i64,
}

/// Raw temperature aggregates; the aggregate columns are NULL when no row
/// matched the filter.
#[derive(Debug, Clone, PartialEq, FromRow)]
pub struct TemperatureSummary {
    pub observations: i64,
    pub low: Option<f64>,
    pub high: Option<f64>,
    pub average: Option<f64>,
}

/// Inclusive date bounds and station restriction applied to the
/// measurement table. `None` means unbounded.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MeasurementFilter {
    pub start: Option<Date>,
    pub end: Option<Date>,
    pub station: Option<String>,
}

impl MeasurementFilter {
    pub fn between(start: Date, end: Date) -> Self {
        Self {
            start: Some(start),
            end: Some(end),
            station: None,
        }
    }

    pub fn for_station(mut self, station: impl Into<String>) -> Self {
        self.station = Some(station.into());
        self
    }

    fn apply(
        &self,
        mut query: Select,
        placeholders: &mut Parameters,
        values: &mut Vec<String>,
    ) -> Select {
        if let Some(start) = self.start {
            query = query.where_(format!("date >= {}", placeholders.next()));
            values.push(format_date(start));
        }
        if let Some(end) = self.end {
            query = query.where_(format!("date <= {}", placeholders.next()));
            values.push(format_date(end));
        }
        if let Some(station) = &self.station {
            query = query.where_(format!("station = {}", placeholders.next()));
            values.push(station.clone());
        }
        query
    }
}

#[async_trait]
pub trait MeasurementData: Sync + Send {
    /// Latest measurement date, optionally for a single station.
    async fn latest_date(&self, station: Option<String>) -> Result<Option<Date>, Error>;
    /// Row count per station, in no particular order.
    async fn station_activity(&self) -> Result<Vec<StationActivity>, Error>;
    /// Measurements matching the filter, ordered by date then station.
    async fn measurements(&self, filter: &MeasurementFilter) -> Result<Vec<Measurement>, Error>;
    async fn temperature_summary(
        &self,
        filter: &MeasurementFilter,
    ) -> Result<TemperatureSummary, Error>;
    async fn stations(&self) -> Result<Vec<Station>, Error>;
}

pub struct SqliteMeasurements {
    pool: SqlitePool,
}

impl SqliteMeasurements {
    /// Opens the dataset read-only and checks it carries the expected tables.
    pub async fn connect(path: &str, max_connections: u32) -> Result<Self, Error> {
        let options = SqliteConnectOptions::from_str(&format!("sqlite:{}", path))?
            .read_only(true)
            .pragma("busy_timeout", "5000");

        let pool = SqlitePoolOptions::new()
            .max_connections(max_connections)
            .acquire_timeout(Duration::from_secs(30))
            .connect_with(options)
            .await?;

        let store = Self::from_pool(pool).await?;
        info!("SQLite dataset opened read-only at: {}", path);
        Ok(store)
    }

    /// Wraps an existing pool, validating the schema before use.
    pub async fn from_pool(pool: SqlitePool) -> Result<Self, Error> {
        let store = Self { pool };
        store.health_check().await?;
        verify_schema(&store.pool).await?;
        Ok(store)
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    pub async fn health_check(&self) -> Result<(), Error> {
        sqlx::query("SELECT 1").fetch_one(&self.pool).await?;
        Ok(())
    }

    /// Renders a scooby query with sqlite positional placeholders.
    fn to_sql(select: Select) -> String {
        static PLACEHOLDER: OnceLock<Regex> = OnceLock::new();
        let re = PLACEHOLDER.get_or_init(|| Regex::new(r"\$(\d+)").unwrap());
        let binding = select.to_string();
        let sql = re.replace_all(&binding, "?").into_owned();
        debug!("sql: {}", sql);
        sql
    }
}

#[async_trait]
impl MeasurementData for SqliteMeasurements {
    async fn latest_date(&self, station: Option<String>) -> Result<Option<Date>, Error> {
        let filter = MeasurementFilter {
            station,
            ..Default::default()
        };
        let mut placeholders = Parameters::new();
        let mut values = vec![];
        let query = filter.apply(
            select("MAX(date)".as_("latest")).from("measurement"),
            &mut placeholders,
            &mut values,
        );

        let sql = Self::to_sql(query);
        let mut stmt = sqlx::query_scalar::<_, Option<Date>>(&sql);
        for value in values {
            stmt = stmt.bind(value);
        }
        Ok(stmt.fetch_one(&self.pool).await?)
    }

    async fn station_activity(&self) -> Result<Vec<StationActivity>, Error> {
        let query = select(("station", "COUNT(*)".as_("observations")))
            .from("measurement")
            .group_by("station");

        let sql = Self::to_sql(query);
        let activity = sqlx::query_as::<_, StationActivity>(&sql)
            .fetch_all(&self.pool)
            .await?;
        Ok(activity)
    }

    async fn measurements(&self, filter: &MeasurementFilter) -> Result<Vec<Measurement>, Error> {
        let mut placeholders = Parameters::new();
        let mut values = vec![];
        let query = filter
            .apply(
                select(("station", "date", "prcp", "tobs")).from("measurement"),
                &mut placeholders,
                &mut values,
            )
            .order_by(("date".asc(), "station".asc()));

        let sql = Self::to_sql(query);
        let mut stmt = sqlx::query_as::<_, Measurement>(&sql);
        for value in values {
            stmt = stmt.bind(value);
        }
        Ok(stmt.fetch_all(&self.pool).await?)
    }

    async fn temperature_summary(
        &self,
        filter: &MeasurementFilter,
    ) -> Result<TemperatureSummary, Error> {
        let mut placeholders = Parameters::new();
        let mut values = vec![];
        let query = filter.apply(
            select((
                "COUNT(tobs)".as_("observations"),
                "CAST(MIN(tobs) AS REAL)".as_("low"),
                "CAST(MAX(tobs) AS REAL)".as_("high"),
                "AVG(tobs)".as_("average"),
            ))
            .from("measurement"),
            &mut placeholders,
            &mut values,
        );

        let sql = Self::to_sql(query);
        let mut stmt = sqlx::query_as::<_, TemperatureSummary>(&sql);
        for value in values {
            stmt = stmt.bind(value);
        }
        Ok(stmt.fetch_one(&self.pool).await?)
    }

    async fn stations(&self) -> Result<Vec<Station>, Error> {
        let stations =
            sqlx::query_as::<_, Station>("SELECT DISTINCT id, station FROM station ORDER BY id")
                .fetch_all(&self.pool)
                .await?;
        Ok(stations)
    }
}
