//! Static description of the two tables the dataset must provide.
//!
//! The dataset is provisioned ahead of time; startup checks it against this
//! declaration instead of discovering the layout at runtime.

use log::debug;
use sqlx::SqlitePool;

use super::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TableSchema {
    pub name: &'static str,
    pub columns: &'static [&'static str],
}

pub const MEASUREMENT_TABLE: TableSchema = TableSchema {
    name: "measurement",
    columns: &["station", "date", "prcp", "tobs"],
};

pub const STATION_TABLE: TableSchema = TableSchema {
    name: "station",
    columns: &["id", "station"],
};

pub const SCHEMA: &[TableSchema] = &[MEASUREMENT_TABLE, STATION_TABLE];

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum SchemaError {
    #[error("table `{0}` not found")]
    MissingTable(String),
    #[error("table `{table}` has no column `{column}`")]
    MissingColumn { table: String, column: String },
}

impl TableSchema {
    /// Compares the declared columns with the ones found in the dataset.
    /// Extra columns are allowed.
    pub fn check(&self, found: &[String]) -> Result<(), SchemaError> {
        if found.is_empty() {
            return Err(SchemaError::MissingTable(self.name.to_owned()));
        }
        match self
            .columns
            .iter()
            .find(|column| !found.iter().any(|f| f.eq_ignore_ascii_case(column)))
        {
            Some(column) => Err(SchemaError::MissingColumn {
                table: self.name.to_owned(),
                column: (*column).to_owned(),
            }),
            None => Ok(()),
        }
    }
}

pub async fn verify_schema(pool: &SqlitePool) -> Result<(), Error> {
    for table in SCHEMA {
        let found: Vec<String> = sqlx::query_scalar("SELECT name FROM pragma_table_info(?)")
            .bind(table.name)
            .fetch_all(pool)
            .await?;
        debug!("table {} columns: {:?}", table.name, found);
        table.check(&found)?;
    }
    Ok(())
}
