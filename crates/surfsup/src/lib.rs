pub mod climate;
pub mod dates;
pub mod db;
pub mod routes;
pub mod startup;
pub mod templates;
mod utils;

pub use climate::{Climate, DailyValues, TemperatureStats};
pub use db::{MeasurementData, MeasurementFilter, SqliteMeasurements, Station};
pub use routes::*;
pub use startup::*;
pub use utils::*;
