//! SurfsUp Core Library
//!
//! Shared utilities for the climate API service:
//! - Configuration loading (XDG-compliant)
//! - File system checks

mod config;
pub mod fs;

pub use config::{find_config_file, load_config, ConfigSource};
pub use fs::is_file;

/// Application name used for XDG paths
pub const APP_NAME: &str = "surfsup";

/// Default API port
pub const DEFAULT_PORT: u16 = 5000;

/// Default location of the historical dataset
pub const DEFAULT_DATABASE: &str = "./Resources/hawaii.sqlite";

/// Default size of the read-only connection pool
pub const DEFAULT_MAX_CONNECTIONS: u32 = 5;
