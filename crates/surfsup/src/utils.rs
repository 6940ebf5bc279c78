use clap::Parser;
use fern::{
    colors::{Color, ColoredLevelConfig},
    Dispatch,
};
use log::LevelFilter;
use std::env;
use surfsup_core::{
    find_config_file, load_config, ConfigSource, DEFAULT_DATABASE, DEFAULT_MAX_CONNECTIONS,
    DEFAULT_PORT,
};
use time::{format_description::well_known::Iso8601, OffsetDateTime};

#[derive(Parser, Clone, Debug, serde::Deserialize, Default)]
#[command(
    author,
    version,
    about = "SurfsUp - read-only API over historical Hawaii climate data"
)]
pub struct Cli {
    /// Path to config file (TOML format)
    /// Searched in order: this flag, $SURFSUP_CONFIG, ./surfsup.toml,
    /// $XDG_CONFIG_HOME/surfsup/surfsup.toml, /etc/surfsup/surfsup.toml
    #[arg(short, long)]
    #[serde(skip)]
    pub config: Option<String>,

    /// Log level: trace, debug, info, warn, error
    #[arg(short, long, env = "SURFSUP_LEVEL")]
    pub level: Option<String>,

    /// Host to listen on (use 0.0.0.0 for all interfaces)
    #[arg(short = 'H', long, env = "SURFSUP_HOST")]
    #[serde(alias = "domain")]
    pub host: Option<String>,

    /// Port to listen on
    #[arg(short, long, env = "SURFSUP_PORT")]
    pub port: Option<String>,

    /// Public URL shown on the welcome page
    #[arg(short, long, env = "SURFSUP_REMOTE_URL")]
    pub remote_url: Option<String>,

    /// SQLite file holding the measurement and station tables
    #[arg(short, long, env = "SURFSUP_DATABASE")]
    #[serde(alias = "database_path")]
    pub database: Option<String>,

    /// Upper bound on pooled read-only connections
    #[arg(short, long, env = "SURFSUP_MAX_CONNECTIONS")]
    pub max_connections: Option<u32>,
}

impl Cli {
    pub fn host(&self) -> String {
        self.host.clone().unwrap_or_else(|| "127.0.0.1".to_string())
    }

    pub fn port(&self) -> String {
        self.port
            .clone()
            .unwrap_or_else(|| DEFAULT_PORT.to_string())
    }

    pub fn remote_url(&self) -> String {
        self.remote_url
            .clone()
            .unwrap_or_else(|| format!("http://{}:{}", self.host(), self.port()))
    }

    pub fn database(&self) -> String {
        self.database
            .clone()
            .unwrap_or_else(|| DEFAULT_DATABASE.to_string())
    }

    pub fn max_connections(&self) -> u32 {
        self.max_connections
            .filter(|n| *n > 0)
            .unwrap_or(DEFAULT_MAX_CONNECTIONS)
    }

    /// Fills every unset field from `file`; values already set win.
    pub fn merge(self, file: Cli) -> Cli {
        Cli {
            config: self.config,
            level: self.level.or(file.level),
            host: self.host.or(file.host),
            port: self.port.or(file.port),
            remote_url: self.remote_url.or(file.remote_url),
            database: self.database.or(file.database),
            max_connections: self.max_connections.or(file.max_connections),
        }
    }
}

/// Load configuration from CLI args, config file, and environment
pub fn get_config_info() -> anyhow::Result<Cli> {
    let cli_args = Cli::parse();

    let source = if let Some(ref path) = cli_args.config {
        ConfigSource::Explicit(path.into())
    } else {
        find_config_file("SURFSUP_CONFIG", "surfsup.toml")
    };

    // logger is not up yet, this goes to stderr
    if let Some(path) = source.path() {
        eprintln!("Loading config from: {}", path.display());
    }

    let file_config: Cli = load_config(&source)?;

    // CLI args override file config (env vars are handled by clap)
    Ok(cli_args.merge(file_config))
}

pub fn get_log_level(cli: &Cli) -> LevelFilter {
    let level_str = cli
        .level
        .clone()
        .or_else(|| env::var("RUST_LOG").ok())
        .unwrap_or_else(|| "info".to_string());

    match level_str.to_lowercase().as_str() {
        "trace" => LevelFilter::Trace,
        "debug" => LevelFilter::Debug,
        "info" => LevelFilter::Info,
        "warn" => LevelFilter::Warn,
        "error" => LevelFilter::Error,
        _ => LevelFilter::Info,
    }
}

pub fn setup_logger() -> Dispatch {
    let colors = ColoredLevelConfig::new()
        .trace(Color::White)
        .debug(Color::Cyan)
        .info(Color::Blue)
        .warn(Color::Yellow)
        .error(Color::Magenta);

    fern::Dispatch::new()
        .format(move |out, message, record| {
            let now = OffsetDateTime::now_utc()
                .format(&Iso8601::DEFAULT)
                .unwrap_or_default();
            out.finish(format_args!(
                "[{} {}] {}: {}",
                now,
                colors.color(record.level()),
                record.target(),
                message
            ));
        })
        .chain(std::io::stdout())
}
