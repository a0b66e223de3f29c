use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;

use crate::core::FetchStrategy;

/// Application configuration
#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    pub server: ServerSettings,
    pub database: DatabaseSettings,
    pub auth: AuthSettings,
    #[serde(default)]
    pub search: SearchSettings,
    #[serde(default)]
    pub logging: LoggingSettings,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerSettings {
    pub host: String,
    pub port: u16,
    pub workers: Option<usize>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseSettings {
    pub url: String,
    pub max_connections: Option<u32>,
    pub min_connections: Option<u32>,
    pub acquire_timeout_secs: Option<u64>,
    pub idle_timeout_secs: Option<u64>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AuthSettings {
    pub jwt_secret: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SearchSettings {
    #[serde(default)]
    pub fetch_strategy: FetchStrategy,
    /// Upper bound accepted for `maxDistance` on the HTTP surface
    #[serde(default = "default_max_distance_km")]
    pub max_distance_km: f64,
}

impl Default for SearchSettings {
    fn default() -> Self {
        Self {
            fetch_strategy: FetchStrategy::default(),
            max_distance_km: default_max_distance_km(),
        }
    }
}

fn default_max_distance_km() -> f64 { 500.0 }

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingSettings {
    #[serde(default = "default_log_level")]
    pub level: String,
    #[serde(default = "default_log_format")]
    pub format: String,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

fn default_log_level() -> String { "info".to_string() }
fn default_log_format() -> String { "json".to_string() }

impl Settings {
    /// Load configuration from file and environment variables
    ///
    /// Configuration is loaded in the following order (later overrides earlier):
    /// 1. Default values in the struct
    /// 2. Configuration file (config/default.toml)
    /// 3. Environment variables (prefixed with PETS_)
    /// 4. DATABASE_URL, JWT_SECRET and HTTP_PORT
    pub fn load() -> Result<Self, ConfigError> {
        let mut settings = Config::builder()
            .add_source(File::with_name("config/default").required(false))
            // Local overrides for development
            .add_source(File::with_name("config/local").required(false))
            // e.g., PETS__SERVER__PORT -> server.port
            .add_source(
                Environment::with_prefix("PETS")
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        settings = apply_well_known_env(settings)?;

        settings.try_deserialize()
    }
}

/// Apply the plain variables the deployment environment already exports
fn apply_well_known_env(settings: Config) -> Result<Config, ConfigError> {
    use std::env;

    let mut builder = Config::builder().add_source(settings);

    if let Ok(url) = env::var("DATABASE_URL") {
        builder = builder.set_override("database.url", url)?;
    }
    if let Ok(secret) = env::var("JWT_SECRET") {
        builder = builder.set_override("auth.jwt_secret", secret)?;
    }
    if let Some(port) = env::var("HTTP_PORT").ok().and_then(|p| p.parse::<u16>().ok()) {
        builder = builder.set_override("server.port", i64::from(port))?;
    }

    builder.build()
}
