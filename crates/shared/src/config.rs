//! Application configuration management.

use serde::Deserialize;

/// Application configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    /// Server configuration.
    pub server: ServerConfig,
    /// Database configuration.
    pub database: DatabaseConfig,
    /// JWT verification configuration.
    pub jwt: JwtSettings,
    /// Payroll run configuration.
    #[serde(default)]
    pub payroll: PayrollConfig,
    /// Read-model cache configuration.
    #[serde(default)]
    pub cache: CacheConfig,
}

/// Server configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// Host to bind to.
    #[serde(default = "default_host")]
    pub host: String,
    /// Port to listen on.
    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8080
}

/// Database configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    /// Database connection URL.
    pub url: String,
    /// Maximum number of connections in the pool.
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
    /// Minimum number of connections in the pool.
    #[serde(default = "default_min_connections")]
    pub min_connections: u32,
}

fn default_max_connections() -> u32 {
    10
}

fn default_min_connections() -> u32 {
    1
}

/// JWT verification settings.
///
/// Tokens are issued by an external identity service; this service only
/// verifies them and reads the actor id and role.
#[derive(Debug, Clone, Deserialize)]
pub struct JwtSettings {
    /// Shared secret used to verify token signatures.
    pub secret: String,
}

/// Payroll run settings.
#[derive(Debug, Clone, Deserialize)]
pub struct PayrollConfig {
    /// Calculation formula used when a run does not name one: `standard` or `legacy`.
    #[serde(default = "default_formula")]
    pub formula: String,
    /// Monthly salary used when an employee profile has none.
    #[serde(default = "default_fallback_basic_salary")]
    pub fallback_basic_salary: u64,
    /// Behaviour for missing salaries: `default`, `warn` or `fail`.
    #[serde(default = "default_missing_salary")]
    pub missing_salary: String,
    /// Hours in a standard working day.
    #[serde(default = "default_work_hours")]
    pub standard_work_hours_per_day: u32,
}

impl Default for PayrollConfig {
    fn default() -> Self {
        Self {
            formula: default_formula(),
            fallback_basic_salary: default_fallback_basic_salary(),
            missing_salary: default_missing_salary(),
            standard_work_hours_per_day: default_work_hours(),
        }
    }
}

fn default_formula() -> String {
    "standard".to_string()
}

fn default_fallback_basic_salary() -> u64 {
    30_000
}

fn default_missing_salary() -> String {
    "warn".to_string()
}

fn default_work_hours() -> u32 {
    8
}

/// TTL cache settings.
#[derive(Debug, Clone, Deserialize)]
pub struct CacheConfig {
    /// Maximum number of cached entries.
    #[serde(default = "default_cache_capacity")]
    pub max_capacity: u64,
    /// Entry time-to-live in seconds.
    #[serde(default = "default_cache_ttl")]
    pub ttl_secs: u64,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            max_capacity: default_cache_capacity(),
            ttl_secs: default_cache_ttl(),
        }
    }
}

fn default_cache_capacity() -> u64 {
    1_000
}

fn default_cache_ttl() -> u64 {
    300 // 5 minutes
}

impl AppConfig {
    /// Loads configuration from environment and config files.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration cannot be loaded.
    pub fn load() -> Result<Self, config::ConfigError> {
        let run_mode = std::env::var("RUN_MODE").unwrap_or_else(|_| "development".to_string());

        let config = config::Config::builder()
            .add_source(config::File::with_name("config/default").required(false))
            .add_source(config::File::with_name(&format!("config/{run_mode}")).required(false))
            .add_source(config::Environment::with_prefix("PAYLINE").separator("__"))
            .build()?;

        config.try_deserialize()
    }
}
