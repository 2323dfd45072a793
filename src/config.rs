use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct ServerSettings {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseSettings {
    pub url: String,
    pub pool_size: u32,
    pub timeout_seconds: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SecuritySettings {
    pub bcrypt_cost: u32,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    pub server: ServerSettings,
    pub database: DatabaseSettings,
    pub security: SecuritySettings,
}

impl Settings {
    /// Defaults, then `appsettings.{toml,json,..}` if present, then `CATALOG__*` variables.
    pub fn load() -> Result<Self, ConfigError> {
        Self::builder()?
            .add_source(File::with_name("appsettings").required(false))
            .add_source(
                Environment::with_prefix("CATALOG")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?
            .try_deserialize()
    }

    fn builder() -> Result<config::ConfigBuilder<config::builder::DefaultState>, ConfigError> {
        Config::builder()
            .set_default("server.host", "127.0.0.1")?
            .set_default("server.port", 3001_i64)?
            .set_default("database.url", "catalog.db")?
            .set_default("database.pool_size", 10_i64)?
            .set_default("database.timeout_seconds", 30_i64)?
            .set_default("security.bcrypt_cost", i64::from(bcrypt::DEFAULT_COST))
    }
}
