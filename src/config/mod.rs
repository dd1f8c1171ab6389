use config::{builder::DefaultState, Config, ConfigBuilder, ConfigError, Environment, File};
use serde::Deserialize;
use std::env;

/// Work factors bcrypt accepts.
const MIN_BCRYPT_COST: u32 = 4;
const MAX_BCRYPT_COST: u32 = 31;

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub workers: u32,
}

#[derive(Debug, Deserialize, Clone)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
}

#[derive(Debug, Deserialize, Clone)]
pub struct AuthConfig {
    /// bcrypt work factor used when hashing new passwords.
    pub bcrypt_cost: u32,
}

#[derive(Debug, Deserialize, Clone)]
pub struct Settings {
    pub environment: String,
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub auth: AuthConfig,
}

impl Settings {
    pub fn new() -> Result<Self, ConfigError> {
        let run_mode = env::var("RUN_MODE").unwrap_or_else(|_| "development".into());

        Self::defaults()?
            // Add in settings from the config file if it exists
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name(&format!("config/{}", run_mode)).required(false))
            // E.g., `APP_SERVER__PORT=5001` would set `Settings.server.port`
            .add_source(
                Environment::with_prefix("app")
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true)
            )
            .build()?
            .try_deserialize::<Self>()?
            .validate()
    }

    /// Settings backed by a private in-memory database and the cheapest
    /// bcrypt cost. Nothing is read from files or the environment.
    pub fn ephemeral() -> Result<Self, ConfigError> {
        Self::defaults()?
            .set_override("environment", "test")?
            .set_override("database.url", "sqlite::memory:")?
            .set_override("database.max_connections", 1)?
            .set_override("auth.bcrypt_cost", MIN_BCRYPT_COST as i64)?
            .build()?
            .try_deserialize()
    }

    fn validate(self) -> Result<Self, ConfigError> {
        let cost = self.auth.bcrypt_cost;
        if !(MIN_BCRYPT_COST..=MAX_BCRYPT_COST).contains(&cost) {
            return Err(ConfigError::Message(format!(
                "auth.bcrypt_cost must be between {} and {}, got {}",
                MIN_BCRYPT_COST, MAX_BCRYPT_COST, cost
            )));
        }
        Ok(self)
    }

    fn defaults() -> Result<ConfigBuilder<DefaultState>, ConfigError> {
        Config::builder()
            .set_default("environment", "development")?
            .set_default("server.host", "0.0.0.0")?
            .set_default("server.port", 5000)?
            .set_default("server.workers", num_cpus::get() as i64)?
            .set_default("database.url", "sqlite://users.db")?
            .set_default("database.max_connections", 5)?
            .set_default("auth.bcrypt_cost", bcrypt::DEFAULT_COST as i64)
    }
}
