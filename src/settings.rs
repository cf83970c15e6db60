//! Handles settings for the application.
//!
//! Values come from built-in defaults, then an optional `settings.toml` in
//! the working directory, then `SPLITLEDGER__*` environment variables
//! (`SPLITLEDGER__SERVER__PORT=9000`, `SPLITLEDGER__STORAGE__KIND=mongo`, ...).
use config::builder::{ConfigBuilder, DefaultState};
use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;

use crate::analytics::{DEFAULT_TOP_SPENDERS, DEFAULT_TREND_MONTHS};

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Server {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum Storage {
    Memory,
    Mongo { uri: String, database: String },
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct App {
    pub level: String,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct AnalyticsSettings {
    pub months: u32,
    pub top_spenders: usize,
}

impl Default for AnalyticsSettings {
    fn default() -> Self {
        AnalyticsSettings {
            months: DEFAULT_TREND_MONTHS,
            top_spenders: DEFAULT_TOP_SPENDERS,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Settings {
    pub server: Server,
    pub storage: Storage,
    pub app: App,
    pub analytics: AnalyticsSettings,
}

impl Settings {
    pub fn new() -> Result<Self, ConfigError> {
        Self::builder()?
            .add_source(File::with_name("settings").required(false))
            .add_source(Environment::with_prefix("SPLITLEDGER").separator("__"))
            .build()?
            .try_deserialize()
    }

    fn builder() -> Result<ConfigBuilder<DefaultState>, ConfigError> {
        let defaults = AnalyticsSettings::default();
        Config::builder()
            .set_default("server.host", "0.0.0.0")?
            .set_default("server.port", 8080)?
            .set_default("storage.kind", "memory")?
            .set_default("app.level", "info")?
            .set_default("analytics.months", i64::from(defaults.months))?
            .set_default("analytics.top_spenders", defaults.top_spenders as i64)
    }
}
