use serde::Deserialize;
use std::env;

#[derive(Debug, Deserialize, Clone, Default)]
pub struct Config {
    #[serde(default)]
    pub backend: BackendConfig,
    #[serde(default)]
    pub store: StoreConfig,
    #[serde(default)]
    pub planner: PlannerConfig,
    #[serde(default)]
    pub server: ServerConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct BackendConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self { base_url: default_base_url() }
    }
}

fn default_base_url() -> String {
    "http://localhost:8000".to_string()
}

#[derive(Debug, Deserialize, Clone, Default)]
pub struct StoreConfig {
    /// Apply status changes locally before the backend answers
    #[serde(default)]
    pub optimistic: bool,
}

#[derive(Debug, Deserialize, Clone, Copy, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum PlannerMode {
    #[default]
    Backend,
    Fixture,
}

#[derive(Debug, Deserialize, Clone, Default)]
pub struct PlannerConfig {
    #[serde(default)]
    pub mode: PlannerMode,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    #[serde(default = "default_port")]
    pub port: u16,
    #[serde(default = "default_seed")]
    pub seed_sample_trips: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self { port: default_port(), seed_sample_trips: default_seed() }
    }
}

fn default_port() -> u16 { 8000 }
fn default_seed() -> bool { true }

impl Config {
    pub fn load() -> Result<Self, config::ConfigError> {
        let run_mode = env::var("RUN_MODE").unwrap_or_else(|_| "development".into());

        let s = config::Config::builder()
            .add_source(config::File::with_name("config/default").required(false))
            .add_source(config::File::with_name(&format!("config/{}", run_mode)).required(false))
            // Not checked in
            .add_source(config::File::with_name("config/local").required(false))
            // WANDER__BACKEND__BASE_URL=http://10.0.2.2:8000
            .add_source(config::Environment::with_prefix("WANDER").separator("__"))
            .build()?;

        s.try_deserialize()
    }

    /// Parse a TOML document on top of the defaults
    pub fn from_toml(source: &str) -> Result<Self, config::ConfigError> {
        config::Config::builder()
            .add_source(config::File::from_str(source, config::FileFormat::Toml))
            .build()?
            .try_deserialize()
    }
}
