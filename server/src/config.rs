//! Startup configuration.
//!
//! Loaded once in `main` and passed into `initialize_backend`. Sources, later
//! ones winning:
//!
//! 1. `ganado.yaml` in the working directory (if present)
//! 2. The YAML file named by `GANADO_CONFIG` (must exist when set)
//! 3. `GANADO_*` variables, nested keys joined with `__`: `GANADO_BIND_ADDRESS`,
//!    `GANADO_SECRET_KEY`, `GANADO_STATIC_DIR`, `GANADO_STORE__BACKEND`
//!    (`supabase` or `memory`), `GANADO_STORE__TIMEOUT_SECS`
//! 4. `SUPABASE_URL` and `SUPABASE_KEY` for the hosted store endpoint and key

use std::collections::HashMap;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

use serde::Deserialize;

/// Default configuration file name.
pub const DEFAULT_CONFIG_FILE: &str = "ganado.yaml";
/// Environment variable for configuration file path.
pub const CONFIG_ENV_VAR: &str = "GANADO_CONFIG";
/// Prefix for configuration environment variables.
pub const CONFIG_ENV_PREFIX: &str = "GANADO";
pub const DEFAULT_SECRET_KEY: &str = "clave_secreta";

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("cannot load configuration: {0}")]
    Load(#[from] ::config::ConfigError),
    #[error("invalid configuration: {0}")]
    Invalid(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StoreBackend {
    Supabase,
    Memory,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    /// Explicit backend; inferred from `url` when absent
    pub backend: Option<StoreBackend>,
    pub url: Option<String>,
    pub api_key: Option<String>,
    pub timeout_secs: u64,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            backend: None,
            url: None,
            api_key: None,
            timeout_secs: 30,
        }
    }
}

impl StoreConfig {
    pub fn backend(&self) -> StoreBackend {
        match (self.backend, &self.url) {
            (Some(backend), _) => backend,
            (None, Some(_)) => StoreBackend::Supabase,
            (None, None) => StoreBackend::Memory,
        }
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub bind_address: String,
    pub secret_key: String,
    pub static_dir: PathBuf,
    pub store: StoreConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:8088".to_string(),
            secret_key: DEFAULT_SECRET_KEY.to_string(),
            static_dir: PathBuf::from(concat!(env!("CARGO_MANIFEST_DIR"), "/static")),
            store: StoreConfig::default(),
        }
    }
}

impl AppConfig {
    /// Load from the config files and the process environment
    pub fn load() -> Result<Self, ConfigError> {
        let env = std::env::vars_os()
            .filter_map(|(key, value)| Some((key.into_string().ok()?, value.into_string().ok()?)))
            .collect();
        Self::load_from(env)
    }

    /// Load with `env` standing in for the process environment
    pub fn load_from(env: HashMap<String, String>) -> Result<Self, ConfigError> {
        use ::config::{Config as ConfigLib, Environment, File, FileFormat};

        let mut builder =
            ConfigLib::builder().add_source(File::new(DEFAULT_CONFIG_FILE, FileFormat::Yaml).required(false));

        if let Some(config_path) = env.get(CONFIG_ENV_VAR) {
            builder = builder.add_source(File::new(config_path, FileFormat::Yaml).required(true));
        }

        let config: AppConfig = builder
            .add_source(
                Environment::with_prefix(CONFIG_ENV_PREFIX)
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true)
                    .source(Some(env.clone())),
            )
            .set_override_option("store.url", env.get("SUPABASE_URL").cloned())?
            .set_override_option("store.api_key", env.get("SUPABASE_KEY").cloned())?
            .build()?
            .try_deserialize()?;

        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        self.socket_addr()?;
        if self.secret_key.is_empty() {
            return Err(ConfigError::Invalid("secret key cannot be empty".to_string()));
        }
        if self.store.backend() == StoreBackend::Supabase {
            if self.store.url.as_deref().map_or(true, str::is_empty) {
                return Err(ConfigError::Invalid("supabase store requires a url".to_string()));
            }
            if self.store.api_key.as_deref().map_or(true, str::is_empty) {
                return Err(ConfigError::Invalid("supabase store requires an api key".to_string()));
            }
        }
        Ok(())
    }

    pub fn socket_addr(&self) -> Result<SocketAddr, ConfigError> {
        self.bind_address
            .parse()
            .map_err(|_| ConfigError::Invalid(format!("invalid bind address: {}", self.bind_address)))
    }
}
