use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LoglensConfig {
    pub logging: LoggingConfig,
    pub search: SearchConfig,
    pub store: StoreConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LoggingConfig {
    /// `EnvFilter` directive string; `RUST_LOG` takes precedence
    pub level: String,
    pub format: LogFormat,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    Json,
    Pretty,
}

/// Defaults for the search flags; command-line flags override them.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SearchConfig {
    pub case_sensitive: bool,
    pub use_regex: bool,
    /// Maximum records printed by `search`
    pub limit: usize,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct StoreConfig {
    /// JSON file backing bookmarks and column presets
    pub path: String,
}

impl LoglensConfig {
    /// Load configuration from loglens.toml and environment variables.
    /// `explicit` replaces the default file locations and must exist.
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        // Load .env file if it exists
        dotenvy::dotenv().ok();

        Self::load_with_env(explicit, environment())
    }

    fn load_with_env(explicit: Option<&Path>, env: config::Environment) -> Result<Self> {
        // Compiled defaults fill any key missing from files and env
        let defaults = config::Config::try_from(&LoglensConfig::default())
            .context("Failed to serialize default configuration")?;

        let mut builder = config::Config::builder().add_source(defaults);

        match explicit {
            Some(path) => {
                builder = builder.add_source(config::File::from(path).required(true));
            }
            None => {
                for path in ["/etc/loglens/loglens", "config/loglens"] {
                    builder = builder.add_source(config::File::with_name(path).required(false));
                }
            }
        }

        builder = builder.add_source(env);

        builder
            .build()
            .context("Failed to build configuration")?
            .try_deserialize()
            .context("Failed to deserialize configuration")
    }

    pub fn validate(&self) -> Result<()> {
        if self.logging.level.trim().is_empty() {
            anyhow::bail!("logging.level must not be empty");
        }
        if self.search.limit == 0 {
            anyhow::bail!("search.limit must be greater than zero");
        }
        Ok(())
    }
}

/// `LOGLENS_` prefix, double underscore for nested keys: LOGLENS_SEARCH__LIMIT
fn environment() -> config::Environment {
    config::Environment::with_prefix("LOGLENS")
        .prefix_separator("_")
        .separator("__")
        .try_parsing(true)
}

impl Default for LoglensConfig {
    fn default() -> Self {
        Self {
            logging: LoggingConfig {
                level: "warn,loglens=info,loglens_engine=info".to_string(),
                format: LogFormat::Pretty,
            },
            search: SearchConfig {
                case_sensitive: false,
                use_regex: false,
                limit: 100,
            },
            store: StoreConfig {
                path: ".loglens/state.json".to_string(),
            },
        }
    }
}
