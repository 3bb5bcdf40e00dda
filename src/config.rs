use config::{Config, ConfigError};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::constants::{DEFAULT_COMMITTEE_SIZE, DEFAULT_THRESHOLD};
use crate::selection::PolicyKind;

/// Settings of a splitkey deployment.
///
/// Loaded from `<config_path>/conf.toml`, overridden by `SPLITKEY_*` environment
/// variables (e.g. `SPLITKEY_THRESHOLD=4`).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SplitKeyConfig {
    config_path: PathBuf,
    pub committee_size: usize,
    pub threshold: usize,
    pub selection: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub db_path: Option<String>,
}

fn foreign<E: std::error::Error + Send + Sync + 'static>(err: E) -> ConfigError {
    ConfigError::Foreign(Box::new(err))
}

impl SplitKeyConfig {
    /// Loads the configuration in `path`, writing a default `conf.toml` first if
    /// there is none.
    pub fn new(path: &str) -> Result<Self, ConfigError> {
        let config_path = PathBuf::from(path);

        if !config_path.exists() {
            fs::create_dir_all(&config_path).map_err(foreign)?;
        }

        let config_path = config_path.canonicalize().map_err(foreign)?;
        let conf_file = config_path.join("conf.toml");
        if !conf_file.exists() {
            let defaults = SplitKeyConfig {
                config_path: config_path.clone(),
                committee_size: DEFAULT_COMMITTEE_SIZE,
                threshold: DEFAULT_THRESHOLD,
                selection: "random".to_string(),
                db_path: None,
            };
            let toml = toml::to_string_pretty(&defaults).map_err(foreign)?;
            fs::write(&conf_file, toml).map_err(foreign)?;
        }

        debug!("📝 Loaded config at path: {:#?}", config_path);
        let settings = Config::builder()
            .add_source(config::File::from(conf_file.as_path()))
            .add_source(config::Environment::with_prefix("SPLITKEY"))
            .build()?;

        SplitKeyConfig::try_from(settings)
    }

    pub fn config_path(&self) -> &Path {
        &self.config_path
    }

    pub fn policy(&self) -> Result<PolicyKind, ConfigError> {
        self.selection
            .parse()
            .map_err(|err: crate::error::Error| ConfigError::Message(err.to_string()))
    }
}

impl TryFrom<Config> for SplitKeyConfig {
    type Error = ConfigError;

    fn try_from(config: Config) -> Result<Self, Self::Error> {
        let committee_size = config.get_int("committee_size")?;
        let threshold = config.get_int("threshold")?;
        if committee_size < 1 {
            return Err(ConfigError::Message(format!(
                "committee_size must be positive, got {committee_size}"
            )));
        }
        if threshold < 1 || threshold > committee_size {
            return Err(ConfigError::Message(format!(
                "threshold must be between 1 and {committee_size}, got {threshold}"
            )));
        }

        let parsed = SplitKeyConfig {
            config_path: config.get_string("config_path")?.into(),
            committee_size: committee_size as usize,
            threshold: threshold as usize,
            selection: config.get_string("selection")?,
            db_path: config.get_string("db_path").ok(),
        };
        parsed.policy()?;
        Ok(parsed)
    }
}
