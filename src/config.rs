//! Navigator configuration.
//!
//! Layered with the `config` crate: built-in defaults, then an optional
//! TOML file, then `CAPNAV__*` environment variables.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::JudgeError;
use crate::judge::{JudgeConfig, LabelVocabulary};
use crate::report;
use crate::resolve::{ResolveStrategy, DEFAULT_TAXONOMY};

/// Environment variable naming the config file (without extension).
pub const CONFIG_PATH_ENV: &str = "CAPNAV_CONFIG";

/// Config file used when [`CONFIG_PATH_ENV`] is unset.
pub const DEFAULT_CONFIG_PATH: &str = "config/capnav";

/// Prefix of environment overrides, e.g. `CAPNAV__RESOLVE_WORKERS=4`.
pub const ENV_PREFIX: &str = "CAPNAV";

/// Settings for a [`Navigator`](crate::pipeline::Navigator).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct NavigatorConfig {
    /// Taxonomy capability queries are scoped to.
    pub taxonomy: String,
    /// Description cut-off in the capability report.
    pub capability_description_limit: usize,
    /// Description cut-off in the intrinsic report.
    pub intrinsic_description_limit: usize,
    /// Description cut-off in the capability catalog.
    pub catalog_description_limit: usize,
    /// Worker threads per resolution stage; 1 resolves sequentially.
    pub resolve_workers: usize,
    /// Judge vocabulary; the `no`/`yes` default when absent.
    pub judge: Option<JudgeConfig>,
}

impl Default for NavigatorConfig {
    fn default() -> Self {
        Self {
            taxonomy: DEFAULT_TAXONOMY.to_string(),
            capability_description_limit: report::CAPABILITY_DESCRIPTION_LIMIT,
            intrinsic_description_limit: report::INTRINSIC_DESCRIPTION_LIMIT,
            catalog_description_limit: report::CATALOG_DESCRIPTION_LIMIT,
            resolve_workers: 1,
            judge: None,
        }
    }
}

impl NavigatorConfig {
    /// Loads from the file named by `CAPNAV_CONFIG` (default
    /// `config/capnav`), then environment overrides.
    ///
    /// # Errors
    /// Returns an error if a present file or an override cannot be parsed.
    pub fn load() -> Result<Self, config::ConfigError> {
        let config_path =
            std::env::var(CONFIG_PATH_ENV).unwrap_or_else(|_| DEFAULT_CONFIG_PATH.to_string());
        Self::load_from(config_path)
    }

    /// Loads from `path`, then environment overrides. A missing file is not
    /// an error; the defaults apply.
    ///
    /// # Errors
    /// Returns an error if the file or an override cannot be parsed.
    pub fn load_from(path: impl AsRef<Path>) -> Result<Self, config::ConfigError> {
        Self::load_layered(path.as_ref(), ENV_PREFIX)
    }

    fn load_layered(path: &Path, env_prefix: &str) -> Result<Self, config::ConfigError> {
        let defaults = Self::default();
        let path = path.to_string_lossy().into_owned();

        let built = config::Config::builder()
            .set_default("taxonomy", defaults.taxonomy)?
            .set_default(
                "capability_description_limit",
                defaults.capability_description_limit as u64,
            )?
            .set_default(
                "intrinsic_description_limit",
                defaults.intrinsic_description_limit as u64,
            )?
            .set_default(
                "catalog_description_limit",
                defaults.catalog_description_limit as u64,
            )?
            .set_default("resolve_workers", defaults.resolve_workers as u64)?
            .add_source(config::File::with_name(&path).required(false))
            .add_source(config::Environment::with_prefix(env_prefix).separator("__"))
            .build()?;

        built.try_deserialize()
    }

    /// Scheduling strategy implied by `resolve_workers`.
    #[must_use]
    pub const fn strategy(&self) -> ResolveStrategy {
        ResolveStrategy::from_workers(self.resolve_workers)
    }

    /// The configured judge vocabulary, or the default one.
    ///
    /// # Errors
    /// `InvalidVocabulary` if the configured labels are not a valid pair.
    pub fn vocabulary(&self) -> Result<LabelVocabulary, JudgeError> {
        self.judge
            .as_ref()
            .map_or_else(|| Ok(LabelVocabulary::default()), LabelVocabulary::try_from)
    }
}
