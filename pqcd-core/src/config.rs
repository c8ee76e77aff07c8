//! Configuration file support for pqcd
//!
//! Loads project-specific configuration from JSON files.
//!
//! Search order:
//! 1. Explicit path (--config CLI flag)
//! 2. `.pqcdrc.json` in the working root
//! 3. `pqcd.config.json` in the working root
//!
//! All fields are optional. CLI flags take precedence over config file
//! values.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Directory holding the model snapshot and decoy history by default.
const DATA_DIR_NAME: &str = ".pqcd";

/// Default model artifact file name inside the data directory.
const MODEL_FILE_NAME: &str = "decoy-model.json.zst";

/// Default decoy history database file name inside the data directory.
const DB_FILE_NAME: &str = "decoys.db";

/// Config file names probed during discovery, in priority order.
const CONFIG_FILE_NAMES: &[&str] = &[".pqcdrc.json", "pqcd.config.json"];

/// pqcd configuration loaded from a JSON config file.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PqcdConfig {
    /// Directory for the model snapshot and history database
    /// (default: `.pqcd` under the working root)
    #[serde(default)]
    pub data_dir: Option<PathBuf>,

    /// Explicit model artifact path (overrides `data_dir`)
    #[serde(default)]
    pub model_path: Option<PathBuf>,

    /// Explicit history database path (overrides `data_dir`)
    #[serde(default)]
    pub db_path: Option<PathBuf>,

    /// Fixed random seed for reproducible generation and training
    #[serde(default)]
    pub seed: Option<u64>,

    /// Complexity used when a request omits it (default: 5)
    #[serde(default)]
    pub default_complexity: Option<i64>,

    /// Batch count used when a request omits it (default: 10)
    #[serde(default)]
    pub default_count: Option<i64>,
}

impl PqcdConfig {
    /// Validate the configuration for logical errors.
    ///
    /// Request-supplied parameters are substituted silently when out of
    /// range, but a config file asking for an impossible default is a
    /// mistake worth failing loudly on.
    pub fn validate(&self) -> Result<()> {
        if let Some(complexity) = self.default_complexity {
            if !crate::generator::COMPLEXITY_RANGE.contains(&complexity) {
                anyhow::bail!(
                    "default_complexity must be in [1, 10] (got {})",
                    complexity
                );
            }
        }
        if let Some(count) = self.default_count {
            if !crate::generator::COUNT_RANGE.contains(&count) {
                anyhow::bail!("default_count must be in [1, 100] (got {})", count);
            }
        }
        Ok(())
    }

    /// Load and validate a config file from an explicit path.
    pub fn load(path: &Path) -> Result<Self> {
        let json = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config file: {}", path.display()))?;
        let config: PqcdConfig = serde_json::from_str(&json)
            .with_context(|| format!("failed to parse config file: {}", path.display()))?;
        config.validate()?;
        Ok(config)
    }

    /// Discover a config file under `root`, returning it with its path.
    /// Absence of any config file is not an error.
    pub fn discover(root: &Path) -> Result<Option<(Self, PathBuf)>> {
        for name in CONFIG_FILE_NAMES {
            let candidate = root.join(name);
            if candidate.exists() {
                let config = Self::load(&candidate)?;
                return Ok(Some((config, candidate)));
            }
        }
        Ok(None)
    }
}

/// Fully resolved configuration with defaults applied.
#[derive(Debug, Clone)]
pub struct ResolvedConfig {
    pub model_path: PathBuf,
    pub db_path: PathBuf,
    pub seed: Option<u64>,
    pub default_complexity: i64,
    pub default_count: i64,
    /// Path the config was loaded from (None if defaults)
    pub config_path: Option<PathBuf>,
}

impl ResolvedConfig {
    /// Resolve configuration for `root`: explicit file, discovered file, or
    /// pure defaults.
    pub fn resolve(root: &Path, explicit_config: Option<&Path>) -> Result<Self> {
        let loaded = match explicit_config {
            Some(path) => Some((PqcdConfig::load(path)?, path.to_path_buf())),
            None => PqcdConfig::discover(root)?,
        };

        let (config, config_path) = match loaded {
            Some((config, path)) => (config, Some(path)),
            None => (PqcdConfig::default(), None),
        };

        let data_dir = config
            .data_dir
            .unwrap_or_else(|| root.join(DATA_DIR_NAME));

        Ok(ResolvedConfig {
            model_path: config
                .model_path
                .unwrap_or_else(|| data_dir.join(MODEL_FILE_NAME)),
            db_path: config.db_path.unwrap_or_else(|| data_dir.join(DB_FILE_NAME)),
            seed: config.seed,
            default_complexity: config
                .default_complexity
                .unwrap_or(i64::from(crate::generator::DEFAULT_COMPLEXITY)),
            default_count: config.default_count.unwrap_or(crate::generator::DEFAULT_COUNT as i64),
            config_path,
        })
    }

    /// Defaults rooted at `root`, with no config file involved.
    pub fn defaults(root: &Path) -> Self {
        Self::resolve(root, None).unwrap_or_else(|_| ResolvedConfig {
            model_path: root.join(DATA_DIR_NAME).join(MODEL_FILE_NAME),
            db_path: root.join(DATA_DIR_NAME).join(DB_FILE_NAME),
            seed: None,
            default_complexity: i64::from(crate::generator::DEFAULT_COMPLEXITY),
            default_count: crate::generator::DEFAULT_COUNT as i64,
            config_path: None,
        })
    }
}
