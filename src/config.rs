//! Configuration management for cauchy-erasure

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Largest stripe the GF(2^8) codec can produce
pub const MAX_TOTAL_SHARDS: usize = 256;

/// Default number of data shards (K)
pub const DEFAULT_DATA_SHARDS: usize = 4;

/// Default total number of shards (N)
pub const DEFAULT_TOTAL_SHARDS: usize = 6;

/// Shorthand for the common stripe shapes
///
/// A preset fixes how many parity shards a stripe carries; the stripe width
/// passed to [`ErasureConfig::from_preset`] then decides K.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "kebab-case")]
pub enum ErasurePreset {
    /// One Cauchy parity row per stripe
    SingleParity,

    /// Two Cauchy parity rows per stripe
    DoubleParity,

    /// K and N given explicitly
    #[default]
    Custom,
}

impl ErasurePreset {
    /// Parity rows this preset adds, `None` for [`ErasurePreset::Custom`]
    pub fn parity(self) -> Option<usize> {
        match self {
            ErasurePreset::SingleParity => Some(1),
            ErasurePreset::DoubleParity => Some(2),
            ErasurePreset::Custom => None,
        }
    }
}

/// Shape of a stripe: K data shards out of N rows of the Cauchy matrix
///
/// Rows `0..K` are the data itself and rows `K..N` are parity. N can not pass
/// the field size since every shard is a distinct matrix row.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ErasureConfig {
    pub data_shards: usize,

    pub total_shards: usize,

    #[serde(default)]
    pub preset: ErasurePreset,
}

impl Default for ErasureConfig {
    fn default() -> Self {
        Self::new(DEFAULT_DATA_SHARDS, DEFAULT_TOTAL_SHARDS)
    }
}

impl ErasureConfig {
    pub fn new(data_shards: usize, total_shards: usize) -> Self {
        ErasureConfig {
            data_shards,
            total_shards,
            preset: ErasurePreset::Custom,
        }
    }

    /// Stripe of `width` shards whose parity count comes from `preset`
    ///
    /// `Custom` carries no parity count of its own and is rejected here; use
    /// [`ErasureConfig::new`] for it.
    pub fn from_preset(preset: ErasurePreset, width: usize) -> Result<Self> {
        let parity = preset.parity().ok_or_else(|| {
            Error::InvalidConfig("custom stripes need explicit K and N".to_string())
        })?;
        if width <= parity {
            return Err(Error::InvalidConfig(format!(
                "{:?} needs a stripe wider than {} shards, got {}",
                preset, parity, width
            )));
        }

        let config = ErasureConfig {
            data_shards: width - parity,
            total_shards: width,
            preset,
        };
        config.validate()?;
        Ok(config)
    }

    /// Check that K and N describe a usable stripe
    ///
    /// Needs `1 <= K < N <= 256`: at least one data row, at least one parity
    /// row, and no more rows than the Cauchy matrix has.
    pub fn validate(&self) -> Result<()> {
        if self.data_shards == 0 {
            return Err(Error::InvalidConfig(
                "data_shards must be at least 1".to_string(),
            ));
        }
        if self.total_shards > MAX_TOTAL_SHARDS {
            return Err(Error::InvalidConfig(format!(
                "total_shards {} is more rows than the {}-row Cauchy matrix",
                self.total_shards, MAX_TOTAL_SHARDS
            )));
        }
        if self.total_shards <= self.data_shards {
            return Err(Error::InvalidConfig(format!(
                "total_shards {} leaves no parity over {} data shards",
                self.total_shards, self.data_shards
            )));
        }
        Ok(())
    }

    pub fn parity_shards(&self) -> usize {
        self.total_shards - self.data_shards
    }

    /// How many shards of a stripe may be lost before decoding fails
    pub fn fault_tolerance(&self) -> usize {
        self.parity_shards()
    }
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct LoggingConfig {
    /// Log level or filter directive (trace, debug, info, warn, error)
    pub level: String,

    /// Log file path
    pub file: Option<PathBuf>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        LoggingConfig {
            level: "info".to_string(),
            file: None,
        }
    }
}

/// Main configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct Config {
    /// Erasure coding configuration
    #[serde(default)]
    pub erasure: ErasureConfig,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl Config {
    /// Load configuration from a file (YAML or JSON), with environment variable substitution
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path_ref = path.as_ref();
        let content = std::fs::read_to_string(path_ref).map_err(|e| {
            Error::Config(format!("Failed to read config file: {}", e))
        })?;

        // Perform environment variable substitution
        let content = Self::substitute_env_vars(&content)?;

        let mut config: Config = if is_yaml(path_ref) {
            serde_yaml::from_str(&content)?
        } else {
            serde_json::from_str(&content)?
        };

        config.apply_env_overrides();

        config.validate()?;
        Ok(config)
    }

    /// Create a new config from defaults and environment variables
    pub fn from_env() -> Result<Self> {
        let mut config = Config::default();
        config.apply_env_overrides();
        config.validate()?;
        Ok(config)
    }

    /// Apply environment variable overrides to configuration
    pub fn apply_env_overrides(&mut self) {
        if let Ok(k) = std::env::var("CAUCHY_DATA_SHARDS") {
            if let Ok(k) = k.trim().parse::<usize>() {
                self.erasure.data_shards = k;
                self.erasure.preset = ErasurePreset::Custom;
            }
        }

        if let Ok(n) = std::env::var("CAUCHY_TOTAL_SHARDS") {
            if let Ok(n) = n.trim().parse::<usize>() {
                self.erasure.total_shards = n;
                self.erasure.preset = ErasurePreset::Custom;
            }
        }

        if let Ok(level) = std::env::var("CAUCHY_LOG_LEVEL") {
            let level = level.trim().to_string();
            if !level.is_empty() {
                self.logging.level = level;
            }
        }
    }

    /// Substitute environment variables in config content
    /// Supports ${VAR_NAME} syntax
    fn substitute_env_vars(content: &str) -> Result<String> {
        let mut result = content.to_string();

        let re = regex::Regex::new(r"\$\{([A-Z_][A-Z0-9_]*)\}")
            .map_err(|e| Error::Config(format!("Invalid substitution pattern: {}", e)))?;

        for cap in re.captures_iter(content) {
            let full_match = &cap[0];
            let var_name = &cap[1];

            if let Ok(value) = std::env::var(var_name) {
                result = result.replace(full_match, &value);
            }
        }

        Ok(result)
    }

    /// Save configuration to a file (format determined by extension)
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path_ref = path.as_ref();

        let content = if is_yaml(path_ref) {
            serde_yaml::to_string(self)?
        } else {
            serde_json::to_string_pretty(self)?
        };

        std::fs::write(path_ref, content).map_err(|e| {
            Error::Config(format!("Failed to write config file: {}", e))
        })?;

        Ok(())
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        self.erasure.validate()?;

        if self.logging.level.trim().is_empty() {
            return Err(Error::InvalidConfig("Log level must not be empty".to_string()));
        }

        Ok(())
    }
}

fn is_yaml(path: &Path) -> bool {
    matches!(
        path.extension().and_then(|s| s.to_str()),
        Some("yaml") | Some("yml")
    )
}
