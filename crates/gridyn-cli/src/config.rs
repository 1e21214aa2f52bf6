//! CLI configuration, read from ~/.gridyn/config.toml or `--config`.
//!
//! ```toml
//! [core]
//! schema_dir = "schemas"
//! max_file_size = 104857600   # bytes, 0 = unlimited
//! log_level = "info"
//! strict = false
//! ```

use anyhow::{anyhow, Context, Result};
use gridyn_io::helpers::DEFAULT_MAX_FILE_SIZE;
use gridyn_io::DecodeOptions;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Main gridyn configuration structure
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct GridynConfig {
    #[serde(default)]
    pub core: CoreConfig,
}

/// Decoding defaults; command-line flags take precedence
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CoreConfig {
    /// Directory of YAML model schemas
    #[serde(default)]
    pub schema_dir: Option<PathBuf>,
    /// Reject sources larger than this many bytes (0 = no limit)
    #[serde(default = "default_max_file_size")]
    pub max_file_size: u64,
    /// Log level: trace, debug, info, warn, error
    #[serde(default = "default_log_level")]
    pub log_level: String,
    /// Fail decodes that report any validation issue
    #[serde(default)]
    pub strict: bool,
}

impl Default for CoreConfig {
    fn default() -> Self {
        Self {
            schema_dir: None,
            max_file_size: default_max_file_size(),
            log_level: default_log_level(),
            strict: false,
        }
    }
}

fn default_max_file_size() -> u64 {
    DEFAULT_MAX_FILE_SIZE
}

fn default_log_level() -> String {
    "info".to_string()
}

impl GridynConfig {
    pub fn decode_options(&self) -> DecodeOptions {
        let max = match self.core.max_file_size {
            0 => None,
            n => Some(n),
        };
        DecodeOptions::default().with_max_file_size(max)
    }

    pub fn log_level(&self) -> Result<tracing::Level> {
        self.core
            .log_level
            .parse()
            .map_err(|_| anyhow!("invalid log level '{}' in config", self.core.log_level))
    }
}

/// Get the gridyn home directory (~/.gridyn)
pub fn gridyn_home() -> Result<PathBuf> {
    dirs::home_dir()
        .ok_or_else(|| anyhow!("Cannot determine home directory"))
        .map(|h| h.join(".gridyn"))
}

/// Location: ~/.gridyn/config.toml
pub fn default_config_path() -> Result<PathBuf> {
    Ok(gridyn_home()?.join("config.toml"))
}

pub fn parse_config(contents: &str) -> Result<GridynConfig> {
    Ok(toml::from_str(contents)?)
}

/// Load the configuration.
///
/// An explicit path must exist. The default location is optional and falls
/// back to built-in defaults when absent.
pub fn load_config(explicit: Option<&Path>) -> Result<GridynConfig> {
    let path = match explicit {
        Some(path) => path.to_path_buf(),
        None => {
            let path = default_config_path()?;
            if !path.exists() {
                return Ok(GridynConfig::default());
            }
            path
        }
    };

    let contents = std::fs::read_to_string(&path)
        .with_context(|| format!("reading config '{}'", path.display()))?;
    let mut config = parse_config(&contents)
        .with_context(|| format!("parsing config '{}'", path.display()))?;

    // relative schema directories are relative to the config file
    if let (Some(dir), Some(base)) = (config.core.schema_dir.as_mut(), path.parent()) {
        if dir.is_relative() {
            *dir = base.join(&*dir);
        }
    }
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn empty_config_uses_defaults() {
        let config = parse_config("").unwrap();
        assert!(config.core.schema_dir.is_none());
        assert_eq!(config.core.max_file_size, DEFAULT_MAX_FILE_SIZE);
        assert_eq!(config.log_level().unwrap(), tracing::Level::INFO);
        assert!(!config.core.strict);
        assert_eq!(
            config.decode_options().max_file_size,
            Some(DEFAULT_MAX_FILE_SIZE)
        );
    }

    #[test]
    fn parses_core_section() {
        let config = parse_config(
            "[core]\nschema_dir = \"/srv/schemas\"\nmax_file_size = 0\nlog_level = \"warn\"\nstrict = true\n",
        )
        .unwrap();
        assert_eq!(config.core.schema_dir, Some(PathBuf::from("/srv/schemas")));
        assert_eq!(config.decode_options().max_file_size, None);
        assert_eq!(config.log_level().unwrap(), tracing::Level::WARN);
        assert!(config.core.strict);
    }

    #[test]
    fn rejects_bad_values() {
        assert!(parse_config("[core]\nmax_file_size = \"big\"\n").is_err());
        let config = parse_config("[core]\nlog_level = \"loud\"\n").unwrap();
        assert!(config.log_level().is_err());
    }

    #[test]
    fn explicit_path_must_exist() {
        let dir = tempdir().unwrap();
        assert!(load_config(Some(&dir.path().join("missing.toml"))).is_err());

        let path = dir.path().join("gridyn.toml");
        std::fs::write(&path, "[core]\nschema_dir = \"schemas\"\nstrict = true\n").unwrap();
        let config = load_config(Some(&path)).unwrap();
        assert!(config.core.strict);
        assert_eq!(config.core.schema_dir, Some(dir.path().join("schemas")));
    }
}
