//! Application configuration
//!
//! Loaded from `<config dir>/shuttersort/config.toml`; every field has a
//! default so the file is optional.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Engine command line: program followed by its arguments.
    pub engine: Vec<String>,
    /// Tracing filter used when SSORT_LOG is unset.
    pub log_level: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            engine: vec!["shuttersort-engine".to_string()],
            log_level: "info".to_string(),
        }
    }
}

impl Config {
    pub fn path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("shuttersort").join("config.toml"))
    }

    pub fn load() -> Result<Self> {
        match Self::path() {
            Some(path) if path.exists() => Self::load_from(&path),
            _ => Ok(Self::default()),
        }
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config: {}", path.display()))?;
        toml::from_str(&raw).with_context(|| format!("invalid config: {}", path.display()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn missing_fields_fall_back_to_defaults() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, r#"engine = ["/opt/engine/bin/engine", "--quiet"]"#).unwrap();

        let config = Config::load_from(file.path()).unwrap();
        assert_eq!(config.engine, vec!["/opt/engine/bin/engine", "--quiet"]);
        assert_eq!(config.log_level, "info");
    }

    #[test]
    fn empty_file_is_the_default_config() {
        let file = tempfile::NamedTempFile::new().unwrap();
        let config = Config::load_from(file.path()).unwrap();
        assert_eq!(config, Config::default());
    }

    #[test]
    fn invalid_toml_is_an_error() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "engine = not-a-list").unwrap();
        assert!(Config::load_from(file.path()).is_err());
    }
}
