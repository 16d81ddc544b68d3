use anyhow::{Context, Result, anyhow};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

const DEFAULTS: &str = include_str!("../../config/default.toml");

#[derive(Debug, Clone, Deserialize)]
pub struct BridgeConfig {
    pub runtime: RuntimeConfig,
    pub logging: LoggingConfig,
    pub host: HostConfig,
}

/// Interpreter limits, in bytes. Zero leaves the interpreter default in place.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RuntimeConfig {
    pub memory_limit: usize,
    pub max_stack_size: usize,
    pub gc_threshold: usize,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    pub filter: String,
    #[serde(default)]
    pub directory: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct HostConfig {
    pub expose_env: bool,
}

impl BridgeConfig {
    /// Load configuration with layering: defaults → user config → explicit file.
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        let mut layers = vec![DEFAULTS.to_string()];

        if let Some(proj_dirs) = directories::ProjectDirs::from("", "", "jsbridge") {
            let config_path = proj_dirs.config_dir().join("config.toml");
            if config_path.exists() {
                layers.push(read_layer(&config_path)?);
            }
        }

        if let Some(path) = explicit {
            layers.push(read_layer(path)?);
        }

        let mut config = Self::from_layers(&layers)?;

        // Expand ~ in the log directory
        if let Some(dir) = config.logging.directory.as_mut() {
            if dir.starts_with('~') {
                let home = dirs_home().ok_or_else(|| anyhow!("cannot determine home directory"))?;
                *dir = dir.replacen('~', &home.to_string_lossy(), 1);
            }
        }

        Ok(config)
    }

    /// Deep-merge TOML documents in order, later tables overriding earlier keys.
    pub fn from_layers<S: AsRef<str>>(layers: &[S]) -> Result<Self> {
        let mut merged = toml::Table::new();
        for layer in layers {
            let table: toml::Table = toml::from_str(layer.as_ref())?;
            merge_tables(&mut merged, table);
        }

        Ok(toml::Value::Table(merged).try_into()?)
    }

    pub fn defaults() -> Result<Self> {
        Self::from_layers(&[DEFAULTS])
    }

    pub fn log_dir(&self) -> PathBuf {
        if let Some(dir) = self.logging.directory.as_ref() {
            return PathBuf::from(dir);
        }

        directories::ProjectDirs::from("", "", "jsbridge")
            .map(|d| d.data_dir().to_path_buf())
            .unwrap_or_else(|| std::env::temp_dir().join("jsbridge"))
    }
}

fn read_layer(path: &Path) -> Result<String> {
    fs::read_to_string(path).with_context(|| format!("reading config {}", path.display()))
}

fn merge_tables(base: &mut toml::Table, overlay: toml::Table) {
    for (key, value) in overlay {
        match (base.get_mut(&key), value) {
            (Some(toml::Value::Table(existing)), toml::Value::Table(incoming)) => {
                merge_tables(existing, incoming);
            }
            (_, value) => {
                base.insert(key, value);
            }
        }
    }
}

fn dirs_home() -> Option<PathBuf> {
    directories::BaseDirs::new().map(|d| d.home_dir().to_path_buf())
}
