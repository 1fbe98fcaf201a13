use anyhow::{Context, Result};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;

#[derive(Debug, Serialize, Deserialize, Clone, Default)]
pub struct Config {
    #[serde(default)]
    pub storage: StorageConfig,
    #[serde(default)]
    pub display: DisplayConfig,
}

#[derive(Debug, Serialize, Deserialize, Clone, Default)]
pub struct StorageConfig {
    /// Override of the default `~/.histree` data directory.
    pub data_dir: Option<PathBuf>,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct DisplayConfig {
    /// Default per-directory command cap for the tree view (0 = all).
    #[serde(default)]
    pub max_commands: usize,
    #[serde(default = "default_true")]
    pub color_output: bool,
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            max_commands: 0,
            color_output: true,
        }
    }
}

fn default_true() -> bool {
    true
}

impl Config {
    /// Load the config file if one exists; a missing file means defaults.
    /// A file that exists but does not parse is a real error.
    pub fn load_or_default() -> Result<Self> {
        let path = get_config_path()?;
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = fs::read_to_string(&path)
            .with_context(|| format!("failed to read config at {:?}", path))?;
        toml::from_str(&content).with_context(|| format!("invalid config at {:?}", path))
    }

    /// Where the history log lives: the configured override, or `~/.histree`.
    pub fn data_dir(&self) -> Result<PathBuf> {
        if let Some(ref dir) = self.storage.data_dir {
            return Ok(dir.clone());
        }
        let home = dirs::home_dir().context("could not determine home directory")?;
        Ok(home.join(".histree"))
    }
}

pub fn get_config_path() -> Result<PathBuf> {
    let proj_dirs = ProjectDirs::from("com", "histree", "histree")
        .context("could not determine config directory")?;

    Ok(proj_dirs.config_dir().join("config.toml"))
}
