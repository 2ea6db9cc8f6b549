//! Configuration file support for contree.
//!
//! Loads the startup tree (outputs, workspaces, containers and their swallow
//! rules) from ~/.config/contree/config.toml if it exists, otherwise uses
//! sensible defaults.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::Deserialize;

use crate::matching::Match;
use crate::types::Orientation;

/// Top-level configuration
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub general: GeneralConfig,
    pub outputs: Vec<OutputConfig>,
}

/// General settings
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    /// Rebalance sibling percentages after each container is attached
    pub rebalance: bool,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self { rebalance: true }
    }
}

/// One output and the workspaces on it
#[derive(Debug, Deserialize, Clone)]
pub struct OutputConfig {
    pub name: String,
    #[serde(default)]
    pub workspaces: Vec<WorkspaceConfig>,
}

/// A workspace and its top-level containers
#[derive(Debug, Deserialize, Clone)]
pub struct WorkspaceConfig {
    pub name: String,
    #[serde(default)]
    pub orientation: Orientation,
    #[serde(default)]
    pub children: Vec<ContainerConfig>,
}

/// Recursive enum representing either a split container or a floating group
#[derive(Debug, Deserialize, Clone)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ContainerConfig {
    /// A plain container; with an orientation it splits its children,
    /// without one it waits for a window
    Split(SplitConfig),
    /// A floating group
    Floating(FloatingConfig),
}

/// Configuration for a plain container
#[derive(Debug, Default, Deserialize, Clone)]
#[serde(default)]
pub struct SplitConfig {
    pub name: String,
    pub orientation: Orientation,
    /// Initial share of the parent's space; 0 leaves it unassigned
    pub percent: f64,
    /// Windows this container should swallow
    pub swallows: Vec<Match>,
    pub children: Vec<ContainerConfig>,
}

/// Configuration for a floating group
#[derive(Debug, Default, Deserialize, Clone)]
#[serde(default)]
pub struct FloatingConfig {
    pub name: String,
    pub children: Vec<ContainerConfig>,
}

impl Config {
    /// Load config from default path (~/.config/contree/config.toml)
    pub fn load() -> Self {
        Self::load_from_path(Self::default_path())
    }

    /// Default config file path
    pub fn default_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("contree")
            .join("config.toml")
    }

    /// Load config from a specific path, falling back to defaults
    pub fn load_from_path(path: PathBuf) -> Self {
        if !path.exists() {
            log::info!("No config file found at {:?}, using defaults", path);
            return Self::default();
        }
        match Self::read(&path) {
            Ok(config) => {
                log::info!("Loaded config from {:?}", path);
                config
            }
            Err(e) => {
                log::warn!("Failed to load config: {:#}", e);
                Self::default()
            }
        }
    }

    /// Read and parse a config file, reporting any error
    pub fn read(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read {:?}", path))?;
        Self::parse(&contents).with_context(|| format!("Failed to parse {:?}", path))
    }

    /// Parse config from TOML text
    pub fn parse(contents: &str) -> Result<Self> {
        Ok(toml::from_str(contents)?)
    }
}
