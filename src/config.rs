// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Bridge configuration

use crate::engine::EngineKind;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Default configuration file looked up by [`BridgeConfig::load`]
pub const CONFIG_FILE: &str = "meshbridge.toml";

/// Bridge configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BridgeConfig {
    /// Engine providing the native ABI
    pub engine: EngineKind,
    /// Shared library path for the dynamic engine
    pub library_path: Option<PathBuf>,
    /// Whether the native library may be called concurrently
    pub native_reentrant: bool,
    /// Vertex weld distance; 0 merges bit-identical positions only
    pub weld_tolerance: f64,
    /// Points this close to the surface count as contained
    pub boundary_tolerance: f64,
    /// Print timing summaries
    pub timing: bool,
}

impl Default for BridgeConfig {
    fn default() -> Self {
        Self {
            engine: EngineKind::Loopback,
            library_path: None,
            native_reentrant: false,
            weld_tolerance: 0.0,
            boundary_tolerance: 1e-9,
            timing: false,
        }
    }
}

impl BridgeConfig {
    /// Load configuration from file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref())
            .with_context(|| format!("Failed to read config file: {:?}", path.as_ref()))?;
        let config: BridgeConfig = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {:?}", path.as_ref()))?;
        Ok(config)
    }

    /// Load `meshbridge.toml` if present, then apply environment overrides
    pub fn load() -> Result<Self> {
        let config = if PathBuf::from(CONFIG_FILE).exists() {
            Self::from_file(CONFIG_FILE)?
        } else {
            Self::default()
        };
        config.with_env_overrides()
    }

    /// Apply `MESHBRIDGE_LIBRARY`, `MESHBRIDGE_ENGINE` and `MESHBRIDGE_TIMING`
    pub fn with_env_overrides(mut self) -> Result<Self> {
        if let Ok(library) = std::env::var("MESHBRIDGE_LIBRARY") {
            self.library_path = Some(PathBuf::from(library));
            self.engine = EngineKind::Dynamic;
        }

        if let Ok(engine) = std::env::var("MESHBRIDGE_ENGINE") {
            self.engine = engine
                .parse()
                .map_err(anyhow::Error::msg)
                .context("Invalid MESHBRIDGE_ENGINE")?;
        }

        if let Ok(timing) = std::env::var("MESHBRIDGE_TIMING") {
            self.timing = timing.parse().unwrap_or(timing == "1");
        }

        Ok(self)
    }

    /// Save configuration to file
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let content = toml::to_string_pretty(self).context("Failed to serialize config")?;
        std::fs::write(path.as_ref(), content)
            .with_context(|| format!("Failed to write config file: {:?}", path.as_ref()))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_defaults() {
        let config = BridgeConfig::default();
        assert_eq!(config.engine, EngineKind::Loopback);
        assert!(!config.native_reentrant);
        assert_eq!(config.weld_tolerance, 0.0);
        assert_eq!(config.boundary_tolerance, 1e-9);
    }

    #[test]
    fn test_save_and_reload() -> Result<()> {
        let dir = TempDir::new()?;
        let path = dir.path().join(CONFIG_FILE);

        let config = BridgeConfig {
            engine: EngineKind::Dynamic,
            library_path: Some(PathBuf::from("/opt/native/libgeom.so")),
            timing: true,
            ..Default::default()
        };
        config.save(&path)?;

        assert_eq!(BridgeConfig::from_file(&path)?, config);
        Ok(())
    }

    #[test]
    fn test_partial_file_uses_defaults() -> Result<()> {
        let dir = TempDir::new()?;
        let path = dir.path().join("partial.toml");
        std::fs::write(&path, "weld_tolerance = 0.001\n")?;

        let config = BridgeConfig::from_file(&path)?;
        assert_eq!(config.weld_tolerance, 0.001);
        assert_eq!(config.engine, EngineKind::Loopback);
        Ok(())
    }

    #[test]
    fn test_unparsable_file_is_error() -> Result<()> {
        let dir = TempDir::new()?;
        let path = dir.path().join("broken.toml");
        std::fs::write(&path, "engine = \"quantum\"\n")?;

        assert!(BridgeConfig::from_file(&path).is_err());
        Ok(())
    }
}
