//! `quadnav.yaml` loading.

use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use quad_nav::{ConnectionSymmetry, NavMeshConfig, ZTolerance, DEFAULT_MARGIN};

/// File looked up in the working directory when `--config` is not given.
pub const DEFAULT_CONFIG_FILE: &str = "quadnav.yaml";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CliConfig {
    /// Clearance kept from portal sides when smoothing paths
    #[serde(default = "default_margin")]
    pub margin: f32,

    /// Vertical slab used for point location
    pub z_tolerance: ZTolerance,

    /// How one-way connections are treated when building
    pub symmetry: ConnectionSymmetry,

    /// Renumber `.nav` area IDs from 1 before building
    #[serde(default = "default_true")]
    pub compress_ids: bool,
}

fn default_margin() -> f32 {
    DEFAULT_MARGIN
}
fn default_true() -> bool {
    true
}

impl Default for CliConfig {
    fn default() -> Self {
        Self {
            margin: default_margin(),
            z_tolerance: ZTolerance::default(),
            symmetry: ConnectionSymmetry::default(),
            compress_ids: default_true(),
        }
    }
}

impl CliConfig {
    /// Load configuration from a YAML file
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config from {}", path.display()))?;
        let config: Self = serde_yaml::from_str(&content)
            .with_context(|| format!("Failed to parse config from {}", path.display()))?;
        Ok(config)
    }

    /// Load from `dir/quadnav.yaml`, or defaults if there is none.
    pub fn load_from_dir(dir: &Path) -> Result<Self> {
        let config_path = dir.join(DEFAULT_CONFIG_FILE);
        if config_path.exists() {
            Self::load(&config_path)
        } else {
            Ok(Self::default())
        }
    }

    pub fn mesh_config(&self) -> NavMeshConfig {
        NavMeshConfig {
            z_tolerance: self.z_tolerance,
            symmetry: self.symmetry,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_file_uses_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = CliConfig::load_from_dir(dir.path()).unwrap();
        assert_eq!(config, CliConfig::default());
        assert_eq!(config.margin, DEFAULT_MARGIN);
        assert!(config.compress_ids);
        assert_eq!(config.symmetry, ConnectionSymmetry::Require);
    }

    #[test]
    fn test_partial_file_keeps_other_defaults() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join(DEFAULT_CONFIG_FILE),
            "margin: 4.5\nsymmetry: permit\n",
        )
        .unwrap();

        let config = CliConfig::load_from_dir(dir.path()).unwrap();
        assert_eq!(config.margin, 4.5);
        assert_eq!(config.symmetry, ConnectionSymmetry::Permit);
        assert_eq!(config.z_tolerance, ZTolerance::default());
        assert!(config.compress_ids);
    }

    #[test]
    fn test_full_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("custom.yaml");
        std::fs::write(
            &path,
            "margin: 0\nz_tolerance:\n  below: 8\n  above: 16\nsymmetry: require\ncompress_ids: false\n",
        )
        .unwrap();

        let config = CliConfig::load(&path).unwrap();
        assert_eq!(config.margin, 0.0);
        assert!(!config.compress_ids);
        assert_eq!(
            config.mesh_config().z_tolerance,
            ZTolerance {
                below: 8.0,
                above: 16.0
            }
        );
    }

    #[test]
    fn test_invalid_yaml_names_the_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("broken.yaml");
        std::fs::write(&path, "margin: [1, 2").unwrap();

        let err = CliConfig::load(&path).unwrap_err();
        assert!(format!("{err}").contains("broken.yaml"));
    }
}
