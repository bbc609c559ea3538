use std::fs;
use std::path::{Path, PathBuf};

use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::core::{BuildError, BuildResult, DatasetType, PatchBuildParams, Thresholds};

/// Name of the configuration file inside the platform config directory
pub const CONFIG_FILE_NAME: &str = "config.json";

/// Every parameter of the raw → patches → dataset pipeline.
///
/// Stored as JSON. Missing fields take their defaults, so a config file only
/// needs the values that differ.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BuildConfig {
    /// Folder holding one sub-folder per raw acquisition
    pub raw_data_path: Option<PathBuf>,

    /// Folder receiving one patch folder per acquisition
    pub patched_data_path: Option<PathBuf>,

    /// Folder receiving the flat dataset
    pub dataset_path: Option<PathBuf>,

    /// Class boundaries as fractions of full scale
    pub thresholds: Thresholds,

    /// Side length of the square patches, in pixels
    pub patch_size: u32,

    /// Pixel size every acquisition is resampled to (µm/pixel)
    pub resampling_resolution: f64,

    /// `unique` or `mixed`
    pub dataset_type: DatasetType,

    /// Seed for mixed datasets; drawn at random when absent
    pub random_seed: Option<u64>,
}

impl Default for BuildConfig {
    fn default() -> Self {
        Self {
            raw_data_path: None,
            patched_data_path: None,
            dataset_path: None,
            thresholds: Thresholds::default(),
            patch_size: 512,
            resampling_resolution: 0.1,
            dataset_type: DatasetType::Unique,
            random_seed: None,
        }
    }
}

impl BuildConfig {
    /// Default config location in the platform config directory
    pub fn get_config_path() -> Option<PathBuf> {
        ProjectDirs::from("org", "patch-dataset-builder", "patch-dataset-builder")
            .map(|dirs| dirs.config_dir().join(CONFIG_FILE_NAME))
    }

    /// Load the config at `path`. Any failure is an error, since the caller
    /// asked for this file explicitly.
    pub fn load_from(path: &Path) -> BuildResult<Self> {
        info!("Loading config from: {:?}", path);
        let contents = fs::read_to_string(path).map_err(|e| BuildError::io(path, e))?;
        serde_json::from_str(&contents).map_err(|e| {
            BuildError::InvalidParameter(format!("config file {:?}: {}", path, e))
        })
    }

    /// Load the config from the default location, or return defaults if the
    /// file doesn't exist or is corrupted
    pub fn load() -> Self {
        match Self::get_config_path() {
            Some(path) => Self::load_or_default(&path),
            None => {
                warn!("Could not determine config directory. Using defaults.");
                Self::default()
            }
        }
    }

    /// Like [`BuildConfig::load_from`], but a missing file silently means
    /// defaults and an unreadable one is only a warning.
    pub fn load_or_default(path: &Path) -> Self {
        if !path.exists() {
            info!("No config file at {:?}. Using defaults.", path);
            return Self::default();
        }
        Self::load_from(path).unwrap_or_else(|e| {
            warn!("{}. Using defaults.", e);
            Self::default()
        })
    }

    /// Write the config to `path` as pretty JSON, creating parent folders
    pub fn save_to(&self, path: &Path) -> BuildResult<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|e| BuildError::io(parent, e))?;
        }
        let json = serde_json::to_string_pretty(self)
            .map_err(|e| BuildError::InvalidParameter(format!("cannot serialize config: {}", e)))?;
        fs::write(path, json).map_err(|e| BuildError::io(path, e))?;
        info!("Config saved to: {:?}", path);
        Ok(())
    }

    /// Parameters for the raw → patches stage
    pub fn patch_params(&self, keep_going: bool) -> PatchBuildParams {
        PatchBuildParams {
            thresholds: self.thresholds,
            patch_size: self.patch_size,
            resampling_resolution: self.resampling_resolution,
            keep_going,
        }
    }

    /// Check the numeric parameters without touching the file system.
    /// Thresholds are already checked when deserialized.
    pub fn validate(&self) -> BuildResult<()> {
        self.patch_params(false).validate()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_default() {
        let config = BuildConfig::default();
        assert_eq!(config.thresholds.values(), [0.0, 0.2, 0.8]);
        assert_eq!(config.patch_size, 512);
        assert_eq!(config.resampling_resolution, 0.1);
        assert_eq!(config.dataset_type, DatasetType::Unique);
        assert!(config.random_seed.is_none());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_config_uses_defaults() {
        let config: BuildConfig =
            serde_json::from_str(r#"{ "patch_size": 256, "dataset_type": "mixed" }"#).unwrap();
        assert_eq!(config.patch_size, 256);
        assert_eq!(config.dataset_type, DatasetType::Mixed);
        assert_eq!(config.resampling_resolution, 0.1);
    }

    #[test]
    fn test_bad_thresholds_rejected_on_load() {
        let parsed = serde_json::from_str::<BuildConfig>(r#"{ "thresholds": [0.9, 0.2, 0.8] }"#);
        assert!(parsed.is_err());
    }

    #[test]
    fn test_save_and_load_from() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join(CONFIG_FILE_NAME);
        let config = BuildConfig {
            raw_data_path: Some(PathBuf::from("data/raw")),
            dataset_type: DatasetType::Mixed,
            random_seed: Some(42),
            ..BuildConfig::default()
        };

        config.save_to(&path).unwrap();
        let loaded = BuildConfig::load_from(&path).unwrap();
        assert_eq!(loaded, config);
    }

    #[test]
    fn test_load_or_default_falls_back() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join(CONFIG_FILE_NAME);
        assert_eq!(BuildConfig::load_or_default(&missing), BuildConfig::default());

        fs::write(&missing, "{ not json").unwrap();
        assert_eq!(BuildConfig::load_or_default(&missing), BuildConfig::default());

        fs::write(&missing, r#"{ "patch_size": 128 }"#).unwrap();
        assert_eq!(BuildConfig::load_or_default(&missing).patch_size, 128);
    }

    #[test]
    fn test_load_from_missing_file_is_error() {
        let dir = tempfile::tempdir().unwrap();
        assert!(BuildConfig::load_from(&dir.path().join("none.json")).is_err());
    }
}
