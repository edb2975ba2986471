//! Configuration management for mapema.
//!
//! This module provides configuration loading and validation using figment,
//! supporting TOML config files, environment variables, and defaults.

use std::path::PathBuf;

use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::map::{MapOptions, MapView, DEFAULT_CENTER, DEFAULT_PITCH, DEFAULT_STYLE, DEFAULT_ZOOM};
use crate::model::LngLat;

/// Default configuration file name.
const CONFIG_FILE_NAME: &str = "config.toml";

/// Default data directory name.
const DATA_DIR_NAME: &str = "mapema";

/// Default database file name.
const DATABASE_FILE_NAME: &str = "mapema.db";

/// Highest zoom level map widgets render.
const MAX_ZOOM: f64 = 22.0;

/// Steepest camera pitch in degrees.
const MAX_PITCH: f64 = 85.0;

/// Application configuration.
///
/// Configuration is loaded from (in order of precedence, highest first):
/// 1. Environment variables (prefixed with `MAPEMA_`)
/// 2. TOML config file at `~/.config/mapema/config.toml`
/// 3. Default values
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Map widget configuration.
    pub map: MapConfig,
    /// Storage configuration.
    pub storage: StorageConfig,
    /// Dataset configuration.
    pub data: DataConfig,
}

/// Initial map view and chrome.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MapConfig {
    /// Style URL.
    pub style: String,
    /// Initial center as `[longitude, latitude]`.
    pub center: LngLat,
    /// Initial zoom level.
    pub zoom: f64,
    /// Initial camera pitch in degrees.
    pub pitch: f64,
    /// Add navigation and geolocation controls.
    pub show_controls: bool,
}

/// Storage-related configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// Path to the database file holding the map credential.
    /// Defaults to `~/.local/share/mapema/mapema.db`
    pub database_path: Option<PathBuf>,
}

/// Dataset configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DataConfig {
    /// JSON file replacing the built-in seed data.
    pub seed_path: Option<PathBuf>,
}

impl Default for MapConfig {
    fn default() -> Self {
        Self {
            style: DEFAULT_STYLE.to_string(),
            center: DEFAULT_CENTER,
            zoom: DEFAULT_ZOOM,
            pitch: DEFAULT_PITCH,
            show_controls: true,
        }
    }
}

impl Config {
    /// Load configuration from all sources.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration loading or parsing fails.
    pub fn load() -> Result<Self> {
        Self::load_from(None)
    }

    /// Load configuration with an optional custom config path.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration loading or parsing fails.
    pub fn load_from(config_path: Option<PathBuf>) -> Result<Self> {
        let config_file = config_path.unwrap_or_else(Self::default_config_path);

        let figment = Figment::new()
            .merge(Serialized::defaults(Config::default()))
            .merge(Toml::file(&config_file))
            .merge(Env::prefixed("MAPEMA_").split("_"));

        let config: Config = figment.extract()?;
        config.validate()?;
        Ok(config)
    }

    /// Get the default configuration file path.
    #[must_use]
    pub fn default_config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from(".config"))
            .join(DATA_DIR_NAME)
            .join(CONFIG_FILE_NAME)
    }

    /// Get the default data directory path.
    #[must_use]
    pub fn default_data_dir() -> PathBuf {
        dirs::data_local_dir()
            .unwrap_or_else(|| PathBuf::from(".local/share"))
            .join(DATA_DIR_NAME)
    }

    /// Validate the configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if any configuration values are invalid.
    pub fn validate(&self) -> Result<()> {
        let map = &self.map;

        if map.style.trim().is_empty() {
            return Err(invalid("map style must not be empty".to_string()));
        }

        if !(0.0..=MAX_ZOOM).contains(&map.zoom) {
            return Err(invalid(format!(
                "zoom ({}) must be between 0 and {MAX_ZOOM}",
                map.zoom
            )));
        }

        if !(0.0..=MAX_PITCH).contains(&map.pitch) {
            return Err(invalid(format!(
                "pitch ({}) must be between 0 and {MAX_PITCH}",
                map.pitch
            )));
        }

        if !(-180.0..=180.0).contains(&map.center.lng()) {
            return Err(invalid(format!(
                "center longitude ({}) must be between -180 and 180",
                map.center.lng()
            )));
        }

        if !(-90.0..=90.0).contains(&map.center.lat()) {
            return Err(invalid(format!(
                "center latitude ({}) must be between -90 and 90",
                map.center.lat()
            )));
        }

        Ok(())
    }

    /// Get the database path, resolving defaults if not set.
    #[must_use]
    pub fn database_path(&self) -> PathBuf {
        self.storage
            .database_path
            .clone()
            .unwrap_or_else(|| Self::default_data_dir().join(DATABASE_FILE_NAME))
    }

    /// Widget options for a new map.
    #[must_use]
    pub fn map_options(&self) -> MapOptions {
        MapOptions {
            view: MapView {
                style: self.map.style.clone(),
                center: self.map.center,
                zoom: self.map.zoom,
                pitch: self.map.pitch,
            },
            show_controls: self.map.show_controls,
        }
    }
}

fn invalid(message: String) -> Error {
    Error::ConfigValidation { message }
}

#[cfg(test)]
mod tests {
    use std::fs;

    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();

        assert_eq!(config.map.style, DEFAULT_STYLE);
        assert_eq!(config.map.center, LngLat(36.8219, -1.2921));
        assert!(config.map.show_controls);
        assert!(config.storage.database_path.is_none());
        assert!(config.data.seed_path.is_none());
    }

    #[test]
    fn test_validate_valid_config() {
        let config = Config::default();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_zoom_out_of_range() {
        let mut config = Config::default();
        config.map.zoom = 23.0;

        let err = config.validate().unwrap_err().to_string();
        assert!(err.contains("zoom"));
    }

    #[test]
    fn test_validate_pitch_out_of_range() {
        let mut config = Config::default();
        config.map.pitch = 90.0;

        let err = config.validate().unwrap_err().to_string();
        assert!(err.contains("pitch"));
    }

    #[test]
    fn test_validate_center_out_of_range() {
        let mut config = Config::default();
        config.map.center = LngLat(200.0, 0.0);
        assert!(config.validate().unwrap_err().to_string().contains("longitude"));

        config.map.center = LngLat(0.0, -91.0);
        assert!(config.validate().unwrap_err().to_string().contains("latitude"));
    }

    #[test]
    fn test_validate_empty_style() {
        let mut config = Config::default();
        config.map.style = "  ".to_string();
        assert!(matches!(
            config.validate(),
            Err(Error::ConfigValidation { .. })
        ));
    }

    #[test]
    fn test_database_path_default() {
        let config = Config::default();
        let path = config.database_path();

        assert!(path.to_string_lossy().contains("mapema.db"));
    }

    #[test]
    fn test_database_path_custom() {
        let mut config = Config::default();
        config.storage.database_path = Some(PathBuf::from("/custom/path/db.sqlite"));

        assert_eq!(
            config.database_path(),
            PathBuf::from("/custom/path/db.sqlite")
        );
    }

    #[test]
    fn test_map_options() {
        let mut config = Config::default();
        config.map.zoom = 14.0;
        config.map.show_controls = false;

        let options = config.map_options();
        assert!((options.view.zoom - 14.0).abs() < f64::EPSILON);
        assert!(!options.show_controls);
        assert_eq!(options.view.center, config.map.center);
    }

    #[test]
    fn test_default_map_options_match_widget_defaults() {
        assert_eq!(Config::default().map_options(), MapOptions::default());
    }

    #[test]
    fn test_default_config_path() {
        let path = Config::default_config_path();
        assert!(path.to_string_lossy().contains("mapema"));
        assert!(path.to_string_lossy().contains("config.toml"));
    }

    #[test]
    fn test_load_nonexistent_config() {
        let result = Config::load_from(Some(PathBuf::from("/nonexistent/config.toml")));
        assert!(result.is_ok());
    }

    #[test]
    fn test_load_from_toml_file() {
        let dir = std::env::temp_dir().join(format!("mapema-config-{}", std::process::id()));
        fs::create_dir_all(&dir).unwrap();
        let path = dir.join("config.toml");
        fs::write(
            &path,
            "[map]\nzoom = 15.0\ncenter = [36.9, -1.3]\n\n[data]\nseed_path = \"/tmp/seed.json\"\n",
        )
        .unwrap();

        let config = Config::load_from(Some(path)).unwrap();
        assert!((config.map.zoom - 15.0).abs() < f64::EPSILON);
        assert_eq!(config.map.center, LngLat(36.9, -1.3));
        assert_eq!(config.data.seed_path, Some(PathBuf::from("/tmp/seed.json")));
        assert_eq!(config.map.style, DEFAULT_STYLE);

        fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_load_rejects_invalid_file() {
        let dir = std::env::temp_dir().join(format!("mapema-config-bad-{}", std::process::id()));
        fs::create_dir_all(&dir).unwrap();
        let path = dir.join("config.toml");
        fs::write(&path, "[map]\npitch = 120.0\n").unwrap();

        let result = Config::load_from(Some(path));
        assert!(matches!(result, Err(Error::ConfigValidation { .. })));

        fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_file_tables_reach_every_section() {
        let dir = std::env::temp_dir().join(format!("mapema-config-tables-{}", std::process::id()));
        fs::create_dir_all(&dir).unwrap();
        let path = dir.join("config.toml");
        fs::write(
            &path,
            "[map]\nshow_controls = false\n\n[storage]\ndatabase_path = \"/tmp/m.db\"\n",
        )
        .unwrap();

        let config = Config::load_from(Some(path)).unwrap();
        assert!(!config.map.show_controls);
        assert_eq!(config.database_path(), PathBuf::from("/tmp/m.db"));

        fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_map_config_serialize() {
        let json = serde_json::to_string(&MapConfig::default()).unwrap();
        assert!(json.contains("show_controls"));
        assert!(json.contains("[36.8219,-1.2921]"));
    }
}
