use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::shared::constants::{
    CAPTURE_INTERVAL_MS, CAPTURE_TARGET, DEFAULT_JPEG_QUALITY, DEFAULT_REQUEST_TIMEOUT_SECS,
    DEFAULT_SERVER_URL, RECOGNITION_INTERVAL_MS,
};

#[derive(Error, Debug)]
pub enum SettingsError {
    #[error("could not determine config directory")]
    NoConfigDir,
    #[error("failed to write settings to {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to serialize settings: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// Client configuration persisted as JSON in the user config directory.
///
/// Fields missing from an older file fall back to their defaults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientSettings {
    pub server_url: String,
    pub recognition_interval_ms: u64,
    pub capture_interval_ms: u64,
    pub jpeg_quality: u8,
    pub request_timeout_secs: u64,
    pub capture_target: u32,
}

impl Default for ClientSettings {
    fn default() -> Self {
        Self {
            server_url: DEFAULT_SERVER_URL.to_string(),
            recognition_interval_ms: RECOGNITION_INTERVAL_MS,
            capture_interval_ms: CAPTURE_INTERVAL_MS,
            jpeg_quality: DEFAULT_JPEG_QUALITY,
            request_timeout_secs: DEFAULT_REQUEST_TIMEOUT_SECS,
            capture_target: CAPTURE_TARGET,
        }
    }
}

impl ClientSettings {
    pub fn config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|d| d.join("Attendance Kiosk").join("settings.json"))
    }

    /// Loads from the default location; any failure yields defaults.
    pub fn load() -> Self {
        Self::config_path()
            .map(|path| Self::load_from(&path))
            .unwrap_or_default()
    }

    pub fn load_from(path: &Path) -> Self {
        match fs::read_to_string(path) {
            Ok(json) => serde_json::from_str(&json).unwrap_or_else(|e| {
                log::warn!("Ignoring malformed settings at {}: {e}", path.display());
                Self::default()
            }),
            Err(_) => Self::default(),
        }
    }

    pub fn save(&self) -> Result<PathBuf, SettingsError> {
        let path = Self::config_path().ok_or(SettingsError::NoConfigDir)?;
        self.save_to(&path)?;
        Ok(path)
    }

    pub fn save_to(&self, path: &Path) -> Result<(), SettingsError> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|e| SettingsError::Write {
                path: parent.to_path_buf(),
                source: e,
            })?;
        }
        let json = serde_json::to_string_pretty(self)?;
        fs::write(path, json).map_err(|e| SettingsError::Write {
            path: path.to_path_buf(),
            source: e,
        })
    }

    pub fn recognition_interval(&self) -> Duration {
        Duration::from_millis(self.recognition_interval_ms.max(1))
    }

    pub fn capture_interval(&self) -> Duration {
        Duration::from_millis(self.capture_interval_ms.max(1))
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs.max(1))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_defaults_match_flow_cadences() {
        let settings = ClientSettings::default();
        assert_eq!(settings.recognition_interval(), Duration::from_millis(1200));
        assert_eq!(settings.capture_interval(), Duration::from_millis(400));
        assert_eq!(settings.capture_target, 30);
        assert_eq!(settings.server_url, "http://127.0.0.1:5000");
    }

    #[test]
    fn test_missing_file_yields_defaults() {
        let tmp = TempDir::new().unwrap();
        let settings = ClientSettings::load_from(&tmp.path().join("nope.json"));
        assert_eq!(settings, ClientSettings::default());
    }

    #[test]
    fn test_malformed_file_yields_defaults() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("settings.json");
        fs::write(&path, "{ not json").unwrap();
        assert_eq!(ClientSettings::load_from(&path), ClientSettings::default());
    }

    #[test]
    fn test_partial_file_fills_missing_fields() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("settings.json");
        fs::write(&path, r#"{ "server_url": "http://kiosk:8080" }"#).unwrap();

        let settings = ClientSettings::load_from(&path);

        assert_eq!(settings.server_url, "http://kiosk:8080");
        assert_eq!(settings.capture_interval_ms, 400);
    }

    #[test]
    fn test_save_then_load() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("nested").join("settings.json");
        let settings = ClientSettings {
            jpeg_quality: 55,
            capture_interval_ms: 250,
            ..ClientSettings::default()
        };

        settings.save_to(&path).unwrap();

        assert_eq!(ClientSettings::load_from(&path), settings);
    }

    #[test]
    fn test_zero_intervals_are_clamped() {
        let settings = ClientSettings {
            recognition_interval_ms: 0,
            capture_interval_ms: 0,
            request_timeout_secs: 0,
            ..ClientSettings::default()
        };
        assert_eq!(settings.recognition_interval(), Duration::from_millis(1));
        assert_eq!(settings.capture_interval(), Duration::from_millis(1));
        assert_eq!(settings.request_timeout(), Duration::from_secs(1));
    }
}
