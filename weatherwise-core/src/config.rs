use anyhow::{Context, Result, anyhow};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::{
    collections::BTreeMap,
    fs,
    path::{Path, PathBuf},
    time::Duration,
};

pub const DEFAULT_BASE_URL: &str = "http://localhost:5000";

/// A user-defined quick-select location.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PresetConfig {
    pub name: String,
    pub lat: String,
    pub lon: String,
}

/// Top-level configuration stored on disk.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Backend address, e.g. "http://localhost:5000".
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Where downloaded reports are written. Current directory when unset.
    #[serde(default)]
    pub download_dir: Option<PathBuf>,

    /// Per-request timeout. Requests wait indefinitely when unset.
    #[serde(default)]
    pub request_timeout_secs: Option<u64>,

    /// Preset key used to seed the coordinates of a new dashboard.
    #[serde(default)]
    pub default_location: Option<String>,

    /// Example TOML:
    /// [presets.mumbai]
    /// name = "Mumbai, Maharashtra"
    /// lat = "19.1"
    /// lon = "72.9"
    #[serde(default)]
    pub presets: BTreeMap<String, PresetConfig>,
}

fn default_base_url() -> String {
    DEFAULT_BASE_URL.to_string()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            download_dir: None,
            request_timeout_secs: None,
            default_location: None,
            presets: BTreeMap::new(),
        }
    }
}

impl Config {
    /// Load config from disk, or return the defaults if it doesn't exist yet.
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::config_file_path()?)
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            // First run: no config file yet.
            return Ok(Self::default());
        }

        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let cfg: Config = toml::from_str(&contents)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        Ok(cfg)
    }

    /// Save config to disk, creating parent directories as needed.
    pub fn save(&self) -> Result<PathBuf> {
        let path = Self::config_file_path()?;
        self.save_to(&path)?;
        Ok(path)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create config directory: {}", parent.display())
            })?;
        }

        let toml =
            toml::to_string_pretty(self).context("Failed to serialize configuration to TOML")?;

        fs::write(path, toml)
            .with_context(|| format!("Failed to write config file: {}", path.display()))?;

        Ok(())
    }

    /// Path to the config file.
    pub fn config_file_path() -> Result<PathBuf> {
        let dirs = ProjectDirs::from("dev", "weatherwise", "weatherwise-cli")
            .ok_or_else(|| anyhow!("Could not determine platform config directory"))?;

        Ok(dirs.config_dir().join("config.toml"))
    }

    pub fn request_timeout(&self) -> Option<Duration> {
        self.request_timeout_secs.map(Duration::from_secs)
    }

    pub fn download_dir(&self) -> PathBuf {
        self.download_dir.clone().unwrap_or_else(|| PathBuf::from("."))
    }

    /// Set or replace a user preset. Keys are stored lowercase.
    pub fn upsert_preset(&mut self, key: &str, preset: PresetConfig) {
        self.presets.insert(key.trim().to_lowercase(), preset);
    }

    pub fn remove_preset(&mut self, key: &str) -> Option<PresetConfig> {
        self.presets.remove(&key.trim().to_lowercase())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mumbai() -> PresetConfig {
        PresetConfig {
            name: "Mumbai, Maharashtra".into(),
            lat: "19.1".into(),
            lon: "72.9".into(),
        }
    }

    #[test]
    fn defaults_point_at_local_backend() {
        let cfg = Config::default();

        assert_eq!(cfg.base_url, "http://localhost:5000");
        assert_eq!(cfg.request_timeout(), None);
        assert_eq!(cfg.download_dir(), PathBuf::from("."));
    }

    #[test]
    fn missing_fields_fall_back_to_defaults() {
        let cfg: Config = toml::from_str("request_timeout_secs = 15\n").expect("valid toml");

        assert_eq!(cfg.base_url, DEFAULT_BASE_URL);
        assert_eq!(cfg.request_timeout(), Some(Duration::from_secs(15)));
        assert!(cfg.presets.is_empty());
    }

    #[test]
    fn upsert_preset_normalizes_key() {
        let mut cfg = Config::default();

        cfg.upsert_preset(" Mumbai ", mumbai());

        assert_eq!(cfg.presets.get("mumbai"), Some(&mumbai()));
        assert_eq!(cfg.remove_preset("MUMBAI"), Some(mumbai()));
        assert!(cfg.presets.is_empty());
    }

    #[test]
    fn save_then_load_from_disk() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("nested").join("config.toml");

        let mut cfg = Config {
            base_url: "http://weather.internal:8080".into(),
            download_dir: Some(PathBuf::from("/tmp/reports")),
            request_timeout_secs: Some(30),
            default_location: Some("pune".into()),
            ..Config::default()
        };
        cfg.upsert_preset("mumbai", mumbai());

        cfg.save_to(&path).expect("save must succeed");
        let loaded = Config::load_from(&path).expect("load must succeed");

        assert_eq!(loaded, cfg);
    }

    #[test]
    fn load_from_missing_file_returns_default() {
        let dir = tempfile::tempdir().expect("tempdir");
        let loaded = Config::load_from(&dir.path().join("absent.toml")).expect("load");

        assert_eq!(loaded, Config::default());
    }
}
