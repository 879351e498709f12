use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::core::LookupMode;
use crate::download::DEFAULT_USER_AGENT;
use crate::youtube::live::{DOWNLOAD_SERVICE, OEMBED_ENDPOINT};
use crate::youtube::utils::WATCH_URL;

/// Environment variable naming an alternate config file
pub const CONFIG_ENV: &str = "TUBEFORGE_CONFIG";

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config {}: {source}", path.display())]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to parse config {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },
}

/// Lookup configuration, read from a TOML file.
///
/// Every field is optional in the file; missing ones take the defaults.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// `live` (oEmbed + synthesized catalog) or `direct` (watch page).
    pub mode: LookupMode,
    pub oembed_endpoint: String,
    /// Companion service the live catalog points at.
    pub download_service: String,
    /// Watch page base used by direct extraction.
    pub watch_base: String,
    pub user_agent: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            mode: LookupMode::default(),
            oembed_endpoint: OEMBED_ENDPOINT.to_string(),
            download_service: DOWNLOAD_SERVICE.to_string(),
            watch_base: WATCH_URL.to_string(),
            user_agent: DEFAULT_USER_AGENT.to_string(),
        }
    }
}

impl Config {
    pub fn from_toml(data: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(data)
    }

    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let data = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml(&data).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Load from `path`, else from `$TUBEFORGE_CONFIG`, else defaults.
    pub fn resolve(path: Option<&Path>) -> Result<Self, ConfigError> {
        if let Some(path) = path {
            return Self::load(path);
        }
        match std::env::var_os(CONFIG_ENV) {
            Some(path) if !path.is_empty() => Self::load(Path::new(&path)),
            _ => Ok(Self::default()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_values() {
        let cfg = Config::default();
        assert_eq!(cfg.mode, LookupMode::Live);
        assert_eq!(cfg.oembed_endpoint, "https://www.youtube.com/oembed");
        assert_eq!(
            cfg.download_service,
            "https://video-audio-forge.vercel.app/download"
        );
        assert_eq!(cfg.watch_base, "https://www.youtube.com/watch");
    }

    #[test]
    fn partial_file_keeps_defaults() {
        let cfg = Config::from_toml("mode = \"direct\"\n").unwrap();
        assert_eq!(cfg.mode, LookupMode::Direct);
        assert_eq!(cfg.oembed_endpoint, Config::default().oembed_endpoint);
    }

    #[test]
    fn unknown_mode_is_rejected() {
        assert!(Config::from_toml("mode = \"both\"\n").is_err());
    }

    #[test]
    fn config_toml_roundtrip() {
        let cfg = Config {
            mode: LookupMode::Direct,
            ..Config::default()
        };
        let toml = toml::to_string_pretty(&cfg).unwrap();
        assert_eq!(Config::from_toml(&toml).unwrap(), cfg);
    }

    #[test]
    fn load_reports_path() {
        let path = std::env::temp_dir().join("tubeforge-missing-config.toml");
        let err = Config::load(&path).unwrap_err();
        assert!(matches!(err, ConfigError::Read { .. }));
        assert!(err.to_string().contains("tubeforge-missing-config.toml"));
    }

    #[test]
    fn explicit_path_wins() {
        let path = std::env::temp_dir().join(format!("tubeforge-{}.toml", std::process::id()));
        fs::write(&path, "mode = \"direct\"\nwatch_base = \"http://127.0.0.1/watch\"\n").unwrap();
        let cfg = Config::resolve(Some(&path)).unwrap();
        fs::remove_file(&path).unwrap();
        assert_eq!(cfg.mode, LookupMode::Direct);
        assert_eq!(cfg.watch_base, "http://127.0.0.1/watch");
    }
}
