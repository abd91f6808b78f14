// SPDX-License-Identifier: MIT

//! Daemon configuration: filesystem layout and docket.toml settings
//!
//! Everything lives under one state directory so `DOCKET_STATE_DIR`
//! gives tests a fully isolated daemon. The socket lives under /tmp by
//! default to stay inside SUN_LEN (104 bytes on macOS).

use docket_adapters::LlmConfig;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

/// Configuration errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("could not determine state directory")]
    NoStateDir,
    #[error("failed to read {0}: {1}")]
    Read(PathBuf, std::io::Error),
    #[error("failed to parse {0}: {1}")]
    Parse(PathBuf, toml::de::Error),
}

/// Tunables read from `<state_dir>/docket.toml`
///
/// Every field has a default; a missing file means defaults across the
/// board.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Settings {
    /// Number of concurrent pipeline workers
    pub workers: usize,
    /// Visibility timeout for a claimed job
    #[serde(with = "humantime_serde")]
    pub lease: Duration,
    /// Deliveries before a job is dead-lettered
    pub max_attempts: u32,
    /// Worker sleep between empty polls
    #[serde(with = "humantime_serde")]
    pub poll_interval: Duration,
    pub archive: ArchiveSettings,
    pub llm: LlmSettings,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            workers: 2,
            lease: Duration::from_secs(600),
            max_attempts: 3,
            poll_interval: Duration::from_millis(500),
            archive: ArchiveSettings::default(),
            llm: LlmSettings::default(),
        }
    }
}

/// Where finished documentation is addressed from
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ArchiveSettings {
    pub base_url: String,
}

impl Default for ArchiveSettings {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8080".to_string(),
        }
    }
}

/// Completion endpoint settings
///
/// The API key never lives in the file; `api_key_env` names the
/// environment variable to read it from at startup.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LlmSettings {
    pub endpoint: String,
    pub model: String,
    pub api_key_env: String,
}

impl Default for LlmSettings {
    fn default() -> Self {
        let defaults = LlmConfig::default();
        Self {
            endpoint: defaults.endpoint,
            model: defaults.model,
            api_key_env: "OPENAI_API_KEY".to_string(),
        }
    }
}

impl LlmSettings {
    /// Resolve into an adapter config, reading the key from the
    /// environment
    pub fn to_llm_config(&self) -> LlmConfig {
        LlmConfig {
            endpoint: self.endpoint.clone(),
            model: self.model.clone(),
            api_key: std::env::var(&self.api_key_env).unwrap_or_default(),
        }
    }
}

impl Settings {
    /// Load settings from a toml file; a missing file yields defaults
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let content =
            std::fs::read_to_string(path).map_err(|e| ConfigError::Read(path.to_path_buf(), e))?;
        toml::from_str(&content).map_err(|e| ConfigError::Parse(path.to_path_buf(), e))
    }
}

/// Resolved daemon layout plus settings
#[derive(Debug, Clone)]
pub struct Config {
    pub state_dir: PathBuf,
    /// Unix socket the server listens on
    pub socket_path: PathBuf,
    /// Lock/PID file
    pub lock_path: PathBuf,
    /// Version file, checked by the CLI for stale daemons
    pub version_path: PathBuf,
    /// Daemon log file
    pub log_path: PathBuf,
    /// Job store base directory
    pub data_dir: PathBuf,
    /// Finished documentation trees
    pub archive_dir: PathBuf,
    /// Per-job scratch checkouts
    pub workspaces_path: PathBuf,
    pub settings: Settings,
}

impl Config {
    /// Resolve from the environment, with an optional state dir override
    pub fn load(state_dir_override: Option<PathBuf>) -> Result<Self, ConfigError> {
        let state_dir = match state_dir_override {
            Some(dir) => dir,
            None => default_state_dir()?,
        };
        let settings = Settings::load(&state_dir.join("docket.toml"))?;
        Ok(Self::for_state_dir(state_dir, socket_dir(), settings))
    }

    /// Build a config rooted at explicit directories (tests)
    pub fn for_state_dir(state_dir: PathBuf, socket_dir: PathBuf, settings: Settings) -> Self {
        Self {
            socket_path: socket_dir.join("docketd.sock"),
            lock_path: state_dir.join("daemon.pid"),
            version_path: state_dir.join("daemon.version"),
            log_path: state_dir.join("daemon.log"),
            data_dir: state_dir.join("data"),
            archive_dir: state_dir.join("archive"),
            workspaces_path: state_dir.join("workspaces"),
            state_dir,
            settings,
        }
    }
}

/// State directory: `DOCKET_STATE_DIR`, else the platform state dir
pub fn default_state_dir() -> Result<PathBuf, ConfigError> {
    if let Ok(dir) = std::env::var("DOCKET_STATE_DIR") {
        return Ok(PathBuf::from(dir));
    }
    if let Some(dir) = dirs::state_dir() {
        return Ok(dir.join("docket"));
    }
    dirs::home_dir()
        .map(|home| home.join(".local/state/docket"))
        .ok_or(ConfigError::NoStateDir)
}

/// Socket directory: `DOCKET_SOCKET_DIR`, else a short /tmp path
pub fn socket_dir() -> PathBuf {
    if let Ok(dir) = std::env::var("DOCKET_SOCKET_DIR") {
        return PathBuf::from(dir);
    }
    PathBuf::from("/tmp/docket")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_settings_file_yields_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let settings = Settings::load(&dir.path().join("docket.toml")).unwrap();
        assert_eq!(settings.workers, 2);
        assert_eq!(settings.lease, Duration::from_secs(600));
        assert_eq!(settings.max_attempts, 3);
    }

    #[test]
    fn settings_file_overrides_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("docket.toml");
        std::fs::write(
            &path,
            r#"
workers = 4
lease = "2m"
max_attempts = 5
poll_interval = "100ms"

[archive]
base_url = "https://docs.example.com"

[llm]
model = "gpt-4o"
"#,
        )
        .unwrap();

        let settings = Settings::load(&path).unwrap();
        assert_eq!(settings.workers, 4);
        assert_eq!(settings.lease, Duration::from_secs(120));
        assert_eq!(settings.max_attempts, 5);
        assert_eq!(settings.poll_interval, Duration::from_millis(100));
        assert_eq!(settings.archive.base_url, "https://docs.example.com");
        assert_eq!(settings.llm.model, "gpt-4o");
        // unspecified llm fields keep their defaults
        assert_eq!(settings.llm.api_key_env, "OPENAI_API_KEY");
    }

    #[test]
    fn unknown_keys_are_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("docket.toml");
        std::fs::write(&path, "wrokers = 4\n").unwrap();
        assert!(matches!(Settings::load(&path), Err(ConfigError::Parse(..))));
    }

    #[test]
    fn config_paths_hang_off_the_state_dir() {
        let config = Config::for_state_dir(
            PathBuf::from("/var/lib/docket"),
            PathBuf::from("/tmp/docket"),
            Settings::default(),
        );
        assert_eq!(config.socket_path, PathBuf::from("/tmp/docket/docketd.sock"));
        assert_eq!(config.lock_path, PathBuf::from("/var/lib/docket/daemon.pid"));
        assert_eq!(config.data_dir, PathBuf::from("/var/lib/docket/data"));
    }
}
