//! Settings: YAML file, then `.env`, then the process environment, then CLI
//! flags.
//!
//! Every field is optional in the file. A missing file yields defaults; a
//! malformed one is an error.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::layout::{Layout, DEFAULT_APP_DIR};

/// Default config file name, looked up in the working directory.
pub const CONFIG_FILE: &str = "nrtk.yaml";
/// Env file read from the working directory, same keys as the environment.
pub const ENV_FILE: &str = ".env";
/// Default local feed file used when not fetching remotely.
pub const DEFAULT_LOCAL_PATH: &str = "local.json";

/// Raw, unresolved settings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Settings {
    pub app_dir: Option<PathBuf>,
    pub content_dir: Option<PathBuf>,
    pub snapshot_dir: Option<PathBuf>,
    pub meta_path: Option<PathBuf>,
    pub extension: Option<String>,
    pub remote: bool,
    pub api_url: Option<String>,
    pub api_token: Option<String>,
    pub local_path: Option<PathBuf>,
    pub force: bool,
    /// Repeat interval in milliseconds; `0` runs once.
    pub interval_ms: u64,
}

/// Where the feed comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FeedSource {
    Remote { url: String, token: Option<String> },
    Local { path: PathBuf },
}

impl Settings {
    /// Load settings from `path`. A missing file is not an error.
    pub fn load_at(path: &Path) -> Result<Self, CoreError> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let contents = std::fs::read_to_string(path).map_err(|source| CoreError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        if contents.trim().is_empty() {
            return Ok(Self::default());
        }
        serde_yaml::from_str(&contents).map_err(|source| CoreError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Apply the variables of an env file. A missing file is not an error.
    pub fn apply_env_file(&mut self, path: &Path) -> Result<(), CoreError> {
        if !path.exists() {
            return Ok(());
        }
        let dotenv_err = |source: dotenvy::Error| CoreError::Dotenv {
            path: path.to_path_buf(),
            source,
        };
        let vars = dotenvy::from_path_iter(path)
            .map_err(dotenv_err)?
            .collect::<Result<HashMap<String, String>, _>>()
            .map_err(dotenv_err)?;
        self.apply_env_with(|key| vars.get(key).cloned())
    }

    /// Apply overrides from the process environment.
    pub fn apply_env(&mut self) -> Result<(), CoreError> {
        self.apply_env_with(|key| std::env::var(key).ok())
    }

    /// Apply overrides from an arbitrary variable lookup.
    pub fn apply_env_with<F>(&mut self, lookup: F) -> Result<(), CoreError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(v) = lookup("NRTK_APP_DIR") {
            self.app_dir = Some(PathBuf::from(v));
        }
        if let Some(v) = lookup("NRTK_CONTENT_DIR") {
            self.content_dir = Some(PathBuf::from(v));
        }
        if let Some(v) = lookup("NRTK_SNAPSHOT_DIR") {
            self.snapshot_dir = Some(PathBuf::from(v));
        }
        if let Some(v) = lookup("NRTK_META_PATH") {
            self.meta_path = Some(PathBuf::from(v));
        }
        if let Some(v) = lookup("NRTK_EXTENSION") {
            self.extension = Some(v);
        }
        if let Some(v) = lookup("IS_REMOTE") {
            self.remote = parse_bool("IS_REMOTE", &v)?;
        }
        if let Some(v) = lookup("NRTK_API_URL") {
            self.api_url = Some(v);
        }
        if let Some(v) = lookup("NRTK_API_TOKEN") {
            self.api_token = Some(v);
        }
        if let Some(v) = lookup("NRTK_LOCAL_PATH") {
            self.local_path = Some(PathBuf::from(v));
        }
        if let Some(v) = lookup("IS_FORCE_UPDATE") {
            self.force = parse_bool("IS_FORCE_UPDATE", &v)?;
        }
        if let Some(v) = lookup("INFINITY") {
            self.interval_ms = v.trim().parse().map_err(|_| CoreError::Invalid {
                key: "INFINITY",
                reason: format!("expected milliseconds, got '{v}'"),
            })?;
        }
        Ok(())
    }

    /// Resolve output locations, filling defaults relative to `app_dir`.
    pub fn layout(&self) -> Layout {
        let app_dir = self
            .app_dir
            .clone()
            .unwrap_or_else(|| PathBuf::from(DEFAULT_APP_DIR));
        let mut layout = Layout::new(app_dir);
        if let Some(dir) = &self.content_dir {
            layout.content_dir = dir.clone();
        }
        if let Some(dir) = &self.snapshot_dir {
            layout.snapshot_dir = dir.clone();
        }
        if let Some(path) = &self.meta_path {
            layout.meta_path = path.clone();
        }
        if let Some(ext) = &self.extension {
            layout.extension = ext.clone();
        }
        layout
    }

    /// Repeat interval, or `None` for a single run.
    pub fn interval(&self) -> Option<Duration> {
        (self.interval_ms > 0).then(|| Duration::from_millis(self.interval_ms))
    }

    /// Feed source implied by the settings.
    pub fn source(&self) -> Result<FeedSource, CoreError> {
        if self.remote {
            let url = self
                .api_url
                .clone()
                .filter(|u| !u.trim().is_empty())
                .ok_or_else(|| CoreError::Invalid {
                    key: "api_url",
                    reason: "remote mode needs an API URL".to_string(),
                })?;
            return Ok(FeedSource::Remote {
                url,
                token: self.api_token.clone(),
            });
        }
        Ok(FeedSource::Local {
            path: self
                .local_path
                .clone()
                .unwrap_or_else(|| PathBuf::from(DEFAULT_LOCAL_PATH)),
        })
    }
}

fn parse_bool(key: &'static str, value: &str) -> Result<bool, CoreError> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" | "" => Ok(false),
        other => Err(CoreError::Invalid {
            key,
            reason: format!("expected a boolean, got '{other}'"),
        }),
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
