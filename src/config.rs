use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{NotesError, Result};

pub const ENV_ROOT: &str = "TOASTNOTES_ROOT";
pub const ENV_BIND: &str = "TOASTNOTES_BIND";
pub const ENV_STATIC_DIR: &str = "TOASTNOTES_STATIC_DIR";

/// Bounds on the recursive directory walk behind list operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ListLimits {
    /// Maximum folder depth below the storage root.
    pub max_depth: usize,
    /// Maximum number of notes returned by one listing.
    pub max_notes: usize,
}

impl Default for ListLimits {
    fn default() -> Self {
        Self {
            max_depth: 32,
            max_notes: 10_000,
        }
    }
}

/// Server and client configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Storage root holding the note files and the images directory.
    pub root: PathBuf,
    /// Address the HTTP server binds to.
    pub bind: String,
    /// Directory with the browser client, served as the fallback route.
    pub static_dir: Option<PathBuf>,
    /// URL prefix under which the storage root is served.
    pub public_prefix: String,
    /// Request body ceiling for saves and uploads.
    pub max_body_bytes: usize,
    pub autosave_interval_secs: u64,
    pub list: ListLimits,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            root: PathBuf::from("./files"),
            bind: "127.0.0.1:8080".to_string(),
            static_dir: None,
            public_prefix: "/files".to_string(),
            max_body_bytes: 10 * 1024 * 1024,
            autosave_interval_secs: 300,
            list: ListLimits::default(),
        }
    }
}

impl Config {
    /// Load from an optional YAML file, then apply environment overrides.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut config = match path {
            Some(path) => Self::from_file(path)?,
            None => Self::default(),
        };
        config.apply_env(|key| std::env::var(key).ok());
        config.validate()?;
        Ok(config)
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path).map_err(|e| {
            NotesError::Config(format!("cannot read {}: {}", path.display(), e))
        })?;
        Ok(serde_yaml::from_str(&raw)?)
    }

    /// Apply overrides from a variable lookup (the process environment in
    /// production).
    pub fn apply_env<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(root) = lookup(ENV_ROOT).filter(|v| !v.is_empty()) {
            self.root = PathBuf::from(root);
        }
        if let Some(bind) = lookup(ENV_BIND).filter(|v| !v.is_empty()) {
            self.bind = bind;
        }
        if let Some(dir) = lookup(ENV_STATIC_DIR).filter(|v| !v.is_empty()) {
            self.static_dir = Some(PathBuf::from(dir));
        }
    }

    pub fn validate(&self) -> Result<()> {
        if !self.public_prefix.starts_with('/') || self.public_prefix.len() < 2 {
            return Err(NotesError::Config(format!(
                "public_prefix must start with '/' and name a path, got '{}'",
                self.public_prefix
            )));
        }
        if self.public_prefix.ends_with('/') {
            return Err(NotesError::Config(
                "public_prefix must not end with '/'".to_string(),
            ));
        }
        if self.list.max_depth == 0 || self.list.max_notes == 0 {
            return Err(NotesError::Config(
                "list.max_depth and list.max_notes must be positive".to_string(),
            ));
        }
        if self.autosave_interval_secs == 0 {
            return Err(NotesError::Config(
                "autosave_interval_secs must be positive".to_string(),
            ));
        }
        Ok(())
    }

    pub fn autosave_interval(&self) -> Duration {
        Duration::from_secs(self.autosave_interval_secs)
    }
}
