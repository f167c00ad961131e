//! Runtime configuration.
//!
//! All filesystem locations derive from one injected base directory, so
//! tests and hooks can point the whole subsystem at a throwaway tree.
//! An optional `config.yaml` in the base directory overrides tuning knobs;
//! a missing or unparseable file falls back to defaults.

use crate::error::{Result, TrackError};
use crate::paths;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

// ---------------------------------------------------------------------------
// Config
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Base directory holding `logs/` and `config.yaml`.
    pub base_dir: PathBuf,

    /// Run the full analyzer after every Nth log record. 0 disables.
    #[serde(default = "default_auto_analyze_every")]
    pub auto_analyze_every: u64,

    /// Maximum distinct truncated-error keys kept per tool.
    #[serde(default = "default_common_error_cap")]
    pub common_error_cap: usize,
}

fn default_auto_analyze_every() -> u64 {
    10
}

fn default_common_error_cap() -> usize {
    24
}

impl Config {
    pub fn new(base_dir: impl Into<PathBuf>) -> Self {
        Self {
            base_dir: base_dir.into(),
            auto_analyze_every: default_auto_analyze_every(),
            common_error_cap: default_common_error_cap(),
        }
    }

    /// Resolve the base directory: explicit override, else `~/.toolwatch`.
    pub fn resolve(explicit: Option<&Path>) -> Result<Self> {
        let base_dir = match explicit {
            Some(p) => p.to_path_buf(),
            None => home::home_dir()
                .ok_or(TrackError::HomeNotFound)?
                .join(paths::BASE_DIR_NAME),
        };
        Ok(Self::load(base_dir))
    }

    /// Build a config for `base_dir`, overlaying `config.yaml` if present
    /// and parseable. Self-healing: a corrupt file yields the defaults.
    pub fn load(base_dir: impl Into<PathBuf>) -> Self {
        let base_dir = base_dir.into();
        let mut config = Self::new(&base_dir);
        let path = paths::config_path(&base_dir);
        if let Ok(data) = std::fs::read_to_string(&path) {
            match serde_yaml::from_str::<Overrides>(&data) {
                Ok(overrides) => config.apply(overrides),
                Err(e) => {
                    tracing::warn!("ignoring unparseable {}: {e}", path.display());
                }
            }
        }
        config
    }

    fn apply(&mut self, overrides: Overrides) {
        if let Some(n) = overrides.auto_analyze_every {
            self.auto_analyze_every = n;
        }
        if let Some(n) = overrides.common_error_cap {
            self.common_error_cap = n;
        }
    }
}

/// The subset of `Config` a `config.yaml` may override.
#[derive(Debug, Default, Deserialize)]
struct Overrides {
    #[serde(default)]
    auto_analyze_every: Option<u64>,
    #[serde(default)]
    common_error_cap: Option<usize>,
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
