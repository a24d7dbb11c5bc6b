use log::warn;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::app_dirs::AppDirs;
use crate::runtime::DEFAULT_TICK_RATE_MS;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Config {
    /// How often the timer display refreshes while typing
    pub tick_rate_ms: u64,
    /// Sentences to draw from instead of the built-in quotes
    pub corpus_file: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            tick_rate_ms: DEFAULT_TICK_RATE_MS,
            corpus_file: None,
        }
    }
}

impl Config {
    /// Apply command line values on top of the stored config
    pub fn with_overrides(mut self, tick_rate_ms: Option<u64>, corpus_file: Option<PathBuf>) -> Self {
        if let Some(ms) = tick_rate_ms {
            self.tick_rate_ms = ms;
        }
        if corpus_file.is_some() {
            self.corpus_file = corpus_file;
        }
        self
    }

    pub fn tick_interval(&self) -> Duration {
        // a zero interval would spin the event loop
        Duration::from_millis(self.tick_rate_ms.max(1))
    }
}

pub trait ConfigStore {
    fn load(&self) -> Config;
    fn save(&self, cfg: &Config) -> std::io::Result<()>;
}

#[derive(Debug, Clone)]
pub struct FileConfigStore {
    path: PathBuf,
}

impl FileConfigStore {
    #[allow(clippy::new_without_default)]
    pub fn new() -> Self {
        let path = AppDirs::config_path().unwrap_or_else(|| PathBuf::from("nuggettype_config.json"));
        Self { path }
    }

    pub fn with_path<P: AsRef<Path>>(p: P) -> Self {
        Self {
            path: p.as_ref().to_path_buf(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Default for FileConfigStore {
    fn default() -> Self {
        Self::new()
    }
}

impl ConfigStore for FileConfigStore {
    fn load(&self) -> Config {
        let bytes = match fs::read(&self.path) {
            Ok(bytes) => bytes,
            Err(_) => return Config::default(),
        };

        match serde_json::from_slice::<Config>(&bytes) {
            Ok(cfg) => cfg,
            Err(e) => {
                warn!(
                    "ignoring unreadable config {}: {e}",
                    self.path.display()
                );
                Config::default()
            }
        }
    }

    fn save(&self, cfg: &Config) -> std::io::Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let data = serde_json::to_vec_pretty(cfg)?;
        fs::write(&self.path, data)
    }
}
