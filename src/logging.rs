use std::fs::{self, OpenOptions};
use std::path::Path;

use anyhow::{Context, Result};
use env_logger::{Builder, Env, Target};

/// Route `log` output to `path` when `RUST_LOG` is set.
///
/// The terminal belongs to the TUI, so nothing is ever written to stderr.
/// Returns whether a logger was installed.
pub fn init(path: &Path) -> Result<bool> {
    if std::env::var_os("RUST_LOG").is_none() {
        return Ok(false);
    }

    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("creating log directory {}", parent.display()))?;
    }

    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .with_context(|| format!("opening log file {}", path.display()))?;

    Builder::from_env(Env::default())
        .target(Target::Pipe(Box::new(file)))
        .try_init()
        .context("installing logger")?;

    Ok(true)
}
