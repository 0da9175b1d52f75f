use anyhow::{Context, Result};
use directories::ProjectDirs;
use std::fs;
use std::path::PathBuf;

/// Application paths following OS conventions
#[derive(Clone, Debug)]
pub struct AppPaths {
    /// Configuration directory (config.toml)
    pub config: PathBuf,
}

impl AppPaths {
    /// Resolve the OS-specific config directory (`~/.config/voicegate/` on
    /// Linux, the platform equivalents elsewhere)
    pub fn new() -> Result<Self> {
        let proj_dirs = ProjectDirs::from("dev", "Voicegate", "voicegate")
            .context("Failed to determine project directories")?;

        Ok(Self {
            config: proj_dirs.config_dir().to_path_buf(),
        })
    }

    /// Create all necessary directories
    pub fn ensure_directories(&self) -> Result<()> {
        fs::create_dir_all(&self.config).context("Failed to create config directory")?;
        log::debug!("Config dir: {}", self.config.display());
        Ok(())
    }

    /// Get path to config file
    pub fn config_file(&self) -> PathBuf {
        self.config.join("config.toml")
    }
}

/// Per-user capture paths under the storage root.
///
/// The username is both the lookup key and the storage address: every
/// filename is derived deterministically from it.
#[derive(Clone, Debug)]
pub struct RecordingPaths {
    root: PathBuf,
}

impl RecordingPaths {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// WAV path for a user's enrollment capture
    pub fn enrollment_wav(&self, username: &str) -> PathBuf {
        self.root.join(format!("{}_enroll.wav", username))
    }

    /// WAV path for a user's latest authentication attempt, overwritten on
    /// every attempt
    pub fn attempt_wav(&self, username: &str) -> PathBuf {
        self.root.join(format!("{}_test.wav", username))
    }
}
