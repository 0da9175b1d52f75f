//! Per-user fingerprint persistence.
//!
//! One record per username, the filename derived deterministically from it.
//! The vector is stored as raw little-endian f32 bytes; re-enrollment
//! overwrites and last write wins. No expiry, no versioning, no
//! cross-process locking.

use std::fs;
use std::io;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("no fingerprint record for user '{0}'")]
    NotFound(String),

    #[error("fingerprint record for user '{user}' is corrupt: {reason}")]
    Corrupt { user: String, reason: String },

    #[error(transparent)]
    Io(#[from] io::Error),
}

/// Filesystem-backed fingerprint store rooted at one directory.
///
/// The storage scheme (one flat file per user) is private to this type;
/// flows only see usernames and vectors.
pub struct FingerprintStore {
    root: PathBuf,
}

impl FingerprintStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    fn record_path(&self, username: &str) -> PathBuf {
        self.root.join(format!("{}_features.fpr", username))
    }

    /// Check whether a fingerprint record is present for the given username
    pub fn exists(&self, username: &str) -> bool {
        self.record_path(username).exists()
    }

    /// Serialize and persist a feature vector, replacing any prior record
    pub fn write(&self, username: &str, features: &[f32]) -> Result<(), StoreError> {
        fs::create_dir_all(&self.root)?;

        let bytes: Vec<u8> = features.iter().flat_map(|&f| f.to_le_bytes()).collect();
        fs::write(self.record_path(username), bytes)?;

        log::debug!(
            "Stored {}-dimensional fingerprint for user '{}'",
            features.len(),
            username
        );
        Ok(())
    }

    /// Load a user's feature vector
    pub fn read(&self, username: &str) -> Result<Vec<f32>, StoreError> {
        let path = self.record_path(username);
        if !path.exists() {
            return Err(StoreError::NotFound(username.to_string()));
        }

        let bytes = fs::read(&path)?;
        if bytes.len() % 4 != 0 {
            return Err(StoreError::Corrupt {
                user: username.to_string(),
                reason: format!("{} bytes is not a whole number of f32 values", bytes.len()),
            });
        }

        Ok(bytes
            .chunks_exact(4)
            .map(|c| f32::from_le_bytes([c[0], c[1], c[2], c[3]]))
            .collect())
    }

    /// Remove a user's record
    pub fn delete(&self, username: &str) -> Result<(), StoreError> {
        let path = self.record_path(username);
        if !path.exists() {
            return Err(StoreError::NotFound(username.to_string()));
        }

        fs::remove_file(path)?;
        log::info!("Deleted fingerprint for user '{}'", username);
        Ok(())
    }

    /// Usernames with a stored record, sorted
    pub fn list(&self) -> Result<Vec<String>, StoreError> {
        if !self.root.exists() {
            return Ok(Vec::new());
        }

        let mut users = Vec::new();
        for entry in fs::read_dir(&self.root)? {
            let path = entry?.path();
            if let Some(name) = path.file_name().and_then(|s| s.to_str()) {
                if let Some(user) = name.strip_suffix("_features.fpr") {
                    users.push(user.to_string());
                }
            }
        }

        users.sort();
        Ok(users)
    }
}
