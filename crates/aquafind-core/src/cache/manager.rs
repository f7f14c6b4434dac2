use std::path::{Path, PathBuf};

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::models::Fountain;

/// Cache file name inside the cache directory
pub const CACHE_FILE: &str = "fountains_cache.json";

/// Envelopes older than 24 hours are treated as absent.
pub const CACHE_VALIDITY_HOURS: i64 = 24;

/// Cache failures. These are logged by callers and never reach the user.
#[derive(Error, Debug)]
pub enum CacheError {
    #[error("Failed to read cache file {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to parse cache file {path}: {source}")]
    Parse {
        path: PathBuf,
        source: serde_json::Error,
    },

    #[error("Failed to write cache file {path}: {source}")]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to serialize cache: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// The persisted fountain set and when it was fetched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CacheEnvelope {
    pub fountains: Vec<Fountain>,
    pub timestamp: DateTime<Utc>,
}

impl CacheEnvelope {
    /// Stamp `fountains` with the current time.
    pub fn new(fountains: Vec<Fountain>) -> Self {
        Self {
            fountains,
            timestamp: Utc::now(),
        }
    }

    pub fn age(&self, now: DateTime<Utc>) -> Duration {
        now - self.timestamp
    }

    /// Valid while strictly younger than the validity window.
    pub fn is_valid_at(&self, now: DateTime<Utc>) -> bool {
        self.age(now) < Duration::hours(CACHE_VALIDITY_HOURS)
    }

    pub fn is_valid(&self) -> bool {
        self.is_valid_at(Utc::now())
    }

    pub fn age_display(&self) -> String {
        let minutes = self.age(Utc::now()).num_minutes();
        if minutes < 1 {
            // Includes negative ages from clock skew
            "just now".to_string()
        } else if minutes < 60 {
            format!("{}m ago", minutes)
        } else if minutes < 1440 {
            let hours = minutes / 60;
            if minutes % 60 >= 30 {
                format!("{}h ago", hours + 1)
            } else {
                format!("{}h ago", hours)
            }
        } else {
            let days = minutes / 1440;
            if (minutes % 1440) / 60 >= 12 {
                format!("{}d ago", days + 1)
            } else {
                format!("{}d ago", days)
            }
        }
    }
}

/// File-backed store for the last fetched fountain set.
#[derive(Debug, Clone)]
pub struct CacheStore {
    cache_dir: PathBuf,
}

impl CacheStore {
    /// The directory is created on first save.
    pub fn new(cache_dir: PathBuf) -> Self {
        Self { cache_dir }
    }

    pub fn cache_dir(&self) -> &Path {
        &self.cache_dir
    }

    pub fn cache_path(&self) -> PathBuf {
        self.cache_dir.join(CACHE_FILE)
    }

    /// Read the envelope from disk regardless of age.
    pub fn read_envelope(&self) -> Result<Option<CacheEnvelope>, CacheError> {
        let path = self.cache_path();
        if !path.exists() {
            return Ok(None);
        }

        let contents = std::fs::read_to_string(&path).map_err(|source| CacheError::Read {
            path: path.clone(),
            source,
        })?;

        let envelope: CacheEnvelope =
            serde_json::from_str(&contents).map_err(|source| CacheError::Parse { path, source })?;

        Ok(Some(envelope))
    }

    /// Load the envelope if it exists, parses and is still valid.
    pub fn load(&self) -> Option<CacheEnvelope> {
        self.load_at(Utc::now())
    }

    pub fn load_at(&self, now: DateTime<Utc>) -> Option<CacheEnvelope> {
        match self.read_envelope() {
            Ok(Some(envelope)) if envelope.is_valid_at(now) => {
                debug!(count = envelope.fountains.len(), "Loaded fountains from cache");
                Some(envelope)
            }
            Ok(Some(envelope)) => {
                debug!(timestamp = %envelope.timestamp, "Cache expired");
                None
            }
            Ok(None) => {
                debug!("Cache file does not exist");
                None
            }
            Err(e) => {
                warn!(error = %e, "Ignoring unreadable fountain cache");
                None
            }
        }
    }

    /// Persist `fountains` stamped with the current time.
    ///
    /// Writes a sibling temp file and renames it over the cache file, so a
    /// reader sees either the old envelope or the new one.
    pub fn save(&self, fountains: &[Fountain]) -> Result<CacheEnvelope, CacheError> {
        let envelope = CacheEnvelope::new(fountains.to_vec());
        self.write_envelope(&envelope)?;
        info!(count = fountains.len(), "Saved fountains to cache");
        Ok(envelope)
    }

    pub(crate) fn write_envelope(&self, envelope: &CacheEnvelope) -> Result<(), CacheError> {
        let path = self.cache_path();
        let write_err = |source| CacheError::Write {
            path: path.clone(),
            source,
        };

        std::fs::create_dir_all(&self.cache_dir).map_err(write_err)?;

        let contents = serde_json::to_string_pretty(envelope)?;
        let tmp_path = self
            .cache_dir
            .join(format!(".{}.{}.tmp", CACHE_FILE, Uuid::new_v4()));

        if let Err(e) = std::fs::write(&tmp_path, contents) {
            let _ = std::fs::remove_file(&tmp_path);
            return Err(write_err(e));
        }
        if let Err(e) = std::fs::rename(&tmp_path, &path) {
            let _ = std::fs::remove_file(&tmp_path);
            return Err(write_err(e));
        }
        Ok(())
    }

    /// Remove the cache file. A missing file is not an error.
    pub fn clear(&self) {
        let path = self.cache_path();
        match std::fs::remove_file(&path) {
            Ok(()) => info!("Cache cleared"),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => warn!(error = %e, path = %path.display(), "Failed to clear cache"),
        }
    }

    /// Diagnostic check; agrees with `load()`.
    pub fn is_valid(&self) -> bool {
        self.load().is_some()
    }

    /// Age of the stored envelope for display, valid or not.
    pub fn age_display(&self) -> Option<String> {
        match self.read_envelope() {
            Ok(envelope) => envelope.map(|e| e.age_display()),
            Err(e) => {
                debug!(error = %e, "Failed to load cache for age display");
                None
            }
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
