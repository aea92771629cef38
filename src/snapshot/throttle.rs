//! Cooldown-throttled snapshot persistence.
//!
//! At most one snapshot per cooldown interval, and only for confirmed
//! person detections. The image written is whichever frame variant
//! fed detection this iteration, so stored evidence matches what the
//! detector actually saw.

use crate::detect::Presence;
use chrono::Local;
use image::RgbImage;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::{Duration, Instant};
use thiserror::Error;

/// Errors from a persistence attempt.
#[derive(Debug, Error)]
pub enum SnapshotError {
    #[error("failed to create snapshot directory {path}: {source}")]
    CreateDir {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("failed to write snapshot {path}: {source}")]
    Persist {
        path: PathBuf,
        source: image::ImageError,
    },
}

/// Snapshot policy configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SnapshotConfig {
    /// Directory snapshots are written into; created on first persist.
    pub output_dir: PathBuf,
    /// Minimum seconds between persisted snapshots.
    pub cooldown_secs: u64,
}

impl Default for SnapshotConfig {
    fn default() -> Self {
        Self {
            output_dir: PathBuf::from("detections"),
            cooldown_secs: 15,
        }
    }
}

/// Why a persistence attempt declined to write.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    /// The trigger was not a confirmed person detection.
    NotPerson,
    /// Still inside the cooldown window.
    CoolingDown {
        /// Whole seconds until the window reopens.
        remaining_secs: u64,
    },
}

/// Result of a persistence attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SnapshotOutcome {
    /// Snapshot written to the given path.
    Persisted(PathBuf),
    /// Nothing written.
    Skipped(SkipReason),
}

/// Enforces the minimum interval between persisted snapshots.
///
/// The cooldown clock is plain state on this struct and `now` is
/// injected by the caller, so the invariant is testable without
/// wall-clock sleeps.
pub struct SnapshotThrottle {
    config: SnapshotConfig,
    last_persist: Option<Instant>,
}

impl SnapshotThrottle {
    /// Creates a throttle whose cooldown window starts open.
    pub fn new(config: SnapshotConfig) -> Self {
        Self {
            config,
            last_persist: None,
        }
    }

    /// The configured cooldown interval.
    pub fn cooldown(&self) -> Duration {
        Duration::from_secs(self.config.cooldown_secs)
    }

    /// Time left before the next persist is allowed, at `now`.
    /// `None` means the window is open.
    pub fn remaining(&self, now: Instant) -> Option<Duration> {
        let last = self.last_persist?;
        let elapsed = now.saturating_duration_since(last);
        let cooldown = self.cooldown();
        (elapsed < cooldown).then(|| cooldown - elapsed)
    }

    /// Persists the frame if the trigger and cooldown allow it.
    ///
    /// The cooldown clock advances only on a successful write; a
    /// failed write loses that frame and leaves the window open.
    pub fn try_persist(
        &mut self,
        image: &RgbImage,
        trigger: &Presence,
        now: Instant,
    ) -> Result<SnapshotOutcome, SnapshotError> {
        let tag = match trigger {
            Presence::Persons(_) => "person",
            _ => return Ok(SnapshotOutcome::Skipped(SkipReason::NotPerson)),
        };

        if let Some(remaining) = self.remaining(now) {
            return Ok(SnapshotOutcome::Skipped(SkipReason::CoolingDown {
                remaining_secs: remaining.as_secs(),
            }));
        }

        std::fs::create_dir_all(&self.config.output_dir).map_err(|source| {
            SnapshotError::CreateDir {
                path: self.config.output_dir.clone(),
                source,
            }
        })?;

        let path = self.config.output_dir.join(Self::file_name(tag));
        image
            .save(&path)
            .map_err(|source| SnapshotError::Persist {
                path: path.clone(),
                source,
            })?;

        self.last_persist = Some(now);
        tracing::info!(path = %path.display(), "snapshot persisted");
        Ok(SnapshotOutcome::Persisted(path))
    }

    /// Timestamp-derived name with second resolution and a trigger tag.
    fn file_name(tag: &str) -> String {
        format!("{}_{}.jpg", tag, Local::now().format("%Y%m%d_%H%M%S"))
    }
}
