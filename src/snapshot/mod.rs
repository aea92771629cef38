//! Snapshot persistence under a cooldown policy.

mod throttle;

pub use throttle::{SkipReason, SnapshotConfig, SnapshotError, SnapshotOutcome, SnapshotThrottle};
