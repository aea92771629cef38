//! Person detection capability and presence escalation.
//!
//! The object detector itself is an external collaborator: anything
//! that can map a frame and a confidence threshold to a set of person
//! bounding boxes plugs in behind [`PersonDetector`]. This module
//! owns the seam, the box geometry, and the escalation policy that
//! decides when the capability is worth invoking.

mod bbox;
mod detector;
mod escalate;

pub use bbox::BoundingBox;
pub use detector::{DetectorError, PersonDetector, ScriptedDetector};
pub use escalate::{DetectionConfig, Presence, PresenceEscalator};
