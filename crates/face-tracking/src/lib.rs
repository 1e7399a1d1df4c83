//! Face Overlay Tracking
//!
//! Turns a per-frame stream of face detections into stable per-face records
//! for overlay rendering:
//! - Landmark continuity through proportional offsets
//! - Eye-open and smile hysteresis
//! - Per-eye iris follow simulation
//! - Session lifecycle per tracked face (new, active, missing, done)

pub mod config;
pub mod event;
pub mod filter;
pub mod geometry;
pub mod iris;
pub mod landmark;
pub mod session;
pub mod sink;
pub mod snapshot;

pub use config::{IrisConfig, TrackingConfig};
pub use event::{DetectorEvent, FaceDetectionEvent, FaceId};
pub use filter::{BinaryStateFilter, UNCOMPUTED_PROBABILITY};
pub use geometry::{FaceBounds, Point2};
pub use iris::{IrisSimulator, IrisState};
pub use landmark::{Landmark, LandmarkId, LandmarkStore};
pub use session::{FaceTrackSession, SessionState};
pub use sink::{DiscardSink, OverlaySink};
pub use snapshot::{EyeRig, FaceSnapshot};

use std::collections::HashMap;

use thiserror::Error;
use tracing::{debug, info, warn};

/// Tracking error types
#[derive(Error, Debug, Clone, PartialEq)]
pub enum TrackingError {
    #[error("Invalid configuration for {field}: {message}")]
    InvalidConfig {
        field: &'static str,
        message: String,
    },

    #[error("Session for {0} is closed")]
    SessionClosed(FaceId),
}

impl TrackingError {
    pub(crate) fn invalid_config(field: &'static str, message: impl Into<String>) -> Self {
        Self::InvalidConfig {
            field,
            message: message.into(),
        }
    }
}

/// Routes detector events to per-face sessions and drives the overlay sink
pub struct FaceTracker<S: OverlaySink> {
    config: TrackingConfig,
    sessions: HashMap<FaceId, FaceTrackSession>,
    sink: S,
}

impl<S: OverlaySink> FaceTracker<S> {
    /// Create a tracker with a validated configuration
    pub fn new(config: TrackingConfig, sink: S) -> Result<Self, TrackingError> {
        config.validate()?;
        info!("Creating face tracker with config: {:?}", config);
        Ok(Self {
            config,
            sessions: HashMap::new(),
            sink,
        })
    }

    /// Process one detector event. Returns the snapshot produced by updates.
    pub fn handle(&mut self, event: &DetectorEvent) -> Result<Option<FaceSnapshot>, TrackingError> {
        match event {
            DetectorEvent::FirstSeen { face_id } => {
                self.on_first_seen(*face_id);
                Ok(None)
            }
            DetectorEvent::Update { face_id, face } => self.on_update(*face_id, face).map(Some),
            DetectorEvent::Missing { face_id } => {
                self.on_missing(*face_id);
                Ok(None)
            }
            DetectorEvent::Gone { face_id } => {
                self.on_gone(*face_id);
                Ok(None)
            }
        }
    }

    /// Start a session for a newly detected face
    pub fn on_first_seen(&mut self, face_id: FaceId) {
        if self.sessions.contains_key(&face_id) {
            warn!("{} already tracked, ignoring first sighting", face_id);
            return;
        }
        info!("Tracking new face {}", face_id);
        self.sessions
            .insert(face_id, FaceTrackSession::new(face_id, self.config.clone()));
    }

    /// Feed a detection into the face's session and publish the snapshot
    pub fn on_update(
        &mut self,
        face_id: FaceId,
        face: &FaceDetectionEvent,
    ) -> Result<FaceSnapshot, TrackingError> {
        let session = self.sessions.entry(face_id).or_insert_with(|| {
            debug!("Update for unseen {}, starting session", face_id);
            FaceTrackSession::new(face_id, self.config.clone())
        });

        let was_visible = session.is_visible();
        let snapshot = session.update(face)?;

        if !was_visible {
            self.sink.register_overlay(face_id);
        }
        self.sink.update_overlay(face_id, &snapshot);

        Ok(snapshot)
    }

    /// Hide the face's overlay but keep its session warm
    pub fn on_missing(&mut self, face_id: FaceId) {
        match self.sessions.get_mut(&face_id) {
            Some(session) => {
                if session.mark_missing() {
                    debug!("{} missing, hiding overlay", face_id);
                    self.sink.unregister_overlay(face_id);
                }
            }
            None => warn!("Missing event for unknown {}", face_id),
        }
    }

    /// Drop the face's session for good
    pub fn on_gone(&mut self, face_id: FaceId) {
        match self.sessions.remove(&face_id) {
            Some(mut session) => {
                if session.finish() {
                    self.sink.unregister_overlay(face_id);
                }
                self.sink.release_overlay(face_id);
                info!("{} gone after {} frames", face_id, session.frames());
            }
            None => warn!("Gone event for unknown {}", face_id),
        }
    }

    /// Session for a face, if tracked
    pub fn session(&self, face_id: FaceId) -> Option<&FaceTrackSession> {
        self.sessions.get(&face_id)
    }

    /// Number of tracked faces, visible or not
    pub fn tracked_faces(&self) -> usize {
        self.sessions.len()
    }

    /// Number of faces whose overlay is currently shown
    pub fn visible_faces(&self) -> usize {
        self.sessions.values().filter(|s| s.is_visible()).count()
    }

    pub fn config(&self) -> &TrackingConfig {
        &self.config
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    pub fn sink_mut(&mut self) -> &mut S {
        &mut self.sink
    }

    pub fn into_sink(self) -> S {
        self.sink
    }
}
