//! Per-face tracking session

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

use crate::config::TrackingConfig;
use crate::event::{FaceDetectionEvent, FaceId};
use crate::filter::BinaryStateFilter;
use crate::geometry::Point2;
use crate::iris::IrisSimulator;
use crate::landmark::{LandmarkId, LandmarkStore};
use crate::snapshot::{EyeRig, FaceSnapshot};
use crate::TrackingError;

/// Lifecycle of a tracked face
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum SessionState {
    /// Created, no detection processed yet
    #[default]
    New,
    /// Receiving updates, overlay visible
    Active,
    /// Momentarily undetected; state kept warm, overlay hidden
    Missing,
    /// Gone for good
    Done,
}

/// Everything remembered about one tracked face
#[derive(Debug, Clone)]
pub struct FaceTrackSession {
    face_id: FaceId,
    state: SessionState,
    config: TrackingConfig,
    landmarks: LandmarkStore,
    left_eye: BinaryStateFilter,
    right_eye: BinaryStateFilter,
    smile: BinaryStateFilter,
    left_iris: IrisSimulator,
    right_iris: IrisSimulator,
    frames: u64,
    last_timestamp_ms: Option<u64>,
}

impl FaceTrackSession {
    pub fn new(face_id: FaceId, config: TrackingConfig) -> Self {
        Self {
            face_id,
            state: SessionState::New,
            landmarks: LandmarkStore::new(),
            left_eye: BinaryStateFilter::new(true),
            right_eye: BinaryStateFilter::new(true),
            smile: BinaryStateFilter::new(false),
            left_iris: IrisSimulator::new(config.iris.clone()),
            right_iris: IrisSimulator::new(config.iris.clone()),
            frames: 0,
            last_timestamp_ms: None,
            config,
        }
    }

    pub fn face_id(&self) -> FaceId {
        self.face_id
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    /// Whether the overlay for this face should currently be shown
    pub fn is_visible(&self) -> bool {
        self.state == SessionState::Active
    }

    /// Number of updates processed
    pub fn frames(&self) -> u64 {
        self.frames
    }

    pub fn landmarks(&self) -> &LandmarkStore {
        &self.landmarks
    }

    /// Fold one frame of detector output into the session
    pub fn update(&mut self, face: &FaceDetectionEvent) -> Result<FaceSnapshot, TrackingError> {
        if self.state == SessionState::Done {
            return Err(TrackingError::SessionClosed(self.face_id));
        }
        if self.state == SessionState::Missing {
            debug!("{} reappeared after {} frames", self.face_id, self.frames);
        }

        let dt = self.next_dt(face.timestamp_ms);
        let bounds = face.bounds();

        self.landmarks.begin_frame();
        for landmark in &face.landmarks {
            self.landmarks.record_observed(landmark.id, landmark.position, &bounds);
        }

        let landmarks: BTreeMap<LandmarkId, Point2> = LandmarkId::ALL
            .iter()
            .filter_map(|&id| self.landmarks.resolve(id, &bounds).map(|p| (id, p)))
            .collect();

        let uncomputed = self.config.uncomputed_probability;
        let eye_threshold = self.config.eye_open_threshold;
        let left_eye_open = self
            .left_eye
            .apply(face.left_eye_open_probability, eye_threshold, uncomputed);
        let right_eye_open = self
            .right_eye
            .apply(face.right_eye_open_probability, eye_threshold, uncomputed);

        let smile_score = Some(face.smiling_probability)
            .filter(|&p| p != uncomputed && !p.is_nan());
        let smiling = if self.config.retain_smile_on_uncomputed {
            self.smile
                .apply(face.smiling_probability, self.config.smile_threshold, uncomputed)
        } else {
            smile_score.is_some_and(|score| score > self.config.smile_threshold)
        };

        let eyes = self.step_irises(&landmarks, dt);
        let renderable = FaceSnapshot::has_required_landmarks(&landmarks);

        self.frames += 1;
        self.state = SessionState::Active;

        let snapshot = FaceSnapshot {
            face_id: self.face_id,
            frame: self.frames,
            bounds,
            euler_y: face.euler_y,
            euler_z: face.euler_z,
            landmarks,
            left_eye_open,
            right_eye_open,
            smiling,
            smile_score,
            eyes,
            renderable,
        };

        if !renderable {
            trace!(
                "{} frame {} not renderable, missing {:?}",
                self.face_id,
                self.frames,
                snapshot.missing_required()
            );
        }

        Ok(snapshot)
    }

    /// The detector lost the face for now. Returns true if the overlay was visible.
    pub fn mark_missing(&mut self) -> bool {
        let was_visible = self.is_visible();
        if matches!(self.state, SessionState::Active | SessionState::New) {
            self.state = SessionState::Missing;
        }
        was_visible
    }

    /// The face is gone for good. Returns true if the overlay was visible.
    pub fn finish(&mut self) -> bool {
        let was_visible = self.is_visible();
        self.state = SessionState::Done;
        was_visible
    }

    fn next_dt(&mut self, timestamp_ms: Option<u64>) -> f32 {
        let iris = &self.config.iris;
        let dt = match (self.last_timestamp_ms, timestamp_ms) {
            (Some(prev), Some(now)) => iris.clamp_dt(now.saturating_sub(prev) as f32),
            _ => iris.nominal_dt(),
        };
        if timestamp_ms.is_some() {
            self.last_timestamp_ms = timestamp_ms;
        }
        dt
    }

    fn step_irises(&mut self, landmarks: &BTreeMap<LandmarkId, Point2>, dt: f32) -> Option<EyeRig> {
        let left = *landmarks.get(&LandmarkId::LeftEye)?;
        let right = *landmarks.get(&LandmarkId::RightEye)?;

        // Both eyes sized from the distance between them
        let distance = left.distance(right);
        let eye_radius = self.config.eye_radius_proportion * distance;
        let iris_radius = self.config.iris_radius_proportion * distance;
        if !(eye_radius.is_finite() && iris_radius.is_finite()) {
            return None;
        }

        Some(EyeRig {
            eye_radius,
            iris_radius,
            left_iris: self.left_iris.step_with_dt(left, eye_radius, iris_radius, dt),
            right_iris: self.right_iris.step_with_dt(right, eye_radius, iris_radius, dt),
        })
    }
}
