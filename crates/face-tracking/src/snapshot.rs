//! Per-frame renderable face record

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::event::FaceId;
use crate::geometry::{FaceBounds, Point2};
use crate::landmark::LandmarkId;

/// Eye and iris geometry computed for a frame
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EyeRig {
    /// Radius of each eye socket
    pub eye_radius: f32,
    /// Radius of each iris
    pub iris_radius: f32,
    /// Absolute left iris position
    pub left_iris: Point2,
    /// Absolute right iris position
    pub right_iris: Point2,
}

/// Resolved face state handed to the renderer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FaceSnapshot {
    pub face_id: FaceId,

    /// Number of updates this session has processed, starting at 1
    pub frame: u64,

    /// Face box of the current frame
    pub bounds: FaceBounds,

    /// Head yaw in degrees
    pub euler_y: f32,

    /// Head roll in degrees
    pub euler_z: f32,

    /// Observed or reconstructed landmark positions; never-seen ones are absent
    pub landmarks: BTreeMap<LandmarkId, Point2>,

    pub left_eye_open: bool,
    pub right_eye_open: bool,

    pub smiling: bool,

    /// Raw smiling probability, absent when the detector did not compute it
    #[serde(skip_serializing_if = "Option::is_none")]
    pub smile_score: Option<f32>,

    /// Present when both eyes resolved
    #[serde(skip_serializing_if = "Option::is_none")]
    pub eyes: Option<EyeRig>,

    /// False when a landmark the overlay needs is absent
    pub renderable: bool,
}

impl FaceSnapshot {
    /// Position of a landmark, if known
    pub fn landmark(&self, id: LandmarkId) -> Option<Point2> {
        self.landmarks.get(&id).copied()
    }

    /// Required landmarks absent from this snapshot
    pub fn missing_required(&self) -> Vec<LandmarkId> {
        LandmarkId::REQUIRED
            .iter()
            .copied()
            .filter(|id| !self.landmarks.contains_key(id))
            .collect()
    }

    /// Whether every required landmark is present
    pub fn has_required_landmarks(landmarks: &BTreeMap<LandmarkId, Point2>) -> bool {
        LandmarkId::REQUIRED.iter().all(|id| landmarks.contains_key(id))
    }

    /// Distance between the eyes, when both are known
    pub fn eye_distance(&self) -> Option<f32> {
        let left = self.landmark(LandmarkId::LeftEye)?;
        let right = self.landmark(LandmarkId::RightEye)?;
        Some(left.distance(right))
    }
}
