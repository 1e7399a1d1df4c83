//! Detector events consumed by the tracker

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::filter::UNCOMPUTED_PROBABILITY;
use crate::geometry::{FaceBounds, Point2};
use crate::landmark::Landmark;

/// Detector-assigned identity of a tracked face
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FaceId(pub u32);

impl fmt::Display for FaceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "face#{}", self.0)
    }
}

impl From<u32> for FaceId {
    fn from(id: u32) -> Self {
        FaceId(id)
    }
}

fn uncomputed() -> f32 {
    UNCOMPUTED_PROBABILITY
}

/// One frame of detector output for one face
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FaceDetectionEvent {
    /// Top-left corner of the face box
    pub position: Point2,
    pub width: f32,
    pub height: f32,

    /// Head yaw in degrees
    #[serde(default)]
    pub euler_y: f32,
    /// Head roll in degrees
    #[serde(default)]
    pub euler_z: f32,

    /// Landmarks reported in this frame; missing ones are simply absent
    #[serde(default)]
    pub landmarks: Vec<Landmark>,

    #[serde(default = "uncomputed")]
    pub left_eye_open_probability: f32,
    #[serde(default = "uncomputed")]
    pub right_eye_open_probability: f32,
    #[serde(default = "uncomputed")]
    pub smiling_probability: f32,

    /// Capture time, used to derive the simulation time step
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp_ms: Option<u64>,
}

impl FaceDetectionEvent {
    /// Event with a face box and no landmarks or classifications
    pub fn new(position: Point2, width: f32, height: f32) -> Self {
        Self {
            position,
            width,
            height,
            euler_y: 0.0,
            euler_z: 0.0,
            landmarks: Vec::new(),
            left_eye_open_probability: UNCOMPUTED_PROBABILITY,
            right_eye_open_probability: UNCOMPUTED_PROBABILITY,
            smiling_probability: UNCOMPUTED_PROBABILITY,
            timestamp_ms: None,
        }
    }

    pub fn bounds(&self) -> FaceBounds {
        FaceBounds::new(self.position, self.width, self.height)
    }

    /// Builder-style landmark insertion
    pub fn with_landmark(mut self, landmark: Landmark) -> Self {
        self.landmarks.push(landmark);
        self
    }

    /// Builder-style eye and smile probabilities
    pub fn with_probabilities(mut self, left_eye: f32, right_eye: f32, smiling: f32) -> Self {
        self.left_eye_open_probability = left_eye;
        self.right_eye_open_probability = right_eye;
        self.smiling_probability = smiling;
        self
    }

    pub fn with_timestamp(mut self, timestamp_ms: u64) -> Self {
        self.timestamp_ms = Some(timestamp_ms);
        self
    }
}

/// Per-face lifecycle event from the detector
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum DetectorEvent {
    /// A face ID was seen for the first time
    FirstSeen { face_id: FaceId },

    /// New detection results for a face
    Update {
        face_id: FaceId,
        face: FaceDetectionEvent,
    },

    /// The face went undetected for a moment and may come back
    Missing { face_id: FaceId },

    /// The face is gone for good
    Gone { face_id: FaceId },
}

impl DetectorEvent {
    pub fn face_id(&self) -> FaceId {
        match self {
            Self::FirstSeen { face_id }
            | Self::Update { face_id, .. }
            | Self::Missing { face_id }
            | Self::Gone { face_id } => *face_id,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::landmark::LandmarkId;

    #[test]
    fn test_update_from_json() {
        let line = r#"{
            "event": "update",
            "face_id": 3,
            "face": {
                "position": { "x": 10.0, "y": 20.0 },
                "width": 100.0,
                "height": 120.0,
                "landmarks": [ { "id": "NOSE_BASE", "position": { "x": 60.0, "y": 90.0 } } ],
                "left_eye_open_probability": 0.9
            }
        }"#;

        let event: DetectorEvent = serde_json::from_str(line).unwrap();
        assert_eq!(event.face_id(), FaceId(3));

        let DetectorEvent::Update { face, .. } = event else {
            panic!("expected update");
        };
        assert_eq!(face.landmarks[0].id, LandmarkId::NoseBase);
        assert_eq!(face.left_eye_open_probability, 0.9);
        assert_eq!(face.right_eye_open_probability, UNCOMPUTED_PROBABILITY);
        assert_eq!(face.timestamp_ms, None);
    }

    #[test]
    fn test_lifecycle_events_from_json() {
        let gone: DetectorEvent = serde_json::from_str(r#"{"event":"gone","face_id":7}"#).unwrap();
        assert_eq!(gone, DetectorEvent::Gone { face_id: FaceId(7) });

        let seen: DetectorEvent =
            serde_json::from_str(r#"{"event":"first_seen","face_id":1}"#).unwrap();
        assert_eq!(seen, DetectorEvent::FirstSeen { face_id: FaceId(1) });
    }
}
