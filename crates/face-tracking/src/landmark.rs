//! Facial landmarks and last-known position tracking

use std::collections::HashMap;
use std::fmt;

use serde::{Deserialize, Serialize};
use tracing::trace;

use crate::geometry::{FaceBounds, Point2};

/// Named facial feature point reported by the detector
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum LandmarkId {
    LeftEye,
    RightEye,
    LeftCheek,
    RightCheek,
    NoseBase,
    LeftEar,
    LeftEarTip,
    RightEar,
    RightEarTip,
    LeftMouth,
    BottomMouth,
    RightMouth,
}

impl LandmarkId {
    pub const ALL: [LandmarkId; 12] = [
        Self::LeftEye,
        Self::RightEye,
        Self::LeftCheek,
        Self::RightCheek,
        Self::NoseBase,
        Self::LeftEar,
        Self::LeftEarTip,
        Self::RightEar,
        Self::RightEarTip,
        Self::LeftMouth,
        Self::BottomMouth,
        Self::RightMouth,
    ];

    /// Landmarks the overlay cannot be drawn without
    pub const REQUIRED: [LandmarkId; 6] = [
        Self::LeftEye,
        Self::RightEye,
        Self::NoseBase,
        Self::LeftMouth,
        Self::BottomMouth,
        Self::RightMouth,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::LeftEye => "LEFT_EYE",
            Self::RightEye => "RIGHT_EYE",
            Self::LeftCheek => "LEFT_CHEEK",
            Self::RightCheek => "RIGHT_CHEEK",
            Self::NoseBase => "NOSE_BASE",
            Self::LeftEar => "LEFT_EAR",
            Self::LeftEarTip => "LEFT_EAR_TIP",
            Self::RightEar => "RIGHT_EAR",
            Self::RightEarTip => "RIGHT_EAR_TIP",
            Self::LeftMouth => "LEFT_MOUTH",
            Self::BottomMouth => "BOTTOM_MOUTH",
            Self::RightMouth => "RIGHT_MOUTH",
        }
    }
}

impl fmt::Display for LandmarkId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A landmark observed in a single frame
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Landmark {
    pub id: LandmarkId,
    pub position: Point2,
}

impl Landmark {
    pub fn new(id: LandmarkId, position: Point2) -> Self {
        Self { id, position }
    }
}

/// Last good observation of a landmark and the face box it was seen in
#[derive(Debug, Clone, Copy, PartialEq)]
struct KnownLandmark {
    position: Point2,
    bounds: FaceBounds,
    /// Offset from the box anchor as a fraction of face width/height
    proportion: Point2,
}

/// Per-face memory of where each landmark sits relative to the face box.
///
/// Landmarks observed in the current frame resolve to their observed position.
/// Landmarks the detector dropped resolve to the last learned proportion
/// projected onto the current face box, which degrades as the expression or
/// pose drifts away from the frame it was learned in. A dropped landmark
/// cannot be resolved against a degenerate box.
#[derive(Debug, Clone, Default)]
pub struct LandmarkStore {
    /// Observations for the current frame only
    observed: HashMap<LandmarkId, Point2>,
    known: HashMap<LandmarkId, KnownLandmark>,
}

impl LandmarkStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Forget the previous frame's observations; learned proportions are kept
    pub fn begin_frame(&mut self) {
        self.observed.clear();
    }

    /// Record a landmark seen this frame and relearn its proportional offset
    pub fn record_observed(&mut self, id: LandmarkId, position: Point2, bounds: &FaceBounds) {
        if !position.is_finite() {
            trace!("Ignoring non-finite {} position", id);
            return;
        }

        self.observed.insert(id, position);

        match bounds.to_proportion(position) {
            Some(proportion) => {
                self.known.insert(
                    id,
                    KnownLandmark {
                        position,
                        bounds: *bounds,
                        proportion,
                    },
                );
            }
            None => trace!("Degenerate face box, keeping previous proportion for {}", id),
        }
    }

    /// Best known position of a landmark for the current frame
    pub fn resolve(&self, id: LandmarkId, bounds: &FaceBounds) -> Option<Point2> {
        if let Some(&position) = self.observed.get(&id) {
            return Some(position);
        }
        if bounds.is_degenerate() {
            return None;
        }

        let known = self.known.get(&id)?;
        if known.bounds == *bounds {
            // Same box as when learned: no round trip through the proportion
            Some(known.position)
        } else {
            Some(bounds.from_proportion(known.proportion))
        }
    }

    /// Whether the landmark was reported in the current frame
    pub fn is_observed(&self, id: LandmarkId) -> bool {
        self.observed.contains_key(&id)
    }

    /// Learned proportional offset, if the landmark was ever observed
    pub fn proportion(&self, id: LandmarkId) -> Option<Point2> {
        self.known.get(&id).map(|k| k.proportion)
    }

    /// Number of landmarks with a learned proportion
    pub fn known_count(&self) -> usize {
        self.known.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bounds() -> FaceBounds {
        FaceBounds::new(Point2::new(100.0, 80.0), 200.0, 240.0)
    }

    #[test]
    fn test_observed_round_trip_same_frame() {
        let mut store = LandmarkStore::new();
        let p = Point2::new(150.0, 140.0);

        store.begin_frame();
        store.record_observed(LandmarkId::LeftEye, p, &bounds());

        assert_eq!(store.resolve(LandmarkId::LeftEye, &bounds()), Some(p));
    }

    #[test]
    fn test_reconstruction_static_face() {
        let mut store = LandmarkStore::new();
        let p = Point2::new(150.0, 140.0);

        store.begin_frame();
        store.record_observed(LandmarkId::NoseBase, p, &bounds());

        // Next frame: landmark dropped, face did not move
        store.begin_frame();
        assert_eq!(store.resolve(LandmarkId::NoseBase, &bounds()), Some(p));
        assert!(!store.is_observed(LandmarkId::NoseBase));
    }

    #[test]
    fn test_static_face_reconstruction_is_exact() {
        let mut store = LandmarkStore::new();
        let bounds = FaceBounds::new(Point2::new(13.7, 91.3), 187.3, 211.9);

        for i in 0..200 {
            let p = Point2::new(17.3 + i as f32 * 0.913, 97.1 + i as f32 * 1.037);
            store.begin_frame();
            store.record_observed(LandmarkId::LeftCheek, p, &bounds);
            store.begin_frame();
            assert_eq!(store.resolve(LandmarkId::LeftCheek, &bounds), Some(p));
        }
    }

    #[test]
    fn test_degenerate_box_does_not_reconstruct() {
        let mut store = LandmarkStore::new();
        store.begin_frame();
        store.record_observed(LandmarkId::NoseBase, Point2::new(200.0, 200.0), &bounds());

        store.begin_frame();
        let zero = FaceBounds::new(Point2::new(100.0, 80.0), 0.0, 0.0);
        let nan = FaceBounds::new(Point2::new(100.0, 80.0), f32::NAN, 240.0);
        assert!(store.resolve(LandmarkId::NoseBase, &zero).is_none());
        assert!(store.resolve(LandmarkId::NoseBase, &nan).is_none());

        // Learned offset is still there for the next good box
        assert!(store.resolve(LandmarkId::NoseBase, &bounds()).is_some());
    }

    #[test]
    fn test_reconstruction_follows_face_box() {
        let mut store = LandmarkStore::new();

        store.begin_frame();
        // Quarter of the way across, half way down
        store.record_observed(LandmarkId::RightEye, Point2::new(150.0, 200.0), &bounds());

        store.begin_frame();
        let moved = FaceBounds::new(Point2::new(0.0, 0.0), 400.0, 100.0);
        let resolved = store.resolve(LandmarkId::RightEye, &moved).unwrap();
        assert!((resolved.x - 100.0).abs() < 1e-3);
        assert!((resolved.y - 50.0).abs() < 1e-3);
    }

    #[test]
    fn test_never_observed_is_absent() {
        let mut store = LandmarkStore::new();
        for _ in 0..5 {
            store.begin_frame();
            store.record_observed(LandmarkId::LeftEye, Point2::new(120.0, 120.0), &bounds());
            assert!(store.resolve(LandmarkId::LeftEarTip, &bounds()).is_none());
        }
    }

    #[test]
    fn test_landmarks_use_distinct_slots() {
        let mut store = LandmarkStore::new();
        store.begin_frame();
        store.record_observed(LandmarkId::LeftEar, Point2::new(101.0, 150.0), &bounds());
        store.record_observed(LandmarkId::LeftEarTip, Point2::new(102.0, 120.0), &bounds());
        store.record_observed(LandmarkId::LeftCheek, Point2::new(130.0, 200.0), &bounds());

        store.begin_frame();
        let ear = store.resolve(LandmarkId::LeftEar, &bounds()).unwrap();
        let tip = store.resolve(LandmarkId::LeftEarTip, &bounds()).unwrap();
        let cheek = store.resolve(LandmarkId::LeftCheek, &bounds()).unwrap();
        assert!((ear.y - 150.0).abs() < 1e-3);
        assert!((tip.y - 120.0).abs() < 1e-3);
        assert!((cheek.y - 200.0).abs() < 1e-3);
        assert_eq!(store.known_count(), 3);
    }

    #[test]
    fn test_degenerate_box_keeps_previous_proportion() {
        let mut store = LandmarkStore::new();
        store.begin_frame();
        store.record_observed(LandmarkId::NoseBase, Point2::new(200.0, 200.0), &bounds());
        let learned = store.proportion(LandmarkId::NoseBase).unwrap();

        store.begin_frame();
        let degenerate = FaceBounds::new(Point2::new(100.0, 80.0), 0.0, 240.0);
        store.record_observed(LandmarkId::NoseBase, Point2::new(210.0, 210.0), &degenerate);

        // Observation still wins within the frame
        assert_eq!(
            store.resolve(LandmarkId::NoseBase, &degenerate),
            Some(Point2::new(210.0, 210.0))
        );
        assert_eq!(store.proportion(LandmarkId::NoseBase), Some(learned));
    }

    #[test]
    fn test_serialized_names() {
        let json = serde_json::to_string(&LandmarkId::BottomMouth).unwrap();
        assert_eq!(json, "\"BOTTOM_MOUTH\"");
        for id in LandmarkId::ALL {
            let round: LandmarkId =
                serde_json::from_str(&format!("\"{}\"", id.as_str())).unwrap();
            assert_eq!(round, id);
        }
    }
}
