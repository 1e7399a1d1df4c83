//! Renderer-facing output contract

use crate::event::FaceId;
use crate::snapshot::FaceSnapshot;

/// Receiver of per-face overlay registrations and snapshots.
///
/// Implementations own the drawing surface; the tracker only tells them which
/// faces are visible and hands over immutable snapshots.
pub trait OverlaySink {
    /// Show the overlay for a face
    fn register_overlay(&mut self, face_id: FaceId);

    /// Hide the overlay for a face
    fn unregister_overlay(&mut self, face_id: FaceId);

    /// New snapshot for a visible face; implementations should request a redraw
    fn update_overlay(&mut self, face_id: FaceId, snapshot: &FaceSnapshot);

    /// The face is gone for good; drop anything held for it
    fn release_overlay(&mut self, _face_id: FaceId) {}
}

impl<S: OverlaySink + ?Sized> OverlaySink for &mut S {
    fn register_overlay(&mut self, face_id: FaceId) {
        (**self).register_overlay(face_id)
    }

    fn unregister_overlay(&mut self, face_id: FaceId) {
        (**self).unregister_overlay(face_id)
    }

    fn update_overlay(&mut self, face_id: FaceId, snapshot: &FaceSnapshot) {
        (**self).update_overlay(face_id, snapshot)
    }

    fn release_overlay(&mut self, face_id: FaceId) {
        (**self).release_overlay(face_id)
    }
}

/// Sink that ignores everything
#[derive(Debug, Clone, Copy, Default)]
pub struct DiscardSink;

impl OverlaySink for DiscardSink {
    fn register_overlay(&mut self, _face_id: FaceId) {}

    fn unregister_overlay(&mut self, _face_id: FaceId) {}

    fn update_overlay(&mut self, _face_id: FaceId, _snapshot: &FaceSnapshot) {}
}
