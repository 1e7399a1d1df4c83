//! Face Overlay Geometry
//!
//! Renderer-side counterpart of the face tracker:
//! - Googly eyes with simulated irises (stars while smiling)
//! - Pig nose, mustache and hat sprites
//! - Preview-to-view scaling and front-camera mirroring
//! - A registry of visible face graphics fed through [`OverlaySink`]

pub mod graphic;
pub mod primitive;
pub mod transform;

pub use graphic::{face_primitives, FaceGraphic};
pub use primitive::{Paint, Primitive, Rect, Sprite};
pub use transform::{ViewConfig, ViewTransform};

use std::collections::{BTreeMap, BTreeSet};

use face_tracking::{FaceId, FaceSnapshot, OverlaySink};
use serde::Serialize;
use thiserror::Error;
use tracing::{debug, trace};

/// Overlay error types
#[derive(Error, Debug, Clone, PartialEq)]
pub enum OverlayError {
    #[error("Invalid view transform: {0}")]
    InvalidTransform(String),
}

/// Primitives for one visible face
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FaceDrawList {
    pub face_id: FaceId,
    pub primitives: Vec<Primitive>,
}

/// In-memory overlay surface: which faces are shown and what to draw for them
#[derive(Debug, Clone, Default)]
pub struct GraphicOverlay {
    transform: ViewTransform,
    graphics: BTreeMap<FaceId, FaceGraphic>,
    visible: BTreeSet<FaceId>,
    needs_redraw: bool,
}

impl GraphicOverlay {
    pub fn new(transform: ViewTransform) -> Self {
        Self {
            transform,
            ..Default::default()
        }
    }

    /// Switch cameras or view size; applies to every graphic
    pub fn set_transform(&mut self, transform: ViewTransform) {
        self.transform = transform;
        for graphic in self.graphics.values_mut() {
            graphic.set_transform(transform);
        }
        self.needs_redraw = true;
    }

    pub fn is_visible(&self, face_id: FaceId) -> bool {
        self.visible.contains(&face_id)
    }

    pub fn visible_count(&self) -> usize {
        self.visible.len()
    }

    pub fn graphic(&self, face_id: FaceId) -> Option<&FaceGraphic> {
        self.graphics.get(&face_id)
    }

    /// Returns whether a redraw was requested since the last call, and clears it
    pub fn take_redraw(&mut self) -> bool {
        std::mem::take(&mut self.needs_redraw)
    }

    /// Draw lists for visible faces with something to draw, ordered by face ID
    pub fn draw(&self) -> Vec<FaceDrawList> {
        self.visible
            .iter()
            .filter_map(|id| {
                let primitives = self.graphics.get(id)?.primitives();
                if primitives.is_empty() {
                    None
                } else {
                    Some(FaceDrawList {
                        face_id: *id,
                        primitives,
                    })
                }
            })
            .collect()
    }

    fn graphic_mut(&mut self, face_id: FaceId) -> &mut FaceGraphic {
        let transform = self.transform;
        self.graphics
            .entry(face_id)
            .or_insert_with(|| FaceGraphic::new(transform))
    }
}

impl OverlaySink for GraphicOverlay {
    fn register_overlay(&mut self, face_id: FaceId) {
        self.graphic_mut(face_id);
        if self.visible.insert(face_id) {
            debug!("Overlay shown for {}", face_id);
            self.needs_redraw = true;
        }
    }

    fn unregister_overlay(&mut self, face_id: FaceId) {
        if self.visible.remove(&face_id) {
            debug!("Overlay hidden for {}", face_id);
            self.needs_redraw = true;
        }
    }

    fn update_overlay(&mut self, face_id: FaceId, snapshot: &FaceSnapshot) {
        trace!("Overlay update for {} frame {}", face_id, snapshot.frame);
        self.graphic_mut(face_id).update(snapshot);
        self.needs_redraw = true;
    }

    fn release_overlay(&mut self, face_id: FaceId) {
        self.visible.remove(&face_id);
        self.graphics.remove(&face_id);
    }
}
