//! Detector-to-view coordinate mapping

use face_tracking::Point2;
use serde::{Deserialize, Serialize};

use crate::primitive::Rect;
use crate::OverlayError;

/// Preview and view sizes as configured by the host application
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewConfig {
    /// Width of the frames the detector ran on
    pub preview_width: f32,
    /// Height of the frames the detector ran on
    pub preview_height: f32,
    /// Width of the surface the overlay is drawn on
    pub view_width: f32,
    /// Height of the surface the overlay is drawn on
    pub view_height: f32,
    /// Front camera previews are mirrored horizontally
    pub front_facing: bool,
}

impl Default for ViewConfig {
    fn default() -> Self {
        Self {
            preview_width: 640.0,
            preview_height: 480.0,
            view_width: 640.0,
            view_height: 480.0,
            front_facing: true,
        }
    }
}

/// Scales detector coordinates onto the view, mirroring for front cameras
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ViewTransform {
    width_scale: f32,
    height_scale: f32,
    view_width: f32,
    mirrored: bool,
}

impl ViewTransform {
    pub fn new(config: &ViewConfig) -> Result<Self, OverlayError> {
        let sizes = [
            ("preview_width", config.preview_width),
            ("preview_height", config.preview_height),
            ("view_width", config.view_width),
            ("view_height", config.view_height),
        ];
        for (name, value) in sizes {
            if !(value.is_finite() && value > 0.0) {
                return Err(OverlayError::InvalidTransform(format!(
                    "{name} must be positive, got {value}"
                )));
            }
        }

        Ok(Self {
            width_scale: config.view_width / config.preview_width,
            height_scale: config.view_height / config.preview_height,
            view_width: config.view_width,
            mirrored: config.front_facing,
        })
    }

    /// Unscaled, unmirrored mapping
    pub fn identity() -> Self {
        Self {
            width_scale: 1.0,
            height_scale: 1.0,
            view_width: 0.0,
            mirrored: false,
        }
    }

    pub fn is_mirrored(&self) -> bool {
        self.mirrored
    }

    /// Scale a horizontal length
    pub fn scale_x(&self, length: f32) -> f32 {
        length * self.width_scale
    }

    /// Scale a vertical length
    pub fn scale_y(&self, length: f32) -> f32 {
        length * self.height_scale
    }

    pub fn translate_x(&self, x: f32) -> f32 {
        if self.mirrored {
            self.view_width - self.scale_x(x)
        } else {
            self.scale_x(x)
        }
    }

    pub fn translate_y(&self, y: f32) -> f32 {
        self.scale_y(y)
    }

    pub fn point(&self, p: Point2) -> Point2 {
        Point2::new(self.translate_x(p.x), self.translate_y(p.y))
    }

    /// Radii follow the horizontal scale
    pub fn radius(&self, r: f32) -> f32 {
        self.scale_x(r)
    }

    /// Rotation in view space; mirroring flips its direction
    pub fn rotation(&self, degrees: f32) -> f32 {
        if self.mirrored {
            -degrees
        } else {
            degrees
        }
    }

    /// Map a rectangle given in detector coordinates
    pub fn rect(&self, rect: &Rect) -> Rect {
        Rect::from_corners(
            self.point(Point2::new(rect.left, rect.top)),
            self.point(Point2::new(rect.right, rect.bottom)),
        )
    }
}

impl Default for ViewTransform {
    fn default() -> Self {
        Self::identity()
    }
}
