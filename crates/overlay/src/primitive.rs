//! Backend-neutral drawing primitives in view coordinates

use face_tracking::Point2;
use serde::{Deserialize, Serialize};

/// Axis-aligned rectangle, `left <= right` and `top <= bottom`
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    pub left: f32,
    pub top: f32,
    pub right: f32,
    pub bottom: f32,
}

impl Rect {
    /// Rectangle spanned by two opposite corners, in any order
    pub fn from_corners(a: Point2, b: Point2) -> Self {
        Self {
            left: a.x.min(b.x),
            top: a.y.min(b.y),
            right: a.x.max(b.x),
            bottom: a.y.max(b.y),
        }
    }

    /// Square of half-size `radius` around `center`
    pub fn around(center: Point2, radius: f32) -> Self {
        let r = radius.abs();
        Self {
            left: center.x - r,
            top: center.y - r,
            right: center.x + r,
            bottom: center.y + r,
        }
    }

    pub fn width(&self) -> f32 {
        self.right - self.left
    }

    pub fn height(&self) -> f32 {
        self.bottom - self.top
    }

    pub fn center(&self) -> Point2 {
        Point2::new((self.left + self.right) * 0.5, (self.top + self.bottom) * 0.5)
    }
}

/// Fill or stroke style
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Paint {
    /// White fill of an open eye
    EyeWhites,
    /// Powder-blue fill of a closed eye
    EyeLid,
    /// Saddle-brown iris fill
    Iris,
    /// Black 5px stroke
    Outline,
}

/// Bitmap overlays placed by bounds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Sprite {
    PigNose,
    HappyStar,
    Mustache,
    Hat,
}

/// One drawing instruction
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "shape", rename_all = "snake_case")]
pub enum Primitive {
    Circle {
        center: Point2,
        radius: f32,
        paint: Paint,
    },
    Line {
        from: Point2,
        to: Point2,
        paint: Paint,
    },
    Sprite {
        sprite: Sprite,
        bounds: Rect,
        /// Clockwise rotation about the bounds center, degrees
        #[serde(default)]
        rotation_deg: f32,
    },
}

impl Primitive {
    pub fn sprite(sprite: Sprite, bounds: Rect) -> Self {
        Primitive::Sprite {
            sprite,
            bounds,
            rotation_deg: 0.0,
        }
    }

    /// Sprite kind, if this is a sprite
    pub fn sprite_kind(&self) -> Option<Sprite> {
        match self {
            Primitive::Sprite { sprite, .. } => Some(*sprite),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rect_from_swapped_corners() {
        let rect = Rect::from_corners(Point2::new(10.0, 50.0), Point2::new(2.0, 20.0));
        assert_eq!(rect.left, 2.0);
        assert_eq!(rect.right, 10.0);
        assert_eq!(rect.top, 20.0);
        assert_eq!(rect.bottom, 50.0);
        assert_eq!(rect.center(), Point2::new(6.0, 35.0));
    }

    #[test]
    fn test_primitive_json_shape() {
        let json = serde_json::to_value(Primitive::Circle {
            center: Point2::new(1.0, 2.0),
            radius: 3.0,
            paint: Paint::EyeWhites,
        })
        .unwrap();
        assert_eq!(json["shape"], "circle");
        assert_eq!(json["paint"], "eye_whites");
    }
}
