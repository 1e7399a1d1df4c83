//! Googly-eye face graphic: eyes, pig nose, mustache and hat

use face_tracking::{FaceSnapshot, LandmarkId, Point2};

use crate::primitive::{Paint, Primitive, Rect, Sprite};
use crate::transform::ViewTransform;

/// Nose half-width as a multiple of the iris radius
const NOSE_WIDTH_SCALE: f32 = 1.4;
/// Hat width as a multiple of the distance between the eyes
const HAT_WIDTH_SCALE: f32 = 2.6;
/// Gap between eye line and hat brim, in eye distances
const HAT_BRIM_OFFSET: f32 = 0.9;
/// Hat height relative to its width
const HAT_ASPECT: f32 = 0.75;

/// Drawable for one face, holding the latest snapshot
#[derive(Debug, Clone)]
pub struct FaceGraphic {
    transform: ViewTransform,
    snapshot: Option<FaceSnapshot>,
}

impl FaceGraphic {
    pub fn new(transform: ViewTransform) -> Self {
        Self {
            transform,
            snapshot: None,
        }
    }

    /// Replace the snapshot to draw
    pub fn update(&mut self, snapshot: &FaceSnapshot) {
        self.snapshot = Some(snapshot.clone());
    }

    pub fn set_transform(&mut self, transform: ViewTransform) {
        self.transform = transform;
    }

    pub fn snapshot(&self) -> Option<&FaceSnapshot> {
        self.snapshot.as_ref()
    }

    /// Primitives for the current snapshot; empty when nothing can be drawn
    pub fn primitives(&self) -> Vec<Primitive> {
        self.snapshot
            .as_ref()
            .map(|s| face_primitives(s, &self.transform))
            .unwrap_or_default()
    }
}

/// Lay out the overlay for a snapshot.
///
/// Non-renderable snapshots produce nothing rather than partial geometry.
pub fn face_primitives(snapshot: &FaceSnapshot, transform: &ViewTransform) -> Vec<Primitive> {
    if !snapshot.renderable {
        return Vec::new();
    }

    let landmark = |id| snapshot.landmark(id).map(|p| transform.point(p));
    let (Some(left_eye), Some(right_eye), Some(nose), Some(mouth_left), Some(mouth_right)) = (
        landmark(LandmarkId::LeftEye),
        landmark(LandmarkId::RightEye),
        landmark(LandmarkId::NoseBase),
        landmark(LandmarkId::LeftMouth),
        landmark(LandmarkId::RightMouth),
    ) else {
        return Vec::new();
    };
    let Some(rig) = snapshot.eyes else {
        return Vec::new();
    };

    let eye_radius = transform.radius(rig.eye_radius);
    let iris_radius = transform.radius(rig.iris_radius);

    let mut out = Vec::with_capacity(12);

    push_eye(
        &mut out,
        left_eye,
        eye_radius,
        transform.point(rig.left_iris),
        iris_radius,
        snapshot.left_eye_open,
        snapshot.smiling,
    );
    push_eye(
        &mut out,
        right_eye,
        eye_radius,
        transform.point(rig.right_iris),
        iris_radius,
        snapshot.right_eye_open,
        snapshot.smiling,
    );

    // Mustache spans the mouth corners, from the nose base down to the higher corner
    out.push(Primitive::sprite(
        Sprite::Mustache,
        Rect::from_corners(
            Point2::new(mouth_left.x, nose.y),
            Point2::new(mouth_right.x, mouth_left.y.min(mouth_right.y)),
        ),
    ));

    // Pig nose from the eye line down to the nose base
    let eye_line = (left_eye.y + right_eye.y) / 2.0;
    let half_width = iris_radius * NOSE_WIDTH_SCALE;
    out.push(Primitive::sprite(
        Sprite::PigNose,
        Rect::from_corners(
            Point2::new(nose.x - half_width, eye_line),
            Point2::new(nose.x + half_width, nose.y),
        ),
    ));

    out.push(hat(left_eye, right_eye, snapshot.euler_z, transform));

    out
}

fn push_eye(
    out: &mut Vec<Primitive>,
    eye: Point2,
    eye_radius: f32,
    iris: Point2,
    iris_radius: f32,
    open: bool,
    smiling: bool,
) {
    if open {
        out.push(Primitive::Circle {
            center: eye,
            radius: eye_radius,
            paint: Paint::EyeWhites,
        });
        if smiling {
            out.push(Primitive::sprite(Sprite::HappyStar, Rect::around(iris, iris_radius)));
        } else {
            out.push(Primitive::Circle {
                center: iris,
                radius: iris_radius,
                paint: Paint::Iris,
            });
        }
    } else {
        out.push(Primitive::Circle {
            center: eye,
            radius: eye_radius,
            paint: Paint::EyeLid,
        });
        out.push(Primitive::Line {
            from: Point2::new(eye.x - eye_radius, eye.y),
            to: Point2::new(eye.x + eye_radius, eye.y),
            paint: Paint::Outline,
        });
    }

    out.push(Primitive::Circle {
        center: eye,
        radius: eye_radius,
        paint: Paint::Outline,
    });
}

/// Hat centered over the eyes, tilted with the head roll
fn hat(left_eye: Point2, right_eye: Point2, euler_z: f32, transform: &ViewTransform) -> Primitive {
    let eye_distance = left_eye.distance(right_eye);
    let center = left_eye.midpoint(right_eye);

    let width = eye_distance * HAT_WIDTH_SCALE;
    let brim = center.y - eye_distance * HAT_BRIM_OFFSET;

    Primitive::Sprite {
        sprite: Sprite::Hat,
        bounds: Rect::from_corners(
            Point2::new(center.x - width / 2.0, brim - width * HAT_ASPECT),
            Point2::new(center.x + width / 2.0, brim),
        ),
        rotation_deg: transform.rotation(euler_z),
    }
}
