//! Face tracking configuration

use serde::{Deserialize, Serialize};

use crate::filter::UNCOMPUTED_PROBABILITY;
use crate::TrackingError;

/// Per-face tracking configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrackingConfig {
    /// Eye-open probability above which an eye counts as open
    pub eye_open_threshold: f32,

    /// Smiling probability above which the face counts as smiling
    pub smile_threshold: f32,

    /// Sentinel the detector reports for an uncomputed probability
    pub uncomputed_probability: f32,

    /// Hold the last smile decision while the smile probability is uncomputed
    pub retain_smile_on_uncomputed: bool,

    /// Eye radius as a fraction of the distance between the eyes
    pub eye_radius_proportion: f32,

    /// Iris radius as a fraction of the distance between the eyes
    pub iris_radius_proportion: f32,

    /// Iris follow simulation
    pub iris: IrisConfig,
}

impl Default for TrackingConfig {
    fn default() -> Self {
        Self {
            eye_open_threshold: 0.4,
            smile_threshold: 0.8,
            uncomputed_probability: UNCOMPUTED_PROBABILITY,
            retain_smile_on_uncomputed: false,
            eye_radius_proportion: 0.45,
            iris_radius_proportion: 0.225,
            iris: IrisConfig::default(),
        }
    }
}

impl TrackingConfig {
    /// Check value ranges
    pub fn validate(&self) -> Result<(), TrackingError> {
        check_probability("eye_open_threshold", self.eye_open_threshold)?;
        check_probability("smile_threshold", self.smile_threshold)?;

        if (0.0..=1.0).contains(&self.uncomputed_probability) {
            return Err(TrackingError::invalid_config(
                "uncomputed_probability",
                "sentinel must lie outside [0, 1]",
            ));
        }

        if !(self.eye_radius_proportion.is_finite() && self.eye_radius_proportion > 0.0) {
            return Err(TrackingError::invalid_config(
                "eye_radius_proportion",
                "must be a positive number",
            ));
        }

        if !(self.iris_radius_proportion.is_finite()
            && self.iris_radius_proportion >= 0.0
            && self.iris_radius_proportion < self.eye_radius_proportion)
        {
            return Err(TrackingError::invalid_config(
                "iris_radius_proportion",
                "must be non-negative and smaller than eye_radius_proportion",
            ));
        }

        self.iris.validate()
    }
}

/// Iris follow simulation tuning
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct IrisConfig {
    /// Time for the iris to close half the distance to its rest position (seconds)
    pub halflife_s: f32,

    /// Rest position below the eye center, as a fraction of the free radius
    pub rest_sag: f32,

    /// Speed limit in free radii per second
    pub max_speed: f32,

    /// Time step used when frames carry no timestamp (milliseconds)
    pub nominal_frame_ms: f32,

    /// Lower bound on the time step between timestamped frames (milliseconds)
    pub min_frame_ms: f32,

    /// Upper bound on the time step between timestamped frames (milliseconds)
    pub max_frame_ms: f32,
}

impl Default for IrisConfig {
    fn default() -> Self {
        Self {
            halflife_s: 0.08,
            rest_sag: 0.35,
            max_speed: 12.0,
            nominal_frame_ms: 1000.0 / 60.0,
            min_frame_ms: 1.0,
            max_frame_ms: 100.0,
        }
    }
}

impl IrisConfig {
    /// Quick settling, barely visible lag
    pub fn snappy() -> Self {
        Self {
            halflife_s: 0.03,
            max_speed: 30.0,
            ..Default::default()
        }
    }

    /// Heavy, googly-eye style lag
    pub fn floaty() -> Self {
        Self {
            halflife_s: 0.2,
            rest_sag: 0.6,
            max_speed: 6.0,
            ..Default::default()
        }
    }

    /// Nominal frame interval in seconds
    pub fn nominal_dt(&self) -> f32 {
        self.nominal_frame_ms / 1000.0
    }

    /// Clamp an observed frame interval (milliseconds) into seconds
    pub fn clamp_dt(&self, elapsed_ms: f32) -> f32 {
        elapsed_ms.clamp(self.min_frame_ms, self.max_frame_ms) / 1000.0
    }

    pub fn validate(&self) -> Result<(), TrackingError> {
        if !(self.halflife_s.is_finite() && self.halflife_s > 0.0) {
            return Err(TrackingError::invalid_config("iris.halflife_s", "must be positive"));
        }
        if !(0.0..=1.0).contains(&self.rest_sag) {
            return Err(TrackingError::invalid_config("iris.rest_sag", "must lie in [0, 1]"));
        }
        if !(self.max_speed.is_finite() && self.max_speed > 0.0) {
            return Err(TrackingError::invalid_config("iris.max_speed", "must be positive"));
        }
        if !(self.min_frame_ms > 0.0
            && self.min_frame_ms <= self.nominal_frame_ms
            && self.nominal_frame_ms <= self.max_frame_ms
            && self.max_frame_ms.is_finite())
        {
            return Err(TrackingError::invalid_config(
                "iris.nominal_frame_ms",
                "frame intervals must satisfy 0 < min <= nominal <= max",
            ));
        }
        Ok(())
    }
}

fn check_probability(field: &'static str, value: f32) -> Result<(), TrackingError> {
    if (0.0..=1.0).contains(&value) {
        Ok(())
    } else {
        Err(TrackingError::invalid_config(field, "must lie in [0, 1]"))
    }
}
