//! Threshold filter with memory for intermittent classifier outputs

/// Probability the detector reports when it did not compute a classification
pub const UNCOMPUTED_PROBABILITY: f32 = -1.0;

/// Binary state derived from a probability, holding its last decision while
/// the detector abstains
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BinaryStateFilter {
    previous: bool,
}

impl BinaryStateFilter {
    /// Create a filter whose first fallback answer is `initial`
    pub fn new(initial: bool) -> Self {
        Self { previous: initial }
    }

    /// Threshold a probability, falling back to the last accepted value when
    /// it equals `uncomputed` (or is NaN)
    pub fn apply(&mut self, probability: f32, threshold: f32, uncomputed: f32) -> bool {
        if probability == uncomputed || probability.is_nan() {
            return self.previous;
        }

        self.previous = probability > threshold;
        self.previous
    }

    /// Last accepted value
    pub fn value(&self) -> bool {
        self.previous
    }

    /// Reset the filter
    pub fn reset(&mut self, initial: bool) {
        self.previous = initial;
    }
}

impl Default for BinaryStateFilter {
    /// Starts out `true` so a freshly detected face is drawn with open eyes
    fn default() -> Self {
        Self::new(true)
    }
}
