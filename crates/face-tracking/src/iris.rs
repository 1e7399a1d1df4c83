//! Iris follow simulation
//!
//! Each eye carries a small kinematic model: the iris keeps its absolute
//! position when the head moves (inertia), is pulled back toward a rest point
//! low in the socket by a critically damped spring, and is hard-clamped to the
//! socket so it never leaves the white of the eye.

use std::f32::consts::LN_2;

use crate::config::IrisConfig;
use crate::geometry::Point2;

/// Kinematic state of one iris, relative to its eye center
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct IrisState {
    /// Eye center seen on the previous step
    pub eye_center: Point2,
    /// Iris position relative to `eye_center`
    pub offset: Point2,
    /// Velocity of `offset` in pixels per second
    pub velocity: Point2,
}

impl IrisState {
    /// Absolute iris position
    pub fn position(&self) -> Point2 {
        self.eye_center + self.offset
    }
}

/// Per-eye iris simulator
#[derive(Debug, Clone)]
pub struct IrisSimulator {
    config: IrisConfig,
    state: Option<IrisState>,
}

impl IrisSimulator {
    pub fn new(config: IrisConfig) -> Self {
        Self {
            config,
            state: None,
        }
    }

    /// Advance one nominal frame
    pub fn step(&mut self, eye_center: Point2, eye_radius: f32, iris_radius: f32) -> Point2 {
        let dt = self.config.nominal_dt();
        self.step_with_dt(eye_center, eye_radius, iris_radius, dt)
    }

    /// Advance by `dt` seconds and return the new absolute iris position.
    ///
    /// The result is always within `eye_radius - iris_radius` of `eye_center`.
    pub fn step_with_dt(
        &mut self,
        eye_center: Point2,
        eye_radius: f32,
        iris_radius: f32,
        dt: f32,
    ) -> Point2 {
        if !(eye_center.is_finite() && eye_radius.is_finite() && iris_radius.is_finite()) {
            return eye_center;
        }

        let free_radius = (eye_radius.max(0.0) - iris_radius.max(0.0)).max(0.0);
        if free_radius <= 0.0 {
            // No room to move: the iris collapses onto the eye center
            self.state = Some(IrisState {
                eye_center,
                ..Default::default()
            });
            return eye_center;
        }

        let rest = Point2::new(0.0, self.config.rest_sag * free_radius);

        let mut state = match self.state {
            Some(mut prev) => {
                // Inertia: the iris stays where it was while the socket moves
                prev.offset -= eye_center - prev.eye_center;
                prev.eye_center = eye_center;
                if !(prev.offset.is_finite() && prev.velocity.is_finite()) {
                    prev.offset = rest;
                    prev.velocity = Point2::ZERO;
                }
                prev
            }
            None => IrisState {
                eye_center,
                offset: rest,
                velocity: Point2::ZERO,
            },
        };

        let dt = if dt.is_finite() && dt > 0.0 { dt } else { 0.0 };
        if dt > 0.0 {
            let max_speed = self.config.max_speed * free_radius;
            self.integrate(&mut state, rest, max_speed, dt);
        }

        clamp_to_socket(&mut state, free_radius);

        self.state = Some(state);
        state.position()
    }

    /// Exact critically damped spring step toward `rest`, with the
    /// displacement and velocity limited by `max_speed`
    fn integrate(&self, state: &mut IrisState, rest: Point2, max_speed: f32, dt: f32) {
        let omega = 2.0 * LN_2 / self.config.halflife_s;

        let j0 = state.offset - rest;
        let j1 = state.velocity + j0 * omega;
        let decay = (-omega * dt).exp();

        let target = rest + (j0 + j1 * dt) * decay;
        let mut velocity = (state.velocity - j1 * (omega * dt)) * decay;

        let mut displacement = target - state.offset;
        let max_step = max_speed * dt;
        let step_len = displacement.length();
        if step_len > max_step {
            displacement = displacement * (max_step / step_len);
        }

        let speed = velocity.length();
        if speed > max_speed {
            velocity = velocity * (max_speed / speed);
        }

        state.offset += displacement;
        state.velocity = velocity;
    }

    /// Current state, `None` before the first step
    pub fn state(&self) -> Option<&IrisState> {
        self.state.as_ref()
    }

    /// Forget all kinematic state
    pub fn reset(&mut self) {
        self.state = None;
    }
}

impl Default for IrisSimulator {
    fn default() -> Self {
        Self::new(IrisConfig::default())
    }
}

/// Project the iris back into the socket and drop the velocity component
/// pointing out of it
fn clamp_to_socket(state: &mut IrisState, free_radius: f32) {
    let len = state.offset.length();
    if len <= free_radius {
        return;
    }

    let normal = state.offset * (1.0 / len);
    state.offset = normal * free_radius;

    let outward = state.velocity.dot(normal);
    if outward > 0.0 {
        state.velocity -= normal * outward;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    const DT: f32 = 1.0 / 60.0;

    fn settle(sim: &mut IrisSimulator, center: Point2, eye: f32, iris: f32) -> Point2 {
        let mut p = center;
        for _ in 0..240 {
            p = sim.step_with_dt(center, eye, iris, DT);
        }
        p
    }

    #[test]
    fn test_first_step_starts_at_rest() {
        let mut sim = IrisSimulator::default();
        let center = Point2::new(100.0, 100.0);
        let p = sim.step(center, 20.0, 10.0);

        let sag = IrisConfig::default().rest_sag * 10.0;
        assert!((p.x - 100.0).abs() < 1e-4);
        assert!((p.y - (100.0 + sag)).abs() < 1e-3);
    }

    #[test]
    fn test_deterministic_initialization() {
        let mut a = IrisSimulator::default();
        let mut b = IrisSimulator::default();
        let center = Point2::new(42.0, 17.0);
        assert_eq!(a.step(center, 9.0, 4.5), b.step(center, 9.0, 4.5));
    }

    #[test]
    fn test_degenerate_socket_collapses_to_center() {
        let mut sim = IrisSimulator::default();
        let center = Point2::new(10.0, 10.0);

        assert_eq!(sim.step(center, 5.0, 5.0), center);
        assert_eq!(sim.step(center, 3.0, 5.0), center);
        assert_eq!(sim.step(center, -1.0, -2.0), center);
        assert_eq!(sim.state().unwrap().velocity, Point2::ZERO);
    }

    #[test]
    fn test_non_finite_input_leaves_state_alone() {
        let mut sim = IrisSimulator::default();
        let center = Point2::new(10.0, 10.0);
        sim.step(center, 10.0, 5.0);
        let before = *sim.state().unwrap();

        let out = sim.step(Point2::new(f32::NAN, 0.0), 10.0, 5.0);
        assert!(out.x.is_nan());
        assert_eq!(*sim.state().unwrap(), before);
    }

    #[test]
    fn test_lags_then_settles_after_jump() {
        let mut sim = IrisSimulator::default();
        settle(&mut sim, Point2::new(0.0, 0.0), 10.0, 5.0);

        let target = Point2::new(50.0, 0.0);
        let first = sim.step_with_dt(target, 10.0, 5.0, DT);
        // Dragged along by the socket wall, trailing on the left
        assert!(first.x < target.x - 4.0);
        assert!(first.distance(target) <= 5.0 + 1e-3);

        let settled = settle(&mut sim, target, 10.0, 5.0);
        let rest = Point2::new(50.0, IrisConfig::default().rest_sag * 5.0);
        assert!(settled.distance(rest) < 0.05);
    }

    #[test]
    fn test_slow_motion_is_continuous() {
        let config = IrisConfig::default();
        let mut sim = IrisSimulator::new(config.clone());
        let (eye, iris) = (12.0, 6.0);
        let free = eye - iris;
        let max_step = config.max_speed * free * DT;

        let mut center = Point2::new(200.0, 200.0);
        let mut prev = sim.step_with_dt(center, eye, iris, DT);
        for i in 0..300 {
            let delta = Point2::new(0.5, if i % 50 < 25 { 0.3 } else { -0.3 });
            center += delta;
            let next = sim.step_with_dt(center, eye, iris, DT);
            assert!(next.distance(prev) <= delta.length() + 2.0 * max_step + 1e-3);
            prev = next;
        }
    }

    #[test]
    fn test_zero_dt_keeps_absolute_position() {
        let mut sim = IrisSimulator::default();
        let p0 = settle(&mut sim, Point2::new(0.0, 0.0), 20.0, 5.0);

        // Small socket move, no time passes: the iris stays put
        let p1 = sim.step_with_dt(Point2::new(1.0, 0.0), 20.0, 5.0, 0.0);
        assert!(p1.distance(p0) < 1e-4);
    }

    #[test]
    fn test_reset() {
        let mut sim = IrisSimulator::default();
        sim.step(Point2::new(1.0, 1.0), 10.0, 2.0);
        assert!(sim.state().is_some());
        sim.reset();
        assert!(sim.state().is_none());
    }

    fn centers() -> impl Strategy<Value = Vec<(f32, f32)>> {
        prop::collection::vec((-2000.0f32..2000.0, -2000.0f32..2000.0), 1..80)
    }

    proptest! {
        #[test]
        fn prop_iris_stays_in_socket(
            path in centers(),
            eye_radius in 0.5f32..200.0,
            iris_ratio in 0.0f32..0.99,
            dt in prop_oneof![Just(DT), 0.0f32..0.5],
        ) {
            let iris_radius = eye_radius * iris_ratio;
            let free = eye_radius - iris_radius;
            let mut sim = IrisSimulator::default();

            for (x, y) in path {
                let center = Point2::new(x, y);
                let p = sim.step_with_dt(center, eye_radius, iris_radius, dt);
                prop_assert!(p.distance(center) <= free + 1e-2);
            }
        }

        #[test]
        fn prop_eyes_are_independent(
            left_path in centers(),
            right_path in centers(),
        ) {
            let mut left = IrisSimulator::default();
            let mut right = IrisSimulator::default();
            let mut solo = IrisSimulator::default();

            let mut right_iter = right_path.into_iter().cycle();
            for (x, y) in left_path {
                let center = Point2::new(x, y);
                let (rx, ry) = right_iter.next().unwrap_or((0.0, 0.0));
                right.step(Point2::new(rx, ry), 10.0, 4.0);
                let a = left.step(center, 10.0, 4.0);
                let b = solo.step(center, 10.0, 4.0);
                prop_assert_eq!(a, b);
            }
        }
    }
}
