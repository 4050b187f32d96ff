//! Procedural track generator.
//!
//! Curvature comes in runs: a curve (left or right, constant magnitude) or a
//! straight, each lasting a random number of segments. A new run is drawn
//! only when the previous one is used up, which happens at recycle time.
//!
//! Elevation is an independent, rarer process. A fresh value is sampled now
//! and then; otherwise the current value decays geometrically and snaps to
//! exactly zero below an epsilon, so every hill eventually flattens out.

use crate::config::GeneratorSettings;
use crate::data::Segment;
use rand::Rng;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CurveDirection {
    Left,
    Straight,
    Right,
}

#[derive(Debug, Clone)]
pub struct TrackGenerator {
    settings: GeneratorSettings,
    active_curve: f32,
    direction: CurveDirection,
    remaining_run: u32,
    elevation: f32,
}

impl TrackGenerator {
    pub fn new(settings: GeneratorSettings) -> Self {
        Self {
            settings,
            active_curve: 0.0,
            direction: CurveDirection::Straight,
            remaining_run: 0,
            elevation: 0.0,
        }
    }

    pub fn reset(&mut self) {
        self.active_curve = 0.0;
        self.direction = CurveDirection::Straight;
        self.remaining_run = 0;
        self.elevation = 0.0;
    }

    pub fn direction(&self) -> CurveDirection {
        self.direction
    }

    pub fn active_curve(&self) -> f32 {
        self.active_curve
    }

    pub fn remaining_run(&self) -> u32 {
        self.remaining_run
    }

    pub fn elevation(&self) -> f32 {
        self.elevation
    }

    /// Overwrite both deltas of a recycled segment.
    pub fn stamp<R: Rng + ?Sized>(&mut self, segment: &mut Segment, rng: &mut R) {
        segment.curve_delta = self.next_curve(rng);
        segment.elevation_delta = self.next_elevation(rng);
    }

    /// Curvature for the next segment, drawing a new run when needed
    pub fn next_curve<R: Rng + ?Sized>(&mut self, rng: &mut R) -> f32 {
        if self.remaining_run == 0 {
            self.begin_run(rng);
        }
        self.remaining_run -= 1;
        self.active_curve
    }

    fn begin_run<R: Rng + ?Sized>(&mut self, rng: &mut R) {
        let s = &self.settings;
        if rng.random_bool(s.curve_probability) {
            let (direction, sign) = if rng.random_bool(0.5) {
                (CurveDirection::Right, 1.0)
            } else {
                (CurveDirection::Left, -1.0)
            };
            let magnitude = s.max_curve_strength * rng.random_range(0.3..=1.0f32);
            self.direction = direction;
            self.active_curve = sign * magnitude;
            self.remaining_run = rng.random_range(s.min_curve_run..=s.max_curve_run);
        } else {
            self.direction = CurveDirection::Straight;
            self.active_curve = 0.0;
            self.remaining_run = rng.random_range(s.min_straight_run..=s.max_straight_run);
        }
        tracing::trace!(
            direction = ?self.direction,
            curve = self.active_curve,
            run = self.remaining_run,
            "New track run"
        );
    }

    /// Elevation for the next segment
    pub fn next_elevation<R: Rng + ?Sized>(&mut self, rng: &mut R) -> f32 {
        let s = &self.settings;
        if s.elevation_probability > 0.0 && rng.random_bool(s.elevation_probability) {
            self.elevation = rng.random_range(-s.max_elevation..=s.max_elevation);
        } else {
            self.elevation =
                decay_elevation(self.elevation, s.elevation_damping, s.elevation_epsilon);
        }
        self.elevation
    }
}

/// One damping step toward flat ground, snapping to exactly zero
pub fn decay_elevation(elevation: f32, damping: f32, epsilon: f32) -> f32 {
    let next = elevation * damping;
    if next.abs() < epsilon {
        0.0
    } else {
        next
    }
}
