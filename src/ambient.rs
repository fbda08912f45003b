//! Decorative background: orbs drifting in a box and bouncing off its edges.
//!
//! Nothing here touches the data pipeline. The model only advances positions;
//! drawing is left to whatever front end consumes the frames.

use serde::Serialize;

pub const ORB_COUNT: usize = 70;
pub const ORB_MIN_RADIUS: f64 = 3.0;
pub const ORB_MAX_RADIUS: f64 = 9.0;
pub const ORB_MIN_SPEED: f64 = 0.2;
pub const ORB_MAX_SPEED: f64 = 0.7;
pub const ORB_COLOR: &str = "#c61f3f";

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Orb {
    pub x: f64,
    pub y: f64,
    pub radius: f64,
    pub dx: f64,
    pub dy: f64,
    pub alpha: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct OrbField {
    pub width: f64,
    pub height: f64,
    pub orbs: Vec<Orb>,
}

fn between(unit: f64, a: f64, b: f64) -> f64 {
    a + unit * (b - a)
}

impl OrbField {
    /// Scatter `count` orbs using `unit`, a source of values in `[0, 1)`.
    pub fn with_source(
        width: f64,
        height: f64,
        count: usize,
        mut unit: impl FnMut() -> f64,
    ) -> Self {
        let orbs = (0..count)
            .map(|_| {
                let radius = between(unit(), ORB_MIN_RADIUS, ORB_MAX_RADIUS);
                let x = between(unit(), radius, (width - radius).max(radius));
                let y = between(unit(), radius, (height - radius).max(radius));
                let angle = unit() * std::f64::consts::TAU;
                let speed = between(unit(), ORB_MIN_SPEED, ORB_MAX_SPEED);
                Orb {
                    x,
                    y,
                    radius,
                    dx: angle.cos() * speed,
                    dy: angle.sin() * speed,
                    alpha: between(unit(), 0.3, 0.7),
                }
            })
            .collect();
        Self {
            width,
            height,
            orbs,
        }
    }

    pub fn new(width: f64, height: f64) -> Self {
        Self::with_source(width, height, ORB_COUNT, rand::random::<f64>)
    }

    /// Advance one frame.
    pub fn step(&mut self) {
        for orb in &mut self.orbs {
            orb.x += orb.dx;
            orb.y += orb.dy;
            if orb.x - orb.radius < 0.0 || orb.x + orb.radius > self.width {
                orb.dx = -orb.dx;
            }
            if orb.y - orb.radius < 0.0 || orb.y + orb.radius > self.height {
                orb.dy = -orb.dy;
            }
        }
    }

    /// Rescatter after the viewport changes size.
    pub fn resize(&mut self, width: f64, height: f64) {
        *self = Self::new(width, height);
    }
}
