//! Spring interpolation of the card offset toward a decided target.
//!
//! The release decision fixes where the card ends up; this module only moves
//! the visible offset there.  Animations are driven by explicit `tick` calls
//! so they can be cancelled or replaced at any frame.
use std::f64::consts::PI;
use std::time::Duration;

/// Integration step used to keep the spring stable at low frame rates.
const MAX_STEP: f64 = 0.016;
const VELOCITY_THRESHOLD: f64 = 0.5;
const POSITION_THRESHOLD: f64 = 0.05;

/// Spring described by response time and damping fraction.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SpringSpec {
    /// Approximate period of the undamped oscillation, in seconds.
    pub response: f64,
    /// 1.0 = critically damped, below 1.0 overshoots.
    pub damping_fraction: f64,
}

impl SpringSpec {
    /// Snap after a drag release.
    pub const SETTLE: SpringSpec = SpringSpec {
        response: 0.3,
        damping_fraction: 0.75,
    };

    /// Dismissal and post-action collapse.
    pub const DISMISS: SpringSpec = SpringSpec {
        response: 0.25,
        damping_fraction: 0.8,
    };

    pub fn stiffness(&self) -> f64 {
        let omega = 2.0 * PI / self.response.max(f64::EPSILON);
        omega * omega
    }

    pub fn damping(&self) -> f64 {
        4.0 * PI * self.damping_fraction / self.response.max(f64::EPSILON)
    }
}

impl Default for SpringSpec {
    fn default() -> Self {
        Self::SETTLE
    }
}

/// An in-flight spring from the current visual offset to a target.
#[derive(Debug, Clone)]
pub struct OffsetAnimation {
    spec: SpringSpec,
    target: f64,
    value: f64,
    velocity: f64,
    finished: bool,
}

impl OffsetAnimation {
    pub fn new(from: f64, target: f64, spec: SpringSpec) -> Self {
        let finished = (from - target).abs() < POSITION_THRESHOLD;
        Self {
            spec,
            target,
            value: if finished { target } else { from },
            velocity: 0.0,
            finished,
        }
    }

    pub fn value(&self) -> f64 {
        self.value
    }

    pub fn target(&self) -> f64 {
        self.target
    }

    pub fn is_finished(&self) -> bool {
        self.finished
    }

    /// Advance by `dt`; returns `true` once the spring has settled.
    pub fn tick(&mut self, dt: Duration) -> bool {
        if self.finished {
            return true;
        }

        let stiffness = self.spec.stiffness();
        let damping = self.spec.damping();
        let mut remaining = dt.as_secs_f64();

        // Semi-implicit Euler.
        while remaining > 0.0 {
            let step = remaining.min(MAX_STEP);
            let displacement = self.value - self.target;
            let force = -stiffness * displacement - damping * self.velocity;
            self.velocity += force * step;
            self.value += self.velocity * step;
            remaining -= step;
        }

        if self.velocity.abs() < VELOCITY_THRESHOLD
            && (self.value - self.target).abs() < POSITION_THRESHOLD
        {
            self.value = self.target;
            self.velocity = 0.0;
            self.finished = true;
        }
        self.finished
    }
}
