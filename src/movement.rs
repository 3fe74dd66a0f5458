//! Velocity modifiers the movement states run every tick.

use crate::body::KinematicBody;
use crate::config::Tunables;
use crate::input::InputSnapshot;

/// Velocity given in the opposite direction when a turn-around stops the body.
pub const BRAKE_KICK: f32 = 0.1;

fn opposes(velocity_x: f32, horizontal: f32) -> bool {
    (velocity_x.signum() - horizontal.signum()).abs() > 0.01
}

impl KinematicBody {
    /// Accelerates toward `top_speed` in the direction of the input.
    pub fn apply_acceleration(&mut self, t: &Tunables, input: &InputSnapshot, dt: f32) {
        let rate = if self.grounded { t.acceleration } else { t.air_acceleration };
        let v = &mut self.velocity.x;
        if input.horizontal > 0.0 && *v <= t.top_speed {
            *v = (*v + rate * dt).min(t.top_speed);
        } else if input.horizontal < 0.0 && *v >= -t.top_speed {
            *v = (*v - rate * dt).max(-t.top_speed);
        }
    }

    /// Slows the body down while input points against its motion.
    /// Crossing zero leaves a small velocity in the input direction.
    pub fn apply_deceleration(&mut self, t: &Tunables, input: &InputSnapshot, dt: f32) {
        if !self.grounded || input.horizontal == 0.0 || !opposes(self.velocity.x, input.horizontal) {
            return;
        }
        let v = &mut self.velocity.x;
        if *v > 0.0 {
            *v -= t.deceleration * dt;
            if *v <= 0.0 {
                *v = -BRAKE_KICK;
            }
        } else if *v < 0.0 {
            *v += t.deceleration * dt;
            if *v >= 0.0 {
                *v = BRAKE_KICK;
            }
        }
    }

    pub fn apply_friction(&mut self, t: &Tunables, input: &InputSnapshot, dt: f32) {
        if !self.grounded || input.horizontal != 0.0 {
            return;
        }
        let step = t.friction * dt;
        let len = self.velocity.length();
        self.velocity = if len <= step {
            glam::Vec2::ZERO
        } else {
            self.velocity * ((len - step) / len)
        };
    }

    pub fn apply_gravity(&mut self, t: &Tunables, dt: f32) {
        if self.grounded || t.ignore_gravity {
            return;
        }
        self.velocity.y -= t.gravity * dt;
    }

    /// Downhill pull along the ground, zero on flat ground.
    /// Tangent only: a pull into the surface would sink a body whose contact does not snap.
    pub fn apply_slope_factor(&mut self, t: &Tunables, dt: f32) {
        if !self.grounded {
            return;
        }
        self.velocity.x += t.slope_factor * self.up.x * dt;
    }

    /// Drops slow bodies off slopes too steep to stand on.
    pub fn apply_fall(&mut self, t: &Tunables) {
        if !self.grounded || self.velocity.x.abs() > t.min_speed_to_slide {
            return;
        }
        let angle = self.ground_angle();
        if angle < t.min_angle_to_slide {
            return;
        }
        if angle >= t.min_angle_to_fall {
            self.exit_ground();
        }
    }

    /// True when grounded input points against the current horizontal motion.
    pub fn turning_around(&self, input: &InputSnapshot) -> bool {
        self.grounded && input.horizontal != 0.0 && opposes(self.velocity.x, input.horizontal)
    }
}
