//! Controller configuration.
//!
//! All values use world units per second (or per second squared) and degrees.
//! Every struct is serde-friendly so hosts can load it from their own asset format.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::types::LayerMask;

/// Movement tunables, read by every state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Tunables {
    // ========================================================================
    // Ground movement
    // ========================================================================
    /// Ground acceleration toward `top_speed` while input is held.
    pub acceleration: f32,
    /// Braking rate when input opposes the current direction.
    pub deceleration: f32,
    /// Slow-down rate while grounded with no input.
    pub friction: f32,
    /// Downhill pull while grounded, scaled by the ground's tilt.
    pub slope_factor: f32,
    /// Speed reachable by input alone.
    pub top_speed: f32,
    /// Hard cap on the velocity magnitude, applied every tick.
    pub max_speed: f32,
    pub min_speed_to_brake: f32,
    pub min_speed_to_slide: f32,
    /// Ground angle (degrees from world-up) from which slow bodies start sliding.
    pub min_angle_to_slide: f32,
    /// Ground angle from which slow bodies fall off the surface.
    pub min_angle_to_fall: f32,

    // ========================================================================
    // Air movement
    // ========================================================================
    pub air_acceleration: f32,
    pub gravity: f32,
    pub jump_impulse: f32,
    /// Jump lock duration and sustained-jump window (seconds).
    pub jump_time: f32,
    /// Upward speed a jump is cut down to when the button is released early.
    pub min_jump_height: f32,

    // ========================================================================
    // Orientation
    // ========================================================================
    /// Display rotation speed toward the physics `up` (degrees/second).
    pub rotation_speed: f32,
    /// Align `up` with the ground normal. When false `up` stays world-up.
    pub rotate_to_ground: bool,
    /// Treat shallow ceilings as new ground planes.
    pub allow_ceiling_reacquisition: bool,
    /// Maximum angle from world-up for a ceiling to be reacquired as ground.
    pub min_ceiling_angle: f32,

    // ========================================================================
    // Switches
    // ========================================================================
    pub active: bool,
    pub ignore_gravity: bool,
    pub disable_collision: bool,

    // ========================================================================
    // Animation
    // ========================================================================
    pub min_run_animation_multiplier: f32,
    pub max_run_animation_multiplier: f32,
}

impl Default for Tunables {
    fn default() -> Self {
        Self {
            acceleration: 20.0,
            deceleration: 30.0,
            friction: 10.0,
            slope_factor: 5.0,
            top_speed: 10.0,
            max_speed: 15.0,
            min_speed_to_brake: 2.0,
            min_speed_to_slide: 2.0,
            min_angle_to_slide: 30.0,
            min_angle_to_fall: 60.0,

            air_acceleration: 10.0,
            gravity: 25.0,
            jump_impulse: 12.0,
            jump_time: 0.2,
            min_jump_height: 1.0,

            rotation_speed: 360.0,
            rotate_to_ground: true,
            allow_ceiling_reacquisition: false,
            min_ceiling_angle: 45.0,

            active: true,
            ignore_gravity: false,
            disable_collision: false,

            min_run_animation_multiplier: 1.0,
            max_run_animation_multiplier: 2.0,
        }
    }
}

/// Body collider geometry.
///
/// `position` is the body origin; the collider centre sits at `position + up * height`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Bounds {
    pub half_extents: Vec2,
    pub height: f32,
    /// Extra ground probe reach while grounded, to stick to descending slopes.
    pub snap_distance: f32,
    /// Gap kept between the collider and walls.
    pub safe_margin: f32,
}

impl Default for Bounds {
    fn default() -> Self {
        Self {
            half_extents: Vec2::new(0.25, 0.5),
            height: 0.5,
            snap_distance: 0.1,
            safe_margin: 0.01,
        }
    }
}

impl Bounds {
    /// Smallest wall clearance regardless of `safe_margin`.
    pub const MIN_MARGIN: f32 = 0.01;

    /// Wall clearance actually used by horizontal resolution.
    pub fn wall_margin(&self) -> f32 {
        self.safe_margin.max(Self::MIN_MARGIN)
    }
}

/// Layer masks queried by each kind of probe.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CollisionLayers {
    pub ground: LayerMask,
    pub ceiling: LayerMask,
    pub wall: LayerMask,
    /// Dynamic obstacles (enemies) the body bounces off. May be empty.
    pub obstacle: LayerMask,
}

impl Default for CollisionLayers {
    fn default() -> Self {
        Self {
            ground: LayerMask::bit(0),
            ceiling: LayerMask::bit(0),
            wall: LayerMask::bit(1),
            obstacle: LayerMask::bit(3),
        }
    }
}

/// Everything a controller needs besides its collision query.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ControllerConfig {
    pub tunables: Tunables,
    pub bounds: Bounds,
    pub layers: CollisionLayers,
}

fn finite(field: &'static str, value: f32) -> Result<f32, ConfigError> {
    if value.is_finite() {
        Ok(value)
    } else {
        Err(ConfigError::NonFinite { field, value })
    }
}

fn positive(field: &'static str, value: f32) -> Result<(), ConfigError> {
    if finite(field, value)? > 0.0 {
        Ok(())
    } else {
        Err(ConfigError::NonPositive { field, value })
    }
}

fn non_negative(field: &'static str, value: f32) -> Result<(), ConfigError> {
    if finite(field, value)? >= 0.0 {
        Ok(())
    } else {
        Err(ConfigError::Negative { field, value })
    }
}

fn angle(field: &'static str, value: f32) -> Result<(), ConfigError> {
    if (0.0..=180.0).contains(&finite(field, value)?) {
        Ok(())
    } else {
        Err(ConfigError::OutOfRange {
            field,
            value,
            min: 0.0,
            max: 180.0,
        })
    }
}

impl Tunables {
    pub fn validate(&self) -> Result<(), ConfigError> {
        positive("top_speed", self.top_speed)?;
        positive("max_speed", self.max_speed)?;
        positive("jump_time", self.jump_time)?;
        for (field, value) in [
            ("acceleration", self.acceleration),
            ("deceleration", self.deceleration),
            ("friction", self.friction),
            ("slope_factor", self.slope_factor),
            ("min_speed_to_brake", self.min_speed_to_brake),
            ("min_speed_to_slide", self.min_speed_to_slide),
            ("air_acceleration", self.air_acceleration),
            ("gravity", self.gravity),
            ("jump_impulse", self.jump_impulse),
            ("min_jump_height", self.min_jump_height),
            ("rotation_speed", self.rotation_speed),
        ] {
            non_negative(field, value)?;
        }
        angle("min_angle_to_slide", self.min_angle_to_slide)?;
        angle("min_angle_to_fall", self.min_angle_to_fall)?;
        angle("min_ceiling_angle", self.min_ceiling_angle)?;
        finite("min_run_animation_multiplier", self.min_run_animation_multiplier)?;
        finite("max_run_animation_multiplier", self.max_run_animation_multiplier)?;
        if self.top_speed > self.max_speed {
            return Err(ConfigError::TopSpeedExceedsMax {
                top: self.top_speed,
                max: self.max_speed,
            });
        }
        Ok(())
    }
}

impl Bounds {
    pub fn validate(&self) -> Result<(), ConfigError> {
        positive("bounds.half_extents.x", self.half_extents.x)?;
        positive("bounds.half_extents.y", self.half_extents.y)?;
        finite("bounds.height", self.height)?;
        non_negative("bounds.snap_distance", self.snap_distance)?;
        non_negative("bounds.safe_margin", self.safe_margin)?;
        Ok(())
    }
}

impl CollisionLayers {
    pub fn validate(&self) -> Result<(), ConfigError> {
        for (layer, mask) in [
            ("ground", self.ground),
            ("ceiling", self.ceiling),
            ("wall", self.wall),
        ] {
            if mask.is_empty() {
                return Err(ConfigError::EmptyLayerMask { layer });
            }
        }
        Ok(())
    }
}

impl ControllerConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.tunables.validate()?;
        self.bounds.validate()?;
        self.layers.validate()
    }
}
