//! The per-tick simulation pipeline.
//!
//! Each [`PhysicsStepper::tick`] runs, in this order: the active movement state,
//! jump-edge handling, the `max_speed` clamp, position integration, horizontal
//! resolution and vertical resolution. Reordering any of these changes behaviour.

use glam::Vec2;

use crate::api::CollisionQuery;
use crate::body::{Facing, JumpProgress, KinematicBody, WORLD_UP};
use crate::config::{ControllerConfig, Tunables};
use crate::error::ConfigError;
use crate::ground::GroundDetector;
use crate::input::InputSnapshot;
use crate::state::{StateContext, StateKind, StateMachine};

/// Minimum `dot(wall_normal, up)` for a grounded body to walk onto a surface
/// instead of being stopped by it.
pub const CLIMBABLE_WALL: f32 = 0.7;

/// Extra push-out after bouncing off a dynamic obstacle.
pub const OBSTACLE_CLEARANCE: f32 = 0.1;

/// Snapshot for animation, rendering and audio after a tick.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TickOutput {
    pub grounded: bool,
    /// Velocity in the body frame (ground-relative while grounded).
    pub velocity: Vec2,
    pub world_velocity: Vec2,
    pub facing: Facing,
    pub up: Vec2,
    /// Smoothed orientation in degrees, counter-clockwise from world-up.
    pub display_angle: f32,
    pub speed_for_animation: f32,
    pub run_animation_multiplier: f32,
    /// Normal of the wall touched this tick, zero if none.
    pub wall_normal: Vec2,
    /// Normal of the ceiling touched this tick, zero if none.
    pub ceiling_normal: Vec2,
    pub state: StateKind,
}

/// Owns one body and everything needed to advance it.
#[derive(Debug, Clone)]
pub struct PhysicsStepper {
    config: ControllerConfig,
    detector: GroundDetector,
    machine: StateMachine,
    body: KinematicBody,
    wall_normal: Vec2,
    ceiling_normal: Vec2,
    display_angle: f32,
}

impl PhysicsStepper {
    /// Airborne body at `position` with every movement state available.
    pub fn new(config: ControllerConfig, position: Vec2) -> Result<Self, ConfigError> {
        Self::with_state_machine(config, position, StateMachine::new())
    }

    pub fn with_state_machine(
        config: ControllerConfig,
        position: Vec2,
        machine: StateMachine,
    ) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self {
            detector: GroundDetector::new(config.bounds),
            config,
            machine,
            body: KinematicBody::new(position),
            wall_normal: Vec2::ZERO,
            ceiling_normal: Vec2::ZERO,
            display_angle: 0.0,
        })
    }

    /// Replaces the whole configuration, effective from the next tick.
    /// An invalid config is rejected and the current one kept.
    pub fn set_config(&mut self, config: ControllerConfig) -> Result<(), ConfigError> {
        config.validate()?;
        self.detector = GroundDetector::new(config.bounds);
        self.config = config;
        Ok(())
    }

    pub fn config(&self) -> &ControllerConfig {
        &self.config
    }

    pub fn body(&self) -> &KinematicBody {
        &self.body
    }

    pub fn body_mut(&mut self) -> &mut KinematicBody {
        &mut self.body
    }

    pub fn state(&self) -> StateKind {
        self.machine.kind()
    }

    pub fn machine(&self) -> &StateMachine {
        &self.machine
    }

    /// Places the body at `position` and settles it on the ground below, if any lies
    /// within half the collider height plus the snap distance. Returns whether it landed.
    pub fn spawn_at<Q: CollisionQuery + ?Sized>(&mut self, query: &Q, position: Vec2) -> bool {
        self.body = KinematicBody::new(position);
        self.wall_normal = Vec2::ZERO;
        self.ceiling_normal = Vec2::ZERO;

        let bounds = self.config.bounds;
        let reach = bounds.half_extents.y + bounds.snap_distance;
        let ground = self.config.layers.ground;
        match self.detector.probe_within(query, &self.body, -WORLD_UP, ground, reach) {
            Some(contact) if contact.normal.y > 0.0 => {
                let body = &mut self.body;
                body.enter_ground(contact.normal, self.config.tunables.rotate_to_ground);
                body.position = contact.point - body.up * bounds.height + body.up * bounds.half_extents.y;
                body.previous_position = body.position;
                log::debug!("spawned on ground at {:?}", body.position);
            }
            _ => log::debug!("spawned airborne at {:?}", position),
        }
        self.display_angle = signed_angle(self.body.up);
        self.body.grounded
    }

    /// Advances the body by `dt` seconds.
    ///
    /// A non-finite or non-positive `dt` skips the tick. An inactive controller only
    /// reports its current state.
    pub fn tick<Q: CollisionQuery + ?Sized>(&mut self, query: &Q, input: &InputSnapshot, dt: f32) -> TickOutput {
        if !dt.is_finite() || dt <= 0.0 {
            log::warn!("skipping tick with invalid dt {dt}");
            return self.output();
        }
        if !self.config.tunables.active {
            return self.output();
        }

        self.machine.update(&mut StateContext {
            body: &mut self.body,
            tunables: &self.config.tunables,
            input,
            dt,
        });
        handle_jump(&mut self.body, &self.config.tunables, input, dt);
        self.body.velocity = self.body.velocity.clamp_length_max(self.config.tunables.max_speed);
        self.integrate(dt);

        if !self.config.tunables.disable_collision {
            self.wall_normal = Vec2::ZERO;
            self.ceiling_normal = Vec2::ZERO;
            self.resolve_horizontal(query);
            self.resolve_vertical(query);
        }

        self.rotate_display(dt);
        self.output()
    }

    pub fn output(&self) -> TickOutput {
        let t = &self.config.tunables;
        let speed = self.body.velocity.x.abs();
        TickOutput {
            grounded: self.body.grounded,
            velocity: self.body.velocity,
            world_velocity: self.body.world_velocity(),
            facing: self.body.facing,
            up: self.body.up,
            display_angle: self.display_angle,
            speed_for_animation: speed,
            run_animation_multiplier: remap(
                speed,
                t.top_speed,
                t.min_run_animation_multiplier,
                t.max_run_animation_multiplier,
            ),
            wall_normal: self.wall_normal,
            ceiling_normal: self.ceiling_normal,
            state: self.machine.kind(),
        }
    }

    fn integrate(&mut self, dt: f32) {
        let body = &mut self.body;
        body.previous_velocity = body.velocity;
        body.previous_position = body.position;
        body.position += body.world_velocity() * dt;
    }

    fn resolve_horizontal<Q: CollisionQuery + ?Sized>(&mut self, query: &Q) {
        let bounds = &self.config.bounds;
        let layers = &self.config.layers;
        let body = &mut self.body;
        if body.velocity.x == 0.0 {
            return;
        }

        let right = body.right();
        let origin = body.position + body.up * bounds.height;
        let reach = bounds.half_extents.x + bounds.wall_margin();
        let delta = (body.position - body.previous_position).dot(right).abs();
        let Some(hit) = query.cast(
            origin,
            right * body.velocity.x.signum(),
            reach + delta,
            layers.wall | layers.obstacle,
        ) else {
            return;
        };
        // Moving away from the surface
        if hit.normal.dot(body.world_velocity()) > 0.0 {
            return;
        }

        if hit.surface.layer.intersects(layers.obstacle) {
            body.velocity.x = -body.velocity.x * 0.5;
            body.position = hit.point - body.up * bounds.height + hit.normal * (reach + OBSTACLE_CLEARANCE);
            log::trace!("bounced off obstacle {:?}, vx={}", hit.surface.id, body.velocity.x);
            return;
        }

        if !body.grounded || hit.normal.dot(body.up) < CLIMBABLE_WALL {
            body.velocity.x = 0.0;
            body.position = hit.point - body.up * bounds.height + hit.normal * reach;
            log::trace!("clamped against wall {:?} at {:?}", hit.surface.id, body.position);
        }
        self.wall_normal = hit.normal;
    }

    fn resolve_vertical<Q: CollisionQuery + ?Sized>(&mut self, query: &Q) {
        let t = &self.config.tunables;
        let bounds = &self.config.bounds;
        let layers = &self.config.layers;
        let body = &mut self.body;

        if body.grounded {
            match self.detector.probe(query, body, -body.up, layers.ground) {
                Some(contact) if body.velocity.y <= 0.0 => {
                    body.velocity.y = 0.0;
                    if contact.snap {
                        body.set_up(if t.rotate_to_ground { contact.normal } else { WORLD_UP });
                        body.position =
                            contact.point - body.up * bounds.height + body.up * bounds.half_extents.y;
                    }
                }
                _ => body.exit_ground(),
            }
            return;
        }

        let vy = body.velocity.y;
        let direction = body.up * vy.signum();
        if vy > 0.0 {
            if let Some(contact) = self.detector.probe(query, body, direction, layers.ceiling) {
                if t.allow_ceiling_reacquisition && angle_from_up(contact.normal) < t.min_ceiling_angle {
                    body.enter_ground(contact.normal, t.rotate_to_ground);
                } else {
                    body.velocity.y = 0.0;
                    body.position.y = contact.point.y - bounds.half_extents.y - bounds.height;
                }
                self.ceiling_normal = contact.normal;
            }
        } else if vy < 0.0 {
            if let Some(contact) = self.detector.probe(query, body, direction, layers.ground) {
                if contact.normal.y > 0.0 {
                    body.enter_ground(contact.normal, t.rotate_to_ground);
                    body.position.y = contact.point.y + bounds.half_extents.y - bounds.height;
                }
            }
        }
    }

    fn rotate_display(&mut self, dt: f32) {
        let target = signed_angle(self.body.up);
        let delta = wrap_degrees(target - self.display_angle);
        let step = self.config.tunables.rotation_speed * dt;
        self.display_angle = if delta.abs() <= step {
            target
        } else {
            wrap_degrees(self.display_angle + step * delta.signum())
        };
    }
}

/// Starts, sustains and cuts the held jump.
fn handle_jump(body: &mut KinematicBody, t: &Tunables, input: &InputSnapshot, dt: f32) {
    body.tick_jump_lock(dt);

    if input.jump_down && body.can_jump() {
        body.velocity.y = t.jump_impulse;
        body.jump = JumpProgress {
            active: true,
            remaining: t.jump_time,
        };
        body.exit_ground();
    }

    if input.jump_held && body.jump.active {
        if body.jump.remaining > 0.0 {
            body.velocity.y = t.jump_impulse;
            body.jump.remaining -= dt;
        } else {
            body.jump.active = false;
        }
    }

    if input.jump_up && body.jump.active {
        body.jump = JumpProgress::default();
        if body.velocity.y > 0.0 {
            body.velocity.y *= 0.5;
        }
    }
}

/// Maps `0..=from_max` onto `to_min..=to_max`, extrapolating outside.
fn remap(value: f32, from_max: f32, to_min: f32, to_max: f32) -> f32 {
    to_min + value * (to_max - to_min) / from_max
}

/// Counter-clockwise angle of `up` from world-up, in degrees.
fn signed_angle(up: Vec2) -> f32 {
    (-up.x).atan2(up.y).to_degrees()
}

fn angle_from_up(normal: Vec2) -> f32 {
    normal.normalize_or_zero().dot(WORLD_UP).clamp(-1.0, 1.0).acos().to_degrees()
}

fn wrap_degrees(a: f32) -> f32 {
    (a + 180.0).rem_euclid(360.0) - 180.0
}
