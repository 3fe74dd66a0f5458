//! Kinematic body state and ground-frame transitions.
//!
//! While grounded, `velocity` is expressed in the ground frame (`x` along [`KinematicBody::right`],
//! `y` along `up`). While airborne `up` is world-up, so both frames coincide.

use glam::Vec2;

/// World-up, the orientation of every airborne body.
pub const WORLD_UP: Vec2 = Vec2::Y;

/// Horizontal facing, updated from input or from velocity on landing.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Facing {
    Left,
    #[default]
    Right,
}

impl Facing {
    pub fn sign(self) -> f32 {
        match self {
            Facing::Left => -1.0,
            Facing::Right => 1.0,
        }
    }
}

/// Sustained jump started by the jump-edge step.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct JumpProgress {
    pub active: bool,
    /// Seconds the jump impulse may still be held.
    pub remaining: f32,
}

#[derive(Debug, Clone, PartialEq)]
pub struct KinematicBody {
    pub position: Vec2,
    pub velocity: Vec2,
    pub previous_position: Vec2,
    pub previous_velocity: Vec2,
    /// Unit orientation vector.
    pub up: Vec2,
    pub grounded: bool,
    pub facing: Facing,
    /// Jump cooldown in seconds, never negative.
    pub jump_lock_timer: f32,
    pub jump: JumpProgress,
}

impl KinematicBody {
    /// Airborne body at rest.
    pub fn new(position: Vec2) -> Self {
        Self {
            position,
            velocity: Vec2::ZERO,
            previous_position: position,
            previous_velocity: Vec2::ZERO,
            up: WORLD_UP,
            grounded: false,
            facing: Facing::Right,
            jump_lock_timer: 0.0,
            jump: JumpProgress::default(),
        }
    }

    /// Right-hand tangent of `up`.
    #[inline]
    pub fn right(&self) -> Vec2 {
        Vec2::new(self.up.y, -self.up.x)
    }

    /// Body-frame vector to world space.
    #[inline]
    pub fn to_world(&self, local: Vec2) -> Vec2 {
        self.right() * local.x + self.up * local.y
    }

    /// World-space vector to the body frame.
    #[inline]
    pub fn to_local(&self, world: Vec2) -> Vec2 {
        Vec2::new(world.dot(self.right()), world.dot(self.up))
    }

    pub fn world_velocity(&self) -> Vec2 {
        self.to_world(self.velocity)
    }

    /// Angle between `up` and world-up, in degrees.
    pub fn ground_angle(&self) -> f32 {
        self.up.y.clamp(-1.0, 1.0).acos().to_degrees()
    }

    /// Sets `up` to the normalized `up`; zero vectors are ignored.
    pub fn set_up(&mut self, up: Vec2) {
        let n = up.normalize_or_zero();
        if n != Vec2::ZERO {
            self.up = n;
        }
    }

    /// Faces the sign of `dir`; zero keeps the current facing.
    pub fn face(&mut self, dir: f32) {
        if dir == 0.0 || dir.is_nan() {
            return;
        }
        self.facing = if dir < 0.0 { Facing::Left } else { Facing::Right };
    }

    pub fn jump_unlocked(&self) -> bool {
        self.jump_lock_timer == 0.0
    }

    pub fn can_jump(&self) -> bool {
        self.jump_unlocked() && self.grounded
    }

    pub fn lock_jump(&mut self, duration: f32) {
        self.jump_lock_timer = duration.max(0.0);
    }

    /// Counts the jump lock down toward zero.
    pub fn tick_jump_lock(&mut self, dt: f32) {
        self.jump_lock_timer = (self.jump_lock_timer - dt).max(0.0);
    }

    /// Lands on a surface with the given normal.
    ///
    /// World velocity is projected onto the new ground frame and its normal part dropped,
    /// so the speed along the surface is kept.
    pub fn enter_ground(&mut self, normal: Vec2, rotate_to_ground: bool) {
        if self.grounded {
            return;
        }
        let world = self.world_velocity();
        let n = normal.normalize_or_zero();
        self.up = if rotate_to_ground && n != Vec2::ZERO { n } else { WORLD_UP };
        self.velocity = Vec2::new(world.dot(self.right()), 0.0);
        self.face(self.velocity.x);
        self.grounded = true;
        self.jump = JumpProgress::default();
        log::debug!("enter ground: up={:?} velocity={:?}", self.up, self.velocity);
    }

    /// Leaves the ground, rotating velocity back into the world frame.
    pub fn exit_ground(&mut self) {
        if !self.grounded {
            return;
        }
        self.velocity = self.world_velocity();
        self.up = WORLD_UP;
        self.grounded = false;
        log::debug!("exit ground: velocity={:?}", self.velocity);
    }
}
