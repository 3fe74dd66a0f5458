//! Movement state machine.
//!
//! Four mutually exclusive states, each a variant of [`MovementState`] with its
//! substate inline. Every tick the active state's handler runs its modifiers and
//! may request one transition; requests for unregistered states are dropped.

use crate::body::KinematicBody;
use crate::config::Tunables;
use crate::error::ConfigError;
use crate::input::InputSnapshot;
use crate::movement::BRAKE_KICK;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StateKind {
    Normal,
    Jump,
    Fall,
    Brake,
}

impl StateKind {
    pub const ALL: [StateKind; 4] = [StateKind::Normal, StateKind::Jump, StateKind::Fall, StateKind::Brake];

    fn index(self) -> usize {
        match self {
            StateKind::Normal => 0,
            StateKind::Jump => 1,
            StateKind::Fall => 2,
            StateKind::Brake => 3,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum MovementState {
    Normal,
    Jump { release_handled: bool },
    Fall,
    Brake,
}

impl MovementState {
    pub fn kind(&self) -> StateKind {
        match self {
            MovementState::Normal => StateKind::Normal,
            MovementState::Jump { .. } => StateKind::Jump,
            MovementState::Fall => StateKind::Fall,
            MovementState::Brake => StateKind::Brake,
        }
    }

    fn fresh(kind: StateKind) -> Self {
        match kind {
            StateKind::Normal => MovementState::Normal,
            StateKind::Jump => MovementState::Jump { release_handled: false },
            StateKind::Fall => MovementState::Fall,
            StateKind::Brake => MovementState::Brake,
        }
    }
}

/// What a state handler gets to work with for one tick.
pub struct StateContext<'a> {
    pub body: &'a mut KinematicBody,
    pub tunables: &'a Tunables,
    pub input: &'a InputSnapshot,
    pub dt: f32,
}

#[derive(Debug, Clone)]
pub struct StateMachine {
    registered: [bool; 4],
    current: MovementState,
}

impl Default for StateMachine {
    fn default() -> Self {
        Self::new()
    }
}

impl StateMachine {
    /// Machine with all four states registered, starting in Normal.
    pub fn new() -> Self {
        Self {
            registered: [true; 4],
            current: MovementState::Normal,
        }
    }

    /// Machine with only `states` registered. `initial` must be one of them.
    pub fn with_states(states: &[StateKind], initial: StateKind) -> Result<Self, ConfigError> {
        let mut registered = [false; 4];
        for s in states {
            registered[s.index()] = true;
        }
        if !registered[initial.index()] {
            return Err(ConfigError::UnregisteredInitialState { state: initial });
        }
        Ok(Self {
            registered,
            current: MovementState::fresh(initial),
        })
    }

    pub fn is_registered(&self, kind: StateKind) -> bool {
        self.registered[kind.index()]
    }

    pub fn current(&self) -> &MovementState {
        &self.current
    }

    pub fn kind(&self) -> StateKind {
        self.current.kind()
    }

    /// Switches to `kind`, running its entry effects. Returns false (and keeps the
    /// current state) if `kind` is not registered.
    pub fn change(&mut self, kind: StateKind, ctx: &mut StateContext<'_>) -> bool {
        if !self.is_registered(kind) {
            log::debug!("dropping transition to unregistered state {:?}", kind);
            return false;
        }
        log::debug!("state {:?} -> {:?}", self.current.kind(), kind);
        self.current = MovementState::fresh(kind);
        enter(&mut self.current, ctx);
        true
    }

    /// Runs the active state for one tick and applies the transition it asks for.
    pub fn update(&mut self, ctx: &mut StateContext<'_>) {
        let next = match &mut self.current {
            MovementState::Normal => update_normal(ctx),
            MovementState::Jump { release_handled } => update_jump(release_handled, ctx),
            MovementState::Fall => update_fall(ctx),
            MovementState::Brake => update_brake(ctx),
        };
        if let Some(kind) = next {
            self.change(kind, ctx);
        }
    }
}

fn enter(state: &mut MovementState, ctx: &mut StateContext<'_>) {
    match state {
        MovementState::Jump { release_handled } => {
            *release_handled = false;
            ctx.body.velocity.y = ctx.tunables.jump_impulse;
            ctx.body.lock_jump(ctx.tunables.jump_time);
        }
        MovementState::Brake => ctx.body.face(ctx.input.horizontal),
        MovementState::Normal | MovementState::Fall => {}
    }
}

fn update_normal(ctx: &mut StateContext<'_>) -> Option<StateKind> {
    let (t, input, dt) = (ctx.tunables, ctx.input, ctx.dt);
    let body = &mut *ctx.body;
    body.face(input.horizontal);
    body.apply_slope_factor(t, dt);
    body.apply_acceleration(t, input, dt);
    body.apply_friction(t, input, dt);
    body.apply_fall(t);
    body.apply_gravity(t, dt);

    if !body.grounded {
        return Some(StateKind::Fall);
    }
    let mut next = None;
    if body.turning_around(input) {
        if body.velocity.x.abs() >= t.min_speed_to_brake {
            next = Some(StateKind::Brake);
        }
        body.velocity.x = if body.velocity.x > 0.0 { -BRAKE_KICK } else { BRAKE_KICK };
    }
    if input.jump_down && body.jump_unlocked() {
        next = Some(StateKind::Jump);
    }
    next
}

fn update_brake(ctx: &mut StateContext<'_>) -> Option<StateKind> {
    let (t, input, dt) = (ctx.tunables, ctx.input, ctx.dt);
    let body = &mut *ctx.body;
    body.apply_deceleration(t, input, dt);
    body.apply_gravity(t, dt);
    body.apply_fall(t);

    if !body.grounded {
        Some(StateKind::Fall)
    } else if input.jump_down {
        Some(StateKind::Jump)
    } else if body.velocity.x.abs() <= BRAKE_KICK || input.horizontal == 0.0 {
        Some(StateKind::Normal)
    } else {
        None
    }
}

fn update_jump(release_handled: &mut bool, ctx: &mut StateContext<'_>) -> Option<StateKind> {
    let (t, input, dt) = (ctx.tunables, ctx.input, ctx.dt);
    let body = &mut *ctx.body;
    body.face(input.horizontal);
    body.apply_acceleration(t, input, dt);
    body.apply_gravity(t, dt);
    body.apply_fall(t);

    if body.grounded {
        return Some(StateKind::Normal);
    }
    if input.jump_down && body.jump_unlocked() && body.velocity.y > 0.0 {
        body.lock_jump(t.jump_time);
        return Some(StateKind::Fall);
    }
    if !input.jump_held && !*release_handled {
        *release_handled = true;
        if body.velocity.y > t.min_jump_height {
            body.velocity.y = t.min_jump_height;
        }
    }
    None
}

fn update_fall(ctx: &mut StateContext<'_>) -> Option<StateKind> {
    let (t, input, dt) = (ctx.tunables, ctx.input, ctx.dt);
    let body = &mut *ctx.body;
    body.face(input.horizontal);
    body.apply_acceleration(t, input, dt);
    body.apply_gravity(t, dt);
    body.apply_fall(t);

    body.grounded.then_some(StateKind::Normal)
}
