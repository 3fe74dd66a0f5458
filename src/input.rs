//! Per-tick input.

/// Input consumed by one tick. Edge flags are computed once per tick by the sampler.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct InputSnapshot {
    /// Horizontal axis in `[-1, 1]`.
    pub horizontal: f32,
    /// Vertical axis in `[-1, 1]`.
    pub vertical: f32,
    pub jump_held: bool,
    /// Jump went from released to held this tick.
    pub jump_down: bool,
    /// Jump went from held to released this tick.
    pub jump_up: bool,
}

impl InputSnapshot {
    pub fn idle() -> Self {
        Self::default()
    }

    /// Horizontal-only input with the jump button released.
    pub fn run(horizontal: f32) -> Self {
        Self {
            horizontal,
            ..Self::default()
        }
    }
}

fn clean_axis(v: f32) -> f32 {
    if v.is_nan() { 0.0 } else { v.clamp(-1.0, 1.0) }
}

/// Turns raw button state into press/release edges.
#[derive(Debug, Clone, Copy, Default)]
pub struct ButtonEdges {
    held: bool,
}

impl ButtonEdges {
    /// Returns `(down, up)` for this sample.
    pub fn sample(&mut self, pressed: bool) -> (bool, bool) {
        let down = pressed && !self.held;
        let up = !pressed && self.held;
        self.held = pressed;
        (down, up)
    }
}

/// Builds one [`InputSnapshot`] per tick from raw axis values and the jump button.
#[derive(Debug, Clone, Copy, Default)]
pub struct InputSampler {
    jump: ButtonEdges,
}

impl InputSampler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn sample(&mut self, horizontal: f32, vertical: f32, jump_pressed: bool) -> InputSnapshot {
        let (jump_down, jump_up) = self.jump.sample(jump_pressed);
        InputSnapshot {
            horizontal: clean_axis(horizontal),
            vertical: clean_axis(vertical),
            jump_held: jump_pressed,
            jump_down,
            jump_up,
        }
    }
}
