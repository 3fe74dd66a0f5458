use thiserror::Error;

use crate::state::StateKind;

/// Setup precondition failures. A controller is never built from a config that
/// produces one of these.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    #[error("{field} must be finite, got {value}")]
    NonFinite { field: &'static str, value: f32 },

    #[error("{field} must be greater than zero, got {value}")]
    NonPositive { field: &'static str, value: f32 },

    #[error("{field} must not be negative, got {value}")]
    Negative { field: &'static str, value: f32 },

    #[error("{field} must lie in {min}..={max}, got {value}")]
    OutOfRange {
        field: &'static str,
        value: f32,
        min: f32,
        max: f32,
    },

    #[error("top_speed ({top}) exceeds max_speed ({max})")]
    TopSpeedExceedsMax { top: f32, max: f32 },

    #[error("collision layer `{layer}` has no bits set")]
    EmptyLayerMask { layer: &'static str },

    #[error("initial state {state:?} is not registered in the state machine")]
    UnregisteredInitialState { state: StateKind },
}
