use hoverseek_shared::*;

/// Snapshot of the manual-override keys.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct KeyState {
    pub up: bool,
    pub down: bool,
    pub left: bool,
    pub right: bool,
    /// Rotate positive.
    pub a: bool,
    /// Rotate negative.
    pub d: bool,
}

/// Map held keys to the two discrete branches. Arrow keys resolve in
/// up, down, left, right priority; `a` wins over `d`.
pub fn heuristic_action(keys: &KeyState) -> Action {
    let motion = if keys.up {
        MotionAction::Up
    } else if keys.down {
        MotionAction::Down
    } else if keys.left {
        MotionAction::Left
    } else if keys.right {
        MotionAction::Right
    } else {
        MotionAction::None
    };

    let rotation = if keys.a {
        RotationAction::Positive
    } else if keys.d {
        RotationAction::Negative
    } else {
        RotationAction::None
    };

    Action { motion, rotation }
}
