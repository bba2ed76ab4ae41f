use glam::Vec2;
use hoverseek_shared::*;
use serde::{Deserialize, Serialize};

use crate::physics::{delta_angle, normalize_degrees};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Gains {
    pub p: f32,
    pub d: f32,
}

/// Vertical PD gain pair. Only these presets ever drive the altitude loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum GainPreset {
    /// Heavily damped hold used at episode start.
    #[default]
    Hover,
    Ascend,
    /// Stiffer damping than ascend so the body drops faster without overshoot.
    Descend,
}

impl GainPreset {
    pub fn gains(&self, cfg: &ControllerConfig) -> Gains {
        match self {
            GainPreset::Hover => Gains {
                p: cfg.hover_p,
                d: cfg.hover_d,
            },
            GainPreset::Ascend => Gains {
                p: cfg.ascend_p,
                d: cfg.ascend_d,
            },
            GainPreset::Descend => Gains {
                p: cfg.descend_p,
                d: cfg.descend_d,
            },
        }
    }
}

/// Setpoints carried between ticks.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ControllerState {
    pub target_altitude: f32,
    /// Degrees, normalized to (-180, 180].
    pub target_orientation: f32,
    pub preset: GainPreset,
}

impl ControllerState {
    /// Hold the given altitude upright with the hover gains.
    pub fn at_rest(altitude: f32) -> Self {
        Self {
            target_altitude: altitude,
            target_orientation: 0.0,
            preset: GainPreset::Hover,
        }
    }
}

/// Force and torque to hand to the body this tick.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Command {
    pub force: Vec2,
    pub torque: f32,
}

/// One controller step: update setpoints from `action`, then compute the
/// commands that pull `agent` toward them.
pub fn control(
    state: ControllerState,
    action: Action,
    agent: &AgentState,
    cfg: &ControllerConfig,
) -> (ControllerState, Command) {
    let mut next = state;

    match action.rotation {
        RotationAction::Positive => {
            next.target_orientation = normalize_degrees(next.target_orientation + cfg.rotation_step)
        }
        RotationAction::Negative => {
            next.target_orientation = normalize_degrees(next.target_orientation - cfg.rotation_step)
        }
        RotationAction::None => {}
    }
    let torque = orientation_torque(
        agent.rotation,
        next.target_orientation,
        agent.angular_velocity,
        cfg,
    );

    match action.motion {
        MotionAction::Up => {
            next.target_altitude = agent.altitude() + cfg.move_step;
            next.preset = GainPreset::Ascend;
        }
        MotionAction::Down => {
            next.target_altitude = agent.altitude() - cfg.move_step;
            next.preset = GainPreset::Descend;
        }
        _ => {}
    }

    let lift = vertical_force(
        next.target_altitude,
        agent.altitude(),
        agent.linear_velocity.y,
        next.preset.gains(cfg),
    );
    let force = lateral_force(action.motion, cfg) + Vec2::new(0.0, lift);

    (next, Command { force, torque })
}

/// PD on altitude error, applied every tick whether or not the setpoint moved.
pub fn vertical_force(target: f32, altitude: f32, vertical_velocity: f32, gains: Gains) -> f32 {
    (target - altitude) * gains.p - vertical_velocity * gains.d
}

/// PD on the shortest signed angle to the orientation setpoint.
pub fn orientation_torque(
    rotation: f32,
    target: f32,
    angular_velocity: f32,
    cfg: &ControllerConfig,
) -> f32 {
    delta_angle(rotation, target) * cfg.torque_kp - angular_velocity * cfg.torque_kd
}

pub fn lateral_force(motion: MotionAction, cfg: &ControllerConfig) -> Vec2 {
    match motion {
        MotionAction::Left => Vec2::NEG_X * cfg.lateral_force,
        MotionAction::Right => Vec2::X * cfg.lateral_force,
        _ => Vec2::ZERO,
    }
}
