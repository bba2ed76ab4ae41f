use glam::Vec2;
use serde::{Deserialize, Serialize};

/// Vertical/lateral branch of the discrete action space.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum MotionAction {
    #[default]
    None,
    Up,
    Down,
    Left,
    Right,
}

impl MotionAction {
    /// Decode a raw branch value. Unknown codes fall back to `None`.
    pub fn from_code(code: i32) -> Self {
        match code {
            1 => MotionAction::Up,
            2 => MotionAction::Down,
            3 => MotionAction::Left,
            4 => MotionAction::Right,
            _ => MotionAction::None,
        }
    }

    pub fn code(&self) -> i32 {
        match self {
            MotionAction::None => 0,
            MotionAction::Up => 1,
            MotionAction::Down => 2,
            MotionAction::Left => 3,
            MotionAction::Right => 4,
        }
    }
}

/// Orientation branch of the discrete action space.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum RotationAction {
    #[default]
    None,
    Positive,
    Negative,
}

impl RotationAction {
    pub fn from_code(code: i32) -> Self {
        match code {
            1 => RotationAction::Positive,
            2 => RotationAction::Negative,
            _ => RotationAction::None,
        }
    }

    pub fn code(&self) -> i32 {
        match self {
            RotationAction::None => 0,
            RotationAction::Positive => 1,
            RotationAction::Negative => 2,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Action {
    pub motion: MotionAction,
    pub rotation: RotationAction,
}

impl Action {
    pub fn none() -> Self {
        Self {
            motion: MotionAction::None,
            rotation: RotationAction::None,
        }
    }

    pub fn new(motion: MotionAction, rotation: RotationAction) -> Self {
        Self { motion, rotation }
    }

    /// Build from the two raw discrete branches `[motion, rotation]`.
    pub fn from_raw(raw: [i32; 2]) -> Self {
        Self {
            motion: MotionAction::from_code(raw[0]),
            rotation: RotationAction::from_code(raw[1]),
        }
    }

    pub fn to_raw(&self) -> [i32; 2] {
        [self.motion.code(), self.rotation.code()]
    }
}

/// Rigid-body state as read from the physics collaborator.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct AgentState {
    pub position: Vec2,
    pub linear_velocity: Vec2,
    /// Degrees per second.
    pub angular_velocity: f32,
    /// Degrees, normalized to (-180, 180].
    pub rotation: f32,
}

impl AgentState {
    pub fn altitude(&self) -> f32 {
        self.position.y
    }

    pub fn speed(&self) -> f32 {
        self.linear_velocity.length()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Goal {
    pub index: usize,
    pub position: Vec2,
    pub active: bool,
}

/// Events delivered by the collision notifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CollisionEvent {
    Ground,
    Goal(usize),
}

#[derive(Debug, Clone)]
pub struct Observation {
    pub data: [f32; crate::OBS_SIZE],
}

impl serde::Serialize for Observation {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.data.as_slice().serialize(serializer)
    }
}

impl<'de> serde::Deserialize<'de> for Observation {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let v: Vec<f32> = Vec::deserialize(deserializer)?;
        if v.len() != crate::OBS_SIZE {
            return Err(serde::de::Error::custom(format!(
                "expected {} floats, got {}",
                crate::OBS_SIZE,
                v.len()
            )));
        }
        let mut data = [0.0f32; crate::OBS_SIZE];
        data.copy_from_slice(&v);
        Ok(Observation { data })
    }
}

/// Named scalar metrics accepted by the telemetry sink.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Metric {
    EpisodeLength,
    TargetsFound,
    PathEfficiency,
    AngleStability,
    GroundCollision,
    Reward,
}

impl Metric {
    pub fn name(&self) -> &'static str {
        match self {
            Metric::EpisodeLength => "EpisodeLength",
            Metric::TargetsFound => "TargetsFound",
            Metric::PathEfficiency => "PathEfficiency",
            Metric::AngleStability => "AngleStability",
            Metric::GroundCollision => "GroundCollision",
            Metric::Reward => "Reward",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EndReason {
    GoalQuota,
    OutOfBounds,
    Timeout,
    /// Episode was still running when the driver stopped or reset it.
    Interrupted,
}

/// Final statistics for one episode.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EpisodeSummary {
    pub episode: u32,
    pub length: u32,
    pub goals_reached: u32,
    pub path_efficiency: f32,
    pub shortest_path: f32,
    pub distance_traveled: f32,
    pub cumulative_reward: f32,
    pub ground_collision: bool,
    pub reason: EndReason,
}

impl EpisodeSummary {
    pub fn succeeded(&self, quota: u32) -> bool {
        self.goals_reached >= quota
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct ReplayFrame {
    pub tick: u32,
    pub x: f32,
    pub y: f32,
    pub rotation: f32,
    pub target: Option<usize>,
    pub cumulative_reward: f32,
}

impl ReplayFrame {
    pub fn from_state(tick: u32, state: &AgentState, target: Option<usize>, reward: f32) -> Self {
        Self {
            tick,
            x: state.position.x,
            y: state.position.y,
            rotation: state.rotation,
            target,
            cumulative_reward: reward,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GoalSnapshot {
    pub x: f32,
    pub y: f32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Replay {
    pub seed: u64,
    pub policy: String,
    pub goals: Vec<GoalSnapshot>,
    pub frames: Vec<ReplayFrame>,
    pub summary: EpisodeSummary,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::*;

    #[test]
    fn test_action_codes_cover_branches() {
        for code in 0..MOTION_ACTIONS as i32 {
            assert_eq!(MotionAction::from_code(code).code(), code);
        }
        for code in 0..ROTATION_ACTIONS as i32 {
            assert_eq!(RotationAction::from_code(code).code(), code);
        }
    }

    #[test]
    fn test_out_of_range_codes_are_noop() {
        assert_eq!(Action::from_raw([7, -1]), Action::none());
        assert_eq!(Action::from_raw([MOTION_ACTIONS as i32, ROTATION_ACTIONS as i32]), Action::none());
        assert_eq!(Action::from_raw([2, 1]).to_raw(), [2, 1]);
    }

    #[test]
    fn test_succeeded_against_quota() {
        let summary = EpisodeSummary {
            episode: 3,
            length: 812,
            goals_reached: 5,
            path_efficiency: 0.61,
            shortest_path: 18.2,
            distance_traveled: 29.8,
            cumulative_reward: 8.4,
            ground_collision: false,
            reason: EndReason::GoalQuota,
        };
        assert!(summary.succeeded(GOAL_QUOTA));
        assert!(!summary.succeeded(6));

        let json = serde_json::to_value(&summary).unwrap();
        assert_eq!(json["reason"], "GoalQuota");
        assert_eq!(json["goals_reached"], 5);
    }
}
