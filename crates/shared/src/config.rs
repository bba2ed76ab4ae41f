use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::constants::*;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("goal count must be positive")]
    NoGoals,
    #[error("goal quota must be between 1 and the goal count ({goals}), got {quota}")]
    InvalidQuota { quota: u32, goals: usize },
    #[error("layout has {goals} goals but the quota needs {quota}")]
    TooFewGoals { goals: usize, quota: u32 },
    #[error("empty range for {0}: min must be below max")]
    EmptyRange(&'static str),
    #[error("{0} lies outside the arena bounds")]
    OutsideArena(&'static str),
    #[error("{0} must be positive")]
    NotPositive(&'static str),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid config JSON: {0}")]
    Json(#[from] serde_json::Error),
}

/// Arena geometry and spawn ranges.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ArenaConfig {
    pub min_x: f32,
    pub max_x: f32,
    pub min_y: f32,
    pub max_y: f32,
    pub ground_level: f32,
    pub spawn_x: (f32, f32),
    pub spawn_altitude: f32,
    pub goal_x: (f32, f32),
    pub goal_y: (f32, f32),
    pub agent_radius: f32,
    pub goal_radius: f32,
}

impl Default for ArenaConfig {
    fn default() -> Self {
        Self {
            min_x: ARENA_MIN_X,
            max_x: ARENA_MAX_X,
            min_y: ARENA_MIN_Y,
            max_y: ARENA_MAX_Y,
            ground_level: GROUND_LEVEL,
            spawn_x: SPAWN_X_RANGE,
            spawn_altitude: SPAWN_ALTITUDE,
            goal_x: GOAL_X_RANGE,
            goal_y: GOAL_Y_RANGE,
            agent_radius: AGENT_RADIUS,
            goal_radius: GOAL_RADIUS,
        }
    }
}

impl ArenaConfig {
    /// Inclusive bounds check used for the out-of-bounds termination.
    pub fn contains(&self, x: f32, y: f32) -> bool {
        (self.min_x..=self.max_x).contains(&x) && (self.min_y..=self.max_y).contains(&y)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.min_x >= self.max_x || self.min_y >= self.max_y {
            return Err(ConfigError::EmptyRange("arena bounds"));
        }
        if self.spawn_x.0 > self.spawn_x.1 {
            return Err(ConfigError::EmptyRange("spawn_x"));
        }
        if self.goal_x.0 > self.goal_x.1 {
            return Err(ConfigError::EmptyRange("goal_x"));
        }
        if self.goal_y.0 > self.goal_y.1 {
            return Err(ConfigError::EmptyRange("goal_y"));
        }
        let spawn_inside = self.contains(self.spawn_x.0, self.spawn_altitude)
            && self.contains(self.spawn_x.1, self.spawn_altitude);
        if !spawn_inside {
            return Err(ConfigError::OutsideArena("spawn range"));
        }
        let goals_inside =
            self.contains(self.goal_x.0, self.goal_y.0) && self.contains(self.goal_x.1, self.goal_y.1);
        if !goals_inside {
            return Err(ConfigError::OutsideArena("goal range"));
        }
        if self.agent_radius <= 0.0 {
            return Err(ConfigError::NotPositive("agent_radius"));
        }
        if self.goal_radius <= 0.0 {
            return Err(ConfigError::NotPositive("goal_radius"));
        }
        Ok(())
    }
}

/// Controller gains and per-action increments.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ControllerConfig {
    pub move_step: f32,
    pub lateral_force: f32,
    pub rotation_step: f32,
    pub torque_kp: f32,
    pub torque_kd: f32,
    pub hover_p: f32,
    pub hover_d: f32,
    pub ascend_p: f32,
    pub ascend_d: f32,
    pub descend_p: f32,
    pub descend_d: f32,
}

impl Default for ControllerConfig {
    fn default() -> Self {
        Self {
            move_step: MOVE_STEP,
            lateral_force: LATERAL_FORCE,
            rotation_step: ROTATION_STEP_DEG,
            torque_kp: TORQUE_KP,
            torque_kd: TORQUE_KD,
            hover_p: HOVER_P,
            hover_d: HOVER_D,
            ascend_p: ASCEND_P,
            ascend_d: ASCEND_D,
            descend_p: DESCEND_P,
            descend_d: DESCEND_D,
        }
    }
}

/// Reward weights. Penalties are stored as positive magnitudes.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RewardConfig {
    pub tilt_threshold: f32,
    pub tilt_penalty_scale: f32,
    pub step_penalty: f32,
    pub ground_contact_penalty: f32,
    pub on_target_bonus: f32,
    pub off_target_bonus: f32,
    pub boundary_penalty: f32,
}

impl Default for RewardConfig {
    fn default() -> Self {
        Self {
            tilt_threshold: TILT_THRESHOLD,
            tilt_penalty_scale: TILT_PENALTY_SCALE,
            step_penalty: STEP_PENALTY,
            ground_contact_penalty: GROUND_CONTACT_PENALTY,
            on_target_bonus: ON_TARGET_BONUS,
            off_target_bonus: OFF_TARGET_BONUS,
            boundary_penalty: BOUNDARY_PENALTY,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EpisodeConfig {
    pub goal_count: usize,
    pub goal_quota: u32,
    /// 0 disables the step limit.
    pub max_steps: u32,
}

impl Default for EpisodeConfig {
    fn default() -> Self {
        Self {
            goal_count: GOAL_COUNT,
            goal_quota: GOAL_QUOTA,
            max_steps: MAX_STEPS,
        }
    }
}

/// Body parameters for the headless reference integrator.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BodyConfig {
    pub mass: f32,
    pub inertia: f32,
    pub gravity: f32,
    pub linear_damping: f32,
    pub angular_damping: f32,
}

impl Default for BodyConfig {
    fn default() -> Self {
        Self {
            mass: AGENT_MASS,
            inertia: AGENT_INERTIA,
            gravity: 0.0,
            linear_damping: 0.0,
            angular_damping: ANGULAR_DAMPING,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SimConfig {
    pub arena: ArenaConfig,
    pub controller: ControllerConfig,
    pub reward: RewardConfig,
    pub episode: EpisodeConfig,
    pub body: BodyConfig,
}

impl SimConfig {
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let config: SimConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json_str(&json)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.arena.validate()?;
        let goals = self.episode.goal_count;
        if goals == 0 {
            return Err(ConfigError::NoGoals);
        }
        let quota = self.episode.goal_quota;
        if quota == 0 || quota as usize > goals {
            return Err(ConfigError::InvalidQuota { quota, goals });
        }
        if self.body.mass <= 0.0 {
            return Err(ConfigError::NotPositive("body.mass"));
        }
        if self.body.inertia <= 0.0 {
            return Err(ConfigError::NotPositive("body.inertia"));
        }
        Ok(())
    }
}
