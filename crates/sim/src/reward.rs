use hoverseek_shared::*;

use crate::physics::normalize_degrees;

/// 1.0 upright, 0.0 upside down.
pub fn upright_score(rotation: f32) -> f32 {
    1.0 - normalize_degrees(rotation).abs() / 180.0
}

/// Quadratic tilt penalty: zero at the threshold, `-scale` when fully inverted.
pub fn tilt_penalty(score: f32, cfg: &RewardConfig) -> f32 {
    if score >= cfg.tilt_threshold {
        return 0.0;
    }
    let excess = (cfg.tilt_threshold - score) / cfg.tilt_threshold;
    -cfg.tilt_penalty_scale * excess * excess
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TickReward {
    pub upright_score: f32,
    pub reward: f32,
}

/// Turns physical state and contact events into scalar reward and keeps the
/// episode accumulators.
#[derive(Debug, Clone)]
pub struct RewardShaper {
    cfg: RewardConfig,
    cumulative: f32,
}

impl RewardShaper {
    pub fn new(cfg: RewardConfig) -> Self {
        Self {
            cfg,
            cumulative: 0.0,
        }
    }

    pub fn cumulative(&self) -> f32 {
        self.cumulative
    }

    pub fn reset(&mut self) {
        self.cumulative = 0.0;
    }

    /// Per-tick shaping: tilt penalty plus the constant step penalty.
    pub fn tick(&mut self, rotation: f32) -> TickReward {
        let score = upright_score(rotation);
        let reward = tilt_penalty(score, &self.cfg) - self.cfg.step_penalty;
        self.cumulative += reward;
        TickReward {
            upright_score: score,
            reward,
        }
    }

    pub fn ground_contact(&mut self) -> f32 {
        self.add(-self.cfg.ground_contact_penalty)
    }

    pub fn goal_reached(&mut self, on_target: bool) -> f32 {
        let bonus = if on_target {
            self.cfg.on_target_bonus
        } else {
            self.cfg.off_target_bonus
        };
        self.add(bonus)
    }

    pub fn boundary_violation(&mut self) -> f32 {
        self.add(-self.cfg.boundary_penalty)
    }

    fn add(&mut self, reward: f32) -> f32 {
        self.cumulative += reward;
        reward
    }
}
