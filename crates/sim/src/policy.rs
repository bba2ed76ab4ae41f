use glam::Vec2;
use hoverseek_shared::*;

use crate::input::{heuristic_action, KeyState};

/// Everything a policy may look at on one tick.
///
/// Learned agents should only read `obs`. `state` and `target` are there for
/// scripted baselines and debugging tools.
#[derive(Debug, Clone)]
pub struct Percept {
    pub obs: Observation,
    pub state: AgentState,
    pub target: Option<Vec2>,
}

pub trait Policy: Send {
    fn name(&self) -> &str;
    fn act(&mut self, percept: &Percept) -> Action;
}

/// Policy that does nothing - useful for testing.
pub struct DoNothingPolicy;

impl Policy for DoNothingPolicy {
    fn name(&self) -> &str {
        "do_nothing"
    }

    fn act(&mut self, _percept: &Percept) -> Action {
        Action::none()
    }
}

/// Scripted baseline: flies toward the current target with bounded speed.
///
/// Only one motion action fits per tick, so vertical and lateral corrections
/// alternate when both are needed.
#[derive(Debug, Default)]
pub struct SeekerPolicy {
    tick: u64,
}

impl SeekerPolicy {
    pub fn new() -> Self {
        Self::default()
    }
}

const SEEK_MAX_VX: f32 = 2.0;
const SEEK_VX_BAND: f32 = 0.2;
const SEEK_DEADBAND_Y: f32 = 1.0;
const SEEK_MAX_VY: f32 = 1.0;

impl Policy for SeekerPolicy {
    fn name(&self) -> &str {
        "seeker"
    }

    fn act(&mut self, percept: &Percept) -> Action {
        self.tick += 1;
        let Some(target) = percept.target else {
            return Action::none();
        };

        let s = &percept.state;
        let dx = target.x - s.position.x;
        let dy = target.y - s.position.y;
        let vx = s.linear_velocity.x;
        let vy = s.linear_velocity.y;

        let vertical = if dy > SEEK_DEADBAND_Y && vy < SEEK_MAX_VY {
            MotionAction::Up
        } else if dy < -SEEK_DEADBAND_Y && vy > -SEEK_MAX_VY {
            MotionAction::Down
        } else {
            MotionAction::None
        };

        // Track a desired horizontal speed; there is no drag to bleed it off.
        let desired_vx = dx.clamp(-SEEK_MAX_VX, SEEK_MAX_VX);
        let lateral = if vx < desired_vx - SEEK_VX_BAND {
            MotionAction::Right
        } else if vx > desired_vx + SEEK_VX_BAND {
            MotionAction::Left
        } else {
            MotionAction::None
        };

        let motion = match (vertical, lateral) {
            (MotionAction::None, l) => l,
            (v, MotionAction::None) => v,
            (v, l) => {
                if self.tick % 2 == 0 {
                    v
                } else {
                    l
                }
            }
        };

        Action::new(motion, RotationAction::None)
    }
}

/// Manual override: polls a key-state source each tick.
pub struct ManualPolicy<F> {
    keys: F,
}

impl<F: FnMut() -> KeyState + Send> ManualPolicy<F> {
    pub fn new(keys: F) -> Self {
        Self { keys }
    }
}

impl<F: FnMut() -> KeyState + Send> Policy for ManualPolicy<F> {
    fn name(&self) -> &str {
        "manual"
    }

    fn act(&mut self, _percept: &Percept) -> Action {
        heuristic_action(&(self.keys)())
    }
}

/// Build a policy by CLI name.
pub fn policy_by_name(name: &str) -> Option<Box<dyn Policy>> {
    match name {
        "do_nothing" => Some(Box::new(DoNothingPolicy)),
        "seeker" => Some(Box::new(SeekerPolicy::new())),
        _ => None,
    }
}

pub const POLICY_NAMES: &[&str] = &["do_nothing", "seeker"];

#[cfg(test)]
mod tests {
    use super::*;
    use crate::observation::observe;

    fn percept(position: Vec2, velocity: Vec2, target: Option<Vec2>) -> Percept {
        let state = AgentState {
            position,
            linear_velocity: velocity,
            ..Default::default()
        };
        Percept {
            obs: observe(&state),
            state,
            target,
        }
    }

    #[test]
    fn test_seeker_idles_without_target() {
        let mut p = SeekerPolicy::new();
        let action = p.act(&percept(Vec2::ZERO, Vec2::ZERO, None));
        assert_eq!(action, Action::none());
    }

    #[test]
    fn test_seeker_moves_toward_target_laterally() {
        let mut p = SeekerPolicy::new();
        let right = p.act(&percept(Vec2::ZERO, Vec2::ZERO, Some(Vec2::new(5.0, 0.0))));
        assert_eq!(right.motion, MotionAction::Right);
        let left = p.act(&percept(Vec2::ZERO, Vec2::ZERO, Some(Vec2::new(-5.0, 0.0))));
        assert_eq!(left.motion, MotionAction::Left);
    }

    #[test]
    fn test_seeker_brakes_when_too_fast() {
        let mut p = SeekerPolicy::new();
        let action = p.act(&percept(
            Vec2::ZERO,
            Vec2::new(3.0, 0.0),
            Some(Vec2::new(5.0, 0.0)),
        ));
        assert_eq!(action.motion, MotionAction::Left);
    }

    #[test]
    fn test_seeker_climbs_to_high_target() {
        let mut p = SeekerPolicy::new();
        let action = p.act(&percept(Vec2::ZERO, Vec2::ZERO, Some(Vec2::new(0.0, 4.0))));
        assert_eq!(action.motion, MotionAction::Up);
    }

    #[test]
    fn test_seeker_alternates_when_both_needed() {
        let mut p = SeekerPolicy::new();
        let target = Some(Vec2::new(5.0, 5.0));
        let a = p.act(&percept(Vec2::ZERO, Vec2::ZERO, target)).motion;
        let b = p.act(&percept(Vec2::ZERO, Vec2::ZERO, target)).motion;
        assert_ne!(a, b);
        assert!(matches!(a, MotionAction::Up | MotionAction::Right));
        assert!(matches!(b, MotionAction::Up | MotionAction::Right));
    }

    #[test]
    fn test_manual_policy_reads_keys() {
        let mut p = ManualPolicy::new(|| KeyState {
            left: true,
            a: true,
            ..Default::default()
        });
        let action = p.act(&percept(Vec2::ZERO, Vec2::ZERO, None));
        assert_eq!(action.to_raw(), [3, 1]);
    }

    #[test]
    fn test_policy_by_name() {
        for name in POLICY_NAMES {
            assert_eq!(policy_by_name(name).unwrap().name(), *name);
        }
        assert!(policy_by_name("nope").is_none());
    }
}
