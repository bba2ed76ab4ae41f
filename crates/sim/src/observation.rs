use hoverseek_shared::*;

use crate::physics::normalize_degrees;

/// Encode the proprioceptive observation. Goal positions are deliberately
/// absent: the agent is expected to find goals from its own sensors.
///
/// Layout: `[vx, vy, angular_velocity, rotation / 180]`.
pub fn observe(state: &AgentState) -> Observation {
    Observation {
        data: [
            state.linear_velocity.x,
            state.linear_velocity.y,
            state.angular_velocity,
            normalize_degrees(state.rotation) / 180.0,
        ],
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec2;

    #[test]
    fn test_observation_layout() {
        let state = AgentState {
            position: Vec2::new(3.0, 2.0),
            linear_velocity: Vec2::new(1.5, -0.5),
            angular_velocity: 12.0,
            rotation: -90.0,
        };
        let obs = observe(&state);
        assert_eq!(obs.data, [1.5, -0.5, 12.0, -0.5]);
    }

    #[test]
    fn test_rotation_component_in_unit_range() {
        for raw in [0.0f32, 90.0, 180.0, 270.0, 359.0, -45.0] {
            let state = AgentState {
                rotation: raw,
                ..Default::default()
            };
            let r = observe(&state).data[3];
            assert!((-1.0..=1.0).contains(&r), "{} -> {}", raw, r);
        }
    }

    #[test]
    fn test_observation_serializes_as_flat_list() {
        let obs = observe(&AgentState::default());
        let json = serde_json::to_string(&obs).unwrap();
        assert_eq!(json, "[0.0,0.0,0.0,0.0]");
        let back: Observation = serde_json::from_str(&json).unwrap();
        assert_eq!(back.data, obs.data);
        assert!(serde_json::from_str::<Observation>("[1.0]").is_err());
    }
}
