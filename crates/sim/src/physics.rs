use glam::Vec2;
use hoverseek_shared::*;

/// Rigid-body collaborator the core reads state from and pushes forces into.
///
/// Forces and torques accumulate until the owner integrates the body.
pub trait Body {
    fn position(&self) -> Vec2;
    fn linear_velocity(&self) -> Vec2;
    /// Degrees per second.
    fn angular_velocity(&self) -> f32;
    /// Degrees, normalized to (-180, 180].
    fn rotation(&self) -> f32;

    fn apply_force(&mut self, force: Vec2);
    fn apply_torque(&mut self, torque: f32);
    fn set_rotation(&mut self, degrees: f32);
    fn set_position(&mut self, position: Vec2);
    fn zero_velocities(&mut self);

    fn state(&self) -> AgentState {
        AgentState {
            position: self.position(),
            linear_velocity: self.linear_velocity(),
            angular_velocity: self.angular_velocity(),
            rotation: normalize_degrees(self.rotation()),
        }
    }
}

/// Headless point-mass body with a floor at the ground line.
#[derive(Debug, Clone)]
pub struct PointBody {
    pub position: Vec2,
    pub velocity: Vec2,
    pub angular_velocity: f32,
    pub rotation: f32,
    pub params: BodyConfig,
    /// Lowest altitude the body centre can reach.
    pub floor: f32,
    force: Vec2,
    torque: f32,
}

impl PointBody {
    pub fn new(params: BodyConfig, floor: f32) -> Self {
        Self {
            position: Vec2::ZERO,
            velocity: Vec2::ZERO,
            angular_velocity: 0.0,
            rotation: 0.0,
            params,
            floor,
            force: Vec2::ZERO,
            torque: 0.0,
        }
    }

    pub fn from_config(config: &SimConfig) -> Self {
        Self::new(
            config.body,
            config.arena.ground_level + config.arena.agent_radius,
        )
    }

    pub fn pending_force(&self) -> Vec2 {
        self.force
    }

    pub fn on_floor(&self) -> bool {
        self.position.y <= self.floor
    }

    /// Advance one tick with semi-implicit Euler and clear accumulated forces.
    pub fn integrate(&mut self, dt: f32) {
        let p = &self.params;

        let accel = self.force / p.mass + Vec2::new(0.0, -p.gravity);
        self.velocity += accel * dt;
        self.velocity /= 1.0 + p.linear_damping * dt;
        self.position += self.velocity * dt;

        self.angular_velocity += self.torque / p.inertia * dt;
        self.angular_velocity /= 1.0 + p.angular_damping * dt;
        self.rotation = normalize_degrees(self.rotation + self.angular_velocity * dt);

        // Ground: hard floor, downward velocity absorbed
        if self.position.y < self.floor {
            self.position.y = self.floor;
            if self.velocity.y < 0.0 {
                self.velocity.y = 0.0;
            }
        }

        self.force = Vec2::ZERO;
        self.torque = 0.0;
    }
}

impl Body for PointBody {
    fn position(&self) -> Vec2 {
        self.position
    }

    fn linear_velocity(&self) -> Vec2 {
        self.velocity
    }

    fn angular_velocity(&self) -> f32 {
        self.angular_velocity
    }

    fn rotation(&self) -> f32 {
        self.rotation
    }

    fn apply_force(&mut self, force: Vec2) {
        self.force += force;
    }

    fn apply_torque(&mut self, torque: f32) {
        self.torque += torque;
    }

    fn set_rotation(&mut self, degrees: f32) {
        self.rotation = normalize_degrees(degrees);
    }

    fn set_position(&mut self, position: Vec2) {
        self.position = position;
    }

    fn zero_velocities(&mut self) {
        self.velocity = Vec2::ZERO;
        self.angular_velocity = 0.0;
        self.force = Vec2::ZERO;
        self.torque = 0.0;
    }
}

/// Normalize an angle in degrees to (-180, 180].
pub fn normalize_degrees(a: f32) -> f32 {
    let mut a = a % 360.0;
    if a > 180.0 {
        a -= 360.0;
    } else if a <= -180.0 {
        a += 360.0;
    }
    a
}

/// Shortest signed angle from `current` to `target`, in (-180, 180].
pub fn delta_angle(current: f32, target: f32) -> f32 {
    normalize_degrees(target - current)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn body() -> PointBody {
        PointBody::from_config(&SimConfig::default())
    }

    #[test]
    fn test_normalize_degrees_range() {
        assert!((normalize_degrees(190.0) - (-170.0)).abs() < 1e-4);
        assert!((normalize_degrees(-190.0) - 170.0).abs() < 1e-4);
        assert!((normalize_degrees(180.0) - 180.0).abs() < 1e-4);
        assert!((normalize_degrees(-180.0) - 180.0).abs() < 1e-4);
        assert!((normalize_degrees(720.0 + 45.0) - 45.0).abs() < 1e-4);
        assert!(normalize_degrees(0.0).abs() < 1e-6);
    }

    #[test]
    fn test_delta_angle_wraps() {
        assert!((delta_angle(179.0, -179.0) - 2.0).abs() < 1e-4);
        assert!((delta_angle(-179.0, 179.0) - (-2.0)).abs() < 1e-4);
        assert!((delta_angle(10.0, 30.0) - 20.0).abs() < 1e-4);
        assert!((delta_angle(350.0, 10.0) - 20.0).abs() < 1e-4);
    }

    #[test]
    fn test_force_accumulates_and_clears() {
        let mut b = body();
        b.position = Vec2::new(0.0, 2.0);
        b.apply_force(Vec2::new(1.0, 0.0));
        b.apply_force(Vec2::new(1.0, 0.0));
        assert!((b.pending_force().x - 2.0).abs() < 1e-6);

        b.integrate(DT);
        assert!(b.velocity.x > 0.0);
        assert_eq!(b.pending_force(), Vec2::ZERO);
    }

    #[test]
    fn test_floor_absorbs_downward_velocity() {
        let mut b = body();
        b.position = Vec2::new(0.0, b.floor + 0.01);
        b.velocity = Vec2::new(0.0, -5.0);

        b.integrate(DT);

        assert!((b.position.y - b.floor).abs() < 1e-6);
        assert_eq!(b.velocity.y, 0.0);
        assert!(b.on_floor());
    }

    #[test]
    fn test_torque_spins_body() {
        let mut b = body();
        b.apply_torque(100.0);
        b.integrate(DT);
        assert!(b.angular_velocity > 0.0);
        assert!(b.rotation > 0.0);
    }

    #[test]
    fn test_rotation_stays_normalized() {
        let mut b = body();
        b.rotation = 179.0;
        b.angular_velocity = 200.0;
        b.integrate(DT);
        assert!(b.rotation > -180.0 && b.rotation <= 180.0);
        assert!(b.rotation < 0.0);
    }

    #[test]
    fn test_zero_velocities_clears_pending() {
        let mut b = body();
        b.velocity = Vec2::new(3.0, 1.0);
        b.angular_velocity = 5.0;
        b.apply_force(Vec2::ONE);
        b.zero_velocities();
        assert_eq!(b.velocity, Vec2::ZERO);
        assert_eq!(b.angular_velocity, 0.0);
        assert_eq!(b.pending_force(), Vec2::ZERO);
    }

    #[test]
    fn test_gravity_pulls_down() {
        let mut config = SimConfig::default();
        config.body.gravity = 9.81;
        let mut b = PointBody::from_config(&config);
        b.position = Vec2::new(0.0, 3.0);
        b.integrate(DT);
        assert!(b.velocity.y < 0.0);
    }
}
