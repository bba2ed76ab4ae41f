// Tick rate
pub const TICK_RATE: u32 = 50;
pub const DT: f32 = 1.0 / TICK_RATE as f32;

// Arena (side-view: X=horizontal, Y=altitude)
pub const ARENA_MIN_X: f32 = -16.0;
pub const ARENA_MAX_X: f32 = 16.0;
pub const ARENA_MIN_Y: f32 = -6.0;
pub const ARENA_MAX_Y: f32 = 8.0;
pub const GROUND_LEVEL: f32 = -2.2;

// Spawn ranges
pub const SPAWN_X_RANGE: (f32, f32) = (-7.0, 7.0);
pub const SPAWN_ALTITUDE: f32 = -1.93;
pub const GOAL_X_RANGE: (f32, f32) = (-7.0, 7.0);
pub const GOAL_Y_RANGE: (f32, f32) = (-3.0, 7.0);

// Agent body
pub const AGENT_RADIUS: f32 = 0.25;
pub const AGENT_MASS: f32 = 1.0;
pub const AGENT_INERTIA: f32 = 1.0;
pub const ANGULAR_DAMPING: f32 = 0.05;

// Goals
pub const GOAL_RADIUS: f32 = 0.5;
pub const GOAL_COUNT: usize = 6;
pub const GOAL_QUOTA: u32 = 5;

// Episode
pub const MAX_STEPS: u32 = 5000;

// Controller
pub const MOVE_STEP: f32 = 3.0;
pub const LATERAL_FORCE: f32 = 5.0;
pub const ROTATION_STEP_DEG: f32 = 10.0;
pub const TORQUE_KP: f32 = 0.5;
pub const TORQUE_KD: f32 = 0.1;
pub const HOVER_P: f32 = 5.0;
pub const HOVER_D: f32 = 30.0;
pub const ASCEND_P: f32 = 5.0;
pub const ASCEND_D: f32 = 2.5;
pub const DESCEND_P: f32 = 5.0;
pub const DESCEND_D: f32 = 10.0;

// Reward shaping
pub const TILT_THRESHOLD: f32 = 0.85;
pub const TILT_PENALTY_SCALE: f32 = 0.05;
pub const STEP_PENALTY: f32 = 0.001;
pub const GROUND_CONTACT_PENALTY: f32 = 0.01;
pub const ON_TARGET_BONUS: f32 = 2.0;
pub const OFF_TARGET_BONUS: f32 = 1.0;
pub const BOUNDARY_PENALTY: f32 = 1.0;

// Path efficiency denominator floor
pub const MIN_DISTANCE_TRAVELED: f32 = 0.001;

// Observation: linear velocity (2), angular velocity (1), rotation / 180 (1)
pub const OBS_SIZE: usize = 4;
pub const MOTION_ACTIONS: usize = 5;
pub const ROTATION_ACTIONS: usize = 3;

// Audio hum pitch
pub const HUM_PITCH_MIN: f32 = 1.0;
pub const HUM_PITCH_MAX: f32 = 1.5;
pub const HUM_FULL_SPEED: f32 = 10.0;

// Frame recording
pub const FRAME_INTERVAL: u32 = 5; // every 5th tick = 10fps
