use glam::Vec2;
use hoverseek_shared::*;

use crate::episode::EpisodeManager;
use crate::observation::observe;
use crate::physics::{Body, PointBody};
use crate::policy::{Percept, Policy};
use crate::registry::GoalRegistry;
use crate::telemetry::TelemetrySink;

/// Tick cap for headless runs when the config disables the step limit.
pub const UNLIMITED_RUN_CAP: u32 = 100_000;

const FLOOR_EPSILON: f32 = 1e-4;

/// Edge-triggered contact detection for the headless body: an event fires
/// when a contact begins, not while it persists.
#[derive(Debug, Clone)]
pub struct ContactDetector {
    floor: f32,
    reach: f32,
    grounded: bool,
    touching: Vec<usize>,
}

impl ContactDetector {
    pub fn new(config: &SimConfig) -> Self {
        Self {
            floor: config.arena.ground_level + config.arena.agent_radius,
            reach: config.arena.agent_radius + config.arena.goal_radius,
            grounded: false,
            touching: Vec::new(),
        }
    }

    /// Forget contacts carried over from the previous episode.
    pub fn reset(&mut self) {
        self.grounded = false;
        self.touching.clear();
    }

    pub fn detect(&mut self, position: Vec2, registry: &GoalRegistry) -> Vec<CollisionEvent> {
        let mut events = Vec::new();

        let grounded = position.y <= self.floor + FLOOR_EPSILON;
        if grounded && !self.grounded {
            events.push(CollisionEvent::Ground);
        }
        self.grounded = grounded;

        let now: Vec<usize> = registry
            .active()
            .filter(|g| g.position.distance(position) <= self.reach)
            .map(|g| g.index)
            .collect();
        for &index in &now {
            if !self.touching.contains(&index) {
                events.push(CollisionEvent::Goal(index));
            }
        }
        self.touching = now;

        events
    }
}

/// Drive one episode to its end (or `cap` ticks) on a manager that has
/// already been reset. `on_tick` sees every processed tick after physics.
fn drive<S: TelemetrySink>(
    mgr: &mut EpisodeManager<S>,
    body: &mut PointBody,
    contacts: &mut ContactDetector,
    policy: &mut dyn Policy,
    cap: u32,
    mut on_tick: impl FnMut(u32, &AgentState, Option<usize>, f32, bool),
) {
    while mgr.is_running() {
        let state = body.state();
        let percept = Percept {
            obs: observe(&state),
            state,
            target: mgr.target_position(),
        };
        let action = policy.act(&percept);
        if mgr.on_tick(action, body).is_none() {
            break;
        }

        body.integrate(DT);

        if mgr.is_running() {
            for event in contacts.detect(body.position, mgr.registry()) {
                mgr.on_collision(event, &*body);
            }
        }

        let tick = mgr.stats().step_count;
        let done = !mgr.is_running() || tick >= cap;
        on_tick(tick, &body.state(), mgr.target(), mgr.cumulative_reward(), done);
        if done {
            break;
        }
    }
}

fn run_cap(config: &SimConfig) -> u32 {
    match config.episode.max_steps {
        0 => UNLIMITED_RUN_CAP,
        n => n,
    }
}

/// Run a single seeded episode and record a replay.
pub fn run_episode<S: TelemetrySink>(
    config: &SimConfig,
    seed: u64,
    policy: &mut dyn Policy,
    telemetry: S,
) -> Result<Replay, ConfigError> {
    let mut mgr = EpisodeManager::new(*config, seed)?.with_telemetry(telemetry);
    let mut body = PointBody::from_config(config);
    let mut contacts = ContactDetector::new(config);
    mgr.reset(&mut body);

    let goals = mgr
        .registry()
        .goals()
        .iter()
        .map(|g| GoalSnapshot {
            x: g.position.x,
            y: g.position.y,
        })
        .collect();

    let mut frames = vec![ReplayFrame::from_state(0, &body.state(), mgr.target(), 0.0)];
    drive(
        &mut mgr,
        &mut body,
        &mut contacts,
        policy,
        run_cap(config),
        |tick, state, target, reward, done| {
            if tick % FRAME_INTERVAL == 0 || done {
                frames.push(ReplayFrame::from_state(tick, state, target, reward));
            }
        },
    );

    let summary = mgr.finish().unwrap_or_else(|| mgr.summary());
    Ok(Replay {
        seed,
        policy: policy.name().to_string(),
        goals,
        frames,
        summary,
    })
}

/// Run `count` consecutive episodes on one manager, resetting between them.
pub fn run_episodes<S: TelemetrySink>(
    config: &SimConfig,
    seed: u64,
    count: u32,
    policy: &mut dyn Policy,
    telemetry: S,
) -> Result<Vec<EpisodeSummary>, ConfigError> {
    let mut mgr = EpisodeManager::new(*config, seed)?.with_telemetry(telemetry);
    let mut body = PointBody::from_config(config);
    let mut contacts = ContactDetector::new(config);
    let cap = run_cap(config);
    let mut summaries = Vec::with_capacity(count as usize);

    mgr.reset(&mut body);
    for episode in 0..count {
        contacts.reset();
        drive(&mut mgr, &mut body, &mut contacts, policy, cap, |_, _, _, _, _| {});

        let summary = if episode + 1 < count {
            mgr.reset(&mut body)
        } else {
            mgr.finish()
        };
        if let Some(summary) = summary {
            summaries.push(summary);
        }
    }

    Ok(summaries)
}
