use glam::Vec2;
use hoverseek_shared::*;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg64;
use serde::{Deserialize, Serialize};

use crate::controller::{control, Command, ControllerState};
use crate::physics::Body;
use crate::registry::{sample, GoalRegistry};
use crate::reward::RewardShaper;
use crate::telemetry::{hum_pitch, Feedback, NoopSink, Silent, TelemetrySink};
use crate::tour::plan_greedy_tour;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EpisodePhase {
    Running,
    Terminated(EndReason),
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct EpisodeStats {
    pub step_count: u32,
    pub goals_reached: u32,
    pub distance_traveled: f32,
    pub shortest_path_estimate: f32,
    pub ground_collision: bool,
}

impl EpisodeStats {
    pub fn path_efficiency(&self) -> f32 {
        self.shortest_path_estimate / self.distance_traveled.max(MIN_DISTANCE_TRAVELED)
    }
}

/// Agent spawn point and goal positions for one episode.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Layout {
    pub agent: Vec2,
    pub goals: Vec<Vec2>,
}

impl Layout {
    /// Agent on the spawn line, goals scattered over the goal ranges.
    pub fn random<R: Rng>(rng: &mut R, config: &SimConfig) -> Self {
        let arena = &config.arena;
        let agent = Vec2::new(sample(rng, arena.spawn_x), arena.spawn_altitude);
        let goals = (0..config.episode.goal_count)
            .map(|_| Vec2::new(sample(rng, arena.goal_x), sample(rng, arena.goal_y)))
            .collect();
        Self { agent, goals }
    }
}

/// Outcome of one processed tick.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TickReport {
    pub step: u32,
    /// Reward earned this tick, boundary penalty included.
    pub reward: f32,
    pub upright_score: f32,
    pub command: Command,
    pub ended: Option<EndReason>,
}

/// Outcome of one accepted collision event.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CollisionReport {
    pub reward: f32,
    pub goal: Option<usize>,
    pub on_target: bool,
    pub ended: Option<EndReason>,
}

/// Owns episode state and reacts to ticks and collisions.
///
/// The physics body stays with the driver: the manager pushes force and
/// torque into it in `on_tick` and the driver integrates afterwards.
/// Call [`EpisodeManager::reset`] before the first tick.
pub struct EpisodeManager<S: TelemetrySink = NoopSink, F: Feedback = Silent> {
    config: SimConfig,
    rng: Pcg64,
    registry: GoalRegistry,
    controller: ControllerState,
    reward: RewardShaper,
    stats: EpisodeStats,
    phase: EpisodePhase,
    last_position: Vec2,
    target: Option<usize>,
    plan: Vec<usize>,
    episode: u32,
    reported: bool,
    telemetry: S,
    feedback: F,
}

impl EpisodeManager {
    pub fn new(config: SimConfig, seed: u64) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self {
            config,
            rng: Pcg64::seed_from_u64(seed),
            registry: GoalRegistry::new(config.episode.goal_count),
            controller: ControllerState::at_rest(config.arena.spawn_altitude),
            reward: RewardShaper::new(config.reward),
            stats: EpisodeStats::default(),
            phase: EpisodePhase::Running,
            last_position: Vec2::ZERO,
            target: None,
            plan: Vec::new(),
            episode: 0,
            reported: false,
            telemetry: NoopSink,
            feedback: Silent,
        })
    }
}

impl<S: TelemetrySink, F: Feedback> EpisodeManager<S, F> {
    pub fn with_telemetry<T: TelemetrySink>(self, telemetry: T) -> EpisodeManager<T, F> {
        EpisodeManager {
            config: self.config,
            rng: self.rng,
            registry: self.registry,
            controller: self.controller,
            reward: self.reward,
            stats: self.stats,
            phase: self.phase,
            last_position: self.last_position,
            target: self.target,
            plan: self.plan,
            episode: self.episode,
            reported: self.reported,
            telemetry,
            feedback: self.feedback,
        }
    }

    pub fn with_feedback<G: Feedback>(self, feedback: G) -> EpisodeManager<S, G> {
        EpisodeManager {
            config: self.config,
            rng: self.rng,
            registry: self.registry,
            controller: self.controller,
            reward: self.reward,
            stats: self.stats,
            phase: self.phase,
            last_position: self.last_position,
            target: self.target,
            plan: self.plan,
            episode: self.episode,
            reported: self.reported,
            telemetry: self.telemetry,
            feedback,
        }
    }

    pub fn phase(&self) -> EpisodePhase {
        self.phase
    }

    pub fn is_running(&self) -> bool {
        self.phase == EpisodePhase::Running
    }

    pub fn stats(&self) -> &EpisodeStats {
        &self.stats
    }

    /// Index of the goal the agent is currently steered toward.
    pub fn target(&self) -> Option<usize> {
        self.target
    }

    pub fn target_position(&self) -> Option<Vec2> {
        self.target
            .and_then(|i| self.registry.get(i))
            .map(|g| g.position)
    }

    /// Remaining greedy visit order, current target first.
    pub fn planned_route(&self) -> &[usize] {
        &self.plan
    }

    pub fn registry(&self) -> &GoalRegistry {
        &self.registry
    }

    pub fn controller(&self) -> &ControllerState {
        &self.controller
    }

    pub fn cumulative_reward(&self) -> f32 {
        self.reward.cumulative()
    }

    pub fn episode(&self) -> u32 {
        self.episode
    }

    pub fn telemetry(&self) -> &S {
        &self.telemetry
    }

    /// Close the current episode and start a new one on a random layout.
    ///
    /// Returns the closed episode's summary if it ran at least one tick.
    pub fn reset<B: Body + ?Sized>(&mut self, body: &mut B) -> Option<EpisodeSummary> {
        let summary = self.close_episode();
        let layout = Layout::random(&mut self.rng, &self.config);
        self.begin(body, &layout);
        summary
    }

    /// Like [`EpisodeManager::reset`] with a caller-supplied layout.
    pub fn reset_with_layout<B: Body + ?Sized>(
        &mut self,
        body: &mut B,
        layout: &Layout,
    ) -> Result<Option<EpisodeSummary>, ConfigError> {
        let quota = self.config.episode.goal_quota;
        if layout.goals.len() < quota as usize {
            return Err(ConfigError::TooFewGoals {
                goals: layout.goals.len(),
                quota,
            });
        }
        if !self.config.arena.contains(layout.agent.x, layout.agent.y) {
            return Err(ConfigError::OutsideArena("layout agent"));
        }
        let summary = self.close_episode();
        self.begin(body, layout);
        Ok(summary)
    }

    /// Report the current episode without starting another.
    /// A still-running episode ends as `Interrupted`.
    pub fn finish(&mut self) -> Option<EpisodeSummary> {
        if self.stats.step_count > 0 && self.is_running() {
            self.terminate(EndReason::Interrupted);
        }
        self.close_episode()
    }

    /// Snapshot of the current episode's statistics.
    pub fn summary(&self) -> EpisodeSummary {
        let reason = match self.phase {
            EpisodePhase::Terminated(reason) => reason,
            EpisodePhase::Running => EndReason::Interrupted,
        };
        EpisodeSummary {
            episode: self.episode,
            length: self.stats.step_count,
            goals_reached: self.stats.goals_reached,
            path_efficiency: self.stats.path_efficiency(),
            shortest_path: self.stats.shortest_path_estimate,
            distance_traveled: self.stats.distance_traveled,
            cumulative_reward: self.reward.cumulative(),
            ground_collision: self.stats.ground_collision,
            reason,
        }
    }

    /// Process one decision tick: drive the controller, shape reward and
    /// check termination. Returns `None` once the episode has ended.
    pub fn on_tick<B: Body + ?Sized>(&mut self, action: Action, body: &mut B) -> Option<TickReport> {
        if !self.is_running() {
            return None;
        }

        let agent = body.state();
        self.stats.step_count += 1;

        let (next, command) = control(self.controller, action, &agent, &self.config.controller);
        self.controller = next;
        body.apply_force(command.force);
        body.apply_torque(command.torque);

        let shaped = self.reward.tick(agent.rotation);
        let mut reward = shaped.reward;

        self.stats.distance_traveled += agent.position.distance(self.last_position);
        self.last_position = agent.position;

        let mut ended = None;
        if !self.config.arena.contains(agent.position.x, agent.position.y) {
            reward += self.reward.boundary_violation();
            ended = Some(EndReason::OutOfBounds);
        } else if self.config.episode.max_steps > 0
            && self.stats.step_count >= self.config.episode.max_steps
        {
            ended = Some(EndReason::Timeout);
        }

        self.telemetry.record(Metric::AngleStability, shaped.upright_score);
        let grounded = if self.stats.ground_collision { 1.0 } else { 0.0 };
        self.telemetry.record(Metric::GroundCollision, grounded);
        self.telemetry.record(Metric::Reward, self.reward.cumulative());
        self.telemetry
            .record(Metric::TargetsFound, self.stats.goals_reached as f32);
        self.feedback.hum_pitch(hum_pitch(agent.speed()));

        if let Some(reason) = ended {
            self.terminate(reason);
        }

        Some(TickReport {
            step: self.stats.step_count,
            reward,
            upright_score: shaped.upright_score,
            command,
            ended,
        })
    }

    /// Handle a contact reported by the collision notifier.
    ///
    /// Ignored (returns `None`) after termination and for goals that are
    /// unknown or already consumed.
    pub fn on_collision<B: Body + ?Sized>(
        &mut self,
        event: CollisionEvent,
        body: &B,
    ) -> Option<CollisionReport> {
        if !self.is_running() {
            tracing::debug!(?event, "collision after episode end ignored");
            return None;
        }

        match event {
            CollisionEvent::Ground => {
                self.stats.ground_collision = true;
                let reward = self.reward.ground_contact();
                Some(CollisionReport {
                    reward,
                    goal: None,
                    on_target: false,
                    ended: None,
                })
            }
            CollisionEvent::Goal(index) => self.goal_contact(index, body.position()),
        }
    }

    fn goal_contact(&mut self, index: usize, position: Vec2) -> Option<CollisionReport> {
        if !self.registry.deactivate(index) {
            tracing::warn!(index, "contact with unknown or consumed goal ignored");
            return None;
        }

        let on_target = self.target == Some(index);
        self.stats.goals_reached += 1;
        let reward = self.reward.goal_reached(on_target);
        self.feedback.goal_reached(index);
        self.plan.retain(|&g| g != index);

        let mut ended = None;
        if self.stats.goals_reached >= self.config.episode.goal_quota {
            ended = Some(EndReason::GoalQuota);
            self.target = None;
            self.terminate(EndReason::GoalQuota);
        } else {
            self.retarget(position, on_target);
        }

        Some(CollisionReport {
            reward,
            goal: Some(index),
            on_target,
            ended,
        })
    }

    /// Pick the nearest active goal from `position`. After an off-target
    /// contact, or when the new target is not the head of the remaining plan,
    /// the baseline grows by the hop to it and the rest is re-planned
    /// greedily from there.
    fn retarget(&mut self, position: Vec2, on_target: bool) {
        let nearest = self.registry.nearest_active_goal(position);
        debug_assert!(nearest.is_some(), "running episode has no active goal");
        let Some((next, hop)) = nearest else {
            tracing::warn!("running episode has no active goal");
            self.target = None;
            return;
        };

        if !on_target || self.plan.first() != Some(&next) {
            self.stats.shortest_path_estimate += hop;
            let next_pos = self.registry.goals()[next].position;
            let rest = self
                .registry
                .active()
                .filter(|g| g.index != next)
                .map(|g| (g.index, g.position));
            let tour = plan_greedy_tour(next_pos, rest);
            self.plan = std::iter::once(next).chain(tour.order).collect();
            tracing::debug!(
                goal = next,
                hop,
                estimate = self.stats.shortest_path_estimate,
                "target left the plan, baseline extended"
            );
        }
        self.target = Some(next);
    }

    fn terminate(&mut self, reason: EndReason) {
        self.phase = EpisodePhase::Terminated(reason);
        tracing::info!(
            episode = self.episode,
            steps = self.stats.step_count,
            goals = self.stats.goals_reached,
            reward = self.reward.cumulative(),
            ?reason,
            "episode ended"
        );
    }

    /// Emit end-of-episode telemetry once per episode that ran.
    fn close_episode(&mut self) -> Option<EpisodeSummary> {
        if self.stats.step_count == 0 || self.reported {
            return None;
        }
        let summary = self.summary();
        self.telemetry
            .record(Metric::EpisodeLength, summary.length as f32);
        self.telemetry
            .record(Metric::TargetsFound, summary.goals_reached as f32);
        self.telemetry
            .record(Metric::PathEfficiency, summary.path_efficiency);
        self.reported = true;
        Some(summary)
    }

    fn begin<B: Body + ?Sized>(&mut self, body: &mut B, layout: &Layout) {
        if self.reported {
            self.episode += 1;
        }

        body.zero_velocities();
        body.set_rotation(0.0);
        body.set_position(layout.agent);

        self.registry.place(&layout.goals);
        self.registry.reset_all_active();
        self.controller = ControllerState::at_rest(layout.agent.y);
        self.reward.reset();
        self.stats = EpisodeStats::default();
        self.phase = EpisodePhase::Running;
        self.reported = false;
        self.last_position = layout.agent;

        let tour = plan_greedy_tour(
            layout.agent,
            self.registry.active().map(|g| (g.index, g.position)),
        );
        self.stats.shortest_path_estimate = tour.length;
        self.plan = tour.order;
        self.target = self
            .registry
            .nearest_active_goal(layout.agent)
            .map(|(index, _)| index);

        tracing::debug!(
            episode = self.episode,
            goals = self.registry.len(),
            goal = ?self.target,
            baseline = tour.length,
            "episode started"
        );
    }
}
