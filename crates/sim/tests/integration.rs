use glam::Vec2;
use hoverseek_shared::*;
use hoverseek_sim::analyzer::analyze;
use hoverseek_sim::{
    control, run_episode, run_episodes, Body, ControllerState, DoNothingPolicy, EpisodeManager,
    EpisodePhase, Layout, MemorySink, NoopSink, PointBody, SeekerPolicy,
};
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg64;

fn five_goal_layout() -> Layout {
    Layout {
        agent: Vec2::ZERO,
        goals: vec![
            Vec2::new(2.0, 0.0),
            Vec2::new(-3.0, 1.0),
            Vec2::new(5.0, 4.0),
            Vec2::new(-6.0, 6.0),
            Vec2::new(1.0, -2.5),
        ],
    }
}

fn manager_with(layout: &Layout) -> (EpisodeManager, PointBody) {
    let config = SimConfig::default();
    let mut body = PointBody::from_config(&config);
    let mut mgr = EpisodeManager::new(config, 0).unwrap();
    mgr.reset_with_layout(&mut body, layout).unwrap();
    (mgr, body)
}

#[test]
fn test_five_on_target_contacts_end_episode() {
    let layout = five_goal_layout();
    let (mut mgr, mut body) = manager_with(&layout);

    for n in 1..=5 {
        let target = mgr.target().expect("running episode has a target");
        body.set_position(layout.goals[target]);
        let report = mgr
            .on_collision(CollisionEvent::Goal(target), &body)
            .unwrap();
        assert!(report.on_target, "contact {} should be on target", n);
        assert_eq!(mgr.stats().goals_reached, n);
    }

    assert!(
        (mgr.cumulative_reward() - 10.0).abs() < 1e-5,
        "expected 5 x {} goal reward, got {}",
        ON_TARGET_BONUS,
        mgr.cumulative_reward()
    );
    assert_eq!(mgr.phase(), EpisodePhase::Terminated(EndReason::GoalQuota));
    assert!(mgr.on_tick(Action::none(), &mut body).is_none());
}

#[test]
fn test_leaving_the_arena_ends_the_tick() {
    let (mut mgr, mut body) = manager_with(&five_goal_layout());

    for _ in 0..10 {
        let report = mgr.on_tick(Action::none(), &mut body).unwrap();
        assert!(report.ended.is_none());
        body.integrate(DT);
    }

    body.position.y = 9.0;
    let before = mgr.cumulative_reward();
    let report = mgr.on_tick(Action::none(), &mut body).unwrap();
    assert_eq!(report.ended, Some(EndReason::OutOfBounds));
    assert!(
        (report.reward - (-BOUNDARY_PENALTY - STEP_PENALTY)).abs() < 1e-6,
        "tick reward {} should carry the boundary penalty",
        report.reward
    );
    assert!((mgr.cumulative_reward() - before - report.reward).abs() < 1e-5);
    assert_eq!(mgr.stats().step_count, 11);

    for _ in 0..5 {
        assert!(mgr.on_tick(Action::none(), &mut body).is_none());
    }
    assert_eq!(mgr.stats().step_count, 11);

    mgr.reset(&mut body);
    assert_eq!(mgr.phase(), EpisodePhase::Running);
    assert!(mgr.on_tick(Action::none(), &mut body).is_some());
}

#[test]
fn test_reset_after_progress_restores_fresh_episode() {
    let layout = five_goal_layout();
    let (mut mgr, mut body) = manager_with(&layout);

    for _ in 0..3 {
        mgr.on_tick(Action::none(), &mut body);
        body.integrate(DT);
    }
    mgr.on_collision(CollisionEvent::Ground, &body).unwrap();
    for _ in 0..2 {
        let target = mgr.target().expect("running episode has a target");
        body.set_position(layout.goals[target]);
        assert!(mgr.on_collision(CollisionEvent::Goal(target), &body).unwrap().on_target);
    }
    assert_eq!(mgr.stats().goals_reached, 2);
    assert_eq!(mgr.registry().active_count(), layout.goals.len() - 2);
    assert!(mgr.stats().ground_collision);

    let closed = mgr.reset(&mut body).expect("episode with ticks is reported");
    assert_eq!(closed.goals_reached, 2);
    assert!(closed.ground_collision);

    assert_eq!(mgr.phase(), EpisodePhase::Running);
    assert_eq!(mgr.stats().goals_reached, 0);
    assert_eq!(mgr.stats().step_count, 0);
    assert_eq!(mgr.registry().active_count(), GOAL_COUNT);
    assert!(!mgr.stats().ground_collision);
    assert_eq!(mgr.cumulative_reward(), 0.0);
    assert_eq!(mgr.planned_route().len(), GOAL_COUNT);
    assert!(mgr.target().is_some());
}

#[test]
fn test_single_up_converges_on_new_setpoint() {
    // Mass chosen so the ascend gains are critically damped.
    let mut config = SimConfig::default();
    config.body.mass = 0.3125;
    config.body.linear_damping = 0.0;
    let mut body = PointBody::from_config(&config);
    let mut mgr = EpisodeManager::new(config, 0).unwrap();
    mgr.reset_with_layout(&mut body, &five_goal_layout()).unwrap();

    let start = body.position.y;
    mgr.on_tick(Action::new(MotionAction::Up, RotationAction::None), &mut body);
    body.integrate(DT);
    let target = mgr.controller().target_altitude;
    assert!((target - (start + MOVE_STEP)).abs() < 1e-6);

    let mut prev = (target - body.position.y).abs();
    for tick in 0..400 {
        mgr.on_tick(Action::none(), &mut body);
        body.integrate(DT);
        assert_eq!(mgr.controller().target_altitude, target, "setpoint moved at tick {}", tick);
        let err = (target - body.position.y).abs();
        assert!(
            err <= prev + 1e-5,
            "altitude error grew at tick {}: {} -> {}",
            tick,
            prev,
            err
        );
        prev = err;
    }
    assert!(prev < 1e-2, "altitude error {} did not converge", prev);
}

#[test]
fn test_orientation_wrap_uses_short_way() {
    let cfg = ControllerConfig {
        rotation_step: 2.0,
        ..Default::default()
    };
    let state = ControllerState {
        target_orientation: 179.0,
        ..ControllerState::at_rest(0.0)
    };
    let agent = AgentState {
        rotation: 179.0,
        ..Default::default()
    };
    let action = Action::new(MotionAction::None, RotationAction::Positive);
    let (next, cmd) = control(state, action, &agent, &cfg);

    assert!((next.target_orientation - (-179.0)).abs() < 1e-4);
    assert!(
        (cmd.torque - 2.0 * cfg.torque_kp).abs() < 1e-4,
        "torque {} should follow a 2 degree delta",
        cmd.torque
    );
}

#[test]
fn test_held_rotation_keeps_angles_normalized() {
    let (mut mgr, mut body) = manager_with(&five_goal_layout());
    let action = Action::new(MotionAction::None, RotationAction::Positive);
    for _ in 0..100 {
        let report = mgr.on_tick(action, &mut body).unwrap();
        let bound = 180.0 * TORQUE_KP + body.angular_velocity.abs() * TORQUE_KD;
        assert!(report.command.torque.abs() <= bound + 1e-3);
        body.integrate(DT);
        let c = mgr.controller();
        assert!(c.target_orientation > -180.0 && c.target_orientation <= 180.0);
        assert!(body.rotation > -180.0 && body.rotation <= 180.0);
    }
}

#[test]
fn test_goals_reached_monotone_and_bounded() {
    let mut rng = Pcg64::seed_from_u64(99);
    for round in 0..20 {
        let config = SimConfig::default();
        let mut body = PointBody::from_config(&config);
        let mut mgr = EpisodeManager::new(config, round).unwrap();
        mgr.reset(&mut body);

        let mut last = 0;
        for _ in 0..40 {
            let event = if rng.gen_bool(0.2) {
                CollisionEvent::Ground
            } else {
                CollisionEvent::Goal(rng.gen_range(0..GOAL_COUNT + 2))
            };
            mgr.on_collision(event, &body);
            if rng.gen_bool(0.5) {
                mgr.on_tick(Action::from_raw([rng.gen_range(-1..6), rng.gen_range(-1..4)]), &mut body);
            }

            let reached = mgr.stats().goals_reached;
            assert!(reached >= last, "goals_reached went backwards");
            assert!(reached as usize <= GOAL_COUNT);
            assert!(reached <= GOAL_QUOTA);
            assert_eq!(
                reached as usize,
                GOAL_COUNT - mgr.registry().active_count(),
                "every reached goal is consumed exactly once"
            );
            if mgr.is_running() {
                assert!(mgr.target().is_some());
            }
            last = reached;
        }
    }
}

#[test]
fn test_same_seed_same_replay() {
    let config = SimConfig::default();
    let a = run_episode(&config, 1234, &mut SeekerPolicy::new(), NoopSink).unwrap();
    let b = run_episode(&config, 1234, &mut SeekerPolicy::new(), NoopSink).unwrap();
    assert_eq!(
        serde_json::to_string(&a).unwrap(),
        serde_json::to_string(&b).unwrap()
    );

    let c = run_episode(&config, 1235, &mut SeekerPolicy::new(), NoopSink).unwrap();
    assert_ne!(a.goals[0].x, c.goals[0].x);
}

#[test]
fn test_replay_json_round_trip() {
    let mut config = SimConfig::default();
    config.episode.max_steps = 300;
    let replay = run_episode(&config, 5, &mut SeekerPolicy::new(), NoopSink).unwrap();

    let json = serde_json::to_string(&replay).unwrap();
    let back: Replay = serde_json::from_str(&json).unwrap();
    assert_eq!(back.seed, 5);
    assert_eq!(back.policy, "seeker");
    assert_eq!(back.frames.len(), replay.frames.len());
    assert_eq!(back.summary.length, replay.summary.length);
    assert_eq!(back.summary.reason, replay.summary.reason);
}

#[test]
fn test_seeker_stays_in_bounds_and_scores() {
    let config = SimConfig::default();
    let mut sink = MemorySink::default();
    let summaries = run_episodes(&config, 7, 4, &mut SeekerPolicy::new(), &mut sink).unwrap();
    assert_eq!(summaries.len(), 4);

    for s in &summaries {
        assert!(s.length <= MAX_STEPS);
        assert!(s.goals_reached <= GOAL_QUOTA);
        assert!(s.path_efficiency >= 0.0);
        assert!(s.distance_traveled >= 0.0);
    }

    let analysis = analyze(&summaries, GOAL_QUOTA);
    assert_eq!(analysis.episodes, 4);
    assert!((0.0..=100.0).contains(&analysis.success_rate));
    assert_eq!(sink.values(Metric::PathEfficiency).len(), 4);
}

#[test]
fn test_idle_policy_only_pays_step_penalty() {
    let mut config = SimConfig::default();
    config.episode.max_steps = 50;
    let replay = run_episode(&config, 3, &mut DoNothingPolicy, NoopSink).unwrap();
    let s = &replay.summary;
    assert_eq!(s.reason, EndReason::Timeout);
    assert!(!s.ground_collision, "idle agent hovers above the floor");
    if s.goals_reached == 0 {
        assert!(
            (s.cumulative_reward + 50.0 * STEP_PENALTY).abs() < 1e-4,
            "reward {}",
            s.cumulative_reward
        );
    }
}
