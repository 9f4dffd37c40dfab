use kickshot_core::engine::movement::{ArrowKeys, MovementMode};
use kickshot_core::engine::{
    FrameInput, GameEvent, KinematicBody, MatchPhase, MatchSession, PassCommand, PlayerSnapshot,
    Score, TeamSide, Vec3,
};
use kickshot_core::replay::{ReplayEventKind, ReplayMode};
use kickshot_core::ArcadeConfig;

const FRAME_MS: f64 = 34.0;

fn quick_config() -> ArcadeConfig {
    let mut cfg = ArcadeConfig::default();
    cfg.rules.intro_duration_ms = 0.0;
    cfg.power_ups.enabled = false;
    cfg
}

struct Harness {
    session: MatchSession,
    body: KinematicBody,
    log: Vec<GameEvent>,
}

impl Harness {
    fn new(cfg: ArcadeConfig) -> Self {
        Self {
            session: MatchSession::new(cfg),
            body: KinematicBody::ball(Vec3::new(4.0, 0.55, 4.0)),
            log: Vec::new(),
        }
    }

    fn tick(&mut self, now: f64, input: &FrameInput) -> Vec<GameEvent> {
        let events = self.session.tick(&mut self.body, input, now);
        self.log.extend(events.iter().cloned());
        events
    }

    fn idle(&mut self, now: f64) -> Vec<GameEvent> {
        self.tick(now, &FrameInput::default())
    }

    /// Kickoff at 0, open play from 300.
    fn into_play(&mut self) {
        self.idle(0.0);
        self.idle(300.0);
        assert_eq!(self.session.phase(), MatchPhase::Playing);
        self.log.clear();
    }

    fn kinds(&self, wanted: &[&str]) -> Vec<&'static str> {
        self.log.iter().map(|e| e.kind()).filter(|k| wanted.contains(k)).collect()
    }
}

fn striker() -> PlayerSnapshot {
    // one unit behind the spot, facing the away goal
    PlayerSnapshot::new("striker", "home", Vec3::new(0.0, 0.0, 1.0), std::f32::consts::PI)
}

fn with_roster(roster: &[PlayerSnapshot]) -> FrameInput {
    FrameInput { roster: roster.to_vec(), ..FrameInput::default() }
}

#[test]
fn kickoff_waits_for_reaction_time() {
    let mut h = Harness::new(quick_config());
    let events = h.idle(0.0);
    assert!(events.contains(&GameEvent::Kickoff { side: TeamSide::Home }));
    assert_eq!(h.session.phase(), MatchPhase::Kickoff);
    assert_eq!(h.body.position, Vec3::new(0.0, 0.55, 0.0));

    h.idle(200.0);
    assert_eq!(h.session.phase(), MatchPhase::Kickoff);
    h.idle(300.0);
    assert_eq!(h.session.phase(), MatchPhase::Playing);
}

#[test]
fn intro_runs_before_kickoff() {
    let mut h = Harness::new(ArcadeConfig::default());
    h.idle(0.0);
    assert_eq!(h.session.phase(), MatchPhase::Intro);
    assert_eq!(h.session.camera_state().mode, kickshot_core::CameraMode::Intro);
    h.idle(2_999.0);
    assert_eq!(h.session.phase(), MatchPhase::Intro);
    h.idle(3_000.0);
    assert_eq!(h.session.phase(), MatchPhase::Kickoff);
}

#[test]
fn dribble_and_perfect_shot() {
    let mut h = Harness::new(quick_config());
    let roster = [striker()];
    h.tick(0.0, &with_roster(&roster));
    h.tick(300.0, &with_roster(&roster));
    // still inside the kickoff lock
    assert!(h.session.possession().is_loose());

    h.tick(400.0, &with_roster(&roster));
    assert_eq!(h.session.possession().player_id.as_deref(), Some("striker"));
    assert!(h.body.position.z < 0.0);

    let press = FrameInput { shoot_pressed: true, ..with_roster(&roster) };
    h.tick(500.0, &press);
    assert!(h.session.charge_state().is_charging);

    let release = FrameInput { shoot_released: true, ..with_roster(&roster) };
    let events = h.tick(1_460.0, &release);
    let shot = events
        .iter()
        .find_map(|e| match e {
            GameEvent::ShotFired { player_id, request, launch, .. } => {
                Some((player_id.clone(), *request, *launch))
            }
            _ => None,
        })
        .expect("shot fired");
    assert_eq!(shot.0, "striker");
    assert!(shot.1.is_perfect);
    assert!(shot.2.direction.z < -0.99);
    assert!(h.body.velocity.z < -14.0);
    assert!(h.body.velocity.y > 0.0);
    assert!(h.session.possession().is_loose());
    assert!(!h.session.charge_state().is_charging);
}

#[test]
fn pass_is_applied_once_per_id() {
    let mut h = Harness::new(quick_config());
    let roster = [striker()];
    h.tick(0.0, &with_roster(&roster));
    h.tick(400.0, &with_roster(&roster));
    assert!(!h.session.possession().is_loose());

    let pass = PassCommand { id: "p1".into(), velocity: Vec3::new(8.0, 0.0, -2.0) };
    let input = FrameInput { pass: Some(pass), ..with_roster(&roster) };
    let first = h.tick(420.0, &input);
    assert!(first
        .iter()
        .any(|e| matches!(e, GameEvent::PassApplied { pass_id, .. } if pass_id == "p1")));
    assert!(h.session.possession().is_loose());
    assert_eq!(h.body.velocity, Vec3::new(8.0, 0.0, -2.0));

    let again = h.tick(440.0, &input);
    assert!(!again.iter().any(|e| matches!(e, GameEvent::PassApplied { .. })));
}

#[test]
fn goal_replay_then_kickoff_to_conceding_side() {
    let mut h = Harness::new(quick_config());
    h.into_play();

    h.body.position = Vec3::new(0.0, 1.0, -31.0);
    let events = h.idle(334.0);
    let goal = GameEvent::Goal { scoring_side: TeamSide::Home, score: Score { home: 1, away: 0 } };
    assert!(events.contains(&goal));
    assert_eq!(h.session.phase(), MatchPhase::GoalScored);
    assert_eq!(h.session.replay_state().mode, ReplayMode::Armed);
    assert_eq!(h.session.replay_state().event_id.as_deref(), Some("goal-1"));

    let mut now = 334.0;
    let mut saw_replay_phase = false;
    for _ in 0..200 {
        now += FRAME_MS;
        h.idle(now);
        if h.session.phase() == MatchPhase::Replay {
            saw_replay_phase = true;
            assert!(h.session.replay_frame().is_some());
        }
        if h.session.phase() == MatchPhase::Kickoff {
            break;
        }
    }

    assert!(saw_replay_phase);
    assert_eq!(
        h.kinds(&["goal", "replay_started", "replay_finished", "kickoff"]),
        vec!["goal", "replay_started", "replay_finished", "kickoff"]
    );
    assert!(h.log.contains(&GameEvent::Kickoff { side: TeamSide::Away }));
    assert_eq!(h.session.score(), Score { home: 1, away: 0 });
    assert_eq!(h.body.position, Vec3::new(0.0, 0.55, 0.0));
}

#[test]
fn skipping_goal_replay_restarts_at_once() {
    let mut h = Harness::new(quick_config());
    h.into_play();
    h.body.position = Vec3::new(0.0, 1.0, 31.0);
    h.idle(334.0);
    assert_eq!(h.session.score(), Score { home: 0, away: 1 });

    let mut now = 334.0;
    while h.session.phase() != MatchPhase::Replay {
        now += FRAME_MS;
        h.idle(now);
        assert!(now < 2_000.0, "replay never started");
    }
    assert!(h.session.replay_state().can_skip);

    let skip = FrameInput { skip_replay: true, ..FrameInput::default() };
    let events = h.tick(now + FRAME_MS, &skip);
    assert!(events.contains(&GameEvent::ReplayFinished));
    assert!(events.contains(&GameEvent::Kickoff { side: TeamSide::Home }));
    assert_eq!(h.session.phase(), MatchPhase::Kickoff);
    assert_eq!(h.session.replay_state().mode, ReplayMode::Cooldown);
}

#[test]
fn goal_without_frames_pauses_then_restarts() {
    let mut cfg = quick_config();
    cfg.schedule.replay_sample_ms = 1.0e9;
    let mut h = Harness::new(cfg);
    h.into_play();

    h.body.position = Vec3::new(1.0, 0.5, -31.0);
    h.idle(334.0);
    assert_eq!(h.session.phase(), MatchPhase::GoalScored);

    // arm timeout finds nothing to play
    h.idle(1_334.0);
    assert_eq!(h.session.replay_state().mode, ReplayMode::Idle);
    assert_eq!(h.session.phase(), MatchPhase::GoalScored);

    let events = h.idle(1_834.0);
    assert!(events.contains(&GameEvent::Kickoff { side: TeamSide::Away }));
    assert!(!h.log.iter().any(|e| matches!(e, GameEvent::ReplayStarted { .. })));
}

#[test]
fn out_of_bounds_restarts_from_centre() {
    let mut h = Harness::new(quick_config());
    h.into_play();
    h.body.position = Vec3::new(22.0, 0.55, 0.0);
    h.body.velocity = Vec3::new(5.0, 0.0, 0.0);

    let events = h.idle(334.0);
    assert_eq!(
        events.iter().map(|e| e.kind()).filter(|k| *k != "camera_updated").collect::<Vec<_>>(),
        vec!["out_of_bounds", "kickoff", "phase_changed"]
    );
    assert_eq!(h.session.phase(), MatchPhase::Kickoff);
    assert_eq!(h.body.position, Vec3::new(0.0, 0.55, 0.0));
    assert_eq!(h.body.velocity, Vec3::zeros());
}

#[test]
fn keeper_save_clears_a_loose_ball() {
    let mut cfg = quick_config();
    cfg.replay.replay_highlights = true;
    let mut h = Harness::new(cfg);
    h.into_play();

    h.body.position = Vec3::new(0.5, 0.55, -27.0);
    h.body.velocity = Vec3::new(0.0, 0.0, -10.0);
    let events = h.idle(350.0);

    assert!(events.iter().any(|e| matches!(e, GameEvent::KeeperSave { side: TeamSide::Away, .. })));
    assert_eq!(h.body.velocity, Vec3::new(-3.5, 6.0, 16.0));
    let replay = h.session.replay_state();
    assert_eq!(replay.mode, ReplayMode::Armed);
    assert_eq!(replay.event_id.as_deref(), Some("save-1"));
    assert_eq!(h.session.camera_state().mode, kickshot_core::CameraMode::Save);
}

#[test]
fn goal_after_save_highlight_still_gets_its_replay() {
    let mut cfg = quick_config();
    cfg.replay.replay_highlights = true;
    let mut h = Harness::new(cfg);
    h.into_play();

    h.body.position = Vec3::new(0.5, 0.55, -27.0);
    h.body.velocity = Vec3::new(0.0, 0.0, -10.0);
    h.idle(350.0);
    assert_eq!(h.session.replay_state().event_id.as_deref(), Some("save-1"));

    // the clearance is beaten and the ball ends up in the net
    h.body.position = Vec3::new(0.0, 1.0, -31.0);
    h.idle(367.0);
    assert_eq!(h.session.phase(), MatchPhase::GoalScored);
    assert_eq!(h.session.replay_state().mode, ReplayMode::Armed);
    assert_eq!(h.session.replay_state().event_id.as_deref(), Some("goal-2"));

    let mut now = 367.0;
    for _ in 0..200 {
        now += FRAME_MS;
        h.idle(now);
        if h.session.phase() == MatchPhase::Kickoff {
            break;
        }
    }
    let started = GameEvent::ReplayStarted {
        event_type: ReplayEventKind::Goal,
        event_id: "goal-2".to_string(),
    };
    assert!(h.log.contains(&started));
    assert_eq!(
        h.kinds(&["keeper_save", "goal", "replay_started", "replay_finished", "kickoff"]),
        vec!["keeper_save", "goal", "replay_started", "replay_finished", "kickoff"]
    );
    assert!(h.log.contains(&GameEvent::Kickoff { side: TeamSide::Away }));
}

#[test]
fn ai_shots_ignore_a_carried_ball() {
    let mut cfg = quick_config();
    // an opponent already in shooting range of the home goal
    cfg.opponent.home_positions = vec![Vec3::new(0.0, 0.0, 22.0)];
    let mut h = Harness::new(cfg);
    let carrier = [PlayerSnapshot::new("striker", "home", Vec3::new(0.0, 0.0, 24.0), 0.0)];
    h.tick(0.0, &with_roster(&carrier));
    h.tick(300.0, &with_roster(&carrier));
    h.body.position = Vec3::new(0.0, 0.55, 25.2);

    h.tick(400.0, &with_roster(&carrier));
    h.tick(450.0, &with_roster(&carrier));
    assert_eq!(h.session.possession().player_id.as_deref(), Some("striker"));
    assert!(!h
        .log
        .iter()
        .any(|e| matches!(e, GameEvent::OpponentShot { .. } | GameEvent::KeeperSave { .. })));
    assert_eq!(h.body.velocity, Vec3::zeros());
}

#[test]
fn match_ends_at_full_time() {
    let mut cfg = quick_config();
    cfg.rules.match_duration_ms = 1_000.0;
    let mut h = Harness::new(cfg);
    let mut now = 0.0;
    while now < 1_000.0 {
        h.idle(now);
        now += 100.0;
    }
    assert_eq!(h.session.phase(), MatchPhase::Playing);

    let events = h.idle(1_000.0);
    let full_time = GameEvent::PhaseChanged { from: MatchPhase::Playing, to: MatchPhase::FullTime };
    assert!(events.contains(&full_time));
    assert!(h.session.scheduler().is_empty());

    h.idle(1_100.0);
    assert_eq!(h.session.phase(), MatchPhase::FullTime);
    assert!((h.session.match_clock_ms() - 1_000.0).abs() < 1e-9);
}

#[test]
fn movement_follows_published_camera() {
    let mut h = Harness::new(quick_config());
    let up = ArrowKeys { up: true, ..ArrowKeys::default() };
    let right = ArrowKeys { right: true, ..ArrowKeys::default() };
    h.idle(0.0);

    let forward = h.session.movement_direction(up);
    assert!((forward - Vec3::new(0.0, 0.0, -1.0)).norm() < 1e-4);
    let side = h.session.movement_direction(right);
    assert!((side - Vec3::new(1.0, 0.0, 0.0)).norm() < 1e-4);

    h.session.set_movement_mode(Some(MovementMode::World));
    let up_right = ArrowKeys { up: true, right: true, ..ArrowKeys::default() };
    let diagonal = h.session.movement_direction(up_right);
    assert!((diagonal.norm() - 1.0).abs() < 1e-5);
    assert!(diagonal.x > 0.0 && diagonal.z < 0.0);
}

fn scripted_run() -> String {
    let mut h = Harness::new(quick_config());
    let roster = [striker()];
    let mut now = 0.0;
    for frame in 0..150 {
        let input = FrameInput {
            shoot_pressed: frame == 20,
            shoot_released: frame == 45,
            ..with_roster(&roster)
        };
        h.tick(now, &input);
        h.body.step((FRAME_MS / 1000.0) as f32);
        now += FRAME_MS;
    }
    serde_json::to_string(&h.log).expect("events serialize")
}

#[test]
fn identical_inputs_give_identical_events() {
    let first = scripted_run();
    assert_eq!(first, scripted_run());
    assert!(first.contains("shot_fired"));
}
