//! Kickshot CLI
//!
//! Headless driver for the gameplay core: scripted matches, config checks
//! and preset dumps.

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use kickshot_core::engine::movement::ArrowKeys;
use kickshot_core::engine::types::{planar_distance, planar_normalize, yaw_towards};
use kickshot_core::engine::{
    EventBus, FrameInput, GameEvent, KinematicBody, MatchPhase, MatchSession, PhysicsBody,
    PlayerSnapshot, Score, Vec3,
};
use kickshot_core::ArcadeConfig;
use serde::Serialize;
use std::cell::RefCell;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::rc::Rc;

#[derive(Parser)]
#[command(name = "kickshot")]
#[command(version = kickshot_core::VERSION)]
#[command(about = "Drive the kickshot gameplay core without a renderer", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a scripted match and print a JSON summary
    Simulate {
        /// Preset name (casual, standard, pro); defaults to KICKSHOT_PROFILE
        #[arg(long)]
        preset: Option<String>,

        /// Config file (.json / .yaml) overriding the preset
        #[arg(long)]
        config: Option<PathBuf>,

        /// Simulated match time to run, in milliseconds
        #[arg(long, default_value = "30000")]
        duration_ms: f64,

        /// Host frame rate
        #[arg(long, default_value = "60")]
        fps: u32,

        /// Write every event as a JSON array
        #[arg(long)]
        events: Option<PathBuf>,
    },

    /// Validate a config file
    CheckConfig {
        path: PathBuf,
    },

    /// Print a preset's full config
    DumpConfig {
        #[arg(long, default_value = "standard")]
        preset: String,

        #[arg(long, value_enum, default_value = "yaml")]
        format: DumpFormat,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum DumpFormat {
    Json,
    Yaml,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::filter::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match cli.command {
        Commands::Simulate { preset, config, duration_ms, fps, events } => {
            let cfg = resolve_config(preset.as_deref(), config.as_deref())?;
            if fps == 0 || !duration_ms.is_finite() || duration_ms <= 0.0 {
                bail!("fps and duration must be positive");
            }
            let (summary, log) = simulate(cfg, duration_ms, fps);
            println!("{}", serde_json::to_string_pretty(&summary)?);
            if let Some(path) = events {
                std::fs::write(&path, serde_json::to_string_pretty(&log)?)
                    .with_context(|| format!("writing events to {}", path.display()))?;
                tracing::info!(path = %path.display(), count = log.len(), "events written");
            }
        }

        Commands::CheckConfig { path } => {
            let cfg = ArcadeConfig::load(&path)
                .with_context(|| format!("loading {}", path.display()))?;
            println!("✅ {} is valid", path.display());
            println!("   Difficulty reaction: {}ms", cfg.difficulty.reaction_ms);
            println!("   Match length:        {}s", cfg.rules.match_duration_ms / 1000.0);
        }

        Commands::DumpConfig { preset, format } => {
            let Some(cfg) = ArcadeConfig::for_profile(&preset) else {
                bail!("unknown preset '{}' (expected casual, standard or pro)", preset);
            };
            let text = match format {
                DumpFormat::Json => cfg.to_json_pretty()?,
                DumpFormat::Yaml => cfg.to_yaml()?,
            };
            println!("{}", text);
        }
    }

    Ok(())
}

fn resolve_config(preset: Option<&str>, path: Option<&Path>) -> Result<ArcadeConfig> {
    if let Some(path) = path {
        return ArcadeConfig::load(path).with_context(|| format!("loading {}", path.display()));
    }
    match preset {
        Some(name) => ArcadeConfig::for_profile(name)
            .with_context(|| format!("unknown preset '{}'", name)),
        None => Ok(ArcadeConfig::from_env_or_default()),
    }
}

#[derive(Debug, Serialize)]
struct SimulationSummary {
    frames: u64,
    simulated_ms: f64,
    match_clock_ms: f64,
    phase: MatchPhase,
    score: Score,
    events: BTreeMap<&'static str, usize>,
}

/// One home striker: runs onto the ball, dribbles at the away goal and
/// shoots from the edge of the box.
struct ScriptedStriker {
    player: PlayerSnapshot,
    charge_started_ms: Option<f64>,
}

const STRIKER_SPEED: f32 = 7.5;
const SHOOT_FROM_Z: f32 = -14.0;
const HOLD_MS: f64 = 960.0;

impl ScriptedStriker {
    fn new() -> Self {
        Self { player: Self::kickoff_spot(), charge_started_ms: None }
    }

    fn kickoff_spot() -> PlayerSnapshot {
        PlayerSnapshot::new("striker", "home", Vec3::new(0.0, 0.0, 2.0), std::f32::consts::PI)
    }

    fn plan(&mut self, session: &MatchSession, ball: Vec3, now_ms: f64, dt_s: f32) -> FrameInput {
        let mut input = FrameInput::default();
        if !matches!(session.phase(), MatchPhase::Kickoff | MatchPhase::Playing) {
            input.roster = vec![self.player.clone()];
            return input;
        }

        let possessed = session.possession().player_id.as_deref() == Some(self.player.id.as_str());
        let heading = if possessed {
            Some(session.movement_direction(ArrowKeys { up: true, ..ArrowKeys::default() }))
        } else if planar_distance(&self.player.position, &ball) > 0.9 {
            planar_normalize(&(ball - self.player.position))
        } else {
            None
        };
        if let Some(dir) = heading {
            let next = self.player.position + dir * STRIKER_SPEED * dt_s;
            if let Some(yaw) = yaw_towards(&self.player.position, &next) {
                self.player.yaw = yaw;
            }
            self.player.position = next;
        }

        match self.charge_started_ms {
            None if possessed && self.player.position.z < SHOOT_FROM_Z => {
                input.shoot_pressed = true;
                self.charge_started_ms = Some(now_ms);
            }
            Some(started) if !possessed || now_ms - started >= HOLD_MS => {
                input.shoot_released = true;
                self.charge_started_ms = None;
            }
            _ => {}
        }
        input.roster = vec![self.player.clone()];
        input
    }

    fn observe(&mut self, events: &[GameEvent]) {
        if events.iter().any(|e| matches!(e, GameEvent::Kickoff { .. })) {
            self.player = Self::kickoff_spot();
            self.charge_started_ms = None;
        }
    }
}

fn simulate(cfg: ArcadeConfig, duration_ms: f64, fps: u32) -> (SimulationSummary, Vec<GameEvent>) {
    let frame_ms = 1000.0 / fps as f64;
    let dt_s = (frame_ms / 1000.0) as f32;
    let mut body = KinematicBody::ball(Vec3::new(0.0, cfg.rules.kickoff_ball_height, 0.0));
    let mut session = MatchSession::new(cfg);
    let mut striker = ScriptedStriker::new();

    let tally: Rc<RefCell<BTreeMap<&'static str, usize>>> = Rc::default();
    let log: Rc<RefCell<Vec<GameEvent>>> = Rc::default();
    let mut bus = EventBus::new();
    let counts = tally.clone();
    bus.subscribe(move |e| *counts.borrow_mut().entry(e.kind()).or_default() += 1);
    let sink = log.clone();
    bus.subscribe(move |e| sink.borrow_mut().push(e.clone()));
    bus.subscribe(|e| {
        if let GameEvent::Goal { scoring_side, score } = e {
            tracing::info!(?scoring_side, home = score.home, away = score.away, "goal");
        }
    });

    let mut frames = 0u64;
    let mut now = 0.0;
    while now <= duration_ms {
        let input = striker.plan(&session, body.position(), now, dt_s);
        let events = session.tick(&mut body, &input, now);
        striker.observe(&events);
        bus.dispatch(&events);
        frames += 1;
        if session.phase() == MatchPhase::FullTime {
            break;
        }
        body.step(dt_s);
        now += frame_ms;
    }
    session.disable();

    let summary = SimulationSummary {
        frames,
        simulated_ms: now,
        match_clock_ms: session.match_clock_ms(),
        phase: session.phase(),
        score: session.score(),
        events: tally.borrow().clone(),
    };
    tracing::info!(
        frames,
        home = summary.score.home,
        away = summary.score.away,
        "simulation finished"
    );
    let events = log.borrow().clone();
    (summary, events)
}
