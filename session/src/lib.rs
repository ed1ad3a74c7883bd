#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Session orchestration for Escape the Maze.
//!
//! A [`Session`] plays up to the configured number of rounds for one profile.
//! The main loop and the [`IntervalClock`] thread share the world through a
//! single [`StageHandle`] lock; neither holds it while waiting.

mod audio;
mod clock;
mod input;
mod stage;

use std::{
    io,
    time::{Duration, Instant},
};

use escape_maze_core::{
    AudioCue, Color, Command, EntityKind, Event, GameConfig, RoundOutcome, RoundState, Upgrade,
};
use escape_maze_random::SpatialRandom;
use escape_maze_rendering::{Canvas, Segment};
use escape_maze_system_generation::{GenerationError, Generator, LayoutBuilder};
use escape_maze_system_progression::{settle, Profile, SessionOutcome, Settlement};
use escape_maze_system_rules::{MoveInput, RoundMachine, Tick};
use escape_maze_world::{query, World};
use thiserror::Error;
use tracing::{debug, info};

pub use audio::{AudioSink, SilentAudio};
pub use clock::{IntervalClock, ManualClock, RoundClock};
pub use input::{InputSource, Key, KeyPress};
pub use stage::{Stage, StageHandle};

/// Hint printed below the maze on a profile's first round.
pub const FIRST_PLAY_TIP: &str = "Plan your movements and press a navigation key (WASD or Arrow keys) once you're ready to start. Good luck!";

/// Failures that abort a session.
#[derive(Debug, Error)]
pub enum SessionError {
    /// A round could not be generated.
    #[error(transparent)]
    Generation(#[from] GenerationError),
    /// Input or drawing failed, or the player interrupted the game.
    #[error(transparent)]
    Io(#[from] io::Error),
}

/// State of a round when it ended.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RoundSummary {
    /// One-based round number.
    pub round: u32,
    /// How the round ended.
    pub outcome: RoundOutcome,
    /// Hearts left.
    pub hearts: u32,
    /// Session score so far.
    pub score: u32,
    /// Cash collected so far.
    pub balance: u32,
    /// Time the round clock ran during the round.
    pub elapsed: Duration,
}

/// Result of a finished session.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SessionReport {
    /// Rounds played.
    pub rounds: u32,
    /// Totals fed into the settlement.
    pub outcome: SessionOutcome,
    /// Changes applied to the profile.
    pub settlement: Settlement,
}

#[derive(Debug, Default)]
struct Stopwatch {
    accumulated: Duration,
    running_since: Option<Instant>,
}

impl Stopwatch {
    fn start(&mut self) {
        if self.running_since.is_none() {
            self.running_since = Some(Instant::now());
        }
    }

    fn stop(&mut self) {
        if let Some(since) = self.running_since.take() {
            self.accumulated += since.elapsed();
        }
    }

    fn total(&self) -> Duration {
        self.accumulated + self.running_since.map_or(Duration::ZERO, |since| since.elapsed())
    }
}

/// Runs the rounds of one play session.
pub struct Session {
    config: GameConfig,
    machine: RoundMachine,
    layout: Box<dyn LayoutBuilder + Send>,
    random: SpatialRandom,
    stage: StageHandle,
}

impl Session {
    /// Validates `config` and prepares a session drawing on `canvas`.
    ///
    /// With `debug` set the HUD shows the player position, the distance to
    /// the exit and `seed`.
    pub fn new(
        config: GameConfig,
        seed: u64,
        debug: bool,
        canvas: Box<dyn Canvas + Send>,
        audio: Box<dyn AudioSink + Send>,
    ) -> Result<Self, SessionError> {
        let generator = Generator::new(&config)?;
        let world = World::new(config.grid.clone());
        let stage = Stage::new(
            world,
            canvas,
            audio,
            config.scoring.max_rounds,
            debug.then_some(seed),
        );
        Ok(Self {
            machine: RoundMachine::new(config.scoring.clone()),
            layout: Box::new(generator),
            random: SpatialRandom::new(seed, config.grid.clone()),
            stage: StageHandle::new(stage),
            config,
        })
    }

    /// Replaces the procedural generator.
    #[must_use]
    pub fn with_layout_builder(mut self, layout: Box<dyn LayoutBuilder + Send>) -> Self {
        self.layout = layout;
        self
    }

    /// Handle to the shared stage, for the round clock.
    #[must_use]
    pub fn stage(&self) -> StageHandle {
        self.stage.clone()
    }

    /// Seed of the random source.
    #[must_use]
    pub fn seed(&self) -> u64 {
        self.random.seed()
    }

    /// Plays rounds until one fails or the last one succeeds, then settles
    /// the session on `profile`.
    pub fn run(
        &mut self,
        profile: &mut Profile,
        input: &mut dyn InputSource,
        clock: &mut dyn RoundClock,
    ) -> Result<SessionReport, SessionError> {
        info!(
            seed = self.random.seed(),
            user = profile.username(),
            rules = ?profile.rules(),
            "session started"
        );
        let first_play = !profile.has_ever_played();
        let _ = self.stage.lock().apply(vec![Command::BeginSession {
            hearts: profile.rules().max_hearts,
            armor: profile.armor(),
        }])?;

        let mut elapsed = Stopwatch::default();
        let mut rounds = 0;
        let mut final_state = RoundState::Ongoing;
        while rounds < self.config.scoring.max_rounds {
            let summary = self.play_round(profile, input, clock, first_play && rounds == 0, &mut elapsed)?;
            rounds += 1;
            final_state = summary.outcome.state();
            info!(
                round = summary.round,
                outcome = ?summary.outcome,
                score = summary.score,
                balance = summary.balance,
                "round finished"
            );
            input.round_finished(&summary)?;
            if final_state == RoundState::Failure {
                break;
            }
        }

        let outcome = {
            let stage = self.stage.lock();
            let vars = query::variables(stage.world());
            SessionOutcome {
                final_state,
                score: vars.score(),
                balance: vars.balance(),
                armor: vars.armor(),
                elapsed: elapsed.total(),
            }
        };
        let settlement = settle(profile, &outcome, &self.config.scoring);
        info!(
            rounds,
            score = outcome.score,
            credited = settlement.credited,
            bonus = settlement.bonus,
            new_top_score = settlement.new_top_score,
            "session settled"
        );
        Ok(SessionReport {
            rounds,
            outcome,
            settlement,
        })
    }

    fn play_round(
        &mut self,
        profile: &mut Profile,
        input: &mut dyn InputSource,
        clock: &mut dyn RoundClock,
        show_tip: bool,
        total: &mut Stopwatch,
    ) -> Result<RoundSummary, SessionError> {
        let wall_color = self
            .random
            .choose(&self.config.wall_palette)
            .unwrap_or(EntityKind::Wall.default_color());
        let mut commands = vec![Command::ResetRound {
            time_limit: profile.rules().round_duration,
            wall_color,
        }];
        let layout = self.layout.build(&mut self.random, &mut commands)?;

        let round = {
            let mut stage = self.stage.lock();
            let _ = stage.apply(commands)?;
            stage.draw_hud()?;
            if show_tip {
                stage.show_note(&[Segment::new(FIRST_PLAY_TIP, Color::Gray)])?;
            }
            query::round(stage.world())
        };
        debug!(round, player = %layout.player, exit = %layout.exit_point, "round generated");

        let mut watch = Stopwatch::default();
        let mut started = false;
        let outcome = loop {
            let press = input.wait_for_key_press()?;
            let Some(direction) = press.direction() else {
                continue;
            };
            if !started {
                clock.resume();
                watch.start();
                total.start();
                started = true;
            }

            let rules = profile.rules().clone();
            let mut stage = self.stage.lock();
            let mut commands = Vec::new();
            let tick = self.machine.handle(
                stage.world(),
                MoveInput {
                    direction,
                    jump: press.shift,
                },
                &rules,
                &mut self.random,
                &mut commands,
            );
            let Tick::Resolved(step) = tick else {
                continue;
            };

            stage.play(if step.leapt {
                AudioCue::BootsOfLeaping
            } else {
                AudioCue::Footstep
            });
            let events = stage.apply(commands)?;
            if let Some(cue) = step.collision.and_then(AudioCue::for_collision) {
                stage.play(cue);
            }
            if events.contains(&Event::ArmorConsumed { remaining: 0 }) {
                let _ = profile.remove_upgrade(Upgrade::ArmorPoints);
            }
            stage.draw_hud()?;

            let ended = events.iter().find_map(|event| match event {
                Event::RoundEnded { outcome } => Some(*outcome),
                _ => None,
            });
            if let Some(outcome) = ended {
                break outcome;
            }
        };

        clock.pause();
        watch.stop();
        total.stop();

        let mut stage = self.stage.lock();
        stage.stop_audio();
        if matches!(outcome, RoundOutcome::Failed(_)) {
            stage.play(AudioCue::Failure);
        }
        let vars = query::variables(stage.world());
        Ok(RoundSummary {
            round,
            outcome,
            hearts: vars.hearts(),
            score: vars.score(),
            balance: vars.balance(),
            elapsed: watch.total(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stopwatch_only_counts_while_running() {
        let mut watch = Stopwatch::default();
        assert_eq!(watch.total(), Duration::ZERO);

        watch.start();
        watch.stop();
        let first = watch.total();
        std::thread::sleep(Duration::from_millis(5));
        assert_eq!(watch.total(), first);

        watch.start();
        std::thread::sleep(Duration::from_millis(5));
        assert!(watch.total() >= first + Duration::from_millis(5));
    }
}
