use std::{
    io,
    sync::{Arc, Mutex, MutexGuard, PoisonError},
};

use escape_maze_core::{AudioCue, BackgroundCue, Command, Event};
use escape_maze_rendering::{self as rendering, Canvas, HudState, Segment, LOW_HEARTS, LOW_TIME};
use escape_maze_world::{self as world, query, World};

use crate::audio::AudioSink;

/// Everything the main loop and the round clock both touch.
///
/// Every mutation goes through [`Stage::apply`], so the canvas always
/// reflects the world once the lock is released.
pub struct Stage {
    world: World,
    canvas: Box<dyn Canvas + Send>,
    audio: Box<dyn AudioSink + Send>,
    max_rounds: u32,
    debug_seed: Option<u64>,
    background: Option<BackgroundCue>,
}

impl Stage {
    /// Creates a stage around a fresh world.
    #[must_use]
    pub fn new(
        world: World,
        canvas: Box<dyn Canvas + Send>,
        audio: Box<dyn AudioSink + Send>,
        max_rounds: u32,
        debug_seed: Option<u64>,
    ) -> Self {
        Self {
            world,
            canvas,
            audio,
            max_rounds,
            debug_seed,
            background: None,
        }
    }

    /// Read-only view of the world.
    #[must_use]
    pub fn world(&self) -> &World {
        &self.world
    }

    /// Applies `commands` in order and draws what they changed.
    pub fn apply(&mut self, commands: Vec<Command>) -> io::Result<Vec<Event>> {
        let mut events = Vec::new();
        for command in commands {
            world::apply(&mut self.world, command, &mut events);
        }
        rendering::draw_events(&self.world, &events, self.canvas.as_mut())?;
        Ok(events)
    }

    /// Redraws the heads-up display.
    pub fn draw_hud(&mut self) -> io::Result<()> {
        let hud = HudState::capture(&self.world, self.max_rounds, self.debug_seed);
        rendering::draw_hud(&hud, self.canvas.as_mut())
    }

    /// Writes a line of text below the maze.
    pub fn show_note(&mut self, segments: &[Segment]) -> io::Result<()> {
        let row = query::grid(&self.world).height;
        self.canvas.clear_line(row)?;
        self.canvas.write_line(row, segments)?;
        self.canvas.flush()
    }

    /// Takes one second off the round clock and refreshes what depends on it.
    pub fn elapse_second(&mut self) -> io::Result<()> {
        let events = self.apply(vec![Command::ElapseSecond])?;
        if events.is_empty() {
            return Ok(());
        }
        self.draw_hud()?;
        self.update_background();
        Ok(())
    }

    /// Plays a one-shot effect.
    pub fn play(&mut self, cue: AudioCue) {
        self.audio.play(cue);
    }

    /// Stops any background loop.
    pub fn stop_audio(&mut self) {
        self.audio.stop();
        self.background = None;
    }

    fn update_background(&mut self) {
        let vars = query::variables(&self.world);
        let wanted = if vars.time_left() <= LOW_TIME {
            Some(BackgroundCue::RunningOutOfTime)
        } else if vars.hearts() <= LOW_HEARTS {
            Some(BackgroundCue::LowOnHearts)
        } else {
            None
        };
        if wanted == self.background {
            return;
        }
        match wanted {
            Some(cue) => self.audio.play_looping(cue),
            None => self.audio.stop(),
        }
        self.background = wanted;
    }
}

/// Shared handle to the stage.
#[derive(Clone)]
pub struct StageHandle(Arc<Mutex<Stage>>);

impl StageHandle {
    /// Wraps a stage for sharing with the round clock.
    #[must_use]
    pub fn new(stage: Stage) -> Self {
        Self(Arc::new(Mutex::new(stage)))
    }

    /// Locks the stage.
    ///
    /// A panic while holding the lock leaves the world consistent, since every
    /// command is applied atomically, so poisoning is ignored.
    pub fn lock(&self) -> MutexGuard<'_, Stage> {
        self.0.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
