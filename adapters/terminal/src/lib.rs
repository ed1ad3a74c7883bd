#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! crossterm backends for the render, input and audio collaborators.

mod canvas;
mod keys;

use std::io::{self, Write};

use crossterm::{
    cursor::{Hide, Show},
    execute,
    style::ResetColor,
    terminal::{self, Clear, ClearType, EnterAlternateScreen, LeaveAlternateScreen},
};
use escape_maze_core::{AudioCue, BackgroundCue};
use escape_maze_session::AudioSink;
use tracing::{debug, error, trace};

pub use canvas::{terminal_color, TerminalCanvas};
pub use keys::{key_press, TerminalKeys};

/// Raw mode and alternate screen, restored on drop.
#[derive(Debug)]
pub struct TerminalGuard {
    _private: (),
}

impl TerminalGuard {
    /// Switches the terminal into game mode.
    pub fn enter() -> io::Result<Self> {
        terminal::enable_raw_mode()?;
        execute!(io::stdout(), EnterAlternateScreen, Hide, Clear(ClearType::All))?;
        Ok(Self { _private: () })
    }
}

impl Drop for TerminalGuard {
    fn drop(&mut self) {
        restore_terminal();
    }
}

/// Leaves game mode. Safe to call more than once.
pub fn restore_terminal() {
    if let Err(err) = execute!(io::stdout(), ResetColor, Show, LeaveAlternateScreen) {
        error!(%err, "failed to leave the alternate screen");
    }
    if let Err(err) = terminal::disable_raw_mode() {
        error!(%err, "failed to disable raw mode");
    }
}

/// Audio sink for terminals: rings the bell on bad news, logs everything else.
#[derive(Clone, Copy, Debug, Default)]
pub struct BellAudio;

impl AudioSink for BellAudio {
    fn play(&mut self, cue: AudioCue) {
        match cue {
            AudioCue::WallCollision | AudioCue::Failure => {
                let mut out = io::stdout();
                if let Err(err) = out.write_all(b"\x07").and_then(|()| out.flush()) {
                    debug!(%err, "failed to ring the bell");
                }
            }
            _ => trace!(?cue, "audio cue"),
        }
    }

    fn play_looping(&mut self, cue: BackgroundCue) {
        debug!(?cue, "background loop started");
    }

    fn stop(&mut self) {
        trace!("background loop stopped");
    }
}
