//! Keyboard handling outside of the maze itself.

use std::io;

use escape_maze_rendering::Canvas;
use escape_maze_session::{InputSource, Key, KeyPress, RoundSummary};
use escape_maze_terminal::{TerminalCanvas, TerminalKeys};

use crate::screens::{self, Page};

/// Terminal keyboard plus the pages shown between rounds.
#[derive(Debug, Default)]
pub(crate) struct Console {
    keys: TerminalKeys,
}

impl Console {
    pub(crate) fn show(&mut self, page: &Page) -> io::Result<()> {
        page.draw(&mut TerminalCanvas::stdout())
    }

    pub(crate) fn clear(&mut self) -> io::Result<()> {
        let mut canvas = TerminalCanvas::stdout();
        canvas.clear_screen()?;
        canvas.flush()
    }

    pub(crate) fn key(&mut self) -> io::Result<KeyPress> {
        self.keys.wait_for_key_press()
    }

    pub(crate) fn wait_for_enter(&mut self) -> io::Result<()> {
        while self.key()?.key != Key::Enter {}
        Ok(())
    }

    /// Reads a line of at most `limit` characters, redrawing `page` after
    /// every keystroke. Escape cancels.
    pub(crate) fn read_line(
        &mut self,
        page: impl Fn(&str) -> Page,
        limit: usize,
    ) -> io::Result<Option<String>> {
        let mut typed = String::new();
        loop {
            self.show(&page(&typed))?;
            match self.key()?.key {
                Key::Enter => return Ok(Some(typed)),
                Key::Escape => return Ok(None),
                Key::Backspace => {
                    let _ = typed.pop();
                }
                Key::Char(c) if !c.is_control() && typed.chars().count() < limit => {
                    typed.push(c);
                }
                _ => {}
            }
        }
    }
}

impl InputSource for Console {
    fn wait_for_key_press(&mut self) -> io::Result<KeyPress> {
        self.key()
    }

    fn round_finished(&mut self, summary: &RoundSummary) -> io::Result<()> {
        self.show(&screens::round_summary(summary))?;
        self.wait_for_enter()?;
        self.clear()
    }
}
