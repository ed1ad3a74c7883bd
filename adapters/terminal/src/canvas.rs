use std::io::{self, Stdout, Write};

use crossterm::{
    cursor::MoveTo,
    queue,
    style::{self, Print, ResetColor, SetForegroundColor},
    terminal::{Clear, ClearType},
};
use escape_maze_core::{Color, Position};
use escape_maze_rendering::{Canvas, Segment};

/// Maps a game color onto the terminal palette.
#[must_use]
pub const fn terminal_color(color: Color) -> style::Color {
    match color {
        Color::Black => style::Color::Black,
        Color::DarkBlue => style::Color::DarkBlue,
        Color::DarkGreen => style::Color::DarkGreen,
        Color::DarkCyan => style::Color::DarkCyan,
        Color::DarkRed => style::Color::DarkRed,
        Color::DarkMagenta => style::Color::DarkMagenta,
        Color::DarkYellow => style::Color::DarkYellow,
        Color::Gray => style::Color::Grey,
        Color::DarkGray => style::Color::DarkGrey,
        Color::Blue => style::Color::Blue,
        Color::Green => style::Color::Green,
        Color::Cyan => style::Color::Cyan,
        Color::Red => style::Color::Red,
        Color::Magenta => style::Color::Magenta,
        Color::Yellow => style::Color::Yellow,
        Color::White => style::Color::White,
    }
}

fn coordinate(value: u32) -> u16 {
    u16::try_from(value).unwrap_or(u16::MAX)
}

/// Canvas writing escape sequences to a terminal.
///
/// Output is queued until [`Canvas::flush`].
#[derive(Debug)]
pub struct TerminalCanvas<W: Write = Stdout> {
    out: W,
}

impl TerminalCanvas<Stdout> {
    /// Canvas on standard output.
    #[must_use]
    pub fn stdout() -> Self {
        Self::new(io::stdout())
    }
}

impl<W: Write> TerminalCanvas<W> {
    /// Canvas on an arbitrary writer.
    pub fn new(out: W) -> Self {
        Self { out }
    }

    /// Blanks the whole screen.
    pub fn clear_screen(&mut self) -> io::Result<()> {
        queue!(self.out, ResetColor, Clear(ClearType::All), MoveTo(0, 0))
    }

    /// Returns the writer.
    pub fn into_inner(self) -> W {
        self.out
    }
}

impl<W: Write> Canvas for TerminalCanvas<W> {
    fn draw_glyph(&mut self, glyph: char, position: Position, color: Color) -> io::Result<()> {
        queue!(
            self.out,
            MoveTo(coordinate(position.column()), coordinate(position.row())),
            SetForegroundColor(terminal_color(color)),
            Print(glyph),
            ResetColor
        )
    }

    fn clear(&mut self, position: Position) -> io::Result<()> {
        queue!(
            self.out,
            MoveTo(coordinate(position.column()), coordinate(position.row())),
            Print(' ')
        )
    }

    fn clear_line(&mut self, row: u32) -> io::Result<()> {
        queue!(
            self.out,
            MoveTo(0, coordinate(row)),
            Clear(ClearType::CurrentLine)
        )
    }

    fn write_line(&mut self, row: u32, segments: &[Segment]) -> io::Result<()> {
        queue!(self.out, MoveTo(0, coordinate(row)))?;
        for segment in segments {
            queue!(
                self.out,
                SetForegroundColor(terminal_color(segment.color)),
                Print(&segment.text)
            )?;
        }
        queue!(self.out, ResetColor)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.out.flush()
    }
}
