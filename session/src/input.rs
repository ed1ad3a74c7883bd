use std::io;

use escape_maze_core::Direction;

use crate::RoundSummary;

/// Keys the game reacts to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Key {
    /// Arrow up.
    Up,
    /// Arrow down.
    Down,
    /// Arrow left.
    Left,
    /// Arrow right.
    Right,
    /// Enter or return.
    Enter,
    /// Escape.
    Escape,
    /// Backspace.
    Backspace,
    /// Printable character.
    Char(char),
    /// Any key without a meaning in the game.
    Other,
}

/// Key together with the modifier state at the time it was pressed.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct KeyPress {
    /// Pressed key.
    pub key: Key,
    /// Whether shift was held.
    pub shift: bool,
}

impl KeyPress {
    /// Key pressed without modifiers.
    #[must_use]
    pub const fn new(key: Key) -> Self {
        Self { key, shift: false }
    }

    /// Key pressed while holding shift.
    #[must_use]
    pub const fn shifted(key: Key) -> Self {
        Self { key, shift: true }
    }

    /// Direction bound to the key, either an arrow or one of WASD.
    #[must_use]
    pub const fn direction(&self) -> Option<Direction> {
        match self.key {
            Key::Up | Key::Char('w' | 'W') => Some(Direction::North),
            Key::Down | Key::Char('s' | 'S') => Some(Direction::South),
            Key::Left | Key::Char('a' | 'A') => Some(Direction::West),
            Key::Right | Key::Char('d' | 'D') => Some(Direction::East),
            _ => None,
        }
    }
}

/// Blocking source of player input.
pub trait InputSource {
    /// Waits until a key is pressed.
    fn wait_for_key_press(&mut self) -> io::Result<KeyPress>;

    /// Called once per finished round, before the next one is generated.
    ///
    /// Interactive frontends use it to show the round summary and wait for
    /// acknowledgement.
    fn round_finished(&mut self, _summary: &RoundSummary) -> io::Result<()> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wasd_and_arrows_share_directions() {
        assert_eq!(KeyPress::new(Key::Up).direction(), Some(Direction::North));
        assert_eq!(
            KeyPress::shifted(Key::Char('W')).direction(),
            Some(Direction::North)
        );
        assert_eq!(
            KeyPress::new(Key::Char('a')).direction(),
            Some(Direction::West)
        );
        assert_eq!(KeyPress::new(Key::Enter).direction(), None);
        assert_eq!(KeyPress::new(Key::Char('q')).direction(), None);
    }
}
