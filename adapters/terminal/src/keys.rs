use std::io;

use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use escape_maze_session::{InputSource, Key, KeyPress};

/// Translates a crossterm key event.
#[must_use]
pub fn key_press(event: &KeyEvent) -> KeyPress {
    let key = match event.code {
        KeyCode::Up => Key::Up,
        KeyCode::Down => Key::Down,
        KeyCode::Left => Key::Left,
        KeyCode::Right => Key::Right,
        KeyCode::Enter => Key::Enter,
        KeyCode::Esc => Key::Escape,
        KeyCode::Backspace => Key::Backspace,
        KeyCode::Char(c) => Key::Char(c),
        _ => Key::Other,
    };
    KeyPress {
        key,
        shift: event.modifiers.contains(KeyModifiers::SHIFT),
    }
}

fn is_interrupt(event: &KeyEvent) -> bool {
    event.modifiers.contains(KeyModifiers::CONTROL)
        && matches!(event.code, KeyCode::Char('c' | 'C'))
}

/// Keyboard of the terminal in raw mode.
///
/// Ctrl+C surfaces as an [`io::ErrorKind::Interrupted`] error.
#[derive(Clone, Copy, Debug, Default)]
pub struct TerminalKeys;

impl InputSource for TerminalKeys {
    fn wait_for_key_press(&mut self) -> io::Result<KeyPress> {
        loop {
            let Event::Key(event) = event::read()? else {
                continue;
            };
            if event.kind == KeyEventKind::Release {
                continue;
            }
            if is_interrupt(&event) {
                return Err(io::Error::new(io::ErrorKind::Interrupted, "interrupted by Ctrl+C"));
            }
            return Ok(key_press(&event));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn shift_is_the_jump_modifier() {
        let press = key_press(&KeyEvent::new(KeyCode::Char('D'), KeyModifiers::SHIFT));
        assert_eq!(press, KeyPress::shifted(Key::Char('D')));

        let arrow = key_press(&KeyEvent::new(KeyCode::Left, KeyModifiers::NONE));
        assert_eq!(arrow, KeyPress::new(Key::Left));
    }

    #[test]
    fn ctrl_c_interrupts() {
        assert!(is_interrupt(&KeyEvent::new(
            KeyCode::Char('c'),
            KeyModifiers::CONTROL
        )));
        assert!(!is_interrupt(&KeyEvent::new(
            KeyCode::Char('c'),
            KeyModifiers::NONE
        )));
    }
}
