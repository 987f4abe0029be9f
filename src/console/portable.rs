//! Portable console on top of crossterm's raw mode and event queue.
//!
//! Used where termios is unavailable. Key events are folded back into
//! single bytes so the main loop sees the same input on every platform.

use std::io::{self, IsTerminal};
use std::time::Duration;

use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use crossterm::terminal::{disable_raw_mode, enable_raw_mode};

use super::{Console, EXIT_KEY_ESCAPE, SessionError};

/// Byte reported for keys that have no byte of their own (arrows, F-keys).
pub const UNMAPPED_KEY: u8 = 0x00;

#[derive(Debug, Default)]
pub struct CrosstermConsole {
    raw: bool,
}

impl CrosstermConsole {
    pub fn new() -> Self {
        Self::default()
    }
}

/// Fold a key event into the byte a classic console would have delivered.
pub fn key_to_byte(key: KeyEvent) -> u8 {
    match key.code {
        KeyCode::Char(c) if key.modifiers.contains(KeyModifiers::CONTROL) && c.is_ascii_alphabetic() => {
            c.to_ascii_lowercase() as u8 & 0x1f
        }
        KeyCode::Char(c) if c.is_ascii() => c as u8,
        // Non-ASCII characters still count as a keystroke
        KeyCode::Char(_) => b'?',
        KeyCode::Esc => EXIT_KEY_ESCAPE,
        KeyCode::Enter => b'\r',
        KeyCode::Tab => b'\t',
        KeyCode::Backspace => 0x7f,
        _ => UNMAPPED_KEY,
    }
}

impl Console for CrosstermConsole {
    fn enter(&mut self) -> Result<(), SessionError> {
        if !io::stdin().is_terminal() {
            return Err(SessionError::NotATerminal);
        }
        enable_raw_mode()?;
        self.raw = true;
        Ok(())
    }

    fn leave(&mut self) -> io::Result<()> {
        if self.raw {
            self.raw = false;
            disable_raw_mode()?;
        }
        Ok(())
    }

    fn poll(&mut self, timeout: Duration) -> io::Result<bool> {
        event::poll(timeout)
    }

    fn read_byte(&mut self) -> io::Result<Option<u8>> {
        if !event::poll(Duration::ZERO)? {
            return Ok(None);
        }
        match event::read()? {
            Event::Key(key) if key.kind != KeyEventKind::Release => Ok(Some(key_to_byte(key))),
            // Releases, resizes, focus and mouse events are not keystrokes
            _ => Ok(None),
        }
    }

    fn exit_key(&self) -> u8 {
        EXIT_KEY_ESCAPE
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    #[test]
    fn escape_is_the_exit_key() {
        assert_eq!(key_to_byte(key(KeyCode::Esc)), CrosstermConsole::new().exit_key());
    }

    #[test]
    fn ctrl_c_maps_to_interrupt_byte() {
        let ctrl_c = KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL);
        assert_eq!(key_to_byte(ctrl_c), 0x03);
    }

    #[test]
    fn ctrl_letters_map_to_control_codes() {
        let ctrl_a = KeyEvent::new(KeyCode::Char('a'), KeyModifiers::CONTROL);
        let ctrl_z = KeyEvent::new(KeyCode::Char('Z'), KeyModifiers::CONTROL | KeyModifiers::SHIFT);
        assert_eq!(key_to_byte(ctrl_a), 0x01);
        assert_eq!(key_to_byte(ctrl_z), 0x1a);
    }

    #[test]
    fn ascii_characters_pass_through() {
        assert_eq!(key_to_byte(key(KeyCode::Char('x'))), b'x');
        assert_eq!(key_to_byte(key(KeyCode::Char(' '))), b' ');
        let shifted = KeyEvent::new(KeyCode::Char('Q'), KeyModifiers::SHIFT);
        assert_eq!(key_to_byte(shifted), b'Q');
    }

    #[test]
    fn editing_keys_map_to_classic_bytes() {
        assert_eq!(key_to_byte(key(KeyCode::Enter)), b'\r');
        assert_eq!(key_to_byte(key(KeyCode::Tab)), b'\t');
        assert_eq!(key_to_byte(key(KeyCode::Backspace)), 0x7f);
    }

    #[test]
    fn other_keys_still_count_as_keystrokes() {
        for code in [KeyCode::Up, KeyCode::F(5), KeyCode::Home] {
            let byte = key_to_byte(key(code));
            assert_eq!(byte, UNMAPPED_KEY);
            assert_ne!(byte, EXIT_KEY_ESCAPE);
        }
        assert_eq!(key_to_byte(key(KeyCode::Char('é'))), b'?');
    }

    #[test]
    fn leave_without_enter_is_a_noop() {
        let mut console = CrosstermConsole::new();
        assert!(console.leave().is_ok());
    }
}
