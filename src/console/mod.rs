//! Raw terminal input: mode switching and non-blocking keystroke polling.
//!
//! The rest of the crate programs against [`Console`] only. Two concrete
//! consoles exist:
//! - `unix`: termios via libc, readiness via `select(2)`
//! - `portable`: crossterm raw mode and event polling (used on Windows)
//!
//! [`TerminalSession`] is the scoped owner of a console in raw mode: the
//! saved mode is restored exactly once, whether the session ends through
//! [`TerminalSession::leave`], an early `?` return, or a panic unwinding
//! through the caller.

use std::fmt;
use std::io;
use std::time::Duration;

pub mod portable;
#[cfg(unix)]
pub mod unix;

pub use portable::CrosstermConsole;
#[cfg(unix)]
pub use unix::TermiosConsole;

/// The console used by the binary on this platform.
#[cfg(unix)]
pub type PlatformConsole = TermiosConsole;

#[cfg(not(unix))]
pub type PlatformConsole = CrosstermConsole;

/// Interrupt byte (Ctrl+C): the exit key on Unix terminals.
pub const EXIT_KEY_INTERRUPT: u8 = 0x03;

/// Escape byte: the exit key on Windows consoles.
pub const EXIT_KEY_ESCAPE: u8 = 0x1b;

// ============================================================================
// CAPABILITY
// ============================================================================

/// A terminal that can be switched into raw mode and polled for bytes.
pub trait Console {
    /// Capture the current mode and switch to unbuffered, unechoed input.
    ///
    /// # Errors
    /// `NotATerminal` if standard input is not an interactive device.
    fn enter(&mut self) -> Result<(), SessionError>;

    /// Restore the mode captured by `enter`.
    fn leave(&mut self) -> io::Result<()>;

    /// Wait at most `timeout` for input to become available.
    fn poll(&mut self, timeout: Duration) -> io::Result<bool>;

    /// Consume one byte if one is available. Never blocks.
    fn read_byte(&mut self) -> io::Result<Option<u8>>;

    /// The byte that ends the session.
    fn exit_key(&self) -> u8;

    /// Whether the OS asked the process to stop (SIGTERM and friends).
    fn interrupted(&self) -> bool {
        false
    }
}

// ============================================================================
// ERRORS
// ============================================================================

/// Failure to set up the interactive session.
#[derive(Debug)]
pub enum SessionError {
    /// Standard input is not a terminal; there is no non-interactive mode.
    NotATerminal,

    /// The terminal refused a mode change.
    Io(io::Error),
}

impl fmt::Display for SessionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SessionError::NotATerminal => {
                write!(f, "Standard input is not a terminal (hackertyper needs an interactive console)")
            }
            SessionError::Io(e) => write!(f, "Could not configure terminal: {}", e),
        }
    }
}

impl std::error::Error for SessionError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            SessionError::NotATerminal => None,
            SessionError::Io(e) => Some(e),
        }
    }
}

impl From<io::Error> for SessionError {
    fn from(e: io::Error) -> Self {
        SessionError::Io(e)
    }
}

// ============================================================================
// SESSION
// ============================================================================

/// A console held in raw mode for the lifetime of this value.
#[derive(Debug)]
pub struct TerminalSession<C: Console> {
    console: C,
    active: bool,
}

impl<C: Console> TerminalSession<C> {
    /// Switch `console` into raw mode.
    ///
    /// On failure nothing needs restoring and the console is dropped.
    pub fn enter(mut console: C) -> Result<Self, SessionError> {
        console.enter()?;
        tracing::debug!("terminal session entered");
        Ok(TerminalSession {
            console,
            active: true,
        })
    }

    pub fn poll(&mut self, timeout: Duration) -> io::Result<bool> {
        self.console.poll(timeout)
    }

    pub fn read_byte(&mut self) -> io::Result<Option<u8>> {
        self.console.read_byte()
    }

    pub fn exit_key(&self) -> u8 {
        self.console.exit_key()
    }

    pub fn interrupted(&self) -> bool {
        self.console.interrupted()
    }

    /// Restore the terminal now and report whether that worked.
    pub fn leave(mut self) -> io::Result<()> {
        self.restore()
    }

    fn restore(&mut self) -> io::Result<()> {
        if !self.active {
            return Ok(());
        }
        self.active = false;
        tracing::debug!("terminal session left");
        self.console.leave()
    }
}

impl<C: Console> Drop for TerminalSession<C> {
    fn drop(&mut self) {
        if let Err(e) = self.restore() {
            tracing::warn!(error = %e, "failed to restore terminal mode");
        }
    }
}

// ============================================================================
// TEST SUPPORT
// ============================================================================


// ============================================================================
// TESTS
// ============================================================================
