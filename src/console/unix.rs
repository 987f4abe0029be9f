//! Unix console: termios mode switching and `select(2)` polling on stdin.
//!
//! Termination signals are caught with `sigaction` while the session is
//! active and handed back to their previous dispositions on leave.

use std::io;
use std::mem::MaybeUninit;
use std::os::fd::{AsRawFd, RawFd};
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use super::{Console, EXIT_KEY_INTERRUPT, SessionError};

/// Set from the signal handler; read by the main loop.
static SHUTDOWN_REQUESTED: AtomicBool = AtomicBool::new(false);

extern "C" fn request_shutdown(_signal: libc::c_int) {
    SHUTDOWN_REQUESTED.store(true, Ordering::SeqCst);
}

/// Signals that end the session through the normal exit path.
const SHUTDOWN_SIGNALS: [libc::c_int; 3] = [libc::SIGINT, libc::SIGTERM, libc::SIGHUP];

/// A signal paired with the disposition it had before ours was installed.
type SavedHandler = (libc::c_int, libc::sigaction);

/// Route termination signals to the shutdown flag so that the main loop
/// returns normally and the session guard restores the terminal.
///
/// `sa_flags` is 0 (no `SA_RESTART`), so a pending `select` returns EINTR
/// and the loop sees the flag on its next tick. Returns the previous
/// dispositions for `restore_handlers`.
fn install_shutdown_handlers() -> io::Result<Vec<SavedHandler>> {
    let mut previous = Vec::with_capacity(SHUTDOWN_SIGNALS.len());
    for signal in SHUTDOWN_SIGNALS {
        // SAFETY: sigaction is plain data, so all-zero is valid; the handler
        // only stores to an atomic, which is async-signal-safe.
        let installed = unsafe {
            let mut action: libc::sigaction = std::mem::zeroed();
            action.sa_sigaction = request_shutdown as extern "C" fn(libc::c_int) as libc::sighandler_t;
            action.sa_flags = 0;
            libc::sigemptyset(&mut action.sa_mask);
            let mut old: libc::sigaction = std::mem::zeroed();
            (libc::sigaction(signal, &action, &mut old) == 0).then_some(old)
        };

        match installed {
            Some(old) => previous.push((signal, old)),
            None => {
                let err = io::Error::last_os_error();
                restore_handlers(&previous);
                return Err(err);
            }
        }
    }
    Ok(previous)
}

/// Put back dispositions saved by `install_shutdown_handlers`.
fn restore_handlers(previous: &[SavedHandler]) {
    for (signal, action) in previous.iter().rev() {
        // SAFETY: `action` was filled in by a successful sigaction call.
        unsafe {
            libc::sigaction(*signal, action, std::ptr::null_mut());
        }
    }
}

/// Standard input switched into cbreak-style raw mode via termios.
///
/// Canonical mode, echo and signal generation are turned off, so Ctrl+C
/// arrives as byte 0x03 and ends the session through the normal exit
/// path instead of killing the process with the mode still changed.
pub struct TermiosConsole {
    fd: RawFd,
    saved: Option<libc::termios>,
    handlers: Vec<SavedHandler>,
}

impl TermiosConsole {
    /// Console on the process's standard input.
    pub fn stdin() -> Self {
        Self::from_fd(io::stdin().as_raw_fd())
    }

    /// Console reading from an arbitrary descriptor. The caller keeps it open.
    pub(crate) fn from_fd(fd: RawFd) -> Self {
        TermiosConsole {
            fd,
            saved: None,
            handlers: Vec::new(),
        }
    }

    fn read_mode(&self) -> io::Result<libc::termios> {
        let mut state = MaybeUninit::<libc::termios>::uninit();
        // SAFETY: tcgetattr fully initialises `state` when it returns 0.
        if unsafe { libc::tcgetattr(self.fd, state.as_mut_ptr()) } != 0 {
            return Err(io::Error::last_os_error());
        }
        Ok(unsafe { state.assume_init() })
    }

    fn write_mode(&self, state: &libc::termios) -> io::Result<()> {
        // SAFETY: `state` points to a valid termios for the duration of the call.
        if unsafe { libc::tcsetattr(self.fd, libc::TCSANOW, state) } != 0 {
            return Err(io::Error::last_os_error());
        }
        Ok(())
    }
}

/// Derive the raw configuration from the saved one.
fn raw_mode(saved: &libc::termios) -> libc::termios {
    let mut raw = *saved;
    raw.c_lflag &= !(libc::ICANON | libc::ECHO | libc::ISIG);
    raw.c_cc[libc::VMIN] = 0;
    raw.c_cc[libc::VTIME] = 0;
    raw
}

impl Console for TermiosConsole {
    fn enter(&mut self) -> Result<(), SessionError> {
        // SAFETY: isatty only inspects the descriptor.
        if unsafe { libc::isatty(self.fd) } != 1 {
            return Err(SessionError::NotATerminal);
        }

        let saved = match self.read_mode() {
            Ok(saved) => saved,
            Err(e) if e.raw_os_error() == Some(libc::ENOTTY) => {
                return Err(SessionError::NotATerminal);
            }
            Err(e) => return Err(SessionError::Io(e)),
        };

        self.write_mode(&raw_mode(&saved))?;
        match install_shutdown_handlers() {
            Ok(handlers) => self.handlers = handlers,
            Err(e) => {
                let _ = self.write_mode(&saved);
                return Err(SessionError::Io(e));
            }
        }
        self.saved = Some(saved);
        Ok(())
    }

    fn leave(&mut self) -> io::Result<()> {
        restore_handlers(&std::mem::take(&mut self.handlers));
        match self.saved.take() {
            Some(saved) => self.write_mode(&saved),
            None => Ok(()),
        }
    }

    fn poll(&mut self, timeout: Duration) -> io::Result<bool> {
        // SAFETY: fd_set is plain data; FD_ZERO/FD_SET only touch `readable`.
        let mut readable: libc::fd_set = unsafe { std::mem::zeroed() };
        unsafe {
            libc::FD_ZERO(&mut readable);
            libc::FD_SET(self.fd, &mut readable);
        }

        let mut tv = libc::timeval {
            tv_sec: timeout.as_secs() as libc::time_t,
            tv_usec: timeout.subsec_micros() as libc::suseconds_t,
        };

        // SAFETY: all pointers are to live locals; null sets are allowed.
        let ready = unsafe {
            libc::select(
                self.fd + 1,
                &mut readable,
                std::ptr::null_mut(),
                std::ptr::null_mut(),
                &mut tv,
            )
        };

        if ready < 0 {
            let err = io::Error::last_os_error();
            return if err.kind() == io::ErrorKind::Interrupted {
                Ok(false)
            } else {
                Err(err)
            };
        }

        Ok(ready > 0 && unsafe { libc::FD_ISSET(self.fd, &readable) })
    }

    fn read_byte(&mut self) -> io::Result<Option<u8>> {
        // VMIN=0 keeps a tty read from blocking, but other descriptors need
        // the readiness check
        if !self.poll(Duration::ZERO)? {
            return Ok(None);
        }
        let mut byte = 0u8;
        // SAFETY: reads at most one byte into a live local.
        let n = unsafe { libc::read(self.fd, (&raw mut byte).cast::<libc::c_void>(), 1) };

        match n {
            1 => Ok(Some(byte)),
            0 => Ok(None),
            _ => {
                let err = io::Error::last_os_error();
                match err.kind() {
                    io::ErrorKind::WouldBlock | io::ErrorKind::Interrupted => Ok(None),
                    _ => Err(err),
                }
            }
        }
    }

    fn exit_key(&self) -> u8 {
        EXIT_KEY_INTERRUPT
    }

    fn interrupted(&self) -> bool {
        SHUTDOWN_REQUESTED.load(Ordering::SeqCst)
    }
}

impl std::fmt::Debug for TermiosConsole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TermiosConsole")
            .field("fd", &self.fd)
            .field("raw", &self.saved.is_some())
            .field("handlers", &self.handlers.len())
            .finish()
    }
}

// ============================================================================
// TESTS
// ============================================================================
