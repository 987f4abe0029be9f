//! TUI effects boundary: the polling loop and terminal teardown.
//!
//! This is the only module in `tui` with side effects. It wires the pure
//! layers (state, update, view) to a raw-mode console and a ratatui
//! terminal.
//!
//! Scheduling is cooperative busy-polling: every tick waits at most
//! `poll_timeout` for a byte, handles it, advances any animation, then
//! sleeps `tick`. The loop never blocks on input, so shutdown requests
//! are noticed within one tick.

use std::fmt;
use std::io;
use std::thread;
use std::time::Duration;

use rand::Rng;
use ratatui::Terminal;
use ratatui::backend::Backend;
use ratatui::layout::Position;

use crate::console::{Console, TerminalSession};

use super::state::App;
use super::update::{on_keystroke, on_tick};
use super::view::{render, screen_lines};

// ============================================================================
// CONFIGURATION
// ============================================================================

/// Timing of the polling loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoopConfig {
    /// Longest wait for input per tick.
    pub poll_timeout: Duration,
    /// Sleep between ticks.
    pub tick: Duration,
}

impl Default for LoopConfig {
    fn default() -> Self {
        Self {
            poll_timeout: Duration::from_millis(1),
            tick: Duration::from_millis(10),
        }
    }
}

impl LoopConfig {
    /// No waiting at all; for driving the loop from scripted input.
    pub fn immediate() -> Self {
        Self {
            poll_timeout: Duration::ZERO,
            tick: Duration::ZERO,
        }
    }
}

// ============================================================================
// OUTCOME
// ============================================================================

/// Why the loop ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Exit {
    /// The user pressed the exit key.
    ExitKey,
    /// The OS asked the process to stop.
    Interrupted,
}

/// Failure inside the loop. The terminal mode is restored regardless.
#[derive(Debug)]
pub enum RunError {
    /// Polling or reading the console failed.
    Input(io::Error),
    /// Drawing to the screen failed.
    Render(String),
    /// Restoring the terminal mode failed.
    Restore(io::Error),
}

impl fmt::Display for RunError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RunError::Input(e) => write!(f, "Failed to read keyboard input: {}", e),
            RunError::Render(e) => write!(f, "Failed to draw screen: {}", e),
            RunError::Restore(e) => write!(f, "Failed to restore terminal: {}", e),
        }
    }
}

impl std::error::Error for RunError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            RunError::Input(e) | RunError::Restore(e) => Some(e),
            RunError::Render(_) => None,
        }
    }
}

fn render_error(e: impl fmt::Display) -> RunError {
    RunError::Render(e.to_string())
}

// ============================================================================
// EVENT LOOP
// ============================================================================

/// Run the interactive session until the exit key or a shutdown request.
///
/// Takes ownership of the session: it is left on the normal path, and the
/// guard restores the terminal on every early return.
pub fn run<C, B, R>(
    mut session: TerminalSession<C>,
    terminal: &mut Terminal<B>,
    app: &mut App,
    rng: &mut R,
    config: &LoopConfig,
) -> Result<Exit, RunError>
where
    C: Console,
    B: Backend,
    R: Rng,
{
    redraw(terminal, app)?;
    let exit_key = session.exit_key();

    let exit = loop {
        if session.interrupted() {
            tracing::info!("shutdown requested");
            break Exit::Interrupted;
        }

        if session.poll(config.poll_timeout).map_err(RunError::Input)? {
            if let Some(byte) = session.read_byte().map_err(RunError::Input)? {
                if byte == exit_key {
                    break Exit::ExitKey;
                }
                on_keystroke(app, rng);
                redraw(terminal, app)?;
            }
        }

        if on_tick(app) {
            terminal.draw(|frame| render(app, frame)).map_err(render_error)?;
        }

        if !config.tick.is_zero() {
            thread::sleep(config.tick);
        }
    };

    tracing::info!(?exit, keystrokes = app.keystrokes, "session finished");
    terminal.clear().map_err(render_error)?;
    session.leave().map_err(RunError::Restore)?;
    Ok(exit)
}

/// Show the boot banner and prompt, then park the cursor on the line
/// below so the loading bar prints underneath.
pub fn show_banner<B: Backend>(terminal: &mut Terminal<B>, app: &App) -> Result<(), RunError> {
    redraw(terminal, app)?;

    let size = terminal.size().map_err(render_error)?;
    let rows = u16::try_from(screen_lines(app, usize::from(size.width)).len()).unwrap_or(u16::MAX);
    let below = rows.min(size.height.saturating_sub(1));
    terminal.set_cursor_position(Position::new(0, below)).map_err(render_error)?;
    Ok(())
}

/// Full-screen refresh: clear, then draw the current state.
fn redraw<B: Backend>(terminal: &mut Terminal<B>, app: &App) -> Result<(), RunError> {
    terminal.clear().map_err(render_error)?;
    terminal.draw(|frame| render(app, frame)).map_err(render_error)?;
    Ok(())
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::console::scripted::{ScriptedConsole, Step};
    use crate::reveal::RevealEngine;
    use crate::tui::state::{InterludePolicy, Interlude};
    use crate::types::{ChunkSize, Payload};
    use rand::SeedableRng;
    use rand::rngs::StdRng;
    use ratatui::backend::TestBackend;

    fn app_with(text: &str, chunk: i64, policy: InterludePolicy) -> App {
        let engine = RevealEngine::from_text(text, ChunkSize::new(chunk)).unwrap();
        App::new(engine, Payload::new("hackertext1.txt", text.len() as u64), policy)
    }

    fn terminal() -> Terminal<TestBackend> {
        Terminal::new(TestBackend::new(60, 16)).unwrap()
    }

    fn screen(terminal: &Terminal<TestBackend>) -> String {
        let buffer = terminal.backend().buffer();
        let symbols: Vec<&str> = buffer.content.iter().map(|c| c.symbol()).collect();
        symbols
            .chunks(usize::from(buffer.area.width))
            .map(|row| row.concat().trim_end().to_string())
            .collect::<Vec<_>>()
            .join("\n")
    }

    fn run_script(console: ScriptedConsole, app: &mut App, terminal: &mut Terminal<TestBackend>) -> Result<Exit, RunError> {
        let session = TerminalSession::enter(console).unwrap();
        let mut rng = StdRng::seed_from_u64(1);
        run(session, terminal, app, &mut rng, &LoopConfig::immediate())
    }

    #[test]
    fn exit_key_ends_loop_and_restores_once() {
        let (console, calls) = ScriptedConsole::typing(b"");
        let mut app = app_with("ABCDEFGHIJ", 5, InterludePolicy::disabled());

        let exit = run_script(console, &mut app, &mut terminal()).unwrap();

        assert_eq!(exit, Exit::ExitKey);
        assert_eq!(calls.enters.get(), 1);
        assert_eq!(calls.leaves.get(), 1);
        assert_eq!(app.keystrokes, 0);
    }

    #[test]
    fn each_keystroke_advances_reveal() {
        let (console, _calls) = ScriptedConsole::typing(b"xyz");
        let mut app = app_with("ABCDEFGHIJKLMNOPQRST", 5, InterludePolicy::disabled());

        run_script(console, &mut app, &mut terminal()).unwrap();

        assert_eq!(app.keystrokes, 3);
        assert_eq!(app.engine.revealed(), "ABCDEFGHIJKLMNO");
    }

    #[test]
    fn idle_ticks_do_not_advance() {
        let (console, _calls) = ScriptedConsole::new([
            Step::Idle,
            Step::Byte(b'a'),
            Step::Idle,
            Step::Idle,
            Step::Byte(0x03),
        ]);
        let mut app = app_with("ABCDEFGHIJ", 2, InterludePolicy::disabled());

        run_script(console, &mut app, &mut terminal()).unwrap();

        assert_eq!(app.keystrokes, 1);
        assert_eq!(app.engine.revealed(), "AB");
    }

    #[test]
    fn wraparound_across_keystrokes() {
        let (console, _calls) = ScriptedConsole::typing(b"abc");
        let mut app = app_with("ABCDEFGHIJ", 5, InterludePolicy::disabled());

        run_script(console, &mut app, &mut terminal()).unwrap();

        assert_eq!(app.engine.revealed(), "ABCDE");
        assert_eq!(app.engine.cursor(), 5);
    }

    #[test]
    fn input_failure_restores_terminal_once() {
        let (console, calls) = ScriptedConsole::new([Step::Byte(b'a'), Step::Fail]);
        let mut app = app_with("ABCDEFGHIJ", 5, InterludePolicy::disabled());

        let err = run_script(console, &mut app, &mut terminal()).unwrap_err();

        assert!(matches!(err, RunError::Input(_)));
        assert_eq!(calls.leaves.get(), 1);
    }

    #[test]
    fn panic_inside_loop_restores_terminal_once() {
        let (console, calls) = ScriptedConsole::new([Step::Byte(b'a'), Step::Panic]);
        let mut app = app_with("ABCDEFGHIJ", 5, InterludePolicy::disabled());

        let outcome = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
            run_script(console, &mut app, &mut terminal())
        }));

        assert!(outcome.is_err());
        assert_eq!(calls.leaves.get(), 1);
    }

    #[test]
    fn shutdown_request_ends_loop_cleanly() {
        let (console, calls) = ScriptedConsole::new([Step::Byte(b'a'), Step::Interrupt, Step::Byte(b'b')]);
        let mut app = app_with("ABCDEFGHIJ", 5, InterludePolicy::disabled());

        let exit = run_script(console, &mut app, &mut terminal()).unwrap();

        assert_eq!(exit, Exit::Interrupted);
        assert_eq!(app.keystrokes, 1);
        assert_eq!(calls.leaves.get(), 1);
    }

    #[test]
    fn screen_is_cleared_on_exit() {
        let (console, _calls) = ScriptedConsole::typing(b"a");
        let mut app = app_with("ABCDEFGHIJ", 5, InterludePolicy::disabled());
        let mut terminal = terminal();

        run_script(console, &mut app, &mut terminal).unwrap();

        assert!(screen(&terminal).trim().is_empty());
    }

    #[test]
    fn interlude_plays_out_over_idle_ticks() {
        let mut steps = vec![Step::Byte(b'a')];
        steps.extend(std::iter::repeat_n(Step::Idle, 5));
        steps.push(Step::Byte(0x03));
        let (console, _calls) = ScriptedConsole::new(steps);

        let policy = InterludePolicy {
            error_min_keystrokes: 0,
            error_chance_percent: 100,
            error_frames: 3,
            ..InterludePolicy::default()
        };
        let mut app = app_with("ABCDEFGHIJ", 5, policy);

        run_script(console, &mut app, &mut terminal()).unwrap();

        assert_eq!(app.interlude, None::<Interlude>);
        assert_eq!(app.engine.revealed(), "ABCDE");
    }

    #[test]
    fn banner_is_drawn_with_cursor_below_prompt() {
        let app = app_with("ABCDEFGHIJ", 5, InterludePolicy::disabled());
        let mut terminal = terminal();

        show_banner(&mut terminal, &app).unwrap();

        let rows: Vec<String> = screen(&terminal).lines().map(str::to_string).collect();
        let prompt_row = rows.iter().position(|r| r == "C:\\HACK>_").unwrap();
        assert!(rows[0].contains("HACK.EXE"));
        assert_eq!(
            terminal.get_cursor_position().unwrap(),
            Position::new(0, prompt_row as u16 + 1)
        );
    }

    #[test]
    fn banner_cursor_stays_on_screen_in_short_terminal() {
        let app = app_with("ABCDEFGHIJ", 5, InterludePolicy::disabled());
        let mut terminal = Terminal::new(TestBackend::new(40, 3)).unwrap();

        show_banner(&mut terminal, &app).unwrap();

        assert_eq!(terminal.get_cursor_position().unwrap(), Position::new(0, 2));
    }

    #[test]
    fn run_error_messages_name_the_stage() {
        let input = RunError::Input(io::Error::other("gone"));
        assert!(input.to_string().contains("keyboard"));
        assert!(RunError::Render("boom".into()).to_string().contains("draw"));
    }
}
