//! hackertyper CLI
//!
//! Mash any key; a prepared text appears a few characters at a time.

use std::io::stdout;
use std::process::ExitCode;

use clap::Parser;
use ratatui::Terminal;
use ratatui::backend::CrosstermBackend;

use hackertyper::boot::{BOOT_DURATION, run_boot_sequence};
use hackertyper::console::{PlatformConsole, TerminalSession};
use hackertyper::logging;
use hackertyper::reveal::RevealEngine;
use hackertyper::source::{load, locate, search_dirs};
use hackertyper::tui::{App, Exit, InterludePolicy, LoopConfig, run, show_banner};
use hackertyper::types::ChunkSize;

#[derive(Parser)]
#[command(name = "hackertyper")]
#[command(about = "Pretend to hack: every keystroke reveals more of a prepared text")]
#[command(version)]
struct Cli {
    /// Characters revealed per keystroke (non-positive or non-numeric: 5)
    #[arg(value_name = "CHARS", allow_hyphen_values = true)]
    chars: Option<String>,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    logging::init();

    match cmd_run(cli.chars.as_deref()) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!(error = %e, "fatal");
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}

// ============================================================================
// CONSOLE
// ============================================================================

#[cfg(unix)]
fn platform_console() -> PlatformConsole {
    PlatformConsole::stdin()
}

#[cfg(not(unix))]
fn platform_console() -> PlatformConsole {
    PlatformConsole::new()
}

// ============================================================================
// COMMAND HANDLER
// ============================================================================

fn cmd_run(chars: Option<&str>) -> Result<(), String> {
    let chunk = ChunkSize::from_arg(chars);
    let mut rng = rand::rng();

    // Everything that can fail on input happens before the terminal changes mode
    let located = locate(&search_dirs(), &mut rng).map_err(|e| e.to_string())?;
    let loaded = load(&located.path).map_err(|e| e.to_string())?;
    let engine = RevealEngine::from_text(&loaded.text, chunk).map_err(|e| e.to_string())?;

    tracing::info!(
        path = %located.path.display(),
        candidates = located.candidates,
        chars = engine.len(),
        chunk = chunk.get(),
        "payload loaded"
    );

    let session = TerminalSession::enter(platform_console()).map_err(|e| e.to_string())?;

    let mut terminal = Terminal::new(CrosstermBackend::new(stdout())).map_err(|e| e.to_string())?;
    let mut app = App::new(engine, loaded.payload, InterludePolicy::default());

    // Banner and prompt first, then the loading bar beneath them
    show_banner(&mut terminal, &app).map_err(|e| e.to_string())?;
    run_boot_sequence(&app.payload, BOOT_DURATION);

    let exit = run(session, &mut terminal, &mut app, &mut rng, &LoopConfig::default())
        .map_err(|e| e.to_string())?;

    if exit == Exit::Interrupted {
        tracing::info!("stopped by signal");
    }
    Ok(())
}
