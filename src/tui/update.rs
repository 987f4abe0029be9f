//! Pure state transitions for keystrokes and animation ticks.
//!
//! Fully testable without a terminal: randomness comes in as a parameter.

use rand::Rng;

use crate::reveal::Advance;

use super::state::{App, Interlude, NETWORK_ERRORS};

/// Handle one non-exit keystroke.
///
/// Always advances the reveal engine. May start an interlude:
/// - matrix rain when this keystroke restarted the payload, at most once
///   per cooldown
/// - a fake network error, by chance, once enough keystrokes have passed
///
/// An interlude already playing is never replaced.
pub fn on_keystroke<R: Rng>(app: &mut App, rng: &mut R) -> Advance {
    let step = app.engine.advance();
    app.keystrokes = app.keystrokes.saturating_add(1);

    if app.policy.enabled && app.interlude.is_none() {
        if step.restarted && app.rain_allowed() {
            tracing::debug!(keystrokes = app.keystrokes, "payload restarted, playing matrix rain");
            app.interlude = Some(Interlude::matrix_rain(rng.random(), app.policy.matrix_frames));
            app.last_rain_at = Some(app.keystrokes);
        } else if should_fake_error(app, rng) {
            let variant = rng.random_range(0..NETWORK_ERRORS.len());
            tracing::debug!(keystrokes = app.keystrokes, variant, "faking network error");
            app.interlude = Some(Interlude::network_error(variant, app.policy.error_frames));
        }
    }

    step
}

/// Roll for a fake network error: uniform integer in 1..=100 compared
/// against the configured percentage.
fn should_fake_error<R: Rng>(app: &App, rng: &mut R) -> bool {
    if app.keystrokes < app.policy.error_min_keystrokes {
        return false;
    }
    let roll: u32 = rng.random_range(1..=100);
    roll <= app.policy.error_chance_percent
}

/// Advance the active interlude by one frame.
///
/// Returns true when the screen needs redrawing, including the frame on
/// which the interlude ends and the plain view comes back.
pub fn on_tick(app: &mut App) -> bool {
    let Some(interlude) = app.interlude.as_mut() else {
        return false;
    };

    let finished = match interlude {
        Interlude::MatrixRain { frame, frames, .. } | Interlude::NetworkError { frame, frames, .. } => {
            *frame = frame.saturating_add(1);
            *frame >= *frames
        }
    };

    if finished {
        app.interlude = None;
    }
    true
}

// ============================================================================
// TESTS
// ============================================================================
