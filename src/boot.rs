//! Fake "loading" sequence shown on stderr before the interactive screen.

use std::thread;
use std::time::Duration;

use humansize::{BINARY, format_size};
use indicatif::{ProgressBar, ProgressDrawTarget, ProgressStyle};

use crate::types::Payload;

/// Default length of the whole sequence.
pub const BOOT_DURATION: Duration = Duration::from_millis(500);

/// Messages shown in order, one per stage.
pub const BOOT_STAGES: &[&str] = &[
    "Initializing system breach protocol...",
    "Establishing secure connection...",
    "Bypassing firewall...",
    "Loading payload",
];

/// Time spent on each stage when `total` is spread evenly.
pub fn stage_delay(total: Duration) -> Duration {
    let stages = u32::try_from(BOOT_STAGES.len()).unwrap_or(u32::MAX).max(1);
    total / stages
}

fn boot_bar(draw_target: ProgressDrawTarget) -> ProgressBar {
    let pb = ProgressBar::with_draw_target(Some(BOOT_STAGES.len() as u64), draw_target);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{bar:30.green/black}] {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("█▓░"),
    );
    pb
}

/// Play the sequence for `payload`, taking roughly `total`.
///
/// A zero duration skips it. The bar draws only when stderr is a terminal.
pub fn run_boot_sequence(payload: &Payload, total: Duration) {
    if total.is_zero() {
        return;
    }
    play(payload, total, boot_bar(ProgressDrawTarget::stderr()));
}

fn play(payload: &Payload, total: Duration, pb: ProgressBar) {
    let delay = stage_delay(total);
    for index in 0..BOOT_STAGES.len() {
        pb.set_message(stage_message(index, payload));
        thread::sleep(delay);
        pb.inc(1);
    }
    pb.finish_and_clear();
    tracing::debug!(payload = %payload.name, "boot sequence finished");
}

/// The last stage also names the payload and its size.
fn stage_message(index: usize, payload: &Payload) -> String {
    let stage = BOOT_STAGES[index];
    if index + 1 == BOOT_STAGES.len() {
        format!("{} {} ({})", stage, payload.name, format_size(payload.size_bytes, BINARY))
    } else {
        stage.to_string()
    }
}

// ============================================================================
// TESTS
// ============================================================================
