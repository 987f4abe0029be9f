//! TUI state: pure types, zero effects.
//!
//! `App` owns the reveal engine plus the small amount of cosmetic state
//! the presenter needs. Interludes are overlays: they change what is
//! drawn, never what has been revealed.

use crate::reveal::RevealEngine;
use crate::types::Payload;

// ============================================================================
// INTERLUDES
// ============================================================================

/// Canned fake failures: headline, detail, retry label.
pub const NETWORK_ERRORS: &[(&str, &str, &str)] = &[
    (
        "CONNECTION RESET BY PEER",
        "Remote host 10.0.13.37 dropped the session.",
        "Re-routing through proxy chain",
    ),
    (
        "FIREWALL DETECTED INTRUSION",
        "Packet signature flagged by IDS on port 443.",
        "Spoofing MAC address",
    ),
    (
        "ENCRYPTION HANDSHAKE FAILED",
        "Cipher negotiation rejected: TLS_AES_256_GCM.",
        "Brute-forcing session key",
    ),
];

/// A timed cosmetic overlay, advanced one frame per loop tick.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Interlude {
    /// Full-screen falling glyphs, shown when the payload starts over.
    MatrixRain {
        /// Seeds column offsets and glyph choice.
        seed: u64,
        frame: u32,
        frames: u32,
    },

    /// Fake connection failure with a "retrying" progress gauge.
    NetworkError {
        /// Which canned message to show.
        variant: usize,
        frame: u32,
        frames: u32,
    },
}

impl Interlude {
    pub fn matrix_rain(seed: u64, frames: u32) -> Self {
        Interlude::MatrixRain {
            seed,
            frame: 0,
            frames,
        }
    }

    pub fn network_error(variant: usize, frames: u32) -> Self {
        Interlude::NetworkError {
            variant,
            frame: 0,
            frames,
        }
    }

    /// Completed fraction in `0.0..=1.0`.
    pub fn progress(&self) -> f64 {
        let (frame, frames) = match self {
            Interlude::MatrixRain { frame, frames, .. } => (*frame, *frames),
            Interlude::NetworkError { frame, frames, .. } => (*frame, *frames),
        };
        if frames == 0 {
            1.0
        } else {
            (f64::from(frame) / f64::from(frames)).clamp(0.0, 1.0)
        }
    }
}

/// When and for how long interludes play.
#[derive(Debug, Clone, PartialEq)]
pub struct InterludePolicy {
    /// Master switch; when false the presenter shows only header and body.
    pub enabled: bool,
    /// Duration of the matrix rain, in ticks.
    pub matrix_frames: u32,
    /// Keystrokes that must pass after one rain starts before a restart
    /// may show another. Short texts restart on almost every keystroke.
    pub matrix_cooldown_keystrokes: u64,
    /// Duration of a fake network error, in ticks.
    pub error_frames: u32,
    /// Keystrokes that must pass before a fake error may appear.
    pub error_min_keystrokes: u64,
    /// Chance per keystroke, out of 100, once the minimum has passed.
    pub error_chance_percent: u32,
}

impl Default for InterludePolicy {
    fn default() -> Self {
        Self {
            enabled: true,
            matrix_frames: 120,
            matrix_cooldown_keystrokes: 40,
            error_frames: 250,
            error_min_keystrokes: 50,
            error_chance_percent: 2,
        }
    }
}

impl InterludePolicy {
    /// No interludes at all.
    pub fn disabled() -> Self {
        Self {
            enabled: false,
            ..Self::default()
        }
    }
}

// ============================================================================
// APPLICATION STATE
// ============================================================================

/// Top-level TUI model.
#[derive(Debug)]
pub struct App {
    /// Reveal cursor and revealed text.
    pub engine: RevealEngine,

    /// The loaded file, for the header.
    pub payload: Payload,

    /// Keystrokes consumed so far (exit key excluded).
    pub keystrokes: u64,

    /// Overlay currently playing, if any.
    pub interlude: Option<Interlude>,

    /// Keystroke count at which the last matrix rain started.
    pub last_rain_at: Option<u64>,

    pub policy: InterludePolicy,
}

impl App {
    pub fn new(engine: RevealEngine, payload: Payload, policy: InterludePolicy) -> Self {
        App {
            engine,
            payload,
            keystrokes: 0,
            interlude: None,
            last_rain_at: None,
            policy,
        }
    }

    /// Whether a restart right now may start the matrix rain.
    pub fn rain_allowed(&self) -> bool {
        self.last_rain_at
            .is_none_or(|at| self.keystrokes.saturating_sub(at) >= self.policy.matrix_cooldown_keystrokes)
    }

    /// Before the first keystroke the boot banner and prompt are shown.
    pub fn is_booting(&self) -> bool {
        self.keystrokes == 0
    }
}

// ============================================================================
// TESTS
// ============================================================================
