//! Retro console palette.
//!
//! Color semantics:
//! - Gray: DOS chrome (banners, prompts, the cursor glyph)
//! - Bright green: decrypted payload text
//! - Red: fake alerts
//! - White/green/dark gray: matrix rain head, trail and fading tail

use ratatui::style::{Color, Modifier, Style};

// ============================================================================
// CHROME
// ============================================================================

/// Banner, prompt and header lines.
pub const STYLE_CHROME: Style = Style::new().fg(Color::Gray);

/// The trailing `_` glyph after the body.
pub const STYLE_CURSOR: Style = Style::new().fg(Color::Gray).add_modifier(Modifier::SLOW_BLINK);

/// Revealed payload text.
pub const STYLE_BODY: Style = Style::new().fg(Color::LightGreen).add_modifier(Modifier::BOLD);

// ============================================================================
// INTERLUDES
// ============================================================================

/// Fake network error border and headline.
pub const STYLE_ALERT: Style = Style::new().fg(Color::LightRed).add_modifier(Modifier::BOLD);

/// Secondary lines inside the alert box.
pub const STYLE_ALERT_DETAIL: Style = Style::new().fg(Color::Red);

/// Fake "retrying" gauge fill.
pub const STYLE_PROGRESS: Style = Style::new().fg(Color::Green).bg(Color::Black);

/// Leading glyph of a rain column.
pub const STYLE_RAIN_HEAD: Style = Style::new().fg(Color::White).add_modifier(Modifier::BOLD);

/// Body of a rain column.
pub const STYLE_RAIN_TRAIL: Style = Style::new().fg(Color::Green);

/// Tail end of a rain column.
pub const STYLE_RAIN_FADE: Style = Style::new().fg(Color::DarkGray);

// ============================================================================
// TESTS
// ============================================================================
