//! hackertyper: reveal a prepared text a few characters per keystroke.

pub mod boot;
pub mod console;
pub mod logging;
pub mod pattern;
pub mod reveal;
pub mod source;
pub mod tui;
pub mod types;
