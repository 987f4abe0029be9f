//! Interactive screen.
//!
//! Organized along FP/Unix boundaries:
//! - `state`: Pure data types (App, Interlude, InterludePolicy)
//! - `update`: Pure transitions for keystrokes and ticks
//! - `view`: Pure rendering into a ratatui frame
//! - `theme`: Style constants
//! - `run`: Effects (console polling, drawing, teardown)

pub mod run;
pub mod state;
pub mod theme;
pub mod update;
pub mod view;

pub use run::{Exit, LoopConfig, RunError, run, show_banner};
pub use state::{App, InterludePolicy};
