//! Core state for Splash
//!
//! Provides the pieces that do not touch audio or the terminal:
//! - Scheduler: cancellable one-shot and repeating timers
//! - Inactivity: the idle grace period / countdown state machine
//! - Color: `#RRGGBB` colors and the background palette
//! - Visual: particle bursts and background randomization

mod color;
mod inactivity;
mod key;
mod scheduler;
mod visual;

pub use color::{ColorError, HexColor, DARK_PALETTE};
pub use inactivity::{
    InactivityTimer, TimerEffect, TimerState, COUNTDOWN_SECS, FORCED_ACTION_DELAY, GRACE_PERIOD,
};
pub use key::{fold_key, parse_key};
pub use scheduler::{Due, TimerId, TimerQueue};
pub use visual::{Particle, ParticleField, RenderSurface, VisualFeedback, BURST_PARTICLES};
