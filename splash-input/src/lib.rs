//! Input handling for Splash
//!
//! - Modal: terminal key events to commands
//! - Controller: press / hold / release classification per key
//! - Color field: the `#RRGGBB` text field

mod color_field;
mod commands;
mod controller;
mod modal;

pub use color_field::{FieldChange, HexColorField};
pub use commands::{Command, Direction, Mode};
pub use controller::{KeyAction, KeyInputController, RawInput, HOLD_THRESHOLD};
pub use modal::InputHandler;
