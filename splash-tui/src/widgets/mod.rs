//! UI Widgets for Splash

mod countdown;
mod keyboard;
mod options;
mod particles;
pub mod status_bar;

pub use countdown::CountdownWidget;
pub use keyboard::KeyboardWidget;
pub use options::{ConfirmWidget, OptionsWidget};
pub use particles::ParticlesWidget;
pub use status_bar::StatusBarWidget;
