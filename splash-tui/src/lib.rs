//! Terminal UI for Splash - widgets, themes, and layout
//!
//! Draws the key board, particle bursts, the idle countdown and the
//! options panel on a background whose color drives the theme.

mod app;
mod board;
mod theme;
pub mod widgets;

pub use app::{AppState, MessageType, OptionsView, PromptView, Screen, FLASH_DURATION};
pub use board::{to_cell, BoardLayout, KeyCap, CAP_HEIGHT, CAP_WIDTH, CELL_HEIGHT_PX, CELL_WIDTH_PX};
pub use theme::{to_color, Theme};
pub use widgets::status_bar::HelpWidget;
pub use widgets::{
    ConfirmWidget, CountdownWidget, KeyboardWidget, OptionsWidget, ParticlesWidget,
    StatusBarWidget,
};
