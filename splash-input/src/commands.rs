//! Command definitions for Splash

use crate::controller::RawInput;

/// Input modes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Mode {
    /// Keys play sounds
    #[default]
    Play,
    /// Keys pick a binding to replace
    Edit,
    /// Text entry (new key, sound path)
    Prompt,
    /// Background color field
    Color,
    ConfirmReset,
    Help,
}

impl Mode {
    /// Get display name for the mode
    pub fn display_name(&self) -> &'static str {
        match self {
            Mode::Play => "PLAY",
            Mode::Edit => "EDIT",
            Mode::Prompt => "INPUT",
            Mode::Color => "COLOR",
            Mode::ConfirmReset => "RESET?",
            Mode::Help => "HELP",
        }
    }

    /// Modes where keystrokes go to a text field
    pub fn is_text_entry(&self) -> bool {
        matches!(self, Mode::Prompt | Mode::Color)
    }
}

/// Focus movement across the key caps
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Left,
    Right,
}

/// Commands that can be dispatched from input
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Board key input, classified by the key controller
    Key(RawInput),
    MoveFocus(Direction),
    /// Activate the focused key cap
    ActivateFocused,

    // Options
    VolumeUp,
    VolumeDown,
    ToggleParticles,
    ToggleEditMode,
    AddKey,
    EditColor,
    RequestReset,
    ConfirmReset,

    // Text fields
    TextInput(char),
    TextBackspace,
    Submit,

    ToggleHelp,
    HelpScrollUp,
    HelpScrollDown,
    Cancel,
    Quit,
}
