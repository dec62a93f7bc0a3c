//! Modal state machine mapping terminal key events to commands

use crate::commands::{Command, Direction, Mode};
use crate::controller::RawInput;
use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};

/// Handles keyboard input and converts to commands.
///
/// Function keys are global; plain characters belong to the board in
/// `Play` and `Edit` mode and to the text field otherwise.
pub struct InputHandler {
    mode: Mode,
    /// Mode to return to after an overlay or text field closes
    previous: Mode,
}

impl InputHandler {
    pub fn new() -> Self {
        Self {
            mode: Mode::Play,
            previous: Mode::Play,
        }
    }

    /// Get current mode
    pub fn mode(&self) -> Mode {
        self.mode
    }

    /// Switch mode, remembering the board mode to come back to
    pub fn set_mode(&mut self, mode: Mode) {
        if matches!(self.mode, Mode::Play | Mode::Edit) {
            self.previous = self.mode;
        }
        self.mode = mode;
    }

    /// Leave an overlay or text field
    pub fn back(&mut self) {
        self.mode = self.previous;
    }

    /// Return to plain play mode
    pub fn reset(&mut self) {
        self.mode = Mode::Play;
        self.previous = Mode::Play;
    }

    /// Handle a key event and return a command if applicable
    pub fn handle_key(&mut self, key: KeyEvent) -> Option<Command> {
        if key.modifiers.contains(KeyModifiers::CONTROL) {
            if key.kind == KeyEventKind::Release {
                return None;
            }
            return match key.code {
                KeyCode::Char('c') | KeyCode::Char('q') => Some(Command::Quit),
                KeyCode::Char('r') if !self.mode.is_text_entry() => {
                    self.set_mode(Mode::ConfirmReset);
                    Some(Command::RequestReset)
                }
                _ => None,
            };
        }

        match self.mode {
            Mode::Play | Mode::Edit => self.handle_board_mode(key),
            Mode::Prompt | Mode::Color => self.handle_text_mode(key),
            Mode::ConfirmReset => self.handle_confirm_mode(key),
            Mode::Help => self.handle_help_mode(key),
        }
    }

    fn handle_board_mode(&mut self, key: KeyEvent) -> Option<Command> {
        if let KeyCode::Char(c) = key.code {
            let input = match key.kind {
                KeyEventKind::Press => RawInput::KeyDown {
                    key: c,
                    repeat: false,
                },
                KeyEventKind::Repeat => RawInput::KeyDown {
                    key: c,
                    repeat: true,
                },
                KeyEventKind::Release => RawInput::KeyUp(c),
            };
            return Some(Command::Key(input));
        }

        if key.kind != KeyEventKind::Press {
            return None;
        }

        match key.code {
            KeyCode::F(1) => {
                self.set_mode(Mode::Help);
                Some(Command::ToggleHelp)
            }
            KeyCode::F(2) => {
                let next = if self.mode == Mode::Edit {
                    Mode::Play
                } else {
                    Mode::Edit
                };
                self.mode = next;
                self.previous = next;
                Some(Command::ToggleEditMode)
            }
            KeyCode::F(3) => {
                self.set_mode(Mode::Prompt);
                Some(Command::AddKey)
            }
            KeyCode::F(4) => {
                self.set_mode(Mode::Color);
                Some(Command::EditColor)
            }
            KeyCode::F(5) => Some(Command::ToggleParticles),

            KeyCode::Up => Some(Command::VolumeUp),
            KeyCode::Down => Some(Command::VolumeDown),
            KeyCode::Left | KeyCode::BackTab => Some(Command::MoveFocus(Direction::Left)),
            KeyCode::Right | KeyCode::Tab => Some(Command::MoveFocus(Direction::Right)),
            KeyCode::Enter => Some(Command::ActivateFocused),

            KeyCode::Esc if self.mode == Mode::Edit => {
                self.mode = Mode::Play;
                self.previous = Mode::Play;
                Some(Command::ToggleEditMode)
            }
            KeyCode::Esc => Some(Command::Cancel),

            _ => None,
        }
    }

    fn handle_text_mode(&mut self, key: KeyEvent) -> Option<Command> {
        if key.kind == KeyEventKind::Release {
            return None;
        }

        match key.code {
            KeyCode::Char(c) => Some(Command::TextInput(c)),
            KeyCode::Backspace => Some(Command::TextBackspace),
            KeyCode::Enter => Some(Command::Submit),
            KeyCode::Esc => Some(Command::Cancel),
            _ => None,
        }
    }

    fn handle_confirm_mode(&mut self, key: KeyEvent) -> Option<Command> {
        if key.kind != KeyEventKind::Press {
            return board_release(key);
        }

        match key.code {
            KeyCode::Char('y') | KeyCode::Char('Y') | KeyCode::Enter => {
                self.back();
                Some(Command::ConfirmReset)
            }
            KeyCode::Char('n') | KeyCode::Char('N') | KeyCode::Esc => {
                self.back();
                Some(Command::Cancel)
            }
            _ => None,
        }
    }

    fn handle_help_mode(&mut self, key: KeyEvent) -> Option<Command> {
        if key.kind != KeyEventKind::Press {
            return board_release(key);
        }

        match key.code {
            KeyCode::Esc | KeyCode::F(1) | KeyCode::Enter => {
                self.back();
                Some(Command::ToggleHelp)
            }
            KeyCode::Up | KeyCode::Char('k') => Some(Command::HelpScrollUp),
            KeyCode::Down | KeyCode::Char('j') => Some(Command::HelpScrollDown),
            _ => None,
        }
    }
}

/// Releases still reach the board while an overlay is open, so holds end
fn board_release(key: KeyEvent) -> Option<Command> {
    match (key.kind, key.code) {
        (KeyEventKind::Release, KeyCode::Char(c)) => Some(Command::Key(RawInput::KeyUp(c))),
        _ => None,
    }
}

impl Default for InputHandler {
    fn default() -> Self {
        Self::new()
    }
}
