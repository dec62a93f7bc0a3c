//! Display state for the board and panels

use crate::board::BoardLayout;
use crate::theme::Theme;
use ratatui::layout::Rect;
use splash_core::{HexColor, Particle, ParticleField, RenderSurface};
use splash_input::Mode;
use std::collections::{HashMap, HashSet};
use std::time::{Duration, Instant};

/// How long an activated key cap stays highlighted
pub const FLASH_DURATION: Duration = Duration::from_millis(100);

/// Message type for colored status messages
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MessageType {
    #[default]
    Info,
    Success,
    Warning,
    Error,
}

/// Everything the session pushes to the display
pub trait Screen: RenderSurface {
    /// Keys shown on the board, in order
    fn set_keys(&mut self, keys: &[char]);
    /// Highlight a key cap briefly
    fn flash_key(&mut self, key: char, now: Instant);
    /// Show or hide the inactivity countdown
    fn set_countdown(&mut self, seconds: Option<u8>);
    fn notify(&mut self, kind: MessageType, text: String);
    fn set_options(&mut self, options: OptionsView);
    /// Keys whose sound is currently looping
    fn set_held(&mut self, held: &HashSet<char>);
}

/// Text entry shown at the bottom of the options panel
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PromptView {
    pub label: String,
    pub text: String,
}

/// Option values mirrored from the session for drawing
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OptionsView {
    pub volume: u8,
    pub particles: bool,
    pub edit_mode: bool,
    pub editing_key: Option<char>,
    pub color_text: String,
    pub color_focused: bool,
}

/// Application state
pub struct AppState {
    pub mode: Mode,

    // Board
    pub background: HexColor,
    pub theme: Theme,
    pub keys: Vec<char>,
    board_area: Rect,
    pub layout: BoardLayout,
    pub focused_key: usize,
    pub held: HashSet<char>,
    flashes: HashMap<char, Instant>,
    pub particles: ParticleField,
    pub countdown: Option<u8>,

    // Panels
    pub options: OptionsView,
    pub prompt: Option<PromptView>,
    pub show_help: bool,
    pub help_scroll: u16,

    // Audio engine
    pub active_voices: usize,
    pub peak: f32,

    pub message: Option<String>,
    pub message_type: MessageType,
    pub frame_count: u64,
}

impl Default for AppState {
    fn default() -> Self {
        Self {
            mode: Mode::Play,
            background: HexColor::BLACK,
            theme: Theme::default(),
            keys: Vec::new(),
            board_area: Rect::default(),
            layout: BoardLayout::default(),
            focused_key: 0,
            held: HashSet::new(),
            flashes: HashMap::new(),
            particles: ParticleField::new(),
            countdown: None,
            options: OptionsView::default(),
            prompt: None,
            show_help: false,
            help_scroll: 0,
            active_voices: 0,
            peak: 0.0,
            message: None,
            message_type: MessageType::Info,
            frame_count: 0,
        }
    }
}

impl AppState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_mode(&mut self, mode: Mode) {
        if mode == Mode::Help && !self.show_help {
            self.help_scroll = 0;
        }
        self.mode = mode;
        self.show_help = mode == Mode::Help;
    }

    /// Re-layout the board for the area it is drawn in
    pub fn layout_board(&mut self, area: Rect) {
        self.board_area = area;
        self.layout = BoardLayout::compute(area, &self.keys);
    }

    /// Key under a terminal cell
    pub fn key_at(&self, column: u16, row: u16) -> Option<char> {
        self.layout.key_at(column, row)
    }

    pub fn focused(&self) -> Option<char> {
        self.keys.get(self.focused_key).copied()
    }

    /// Move the focused cap, wrapping around
    pub fn move_focus(&mut self, forward: bool) {
        let len = self.keys.len();
        if len == 0 {
            return;
        }
        self.focused_key = if forward {
            (self.focused_key + 1) % len
        } else {
            (self.focused_key + len - 1) % len
        };
    }

    pub fn is_flashing(&self, key: char) -> bool {
        self.flashes.contains_key(&key)
    }

    /// Advance animations by one frame
    pub fn tick(&mut self, now: Instant) {
        self.frame_count = self.frame_count.wrapping_add(1);
        self.particles.tick();
        self.flashes.retain(|_, until| *until > now);
    }

    pub fn update_audio(&mut self, active_voices: usize, peak: f32) {
        self.active_voices = active_voices;
        self.peak = peak;
    }

    /// Clear current message
    pub fn clear_message(&mut self) {
        self.message = None;
        self.message_type = MessageType::Info;
    }

    /// Set a message to display (info level)
    pub fn set_message(&mut self, msg: impl Into<String>) {
        self.message = Some(msg.into());
        self.message_type = MessageType::Info;
    }

    /// Set a success message (green)
    pub fn set_success(&mut self, msg: impl Into<String>) {
        self.message = Some(msg.into());
        self.message_type = MessageType::Success;
    }

    /// Set a warning message (yellow)
    pub fn set_warning(&mut self, msg: impl Into<String>) {
        self.message = Some(msg.into());
        self.message_type = MessageType::Warning;
    }

    /// Set an error message (red)
    pub fn set_error(&mut self, msg: impl Into<String>) {
        self.message = Some(msg.into());
        self.message_type = MessageType::Error;
    }
}

impl RenderSurface for AppState {
    fn set_theme_color(&mut self, color: HexColor) {
        self.background = color;
        self.theme = Theme::from_background(color);
    }

    fn spawn_particle(&mut self, particle: Particle) {
        self.particles.spawn(particle);
    }

    fn key_origin(&self, key: char) -> Option<(f32, f32)> {
        self.layout.origin(key)
    }
}

impl Screen for AppState {
    fn set_keys(&mut self, keys: &[char]) {
        self.keys = keys.to_vec();
        if self.focused_key >= self.keys.len() {
            self.focused_key = 0;
        }
        self.flashes.retain(|k, _| keys.contains(k));
        self.layout = BoardLayout::compute(self.board_area, &self.keys);
    }

    fn flash_key(&mut self, key: char, now: Instant) {
        self.flashes.insert(key, now + FLASH_DURATION);
    }

    fn set_countdown(&mut self, seconds: Option<u8>) {
        self.countdown = seconds;
    }

    fn notify(&mut self, kind: MessageType, text: String) {
        self.message = Some(text);
        self.message_type = kind;
    }

    fn set_options(&mut self, options: OptionsView) {
        self.options = options;
    }

    fn set_held(&mut self, held: &HashSet<char>) {
        self.held.clone_from(held);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flash_expires() {
        let t0 = Instant::now();
        let mut state = AppState::new();
        state.set_keys(&['q', 'w']);
        state.flash_key('q', t0);

        state.tick(t0 + Duration::from_millis(50));
        assert!(state.is_flashing('q'));
        state.tick(t0 + FLASH_DURATION);
        assert!(!state.is_flashing('q'));
    }

    #[test]
    fn test_theme_follows_background() {
        let mut state = AppState::new();
        let color = HexColor::rgb(0x80, 0x00, 0x20);
        state.set_theme_color(color);
        assert_eq!(state.background, color);
        assert_eq!(state.theme, Theme::from_background(color));
    }

    #[test]
    fn test_focus_wraps() {
        let mut state = AppState::new();
        state.set_keys(&['q', 'w', 'e']);
        assert_eq!(state.focused(), Some('q'));
        state.move_focus(false);
        assert_eq!(state.focused(), Some('e'));
        state.move_focus(true);
        assert_eq!(state.focused(), Some('q'));

        state.focused_key = 2;
        state.set_keys(&['q']);
        assert_eq!(state.focused(), Some('q'));
    }

    #[test]
    fn test_key_origin_after_layout() {
        let mut state = AppState::new();
        state.set_keys(&['q', 'w']);
        assert_eq!(state.key_origin('q'), None);
        state.layout_board(Rect::new(0, 0, 80, 10));
        assert!(state.key_origin('q').is_some());
        assert_eq!(state.key_origin('x'), None);

        // New keys are placed without waiting for a redraw
        state.set_keys(&['q', 'w', 'x']);
        assert!(state.key_origin('x').is_some());
    }
}
