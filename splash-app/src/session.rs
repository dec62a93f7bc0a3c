//! The controller context: owns settings, sounds, playback, input
//! classification, the idle timer and the screen, and wires them together.

use splash_audio::{AudioBackend, BankError, PlaybackManager, SoundBank};
use splash_core::{fold_key, parse_key, HexColor, InactivityTimer, TimerEffect, VisualFeedback};
use splash_input::{FieldChange, HexColorField, KeyAction, KeyInputController, RawInput};
use splash_library::{validate_asset, LoadError, Settings, MAX_VOLUME};
use splash_tui::{MessageType, OptionsView, Screen};
use std::path::Path;
use std::time::Instant;
use thiserror::Error;
use tracing::{debug, info, warn};

/// Volume change per Up/Down press, in percent
const VOLUME_STEP: u8 = 5;

#[derive(Error, Debug)]
pub enum SessionError {
    #[error("Please enter a key character")]
    EmptyKey,
    #[error("Please enter a single character")]
    InvalidKey,
    #[error(transparent)]
    Bank(#[from] BankError),
    #[error(transparent)]
    Load(#[from] LoadError),
}

pub struct Session<B: AudioBackend, S: Screen> {
    settings: Settings,
    backend: B,
    bank: SoundBank<B::Source>,
    /// Keys shown on the board, including keys without a sound
    board: Vec<char>,
    playback: PlaybackManager<B::Voice>,
    controller: KeyInputController,
    timer: InactivityTimer,
    visuals: VisualFeedback,
    color_field: HexColorField,
    screen: S,
    edit_mode: bool,
    editing: Option<char>,
    hidden: bool,
}

impl<B: AudioBackend, S: Screen> Session<B, S> {
    pub fn new(
        settings: Settings,
        backend: B,
        screen: S,
        reports_release: bool,
        now: Instant,
    ) -> Self {
        Self::with_visuals(
            settings,
            backend,
            screen,
            reports_release,
            VisualFeedback::new(),
            now,
        )
    }

    pub fn with_visuals(
        settings: Settings,
        backend: B,
        screen: S,
        reports_release: bool,
        visuals: VisualFeedback,
        now: Instant,
    ) -> Self {
        let background = settings.background_color;
        let mut session = Self {
            settings,
            backend,
            bank: SoundBank::new(),
            board: Vec::new(),
            playback: PlaybackManager::new(),
            controller: KeyInputController::new(reports_release),
            timer: InactivityTimer::new(),
            visuals,
            color_field: HexColorField::new(background),
            screen,
            edit_mode: false,
            editing: None,
            hidden: false,
        };

        session.load_bindings();
        session.screen.set_theme_color(background);
        session.screen.set_keys(&session.board);
        let effect = session.timer.activity(now);
        session.apply_effect(effect);
        session.refresh();
        session
    }

    /// Populate the bank and board from the settings. Sounds that fail to
    /// load keep their key on the board.
    fn load_bindings(&mut self) {
        for binding in &self.settings.bindings {
            self.board.push(binding.key);
            let Some(path) = &binding.source else {
                continue;
            };
            match self.backend.load(path) {
                Ok(source) => self.bank.register(binding.key, source),
                Err(e) => warn!(
                    key = %binding.key,
                    path = %path.display(),
                    error = %e,
                    "could not load sound"
                ),
            }
        }
        info!(keys = self.board.len(), sounds = self.bank.len(), "bindings loaded");
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn screen_mut(&mut self) -> &mut S {
        &mut self.screen
    }

    pub fn edit_mode(&self) -> bool {
        self.edit_mode
    }

    /// Earliest instant at which `tick` has work to do
    pub fn next_deadline(&self) -> Option<Instant> {
        match (self.controller.next_deadline(), self.timer.next_deadline()) {
            (Some(a), Some(b)) => Some(a.min(b)),
            (a, b) => a.or(b),
        }
    }

    /// Feed one raw input event. Returns the action it produced, if any.
    pub fn handle_input(&mut self, now: Instant, input: RawInput) -> Option<KeyAction> {
        if self.hidden && input != RawInput::FocusLost {
            self.set_visible(now, true);
        }
        let action = self.controller.handle(now, input)?;
        self.apply_action(now, action)
    }

    /// Fire due hold timers and idle timer transitions
    pub fn tick(&mut self, now: Instant) {
        for action in self.controller.poll(now) {
            self.apply_action(now, action);
        }
        for effect in self.timer.poll(now) {
            self.apply_effect(effect);
        }
    }

    fn apply_action(&mut self, now: Instant, action: KeyAction) -> Option<KeyAction> {
        match action {
            KeyAction::Tap(key) => self.press(now, key, false),
            KeyAction::HoldStart(key) => self.press(now, key, true),
            KeyAction::HoldEnd(key) => {
                self.playback.release(key);
                self.refresh();
            }
            KeyAction::ReleaseAll => self.set_visible(now, false),
            KeyAction::Remap(key) => {
                if !self.board.contains(&key) {
                    return None;
                }
                self.editing = Some(key);
                self.screen.notify(
                    MessageType::Info,
                    format!("Editing Key: {}", key.to_uppercase()),
                );
                self.refresh();
            }
        }
        Some(action)
    }

    /// Activate a key: reset the idle timer, flash, recolor, burst and play
    fn press(&mut self, now: Instant, key: char, looping: bool) {
        let key = fold_key(key);
        if !self.board.contains(&key) {
            debug!(%key, "not on the board");
            return;
        }

        let effect = self.timer.activity(now);
        self.apply_effect(effect);
        self.screen.flash_key(key, now);
        self.recolor();
        if let Some((x, y)) = self.screen.key_origin(key) {
            self.visuals
                .burst(&mut self.screen, self.settings.particle_effects, x, y);
        }

        self.playback.activate(
            &self.bank,
            &mut self.backend,
            key,
            looping,
            self.settings.master_volume,
        );
        self.refresh();
    }

    fn recolor(&mut self) {
        let color = self.visuals.randomize_background(&mut self.screen);
        self.settings.background_color = color;
        self.color_field.set_committed(color);
        self.refresh();
    }

    fn apply_effect(&mut self, effect: TimerEffect) {
        match effect {
            TimerEffect::ShowCountdown(seconds) => self.screen.set_countdown(Some(seconds)),
            TimerEffect::HideCountdown => self.screen.set_countdown(None),
            TimerEffect::RandomizeBackground => self.recolor(),
        }
    }

    /// Hidden stops every sound and the idle timer; visible restarts the timer
    pub fn set_visible(&mut self, now: Instant, visible: bool) {
        if visible == !self.hidden {
            return;
        }
        self.hidden = !visible;

        let effect = if visible {
            debug!("board visible");
            self.timer.resume(now)
        } else {
            debug!("board hidden, stopping all sounds");
            self.playback.stop_all();
            self.controller.reset();
            self.timer.suspend()
        };
        self.apply_effect(effect);
        self.refresh();
    }

    pub fn volume_up(&mut self) {
        self.settings.master_volume = self
            .settings
            .master_volume
            .saturating_add(VOLUME_STEP)
            .min(MAX_VOLUME);
        self.refresh();
    }

    pub fn volume_down(&mut self) {
        self.settings.master_volume = self.settings.master_volume.saturating_sub(VOLUME_STEP);
        self.refresh();
    }

    pub fn toggle_particles(&mut self) {
        self.settings.particle_effects = !self.settings.particle_effects;
        self.refresh();
    }

    pub fn toggle_edit_mode(&mut self) {
        self.set_edit_mode(!self.edit_mode);
    }

    pub fn set_edit_mode(&mut self, enabled: bool) {
        self.edit_mode = enabled;
        self.controller.set_edit_mode(enabled);
        if !enabled {
            self.editing = None;
        }
        info!(enabled, "edit mode");
        self.refresh();
    }

    /// Drop the key picked for remapping without changing it
    pub fn cancel_editing(&mut self) {
        self.editing = None;
        self.refresh();
    }

    /// Focus the background color field. Stops all audio and counts as activity.
    pub fn focus_color(&mut self, now: Instant) {
        self.playback.stop_all();
        let effect = self.timer.activity(now);
        self.apply_effect(effect);
        self.color_field.focus();
        self.controller.set_text_focus(true);
        self.refresh();
    }

    pub fn color_input(&mut self, c: char) {
        if let FieldChange::Applied(color) = self.color_field.input(c) {
            debug!(%color, "background color applied");
            self.screen.set_theme_color(color);
            self.settings.background_color = color;
        }
        self.refresh();
    }

    pub fn color_backspace(&mut self) {
        self.color_field.backspace();
        self.refresh();
    }

    /// Leave the color field; an incomplete value reverts silently
    pub fn blur_color(&mut self) -> HexColor {
        let color = self.color_field.blur();
        self.controller.set_text_focus(false);
        self.refresh();
        color
    }

    /// A prompt took the keyboard; board input is ignored until it closes.
    /// Held loops are released since their key-up will not reach the board.
    pub fn begin_text_entry(&mut self) {
        let held: Vec<char> = self.playback.held_keys().iter().copied().collect();
        for key in held {
            self.playback.release(key);
        }
        self.controller.set_text_focus(true);
        self.refresh();
    }

    pub fn end_text_entry(&mut self) {
        self.controller.set_text_focus(false);
    }

    /// Check new-key input before asking for its sound
    pub fn validate_new_key(&self, input: &str) -> Result<char, SessionError> {
        if input.trim().is_empty() {
            return Err(SessionError::EmptyKey);
        }
        let key = parse_key(input).ok_or(SessionError::InvalidKey)?;
        if self.board.contains(&key) {
            return Err(BankError::DuplicateKey(key).into());
        }
        Ok(key)
    }

    /// Add a custom key, optionally with a sound. Nothing changes on error.
    pub fn add_key(&mut self, input: &str, source: Option<&Path>) -> Result<char, SessionError> {
        let result = self.try_add_key(input, source);
        match &result {
            Ok(key) => {
                info!(%key, "key added");
                self.screen.notify(
                    MessageType::Success,
                    format!("Key added: {}", key.to_uppercase()),
                );
            }
            Err(e) => {
                warn!(input, error = %e, "could not add key");
                self.screen.notify(MessageType::Error, e.to_string());
            }
        }
        result
    }

    fn try_add_key(&mut self, input: &str, source: Option<&Path>) -> Result<char, SessionError> {
        let key = self.validate_new_key(input)?;
        let loaded = match source {
            Some(path) => {
                validate_asset(path)?;
                Some(self.backend.load(path)?)
            }
            None => None,
        };

        if let Some(loaded) = loaded {
            self.bank.add(key, loaded)?;
        }
        self.board.push(key);
        self.settings.set_binding(key, source.map(Path::to_path_buf));
        self.screen.set_keys(&self.board);
        self.refresh();
        Ok(key)
    }

    /// Point a board key at a new sound file. The binding is unchanged on error.
    pub fn replace_sound(&mut self, key: char, path: &Path) -> Result<(), SessionError> {
        let key = fold_key(key);
        match self.backend.load(path) {
            Ok(source) => {
                self.bank.register(key, source);
                self.settings.set_binding(key, Some(path.to_path_buf()));
                if !self.board.contains(&key) {
                    self.board.push(key);
                    self.screen.set_keys(&self.board);
                }
                self.editing = None;
                info!(%key, path = %path.display(), "sound replaced");
                self.screen.notify(
                    MessageType::Success,
                    format!("Sound updated for key: {}", key.to_uppercase()),
                );
                self.refresh();
                Ok(())
            }
            Err(e) => {
                warn!(%key, path = %path.display(), error = %e, "could not replace sound");
                self.screen.notify(MessageType::Error, e.to_string());
                Err(e.into())
            }
        }
    }

    /// Restore default settings, drop custom keys and reload every sound
    pub fn reset_to_defaults(&mut self, now: Instant) {
        self.playback.clear();
        self.bank.clear();
        self.board.clear();
        self.controller.reset();
        self.settings = Settings::default();
        self.load_bindings();

        let background = self.settings.background_color;
        self.color_field = HexColorField::new(background);
        self.screen.set_theme_color(background);
        self.screen.set_keys(&self.board);
        self.set_edit_mode(false);
        let effect = self.timer.activity(now);
        self.apply_effect(effect);

        info!("settings reset to defaults");
        self.screen
            .notify(MessageType::Success, "Settings reset to defaults".into());
        self.refresh();
    }

    fn refresh(&mut self) {
        self.screen.set_options(OptionsView {
            volume: self.settings.master_volume,
            particles: self.settings.particle_effects,
            edit_mode: self.edit_mode,
            editing_key: self.editing,
            color_text: self.color_field.text().to_string(),
            color_focused: self.color_field.is_focused(),
        });
        self.screen.set_held(self.playback.held_keys());
    }
}

#[cfg(test)]
impl<B: AudioBackend, S: Screen> Session<B, S> {
    fn screen(&self) -> &S {
        &self.screen
    }

    fn board(&self) -> &[char] {
        &self.board
    }

    fn bank(&self) -> &SoundBank<B::Source> {
        &self.bank
    }

    fn playback(&self) -> &PlaybackManager<B::Voice> {
        &self.playback
    }

    fn timer_state(&self) -> splash_core::TimerState {
        self.timer.state()
    }

    /// Key picked for a new sound in edit mode
    fn editing_key(&self) -> Option<char> {
        self.editing
    }

    fn is_hidden(&self) -> bool {
        self.hidden
    }

    fn color_text(&self) -> &str {
        self.color_field.text()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use splash_audio::{PlaybackError, Voice};
    use splash_core::{Particle, RenderSurface, TimerState};
    use splash_input::HOLD_THRESHOLD;
    use std::collections::HashSet;
    use std::path::PathBuf;
    use std::time::Duration;

    #[derive(Debug, Default)]
    struct FakeVoice {
        playing: bool,
        looping: bool,
        volume: f32,
    }

    impl Voice for FakeVoice {
        fn play(&mut self) -> Result<(), PlaybackError> {
            self.playing = true;
            Ok(())
        }
        fn pause(&mut self) {
            self.playing = false;
        }
        fn seek_to_start(&mut self) {}
        fn set_loop(&mut self, looping: bool) {
            self.looping = looping;
        }
        fn set_volume(&mut self, volume: f32) {
            self.volume = volume;
        }
        fn is_playing(&self) -> bool {
            self.playing
        }
        fn is_looping(&self) -> bool {
            self.looping
        }
        fn volume(&self) -> f32 {
            self.volume
        }
    }

    /// Loads any audio path except ones under `missing/`
    #[derive(Default)]
    struct FakeBackend;

    impl AudioBackend for FakeBackend {
        type Source = PathBuf;
        type Voice = FakeVoice;

        fn load(&mut self, path: &Path) -> Result<PathBuf, LoadError> {
            validate_asset(path)?;
            if path.starts_with("missing") {
                return Err(LoadError::Io(std::io::ErrorKind::NotFound.into()));
            }
            Ok(path.to_path_buf())
        }

        fn create_voice(&mut self, _source: &PathBuf) -> Result<FakeVoice, PlaybackError> {
            Ok(FakeVoice::default())
        }
    }

    #[derive(Default)]
    struct FakeScreen {
        colors: Vec<HexColor>,
        particles: usize,
        keys: Vec<char>,
        flashes: Vec<char>,
        countdown: Option<u8>,
        notices: Vec<(MessageType, String)>,
        options: OptionsView,
        held: HashSet<char>,
    }

    impl RenderSurface for FakeScreen {
        fn set_theme_color(&mut self, color: HexColor) {
            self.colors.push(color);
        }
        fn spawn_particle(&mut self, _particle: Particle) {
            self.particles += 1;
        }
        fn key_origin(&self, key: char) -> Option<(f32, f32)> {
            self.keys.contains(&key).then_some((10.0, 10.0))
        }
    }

    impl Screen for FakeScreen {
        fn set_keys(&mut self, keys: &[char]) {
            self.keys = keys.to_vec();
        }
        fn flash_key(&mut self, key: char, _now: Instant) {
            self.flashes.push(key);
        }
        fn set_countdown(&mut self, seconds: Option<u8>) {
            self.countdown = seconds;
        }
        fn notify(&mut self, kind: MessageType, text: String) {
            self.notices.push((kind, text));
        }
        fn set_options(&mut self, options: OptionsView) {
            self.options = options;
        }
        fn set_held(&mut self, held: &HashSet<char>) {
            self.held = held.clone();
        }
    }

    type TestSession = Session<FakeBackend, FakeScreen>;

    fn session(t0: Instant, reports_release: bool) -> TestSession {
        Session::with_visuals(
            Settings::default(),
            FakeBackend,
            FakeScreen::default(),
            reports_release,
            VisualFeedback::with_seed(7),
            t0,
        )
    }

    fn key_down(key: char) -> RawInput {
        RawInput::KeyDown { key, repeat: false }
    }

    fn last_notice(s: &TestSession) -> &(MessageType, String) {
        s.screen().notices.last().unwrap()
    }

    #[test]
    fn test_startup_loads_default_board() {
        let t0 = Instant::now();
        let s = session(t0, false);
        assert_eq!(s.board(), &['q', 'w', 'e', 'a', 's', 'd']);
        assert_eq!(s.bank().len(), 6);
        assert_eq!(s.screen().keys, s.board());
        assert_eq!(s.screen().colors, vec![HexColor::BLACK]);
        assert_eq!(s.timer_state(), TimerState::Waiting);
        assert_eq!(s.screen().options.volume, 50);
    }

    #[test]
    fn test_failed_sound_keeps_key_on_board() {
        let t0 = Instant::now();
        let mut settings = Settings::default();
        settings.set_binding('q', Some(PathBuf::from("missing/q.mp3")));
        let s = Session::new(settings, FakeBackend, FakeScreen::default(), false, t0);
        assert!(s.board().contains(&'q'));
        assert!(s.bank().resolve('q').is_none());
    }

    #[test]
    fn test_tap_plays_flashes_and_recolors() {
        let t0 = Instant::now();
        let mut s = session(t0, false);

        let action = s.handle_input(t0, key_down('Q'));
        assert_eq!(action, Some(KeyAction::Tap('q')));

        let voice = s.playback().voice('q').unwrap();
        assert!(voice.is_playing());
        assert!(!voice.is_looping());
        assert_eq!(s.screen().flashes, vec!['q']);
        assert_eq!(s.screen().colors.len(), 2);
        assert_eq!(s.settings().background_color, s.screen().colors[1]);
        assert_eq!(s.color_text(), s.screen().colors[1].to_string());
        assert_eq!(s.screen().particles, splash_core::BURST_PARTICLES);
    }

    #[test]
    fn test_particles_disabled() {
        let t0 = Instant::now();
        let mut s = session(t0, false);
        s.toggle_particles();
        s.handle_input(t0, key_down('q'));
        assert_eq!(s.screen().particles, 0);
        assert!(!s.screen().options.particles);
    }

    #[test]
    fn test_key_not_on_board_is_ignored() {
        let t0 = Instant::now();
        let mut s = session(t0, false);
        s.handle_input(t0, key_down('z'));
        assert_eq!(s.playback().voice_count(), 0);
        assert!(s.screen().flashes.is_empty());
        assert_eq!(s.screen().colors.len(), 1);
    }

    #[test]
    fn test_keyboard_hold_and_release() {
        let t0 = Instant::now();
        let mut s = session(t0, true);

        assert_eq!(s.handle_input(t0, key_down('w')), Some(KeyAction::HoldStart('w')));
        assert!(s.playback().is_held('w'));
        assert!(s.playback().voice('w').unwrap().is_looping());
        assert!(s.screen().held.contains(&'w'));

        // Auto-repeat does not restart the sound
        let repeat = RawInput::KeyDown {
            key: 'w',
            repeat: true,
        };
        assert_eq!(s.handle_input(t0, repeat), None);
        assert_eq!(s.screen().flashes.len(), 1);

        assert_eq!(s.handle_input(t0, RawInput::KeyUp('w')), Some(KeyAction::HoldEnd('w')));
        assert!(!s.playback().is_held('w'));
        let voice = s.playback().voice('w').unwrap();
        assert!(!voice.is_looping());
        assert!(voice.is_playing());
        assert!(s.screen().held.is_empty());
    }

    #[test]
    fn test_pointer_hold_via_tick() {
        let t0 = Instant::now();
        let mut s = session(t0, false);

        assert_eq!(s.handle_input(t0, RawInput::PointerDown('e')), None);
        assert_eq!(s.next_deadline(), Some(t0 + HOLD_THRESHOLD));
        s.tick(t0 + HOLD_THRESHOLD);
        assert!(s.playback().is_held('e'));

        let later = t0 + Duration::from_secs(1);
        s.handle_input(later, RawInput::PointerUp('e'));
        assert!(!s.playback().is_held('e'));
    }

    #[test]
    fn test_volume_applies_at_start_only() {
        let t0 = Instant::now();
        let mut s = session(t0, false);

        s.handle_input(t0, key_down('q'));
        assert_eq!(s.playback().voice('q').unwrap().volume(), 0.5);

        s.volume_up();
        assert_eq!(s.settings().master_volume, 55);
        assert_eq!(s.playback().voice('q').unwrap().volume(), 0.5);

        s.handle_input(t0, key_down('q'));
        assert_eq!(s.playback().voice('q').unwrap().volume(), 0.55);
    }

    #[test]
    fn test_volume_clamped() {
        let t0 = Instant::now();
        let mut s = session(t0, false);
        for _ in 0..30 {
            s.volume_up();
        }
        assert_eq!(s.settings().master_volume, 100);
        for _ in 0..30 {
            s.volume_down();
        }
        assert_eq!(s.settings().master_volume, 0);
    }

    #[test]
    fn test_idle_countdown_then_recolor() {
        let t0 = Instant::now();
        let mut s = session(t0, false);
        let at = |secs: u64| t0 + Duration::from_secs(secs);

        s.tick(at(9));
        assert_eq!(s.screen().countdown, None);

        s.tick(at(10));
        assert_eq!(s.screen().countdown, Some(10));
        assert_eq!(s.screen().colors.len(), 1);

        for secs in 11..20 {
            s.tick(at(secs));
        }
        assert_eq!(s.screen().countdown, Some(1));

        s.tick(at(20));
        assert_eq!(s.screen().countdown, None);
        assert_eq!(s.screen().colors.len(), 2);
        assert_eq!(s.timer_state(), TimerState::Waiting);
    }

    #[test]
    fn test_press_resets_countdown() {
        let t0 = Instant::now();
        let mut s = session(t0, false);
        s.tick(t0 + Duration::from_secs(12));
        assert!(s.screen().countdown.is_some());

        s.handle_input(t0 + Duration::from_secs(12), key_down('a'));
        assert_eq!(s.screen().countdown, None);
        assert_eq!(s.timer_state(), TimerState::Waiting);
    }

    #[test]
    fn test_focus_loss_stops_everything() {
        let t0 = Instant::now();
        let mut s = session(t0, true);
        s.handle_input(t0, key_down('q'));
        s.handle_input(t0, key_down('w'));

        assert_eq!(s.handle_input(t0, RawInput::FocusLost), Some(KeyAction::ReleaseAll));
        assert!(s.is_hidden());
        assert!(s.playback().held_keys().is_empty());
        assert_eq!(s.playback().playing_count(), 0);
        assert_eq!(s.timer_state(), TimerState::Idle);
        assert_eq!(s.next_deadline(), None);

        s.set_visible(t0, true);
        assert_eq!(s.timer_state(), TimerState::Waiting);
    }

    #[test]
    fn test_edit_mode_remaps_instead_of_playing() {
        let t0 = Instant::now();
        let mut s = session(t0, false);
        s.toggle_edit_mode();
        assert!(s.screen().options.edit_mode);

        assert_eq!(s.handle_input(t0, key_down('s')), Some(KeyAction::Remap('s')));
        assert_eq!(s.editing_key(), Some('s'));
        assert_eq!(s.playback().voice_count(), 0);
        assert_eq!(last_notice(&s).1, "Editing Key: S");
        assert_eq!(s.screen().options.editing_key, Some('s'));

        // Keys not on the board cannot be remapped
        assert_eq!(s.handle_input(t0, key_down('z')), None);

        s.toggle_edit_mode();
        assert_eq!(s.editing_key(), None);
    }

    #[test]
    fn test_hold_released_after_edit_mode_toggle() {
        let t0 = Instant::now();
        let mut s = session(t0, true);

        assert_eq!(s.handle_input(t0, key_down('w')), Some(KeyAction::HoldStart('w')));
        s.toggle_edit_mode();
        assert_eq!(s.handle_input(t0, RawInput::KeyUp('w')), Some(KeyAction::HoldEnd('w')));
        assert!(!s.playback().is_held('w'));
        assert!(!s.playback().voice('w').unwrap().is_looping());

        s.toggle_edit_mode();
        assert_eq!(s.handle_input(t0, key_down('w')), Some(KeyAction::HoldStart('w')));
    }

    #[test]
    fn test_text_entry_releases_held_loops() {
        let t0 = Instant::now();
        let mut s = session(t0, true);
        s.handle_input(t0, key_down('q'));
        assert!(s.playback().is_held('q'));

        s.begin_text_entry();
        assert!(s.playback().held_keys().is_empty());
        assert!(!s.playback().voice('q').unwrap().is_looping());
        assert!(s.screen().held.is_empty());

        s.end_text_entry();
        assert_eq!(s.handle_input(t0, key_down('q')), Some(KeyAction::HoldStart('q')));
    }

    #[test]
    fn test_replace_sound() {
        let t0 = Instant::now();
        let mut s = session(t0, false);
        s.toggle_edit_mode();
        s.handle_input(t0, key_down('q'));

        s.replace_sound('q', Path::new("drums/kick.wav")).unwrap();
        assert_eq!(s.bank().resolve('q'), Some(&PathBuf::from("drums/kick.wav")));
        assert_eq!(
            s.settings().binding('q').unwrap().source,
            Some(PathBuf::from("drums/kick.wav"))
        );
        assert_eq!(
            last_notice(&s),
            &(MessageType::Success, "Sound updated for key: Q".to_string())
        );
        assert_eq!(s.editing_key(), None);
    }

    #[test]
    fn test_replace_with_unsupported_asset() {
        let t0 = Instant::now();
        let mut s = session(t0, false);

        let err = s.replace_sound('q', Path::new("notes.txt")).unwrap_err();
        assert!(matches!(err, SessionError::Load(LoadError::UnsupportedAsset(_))));
        assert_eq!(s.bank().resolve('q'), Some(&PathBuf::from("sounds/q.mp3")));
        assert_eq!(
            s.settings().binding('q').unwrap().source,
            Some(PathBuf::from("sounds/q.mp3"))
        );
        assert_eq!(last_notice(&s).0, MessageType::Error);
    }

    #[test]
    fn test_add_duplicate_key() {
        let t0 = Instant::now();
        let mut s = session(t0, false);

        let err = s.add_key("A", Some(Path::new("a2.mp3"))).unwrap_err();
        assert!(matches!(err, SessionError::Bank(BankError::DuplicateKey('a'))));
        assert_eq!(
            last_notice(&s),
            &(MessageType::Error, "Key already exists: A".to_string())
        );
        assert_eq!(s.board().len(), 6);
        assert_eq!(s.bank().resolve('a'), Some(&PathBuf::from("sounds/a.mp3")));
    }

    #[test]
    fn test_add_key_validation() {
        let t0 = Instant::now();
        let mut s = session(t0, false);

        assert!(matches!(s.add_key("  ", None), Err(SessionError::EmptyKey)));
        assert_eq!(last_notice(&s).1, "Please enter a key character");
        assert!(matches!(s.add_key("ab", None), Err(SessionError::InvalidKey)));
        assert!(matches!(
            s.add_key("k", Some(Path::new("k.txt"))),
            Err(SessionError::Load(LoadError::UnsupportedAsset(_)))
        ));
        assert_eq!(s.board().len(), 6);
        assert_eq!(s.settings().bindings.len(), 6);
    }

    #[test]
    fn test_add_key_with_sound() {
        let t0 = Instant::now();
        let mut s = session(t0, false);

        assert_eq!(s.add_key(" K ", Some(Path::new("k.ogg"))).unwrap(), 'k');
        assert_eq!(s.board().last(), Some(&'k'));
        assert_eq!(s.screen().keys.last(), Some(&'k'));
        assert_eq!(s.bank().resolve('K'), Some(&PathBuf::from("k.ogg")));

        s.handle_input(t0, key_down('k'));
        assert!(s.playback().voice('k').unwrap().is_playing());
    }

    #[test]
    fn test_silent_key_shows_visuals_only() {
        let t0 = Instant::now();
        let mut s = session(t0, false);
        s.add_key("m", None).unwrap();
        assert_eq!(s.settings().binding('m').unwrap().source, None);

        s.handle_input(t0, key_down('m'));
        assert!(s.playback().voice('m').is_none());
        assert_eq!(s.screen().flashes, vec!['m']);
        assert_eq!(s.screen().colors.len(), 2);
    }

    #[test]
    fn test_color_field() {
        let t0 = Instant::now();
        let mut s = session(t0, true);
        s.handle_input(t0, key_down('q'));

        s.focus_color(t0);
        assert!(s.playback().held_keys().is_empty());
        assert_eq!(s.playback().playing_count(), 0);
        assert!(s.screen().options.color_focused);

        // Board keys go nowhere while the field has focus
        assert_eq!(s.handle_input(t0, key_down('w')), None);

        for _ in 0..7 {
            s.color_backspace();
        }
        for c in "#2c3e50".chars() {
            s.color_input(c);
        }
        let color = HexColor::rgb(0x2C, 0x3E, 0x50);
        assert_eq!(s.color_text(), "#2C3E50");
        assert_eq!(s.screen().colors.last(), Some(&color));
        assert_eq!(s.settings().background_color, color);

        s.color_backspace();
        s.color_input('g');
        assert_eq!(s.blur_color(), color);
        assert_eq!(s.color_text(), "#2C3E50");
        assert!(!s.screen().options.color_focused);
    }

    #[test]
    fn test_reset_to_defaults() {
        let t0 = Instant::now();
        let mut s = session(t0, false);
        s.add_key("k", None).unwrap();
        s.replace_sound('q', Path::new("kick.wav")).unwrap();
        s.volume_up();
        s.toggle_edit_mode();
        s.handle_input(t0, key_down('q'));

        s.reset_to_defaults(t0);
        assert_eq!(s.settings(), &Settings::default());
        assert_eq!(s.board(), &['q', 'w', 'e', 'a', 's', 'd']);
        assert_eq!(s.screen().keys, s.board());
        assert_eq!(s.bank().resolve('q'), Some(&PathBuf::from("sounds/q.mp3")));
        assert!(!s.edit_mode());
        assert_eq!(s.editing_key(), None);
        assert_eq!(s.screen().colors.last(), Some(&HexColor::BLACK));
        assert_eq!(s.color_text(), "#000000");
    }
}
