//! Splash - terminal soundboard
//!
//! Keys play sounds, burst particles and recolor the board.

mod audio;
mod logging;
mod session;
mod ui;

use std::io::{self, stdout};
use std::path::PathBuf;
use std::thread;
use std::time::{Duration, Instant};

use crossterm::{
    event::{
        self, DisableFocusChange, DisableMouseCapture, EnableFocusChange, EnableMouseCapture,
        Event, KeyEvent, KeyboardEnhancementFlags, MouseButton, MouseEvent, MouseEventKind,
        PopKeyboardEnhancementFlags, PushKeyboardEnhancementFlags,
    },
    execute,
    terminal::{
        disable_raw_mode, enable_raw_mode, supports_keyboard_enhancement, EnterAlternateScreen,
        LeaveAlternateScreen,
    },
};
use ratatui::{backend::CrosstermBackend, Terminal};
use tracing::{info, warn};

use session::Session;
use splash_audio::{AudioEngine, AudioEvent, EngineBackend};
use splash_input::{Command, Direction, InputHandler, KeyAction, Mode, RawInput};
use splash_library::Settings;
use splash_tui::{AppState, PromptView};

/// Frame rate for UI updates
const FPS: u64 = 30;

fn main() -> anyhow::Result<()> {
    match logging::init_logging() {
        Ok(path) => info!(log = %path.display(), "splash starting"),
        Err(e) => eprintln!("logging disabled: {e}"),
    }
    let settings = Settings::load();

    // Initialize terminal
    enable_raw_mode()?;
    let mut stdout = stdout();
    execute!(
        stdout,
        EnterAlternateScreen,
        EnableMouseCapture,
        EnableFocusChange
    )?;
    let reports_release = supports_keyboard_enhancement().unwrap_or(false);
    if reports_release {
        execute!(
            stdout,
            PushKeyboardEnhancementFlags(KeyboardEnhancementFlags::REPORT_EVENT_TYPES)
        )?;
    }
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;
    terminal.clear()?;

    // Spawn audio thread
    let (cmd_tx, cmd_rx, evt_tx, evt_rx) = AudioEngine::create_channels();
    let engine = AudioEngine::new(cmd_tx, evt_rx);
    let shutdown_audio = engine.shutdown_flag();
    let audio_handle = thread::spawn(move || {
        audio::run_audio_thread(cmd_rx, evt_tx, shutdown_audio);
    });

    info!(reports_release, "terminal ready");

    let result = run_app(&mut terminal, &engine, settings, reports_release);

    // Cleanup
    engine.shutdown();
    if reports_release {
        execute!(terminal.backend_mut(), PopKeyboardEnhancementFlags)?;
    }
    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        DisableFocusChange,
        DisableMouseCapture,
        LeaveAlternateScreen
    )?;
    terminal.show_cursor()?;

    let _ = audio_handle.join();

    result
}

/// Text prompt currently shown in the options panel
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Prompt {
    NewKey,
    /// Optional sound for a key that passed validation
    NewKeySound(char),
    ReplaceSound(char),
}

impl Prompt {
    fn label(&self) -> String {
        match self {
            Prompt::NewKey => "New key:".to_string(),
            Prompt::NewKeySound(key) => format!(
                "Sound file for key {} (optional, Enter to skip):",
                key.to_uppercase()
            ),
            Prompt::ReplaceSound(key) => format!("Sound file for key {}:", key.to_uppercase()),
        }
    }
}

struct App {
    session: Session<EngineBackend, AppState>,
    input: InputHandler,
    prompt: Option<Prompt>,
    /// Key cap the left mouse button went down on
    pointer_key: Option<char>,
    should_quit: bool,
}

impl App {
    fn state(&mut self) -> &mut AppState {
        self.session.screen_mut()
    }

    fn handle_event(&mut self, now: Instant, event: Event) {
        match event {
            Event::Key(key) => self.handle_key(now, key),
            Event::Mouse(mouse) => self.handle_mouse(now, mouse),
            Event::FocusLost => self.handle_raw(now, RawInput::FocusLost),
            Event::FocusGained => self.session.set_visible(now, true),
            Event::Resize(..) | Event::Paste(_) => {}
        }
    }

    fn handle_key(&mut self, now: Instant, key: KeyEvent) {
        if let Some(cmd) = self.input.handle_key(key) {
            self.handle_command(now, cmd);
        }
    }

    fn handle_mouse(&mut self, now: Instant, mouse: MouseEvent) {
        if !matches!(self.input.mode(), Mode::Play | Mode::Edit) {
            return;
        }

        let under = self.state().key_at(mouse.column, mouse.row);
        match mouse.kind {
            MouseEventKind::Down(MouseButton::Left) => {
                if let Some(key) = under {
                    self.pointer_key = Some(key);
                    self.handle_raw(now, RawInput::PointerDown(key));
                }
            }
            MouseEventKind::Drag(MouseButton::Left) => {
                if let Some(key) = self.pointer_key.filter(|&k| under != Some(k)) {
                    self.pointer_key = None;
                    self.handle_raw(now, RawInput::PointerLeave(key));
                }
            }
            MouseEventKind::Up(MouseButton::Left) => {
                if let Some(key) = self.pointer_key.take() {
                    let input = if under == Some(key) {
                        RawInput::PointerUp(key)
                    } else {
                        RawInput::PointerLeave(key)
                    };
                    self.handle_raw(now, input);
                }
            }
            _ => {}
        }
    }

    fn handle_raw(&mut self, now: Instant, input: RawInput) {
        if let Some(KeyAction::Remap(key)) = self.session.handle_input(now, input) {
            self.pointer_key = None;
            self.open_prompt(Prompt::ReplaceSound(key));
        }
    }

    fn handle_command(&mut self, now: Instant, cmd: Command) {
        match cmd {
            Command::Key(input) => self.handle_raw(now, input),
            Command::MoveFocus(direction) => {
                self.state().move_focus(direction == Direction::Right);
            }
            Command::ActivateFocused => {
                if let Some(key) = self.state().focused() {
                    self.handle_raw(now, RawInput::Tap(key));
                }
            }

            Command::VolumeUp => self.session.volume_up(),
            Command::VolumeDown => self.session.volume_down(),
            Command::ToggleParticles => self.session.toggle_particles(),
            Command::ToggleEditMode => {
                self.session.toggle_edit_mode();
                let msg = if self.session.edit_mode() {
                    "Edit mode: press a key to replace its sound"
                } else {
                    "Edit mode off"
                };
                self.state().set_message(msg);
            }
            Command::AddKey => self.open_prompt(Prompt::NewKey),
            Command::EditColor => self.session.focus_color(now),
            Command::RequestReset => {}
            Command::ConfirmReset => {
                self.session.reset_to_defaults(now);
                self.input.reset();
            }

            Command::TextInput(c) => match self.input.mode() {
                Mode::Color => self.session.color_input(c),
                _ => {
                    if let Some(prompt) = self.state().prompt.as_mut() {
                        prompt.text.push(c);
                    }
                }
            },
            Command::TextBackspace => match self.input.mode() {
                Mode::Color => self.session.color_backspace(),
                _ => {
                    if let Some(prompt) = self.state().prompt.as_mut() {
                        prompt.text.pop();
                    }
                }
            },
            Command::Submit => match self.input.mode() {
                Mode::Color => self.close_color(),
                _ => self.submit_prompt(),
            },

            Command::ToggleHelp => {}
            Command::HelpScrollUp => {
                let state = self.state();
                state.help_scroll = state.help_scroll.saturating_sub(1);
            }
            Command::HelpScrollDown => {
                let state = self.state();
                state.help_scroll = state.help_scroll.saturating_add(1);
            }
            Command::Cancel => match self.input.mode() {
                Mode::Color => self.close_color(),
                Mode::Prompt => {
                    self.close_prompt();
                    self.session.cancel_editing();
                }
                _ => self.state().clear_message(),
            },
            Command::Quit => self.should_quit = true,
        }
    }

    fn close_color(&mut self) {
        let color = self.session.blur_color();
        info!(%color, "background color set");
        self.input.back();
    }

    fn open_prompt(&mut self, prompt: Prompt) {
        self.session.begin_text_entry();
        self.prompt = Some(prompt);
        self.state().prompt = Some(PromptView {
            label: prompt.label(),
            text: String::new(),
        });
        if self.input.mode() != Mode::Prompt {
            self.input.set_mode(Mode::Prompt);
        }
    }

    fn close_prompt(&mut self) {
        self.prompt = None;
        self.state().prompt = None;
        self.session.end_text_entry();
        self.input.back();
    }

    fn submit_prompt(&mut self) {
        let text = self
            .state()
            .prompt
            .as_ref()
            .map(|p| p.text.trim().to_string())
            .unwrap_or_default();

        match self.prompt {
            Some(Prompt::NewKey) => match self.session.validate_new_key(&text) {
                Ok(key) => {
                    self.open_prompt(Prompt::NewKeySound(key));
                    return;
                }
                Err(e) => self.state().set_error(e.to_string()),
            },
            Some(Prompt::NewKeySound(key)) => {
                let source = (!text.is_empty()).then(|| PathBuf::from(&text));
                let _ = self.session.add_key(&key.to_string(), source.as_deref());
            }
            Some(Prompt::ReplaceSound(key)) => {
                let replaced = !text.is_empty()
                    && self
                        .session
                        .replace_sound(key, &PathBuf::from(&text))
                        .is_ok();
                if !replaced {
                    self.session.cancel_editing();
                }
            }
            None => {}
        }

        self.close_prompt();
    }
}

fn run_app(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    engine: &AudioEngine,
    settings: Settings,
    reports_release: bool,
) -> anyhow::Result<()> {
    let (sample_rate, audio_error) = audio::wait_for_ready(engine);
    let backend = EngineBackend::new(engine.command_tx.clone(), sample_rate);

    let session = Session::new(
        settings,
        backend,
        AppState::new(),
        reports_release,
        Instant::now(),
    );
    let mut app = App {
        session,
        input: InputHandler::new(),
        prompt: None,
        pointer_key: None,
        should_quit: false,
    };

    match audio_error {
        Some(e) => app.state().set_error(format!("Audio unavailable: {e}")),
        None if !reports_release => app
            .state()
            .set_message("Splash | Keys play once (terminal has no key release), F1 for help"),
        None => app
            .state()
            .set_message("Splash | Press or hold keys to play, F1 for help"),
    }

    let frame_duration = Duration::from_millis(1000 / FPS);
    let mut last_frame = Instant::now();

    loop {
        if app.should_quit {
            break;
        }

        // Process audio events
        while let Ok(event) = engine.event_rx.try_recv() {
            match event {
                AudioEvent::StateUpdate {
                    active_voices,
                    peak,
                } => app.state().update_audio(active_voices, peak),
                AudioEvent::Error(e) => {
                    warn!(error = %e, "audio error");
                    app.state().set_error(e);
                }
                AudioEvent::Ready { .. } => {}
            }
        }

        let now = Instant::now();
        app.session.tick(now);
        let mode = app.input.mode();
        let state = app.state();
        state.tick(now);
        state.set_mode(mode);

        terminal.draw(|frame| ui::render_ui(frame, app.session.screen_mut()))?;

        // Handle input
        let mut timeout = frame_duration.saturating_sub(last_frame.elapsed());
        if let Some(deadline) = app.session.next_deadline() {
            timeout = timeout.min(deadline.saturating_duration_since(Instant::now()));
        }
        if event::poll(timeout)? {
            app.handle_event(Instant::now(), event::read()?);
            while event::poll(Duration::ZERO)? {
                app.handle_event(Instant::now(), event::read()?);
            }
        }

        // Maintain frame rate
        let elapsed = last_frame.elapsed();
        if elapsed < frame_duration {
            thread::sleep(frame_duration - elapsed);
        }
        last_frame = Instant::now();
    }

    if let Err(e) = app.session.settings().save() {
        warn!(error = %e, "could not save settings");
    } else {
        info!(path = %Settings::config_path().display(), "settings saved");
    }

    Ok(())
}
