//! Press / hold / release classification for pointer and keyboard input

use splash_core::{fold_key, TimerId, TimerQueue};
use std::collections::{HashMap, HashSet};
use std::time::{Duration, Instant};
use tracing::debug;

/// How long a pointer must stay down before it counts as a hold
pub const HOLD_THRESHOLD: Duration = Duration::from_millis(300);

/// Input as it arrives from the terminal, already mapped to key identifiers
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RawInput {
    PointerDown(char),
    PointerUp(char),
    /// Pointer moved off the key cap while pressed
    PointerLeave(char),
    /// Explicit activation of a key cap (Enter on the focused cap)
    Tap(char),
    KeyDown { key: char, repeat: bool },
    KeyUp(char),
    /// Terminal lost focus
    FocusLost,
}

/// Logical key actions
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyAction {
    /// One-shot play
    Tap(char),
    /// Start looping until the matching HoldEnd
    HoldStart(char),
    HoldEnd(char),
    /// Drop every hold
    ReleaseAll,
    /// Key chosen for remapping in edit mode
    Remap(char),
}

/// Turns raw input into [`KeyAction`]s.
///
/// Pointer holds are detected with a timer per key; call [`poll`] from the
/// frame loop to collect holds that crossed the threshold.
///
/// [`poll`]: KeyInputController::poll
pub struct KeyInputController {
    edit_mode: bool,
    text_focus: bool,
    /// Terminal sends key release events
    reports_release: bool,
    hold_timers: TimerQueue<char>,
    /// Pointer presses still under the hold threshold
    pending: HashMap<char, TimerId>,
    pointer_held: HashSet<char>,
    keys_down: HashSet<char>,
}

impl KeyInputController {
    pub fn new(reports_release: bool) -> Self {
        Self {
            edit_mode: false,
            text_focus: false,
            reports_release,
            hold_timers: TimerQueue::new(),
            pending: HashMap::new(),
            pointer_held: HashSet::new(),
            keys_down: HashSet::new(),
        }
    }

    pub fn edit_mode(&self) -> bool {
        self.edit_mode
    }

    pub fn set_edit_mode(&mut self, enabled: bool) {
        self.edit_mode = enabled;
        self.cancel_pending();
    }

    pub fn text_focus(&self) -> bool {
        self.text_focus
    }

    /// While a text field has focus every key press belongs to the field
    pub fn set_text_focus(&mut self, focused: bool) {
        self.text_focus = focused;
        if focused {
            self.reset();
        }
    }

    pub fn reports_release(&self) -> bool {
        self.reports_release
    }

    pub fn set_reports_release(&mut self, reports: bool) {
        self.reports_release = reports;
    }

    /// Keys currently pressed on the keyboard or held with the pointer
    pub fn is_pressed(&self, key: char) -> bool {
        let key = fold_key(key);
        self.keys_down.contains(&key)
            || self.pointer_held.contains(&key)
            || self.pending.contains_key(&key)
    }

    /// Deadline of the next pending hold, for the event loop timeout
    pub fn next_deadline(&self) -> Option<Instant> {
        self.hold_timers.next_deadline()
    }

    pub fn handle(&mut self, now: Instant, input: RawInput) -> Option<KeyAction> {
        if input == RawInput::FocusLost {
            self.reset();
            return Some(KeyAction::ReleaseAll);
        }
        if self.text_focus {
            return None;
        }
        if self.edit_mode {
            return match input {
                RawInput::PointerDown(key)
                | RawInput::Tap(key)
                | RawInput::KeyDown { key, repeat: false } => Some(KeyAction::Remap(fold_key(key))),
                // Holds started before edit mode still end
                RawInput::PointerUp(key) | RawInput::PointerLeave(key) => {
                    let key = fold_key(key);
                    self.pointer_held
                        .remove(&key)
                        .then_some(KeyAction::HoldEnd(key))
                }
                RawInput::KeyUp(key) => self.release_key(key),
                _ => None,
            };
        }

        match input {
            RawInput::PointerDown(key) => {
                let key = fold_key(key);
                if self.pending.contains_key(&key) || self.pointer_held.contains(&key) {
                    return None;
                }
                let id = self.hold_timers.schedule_after(now, HOLD_THRESHOLD, key);
                self.pending.insert(key, id);
                None
            }
            RawInput::PointerUp(key) => {
                let key = fold_key(key);
                if let Some(id) = self.pending.remove(&key) {
                    self.hold_timers.cancel(id);
                    Some(KeyAction::Tap(key))
                } else if self.pointer_held.remove(&key) {
                    Some(KeyAction::HoldEnd(key))
                } else {
                    None
                }
            }
            RawInput::PointerLeave(key) => {
                let key = fold_key(key);
                if let Some(id) = self.pending.remove(&key) {
                    self.hold_timers.cancel(id);
                    None
                } else if self.pointer_held.remove(&key) {
                    Some(KeyAction::HoldEnd(key))
                } else {
                    None
                }
            }
            RawInput::Tap(key) => Some(KeyAction::Tap(fold_key(key))),
            RawInput::KeyDown { repeat: true, .. } => None,
            RawInput::KeyDown { key, repeat: false } => {
                let key = fold_key(key);
                if !self.reports_release {
                    return Some(KeyAction::Tap(key));
                }
                if !self.keys_down.insert(key) {
                    return None;
                }
                Some(KeyAction::HoldStart(key))
            }
            RawInput::KeyUp(key) => self.release_key(key),
            RawInput::FocusLost => None,
        }
    }

    fn release_key(&mut self, key: char) -> Option<KeyAction> {
        let key = fold_key(key);
        self.keys_down
            .remove(&key)
            .then_some(KeyAction::HoldEnd(key))
    }

    /// Collect pointer presses that have been down for the hold threshold
    pub fn poll(&mut self, now: Instant) -> Vec<KeyAction> {
        let mut actions = Vec::new();
        while let Some(due) = self.hold_timers.pop_due(now) {
            let key = due.payload;
            if self.pending.remove(&key).is_some() {
                debug!(%key, "pointer hold");
                self.pointer_held.insert(key);
                actions.push(KeyAction::HoldStart(key));
            }
        }
        actions
    }

    fn cancel_pending(&mut self) {
        for (_, id) in self.pending.drain() {
            self.hold_timers.cancel(id);
        }
    }

    /// Forget all pressed state
    pub fn reset(&mut self) {
        self.cancel_pending();
        self.hold_timers.cancel_all();
        self.pointer_held.clear();
        self.keys_down.clear();
    }
}

impl Default for KeyInputController {
    fn default() -> Self {
        Self::new(false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ms(n: u64) -> Duration {
        Duration::from_millis(n)
    }

    #[test]
    fn test_quick_click_is_tap() {
        let t0 = Instant::now();
        let mut c = KeyInputController::new(false);

        assert_eq!(c.handle(t0, RawInput::PointerDown('q')), None);
        assert!(c.poll(t0 + ms(200)).is_empty());
        assert_eq!(
            c.handle(t0 + ms(250), RawInput::PointerUp('q')),
            Some(KeyAction::Tap('q'))
        );
        // The cancelled hold timer never fires
        assert!(c.poll(t0 + ms(1000)).is_empty());
        assert_eq!(c.next_deadline(), None);
    }

    #[test]
    fn test_long_press_is_hold() {
        let t0 = Instant::now();
        let mut c = KeyInputController::new(false);

        c.handle(t0, RawInput::PointerDown('W'));
        assert_eq!(c.next_deadline(), Some(t0 + HOLD_THRESHOLD));
        assert_eq!(c.poll(t0 + ms(300)), vec![KeyAction::HoldStart('w')]);
        assert!(c.is_pressed('w'));
        assert_eq!(
            c.handle(t0 + ms(900), RawInput::PointerUp('w')),
            Some(KeyAction::HoldEnd('w'))
        );
        assert!(!c.is_pressed('w'));
    }

    #[test]
    fn test_pointer_leave() {
        let t0 = Instant::now();
        let mut c = KeyInputController::new(false);

        // Leaving before the threshold cancels silently
        c.handle(t0, RawInput::PointerDown('a'));
        assert_eq!(c.handle(t0 + ms(100), RawInput::PointerLeave('a')), None);
        assert!(c.poll(t0 + ms(500)).is_empty());

        // Leaving while held ends the hold
        c.handle(t0, RawInput::PointerDown('s'));
        c.poll(t0 + ms(400));
        assert_eq!(
            c.handle(t0 + ms(500), RawInput::PointerLeave('s')),
            Some(KeyAction::HoldEnd('s'))
        );
        assert_eq!(c.handle(t0 + ms(600), RawInput::PointerUp('s')), None);
    }

    #[test]
    fn test_keyboard_with_release_events() {
        let t0 = Instant::now();
        let mut c = KeyInputController::new(true);

        let down = RawInput::KeyDown {
            key: 'E',
            repeat: false,
        };
        assert_eq!(c.handle(t0, down), Some(KeyAction::HoldStart('e')));
        assert_eq!(
            c.handle(t0, RawInput::KeyDown { key: 'e', repeat: true }),
            None
        );
        // Already held
        assert_eq!(c.handle(t0, down), None);
        assert_eq!(c.handle(t0, RawInput::KeyUp('e')), Some(KeyAction::HoldEnd('e')));
        assert_eq!(c.handle(t0, RawInput::KeyUp('e')), None);
    }

    #[test]
    fn test_keyboard_without_release_events() {
        let t0 = Instant::now();
        let mut c = KeyInputController::new(false);
        let down = RawInput::KeyDown {
            key: 'd',
            repeat: false,
        };
        assert_eq!(c.handle(t0, down), Some(KeyAction::Tap('d')));
        assert_eq!(c.handle(t0, down), Some(KeyAction::Tap('d')));
    }

    #[test]
    fn test_edit_mode_remaps() {
        let t0 = Instant::now();
        let mut c = KeyInputController::new(true);
        c.set_edit_mode(true);

        assert_eq!(
            c.handle(t0, RawInput::PointerDown('Q')),
            Some(KeyAction::Remap('q'))
        );
        assert_eq!(
            c.handle(t0, RawInput::KeyDown { key: 'w', repeat: false }),
            Some(KeyAction::Remap('w'))
        );
        assert_eq!(c.handle(t0, RawInput::PointerUp('q')), None);
        assert!(c.poll(t0 + ms(1000)).is_empty());
    }

    #[test]
    fn test_hold_survives_edit_mode_toggle() {
        let t0 = Instant::now();
        let mut c = KeyInputController::new(true);
        let down = RawInput::KeyDown {
            key: 'q',
            repeat: false,
        };
        assert_eq!(c.handle(t0, down), Some(KeyAction::HoldStart('q')));

        c.set_edit_mode(true);
        assert_eq!(c.handle(t0, RawInput::KeyUp('q')), Some(KeyAction::HoldEnd('q')));
        assert!(!c.is_pressed('q'));

        c.set_edit_mode(false);
        assert_eq!(c.handle(t0, down), Some(KeyAction::HoldStart('q')));
    }

    #[test]
    fn test_pointer_hold_ends_in_edit_mode() {
        let t0 = Instant::now();
        let mut c = KeyInputController::new(false);
        c.handle(t0, RawInput::PointerDown('a'));
        assert_eq!(c.poll(t0 + ms(300)), vec![KeyAction::HoldStart('a')]);

        c.set_edit_mode(true);
        assert_eq!(
            c.handle(t0 + ms(500), RawInput::PointerUp('a')),
            Some(KeyAction::HoldEnd('a'))
        );
        assert!(!c.is_pressed('a'));
    }

    #[test]
    fn test_text_focus_swallows_input() {
        let t0 = Instant::now();
        let mut c = KeyInputController::new(true);
        c.handle(t0, RawInput::KeyDown { key: 'q', repeat: false });

        c.set_text_focus(true);
        assert!(!c.is_pressed('q'));
        assert_eq!(c.handle(t0, RawInput::KeyDown { key: 'a', repeat: false }), None);
        assert_eq!(c.handle(t0, RawInput::PointerDown('a')), None);
        assert_eq!(c.handle(t0, RawInput::FocusLost), Some(KeyAction::ReleaseAll));

        c.set_text_focus(false);
        assert_eq!(
            c.handle(t0, RawInput::KeyDown { key: 'a', repeat: false }),
            Some(KeyAction::HoldStart('a'))
        );
    }

    #[test]
    fn test_focus_lost_clears_everything() {
        let t0 = Instant::now();
        let mut c = KeyInputController::new(true);
        c.handle(t0, RawInput::KeyDown { key: 'q', repeat: false });
        c.handle(t0, RawInput::PointerDown('w'));

        assert_eq!(c.handle(t0, RawInput::FocusLost), Some(KeyAction::ReleaseAll));
        assert!(!c.is_pressed('q'));
        assert!(c.poll(t0 + ms(1000)).is_empty());
        assert_eq!(c.handle(t0, RawInput::KeyUp('q')), None);
    }
}
