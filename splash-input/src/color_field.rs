//! Hex color text field for the background color

use splash_core::HexColor;

/// Longest accepted entry: `#` and six hex digits
const MAX_LEN: usize = 7;

/// What a keystroke did to the field
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldChange {
    /// Keystroke rejected
    Ignored,
    Edited,
    /// The text became a complete color, which is now committed
    Applied(HexColor),
}

/// Editable `#RRGGBB` field.
///
/// The first character is always `#`, then only hex digits are accepted,
/// up to six of them. A complete value is applied immediately; blurring the
/// field with anything else restores the last applied value.
#[derive(Debug, Clone)]
pub struct HexColorField {
    text: String,
    committed: HexColor,
    focused: bool,
}

impl HexColorField {
    pub fn new(committed: HexColor) -> Self {
        Self {
            text: committed.to_string(),
            committed,
            focused: false,
        }
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn committed(&self) -> HexColor {
        self.committed
    }

    pub fn is_focused(&self) -> bool {
        self.focused
    }

    pub fn focus(&mut self) {
        self.focused = true;
    }

    /// Leave the field, reverting incomplete input. Returns the committed color.
    pub fn blur(&mut self) -> HexColor {
        self.focused = false;
        if HexColor::parse(&self.text).is_err() {
            self.text = self.committed.to_string();
        }
        self.committed
    }

    /// Replace the committed value from outside (e.g. a random recolor)
    pub fn set_committed(&mut self, color: HexColor) {
        self.committed = color;
        if !self.focused {
            self.text = color.to_string();
        }
    }

    pub fn input(&mut self, c: char) -> FieldChange {
        if self.text.is_empty() {
            // Any first keystroke produces the leading '#'
            self.text.push('#');
            return FieldChange::Edited;
        }
        if self.text.len() >= MAX_LEN || !c.is_ascii_hexdigit() {
            return FieldChange::Ignored;
        }

        self.text.push(c.to_ascii_uppercase());
        self.apply()
    }

    pub fn backspace(&mut self) -> FieldChange {
        if self.text.pop().is_none() {
            return FieldChange::Ignored;
        }
        FieldChange::Edited
    }

    pub fn clear(&mut self) {
        self.text.clear();
    }

    fn apply(&mut self) -> FieldChange {
        match HexColor::parse(&self.text) {
            Ok(color) => {
                self.committed = color;
                FieldChange::Applied(color)
            }
            Err(_) => FieldChange::Edited,
        }
    }
}

impl Default for HexColorField {
    fn default() -> Self {
        Self::new(HexColor::BLACK)
    }
}
