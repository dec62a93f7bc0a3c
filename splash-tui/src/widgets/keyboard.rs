//! Key board widget - the on-screen key caps

use crate::app::AppState;
use ratatui::{
    buffer::Buffer,
    layout::{Alignment, Rect},
    text::Span,
    widgets::{Block, Borders, Paragraph, Widget},
};

/// Draws every key cap from the board layout held in `AppState`
pub struct KeyboardWidget<'a> {
    state: &'a AppState,
}

impl<'a> KeyboardWidget<'a> {
    pub fn new(state: &'a AppState) -> Self {
        Self { state }
    }
}

impl Widget for KeyboardWidget<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let theme = &self.state.theme;
        let focused = self.state.focused();
        let edit_mode = self.state.options.edit_mode;

        for cap in self.state.layout.caps() {
            let rect = cap.area.intersection(area);
            if rect.width < 3 || rect.height < 3 {
                continue;
            }

            let style = if self.state.is_flashing(cap.key) {
                theme.highlight()
            } else if self.state.held.contains(&cap.key) {
                theme.cap_held()
            } else {
                theme.cap()
            };
            let border = if focused == Some(cap.key) {
                theme.border_active()
            } else {
                theme.border()
            };

            let mut block = Block::default()
                .borders(Borders::ALL)
                .border_style(border)
                .style(style);
            if edit_mode {
                block = block.title_top(Span::styled("✎", border).into_right_aligned_line());
            }

            let label = cap.key.to_uppercase().collect::<String>();
            Paragraph::new(Span::styled(label, style))
                .alignment(Alignment::Center)
                .block(block)
                .render(rect, buf);
        }
    }
}
