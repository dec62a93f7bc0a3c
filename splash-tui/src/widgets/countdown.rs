//! Inactivity countdown badge

use crate::theme::Theme;
use ratatui::{
    buffer::Buffer,
    layout::{Alignment, Rect},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Widget},
};

pub struct CountdownWidget<'a> {
    seconds: u8,
    theme: &'a Theme,
}

impl<'a> CountdownWidget<'a> {
    pub fn new(seconds: u8, theme: &'a Theme) -> Self {
        Self { seconds, theme }
    }

    /// Area the badge wants in the top-right corner of `area`
    pub fn placement(area: Rect) -> Rect {
        let width = 16.min(area.width);
        let height = 3.min(area.height);
        Rect::new(area.right() - width, area.y, width, height)
    }
}

impl Widget for CountdownWidget<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let style = if self.seconds <= 3 {
            self.theme.meter_style(1.0)
        } else {
            self.theme.normal()
        };

        let line = Line::from(vec![
            Span::styled("Recolor in ", self.theme.dim()),
            Span::styled(format!("{}", self.seconds), style),
        ]);

        Paragraph::new(line)
            .alignment(Alignment::Center)
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .border_style(self.theme.border())
                    .style(self.theme.normal()),
            )
            .render(area, buf);
    }
}
