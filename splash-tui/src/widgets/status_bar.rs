//! Status bar widget - mode indicator, messages and key hints

use crate::app::MessageType;
use crate::theme::Theme;
use ratatui::{
    buffer::Buffer,
    layout::{Constraint, Layout, Rect},
    style::Style,
    text::{Line, Span},
    widgets::{Paragraph, Widget},
};
use splash_input::Mode;

/// Widget for displaying the status bar with mode and last message
pub struct StatusBarWidget<'a> {
    mode: Mode,
    message: Option<&'a str>,
    message_type: MessageType,
    active_voices: usize,
    theme: &'a Theme,
}

impl<'a> StatusBarWidget<'a> {
    pub fn new(mode: Mode, theme: &'a Theme) -> Self {
        Self {
            mode,
            message: None,
            message_type: MessageType::Info,
            active_voices: 0,
            theme,
        }
    }

    pub fn message(mut self, msg: Option<&'a str>, msg_type: MessageType) -> Self {
        self.message = msg;
        self.message_type = msg_type;
        self
    }

    pub fn voices(mut self, active: usize) -> Self {
        self.active_voices = active;
        self
    }

    fn mode_style(&self) -> Style {
        match self.mode {
            Mode::Play | Mode::Help => self.theme.highlight(),
            Mode::Edit => Style::default().fg(self.theme.warning),
            Mode::Prompt | Mode::Color => Style::default().fg(self.theme.accent),
            Mode::ConfirmReset => Style::default().fg(self.theme.danger),
        }
    }

    fn hint(&self) -> &'static str {
        match self.mode {
            Mode::Play => "F1:help  F2:edit  ^C:quit",
            Mode::Edit => "key:pick  Esc:done",
            Mode::Prompt => "Enter:ok  Esc:cancel",
            Mode::Color => "#RRGGBB  Esc:done",
            Mode::ConfirmReset => "y:reset  n:keep",
            Mode::Help => "Esc:close help",
        }
    }
}

impl Widget for StatusBarWidget<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        if area.height < 1 {
            return;
        }

        let chunks = Layout::horizontal([
            Constraint::Length(10), // Mode indicator
            Constraint::Min(20),    // Message area
            Constraint::Length(10), // Voice count
            Constraint::Length(26), // Help hint
        ])
        .split(area);

        let mode_line = Line::from(vec![
            Span::raw("["),
            Span::styled(self.mode.display_name(), self.mode_style()),
            Span::raw("]"),
        ]);
        Paragraph::new(mode_line).render(chunks[0], buf);

        let content = if let Some(msg) = self.message {
            let msg_style = match self.message_type {
                MessageType::Info => self.theme.dim(),
                MessageType::Success => Style::from(self.theme.accent),
                MessageType::Warning => Style::default().fg(self.theme.warning),
                MessageType::Error => Style::default().fg(self.theme.danger),
            };
            Line::from(Span::styled(msg, msg_style))
        } else {
            Line::from(Span::styled(
                "Ready. Press a key to play, F1 for help",
                self.theme.dim(),
            ))
        };
        Paragraph::new(content).render(chunks[1], buf);

        let voices = Line::from(Span::styled(
            format!("♪ {}", self.active_voices),
            self.theme.dim(),
        ));
        Paragraph::new(voices).render(chunks[2], buf);

        let help_line = Line::from(Span::styled(self.hint(), self.theme.dim()));
        Paragraph::new(help_line).render(chunks[3], buf);
    }
}

/// Help overlay widget with scrolling support
pub struct HelpWidget<'a> {
    theme: &'a Theme,
    scroll: u16,
}

impl<'a> HelpWidget<'a> {
    pub fn new(theme: &'a Theme) -> Self {
        Self { theme, scroll: 0 }
    }

    pub fn scroll(mut self, scroll: u16) -> Self {
        self.scroll = scroll;
        self
    }

    fn help_lines() -> Vec<&'static str> {
        vec![
            "╔══════════════════════════════════════════════════╗",
            "║                 SPLASH - keys                    ║",
            "╠══════════════════════════════════════════════════╣",
            "║ PLAY                                             ║",
            "║   a-z, 0-9 ...  Play the key's sound             ║",
            "║   hold key      Loop until released              ║",
            "║   mouse click   Play, hold to loop               ║",
            "║   ← / →         Move focus across keys           ║",
            "║   Enter         Play the focused key             ║",
            "╠──────────────────────────────────────────────────╣",
            "║ OPTIONS                                          ║",
            "║   ↑ / ↓         Volume up / down                 ║",
            "║   F2            Toggle edit mode                 ║",
            "║   F3            Add a key                        ║",
            "║   F4            Edit background color            ║",
            "║   F5            Toggle particles                 ║",
            "║   Ctrl-r        Reset to defaults                ║",
            "╠──────────────────────────────────────────────────╣",
            "║ EDIT MODE                                        ║",
            "║   press a key   Choose a new sound for it        ║",
            "║   Esc           Leave edit mode                  ║",
            "╠──────────────────────────────────────────────────╣",
            "║ IDLE                                             ║",
            "║   After 10s a countdown starts, then the         ║",
            "║   background changes color on its own            ║",
            "╠══════════════════════════════════════════════════╣",
            "║          Press Esc or F1 to close help           ║",
            "║               Ctrl-c to quit Splash              ║",
            "╚══════════════════════════════════════════════════╝",
        ]
    }
}

impl Widget for HelpWidget<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        for y in area.y..area.y + area.height {
            for x in area.x..area.x + area.width {
                buf[(x, y)].set_char(' ').set_style(self.theme.normal());
            }
        }

        let help_text = Self::help_lines();
        let total_lines = help_text.len() as u16;
        let visible_lines = area.height.min(total_lines);

        let max_scroll = total_lines.saturating_sub(visible_lines);
        let scroll = self.scroll.min(max_scroll);

        let box_width = help_text[0].chars().count() as u16;
        let start_x = area.x + area.width.saturating_sub(box_width) / 2;

        for (i, line) in help_text
            .iter()
            .skip(scroll as usize)
            .take(visible_lines as usize)
            .enumerate()
        {
            let y = area.y + i as u16;

            for (j, ch) in line.chars().enumerate() {
                let x = start_x + j as u16;
                if x >= area.x + area.width {
                    break;
                }

                let style = if matches!(
                    ch,
                    '║' | '╔' | '╗' | '╚' | '╝' | '═' | '╠' | '╣' | '─' | '│'
                ) {
                    self.theme.border()
                } else {
                    self.theme.normal()
                };

                buf[(x, y)].set_char(ch).set_style(style);
            }
        }

        if total_lines > visible_lines {
            let indicator = format!(" [{}/{}] ", scroll + 1, max_scroll + 1);
            let indicator_x = area.x + area.width.saturating_sub(indicator.len() as u16 + 2);
            let indicator_y = area.y + area.height - 1;

            for (i, ch) in indicator.chars().enumerate() {
                let x = indicator_x + i as u16;
                if x < area.x + area.width {
                    buf[(x, indicator_y)]
                        .set_char(ch)
                        .set_style(self.theme.dim());
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(buf: &Buffer, y: u16) -> String {
        (0..buf.area.width)
            .map(|x| buf[(x, y)].symbol().to_string())
            .collect()
    }

    #[test]
    fn test_status_shows_mode_and_message() {
        let theme = Theme::default();
        let area = Rect::new(0, 0, 100, 1);
        let mut buf = Buffer::empty(area);
        StatusBarWidget::new(Mode::Edit, &theme)
            .message(Some("Editing Key: Q"), MessageType::Info)
            .render(area, &mut buf);

        let line = row(&buf, 0);
        assert!(line.starts_with("[EDIT]"));
        assert!(line.contains("Editing Key: Q"));
        assert!(line.contains("Esc:done"));
    }

    #[test]
    fn test_help_scroll_is_clamped() {
        let theme = Theme::default();
        let area = Rect::new(0, 0, 60, 10);
        let mut buf = Buffer::empty(area);
        HelpWidget::new(&theme).scroll(500).render(area, &mut buf);
        assert!(row(&buf, 9).contains("/20]"));
    }
}
