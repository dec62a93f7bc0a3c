//! Options panel - volume, particles, background color, edit mode, prompts

use crate::app::{OptionsView, PromptView};
use crate::theme::Theme;
use ratatui::{
    buffer::Buffer,
    layout::{Alignment, Rect},
    style::Style,
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph, Widget},
};

const METER_WIDTH: usize = 20;

/// Widget for the options panel under the board
pub struct OptionsWidget<'a> {
    view: &'a OptionsView,
    prompt: Option<&'a PromptView>,
    theme: &'a Theme,
}

impl<'a> OptionsWidget<'a> {
    pub fn new(view: &'a OptionsView, theme: &'a Theme) -> Self {
        Self {
            view,
            prompt: None,
            theme,
        }
    }

    pub fn prompt(mut self, prompt: Option<&'a PromptView>) -> Self {
        self.prompt = prompt;
        self
    }

    fn volume_line(&self) -> Line<'a> {
        let filled = usize::from(self.view.volume) * METER_WIDTH / 100;
        let level = f32::from(self.view.volume) / 100.0;
        Line::from(vec![
            Span::styled("Volume     ", self.theme.dim()),
            Span::styled("█".repeat(filled), self.theme.meter_style(level)),
            Span::styled("░".repeat(METER_WIDTH - filled), self.theme.dim()),
            Span::styled(format!(" {}%", self.view.volume), self.theme.normal()),
        ])
    }

    fn toggle_span(&self, on: bool) -> Span<'a> {
        if on {
            Span::styled("ON", Style::default().fg(self.theme.accent))
        } else {
            Span::styled("OFF", self.theme.dim())
        }
    }

    fn color_line(&self) -> Line<'a> {
        let mut spans = vec![
            Span::styled("Background ", self.theme.dim()),
            Span::styled(self.view.color_text.clone(), self.theme.normal()),
        ];
        if self.view.color_focused {
            spans.push(Span::styled("█", self.theme.highlight()));
        }
        Line::from(spans)
    }
}

impl Widget for OptionsWidget<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let block = Block::default()
            .borders(Borders::ALL)
            .border_style(self.theme.border())
            .style(self.theme.normal())
            .title(Span::styled(" OPTIONS ", self.theme.title()));

        let mut lines = vec![
            self.volume_line(),
            Line::from(vec![
                Span::styled("Particles  ", self.theme.dim()),
                self.toggle_span(self.view.particles),
            ]),
            self.color_line(),
            Line::from(vec![
                Span::styled("Edit mode  ", self.theme.dim()),
                self.toggle_span(self.view.edit_mode),
            ]),
        ];

        if let Some(key) = self.view.editing_key {
            lines.push(Line::from(Span::styled(
                format!("Editing Key: {}", key.to_uppercase()),
                self.theme.title(),
            )));
        } else if self.view.edit_mode {
            lines.push(Line::from(Span::styled(
                "Press a key to replace its sound",
                self.theme.dim(),
            )));
        }

        if let Some(prompt) = self.prompt {
            lines.push(Line::from(vec![
                Span::styled(format!("{} ", prompt.label), self.theme.title()),
                Span::styled(prompt.text.clone(), self.theme.normal()),
                Span::styled("█", self.theme.highlight()),
            ]));
        }

        Paragraph::new(lines).block(block).render(area, buf);
    }
}

/// Yes/no dialog for resetting to defaults
pub struct ConfirmWidget<'a> {
    theme: &'a Theme,
}

impl<'a> ConfirmWidget<'a> {
    pub fn new(theme: &'a Theme) -> Self {
        Self { theme }
    }
}

impl Widget for ConfirmWidget<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        Clear.render(area, buf);
        let block = Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(self.theme.warning))
            .style(self.theme.normal())
            .title(Span::styled(" RESET ", self.theme.title()));

        let lines = vec![
            Line::from("Reset all settings to default?"),
            Line::from(Span::styled(
                "Custom keys and sounds will be removed.",
                self.theme.dim(),
            )),
            Line::from(""),
            Line::from(Span::styled("[y] reset   [n] keep", self.theme.title())),
        ];

        Paragraph::new(lines)
            .alignment(Alignment::Center)
            .block(block)
            .render(area, buf);
    }
}
