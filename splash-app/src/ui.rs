//! Frame layout and rendering

use ratatui::{
    layout::{Constraint, Layout, Rect},
    text::{Line, Span},
    widgets::{Block, Paragraph},
    Frame,
};

use splash_input::Mode;
use splash_tui::{
    AppState, ConfirmWidget, CountdownWidget, HelpWidget, KeyboardWidget, OptionsWidget,
    ParticlesWidget, StatusBarWidget, Theme,
};

const OPTIONS_HEIGHT: u16 = 9;

pub fn render_ui(frame: &mut Frame, state: &mut AppState) {
    let area = frame.area();

    let chunks = Layout::vertical([
        Constraint::Length(1),              // Title
        Constraint::Min(5),                 // Board
        Constraint::Length(OPTIONS_HEIGHT), // Options
        Constraint::Length(1),              // Status bar
    ])
    .split(area);

    // Layout has to match what is drawn so mouse hits line up
    state.layout_board(chunks[1]);
    let theme = &state.theme;

    frame.render_widget(Block::default().style(theme.normal()), area);
    render_title(frame, chunks[0], theme);

    frame.render_widget(KeyboardWidget::new(state), chunks[1]);
    frame.render_widget(
        ParticlesWidget::new(state.particles.particles(), theme),
        area,
    );

    if let Some(seconds) = state.countdown {
        frame.render_widget(
            CountdownWidget::new(seconds, theme),
            CountdownWidget::placement(chunks[1]),
        );
    }

    let options = OptionsWidget::new(&state.options, theme).prompt(state.prompt.as_ref());
    frame.render_widget(options, chunks[2]);

    let status = StatusBarWidget::new(state.mode, theme)
        .message(state.message.as_deref(), state.message_type)
        .voices(state.active_voices);
    frame.render_widget(status, chunks[3]);

    if state.mode == Mode::ConfirmReset {
        frame.render_widget(ConfirmWidget::new(theme), centered_rect(46, 6, area));
    }

    if state.show_help {
        let help = HelpWidget::new(theme).scroll(state.help_scroll);
        frame.render_widget(help, centered_rect(56, 31, area));
    }
}

fn render_title(frame: &mut Frame, area: Rect, theme: &Theme) {
    let title_text = " SPLASH ";
    let width = area.width as usize;
    let padding = width.saturating_sub(title_text.len()) / 2;
    let rest = width.saturating_sub(padding + title_text.len());
    let padded = format!("{:═<padding$}{title_text}{:═<rest$}", "", "");

    let line = Line::from(Span::styled(padded, theme.title()));
    frame.render_widget(Paragraph::new(line), area);
}

/// Create a centered rectangle
pub fn centered_rect(width: u16, height: u16, area: Rect) -> Rect {
    let x = area.x + (area.width.saturating_sub(width)) / 2;
    let y = area.y + (area.height.saturating_sub(height)) / 2;
    Rect::new(x, y, width.min(area.width), height.min(area.height))
}

#[cfg(test)]
mod tests {
    use super::*;
    use ratatui::{backend::TestBackend, Terminal};
    use splash_tui::Screen;

    #[test]
    fn test_centered_rect() {
        let area = Rect::new(0, 0, 100, 40);
        assert_eq!(centered_rect(46, 6, area), Rect::new(27, 17, 46, 6));
        assert_eq!(centered_rect(200, 6, area), Rect::new(0, 17, 100, 6));
    }

    #[test]
    fn test_render_lays_out_board() {
        let mut terminal = Terminal::new(TestBackend::new(80, 24)).unwrap();
        let mut state = AppState::new();
        state.set_keys(&['q', 'w', 'e']);
        state.set_countdown(Some(4));

        terminal.draw(|frame| render_ui(frame, &mut state)).unwrap();

        let q = state.layout.cap('q').unwrap().area;
        assert!(q.y >= 1 && q.bottom() <= 24 - OPTIONS_HEIGHT - 1);
        let buffer = terminal.backend().buffer();
        assert_eq!(buffer[(q.x + 3, q.y + 1)].symbol(), "Q");
    }
}
