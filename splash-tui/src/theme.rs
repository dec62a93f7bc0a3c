//! Themes derived from the board's background color

use ratatui::style::{Color, Modifier, Style};
use splash_core::HexColor;

/// Theme configuration for the UI
#[derive(Debug, Clone, PartialEq)]
pub struct Theme {
    /// Primary foreground color (text, borders)
    pub fg: Color,
    /// Dimmed foreground (secondary text)
    pub fg_dim: Color,
    /// Background color
    pub bg: Color,
    /// Key cap face
    pub cap: Color,
    /// Highlight color (flashed keys, focused cap)
    pub highlight: Color,
    /// Accent color (meters, held keys)
    pub accent: Color,
    /// Warning color
    pub warning: Color,
    /// Error/danger color
    pub danger: Color,
}

impl Theme {
    /// Build a readable theme on top of `background`
    pub fn from_background(background: HexColor) -> Self {
        let light = luminance(background) > 0.5;
        let (fg, fg_dim) = if light {
            (Color::Rgb(20, 20, 20), Color::Rgb(80, 80, 80))
        } else {
            (Color::Rgb(240, 240, 240), Color::Rgb(150, 150, 150))
        };

        Self {
            fg,
            fg_dim,
            bg: to_color(background),
            cap: to_color(mix(background, if light { 0 } else { 255 }, 0.15)),
            highlight: Color::Rgb(255, 255, 255),
            accent: Color::Rgb(100, 255, 180),
            warning: Color::Rgb(255, 220, 100),
            danger: Color::Rgb(255, 100, 100),
        }
    }

    /// Get style for normal text
    pub fn normal(&self) -> Style {
        Style::default().fg(self.fg).bg(self.bg)
    }

    /// Get style for dimmed text
    pub fn dim(&self) -> Style {
        Style::default().fg(self.fg_dim).bg(self.bg)
    }

    /// Get style for highlighted/selected items
    pub fn highlight(&self) -> Style {
        Style::default()
            .fg(Color::Black)
            .bg(self.highlight)
            .add_modifier(Modifier::BOLD)
    }

    /// Get style for borders
    pub fn border(&self) -> Style {
        Style::default().fg(self.fg_dim)
    }

    /// Get style for active borders
    pub fn border_active(&self) -> Style {
        Style::default().fg(self.highlight)
    }

    /// Get title style
    pub fn title(&self) -> Style {
        Style::default().fg(self.fg).add_modifier(Modifier::BOLD)
    }

    /// Resting key cap
    pub fn cap(&self) -> Style {
        Style::default()
            .fg(self.fg)
            .bg(self.cap)
            .add_modifier(Modifier::BOLD)
    }

    /// Key cap while its sound is held
    pub fn cap_held(&self) -> Style {
        Style::default()
            .fg(Color::Black)
            .bg(self.accent)
            .add_modifier(Modifier::BOLD)
    }

    /// Get style for meters/bars based on level (0.0 - 1.0)
    pub fn meter_style(&self, level: f32) -> Style {
        let color = if level > 0.85 {
            self.danger
        } else if level > 0.7 {
            self.warning
        } else {
            self.accent
        };
        Style::default().fg(color)
    }

    /// Foreground for a particle, faded toward the background by opacity
    pub fn particle(&self, color: HexColor, opacity: f32) -> Style {
        let faded = match self.bg {
            Color::Rgb(r, g, b) => blend(color, HexColor::rgb(r, g, b), opacity),
            _ => color,
        };
        Style::default().fg(to_color(faded))
    }
}

impl Default for Theme {
    fn default() -> Self {
        Self::from_background(HexColor::BLACK)
    }
}

pub fn to_color(color: HexColor) -> Color {
    Color::Rgb(color.r, color.g, color.b)
}

/// Relative luminance, 0.0-1.0
fn luminance(color: HexColor) -> f32 {
    (0.2126 * f32::from(color.r) + 0.7152 * f32::from(color.g) + 0.0722 * f32::from(color.b))
        / 255.0
}

fn mix(color: HexColor, toward: u8, amount: f32) -> HexColor {
    blend(HexColor::rgb(toward, toward, toward), color, amount)
}

/// `top` over `bottom` with the given alpha
fn blend(top: HexColor, bottom: HexColor, alpha: f32) -> HexColor {
    let alpha = alpha.clamp(0.0, 1.0);
    let ch = |t: u8, b: u8| (f32::from(t) * alpha + f32::from(b) * (1.0 - alpha)).round() as u8;
    HexColor::rgb(
        ch(top.r, bottom.r),
        ch(top.g, bottom.g),
        ch(top.b, bottom.b),
    )
}
