//! Particle overlay - bursts drawn on top of the board

use crate::board::to_cell;
use crate::theme::Theme;
use ratatui::{buffer::Buffer, layout::Rect, widgets::Widget};
use splash_core::Particle;

pub struct ParticlesWidget<'a> {
    particles: &'a [Particle],
    theme: &'a Theme,
}

impl<'a> ParticlesWidget<'a> {
    pub fn new(particles: &'a [Particle], theme: &'a Theme) -> Self {
        Self { particles, theme }
    }

    fn glyph(size: f32) -> char {
        if size >= 8.0 {
            '●'
        } else if size >= 6.0 {
            '•'
        } else {
            '·'
        }
    }
}

impl Widget for ParticlesWidget<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        for p in self.particles {
            let Some((x, y)) = to_cell(p.x, p.y) else {
                continue;
            };
            if x < area.x || x >= area.right() || y < area.y || y >= area.bottom() {
                continue;
            }

            let style = self.theme.particle(p.color, p.opacity);
            buf[(x, y)].set_char(Self::glyph(p.size)).set_style(style);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::{CELL_HEIGHT_PX, CELL_WIDTH_PX};
    use splash_core::HexColor;

    fn particle(column: f32, row: f32, size: f32) -> Particle {
        Particle {
            x: column * CELL_WIDTH_PX + 1.0,
            y: row * CELL_HEIGHT_PX + 1.0,
            vx: 0.0,
            vy: 0.0,
            size,
            color: HexColor::rgb(255, 0, 0),
            opacity: 1.0,
        }
    }

    #[test]
    fn test_particles_land_in_cells() {
        let theme = Theme::default();
        let particles = [particle(2.0, 1.0, 9.0), particle(5.0, 3.0, 4.0)];
        let area = Rect::new(0, 0, 10, 5);
        let mut buf = Buffer::empty(area);
        ParticlesWidget::new(&particles, &theme).render(area, &mut buf);

        assert_eq!(buf[(2, 1)].symbol(), "●");
        assert_eq!(buf[(5, 3)].symbol(), "·");
        assert_eq!(buf[(0, 0)].symbol(), " ");
    }

    #[test]
    fn test_offscreen_particles_skipped() {
        let theme = Theme::default();
        let particles = [particle(20.0, 1.0, 9.0), particle(-3.0, 1.0, 9.0)];
        let area = Rect::new(0, 0, 10, 5);
        let mut buf = Buffer::empty(area);
        ParticlesWidget::new(&particles, &theme).render(area, &mut buf);
        assert!(buf.content().iter().all(|c| c.symbol() == " "));
    }
}
