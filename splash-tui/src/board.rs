//! Key cap layout and the mapping between cells and particle space

use ratatui::layout::Rect;

/// Key cap size in cells
pub const CAP_WIDTH: u16 = 7;
pub const CAP_HEIGHT: u16 = 3;
/// Space between caps
const GAP: u16 = 1;

/// Particle-space units per terminal cell. Terminal cells are about twice
/// as tall as they are wide.
pub const CELL_WIDTH_PX: f32 = 8.0;
pub const CELL_HEIGHT_PX: f32 = 16.0;

/// A key cap placed on screen
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyCap {
    pub key: char,
    pub area: Rect,
}

/// Caps laid out in centered rows that wrap to the available width
#[derive(Debug, Clone, Default)]
pub struct BoardLayout {
    caps: Vec<KeyCap>,
}

impl BoardLayout {
    pub fn compute(area: Rect, keys: &[char]) -> Self {
        if keys.is_empty() || area.width < CAP_WIDTH || area.height < CAP_HEIGHT {
            return Self::default();
        }

        let per_row = ((area.width + GAP) / (CAP_WIDTH + GAP)).max(1) as usize;
        let rows = keys.len().div_ceil(per_row) as u16;
        let total_height = rows * CAP_HEIGHT + rows.saturating_sub(1) * GAP;
        let top = area.y + area.height.saturating_sub(total_height) / 2;

        let mut caps = Vec::with_capacity(keys.len());
        for (row, chunk) in keys.chunks(per_row).enumerate() {
            let y = top + row as u16 * (CAP_HEIGHT + GAP);
            if y + CAP_HEIGHT > area.bottom() {
                break;
            }

            let count = chunk.len() as u16;
            let row_width = count * CAP_WIDTH + (count - 1) * GAP;
            let left = area.x + area.width.saturating_sub(row_width) / 2;

            for (i, &key) in chunk.iter().enumerate() {
                let x = left + i as u16 * (CAP_WIDTH + GAP);
                caps.push(KeyCap {
                    key,
                    area: Rect::new(x, y, CAP_WIDTH, CAP_HEIGHT),
                });
            }
        }

        Self { caps }
    }

    pub fn caps(&self) -> &[KeyCap] {
        &self.caps
    }

    pub fn cap(&self, key: char) -> Option<&KeyCap> {
        self.caps.iter().find(|c| c.key == key)
    }

    /// Key under a terminal cell, for mouse input
    pub fn key_at(&self, column: u16, row: u16) -> Option<char> {
        self.caps
            .iter()
            .find(|c| {
                column >= c.area.x
                    && column < c.area.right()
                    && row >= c.area.y
                    && row < c.area.bottom()
            })
            .map(|c| c.key)
    }

    /// Center of a key cap in particle space
    pub fn origin(&self, key: char) -> Option<(f32, f32)> {
        self.cap(key).map(|c| {
            let x = f32::from(c.area.x) + f32::from(c.area.width) / 2.0;
            let y = f32::from(c.area.y) + f32::from(c.area.height) / 2.0;
            (x * CELL_WIDTH_PX, y * CELL_HEIGHT_PX)
        })
    }
}

/// Terminal cell containing a particle-space point, if it is on screen
pub fn to_cell(x: f32, y: f32) -> Option<(u16, u16)> {
    let column = (x / CELL_WIDTH_PX).floor();
    let row = (y / CELL_HEIGHT_PX).floor();
    if column < 0.0 || row < 0.0 || column > f32::from(u16::MAX) || row > f32::from(u16::MAX) {
        return None;
    }
    Some((column as u16, row as u16))
}
