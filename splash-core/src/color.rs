//! Hex colors and the background palette

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ColorError {
    #[error("expected #RRGGBB, got {0:?}")]
    Malformed(String),
}

/// An opaque RGB color written as `#RRGGBB`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct HexColor {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl HexColor {
    pub const BLACK: HexColor = HexColor::rgb(0, 0, 0);

    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Parse `#RRGGBB` (either case). Anything else is rejected.
    pub fn parse(s: &str) -> Result<Self, ColorError> {
        let malformed = || ColorError::Malformed(s.to_string());
        let digits = s.strip_prefix('#').ok_or_else(malformed)?;
        if digits.len() != 6 || !digits.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(malformed());
        }
        let channel = |i: usize| u8::from_str_radix(&digits[i..i + 2], 16).map_err(|_| malformed());
        Ok(Self::rgb(channel(0)?, channel(2)?, channel(4)?))
    }

    /// Convert from HSL (hue in degrees, saturation and lightness in 0.0-1.0)
    pub fn from_hsl(hue: f32, saturation: f32, lightness: f32) -> Self {
        let h = hue.rem_euclid(360.0) / 60.0;
        let c = (1.0 - (2.0 * lightness - 1.0).abs()) * saturation;
        let x = c * (1.0 - (h % 2.0 - 1.0).abs());
        let m = lightness - c / 2.0;

        let (r, g, b) = match h as u32 {
            0 => (c, x, 0.0),
            1 => (x, c, 0.0),
            2 => (0.0, c, x),
            3 => (0.0, x, c),
            4 => (x, 0.0, c),
            _ => (c, 0.0, x),
        };

        let to_u8 = |v: f32| ((v + m) * 255.0).round().clamp(0.0, 255.0) as u8;
        Self::rgb(to_u8(r), to_u8(g), to_u8(b))
    }
}

impl Default for HexColor {
    fn default() -> Self {
        Self::BLACK
    }
}

impl fmt::Display for HexColor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:02X}{:02X}{:02X}", self.r, self.g, self.b)
    }
}

impl FromStr for HexColor {
    type Err = ColorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for HexColor {
    type Error = ColorError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<HexColor> for String {
    fn from(color: HexColor) -> Self {
        color.to_string()
    }
}

/// Dark background colors picked on every activation
pub const DARK_PALETTE: [HexColor; 55] = [
    HexColor::rgb(0x2C, 0x3E, 0x50),
    HexColor::rgb(0x34, 0x49, 0x5E),
    HexColor::rgb(0x2C, 0x2C, 0x2C),
    HexColor::rgb(0x61, 0x6A, 0x6B),
    HexColor::rgb(0x4A, 0x23, 0x5A),
    HexColor::rgb(0x2F, 0x4F, 0x4F),
    HexColor::rgb(0x0E, 0x4B, 0x5A),
    HexColor::rgb(0x36, 0x45, 0x4F),
    HexColor::rgb(0x80, 0x00, 0x20),
    HexColor::rgb(0x80, 0x00, 0x00),
    HexColor::rgb(0xA5, 0x2A, 0x2A),
    HexColor::rgb(0x1A, 0x1A, 0x2E),
    HexColor::rgb(0x16, 0x21, 0x3E),
    HexColor::rgb(0x0F, 0x34, 0x60),
    HexColor::rgb(0x1B, 0x1B, 0x2F),
    HexColor::rgb(0x1F, 0x1F, 0x3D),
    HexColor::rgb(0x2D, 0x24, 0x24),
    HexColor::rgb(0x5C, 0x3D, 0x2E),
    HexColor::rgb(0x3D, 0x2C, 0x2E),
    HexColor::rgb(0x2C, 0x33, 0x33),
    HexColor::rgb(0x3A, 0x38, 0x45),
    HexColor::rgb(0x4C, 0x3A, 0x51),
    HexColor::rgb(0x5B, 0x4B, 0x8A),
    HexColor::rgb(0x4B, 0x00, 0x82),
    HexColor::rgb(0x48, 0x3C, 0x32),
    HexColor::rgb(0x4B, 0x53, 0x20),
    HexColor::rgb(0x5D, 0x3F, 0xD3),
    HexColor::rgb(0x30, 0x19, 0x34),
    HexColor::rgb(0x3B, 0x00, 0x00),
    HexColor::rgb(0x4A, 0x04, 0x04),
    HexColor::rgb(0x3A, 0x0C, 0xA3),
    HexColor::rgb(0x3A, 0x0F, 0x67),
    HexColor::rgb(0x2D, 0x1B, 0x3C),
    HexColor::rgb(0x2E, 0x40, 0x53),
    HexColor::rgb(0x1C, 0x28, 0x33),
    HexColor::rgb(0x15, 0x43, 0x60),
    HexColor::rgb(0x51, 0x2E, 0x5F),
    HexColor::rgb(0x4A, 0x23, 0x5A),
    HexColor::rgb(0x7B, 0x24, 0x1C),
    HexColor::rgb(0x64, 0x1E, 0x16),
    HexColor::rgb(0x78, 0x42, 0x12),
    HexColor::rgb(0x14, 0x5A, 0x32),
    HexColor::rgb(0x0B, 0x53, 0x45),
    HexColor::rgb(0x1B, 0x4F, 0x72),
    HexColor::rgb(0x4D, 0x56, 0x56),
    HexColor::rgb(0x2E, 0x1B, 0x3B),
    HexColor::rgb(0x1E, 0x3D, 0x59),
    HexColor::rgb(0x3C, 0x2C, 0x3E),
    HexColor::rgb(0x1A, 0x3A, 0x3F),
    HexColor::rgb(0x4A, 0x25, 0x45),
    HexColor::rgb(0x2D, 0x40, 0x59),
    HexColor::rgb(0x3E, 0x1E, 0x3B),
    HexColor::rgb(0x1B, 0x4B, 0x5A),
    HexColor::rgb(0x3A, 0x2D, 0x4A),
    HexColor::rgb(0x2C, 0x3E, 0x4C),
];
