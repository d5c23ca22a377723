use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::{ReportError, Result};

/// RGB text color, configured as `#rrggbb`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Color {
    pub const BLACK: Color = Color { r: 0, g: 0, b: 0 };
    pub const WHITE: Color = Color {
        r: 255,
        g: 255,
        b: 255,
    };

    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    pub fn from_hex(hex: &str) -> Result<Self> {
        let digits = hex.trim().trim_start_matches('#');
        if digits.len() != 6 || !digits.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(ReportError::config(format!(
                "Invalid color '{}'. Expected format: '#rrggbb'",
                hex
            )));
        }

        let channel = |range: std::ops::Range<usize>| {
            u8::from_str_radix(&digits[range], 16)
                .map_err(|_| ReportError::config(format!("Invalid color '{}'", hex)))
        };

        Ok(Self {
            r: channel(0..2)?,
            g: channel(2..4)?,
            b: channel(4..6)?,
        })
    }

    pub fn to_rgba(self) -> [u8; 4] {
        [self.r, self.g, self.b, 255]
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }
}

impl TryFrom<String> for Color {
    type Error = ReportError;

    fn try_from(value: String) -> Result<Self> {
        Color::from_hex(&value)
    }
}

impl From<Color> for String {
    fn from(color: Color) -> Self {
        color.to_string()
    }
}

/// One piece of text to draw onto a template, anchored at its top-left corner.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DrawInstruction {
    pub anchor_x: i32,
    pub anchor_y: i32,
    pub text: String,
    pub color: Color,
}

impl DrawInstruction {
    pub fn new(anchor_x: i32, anchor_y: i32, text: impl Into<String>, color: Color) -> Self {
        Self {
            anchor_x,
            anchor_y,
            text: text.into(),
            color,
        }
    }
}

impl fmt::Display for DrawInstruction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "({:>4}, {:>4}) {} {}",
            self.anchor_x, self.anchor_y, self.color, self.text
        )
    }
}
