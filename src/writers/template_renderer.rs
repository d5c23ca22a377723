use image::{Rgba, RgbaImage};
use imageproc::drawing::draw_text_mut;
use rusttype::{Font, Scale};
use std::path::Path;
use tracing::debug;

use crate::error::{ReportError, Result};
use crate::models::DrawInstruction;

/// Draws text instructions onto template images with a single TrueType font
pub struct TemplateRenderer {
    font: Font<'static>,
    scale: Scale,
}

impl TemplateRenderer {
    pub fn from_font_file(path: &Path, font_size: f32) -> Result<Self> {
        let bytes = std::fs::read(path).map_err(|e| {
            ReportError::config(format!("Cannot read font '{}': {}", path.display(), e))
        })?;
        Self::from_font_bytes(bytes, font_size)
    }

    pub fn from_font_bytes(bytes: Vec<u8>, font_size: f32) -> Result<Self> {
        if !(font_size.is_finite() && font_size > 0.0) {
            return Err(ReportError::config(format!(
                "Font size must be positive, got {}",
                font_size
            )));
        }

        let font = Font::try_from_vec(bytes)
            .ok_or_else(|| ReportError::config("Font data is not a valid TrueType font"))?;

        Ok(Self {
            font,
            scale: Scale::uniform(font_size),
        })
    }

    /// Draw every instruction, in order, onto a copy of `base`
    pub fn render(&self, base: &RgbaImage, instructions: &[DrawInstruction]) -> RgbaImage {
        let mut canvas = base.clone();
        for instruction in instructions {
            draw_text_mut(
                &mut canvas,
                Rgba(instruction.color.to_rgba()),
                instruction.anchor_x,
                instruction.anchor_y,
                self.scale,
                &self.font,
                &instruction.text,
            );
        }
        debug!(count = instructions.len(), "rendered draw instructions");
        canvas
    }

    pub fn render_template(
        &self,
        template: &Path,
        instructions: &[DrawInstruction],
    ) -> Result<RgbaImage> {
        let base = image::open(template)
            .map_err(|e| {
                ReportError::config(format!("Cannot open template '{}': {}", template.display(), e))
            })?
            .to_rgba8();
        Ok(self.render(&base, instructions))
    }
}
