use crate::raster::BACKGROUND;
use crate::render::{luma_u8, text_frame_begin, text_frame_end, write_fg_rgb, Frame, Renderer};
use std::io::Write;

/// Sparse to dense. Index 0 is reserved for bare backdrop.
const GLYPHS: &[u8] = b" .:-=+*#%@";

/// One canvas pixel per cell. Glyph density follows the pixel's contrast
/// against the canvas backdrop rather than its absolute brightness, so a
/// plane fading into the background thins out instead of staying solid.
pub struct AsciiRenderer {
    backdrop: [u8; 3],
    /// Contrast of pure white against the backdrop; maps to the densest glyph.
    full_contrast: u32,
    last_fg: Option<(u8, u8, u8)>,
}

impl AsciiRenderer {
    pub fn new() -> Self {
        Self::with_backdrop(BACKGROUND)
    }

    pub fn with_backdrop(backdrop: [u8; 3]) -> Self {
        let full = contrast(backdrop, [255, 255, 255]).max(contrast(backdrop, [0, 0, 0]));
        Self {
            backdrop,
            full_contrast: full.max(1),
            last_fg: None,
        }
    }

    /// Glyph for one pixel; `b' '` when it matches the backdrop.
    pub fn glyph(&self, rgb: [u8; 3]) -> u8 {
        let c = contrast(self.backdrop, rgb);
        if c == 0 {
            return GLYPHS[0];
        }
        let steps = (GLYPHS.len() - 1) as u32;
        let idx = (c * steps).div_ceil(self.full_contrast).clamp(1, steps);
        GLYPHS[idx as usize]
    }
}

impl Default for AsciiRenderer {
    fn default() -> Self {
        Self::new()
    }
}

fn contrast(backdrop: [u8; 3], rgb: [u8; 3]) -> u32 {
    luma_u8(
        rgb[0].abs_diff(backdrop[0]),
        rgb[1].abs_diff(backdrop[1]),
        rgb[2].abs_diff(backdrop[2]),
    ) as u32
}

impl Renderer for AsciiRenderer {
    fn name(&self) -> &'static str {
        "ascii"
    }

    fn render(&mut self, frame: &Frame<'_>, out: &mut dyn Write) -> anyhow::Result<()> {
        let Some((cols, visual_rows, w, _h)) = text_frame_begin(frame, 1, 1, out)? else {
            return Ok(());
        };
        self.last_fg = None;

        let px = frame.pixels_rgba;
        for y in 0..visual_rows {
            let row = &px[y * w * 4..(y * w + cols) * 4];
            for cell in row.chunks_exact(4) {
                let rgb = [cell[0], cell[1], cell[2]];
                let ch = self.glyph(rgb);
                // Backdrop cells are blank; keep the current color.
                if ch != GLYPHS[0] {
                    let fg = (rgb[0], rgb[1], rgb[2]);
                    if self.last_fg != Some(fg) {
                        write_fg_rgb(out, fg.0, fg.1, fg.2)?;
                        self.last_fg = Some(fg);
                    }
                }
                out.write_all(&[ch])?;
            }
            out.write_all(b"\r\n")?;
        }

        text_frame_end(frame, cols, visual_rows, out)
    }
}
