use crate::render::{
    luma_u8, text_frame_begin, text_frame_end, write_bg_rgb, write_fg_rgb, Frame, Renderer,
};
use std::io::Write;

const DOT_BITS: [u8; 8] = [0x01, 0x08, 0x02, 0x10, 0x04, 0x20, 0x40, 0x80];

/// 2x4 canvas pixels per cell. Each cell splits its pixels at the mean luma:
/// bright dots take the foreground average, the rest the background.
pub struct BrailleRenderer {
    last_fg: Option<(u8, u8, u8)>,
    last_bg: Option<(u8, u8, u8)>,
}

impl BrailleRenderer {
    pub fn new() -> Self {
        Self {
            last_fg: None,
            last_bg: None,
        }
    }
}

impl Default for BrailleRenderer {
    fn default() -> Self {
        Self::new()
    }
}

impl Renderer for BrailleRenderer {
    fn name(&self) -> &'static str {
        "braille"
    }

    fn render(&mut self, frame: &Frame<'_>, out: &mut dyn Write) -> anyhow::Result<()> {
        let Some((cols, visual_rows, w, _h)) = text_frame_begin(frame, 2, 4, out)? else {
            return Ok(());
        };
        self.last_fg = None;
        self.last_bg = None;

        for row in 0..visual_rows {
            let base_y = row * 4;
            for col in 0..cols {
                let base_x = col * 2;

                let mut lum = [0u8; 8];
                let mut rgb = [(0u8, 0u8, 0u8); 8];
                for dy in 0..4usize {
                    for dx in 0..2usize {
                        let i = dy * 2 + dx;
                        let idx = ((base_y + dy) * w + base_x + dx) * 4;
                        let (r, g, b) = (
                            frame.pixels_rgba[idx],
                            frame.pixels_rgba[idx + 1],
                            frame.pixels_rgba[idx + 2],
                        );
                        rgb[i] = (r, g, b);
                        lum[i] = luma_u8(r, g, b);
                    }
                }

                let min_l = lum.iter().copied().min().unwrap_or(0) as u16;
                let max_l = lum.iter().copied().max().unwrap_or(0) as u16;
                let thr = ((min_l + max_l) / 2) as u8;

                let mut bits: u8 = 0;
                let mut on = [0u32; 4];
                let mut off = [0u32; 4];
                for i in 0..8usize {
                    let (r, g, b) = rgb[i];
                    let acc = if lum[i] > thr {
                        bits |= DOT_BITS[i];
                        &mut on
                    } else {
                        &mut off
                    };
                    acc[0] += r as u32;
                    acc[1] += g as u32;
                    acc[2] += b as u32;
                    acc[3] += 1;
                }

                let bgc = average(&off).or_else(|| average(&on)).unwrap_or((0, 0, 0));
                let (fgc, ch) = if bits == 0 {
                    (bgc, ' ')
                } else {
                    let fgc = average(&on).unwrap_or(bgc);
                    (fgc, char::from_u32(0x2800 + bits as u32).unwrap_or(' '))
                };

                if self.last_fg != Some(fgc) {
                    write_fg_rgb(out, fgc.0, fgc.1, fgc.2)?;
                    self.last_fg = Some(fgc);
                }
                if self.last_bg != Some(bgc) {
                    write_bg_rgb(out, bgc.0, bgc.1, bgc.2)?;
                    self.last_bg = Some(bgc);
                }
                write!(out, "{ch}")?;
            }
            out.write_all(b"\r\n")?;
        }

        text_frame_end(frame, cols, visual_rows, out)
    }
}

fn average(acc: &[u32; 4]) -> Option<(u8, u8, u8)> {
    if acc[3] == 0 {
        return None;
    }
    Some((
        (acc[0] / acc[3]) as u8,
        (acc[1] / acc[3]) as u8,
        (acc[2] / acc[3]) as u8,
    ))
}
