//! Software projection of gallery planes into an RGBA canvas.

use crate::gallery::{ImageLibrary, Texture};
use crate::motion::PlaneVisual;

pub const FOV_DEGREES: f32 = 55.0;
const NEAR_CLIP: f32 = 0.1;
const PLANE_HEIGHT: f32 = 2.0;
/// Canvas clear color.
pub const BACKGROUND: [u8; 3] = [6, 6, 10];

pub struct SceneRasterizer {
    w: usize,
    h: usize,
    /// Terminal cells are taller than wide; scales x so planes keep their shape.
    pixel_aspect: f32,
    pixels: Vec<u8>,
    order: Vec<usize>,
}

impl SceneRasterizer {
    pub fn new(w: usize, h: usize, pixel_aspect: f32) -> Self {
        let mut r = Self {
            w: 0,
            h: 0,
            pixel_aspect: 1.0,
            pixels: Vec::new(),
            order: Vec::new(),
        };
        r.resize(w, h, pixel_aspect);
        r
    }

    pub fn resize(&mut self, w: usize, h: usize, pixel_aspect: f32) {
        self.w = w;
        self.h = h;
        self.pixel_aspect = if pixel_aspect.is_finite() && pixel_aspect > 0.0 {
            pixel_aspect
        } else {
            1.0
        };
        self.pixels.resize(w.saturating_mul(h).saturating_mul(4), 0);
    }

    pub fn size(&self) -> (usize, usize) {
        (self.w, self.h)
    }

    pub fn pixels(&self) -> &[u8] {
        &self.pixels
    }

    pub fn clear(&mut self) {
        for px in self.pixels.chunks_exact_mut(4) {
            px[0] = BACKGROUND[0];
            px[1] = BACKGROUND[1];
            px[2] = BACKGROUND[2];
            px[3] = 255;
        }
    }

    /// Paints every visible plane back to front. Returns the number drawn.
    pub fn draw(&mut self, visuals: &[PlaneVisual], library: &ImageLibrary) -> usize {
        self.clear();
        if self.w == 0 || self.h == 0 {
            return 0;
        }

        self.order.clear();
        self.order.extend(
            visuals
                .iter()
                .enumerate()
                .filter(|(_, v)| v.opacity > 0.0 && v.position[2] < -NEAR_CLIP)
                .map(|(i, _)| i),
        );
        // Farthest (most negative z) first.
        self.order.sort_by(|&a, &b| {
            visuals[a].position[2]
                .partial_cmp(&visuals[b].position[2])
                .unwrap_or(std::cmp::Ordering::Equal)
        });

        let order = std::mem::take(&mut self.order);
        let mut drawn = 0usize;
        for &i in &order {
            let v = &visuals[i];
            if let Some(tex) = library.texture(v.image_index) {
                if self.draw_plane(v, tex) {
                    drawn += 1;
                }
            }
        }
        self.order = order;
        drawn
    }

    fn draw_plane(&mut self, v: &PlaneVisual, tex: &Texture) -> bool {
        let [x, y, z] = v.position;
        let depth = -z;
        let focal = 1.0 / (FOV_DEGREES.to_radians() * 0.5).tan();
        let half_h = self.h as f32 * 0.5;
        let half_w = self.w as f32 * 0.5;
        // Pixels per world unit at this depth.
        let ppu = focal * half_h / depth;

        let aspect = tex.aspect();
        let (pw, ph) = if aspect > 1.0 {
            (PLANE_HEIGHT * aspect, PLANE_HEIGHT)
        } else {
            (PLANE_HEIGHT, PLANE_HEIGHT / aspect.max(1e-3))
        };

        let cx = half_w + x * ppu * self.pixel_aspect;
        let cy = half_h - y * ppu;
        let sw = pw * ppu * self.pixel_aspect;
        let sh = ph * ppu;
        if !(sw >= 1.0 && sh >= 1.0) {
            return false;
        }

        let x0 = cx - sw * 0.5;
        let y0 = cy - sh * 0.5;
        let px0 = x0.floor().max(0.0) as usize;
        let py0 = y0.floor().max(0.0) as usize;
        let px1 = (x0 + sw).ceil().min(self.w as f32).max(0.0) as usize;
        let py1 = (y0 + sh).ceil().min(self.h as f32).max(0.0) as usize;
        if px0 >= px1 || py0 >= py1 {
            return false;
        }

        let alpha = v.opacity.clamp(0.0, 1.0);
        let blur_mix = (v.blur * 0.5).clamp(0.0, 1.0);
        let blur_u = v.blur / tex.width.max(1) as f32;
        let blur_v = v.blur / tex.height.max(1) as f32;

        for py in py0..py1 {
            let tv = (py as f32 + 0.5 - y0) / sh;
            for px in px0..px1 {
                let tu = (px as f32 + 0.5 - x0) / sw;
                let mut c = to_f32(tex.sample(tu, tv));
                if blur_mix > 0.0 {
                    let taps = [
                        to_f32(tex.sample(tu - blur_u, tv)),
                        to_f32(tex.sample(tu + blur_u, tv)),
                        to_f32(tex.sample(tu, tv - blur_v)),
                        to_f32(tex.sample(tu, tv + blur_v)),
                    ];
                    for ch in 0..4 {
                        let blurred = taps.iter().map(|t| t[ch]).sum::<f32>() * 0.25;
                        c[ch] += (blurred - c[ch]) * blur_mix;
                    }
                }

                let a = (c[3] / 255.0) * alpha;
                if a <= 0.0 {
                    continue;
                }
                let i = (py * self.w + px) * 4;
                for ch in 0..3 {
                    let dst = self.pixels[i + ch] as f32;
                    self.pixels[i + ch] = (dst + (c[ch] - dst) * a).round().clamp(0.0, 255.0) as u8;
                }
            }
        }
        true
    }
}

fn to_f32(p: [u8; 4]) -> [f32; 4] {
    [p[0] as f32, p[1] as f32, p[2] as f32, p[3] as f32]
}
