//! Opacity/blur envelopes along the depth axis plus distance falloff.
//!
//! All helpers take a normalized depth position (`z / depth_range`, 0..1)
//! and return values that are already clamped to their valid ranges, so a
//! malformed window (end before start, NaN bounds) degrades to a step
//! instead of leaking out-of-range visuals.

/// A `[start, end]` span expressed as a fraction of the depth range.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Window {
    pub start: f32,
    pub end: f32,
}

impl Window {
    pub const fn new(start: f32, end: f32) -> Self {
        Self { start, end }
    }

    fn contains(self, n: f32) -> bool {
        n >= self.start && n <= self.end
    }

    /// Progress of `n` through the window in 0..1. Zero-width and inverted
    /// windows act as a step at `start`.
    fn progress(self, n: f32) -> f32 {
        let span = self.end - self.start;
        if !(span > f32::EPSILON) {
            return if n >= self.start { 1.0 } else { 0.0 };
        }
        ((n - self.start) / span).clamp(0.0, 1.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FadeSettings {
    pub fade_in: Window,
    pub fade_out: Window,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BlurSettings {
    pub blur_in: Window,
    pub blur_out: Window,
    pub max_blur: f32,
}

impl BlurSettings {
    /// `max_blur` with negative and NaN values collapsed to zero.
    pub fn ceiling(&self) -> f32 {
        if self.max_blur.is_finite() {
            self.max_blur.max(0.0)
        } else {
            0.0
        }
    }
}

/// Distance-based attenuation around the camera.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Falloff {
    pub near: f32,
    pub far: f32,
}

/// Named envelope defaults. Two sets are in use depending on how the gallery
/// is deployed; neither is canonical.
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum EnvelopePreset {
    /// Short fade window that retires planes just before they reach the camera.
    Tight,
    /// Long plateau; planes stay visible for most of the traversal.
    Wide,
}

impl EnvelopePreset {
    pub fn fade(self) -> FadeSettings {
        match self {
            Self::Tight => FadeSettings {
                fade_in: Window::new(0.05, 0.25),
                fade_out: Window::new(0.40, 0.43),
            },
            Self::Wide => FadeSettings {
                fade_in: Window::new(0.05, 0.15),
                fade_out: Window::new(0.85, 0.95),
            },
        }
    }

    pub fn blur(self) -> BlurSettings {
        match self {
            Self::Tight => BlurSettings {
                blur_in: Window::new(0.0, 0.1),
                blur_out: Window::new(0.40, 0.43),
                max_blur: 8.0,
            },
            Self::Wide => BlurSettings {
                blur_in: Window::new(0.0, 0.1),
                blur_out: Window::new(0.9, 1.0),
                max_blur: 3.0,
            },
        }
    }

    pub fn next(self) -> Self {
        match self {
            Self::Tight => Self::Wide,
            Self::Wide => Self::Tight,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Tight => "tight",
            Self::Wide => "wide",
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "tight" => Some(Self::Tight),
            "wide" => Some(Self::Wide),
            _ => None,
        }
    }
}

/// 1 inside `near`, 0 beyond `far`, linear in between. Inactive (1) unless
/// `far > near`.
pub fn falloff_factor(distance: f32, falloff: Falloff) -> f32 {
    if !(falloff.far > falloff.near) {
        return 1.0;
    }
    let f = 1.0 - (distance - falloff.near) / (falloff.far - falloff.near);
    sanitize(f, 1.0)
}

/// Raw fade envelope before falloff is applied.
pub fn opacity_at(n: f32, fade: &FadeSettings) -> f32 {
    let o = if fade.fade_in.contains(n) {
        fade.fade_in.progress(n)
    } else if n < fade.fade_in.start {
        0.0
    } else if fade.fade_out.contains(n) {
        1.0 - fade.fade_out.progress(n)
    } else if n > fade.fade_out.end {
        0.0
    } else {
        1.0
    };
    sanitize(o, 1.0)
}

/// Raw blur envelope before falloff is applied: strongest at the ends.
pub fn blur_at(n: f32, blur: &BlurSettings) -> f32 {
    let max = blur.ceiling();
    let b = if blur.blur_in.contains(n) {
        max * (1.0 - blur.blur_in.progress(n))
    } else if n < blur.blur_in.start {
        max
    } else if blur.blur_out.contains(n) {
        max * blur.blur_out.progress(n)
    } else if n > blur.blur_out.end {
        max
    } else {
        0.0
    };
    sanitize(b, max)
}

/// Final opacity for a plane: envelope scaled by falloff, clamped to 0..1.
pub fn plane_opacity(n: f32, fade: &FadeSettings, falloff: f32) -> f32 {
    sanitize(opacity_at(n, fade) * falloff, 1.0)
}

/// Final blur for a plane: distance-faded planes pick up half the ceiling on
/// top of the envelope.
pub fn plane_blur(n: f32, blur: &BlurSettings, falloff: f32) -> f32 {
    let max = blur.ceiling();
    sanitize(blur_at(n, blur) + (1.0 - falloff) * max * 0.5, max)
}

fn sanitize(v: f32, max: f32) -> f32 {
    if v.is_nan() {
        return 0.0;
    }
    v.clamp(0.0, max)
}
