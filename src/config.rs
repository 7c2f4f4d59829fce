use std::path::PathBuf;

use clap::{Parser, ValueEnum};

use crate::motion::{EnvelopePreset, Falloff, GalleryOptions};
use crate::profile::GalleryProfile;

#[derive(Parser, Debug, Clone)]
#[command(
    name = "depth-gallery",
    version,
    about = "Infinitely scrolling 3D image gallery for truecolor terminals"
)]
pub struct Config {
    /// Image files or directories; `path|label` attaches a label.
    pub images: Vec<String>,

    /// Velocity multiplier [default: 1.0]
    #[arg(long)]
    pub speed: Option<f32>,

    /// Depth distance between slots [default: 4]
    #[arg(long)]
    pub z_spacing: Option<f32>,

    /// Planes in the pool [default: 8]
    #[arg(long)]
    pub visible_count: Option<usize>,

    #[arg(long)]
    pub falloff_near: Option<f32>,

    #[arg(long)]
    pub falloff_far: Option<f32>,

    /// Fade/blur envelope set [default: tight]
    #[arg(long, value_enum)]
    pub preset: Option<EnvelopePreset>,

    #[arg(long, value_enum, default_value_t = RendererMode::HalfBlock)]
    pub renderer: RendererMode,

    #[arg(long, default_value_t = 60)]
    pub fps: u32,

    /// Terminal width (columns) below which the compact layout is used.
    #[arg(long, default_value_t = 80)]
    pub compact_below: u16,

    #[arg(long, default_value_t = false)]
    pub shuffle: bool,

    /// Skip the canvas and show the static image grid.
    #[arg(long = "static", default_value_t = false)]
    pub force_static: bool,

    #[arg(long, default_value_t = true, action = clap::ArgAction::Set)]
    pub auto_detect: bool,

    #[arg(long, default_value_t = true, action = clap::ArgAction::Set)]
    pub sync_updates: bool,

    /// Profile file with envelope and motion overrides.
    #[arg(long)]
    pub profile: Option<PathBuf>,

    /// Write the effective profile to this path and exit.
    #[arg(long)]
    pub write_profile: Option<PathBuf>,

    #[arg(long)]
    pub log_file: Option<PathBuf>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum RendererMode {
    #[value(alias = "ansi", alias = "text")]
    Ascii,
    #[value(name = "half-block", alias = "halfblock", alias = "half_block", alias = "hb")]
    HalfBlock,
    #[value(alias = "hires", alias = "dots")]
    Braille,
}

impl RendererMode {
    /// Canvas pixels per terminal cell (columns, rows).
    pub fn pixels_per_cell(self) -> (usize, usize) {
        match self {
            Self::Ascii => (1, 1),
            Self::HalfBlock => (1, 2),
            Self::Braille => (2, 4),
        }
    }

    /// Horizontal stretch that makes one canvas pixel look square, assuming
    /// cells twice as tall as wide.
    pub fn pixel_aspect(self) -> f32 {
        let (w, h) = self.pixels_per_cell();
        2.0 * w as f32 / h as f32
    }
}

impl Config {
    /// Envelope set in effect at startup: flag, then profile, then `Tight`.
    pub fn preset(&self, profile: &GalleryProfile) -> EnvelopePreset {
        self.preset
            .or(profile.preset)
            .unwrap_or(EnvelopePreset::Tight)
    }

    fn falloff(&self) -> Option<Falloff> {
        match (self.falloff_near, self.falloff_far) {
            (None, None) => None,
            (near, far) => Some(Falloff {
                near: near.unwrap_or(0.0),
                far: far.unwrap_or(f32::INFINITY),
            }),
        }
    }

    /// Built-in defaults, then keys present in `profile`, then flags given
    /// on the command line.
    pub fn gallery_options(&self, profile: &GalleryProfile) -> GalleryOptions {
        let mut opts = GalleryOptions::default();
        profile.apply(&mut opts);

        if let Some(preset) = self.preset {
            let profile_envelopes = profile.preset.is_some()
                || profile.fade_in.is_some()
                || profile.fade_out.is_some()
                || profile.blur_in.is_some()
                || profile.blur_out.is_some()
                || profile.max_blur.is_some();
            note_override("preset", profile_envelopes);
            opts.fade = preset.fade();
            opts.blur = preset.blur();
        }
        if let Some(v) = self.speed {
            note_override("speed", profile.speed.is_some());
            opts.speed = v;
        }
        if let Some(v) = self.z_spacing {
            note_override("z-spacing", profile.z_spacing.is_some());
            opts.z_spacing = Some(v);
        }
        if let Some(v) = self.visible_count {
            note_override("visible-count", profile.visible_count.is_some());
            opts.visible_count = v;
        }
        if let Some(f) = self.falloff() {
            note_override("falloff-near/--falloff-far", profile.falloff.is_some());
            opts.falloff = Some(f);
        }
        opts
    }
}

fn note_override(flag: &str, in_profile: bool) {
    if in_profile {
        log::info!("--{flag} overrides the profile value");
    }
}
