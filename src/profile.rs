//! Profile files: `key=value` overrides for motion and envelope settings.
//!
//! ```text
//! # depth_gallery profile v1
//! speed=0.8
//! falloff=1.2,12
//! fade_in=0.05,0.25
//! ```

use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::motion::{EnvelopePreset, Falloff, GalleryOptions, Window};

#[derive(Debug, Clone, Default, PartialEq)]
pub struct GalleryProfile {
    pub preset: Option<EnvelopePreset>,
    pub speed: Option<f32>,
    pub z_spacing: Option<f32>,
    pub visible_count: Option<usize>,
    pub falloff: Option<Falloff>,
    pub fade_in: Option<Window>,
    pub fade_out: Option<Window>,
    pub blur_in: Option<Window>,
    pub blur_out: Option<Window>,
    pub max_blur: Option<f32>,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ProfileError {
    #[error("I/O error: {0}")]
    Io(String),
    #[error("parse error at line {line}: {message}")]
    Parse { line: usize, message: String },
}

impl GalleryProfile {
    /// Missing files are an empty profile.
    pub fn load(path: Option<&Path>) -> Result<Self, ProfileError> {
        let Some(path) = path else {
            return Ok(Self::default());
        };

        let text = match std::fs::read_to_string(path) {
            Ok(v) => v,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(Self::default()),
            Err(err) => return Err(ProfileError::Io(err.to_string())),
        };
        Self::parse(&text)
    }

    pub fn parse(text: &str) -> Result<Self, ProfileError> {
        let mut profile = Self::default();
        for (line_idx, raw) in text.lines().enumerate() {
            let line_no = line_idx + 1;
            let line = raw.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            let Some((key_raw, value_raw)) = line.split_once('=') else {
                return Err(parse_err(line_no, "expected <key>=<value>"));
            };
            let key = key_raw.trim();
            let value = value_raw.trim();
            match key {
                "preset" => {
                    profile.preset = Some(
                        EnvelopePreset::parse(value)
                            .ok_or_else(|| parse_err(line_no, "preset must be tight/wide"))?,
                    );
                }
                "speed" => profile.speed = Some(parse_f32(value, line_no, key)?),
                "z_spacing" => profile.z_spacing = Some(parse_f32(value, line_no, key)?),
                "visible_count" => {
                    profile.visible_count = Some(value.parse::<usize>().map_err(|_| {
                        parse_err(line_no, "visible_count must be a non-negative integer")
                    })?);
                }
                "falloff" => {
                    let (near, far) = parse_pair(value, line_no, key)?;
                    profile.falloff = Some(Falloff { near, far });
                }
                "fade_in" => profile.fade_in = Some(parse_window(value, line_no, key)?),
                "fade_out" => profile.fade_out = Some(parse_window(value, line_no, key)?),
                "blur_in" => profile.blur_in = Some(parse_window(value, line_no, key)?),
                "blur_out" => profile.blur_out = Some(parse_window(value, line_no, key)?),
                "max_blur" => profile.max_blur = Some(parse_f32(value, line_no, key)?),
                _ => log::debug!("profile line {line_no}: ignoring unknown key {key:?}"),
            }
        }
        Ok(profile)
    }

    /// Applies present keys on top of `opts`. A preset resets both envelopes
    /// before the individual windows are applied.
    pub fn apply(&self, opts: &mut GalleryOptions) {
        if let Some(preset) = self.preset {
            opts.fade = preset.fade();
            opts.blur = preset.blur();
        }
        if let Some(v) = self.speed {
            opts.speed = v;
        }
        if let Some(v) = self.z_spacing {
            opts.z_spacing = Some(v);
        }
        if let Some(v) = self.visible_count {
            opts.visible_count = v;
        }
        if let Some(v) = self.falloff {
            opts.falloff = Some(v);
        }
        if let Some(v) = self.fade_in {
            opts.fade.fade_in = v;
        }
        if let Some(v) = self.fade_out {
            opts.fade.fade_out = v;
        }
        if let Some(v) = self.blur_in {
            opts.blur.blur_in = v;
        }
        if let Some(v) = self.blur_out {
            opts.blur.blur_out = v;
        }
        if let Some(v) = self.max_blur {
            opts.blur.max_blur = v;
        }
    }

    /// Snapshot of every setting in `opts`, suitable for [`save`](Self::save).
    pub fn capture(opts: &GalleryOptions) -> Self {
        Self {
            preset: None,
            speed: Some(opts.speed),
            z_spacing: opts.z_spacing,
            visible_count: Some(opts.visible_count),
            falloff: opts
                .falloff
                .filter(|f| f.near.is_finite() && f.far.is_finite()),
            fade_in: Some(opts.fade.fade_in),
            fade_out: Some(opts.fade.fade_out),
            blur_in: Some(opts.blur.blur_in),
            blur_out: Some(opts.blur.blur_out),
            max_blur: Some(opts.blur.max_blur),
        }
    }

    pub fn to_text(&self) -> String {
        let mut body = String::from("# depth_gallery profile v1\n");
        let mut push = |k: &str, v: String| {
            body.push_str(k);
            body.push('=');
            body.push_str(&v);
            body.push('\n');
        };
        if let Some(p) = self.preset {
            push("preset", p.label().to_string());
        }
        if let Some(v) = self.speed {
            push("speed", v.to_string());
        }
        if let Some(v) = self.z_spacing {
            push("z_spacing", v.to_string());
        }
        if let Some(v) = self.visible_count {
            push("visible_count", v.to_string());
        }
        if let Some(f) = self.falloff {
            push("falloff", format!("{},{}", f.near, f.far));
        }
        for (k, w) in [
            ("fade_in", self.fade_in),
            ("fade_out", self.fade_out),
            ("blur_in", self.blur_in),
            ("blur_out", self.blur_out),
        ] {
            if let Some(w) = w {
                push(k, format!("{},{}", w.start, w.end));
            }
        }
        if let Some(v) = self.max_blur {
            push("max_blur", v.to_string());
        }
        body
    }

    pub fn save(&self, path: &Path) -> Result<(), ProfileError> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|e| ProfileError::Io(e.to_string()))?;
        }
        let tmp = path.with_extension("tmp");
        std::fs::write(&tmp, self.to_text()).map_err(|e| ProfileError::Io(e.to_string()))?;
        std::fs::rename(&tmp, path).map_err(|e| ProfileError::Io(e.to_string()))
    }
}

pub fn profile_storage_path() -> Option<PathBuf> {
    if let Ok(xdg) = std::env::var("XDG_CONFIG_HOME") {
        if !xdg.trim().is_empty() {
            return Some(PathBuf::from(xdg).join("depth_gallery").join("profile.txt"));
        }
    }
    let home = std::env::var("HOME").ok()?;
    if home.trim().is_empty() {
        return None;
    }
    Some(
        PathBuf::from(home)
            .join(".config")
            .join("depth_gallery")
            .join("profile.txt"),
    )
}

fn parse_err(line: usize, message: impl Into<String>) -> ProfileError {
    ProfileError::Parse {
        line,
        message: message.into(),
    }
}

fn parse_f32(raw: &str, line: usize, key: &str) -> Result<f32, ProfileError> {
    raw.parse::<f32>()
        .ok()
        .filter(|v| v.is_finite())
        .ok_or_else(|| parse_err(line, format!("{key} must be a number")))
}

fn parse_pair(raw: &str, line: usize, key: &str) -> Result<(f32, f32), ProfileError> {
    let Some((a, b)) = raw.split_once(',') else {
        return Err(parse_err(line, format!("{key} expects <a>,<b>")));
    };
    Ok((parse_f32(a.trim(), line, key)?, parse_f32(b.trim(), line, key)?))
}

fn parse_window(raw: &str, line: usize, key: &str) -> Result<Window, ProfileError> {
    let (start, end) = parse_pair(raw, line, key)?;
    Ok(Window::new(start, end))
}
