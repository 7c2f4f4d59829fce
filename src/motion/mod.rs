//! Gallery motion engine: a fixed pool of image planes travelling along a
//! looping depth axis, driven by a damped scroll velocity.
//!
//! The engine is single-threaded and frame-driven. Input handlers never touch
//! the velocity directly; they [`send`](MotionEngine::send) an [`InputEvent`]
//! and the next [`tick`](MotionEngine::tick) integrates it.

pub mod envelope;
pub mod input;
pub mod layout;

use std::collections::VecDeque;
use std::time::Instant;

pub use envelope::{BlurSettings, EnvelopePreset, FadeSettings, Falloff, Window};
pub use input::{ArrowKey, AutoplayTimer, InputEvent, ScrollVelocity};
pub use layout::DeviceClass;

use envelope::{falloff_factor, plane_blur, plane_opacity};
use input::AUTO_ACCEL;

/// Frames longer than this (tab switch, terminal suspend) are not integrated.
pub const MAX_FRAME_DELTA: f32 = 0.1;

const Z_PER_VELOCITY: f32 = 10.0;

#[derive(Debug, Clone, PartialEq)]
pub struct GalleryOptions {
    /// Multiplier on every velocity delta, including autoplay.
    pub speed: f32,
    /// Distance between slots; `None` spreads slots over the default range.
    pub z_spacing: Option<f32>,
    pub visible_count: usize,
    /// `None` means near = 0, far = depth range.
    pub falloff: Option<Falloff>,
    pub fade: FadeSettings,
    pub blur: BlurSettings,
}

impl Default for GalleryOptions {
    fn default() -> Self {
        Self::with_preset(EnvelopePreset::Tight)
    }
}

impl GalleryOptions {
    pub fn with_preset(preset: EnvelopePreset) -> Self {
        Self {
            speed: 1.0,
            z_spacing: Some(layout::DEFAULT_Z_SPACING),
            visible_count: 8,
            falloff: None,
            fade: preset.fade(),
            blur: preset.blur(),
        }
    }

    fn effective_speed(&self) -> f32 {
        if self.speed.is_finite() { self.speed } else { 1.0 }
    }
}

/// One rendering slot. Slots keep their identity for the life of the pool.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Plane {
    pub slot: usize,
    /// Depth coordinate in `[0, depth_range)`.
    pub z: f32,
    pub image_index: usize,
    pub x: f32,
    pub y: f32,
}

/// Per-slot values consumed by the rasterizer.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlaneVisual {
    pub slot: usize,
    pub image_index: usize,
    /// `(x, y, z - depth_range / 2)`; the camera sits at the origin.
    pub position: [f32; 3],
    pub normalized_depth: f32,
    pub opacity: f32,
    pub blur: f32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameOutcome {
    Advanced,
    /// Delta was too large or invalid; positions were left untouched.
    Skipped,
}

#[derive(Debug)]
pub struct MotionEngine {
    options: GalleryOptions,
    device: DeviceClass,
    image_count: usize,
    depth_range: f32,
    image_advance: usize,
    spatial: Vec<(f32, f32)>,
    planes: Vec<Plane>,
    visuals: Vec<PlaneVisual>,
    velocity: ScrollVelocity,
    autoplay: AutoplayTimer,
    inbox: VecDeque<InputEvent>,
}

impl MotionEngine {
    pub fn new(
        options: GalleryOptions,
        image_count: usize,
        device: DeviceClass,
        now: Instant,
    ) -> Self {
        let mut engine = Self {
            options,
            device,
            image_count,
            depth_range: layout::DEFAULT_DEPTH_RANGE,
            image_advance: 0,
            spatial: Vec::new(),
            planes: Vec::new(),
            visuals: Vec::new(),
            velocity: ScrollVelocity::default(),
            autoplay: AutoplayTimer::new(now),
            inbox: VecDeque::new(),
        };
        engine.reseed();
        engine
    }

    pub fn options(&self) -> &GalleryOptions {
        &self.options
    }

    pub fn device_class(&self) -> DeviceClass {
        self.device
    }

    pub fn image_count(&self) -> usize {
        self.image_count
    }

    pub fn slot_count(&self) -> usize {
        self.planes.len()
    }

    pub fn depth_range(&self) -> f32 {
        self.depth_range
    }

    pub fn image_advance(&self) -> usize {
        self.image_advance
    }

    pub fn velocity(&self) -> f32 {
        self.velocity.get()
    }

    pub fn autoplay(&self) -> bool {
        self.autoplay.enabled()
    }

    pub fn planes(&self) -> &[Plane] {
        &self.planes
    }

    /// Visual outputs from the last tick. Empty when there are no images.
    pub fn visuals(&self) -> &[PlaneVisual] {
        if self.image_count == 0 {
            return &[];
        }
        &self.visuals
    }

    pub fn send(&mut self, event: InputEvent) {
        self.inbox.push_back(event);
    }

    pub fn set_device_class(&mut self, device: DeviceClass) {
        if device == self.device {
            return;
        }
        log::debug!("device class {} -> {}", self.device.label(), device.label());
        self.device = device;
        self.reseed();
    }

    pub fn set_image_count(&mut self, count: usize) {
        if count == self.image_count {
            return;
        }
        self.image_count = count;
        self.reseed();
    }

    /// Replaces all options. The pool is rebuilt only when its shape changes.
    pub fn set_options(&mut self, options: GalleryOptions) {
        let reshape = options.visible_count != self.options.visible_count
            || options.z_spacing != self.options.z_spacing;
        self.options = options;
        if reshape {
            self.reseed();
        } else {
            self.refresh_visuals();
        }
    }

    pub fn set_envelopes(&mut self, fade: FadeSettings, blur: BlurSettings) {
        self.options.fade = fade;
        self.options.blur = blur;
        self.refresh_visuals();
    }

    /// Advances the simulation by `dt` seconds.
    pub fn tick(&mut self, now: Instant, dt: f32) -> FrameOutcome {
        let speed = self.options.effective_speed();
        while let Some(event) = self.inbox.pop_front() {
            self.velocity.add(event.velocity_delta(speed));
            self.autoplay.record_interaction(now, event.stops_autoplay());
        }
        if self.autoplay.poll(now) {
            log::debug!("autoplay resumed after idle");
        }

        if !dt.is_finite() || dt <= 0.0 || dt > MAX_FRAME_DELTA {
            self.refresh_visuals();
            return FrameOutcome::Skipped;
        }

        if self.autoplay.enabled() {
            self.velocity.add(AUTO_ACCEL * dt * speed);
        }
        self.velocity.damp();

        let dz = self.velocity.get() * dt * Z_PER_VELOCITY;
        let range = self.depth_range;
        let total = self.image_count;
        let advance = self.image_advance;
        for plane in &mut self.planes {
            let (z, steps) = wrap_depth(plane.z + dz, range);
            plane.z = z;
            if total > 0 && steps != 0 {
                plane.image_index = shift_index(plane.image_index, steps, advance, total);
            }
            let (x, y) = self.spatial.get(plane.slot).copied().unwrap_or((0.0, 0.0));
            plane.x = x;
            plane.y = y;
        }

        self.refresh_visuals();
        FrameOutcome::Advanced
    }

    fn reseed(&mut self) {
        let slots = layout::responsive_slots(self.options.visible_count, self.device);
        let spacing = layout::responsive_spacing(self.options.z_spacing, self.device);
        self.depth_range = layout::depth_range(slots, spacing);
        self.image_advance = layout::image_advance(self.options.visible_count, self.image_count);
        self.spatial = layout::spatial_table(slots, self.device);

        let step = self.depth_range / slots.max(1) as f32;
        let total = self.image_count;
        self.planes = (0..slots)
            .map(|slot| {
                let (x, y) = self.spatial[slot];
                Plane {
                    slot,
                    z: wrap_depth(step * slot as f32, self.depth_range).0,
                    image_index: if total > 0 { slot % total } else { 0 },
                    x,
                    y,
                }
            })
            .collect();
        self.visuals = Vec::with_capacity(slots);
        log::debug!(
            "reseeded {} slots over depth {:.1} ({} images, advance {})",
            slots,
            self.depth_range,
            total,
            self.image_advance
        );
        self.refresh_visuals();
    }

    fn refresh_visuals(&mut self) {
        let range = self.depth_range;
        let half = range / 2.0;
        let falloff = self.options.falloff.unwrap_or(Falloff { near: 0.0, far: range });

        self.visuals.clear();
        for plane in &self.planes {
            let world_z = plane.z - half;
            let factor = falloff_factor(world_z.abs(), falloff);
            let n = plane.z / range;
            self.visuals.push(PlaneVisual {
                slot: plane.slot,
                image_index: plane.image_index,
                position: [plane.x, plane.y, world_z],
                normalized_depth: n,
                opacity: plane_opacity(n, &self.options.fade, factor),
                blur: plane_blur(n, &self.options.blur, factor),
            });
        }
    }
}

/// Folds `z` into `[0, range)`. The second value counts wraps: positive for
/// forward, negative for backward.
pub fn wrap_depth(z: f32, range: f32) -> (f32, i64) {
    if !z.is_finite() {
        return (0.0, 0);
    }
    let mut folded = z.rem_euclid(range);
    // Tiny negative z rounds up to exactly `range`.
    if folded >= range {
        folded = 0.0;
    }
    // Count wraps from the folded value so a snap to 0 is not a wrap.
    let wraps = ((z - folded) / range).round() as i64;
    (folded, wraps)
}

/// Moves `index` by `wraps × advance` with a non-negative modulo.
pub fn shift_index(index: usize, wraps: i64, advance: usize, total: usize) -> usize {
    if total == 0 {
        return 0;
    }
    let total = total as i64;
    let step = (wraps % total) * (advance as i64 % total);
    (index as i64 + step).rem_euclid(total) as usize
}
