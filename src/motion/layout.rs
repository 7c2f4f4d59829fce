//! Slot layout: responsive slot count, depth range and the lateral spread of
//! each slot.

use std::f32::consts::{PI, TAU};

/// Depth range used when no spacing is configured, or when there are no slots.
pub const DEFAULT_DEPTH_RANGE: f32 = 50.0;
pub const DEFAULT_Z_SPACING: f32 = 4.0;
pub const MAX_HORIZONTAL_OFFSET: f32 = 8.0;
pub const MAX_VERTICAL_OFFSET: f32 = 8.0;

const COMPACT_MIN_SLOTS: usize = 4;
const COMPACT_SLOT_RATIO: f32 = 0.6;
const COMPACT_SPACING_MUL: f32 = 1.2;
const COMPACT_SPREAD: f32 = 0.7;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeviceClass {
    Regular,
    /// Narrow viewport: fewer, more widely spaced slots with a tighter spread.
    Compact,
}

impl DeviceClass {
    pub fn for_width(cols: u16, compact_below: u16) -> Self {
        if cols < compact_below {
            Self::Compact
        } else {
            Self::Regular
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Regular => "regular",
            Self::Compact => "compact",
        }
    }
}

pub fn responsive_slots(visible_count: usize, device: DeviceClass) -> usize {
    match device {
        DeviceClass::Regular => visible_count,
        DeviceClass::Compact => {
            let scaled = (visible_count as f32 * COMPACT_SLOT_RATIO).floor() as usize;
            scaled.max(COMPACT_MIN_SLOTS)
        }
    }
}

/// Spacing after the device adjustment. Non-positive or non-finite spacing
/// counts as unset.
pub fn responsive_spacing(spacing: Option<f32>, device: DeviceClass) -> Option<f32> {
    let s = spacing.filter(|s| s.is_finite() && *s > 0.0)?;
    Some(match device {
        DeviceClass::Regular => s,
        DeviceClass::Compact => s * COMPACT_SPACING_MUL,
    })
}

/// Length of the looping depth axis. Never below 1.
pub fn depth_range(slots: usize, spacing: Option<f32>) -> f32 {
    let range = if slots == 0 {
        DEFAULT_DEPTH_RANGE
    } else {
        let spacing = spacing.unwrap_or(DEFAULT_DEPTH_RANGE / slots as f32);
        slots as f32 * spacing
    };
    if range.is_finite() { range.max(1.0) } else { DEFAULT_DEPTH_RANGE }
}

/// Image-index steps a plane takes per wrap. Equal to `total` (no visible
/// shift) when `slots` is a multiple of `total`; 0 without images.
pub fn image_advance(slots: usize, total: usize) -> usize {
    if total == 0 {
        return 0;
    }
    match slots % total {
        0 => total,
        n => n,
    }
}

/// Deterministic lateral offsets per slot, spread with golden-ratio angles.
pub fn spatial_table(slots: usize, device: DeviceClass) -> Vec<(f32, f32)> {
    let spread = match device {
        DeviceClass::Regular => 1.0,
        DeviceClass::Compact => COMPACT_SPREAD,
    };

    (0..slots)
        .map(|i| {
            let fi = i as f32;
            let horizontal_angle = (fi * 2.618).rem_euclid(TAU);
            let vertical_angle = (fi * 1.618 + PI / 3.0).rem_euclid(TAU);
            let horizontal_radius = (i % 3) as f32 * 1.2 * spread;
            let vertical_radius = ((i + 1) % 4) as f32 * 0.8 * spread;

            let x = horizontal_angle.sin() * horizontal_radius * MAX_HORIZONTAL_OFFSET / 3.0;
            let y = vertical_angle.cos() * vertical_radius * MAX_VERTICAL_OFFSET / 4.0;
            (x, y)
        })
        .collect()
}
