//! Input messages, the clamped scroll velocity and the idle autoplay timer.

use std::time::{Duration, Instant};

pub const MAX_SCROLL_VELOCITY: f32 = 5.0;
pub const SCROLL_ACCEL: f32 = 0.004;
pub const KEY_ACCEL: f32 = 0.8;
pub const TOUCH_ACCEL: f32 = 0.01;
pub const AUTO_ACCEL: f32 = 0.25;
pub const DAMPING: f32 = 0.94;

pub const AUTOPLAY_IDLE: Duration = Duration::from_millis(3000);
pub const AUTOPLAY_POLL: Duration = Duration::from_secs(1);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArrowKey {
    Up,
    Down,
    Left,
    Right,
}

/// One user gesture, queued into the engine and integrated on the next tick.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum InputEvent {
    Wheel { delta_y: f32 },
    Key(ArrowKey),
    TouchStart,
    TouchMove,
}

impl InputEvent {
    /// Velocity delta contributed by this event at the given speed multiplier.
    pub fn velocity_delta(self, speed: f32) -> f32 {
        match self {
            Self::Wheel { delta_y } => delta_y * SCROLL_ACCEL * speed,
            Self::Key(ArrowKey::Up | ArrowKey::Left) => -KEY_ACCEL * speed,
            Self::Key(ArrowKey::Down | ArrowKey::Right) => KEY_ACCEL * speed,
            Self::TouchStart => 0.0,
            Self::TouchMove => TOUCH_ACCEL * speed,
        }
    }

    /// Touch moves keep the gesture alive but do not by themselves stop
    /// autoplay; everything else does.
    pub fn stops_autoplay(self) -> bool {
        !matches!(self, Self::TouchMove)
    }
}

/// Motion rate along the depth axis, always inside
/// `[-MAX_SCROLL_VELOCITY, MAX_SCROLL_VELOCITY]`.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ScrollVelocity(f32);

impl ScrollVelocity {
    pub fn get(self) -> f32 {
        self.0
    }

    pub fn add(&mut self, delta: f32) {
        self.0 = clamp_velocity(self.0 + delta);
    }

    pub fn damp(&mut self) {
        self.0 = clamp_velocity(self.0 * DAMPING);
    }
}

pub fn clamp_velocity(v: f32) -> f32 {
    if v.is_nan() {
        return 0.0;
    }
    v.clamp(-MAX_SCROLL_VELOCITY, MAX_SCROLL_VELOCITY)
}

/// Re-enables autoplay after [`AUTOPLAY_IDLE`] without interaction, checked
/// at [`AUTOPLAY_POLL`] granularity.
#[derive(Debug, Clone)]
pub struct AutoplayTimer {
    enabled: bool,
    last_interaction: Instant,
    last_poll: Instant,
}

impl AutoplayTimer {
    pub fn new(now: Instant) -> Self {
        Self {
            enabled: true,
            last_interaction: now,
            last_poll: now,
        }
    }

    pub fn enabled(&self) -> bool {
        self.enabled
    }

    pub fn last_interaction(&self) -> Instant {
        self.last_interaction
    }

    pub fn record_interaction(&mut self, now: Instant, stop: bool) {
        self.last_interaction = now;
        if stop {
            self.enabled = false;
        }
    }

    /// Returns true when this poll flipped autoplay back on.
    pub fn poll(&mut self, now: Instant) -> bool {
        if now.saturating_duration_since(self.last_poll) < AUTOPLAY_POLL {
            return false;
        }
        self.last_poll = now;
        if !self.enabled && now.saturating_duration_since(self.last_interaction) > AUTOPLAY_IDLE {
            self.enabled = true;
            return true;
        }
        false
    }
}
