//! Globe orientation: idle spin, pointer-hover focus, and scroll-driven focus
//! on touch layouts, advanced once per rendered frame.

use std::f64::consts::{FRAC_PI_2, PI, TAU};
use std::time::Duration;

use crate::config::OrientationConfig;
use crate::events::{FocusSignal, PointerEvent};
use crate::scroll::DeviceClass;

/// Wraps an angle into `(-π, π]`.
pub fn wrap_angle(angle: f64) -> f64 {
    let a = angle.rem_euclid(TAU);
    if a > PI { a - TAU } else { a }
}

/// Moves `from` toward `to` by fraction `t` along the shorter arc.
pub fn lerp_angle(from: f64, to: f64, t: f64) -> f64 {
    from + wrap_angle(to - from) * t
}

/// Pitch/yaw that brings a geographic point to face the camera.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FocusTarget {
    pub pitch: f64,
    pub yaw: f64,
}

impl FocusTarget {
    pub fn from_lat_lon(latitude_deg: f64, longitude_deg: f64) -> Self {
        Self {
            pitch: latitude_deg.to_radians(),
            yaw: -longitude_deg.to_radians() - FRAC_PI_2,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FocusMode {
    Idle,
    HoverFocused,
    /// Blend factor toward the focus target, in `[0, 1]`.
    ScrollFocused(f64),
}

/// Output of one controller tick, consumed by the presentation layer.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OrientationFrame {
    pub pitch: f64,
    /// Globe yaw wrapped into `(-π, π]`.
    pub yaw: f64,
    /// Cloud shell yaw wrapped into `(-π, π]`.
    pub cloud_yaw: f64,
    pub label_visible: bool,
    pub mode: FocusMode,
}

#[derive(Debug, Clone)]
pub struct OrientationController {
    cfg: OrientationConfig,
    target: FocusTarget,
    current_x: f64,
    current_y: f64,
    spin_y: f64,
    cloud_yaw: f64,
    hovered: bool,
}

impl OrientationController {
    pub fn new(cfg: OrientationConfig) -> Self {
        let target = FocusTarget::from_lat_lon(cfg.focus_latitude, cfg.focus_longitude);
        Self {
            cfg,
            target,
            current_x: 0.0,
            current_y: 0.0,
            spin_y: 0.0,
            cloud_yaw: 0.0,
            hovered: false,
        }
    }

    pub fn target(&self) -> FocusTarget {
        self.target
    }

    /// Last rendered (pitch, yaw), unwrapped.
    pub fn current(&self) -> (f64, f64) {
        (self.current_x, self.current_y)
    }

    pub fn spin(&self) -> f64 {
        self.spin_y
    }

    pub fn on_pointer(&mut self, event: PointerEvent) {
        if !self.cfg.hover_focus {
            return;
        }
        match event {
            PointerEvent::Enter => self.hovered = true,
            PointerEvent::Leave => {
                self.hovered = false;
                // resume idle spin from where the globe actually is
                self.spin_y = self.current_y;
            }
        }
    }

    pub fn mode(&self, focus: FocusSignal) -> FocusMode {
        if self.cfg.mobile_focus && focus.device == DeviceClass::Touch {
            FocusMode::ScrollFocused(focus.scalar.clamp(0.0, 1.0))
        } else if self.hovered {
            FocusMode::HoverFocused
        } else {
            FocusMode::Idle
        }
    }

    /// Advances one frame. `elapsed` is wall-clock time since the loop started.
    pub fn tick(&mut self, elapsed: Duration, focus: FocusSignal) -> OrientationFrame {
        self.spin_y += self.cfg.spin_rate;
        self.cloud_yaw += self.cfg.cloud_spin_rate;

        let millis = elapsed.as_secs_f64() * 1000.0;
        let base_x = (millis * self.cfg.wobble_frequency).sin() * self.cfg.wobble_amplitude;
        let base_y = self.spin_y;

        let mode = self.mode(focus);
        let (goal_x, goal_y, rate) = match mode {
            FocusMode::Idle => (base_x, base_y, self.cfg.idle_blend),
            FocusMode::HoverFocused => (self.target.pitch, self.target.yaw, self.cfg.hover_blend),
            FocusMode::ScrollFocused(scalar) => (
                lerp_angle(base_x, self.target.pitch, scalar),
                lerp_angle(base_y, self.target.yaw, scalar),
                self.cfg.scroll_blend,
            ),
        };
        self.current_x = lerp_angle(self.current_x, goal_x, rate);
        self.current_y = lerp_angle(self.current_y, goal_y, rate);

        let label_visible = match mode {
            FocusMode::HoverFocused => true,
            FocusMode::ScrollFocused(scalar) => scalar > self.cfg.label_threshold,
            FocusMode::Idle => false,
        };

        OrientationFrame {
            pitch: self.current_x,
            yaw: wrap_angle(self.current_y),
            cloud_yaw: wrap_angle(self.cloud_yaw),
            label_visible,
            mode,
        }
    }
}
