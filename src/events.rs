use crate::processing::raster::TextureSet;
use crate::scroll::{DeviceClass, PageLayout, Viewport};

/// Host input feeding the scroll effect loop.
#[derive(Debug, Clone)]
pub enum ScrollEvent {
    /// New document scroll offset, in CSS pixels.
    Scrolled(f64),
    Resized(Viewport),
    /// Element geometry changed (layout settled, content loaded).
    Relayout(PageLayout),
}

/// Edge-triggered pointer transitions on the globe surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointerEvent {
    Enter,
    Leave,
}

/// Last-write-wins value the scroll loop shares with the render loop.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FocusSignal {
    pub device: DeviceClass,
    /// Mobile focus scalar in `[0, 1]`; zero outside the touch layout.
    pub scalar: f64,
}

impl Default for FocusSignal {
    fn default() -> Self {
        Self {
            device: DeviceClass::Desktop,
            scalar: 0.0,
        }
    }
}

/// Delivered exactly once per page load, either fetched or fallback.
#[derive(Debug)]
pub struct TexturesReady(pub TextureSet);
