//! Scroll-driven visual parameters.
//!
//! [`compute`] is a pure function of scroll offset, viewport and element
//! geometry. [`ScrollEffects`] wraps it with the two pieces of state that do
//! span ticks: the hero word stagger and the one-shot reveal latches.

use std::collections::{BTreeMap, BTreeSet};
use std::time::Duration;

use crate::config::ScrollConfig;
use crate::events::FocusSignal;

const SLOW_LAYER: f64 = 0.5;
const FAST_LAYER: f64 = 1.05;
/// Element parallax window ends when this fraction of the element has left the top.
const ELEMENT_EXIT: f64 = 0.2;
const ORB_SWAY_X: (f64, f64) = (0.0016, 26.0);
const ORB_SWAY_Y: (f64, f64) = (0.0011, 12.0);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DeviceClass {
    #[default]
    Desktop,
    /// Narrow viewport or coarse pointer without hover.
    Touch,
}

impl DeviceClass {
    pub fn classify(viewport: &Viewport, breakpoint: f64) -> Self {
        if viewport.width <= breakpoint || viewport.coarse_pointer {
            Self::Touch
        } else {
            Self::Desktop
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    pub width: f64,
    pub height: f64,
    /// Host reports `(hover: none) and (pointer: coarse)`.
    pub coarse_pointer: bool,
}

impl Default for Viewport {
    fn default() -> Self {
        Self {
            width: 1280.0,
            height: 800.0,
            coarse_pointer: false,
        }
    }
}

/// Vertical extent of an element in document coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Block {
    pub top: f64,
    pub height: f64,
}

impl Block {
    pub const fn new(top: f64, height: f64) -> Self {
        Self { top, height }
    }

    fn viewport_top(&self, scroll_top: f64) -> f64 {
        self.top - scroll_top
    }

    /// Fraction of the element inside the viewport; zero for unlaid-out elements.
    pub fn visible_fraction(&self, scroll_top: f64, viewport_height: f64) -> f64 {
        if self.height <= 0.0 {
            return 0.0;
        }
        let top = self.viewport_top(scroll_top);
        let bottom = top + self.height;
        let visible = bottom.min(viewport_height) - top.max(0.0);
        (visible / self.height).clamp(0.0, 1.0)
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct TrackedElement {
    pub block: Block,
    /// `data-parallax` coefficient; `None` uses the configured default.
    pub depth: Option<f64>,
    /// Element also carries the one-shot reveal animation.
    pub reveal: bool,
}

/// Geometry snapshot of everything the scroll effects read.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct PageLayout {
    pub document_height: f64,
    pub hero: Option<Block>,
    /// `data-depth` per hero layer.
    pub hero_layers: Vec<Option<f64>>,
    pub elements: Vec<TrackedElement>,
    /// `data-depth` per floating orb.
    pub orbs: Vec<Option<f64>>,
    pub hero_words: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ScrollInput {
    pub scroll_top: f64,
    pub viewport: Viewport,
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct OrbOffset {
    pub x: f64,
    pub y: f64,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct ScrollParameters {
    pub device: DeviceClass,
    /// Document scroll progress; also the progress bar's horizontal scale.
    pub progress: f64,
    pub star_shift: f64,
    pub star_shift_slow: Option<f64>,
    pub star_shift_fast: Option<f64>,
    pub layer_shifts: Vec<f64>,
    pub globe_parallax: f64,
    pub focus: f64,
    pub element_offsets: Vec<f64>,
    pub orb_offsets: Vec<OrbOffset>,
    /// Hero words animate on their own instead of on hover.
    pub words_auto: bool,
}

impl ScrollParameters {
    pub fn focus_signal(&self) -> FocusSignal {
        FocusSignal {
            device: self.device,
            scalar: self.focus,
        }
    }

    /// Flat name → value view, keyed the way the page's style properties are.
    pub fn named(&self) -> BTreeMap<String, f64> {
        let mut out = BTreeMap::new();
        out.insert("progress".to_string(), self.progress);
        out.insert("star-shift".to_string(), self.star_shift);
        if let Some(slow) = self.star_shift_slow {
            out.insert("star-shift-slow".to_string(), slow);
        }
        if let Some(fast) = self.star_shift_fast {
            out.insert("star-shift-fast".to_string(), fast);
        }
        for (i, shift) in self.layer_shifts.iter().enumerate() {
            out.insert(format!("layer-shift.{i}"), *shift);
        }
        out.insert("parallax".to_string(), self.globe_parallax);
        out.insert("mobile-focus".to_string(), self.focus);
        for (i, offset) in self.element_offsets.iter().enumerate() {
            out.insert(format!("scroll-parallax.{i}"), *offset);
        }
        for (i, orb) in self.orb_offsets.iter().enumerate() {
            out.insert(format!("orb-x.{i}"), orb.x);
            out.insert(format!("orb-y.{i}"), orb.y);
        }
        out
    }
}

/// Cubic ease `3t² − 2t³` on a clamped `t`.
pub fn smoothstep(t: f64) -> f64 {
    let t = t.clamp(0.0, 1.0);
    t * t * (3.0 - 2.0 * t)
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Recomputes every scroll-derived parameter from scratch.
pub fn compute(
    cfg: &ScrollConfig,
    mobile_focus: bool,
    input: &ScrollInput,
    layout: &PageLayout,
) -> ScrollParameters {
    let scroll_top = input.scroll_top;
    let vh = input.viewport.height;
    let device = DeviceClass::classify(&input.viewport, cfg.touch_breakpoint);
    let motion = !cfg.reduced_motion;

    let scroll_range = layout.document_height - vh;
    let progress = if scroll_range > 0.0 {
        (scroll_top / scroll_range).clamp(0.0, 1.0)
    } else {
        0.0
    };

    let star = cfg.star_field.pick(device);
    let (star_shift, star_shift_slow, star_shift_fast) = if motion {
        let shift = scroll_top * star.coefficient;
        (
            shift.min(star.cap),
            star.slow_cap.map(|cap| (shift * SLOW_LAYER).min(cap)),
            star.fast_cap.map(|cap| (shift * FAST_LAYER).min(cap)),
        )
    } else {
        // reduced motion pins the star field as well, so no motion output moves
        (0.0, star.slow_cap.map(|_| 0.0), star.fast_cap.map(|_| 0.0))
    };

    let hero_shift = match layout.hero {
        Some(hero) if motion && cfg.hero_parallax && !layout.hero_layers.is_empty() => {
            let span = vh + hero.height;
            if hero.height > 0.0 && span > 0.0 {
                let raw = (vh - hero.viewport_top(scroll_top)) / span;
                (raw.clamp(0.0, 1.0) - 0.5) * cfg.hero_amplitude.pick(device)
            } else {
                0.0
            }
        }
        _ => 0.0,
    };
    let layer_shifts = layout
        .hero_layers
        .iter()
        .map(|depth| hero_shift * depth.unwrap_or(cfg.default_layer_depth))
        .collect();
    let globe_parallax = hero_shift * cfg.globe_parallax;

    let focus = match layout.hero {
        Some(hero) if mobile_focus && device == DeviceClass::Touch => {
            let start = hero.top - vh * cfg.focus_lead;
            let end = hero.top + hero.height * cfg.focus_span;
            let raw = if end > start {
                (scroll_top - start) / (end - start)
            } else if scroll_top >= end {
                1.0
            } else {
                0.0
            };
            (smoothstep(raw) * cfg.focus_boost).min(1.0)
        }
        _ => 0.0,
    };

    let element_base = cfg.element_parallax_base.pick(device);
    let element_offsets = layout
        .elements
        .iter()
        .map(|el| {
            if !motion || !cfg.element_parallax || el.block.height <= 0.0 {
                return 0.0;
            }
            let start = vh;
            let end = -el.block.height * ELEMENT_EXIT;
            let raw = (start - el.block.viewport_top(scroll_top)) / (start - end);
            let depth = el.depth.unwrap_or(cfg.default_element_depth);
            round2((1.0 - smoothstep(raw)) * element_base * depth)
        })
        .collect();

    let drift = cfg.orb_drift_base.pick(device);
    let orb_offsets = layout
        .orbs
        .iter()
        .enumerate()
        .map(|(index, depth)| {
            if !motion || !cfg.orb_drift {
                return OrbOffset::default();
            }
            let depth = depth.unwrap_or(cfg.default_orb_depth);
            let phase = index as f64;
            let y = -scroll_top * drift * depth;
            let sway_x = (scroll_top * ORB_SWAY_X.0 + phase).sin() * ORB_SWAY_X.1 * depth;
            let sway_y = (scroll_top * ORB_SWAY_Y.0 + phase).cos() * ORB_SWAY_Y.1 * depth;
            OrbOffset {
                x: round2(sway_x),
                y: round2(y + sway_y),
            }
        })
        .collect();

    let words_auto =
        cfg.word_stagger && device == DeviceClass::Touch && layout.hero_words > 0 && motion;

    ScrollParameters {
        device,
        progress,
        star_shift,
        star_shift_slow,
        star_shift_fast,
        layer_shifts,
        globe_parallax,
        focus,
        element_offsets,
        orb_offsets,
        words_auto,
    }
}

/// What the presentation layer must do with the hero word delays this tick.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StaggerUpdate {
    Unchanged,
    /// Entered auto mode: one delay per word, in order.
    Assign(Vec<Duration>),
    /// Left auto mode: drop the delays.
    Clear,
}

/// Exactly-once delay assignment per entry into auto mode. Re-entry restarts
/// the delays from zero.
#[derive(Debug, Clone, Default)]
pub struct WordStagger {
    applied: bool,
}

impl WordStagger {
    pub fn is_applied(&self) -> bool {
        self.applied
    }

    pub fn update(&mut self, active: bool, words: usize, step: Duration) -> StaggerUpdate {
        match (active, self.applied) {
            (true, false) => {
                self.applied = true;
                StaggerUpdate::Assign((0..words as u32).map(|i| step * i).collect())
            }
            (false, true) => {
                self.applied = false;
                StaggerUpdate::Clear
            }
            _ => StaggerUpdate::Unchanged,
        }
    }
}

/// Result of one scheduled recomputation.
#[derive(Debug, Clone, PartialEq)]
pub struct ScrollFrame {
    pub input: ScrollInput,
    pub params: ScrollParameters,
    pub stagger: StaggerUpdate,
    /// Element indices whose reveal latched on this tick.
    pub revealed: Vec<usize>,
}

#[derive(Debug, Clone)]
pub struct ScrollEffects {
    cfg: ScrollConfig,
    mobile_focus: bool,
    stagger: WordStagger,
    /// Latched element indices; never cleared, even when a relayout drops them.
    revealed: BTreeSet<usize>,
}

impl ScrollEffects {
    pub fn new(cfg: ScrollConfig, mobile_focus: bool) -> Self {
        Self {
            cfg,
            mobile_focus,
            stagger: WordStagger::default(),
            revealed: BTreeSet::new(),
        }
    }

    pub fn is_revealed(&self, index: usize) -> bool {
        self.revealed.contains(&index)
    }

    pub fn recompute(&mut self, input: &ScrollInput, layout: &PageLayout) -> ScrollFrame {
        let params = compute(&self.cfg, self.mobile_focus, input, layout);
        let stagger = self.stagger.update(
            params.words_auto,
            layout.hero_words,
            self.cfg.word_stagger_step,
        );
        let revealed = self.latch_reveals(input, layout);
        ScrollFrame {
            input: *input,
            params,
            stagger,
            revealed,
        }
    }

    fn latch_reveals(&mut self, input: &ScrollInput, layout: &PageLayout) -> Vec<usize> {
        let mut newly = Vec::new();
        for (index, el) in layout.elements.iter().enumerate() {
            if !el.reveal || self.revealed.contains(&index) {
                continue;
            }
            let fraction = el
                .block
                .visible_fraction(input.scroll_top, input.viewport.height);
            if fraction > 0.0 && fraction >= self.cfg.reveal_threshold {
                self.revealed.insert(index);
                newly.push(index);
            }
        }
        newly
    }
}

/// At most one pending recomputation per display frame.
///
/// Requests arriving while one is already scheduled are dropped. The flag is
/// a plain `bool` because the owning loop is the only context touching it.
#[derive(Debug, Default)]
pub struct FrameCoalescer {
    scheduled: bool,
}

impl FrameCoalescer {
    /// Returns `true` if this request scheduled new work.
    pub fn request(&mut self) -> bool {
        if self.scheduled {
            return false;
        }
        self.scheduled = true;
        true
    }

    /// Called at the frame boundary; returns whether the recomputation should run.
    pub fn take(&mut self) -> bool {
        std::mem::take(&mut self.scheduled)
    }

    pub fn is_scheduled(&self) -> bool {
        self.scheduled
    }
}
