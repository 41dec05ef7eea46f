use std::path::Path;
use std::time::Duration;

use anyhow::{Context, Result, ensure};
use serde::{Deserialize, Serialize};
use serde_yaml::Value;

use crate::scroll::DeviceClass;

/// Which page the globe is mounted on.
///
/// `legacy` is the stripped-down landing page: constant spin, no focus
/// behaviour, and a single capped star-field shift.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PageVariant {
    #[default]
    Full,
    Legacy,
}

/// Resolved configuration.
///
/// The `orientation` and `scroll` sections are overlays: keys present in the
/// YAML replace the matching keys of the variant preset, everything else
/// keeps the preset value.
#[derive(Debug, Clone, Deserialize)]
#[serde(try_from = "RawConfiguration")]
pub struct Configuration {
    pub variant: PageVariant,
    /// Display-frame period shared by the render and scroll loops.
    pub frame_interval: Duration,
    pub textures: TextureConfig,
    orientation: OrientationConfig,
    scroll: ScrollConfig,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "kebab-case", default)]
struct RawConfiguration {
    variant: PageVariant,
    #[serde(with = "humantime_serde")]
    frame_interval: Duration,
    textures: TextureConfig,
    orientation: Option<Value>,
    scroll: Option<Value>,
}

impl Default for RawConfiguration {
    fn default() -> Self {
        let resolved = Configuration::default();
        Self {
            variant: resolved.variant,
            frame_interval: resolved.frame_interval,
            textures: resolved.textures,
            orientation: None,
            scroll: None,
        }
    }
}

impl TryFrom<RawConfiguration> for Configuration {
    type Error = serde_yaml::Error;

    fn try_from(raw: RawConfiguration) -> Result<Self, Self::Error> {
        Ok(Self {
            orientation: overlay_section(
                OrientationConfig::for_variant(raw.variant),
                raw.orientation,
            )?,
            scroll: overlay_section(ScrollConfig::for_variant(raw.variant), raw.scroll)?,
            variant: raw.variant,
            frame_interval: raw.frame_interval,
            textures: raw.textures,
        })
    }
}

fn overlay_section<T>(preset: T, section: Option<Value>) -> Result<T, serde_yaml::Error>
where
    T: Serialize + serde::de::DeserializeOwned,
{
    let Some(section) = section else {
        return Ok(preset);
    };
    let mut merged = serde_yaml::to_value(&preset)?;
    merge_into(&mut merged, section);
    serde_yaml::from_value(merged)
}

/// Mappings merge key by key, recursively; any other value replaces.
fn merge_into(base: &mut Value, patch: Value) {
    match (base, patch) {
        (Value::Mapping(base), Value::Mapping(patch)) => {
            for (key, value) in patch {
                match base.get_mut(&key) {
                    Some(slot) => merge_into(slot, value),
                    None => {
                        base.insert(key, value);
                    }
                }
            }
        }
        (slot, patch) => *slot = patch,
    }
}

impl Configuration {
    pub fn from_yaml_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let s = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display()))?;
        Ok(serde_yaml::from_str(&s)?)
    }

    /// Orientation values: the variant preset with any YAML overrides applied.
    pub fn orientation(&self) -> OrientationConfig {
        self.orientation.clone()
    }

    pub fn scroll(&self) -> ScrollConfig {
        self.scroll.clone()
    }

    /// Validate runtime invariants that cannot be expressed via serde defaults alone.
    pub fn validated(self) -> Result<Self> {
        ensure!(
            !self.frame_interval.is_zero(),
            "frame-interval must be greater than zero"
        );
        self.textures.validate().context("invalid textures section")?;
        self.orientation
            .validate()
            .context("invalid orientation section")?;
        self.scroll.validate().context("invalid scroll section")?;
        Ok(self)
    }
}

impl Default for Configuration {
    fn default() -> Self {
        Self {
            variant: PageVariant::Full,
            frame_interval: Duration::from_millis(16),
            textures: TextureConfig::default(),
            orientation: OrientationConfig::default(),
            scroll: ScrollConfig::default(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "kebab-case", default)]
pub struct TextureConfig {
    pub diffuse_url: String,
    pub clouds_url: String,
    /// Working size every fetched photograph is resampled to.
    pub width: u32,
    pub height: u32,
    pub fallback_width: u32,
    pub fallback_height: u32,
    /// Flat "deep ocean" colour used when either fetch fails.
    pub fallback_color: [u8; 3],
}

impl TextureConfig {
    fn validate(&self) -> Result<()> {
        ensure!(
            self.width > 0 && self.height > 0,
            "width and height must be greater than zero"
        );
        ensure!(
            self.fallback_width > 0 && self.fallback_height > 0,
            "fallback-width and fallback-height must be greater than zero"
        );
        Ok(())
    }
}

impl Default for TextureConfig {
    fn default() -> Self {
        Self {
            diffuse_url: "https://upload.wikimedia.org/wikipedia/commons/c/cd/Land_ocean_ice_2048.jpg"
                .to_string(),
            clouds_url:
                "https://upload.wikimedia.org/wikipedia/commons/6/6b/Land_ocean_ice_cloud_hires.jpg"
                    .to_string(),
            width: 2048,
            height: 1024,
            fallback_width: 2048,
            fallback_height: 1024,
            fallback_color: [0x0b, 0x2a, 0x4a],
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case", default)]
pub struct OrientationConfig {
    /// Point of interest, in degrees.
    pub focus_latitude: f64,
    pub focus_longitude: f64,
    /// Idle yaw advance per frame, radians.
    pub spin_rate: f64,
    /// Cloud layer yaw advance per frame, radians.
    pub cloud_spin_rate: f64,
    /// Pitch wobble: `sin(ms * frequency) * amplitude`.
    pub wobble_frequency: f64,
    pub wobble_amplitude: f64,
    pub idle_blend: f64,
    pub hover_blend: f64,
    pub scroll_blend: f64,
    /// Focus scalar above which the annotation label is shown.
    pub label_threshold: f64,
    pub hover_focus: bool,
    pub mobile_focus: bool,
}

impl OrientationConfig {
    pub fn for_variant(variant: PageVariant) -> Self {
        match variant {
            PageVariant::Full => Self::default(),
            PageVariant::Legacy => Self {
                spin_rate: 0.0012,
                cloud_spin_rate: 0.0018,
                idle_blend: 1.0,
                hover_focus: false,
                mobile_focus: false,
                ..Self::default()
            },
        }
    }

    fn validate(&self) -> Result<()> {
        for (name, rate) in [
            ("idle-blend", self.idle_blend),
            ("hover-blend", self.hover_blend),
            ("scroll-blend", self.scroll_blend),
        ] {
            ensure!(
                rate > 0.0 && rate <= 1.0,
                "{name} must be within (0, 1], got {rate}"
            );
        }
        ensure!(
            (-90.0..=90.0).contains(&self.focus_latitude),
            "focus-latitude must be within [-90, 90]"
        );
        ensure!(
            (0.0..=1.0).contains(&self.label_threshold),
            "label-threshold must be within [0, 1]"
        );
        Ok(())
    }
}

impl Default for OrientationConfig {
    fn default() -> Self {
        Self {
            focus_latitude: 33.8547,
            focus_longitude: 35.8623,
            spin_rate: 0.0016,
            cloud_spin_rate: 0.0022,
            wobble_frequency: 0.0002,
            wobble_amplitude: 0.03,
            idle_blend: 0.06,
            hover_blend: 0.08,
            scroll_blend: 0.10,
            label_threshold: 0.15,
            hover_focus: true,
            mobile_focus: true,
        }
    }
}

/// A value that differs between desktop and touch/narrow layouts.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct PerDevice<T> {
    pub desktop: T,
    pub touch: T,
}

impl<T: Copy> PerDevice<T> {
    pub const fn new(desktop: T, touch: T) -> Self {
        Self { desktop, touch }
    }

    pub fn pick(&self, class: DeviceClass) -> T {
        match class {
            DeviceClass::Desktop => self.desktop,
            DeviceClass::Touch => self.touch,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct StarShift {
    /// Pixels of shift per pixel scrolled.
    pub coefficient: f64,
    pub cap: f64,
    /// Caps for the half-speed and 1.05x layers; absent means the layer is not driven.
    #[serde(default)]
    pub slow_cap: Option<f64>,
    #[serde(default)]
    pub fast_cap: Option<f64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case", default)]
pub struct ScrollConfig {
    pub reduced_motion: bool,
    /// Viewports at or below this width count as touch/narrow.
    pub touch_breakpoint: f64,
    pub star_field: PerDevice<StarShift>,
    pub hero_parallax: bool,
    pub hero_amplitude: PerDevice<f64>,
    pub globe_parallax: f64,
    pub default_layer_depth: f64,
    pub element_parallax: bool,
    pub element_parallax_base: PerDevice<f64>,
    pub default_element_depth: f64,
    pub orb_drift: bool,
    pub orb_drift_base: PerDevice<f64>,
    pub default_orb_depth: f64,
    /// Focus window opens this many viewport heights above the hero top.
    pub focus_lead: f64,
    /// Focus window closes this many hero heights below the hero top.
    pub focus_span: f64,
    pub focus_boost: f64,
    /// Visible fraction at which a reveal element latches visible.
    pub reveal_threshold: f64,
    pub word_stagger: bool,
    #[serde(with = "humantime_serde")]
    pub word_stagger_step: Duration,
}

impl ScrollConfig {
    pub fn for_variant(variant: PageVariant) -> Self {
        match variant {
            PageVariant::Full => Self::default(),
            PageVariant::Legacy => {
                let single = StarShift {
                    coefficient: 0.08,
                    cap: 120.0,
                    slow_cap: None,
                    fast_cap: None,
                };
                Self {
                    star_field: PerDevice::new(single, single),
                    hero_parallax: false,
                    element_parallax: false,
                    orb_drift: false,
                    word_stagger: false,
                    ..Self::default()
                }
            }
        }
    }

    fn validate(&self) -> Result<()> {
        ensure!(
            self.touch_breakpoint >= 0.0,
            "touch-breakpoint must not be negative"
        );
        ensure!(self.focus_boost > 0.0, "focus-boost must be positive");
        ensure!(
            self.focus_lead + self.focus_span >= 0.0,
            "focus window must not be inverted"
        );
        ensure!(
            (0.0..=1.0).contains(&self.reveal_threshold),
            "reveal-threshold must be within [0, 1]"
        );
        for shift in [self.star_field.desktop, self.star_field.touch] {
            ensure!(shift.cap >= 0.0, "star-field caps must not be negative");
        }
        Ok(())
    }
}

impl Default for ScrollConfig {
    fn default() -> Self {
        Self {
            reduced_motion: false,
            touch_breakpoint: 640.0,
            star_field: PerDevice::new(
                StarShift {
                    coefficient: 0.16,
                    cap: 140.0,
                    slow_cap: Some(90.0),
                    fast_cap: Some(160.0),
                },
                StarShift {
                    coefficient: 0.22,
                    cap: 200.0,
                    slow_cap: Some(120.0),
                    fast_cap: Some(240.0),
                },
            ),
            hero_parallax: true,
            hero_amplitude: PerDevice::new(28.0, 44.0),
            globe_parallax: 0.7,
            default_layer_depth: 0.6,
            element_parallax: true,
            element_parallax_base: PerDevice::new(220.0, 160.0),
            default_element_depth: 0.12,
            orb_drift: true,
            orb_drift_base: PerDevice::new(0.14, 0.2),
            default_orb_depth: 0.2,
            focus_lead: 0.3,
            focus_span: 0.6,
            focus_boost: 1.15,
            reveal_threshold: 0.2,
            word_stagger: true,
            word_stagger_step: Duration::from_millis(120),
        }
    }
}
