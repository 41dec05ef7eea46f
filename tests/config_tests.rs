use globe_hero::config::{Configuration, OrientationConfig, PageVariant, ScrollConfig};
use std::time::Duration;

#[test]
fn empty_document_uses_full_defaults() {
    let cfg: Configuration = serde_yaml::from_str("{}").unwrap();
    let cfg = cfg.validated().unwrap();
    assert_eq!(cfg.variant, PageVariant::Full);
    assert_eq!(cfg.frame_interval, Duration::from_millis(16));
    assert_eq!((cfg.textures.width, cfg.textures.height), (2048, 1024));
    assert_eq!(cfg.textures.fallback_color, [0x0b, 0x2a, 0x4a]);
    let orientation = cfg.orientation();
    assert!((orientation.spin_rate - 0.0016).abs() < f64::EPSILON);
    assert!(orientation.hover_focus && orientation.mobile_focus);
    assert!(cfg.scroll().word_stagger);
}

#[test]
fn parse_kebab_case_sections() {
    let yaml = r#"
frame-interval: 8ms
textures:
  diffuse-url: "file:///srv/earth.jpg"
  clouds-url: "file:///srv/clouds.jpg"
  width: 1024
  height: 512
  fallback-color: [0, 0, 0]
orientation:
  focus-latitude: 48.85
  focus-longitude: 2.35
  hover-blend: 0.2
scroll:
  reduced-motion: true
  word-stagger-step: 90ms
  hero-amplitude:
    desktop: 30
    touch: 50
"#;
    let cfg: Configuration = serde_yaml::from_str(yaml).unwrap();
    let cfg = cfg.validated().unwrap();
    assert_eq!(cfg.frame_interval, Duration::from_millis(8));
    assert_eq!(cfg.textures.diffuse_url, "file:///srv/earth.jpg");
    assert_eq!(cfg.textures.width, 1024);
    assert_eq!(cfg.textures.fallback_width, 2048);
    let orientation = cfg.orientation();
    assert!((orientation.focus_latitude - 48.85).abs() < 1e-12);
    assert!((orientation.hover_blend - 0.2).abs() < 1e-12);
    assert!((orientation.idle_blend - 0.06).abs() < 1e-12);
    let scroll = cfg.scroll();
    assert!(scroll.reduced_motion);
    assert_eq!(scroll.word_stagger_step, Duration::from_millis(90));
    assert_eq!(scroll.hero_amplitude.touch, 50.0);
    assert_eq!(scroll.touch_breakpoint, 640.0);
}

#[test]
fn legacy_variant_presets() {
    let cfg: Configuration = serde_yaml::from_str("variant: legacy").unwrap();
    let cfg = cfg.validated().unwrap();
    assert_eq!(cfg.variant, PageVariant::Legacy);
    let orientation = cfg.orientation();
    assert!(!orientation.hover_focus);
    assert!(!orientation.mobile_focus);
    assert!((orientation.spin_rate - 0.0012).abs() < f64::EPSILON);
    assert!((orientation.cloud_spin_rate - 0.0018).abs() < f64::EPSILON);
    assert_eq!(orientation.idle_blend, 1.0);
    let scroll = cfg.scroll();
    assert!(!scroll.hero_parallax && !scroll.element_parallax && !scroll.orb_drift);
    assert!(!scroll.word_stagger);
    assert_eq!(scroll.star_field.desktop.cap, 120.0);
    assert_eq!(scroll.star_field.touch.slow_cap, None);
}

#[test]
fn orientation_section_overlays_legacy_preset() {
    let yaml = r#"
variant: legacy
orientation:
  focus-latitude: 10
  spin-rate: 0.002
"#;
    let cfg: Configuration = serde_yaml::from_str(yaml).unwrap();
    let orientation = cfg.orientation();
    assert!((orientation.focus_latitude - 10.0).abs() < f64::EPSILON);
    assert!((orientation.spin_rate - 0.002).abs() < f64::EPSILON);
    assert!(!orientation.hover_focus);
    assert!(!orientation.mobile_focus);
    assert_eq!(orientation.idle_blend, 1.0);
    assert!((orientation.cloud_spin_rate - 0.0018).abs() < f64::EPSILON);
    // scroll section absent: still the legacy preset
    assert!(!cfg.scroll().orb_drift);
}

#[test]
fn scroll_section_overlays_legacy_preset() {
    let yaml = r#"
variant: legacy
scroll:
  reduced-motion: true
"#;
    let cfg: Configuration = serde_yaml::from_str(yaml).unwrap();
    let scroll = cfg.scroll();
    assert!(scroll.reduced_motion);
    assert!(!scroll.hero_parallax && !scroll.element_parallax && !scroll.orb_drift);
    assert!(!scroll.word_stagger);
    assert_eq!(scroll.star_field.desktop.cap, 120.0);
    assert_eq!(scroll.star_field.desktop.slow_cap, None);
    assert_eq!(scroll.star_field.touch.fast_cap, None);
}

#[test]
fn nested_per_device_values_merge_key_by_key() {
    let yaml = r#"
scroll:
  hero-amplitude:
    touch: 50
  star-field:
    desktop:
      cap: 100
"#;
    let cfg: Configuration = serde_yaml::from_str(yaml).unwrap();
    let scroll = cfg.scroll();
    assert_eq!(scroll.hero_amplitude.desktop, 28.0);
    assert_eq!(scroll.hero_amplitude.touch, 50.0);
    assert_eq!(scroll.star_field.desktop.cap, 100.0);
    assert_eq!(scroll.star_field.desktop.coefficient, 0.16);
    assert_eq!(scroll.star_field.desktop.slow_cap, Some(90.0));
    assert_eq!(scroll.word_stagger_step, Duration::from_millis(120));
}

#[test]
fn unknown_variant_is_rejected() {
    let err = serde_yaml::from_str::<Configuration>("variant: retro").unwrap_err();
    assert!(err.to_string().contains("unknown variant"));
}

#[test]
fn zero_blend_rate_fails_validation() {
    let yaml = r#"
orientation:
  hover-blend: 0.0
"#;
    let cfg: Configuration = serde_yaml::from_str(yaml).unwrap();
    let err = cfg.validated().unwrap_err();
    assert!(format!("{err:#}").contains("hover-blend"));
}

#[test]
fn zero_texture_size_fails_validation() {
    let yaml = r#"
textures:
  width: 0
"#;
    let cfg: Configuration = serde_yaml::from_str(yaml).unwrap();
    assert!(cfg.validated().is_err());
}

#[test]
fn zero_frame_interval_fails_validation() {
    let cfg: Configuration = serde_yaml::from_str("frame-interval: 0s").unwrap();
    assert!(cfg.validated().is_err());
}

#[test]
fn presets_match_section_defaults() {
    let full = OrientationConfig::for_variant(PageVariant::Full);
    assert_eq!(full.hover_blend, OrientationConfig::default().hover_blend);
    let scroll = ScrollConfig::for_variant(PageVariant::Full);
    assert_eq!(scroll.focus_boost, 1.15);
}

#[test]
fn from_yaml_file_reads_disk() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("globe.yaml");
    std::fs::write(&path, "variant: legacy\nframe-interval: 20ms\n").unwrap();
    let cfg = Configuration::from_yaml_file(&path).unwrap();
    assert_eq!(cfg.frame_interval, Duration::from_millis(20));
    assert!(Configuration::from_yaml_file(dir.path().join("missing.yaml")).is_err());
}
