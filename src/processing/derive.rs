//! Per-pixel rules that turn the two source photographs into the auxiliary
//! maps the globe material needs.
//!
//! Every rule reads one source pixel and writes one output pixel, so each map
//! is a single row-major pass over the raster.

use image::{Rgba, RgbaImage};

const LUMA_WEIGHTS: [f32; 3] = [0.30, 0.59, 0.11];

const BUMP_LIFT: f32 = 25.0;

const WATER_MARGIN: u8 = 10;
const SPECULAR_WATER: u8 = 200;
const SPECULAR_LAND: u8 = 40;

const CLOUD_THRESHOLD: f32 = 180.0;
const CLOUD_GAIN: f32 = 2.2;

pub fn luma(pixel: &Rgba<u8>) -> f32 {
    pixel[0] as f32 * LUMA_WEIGHTS[0]
        + pixel[1] as f32 * LUMA_WEIGHTS[1]
        + pixel[2] as f32 * LUMA_WEIGHTS[2]
}

/// Brightened luminance used as a relief proxy. Grey, fully opaque.
pub fn bump_from_diffuse(diffuse: &RgbaImage) -> RgbaImage {
    map_pixels(diffuse, |px| {
        let v = to_channel(luma(px) + BUMP_LIFT);
        Rgba([v, v, v, 255])
    })
}

/// Binary reflectivity mask: blue-dominant pixels are treated as water.
pub fn specular_from_diffuse(diffuse: &RgbaImage) -> RgbaImage {
    map_pixels(diffuse, |px| {
        let v = if is_water(px) {
            SPECULAR_WATER
        } else {
            SPECULAR_LAND
        };
        Rgba([v, v, v, 255])
    })
}

/// White layer whose alpha keeps only the bright regions of the cloud photo.
pub fn cloud_alpha(clouds: &RgbaImage) -> RgbaImage {
    map_pixels(clouds, |px| Rgba([255, 255, 255, cloud_alpha_for(luma(px))]))
}

pub fn is_water(pixel: &Rgba<u8>) -> bool {
    let [r, g, b, _] = pixel.0;
    b > g.saturating_add(WATER_MARGIN) && b > r.saturating_add(WATER_MARGIN)
}

fn cloud_alpha_for(luma: f32) -> u8 {
    if luma <= CLOUD_THRESHOLD {
        return 0;
    }
    to_channel((luma - CLOUD_THRESHOLD) * CLOUD_GAIN)
}

fn to_channel(value: f32) -> u8 {
    value.round().clamp(0.0, 255.0) as u8
}

fn map_pixels(source: &RgbaImage, rule: impl Fn(&Rgba<u8>) -> Rgba<u8>) -> RgbaImage {
    let mut out = RgbaImage::new(source.width(), source.height());
    for (dst, src) in out.pixels_mut().zip(source.pixels()) {
        *dst = rule(src);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn strip(pixels: &[[u8; 4]]) -> RgbaImage {
        let raw = pixels.iter().flatten().copied().collect();
        RgbaImage::from_raw(pixels.len() as u32, 1, raw).unwrap()
    }

    fn sweep() -> RgbaImage {
        let mut pixels = Vec::new();
        for r in (0..=255u16).step_by(51) {
            for g in (0..=255u16).step_by(51) {
                for b in (0..=255u16).step_by(15) {
                    pixels.push([r as u8, g as u8, b as u8, (b as u8) / 2]);
                }
            }
        }
        strip(&pixels)
    }

    #[test]
    fn bump_is_opaque_grey() {
        let out = bump_from_diffuse(&sweep());
        for px in out.pixels() {
            assert_eq!(px[0], px[1]);
            assert_eq!(px[1], px[2]);
            assert_eq!(px[3], 255);
        }
    }

    #[test]
    fn bump_lifts_and_saturates() {
        let out = bump_from_diffuse(&strip(&[[0, 0, 0, 0], [255, 255, 255, 255], [100, 100, 100, 7]]));
        assert_eq!(out.get_pixel(0, 0)[0], 25);
        assert_eq!(out.get_pixel(1, 0)[0], 255);
        assert_eq!(out.get_pixel(2, 0)[0], 125);
    }

    #[test]
    fn specular_is_two_valued() {
        let source = sweep();
        let out = specular_from_diffuse(&source);
        for (src, px) in source.pixels().zip(out.pixels()) {
            let expected = if is_water(src) { 200 } else { 40 };
            assert_eq!(px.0, [expected, expected, expected, 255]);
        }
    }

    #[test]
    fn water_needs_a_clear_blue_margin() {
        assert!(is_water(&Rgba([10, 20, 31, 255])));
        assert!(!is_water(&Rgba([10, 20, 30, 255])));
        assert!(!is_water(&Rgba([25, 0, 35, 255])));
        assert!(!is_water(&Rgba([250, 250, 255, 255])));
    }

    #[test]
    fn cloud_alpha_is_white_and_thresholded() {
        let source = sweep();
        let out = cloud_alpha(&source);
        for (src, px) in source.pixels().zip(out.pixels()) {
            assert_eq!(&px.0[..3], &[255, 255, 255]);
            if luma(src) <= 180.0 {
                assert_eq!(px[3], 0);
            }
        }
    }

    #[test]
    fn cloud_alpha_rises_with_luma() {
        let greys: Vec<[u8; 4]> = (0..=255u8).map(|v| [v, v, v, 255]).collect();
        let out = cloud_alpha(&strip(&greys));
        let alphas: Vec<u8> = out.pixels().map(|p| p[3]).collect();
        assert!(alphas.windows(2).all(|w| w[0] <= w[1]));
        assert_eq!(alphas[180], 0);
        assert_eq!(alphas[200], 44);
        assert_eq!(alphas[255], 165);
    }

    #[test]
    fn outputs_keep_source_dimensions() {
        let source = RgbaImage::new(7, 3);
        assert_eq!(bump_from_diffuse(&source).dimensions(), (7, 3));
        assert_eq!(specular_from_diffuse(&source).dimensions(), (7, 3));
        assert_eq!(cloud_alpha(&source).dimensions(), (7, 3));
    }
}
