use std::path::Path;

use anyhow::{Context, Result};
use fast_image_resize as fir;
use image::{Rgba, RgbaImage};

use crate::processing::derive::{bump_from_diffuse, cloud_alpha, specular_from_diffuse};

/// The four globe rasters, always populated together.
#[derive(Debug, Clone)]
pub struct TextureSet {
    pub diffuse: RgbaImage,
    pub bump: RgbaImage,
    pub specular: RgbaImage,
    pub clouds: RgbaImage,
    pub origin: TextureOrigin,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextureOrigin {
    Fetched,
    Fallback,
}

impl TextureSet {
    /// Derives bump and specular from `diffuse` and the cloud alpha map from
    /// `clouds`. Both inputs must already be at the pipeline size.
    pub fn derive(diffuse: RgbaImage, clouds: &RgbaImage) -> Self {
        debug_assert_eq!(diffuse.dimensions(), clouds.dimensions());
        let bump = bump_from_diffuse(&diffuse);
        let specular = specular_from_diffuse(&diffuse);
        let clouds = cloud_alpha(clouds);
        Self {
            diffuse,
            bump,
            specular,
            clouds,
            origin: TextureOrigin::Fetched,
        }
    }

    /// Flat single-colour set. The derivation rules collapse to constants on
    /// a flat raster, so the same raster fills every slot.
    pub fn flat(width: u32, height: u32, color: [u8; 3]) -> Self {
        let raster = RgbaImage::from_pixel(
            width.max(1),
            height.max(1),
            Rgba([color[0], color[1], color[2], 255]),
        );
        Self {
            diffuse: raster.clone(),
            bump: raster.clone(),
            specular: raster.clone(),
            clouds: raster,
            origin: TextureOrigin::Fallback,
        }
    }

    pub fn dimensions(&self) -> (u32, u32) {
        self.diffuse.dimensions()
    }

    pub fn is_fallback(&self) -> bool {
        self.origin == TextureOrigin::Fallback
    }

    /// Writes the set as `diffuse.png`, `bump.png`, `specular.png` and `clouds.png`.
    pub fn write_png_dir(&self, dir: &Path) -> Result<()> {
        std::fs::create_dir_all(dir)
            .with_context(|| format!("failed to create texture directory {}", dir.display()))?;
        for (name, raster) in [
            ("diffuse", &self.diffuse),
            ("bump", &self.bump),
            ("specular", &self.specular),
            ("clouds", &self.clouds),
        ] {
            let path = dir.join(format!("{name}.png"));
            raster
                .save_with_format(&path, image::ImageFormat::Png)
                .with_context(|| format!("failed to write {}", path.display()))?;
        }
        Ok(())
    }
}

/// Stretches `source` onto a `target_w` × `target_h` raster.
pub fn resample_rgba(source: &RgbaImage, target_w: u32, target_h: u32) -> Result<RgbaImage> {
    if target_w == 0 || target_h == 0 {
        anyhow::bail!("resample dimensions must be positive");
    }
    if source.width() == target_w && source.height() == target_h {
        return Ok(source.clone());
    }

    let src_view = fir::images::ImageRef::new(
        source.width(),
        source.height(),
        source.as_raw(),
        fir::PixelType::U8x4,
    )
    .context("failed to create source view for texture resample")?;
    let mut dst_image = fir::images::Image::new(target_w, target_h, fir::PixelType::U8x4);
    let options = fir::ResizeOptions::new()
        .resize_alg(fir::ResizeAlg::Convolution(fir::FilterType::Bilinear));
    let mut resizer = fir::Resizer::new();
    resizer
        .resize(&src_view, &mut dst_image, Some(&options))
        .context("texture resample failed")?;
    RgbaImage::from_raw(target_w, target_h, dst_image.into_vec())
        .ok_or_else(|| anyhow::anyhow!("failed to construct resampled RGBA image"))
}
