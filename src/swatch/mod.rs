//! Dominant color selection from composited crops

mod extractor;
mod kmeans;

pub use extractor::{PaletteEntry, PaletteExtractor};
pub use kmeans::KmeansPaletteExtractor;

use crate::config::SwatchConfig;
use crate::error::{ClassifyError, Result};
use crate::taxonomy::RgbSample;
use image::RgbImage;
use std::sync::Arc;

/// Selected dominant color and its solid-fill visualization
#[derive(Debug, Clone, PartialEq)]
pub struct Swatch {
    pub sample: RgbSample,
    /// Buffer of the source size filled with `sample`
    pub image: RgbImage,
}

pub struct SwatchExtractor {
    extractor: Arc<dyn PaletteExtractor>,
    config: SwatchConfig,
    background: Option<RgbSample>,
}

impl SwatchExtractor {
    pub fn new(extractor: Arc<dyn PaletteExtractor>, config: SwatchConfig) -> Self {
        Self {
            extractor,
            config,
            background: None,
        }
    }

    /// Report skipped entries that do not match the compositing background
    pub fn with_background(mut self, background: RgbSample) -> Self {
        self.background = Some(background);
        self
    }

    /// Pick the dominant foreground color of `composited`.
    ///
    /// With `skip_background` the first (most dominant) palette entry is taken
    /// to be the synthetic background and exactly one entry is skipped;
    /// otherwise the most dominant entry is used directly. Running out of
    /// entries is an error rather than a silent default.
    pub fn extract(&self, composited: &RgbImage, skip_background: bool) -> Result<Swatch> {
        let _span = tracing::debug_span!("swatch").entered();

        let palette = self
            .extractor
            .extract(
                composited,
                self.config.color_count,
                self.config.quality,
                self.config.ignore_white,
            )
            .map_err(ClassifyError::PaletteExtraction)?;

        let skip = usize::from(skip_background);
        let entry = palette
            .get(skip)
            .ok_or(ClassifyError::InsufficientPaletteDiversity {
                required: skip + 1,
                found: palette.len(),
            })?;

        let skipped = palette.first().filter(|_| skip > 0);
        if let (Some(skipped), Some(background)) = (skipped, self.background) {
            if skipped.color != background {
                tracing::debug!(
                    "Skipped palette entry {} is not the background color {}",
                    skipped.color,
                    background
                );
            }
        }

        tracing::debug!(
            "Dominant color {} ({:.1}% of sampled pixels)",
            entry.color,
            entry.weight * 100.0
        );

        let (width, height) = composited.dimensions();
        Ok(Swatch {
            sample: entry.color,
            image: RgbImage::from_pixel(width, height, entry.color.into()),
        })
    }
}
