use crate::taxonomy::RgbSample;
use anyhow::Result;
use image::RgbImage;

/// One representative color and the share of sampled pixels it stands for
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PaletteEntry {
    pub color: RgbSample,
    pub weight: f32,
}

impl PaletteEntry {
    pub fn new(color: RgbSample, weight: f32) -> Self {
        Self { color, weight }
    }
}

/// Trait for palette/quantization backends
pub trait PaletteExtractor: Send + Sync {
    /// Extract up to `color_count` representative colors, most dominant first
    ///
    /// # Arguments
    /// * `image` - Buffer to quantize
    /// * `color_count` - Number of colors requested
    /// * `quality` - Sampling stride; higher is coarser and faster
    /// * `ignore_white` - Skip near-white pixels
    fn extract(
        &self,
        image: &RgbImage,
        color_count: usize,
        quality: u32,
        ignore_white: bool,
    ) -> Result<Vec<PaletteEntry>>;
}
