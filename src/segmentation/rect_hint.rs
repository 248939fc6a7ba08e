use super::types::{labels, LabelField, SegmentationProvider};
use crate::region::Rect;
use anyhow::{ensure, Result};
use image::{GrayImage, Luma, RgbImage};

/// Segmenter that trusts the hint rectangle.
///
/// Every pixel inside the hint is probable foreground and everything else is
/// background. It is deterministic and needs no model, which makes it the
/// passthrough provider when no segmentation model is configured.
#[derive(Debug, Default, Clone, Copy)]
pub struct RectHintSegmenter;

impl RectHintSegmenter {
    pub fn new() -> Self {
        Self
    }
}

impl SegmentationProvider for RectHintSegmenter {
    fn segment(&self, image: &RgbImage, hint: Rect, _iterations: u32) -> Result<LabelField> {
        let (width, height) = image.dimensions();
        ensure!(
            hint.fits_within(width, height),
            "hint {:?} does not fit a {}x{} image",
            hint,
            width,
            height
        );

        Ok(GrayImage::from_fn(width, height, |x, y| {
            if hint.contains(x, y) {
                Luma([labels::PROBABLE_FOREGROUND])
            } else {
                Luma([labels::BACKGROUND])
            }
        }))
    }

    fn name(&self) -> &'static str {
        "rect-hint"
    }
}
