use crate::region::Rect;
use anyhow::Result;
use image::{GrayImage, RgbImage};

/// Per-pixel segmentation labels, same dimensions as the segmented image.
///
/// Bit 0 set means "definitely or probably foreground"; see [`labels`].
pub type LabelField = GrayImage;

/// GrabCut-style label values; definite foreground (1) is never produced here
pub mod labels {
    pub const BACKGROUND: u8 = 0;
    pub const PROBABLE_BACKGROUND: u8 = 2;
    pub const PROBABLE_FOREGROUND: u8 = 3;

    /// Foreground-leaning labels have bit 0 set
    pub const fn is_foreground(label: u8) -> bool {
        label & 1 == 1
    }
}

/// Trait for foreground/background segmentation providers
/// Allows swapping between backends (rectangle hint, ONNX matting, GrabCut bindings, ...)
pub trait SegmentationProvider: Send + Sync {
    /// Label every pixel of `image` as foreground or background
    ///
    /// # Arguments
    /// * `image` - Source RGB crop
    /// * `hint` - Region expected to contain the foreground subject
    /// * `iterations` - Refinement passes for iterative providers
    ///
    /// # Returns
    /// * Label field with the dimensions of `image`
    fn segment(&self, image: &RgbImage, hint: Rect, iterations: u32) -> Result<LabelField>;

    /// Short provider name for logs
    fn name(&self) -> &'static str;
}
