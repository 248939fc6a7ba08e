//! Crop rectangle selection

use crate::config::CropTuning;
use crate::error::{ClassifyError, Result};

/// Integer region fully inside an image
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Rect {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

impl Rect {
    /// Validate a candidate region against image bounds.
    ///
    /// Takes signed values so that inset arithmetic that went negative is
    /// reported as-is instead of wrapping.
    pub fn checked(
        x: i64,
        y: i64,
        width: i64,
        height: i64,
        image_width: u32,
        image_height: u32,
    ) -> Result<Self> {
        let fits = x >= 0
            && y >= 0
            && width > 0
            && height > 0
            && x + width <= image_width as i64
            && y + height <= image_height as i64;

        if !fits {
            return Err(ClassifyError::InvalidCropGeometry {
                x,
                y,
                width,
                height,
                image_width,
                image_height,
            });
        }

        Ok(Self {
            x: x as u32,
            y: y as u32,
            width: width as u32,
            height: height as u32,
        })
    }

    pub fn right(&self) -> u32 {
        self.x + self.width
    }

    pub fn bottom(&self) -> u32 {
        self.y + self.height
    }

    pub fn contains(&self, x: u32, y: u32) -> bool {
        x >= self.x && x < self.right() && y >= self.y && y < self.bottom()
    }

    /// Whether the region lies inside a `width` x `height` image
    pub fn fits_within(&self, width: u32, height: u32) -> bool {
        self.width > 0 && self.height > 0 && self.right() <= width && self.bottom() <= height
    }

    pub fn area(&self) -> u64 {
        self.width as u64 * self.height as u64
    }
}

/// Compute the segmentation hint rectangle for an image.
///
/// Without focus reduction the rectangle covers everything but the last row and
/// column. With it, the sides and top are inset by the tuning fractions and the
/// bottom is cut so only the upper part of the image remains, which keeps
/// samples on the subject's upper body and away from ground and edges.
pub fn select_region(
    width: u32,
    height: u32,
    reduce_focus_area: bool,
    tuning: &CropTuning,
) -> Result<Rect> {
    let (w, h) = (width as i64, height as i64);

    if !reduce_focus_area {
        return Rect::checked(0, 0, w - 1, h - 1, width, height);
    }

    let x = (width as f64 * tuning.side_inset) as i64;
    let y = (height as f64 * tuning.top_inset) as i64;
    let bottom_inset = (height as f64 / tuning.height_divisor) as i64;

    Rect::checked(x, y, w - 2 * x, h - bottom_inset, width, height)
}
