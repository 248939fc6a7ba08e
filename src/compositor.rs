//! Foreground isolation against a synthetic background color

use crate::config::SegmentationConfig;
use crate::error::{ClassifyError, Result};
use crate::region::Rect;
use crate::segmentation::{labels, SegmentationProvider};
use anyhow::anyhow;
use image::{GrayImage, Luma, Rgb, RgbImage};
use imageproc::drawing::draw_hollow_rect_mut;
use std::sync::Arc;

/// Mask and composited buffer produced for one crop
#[derive(Debug, Clone, PartialEq)]
pub struct Composite {
    /// 255 where the provider labelled foreground, 0 elsewhere
    pub mask: GrayImage,
    /// Source pixels under the mask, background color everywhere else
    pub composited: RgbImage,
}

pub struct ForegroundCompositor {
    provider: Arc<dyn SegmentationProvider>,
    config: SegmentationConfig,
}

impl ForegroundCompositor {
    pub fn new(provider: Arc<dyn SegmentationProvider>, config: SegmentationConfig) -> Self {
        Self { provider, config }
    }

    pub fn background_color(&self) -> Rgb<u8> {
        self.config.background_color.into()
    }

    /// Segment `source` using `hint` and composite its foreground.
    ///
    /// After compositing, the hint is outlined on `source` for inspection. The
    /// outline is drawn last so it never leaks into the composited buffer.
    pub fn composite(&self, source: &mut RgbImage, hint: Rect) -> Result<Composite> {
        let _span = tracing::debug_span!("composite", provider = self.provider.name()).entered();

        let (width, height) = source.dimensions();
        let field = self
            .provider
            .segment(source, hint, self.config.iterations)
            .map_err(ClassifyError::SegmentationFailed)?;

        if field.dimensions() != (width, height) {
            return Err(ClassifyError::SegmentationFailed(anyhow!(
                "label field is {}x{}, source is {}x{}",
                field.width(),
                field.height(),
                width,
                height
            )));
        }

        let mask = binarize(&field);
        let composited = apply_mask(source, &mask, self.background_color());

        tracing::debug!(
            "Foreground covers {} of {} pixels",
            mask.pixels().filter(|p| p[0] == 255).count(),
            width as u64 * height as u64
        );

        self.draw_outline(source, hint);

        Ok(Composite { mask, composited })
    }

    fn draw_outline(&self, source: &mut RgbImage, hint: Rect) {
        let color: Rgb<u8> = self.config.outline_color.into();

        // Concentric one-pixel rectangles, growing outwards from the hint edge
        for inset in 0..self.config.outline_thickness {
            let x = hint.x as i32 - inset as i32;
            let y = hint.y as i32 - inset as i32;
            let rect = imageproc::rect::Rect::at(x, y)
                .of_size(hint.width + 2 * inset, hint.height + 2 * inset);
            draw_hollow_rect_mut(source, rect, color);
        }
    }
}

/// Map labels to a 0/255 mask using bit 0 as the foreground flag
pub fn binarize(field: &GrayImage) -> GrayImage {
    GrayImage::from_fn(field.width(), field.height(), |x, y| {
        if labels::is_foreground(field.get_pixel(x, y)[0]) {
            Luma([255])
        } else {
            Luma([0])
        }
    })
}

/// Copy masked pixels of `source` onto a buffer filled with `background`
pub fn apply_mask(source: &RgbImage, mask: &GrayImage, background: Rgb<u8>) -> RgbImage {
    RgbImage::from_fn(source.width(), source.height(), |x, y| {
        if mask.get_pixel(x, y)[0] == 255 {
            *source.get_pixel(x, y)
        } else {
            background
        }
    })
}
