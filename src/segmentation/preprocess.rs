use super::types::{labels, LabelField};
use crate::region::Rect;
use anyhow::{ensure, Result};
use image::{imageops, GrayImage, Luma, RgbImage};
use ndarray::Array4;

/// Converts crops to matting model input tensors and alpha mattes back to labels
pub struct Preprocessor {
    target_width: u32,
    target_height: u32,
}

impl Preprocessor {
    pub fn new(target_width: u32, target_height: u32) -> Self {
        Self {
            target_width,
            target_height,
        }
    }

    pub fn target_size(&self) -> (u32, u32) {
        (self.target_width, self.target_height)
    }

    /// Resize an RGB crop and lay it out as a normalized NCHW tensor
    ///
    /// Returns: Array4<f32> with shape [1, 3, target_height, target_width], values in [0, 1]
    pub fn preprocess(&self, image: &RgbImage) -> Array4<f32> {
        let _span = tracing::debug_span!("preprocess").entered();

        let resized = if image.dimensions() != (self.target_width, self.target_height) {
            imageops::resize(
                image,
                self.target_width,
                self.target_height,
                imageops::FilterType::Triangle,
            )
        } else {
            image.clone()
        };

        let (width, height) = resized.dimensions();
        Array4::from_shape_fn(
            (1, 3, height as usize, width as usize),
            |(_, channel, y, x)| resized.get_pixel(x as u32, y as u32)[channel] as f32 / 255.0,
        )
    }

    /// Scale a row-major alpha matte at model resolution back to the crop size
    pub fn resize_matte(
        matte: &[f32],
        matte_width: u32,
        matte_height: u32,
        target_width: u32,
        target_height: u32,
    ) -> Result<GrayImage> {
        let _span = tracing::debug_span!("postprocess").entered();

        let expected = (matte_width as usize).checked_mul(matte_height as usize);
        ensure!(
            expected == Some(matte.len()),
            "matte has {} values, expected {}x{}",
            matte.len(),
            matte_width,
            matte_height
        );

        // Round so that alpha 0.5 lands on 128, the foreground threshold
        let alpha = GrayImage::from_fn(matte_width, matte_height, |x, y| {
            let idx = y as usize * matte_width as usize + x as usize;
            Luma([(matte[idx] * 255.0).round().clamp(0.0, 255.0) as u8])
        });

        if (matte_width, matte_height) == (target_width, target_height) {
            return Ok(alpha);
        }

        Ok(imageops::resize(
            &alpha,
            target_width,
            target_height,
            imageops::FilterType::Triangle,
        ))
    }

    /// Turn an alpha matte into labels, trusting only pixels inside the hint
    pub fn alpha_to_labels(alpha: &GrayImage, hint: Rect, threshold: u8) -> LabelField {
        GrayImage::from_fn(alpha.width(), alpha.height(), |x, y| {
            let label = if !hint.contains(x, y) {
                labels::BACKGROUND
            } else if alpha.get_pixel(x, y)[0] >= threshold {
                labels::PROBABLE_FOREGROUND
            } else {
                labels::PROBABLE_BACKGROUND
            };
            Luma([label])
        })
    }
}
