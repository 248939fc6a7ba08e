use super::preprocess::Preprocessor;
use super::types::{LabelField, SegmentationProvider};
use crate::region::Rect;
use anyhow::{bail, ensure, Context, Result};
use image::RgbImage;
use ort::session::{builder::GraphOptimizationLevel, Session};
use ort::value::Tensor;
use parking_lot::Mutex;
use std::path::Path;

/// Segmenter backed by a single-frame ONNX matting model
///
/// The model takes a [1, 3, H, W] float image in [0, 1] and returns the alpha
/// matte as its first output with shape [1, 1, H, W]. Matting is a single pass,
/// so the requested iteration count does not change the result.
pub struct MattingSegmenter {
    session: Mutex<Session>,
    preprocessor: Preprocessor,
    threshold: u8,
}

impl MattingSegmenter {
    /// Load a matting model from an ONNX file
    ///
    /// # Default Configuration
    /// - Input size: 512x512
    /// - Foreground threshold: alpha >= 0.5
    pub fn new<P: AsRef<Path>>(model_path: P) -> Result<Self> {
        Self::with_input_size(model_path, 512, 512)
    }

    pub fn with_input_size<P: AsRef<Path>>(model_path: P, width: u32, height: u32) -> Result<Self> {
        let path = model_path.as_ref();
        ensure!(path.is_file(), "matting model {} not found", path.display());

        tracing::info!("Loading matting model from {}", path.display());

        let session = Session::builder()?
            .with_optimization_level(GraphOptimizationLevel::Level3)?
            .with_intra_threads(4)?
            .commit_from_file(path)
            .with_context(|| format!("Failed to load model from {}", path.display()))?;

        tracing::info!("Matting model loaded successfully");

        Ok(Self {
            session: Mutex::new(session),
            preprocessor: Preprocessor::new(width, height),
            threshold: 128,
        })
    }

    /// Run the model and return the alpha matte at model resolution
    fn infer_matte(&self, image: &RgbImage) -> Result<(Vec<f32>, u32, u32)> {
        let (width, height) = self.preprocessor.target_size();
        let tensor = self.preprocessor.preprocess(image);
        let input = Tensor::from_array((
            [1usize, 3, height as usize, width as usize],
            tensor.iter().copied().collect::<Vec<f32>>(),
        ))?;

        let _infer_span = tracing::debug_span!("inference").entered();
        let mut session = self.session.lock();
        let outputs = session
            .run(ort::inputs![input])
            .context("Failed to run matting inference")?;

        let (shape, data) = outputs[0].try_extract_tensor::<f32>()?;
        let (width, height) = matte_size(shape)?;

        Ok((data.to_vec(), width, height))
    }
}

/// Width and height of a [1, 1, H, W] matte output
fn matte_size(shape: &[i64]) -> Result<(u32, u32)> {
    let &[1, 1, height, width] = shape else {
        bail!("unexpected matte shape {:?}", shape);
    };
    let height = u32::try_from(height).with_context(|| format!("matte height {}", height))?;
    let width = u32::try_from(width).with_context(|| format!("matte width {}", width))?;
    Ok((width, height))
}

impl SegmentationProvider for MattingSegmenter {
    fn segment(&self, image: &RgbImage, hint: Rect, _iterations: u32) -> Result<LabelField> {
        let _span = tracing::debug_span!("matting_segment").entered();

        let (width, height) = image.dimensions();
        ensure!(
            hint.fits_within(width, height),
            "hint {:?} does not fit a {}x{} image",
            hint,
            width,
            height
        );

        let (matte, matte_width, matte_height) = self.infer_matte(image)?;
        let alpha =
            Preprocessor::resize_matte(&matte, matte_width, matte_height, width, height)?;

        Ok(Preprocessor::alpha_to_labels(&alpha, hint, self.threshold))
    }

    fn name(&self) -> &'static str {
        "onnx-matting"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_matte_size_reads_nchw() {
        assert_eq!(matte_size(&[1, 1, 288, 512]).unwrap(), (512, 288));
    }

    #[test]
    fn test_matte_size_rejects_other_shapes() {
        assert!(matte_size(&[1, 288, 512]).is_err());
        assert!(matte_size(&[2, 1, 288, 512]).is_err());
        assert!(matte_size(&[1, 3, 288, 512]).is_err());
        assert!(matte_size(&[1, 1, -1, 512]).is_err());
        assert!(matte_size(&[1, 1, 288, 1 << 40]).is_err());
    }
}
