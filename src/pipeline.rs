//! End-to-end classification of one object crop

use crate::classifier::ColorClassifier;
use crate::compositor::ForegroundCompositor;
use crate::config::PipelineConfig;
use crate::confidence_map::ConfidenceMap;
use crate::error::{ClassifyError, Result};
use crate::region::{select_region, Rect};
use crate::segmentation::SegmentationProvider;
use crate::swatch::{PaletteExtractor, SwatchExtractor};
use crate::taxonomy::{ColorClass, RgbSample};
use image::{DynamicImage, GrayImage, RgbImage};
use std::sync::Arc;

/// Result of classifying one crop, with the intermediate buffers
#[derive(Debug, Clone, PartialEq)]
pub struct Classification<T: ColorClass> {
    pub confidences: ConfidenceMap<T>,
    /// Dominant foreground color that was classified
    pub sample: RgbSample,
    /// Segmentation hint used for this crop
    pub region: Rect,
    /// Source crop with the hint outlined
    pub annotated: RgbImage,
    /// Binary foreground mask
    pub mask: GrayImage,
    /// Foreground over the background replacement color
    pub composited: RgbImage,
    /// Solid fill of the dominant color
    pub swatch: RgbImage,
}

impl<T: ColorClass> Classification<T> {
    pub fn best(&self) -> T {
        self.confidences.best_class()
    }
}

/// Region selection, compositing, swatch extraction and classification in sequence
pub struct ObjectColorClassifier<C: ColorClassifier> {
    config: PipelineConfig,
    compositor: ForegroundCompositor,
    swatches: SwatchExtractor,
    classifier: C,
}

impl<C: ColorClassifier> ObjectColorClassifier<C> {
    /// Build a pipeline; the configuration is validated here
    pub fn new(
        config: PipelineConfig,
        segmenter: Arc<dyn SegmentationProvider>,
        palette: Arc<dyn PaletteExtractor>,
        classifier: C,
    ) -> Result<Self> {
        config.validate()?;

        let compositor = ForegroundCompositor::new(segmenter, config.segmentation);
        let swatches = SwatchExtractor::new(palette, config.swatch)
            .with_background(config.segmentation.background_color);

        Ok(Self {
            config,
            compositor,
            swatches,
            classifier,
        })
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    pub fn classifier(&self) -> &C {
        &self.classifier
    }

    /// Classify the dominant color of `crop`.
    ///
    /// Only 8-bit RGB and RGBA crops are accepted. Any stage failure aborts the
    /// whole classification.
    pub fn classify(&self, crop: DynamicImage) -> Result<Classification<C::Class>> {
        let mut source = to_rgb(crop)?;
        let (width, height) = source.dimensions();
        let reduce = self.config.reduce_focus_area;

        let _span = tracing::debug_span!("classify", width, height, reduce).entered();

        let region = select_region(width, height, reduce, &self.config.region)?;
        tracing::debug!("Segmentation hint {:?} ({} pixels)", region, region.area());

        let composite = self.compositor.composite(&mut source, region)?;

        let swatch = self.swatches.extract(&composite.composited, reduce)?;

        let confidences = self.classifier.confidence_map(swatch.sample)?;
        tracing::debug!(
            "Sample {} classified as {}",
            swatch.sample,
            confidences.best_class()
        );

        Ok(Classification {
            confidences,
            sample: swatch.sample,
            region,
            annotated: source,
            mask: composite.mask,
            composited: composite.composited,
            swatch: swatch.image,
        })
    }
}

/// Accept 3- or 4-channel 8-bit buffers, reject everything else
pub fn to_rgb(image: DynamicImage) -> Result<RgbImage> {
    match image {
        DynamicImage::ImageRgb8(rgb) => Ok(rgb),
        DynamicImage::ImageRgba8(rgba) => Ok(DynamicImage::ImageRgba8(rgba).into_rgb8()),
        other => Err(ClassifyError::UnsupportedBufferFormat(other.color())),
    }
}
