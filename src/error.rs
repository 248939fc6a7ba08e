//! Error types for the crop_color library

use image::ColorType;
use thiserror::Error;

/// Result type alias for crop_color operations
pub type Result<T> = std::result::Result<T, ClassifyError>;

/// Everything that can abort the classification of a single crop
#[derive(Error, Debug)]
pub enum ClassifyError {
    /// A required construction argument was missing or invalid
    #[error("Configuration error: {message}")]
    Configuration { message: String },

    /// The crop rectangle would be empty or leave the image bounds
    #[error("Invalid crop geometry: {x},{y} {width}x{height} in {image_width}x{image_height} image")]
    InvalidCropGeometry {
        x: i64,
        y: i64,
        width: i64,
        height: i64,
        image_width: u32,
        image_height: u32,
    },

    /// Only 8-bit RGB and RGBA buffers are accepted
    #[error("Unsupported buffer format: {0:?}")]
    UnsupportedBufferFormat(ColorType),

    /// The segmentation provider failed or returned a malformed label field
    #[error("Segmentation failed: {0}")]
    SegmentationFailed(#[source] anyhow::Error),

    /// The palette extractor failed
    #[error("Palette extraction failed: {0}")]
    PaletteExtraction(#[source] anyhow::Error),

    /// The palette had too few entries for the skip policy
    #[error("Insufficient palette diversity: need {required} colors, extractor returned {found}")]
    InsufficientPaletteDiversity { required: usize, found: usize },

    /// The inference provider failed
    #[error("Inference failed: {0}")]
    Inference(#[source] anyhow::Error),

    /// The inference output was not a [batch, classes] matrix
    #[error("Unexpected output shape {0:?}: expected [batch, classes]")]
    UnexpectedOutputShape(Vec<i64>),

    /// The inference output batch dimension was not 1
    #[error("Unexpected batch shape: expected 1 sample, got {0}")]
    UnexpectedBatchShape(usize),

    /// The inference output did not have one score per taxonomy class
    #[error("Output length mismatch: expected {expected} scores, got {found}")]
    OutputLengthMismatch { expected: usize, found: usize },
}

impl ClassifyError {
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }

    /// True when an external provider misbehaved, as opposed to the input image being bad
    pub fn is_provider_fault(&self) -> bool {
        matches!(
            self,
            ClassifyError::SegmentationFailed(_)
                | ClassifyError::PaletteExtraction(_)
                | ClassifyError::InsufficientPaletteDiversity { .. }
                | ClassifyError::Inference(_)
                | ClassifyError::UnexpectedOutputShape(_)
                | ClassifyError::UnexpectedBatchShape(_)
                | ClassifyError::OutputLengthMismatch { .. }
        )
    }

    /// True when the crop itself cannot be processed
    pub fn is_input_fault(&self) -> bool {
        matches!(
            self,
            ClassifyError::InvalidCropGeometry { .. } | ClassifyError::UnsupportedBufferFormat(_)
        )
    }
}
