mod matting;
mod preprocess;
mod rect_hint;
pub mod types;

pub use matting::MattingSegmenter;
pub use preprocess::Preprocessor;
pub use rect_hint::RectHintSegmenter;
pub use types::{labels, LabelField, SegmentationProvider};

use anyhow::Result;
use std::path::Path;
use std::sync::Arc;

/// Create the segmentation provider for an optional matting model
///
/// Without a model the hint rectangle itself is used as the foreground.
pub fn create_default_provider(model_path: Option<&Path>) -> Result<Arc<dyn SegmentationProvider>> {
    match model_path {
        Some(path) => Ok(Arc::new(MattingSegmenter::new(path)?)),
        None => Ok(Arc::new(RectHintSegmenter::new())),
    }
}
