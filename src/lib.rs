//! # Crop Color
//!
//! Classifies the dominant color of a cropped object image (typically a
//! pedestrian) into a fixed taxonomy of named colors.
//!
//! The pipeline runs four stages per crop:
//! - select a region of interest with per-object-type inset heuristics
//! - segment the foreground and composite it over a synthetic background
//! - extract the dominant non-background color from a small palette
//! - map that color to a taxonomy class, by distance or with a learned model
//!
//! Segmentation, palette extraction and inference are injected providers, so
//! every stage can run against deterministic fakes.
//!
//! ## Example
//!
//! ```rust,no_run
//! use crop_color::{
//!     DistanceClassifier, KmeansPaletteExtractor, ObjectColorClassifier, PipelineConfig,
//!     RectHintSegmenter,
//! };
//! use std::sync::Arc;
//!
//! let pipeline = ObjectColorClassifier::new(
//!     PipelineConfig::default(),
//!     Arc::new(RectHintSegmenter::new()),
//!     Arc::new(KmeansPaletteExtractor::new()),
//!     DistanceClassifier::new(),
//! )?;
//! let crop = image::open("person.jpg").map_err(|e| anyhow::anyhow!(e))?;
//! let result = pipeline.classify(crop)?;
//! println!("Color is {}", result.best());
//! # Ok::<(), anyhow::Error>(())
//! ```

pub mod annotate;
pub mod classifier;
pub mod compositor;
pub mod confidence_map;
pub mod config;
pub mod error;
pub mod pipeline;
pub mod region;
pub mod segmentation;
pub mod swatch;
pub mod taxonomy;

pub use annotate::{BatchSummary, CropAnnotator};
pub use classifier::{
    BaseColorStrategy, ColorClassifier, ConfidenceClassifier, DistanceClassifier,
    InferenceProvider, OnnxInferenceProvider,
};
pub use compositor::{Composite, ForegroundCompositor};
pub use confidence_map::ConfidenceMap;
pub use config::{CropTuning, PipelineConfig, SegmentationConfig, SwatchConfig};
pub use error::{ClassifyError, Result};
pub use pipeline::{Classification, ObjectColorClassifier};
pub use region::{select_region, Rect};
pub use segmentation::{MattingSegmenter, RectHintSegmenter, SegmentationProvider};
pub use swatch::{KmeansPaletteExtractor, PaletteEntry, PaletteExtractor, Swatch, SwatchExtractor};
pub use taxonomy::{BaseColor, ColorClass, ObjectColor, RgbSample};
