//! Tunable parameters for the classification pipeline.
//!
//! Configuration can be loaded from a JSON file or built programmatically:
//!
//! ```no_run
//! use crop_color::PipelineConfig;
//! use std::path::Path;
//!
//! let config = PipelineConfig::from_json_file(Path::new("pipeline.json"))?;
//! let defaults = PipelineConfig::default();
//! # Ok::<(), crop_color::ClassifyError>(())
//! ```

use crate::error::{ClassifyError, Result};
use crate::taxonomy::RgbSample;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Complete pipeline configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Narrow the crop to the upper-central region before segmentation
    pub reduce_focus_area: bool,

    /// Fractional insets used when `reduce_focus_area` is set
    pub region: CropTuning,

    pub segmentation: SegmentationConfig,

    pub swatch: SwatchConfig,
}

/// Fractional insets for the region selector, tuned per object type
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CropTuning {
    /// Left and right inset as a fraction of width
    pub side_inset: f64,

    /// Top inset as a fraction of height
    pub top_inset: f64,

    /// Bottom inset is `height / height_divisor`
    pub height_divisor: f64,
}

impl CropTuning {
    /// Narrow, upper-body biased crop for pedestrians
    pub const fn pedestrian() -> Self {
        Self {
            side_inset: 0.14,
            top_inset: 0.16,
            height_divisor: 1.8,
        }
    }

    /// Wider crop for objects without a pedestrian's aspect ratio
    pub const fn general() -> Self {
        Self {
            side_inset: 0.05,
            top_inset: 0.15,
            height_divisor: 1.8,
        }
    }
}

impl Default for CropTuning {
    fn default() -> Self {
        Self::pedestrian()
    }
}

/// Foreground compositing parameters
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SegmentationConfig {
    /// Refinement iterations requested from the segmentation provider (1-3)
    pub iterations: u32,

    /// Fill for non-foreground pixels; must not collide with real foreground colors
    pub background_color: RgbSample,

    /// Color of the hint rectangle drawn onto the source buffer
    pub outline_color: RgbSample,

    /// Outline thickness in pixels, 0 disables drawing
    pub outline_thickness: u32,
}

impl Default for SegmentationConfig {
    fn default() -> Self {
        Self {
            iterations: 3,
            background_color: RgbSample::new(255, 0, 255),
            outline_color: RgbSample::new(0, 191, 255),
            outline_thickness: 4,
        }
    }
}

/// Palette extraction parameters
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SwatchConfig {
    /// Representative colors requested from the palette extractor
    pub color_count: usize,

    /// Sampling stride; 1 visits every pixel, 10 every tenth
    pub quality: u32,

    /// Exclude near-white pixels from the palette
    pub ignore_white: bool,
}

impl Default for SwatchConfig {
    fn default() -> Self {
        Self {
            color_count: 2,
            quality: 10,
            ignore_white: false,
        }
    }
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            reduce_focus_area: true,
            region: CropTuning::pedestrian(),
            segmentation: SegmentationConfig::default(),
            swatch: SwatchConfig::default(),
        }
    }
}

impl PipelineConfig {
    /// Load configuration from a JSON file and validate it
    pub fn from_json_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            ClassifyError::configuration(format!("cannot read {}: {}", path.display(), e))
        })?;
        let config: Self = serde_json::from_str(&content).map_err(|e| {
            ClassifyError::configuration(format!("cannot parse {}: {}", path.display(), e))
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Save configuration to a JSON file
    pub fn to_json_file(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(self)
            .map_err(|e| ClassifyError::configuration(e.to_string()))?;
        std::fs::write(path, json).map_err(|e| {
            ClassifyError::configuration(format!("cannot write {}: {}", path.display(), e))
        })
    }

    /// Reject values the pipeline cannot work with
    pub fn validate(&self) -> Result<()> {
        let region = &self.region;
        if !(0.0..0.5).contains(&region.side_inset) {
            return Err(invalid("region.side_inset", region.side_inset));
        }
        if !(0.0..1.0).contains(&region.top_inset) {
            return Err(invalid("region.top_inset", region.top_inset));
        }
        if region.height_divisor.is_nan() || region.height_divisor <= 1.0 {
            return Err(invalid("region.height_divisor", region.height_divisor));
        }
        if !(1..=3).contains(&self.segmentation.iterations) {
            return Err(invalid("segmentation.iterations", self.segmentation.iterations));
        }
        if self.swatch.color_count < 2 {
            return Err(invalid("swatch.color_count", self.swatch.color_count));
        }
        if self.swatch.quality == 0 {
            return Err(invalid("swatch.quality", self.swatch.quality));
        }
        Ok(())
    }
}

fn invalid(parameter: &str, value: impl std::fmt::Display) -> ClassifyError {
    ClassifyError::configuration(format!("invalid {} = {}", parameter, value))
}
