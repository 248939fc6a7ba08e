//! RGB sample -> color class strategies

mod confidence;
mod distance;
mod inference;

pub use confidence::ConfidenceClassifier;
pub use distance::{DistanceClassifier, REFERENCE_COLORS};
pub use inference::{
    scores_from_output, InferenceProvider, OnnxInferenceProvider, DEFAULT_INPUT_NAME,
};

use crate::confidence_map::ConfidenceMap;
use crate::error::Result;
use crate::taxonomy::{BaseColor, ColorClass, RgbSample};

/// Trait for color classifiers
/// Allows swapping between the geometric and the learned strategy
pub trait ColorClassifier: Send + Sync {
    type Class: ColorClass;

    /// Score every class of the taxonomy for `sample`
    fn confidence_map(&self, sample: RgbSample) -> Result<ConfidenceMap<Self::Class>>;

    /// Single best class for `sample` (first maximum in ordinal order)
    fn classify(&self, sample: RgbSample) -> Result<Self::Class> {
        Ok(self.confidence_map(sample)?.best_class())
    }
}

/// Base color strategy chosen at runtime
pub enum BaseColorStrategy {
    Distance(DistanceClassifier),
    Confidence(ConfidenceClassifier<BaseColor>),
}

impl BaseColorStrategy {
    pub fn name(&self) -> &'static str {
        match self {
            BaseColorStrategy::Distance(_) => "distance",
            BaseColorStrategy::Confidence(_) => "confidence",
        }
    }
}

impl ColorClassifier for BaseColorStrategy {
    type Class = BaseColor;

    fn confidence_map(&self, sample: RgbSample) -> Result<ConfidenceMap<BaseColor>> {
        match self {
            BaseColorStrategy::Distance(classifier) => classifier.confidence_map(sample),
            BaseColorStrategy::Confidence(classifier) => classifier.confidence_map(sample),
        }
    }

    fn classify(&self, sample: RgbSample) -> Result<BaseColor> {
        match self {
            BaseColorStrategy::Distance(classifier) => classifier.classify(sample),
            BaseColorStrategy::Confidence(classifier) => classifier.classify(sample),
        }
    }
}

impl<C: ColorClassifier + ?Sized> ColorClassifier for Box<C> {
    type Class = C::Class;

    fn confidence_map(&self, sample: RgbSample) -> Result<ConfidenceMap<Self::Class>> {
        (**self).confidence_map(sample)
    }

    fn classify(&self, sample: RgbSample) -> Result<Self::Class> {
        (**self).classify(sample)
    }
}
