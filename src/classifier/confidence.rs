use super::inference::{InferenceProvider, OnnxInferenceProvider};
use super::ColorClassifier;
use crate::confidence_map::ConfidenceMap;
use crate::error::{ClassifyError, Result};
use crate::taxonomy::{BaseColor, ColorClass, RgbSample};
use std::marker::PhantomData;
use std::path::Path;
use std::sync::Arc;

/// Classifier that asks a learned model for one score per class.
///
/// Output position `j` is read as the score of the class with ordinal `j`.
pub struct ConfidenceClassifier<T: ColorClass = BaseColor> {
    provider: Arc<dyn InferenceProvider>,
    _class: PhantomData<T>,
}

impl<T: ColorClass> ConfidenceClassifier<T> {
    pub fn new(provider: Arc<dyn InferenceProvider>) -> Self {
        Self {
            provider,
            _class: PhantomData,
        }
    }

    /// Load an ONNX model; a missing path or unloadable model fails here, not at call time
    pub fn from_model(model_path: Option<&Path>, input_name: &str) -> Result<Self> {
        let path = model_path.ok_or_else(|| {
            ClassifyError::configuration("confidence classifier requires a model path")
        })?;
        let provider = OnnxInferenceProvider::with_input_name(path, input_name)
            .map_err(|e| ClassifyError::configuration(format!("{:#}", e)))?;
        Ok(Self::new(Arc::new(provider)))
    }
}

impl<T: ColorClass> ColorClassifier for ConfidenceClassifier<T> {
    type Class = T;

    fn confidence_map(&self, sample: RgbSample) -> Result<ConfidenceMap<T>> {
        let scores = self
            .provider
            .infer(sample.to_input())
            .map_err(|e| e.downcast::<ClassifyError>().unwrap_or_else(ClassifyError::Inference))?;

        let (batch, classes) = scores.dim();
        if batch != 1 {
            return Err(ClassifyError::UnexpectedBatchShape(batch));
        }
        if classes != T::CLASS_COUNT {
            return Err(ClassifyError::OutputLengthMismatch {
                expected: T::CLASS_COUNT,
                found: classes,
            });
        }

        ConfidenceMap::from_scores(scores.row(0).to_vec())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::taxonomy::ObjectColor;
    use ndarray::Array2;
    use parking_lot::Mutex;

    /// Returns a fixed score matrix and records the inputs it saw
    struct FakeModel {
        scores: Array2<f32>,
        seen: Mutex<Vec<[f32; 3]>>,
    }

    impl FakeModel {
        fn new(scores: Array2<f32>) -> Arc<Self> {
            Arc::new(Self {
                scores,
                seen: Mutex::new(Vec::new()),
            })
        }
    }

    impl InferenceProvider for FakeModel {
        fn infer(&self, input: [f32; 3]) -> anyhow::Result<Array2<f32>> {
            self.seen.lock().push(input);
            Ok(self.scores.clone())
        }
    }

    fn one_hot(index: usize, len: usize) -> Array2<f32> {
        let mut scores = Array2::zeros((1, len));
        scores[[0, index]] = 0.8;
        scores
    }

    #[test]
    fn test_scores_align_with_ordinals() {
        let model = FakeModel::new(one_hot(BaseColor::Orange.ordinal(), 11));
        let classifier = ConfidenceClassifier::<BaseColor>::new(model.clone());

        let map = classifier.confidence_map(RgbSample::new(250, 140, 10)).unwrap();

        assert_eq!(map.len(), 11);
        assert_eq!(map.get(BaseColor::Orange), 0.8);
        assert_eq!(map.best_class(), BaseColor::Orange);
        assert_eq!(model.seen.lock().as_slice(), &[[250.0, 140.0, 10.0]]);
    }

    #[test]
    fn test_every_member_present_once() {
        let scores = Array2::from_shape_fn((1, 11), |(_, j)| j as f32 * 0.1);
        let classifier = ConfidenceClassifier::<ObjectColor>::new(FakeModel::new(scores));
        let map = classifier.confidence_map(RgbSample::new(0, 0, 0)).unwrap();

        let classes: Vec<ObjectColor> = map.iter().map(|(c, _)| c).collect();
        assert_eq!(classes, ObjectColor::members());
        assert_eq!(map.best_class(), ObjectColor::White);
    }

    #[test]
    fn test_batch_other_than_one_fails() {
        let classifier =
            ConfidenceClassifier::<BaseColor>::new(FakeModel::new(Array2::zeros((2, 11))));
        let err = classifier.confidence_map(RgbSample::new(1, 2, 3)).unwrap_err();
        assert!(matches!(err, ClassifyError::UnexpectedBatchShape(2)));
        assert!(err.is_provider_fault());

        let classifier =
            ConfidenceClassifier::<BaseColor>::new(FakeModel::new(Array2::zeros((0, 11))));
        assert!(matches!(
            classifier.confidence_map(RgbSample::new(1, 2, 3)),
            Err(ClassifyError::UnexpectedBatchShape(0))
        ));
    }

    /// Fails the way the ONNX adapter does on a rank-1 output
    struct RankOneModel;

    impl InferenceProvider for RankOneModel {
        fn infer(&self, _: [f32; 3]) -> anyhow::Result<Array2<f32>> {
            Ok(crate::classifier::scores_from_output(&[11], &[0.0; 11])?)
        }
    }

    #[test]
    fn test_shape_errors_keep_their_variant() {
        let classifier = ConfidenceClassifier::<BaseColor>::new(Arc::new(RankOneModel));
        let err = classifier.confidence_map(RgbSample::new(1, 2, 3)).unwrap_err();
        assert!(matches!(err, ClassifyError::UnexpectedOutputShape(_)));
        assert!(err.is_provider_fault());
    }

    #[test]
    fn test_wrong_class_count_fails() {
        let classifier =
            ConfidenceClassifier::<BaseColor>::new(FakeModel::new(Array2::zeros((1, 12))));
        assert!(matches!(
            classifier.confidence_map(RgbSample::new(1, 2, 3)),
            Err(ClassifyError::OutputLengthMismatch {
                expected: 11,
                found: 12
            })
        ));
    }

    #[test]
    fn test_equal_scores_keep_first() {
        let mut scores = Array2::zeros((1, 11));
        scores[[0, BaseColor::Grey.ordinal()]] = 0.5;
        scores[[0, BaseColor::Black.ordinal()]] = 0.5;
        let classifier = ConfidenceClassifier::<BaseColor>::new(FakeModel::new(scores));
        assert_eq!(
            classifier.classify(RgbSample::new(60, 60, 60)).unwrap(),
            BaseColor::Grey
        );
    }

    #[test]
    fn test_missing_model_is_configuration_error() {
        let err = ConfidenceClassifier::<BaseColor>::from_model(None, "input").err().unwrap();
        assert!(matches!(err, ClassifyError::Configuration { .. }));

        let err = ConfidenceClassifier::<BaseColor>::from_model(
            Some(Path::new("/nonexistent/rgb_color_classifier.onnx")),
            "input",
        )
        .err()
        .unwrap();
        assert!(matches!(err, ClassifyError::Configuration { .. }));
    }
}
