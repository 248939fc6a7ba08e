//! End-to-end tests for the crop classification pipeline
//!
//! All providers are deterministic: the rectangle-hint segmenter, the seeded
//! k-means palette extractor and a fixed-output inference fake.

use crop_color::{
    BaseColor, BaseColorStrategy, ClassifyError, ColorClassifier, ConfidenceClassifier,
    CropAnnotator, DistanceClassifier, InferenceProvider, KmeansPaletteExtractor, ObjectColor,
    ObjectColorClassifier, PipelineConfig, RectHintSegmenter, RgbSample,
};
use image::{DynamicImage, Rgb, RgbImage};
use ndarray::Array2;
use std::sync::Arc;

// ============================================================================
// Helpers
// ============================================================================

fn full_frame() -> PipelineConfig {
    PipelineConfig {
        reduce_focus_area: false,
        ..PipelineConfig::default()
    }
}

fn pipeline<C: ColorClassifier>(config: PipelineConfig, classifier: C) -> ObjectColorClassifier<C> {
    ObjectColorClassifier::new(
        config,
        Arc::new(RectHintSegmenter::new()),
        Arc::new(KmeansPaletteExtractor::new()),
        classifier,
    )
    .expect("valid pipeline")
}

/// Pedestrian-like 60x120 crop: a torso covering the whole pedestrian focus
/// region (8, 19, 44x54) on a grey street
fn pedestrian(torso: Rgb<u8>) -> RgbImage {
    RgbImage::from_fn(60, 120, |x, y| {
        if (6..54).contains(&x) && (15..80).contains(&y) {
            torso
        } else {
            Rgb([120, 120, 120])
        }
    })
}

/// Scores the channel sum into one class, remembers nothing
struct StubModel {
    classes: usize,
    batch: usize,
}

impl InferenceProvider for StubModel {
    fn infer(&self, input: [f32; 3]) -> anyhow::Result<Array2<f32>> {
        let [r, g, b] = input;
        let winner = if r > g && r > b { 0 } else if g > b { 1 } else { 2 };
        Ok(Array2::from_shape_fn((self.batch, self.classes), |(_, j)| {
            if j == winner {
                0.9
            } else {
                0.01
            }
        }))
    }
}

// ============================================================================
// Distance strategy
// ============================================================================

#[test]
fn test_uniform_crop_matches_nearest_class() {
    let cases = [
        (Rgb([10, 10, 10]), BaseColor::Black),
        (Rgb([230, 30, 50]), BaseColor::Red),
        (Rgb([250, 150, 10]), BaseColor::Orange),
        (Rgb([140, 60, 200]), BaseColor::Purple),
        (Rgb([110, 100, 108]), BaseColor::Grey),
    ];

    let pipeline = pipeline(full_frame(), DistanceClassifier::new());
    for (color, expected) in cases {
        let crop = DynamicImage::ImageRgb8(RgbImage::from_pixel(50, 90, color));
        let result = pipeline.classify(crop).unwrap();

        assert_eq!(result.sample, RgbSample::from(color));
        assert_eq!(result.best(), expected, "color {:?}", color);
        assert_eq!(
            result.best(),
            DistanceClassifier::new().nearest(RgbSample::from(color))
        );
    }
}

#[test]
fn test_pedestrian_torso_color_wins() {
    let pipeline = pipeline(PipelineConfig::default(), DistanceClassifier::new());
    let crop = DynamicImage::ImageRgb8(pedestrian(Rgb([255, 110, 175])));

    let result = pipeline.classify(crop).unwrap();

    assert_eq!(result.best(), BaseColor::Pink);
    assert_eq!(result.confidences.len(), 11);
}

#[test]
fn test_diagnostics_have_crop_dimensions() {
    let pipeline = pipeline(PipelineConfig::default(), DistanceClassifier::new());
    let result = pipeline
        .classify(DynamicImage::ImageRgb8(pedestrian(Rgb([0, 120, 0]))))
        .unwrap();

    assert_eq!(result.annotated.dimensions(), (60, 120));
    assert_eq!(result.mask.dimensions(), (60, 120));
    assert_eq!(result.composited.dimensions(), (60, 120));
    assert_eq!(result.swatch.dimensions(), (60, 120));
    assert!(result.mask.pixels().all(|p| p[0] == 0 || p[0] == 255));
    assert!(result
        .swatch
        .pixels()
        .all(|p| RgbSample::from(*p) == result.sample));

    // Outline drawn on the source, never on the composited buffer
    let outline = Rgb([0, 191, 255]);
    let region = result.region;
    assert_eq!(*result.annotated.get_pixel(region.x, region.y), outline);
    assert_ne!(*result.composited.get_pixel(region.x, region.y), outline);
}

#[test]
fn test_classification_is_idempotent() {
    let pipeline = pipeline(PipelineConfig::default(), DistanceClassifier::new());
    let crop = pedestrian(Rgb([20, 80, 180]));

    let first = pipeline
        .classify(DynamicImage::ImageRgb8(crop.clone()))
        .unwrap();
    let second = pipeline.classify(DynamicImage::ImageRgb8(crop)).unwrap();

    assert_eq!(first, second);
}

// ============================================================================
// Confidence strategy
// ============================================================================

#[test]
fn test_confidence_strategy_end_to_end() {
    let classifier = ConfidenceClassifier::<ObjectColor>::new(Arc::new(StubModel {
        classes: 11,
        batch: 1,
    }));
    let pipeline = pipeline(PipelineConfig::default(), classifier);

    let result = pipeline
        .classify(DynamicImage::ImageRgb8(pedestrian(Rgb([30, 200, 40]))))
        .unwrap();

    assert_eq!(result.best(), ObjectColor::Green);
    assert_eq!(result.confidences.get(ObjectColor::Green), 0.9);
    assert_eq!(result.confidences.iter().count(), 11);
}

#[test]
fn test_batch_shape_violation_aborts() {
    let strategy = BaseColorStrategy::Confidence(ConfidenceClassifier::new(Arc::new(StubModel {
        classes: 11,
        batch: 3,
    })));
    let pipeline = pipeline(PipelineConfig::default(), strategy);

    let err = pipeline
        .classify(DynamicImage::ImageRgb8(pedestrian(Rgb([30, 200, 40]))))
        .unwrap_err();

    assert!(matches!(err, ClassifyError::UnexpectedBatchShape(3)));
    assert!(err.is_provider_fault());
}

// ============================================================================
// Failure modes
// ============================================================================

#[test]
fn test_uniform_crop_with_skip_lacks_diversity() {
    // A crop painted in the background color composites to a single color
    let pipeline = pipeline(PipelineConfig::default(), DistanceClassifier::new());
    let crop = DynamicImage::ImageRgb8(RgbImage::from_pixel(60, 120, Rgb([255, 0, 255])));

    let err = pipeline.classify(crop).unwrap_err();
    assert!(matches!(
        err,
        ClassifyError::InsufficientPaletteDiversity {
            required: 2,
            found: 1
        }
    ));
}

#[test]
fn test_degenerate_crop_is_input_fault() {
    let pipeline = pipeline(full_frame(), DistanceClassifier::new());
    let err = pipeline
        .classify(DynamicImage::ImageRgb8(RgbImage::new(1, 40)))
        .unwrap_err();
    assert!(err.is_input_fault());
}

// ============================================================================
// Directory batch runner
// ============================================================================

#[test]
fn test_annotate_directory() {
    let root = tempfile::tempdir().unwrap();
    let crops = root.path().join("crops");
    std::fs::create_dir(&crops).unwrap();

    pedestrian(Rgb([20, 80, 180]))
        .save(crops.join("a.png"))
        .unwrap();
    pedestrian(Rgb([230, 30, 50]))
        .save(crops.join("b.png"))
        .unwrap();
    std::fs::write(crops.join("notes.txt"), "not an image").unwrap();

    let pipeline = pipeline(PipelineConfig::default(), DistanceClassifier::new());
    let summary = CropAnnotator::new(&pipeline, Some(1000))
        .annotate_directory(&crops)
        .unwrap();

    assert_eq!(summary.processed, 2);
    assert_eq!(summary.failed, 0);
    assert_eq!(summary.skipped, 1);

    let annotated = root.path().join("crops_Annotated");
    let mut names: Vec<String> = std::fs::read_dir(&annotated)
        .unwrap()
        .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
        .collect();
    names.sort();

    assert_eq!(names.len(), 8);
    assert_eq!(names.iter().filter(|n| n.contains("-Blue-")).count(), 4);
    assert_eq!(names.iter().filter(|n| n.contains("-Red-")).count(), 4);
    for kind in ["source", "mask", "segmented", "swatch"] {
        assert_eq!(
            names
                .iter()
                .filter(|n| n.contains(&format!("-{}_", kind)))
                .count(),
            2
        );
    }
    assert!(names.iter().all(|n| n.as_bytes()[8] == b'-'));
}
