use super::ColorClassifier;
use crate::confidence_map::ConfidenceMap;
use crate::error::{ClassifyError, Result};
use crate::taxonomy::{BaseColor, ColorClass, RgbSample};

/// Curated reference triplet for each base color, in ordinal order
pub const REFERENCE_COLORS: [(BaseColor, RgbSample); 11] = [
    (BaseColor::Red, RgbSample::new(220, 20, 60)),
    (BaseColor::Green, RgbSample::new(0, 128, 0)),
    (BaseColor::Blue, RgbSample::new(15, 82, 186)),
    (BaseColor::Yellow, RgbSample::new(255, 255, 0)),
    (BaseColor::Orange, RgbSample::new(255, 140, 0)),
    (BaseColor::Pink, RgbSample::new(255, 105, 180)),
    (BaseColor::Purple, RgbSample::new(153, 50, 204)),
    (BaseColor::Brown, RgbSample::new(160, 82, 45)),
    (BaseColor::Grey, RgbSample::new(105, 105, 105)),
    (BaseColor::Black, RgbSample::new(0, 0, 0)),
    (BaseColor::White, RgbSample::new(248, 248, 255)),
];

/// Nearest-reference classifier in RGB space
#[derive(Debug, Clone)]
pub struct DistanceClassifier {
    /// Indexed by ordinal
    references: Vec<RgbSample>,
}

impl Default for DistanceClassifier {
    fn default() -> Self {
        Self {
            references: REFERENCE_COLORS.iter().map(|&(_, rgb)| rgb).collect(),
        }
    }
}

impl DistanceClassifier {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a classifier from a custom reference table.
    ///
    /// The table must name every base color exactly once.
    pub fn with_references(table: &[(BaseColor, RgbSample)]) -> Result<Self> {
        let mut references: Vec<Option<RgbSample>> = vec![None; BaseColor::CLASS_COUNT];
        for &(class, rgb) in table {
            let slot = &mut references[class.ordinal()];
            if slot.is_some() {
                return Err(ClassifyError::configuration(format!(
                    "reference table lists {} twice",
                    class
                )));
            }
            *slot = Some(rgb);
        }

        let references = references
            .into_iter()
            .enumerate()
            .map(|(i, rgb)| {
                rgb.ok_or_else(|| {
                    let class = BaseColor::from_ordinal(i).map_or("?", |c| c.name());
                    ClassifyError::configuration(format!("reference table lacks {}", class))
                })
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(Self { references })
    }

    pub fn reference(&self, class: BaseColor) -> RgbSample {
        self.references[class.ordinal()]
    }

    /// Class whose reference is closest to `sample`.
    ///
    /// Scans in ordinal order and only replaces the running best on a strictly
    /// smaller distance, so the earliest class wins ties.
    pub fn nearest(&self, sample: RgbSample) -> BaseColor {
        let mut best = BaseColor::Red;
        let mut best_distance = f64::INFINITY;
        for class in BaseColor::members() {
            let distance = sample.distance(self.reference(class));
            if distance < best_distance {
                best_distance = distance;
                best = class;
            }
        }
        best
    }
}

impl ColorClassifier for DistanceClassifier {
    type Class = BaseColor;

    /// Scores are negated distances, so the map's best class is the nearest one
    fn confidence_map(&self, sample: RgbSample) -> Result<ConfidenceMap<BaseColor>> {
        Ok(ConfidenceMap::from_fn(|class| {
            -(sample.distance(self.reference(class)) as f32)
        }))
    }

    fn classify(&self, sample: RgbSample) -> Result<BaseColor> {
        Ok(self.nearest(sample))
    }
}
