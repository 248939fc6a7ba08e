//! Per-class score maps produced by the classifiers

use crate::error::{ClassifyError, Result};
use crate::taxonomy::ColorClass;
use serde::ser::{Serialize, SerializeMap, Serializer};
use std::marker::PhantomData;

/// One score for every member of a color taxonomy.
///
/// Scores are opaque and only comparable with each other: they are whatever the
/// classifier produced and are never renormalized into probabilities.
#[derive(Debug, Clone, PartialEq)]
pub struct ConfidenceMap<T: ColorClass> {
    scores: Vec<f32>,
    _class: PhantomData<T>,
}

impl<T: ColorClass> ConfidenceMap<T> {
    /// Build a map from scores in ordinal order.
    ///
    /// Fails unless there is exactly one score per taxonomy member.
    pub fn from_scores(scores: Vec<f32>) -> Result<Self> {
        if scores.len() != T::CLASS_COUNT {
            return Err(ClassifyError::OutputLengthMismatch {
                expected: T::CLASS_COUNT,
                found: scores.len(),
            });
        }

        Ok(Self {
            scores,
            _class: PhantomData,
        })
    }

    /// Build a map by scoring every member
    pub fn from_fn(mut score: impl FnMut(T) -> f32) -> Self {
        Self {
            scores: T::members().into_iter().map(&mut score).collect(),
            _class: PhantomData,
        }
    }

    pub fn get(&self, class: T) -> f32 {
        self.scores[class.ordinal()]
    }

    pub fn len(&self) -> usize {
        self.scores.len()
    }

    pub fn is_empty(&self) -> bool {
        self.scores.is_empty()
    }

    /// Entries in ordinal order
    pub fn iter(&self) -> impl Iterator<Item = (T, f32)> + '_ {
        self.scores
            .iter()
            .enumerate()
            .filter_map(|(i, &score)| T::from_ordinal(i).map(|class| (class, score)))
    }

    /// Highest-scoring class.
    ///
    /// Scans in ordinal order with a strict `>` so the first class to reach the
    /// maximum wins; later equal scores never replace it. NaN scores never win.
    pub fn best(&self) -> (T, f32) {
        let mut best_index = 0;
        let mut best_score = f32::NEG_INFINITY;
        for (i, &score) in self.scores.iter().enumerate() {
            if score > best_score {
                best_score = score;
                best_index = i;
            }
        }

        let class = T::from_ordinal(best_index)
            .unwrap_or_else(|| unreachable!("map length is checked against the taxonomy"));
        (class, self.scores[best_index])
    }

    pub fn best_class(&self) -> T {
        self.best().0
    }

    pub fn scores(&self) -> &[f32] {
        &self.scores
    }
}

impl<T: ColorClass> Serialize for ConfidenceMap<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.scores.len()))?;
        for (class, score) in self.iter() {
            map.serialize_entry(class.name(), &score)?;
        }
        map.end()
    }
}
