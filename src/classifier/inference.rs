use crate::error::ClassifyError;
use anyhow::{ensure, Context, Result};
use ndarray::Array2;
use ort::session::{builder::GraphOptimizationLevel, Session};
use ort::value::Tensor;
use parking_lot::Mutex;
use std::path::Path;

/// Input tensor name of the exported RGB color classifier
pub const DEFAULT_INPUT_NAME: &str = "dense_12_input";

/// Trait for learned classifier backends
pub trait InferenceProvider: Send + Sync {
    /// Score one RGB vector
    ///
    /// # Returns
    /// * Scores with shape [batch, classes]; callers require batch == 1
    fn infer(&self, input: [f32; 3]) -> Result<Array2<f32>>;
}

/// ONNX Runtime session running an RGB -> class scores model
pub struct OnnxInferenceProvider {
    session: Mutex<Session>,
    input_name: String,
}

impl OnnxInferenceProvider {
    /// Load the classifier model from an ONNX file
    pub fn new<P: AsRef<Path>>(model_path: P) -> Result<Self> {
        Self::with_input_name(model_path, DEFAULT_INPUT_NAME)
    }

    pub fn with_input_name<P: AsRef<Path>>(model_path: P, input_name: &str) -> Result<Self> {
        let path = model_path.as_ref();
        ensure!(path.is_file(), "classifier model {} not found", path.display());
        ensure!(!input_name.is_empty(), "input name must not be empty");

        tracing::info!("Loading color classifier from {}", path.display());

        let session = Session::builder()?
            .with_optimization_level(GraphOptimizationLevel::Level3)?
            .with_intra_threads(1)?
            .commit_from_file(path)
            .with_context(|| format!("Failed to load model from {}", path.display()))?;

        tracing::info!("Color classifier loaded successfully");

        Ok(Self {
            session: Mutex::new(session),
            input_name: input_name.to_string(),
        })
    }
}

impl InferenceProvider for OnnxInferenceProvider {
    fn infer(&self, input: [f32; 3]) -> Result<Array2<f32>> {
        let _span = tracing::debug_span!("inference").entered();

        // One row, three values
        let tensor = Tensor::from_array(([1usize, 3], input.to_vec()))?;

        let mut session = self.session.lock();
        let outputs = session
            .run(ort::inputs![self.input_name.as_str() => tensor])
            .context("Failed to run inference")?;

        let (shape, data) = outputs[0].try_extract_tensor::<f32>()?;
        Ok(scores_from_output(shape, data)?)
    }
}

/// Interpret a raw model output as a [batch, classes] score matrix.
///
/// Any rank other than 2 is rejected rather than reshaped, so a missing batch
/// dimension never passes as a single sample.
pub fn scores_from_output(shape: &[i64], data: &[f32]) -> crate::error::Result<Array2<f32>> {
    let shape_error = || ClassifyError::UnexpectedOutputShape(shape.to_vec());

    let &[rows, cols] = shape else {
        return Err(shape_error());
    };
    let rows = usize::try_from(rows).map_err(|_| shape_error())?;
    let cols = usize::try_from(cols).map_err(|_| shape_error())?;

    Array2::from_shape_vec((rows, cols), data.to_vec()).map_err(|_| shape_error())
}
