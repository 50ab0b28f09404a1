//! ONNX-backed outlier model
//!
//! `OutlierModel` implementation over an ONNX Runtime session. The host
//! service owns loading (file or bytes) and hands the model to the
//! adapter; the session stays behind a mutex because inference needs
//! exclusive access.

use ndarray::Array2;
use ort::session::{builder::GraphOptimizationLevel, Session};
use ort::value::Value;
use parking_lot::Mutex;

use super::{ModelError, OutlierModel};

pub struct OnnxOutlierModel {
    session: Mutex<Session>,
    name: String,
}

impl OnnxOutlierModel {
    /// Load a pretrained scorer from an ONNX file.
    pub fn load(model_path: &str) -> Result<Self, ModelError> {
        log::info!("Loading outlier model from: {}", model_path);

        if !std::path::Path::new(model_path).exists() {
            return Err(ModelError(format!("Model not found: {}", model_path)));
        }

        let session = Session::builder()
            .map_err(|e| ModelError(format!("Failed to create session builder: {}", e)))?
            .with_optimization_level(GraphOptimizationLevel::Level3)
            .map_err(|e| ModelError(format!("Failed to set optimization: {}", e)))?
            .commit_from_file(model_path)
            .map_err(|e| ModelError(format!("Failed to load model: {}", e)))?;

        log::info!("Outlier model loaded");
        Ok(Self {
            session: Mutex::new(session),
            name: model_path.to_string(),
        })
    }

    /// Load from an in-memory model blob.
    pub fn from_bytes(model_bytes: &[u8]) -> Result<Self, ModelError> {
        log::info!("Loading outlier model from memory ({} bytes)", model_bytes.len());

        let session = Session::builder()
            .map_err(|e| ModelError(format!("Session builder error: {}", e)))?
            .with_optimization_level(GraphOptimizationLevel::Level3)
            .map_err(|e| ModelError(format!("Optimization error: {}", e)))?
            .commit_from_memory(model_bytes)
            .map_err(|e| ModelError(format!("Load from memory error: {}", e)))?;

        Ok(Self {
            session: Mutex::new(session),
            name: "<memory>".to_string(),
        })
    }
}

impl OutlierModel for OnnxOutlierModel {
    fn decision_scores(&self, features: &Array2<f64>) -> Result<Vec<f64>, ModelError> {
        let rows = features.nrows();
        if rows == 0 {
            return Ok(Vec::new());
        }

        let input: Array2<f32> = features.mapv(|v| v as f32);
        let input_tensor =
            Value::from_array(input).map_err(|e| ModelError(format!("Tensor error: {}", e)))?;

        let mut session = self.session.lock();
        let output_name = session
            .outputs()
            .first()
            .map(|o| o.name().to_string())
            .ok_or_else(|| ModelError("No output defined".to_string()))?;

        let outputs = session
            .run(ort::inputs![input_tensor])
            .map_err(|e| ModelError(format!("Inference failed: {}", e)))?;

        let output = outputs
            .get(&output_name)
            .ok_or_else(|| ModelError("No output".to_string()))?;
        let output_tensor = output
            .try_extract_tensor::<f32>()
            .map_err(|e| ModelError(format!("Extract error: {}", e)))?;
        let data = output_tensor.1;

        if data.len() < rows {
            return Err(ModelError(format!(
                "Model returned {} scores for {} rows",
                data.len(),
                rows
            )));
        }

        Ok(data[..rows].iter().map(|s| *s as f64).collect())
    }

    fn name(&self) -> &str {
        &self.name
    }
}
