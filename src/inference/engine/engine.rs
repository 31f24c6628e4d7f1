use std::path::Path;

use ort::session::builder::{GraphOptimizationLevel, SessionBuilder};
use ort::session::{Session, SessionInputValue};
use ort::tensor::TensorElementType;
use ort::value::{DynValue, ValueType};
use tracing::{debug, info};

use crate::config::{InferenceConfig, OptimizationLevel};
use crate::convert::ModelArtifact;
use crate::error::{PipelineError, Result};
use crate::inference::model::{CompiledModel, ModelSignature, TensorSpec};
use crate::tensor::{DType, NamedTensorMap, TensorValue};

/// Front door to ONNX Runtime: compiles artifacts into runnable sessions.
///
/// Loading is a one-time blocking cost; the returned model is executed
/// synchronously, one call at a time.
#[derive(Debug, Clone)]
pub struct OrtEngine {
    optimization_level: OptimizationLevel,
    intra_threads: usize,
}

/// A compiled ONNX Runtime session with its declared signature
pub struct OrtModel {
    session: Session,
    signature: ModelSignature,
}

impl OrtEngine {
    pub fn new(config: &InferenceConfig) -> Self {
        Self {
            optimization_level: config.optimization_level,
            intra_threads: config.intra_threads,
        }
    }

    pub fn name(&self) -> &'static str {
        "onnxruntime"
    }

    fn session_builder(&self, level: OptimizationLevel) -> std::result::Result<SessionBuilder, String> {
        let builder = Session::builder()
            .map_err(|e| format!("failed to create session builder: {}", e))?
            .with_optimization_level(ort_level(level))
            .map_err(|e| format!("failed to set optimization level: {}", e))?;

        if self.intra_threads == 0 {
            return Ok(builder);
        }
        builder
            .with_intra_threads(self.intra_threads)
            .map_err(|e| format!("failed to set intra-op threads: {}", e))
    }

    /// Parses and compiles `artifact` into an executable model
    pub fn load(&self, artifact: &ModelArtifact) -> Result<OrtModel> {
        info!("Loading {} artifact {} into {}", artifact.format, artifact.path.display(), self.name());

        let session = self
            .session_builder(self.optimization_level)
            .map_err(PipelineError::Load)?
            .commit_from_file(&artifact.path)
            .map_err(|e| {
                PipelineError::Load(format!("{}: {}", artifact.path.display(), e))
            })?;

        let signature = build_signature(&session).map_err(PipelineError::Load)?;
        debug!(
            "Model declares inputs [{}] and outputs [{}]",
            signature.input_names().collect::<Vec<_>>().join(", "),
            signature.output_names().collect::<Vec<_>>().join(", ")
        );

        Ok(OrtModel { session, signature })
    }

    /// Compiles the graph at `source` and serializes the optimized graph to `dest`.
    ///
    /// Offline optimization stops at the extended level: the full level may
    /// fuse nodes into hardware specific kernels that other hosts cannot load.
    pub fn export_optimized(&self, source: &Path, dest: &Path) -> Result<()> {
        let level = match self.optimization_level {
            OptimizationLevel::All => OptimizationLevel::Extended,
            other => other,
        };
        let dest_str = dest.to_str().ok_or_else(|| {
            PipelineError::Conversion(format!("artifact path is not valid UTF-8: {}", dest.display()))
        })?;

        let session = self
            .session_builder(level)
            .map_err(PipelineError::Conversion)?
            .with_optimized_model_path(dest_str)
            .map_err(|e| PipelineError::Conversion(format!("failed to set output path: {}", e)))?
            .commit_from_file(source)
            .map_err(|e| PipelineError::Conversion(format!("{}: {}", source.display(), e)))?;
        // The optimized graph is written while the session is created
        drop(session);

        if !dest.is_file() {
            return Err(PipelineError::Conversion(format!(
                "engine did not produce {}",
                dest.display()
            )));
        }
        Ok(())
    }
}

impl CompiledModel for OrtModel {
    fn signature(&self) -> &ModelSignature {
        &self.signature
    }

    fn execute(&mut self, inputs: NamedTensorMap) -> Result<NamedTensorMap> {
        self.signature.check_inputs(&inputs)?;

        let mut ort_inputs = Vec::with_capacity(inputs.len());
        for (name, value) in inputs {
            let value = tensor_to_ort_value(value)?;
            ort_inputs.push((name, SessionInputValue::from(value)));
        }

        let outputs = self
            .session
            .run(ort_inputs)
            .map_err(|e| PipelineError::Execute(e.to_string()))?;

        let mut result = NamedTensorMap::new();
        for (name, value) in outputs.iter() {
            result.insert(name, ort_value_to_tensor(&value)?);
        }
        Ok(result)
    }
}

fn ort_level(level: OptimizationLevel) -> GraphOptimizationLevel {
    match level {
        OptimizationLevel::Disable => GraphOptimizationLevel::Disable,
        OptimizationLevel::Basic => GraphOptimizationLevel::Level1,
        OptimizationLevel::Extended => GraphOptimizationLevel::Level2,
        OptimizationLevel::All => GraphOptimizationLevel::Level3,
    }
}

fn build_signature(session: &Session) -> std::result::Result<ModelSignature, String> {
    let inputs = session
        .inputs
        .iter()
        .map(|input| tensor_spec_from_value_type(&input.name, &input.input_type))
        .collect::<std::result::Result<Vec<_>, _>>()?;

    let outputs = session
        .outputs
        .iter()
        .map(|output| tensor_spec_from_value_type(&output.name, &output.output_type))
        .collect::<std::result::Result<Vec<_>, _>>()?;

    Ok(ModelSignature { inputs, outputs })
}

fn tensor_spec_from_value_type(name: &str, value_type: &ValueType) -> std::result::Result<TensorSpec, String> {
    let ValueType::Tensor { ty, shape, .. } = value_type else {
        return Err(format!("'{}' is not a tensor", name));
    };

    let dtype = element_to_dtype(*ty).ok_or_else(|| {
        format!("'{}' has unsupported element type {}", name, ty)
    })?;
    let dims = shape
        .iter()
        .map(|d| if *d < 0 { None } else { Some(*d as usize) })
        .collect();

    Ok(TensorSpec::new(name, dtype, dims))
}

fn element_to_dtype(ty: TensorElementType) -> Option<DType> {
    match ty {
        TensorElementType::Int64 => Some(DType::I64),
        TensorElementType::Float32 => Some(DType::F32),
        _ => None,
    }
}

fn tensor_to_ort_value(value: TensorValue) -> Result<DynValue> {
    let shape = value.shape().to_vec();
    let converted = match value {
        TensorValue::I64(array) => {
            let data: Vec<i64> = array.iter().copied().collect();
            ort::value::Tensor::from_array((shape, data)).map(|t| t.into_dyn())
        }
        TensorValue::F32(array) => {
            let data: Vec<f32> = array.iter().copied().collect();
            ort::value::Tensor::from_array((shape, data)).map(|t| t.into_dyn())
        }
    };
    converted.map_err(|e| PipelineError::Execute(format!("failed to build input tensor: {}", e)))
}

fn ort_value_to_tensor(value: &ort::value::ValueRef<'_>) -> Result<TensorValue> {
    let ValueType::Tensor { ty, .. } = value.dtype() else {
        return Err(PipelineError::Execute("non-tensor outputs are not supported".to_string()));
    };

    match *ty {
        TensorElementType::Float32 => {
            let array = value
                .try_extract_array::<f32>()
                .map_err(|e| PipelineError::Execute(e.to_string()))?;
            TensorValue::from_f32(array.shape(), array.iter().copied().collect())
        }
        TensorElementType::Int64 => {
            let array = value
                .try_extract_array::<i64>()
                .map_err(|e| PipelineError::Execute(e.to_string()))?;
            TensorValue::from_i64(array.shape(), array.iter().copied().collect())
        }
        other => Err(PipelineError::Execute(format!(
            "unsupported output element type: {}",
            other
        ))),
    }
}
