use serde::Serialize;

use crate::error::{PipelineError, Result};
use crate::tensor::{DType, NamedTensorMap};

/// Conventional name of the classification head output
pub const LOGITS: &str = "logits";

/// One declared input or output of a compiled model
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TensorSpec {
    pub name: String,
    pub dtype: DType,
    /// `None` marks a dynamic axis
    pub dims: Vec<Option<usize>>,
}

impl TensorSpec {
    pub fn new(name: impl Into<String>, dtype: DType, dims: Vec<Option<usize>>) -> Self {
        Self {
            name: name.into(),
            dtype,
            dims,
        }
    }
}

/// Inputs and outputs as declared by the loaded model
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ModelSignature {
    pub inputs: Vec<TensorSpec>,
    pub outputs: Vec<TensorSpec>,
}

impl ModelSignature {
    pub fn input_names(&self) -> impl Iterator<Item = &str> {
        self.inputs.iter().map(|s| s.name.as_str())
    }

    pub fn output_names(&self) -> impl Iterator<Item = &str> {
        self.outputs.iter().map(|s| s.name.as_str())
    }

    pub fn input(&self, name: &str) -> Option<&TensorSpec> {
        self.inputs.iter().find(|s| s.name == name)
    }

    /// The output holding class scores: `logits` when declared, else the first output
    pub fn primary_output(&self) -> Option<&str> {
        self.outputs
            .iter()
            .find(|s| s.name == LOGITS)
            .or_else(|| self.outputs.first())
            .map(|s| s.name.as_str())
    }

    /// Checks that `inputs` carries exactly the declared input names, each
    /// with the declared element type
    pub fn check_inputs(&self, inputs: &NamedTensorMap) -> Result<()> {
        let missing: Vec<String> = self
            .input_names()
            .filter(|name| !inputs.contains(name))
            .map(str::to_string)
            .collect();
        let unexpected: Vec<String> = inputs
            .names()
            .filter(|name| self.input(name).is_none())
            .map(str::to_string)
            .collect();

        if !missing.is_empty() || !unexpected.is_empty() {
            return Err(PipelineError::InputMismatch { missing, unexpected });
        }

        for (name, value) in inputs.iter() {
            if let Some(spec) = self.input(name) {
                if spec.dtype != value.dtype() {
                    return Err(PipelineError::Execute(format!(
                        "input '{}' expects {} but got {}",
                        name,
                        spec.dtype,
                        value.dtype()
                    )));
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tensor::TensorValue;

    fn signature() -> ModelSignature {
        ModelSignature {
            inputs: vec![
                TensorSpec::new("input_ids", DType::I64, vec![None, None]),
                TensorSpec::new("attention_mask", DType::I64, vec![None, None]),
            ],
            outputs: vec![TensorSpec::new("logits", DType::F32, vec![None, Some(2)])],
        }
    }

    fn ids(len: usize) -> TensorValue {
        TensorValue::from_i64(&[1, len], vec![1; len]).unwrap()
    }

    #[test]
    fn accepts_exact_input_set() {
        let mut inputs = NamedTensorMap::new();
        inputs.insert("input_ids", ids(3));
        inputs.insert("attention_mask", ids(3));
        assert!(signature().check_inputs(&inputs).is_ok());
    }

    #[test]
    fn reports_missing_and_unexpected_names() {
        let mut inputs = NamedTensorMap::new();
        inputs.insert("input_ids", ids(3));
        inputs.insert("token_type_ids", ids(3));

        match signature().check_inputs(&inputs) {
            Err(PipelineError::InputMismatch { missing, unexpected }) => {
                assert_eq!(missing, vec!["attention_mask".to_string()]);
                assert_eq!(unexpected, vec!["token_type_ids".to_string()]);
            }
            other => panic!("expected mismatch, got {:?}", other),
        }
    }

    #[test]
    fn rejects_wrong_element_type() {
        let mut inputs = NamedTensorMap::new();
        inputs.insert("input_ids", TensorValue::from_f32(&[1, 1], vec![1.0]).unwrap());
        inputs.insert("attention_mask", ids(1));
        assert!(matches!(signature().check_inputs(&inputs), Err(PipelineError::Execute(_))));
    }

    #[test]
    fn primary_output_prefers_logits() {
        let mut sig = signature();
        assert_eq!(sig.primary_output(), Some("logits"));

        sig.outputs = vec![
            TensorSpec::new("hidden", DType::F32, vec![]),
            TensorSpec::new("scores", DType::F32, vec![]),
        ];
        assert_eq!(sig.primary_output(), Some("hidden"));
    }
}
