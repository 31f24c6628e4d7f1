use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::tensor::{NamedTensorMap, TensorRecord};

/// Companion file written next to an artifact: the inputs the model was
/// exported with, so the artifact can be exercised without a tokenizer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExampleInputs {
    pub model_id: String,
    pub text: String,
    pub created_at: DateTime<Utc>,
    pub tensors: BTreeMap<String, TensorRecord>,
}

/// `<artifact>.inputs.json`
pub fn example_inputs_path(artifact_path: &Path) -> PathBuf {
    let mut name = artifact_path
        .file_name()
        .map(|n| n.to_os_string())
        .unwrap_or_default();
    name.push(".inputs.json");
    artifact_path.with_file_name(name)
}

impl ExampleInputs {
    pub fn new(model_id: &str, text: &str, tensors: &NamedTensorMap) -> Self {
        Self {
            model_id: model_id.to_string(),
            text: text.to_string(),
            created_at: Utc::now(),
            tensors: tensors.to_records(),
        }
    }

    /// Writes the file through a temporary sibling so readers never see half of it
    pub fn write(&self, path: &Path) -> Result<()> {
        let content = serde_json::to_string_pretty(self)?;
        let mut tmp_name = path.file_name().map(|n| n.to_os_string()).unwrap_or_default();
        tmp_name.push(".tmp");
        let tmp = path.with_file_name(tmp_name);

        std::fs::write(&tmp, content)?;
        if let Err(e) = std::fs::rename(&tmp, path) {
            let _ = std::fs::remove_file(&tmp);
            return Err(e.into());
        }
        Ok(())
    }

    pub fn read(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&content)?)
    }

    pub fn to_tensor_map(&self) -> Result<NamedTensorMap> {
        NamedTensorMap::from_records(self.tensors.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tensor::TensorValue;

    #[test]
    fn companion_path_appends_suffix() {
        assert_eq!(
            example_inputs_path(Path::new("out/model.onnx")),
            PathBuf::from("out/model.onnx.inputs.json")
        );
    }

    #[test]
    fn written_file_reads_back_as_same_tensors() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("model.onnx.inputs.json");

        let mut tensors = NamedTensorMap::new();
        tensors.insert("input_ids", TensorValue::from_i64(&[1, 4], vec![101, 1045, 2293, 102]).unwrap());
        tensors.insert("attention_mask", TensorValue::from_i64(&[1, 4], vec![1, 1, 1, 1]).unwrap());

        ExampleInputs::new("org/model", "i love", &tensors).write(&path).unwrap();
        assert!(!dir.path().join("model.onnx.inputs.json.tmp").exists());

        let read = ExampleInputs::read(&path).unwrap();
        assert_eq!(read.model_id, "org/model");
        assert_eq!(read.text, "i love");
        assert_eq!(read.to_tensor_map().unwrap(), tensors);
    }
}
