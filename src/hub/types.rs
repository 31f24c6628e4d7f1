use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::error::Result;

/// Model configuration file holding `id2label` and `model_type`
pub const CONFIG_FILE: &str = "config.json";
/// Serialized tokenizer definition
pub const TOKENIZER_FILE: &str = "tokenizer.json";

/// A model downloaded from the hub and its location on disk
#[derive(Debug, Clone)]
pub struct ModelBundle {
    /// Hub identifier, e.g. "distilbert/distilbert-base-uncased-finetuned-sst-2-english"
    pub model_id: String,
    /// Revision the files were resolved against
    pub revision: String,
    /// Directory holding the downloaded files
    pub model_dir: PathBuf,
    /// Path of the ONNX graph relative to `model_dir`
    pub onnx_file: String,
}

impl ModelBundle {
    pub fn config_path(&self) -> PathBuf {
        self.model_dir.join(CONFIG_FILE)
    }

    pub fn tokenizer_path(&self) -> PathBuf {
        self.model_dir.join(TOKENIZER_FILE)
    }

    pub fn onnx_path(&self) -> PathBuf {
        self.model_dir.join(&self.onnx_file)
    }

    /// Files that must be present for the bundle to be usable
    pub fn required_files(&self) -> [PathBuf; 3] {
        [self.config_path(), self.tokenizer_path(), self.onnx_path()]
    }

    pub fn is_complete(&self) -> bool {
        self.required_files().iter().all(|p| p.is_file())
    }
}

/// The subset of a model's `config.json` the pipeline reads
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ModelConfigFile {
    /// Architecture family, e.g. "bert", "roberta", "distilbert"
    #[serde(default)]
    pub model_type: Option<String>,
    /// Class index (as a string key) to label
    #[serde(default)]
    pub id2label: BTreeMap<String, String>,
    /// Model class names, e.g. ["DistilBertForSequenceClassification"]
    #[serde(default)]
    pub architectures: Vec<String>,
}

impl ModelConfigFile {
    pub fn read(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&content)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bundle_paths_resolve_inside_model_dir() {
        let bundle = ModelBundle {
            model_id: "org/model".to_string(),
            revision: "main".to_string(),
            model_dir: PathBuf::from("/tmp/cache/org--model"),
            onnx_file: "onnx/model.onnx".to_string(),
        };
        assert!(bundle.config_path().ends_with("org--model/config.json"));
        assert!(bundle.tokenizer_path().ends_with("org--model/tokenizer.json"));
        assert!(bundle.onnx_path().ends_with("org--model/onnx/model.onnx"));
        assert!(!bundle.is_complete());
    }

    #[test]
    fn model_config_tolerates_missing_fields() {
        let config: ModelConfigFile = serde_json::from_str(r#"{"hidden_size": 768}"#).unwrap();
        assert!(config.model_type.is_none());
        assert!(config.id2label.is_empty());

        let config: ModelConfigFile = serde_json::from_str(
            r#"{"model_type": "roberta", "id2label": {"0": "negative", "1": "positive"}}"#,
        )
        .unwrap();
        assert_eq!(config.model_type.as_deref(), Some("roberta"));
        assert_eq!(config.id2label["1"], "positive");
    }
}
