use std::path::Path;

use tokenizers::{Tokenizer, TruncationParams};
use tracing::debug;

use super::types::{determine_tokenizer_type, TokenizerType};
use crate::error::{PipelineError, Result};
use crate::hub::{ModelBundle, ModelConfigFile};
use crate::inference::model::ModelSignature;
use crate::tensor::{NamedTensorMap, TensorValue};

pub const INPUT_IDS: &str = "input_ids";
pub const ATTENTION_MASK: &str = "attention_mask";
pub const TOKEN_TYPE_IDS: &str = "token_type_ids";

/// Turns raw text into the named integer tensors a classification model consumes.
///
/// Every tensor has shape `[1, seq_len]` and element type i64. Padding is
/// disabled, so for a single sentence the attention mask is all ones.
pub struct Preprocessor {
    tokenizer: Tokenizer,
    tokenizer_type: TokenizerType,
    /// Tensor names the loaded model declares; `None` keeps everything
    accepted_inputs: Option<Vec<String>>,
}

impl Preprocessor {
    /// Loads `tokenizer.json` and picks the tokenizer type from `config.json`
    pub fn from_bundle(bundle: &ModelBundle, max_length: Option<usize>) -> Result<Self> {
        let config = ModelConfigFile::read(&bundle.config_path())?;
        let tokenizer_type = determine_tokenizer_type(config.model_type.as_deref(), &config.architectures);
        debug!("Determined tokenizer type: {}", tokenizer_type);

        Self::from_file(&bundle.tokenizer_path(), tokenizer_type)?.with_max_length(max_length)
    }

    pub fn from_file(path: &Path, tokenizer_type: TokenizerType) -> Result<Self> {
        let tokenizer = Tokenizer::from_file(path).map_err(|e| {
            PipelineError::Tokenizer(format!("Failed to load {}: {}", path.display(), e))
        })?;
        Ok(Self::with_tokenizer(tokenizer, tokenizer_type))
    }

    fn with_tokenizer(mut tokenizer: Tokenizer, tokenizer_type: TokenizerType) -> Self {
        // Hub tokenizer files sometimes pin padding to a fixed length
        tokenizer.with_padding(None);
        Self {
            tokenizer,
            tokenizer_type,
            accepted_inputs: None,
        }
    }

    /// Truncates encodings to `max_length` tokens, special tokens included
    pub fn with_max_length(mut self, max_length: Option<usize>) -> Result<Self> {
        let truncation = max_length.map(|max_length| TruncationParams {
            max_length,
            ..Default::default()
        });
        self.tokenizer
            .with_truncation(truncation)
            .map_err(|e| PipelineError::Tokenizer(format!("Invalid truncation: {}", e)))?;
        Ok(self)
    }

    /// Tailors the produced tensors to the inputs the model declares
    pub fn restrict_to(&mut self, signature: &ModelSignature) {
        self.accepted_inputs = Some(signature.input_names().map(str::to_string).collect());
    }

    pub fn tokenizer_type(&self) -> TokenizerType {
        self.tokenizer_type
    }

    /// Encodes `text` with special tokens into `input_ids`, `attention_mask`
    /// and, for BERT-style models, `token_type_ids`
    pub fn tokenize(&self, text: &str) -> Result<NamedTensorMap> {
        let encoding = self
            .tokenizer
            .encode(text, true)
            .map_err(|e| PipelineError::Tokenizer(format!("Failed to encode input: {}", e)))?;

        let ids = encoding.get_ids();
        if ids.is_empty() {
            return Err(PipelineError::Tokenizer("input produced no tokens".to_string()));
        }
        let shape = [1, ids.len()];

        let mut tensors = NamedTensorMap::new();
        tensors.insert(INPUT_IDS, TensorValue::from_i64(&shape, widen(ids))?);
        tensors.insert(
            ATTENTION_MASK,
            TensorValue::from_i64(&shape, widen(encoding.get_attention_mask()))?,
        );
        // Once the model signature is known it decides; before that the family does
        let wants_type_ids = match &self.accepted_inputs {
            Some(accepted) => accepted.iter().any(|name| name == TOKEN_TYPE_IDS),
            None => self.tokenizer_type.uses_token_type_ids(),
        };
        if wants_type_ids {
            tensors.insert(
                TOKEN_TYPE_IDS,
                TensorValue::from_i64(&shape, widen(encoding.get_type_ids()))?,
            );
        }

        if let Some(accepted) = &self.accepted_inputs {
            tensors.retain(|name| accepted.iter().any(|a| a == name));
        }

        debug!("Tokenized {} characters into {} tokens", text.len(), ids.len());
        Ok(tensors)
    }
}

fn widen(values: &[u32]) -> Vec<i64> {
    values.iter().map(|&v| i64::from(v)).collect()
}
