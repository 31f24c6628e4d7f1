use tracing::debug;

use crate::error::{PipelineError, Result};
use crate::inference::{CompiledModel, ModelSignature, Preprocessor};
use crate::labels::{LabelMapping, Prediction};

/// A loaded model with its tokenizer and label table, ready to classify text.
///
/// Each call tokenizes, executes and decodes afresh; no state carries over
/// between calls, so identical text always yields the identical label.
pub struct Classifier {
    model_id: String,
    preprocessor: Preprocessor,
    model: Box<dyn CompiledModel>,
    labels: LabelMapping,
    output_name: String,
}

impl Classifier {
    pub fn new(
        model_id: impl Into<String>,
        mut preprocessor: Preprocessor,
        model: Box<dyn CompiledModel>,
        labels: LabelMapping,
    ) -> Result<Self> {
        preprocessor.restrict_to(model.signature());
        let output_name = model
            .signature()
            .primary_output()
            .ok_or_else(|| PipelineError::Load("model declares no outputs".to_string()))?
            .to_string();

        Ok(Self {
            model_id: model_id.into(),
            preprocessor,
            model,
            labels,
            output_name,
        })
    }

    pub fn model_id(&self) -> &str {
        &self.model_id
    }

    pub fn signature(&self) -> &ModelSignature {
        self.model.signature()
    }

    pub fn labels(&self) -> &LabelMapping {
        &self.labels
    }

    pub fn classify(&mut self, text: &str) -> Result<Prediction> {
        let inputs = self.preprocessor.tokenize(text)?;
        let outputs = self.model.execute(inputs)?;

        let logits = outputs.get(&self.output_name).ok_or_else(|| {
            PipelineError::Execute(format!("model produced no '{}' output", self.output_name))
        })?;
        let prediction = self.labels.decode(logits)?;
        debug!("'{}' -> {} ({:.4})", text, prediction.label, prediction.score);
        Ok(prediction)
    }
}
