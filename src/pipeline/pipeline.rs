use std::path::PathBuf;

use tracing::{info, warn};

use super::classifier::Classifier;
use crate::config::Settings;
use crate::convert::{example_inputs_path, ExampleInputs, FormatConverter, ModelArtifact};
use crate::error::Result;
use crate::hub::{ModelBundle, ModelFetcher};
use crate::inference::{OrtEngine, Preprocessor};
use crate::labels::{LabelMapping, Prediction};

/// What to run the pipeline on
#[derive(Debug, Clone)]
pub struct PipelineOptions {
    /// Hub identifier of the model
    pub model_id: String,
    /// Artifact to convert into and load from
    pub artifact_path: PathBuf,
    /// Sentence stored in the companion example-input file
    pub sample_text: String,
    /// Optional truncation length in tokens
    pub max_length: Option<usize>,
    /// Convert even when the artifact already exists
    pub force_convert: bool,
}

impl PipelineOptions {
    pub fn from_settings(settings: &Settings) -> Self {
        Self {
            model_id: settings.model.id.clone(),
            artifact_path: settings.model.artifact_path.clone(),
            sample_text: settings.model.sample_text.clone(),
            max_length: settings.model.max_length,
            force_convert: false,
        }
    }
}

/// Drives the fetch → convert → load → tokenize → execute → decode sequence
pub struct Pipeline {
    fetcher: ModelFetcher,
    engine: OrtEngine,
    options: PipelineOptions,
}

impl Pipeline {
    pub fn new(settings: &Settings, options: PipelineOptions) -> Result<Self> {
        Ok(Self {
            fetcher: ModelFetcher::new(&settings.hub)?,
            engine: OrtEngine::new(&settings.inference),
            options,
        })
    }

    /// Step 1: download configuration, tokenizer and graph
    pub async fn fetch(&self) -> Result<ModelBundle> {
        self.fetcher.fetch(&self.options.model_id).await
    }

    /// Step 2: export the artifact and its example inputs
    pub fn convert(&self, bundle: &ModelBundle) -> Result<ModelArtifact> {
        let preprocessor = Preprocessor::from_bundle(bundle, self.options.max_length)?;

        FormatConverter::new(self.engine.clone()).convert(
            bundle,
            &self.options.artifact_path,
            &self.options.sample_text,
            preprocessor,
        )
    }

    /// Step 3: compile the artifact and pair it with tokenizer and labels
    pub fn load(&self, bundle: &ModelBundle, artifact: &ModelArtifact) -> Result<Classifier> {
        let model = self.engine.load(artifact)?;
        let preprocessor = Preprocessor::from_bundle(bundle, self.options.max_length)?;
        let labels = LabelMapping::from_bundle(bundle)?;
        Classifier::new(bundle.model_id.clone(), preprocessor, Box::new(model), labels)
    }

    /// The artifact at the configured path, when it was converted from the
    /// requested model and conversion is not forced.
    ///
    /// The companion example-input file records which model produced the
    /// artifact; an artifact without one is converted again.
    pub fn reusable_artifact(&self) -> Result<Option<ModelArtifact>> {
        let artifact = ModelArtifact::planned(&self.options.artifact_path)?;
        if self.options.force_convert || !artifact.exists() {
            return Ok(None);
        }

        let inputs_path = example_inputs_path(&artifact.path);
        if !inputs_path.is_file() {
            warn!("{} has no example inputs, converting again", artifact.path.display());
            return Ok(None);
        }

        let example_inputs = ExampleInputs::read(&inputs_path)?;
        if example_inputs.model_id != self.options.model_id {
            warn!(
                "{} was converted from '{}', converting '{}' again",
                artifact.path.display(),
                example_inputs.model_id,
                self.options.model_id
            );
            return Ok(None);
        }
        Ok(Some(artifact))
    }

    /// Fetches, converts when needed, and loads
    pub async fn prepare(&self) -> Result<Classifier> {
        let bundle = self.fetch().await?;

        let artifact = match self.reusable_artifact()? {
            Some(existing) => {
                info!("Reusing artifact {}", existing.path.display());
                existing
            }
            None => self.convert(&bundle)?,
        };

        self.load(&bundle, &artifact)
    }

    /// The whole sequence for one piece of text
    pub async fn run(&self, text: &str) -> Result<Prediction> {
        let mut classifier = self.prepare().await?;
        classifier.classify(text)
    }
}
