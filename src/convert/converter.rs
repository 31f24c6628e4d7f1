use std::path::{Path, PathBuf};

use tracing::{debug, info, warn};

use super::example_input::{example_inputs_path, ExampleInputs};
use super::types::ModelArtifact;
use crate::error::{PipelineError, Result};
use crate::hub::ModelBundle;
use crate::inference::{CompiledModel, OrtEngine, Preprocessor};

/// Exports a downloaded model into an engine-loadable artifact.
///
/// The artifact is produced under a temporary name and renamed into place
/// only once the engine has finished writing it.
pub struct FormatConverter {
    engine: OrtEngine,
}

impl FormatConverter {
    pub fn new(engine: OrtEngine) -> Self {
        Self { engine }
    }

    /// Writes the optimized graph of `bundle` to `output_path` and
    /// `sample_text`, tokenized for the inputs the exported graph declares,
    /// to the companion example-input file.
    ///
    /// The companion is written last. An artifact without a companion naming
    /// its model is never reused, so an interrupted conversion is redone.
    pub fn convert(
        &self,
        bundle: &ModelBundle,
        output_path: &Path,
        sample_text: &str,
        preprocessor: Preprocessor,
    ) -> Result<ModelArtifact> {
        let planned = ModelArtifact::planned(output_path)?;
        let source = bundle.onnx_path();
        if !source.is_file() {
            return Err(PipelineError::Conversion(format!(
                "model '{}' has no ONNX graph at {}",
                bundle.model_id,
                source.display()
            )));
        }

        if let Some(parent) = output_path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }

        info!("Converting {} into {}", source.display(), output_path.display());
        let staging = staging_path(output_path);
        let example_inputs = match self.stage(bundle, &source, &staging, sample_text, preprocessor) {
            Ok(example_inputs) => example_inputs,
            Err(e) => {
                discard(&staging);
                return Err(e);
            }
        };

        // An artifact whose companion is missing is never reused
        let inputs_path = example_inputs_path(output_path);
        discard(&inputs_path);
        if let Err(e) = std::fs::rename(&staging, output_path) {
            discard(&staging);
            return Err(e.into());
        }
        if let Err(e) = example_inputs.write(&inputs_path) {
            discard(output_path);
            return Err(e);
        }
        info!("Wrote artifact {} and example inputs {}", output_path.display(), inputs_path.display());

        Ok(planned)
    }

    /// Exports to `staging` and tokenizes the sample for the staged graph
    fn stage(
        &self,
        bundle: &ModelBundle,
        source: &Path,
        staging: &Path,
        sample_text: &str,
        mut preprocessor: Preprocessor,
    ) -> Result<ExampleInputs> {
        self.engine.export_optimized(source, staging)?;

        let model = self.engine.load(&ModelArtifact::open(staging)?)?;
        preprocessor.restrict_to(model.signature());
        let tensors = preprocessor.tokenize(sample_text)?;
        model.signature().check_inputs(&tensors)?;
        debug!("Sample tokenized into [{}]", tensors.names().collect::<Vec<_>>().join(", "));

        Ok(ExampleInputs::new(&bundle.model_id, sample_text, &tensors))
    }
}

fn staging_path(output_path: &Path) -> PathBuf {
    let mut name = output_path.file_stem().map(|n| n.to_os_string()).unwrap_or_default();
    // Keep the .onnx extension last so the engine recognizes the format
    name.push(".partial.onnx");
    output_path.with_file_name(name)
}

fn discard(path: &Path) {
    if path.exists() {
        if let Err(e) = std::fs::remove_file(path) {
            warn!("Could not remove {}: {}", path.display(), e);
        }
    }
}
