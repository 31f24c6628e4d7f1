//! # Format Converter
//!
//! Turns a downloaded model into the artifact the engine loads: the ONNX
//! graph compiled and re-serialized with graph optimizations applied, plus
//! a companion file holding the tokenized sample sentence.

mod converter;
mod example_input;
mod types;

pub use converter::FormatConverter;
pub use example_input::{example_inputs_path, ExampleInputs};
pub use types::{ArtifactFormat, ModelArtifact};
