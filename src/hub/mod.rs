//! # Model Fetcher
//!
//! Downloads the files a classification model needs (configuration,
//! tokenizer and ONNX graph) from a model hub into a local cache directory.
//! Unknown identifiers fail on the first, smallest file so nothing large
//! is transferred and nothing partial is left behind.

mod fetcher;
mod types;

pub use fetcher::{validate_model_id, ModelFetcher};
pub use types::{ModelBundle, ModelConfigFile, CONFIG_FILE, TOKENIZER_FILE};
