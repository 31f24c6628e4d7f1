//! # Inference
//!
//! Everything that happens between raw text and raw logits:
//!
//! - `tokenizer`: text to named integer tensors
//! - `model`: the `CompiledModel` seam and the declared model signature
//! - `engine`: ONNX Runtime, which compiles artifacts and runs them
//!
//! The engine is an opaque collaborator. This module only checks that the
//! tensors handed to it match what the loaded model declares.

pub mod engine;
pub mod model;
pub mod tokenizer;

pub use engine::{OrtEngine, OrtModel};
pub use model::{CompiledModel, ModelSignature, TensorSpec};
pub use tokenizer::{Preprocessor, TokenizerType};
