//! # Label decoding
//!
//! Maps the classification head's logits back to a human-readable label
//! using the `id2label` table of the model configuration.

mod mapping;
mod prediction;

pub use mapping::{argmax, softmax, LabelMapping};
pub use prediction::{LabelScore, Prediction};
