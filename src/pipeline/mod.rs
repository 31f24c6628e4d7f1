//! # Pipeline
//!
//! The linear driver: fetch → convert → load → tokenize → execute → decode.
//! Every stage error is returned unchanged; nothing is retried.

mod classifier;
mod pipeline;

pub use classifier::Classifier;
pub use pipeline::{Pipeline, PipelineOptions};
