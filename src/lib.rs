//! # senti
//!
//! Downloads a pretrained text classifier from a model hub, converts it into
//! an ONNX Runtime artifact, and turns text into a human-readable label:
//!
//! fetch → convert → load → tokenize → execute → decode
//!
//! Each stage lives in its own module; [`pipeline::Pipeline`] drives them in
//! order and [`server`] / [`client`] wrap a loaded classifier in HTTP.

pub mod client;
pub mod config;
pub mod convert;
pub mod display;
pub mod error;
pub mod hub;
pub mod inference;
pub mod labels;
pub mod pipeline;
pub mod server;
pub mod tensor;

pub use error::{PipelineError, Result};
