mod model;
mod types;

pub use model::CompiledModel;
pub use types::{ModelSignature, TensorSpec, LOGITS};
