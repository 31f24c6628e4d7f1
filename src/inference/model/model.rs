use crate::error::Result;
use crate::tensor::NamedTensorMap;

use super::ModelSignature;

/// A model that has been parsed and compiled by an inference engine.
///
/// Execution is synchronous and blocking. Implementations must reject input
/// maps whose names differ from the declared inputs and must return a map
/// keyed by the declared output names.
pub trait CompiledModel: Send {
    /// Declared input and output tensors
    fn signature(&self) -> &ModelSignature;

    /// Runs one forward pass
    fn execute(&mut self, inputs: NamedTensorMap) -> Result<NamedTensorMap>;
}
