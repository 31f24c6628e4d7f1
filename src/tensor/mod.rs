mod tensor;

pub use tensor::{DType, NamedTensorMap, TensorRecord, TensorValue};
