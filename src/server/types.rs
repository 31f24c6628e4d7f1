use serde::{Deserialize, Serialize};

use crate::inference::TensorSpec;

/// Request for text classification
#[derive(Deserialize, Serialize, Clone, Debug)]
pub struct ClassifyRequest {
    pub text: String,
}

/// Generic API response wrapper
#[derive(Serialize, Deserialize, Debug)]
pub struct ApiResponse<T> {
    pub status: String,
    pub data: Option<T>,
    pub message: Option<String>,
}

impl<T> ApiResponse<T> {
    pub fn success(data: T) -> Self {
        Self {
            status: "success".to_string(),
            data: Some(data),
            message: None,
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            status: "error".to_string(),
            data: None,
            message: Some(message.into()),
        }
    }
}

/// Description of the model being served
#[derive(Serialize, Debug, Clone)]
pub struct ModelInfo {
    pub model_id: String,
    pub labels: Vec<String>,
    pub inputs: Vec<TensorSpec>,
    pub outputs: Vec<TensorSpec>,
}
