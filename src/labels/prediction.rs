use serde::{Deserialize, Serialize};

/// Probability assigned to one class
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LabelScore {
    pub label: String,
    pub score: f32,
}

/// Result of decoding one row of logits
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Prediction {
    /// Label of the winning class
    pub label: String,
    /// Index of the winning class
    pub index: usize,
    /// Softmax probability of the winning class
    pub score: f32,
    /// Softmax probability of every class, in index order
    pub scores: Vec<LabelScore>,
}
