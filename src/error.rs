use std::error::Error;
use std::fmt;

/// Result alias used across the pipeline stages.
pub type Result<T> = std::result::Result<T, PipelineError>;

/// Errors raised by the fetch → convert → load → tokenize → execute → decode
/// sequence. Collaborator errors are carried with their original message.
#[derive(Debug)]
pub enum PipelineError {
    /// The model identifier is not a valid hub repository name
    InvalidModelId(String),
    /// The hub has no such model or file
    NotFound(String),
    /// Transport failure or unexpected HTTP status
    Network(String),
    /// Wraps std::io::Error for file operations
    Io(std::io::Error),
    /// The model graph could not be exported to an artifact
    Conversion(String),
    /// The artifact could not be parsed or compiled by the engine
    Load(String),
    /// Tensor names passed to execute do not match the declared inputs
    InputMismatch {
        missing: Vec<String>,
        unexpected: Vec<String>,
    },
    /// The engine rejected the forward pass
    Execute(String),
    /// Tokenizer loading or encoding failure
    Tokenizer(String),
    /// Logits could not be turned into a label
    Decode(String),
    /// Malformed JSON in a model or example-input file
    Json(serde_json::Error),
}

impl fmt::Display for PipelineError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            PipelineError::InvalidModelId(id) => write!(f, "Invalid model identifier: '{}'", id),
            PipelineError::NotFound(msg) => write!(f, "Not found: {}", msg),
            PipelineError::Network(msg) => write!(f, "Network error: {}", msg),
            PipelineError::Io(e) => write!(f, "I/O error: {}", e),
            PipelineError::Conversion(msg) => write!(f, "Conversion failed: {}", msg),
            PipelineError::Load(msg) => write!(f, "Failed to load model: {}", msg),
            PipelineError::InputMismatch { missing, unexpected } => write!(
                f,
                "Input tensors do not match the model: missing [{}], unexpected [{}]",
                missing.join(", "),
                unexpected.join(", ")
            ),
            PipelineError::Execute(msg) => write!(f, "Execution failed: {}", msg),
            PipelineError::Tokenizer(msg) => write!(f, "Tokenizer error: {}", msg),
            PipelineError::Decode(msg) => write!(f, "Decode error: {}", msg),
            PipelineError::Json(e) => write!(f, "JSON error: {}", e),
        }
    }
}

impl Error for PipelineError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            PipelineError::Io(e) => Some(e),
            PipelineError::Json(e) => Some(e),
            _ => None,
        }
    }
}

impl From<std::io::Error> for PipelineError {
    fn from(err: std::io::Error) -> Self {
        PipelineError::Io(err)
    }
}

impl From<serde_json::Error> for PipelineError {
    fn from(err: serde_json::Error) -> Self {
        PipelineError::Json(err)
    }
}
