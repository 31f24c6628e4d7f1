use std::fmt;
use std::path::{Path, PathBuf};

use crate::error::{PipelineError, Result};

/// Serialized graph formats the engine accepts
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArtifactFormat {
    Onnx,
}

impl ArtifactFormat {
    /// Infers the format from the file extension
    pub fn from_path(path: &Path) -> Option<Self> {
        match path.extension()?.to_str()?.to_ascii_lowercase().as_str() {
            "onnx" => Some(ArtifactFormat::Onnx),
            _ => None,
        }
    }
}

impl fmt::Display for ArtifactFormat {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            ArtifactFormat::Onnx => write!(f, "onnx"),
        }
    }
}

/// A serialized model on disk. Immutable once written.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModelArtifact {
    pub path: PathBuf,
    pub format: ArtifactFormat,
}

impl ModelArtifact {
    /// Refers to an existing artifact file
    pub fn open(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        if !path.is_file() {
            return Err(PipelineError::Load(format!("artifact not found: {}", path.display())));
        }
        let format = ArtifactFormat::from_path(&path).ok_or_else(|| {
            PipelineError::Load(format!("unrecognized artifact format: {}", path.display()))
        })?;
        Ok(Self { path, format })
    }

    /// Checks that an output path names a supported format before any work is done
    pub fn planned(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let format = ArtifactFormat::from_path(&path).ok_or_else(|| {
            PipelineError::Conversion(format!(
                "artifact path must end in .onnx: {}",
                path.display()
            ))
        })?;
        Ok(Self { path, format })
    }

    pub fn exists(&self) -> bool {
        self.path.is_file()
    }
}
