// Required external crates for configuration management and serialization
use serde::Deserialize;
use std::path::{Path, PathBuf};
use config::{Config, ConfigError, Environment, File, FileFormat};

/// Defaults compiled into the binary so the CLI works without a config directory
const DEFAULT_CONFIG: &str = include_str!("../../config/default.toml");

/// Configuration for the model hub client
#[derive(Debug, Deserialize, Clone)]
pub struct HubConfig {
    /// Base URL of the hub (e.g. https://huggingface.co)
    pub base_url: String,
    /// Directory where downloaded model files are cached
    pub cache_dir: PathBuf,
    /// Branch, tag or commit to resolve files against
    pub revision: String,
    /// Bearer token for private repositories
    pub token: Option<String>,
    /// Path of the ONNX graph inside the model repository
    pub onnx_file: String,
}

/// Configuration for the model being classified with
#[derive(Debug, Deserialize, Clone)]
pub struct ModelConfig {
    /// Hub identifier, e.g. "distilbert/distilbert-base-uncased-finetuned-sst-2-english"
    pub id: String,
    /// Where the converted artifact is written and loaded from
    pub artifact_path: PathBuf,
    /// Sentence used for the companion example-input file and as the default input
    pub sample_text: String,
    /// Optional truncation length in tokens
    pub max_length: Option<usize>,
}

/// Graph optimization applied by the engine when compiling the artifact
#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum OptimizationLevel {
    Disable,
    Basic,
    Extended,
    All,
}

/// Configuration for the inference engine
#[derive(Debug, Deserialize, Clone)]
pub struct InferenceConfig {
    /// Intra-op thread count, 0 lets the engine decide
    pub intra_threads: usize,
    /// Graph optimization level
    pub optimization_level: OptimizationLevel,
}

/// Configuration for the HTTP server
#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    /// Host address to bind to
    pub host: String,
    /// Port number to listen on
    pub port: u16,
}

/// Configuration for the serving client
#[derive(Debug, Deserialize, Clone)]
pub struct ClientConfig {
    /// Base URL of the serving endpoint
    pub url: String,
}

/// Configuration for application logging
#[derive(Debug, Deserialize, Clone)]
pub struct LoggingConfig {
    /// Log level (debug, info, warn, error)
    pub level: String,
    /// Optional log directory; logs go to stderr when unset
    pub file: Option<PathBuf>,
}

/// Main settings struct that contains all configuration
#[derive(Debug, Deserialize, Clone)]
pub struct Settings {
    /// Hub-related settings
    pub hub: HubConfig,
    /// Model-related settings
    pub model: ModelConfig,
    /// Inference-related settings
    pub inference: InferenceConfig,
    /// Server-related settings
    pub server: ServerConfig,
    /// Client-related settings
    pub client: ClientConfig,
    /// Logging-related settings
    pub logging: LoggingConfig,
}

/// Implementation for loading and parsing configuration
impl Settings {
    /// Loads config from multiple sources in the following order of
    /// precedence (highest to lowest):
    /// 1. Environment variables prefixed with SENTI_ (sections split by `__`)
    /// 2. Local config file (`<dir>/local.toml`) if present
    /// 3. Default config file (`<dir>/default.toml`) if present
    /// 4. Built-in defaults
    pub fn load(config_dir: &Path) -> Result<Self, ConfigError> {
        let default_config = config_dir.join("default.toml");
        let local_config = config_dir.join("local.toml");

        let mut settings = Config::builder()
            .add_source(File::from_str(DEFAULT_CONFIG, FileFormat::Toml))
            .add_source(File::from(default_config).required(false))
            .add_source(File::from(local_config).required(false))
            .add_source(
                Environment::with_prefix("SENTI")
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?
            .try_deserialize::<Settings>()?;

        // The hub convention: HF_TOKEN is honoured when nothing else set a token
        if settings.hub.token.is_none() {
            settings.hub.token = std::env::var("HF_TOKEN").ok().filter(|t| !t.is_empty());
        }

        settings.validate()?;

        Ok(settings)
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.model.id.trim().is_empty() {
            return Err(ConfigError::Message("model.id must not be empty".to_string()));
        }

        if !(self.hub.base_url.starts_with("http://") || self.hub.base_url.starts_with("https://")) {
            return Err(ConfigError::Message(
                format!("hub.base_url must be an http(s) URL, got: {}", self.hub.base_url)
            ));
        }

        if self.hub.revision.trim().is_empty() {
            return Err(ConfigError::Message("hub.revision must not be empty".to_string()));
        }

        if self.model.max_length == Some(0) {
            return Err(ConfigError::Message(
                "model.max_length must be greater than 0".to_string()
            ));
        }

        if self.server.port == 0 {
            return Err(ConfigError::Message(
                "server.port must be between 1 and 65535".to_string()
            ));
        }

        // Validate logging level
        match self.logging.level.to_lowercase().as_str() {
            "error" | "warn" | "info" | "debug" | "trace" => Ok(()),
            _ => Err(ConfigError::Message(
                format!("Invalid logging level: {}. Must be one of: error, warn, info, debug, trace",
                    self.logging.level)
            )),
        }?;

        // Create log directory if configured and doesn't exist
        if let Some(log_dir) = &self.logging.file {
            if !log_dir.exists() {
                std::fs::create_dir_all(log_dir).map_err(|e| {
                    ConfigError::Message(format!(
                        "Failed to create log directory at {}: {}",
                        log_dir.display(), e
                    ))
                })?;
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtin_defaults_load_without_a_config_directory() {
        let dir = tempfile::tempdir().unwrap();
        let settings = Settings::load(&dir.path().join("missing")).unwrap();

        assert_eq!(settings.hub.base_url, "https://huggingface.co");
        assert_eq!(settings.hub.onnx_file, "onnx/model.onnx");
        assert_eq!(settings.inference.optimization_level, OptimizationLevel::All);
        assert_eq!(settings.server.port, 8080);
        assert!(settings.model.max_length.is_none());
    }

    #[test]
    fn local_file_overrides_defaults() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join("local.toml"),
            "[model]\nid = \"org/other-model\"\nmax_length = 64\n\n[inference]\noptimization_level = \"basic\"\n",
        )
        .unwrap();

        let settings = Settings::load(dir.path()).unwrap();
        assert_eq!(settings.model.id, "org/other-model");
        assert_eq!(settings.model.max_length, Some(64));
        assert_eq!(settings.inference.optimization_level, OptimizationLevel::Basic);
        // Untouched keys keep their defaults
        assert_eq!(settings.hub.revision, "main");
    }

    #[test]
    fn invalid_values_are_rejected() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("local.toml"), "[logging]\nlevel = \"loud\"\n").unwrap();
        assert!(Settings::load(dir.path()).is_err());

        std::fs::write(dir.path().join("local.toml"), "[hub]\nbase_url = \"ftp://hub\"\n").unwrap();
        assert!(Settings::load(dir.path()).is_err());

        std::fs::write(dir.path().join("local.toml"), "[model]\nmax_length = 0\n").unwrap();
        assert!(Settings::load(dir.path()).is_err());
    }
}
