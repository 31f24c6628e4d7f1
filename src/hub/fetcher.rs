use std::path::{Path, PathBuf};
use std::time::Duration;

use futures::StreamExt;
use indicatif::{ProgressBar, ProgressStyle};
use once_cell::sync::Lazy;
use regex::Regex;
use reqwest::{Client, StatusCode};
use tokio::io::AsyncWriteExt;
use tracing::{debug, info, warn};

use super::types::{ModelBundle, CONFIG_FILE, TOKENIZER_FILE};
use crate::config::HubConfig;
use crate::error::{PipelineError, Result};

/// `name` or `owner/name`, each segment starting with an alphanumeric character
static MODEL_ID: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[A-Za-z0-9][A-Za-z0-9._-]*(/[A-Za-z0-9][A-Za-z0-9._-]*)?$")
        .expect("model id pattern is valid")
});

/// Checks that `model_id` is a well-formed hub repository name.
pub fn validate_model_id(model_id: &str) -> Result<()> {
    if model_id.contains("..") || !MODEL_ID.is_match(model_id) {
        return Err(PipelineError::InvalidModelId(model_id.to_string()));
    }
    Ok(())
}

/// Downloads model files from the hub into a local cache.
///
/// No retries are performed: the first network or HTTP failure is returned
/// to the caller as is.
#[derive(Debug, Clone)]
pub struct ModelFetcher {
    client: Client,
    base_url: String,
    cache_dir: PathBuf,
    revision: String,
    token: Option<String>,
    onnx_file: String,
    show_progress: bool,
}

impl ModelFetcher {
    /// Creates a fetcher from the hub section of the settings
    pub fn new(config: &HubConfig) -> Result<Self> {
        let client = Client::builder()
            .user_agent(concat!("senti/", env!("CARGO_PKG_VERSION")))
            .connect_timeout(Duration::from_secs(30))
            .build()
            .map_err(|e| PipelineError::Network(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            cache_dir: config.cache_dir.clone(),
            revision: config.revision.clone(),
            token: config.token.clone(),
            onnx_file: config.onnx_file.clone(),
            show_progress: true,
        })
    }

    /// Enables or disables the download progress bar
    pub fn with_progress(mut self, show_progress: bool) -> Self {
        self.show_progress = show_progress;
        self
    }

    /// Describes where the files of `model_id` live in the cache
    pub fn bundle_for(&self, model_id: &str) -> ModelBundle {
        let model_dir = self
            .cache_dir
            .join(model_id.replace('/', "--"))
            .join(self.revision.replace('/', "--"));

        ModelBundle {
            model_id: model_id.to_string(),
            revision: self.revision.clone(),
            model_dir,
            onnx_file: self.onnx_file.clone(),
        }
    }

    /// Returns the cached bundle when every required file is already on disk
    pub fn cached(&self, model_id: &str) -> Result<Option<ModelBundle>> {
        validate_model_id(model_id)?;
        let bundle = self.bundle_for(model_id);
        Ok(bundle.is_complete().then_some(bundle))
    }

    /// Downloads the configuration, tokenizer and ONNX graph of `model_id`.
    ///
    /// `config.json` is requested first so an unknown identifier fails
    /// before anything large is transferred. Files already present in the
    /// cache are reused.
    pub async fn fetch(&self, model_id: &str) -> Result<ModelBundle> {
        validate_model_id(model_id)?;
        let bundle = self.bundle_for(model_id);
        info!("Fetching model '{}' (revision {}) into {}", model_id, self.revision, bundle.model_dir.display());

        for file in [CONFIG_FILE, TOKENIZER_FILE, self.onnx_file.as_str()] {
            let dest = bundle.model_dir.join(file);
            if dest.is_file() {
                debug!("Using cached {}", dest.display());
                continue;
            }
            self.download_file(model_id, file, &dest).await?;
        }

        info!("Model '{}' is available locally", model_id);
        Ok(bundle)
    }

    fn file_url(&self, model_id: &str, filename: &str) -> String {
        format!("{}/{}/resolve/{}/{}", self.base_url, model_id, self.revision, filename)
    }

    /// Streams one file to `<dest>.part` and renames it into place once complete
    async fn download_file(&self, model_id: &str, filename: &str, dest: &Path) -> Result<()> {
        let url = self.file_url(model_id, filename);
        debug!("GET {}", url);

        let mut request = self.client.get(&url);
        if let Some(token) = &self.token {
            request = request.bearer_auth(token);
        }

        let response = request.send().await.map_err(|e| {
            PipelineError::Network(format!("Failed to download {}: {}", filename, e))
        })?;

        let status = response.status();
        // The hub answers 401 rather than 404 for repositories that do not exist
        if status == StatusCode::NOT_FOUND || status == StatusCode::UNAUTHORIZED {
            return Err(PipelineError::NotFound(format!(
                "{} of model '{}' (HTTP {})",
                filename, model_id, status
            )));
        }
        if !status.is_success() {
            return Err(PipelineError::Network(format!(
                "Failed to download {}: HTTP {}",
                filename, status
            )));
        }

        if let Some(parent) = dest.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }

        let part = part_path(dest);
        match self.write_body(response, &part, filename).await {
            Ok(()) => {
                tokio::fs::rename(&part, dest).await?;
                Ok(())
            }
            Err(e) => {
                if let Err(cleanup) = tokio::fs::remove_file(&part).await {
                    warn!("Could not remove partial download {}: {}", part.display(), cleanup);
                }
                Err(e)
            }
        }
    }

    async fn write_body(&self, response: reqwest::Response, part: &Path, filename: &str) -> Result<()> {
        let pb = if self.show_progress {
            download_bar(response.content_length(), filename)
        } else {
            ProgressBar::hidden()
        };

        let mut file = tokio::fs::File::create(part).await?;
        let mut stream = response.bytes_stream();
        while let Some(chunk) = stream.next().await {
            let chunk = chunk.map_err(|e| {
                PipelineError::Network(format!("Failed to read {}: {}", filename, e))
            })?;
            file.write_all(&chunk).await?;
            pb.inc(chunk.len() as u64);
        }
        file.flush().await?;
        file.sync_all().await?;

        pb.finish_and_clear();
        debug!("Downloaded {} ({} bytes)", filename, pb.position());
        Ok(())
    }
}

fn part_path(dest: &Path) -> PathBuf {
    let mut name = dest.file_name().map(|n| n.to_os_string()).unwrap_or_default();
    name.push(".part");
    dest.with_file_name(name)
}

fn download_bar(len: Option<u64>, filename: &str) -> ProgressBar {
    let pb = match len {
        Some(len) => ProgressBar::new(len),
        None => ProgressBar::new_spinner(),
    };
    let style = ProgressStyle::with_template(
        "{msg:20} [{bar:40.cyan/blue}] {bytes}/{total_bytes} ({bytes_per_sec})",
    )
    .unwrap_or_else(|_| ProgressStyle::default_bar())
    .progress_chars("=> ");
    pb.set_style(style);
    pb.set_message(filename.to_string());
    pb
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_hub_style_identifiers() {
        for id in ["bert-base-uncased", "org/model", "Org_1/model.v2-final"] {
            assert!(validate_model_id(id).is_ok(), "{}", id);
        }
    }

    #[test]
    fn rejects_malformed_identifiers() {
        for id in ["", "/abs", "a/b/c", "org/../etc", "has space", "org/", "-lead"] {
            assert!(
                matches!(validate_model_id(id), Err(PipelineError::InvalidModelId(_))),
                "{}",
                id
            );
        }
    }

    #[test]
    fn part_file_sits_next_to_destination() {
        let part = part_path(Path::new("/cache/org--m/main/onnx/model.onnx"));
        assert_eq!(part, PathBuf::from("/cache/org--m/main/onnx/model.onnx.part"));
    }
}
