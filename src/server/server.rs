use std::error::Error;
use std::sync::{Arc, Mutex};

use axum::{
    routing::{get, post},
    Router,
};
use tokio::net::TcpListener;
use tracing::info;

use super::routes;
use super::types::ModelInfo;
use crate::pipeline::Classifier;

/// Shared state behind every route
pub struct AppState {
    /// The model executes one request at a time
    pub classifier: Mutex<Classifier>,
    pub info: ModelInfo,
}

/// HTTP front end serving one loaded classifier
pub struct ApiServer {
    state: Arc<AppState>,
    host: String,
    port: u16,
}

impl ApiServer {
    pub fn new(classifier: Classifier, host: String, port: u16) -> Self {
        let info = ModelInfo {
            model_id: classifier.model_id().to_string(),
            labels: classifier.labels().iter().map(|(_, l)| l.to_string()).collect(),
            inputs: classifier.signature().inputs.clone(),
            outputs: classifier.signature().outputs.clone(),
        };

        info!("Creating new API server on {}:{}", host, port);
        Self {
            state: Arc::new(AppState {
                classifier: Mutex::new(classifier),
                info,
            }),
            host,
            port,
        }
    }

    pub fn router(&self) -> Router {
        Router::new()
            .route("/api/v1/health", get(routes::health_check))
            .route("/api/v1/model", get(routes::model_info))
            .route("/api/v1/classify", post(routes::classify))
            .with_state(Arc::clone(&self.state))
    }

    /// Binds the configured address and serves until the process ends
    pub async fn start(&self) -> Result<(), Box<dyn Error + Send + Sync>> {
        info!("Starting server on {}:{}", self.host, self.port);
        let listener = TcpListener::bind((self.host.as_str(), self.port)).await?;
        self.serve(listener).await
    }

    /// Serves on an already bound listener
    pub async fn serve(&self, listener: TcpListener) -> Result<(), Box<dyn Error + Send + Sync>> {
        info!("Server listening on {}", listener.local_addr()?);
        axum::serve(listener, self.router()).await?;
        Ok(())
    }
}
