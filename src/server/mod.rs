//! # Serving example
//!
//! Exposes one loaded classifier over HTTP:
//!
//! - `GET  /api/v1/health`
//! - `GET  /api/v1/model`
//! - `POST /api/v1/classify` with `{"text": "..."}`

mod routes;
mod server;
pub mod types;

pub use server::{ApiServer, AppState};
pub use types::{ApiResponse, ClassifyRequest, ModelInfo};
