#![allow(dead_code)]

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use axum::extract::{Path as UrlPath, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::Router;
use tokio::net::TcpListener;

use senti::error::Result;
use senti::hub::ModelBundle;
use senti::inference::{CompiledModel, ModelSignature, Preprocessor, TensorSpec, TokenizerType};
use senti::labels::LabelMapping;
use senti::pipeline::Classifier;
use senti::tensor::{DType, NamedTensorMap, TensorValue};

// Ids from tests/fixtures/tokenizer.json
pub const CLS: i64 = 2;
pub const SEP: i64 = 3;
const GREAT: i64 = 8;
const TERRIBLE: i64 = 9;
const LOVE: i64 = 11;
const BAD: i64 = 19;

pub fn fixture(name: &str) -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures").join(name)
}

/// Lays the fixture config and tokenizer out the way the fetcher caches them
pub fn fixture_bundle(dir: &Path) -> ModelBundle {
    let bundle = ModelBundle {
        model_id: "test/tiny-bert".to_string(),
        revision: "main".to_string(),
        model_dir: dir.join("test--tiny-bert").join("main"),
        onnx_file: "onnx/model.onnx".to_string(),
    };
    std::fs::create_dir_all(&bundle.model_dir).unwrap();
    std::fs::copy(fixture("config.json"), bundle.config_path()).unwrap();
    std::fs::copy(fixture("tokenizer.json"), bundle.tokenizer_path()).unwrap();
    bundle
}

pub fn bert_preprocessor() -> Preprocessor {
    Preprocessor::from_file(&fixture("tokenizer.json"), TokenizerType::BERT).unwrap()
}

pub fn signature(with_type_ids: bool) -> ModelSignature {
    let mut inputs = vec![
        TensorSpec::new("input_ids", DType::I64, vec![None, None]),
        TensorSpec::new("attention_mask", DType::I64, vec![None, None]),
    ];
    if with_type_ids {
        inputs.push(TensorSpec::new("token_type_ids", DType::I64, vec![None, None]));
    }
    ModelSignature {
        inputs,
        outputs: vec![TensorSpec::new("logits", DType::F32, vec![None, Some(2)])],
    }
}

/// Stands in for a compiled sentiment model: scores a sentence by counting
/// positive and negative vocabulary ids
pub struct ScriptedModel {
    signature: ModelSignature,
    pub calls: usize,
}

impl ScriptedModel {
    pub fn new(signature: ModelSignature) -> Self {
        Self { signature, calls: 0 }
    }
}

impl CompiledModel for ScriptedModel {
    fn signature(&self) -> &ModelSignature {
        &self.signature
    }

    fn execute(&mut self, inputs: NamedTensorMap) -> Result<NamedTensorMap> {
        self.signature.check_inputs(&inputs)?;
        self.calls += 1;

        let ids = inputs.get("input_ids").and_then(TensorValue::as_i64).unwrap();
        let count = |wanted: &[i64]| ids.iter().filter(|id| wanted.contains(*id)).count() as f32;
        let logits = vec![count(&[TERRIBLE, BAD]), count(&[GREAT, LOVE])];

        let mut outputs = NamedTensorMap::new();
        outputs.insert("logits", TensorValue::from_f32(&[1, 2], logits)?);
        Ok(outputs)
    }
}

pub fn sentiment_classifier(with_type_ids: bool) -> Classifier {
    Classifier::new(
        "test/tiny-bert",
        bert_preprocessor(),
        Box::new(ScriptedModel::new(signature(with_type_ids))),
        LabelMapping::from_labels(["NEGATIVE", "POSITIVE"]),
    )
    .unwrap()
}

type HubState = (Arc<HashMap<String, Vec<u8>>>, Arc<AtomicUsize>);

async fn serve_file(State((files, hits)): State<HubState>, UrlPath(path): UrlPath<String>) -> Response {
    hits.fetch_add(1, Ordering::SeqCst);
    match files.get(&path) {
        Some(body) => (StatusCode::OK, body.clone()).into_response(),
        None => StatusCode::NOT_FOUND.into_response(),
    }
}

/// Starts a local stand-in for the hub serving `files` keyed by URL path.
/// Returns its base URL and a counter of requests received.
pub async fn spawn_hub(files: &[(&str, &[u8])]) -> (String, Arc<AtomicUsize>) {
    let files: HashMap<String, Vec<u8>> = files
        .iter()
        .map(|(path, body)| (path.to_string(), body.to_vec()))
        .collect();
    let hits = Arc::new(AtomicUsize::new(0));

    let app = Router::new()
        .route("/{*path}", get(serve_file))
        .with_state((Arc::new(files), Arc::clone(&hits)));
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    (format!("http://{}", addr), hits)
}
