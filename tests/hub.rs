mod common;

use std::path::Path;
use std::sync::atomic::Ordering;

use common::spawn_hub;
use senti::config::HubConfig;
use senti::hub::ModelFetcher;
use senti::PipelineError;

fn create_test_fetcher(base_url: &str, cache_dir: &Path) -> ModelFetcher {
    let config = HubConfig {
        base_url: base_url.to_string(),
        cache_dir: cache_dir.to_path_buf(),
        revision: "main".to_string(),
        token: None,
        onnx_file: "onnx/model.onnx".to_string(),
    };
    ModelFetcher::new(&config).unwrap().with_progress(false)
}

fn count_files(dir: &Path) -> usize {
    if !dir.exists() {
        return 0;
    }
    std::fs::read_dir(dir)
        .unwrap()
        .map(|entry| entry.unwrap().path())
        .map(|path| if path.is_dir() { count_files(&path) } else { 1 })
        .sum()
}

const MODEL_FILES: [(&str, &[u8]); 3] = [
    ("org/tiny/resolve/main/config.json", br#"{"model_type": "bert"}"#),
    ("org/tiny/resolve/main/tokenizer.json", br#"{"version": "1.0"}"#),
    ("org/tiny/resolve/main/onnx/model.onnx", b"\x08\x07graph-bytes"),
];

#[tokio::test]
async fn test_unknown_model_fails_fast() {
    let (url, hits) = spawn_hub(&MODEL_FILES).await;
    let cache = tempfile::tempdir().unwrap();
    let fetcher = create_test_fetcher(&url, cache.path());

    let result = fetcher.fetch("org/does-not-exist").await;

    assert!(matches!(result, Err(PipelineError::NotFound(_))));
    // Only config.json was requested and nothing was written
    assert_eq!(hits.load(Ordering::SeqCst), 1);
    assert_eq!(count_files(cache.path()), 0);
}

#[tokio::test]
async fn test_malformed_id_is_rejected_before_any_request() {
    let (url, hits) = spawn_hub(&MODEL_FILES).await;
    let cache = tempfile::tempdir().unwrap();
    let fetcher = create_test_fetcher(&url, cache.path());

    let result = fetcher.fetch("org/../../etc").await;

    assert!(matches!(result, Err(PipelineError::InvalidModelId(_))));
    assert_eq!(hits.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_fetch_downloads_every_file() {
    let (url, hits) = spawn_hub(&MODEL_FILES).await;
    let cache = tempfile::tempdir().unwrap();
    let fetcher = create_test_fetcher(&url, cache.path());

    let bundle = fetcher.fetch("org/tiny").await.unwrap();

    assert!(bundle.is_complete());
    assert_eq!(bundle.model_dir, cache.path().join("org--tiny").join("main"));
    assert_eq!(std::fs::read(bundle.onnx_path()).unwrap(), MODEL_FILES[2].1);
    assert_eq!(hits.load(Ordering::SeqCst), 3);
    // No staging files survive a completed download
    assert_eq!(count_files(cache.path()), 3);
}

#[tokio::test]
async fn test_cached_files_are_not_downloaded_again() {
    let (url, hits) = spawn_hub(&MODEL_FILES).await;
    let cache = tempfile::tempdir().unwrap();
    let fetcher = create_test_fetcher(&url, cache.path());

    assert!(fetcher.cached("org/tiny").unwrap().is_none());
    fetcher.fetch("org/tiny").await.unwrap();
    fetcher.fetch("org/tiny").await.unwrap();

    assert_eq!(hits.load(Ordering::SeqCst), 3);
    assert!(fetcher.cached("org/tiny").unwrap().is_some());
}

#[tokio::test]
async fn test_missing_graph_leaves_incomplete_bundle() {
    let (url, _) = spawn_hub(&MODEL_FILES[..2]).await;
    let cache = tempfile::tempdir().unwrap();
    let fetcher = create_test_fetcher(&url, cache.path());

    let result = fetcher.fetch("org/tiny").await;

    assert!(matches!(result, Err(PipelineError::NotFound(_))));
    assert!(fetcher.cached("org/tiny").unwrap().is_none());
    // config.json and tokenizer.json only, no partial graph
    assert_eq!(count_files(cache.path()), 2);
}
