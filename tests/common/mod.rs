//! Shared helpers for the HTTP integration tests: fake upstreams that count calls,
//! and a router wired to a temporary doc root and leaderboard file.

#![allow(dead_code)]

use std::sync::{
    Arc, Mutex,
    atomic::{AtomicUsize, Ordering},
};

use async_trait::async_trait;
use axum::{
    Router,
    body::{Body, Bytes},
    http::{Request, StatusCode},
};
use http_body_util::BodyExt;
use portrait_studio::{
    config::{ServerConfig, StaticCredentials},
    error::{StudioError, StudioResult},
    proxy::{AnalysisUpstream, DataUri, EditUpstream},
    server::{AppState, router},
};
use serde_json::Value;
use tempfile::TempDir;
use tower::ServiceExt;

/// What the fake analysis model answers with.
#[derive(Clone, Debug)]
pub enum Reply {
    Text(String),
    Status(StatusCode, String),
}

/// Analysis model stand-in that records every call.
pub struct FakeAnalysis {
    reply: Reply,
    calls: AtomicUsize,
    last_prompt: Mutex<Option<String>>,
}

impl FakeAnalysis {
    pub fn new(reply: Reply) -> Arc<Self> {
        Arc::new(Self {
            reply,
            calls: AtomicUsize::new(0),
            last_prompt: Mutex::new(None),
        })
    }

    pub fn text(text: &str) -> Arc<Self> {
        Self::new(Reply::Text(text.to_string()))
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn last_prompt(&self) -> Option<String> {
        self.last_prompt.lock().unwrap().clone()
    }
}

#[async_trait]
impl AnalysisUpstream for FakeAnalysis {
    async fn analyze(&self, _api_key: &str, _image_url: &str, prompt: &str) -> StudioResult<String> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        *self.last_prompt.lock().unwrap() = Some(prompt.to_string());
        match &self.reply {
            Reply::Text(text) => Ok(text.clone()),
            Reply::Status(status, message) => Err(StudioError::upstream(*status, message.clone())),
        }
    }
}

/// Edit model stand-in returning a fixed image (or none).
pub struct FakeEdit {
    result: Option<DataUri>,
    calls: AtomicUsize,
}

impl FakeEdit {
    pub fn new(result: Option<DataUri>) -> Arc<Self> {
        Arc::new(Self {
            result,
            calls: AtomicUsize::new(0),
        })
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl EditUpstream for FakeEdit {
    async fn edit(&self, _api_key: &str, _image: &DataUri, _instruction: &str) -> StudioResult<Option<DataUri>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.result.clone())
    }
}

pub const PHOTO: &str = "data:image/png;base64,iVBORw0KGgo=";

pub fn both_keys() -> StaticCredentials {
    StaticCredentials {
        xai: Some("xai-test-key".into()),
        gemini: Some("gemini-test-key".into()),
    }
}

/// Router over a fresh temp dir; `public/` is the doc root.
pub struct TestApp {
    pub dir: TempDir,
    pub config: ServerConfig,
    pub router: Router,
}

impl TestApp {
    pub fn new(credentials: StaticCredentials, analysis: Arc<FakeAnalysis>, edit: Arc<FakeEdit>) -> Self {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir_all(dir.path().join("public")).unwrap();
        let config = ServerConfig {
            doc_root: dir.path().join("public"),
            hall_path: dir.path().join("hall.json"),
            ..ServerConfig::default()
        };
        let state = AppState::with_upstreams(config.clone(), Arc::new(credentials), analysis, edit);
        Self {
            dir,
            config,
            router: router(state),
        }
    }

    pub fn write_page(&self, name: &str, content: &str) {
        let path = self.config.doc_root.join(name);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).unwrap();
        }
        std::fs::write(path, content).unwrap();
    }

    pub async fn send(&self, request: Request<Body>) -> (StatusCode, Option<String>, Bytes) {
        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let content_type = response
            .headers()
            .get("content-type")
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);
        let body = response.into_body().collect().await.unwrap().to_bytes();
        (status, content_type, body)
    }

    pub async fn send_json(&self, request: Request<Body>) -> (StatusCode, Value) {
        let (status, _, body) = self.send(request).await;
        (status, serde_json::from_slice(&body).unwrap())
    }
}

pub fn post_json(uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

pub fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}
