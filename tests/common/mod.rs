#![allow(dead_code)]

use axum::body::Body;
use axum::http::{Request, Response};
use axum::Router;
use protomock::endpoints::Registry;
use protomock::router::{build_router, AppState};
use proto_json_tool::Encoder;
use std::path::{Path, PathBuf};
use tempfile::TempDir;
use tower::ServiceExt; // for Router::oneshot

pub const PROFILE_PROTO: &str = r#"
syntax = "proto3";
package app;

message GetProfileResponse {
    int32 id = 1;
    string name = 2;
}
"#;

/// A temp directory holding protos, fixtures and an endpoints file.
pub struct Workspace {
    pub dir: TempDir,
}

impl Workspace {
    pub fn new() -> Self {
        Self {
            dir: TempDir::new().expect("create temp dir"),
        }
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    pub fn write(&self, name: &str, contents: &str) -> PathBuf {
        let path = self.dir.path().join(name);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).expect("create dirs");
        }
        std::fs::write(&path, contents).expect("write file");
        path
    }

    pub fn registry(&self, endpoints_json: &str) -> Registry {
        let config = self.write("endpoints.json", endpoints_json);
        Registry::load(&config).expect("valid endpoints file")
    }
}

pub fn app(registry: Registry) -> Router {
    build_router(AppState::new(registry, Encoder::new()))
}

pub async fn send(app: &Router, method: &str, uri: &str) -> Response<Body> {
    app.clone()
        .oneshot(
            Request::builder()
                .method(method)
                .uri(uri)
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .expect("router handled request")
}

pub async fn body_bytes(response: Response<Body>) -> Vec<u8> {
    axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("read response body")
        .to_vec()
}
