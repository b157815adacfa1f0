//! In-process backend doubles for transport integration tests.

#![allow(dead_code)]

use std::net::SocketAddr;
use std::sync::{Arc, Mutex};

use axum::http::HeaderMap;
use axum::Router;
use serde_json::Value;
use tokio::net::TcpListener;

use chatwire_transport::RequestMetadata;

/// Captures every request a test backend receives.
#[derive(Clone, Default)]
pub struct Recorder {
    bodies: Arc<Mutex<Vec<Value>>>,
    headers: Arc<Mutex<Vec<HeaderMap>>>,
}

impl Recorder {
    pub fn record(&self, headers: &HeaderMap, body: &Value) {
        self.headers.lock().unwrap().push(headers.clone());
        self.bodies.lock().unwrap().push(body.clone());
    }

    pub fn count(&self) -> usize {
        self.bodies.lock().unwrap().len()
    }

    pub fn body(&self, index: usize) -> Value {
        self.bodies.lock().unwrap()[index].clone()
    }

    pub fn header(&self, index: usize, name: &str) -> Option<String> {
        self.headers.lock().unwrap()[index]
            .get(name)
            .and_then(|v| v.to_str().ok())
            .map(String::from)
    }
}

/// Serve `app` on an ephemeral localhost port and return its base URL.
pub async fn spawn(app: Router) -> String {
    let listener = TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind test listener");
    let addr: SocketAddr = listener.local_addr().expect("listener address");
    tokio::spawn(async move {
        if let Err(err) = axum::serve(listener, app).await {
            eprintln!("test backend error: {err}");
        }
    });
    format!("http://{addr}")
}

pub fn metadata() -> RequestMetadata {
    RequestMetadata::new("/cli", "chatwire-cli/test")
}
