//! Chat-trigger strategy, including the streaming attempt and its fallback.

mod common;

use std::convert::Infallible;

use axum::body::{Body, Bytes};
use axum::http::{header, HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::post;
use axum::{Json, Router};
use futures::stream;
use serde_json::{json, Value};

use chatwire_transport::{ChatClient, ChatConfig, ChatError, TransportMode, Turn};

use common::{metadata, spawn, Recorder};

fn is_stream_request(body: &Value) -> bool {
    body.get("stream").and_then(Value::as_bool).unwrap_or(false)
}

/// Backend whose answer depends on whether the request asked to stream.
fn backend<S, P>(recorder: Recorder, streamed: S, plain: P) -> Router
where
    S: Fn() -> Response + Clone + Send + Sync + 'static,
    P: Fn() -> Response + Clone + Send + Sync + 'static,
{
    Router::new().route(
        "/chat",
        post(move |headers: HeaderMap, Json(body): Json<Value>| {
            let recorder = recorder.clone();
            let streamed = streamed.clone();
            let plain = plain.clone();
            async move {
                recorder.record(&headers, &body);
                if is_stream_request(&body) {
                    streamed()
                } else {
                    plain()
                }
            }
        }),
    )
}

fn trigger_config(base: &str, streaming: bool) -> ChatConfig {
    ChatConfig {
        chat_trigger_url: Some(format!("{base}/chat")),
        webhook_url: Some(format!("{base}/unused-webhook")),
        streaming,
        ..ChatConfig::default()
    }
}

fn event_stream(chunks: Vec<&'static str>) -> Response {
    let body = Body::from_stream(stream::iter(
        chunks.into_iter().map(Ok::<_, Infallible>),
    ));
    ([(header::CONTENT_TYPE, "text/event-stream")], body).into_response()
}

fn json_reply(text: &str) -> Response {
    Json(json!({ "reply": text })).into_response()
}

#[tokio::test]
async fn test_non_streaming_envelope_and_reply() {
    let recorder = Recorder::default();
    let base = spawn(backend(
        recorder.clone(),
        || json_reply("unexpected stream"),
        || Json(json!({ "message": "hi from trigger" })).into_response(),
    ))
    .await;

    let client = ChatClient::new(&trigger_config(&base, false), "sid-7".into(), metadata());
    assert_eq!(client.mode(), TransportMode::ChatTrigger);

    let reply = client.send("hello", &[]).await.unwrap();
    assert_eq!(reply, "hi from trigger");
    assert_eq!(recorder.count(), 1);
    assert_eq!(
        recorder.body(0),
        json!({
            "action": "sendMessage",
            "chatInput": "hello",
            "sessionId": "sid-7",
            "metadata": { "path": "/cli", "userAgent": "chatwire-cli/test" },
        })
    );
    assert_eq!(recorder.header(0, "accept").as_deref(), Some("application/json"));
}

#[tokio::test]
async fn test_custom_field_names() {
    let recorder = Recorder::default();
    let base = spawn(backend(recorder.clone(), || json_reply("s"), || json_reply("ok"))).await;

    let mut config = trigger_config(&base, false);
    config.chat_input_key = "input".into();
    config.chat_session_key = "conversation".into();
    let client = ChatClient::new(&config, "sid".into(), metadata());
    client
        .send("q2", &[Turn::user("q1"), Turn::assistant("a1")])
        .await
        .unwrap();

    let body = recorder.body(0);
    assert_eq!(body["input"], "q2");
    assert_eq!(body["conversation"], "sid");
    assert_eq!(body["history"][0]["parts"][0]["text"], "q1");
}

#[tokio::test]
async fn test_streamed_reply_is_accumulated() {
    let recorder = Recorder::default();
    let base = spawn(backend(
        recorder.clone(),
        || event_stream(vec!["  Hel", "lo, ", "stream\n"]),
        || json_reply("fallback"),
    ))
    .await;

    let client = ChatClient::new(&trigger_config(&base, true), "sid".into(), metadata());
    let reply = client.send("hello", &[]).await.unwrap();

    assert_eq!(reply, "Hello, stream");
    assert_eq!(recorder.count(), 1);
    assert_eq!(recorder.body(0)["stream"], true);
}

#[tokio::test]
async fn test_plain_text_stream_is_accepted() {
    let recorder = Recorder::default();
    let base = spawn(backend(
        recorder.clone(),
        || ([(header::CONTENT_TYPE, "text/plain; charset=utf-8")], "chunked text").into_response(),
        || json_reply("fallback"),
    ))
    .await;

    let client = ChatClient::new(&trigger_config(&base, true), "sid".into(), metadata());
    assert_eq!(client.send("hello", &[]).await.unwrap(), "chunked text");
    assert_eq!(recorder.count(), 1);
}

#[tokio::test]
async fn test_stream_not_honored_decodes_directly() {
    let recorder = Recorder::default();
    let base = spawn(backend(
        recorder.clone(),
        || json_reply("answered without streaming"),
        || json_reply("fallback"),
    ))
    .await;

    let client = ChatClient::new(&trigger_config(&base, true), "sid".into(), metadata());
    let reply = client.send("hello", &[]).await.unwrap();

    assert_eq!(reply, "answered without streaming");
    assert_eq!(recorder.count(), 1);
}

#[tokio::test]
async fn test_empty_stream_falls_back() {
    let recorder = Recorder::default();
    let base = spawn(backend(
        recorder.clone(),
        || event_stream(vec![]),
        || json_reply("from fallback"),
    ))
    .await;

    let client = ChatClient::new(&trigger_config(&base, true), "sid".into(), metadata());
    let reply = client.send("hello", &[]).await.unwrap();

    assert_eq!(reply, "from fallback");
    assert_eq!(recorder.count(), 2);
    assert_eq!(recorder.body(0)["stream"], true);
    assert!(recorder.body(1).get("stream").is_none());
    assert_eq!(recorder.body(1)["chatInput"], "hello");
}

#[tokio::test]
async fn test_broken_stream_falls_back() {
    let recorder = Recorder::default();
    let base = spawn(backend(
        recorder.clone(),
        || {
            let chunks: Vec<Result<Bytes, std::io::Error>> = vec![
                Ok(Bytes::from_static(b"partial")),
                Err(std::io::Error::other("upstream died")),
            ];
            let body = Body::from_stream(stream::iter(chunks));
            ([(header::CONTENT_TYPE, "text/event-stream")], body).into_response()
        },
        || json_reply("recovered"),
    ))
    .await;

    let client = ChatClient::new(&trigger_config(&base, true), "sid".into(), metadata());
    let reply = client.send("hello", &[]).await.unwrap();

    assert_eq!(reply, "recovered");
    assert_eq!(recorder.count(), 2);
}

#[tokio::test]
async fn test_stream_error_status_falls_back() {
    let recorder = Recorder::default();
    let base = spawn(backend(
        recorder.clone(),
        || (StatusCode::BAD_REQUEST, "streaming not supported").into_response(),
        || json_reply("plain works"),
    ))
    .await;

    let client = ChatClient::new(&trigger_config(&base, true), "sid".into(), metadata());
    assert_eq!(client.send("hello", &[]).await.unwrap(), "plain works");
    assert_eq!(recorder.count(), 2);
}

#[tokio::test]
async fn test_fallback_failure_surfaces_without_third_request() {
    let recorder = Recorder::default();
    let base = spawn(backend(
        recorder.clone(),
        || event_stream(vec![]),
        || (StatusCode::SERVICE_UNAVAILABLE, "down").into_response(),
    ))
    .await;

    let client = ChatClient::new(&trigger_config(&base, true), "sid".into(), metadata());
    let err = client.send("hello", &[]).await.unwrap_err();

    assert!(
        matches!(err, ChatError::Transport { status: 503, ref body } if body == "down"),
        "got {err:?}"
    );
    assert_eq!(recorder.count(), 2);
}

#[tokio::test]
async fn test_non_streaming_error_is_not_retried() {
    let recorder = Recorder::default();
    let base = spawn(backend(
        recorder.clone(),
        || json_reply("s"),
        || (StatusCode::NOT_FOUND, "no such workflow").into_response(),
    ))
    .await;

    let client = ChatClient::new(&trigger_config(&base, false), "sid".into(), metadata());
    let err = client.send("hello", &[]).await.unwrap_err();

    assert_eq!(err.to_string(), "HTTP 404: no such workflow");
    assert_eq!(recorder.count(), 1);
}
