use std::sync::Arc;

use axum::body::{to_bytes, Body};
use axum::http::{header, Request, StatusCode};
use axum::Router;
use ner_spans::{EntityMerger, NerPipeline, PipelineEvent, RawTokenPrediction, StaticEngine};
use ner_spans_web::{collect_events, config::default_static_dir, create_router, websocket_text, AppState};
use serde_json::{json, Value};
use tower::ServiceExt;

fn lexicon_app() -> Router {
    let pipeline = NerPipeline::with_lexicon().expect("pipeline");
    create_router(AppState::new(pipeline), default_static_dir())
}

fn static_app(predictions: Vec<RawTokenPrediction>) -> Router {
    let pipeline = NerPipeline::new(Arc::new(StaticEngine::new(predictions)), EntityMerger::default());
    create_router(AppState::new(pipeline), default_static_dir())
}

async fn post_json(app: Router, uri: &str, body: Value) -> (StatusCode, Value) {
    let request = Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap();
    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    (status, serde_json::from_slice(&bytes).unwrap())
}

async fn get(app: Router, uri: &str) -> (StatusCode, String) {
    let request = Request::builder().uri(uri).body(Body::empty()).unwrap();
    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    (status, String::from_utf8(bytes.to_vec()).unwrap())
}

#[tokio::test]
async fn analyze_returns_text_and_merged_entities() {
    let text = "My name is Andrew, I'm building DeeplearningAI and I live in California";
    let (status, body) = post_json(lexicon_app(), "/analyze", json!({ "text": text })).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["text"], text);
    assert_eq!(body.as_object().unwrap().len(), 2);

    let entities = body["entities"].as_array().unwrap();
    let words: Vec<&str> = entities.iter().map(|e| e["word"].as_str().unwrap()).collect();
    assert_eq!(words, ["Andrew", "DeeplearningAI", "California"]);
    assert_eq!(entities[1]["entity"], "B-ORG");
    assert_eq!(entities[1]["start"], 32);
    assert_eq!(entities[1]["end"], 46);
}

#[tokio::test]
async fn blank_text_yields_no_entities() {
    for text in ["", "   "] {
        let (status, body) = post_json(lexicon_app(), "/analyze", json!({ "text": text })).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({ "text": text, "entities": [] }));
    }
}

#[tokio::test]
async fn empty_batch_is_rejected() {
    let (status, body) = post_json(lexicon_app(), "/analyze/batch", json!({ "texts": [] })).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["code"], "BAD_REQUEST");
}

#[tokio::test]
async fn entities_only_drops_outside_records() {
    let app = static_app(vec![
        RawTokenPrediction::new("Hi", "O", 0.99, 0, 2),
        RawTokenPrediction::new("Poli", "B-PER", 0.98, 3, 7),
    ]);
    let (_, all) = post_json(app.clone(), "/analyze", json!({ "text": "Hi Poli" })).await;
    assert_eq!(all["entities"].as_array().unwrap().len(), 2);

    let (_, only) = post_json(app, "/analyze", json!({ "text": "Hi Poli", "entities_only": true })).await;
    let entities = only["entities"].as_array().unwrap();
    assert_eq!(entities.len(), 1);
    assert_eq!(entities[0]["word"], "Poli");
}

#[tokio::test]
async fn upstream_failure_maps_to_bad_gateway() {
    let app = static_app(vec![
        RawTokenPrediction::new("Vienna", "B-LOC", 0.9, 27, 33),
        RawTokenPrediction::new("Poli", "B-PER", 0.9, 11, 15),
    ]);
    let (status, body) = post_json(
        app,
        "/analyze",
        json!({ "text": "My name is Poli, I live in Vienna" }),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_GATEWAY);
    assert_eq!(body["error"]["code"], "UPSTREAM_INFERENCE");
}

#[tokio::test]
async fn batch_reports_each_text() {
    let (status, body) = post_json(
        lexicon_app(),
        "/analyze/batch",
        json!({ "texts": ["I live in Vienna", "My name is Poli"], "entities_only": true }),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let items = body.as_array().unwrap();
    assert_eq!(items.len(), 2);
    assert_eq!(items[0]["output"]["entities"][0]["word"], "Vienna");
    assert_eq!(items[1]["output"]["entities"][0]["word"], "Poli");
    assert!(items[0].get("error").is_none());
}

#[tokio::test]
async fn index_page_lists_examples() {
    let (status, html) = get(lexicon_app(), "/").await;
    assert_eq!(status, StatusCode::OK);
    assert!(html.contains("Named Entity Recognition"));
    assert!(html.contains("work at HuggingFace"));
    assert!(html.contains("lexicon"));
}

#[tokio::test]
async fn examples_and_health() {
    let (status, body) = get(lexicon_app(), "/examples").await;
    assert_eq!(status, StatusCode::OK);
    let examples: Vec<String> = serde_json::from_str(&body).unwrap();
    assert_eq!(examples.len(), 2);

    let (status, body) = get(lexicon_app(), "/health").await;
    assert_eq!(status, StatusCode::OK);
    let health: Value = serde_json::from_str(&body).unwrap();
    assert_eq!(health["status"], "ok");
    assert_eq!(health["engine"], "lexicon");
}

#[tokio::test]
async fn static_assets_are_served() {
    let (status, js) = get(lexicon_app(), "/static/app.js").await;
    assert_eq!(status, StatusCode::OK);
    assert!(js.contains("/analyze"));
}

#[test]
fn websocket_accepts_json_or_raw_text() {
    assert_eq!(websocket_text(r#"{"text":"I live in Vienna"}"#).as_deref(), Some("I live in Vienna"));
    assert_eq!(websocket_text("I live in Vienna").as_deref(), Some("I live in Vienna"));
    assert_eq!(websocket_text(r#"{"other":1}"#).as_deref(), Some(r#"{"other":1}"#));
    assert_eq!(websocket_text(""), None);
    assert_eq!(websocket_text("  \n"), None);
    assert_eq!(websocket_text(r#"{"text":"   "}"#), None);
}

#[test]
fn websocket_events_follow_merge_order() {
    let pipeline = NerPipeline::new(
        Arc::new(StaticEngine::new(vec![
            RawTokenPrediction::new("Hu", "B-ORG", 0.9, 9, 11),
            RawTokenPrediction::new("##gging", "I-ORG", 0.8, 11, 16),
            RawTokenPrediction::new("Face", "I-ORG", 0.7, 17, 21),
        ])),
        EntityMerger::default(),
    );
    let events = collect_events(&pipeline, "I work at Hugging Face");

    assert_eq!(events.len(), 5);
    assert!(matches!(&events[0], PipelineEvent::PredictionsReceived { total: 3, .. }));
    let steps: Vec<(usize, bool)> = events[1..4]
        .iter()
        .map(|e| match e {
            PipelineEvent::TokenMerged { token_index, continued, .. } => (*token_index, *continued),
            other => panic!("evento inesperado: {other:?}"),
        })
        .collect();
    assert_eq!(steps, [(0, false), (1, true), (2, true)]);
    match &events[4] {
        PipelineEvent::Done { entities, total_tokens, .. } => {
            assert_eq!(*total_tokens, 3);
            assert_eq!(entities.len(), 1);
            assert_eq!(entities[0].text, "HuggingFace");
        }
        other => panic!("evento inesperado: {other:?}"),
    }
}

#[test]
fn websocket_reports_upstream_failure_as_error_event() {
    let pipeline = NerPipeline::new(
        Arc::new(StaticEngine::new(vec![RawTokenPrediction::new("Vienna", "B-LOC", 0.9, 10, 60)])),
        EntityMerger::default(),
    );
    let events = collect_events(&pipeline, "I live in Vienna");
    assert_eq!(events.len(), 1);
    assert!(matches!(&events[0], PipelineEvent::Error { .. }));
}

#[tokio::test]
async fn websocket_route_requires_upgrade() {
    let (status, _) = get(lexicon_app(), "/ws").await;
    assert!(status.is_client_error());
}
