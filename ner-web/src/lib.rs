//! Servidor Axum que destaca entidades nomeadas no texto: formulário HTML,
//! API JSON e WebSocket com a fusão de sub-palavras passo a passo.

pub mod config;
pub mod error;

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;

use askama::Template;
use axum::{
    extract::{
        ws::{Message, WebSocket, WebSocketUpgrade},
        State,
    },
    response::{Html, IntoResponse, Json},
    routing::{get, post},
    Router,
};
use ner_spans::{demo, EntityCategory, NerOutput, NerPipeline, PipelineEvent};
use serde::{Deserialize, Serialize};
use tower_http::cors::{Any, CorsLayer};
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

use crate::error::{ApiError, ApiResult};

/// Estado compartilhado da aplicação
pub struct AppState {
    pub pipeline: NerPipeline,
}

impl AppState {
    pub fn new(pipeline: NerPipeline) -> Arc<Self> {
        Arc::new(Self { pipeline })
    }
}

#[derive(Deserialize)]
pub struct AnalyzeRequest {
    pub text: String,
    /// Descarta registros `O` da resposta.
    #[serde(default)]
    pub entities_only: bool,
}

#[derive(Deserialize)]
pub struct BatchRequest {
    pub texts: Vec<String>,
    #[serde(default)]
    pub entities_only: bool,
}

#[derive(Serialize)]
pub struct BatchItem {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub output: Option<NerOutput>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[derive(Serialize)]
struct CategoryView {
    name: &'static str,
    color: &'static str,
    icon: &'static str,
}

#[derive(Template)]
#[template(path = "index.html")]
struct IndexTemplate {
    title: &'static str,
    description: String,
    engine: String,
    examples: Vec<&'static str>,
    categories: Vec<CategoryView>,
}

/// Monta o roteador com todas as rotas.
pub fn create_router(state: Arc<AppState>, static_dir: PathBuf) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/", get(index_handler))
        .route("/analyze", post(analyze_handler))
        .route("/analyze/batch", post(batch_handler))
        .route("/examples", get(examples_handler))
        .route("/health", get(health_handler))
        .route("/ws", get(ws_handler))
        .nest_service("/static", ServeDir::new(static_dir))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

/// Página principal: formulário, exemplos e legenda de categorias
async fn index_handler(State(state): State<Arc<AppState>>) -> ApiResult<Html<String>> {
    let page = IndexTemplate {
        title: demo::TITLE,
        description: demo::description(),
        engine: state.pipeline.engine_name().to_string(),
        examples: demo::demo_texts(),
        categories: EntityCategory::ALL
            .iter()
            .map(|c| CategoryView {
                name: c.name(),
                color: c.color(),
                icon: c.icon(),
            })
            .collect(),
    };
    Ok(Html(page.render()?))
}

/// Análise NER via HTTP POST (sem streaming)
async fn analyze_handler(
    State(state): State<Arc<AppState>>,
    Json(req): Json<AnalyzeRequest>,
) -> ApiResult<Json<NerOutput>> {
    let AnalyzeRequest { text, entities_only } = req;
    if text.trim().is_empty() {
        return Ok(Json(NerOutput { text, entities: Vec::new() }));
    }

    let started = Instant::now();
    let chars = text.chars().count();
    let output = tokio::task::spawn_blocking(move || state.pipeline.analyze(&text)).await??;
    info!(
        "analisados {} chars → {} entidades em {}ms",
        chars,
        output.entities.len(),
        started.elapsed().as_millis()
    );

    Ok(Json(if entities_only { output.entities_only() } else { output }))
}

/// Vários textos em uma requisição; falhas são reportadas por item.
async fn batch_handler(
    State(state): State<Arc<AppState>>,
    Json(req): Json<BatchRequest>,
) -> ApiResult<Json<Vec<BatchItem>>> {
    if req.texts.is_empty() {
        return Err(ApiError::bad_request("Lista de textos vazia"));
    }

    let entities_only = req.entities_only;
    let results = tokio::task::spawn_blocking(move || state.pipeline.analyze_batch(&req.texts)).await?;

    let items = results
        .into_iter()
        .map(|result| match result {
            Ok(output) => BatchItem {
                output: Some(if entities_only { output.entities_only() } else { output }),
                error: None,
            },
            Err(e) => BatchItem {
                output: None,
                error: Some(e.to_string()),
            },
        })
        .collect();
    Ok(Json(items))
}

/// Retorna os textos de demonstração
async fn examples_handler() -> impl IntoResponse {
    Json(demo::demo_texts())
}

async fn health_handler(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "ok",
        "engine": state.pipeline.engine_name(),
    }))
}

/// Upgrade HTTP → WebSocket
async fn ws_handler(ws: WebSocketUpgrade, State(state): State<Arc<AppState>>) -> impl IntoResponse {
    ws.on_upgrade(move |socket| handle_websocket(socket, state))
}

/// Mensagem WebSocket recebida do cliente
#[derive(Deserialize)]
struct WsRequest {
    text: String,
}

/// Texto a analisar de uma mensagem WebSocket: `{"text": ...}` ou texto puro.
///
/// Mensagens em branco retornam `None` e são ignoradas.
pub fn websocket_text(raw: &str) -> Option<String> {
    let text = serde_json::from_str::<WsRequest>(raw)
        .map(|req| req.text)
        .unwrap_or_else(|_| raw.to_string());
    (!text.trim().is_empty()).then_some(text)
}

/// Executa o pipeline em modo streaming e coleta os eventos na ordem emitida.
///
/// Bloqueante: o motor hospedado faz HTTP síncrono.
pub fn collect_events(pipeline: &NerPipeline, text: &str) -> Vec<PipelineEvent> {
    let (tx, rx) = std::sync::mpsc::channel::<PipelineEvent>();
    pipeline.analyze_streaming(text, tx);
    rx.try_iter().collect()
}

/// Recebe texto, executa o pipeline e envia os eventos da fusão
async fn handle_websocket(mut socket: WebSocket, state: Arc<AppState>) {
    info!("WebSocket conectado");

    while let Some(Ok(msg)) = socket.recv().await {
        match msg {
            Message::Text(raw) => {
                let Some(text) = websocket_text(&raw) else {
                    continue;
                };

                let worker = Arc::clone(&state);
                let events = match tokio::task::spawn_blocking(move || collect_events(&worker.pipeline, &text)).await {
                    Ok(events) => events,
                    Err(e) => {
                        warn!("análise via WebSocket abortada: {e}");
                        return;
                    }
                };

                for event in &events {
                    let Ok(json) = serde_json::to_string(event) else {
                        continue;
                    };
                    if socket.send(Message::Text(json)).await.is_err() {
                        return; // cliente desconectou
                    }
                    // Pausa curta para a animação passo a passo
                    tokio::time::sleep(tokio::time::Duration::from_millis(35)).await;
                }
            }
            Message::Close(_) => {
                info!("WebSocket desconectado");
                return;
            }
            _ => {}
        }
    }
}
