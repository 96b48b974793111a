//! # Motor hospedado
//!
//! Envia o texto para um endpoint de classificação de tokens (API de inferência
//! do Hugging Face ou um servidor compatível) e desserializa a lista de
//! predições. Pede `aggregation_strategy: none` para receber as sub-palavras
//! cruas; a fusão fica por conta do [`crate::merge::EntityMerger`].

use std::time::Duration;

use reqwest::blocking::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::config::NerConfig;
use crate::engine::InferenceEngine;
use crate::error::{NerError, NerResult};
use crate::prediction::RawTokenPrediction;

#[derive(Debug, Serialize)]
struct HostedRequest<'a> {
    inputs: &'a str,
    parameters: HostedParameters,
}

#[derive(Debug, Serialize)]
struct HostedParameters {
    aggregation_strategy: &'static str,
}

/// Corpo de erro do endpoint (ex: modelo ainda carregando).
#[derive(Debug, Deserialize)]
struct HostedError {
    error: String,
    #[serde(default)]
    estimated_time: Option<f64>,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum HostedResponse {
    Predictions(Vec<RawTokenPrediction>),
    Error(HostedError),
}

/// Cliente do endpoint de inferência.
#[derive(Debug, Clone)]
pub struct HostedEngine {
    url: String,
    model: String,
    api_token: Option<String>,
    timeout: Duration,
}

impl HostedEngine {
    pub fn new(url: impl Into<String>, model: impl Into<String>, api_token: Option<String>, timeout: Duration) -> Self {
        Self {
            url: url.into(),
            model: model.into(),
            api_token,
            timeout,
        }
    }

    pub fn from_config(config: &NerConfig) -> NerResult<Self> {
        if config.model.trim().is_empty() {
            return Err(NerError::Configuration("NER_MODEL vazio".to_string()));
        }
        Ok(Self::new(
            config.endpoint_url(),
            config.model.clone(),
            config.api_token.clone(),
            Duration::from_secs(config.timeout_secs),
        ))
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

impl InferenceEngine for HostedEngine {
    fn name(&self) -> &str {
        "hosted"
    }

    fn predict(&self, text: &str) -> NerResult<Vec<RawTokenPrediction>> {
        // O cliente bloqueante tem runtime próprio e não pode ser criado nem
        // descartado dentro de um contexto async; vive só durante a chamada.
        let client = Client::builder()
            .timeout(self.timeout)
            .build()
            .map_err(|e| NerError::upstream(format!("falha ao criar cliente HTTP: {e}")))?;

        let mut request = client.post(&self.url).json(&HostedRequest {
            inputs: text,
            parameters: HostedParameters {
                aggregation_strategy: "none",
            },
        });
        if let Some(token) = &self.api_token {
            request = request.bearer_auth(token);
        }

        debug!("POST {} ({} chars)", self.url, text.chars().count());
        let response = request
            .send()
            .map_err(|e| NerError::upstream(format!("falha ao chamar {}: {e}", self.url)))?;

        let status = response.status();
        let body = response
            .text()
            .map_err(|e| NerError::upstream(format!("falha ao ler resposta: {e}")))?;

        if !status.is_success() {
            warn!("endpoint de inferência respondeu {status}");
            return Err(match parse_hosted_response(&body) {
                Err(e) => e,
                Ok(_) => NerError::upstream(format!("endpoint respondeu {status}")),
            });
        }
        parse_hosted_response(&body)
    }
}

/// Interpreta o corpo devolvido pelo endpoint.
pub fn parse_hosted_response(body: &str) -> NerResult<Vec<RawTokenPrediction>> {
    let parsed: HostedResponse = serde_json::from_str(body)
        .map_err(|e| NerError::upstream(format!("resposta de inferência malformada: {e}")))?;

    match parsed {
        HostedResponse::Predictions(predictions) => Ok(predictions),
        HostedResponse::Error(HostedError { error, estimated_time }) => Err(NerError::upstream(match estimated_time {
            Some(secs) => format!("{error} (disponível em ~{secs:.0}s)"),
            None => error,
        })),
    }
}
