//! Configuração do pipeline lida de variáveis de ambiente.
//!
//! | Variável                  | Padrão                                        |
//! |---------------------------|-----------------------------------------------|
//! | `NER_ENGINE`              | `lexicon` (ou `hosted`)                       |
//! | `NER_MODEL`               | `dslim/bert-base-NER`                         |
//! | `NER_ENDPOINT`            | `https://api-inference.huggingface.co/models` |
//! | `HF_API_TOKEN`            | (nenhum)                                      |
//! | `NER_TIMEOUT_SECS`        | `30`                                          |
//! | `NER_CONTINUATION_MARKER` | `##`                                          |
//! | `NER_CONFIDENCE_MODE`     | `pairwise_mean` (ou `true_mean`)              |
//!
//! Valores inválidos viram [`NerError::Configuration`]; não há fallback silencioso.

use serde::{Deserialize, Serialize};

use crate::error::{NerError, NerResult};
use crate::merge::{ConfidenceMode, MergeConfig};

pub const DEFAULT_MODEL: &str = "dslim/bert-base-NER";
pub const DEFAULT_ENDPOINT: &str = "https://api-inference.huggingface.co/models";

/// Qual motor de inferência usar.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EngineKind {
    /// Motor léxico local ([`crate::lexicon::LexiconEngine`]).
    #[default]
    Lexicon,
    /// Endpoint HTTP ([`crate::hosted::HostedEngine`]).
    Hosted,
}

impl std::str::FromStr for EngineKind {
    type Err = NerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "lexicon" => Ok(EngineKind::Lexicon),
            "hosted" => Ok(EngineKind::Hosted),
            other => Err(NerError::Configuration(format!(
                "NER_ENGINE desconhecido: {other:?} (use lexicon ou hosted)"
            ))),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NerConfig {
    pub engine: EngineKind,
    pub model: String,
    pub endpoint: String,
    #[serde(skip_serializing)]
    pub api_token: Option<String>,
    pub timeout_secs: u64,
    pub merge: MergeConfig,
}

impl Default for NerConfig {
    fn default() -> Self {
        Self {
            engine: EngineKind::default(),
            model: DEFAULT_MODEL.to_string(),
            endpoint: DEFAULT_ENDPOINT.to_string(),
            api_token: None,
            timeout_secs: 30,
            merge: MergeConfig::default(),
        }
    }
}

impl NerConfig {
    /// Lê a configuração das variáveis de ambiente do processo.
    pub fn from_env() -> NerResult<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Lê a configuração a partir de uma função de consulta (ambiente, mapa de teste...).
    pub fn from_lookup<F>(lookup: F) -> NerResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(engine) = lookup("NER_ENGINE") {
            config.engine = engine.parse()?;
        }
        if let Some(model) = lookup("NER_MODEL") {
            config.model = model;
        }
        if let Some(endpoint) = lookup("NER_ENDPOINT") {
            config.endpoint = endpoint.trim_end_matches('/').to_string();
        }
        config.api_token = lookup("HF_API_TOKEN").filter(|t| !t.is_empty());

        if let Some(timeout) = lookup("NER_TIMEOUT_SECS") {
            config.timeout_secs = timeout
                .trim()
                .parse()
                .map_err(|_| NerError::Configuration(format!("NER_TIMEOUT_SECS inválido: {timeout:?}")))?;
        }
        if let Some(marker) = lookup("NER_CONTINUATION_MARKER") {
            config.merge.continuation_marker = marker;
        }
        if let Some(mode) = lookup("NER_CONFIDENCE_MODE") {
            config.merge.confidence = match mode.trim().to_lowercase().as_str() {
                "pairwise_mean" | "pairwise" => ConfidenceMode::PairwiseMean,
                "true_mean" | "mean" => ConfidenceMode::TrueMean,
                other => {
                    return Err(NerError::Configuration(format!(
                        "NER_CONFIDENCE_MODE desconhecido: {other:?}"
                    )))
                }
            };
        }

        Ok(config)
    }

    /// URL completa do modelo no endpoint.
    pub fn endpoint_url(&self) -> String {
        format!("{}/{}", self.endpoint, self.model)
    }
}
