//! # Motores de inferência
//!
//! O motor transforma texto em predições brutas por sub-palavra. É instanciado
//! uma vez no início do processo ([`build_engine`]) e injetado no pipeline; o
//! fusor de entidades não depende dele.

use std::sync::Arc;

use tracing::info;

use crate::config::{EngineKind, NerConfig};
use crate::error::NerResult;
use crate::hosted::HostedEngine;
use crate::lexicon::LexiconEngine;
use crate::prediction::RawTokenPrediction;

/// Fonte de predições por token.
///
/// Implementações devem devolver as predições na ordem do texto, com offsets em
/// caracteres. Falhas (endpoint fora do ar, resposta malformada) devem ser
/// reportadas como [`crate::NerError::UpstreamInference`].
pub trait InferenceEngine: Send + Sync {
    /// Nome curto para logs e UI.
    fn name(&self) -> &str;

    fn predict(&self, text: &str) -> NerResult<Vec<RawTokenPrediction>>;
}

/// Predições fixas, úteis em testes e para reproduzir saídas de um modelo.
#[derive(Debug, Clone, Default)]
pub struct StaticEngine {
    predictions: Vec<RawTokenPrediction>,
}

impl StaticEngine {
    pub fn new(predictions: Vec<RawTokenPrediction>) -> Self {
        Self { predictions }
    }
}

impl InferenceEngine for StaticEngine {
    fn name(&self) -> &str {
        "static"
    }

    fn predict(&self, _text: &str) -> NerResult<Vec<RawTokenPrediction>> {
        Ok(self.predictions.clone())
    }
}

/// Constrói o motor descrito pela configuração.
pub fn build_engine(config: &NerConfig) -> NerResult<Arc<dyn InferenceEngine>> {
    let engine: Arc<dyn InferenceEngine> = match config.engine {
        EngineKind::Lexicon => Arc::new(LexiconEngine::with_defaults()?),
        EngineKind::Hosted => Arc::new(HostedEngine::from_config(config)?),
    };
    info!("Motor de inferência carregado: {}", engine.name());
    Ok(engine)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_default_engine() {
        let engine = build_engine(&NerConfig::default()).unwrap();
        assert_eq!(engine.name(), "lexicon");
        assert!(!engine.predict("I live in Vienna").unwrap().is_empty());
    }

    #[test]
    fn test_build_hosted_engine() {
        let config = NerConfig {
            engine: EngineKind::Hosted,
            ..NerConfig::default()
        };
        let engine = build_engine(&config).unwrap();
        assert_eq!(engine.name(), "hosted");
    }

    #[test]
    fn test_static_engine_ignores_text() {
        let engine = StaticEngine::new(vec![RawTokenPrediction::new("Poli", "B-PER", 0.9, 11, 15)]);
        assert_eq!(engine.predict("qualquer coisa").unwrap().len(), 1);
    }
}
