//! # Pipeline NER — Orquestrador com Eventos Observáveis
//!
//! Conecta o motor de inferência ao fusor de entidades:
//!
//! texto → [motor] → predições por sub-palavra → [validação] → [fusor] → `{text, entities}`
//!
//! Além da chamada síncrona, o pipeline emite eventos por um canal (`mpsc`) para
//! que o servidor WebSocket mostre a fusão passo a passo no navegador.

use std::sync::mpsc;
use std::sync::Arc;
use std::time::Instant;

use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::config::NerConfig;
use crate::engine::{build_engine, InferenceEngine};
use crate::error::NerResult;
use crate::lexicon::LexiconEngine;
use crate::merge::{EntityMerger, MergeConfig, MergeStep};
use crate::prediction::{MergedEntity, NerOutput, RawTokenPrediction};
use crate::validate::validate_predictions;

/// Eventos emitidos pelo pipeline durante o processamento.
///
/// Cada variante carrega os dados para renderizar uma etapa da visualização.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", content = "data")]
pub enum PipelineEvent {
    /// **Passo 1**: o motor devolveu as predições (já validadas).
    PredictionsReceived {
        engine: String,
        tokens: Vec<RawTokenPrediction>,
        total: usize,
    },
    /// **Passo 2**: decisão do fusor para um token.
    TokenMerged {
        token_index: usize,
        entity_index: usize,
        text_fragment: String,
        label: String,
        /// `true` se o token foi anexado à entidade aberta.
        continued: bool,
    },
    /// **Conclusão**: entidades finais e estatísticas.
    Done {
        text: String,
        entities: Vec<MergedEntity>,
        total_tokens: usize,
        processing_ms: u64,
    },
    /// **Falha**: o motor falhou ou devolveu predições inconsistentes.
    Error {
        message: String,
    },
}

/// O pipeline NER principal.
///
/// O motor é compartilhado (`Arc`) e carregado uma única vez; o fusor não guarda
/// estado entre chamadas, então o pipeline pode ser usado por várias threads.
#[derive(Clone)]
pub struct NerPipeline {
    engine: Arc<dyn InferenceEngine>,
    merger: EntityMerger,
}

impl NerPipeline {
    pub fn new(engine: Arc<dyn InferenceEngine>, merger: EntityMerger) -> Self {
        Self { engine, merger }
    }

    /// Pipeline com o motor léxico padrão e fusor padrão.
    pub fn with_lexicon() -> NerResult<Self> {
        Ok(Self::new(
            Arc::new(LexiconEngine::with_defaults()?),
            EntityMerger::new(MergeConfig::default()),
        ))
    }

    pub fn from_config(config: &NerConfig) -> NerResult<Self> {
        Ok(Self::new(build_engine(config)?, EntityMerger::new(config.merge.clone())))
    }

    pub fn engine_name(&self) -> &str {
        self.engine.name()
    }

    pub fn merger(&self) -> &EntityMerger {
        &self.merger
    }

    /// Chama o motor e valida o resultado.
    fn predict(&self, text: &str) -> NerResult<Vec<RawTokenPrediction>> {
        let tokens = self.engine.predict(text)?;
        validate_predictions(text, &tokens)?;
        Ok(tokens)
    }

    /// Analisa o texto e devolve o texto original com as entidades fundidas.
    pub fn analyze(&self, text: &str) -> NerResult<NerOutput> {
        let tokens = self.predict(text)?;
        let entities = self.merger.merge(&tokens);
        debug!("{} tokens → {} entidades", tokens.len(), entities.len());
        Ok(NerOutput {
            text: text.to_string(),
            entities,
        })
    }

    /// Analisa vários textos em paralelo. A ordem dos resultados segue a entrada.
    pub fn analyze_batch(&self, texts: &[String]) -> Vec<NerResult<NerOutput>> {
        texts.par_iter().map(|text| self.analyze(text)).collect()
    }

    /// Executa o pipeline enviando eventos de progresso pelo canal `tx`.
    ///
    /// # Fluxo de Eventos
    /// 1. `PredictionsReceived`: saída do motor.
    /// 2. `TokenMerged` (loop): decisão do fusor para cada token.
    /// 3. `Done`: resultado final; ou `Error` se o motor falhar.
    pub fn analyze_streaming(&self, text: &str, tx: mpsc::Sender<PipelineEvent>) {
        let start = Instant::now();

        let tokens = match self.predict(text) {
            Ok(tokens) => tokens,
            Err(e) => {
                warn!("falha na análise: {e}");
                let _ = tx.send(PipelineEvent::Error { message: e.to_string() });
                return;
            }
        };

        let _ = tx.send(PipelineEvent::PredictionsReceived {
            engine: self.engine.name().to_string(),
            tokens: tokens.clone(),
            total: tokens.len(),
        });

        let entities = self.merger.merge_observed(&tokens, |step| {
            let (token_index, entity_index, continued) = match step {
                MergeStep::Opened { token_index, entity_index } => (token_index, entity_index, false),
                MergeStep::Continued { token_index, entity_index } => (token_index, entity_index, true),
            };
            let token = &tokens[token_index];
            let _ = tx.send(PipelineEvent::TokenMerged {
                token_index,
                entity_index,
                text_fragment: token.text_fragment.clone(),
                label: token.label.clone(),
                continued,
            });
        });

        let _ = tx.send(PipelineEvent::Done {
            text: text.to_string(),
            entities,
            total_tokens: tokens.len(),
            processing_ms: start.elapsed().as_millis() as u64,
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::StaticEngine;
    use crate::merge::ConfidenceMode;

    fn static_pipeline(predictions: Vec<RawTokenPrediction>) -> NerPipeline {
        NerPipeline::new(Arc::new(StaticEngine::new(predictions)), EntityMerger::default())
    }

    #[test]
    fn test_pipeline_demo_sentence() {
        let pipeline = NerPipeline::with_lexicon().unwrap();
        let text = "My name is Poli, I live in Vienna and work at HuggingFace";
        let output = pipeline.analyze(text).unwrap();

        assert_eq!(output.text, text);
        let words: Vec<(&str, &str)> = output
            .entities
            .iter()
            .map(|e| (e.text.as_str(), e.label.as_str()))
            .collect();
        assert_eq!(
            words,
            vec![("Poli", "B-PER"), ("Vienna", "B-LOC"), ("HuggingFace", "B-ORG")]
        );
        let hf = &output.entities[2];
        assert_eq!((hf.start_offset, hf.end_offset), (46, 57));
    }

    #[test]
    fn test_pipeline_empty() {
        let pipeline = NerPipeline::with_lexicon().unwrap();
        let output = pipeline.analyze("").unwrap();
        assert_eq!(output.text, "");
        assert!(output.entities.is_empty());
    }

    #[test]
    fn test_upstream_disorder_is_reported() {
        let pipeline = static_pipeline(vec![
            RawTokenPrediction::new("Vienna", "B-LOC", 0.9, 27, 33),
            RawTokenPrediction::new("Poli", "B-PER", 0.9, 11, 15),
        ]);
        let err = pipeline
            .analyze("My name is Poli, I live in Vienna")
            .unwrap_err();
        assert!(err.is_upstream());
    }

    #[test]
    fn test_from_config_uses_merge_settings() {
        let mut config = NerConfig::default();
        config.merge.confidence = ConfidenceMode::TrueMean;
        let pipeline = NerPipeline::from_config(&config).unwrap();
        assert_eq!(pipeline.engine_name(), "lexicon");
        assert_eq!(pipeline.merger().config().confidence, ConfidenceMode::TrueMean);
    }

    #[test]
    fn test_batch_keeps_order() {
        let pipeline = NerPipeline::with_lexicon().unwrap();
        let texts: Vec<String> = ["I live in Vienna", "", "My name is Andrew"]
            .iter()
            .map(|s| s.to_string())
            .collect();
        let results = pipeline.analyze_batch(&texts);
        assert_eq!(results.len(), 3);
        for (text, result) in texts.iter().zip(&results) {
            assert_eq!(&result.as_ref().unwrap().text, text);
        }
        assert_eq!(results[2].as_ref().unwrap().entities[0].text, "Andrew");
    }

    #[test]
    fn test_pipeline_events_streaming() {
        let pipeline = NerPipeline::with_lexicon().unwrap();
        let (tx, rx) = mpsc::channel();
        pipeline.analyze_streaming("I'm building DeeplearningAI", tx);

        let events: Vec<PipelineEvent> = rx.try_iter().collect();
        assert!(
            matches!(&events[0], PipelineEvent::PredictionsReceived { total: 3, .. }),
            "Primeiro evento deve ser PredictionsReceived"
        );
        let continued = events
            .iter()
            .filter(|e| matches!(e, PipelineEvent::TokenMerged { continued: true, .. }))
            .count();
        assert_eq!(continued, 2);
        match events.last().unwrap() {
            PipelineEvent::Done { entities, total_tokens, .. } => {
                assert_eq!(*total_tokens, 3);
                assert_eq!(entities.len(), 1);
                assert_eq!(entities[0].text, "DeeplearningAI");
            }
            other => panic!("Último evento deve ser Done, veio {other:?}"),
        }
    }

    #[test]
    fn test_streaming_error_event() {
        let pipeline = static_pipeline(vec![RawTokenPrediction::new("x", "B-PER", 2.0, 0, 1)]);
        let (tx, rx) = mpsc::channel();
        pipeline.analyze_streaming("x", tx);
        let events: Vec<PipelineEvent> = rx.try_iter().collect();
        assert_eq!(events.len(), 1);
        assert!(matches!(events[0], PipelineEvent::Error { .. }));
    }
}
