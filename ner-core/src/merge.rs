//! # Fusão de sub-palavras em entidades
//!
//! Tokenizadores WordPiece quebram palavras raras em pedaços ("Deep", "##learning",
//! "##AI") e o modelo rotula cada pedaço separadamente. Este módulo reconstrói as
//! entidades contíguas numa única passada da esquerda para a direita, mantendo um
//! acumulador com a entidade "atual".
//!
//! Um token **continua** o acumulador se, e somente se:
//! - existe um acumulador aberto;
//! - o rótulo do token é `I-<TIPO>`;
//! - o tipo do acumulador (sufixo após o seu prefixo) é igual a `<TIPO>`.
//!
//! Caso contrário o acumulador é fechado e um novo é aberto a partir do token.
//! Tokens `O` viram registros próprios (quem quiser só entidades filtra depois) e
//! um `I-X` sem acumulador compatível abre uma entidade nova.
//!
//! ## Confiança
//! Por padrão a confiança é a média **par a par** com o valor acumulado:
//! `conf = (conf + t.conf) / 2`. Para entidades com 3+ tokens isso pondera mais
//! os últimos tokens. [`ConfidenceMode::TrueMean`] troca pela média aritmética
//! de todos os tokens da entidade.

use serde::{Deserialize, Serialize};

use crate::label::{open_kind, parse_label};
use crate::prediction::{strip_marker, MergedEntity, RawTokenPrediction};

/// Marcador de continuação do WordPiece (BERT).
pub const DEFAULT_CONTINUATION_MARKER: &str = "##";

/// Como agregar a confiança dos tokens fundidos.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConfidenceMode {
    /// Média com o valor acumulado a cada token (ponderada pela recência).
    #[default]
    PairwiseMean,
    /// Média aritmética de todos os tokens da entidade.
    TrueMean,
}

/// Parâmetros do fusor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MergeConfig {
    /// Prefixo que indica "colado à palavra anterior". Vazio desativa a remoção.
    pub continuation_marker: String,
    pub confidence: ConfidenceMode,
}

impl Default for MergeConfig {
    fn default() -> Self {
        Self {
            continuation_marker: DEFAULT_CONTINUATION_MARKER.to_string(),
            confidence: ConfidenceMode::default(),
        }
    }
}

/// Decisão tomada para um token durante a passada.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum MergeStep {
    /// O token abriu a entidade `entity_index`.
    Opened { token_index: usize, entity_index: usize },
    /// O token foi anexado à entidade `entity_index`.
    Continued { token_index: usize, entity_index: usize },
}

/// Entidade em construção.
struct Accumulator {
    entity: MergedEntity,
    confidence_sum: f64,
    count: usize,
}

/// O fusor de entidades. Sem estado entre chamadas: cada `merge` aloca o próprio
/// acumulador, então uma instância pode ser compartilhada entre threads.
#[derive(Debug, Clone, Default)]
pub struct EntityMerger {
    config: MergeConfig,
}

impl EntityMerger {
    pub fn new(config: MergeConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &MergeConfig {
        &self.config
    }

    /// Funde a sequência de predições em entidades, preservando a ordem.
    pub fn merge(&self, tokens: &[RawTokenPrediction]) -> Vec<MergedEntity> {
        self.merge_observed(tokens, |_| {})
    }

    /// Igual a [`merge`](Self::merge), reportando cada decisão a `on_step`.
    pub fn merge_observed<F>(&self, tokens: &[RawTokenPrediction], mut on_step: F) -> Vec<MergedEntity>
    where
        F: FnMut(MergeStep),
    {
        let marker = self.config.continuation_marker.as_str();
        let mut merged: Vec<MergedEntity> = Vec::new();
        let mut current: Option<Accumulator> = None;

        for (token_index, token) in tokens.iter().enumerate() {
            match current.as_mut() {
                Some(acc) if continues(&acc.entity.label, &token.label) => {
                    acc.entity.text.push_str(strip_marker(&token.text_fragment, marker));
                    acc.entity.end_offset = token.end_offset;
                    acc.confidence_sum += token.confidence;
                    acc.count += 1;
                    acc.entity.confidence = match self.config.confidence {
                        ConfidenceMode::PairwiseMean => (acc.entity.confidence + token.confidence) / 2.0,
                        ConfidenceMode::TrueMean => acc.confidence_sum / acc.count as f64,
                    };
                    on_step(MergeStep::Continued {
                        token_index,
                        entity_index: merged.len(),
                    });
                }
                _ => {
                    if let Some(done) = current.take() {
                        merged.push(done.entity);
                    }
                    current = Some(Accumulator {
                        entity: MergedEntity::from_prediction(token, marker),
                        confidence_sum: token.confidence,
                        count: 1,
                    });
                    on_step(MergeStep::Opened {
                        token_index,
                        entity_index: merged.len(),
                    });
                }
            }
        }

        if let Some(done) = current {
            merged.push(done.entity);
        }
        merged
    }
}

/// `next` continua uma entidade rotulada `current`?
///
/// Só um `I-<TIPO>` continua; o tipo do acumulador é o rótulo sem `B-`/`I-`,
/// ou o rótulo inteiro quando ele não tem prefixo.
fn continues(current: &str, next: &str) -> bool {
    let next = parse_label(next);
    match next.kind {
        Some(kind) if next.is_continuation() => open_kind(current) == kind,
        _ => false,
    }
}

/// Atalho com a configuração padrão (marcador `##`, média par a par).
pub fn merge_tokens(tokens: &[RawTokenPrediction]) -> Vec<MergedEntity> {
    EntityMerger::default().merge(tokens)
}
