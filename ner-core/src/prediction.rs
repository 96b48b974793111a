//! # Registros de predição e de entidade
//!
//! Tipos trocados entre o motor de inferência, o fusor e a camada de apresentação.
//! Os nomes no JSON seguem o formato dos pipelines de classificação de tokens
//! (`word`, `entity`, `score`, `start`, `end`), de modo que a saída de um endpoint
//! hospedado pode ser desserializada diretamente. Campos obrigatórios ausentes
//! resultam em erro, nunca em valor padrão.

use serde::{Deserialize, Serialize};

use crate::error::NerResult;
use crate::label::{label_kind, EntityCategory};

/// Predição bruta de um token (sub-palavra) emitida pelo motor de inferência.
///
/// As predições chegam na ordem do texto; `start_offset`/`end_offset` são
/// posições em caracteres no texto original.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawTokenPrediction {
    /// Fragmento do token (ex: "Deep", "##learning").
    #[serde(rename = "word")]
    pub text_fragment: String,
    /// Rótulo BIO (ex: "B-ORG", "I-ORG", "O").
    #[serde(rename = "entity")]
    pub label: String,
    /// Confiança do rótulo, em [0, 1].
    #[serde(rename = "score")]
    pub confidence: f64,
    #[serde(rename = "start")]
    pub start_offset: usize,
    #[serde(rename = "end")]
    pub end_offset: usize,
}

impl RawTokenPrediction {
    pub fn new(
        text_fragment: impl Into<String>,
        label: impl Into<String>,
        confidence: f64,
        start_offset: usize,
        end_offset: usize,
    ) -> Self {
        Self {
            text_fragment: text_fragment.into(),
            label: label.into(),
            confidence,
            start_offset,
            end_offset,
        }
    }

    /// Desserializa a lista JSON devolvida por um pipeline de classificação de tokens.
    pub fn list_from_json(json: &str) -> NerResult<Vec<Self>> {
        Ok(serde_json::from_str(json)?)
    }
}

/// Uma entidade contígua resultante da fusão de um ou mais tokens.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MergedEntity {
    /// Fragmentos concatenados, sem marcadores de continuação.
    #[serde(rename = "word")]
    pub text: String,
    /// Rótulo do primeiro token, com prefixo (ex: "B-PER").
    #[serde(rename = "entity")]
    pub label: String,
    #[serde(rename = "score")]
    pub confidence: f64,
    #[serde(rename = "start")]
    pub start_offset: usize,
    #[serde(rename = "end")]
    pub end_offset: usize,
}

impl MergedEntity {
    /// Abre uma entidade a partir de um único token, removendo o marcador de
    /// continuação do início do fragmento.
    pub fn from_prediction(token: &RawTokenPrediction, continuation_marker: &str) -> Self {
        Self {
            text: strip_marker(&token.text_fragment, continuation_marker).to_string(),
            label: token.label.clone(),
            confidence: token.confidence,
            start_offset: token.start_offset,
            end_offset: token.end_offset,
        }
    }

    /// Tipo da entidade sem prefixo (ex: "PER").
    pub fn kind(&self) -> Option<&str> {
        label_kind(&self.label)
    }

    /// Falso para registros `O` ou com rótulo malformado.
    pub fn is_entity(&self) -> bool {
        self.kind().is_some()
    }

    pub fn category(&self) -> Option<EntityCategory> {
        self.kind().and_then(EntityCategory::from_kind)
    }

    /// Reinterpreta a entidade como uma predição bruta (útil para re-fundir).
    pub fn to_prediction(&self) -> RawTokenPrediction {
        RawTokenPrediction {
            text_fragment: self.text.clone(),
            label: self.label.clone(),
            confidence: self.confidence,
            start_offset: self.start_offset,
            end_offset: self.end_offset,
        }
    }
}

/// Resposta da análise: o texto original intacto e as entidades em ordem.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NerOutput {
    pub text: String,
    pub entities: Vec<MergedEntity>,
}

impl NerOutput {
    /// Mantém apenas registros com tipo de entidade (descarta `O`).
    pub fn entities_only(mut self) -> Self {
        self.entities.retain(MergedEntity::is_entity);
        self
    }
}

/// Remove o marcador de continuação do início do fragmento.
/// Um marcador vazio desativa a remoção.
pub(crate) fn strip_marker<'a>(fragment: &'a str, marker: &str) -> &'a str {
    if marker.is_empty() {
        return fragment;
    }
    fragment.strip_prefix(marker).unwrap_or(fragment)
}
