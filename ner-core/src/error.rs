//! # Erros do pipeline NER
//!
//! O fusor de entidades ([`crate::merge`]) é uma função total e nunca falha.
//! Os erros deste módulo vêm das bordas: o motor de inferência (upstream),
//! a configuração lida do ambiente e a (de)serialização dos registros.

use thiserror::Error;

/// Alias de resultado para as operações do crate.
pub type NerResult<T> = Result<T, NerError>;

/// Erro principal do pipeline.
#[derive(Error, Debug)]
pub enum NerError {
    /// O motor de inferência falhou ou devolveu predições inconsistentes
    /// (offsets fora de ordem, score inválido, endpoint indisponível...).
    #[error("falha na inferência upstream: {message}")]
    UpstreamInference {
        message: String,
        /// Índice do token problemático, quando conhecido.
        token_index: Option<usize>,
    },

    /// Valor de configuração ausente ou inválido.
    #[error("configuração inválida: {0}")]
    Configuration(String),

    /// Registro JSON malformado (ex: campo obrigatório ausente).
    #[error("erro de serialização: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl NerError {
    pub fn upstream(message: impl Into<String>) -> Self {
        NerError::UpstreamInference {
            message: message.into(),
            token_index: None,
        }
    }

    pub fn upstream_at(token_index: usize, message: impl Into<String>) -> Self {
        NerError::UpstreamInference {
            message: message.into(),
            token_index: Some(token_index),
        }
    }

    /// Verdadeiro quando a culpa é do motor de inferência e não da entrada.
    pub fn is_upstream(&self) -> bool {
        matches!(self, NerError::UpstreamInference { .. })
    }
}
