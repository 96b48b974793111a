//! # ner-spans — Entidades Nomeadas a partir de sub-palavras
//!
//! Modelos de classificação de tokens (BERT e afins) rotulam **sub-palavras**:
//! "DeeplearningAI" chega como `Deep` (B-ORG), `##learning` (I-ORG), `##AI` (I-ORG).
//! Este crate pega essas predições e reconstrói as entidades contíguas que a
//! interface destaca sobre o texto original.
//!
//! ## Arquitetura
//!
//! 1.  **Entrada**: texto bruto (String).
//! 2.  **Inferência** ([`engine`]): um motor externo devolve uma predição por
//!     sub-palavra ([`lexicon`] local ou [`hosted`] via HTTP).
//! 3.  **Validação** ([`validate`]): offsets fora de ordem ou scores inválidos
//!     viram erro de inferência upstream.
//! 4.  **Fusão** ([`merge`]): passada única que junta `B-X` + `I-X`... em uma
//!     [`MergedEntity`].
//! 5.  **Saída**: [`NerOutput`] `{ text, entities }`.
//!
//! ## Exemplo de Uso
//!
//! ```rust
//! use ner_spans::{merge_tokens, RawTokenPrediction};
//!
//! let tokens = vec![
//!     RawTokenPrediction::new("Deep", "B-ORG", 0.9, 30, 34),
//!     RawTokenPrediction::new("##learning", "I-ORG", 0.8, 34, 44),
//!     RawTokenPrediction::new("##AI", "I-ORG", 0.95, 44, 46),
//! ];
//! let entities = merge_tokens(&tokens);
//! assert_eq!(entities.len(), 1);
//! assert_eq!(entities[0].text, "DeeplearningAI");
//! assert_eq!((entities[0].start_offset, entities[0].end_offset), (30, 46));
//! ```

pub mod config;
pub mod demo;
pub mod engine;
pub mod error;
pub mod hosted;
pub mod label;
pub mod lexicon;
pub mod merge;
pub mod pipeline;
pub mod prediction;
pub mod tokenizer;
pub mod validate;

pub use config::{EngineKind, NerConfig};
pub use engine::{build_engine, InferenceEngine, StaticEngine};
pub use error::{NerError, NerResult};
pub use label::EntityCategory;
pub use merge::{merge_tokens, ConfidenceMode, EntityMerger, MergeConfig, MergeStep};
pub use pipeline::{NerPipeline, PipelineEvent};
pub use prediction::{MergedEntity, NerOutput, RawTokenPrediction};
