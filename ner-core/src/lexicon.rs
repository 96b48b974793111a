//! # Motor de inferência léxico — Gazetteers, pistas e padrões
//!
//! Motor local que emite predições no mesmo formato de um modelo BERT de
//! classificação de tokens: uma predição por sub-palavra, rótulos BIO, score e
//! offsets em caracteres. Não carrega pesos; decide por conhecimento explícito:
//!
//! 1. **Gazetteers** (n-gramas) de pessoas, organizações, locais e miscelânea.
//! 2. **Títulos**: "Mr", "Dr", "President"... seguidos de palavra capitalizada → PER.
//! 3. **Pistas** (regex sobre o texto que precede a palavra): "my name is X" → PER,
//!    "live in X" → LOC, "work at X" → ORG.
//! 4. **Sufixos de organização**: "Acme Inc" → ORG.
//! 5. **Siglas**: palavras só com maiúsculas (ex: "NASA") → ORG.
//!
//! As regras são aplicadas por palavra, na ordem acima; a primeira que marca
//! uma palavra vence. Depois cada palavra é quebrada em sub-palavras: o primeiro
//! pedaço herda a tag da palavra e os demais viram `I-<TIPO>`, exatamente a
//! fragmentação que o fusor de entidades precisa desfazer.

use regex::Regex;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::engine::InferenceEngine;
use crate::error::{NerError, NerResult};
use crate::label::{make_label, EntityCategory, LabelPrefix, OUTSIDE};
use crate::prediction::RawTokenPrediction;
use crate::tokenizer::{Token, WordPieceTokenizer};

/// Score emitido para palavras fora de entidade.
const OUTSIDE_CONFIDENCE: f64 = 0.99;
/// Queda de score a cada sub-palavra adicional da mesma palavra.
const PIECE_DECAY: f64 = 0.02;

/// Uma correspondência de regra para uma palavra
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RuleMatch {
    pub word_index: usize,
    pub category: EntityCategory,
    /// `Begin` para a primeira palavra da entidade, `Inside` para as seguintes.
    pub prefix: LabelPrefix,
    pub rule_name: String,
    pub confidence: f64,
}

/// Pista textual: regex aplicada ao texto (minúsculo) que antecede a palavra.
#[derive(Debug, Clone)]
struct Cue {
    pattern: Regex,
    category: EntityCategory,
    rule_name: &'static str,
}

/// Motor léxico com gazetteers, pistas e padrões.
#[derive(Debug, Clone)]
pub struct LexiconEngine {
    tokenizer: WordPieceTokenizer,
    /// Entradas por categoria, cada uma como sequência de palavras minúsculas.
    gazetteers: Vec<(EntityCategory, Vec<String>)>,
    person_titles: Vec<String>,
    org_suffixes: Vec<String>,
    cues: Vec<Cue>,
    acronym: Regex,
    emit_outside: bool,
}

impl LexiconEngine {
    /// Motor vazio (sem gazetteers), com títulos, pistas e padrões padrão.
    pub fn new(tokenizer: WordPieceTokenizer) -> NerResult<Self> {
        let cue = |pattern: &str, category: EntityCategory, rule_name: &'static str| -> NerResult<Cue> {
            let pattern = Regex::new(pattern)
                .map_err(|e| NerError::Configuration(format!("regex de pista inválida: {e}")))?;
            Ok(Cue { pattern, category, rule_name })
        };

        Ok(Self {
            tokenizer,
            gazetteers: Vec::new(),
            person_titles: [
                "mr", "mrs", "ms", "miss", "dr", "prof", "sir", "president", "senator",
                "minister", "ceo", "founder",
            ]
            .iter()
            .map(|s| s.to_string())
            .collect(),
            org_suffixes: ["inc", "ltd", "llc", "corp", "gmbh", "plc", "co"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
            cues: vec![
                cue(r"\b(?:my name is|i am called|call me|named)\s+$", EntityCategory::Per, "person_cue")?,
                cue(
                    r"\b(?:i live in|lives in|living in|based in|moved to|born in)\s+$",
                    EntityCategory::Loc,
                    "location_cue",
                )?,
                cue(
                    r"\b(?:work at|works at|working at|work for|works for|building|joined)\s+$",
                    EntityCategory::Org,
                    "org_cue",
                )?,
            ],
            acronym: Regex::new(r"^\p{Lu}{2,6}$")
                .map_err(|e| NerError::Configuration(format!("regex de sigla inválida: {e}")))?,
            emit_outside: false,
        })
    }

    /// Motor semeado com as entidades das frases de demonstração.
    pub fn with_defaults() -> NerResult<Self> {
        let mut engine = Self::new(WordPieceTokenizer::default())?;
        for name in ["Andrew", "Poli"] {
            engine.add_entry(EntityCategory::Per, name);
        }
        for name in ["DeeplearningAI", "HuggingFace", "Hugging Face"] {
            engine.add_entry(EntityCategory::Org, name);
        }
        for name in ["California", "Vienna", "Austria", "New York", "San Francisco"] {
            engine.add_entry(EntityCategory::Loc, name);
        }
        for name in ["English", "Austrian", "American"] {
            engine.add_entry(EntityCategory::Misc, name);
        }
        Ok(engine)
    }

    /// Inclui também as palavras `O` na saída (por padrão são omitidas, como nos
    /// pipelines de classificação de tokens).
    pub fn emit_outside(mut self, emit: bool) -> Self {
        self.emit_outside = emit;
        self
    }

    /// Adiciona uma entrada ao gazetteer (pode ter várias palavras).
    pub fn add_entry(&mut self, category: EntityCategory, name: &str) {
        let parts: Vec<String> = crate::tokenizer::pre_tokenize(name)
            .into_iter()
            .map(|t| t.text.to_lowercase())
            .collect();
        if !parts.is_empty() {
            self.gazetteers.push((category, parts));
        }
    }

    pub fn tokenizer(&self) -> &WordPieceTokenizer {
        &self.tokenizer
    }

    /// Aplica todas as regras às palavras do texto.
    ///
    /// Retorna, para cada palavra, a regra que a marcou (se houver).
    pub fn apply(&self, text: &str, words: &[Token]) -> Vec<Option<RuleMatch>> {
        let mut result: Vec<Option<RuleMatch>> = vec![None; words.len()];
        let lower: Vec<String> = words.iter().map(|w| w.text.to_lowercase()).collect();

        // 1. Gazetteers (n-gramas, entrada mais longa primeiro)
        let mut i = 0;
        while i < words.len() {
            let best = self
                .gazetteers
                .iter()
                .filter(|(_, parts)| {
                    i + parts.len() <= words.len()
                        && parts.iter().enumerate().all(|(j, p)| lower[i + j] == *p)
                })
                .max_by_key(|(_, parts)| parts.len());

            match best {
                Some((category, parts)) => {
                    mark_run(&mut result, i, parts.len(), *category, "gazetteer", 0.97);
                    i += parts.len();
                }
                None => i += 1,
            }
        }

        // 2. Título: "Dr Smith" → Smith é PER
        for i in 0..words.len().saturating_sub(1) {
            if result[i + 1].is_some() || !self.person_titles.contains(&lower[i]) {
                continue;
            }
            let run = capitalized_run(words, &result, i + 1);
            mark_run(&mut result, i + 1, run, EntityCategory::Per, "title_pattern", 0.85);
        }

        // 3. Pistas: "my name is X", "I live in X", "work at X"
        for i in 0..words.len() {
            if result[i].is_some() || !is_capitalized(&words[i].text) {
                continue;
            }
            let preceding = text[..words[i].byte_start].to_lowercase();
            if let Some(cue) = self.cues.iter().find(|c| c.pattern.is_match(&preceding)) {
                let run = capitalized_run(words, &result, i);
                mark_run(&mut result, i, run, cue.category, cue.rule_name, 0.80);
            }
        }

        // 4. Sufixos: "Acme Inc" → ORG
        for i in 1..words.len() {
            if result[i].is_some() || result[i - 1].is_some() || !self.org_suffixes.contains(&lower[i]) {
                continue;
            }
            if is_capitalized(&words[i - 1].text) {
                mark_run(&mut result, i - 1, 2, EntityCategory::Org, "org_suffix_pattern", 0.85);
            }
        }

        // 5. Siglas
        for (i, word) in words.iter().enumerate() {
            if result[i].is_none() && self.acronym.is_match(&word.text) {
                mark_run(&mut result, i, 1, EntityCategory::Org, "acronym_pattern", 0.70);
            }
        }

        result
    }
}

impl InferenceEngine for LexiconEngine {
    fn name(&self) -> &str {
        "lexicon"
    }

    fn predict(&self, text: &str) -> NerResult<Vec<RawTokenPrediction>> {
        let words = self.tokenizer.pre_tokenize(text);
        let matches = self.apply(text, &words);
        let pieces = self.tokenizer.tokenize(text);

        let mut predictions = Vec::with_capacity(pieces.len());
        let mut piece_in_word = 0usize;
        let mut last_word = None;

        for piece in &pieces {
            if last_word != Some(piece.word_index) {
                piece_in_word = 0;
                last_word = Some(piece.word_index);
            }

            match matches.get(piece.word_index).and_then(Option::as_ref) {
                Some(m) => {
                    let prefix = if piece_in_word == 0 { m.prefix } else { LabelPrefix::Inside };
                    let confidence = (m.confidence - PIECE_DECAY * piece_in_word as f64).max(0.0);
                    predictions.push(RawTokenPrediction::new(
                        piece.text.clone(),
                        make_label(prefix, m.category.name()),
                        confidence,
                        piece.start,
                        piece.end,
                    ));
                }
                None if self.emit_outside => predictions.push(RawTokenPrediction::new(
                    piece.text.clone(),
                    OUTSIDE,
                    OUTSIDE_CONFIDENCE,
                    piece.start,
                    piece.end,
                )),
                None => {}
            }
            piece_in_word += 1;
        }

        debug!(
            "lexicon: {} palavras, {} sub-palavras, {} predições",
            words.len(),
            pieces.len(),
            predictions.len()
        );
        Ok(predictions)
    }
}

/// Marca `len` palavras a partir de `start`: a primeira como B-, as demais como I-.
fn mark_run(
    result: &mut [Option<RuleMatch>],
    start: usize,
    len: usize,
    category: EntityCategory,
    rule_name: &str,
    confidence: f64,
) {
    for j in 0..len {
        if let Some(slot) = result.get_mut(start + j) {
            *slot = Some(RuleMatch {
                word_index: start + j,
                category,
                prefix: if j == 0 { LabelPrefix::Begin } else { LabelPrefix::Inside },
                rule_name: rule_name.to_string(),
                confidence,
            });
        }
    }
}

/// Quantas palavras capitalizadas e ainda não marcadas seguem a partir de `start`.
fn capitalized_run(words: &[Token], result: &[Option<RuleMatch>], start: usize) -> usize {
    words[start..]
        .iter()
        .zip(&result[start..])
        .take_while(|(w, r)| r.is_none() && is_capitalized(&w.text))
        .count()
}

fn is_capitalized(word: &str) -> bool {
    word.chars().next().map(char::is_uppercase).unwrap_or(false)
}
