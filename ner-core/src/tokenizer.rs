//! # Tokenizador de sub-palavras (estilo WordPiece)
//!
//! Reproduz o formato de saída dos tokenizadores BERT: palavras conhecidas
//! inteiras, palavras raras quebradas em pedaços, e pedaços não iniciais
//! marcados com o marcador de continuação (`##`).
//!
//! ## Etapas
//!
//! 1. **Pré-tokenização**: fronteiras de palavra Unicode (UAX #29) via
//!    `unicode-segmentation`; espaços são descartados, pontuação vira token.
//! 2. **WordPiece**: cada palavra é quebrada gulosamente pelo maior prefixo
//!    presente no vocabulário (comparação sem caixa). O que sobrar sem match
//!    vira um único pedaço, em vez de `[UNK]`, para não perder texto.
//!
//! ## Exemplo de Uso
//!
//! ```rust
//! use ner_spans::tokenizer::WordPieceTokenizer;
//!
//! let tokenizer = WordPieceTokenizer::default();
//! let pieces = tokenizer.tokenize("I'm building DeeplearningAI");
//! let texts: Vec<&str> = pieces.iter().map(|t| t.text.as_str()).collect();
//! assert_eq!(texts, ["I'm", "building", "Deep", "##learning", "##AI"]);
//! ```
//!
//! Offsets (`start`/`end`) são posições em **caracteres**, o mesmo sistema de
//! coordenadas dos pipelines de classificação de tokens.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use unicode_segmentation::UnicodeSegmentation;

use crate::merge::DEFAULT_CONTINUATION_MARKER;

/// Um token extraído do texto original.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Token {
    /// Texto do token; pedaços de continuação incluem o marcador (ex: "##AI").
    pub text: String,
    /// Posição inicial em caracteres (inclusiva).
    pub start: usize,
    /// Posição final em caracteres (exclusiva).
    pub end: usize,
    /// Posição inicial em bytes no texto original.
    pub byte_start: usize,
    /// Índice sequencial do token na lista (0, 1, 2...).
    pub index: usize,
    /// Índice da palavra de origem (pedaços da mesma palavra compartilham o valor).
    pub word_index: usize,
    /// Verdadeiro para pedaços não iniciais de uma palavra.
    pub continuation: bool,
}

/// Pedaços usados pelo vocabulário padrão: suficiente para quebrar os nomes
/// das frases de demonstração do jeito que um vocabulário BERT quebraria.
const DEFAULT_VOCAB: &[&str] = &[
    "deep", "learning", "ai", "hu", "gging", "face", "cal", "ifornia", "vi", "enna",
];

/// Tokenizador WordPiece com vocabulário em memória.
#[derive(Debug, Clone)]
pub struct WordPieceTokenizer {
    /// Pedaços conhecidos, em minúsculas.
    vocab: HashSet<String>,
    marker: String,
}

impl WordPieceTokenizer {
    pub fn new<I, S>(vocab: I, marker: impl Into<String>) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            vocab: vocab.into_iter().map(|s| s.as_ref().to_lowercase()).collect(),
            marker: marker.into(),
        }
    }

    pub fn marker(&self) -> &str {
        &self.marker
    }

    pub fn add_piece(&mut self, piece: &str) {
        self.vocab.insert(piece.to_lowercase());
    }

    /// Palavras do texto (sem quebra em sub-palavras).
    pub fn pre_tokenize(&self, text: &str) -> Vec<Token> {
        pre_tokenize(text)
    }

    /// Quebra o texto em sub-palavras, na ordem do texto.
    pub fn tokenize(&self, text: &str) -> Vec<Token> {
        let mut pieces = Vec::new();
        for word in pre_tokenize(text) {
            self.split_word(&word, &mut pieces);
        }
        for (i, piece) in pieces.iter_mut().enumerate() {
            piece.index = i;
        }
        pieces
    }

    fn split_word(&self, word: &Token, out: &mut Vec<Token>) {
        let chars: Vec<(usize, char)> = word.text.char_indices().collect();
        let mut pos = 0;

        while pos < chars.len() {
            let end = self.longest_match(&word.text, &chars, pos).unwrap_or(chars.len());

            let byte_lo = chars[pos].0;
            let byte_hi = chars.get(end).map(|(b, _)| *b).unwrap_or(word.text.len());
            let piece = &word.text[byte_lo..byte_hi];
            let continuation = pos > 0;

            out.push(Token {
                text: if continuation {
                    format!("{}{}", self.marker, piece)
                } else {
                    piece.to_string()
                },
                start: word.start + pos,
                end: word.start + end,
                byte_start: word.byte_start + byte_lo,
                index: 0,
                word_index: word.word_index,
                continuation,
            });
            pos = end;
        }
    }

    /// Maior `end` tal que `chars[pos..end]` está no vocabulário.
    fn longest_match(&self, word: &str, chars: &[(usize, char)], pos: usize) -> Option<usize> {
        let byte_lo = chars[pos].0;
        (pos + 1..=chars.len()).rev().find(|&end| {
            let byte_hi = chars.get(end).map(|(b, _)| *b).unwrap_or(word.len());
            self.vocab.contains(&word[byte_lo..byte_hi].to_lowercase())
        })
    }
}

impl Default for WordPieceTokenizer {
    fn default() -> Self {
        Self::new(DEFAULT_VOCAB.iter().copied(), DEFAULT_CONTINUATION_MARKER)
    }
}

/// Divide o texto em palavras e pontuação pelas fronteiras Unicode.
pub fn pre_tokenize(text: &str) -> Vec<Token> {
    let mut tokens = Vec::new();
    let mut char_pos = 0;

    for (byte_start, segment) in text.split_word_bound_indices() {
        let len = segment.chars().count();
        if !segment.chars().all(char::is_whitespace) {
            let index = tokens.len();
            tokens.push(Token {
                text: segment.to_string(),
                start: char_pos,
                end: char_pos + len,
                byte_start,
                index,
                word_index: index,
                continuation: false,
            });
        }
        char_pos += len;
    }
    tokens
}

#[cfg(test)]
mod tests {
    use super::*;

    fn texts(tokens: &[Token]) -> Vec<&str> {
        tokens.iter().map(|t| t.text.as_str()).collect()
    }

    #[test]
    fn test_pre_tokenize_words_and_punctuation() {
        let tokens = pre_tokenize("My name is Andrew, I'm here.");
        assert_eq!(texts(&tokens), ["My", "name", "is", "Andrew", ",", "I'm", "here", "."]);
        assert_eq!((tokens[3].start, tokens[3].end), (11, 17));
    }

    #[test]
    fn test_pre_tokenize_char_offsets() {
        let tokens = pre_tokenize("São Paulo");
        assert_eq!((tokens[1].start, tokens[1].end), (4, 9));
        assert_eq!(tokens[1].byte_start, 5);
    }

    #[test]
    fn test_wordpiece_split() {
        let tokenizer = WordPieceTokenizer::default();
        let tokens = tokenizer.tokenize("work at HuggingFace");
        assert_eq!(texts(&tokens), ["work", "at", "Hu", "##gging", "##Face"]);

        let face = &tokens[4];
        assert!(face.continuation);
        assert_eq!((face.start, face.end), (15, 19));
        assert_eq!(face.word_index, tokens[2].word_index);
        assert_eq!(face.index, 4);
    }

    #[test]
    fn test_unknown_remainder_kept_as_one_piece() {
        let tokenizer = WordPieceTokenizer::new(["deep"], "##");
        let tokens = tokenizer.tokenize("Deepak");
        assert_eq!(texts(&tokens), ["Deep", "##ak"]);
        assert_eq!(tokens[1].end, 6);
    }

    #[test]
    fn test_custom_marker() {
        let tokenizer = WordPieceTokenizer::new(["cal", "ifornia"], "@@");
        let tokens = tokenizer.tokenize("California");
        assert_eq!(texts(&tokens), ["Cal", "@@ifornia"]);
    }

    #[test]
    fn test_empty_text() {
        assert!(WordPieceTokenizer::default().tokenize("   ").is_empty());
    }
}
