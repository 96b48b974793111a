//! Checagem das predições devolvidas pelo motor de inferência.
//!
//! O fusor confia na ordem recebida; quem chama o motor usa esta validação para
//! transformar saídas inconsistentes em [`NerError::UpstreamInference`] em vez
//! de calcular offsets errados em silêncio.

use crate::error::{NerError, NerResult};
use crate::prediction::RawTokenPrediction;

/// Valida offsets e scores das predições para o texto `text`.
///
/// Regras:
/// - `start <= end` em cada token;
/// - `end` não passa do número de caracteres do texto;
/// - confiança finita em [0, 1];
/// - `start` e `end` não decrescem ao longo da sequência.
pub fn validate_predictions(text: &str, tokens: &[RawTokenPrediction]) -> NerResult<()> {
    let char_len = text.chars().count();
    let mut prev: Option<&RawTokenPrediction> = None;

    for (i, token) in tokens.iter().enumerate() {
        if token.start_offset > token.end_offset {
            return Err(NerError::upstream_at(
                i,
                format!(
                    "token {:?} com start {} > end {}",
                    token.text_fragment, token.start_offset, token.end_offset
                ),
            ));
        }
        if token.end_offset > char_len {
            return Err(NerError::upstream_at(
                i,
                format!(
                    "token {:?} termina em {} mas o texto tem {} caracteres",
                    token.text_fragment, token.end_offset, char_len
                ),
            ));
        }
        if !token.confidence.is_finite() || !(0.0..=1.0).contains(&token.confidence) {
            return Err(NerError::upstream_at(
                i,
                format!("confiança {} fora de [0, 1]", token.confidence),
            ));
        }
        if let Some(p) = prev {
            if token.start_offset < p.start_offset || token.end_offset < p.end_offset {
                return Err(NerError::upstream_at(
                    i,
                    format!(
                        "tokens fora de ordem: {:?} [{}, {}) depois de {:?} [{}, {})",
                        token.text_fragment,
                        token.start_offset,
                        token.end_offset,
                        p.text_fragment,
                        p.start_offset,
                        p.end_offset
                    ),
                ));
            }
        }
        prev = Some(token);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    const TEXT: &str = "My name is Andrew";

    #[test]
    fn test_valid_sequence() {
        let tokens = vec![
            RawTokenPrediction::new("And", "B-PER", 0.99, 11, 14),
            RawTokenPrediction::new("##rew", "I-PER", 0.98, 14, 17),
        ];
        assert!(validate_predictions(TEXT, &tokens).is_ok());
        assert!(validate_predictions("", &[]).is_ok());
    }

    #[test]
    fn test_out_of_order_is_upstream_failure() {
        let tokens = vec![
            RawTokenPrediction::new("Andrew", "B-PER", 0.99, 11, 17),
            RawTokenPrediction::new("name", "O", 0.99, 3, 7),
        ];
        let err = validate_predictions(TEXT, &tokens).unwrap_err();
        assert!(err.is_upstream());
        assert!(matches!(err, NerError::UpstreamInference { token_index: Some(1), .. }));
    }

    #[test]
    fn test_inverted_and_overflowing_offsets() {
        let inverted = vec![RawTokenPrediction::new("x", "O", 0.5, 5, 4)];
        assert!(validate_predictions(TEXT, &inverted).is_err());

        let overflow = vec![RawTokenPrediction::new("x", "O", 0.5, 15, 40)];
        assert!(validate_predictions(TEXT, &overflow).is_err());
    }

    #[test]
    fn test_offsets_count_chars_not_bytes() {
        let text = "Poli mora em Viena, Áustria";
        let tokens = vec![RawTokenPrediction::new("Áustria", "B-LOC", 0.9, 20, 27)];
        assert!(validate_predictions(text, &tokens).is_ok());

        // 28 é o comprimento em bytes, não em caracteres
        let past_end = vec![RawTokenPrediction::new("Áustria", "B-LOC", 0.9, 21, 28)];
        assert!(validate_predictions(text, &past_end).is_err());
    }

    #[test]
    fn test_bad_confidence() {
        for score in [f64::NAN, -0.1, 1.5] {
            let tokens = vec![RawTokenPrediction::new("Andrew", "B-PER", score, 11, 17)];
            assert!(validate_predictions(TEXT, &tokens).is_err(), "score {score}");
        }
    }
}
