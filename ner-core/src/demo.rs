//! Textos e metadados exibidos pela página de demonstração.

use crate::config::DEFAULT_MODEL;

pub const TITLE: &str = "Named Entity Recognition";

/// Descrição curta do modelo usado.
pub fn description() -> String {
    format!("The model used for Recognizing entities: {DEFAULT_MODEL} (https://huggingface.co/{DEFAULT_MODEL}).")
}

/// Frases de exemplo que preenchem o formulário.
pub fn demo_texts() -> Vec<&'static str> {
    vec![
        "My name is Andrew, I'm building DeeplearningAI and I live in California",
        "My name is Poli, I live in Vienna and work at HuggingFace",
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::NerPipeline;

    #[test]
    fn test_every_demo_text_has_entities() {
        let pipeline = NerPipeline::with_lexicon().unwrap();
        for text in demo_texts() {
            let output = pipeline.analyze(text).unwrap();
            assert_eq!(output.entities.len(), 3, "{text}");
            assert!(output.entities.iter().all(|e| e.is_entity()));
        }
    }
}
