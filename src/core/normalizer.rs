//! Transcript preprocessing
//!
//! Speech recognition output arrives with inconsistent casing, stray
//! whitespace and recurring mishearings. Normalization runs once, before
//! classification, so every downstream matcher sees the same shape of text.

use std::collections::HashMap;
use tracing::debug;

pub struct Normalizer {
    corrections: HashMap<String, String>,
}

impl Normalizer {
    /// Correction keys may span several words and are matched
    /// case-insensitively against the whole transcript.
    pub fn new(corrections: &HashMap<String, String>) -> Self {
        let corrections = corrections
            .iter()
            .map(|(k, v)| (k.to_lowercase(), v.to_lowercase()))
            .collect();
        Self { corrections }
    }

    pub fn normalize(&self, transcript: &str) -> String {
        let mut lowered = transcript.to_lowercase();
        for (wrong, right) in &self.corrections {
            if lowered.contains(wrong.as_str()) {
                lowered = lowered.replace(wrong.as_str(), right);
            }
        }
        let mut tokens: Vec<&str> = lowered.split_whitespace().collect();

        // Trailing "ok" is a dictation confirmation particle, not content
        if tokens.len() > 1 && tokens.last() == Some(&"ok") {
            tokens.pop();
        }

        let normalized = tokens.join(" ");
        if normalized != transcript {
            debug!("Normalized transcript: '{}' -> '{}'", transcript, normalized);
        }
        normalized
    }
}

impl Default for Normalizer {
    fn default() -> Self {
        Self {
            corrections: HashMap::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lowercase_and_whitespace() {
        let n = Normalizer::default();
        assert_eq!(
            n.normalize("  Cadastrar   Honda Civic "),
            "cadastrar honda civic"
        );
    }

    #[test]
    fn test_corrections_applied() {
        let mut map = HashMap::new();
        map.insert("ronda".to_string(), "honda".to_string());
        let n = Normalizer::new(&map);
        assert_eq!(n.normalize("cadastrar Ronda civic"), "cadastrar honda civic");
    }

    #[test]
    fn test_multi_word_correction() {
        let mut map = HashMap::new();
        map.insert("onda civic".to_string(), "honda civic".to_string());
        let n = Normalizer::new(&map);
        assert_eq!(n.normalize("cadastrar Onda Civic 2020"), "cadastrar honda civic 2020");
    }

    #[test]
    fn test_trailing_ok_stripped() {
        let n = Normalizer::default();
        assert_eq!(
            n.normalize("cadastrar honda civic ok"),
            "cadastrar honda civic"
        );
        // a lone "ok" stays, it may be an answer to a question
        assert_eq!(n.normalize("ok"), "ok");
    }
}
