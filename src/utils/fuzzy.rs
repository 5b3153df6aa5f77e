//! Fuzzy matching utilities
//!
//! Tolerant string matching for brand recognition, absorbing the one or two
//! character substitutions voice transcription routinely introduces.

use strsim::normalized_levenshtein;

/// Result of a fuzzy match with the matched value and score
#[derive(Debug, Clone)]
pub struct FuzzyMatch {
    pub value: String,
    pub score: f64,
}

/// Find the best candidate above `cutoff`, exact matches first
pub fn find_best_match(search_term: &str, candidates: &[&str], cutoff: f64) -> Option<FuzzyMatch> {
    let search_lower = search_term.to_lowercase();

    for candidate in candidates {
        if candidate.to_lowercase() == search_lower {
            return Some(FuzzyMatch {
                value: candidate.to_string(),
                score: 1.0,
            });
        }
    }

    let mut best: Option<FuzzyMatch> = None;
    for candidate in candidates {
        let score = normalized_levenshtein(&search_lower, &candidate.to_lowercase());
        if score >= cutoff && best.as_ref().map_or(true, |b| score > b.score) {
            best = Some(FuzzyMatch {
                value: candidate.to_string(),
                score,
            });
        }
    }

    best
}

/// Similarity score between two strings, case-insensitive
pub fn similarity(a: &str, b: &str) -> f64 {
    normalized_levenshtein(&a.to_lowercase(), &b.to_lowercase())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exact_match_wins() {
        let best = find_best_match("honda", &["Honda", "Hyundai"], 0.6);
        assert_eq!(best.unwrap().value, "Honda");
    }

    #[test]
    fn test_noisy_transcription() {
        // "rondas" is a common mishearing of "honda"
        let best = find_best_match("ronda", &["honda", "toyota", "fiat"], 0.6);
        assert_eq!(best.unwrap().value, "honda");
    }

    #[test]
    fn test_below_cutoff() {
        assert!(find_best_match("xyz", &["honda", "toyota"], 0.6).is_none());
    }

    #[test]
    fn test_similarity() {
        assert!(similarity("civic", "civic") > 0.99);
        assert!(similarity("gol", "golf") >= 0.6);
        assert!(similarity("uno", "corolla") < 0.5);
    }
}
