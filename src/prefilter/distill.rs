// src/prefilter/distill.rs
//! Checkable-content distillation, run on extracted text before hashing and
//! scoring. Sentence-level selection: keep the sentences carrying quotes,
//! attribution, or verifiable data; disqualify navigation noise. Regex only,
//! no language model.

use once_cell::sync::OnceCell;
use regex::Regex;

use super::keywords::{self, any_match, count_matches};
use super::patterns;

pub const MAX_DISTILLED_CHARS: usize = 500;
/// Items with less checkable text than this are not worth persisting.
pub const MIN_DISTILLED_CHARS: usize = 50;
const MIN_SENTENCE_CHARS: usize = 30;

fn abbreviations() -> &'static Regex {
    static C: OnceCell<Regex> = OnceCell::new();
    C.get_or_init(|| Regex::new(r"\b(Dr|Sr|Sra|Prof|Gov)\.").expect("abbrev regex"))
}

fn sentence_end() -> &'static Regex {
    static C: OnceCell<Regex> = OnceCell::new();
    C.get_or_init(|| Regex::new(r"[.!?]+").expect("sentence regex"))
}

/// Split on sentence boundaries, protecting honorific abbreviations so
/// "Dr. Paulo" stays in one sentence. Fragments under the minimum length are
/// discarded here.
fn split_sentences(text: &str) -> Vec<String> {
    let protected = abbreviations().replace_all(text, "$1\u{2024}");
    sentence_end()
        .split(&protected)
        .map(|s| s.replace('\u{2024}', ".").trim().to_string())
        .filter(|s| s.chars().count() >= MIN_SENTENCE_CHARS)
        .collect()
}

/// Fact-checkability of one sentence; only positive sentences are kept.
/// Navigation chrome disqualifies the sentence outright.
fn sentence_score(sentence: &str) -> i32 {
    let lower = sentence.to_lowercase();
    if any_match(&lower, keywords::NOISE_TERMS) {
        return -100;
    }

    let mut score = 0;
    if patterns::direct_quote().is_match(sentence) {
        score += 40;
    }
    let has_attribution = any_match(&lower, keywords::ATTRIBUTION_KEYWORDS);
    if has_attribution {
        score += 25;
    }
    let has_data = patterns::percentage().is_match(&lower)
        || patterns::currency().is_match(&lower)
        || patterns::number_with_unit().is_match(&lower);
    if has_data {
        score += 20;
    }
    // Attribution plus data is the most checkable combination.
    if has_attribution && has_data {
        score += 15;
    }
    if any_match(&lower, keywords::INSTITUTIONAL_ENTITIES) {
        score += 10;
    }
    score -= count_matches(&lower, keywords::VAGUE_QUANTIFIERS) as i32 * 15;

    let len = sentence.chars().count();
    if (50..=150).contains(&len) {
        score += 5;
    } else if len > 200 {
        score -= 10;
    }
    score
}

/// Reduce extracted text to its checkable core: positively scoring sentences
/// in document order, capped at `MAX_DISTILLED_CHARS` on a sentence boundary.
/// Returns `None` when less than `MIN_DISTILLED_CHARS` of checkable text
/// survives.
pub fn distill(text: &str) -> Option<String> {
    let mut kept = String::new();
    for sentence in split_sentences(text) {
        if sentence_score(&sentence) <= 0 {
            continue;
        }
        let extra = sentence.chars().count() + if kept.is_empty() { 0 } else { 2 };
        if kept.chars().count() + extra > MAX_DISTILLED_CHARS {
            break;
        }
        if !kept.is_empty() {
            kept.push_str(". ");
        }
        kept.push_str(&sentence);
    }
    if kept.chars().count() < MIN_DISTILLED_CHARS {
        None
    } else {
        Some(kept)
    }
}

/// Portuguese function words distinctive enough to avoid English collisions
/// ("do", "as" and single letters are deliberately absent).
const PT_STOPWORDS: &[&str] = &[
    "de", "da", "dos", "das", "em", "que", "não", "uma", "um", "para", "com",
    "foi", "ao", "aos", "os", "é", "mais", "pela", "pelo", "são", "seu", "sua",
    "já", "está", "também",
];

/// Cheap stopword-based language gate over the first 500 chars: at least two
/// distinct Portuguese function words as whole tokens.
pub fn looks_portuguese(text: &str) -> bool {
    let sample: String = text.chars().take(500).collect::<String>().to_lowercase();
    let mut seen: Vec<&str> = Vec::new();
    for token in sample.split_whitespace() {
        let word = token.trim_matches(|c: char| !c.is_alphanumeric());
        if let Some(hit) = PT_STOPWORDS.iter().find(|sw| **sw == word) {
            if !seen.contains(hit) {
                seen.push(*hit);
                if seen.len() >= 2 {
                    return true;
                }
            }
        }
    }
    false
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keeps_checkable_sentences_and_drops_noise() {
        let text = "O ministro afirmou que a inflação caiu 4,5% no trimestre. \
                    Clique aqui e confira as últimas notícias do portal. \
                    Segundo o relatório, o investimento chegou a r$ 200 milhões.";
        let out = distill(text).unwrap();
        assert!(out.contains("inflação caiu 4,5%"));
        assert!(out.contains("r$ 200 milhões"));
        assert!(!out.contains("Clique aqui"));
    }

    #[test]
    fn pure_noise_text_distills_to_nothing() {
        assert_eq!(distill("Clique aqui e veja mais nas últimas notícias do dia"), None);
        assert_eq!(distill("curto demais"), None);
    }

    #[test]
    fn honorific_abbreviations_do_not_split_sentences() {
        let text = "O Dr. Paulo Guedes afirmou que a taxa subiu 10% em janeiro.";
        let out = distill(text).unwrap();
        assert!(out.contains("Dr. Paulo Guedes"));
    }

    #[test]
    fn output_is_capped_on_a_sentence_boundary() {
        let sentence = "O governo confirmou que 23% da população foi vacinada até março";
        let text = vec![sentence; 20].join(". ");
        let out = distill(&text).unwrap();
        assert!(out.chars().count() <= MAX_DISTILLED_CHARS);
        assert!(out.ends_with("vacinada até março"));
    }

    #[test]
    fn language_gate_accepts_portuguese_and_rejects_english() {
        assert!(looks_portuguese(
            "O governo confirmou que 23% da população foi vacinada"
        ));
        assert!(!looks_portuguese(
            "The government confirmed that 23% of the population was vaccinated"
        ));
    }
}
