// src/prefilter/patterns.rs
//! Compiled regexes shared by the scorer. One-time compilation via OnceCell,
//! as elsewhere in the crate.

use once_cell::sync::OnceCell;
use regex::Regex;

fn re(cell: &'static OnceCell<Regex>, pattern: &str) -> &'static Regex {
    cell.get_or_init(|| Regex::new(pattern).expect("prefilter regex"))
}

/// `23%`, `7,5%`
pub fn percentage() -> &'static Regex {
    static C: OnceCell<Regex> = OnceCell::new();
    re(&C, r"\d+([,\.]\d+)?%")
}

/// `r$ 500 milhões`, `us$ 1,2 bilhão` (input is lowercased upstream).
pub fn currency() -> &'static Regex {
    static C: OnceCell<Regex> = OnceCell::new();
    re(&C, r"(r|us)\$\s*[\d\.,]+(\s*(mil|milhões|milhão|bilhões|bilhão))?")
}

/// Bare figure with a magnitude unit: `200 mil`, `3 bilhões`.
pub fn number_with_unit() -> &'static Regex {
    static C: OnceCell<Regex> = OnceCell::new();
    re(&C, r"\d+\s*(mil|milhões|milhão|bilhões|bilhão)")
}

/// Direct quotation of at least 20 characters.
pub fn direct_quote() -> &'static Regex {
    static C: OnceCell<Regex> = OnceCell::new();
    re(&C, "[\"\u{201C}\u{201D}][^\"\u{201C}\u{201D}]{20,}[\"\u{201C}\u{201D}]")
}

/// Two or more consecutive capitalized words: named people/organizations.
/// Runs against the original-case text.
pub fn proper_noun_pair() -> &'static Regex {
    static C: OnceCell<Regex> = OnceCell::new();
    re(
        &C,
        r"\b[A-ZÇÁÉÍÓÚÂÊÔÃÕ][a-zçáéíóúâêôãõ]+(?:\s+[A-ZÇÁÉÍÓÚÂÊÔÃÕ][a-zçáéíóúâêôãõ]+)+\b",
    )
}

/// Conditional/future phrasing; not checkable until it happens.
pub fn conditional() -> &'static Regex {
    static C: OnceCell<Regex> = OnceCell::new();
    re(
        &C,
        r"\b(se acontecer|caso ocorra|haveremos de|iremos|vamos fazer|poderá|poderia|teria|seria|faria|quando houver)\b",
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn percentage_matches_decimal_forms() {
        assert!(percentage().is_match("cresceu 23%"));
        assert!(percentage().is_match("cresceu 7,5%"));
        assert!(!percentage().is_match("cresceu muito"));
    }

    #[test]
    fn currency_matches_brl_and_usd() {
        assert!(currency().is_match("r$ 500 milhões"));
        assert!(currency().is_match("us$ 1,2 bilhão"));
        assert!(!currency().is_match("500 reais"));
    }

    #[test]
    fn quote_requires_minimum_length() {
        assert!(direct_quote().is_match("ele disse: \"vamos investir cem milhões no setor\""));
        assert!(!direct_quote().is_match("disse \"sim\" e saiu"));
    }

    #[test]
    fn proper_noun_pair_needs_two_words() {
        assert!(proper_noun_pair().is_match("segundo Paulo Guedes e Maria Silva"));
        assert!(!proper_noun_pair().is_match("O governo confirmou que 23% da população foi vacinada"));
    }

    #[test]
    fn conditional_catches_future_speculation() {
        assert!(conditional().is_match("o valor poderá subir"));
        assert!(!conditional().is_match("o valor subiu"));
    }
}
