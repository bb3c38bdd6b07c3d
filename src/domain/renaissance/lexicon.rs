//! Curated distress lexicon for the keyword/sentiment scan.
//!
//! The product's user base writes notes in French, so the lexicon is a
//! French word list. Matching is case-insensitive whole-word matching over
//! lowercased text; the free text itself stays opaque otherwise (it may
//! come from an LLM collaborator and is never parsed beyond this scan).

use once_cell::sync::Lazy;

/// Distress terms, lowercase, ordered for deterministic reporting.
pub static DISTRESS_LEXICON: Lazy<Vec<&'static str>> = Lazy::new(|| {
    vec![
        "abandonner",
        "angoisse",
        "anxieux",
        "bloqué",
        "burnout",
        "découragé",
        "désespoir",
        "échec",
        "épuisé",
        "impasse",
        "inutile",
        "perdu",
        "submergé",
        "vide",
    ]
});

/// Scans one note for lexicon terms.
///
/// A term only counts when it stands on its own word boundaries: "vide"
/// must not fire inside "évidemment", nor "perdu" inside "perdurer".
/// Returns `(total_hits, matched_terms)`; matched terms keep the lexicon's
/// order so repeated scans of the same text are byte-identical.
pub fn scan_for_distress(text: &str) -> (u32, Vec<&'static str>) {
    let lowered = text.to_lowercase();
    let mut hits = 0u32;
    let mut matched = Vec::new();

    for term in DISTRESS_LEXICON.iter() {
        let count = count_standalone(&lowered, term);
        if count > 0 {
            hits += count;
            matched.push(*term);
        }
    }

    (hits, matched)
}

/// Counts occurrences of `term` not embedded in a longer word.
fn count_standalone(text: &str, term: &str) -> u32 {
    let mut count = 0u32;
    let mut offset = 0;
    while let Some(found) = text[offset..].find(term) {
        let start = offset + found;
        let end = start + term.len();
        let free_before = text[..start]
            .chars()
            .next_back()
            .map_or(true, |c| !c.is_alphanumeric());
        let free_after = text[end..]
            .chars()
            .next()
            .map_or(true, |c| !c.is_alphanumeric());
        if free_before && free_after {
            count += 1;
        }
        offset = end;
    }
    count
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scan_finds_single_term() {
        let (hits, terms) = scan_for_distress("Je me sens bloqué dans mon travail");
        assert_eq!(hits, 1);
        assert_eq!(terms, vec!["bloqué"]);
    }

    #[test]
    fn scan_is_case_insensitive() {
        let (hits, terms) = scan_for_distress("ÉCHEC total, encore un échec");
        assert_eq!(hits, 2);
        assert_eq!(terms, vec!["échec"]);
    }

    #[test]
    fn scan_counts_multiple_distinct_terms() {
        let (hits, terms) = scan_for_distress("bloqué, échec, désespoir");
        assert_eq!(hits, 3);
        assert_eq!(terms, vec!["bloqué", "désespoir", "échec"]);
    }

    #[test]
    fn scan_ignores_clean_text() {
        let (hits, terms) = scan_for_distress("Superbe journée, entretien réussi !");
        assert_eq!(hits, 0);
        assert!(terms.is_empty());
    }

    #[test]
    fn scan_does_not_match_inside_longer_words() {
        let (hits, terms) = scan_for_distress("Évidemment, le projet va perdurer");
        assert_eq!(hits, 0);
        assert!(terms.is_empty());
    }

    #[test]
    fn scan_matches_terms_next_to_punctuation() {
        let (hits, terms) = scan_for_distress("Je me sens vide, complètement perdu.");
        assert_eq!(hits, 2);
        assert_eq!(terms, vec!["perdu", "vide"]);
    }

    #[test]
    fn lexicon_terms_are_lowercase() {
        for term in DISTRESS_LEXICON.iter() {
            assert_eq!(*term, term.to_lowercase());
        }
    }
}
