//! String similarity primitives used by relevance scoring.

/// Edit distance between two strings, counted in chars.
///
/// Insertions, deletions and substitutions each cost 1.
pub fn levenshtein(a: &str, b: &str) -> usize {
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();

    if a.is_empty() {
        return b.len();
    }
    if b.is_empty() {
        return a.len();
    }

    // Two rolling rows of the DP matrix.
    let mut prev: Vec<usize> = (0..=b.len()).collect();
    let mut curr = vec![0; b.len() + 1];

    for (i, ca) in a.iter().enumerate() {
        curr[0] = i + 1;
        for (j, cb) in b.iter().enumerate() {
            let substitution = prev[j] + usize::from(ca != cb);
            let deletion = prev[j + 1] + 1;
            let insertion = curr[j] + 1;
            curr[j + 1] = substitution.min(deletion).min(insertion);
        }
        std::mem::swap(&mut prev, &mut curr);
    }

    prev[b.len()]
}

/// Normalized similarity in `[0, 1]`: `1 - distance / max(len(a), len(b))`.
pub fn similarity(a: &str, b: &str) -> f64 {
    let longest = a.chars().count().max(b.chars().count());
    if longest == 0 {
        return 1.0;
    }
    1.0 - levenshtein(a, b) as f64 / longest as f64
}

/// Fuzzy score of `query` against a field value, in `[0, 1]`.
///
/// Case-insensitive. A substring relation in either direction scores 1.0.
/// Otherwise the best token-to-token [`similarity`] over whitespace-separated
/// tokens wins, so one strong word match beats a loose whole-phrase match.
/// An empty field scores 0.
pub fn fuzzy_match(text: &str, query: &str) -> f64 {
    let text = text.to_lowercase();
    let query = query.to_lowercase();

    if text.trim().is_empty() || query.trim().is_empty() {
        return 0.0;
    }

    if text.contains(&query) || query.contains(&text) {
        return 1.0;
    }

    let query_tokens: Vec<&str> = query.split_whitespace().collect();
    text.split_whitespace()
        .flat_map(|t| query_tokens.iter().map(move |q| similarity(t, q)))
        .fold(0.0, f64::max)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn levenshtein_of_identical_strings_is_zero() {
        assert_eq!(levenshtein("wallet", "wallet"), 0);
    }

    #[test]
    fn levenshtein_counts_classic_edits() {
        assert_eq!(levenshtein("kitten", "sitting"), 3);
        assert_eq!(levenshtein("flaw", "lawn"), 2);
        assert_eq!(levenshtein("", "abc"), 3);
        assert_eq!(levenshtein("abc", ""), 3);
    }

    #[test]
    fn levenshtein_counts_chars_not_bytes() {
        assert_eq!(levenshtein("café", "cafe"), 1);
    }

    #[test]
    fn similarity_is_one_for_equal_and_zero_for_disjoint() {
        assert_eq!(similarity("franchise", "franchise"), 1.0);
        assert_eq!(similarity("abc", "xyz"), 0.0);
        assert_eq!(similarity("", ""), 1.0);
    }

    #[test]
    fn similarity_is_normalized_by_longest_string() {
        // One substitution over four chars.
        assert!((similarity("wall", "ball") - 0.75).abs() < f64::EPSILON);
    }

    #[test]
    fn substring_in_either_direction_scores_one() {
        assert_eq!(fuzzy_match("Core Platform", "platform"), 1.0);
        assert_eq!(fuzzy_match("Core", "core platform"), 1.0);
        assert_eq!(fuzzy_match("EHB Wallet", "WALLET"), 1.0);
    }

    #[test]
    fn falls_back_to_best_token_similarity() {
        // "walet" vs "wallet": one deletion over six chars.
        let score = fuzzy_match("EHB Wallet", "walet");
        assert!((score - 5.0 / 6.0).abs() < 1e-9);
    }

    #[test]
    fn single_strong_token_beats_phrase_noise() {
        let score = fuzzy_match("Franchise Management Suite", "franchize reports");
        assert!(score > 0.8);
    }

    #[test]
    fn empty_field_or_query_scores_zero() {
        assert_eq!(fuzzy_match("", "wallet"), 0.0);
        assert_eq!(fuzzy_match("   ", "wallet"), 0.0);
        assert_eq!(fuzzy_match("Wallet", ""), 0.0);
    }
}
