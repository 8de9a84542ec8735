//! Typed confirmation before blocking can be switched off.
//!
//! The user must type a challenge phrase; small typos are forgiven.

/// Phrase the user types to disable blocking.
pub const CHALLENGE_PHRASE: &str = "yes i want to doom scroll";

/// Minimum similarity accepted by [`is_close_enough`].
pub const SIMILARITY_THRESHOLD: f64 = 0.7;

/// Edit distance (insert, delete, substitute) over chars.
pub fn levenshtein(a: &str, b: &str) -> usize {
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();
    if a.is_empty() {
        return b.len();
    }

    let mut prev: Vec<usize> = (0..=a.len()).collect();
    let mut row = vec![0; a.len() + 1];
    for (i, cb) in b.iter().enumerate() {
        row[0] = i + 1;
        for (j, ca) in a.iter().enumerate() {
            row[j + 1] = if ca == cb {
                prev[j]
            } else {
                1 + prev[j].min(row[j]).min(prev[j + 1])
            };
        }
        std::mem::swap(&mut prev, &mut row);
    }
    prev[a.len()]
}

/// Similarity in `0.0..=1.0`.
///
/// The input is lowercased, trimmed and has whitespace runs collapsed; the
/// target is only lowercased.
pub fn similarity(input: &str, target: &str) -> f64 {
    let input = input
        .to_lowercase()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ");
    let target = target.to_lowercase();

    if input == target {
        return 1.0;
    }
    if input.is_empty() {
        return 0.0;
    }

    let distance = levenshtein(&input, &target);
    let max_len = input.chars().count().max(target.chars().count());
    1.0 - distance as f64 / max_len as f64
}

/// True when `input` is close enough to [`CHALLENGE_PHRASE`].
pub fn is_close_enough(input: &str) -> bool {
    similarity(input, CHALLENGE_PHRASE) >= SIMILARITY_THRESHOLD
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn levenshtein_basics() {
        assert_eq!(levenshtein("", ""), 0);
        assert_eq!(levenshtein("abc", ""), 3);
        assert_eq!(levenshtein("", "abc"), 3);
        assert_eq!(levenshtein("kitten", "sitting"), 3);
        assert_eq!(levenshtein("flaw", "lawn"), 2);
    }

    #[test]
    fn exact_match_ignoring_case_and_spacing() {
        assert_eq!(similarity("Yes I want to DOOM scroll", CHALLENGE_PHRASE), 1.0);
        assert_eq!(similarity("  yes   i want\tto doom scroll ", CHALLENGE_PHRASE), 1.0);
    }

    #[test]
    fn empty_input_scores_zero() {
        assert_eq!(similarity("", CHALLENGE_PHRASE), 0.0);
        assert_eq!(similarity("   ", CHALLENGE_PHRASE), 0.0);
        assert!(!is_close_enough(""));
    }

    #[test]
    fn single_typo_passes() {
        assert!(is_close_enough("yes i want to doom scrol"));
        assert!(is_close_enough("yes i wnat to doom scroll"));
        assert!(!is_close_enough("no thanks"));
    }

    proptest! {
        #[test]
        fn one_substitution_keeps_similarity_high(
            idx in 0usize..CHALLENGE_PHRASE.len(),
            c in "[a-z]",
        ) {
            let mut chars: Vec<char> = CHALLENGE_PHRASE.chars().collect();
            chars[idx] = c.chars().next().unwrap();
            let typo: String = chars.into_iter().collect();
            prop_assert!(similarity(&typo, CHALLENGE_PHRASE) >= SIMILARITY_THRESHOLD);
        }

        #[test]
        fn similarity_is_bounded(input in ".{0,40}") {
            let s = similarity(&input, CHALLENGE_PHRASE);
            prop_assert!((0.0..=1.0).contains(&s));
        }
    }
}
