//! Fuzzy name matching shared by the Post-Extraction Linker (spec §4.5):
//! case-folded substring containment plus an edit-ratio fallback, threshold
//! 0.6.

pub const MATCH_THRESHOLD: f64 = 0.6;

/// True when `needle` is a case-folded substring of `haystack`, or when
/// `strsim::normalized_levenshtein` between the two (case-folded) reaches
/// [`MATCH_THRESHOLD`].
pub fn fuzzy_matches(needle: &str, haystack: &str) -> bool {
    let needle = needle.trim().to_lowercase();
    let haystack = haystack.trim().to_lowercase();
    if needle.is_empty() || haystack.is_empty() {
        return false;
    }
    if haystack.contains(&needle) || needle.contains(&haystack) {
        return true;
    }
    strsim::normalized_levenshtein(&needle, &haystack) >= MATCH_THRESHOLD
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exact_and_substring_matches() {
        assert!(fuzzy_matches("login", "Login Screen"));
        assert!(fuzzy_matches("Login Screen", "login"));
    }

    #[test]
    fn near_miss_spelling_matches_via_edit_ratio() {
        assert!(fuzzy_matches("Checkuot", "Checkout"));
    }

    #[test]
    fn unrelated_names_do_not_match() {
        assert!(!fuzzy_matches("Login", "Settings Panel"));
    }

    #[test]
    fn empty_strings_never_match() {
        assert!(!fuzzy_matches("", "anything"));
        assert!(!fuzzy_matches("anything", ""));
    }
}
