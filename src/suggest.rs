//! Did-you-mean suggestions for failed name lookups.
//!
//! Scoring is delegated to frizbee's Smith-Waterman matcher; this
//! module only ranks and trims its output.

use frizbee::{Config, match_list};

/// How many suggestions a failed lookup carries at most.
pub const MAX_SUGGESTIONS: usize = 5;

/// Closest candidate names for a missed lookup, best match first.
///
/// Candidates that share nothing with `name` score zero and are
/// dropped, so the result may be empty.
pub fn did_you_mean<'a, I>(name: &str, candidates: I) -> Vec<String>
where
    I: IntoIterator<Item = &'a str>,
{
    let haystacks: Vec<&str> = candidates.into_iter().collect();
    if name.is_empty() || haystacks.is_empty() {
        return Vec::new();
    }

    let config = Config::default();
    let mut matches = match_list(name, &haystacks, &config);
    matches.sort_by(|a, b| b.score.cmp(&a.score));
    matches
        .into_iter()
        .filter(|entry| entry.score > 0)
        .take(MAX_SUGGESTIONS)
        .map(|entry| haystacks[entry.index as usize].to_string())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_close_names_are_suggested_best_first() {
        let suggestions = did_you_mean(
            "pLab-17",
            ["pLab-170", "pLab-17b", "mCherry-C1", "pLab-1"],
        );
        assert!(!suggestions.is_empty());
        assert!(suggestions[0].starts_with("pLab-17"));
    }

    #[test]
    fn test_unrelated_names_are_dropped() {
        let suggestions = did_you_mean("pLab-17", ["zzzz", "qqqq"]);
        assert!(suggestions.is_empty());
    }

    #[test]
    fn test_suggestion_count_is_capped() {
        let candidates: Vec<String> = (0..20).map(|i| format!("part-{i}")).collect();
        let refs: Vec<&str> = candidates.iter().map(String::as_str).collect();
        let suggestions = did_you_mean("part-1", refs);
        assert!(suggestions.len() <= MAX_SUGGESTIONS);
        assert!(!suggestions.is_empty());
    }

    #[test]
    fn test_empty_inputs() {
        assert!(did_you_mean("", ["a", "b"]).is_empty());
        assert!(did_you_mean("a", std::iter::empty::<&str>()).is_empty());
    }
}
