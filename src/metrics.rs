//! Text metrics derived from a PageDocument and a target keyword
//!
//! Everything here is pure and recomputed on every evaluation.

use regex::{Regex, RegexBuilder};
use serde::{Deserialize, Serialize};

use crate::document::PageDocument;

/// A target keyword, trimmed. May be empty, in which case every
/// keyword-dependent metric is "not applicable".
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Keyword(String);

impl Keyword {
    pub fn new(raw: &str) -> Self {
        Self(raw.trim().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl std::fmt::Display for Keyword {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// All metrics the rule table reads
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PageMetrics {
    pub title_length: usize,
    pub description_length: usize,
    pub h1_count: usize,
    pub link_count: usize,
    /// Body length in characters
    pub content_length: usize,
    pub word_count: usize,
    pub keyword_in_title: bool,
    pub keyword_in_description: bool,
    /// False when there is no H1 at all
    pub keyword_in_first_h1: bool,
    /// Percentage, unrounded. None when the keyword is empty or the body has no words.
    pub keyword_density: Option<f64>,
}

impl PageMetrics {
    pub fn compute(doc: &PageDocument, keyword: &Keyword) -> Self {
        let kw = keyword.as_str();

        Self {
            title_length: char_length(&doc.title),
            description_length: char_length(&doc.meta_description),
            h1_count: doc.h1_tags.len(),
            link_count: doc.links.len(),
            content_length: char_length(&doc.body_text),
            word_count: word_count(&doc.body_text),
            keyword_in_title: contains_keyword(&doc.title, kw),
            keyword_in_description: contains_keyword(&doc.meta_description, kw),
            keyword_in_first_h1: doc
                .h1_tags
                .first()
                .is_some_and(|h1| contains_keyword(h1, kw)),
            keyword_density: keyword_density(&doc.body_text, kw),
        }
    }
}

/// Length in characters, not bytes
pub fn char_length(text: &str) -> usize {
    text.chars().count()
}

/// Case-insensitive substring test. Always false for an empty keyword.
pub fn contains_keyword(text: &str, keyword: &str) -> bool {
    keyword_matcher(keyword).is_some_and(|re| re.is_match(text))
}

/// Number of whitespace-delimited tokens
pub fn word_count(text: &str) -> usize {
    text.split_whitespace().count()
}

/// Count case-insensitive, non-overlapping occurrences of `keyword` as a literal.
/// Matches inside longer words count ("shoes" is found in "snowshoes").
pub fn keyword_occurrences(text: &str, keyword: &str) -> usize {
    keyword_matcher(keyword).map_or(0, |re| re.find_iter(text).count())
}

/// Case-insensitive literal matcher shared by presence and occurrence checks,
/// so both agree on case folding. None for an empty keyword.
fn keyword_matcher(keyword: &str) -> Option<Regex> {
    if keyword.is_empty() {
        return None;
    }
    // An escaped literal always compiles; size limits are the only failure mode.
    RegexBuilder::new(&regex::escape(keyword))
        .case_insensitive(true)
        .build()
        .map_err(|e| log::warn!("Could not build keyword matcher for {:?}: {}", keyword, e))
        .ok()
}

/// Keyword occurrences per hundred words
pub fn keyword_density(text: &str, keyword: &str) -> Option<f64> {
    if keyword.is_empty() {
        return None;
    }
    let words = word_count(text);
    if words == 0 {
        return None;
    }
    Some(keyword_occurrences(text, keyword) as f64 * 100.0 / words as f64)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_keyword_is_trimmed() {
        let kw = Keyword::new("  running shoes \n");
        assert_eq!(kw.as_str(), "running shoes");
        assert!(Keyword::new("   ").is_empty());
    }

    #[test]
    fn test_contains_keyword_case_insensitive() {
        assert!(contains_keyword("Best Running SHOES", "running shoes"));
        assert!(!contains_keyword("Best sneakers", "shoes"));
        assert!(!contains_keyword("anything", ""));
    }

    #[test]
    fn test_presence_agrees_with_occurrences() {
        let cases = [
            ("STRASSE und Straße", "straße"),
            ("ΣΟΦΙΑ", "σοφια"),
            ("İstanbul guide", "istanbul"),
            ("KELVIN \u{212A}", "k"),
            ("c++ tips", "C++"),
            ("nothing", "shoes"),
        ];
        for (text, keyword) in cases {
            assert_eq!(
                contains_keyword(text, keyword),
                keyword_occurrences(text, keyword) > 0,
                "{:?} in {:?}",
                keyword,
                text
            );
        }
    }

    #[test]
    fn test_word_count_ignores_repeated_whitespace() {
        assert_eq!(word_count(""), 0);
        assert_eq!(word_count("   \n\t "), 0);
        assert_eq!(word_count("one  two\n\nthree\t four "), 4);
    }

    #[test]
    fn test_occurrences_are_substring_and_non_overlapping() {
        assert_eq!(keyword_occurrences("Snowshoes and SHOES", "shoes"), 2);
        assert_eq!(keyword_occurrences("aaaa", "aa"), 2);
        assert_eq!(keyword_occurrences("c++ and C++", "c++"), 2);
        assert_eq!(keyword_occurrences("nothing here", ""), 0);
    }

    #[test]
    fn test_density_formula() {
        // 1 hit in 4 words
        let density = keyword_density("buy shoes online today", "shoes").unwrap();
        assert!((density - 25.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_density_not_applicable() {
        assert_eq!(keyword_density("", "shoes"), None);
        assert_eq!(keyword_density("some words", ""), None);
    }

    #[test]
    fn test_compute_metrics() {
        let doc = PageDocument {
            title: "Trail Shoes".into(),
            meta_description: "Shoes for trails".into(),
            h1_tags: vec!["Running gear".into(), "Shoes".into()],
            links: vec!["/a".into()],
            body_text: "héllo wörld".into(),
        };
        let metrics = PageMetrics::compute(&doc, &Keyword::new("shoes"));
        assert_eq!(metrics.title_length, 11);
        assert_eq!(metrics.content_length, 11);
        assert_eq!(metrics.h1_count, 2);
        assert_eq!(metrics.link_count, 1);
        assert!(metrics.keyword_in_title);
        assert!(metrics.keyword_in_description);
        assert!(!metrics.keyword_in_first_h1);
        assert_eq!(metrics.keyword_density, Some(0.0));
    }
}
