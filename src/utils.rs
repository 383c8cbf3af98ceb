//! Shared utility functions

use seocheck::metrics::Keyword;
use url::Url;

/// Width of the text progress bar
const PROGRESS_WIDTH: usize = 20;

/// Accept full URLs and bare domains ("example.com/page" -> "https://example.com/page").
///
/// Anything that already carries a scheme is returned unchanged, so
/// `validate_target` can reject `file:`, `mailto:` and the like.
pub fn normalize_url(input: &str) -> seocheck::Result<String> {
    let input = input.trim();
    if input.is_empty() {
        return Err(seocheck::SeoError::InvalidInput("URL is empty".into()));
    }

    match Url::parse(input) {
        // "example.com:8080/page" parses with "example.com" as its scheme
        Ok(_) if has_port_after_host(input) => Ok(format!("https://{}", input)),
        Ok(_) => Ok(input.to_string()),
        Err(url::ParseError::RelativeUrlWithoutBase) if looks_like_domain(input) => {
            Ok(format!("https://{}", input))
        }
        Err(url::ParseError::RelativeUrlWithoutBase) => Err(seocheck::SeoError::InvalidInput(
            format!("'{}' does not look like a URL", input),
        )),
        Err(e) => Err(seocheck::SeoError::InvalidInput(format!(
            "malformed URL '{}': {}",
            input, e
        ))),
    }
}

/// Contains a dot and no spaces
fn looks_like_domain(input: &str) -> bool {
    input.contains('.') && !input.contains(char::is_whitespace)
}

fn has_port_after_host(input: &str) -> bool {
    input.split_once(':').is_some_and(|(host, rest)| {
        looks_like_domain(host) && rest.starts_with(|c: char| c.is_ascii_digit())
    })
}

/// Commands require a keyword; the evaluator itself tolerates an empty one
pub fn require_keyword(raw: &str) -> seocheck::Result<Keyword> {
    let keyword = Keyword::new(raw);
    if keyword.is_empty() {
        return Err(seocheck::SeoError::InvalidInput("keyword is empty".into()));
    }
    Ok(keyword)
}

/// Truncate a string to max_len characters (not bytes), adding "..." if truncated.
/// Safe for non-ASCII content (emoji, CJK, etc).
pub fn truncate_str(s: &str, max_len: usize) -> String {
    let chars: Vec<char> = s.chars().collect();
    if chars.len() <= max_len {
        s.to_string()
    } else if max_len <= 3 {
        chars[..max_len].iter().collect()
    } else {
        format!("{}...", chars[..max_len - 3].iter().collect::<String>())
    }
}

/// Render a ratio in [0, 1] as "[#####-----] 50%"
pub fn progress_bar(ratio: f64) -> String {
    let ratio = ratio.clamp(0.0, 1.0);
    let filled = (ratio * PROGRESS_WIDTH as f64).round() as usize;
    format!(
        "[{}{}] {:.0}%",
        "#".repeat(filled),
        "-".repeat(PROGRESS_WIDTH - filled),
        ratio * 100.0
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_url() {
        assert_eq!(normalize_url("https://example.com").unwrap(), "https://example.com");
        assert_eq!(normalize_url("example.com/page").unwrap(), "https://example.com/page");
        assert_eq!(normalize_url("  ftp://host/file ").unwrap(), "ftp://host/file");
        assert!(normalize_url("").is_err());
        assert!(normalize_url("not a url").is_err());
        assert_eq!(
            normalize_url("example.com:8080/page").unwrap(),
            "https://example.com:8080/page"
        );
    }

    #[test]
    fn test_normalize_url_keeps_foreign_schemes() {
        for input in ["file:/x.txt", "file:/etc/passwd.txt", "mailto:a@b.com", "javascript:alert(1)"] {
            let normalized = normalize_url(input).unwrap();
            assert_eq!(normalized, input);
            let err = seocheck::fetch::validate_target(&normalized).unwrap_err();
            assert!(matches!(err, seocheck::SeoError::InvalidInput(_)), "{}", input);
        }
    }

    #[test]
    fn test_require_keyword() {
        assert_eq!(require_keyword("  shoes ").unwrap().as_str(), "shoes");
        assert!(require_keyword("   ").is_err());
    }

    #[test]
    fn test_truncate_str() {
        assert_eq!(truncate_str("hello", 10), "hello");
        assert_eq!(truncate_str("hello world", 8), "hello...");
        assert_eq!(truncate_str("日本語テキスト", 5), "日本...");
    }

    #[test]
    fn test_progress_bar() {
        assert_eq!(progress_bar(0.0), format!("[{}] 0%", "-".repeat(20)));
        assert_eq!(progress_bar(1.0), format!("[{}] 100%", "#".repeat(20)));
        assert_eq!(progress_bar(0.5), format!("[{}{}] 50%", "#".repeat(10), "-".repeat(10)));
    }
}
