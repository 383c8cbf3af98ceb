use thiserror::Error;

/// Broad category of a failure, used to pick the user-facing message
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Bad URL or keyword, rejected before any network call
    Input,
    /// Proxy or target answered with status >= 400
    UpstreamHttp,
    /// No response at all (timeout, DNS, connection refused)
    Network,
    /// Response arrived but the body is empty or not text
    Parse,
    /// Local problems: config files, I/O, serialization, caller misuse
    Local,
}

#[derive(Error, Debug)]
pub enum SeoError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Upstream returned HTTP {status}")]
    UpstreamStatus { status: u16 },

    #[error("Request timed out")]
    Timeout,

    #[error("Network error: {0}")]
    Network(String),

    #[error("Empty or invalid content: {0}")]
    EmptyContent(String),

    #[error("Finding index {index} is out of range ({total} findings)")]
    FindingIndexOutOfRange { index: usize, total: usize },

    #[error("Snapshot provider failed: {0}")]
    SnapshotError(String),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Interactive prompt failed: {0}")]
    PromptError(String),

    #[error("'{0}' support is not compiled into this build")]
    FeatureDisabled(&'static str),

    #[error("JSON serialization error: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("TOML parsing error: {0}")]
    TomlError(#[from] toml::de::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("URL parse error: {0}")]
    UrlParseError(#[from] url::ParseError),
}

impl SeoError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            SeoError::InvalidInput(_) | SeoError::UrlParseError(_) => ErrorKind::Input,
            SeoError::UpstreamStatus { .. } => ErrorKind::UpstreamHttp,
            SeoError::Timeout | SeoError::Network(_) => ErrorKind::Network,
            SeoError::EmptyContent(_) => ErrorKind::Parse,
            _ => ErrorKind::Local,
        }
    }

    /// Get an actionable hint for how to resolve this error
    pub fn hint(&self) -> Option<&'static str> {
        match self {
            SeoError::InvalidInput(_) | SeoError::UrlParseError(_) => Some(
                "Pass a full http(s) URL and a non-empty keyword:\n  seocheck analyze https://example.com -k \"running shoes\""
            ),
            SeoError::UpstreamStatus { status: 0 | 403 } => Some(
                "The site may be blocking cross-origin or automated requests (CORS).\nTry running through the proxy: seocheck serve, then seocheck analyze <url> --proxy http://127.0.0.1:8080"
            ),
            SeoError::UpstreamStatus { .. } => Some(
                "Check that the URL is correct and publicly reachable"
            ),
            SeoError::Timeout => Some(
                "The request timed out. Raise [fetch] timeout_secs in the config or try again later"
            ),
            SeoError::Network(_) => Some(
                "Check your connection, and that the proxy is running if one is configured"
            ),
            SeoError::EmptyContent(_) => Some(
                "The page returned no readable HTML. It may require JavaScript or block bots"
            ),
            SeoError::ConfigError(_) | SeoError::TomlError(_) => Some(
                "Inspect your configuration with `seocheck config show`"
            ),
            SeoError::PromptError(_) => Some(
                "`seocheck review` needs an interactive terminal. Use `seocheck analyze` in scripts"
            ),
            SeoError::FeatureDisabled(_) => Some(
                "Rebuild with the default features enabled, e.g. cargo install seocheck --features proxy"
            ),
            _ => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, SeoError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kinds() {
        assert_eq!(SeoError::InvalidInput("x".into()).kind(), ErrorKind::Input);
        assert_eq!(SeoError::UpstreamStatus { status: 404 }.kind(), ErrorKind::UpstreamHttp);
        assert_eq!(SeoError::Timeout.kind(), ErrorKind::Network);
        assert_eq!(SeoError::Network("reset".into()).kind(), ErrorKind::Network);
        assert_eq!(SeoError::EmptyContent("".into()).kind(), ErrorKind::Parse);
        assert_eq!(SeoError::ConfigError("".into()).kind(), ErrorKind::Local);
        assert_eq!(SeoError::PromptError("".into()).kind(), ErrorKind::Local);
        assert_eq!(SeoError::FeatureDisabled("proxy").kind(), ErrorKind::Local);
    }

    #[test]
    fn test_prompt_and_feature_hints_do_not_blame_config() {
        let prompt = SeoError::PromptError("not a tty".into()).hint().unwrap();
        assert!(prompt.contains("interactive terminal"));
        assert!(!prompt.contains("config"));

        let feature = SeoError::FeatureDisabled("proxy");
        assert_eq!(feature.to_string(), "'proxy' support is not compiled into this build");
        assert!(feature.hint().unwrap().contains("--features proxy"));
    }

    #[test]
    fn test_cors_hint_only_for_0_and_403() {
        for status in [0u16, 403] {
            let hint = SeoError::UpstreamStatus { status }.hint().unwrap();
            assert!(hint.contains("CORS"));
        }
        let hint = SeoError::UpstreamStatus { status: 404 }.hint().unwrap();
        assert!(!hint.contains("CORS"));
    }

    #[test]
    fn test_messages() {
        assert_eq!(SeoError::Timeout.to_string(), "Request timed out");
        assert_eq!(
            SeoError::UpstreamStatus { status: 502 }.to_string(),
            "Upstream returned HTTP 502"
        );
        assert!(SeoError::EmptyContent("no body".into())
            .to_string()
            .starts_with("Empty or invalid content"));
    }
}
