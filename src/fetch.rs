use std::io;

use url::Url;

use crate::config::FetchConfig;
use crate::document::PageDocument;
use crate::error::{Result, SeoError};

/// Content type assumed when the target does not send one
pub const DEFAULT_CONTENT_TYPE: &str = "text/html; charset=utf-8";

/// Raw response, whatever its status
#[derive(Debug, Clone)]
pub struct FetchResponse {
    pub status: u16,
    pub content_type: String,
    pub body: String,
}

/// Fetches pages directly or through a `seocheck serve` proxy
#[derive(Clone)]
pub struct PageFetcher {
    agent: ureq::Agent,
    user_agent: String,
    proxy_base: Option<String>,
}

/// Build an agent that hands every status back to the caller instead of erroring
pub fn build_agent(config: &FetchConfig) -> ureq::Agent {
    ureq::Agent::config_builder()
        .timeout_global(Some(config.timeout()))
        .http_status_as_error(false)
        .build()
        .into()
}

impl PageFetcher {
    pub fn new(config: &FetchConfig) -> Self {
        Self {
            agent: build_agent(config),
            user_agent: config.user_agent.clone(),
            proxy_base: config.proxy_url.clone(),
        }
    }

    /// Route requests through the proxy at `base`, or fetch directly when None
    pub fn with_proxy(mut self, base: Option<String>) -> Self {
        self.proxy_base = base;
        self
    }

    pub fn proxy_base(&self) -> Option<&str> {
        self.proxy_base.as_deref()
    }

    /// The URL actually requested for `target`
    pub fn request_url(&self, target: &Url) -> String {
        match &self.proxy_base {
            Some(base) => format!(
                "{}/proxy?url={}",
                base.trim_end_matches('/'),
                urlencoding::encode(target.as_str())
            ),
            None => target.to_string(),
        }
    }

    /// GET `target`. Statuses >= 400 are returned, not raised.
    pub fn fetch(&self, target: &str) -> Result<FetchResponse> {
        let target = validate_target(target)?;
        let request_url = self.request_url(&target);
        log::debug!("GET {}", request_url);

        let response = self
            .agent
            .get(&request_url)
            .header("User-Agent", &self.user_agent)
            .call()
            .map_err(classify_transport_error)?;

        let status = response.status().as_u16();
        let content_type = response
            .headers()
            .get("content-type")
            .and_then(|v| v.to_str().ok())
            .unwrap_or(DEFAULT_CONTENT_TYPE)
            .to_string();
        let bytes = response
            .into_body()
            .read_to_vec()
            .map_err(classify_transport_error)?;

        log::debug!("{} -> {} ({} bytes, {})", request_url, status, bytes.len(), content_type);

        Ok(FetchResponse {
            status,
            content_type,
            body: String::from_utf8_lossy(&bytes).into_owned(),
        })
    }

    /// Fetch `target` and extract its document, applying the error taxonomy
    pub fn fetch_document(&self, target: &str) -> Result<PageDocument> {
        let response = self.fetch(target)?;
        let html = check_response(response)?;
        Ok(PageDocument::parse(&html))
    }
}

/// Reject anything that is not an absolute http(s) URL with a host
pub fn validate_target(raw: &str) -> Result<Url> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Err(SeoError::InvalidInput("URL is empty".into()));
    }

    let url = Url::parse(raw)
        .map_err(|e| SeoError::InvalidInput(format!("malformed URL '{}': {}", raw, e)))?;

    match url.scheme() {
        "http" | "https" => {}
        other => {
            return Err(SeoError::InvalidInput(format!(
                "unsupported scheme '{}', only http and https are allowed",
                other
            )))
        }
    }

    if url.host_str().map_or(true, str::is_empty) {
        return Err(SeoError::InvalidInput(format!("URL '{}' has no host", raw)));
    }

    Ok(url)
}

/// Turn a raw response into HTML, or the matching error
pub fn check_response(response: FetchResponse) -> Result<String> {
    if response.status >= 400 {
        return Err(SeoError::UpstreamStatus {
            status: response.status,
        });
    }
    if !is_textual(&response.content_type) {
        return Err(SeoError::EmptyContent(format!(
            "expected HTML but got '{}'",
            response.content_type
        )));
    }
    if response.body.trim().is_empty() {
        return Err(SeoError::EmptyContent("response body is empty".into()));
    }
    Ok(response.body)
}

/// Whether a Content-Type can plausibly hold a web page
pub fn is_textual(content_type: &str) -> bool {
    let ct = content_type.trim().to_ascii_lowercase();
    ct.is_empty()
        || ct.starts_with("text/")
        || ct.contains("html")
        || ct.contains("xml")
}

/// Map a transport failure onto the network/upstream taxonomy
pub fn classify_transport_error(err: ureq::Error) -> SeoError {
    match err {
        ureq::Error::Timeout(_) => SeoError::Timeout,
        ureq::Error::StatusCode(status) => SeoError::UpstreamStatus { status },
        ureq::Error::Io(e) if e.kind() == io::ErrorKind::TimedOut => SeoError::Timeout,
        other => SeoError::Network(other.to_string()),
    }
}
