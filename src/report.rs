use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::metrics::PageMetrics;
use crate::rules::Finding;
use crate::session::AnalysisSession;
use crate::snapshot::CompetitiveSnapshot;

/// Everything known about one analysis, for `--json` output
#[derive(Debug, Clone, Serialize)]
pub struct AnalysisReport {
    pub url: String,
    pub keyword: String,
    pub analyzed_at: DateTime<Utc>,
    pub metrics: PageMetrics,
    pub findings: Vec<Finding>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub snapshot: Option<CompetitiveSnapshot>,
}

impl AnalysisReport {
    /// Build a report for the session's current page, if any
    pub fn from_session(session: &AnalysisSession) -> Option<Self> {
        let page = session.page()?;
        Some(Self {
            url: page.url.clone(),
            keyword: page.keyword.to_string(),
            analyzed_at: Utc::now(),
            metrics: PageMetrics::compute(&page.document, &page.keyword),
            findings: page.findings.clone(),
            snapshot: session.snapshot().cloned(),
        })
    }
}

/// Format a percentage for display with two decimals
pub fn format_percent(value: f64) -> String {
    format!("{:.2}%", value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::PageDocument;
    use crate::metrics::Keyword;

    #[test]
    fn test_report_from_empty_session() {
        assert!(AnalysisReport::from_session(&AnalysisSession::default()).is_none());
    }

    #[test]
    fn test_report_serializes_findings() {
        let mut session = AnalysisSession::default();
        let token = session.begin();
        session.load(token, "https://a.test", PageDocument::default(), Keyword::new("shoes"));

        let report = AnalysisReport::from_session(&session).unwrap();
        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["url"], "https://a.test");
        assert_eq!(json["keyword"], "shoes");
        assert_eq!(json["findings"][0]["rule_id"], "title-length");
        assert!(json["metrics"]["keyword_density"].is_null());
        assert!(json.get("snapshot").is_none());
    }

    #[test]
    fn test_format_percent() {
        assert_eq!(format_percent(100.0), "100.00%");
        assert_eq!(format_percent(0.123456), "0.12%");
    }
}
