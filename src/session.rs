//! Analysis session - the one owner of per-analysis state
//!
//! Every request takes a [`RequestToken`] from [`AnalysisSession::begin`].
//! Results carrying an older token than the latest one are dropped, so a
//! slow response for a previous URL can never replace newer findings.

use crate::document::PageDocument;
use crate::error::Result;
use crate::metrics::Keyword;
use crate::rules::{self, Finding, RuleThresholds};
use crate::snapshot::CompetitiveSnapshot;
use crate::tracker::{CompletionModel, FindingTracker};

/// Generation number of one analysis request
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct RequestToken(u64);

/// The page currently on display and its findings
#[derive(Debug, Clone)]
pub struct LoadedPage {
    pub url: String,
    pub keyword: Keyword,
    pub document: PageDocument,
    pub findings: Vec<Finding>,
    pub token: RequestToken,
}

#[derive(Debug, Default)]
pub struct AnalysisSession {
    generation: u64,
    thresholds: RuleThresholds,
    page: Option<LoadedPage>,
    snapshot: Option<(RequestToken, CompetitiveSnapshot)>,
    tracker: FindingTracker,
}

impl AnalysisSession {
    pub fn new(thresholds: RuleThresholds, model: CompletionModel) -> Self {
        Self {
            thresholds,
            tracker: FindingTracker::new(model),
            ..Default::default()
        }
    }

    /// Start a new request. Any request begun earlier becomes stale.
    pub fn begin(&mut self) -> RequestToken {
        self.generation += 1;
        RequestToken(self.generation)
    }

    pub fn is_current(&self, token: RequestToken) -> bool {
        token.0 == self.generation
    }

    /// Evaluate `document` and make it the current page.
    ///
    /// Returns false, changing nothing, when `token` is stale.
    pub fn load(
        &mut self,
        token: RequestToken,
        url: &str,
        document: PageDocument,
        keyword: Keyword,
    ) -> bool {
        if !self.is_current(token) {
            log::debug!("Discarding stale page for {} ({:?})", url, token);
            return false;
        }

        let findings = rules::evaluate_with(&document, &keyword, &self.thresholds);
        self.tracker.reset(findings.len());

        if self.snapshot.as_ref().is_some_and(|(t, _)| *t != token) {
            self.snapshot = None;
        }

        log::info!("Loaded {} with {} finding(s)", url, findings.len());
        self.page = Some(LoadedPage {
            url: url.to_string(),
            keyword,
            document,
            findings,
            token,
        });
        true
    }

    /// Attach a competitive snapshot. Returns false when `token` is stale.
    pub fn attach_snapshot(&mut self, token: RequestToken, snapshot: CompetitiveSnapshot) -> bool {
        if !self.is_current(token) {
            log::debug!("Discarding stale snapshot ({:?})", token);
            return false;
        }
        self.snapshot = Some((token, snapshot));
        true
    }

    pub fn page(&self) -> Option<&LoadedPage> {
        self.page.as_ref()
    }

    pub fn findings(&self) -> &[Finding] {
        self.page.as_ref().map(|p| p.findings.as_slice()).unwrap_or_default()
    }

    /// The snapshot for the page on display, if it has arrived
    pub fn snapshot(&self) -> Option<&CompetitiveSnapshot> {
        let page_token = self.page.as_ref().map(|p| p.token)?;
        self.snapshot
            .as_ref()
            .filter(|(t, _)| *t == page_token)
            .map(|(_, s)| s)
    }

    pub fn thresholds(&self) -> &RuleThresholds {
        &self.thresholds
    }

    pub fn tracker(&self) -> &FindingTracker {
        &self.tracker
    }

    pub fn set_completion(&mut self, index: usize, checked: bool) -> Result<()> {
        self.tracker.set_completion(index, checked)
    }

    pub fn progress_ratio(&self) -> f64 {
        self.tracker.progress_ratio()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn snapshot() -> CompetitiveSnapshot {
        CompetitiveSnapshot {
            top_keywords: vec!["shoes".into()],
            avg_title_length: 50,
            avg_description_length: 140,
            common_title_elements: vec![],
        }
    }

    #[test]
    fn test_load_evaluates_and_resets_tracker() {
        let mut session = AnalysisSession::default();
        let first = session.begin();
        assert!(session.load(first, "https://a.test", PageDocument::default(), Keyword::new("shoes")));
        let total = session.findings().len();
        assert_eq!(session.tracker().total(), total);

        session.set_completion(total - 1, true).unwrap();
        assert_eq!(session.progress_ratio(), 1.0);

        let second = session.begin();
        assert!(session.load(second, "https://b.test", PageDocument::default(), Keyword::new("")));
        assert_eq!(session.tracker().watermark(), 0);
        assert_eq!(session.page().unwrap().url, "https://b.test");
    }

    #[test]
    fn test_stale_page_is_discarded() {
        let mut session = AnalysisSession::default();
        let old = session.begin();
        let new = session.begin();

        assert!(session.load(new, "https://new.test", PageDocument::default(), Keyword::new("x")));
        assert!(!session.load(old, "https://old.test", PageDocument::default(), Keyword::new("x")));
        assert_eq!(session.page().unwrap().url, "https://new.test");
    }

    #[test]
    fn test_snapshot_may_arrive_before_page() {
        let mut session = AnalysisSession::default();
        let token = session.begin();
        assert!(session.attach_snapshot(token, snapshot()));
        // Not shown until its page is loaded
        assert!(session.snapshot().is_none());

        session.load(token, "https://a.test", PageDocument::default(), Keyword::new("shoes"));
        assert_eq!(session.snapshot().unwrap().avg_title_length, 50);
    }

    #[test]
    fn test_stale_snapshot_is_discarded() {
        let mut session = AnalysisSession::default();
        let old = session.begin();
        session.load(old, "https://a.test", PageDocument::default(), Keyword::new("shoes"));
        session.attach_snapshot(old, snapshot());

        let new = session.begin();
        assert!(!session.attach_snapshot(old, snapshot()));
        session.load(new, "https://b.test", PageDocument::default(), Keyword::new("shoes"));
        assert!(session.snapshot().is_none());
    }

    #[test]
    fn test_custom_thresholds_apply() {
        let thresholds = RuleThresholds {
            min_links: 0,
            ..RuleThresholds::default()
        };
        let mut session = AnalysisSession::new(thresholds, CompletionModel::PerItem);
        let token = session.begin();
        session.load(token, "https://a.test", PageDocument::default(), Keyword::new(""));
        assert!(session.findings().iter().all(|f| f.rule_id != "link-count"));
        assert_eq!(session.tracker().model(), CompletionModel::PerItem);
    }
}
