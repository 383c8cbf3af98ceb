//! Competitive snapshot - auxiliary comparison data for a keyword
//!
//! There is no real search-results backend behind this. Providers are
//! pluggable through [`SnapshotProvider`]; the bundled one fabricates
//! plausible, deterministic numbers after a delay. Snapshots are always
//! fetched on a background thread so they never hold up the findings.

use std::sync::mpsc::{self, Receiver, RecvTimeoutError, TryRecvError};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{Result, SeoError};
use crate::session::RequestToken;

/// What the top-ranking pages for a keyword look like
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompetitiveSnapshot {
    pub top_keywords: Vec<String>,
    pub avg_title_length: u32,
    pub avg_description_length: u32,
    pub common_title_elements: Vec<String>,
}

/// Source of competitive snapshots. May be slow.
pub trait SnapshotProvider: Send + Sync {
    fn analyze(&self, keyword: &str) -> Result<CompetitiveSnapshot>;
}

/// Fabricated snapshot after a fixed delay
#[derive(Debug, Clone)]
pub struct MockSnapshotProvider {
    delay: Duration,
}

impl MockSnapshotProvider {
    pub fn new(delay: Duration) -> Self {
        Self { delay }
    }
}

impl Default for MockSnapshotProvider {
    fn default() -> Self {
        Self::new(Duration::from_millis(1500))
    }
}

impl SnapshotProvider for MockSnapshotProvider {
    fn analyze(&self, keyword: &str) -> Result<CompetitiveSnapshot> {
        let keyword = keyword.trim().to_lowercase();
        if keyword.is_empty() {
            return Err(SeoError::InvalidInput(
                "a keyword is required for a competitive snapshot".into(),
            ));
        }

        if !self.delay.is_zero() {
            thread::sleep(self.delay);
        }

        Ok(CompetitiveSnapshot {
            top_keywords: vec![
                keyword.clone(),
                format!("best {}", keyword),
                format!("{} reviews", keyword),
                format!("cheap {}", keyword),
                format!("{} near me", keyword),
            ],
            avg_title_length: 55,
            avg_description_length: 150,
            common_title_elements: vec![
                "Brand name".into(),
                "Numbers".into(),
                "Current year".into(),
                "Power words".into(),
            ],
        })
    }
}

/// A snapshot being computed on a background thread
pub struct PendingSnapshot {
    token: RequestToken,
    rx: Receiver<Result<CompetitiveSnapshot>>,
}

impl PendingSnapshot {
    /// Start `provider.analyze(keyword)` in the background for request `token`
    pub fn spawn(provider: Arc<dyn SnapshotProvider>, keyword: &str, token: RequestToken) -> Self {
        let (tx, rx) = mpsc::channel();
        let keyword = keyword.to_string();

        thread::spawn(move || {
            let result = provider.analyze(&keyword);
            // The receiver may be gone if the caller stopped waiting
            let _ = tx.send(result);
        });

        log::debug!("Snapshot requested for request {:?}", token);
        Self { token, rx }
    }

    /// The request this snapshot belongs to
    pub fn token(&self) -> RequestToken {
        self.token
    }

    /// Non-blocking poll
    pub fn try_take(&self) -> Option<Result<CompetitiveSnapshot>> {
        match self.rx.try_recv() {
            Ok(result) => Some(result),
            Err(TryRecvError::Empty) => None,
            Err(TryRecvError::Disconnected) => Some(Err(SeoError::SnapshotError(
                "snapshot worker exited without a result".into(),
            ))),
        }
    }

    /// Wait up to `timeout`. None means the snapshot did not arrive in time.
    pub fn wait(&self, timeout: Duration) -> Option<Result<CompetitiveSnapshot>> {
        match self.rx.recv_timeout(timeout) {
            Ok(result) => Some(result),
            Err(RecvTimeoutError::Timeout) => None,
            Err(RecvTimeoutError::Disconnected) => Some(Err(SeoError::SnapshotError(
                "snapshot worker exited without a result".into(),
            ))),
        }
    }
}
