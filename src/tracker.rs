//! Acknowledgment state for the findings of the current analysis

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::error::{Result, SeoError};

/// How acknowledgments are recorded
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CompletionModel {
    /// A single "everything before this index is done" counter.
    /// Unchecking index i drops every acknowledgment at or after i.
    #[default]
    Watermark,
    /// Each finding is acknowledged independently
    PerItem,
}

/// Tracks which findings the user has acknowledged.
///
/// Indices refer to positions in the last finding list passed to [`reset`].
/// Out-of-range indices are rejected and leave the state untouched.
///
/// [`reset`]: FindingTracker::reset
#[derive(Debug, Clone, Default)]
pub struct FindingTracker {
    model: CompletionModel,
    total: usize,
    watermark: usize,
    acknowledged: BTreeSet<usize>,
}

impl FindingTracker {
    pub fn new(model: CompletionModel) -> Self {
        Self {
            model,
            ..Default::default()
        }
    }

    pub fn model(&self) -> CompletionModel {
        self.model
    }

    /// Start over for a freshly produced finding list
    pub fn reset(&mut self, total: usize) {
        self.total = total;
        self.watermark = 0;
        self.acknowledged.clear();
    }

    pub fn total(&self) -> usize {
        self.total
    }

    /// Highest acknowledged index + 1 (watermark model).
    /// Under the per-item model this is the length of the acknowledged prefix.
    pub fn watermark(&self) -> usize {
        match self.model {
            CompletionModel::Watermark => self.watermark,
            CompletionModel::PerItem => (0..self.total)
                .take_while(|i| self.acknowledged.contains(i))
                .count(),
        }
    }

    pub fn set_completion(&mut self, index: usize, checked: bool) -> Result<()> {
        if index >= self.total {
            return Err(SeoError::FindingIndexOutOfRange {
                index,
                total: self.total,
            });
        }

        match self.model {
            CompletionModel::Watermark => {
                self.watermark = if checked {
                    self.watermark.max(index + 1)
                } else {
                    index
                };
            }
            CompletionModel::PerItem => {
                if checked {
                    self.acknowledged.insert(index);
                } else {
                    self.acknowledged.remove(&index);
                }
            }
        }
        Ok(())
    }

    pub fn is_complete(&self, index: usize) -> bool {
        match self.model {
            CompletionModel::Watermark => self.watermark > index,
            CompletionModel::PerItem => self.acknowledged.contains(&index),
        }
    }

    pub fn completed_count(&self) -> usize {
        match self.model {
            CompletionModel::Watermark => self.watermark,
            CompletionModel::PerItem => self.acknowledged.len(),
        }
    }

    /// Fraction of findings acknowledged, 0.0 when there are none
    pub fn progress_ratio(&self) -> f64 {
        if self.total == 0 {
            return 0.0;
        }
        self.completed_count() as f64 / self.total as f64
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tracker(model: CompletionModel, total: usize) -> FindingTracker {
        let mut t = FindingTracker::new(model);
        t.reset(total);
        t
    }

    #[test]
    fn test_check_raises_watermark() {
        let mut t = tracker(CompletionModel::Watermark, 5);
        t.set_completion(2, true).unwrap();
        assert_eq!(t.watermark(), 3);
        assert!(t.is_complete(0));
        assert!(t.is_complete(2));
        assert!(!t.is_complete(3));

        // Checking a lower index never lowers the watermark
        t.set_completion(0, true).unwrap();
        assert_eq!(t.watermark(), 3);
        assert!((t.progress_ratio() - 0.6).abs() < 1e-9);
    }

    #[test]
    fn test_uncheck_resets_to_index() {
        let mut t = tracker(CompletionModel::Watermark, 5);
        t.set_completion(2, true).unwrap();
        t.set_completion(0, false).unwrap();
        assert_eq!(t.watermark(), 0);
        assert_eq!(t.progress_ratio(), 0.0);

        // Unchecking above the watermark raises it to that index
        t.set_completion(3, false).unwrap();
        assert_eq!(t.watermark(), 3);
    }

    #[test]
    fn test_out_of_range_is_rejected() {
        let mut t = tracker(CompletionModel::Watermark, 2);
        t.set_completion(1, true).unwrap();
        let err = t.set_completion(2, true).unwrap_err();
        assert!(matches!(err, SeoError::FindingIndexOutOfRange { index: 2, total: 2 }));
        assert_eq!(t.watermark(), 2);
    }

    #[test]
    fn test_progress_with_no_findings() {
        let mut t = tracker(CompletionModel::Watermark, 0);
        assert_eq!(t.progress_ratio(), 0.0);
        assert!(t.set_completion(0, true).is_err());
    }

    #[test]
    fn test_reset_clears_state() {
        let mut t = tracker(CompletionModel::Watermark, 4);
        t.set_completion(3, true).unwrap();
        t.reset(2);
        assert_eq!(t.watermark(), 0);
        assert_eq!(t.total(), 2);
        assert!(!t.is_complete(0));
    }

    #[test]
    fn test_per_item_model_is_independent() {
        let mut t = tracker(CompletionModel::PerItem, 5);
        t.set_completion(2, true).unwrap();
        t.set_completion(0, false).unwrap();
        assert!(t.is_complete(2));
        assert!(!t.is_complete(1));
        assert_eq!(t.watermark(), 0);
        assert!((t.progress_ratio() - 0.2).abs() < 1e-9);

        t.set_completion(0, true).unwrap();
        t.set_completion(1, true).unwrap();
        assert_eq!(t.watermark(), 3);
    }
}
