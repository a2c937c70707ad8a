//! Cost History Ledger
//!
//! Bounded, persisted log of estimated versus actual generation costs.
//! Every mutation runs read-modify-persist under one mutex so concurrent
//! generations never interleave writes. Persistence failures are logged
//! and never surface to callers.

use chrono::{DateTime, TimeDelta, Utc};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};
use tracing::{debug, warn};

use crate::constants::ledger::MAX_ENTRIES;
use crate::estimate::ContentFamily;
use crate::pricing::{CostEstimate, Currency};
use crate::storage::{read_json, write_json_atomic};

/// One recorded estimate, optionally paired with actual usage
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LedgerEntry {
    pub timestamp: DateTime<Utc>,
    pub model_id: String,
    pub estimated_tokens: u64,
    pub actual_tokens: Option<u64>,
    pub estimated_cost: f64,
    pub actual_cost: Option<f64>,
    pub currency: Currency,
    pub family: ContentFamily,
    pub accuracy_ratio: Option<f64>,
}

/// Estimation accuracy summary
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct AccuracyStats {
    pub average: f64,
    pub min: f64,
    pub max: f64,
    pub count: usize,
}

impl Default for AccuracyStats {
    fn default() -> Self {
        Self {
            average: 1.0,
            min: 1.0,
            max: 1.0,
            count: 0,
        }
    }
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct LedgerFile {
    #[serde(default)]
    entries: Vec<LedgerEntry>,
}

pub struct CostHistoryLedger {
    path: PathBuf,
    max_entries: usize,
    entries: Mutex<Vec<LedgerEntry>>,
}

impl CostHistoryLedger {
    /// Open the ledger at `path` with the default capacity
    pub fn open(path: impl AsRef<Path>) -> Self {
        Self::open_with_capacity(path, MAX_ENTRIES)
    }

    /// Open the ledger, keeping at most `max_entries` (newest win)
    pub fn open_with_capacity(path: impl AsRef<Path>, max_entries: usize) -> Self {
        let path = path.as_ref().to_path_buf();
        let max_entries = max_entries.max(1);
        let mut entries = read_json::<LedgerFile>(&path)
            .map(|f| f.entries)
            .unwrap_or_default();
        trim(&mut entries, max_entries);
        debug!(path = %path.display(), entries = entries.len(), "Opened cost ledger");

        Self {
            path,
            max_entries,
            entries: Mutex::new(entries),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn lock(&self) -> MutexGuard<'_, Vec<LedgerEntry>> {
        self.entries.lock().unwrap_or_else(|p| p.into_inner())
    }

    fn persist(&self, entries: &[LedgerEntry]) {
        let file = LedgerFile {
            entries: entries.to_vec(),
        };
        if let Err(e) = write_json_atomic(&self.path, &file) {
            warn!(path = %self.path.display(), error = %e, "Failed to persist cost ledger");
        }
    }

    /// Record an estimate, optionally with actual usage.
    ///
    /// The accuracy ratio is `actual / estimated` and only present when
    /// actual tokens are known and the estimate is non-zero.
    pub fn append(
        &self,
        estimate: &CostEstimate,
        actual_tokens: Option<u64>,
        actual_cost: Option<f64>,
    ) -> LedgerEntry {
        let accuracy_ratio = match actual_tokens {
            Some(actual) if estimate.total_tokens > 0 => {
                Some(actual as f64 / estimate.total_tokens as f64)
            }
            _ => None,
        };

        let entry = LedgerEntry {
            timestamp: estimate.created_at,
            model_id: estimate.model_id.clone(),
            estimated_tokens: estimate.total_tokens,
            actual_tokens,
            estimated_cost: estimate.total_cost,
            actual_cost,
            currency: estimate.currency,
            family: estimate.family,
            accuracy_ratio,
        };

        let mut entries = self.lock();
        entries.push(entry.clone());
        trim(&mut entries, self.max_entries);
        self.persist(&entries);

        entry
    }

    /// Last `limit` entries, oldest first
    pub fn recent(&self, limit: usize) -> Vec<LedgerEntry> {
        let entries = self.lock();
        let start = entries.len().saturating_sub(limit);
        entries[start..].to_vec()
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    /// Spend in `currency` over the trailing `days`, preferring actual cost
    pub fn total_spend(&self, currency: Currency, days: i64) -> f64 {
        // A window too large to represent covers the whole history
        let cutoff =
            TimeDelta::try_days(days).and_then(|window| Utc::now().checked_sub_signed(window));
        self.lock()
            .iter()
            .filter(|e| e.currency == currency && cutoff.is_none_or(|c| e.timestamp >= c))
            .map(|e| e.actual_cost.unwrap_or(e.estimated_cost))
            .sum()
    }

    /// Accuracy statistics, optionally for one model only
    pub fn accuracy(&self, model: Option<&str>) -> AccuracyStats {
        let entries = self.lock();
        let ratios: Vec<f64> = entries
            .iter()
            .filter(|e| model.is_none_or(|m| e.model_id == m))
            .filter_map(|e| e.accuracy_ratio)
            .collect();

        if ratios.is_empty() {
            return AccuracyStats::default();
        }

        AccuracyStats {
            average: ratios.iter().sum::<f64>() / ratios.len() as f64,
            min: ratios.iter().copied().fold(f64::INFINITY, f64::min),
            max: ratios.iter().copied().fold(f64::NEG_INFINITY, f64::max),
            count: ratios.len(),
        }
    }

    /// Drop every entry and persist the empty ledger
    pub fn clear(&self) {
        let mut entries = self.lock();
        entries.clear();
        self.persist(&entries);
    }
}

fn trim(entries: &mut Vec<LedgerEntry>, max_entries: usize) {
    if entries.len() > max_entries {
        let excess = entries.len() - max_entries;
        entries.drain(..excess);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use tempfile::TempDir;

    fn estimate(total_tokens: u64, total_cost: f64, currency: Currency) -> CostEstimate {
        CostEstimate {
            input_tokens: total_tokens,
            output_tokens: 0,
            total_tokens,
            input_cost: total_cost,
            output_cost: 0.0,
            total_cost,
            currency,
            model_id: "gemini-1.5-flash".to_string(),
            model_name: "Gemini 1.5 Flash".to_string(),
            family: ContentFamily::Mixed,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_spend_filters_by_currency() {
        let dir = TempDir::new().unwrap();
        let ledger = CostHistoryLedger::open(dir.path().join("ledger.json"));
        ledger.append(&estimate(100, 1.0, Currency::Eur), None, None);

        assert!((ledger.total_spend(Currency::Eur, 30) - 1.0).abs() < 1e-12);
        assert_eq!(ledger.total_spend(Currency::Usd, 30), 0.0);
    }

    #[test]
    fn test_spend_prefers_actual_and_respects_window() {
        let dir = TempDir::new().unwrap();
        let ledger = CostHistoryLedger::open(dir.path().join("ledger.json"));
        ledger.append(&estimate(100, 1.0, Currency::Usd), Some(120), Some(2.5));

        let mut old = estimate(100, 7.0, Currency::Usd);
        old.created_at = Utc::now() - TimeDelta::days(45);
        ledger.append(&old, None, None);

        assert!((ledger.total_spend(Currency::Usd, 30) - 2.5).abs() < 1e-12);
        assert!((ledger.total_spend(Currency::Usd, 60) - 9.5).abs() < 1e-12);
    }

    #[test]
    fn test_unbounded_window_covers_history() {
        let dir = TempDir::new().unwrap();
        let ledger = CostHistoryLedger::open(dir.path().join("ledger.json"));
        let mut old = estimate(100, 3.0, Currency::Eur);
        old.created_at = Utc::now() - TimeDelta::days(3650);
        ledger.append(&old, None, None);

        assert!((ledger.total_spend(Currency::Eur, 1_000_000_000) - 3.0).abs() < 1e-12);
        assert!((ledger.total_spend(Currency::Eur, i64::MAX) - 3.0).abs() < 1e-12);
    }

    #[test]
    fn test_accuracy_ratio_rules() {
        let dir = TempDir::new().unwrap();
        let ledger = CostHistoryLedger::open(dir.path().join("ledger.json"));

        let e = ledger.append(&estimate(100, 0.1, Currency::Eur), Some(150), None);
        assert_eq!(e.accuracy_ratio, Some(1.5));

        let e = ledger.append(&estimate(100, 0.1, Currency::Eur), Some(0), None);
        assert_eq!(e.accuracy_ratio, Some(0.0));

        let e = ledger.append(&estimate(0, 0.0, Currency::Eur), Some(10), None);
        assert_eq!(e.accuracy_ratio, None);

        let e = ledger.append(&estimate(100, 0.1, Currency::Eur), None, None);
        assert_eq!(e.accuracy_ratio, None);

        let stats = ledger.accuracy(None);
        assert_eq!(stats.count, 2);
        assert!((stats.average - 0.75).abs() < 1e-12);
        assert_eq!(stats.min, 0.0);
        assert_eq!(stats.max, 1.5);

        assert_eq!(ledger.accuracy(Some("other-model")), AccuracyStats::default());
    }

    #[test]
    fn test_capacity_keeps_newest() {
        let dir = TempDir::new().unwrap();
        let ledger = CostHistoryLedger::open_with_capacity(dir.path().join("ledger.json"), 3);
        for tokens in 1..=5 {
            ledger.append(&estimate(tokens, 0.0, Currency::Eur), None, None);
        }
        let tokens: Vec<u64> = ledger.recent(10).iter().map(|e| e.estimated_tokens).collect();
        assert_eq!(tokens, vec![3, 4, 5]);
        assert_eq!(ledger.recent(2).len(), 2);
        assert_eq!(ledger.recent(2)[0].estimated_tokens, 4);
    }

    #[test]
    fn test_persists_across_open() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("ledger.json");
        {
            let ledger = CostHistoryLedger::open(&path);
            ledger.append(&estimate(42, 0.5, Currency::Gbp), None, None);
        }
        let reopened = CostHistoryLedger::open(&path);
        assert_eq!(reopened.len(), 1);
        assert_eq!(reopened.recent(1)[0].estimated_tokens, 42);

        let raw = std::fs::read_to_string(&path).unwrap();
        assert!(raw.contains("\"entries\""));

        reopened.clear();
        assert!(CostHistoryLedger::open(&path).is_empty());
    }

    #[test]
    fn test_malformed_file_opens_empty() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("ledger.json");
        std::fs::write(&path, "garbage").unwrap();
        assert!(CostHistoryLedger::open(&path).is_empty());
    }

    #[test]
    fn test_concurrent_appends_serialize() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("ledger.json");
        let ledger = Arc::new(CostHistoryLedger::open(&path));

        let handles: Vec<_> = (0..4)
            .map(|_| {
                let ledger = Arc::clone(&ledger);
                std::thread::spawn(move || {
                    for _ in 0..10 {
                        ledger.append(&estimate(1, 0.01, Currency::Eur), None, None);
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }

        assert_eq!(ledger.len(), 40);
        assert_eq!(CostHistoryLedger::open(&path).len(), 40);
    }
}
