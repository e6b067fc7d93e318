//! Telemetry Module for Chain Guard
//!
//! Aggregate counters over completed analyses:
//! - verdict volume and latency
//! - threats per category
//! - critical verdicts
//!
//! Privacy-first: no addresses, payloads or transaction contents are kept.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::RwLock;
use std::time::Duration;

use crate::models::errors::AppResult;
use crate::models::types::{ModelInfo, RiskLevel, ThreatAnalysis, ThreatCategory};

/// Sink notified by the threat detector after every verdict
pub trait AnalysisObserver: Send + Sync {
    fn on_analysis(&self, analysis: &ThreatAnalysis, latency: Duration);

    fn on_model_update(&self, _info: &ModelInfo) {}
}

/// Observer that discards everything
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopObserver;

impl AnalysisObserver for NoopObserver {
    fn on_analysis(&self, _analysis: &ThreatAnalysis, _latency: Duration) {}
}

/// Aggregated statistics for reporting
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct TelemetryStats {
    /// Total transactions analyzed
    pub total_analyzed: u64,
    /// Analyses with at least one threat
    pub flagged_transactions: u64,
    /// Verdicts above the critical threshold
    pub critical_verdicts: u64,
    /// Threat counts keyed by category code
    pub threats_by_category: BTreeMap<String, u64>,
    /// Average analysis latency (ms)
    pub avg_latency_ms: f64,
    pub model_updates: u64,
    /// Period start timestamp
    pub period_start: i64,
    /// Period end timestamp
    pub period_end: i64,
}

impl TelemetryStats {
    /// Export as JSON
    pub fn to_json(&self) -> String {
        serde_json::to_string_pretty(self).unwrap_or_default()
    }

    /// Share of analyses that were flagged, 0.0-1.0
    pub fn flag_rate(&self) -> f64 {
        if self.total_analyzed == 0 {
            0.0
        } else {
            self.flagged_transactions as f64 / self.total_analyzed as f64
        }
    }

    /// Operator-facing report block
    pub fn protection_report(&self) -> String {
        let mut report = format!(
            "\n🛡️ CHAIN GUARD - PROTECTION REPORT\n   🔍 Transactions analyzed: {}\n   🚨 Flagged: {} ({:.1}%)\n   🔴 Critical verdicts: {}\n   ⚡ Avg latency: {:.3}ms\n",
            self.total_analyzed,
            self.flagged_transactions,
            self.flag_rate() * 100.0,
            self.critical_verdicts,
            self.avg_latency_ms,
        );
        for (category, count) in &self.threats_by_category {
            report.push_str(&format!("     - {}: {}\n", category, count));
        }
        report
    }
}

/// Main telemetry collector
pub struct TelemetryCollector {
    total_analyzed: AtomicU64,
    flagged_transactions: AtomicU64,
    critical_verdicts: AtomicU64,
    total_latency_us: AtomicU64,
    model_updates: AtomicU64,
    threat_counts: RwLock<HashMap<ThreatCategory, u64>>,
    session_start: i64,
}

impl TelemetryCollector {
    pub fn new() -> Self {
        Self {
            total_analyzed: AtomicU64::new(0),
            flagged_transactions: AtomicU64::new(0),
            critical_verdicts: AtomicU64::new(0),
            total_latency_us: AtomicU64::new(0),
            model_updates: AtomicU64::new(0),
            threat_counts: RwLock::new(HashMap::new()),
            session_start: chrono::Utc::now().timestamp(),
        }
    }

    /// Record one completed analysis
    pub fn record(&self, analysis: &ThreatAnalysis, latency: Duration) {
        self.total_analyzed.fetch_add(1, Ordering::Relaxed);
        self.total_latency_us
            .fetch_add(latency.as_micros() as u64, Ordering::Relaxed);

        if !analysis.threats.is_empty() {
            self.flagged_transactions.fetch_add(1, Ordering::Relaxed);
        }
        if analysis.risk_level() == RiskLevel::Critical {
            self.critical_verdicts.fetch_add(1, Ordering::Relaxed);
        }

        if let Ok(mut counts) = self.threat_counts.write() {
            for threat in &analysis.threats {
                *counts.entry(*threat).or_insert(0) += 1;
            }
        }
    }

    /// Current statistics
    pub fn get_stats(&self) -> TelemetryStats {
        let total_analyzed = self.total_analyzed.load(Ordering::Relaxed);
        let total_latency_us = self.total_latency_us.load(Ordering::Relaxed);

        let avg_latency_ms = if total_analyzed > 0 {
            total_latency_us as f64 / total_analyzed as f64 / 1000.0
        } else {
            0.0
        };

        let threats_by_category = self
            .threat_counts
            .read()
            .map(|counts| {
                counts
                    .iter()
                    .map(|(k, v)| (k.as_str().to_string(), *v))
                    .collect()
            })
            .unwrap_or_default();

        TelemetryStats {
            total_analyzed,
            flagged_transactions: self.flagged_transactions.load(Ordering::Relaxed),
            critical_verdicts: self.critical_verdicts.load(Ordering::Relaxed),
            threats_by_category,
            avg_latency_ms,
            model_updates: self.model_updates.load(Ordering::Relaxed),
            period_start: self.session_start,
            period_end: chrono::Utc::now().timestamp(),
        }
    }

    /// Write current stats as `stats_<timestamp>.json` under `dir`
    pub fn export_stats_json(&self, dir: &Path) -> AppResult<PathBuf> {
        fs::create_dir_all(dir)?;
        let stats = self.get_stats();
        let path = dir.join(format!("stats_{}.json", stats.period_end));
        fs::write(&path, stats.to_json())?;
        Ok(path)
    }

    /// Reset counters (for new reporting period)
    pub fn reset(&self) {
        self.total_analyzed.store(0, Ordering::Relaxed);
        self.flagged_transactions.store(0, Ordering::Relaxed);
        self.critical_verdicts.store(0, Ordering::Relaxed);
        self.total_latency_us.store(0, Ordering::Relaxed);
        self.model_updates.store(0, Ordering::Relaxed);

        if let Ok(mut counts) = self.threat_counts.write() {
            counts.clear();
        }
    }
}

impl Default for TelemetryCollector {
    fn default() -> Self {
        Self::new()
    }
}

impl AnalysisObserver for TelemetryCollector {
    fn on_analysis(&self, analysis: &ThreatAnalysis, latency: Duration) {
        self.record(analysis, latency);
    }

    fn on_model_update(&self, _info: &ModelInfo) {
        self.model_updates.fetch_add(1, Ordering::Relaxed);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::errors::ErrorCode;
    use chrono::Utc;
    use tempfile::TempDir;

    fn analysis(risk_score: f64, threats: Vec<ThreatCategory>) -> ThreatAnalysis {
        ThreatAnalysis {
            risk_score,
            threats,
            confidence: 0.9,
            recommendations: vec![],
            timestamp: Utc::now(),
        }
    }

    #[test]
    fn test_collector_counts() {
        let collector = TelemetryCollector::new();
        collector.record(&analysis(0.3, vec![]), Duration::from_millis(2));
        collector.record(
            &analysis(0.95, vec![ThreatCategory::MaliciousContract, ThreatCategory::Honeypot]),
            Duration::from_millis(4),
        );
        collector.record(&analysis(0.7, vec![ThreatCategory::Honeypot]), Duration::from_millis(3));

        let stats = collector.get_stats();
        assert_eq!(stats.total_analyzed, 3);
        assert_eq!(stats.flagged_transactions, 2);
        assert_eq!(stats.critical_verdicts, 1);
        assert_eq!(stats.threats_by_category.get("HONEYPOT"), Some(&2));
        assert_eq!(stats.threats_by_category.get("MALICIOUS_CONTRACT"), Some(&1));
        assert!((stats.avg_latency_ms - 3.0).abs() < 1e-9);
    }

    #[test]
    fn test_observer_model_updates_and_reset() {
        let collector = TelemetryCollector::new();
        let info = ModelInfo {
            version: "2.1.0".to_string(),
            architecture: String::new(),
            generation: 1,
        };
        collector.on_model_update(&info);
        collector.on_analysis(&analysis(0.1, vec![]), Duration::ZERO);
        assert_eq!(collector.get_stats().model_updates, 1);

        collector.reset();
        let stats = collector.get_stats();
        assert_eq!(stats.total_analyzed, 0);
        assert_eq!(stats.model_updates, 0);
        assert!(stats.threats_by_category.is_empty());
    }

    #[test]
    fn test_stats_json_export() {
        let stats = TelemetryStats {
            total_analyzed: 1000,
            flagged_transactions: 50,
            critical_verdicts: 25,
            ..Default::default()
        };
        let json = stats.to_json();
        assert!(json.contains("1000"));
        assert!(json.contains("critical_verdicts"));
        assert!((stats.flag_rate() - 0.05).abs() < 1e-12);
    }

    #[test]
    fn test_export_to_file() {
        let tmp = TempDir::new().unwrap();
        let dir = tmp.path().join("stats");
        let collector = TelemetryCollector::new();
        collector.record(&analysis(0.9, vec![ThreatCategory::Honeypot]), Duration::from_millis(1));

        let path = collector.export_stats_json(&dir).unwrap();
        let restored: TelemetryStats =
            serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(restored.total_analyzed, 1);
        assert_eq!(restored.critical_verdicts, 1);
    }

    #[test]
    fn test_export_failure_is_not_an_address_list_error() {
        let tmp = TempDir::new().unwrap();
        let blocker = tmp.path().join("occupied");
        std::fs::write(&blocker, b"not a directory").unwrap();

        let err = TelemetryCollector::new().export_stats_json(&blocker).unwrap_err();
        assert_eq!(err.code, ErrorCode::Unknown);
        assert_ne!(err.code, ErrorCode::AddressListIo);
    }

    #[test]
    fn test_protection_report() {
        let collector = TelemetryCollector::new();
        collector.record(&analysis(0.95, vec![ThreatCategory::FlashLoanAttack]), Duration::ZERO);
        let report = collector.get_stats().protection_report();
        assert!(report.contains("Transactions analyzed: 1"));
        assert!(report.contains("FLASH_LOAN_ATTACK: 1"));
    }
}
