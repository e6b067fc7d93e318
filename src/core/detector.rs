//! Threat Detector - Risk Aggregator
//!
//! Orchestrates the analysis pipeline:
//! features -> inference -> rule overlay -> recommendations
//!
//! Rule overlay, applied in order on top of the inference score:
//! 1. Blacklisted program/account: MALICIOUS_CONTRACT, risk floor 0.95
//! 2. Amount above limit: SUSPICIOUS_AMOUNT, +0.20
//! 3. Unknown, young recipient: UNKNOWN_RECIPIENT, +0.15
//!    (never fires when the transaction has no recipient)
//! 4. Too many instructions: FLASH_LOAN_ATTACK, +0.25
//! 5. Honeypot marker on a long payload: HONEYPOT, risk floor 0.90
//!
//! The final risk is clamped to [0, 1].

use chrono::Utc;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info, warn};

use crate::core::features::FeatureExtractor;
use crate::core::inference::InferenceEngine;
use crate::core::recommendation::recommend;
use crate::models::config::{GuardConfig, RuleThresholds};
use crate::models::errors::AppResult;
use crate::models::types::{
    ModelInfo, RiskLevel, ThreatAnalysis, ThreatCategory, TransactionFeatures, TransactionView,
};
use crate::providers::chain_state::{ChainStateLookup, NoChainState};
use crate::utils::address_list::AddressListStore;
use crate::utils::telemetry::{AnalysisObserver, NoopObserver};

/// Main detector - the entry point wallets call before signing
pub struct ThreatDetector {
    engine: InferenceEngine,
    lists: AddressListStore,
    rules: RuleThresholds,
    observer: Arc<dyn AnalysisObserver>,
}

impl Default for ThreatDetector {
    fn default() -> Self {
        Self::new()
    }
}

impl ThreatDetector {
    /// Detector with a fresh model, the seeded blacklist and default rules
    pub fn new() -> Self {
        Self::with_parts(
            InferenceEngine::new(),
            AddressListStore::seeded(),
            RuleThresholds::default(),
        )
    }

    /// Build from configuration, loading the address list file if configured
    pub fn from_config(config: &GuardConfig) -> AppResult<Self> {
        config.validate()?;

        let engine = InferenceEngine::with_options(config.filler_policy, config.model_seed);
        let lists = AddressListStore::seeded();
        if let Some(path) = &config.address_list_path {
            lists.load_json(path)?;
        }

        Ok(Self::with_parts(engine, lists, config.rules.clone()))
    }

    pub fn with_parts(
        engine: InferenceEngine,
        lists: AddressListStore,
        rules: RuleThresholds,
    ) -> Self {
        info!(
            "🛡️ Threat detector ready ({} blacklisted, {} whitelisted)",
            lists.blacklist_len(),
            lists.whitelist_len()
        );
        Self {
            engine,
            lists,
            rules,
            observer: Arc::new(NoopObserver),
        }
    }

    /// Attach a sink notified after every verdict and model update
    pub fn with_observer(mut self, observer: Arc<dyn AnalysisObserver>) -> Self {
        self.observer = observer;
        self
    }

    /// Analyze a transaction with no chain state available
    pub fn analyze(&self, tx: &TransactionView) -> AppResult<ThreatAnalysis> {
        self.analyze_with_state(tx, &NoChainState)
    }

    /// Analyze a transaction against prefetched chain state
    pub fn analyze_with_state(
        &self,
        tx: &TransactionView,
        state: &dyn ChainStateLookup,
    ) -> AppResult<ThreatAnalysis> {
        let start = Instant::now();

        let features = FeatureExtractor::extract(tx, state, &self.lists);
        let prediction = self.engine.predict(&features)?;

        let (risk_score, threats) = self.apply_rules(tx, &features, prediction.score);
        let recommendations = recommend(&threats, risk_score);

        let analysis = ThreatAnalysis {
            risk_score,
            threats,
            confidence: prediction.confidence.clamp(0.0, 1.0),
            recommendations,
            timestamp: Utc::now(),
        };

        let latency = start.elapsed();
        debug!(
            "🔍 Analyzed {} instructions in {:?}: model {:.3} -> risk {:.3}, {} threats",
            tx.instructions.len(),
            latency,
            prediction.score,
            analysis.risk_score,
            analysis.threats.len()
        );
        if analysis.risk_level() == RiskLevel::Critical {
            warn!(
                "🚨 HIGH RISK TRANSACTION: score {:.2}, threats: {:?}",
                analysis.risk_score, analysis.threats
            );
        }

        self.observer.on_analysis(&analysis, latency);
        Ok(analysis)
    }

    /// Apply the rule overlay; returns (clamped risk, threats in detection order)
    fn apply_rules(
        &self,
        tx: &TransactionView,
        features: &TransactionFeatures,
        model_score: f64,
    ) -> (f64, Vec<ThreatCategory>) {
        let rules = &self.rules;
        let mut risk = model_score;
        let mut threats = Vec::new();

        let addresses = tx.instructions.iter().flat_map(|ix| ix.addresses());
        if let Some(hit) = self.lists.first_blacklisted(addresses) {
            debug!("⛔ Blacklisted address referenced: {}", hit);
            flag(&mut threats, ThreatCategory::MaliciousContract);
            risk = risk.max(rules.blacklist_floor);
        }

        if features.amount > rules.suspicious_amount {
            flag(&mut threats, ThreatCategory::SuspiciousAmount);
            risk += rules.suspicious_amount_penalty;
        }

        if features.has_recipient
            && !features.known_address
            && features.recipient_age_days < rules.min_recipient_age_days
        {
            flag(&mut threats, ThreatCategory::UnknownRecipient);
            risk += rules.unknown_recipient_penalty;
        }

        if features.program_interactions > rules.max_program_interactions {
            flag(&mut threats, ThreatCategory::FlashLoanAttack);
            risk += rules.flash_loan_penalty;
        }

        let honeypot = tx.instructions.iter().any(|ix| {
            ix.data.len() > rules.honeypot_min_len && ix.data.starts_with(&rules.honeypot_marker)
        });
        if honeypot {
            flag(&mut threats, ThreatCategory::Honeypot);
            risk = risk.max(rules.honeypot_floor);
        }

        (risk.clamp(0.0, 1.0), threats)
    }

    pub fn add_to_blacklist(&self, address: &str) {
        self.lists.add_to_blacklist(address);
    }

    pub fn add_to_whitelist(&self, address: &str) {
        self.lists.add_to_whitelist(address);
    }

    pub fn remove_from_blacklist(&self, address: &str) -> bool {
        self.lists.remove_from_blacklist(address)
    }

    pub fn remove_from_whitelist(&self, address: &str) -> bool {
        self.lists.remove_from_whitelist(address)
    }

    pub fn address_lists(&self) -> &AddressListStore {
        &self.lists
    }

    /// Redraw the model weights; in-flight analyses keep their snapshot
    pub fn update_model(&self) {
        self.engine.update();
        self.observer.on_model_update(&self.engine.model_info());
    }

    pub fn model_info(&self) -> ModelInfo {
        self.engine.model_info()
    }

    pub fn engine(&self) -> &InferenceEngine {
        &self.engine
    }

    pub fn rules(&self) -> &RuleThresholds {
        &self.rules
    }
}

/// Insertion-ordered, duplicate-free push
fn flag(threats: &mut Vec<ThreatCategory>, category: ThreatCategory) {
    if !threats.contains(&category) {
        threats.push(category);
    }
}
