//! Type definitions for Chain Guard
//! All core data structures for transaction risk analysis

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::utils::constants::{
    get_program_name, CRITICAL_RISK_THRESHOLD, INPUT_WIDTH, WARNING_RISK_THRESHOLD,
};

// ============================================
// TRANSACTION VIEW
// ============================================

/// Account reference inside an instruction
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountRef {
    pub address: String,
    #[serde(default)]
    pub is_signer: bool,
    #[serde(default)]
    pub is_writable: bool,
}

impl AccountRef {
    pub fn new(address: impl Into<String>, is_signer: bool, is_writable: bool) -> Self {
        Self {
            address: address.into(),
            is_signer,
            is_writable,
        }
    }

    /// Read-only, non-signing reference
    pub fn readonly(address: impl Into<String>) -> Self {
        Self::new(address, false, false)
    }
}

/// One instruction of a transaction awaiting signature
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct InstructionView {
    pub program_id: String,
    #[serde(default)]
    pub accounts: Vec<AccountRef>,
    /// Raw instruction payload
    #[serde(default)]
    pub data: Vec<u8>,
}

impl InstructionView {
    pub fn new(program_id: impl Into<String>, accounts: Vec<AccountRef>, data: Vec<u8>) -> Self {
        Self {
            program_id: program_id.into(),
            accounts,
            data,
        }
    }

    /// Program ID followed by every referenced account address
    pub fn addresses(&self) -> impl Iterator<Item = &str> {
        std::iter::once(self.program_id.as_str())
            .chain(self.accounts.iter().map(|a| a.address.as_str()))
    }
}

/// Read-only projection of a transaction built by the wallet layer
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransactionView {
    #[serde(default)]
    pub instructions: Vec<InstructionView>,
}

impl TransactionView {
    pub fn new(instructions: Vec<InstructionView>) -> Self {
        Self { instructions }
    }

    pub fn is_empty(&self) -> bool {
        self.instructions.is_empty()
    }

    /// Names of well-known programs this transaction touches, in first-seen order
    pub fn known_programs(&self) -> Vec<&'static str> {
        let mut names = Vec::new();
        for ix in &self.instructions {
            if let Some(name) = get_program_name(&ix.program_id) {
                if !names.contains(&name) {
                    names.push(name);
                }
            }
        }
        names
    }
}

// ============================================
// FEATURES & PREDICTION
// ============================================

/// Risk-relevant attributes extracted from one transaction
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TransactionFeatures {
    /// Transfer value in the chain's base unit (lamports)
    pub amount: f64,
    /// Recipient account age, 0 when unknown
    pub recipient_age_days: u32,
    /// Number of instructions
    pub program_interactions: u32,
    /// Fee rate
    pub gas_price: f64,
    pub complexity: f64,
    /// Recipient present in a trusted registry
    pub known_address: bool,
    /// A recipient could be resolved at all
    #[serde(default)]
    pub has_recipient: bool,
}

/// Fixed-order network input
pub type FeatureVector = [f64; INPUT_WIDTH];

/// Output of one forward pass
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PredictionResult {
    /// Sigmoid output, 0.0-1.0
    pub score: f64,
    /// 0.5-1.0
    pub confidence: f64,
    pub features: FeatureVector,
}

/// Model identification for status output
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModelInfo {
    pub version: String,
    pub architecture: String,
    /// Number of weight redraws since construction
    pub generation: u64,
}

// ============================================
// THREATS
// ============================================

/// Closed set of threat categories
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ThreatCategory {
    Phishing,
    MaliciousContract,
    SuspiciousAmount,
    UnknownRecipient,
    HighSlippage,
    Honeypot,
    RugPull,
    FlashLoanAttack,
}

impl ThreatCategory {
    /// Every category, in declaration order
    pub const ALL: [ThreatCategory; 8] = [
        ThreatCategory::Phishing,
        ThreatCategory::MaliciousContract,
        ThreatCategory::SuspiciousAmount,
        ThreatCategory::UnknownRecipient,
        ThreatCategory::HighSlippage,
        ThreatCategory::Honeypot,
        ThreatCategory::RugPull,
        ThreatCategory::FlashLoanAttack,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ThreatCategory::Phishing => "PHISHING",
            ThreatCategory::MaliciousContract => "MALICIOUS_CONTRACT",
            ThreatCategory::SuspiciousAmount => "SUSPICIOUS_AMOUNT",
            ThreatCategory::UnknownRecipient => "UNKNOWN_RECIPIENT",
            ThreatCategory::HighSlippage => "HIGH_SLIPPAGE",
            ThreatCategory::Honeypot => "HONEYPOT",
            ThreatCategory::RugPull => "RUG_PULL",
            ThreatCategory::FlashLoanAttack => "FLASH_LOAN_ATTACK",
        }
    }

    /// Fixed user-facing advisories for this category; may be empty
    pub fn advisories(&self) -> &'static [&'static str] {
        match self {
            ThreatCategory::MaliciousContract => &["Interacting with known malicious contract"],
            ThreatCategory::Honeypot => {
                &["Potential honeypot detected - tokens may not be sellable"]
            }
            ThreatCategory::FlashLoanAttack => &[
                "Complex transaction pattern detected",
                "Ensure you understand all program interactions",
            ],
            ThreatCategory::Phishing
            | ThreatCategory::SuspiciousAmount
            | ThreatCategory::UnknownRecipient
            | ThreatCategory::HighSlippage
            | ThreatCategory::RugPull => &[],
        }
    }
}

impl std::fmt::Display for ThreatCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Coarse verdict derived from the final risk score
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RiskLevel {
    Safe,
    Elevated,
    Critical,
}

impl RiskLevel {
    pub fn from_score(score: f64) -> Self {
        if score > CRITICAL_RISK_THRESHOLD {
            RiskLevel::Critical
        } else if score > WARNING_RISK_THRESHOLD {
            RiskLevel::Elevated
        } else {
            RiskLevel::Safe
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            RiskLevel::Safe => "SAFE",
            RiskLevel::Elevated => "ELEVATED",
            RiskLevel::Critical => "CRITICAL",
        }
    }

    pub fn emoji(&self) -> &'static str {
        match self {
            RiskLevel::Safe => "✅",
            RiskLevel::Elevated => "🟠",
            RiskLevel::Critical => "🔴",
        }
    }
}

/// Final verdict for one transaction
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ThreatAnalysis {
    /// 0.0-1.0
    pub risk_score: f64,
    /// Insertion ordered, no duplicates
    pub threats: Vec<ThreatCategory>,
    /// 0.0-1.0
    pub confidence: f64,
    pub recommendations: Vec<String>,
    pub timestamp: DateTime<Utc>,
}

impl ThreatAnalysis {
    pub fn risk_level(&self) -> RiskLevel {
        RiskLevel::from_score(self.risk_score)
    }

    pub fn has_threat(&self, category: ThreatCategory) -> bool {
        self.threats.contains(&category)
    }

    /// Pretty print the analysis
    pub fn summary(&self) -> String {
        let level = self.risk_level();
        let mut output = format!(
            "\n{} Risk: {} | Score: {:.1}% | Confidence: {:.1}%\n",
            level.emoji(),
            level.as_str(),
            self.risk_score * 100.0,
            self.confidence * 100.0
        );

        if !self.threats.is_empty() {
            output.push_str("   Threats:\n");
            for threat in &self.threats {
                output.push_str(&format!("     - {}\n", threat));
            }
        }

        output.push_str("   Recommendations:\n");
        for rec in &self.recommendations {
            output.push_str(&format!("     - {}\n", rec));
        }

        output
    }
}
