//! Configuration module for Chain Guard
//!
//! Defaults come from utils/constants.rs; the environment can override
//! the runtime knobs. No rule literals live in this file.

use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;
use tracing::warn;

use crate::models::errors::{AppError, AppResult};
use crate::utils::constants::{
    BLACKLIST_RISK_FLOOR, DEFAULT_RPC_TIMEOUT_SECS, DEFAULT_SOLANA_RPC_URL, FLASH_LOAN_PENALTY,
    HONEYPOT_MARKER, HONEYPOT_MIN_PAYLOAD_LEN, HONEYPOT_RISK_FLOOR, MAX_PROGRAM_INTERACTIONS,
    MIN_RECIPIENT_AGE_DAYS, SUSPICIOUS_AMOUNT_LIMIT, SUSPICIOUS_AMOUNT_PENALTY,
    UNKNOWN_RECIPIENT_PENALTY,
};

/// How the four trailing feature slots are filled
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FillerPolicy {
    /// Every slot is 0.0; predictions are reproducible
    #[default]
    Zero,
    /// Fresh uniform draw in [0, 1) per slot per prediction
    Random,
}

impl FromStr for FillerPolicy {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "zero" | "constant" => Ok(FillerPolicy::Zero),
            "random" => Ok(FillerPolicy::Random),
            other => Err(AppError::invalid_config(format!(
                "Unknown filler policy: {}",
                other
            ))),
        }
    }
}

/// Thresholds and adjustments applied by the rule overlay
#[derive(Debug, Clone, PartialEq)]
pub struct RuleThresholds {
    pub blacklist_floor: f64,
    pub suspicious_amount: f64,
    pub suspicious_amount_penalty: f64,
    pub min_recipient_age_days: u32,
    pub unknown_recipient_penalty: f64,
    pub max_program_interactions: u32,
    pub flash_loan_penalty: f64,
    pub honeypot_marker: [u8; 2],
    /// Payload must be strictly longer than this
    pub honeypot_min_len: usize,
    pub honeypot_floor: f64,
}

impl Default for RuleThresholds {
    fn default() -> Self {
        Self {
            blacklist_floor: BLACKLIST_RISK_FLOOR,
            suspicious_amount: SUSPICIOUS_AMOUNT_LIMIT,
            suspicious_amount_penalty: SUSPICIOUS_AMOUNT_PENALTY,
            min_recipient_age_days: MIN_RECIPIENT_AGE_DAYS,
            unknown_recipient_penalty: UNKNOWN_RECIPIENT_PENALTY,
            max_program_interactions: MAX_PROGRAM_INTERACTIONS,
            flash_loan_penalty: FLASH_LOAN_PENALTY,
            honeypot_marker: HONEYPOT_MARKER,
            honeypot_min_len: HONEYPOT_MIN_PAYLOAD_LEN,
            honeypot_floor: HONEYPOT_RISK_FLOOR,
        }
    }
}

impl RuleThresholds {
    /// Floors must be probabilities and penalties non-negative
    pub fn validate(&self) -> AppResult<()> {
        for (name, floor) in [
            ("blacklist_floor", self.blacklist_floor),
            ("honeypot_floor", self.honeypot_floor),
        ] {
            if !(0.0..=1.0).contains(&floor) {
                return Err(AppError::invalid_config(format!(
                    "{} must be within [0, 1], got {}",
                    name, floor
                )));
            }
        }

        for (name, penalty) in [
            ("suspicious_amount_penalty", self.suspicious_amount_penalty),
            ("unknown_recipient_penalty", self.unknown_recipient_penalty),
            ("flash_loan_penalty", self.flash_loan_penalty),
        ] {
            if !penalty.is_finite() || penalty < 0.0 {
                return Err(AppError::invalid_config(format!(
                    "{} must be a non-negative number, got {}",
                    name, penalty
                )));
            }
        }

        if !self.suspicious_amount.is_finite() || self.suspicious_amount < 0.0 {
            return Err(AppError::invalid_config(format!(
                "suspicious_amount must be a non-negative number, got {}",
                self.suspicious_amount
            )));
        }

        Ok(())
    }
}

/// Configuration for the threat detector and its collaborators
#[derive(Debug, Clone)]
pub struct GuardConfig {
    /// Filler slot behavior for the inference engine
    pub filler_policy: FillerPolicy,
    /// Seed for reproducible weights; None draws from OS entropy
    pub model_seed: Option<u64>,
    /// JSON file with extra blacklist/whitelist entries
    pub address_list_path: Option<PathBuf>,
    /// Solana JSON-RPC endpoint for chain-state lookups
    pub rpc_url: String,
    /// Timeout for RPC calls
    pub rpc_timeout: Duration,
    pub rules: RuleThresholds,
}

impl Default for GuardConfig {
    fn default() -> Self {
        Self {
            filler_policy: env_parse("GUARD_FILLER_POLICY").unwrap_or_default(),
            model_seed: env_parse("GUARD_MODEL_SEED"),
            address_list_path: std::env::var("GUARD_BLACKLIST_PATH")
                .ok()
                .filter(|p| !p.is_empty())
                .map(PathBuf::from),
            rpc_url: std::env::var("SOLANA_RPC_URL")
                .ok()
                .filter(|u| !u.is_empty())
                .unwrap_or_else(|| DEFAULT_SOLANA_RPC_URL.to_string()),
            rpc_timeout: Duration::from_secs(
                env_parse("GUARD_RPC_TIMEOUT_SECS").unwrap_or(DEFAULT_RPC_TIMEOUT_SECS),
            ),
            rules: RuleThresholds::default(),
        }
    }
}

impl GuardConfig {
    /// Check every value the pipeline relies on
    pub fn validate(&self) -> AppResult<()> {
        if self.rpc_timeout.is_zero() {
            return Err(AppError::invalid_config("rpc_timeout must be non-zero"));
        }
        if !self.rpc_url.starts_with("http://") && !self.rpc_url.starts_with("https://") {
            return Err(AppError::invalid_config(format!(
                "rpc_url must be an http(s) URL, got {}",
                self.rpc_url
            )));
        }
        self.rules.validate()
    }
}

/// Parse an environment variable, logging and ignoring malformed values
fn env_parse<T>(key: &str) -> Option<T>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    let raw = std::env::var(key).ok()?;
    match raw.parse::<T>() {
        Ok(value) => Some(value),
        Err(e) => {
            warn!("⚠️ Ignoring {}={:?}: {}", key, raw, e);
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_filler_policy_parse() {
        assert_eq!("zero".parse::<FillerPolicy>().unwrap(), FillerPolicy::Zero);
        assert_eq!(" Random ".parse::<FillerPolicy>().unwrap(), FillerPolicy::Random);
        assert!("noise".parse::<FillerPolicy>().is_err());
    }

    #[test]
    fn test_default_rules_match_constants() {
        let rules = RuleThresholds::default();
        assert_eq!(rules.blacklist_floor, 0.95);
        assert_eq!(rules.suspicious_amount, 1_000_000.0);
        assert_eq!(rules.min_recipient_age_days, 7);
        assert_eq!(rules.max_program_interactions, 5);
        assert_eq!(rules.honeypot_marker, [0xDE, 0xAD]);
        assert_eq!(rules.honeypot_min_len, 100);
        assert!(rules.validate().is_ok());
    }

    #[test]
    fn test_invalid_rules_rejected() {
        let rules = RuleThresholds {
            blacklist_floor: 1.5,
            ..Default::default()
        };
        let err = rules.validate().unwrap_err();
        assert_eq!(err.code_str(), "CFG_INVALID_VALUE");

        let rules = RuleThresholds {
            flash_loan_penalty: -0.1,
            ..Default::default()
        };
        assert!(rules.validate().is_err());
    }

    #[test]
    fn test_config_validate_rpc_url() {
        let config = GuardConfig {
            rpc_url: "ftp://example".to_string(),
            ..GuardConfig::default()
        };
        assert!(config.validate().is_err());

        let config = GuardConfig {
            rpc_url: "https://api.mainnet-beta.solana.com".to_string(),
            rpc_timeout: Duration::from_secs(5),
            ..GuardConfig::default()
        };
        assert!(config.validate().is_ok());
    }
}
