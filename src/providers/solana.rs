//! Solana Provider Module
//!
//! Async JSON-RPC client that prefetches the chain state an analysis needs:
//! - Recipient account age: `getSignaturesForAddress`, oldest `blockTime`
//! - Fee rate: mean of `getRecentPrioritizationFees` over writable accounts
//!
//! Lookups fail open. An RPC failure is logged and the value stays
//! unavailable, so the detector falls back to its defaults.

use chrono::Utc;
use serde::Deserialize;
use std::time::Duration;
use tracing::{debug, warn};

use crate::core::features::FeatureExtractor;
use crate::models::config::GuardConfig;
use crate::models::errors::{AppError, AppResult, ErrorCode};
use crate::models::types::TransactionView;
use crate::providers::chain_state::ChainSnapshot;
use crate::utils::constants::{SECONDS_PER_DAY, SIGNATURE_PAGE_LIMIT};

// ============================================
// SOLANA RPC TYPES
// ============================================

/// Entry of `getSignaturesForAddress`, newest first
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SignatureInfo {
    pub signature: String,
    pub slot: u64,
    pub block_time: Option<i64>,
}

/// Entry of `getRecentPrioritizationFees`
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PrioritizationFee {
    pub slot: u64,
    /// Micro-lamports per compute unit
    pub prioritization_fee: u64,
}

// ============================================
// SOLANA RPC CLIENT
// ============================================

/// Chain-state provider backed by a Solana RPC endpoint
pub struct SolanaChainState {
    rpc_url: String,
    client: reqwest::Client,
}

impl SolanaChainState {
    pub fn new(rpc_url: impl Into<String>, timeout: Duration) -> AppResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .gzip(true)
            .build()
            .map_err(|e| {
                AppError::with_source(
                    ErrorCode::RpcConnectionFailed,
                    "Failed to build HTTP client",
                    e,
                )
            })?;

        Ok(Self {
            rpc_url: rpc_url.into(),
            client,
        })
    }

    pub fn from_config(config: &GuardConfig) -> AppResult<Self> {
        Self::new(config.rpc_url.clone(), config.rpc_timeout)
    }

    pub fn rpc_url(&self) -> &str {
        &self.rpc_url
    }

    /// Execute JSON-RPC call
    async fn call<T: for<'de> Deserialize<'de>>(
        &self,
        method: &str,
        params: serde_json::Value,
    ) -> AppResult<T> {
        let payload = serde_json::json!({
            "jsonrpc": "2.0",
            "method": method,
            "params": params,
            "id": 1
        });

        let response = self
            .client
            .post(&self.rpc_url)
            .json(&payload)
            .send()
            .await?;

        let json: serde_json::Value = response.json().await?;
        parse_rpc_result(json)
    }

    /// Days since the oldest transaction touching `address` (within one page)
    pub async fn account_age_days(&self, address: &str) -> AppResult<Option<u32>> {
        let params = serde_json::json!([address, {"limit": SIGNATURE_PAGE_LIMIT}]);
        let signatures: Vec<SignatureInfo> = self.call("getSignaturesForAddress", params).await?;
        Ok(age_from_signatures(&signatures, Utc::now().timestamp()))
    }

    /// Mean recent prioritization fee for the given writable accounts
    pub async fn fee_rate(&self, accounts: &[String]) -> AppResult<Option<f64>> {
        let params = serde_json::json!([accounts]);
        let fees: Vec<PrioritizationFee> = self.call("getRecentPrioritizationFees", params).await?;
        Ok(mean_fee(&fees))
    }

    /// Prefetch everything the detector reads for `tx`
    pub async fn snapshot(&self, tx: &TransactionView) -> ChainSnapshot {
        let mut snapshot = ChainSnapshot::new();
        let recipient = FeatureExtractor::recipient(tx);
        let writable = writable_accounts(tx);

        let age_lookup = async {
            match recipient.as_deref() {
                Some(address) => self.account_age_days(address).await,
                None => Ok(None),
            }
        };
        let (age, fee) = tokio::join!(age_lookup, self.fee_rate(&writable));

        match (age, recipient) {
            (Ok(Some(days)), Some(address)) => {
                debug!("📡 Recipient {} age: {} days", address, days);
                snapshot.ages.insert(address, days);
            }
            (Err(e), _) => warn!("⚠️ Recipient age lookup failed [{}]: {}", e.code_str(), e),
            _ => {}
        }

        match fee {
            Ok(rate) => snapshot.fee_rate = rate,
            Err(e) => warn!("⚠️ Fee rate lookup failed [{}]: {}", e.code_str(), e),
        }

        snapshot
    }
}

// ============================================
// RESPONSE HELPERS
// ============================================

/// Extract and deserialize the `result` member of a JSON-RPC response
fn parse_rpc_result<T: for<'de> Deserialize<'de>>(json: serde_json::Value) -> AppResult<T> {
    if let Some(error) = json.get("error") {
        return Err(AppError::rpc_error(format!("RPC error: {}", error)));
    }

    let result = json
        .get("result")
        .ok_or_else(|| AppError::invalid_response("No result in response"))?;

    Ok(serde_json::from_value(result.clone())?)
}

/// Whole days between the oldest known block time and `now`
pub fn age_from_signatures(signatures: &[SignatureInfo], now: i64) -> Option<u32> {
    let oldest = signatures.iter().filter_map(|s| s.block_time).min()?;
    let days = (now - oldest).max(0) / SECONDS_PER_DAY;
    Some(u32::try_from(days).unwrap_or(u32::MAX))
}

pub fn mean_fee(fees: &[PrioritizationFee]) -> Option<f64> {
    if fees.is_empty() {
        return None;
    }
    let total: u64 = fees.iter().map(|f| f.prioritization_fee).sum();
    Some(total as f64 / fees.len() as f64)
}

/// Distinct writable accounts in first-seen order
fn writable_accounts(tx: &TransactionView) -> Vec<String> {
    let mut accounts: Vec<String> = Vec::new();
    for account in tx.instructions.iter().flat_map(|ix| ix.accounts.iter()) {
        if account.is_writable && !accounts.contains(&account.address) {
            accounts.push(account.address.clone());
        }
    }
    accounts
}
