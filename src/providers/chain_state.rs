//! Chain-state lookups consumed by feature extraction
//!
//! Lookups are answered from data fetched before analysis starts, so the
//! scoring pipeline itself never blocks on the network. `None` means the
//! value is unavailable; feature extraction substitutes its default.

use std::collections::HashMap;

/// Read-only chain-state capability
pub trait ChainStateLookup: Send + Sync {
    /// Age of an account in days
    fn age_of(&self, address: &str) -> Option<u32>;

    /// Whether a trusted registry knows this account
    fn is_known(&self, address: &str) -> Option<bool>;

    /// Value moved by the transaction, if the collaborator priced it
    fn transfer_amount(&self) -> Option<f64> {
        None
    }

    /// Fee rate the transaction will pay
    fn fee_rate(&self) -> Option<f64> {
        None
    }
}

/// No chain state at all; every lookup is unavailable
#[derive(Debug, Clone, Copy, Default)]
pub struct NoChainState;

impl ChainStateLookup for NoChainState {
    fn age_of(&self, _address: &str) -> Option<u32> {
        None
    }

    fn is_known(&self, _address: &str) -> Option<bool> {
        None
    }
}

/// Prefetched chain state for one analysis
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ChainSnapshot {
    pub ages: HashMap<String, u32>,
    pub known: HashMap<String, bool>,
    pub amount: Option<f64>,
    pub fee_rate: Option<f64>,
}

impl ChainSnapshot {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_age(mut self, address: impl Into<String>, days: u32) -> Self {
        self.ages.insert(address.into(), days);
        self
    }

    pub fn with_known(mut self, address: impl Into<String>, known: bool) -> Self {
        self.known.insert(address.into(), known);
        self
    }

    pub fn with_amount(mut self, amount: f64) -> Self {
        self.amount = Some(amount);
        self
    }

    pub fn with_fee_rate(mut self, fee_rate: f64) -> Self {
        self.fee_rate = Some(fee_rate);
        self
    }
}

impl ChainStateLookup for ChainSnapshot {
    fn age_of(&self, address: &str) -> Option<u32> {
        self.ages.get(address).copied()
    }

    fn is_known(&self, address: &str) -> Option<bool> {
        self.known.get(address).copied()
    }

    fn transfer_amount(&self) -> Option<f64> {
        self.amount
    }

    fn fee_rate(&self) -> Option<f64> {
        self.fee_rate
    }
}
