//! Feature Extraction Module
//!
//! Turns a transaction view plus prefetched chain state into the
//! `TransactionFeatures` record and the fixed-order network input.
//!
//! Amounts are in lamports. Missing chain state is not an error: amount
//! and fee default to 0, recipient age to 0 days, known_address to false.
//! A transaction with no recipient at all reports `has_recipient = false`.

use std::collections::HashSet;

use crate::models::types::{FeatureVector, TransactionFeatures, TransactionView};
use crate::providers::chain_state::ChainStateLookup;
use crate::utils::address_list::AddressListStore;
use crate::utils::constants::{
    AMOUNT_SCALE, COMPLEXITY_ACCOUNT_WEIGHT, COMPLEXITY_INSTRUCTION_WEIGHT, COMPLEXITY_SCALE,
    FILLER_SLOTS, GAS_PRICE_SCALE, INPUT_WIDTH, PROGRAM_INTERACTION_SCALE, RECIPIENT_AGE_SCALE,
};
use crate::utils::decoder::TransferDecoder;

/// Stateless feature extractor
pub struct FeatureExtractor;

impl FeatureExtractor {
    /// Extract features using the whitelist as the trusted registry
    pub fn extract(
        tx: &TransactionView,
        state: &dyn ChainStateLookup,
        lists: &AddressListStore,
    ) -> TransactionFeatures {
        let instruction_count = tx.instructions.len();
        let transfers = TransferDecoder::decode_all(&tx.instructions);

        let recipient = transfers
            .first()
            .map(|t| t.to.as_str())
            .or_else(|| Self::fallback_recipient(tx));

        let amount = state
            .transfer_amount()
            .unwrap_or_else(|| transfers.iter().map(|t| t.lamports as f64).sum::<f64>());

        let (recipient_age_days, known_address) = match recipient {
            Some(addr) => (
                state.age_of(addr).unwrap_or(0),
                lists.is_whitelisted(addr) || state.is_known(addr).unwrap_or(false),
            ),
            None => (0, false),
        };

        TransactionFeatures {
            amount: amount.max(0.0),
            recipient_age_days,
            program_interactions: instruction_count as u32,
            gas_price: state.fee_rate().unwrap_or(0.0).max(0.0),
            complexity: Self::complexity(tx),
            known_address,
            has_recipient: recipient.is_some(),
        }
    }

    /// `0.3 * instructions + 0.7 * distinct accounts`
    pub fn complexity(tx: &TransactionView) -> f64 {
        let accounts: HashSet<&str> = tx
            .instructions
            .iter()
            .flat_map(|ix| ix.accounts.iter().map(|a| a.address.as_str()))
            .collect();

        tx.instructions.len() as f64 * COMPLEXITY_INSTRUCTION_WEIGHT
            + accounts.len() as f64 * COMPLEXITY_ACCOUNT_WEIGHT
    }

    /// Destination of the first native transfer, else the fallback recipient
    pub fn recipient(tx: &TransactionView) -> Option<String> {
        tx.instructions
            .iter()
            .find_map(TransferDecoder::decode)
            .map(|t| t.to)
            .or_else(|| Self::fallback_recipient(tx).map(str::to_string))
    }

    /// First writable, non-signing account across all instructions
    fn fallback_recipient(tx: &TransactionView) -> Option<&str> {
        tx.instructions
            .iter()
            .flat_map(|ix| ix.accounts.iter())
            .find(|a| a.is_writable && !a.is_signer)
            .map(|a| a.address.as_str())
    }

    /// Normalize features into the network input; order is fixed
    pub fn to_vector(features: &TransactionFeatures, filler: [f64; FILLER_SLOTS]) -> FeatureVector {
        let mut vector = [0.0; INPUT_WIDTH];
        vector[0] = features.amount / AMOUNT_SCALE;
        vector[1] = features.recipient_age_days as f64 / RECIPIENT_AGE_SCALE;
        vector[2] = features.program_interactions as f64 / PROGRAM_INTERACTION_SCALE;
        vector[3] = features.gas_price / GAS_PRICE_SCALE;
        vector[4] = features.complexity / COMPLEXITY_SCALE;
        vector[5] = if features.known_address { 1.0 } else { 0.0 };
        vector[INPUT_WIDTH - FILLER_SLOTS..].copy_from_slice(&filler);
        vector
    }
}
