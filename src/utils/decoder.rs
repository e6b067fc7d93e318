//! Instruction decoder module
//! Parses System Program transfer payloads to recover value and destination

use crate::models::types::InstructionView;
use crate::utils::constants::{LAMPORTS_PER_SOL, SYSTEM_PROGRAM, SYSTEM_TRANSFER_TAG};

/// Decoded native transfer
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransferParams {
    pub from: String,
    pub to: String,
    pub lamports: u64,
}

impl TransferParams {
    pub fn sol(&self) -> f64 {
        self.lamports as f64 / LAMPORTS_PER_SOL
    }
}

/// Decoder for native transfer instructions
pub struct TransferDecoder;

impl TransferDecoder {
    /// Decode a System Program `Transfer`
    /// Returns None for any other program, tag, or a truncated payload
    pub fn decode(ix: &InstructionView) -> Option<TransferParams> {
        if ix.program_id != SYSTEM_PROGRAM {
            return None;
        }

        // u32 LE tag + u64 LE lamports
        let tag = u32::from_le_bytes(ix.data.get(0..4)?.try_into().ok()?);
        if tag != SYSTEM_TRANSFER_TAG {
            return None;
        }
        let lamports = u64::from_le_bytes(ix.data.get(4..12)?.try_into().ok()?);

        let from = ix.accounts.first()?;
        let to = ix.accounts.get(1)?;

        Some(TransferParams {
            from: from.address.clone(),
            to: to.address.clone(),
            lamports,
        })
    }

    /// Decode every native transfer in order
    pub fn decode_all<'a>(
        instructions: impl IntoIterator<Item = &'a InstructionView>,
    ) -> Vec<TransferParams> {
        instructions.into_iter().filter_map(Self::decode).collect()
    }

    /// Encode a transfer payload (wallet-side helper, used by tests and demos)
    pub fn encode(lamports: u64) -> Vec<u8> {
        let mut data = Vec::with_capacity(12);
        data.extend_from_slice(&SYSTEM_TRANSFER_TAG.to_le_bytes());
        data.extend_from_slice(&lamports.to_le_bytes());
        data
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::types::AccountRef;

    fn transfer_ix(data: Vec<u8>) -> InstructionView {
        InstructionView::new(
            SYSTEM_PROGRAM,
            vec![AccountRef::new("Alice", true, true), AccountRef::new("Bob", false, true)],
            data,
        )
    }

    #[test]
    fn test_decode_transfer() {
        let ix = transfer_ix(TransferDecoder::encode(1_500_000_000));
        let transfer = TransferDecoder::decode(&ix).unwrap();
        assert_eq!(transfer.from, "Alice");
        assert_eq!(transfer.to, "Bob");
        assert_eq!(transfer.lamports, 1_500_000_000);
        assert!((transfer.sol() - 1.5).abs() < 1e-12);
    }

    #[test]
    fn test_short_payload_returns_none() {
        let ix = transfer_ix(vec![2, 0, 0]);
        assert!(TransferDecoder::decode(&ix).is_none());

        let ix = transfer_ix(vec![2, 0, 0, 0, 1, 2]);
        assert!(TransferDecoder::decode(&ix).is_none());
    }

    #[test]
    fn test_other_tag_or_program_ignored() {
        let mut data = TransferDecoder::encode(10);
        data[0] = 0; // CreateAccount
        assert!(TransferDecoder::decode(&transfer_ix(data)).is_none());

        let ix = InstructionView::new("Other", vec![], TransferDecoder::encode(10));
        assert!(TransferDecoder::decode(&ix).is_none());
    }

    #[test]
    fn test_missing_destination_returns_none() {
        let ix = InstructionView::new(
            SYSTEM_PROGRAM,
            vec![AccountRef::new("Alice", true, true)],
            TransferDecoder::encode(10),
        );
        assert!(TransferDecoder::decode(&ix).is_none());
    }
}
