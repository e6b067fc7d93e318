//! Providers Module - Chain-State Sources
//!
//! The lookup capability consumed by feature extraction, plus the
//! Solana JSON-RPC implementation that prefetches it.

pub mod chain_state;
pub mod solana;

pub use chain_state::*;
pub use solana::*;
