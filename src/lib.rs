//! Chain Guard Library
//!
//! Pre-signing risk scoring for Solana-style transactions:
//! - Feed-forward inference over extracted transaction features
//! - Blacklist, amount, recipient, complexity and honeypot rule overlays
//! - Ordered user-facing recommendations
//!
//! Structure:
//! - `core`: scoring pipeline (features, inference, detector, recommendations)
//! - `models`: data types, configuration, errors
//! - `providers`: chain-state lookups (prefetched snapshot, Solana RPC)
//! - `utils`: constants, decoding, address lists, telemetry

pub mod core;
pub mod models;
pub mod providers;
pub mod utils;

pub use crate::core::{
    recommend, FeatureExtractor, InferenceEngine, Layer, NetworkWeights, ThreatDetector,
};
pub use models::{
    AccountRef, AppError, AppResult, ErrorCode, FeatureVector, FillerPolicy, GuardConfig,
    InstructionView, ModelInfo, PredictionResult, RiskLevel, RuleThresholds, ThreatAnalysis,
    ThreatCategory, TransactionFeatures, TransactionView,
};
pub use providers::{ChainSnapshot, ChainStateLookup, NoChainState, SolanaChainState};
pub use utils::{
    AddressListSnapshot, AddressListStore, AnalysisObserver, NoopObserver, TelemetryCollector,
    TelemetryStats, TransferDecoder, TransferParams,
};
