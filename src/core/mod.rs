//! Core Module - Scoring Pipeline
//!
//! Feature extraction, inference, rule aggregation and recommendations.

pub mod detector;
pub mod features;
pub mod inference;
pub mod recommendation;

pub use detector::*;
pub use features::*;
pub use inference::*;
pub use recommendation::*;
