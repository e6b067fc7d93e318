//! Models Module - Data Structures & Configuration
//!
//! Single source of truth for every type that crosses a module boundary.

pub mod config;
pub mod errors;
pub mod types;

pub use config::*;
pub use errors::*;
pub use types::*;
