//! Utils Module - Shared Helpers
//!
//! Constants, instruction decoding, address lists and telemetry.

pub mod address_list;
pub mod constants;
pub mod decoder;
pub mod telemetry;

pub use address_list::*;
pub use constants::*;
pub use decoder::*;
pub use telemetry::*;
