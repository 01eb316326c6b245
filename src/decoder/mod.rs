//! Temporal code decoding
//!
//! - Cyclic 8-bit code arithmetic (rotation, bit shifting)
//! - Catalog of registered codes
//! - Per-candidate lock/search state machine

/// Registered code catalog
pub mod catalog;
/// Cyclic code arithmetic
pub mod code;
/// Lock acquisition and continuation
pub mod temporal;

pub use catalog::CodeCatalog;
pub use code::{push_bit, rotate};
pub use temporal::{DecodeOutcome, DecodeState, TemporalDecoder};
