//! # reedmuller
//!
//! A binary Reed-Muller codec. Plain words of `r + 1` bits are encoded
//! onto codewords of `2^r` bits, deliberately corrupted to simulate a
//! noisy channel, and recovered by nearest-codeword search before being
//! decoded back to the original word.
//!
//! ## Features
//!
//! - GF(2) scalar and fixed-length word arithmetic with conversions to
//!   and from arbitrary-precision integers
//! - Generator and Sylvester-Hadamard matrices built once per order and
//!   shared process-wide
//! - Closed-form decoding of exact codewords
//! - Semi-exhaustive and Hadamard-transform nearest-codeword searches,
//!   with an opt-in parallel exhaustive path
//! - Plain PGM images treated as grids of words, one codec operation per
//!   pixel
//!
//! ## Modules
//!
//! - `config`: Configuration settings for the codec tools
//! - `error`: Error types used throughout the crate
//! - `gf2`: GF(2) scalar arithmetic and bit vectors
//! - `code`: The codec engine and the nearest-codeword searches
//! - `pgm`: Plain PGM images and the per-pixel codec operations

#![warn(missing_docs, missing_debug_implementations, rust_2018_idioms)]

// Re-export error types
pub use crate::error::{Error, Result};

// Modules
pub mod code;
pub mod config;
pub mod error;
pub mod gf2;
pub mod pgm;

pub mod prelude {
    //! Prelude module that re-exports commonly used types and functions.

    pub use crate::code::{
        create_strategy, ExhaustiveSearch, ReedMuller, SearchStrategy, StrategyKind,
        TransformSearch, MAX_ORDER,
    };
    pub use crate::config::Config;
    pub use crate::error::{Error, Result};
    pub use crate::gf2::{natural_width, Bit, Word};
    pub use crate::pgm::Pgm;
}
