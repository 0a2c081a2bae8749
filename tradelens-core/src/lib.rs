//! TradeLens Core — domain records and deterministic randomness.
//!
//! This crate holds the plain value types the analytics engine consumes:
//! - Fills, positions and equity points as delivered by the indexer
//! - The `TradeLike` trait that lets fills and positions share trade statistics
//! - Lenient numeric decoding (numbers or numeric strings, missing = zero)
//! - A seed hierarchy for reproducible Monte Carlo draws

pub mod decode;
pub mod domain;
pub mod rng;
