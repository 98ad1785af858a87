//! Consensus-level escrow state: per-sidechain pools, candidate withdrawal
//! bundles, and the scratch cache block transitions run against.

pub mod escrow_state;
pub mod sidechain;
pub mod state_op;
