//! Parsing and construction of drivechain marker outputs.
//!
//! A marker is a transaction output whose script starts with
//! [`OP_DRIVECHAIN`](marker::OP_DRIVECHAIN) and carries the sidechain id, a
//! 32-byte payload and a kind tag as data pushes.  Everything consensus ever
//! learns from a transaction comes through here.

pub mod bundle;
pub mod filter;
pub mod marker;
pub mod utils;
