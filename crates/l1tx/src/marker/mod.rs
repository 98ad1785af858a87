//! Decoded marker types and the wire-level constants they encode with.

mod builder;
mod parser;

pub use builder::{
    build_bundle_commit_script, build_deposit_script, build_execute_script, build_marker_script,
    build_vote_yes_script,
};
pub use parser::parse_marker_script;

use arbitrary::{Arbitrary, Unstructured};
use bitcoin::{opcodes::all::OP_NOP5, Opcode};
use drivechain_primitives::buf::Buf32;

/// Opcode reserved for drivechain markers.  This is `OP_NOP5` (0xb4)
/// repurposed, the value the deployment uses on the wire.
pub const OP_DRIVECHAIN: Opcode = OP_NOP5;

/// Tag byte for a deposit marker.
pub const DEPOSIT_TAG: u8 = 0x00;

/// Tag byte for a bundle-commit marker.
pub const BUNDLE_COMMIT_TAG: u8 = 0x01;

/// Tag byte for a yes-vote marker.
pub const VOTE_YES_TAG: u8 = 0x02;

/// Tag byte for an execute marker.
pub const EXECUTE_TAG: u8 = 0x03;

/// Decoded form of a marker output script.
#[derive(Clone, Debug, Eq, PartialEq, Arbitrary)]
pub struct MarkerInfo {
    /// Escrow pool the marker addresses.
    pub sidechain_id: u8,

    /// 32-byte payload.  A bundle hash for everything except deposits, which
    /// carry whatever the depositor put there.
    pub payload: Buf32,

    /// What the marker does.
    pub op: MarkerOp,
}

/// The operations a marker can encode.  Only `Execute` carries a tail push.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum MarkerOp {
    /// Locks the output's value into the sidechain's escrow pool.
    Deposit,

    /// Announces a candidate withdrawal bundle by its hash.
    BundleCommit,

    /// Coinbase-carried approval vote for a bundle.
    VoteYes,

    /// Authorizes paying out an approved bundle.  The withdrawal outputs
    /// follow the marker directly in the same transaction.
    Execute {
        /// Number of withdrawal outputs after the marker.  Never zero; the
        /// parser refuses empty payouts.
        n_withdrawals: u32,
    },
}

impl MarkerOp {
    /// The tag byte this operation encodes to.
    pub fn tag(&self) -> u8 {
        match self {
            MarkerOp::Deposit => DEPOSIT_TAG,
            MarkerOp::BundleCommit => BUNDLE_COMMIT_TAG,
            MarkerOp::VoteYes => VOTE_YES_TAG,
            MarkerOp::Execute { .. } => EXECUTE_TAG,
        }
    }
}

// Hand impl so we only ever generate markers the parser accepts back.
impl<'a> Arbitrary<'a> for MarkerOp {
    fn arbitrary(u: &mut Unstructured<'a>) -> arbitrary::Result<Self> {
        Ok(match u.int_in_range(0u8..=3)? {
            0 => MarkerOp::Deposit,
            1 => MarkerOp::BundleCommit,
            2 => MarkerOp::VoteYes,
            _ => MarkerOp::Execute {
                n_withdrawals: u.int_in_range(1..=u32::MAX)?,
            },
        })
    }
}
