//! Global consensus parameters for the drivechain deployment.

use serde::Deserialize;

/// Number of blocks after a bundle is first seen during which coinbase votes
/// for it still count, inclusive on both ends.
pub const VOTE_WINDOW: u64 = 1000;

/// Number of yes-votes a bundle needs before it becomes approved.
pub const VOTE_THRESHOLD: u32 = 10;

/// Upper bound on a single withdrawal output's script size, in bytes.  The
/// canonical bundle image length-prefixes each script with one byte, so this
/// can never exceed 255.
pub const MAX_WITHDRAWAL_SCRIPT_LEN: usize = 255;

/// Consensus parameters that don't change for the lifetime of the network
/// (unless there's some weird hard fork).
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
pub struct DrivechainParams {
    /// Block height the deployment activates at.  Markers in earlier blocks
    /// are not interpreted.
    pub activation_height: u64,

    /// Number of blocks after first-seen during which votes count, inclusive.
    pub vote_window: u64,

    /// Number of yes-votes needed for approval.
    pub vote_threshold: u32,

    /// Max withdrawal output script size, in bytes.
    pub max_withdrawal_script_len: usize,
}

impl Default for DrivechainParams {
    fn default() -> Self {
        Self {
            activation_height: 0,
            vote_window: VOTE_WINDOW,
            vote_threshold: VOTE_THRESHOLD,
            max_withdrawal_script_len: MAX_WITHDRAWAL_SCRIPT_LEN,
        }
    }
}
