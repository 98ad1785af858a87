use thiserror::Error;

/// Consensus failures that reject a whole block during connect.
///
/// The display strings are the stable reason codes the outer validator
/// reports upstream; they're interface, not prose, so don't reword them.
#[derive(Debug, Clone, Eq, PartialEq, Error)]
pub enum ConsensusError {
    /// More than one execute marker in a single transaction.
    #[error("multi-execute")]
    MultiExecute,

    /// An execute marker declaring an empty withdrawal list.
    #[error("zero-withdrawals")]
    ZeroWithdrawals,

    /// The declared withdrawal range runs past the transaction's outputs.
    #[error("withdrawals-oob")]
    WithdrawalsOob,

    /// Execute for a bundle that never reached approval.
    #[error("execute-unapproved")]
    ExecuteUnapproved,

    /// Execute for a bundle that was already paid out.
    #[error("already-executed")]
    AlreadyExecuted,

    /// A withdrawal output is itself a marker.
    #[error("withdrawal-is-drivechain")]
    WithdrawalIsDrivechain,

    /// A withdrawal output's script doesn't fit the hash image's length byte.
    #[error("withdrawal-script-too-big")]
    WithdrawalScriptTooBig,

    /// A marker appears in the outputs after the withdrawal range.
    #[error("post-withdrawal-is-drivechain")]
    PostWithdrawalIsDrivechain,

    /// The recomputed bundle hash doesn't match the marker's payload.
    #[error("bundlehash-mismatch")]
    BundlehashMismatch,

    /// The withdrawals total more than the sidechain has in escrow.
    #[error("escrow-insufficient")]
    EscrowInsufficient,
}
