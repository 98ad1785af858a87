//! Block-level escrow state transition.
//!
//! Connect scans every output of every transaction for markers and plays
//! their effects into the state; disconnect reverses the same effects so a
//! reorg lands back on the exact pre-connect state.  Both directions run on
//! a [`StateCache`] scratch copy, which is what makes a failing block
//! all-or-nothing.

use bitcoin::{Block, Transaction};
use tracing::*;

use drivechain_l1tx::{
    bundle::compute_bundle_hash,
    filter::is_marker_script,
    marker::{parse_marker_script, MarkerInfo, MarkerOp},
};
use drivechain_primitives::params::DrivechainParams;
use drivechain_state::{escrow_state::EscrowState, state_op::StateCache};

use crate::errors::ConsensusError;

/// Connects a block at `height`, applying every marker effect it carries.
///
/// On a consensus error the committed state is left exactly as it was and
/// the caller must reject the block; it must not retry.
pub fn connect_block(
    state: &mut EscrowState,
    block: &Block,
    height: u64,
    params: &DrivechainParams,
) -> Result<(), ConsensusError> {
    let mut cache = StateCache::new(state.clone());

    if let Err(e) = process_block(&mut cache, block, height, params) {
        warn!(%height, err = %e, "block failed escrow consensus");
        return Err(e);
    }

    *state = cache.finalize();
    Ok(())
}

/// Disconnects a previously connected block, restoring the state from just
/// before its connect.  Blocks must come back in reverse connect order.
///
/// This is a tolerant inverse: markers referencing sidechains or bundles we
/// don't know are skipped silently, and nothing is ever created.
pub fn disconnect_block(
    state: &mut EscrowState,
    block: &Block,
    height: u64,
    params: &DrivechainParams,
) {
    let mut cache = StateCache::new(state.clone());
    revert_block(&mut cache, block, height, params);
    *state = cache.finalize();
}

/// Plays a block's marker effects into a state cache.  Split out from
/// [`connect_block`] for callers that batch several blocks into one cache.
pub fn process_block(
    cache: &mut StateCache,
    block: &Block,
    height: u64,
    params: &DrivechainParams,
) -> Result<(), ConsensusError> {
    // Markers aren't interpreted until the deployment is live.
    if height < params.activation_height {
        return Ok(());
    }

    for (tx_index, tx) in block.txdata.iter().enumerate() {
        process_tx(cache, tx, tx_index == 0, height, params)?;
    }

    Ok(())
}

/// Reverses a block's marker effects in a state cache.
pub fn revert_block(cache: &mut StateCache, block: &Block, height: u64, params: &DrivechainParams) {
    if height < params.activation_height {
        return;
    }

    for (tx_index, tx) in block.txdata.iter().enumerate() {
        revert_tx(cache, tx, tx_index == 0, height, params);
    }
}

/// Applies one transaction's markers.  Deposits, commits and votes take
/// effect during the output sweep; an execute is only remembered and has its
/// rule battery run after the sweep, once the whole output layout is known.
fn process_tx(
    cache: &mut StateCache,
    tx: &Transaction,
    is_coinbase: bool,
    height: u64,
    params: &DrivechainParams,
) -> Result<(), ConsensusError> {
    let mut execute: Option<(usize, MarkerInfo, u32)> = None;

    for (vout, txo) in tx.output.iter().enumerate() {
        let Some(info) = parse_marker_script(&txo.script_pubkey) else {
            continue;
        };

        match info.op {
            MarkerOp::Deposit => {
                let value = txo.value.to_sat() as i64;
                let sc = cache.get_or_create_sidechain(info.sidechain_id, height);
                sc.add_escrow(value);
                trace!(%height, sidechain = info.sidechain_id, %value, "escrow deposit");
            }

            MarkerOp::BundleCommit => {
                let sc = cache.get_or_create_sidechain(info.sidechain_id, height);
                sc.get_or_create_bundle(info.payload, height);
            }

            MarkerOp::VoteYes => {
                // Votes only ride in the coinbase; anywhere else the marker
                // is inert, not invalid.
                if !is_coinbase {
                    continue;
                }

                let sc = cache.get_or_create_sidechain(info.sidechain_id, height);
                // A vote for an unseen hash creates the bundle here, which
                // also makes the vote itself in-window.
                let bundle = sc.get_or_create_bundle(info.payload, height);

                if in_vote_window(height, bundle.first_seen_height(), params) {
                    bundle.add_vote();
                    if !bundle.approved() && bundle.yes_votes() >= params.vote_threshold {
                        bundle.set_approved(true);
                        debug!(%height, bundle = %bundle.hash(), "bundle approved");
                    }
                }
            }

            MarkerOp::Execute { n_withdrawals } => {
                if execute.is_some() {
                    return Err(ConsensusError::MultiExecute);
                }
                // The parser refuses empty payouts already; restated here so
                // the rule lives where consensus can see it.
                if n_withdrawals == 0 {
                    return Err(ConsensusError::ZeroWithdrawals);
                }
                execute = Some((vout, info, n_withdrawals));
            }
        }
    }

    if let Some((marker_vout, info, n_withdrawals)) = execute {
        apply_execute(cache, tx, marker_vout, &info, n_withdrawals, height, params)?;
    }

    Ok(())
}

/// Runs the execute rule battery and, if every rule passes, pays the bundle
/// out of escrow.  The marker output's own value never touches accounting.
fn apply_execute(
    cache: &mut StateCache,
    tx: &Transaction,
    marker_vout: usize,
    info: &MarkerInfo,
    n_withdrawals: u32,
    height: u64,
    params: &DrivechainParams,
) -> Result<(), ConsensusError> {
    let n = n_withdrawals as usize;

    // Withdrawals occupy outputs [marker_vout + 1, marker_vout + n].
    if marker_vout + 1 + n > tx.output.len() {
        return Err(ConsensusError::WithdrawalsOob);
    }

    {
        let sc = cache.get_or_create_sidechain(info.sidechain_id, height);
        let bundle = sc.get_or_create_bundle(info.payload, height);

        if !bundle.approved() {
            return Err(ConsensusError::ExecuteUnapproved);
        }
        if bundle.executed() {
            return Err(ConsensusError::AlreadyExecuted);
        }
    }

    let mut withdraw_sum: i64 = 0;
    for w in &tx.output[marker_vout + 1..=marker_vout + n] {
        if is_marker_script(&w.script_pubkey) {
            return Err(ConsensusError::WithdrawalIsDrivechain);
        }
        if w.script_pubkey.len() > params.max_withdrawal_script_len {
            return Err(ConsensusError::WithdrawalScriptTooBig);
        }
        withdraw_sum += w.value.to_sat() as i64;
    }

    // Plain change outputs may follow the withdrawals, further markers
    // may not.
    for w in &tx.output[marker_vout + n + 1..] {
        if is_marker_script(&w.script_pubkey) {
            return Err(ConsensusError::PostWithdrawalIsDrivechain);
        }
    }

    let computed = compute_bundle_hash(tx, marker_vout, n_withdrawals);
    if computed != info.payload {
        return Err(ConsensusError::BundlehashMismatch);
    }

    let sc = cache.get_or_create_sidechain(info.sidechain_id, height);
    if sc.escrow_balance() < withdraw_sum {
        return Err(ConsensusError::EscrowInsufficient);
    }

    sc.sub_escrow(withdraw_sum);
    sc.get_or_create_bundle(info.payload, height).set_executed(true);

    debug!(
        %height,
        sidechain = info.sidechain_id,
        bundle = %info.payload,
        %withdraw_sum,
        "bundle executed"
    );

    Ok(())
}

/// Reverses one transaction's markers.  Mirror image of [`process_tx`]: the
/// sweep undoes deposits, commits and votes, then a remembered execute has
/// its payout restored.
fn revert_tx(
    cache: &mut StateCache,
    tx: &Transaction,
    is_coinbase: bool,
    height: u64,
    params: &DrivechainParams,
) {
    let mut execute: Option<(usize, MarkerInfo, u32)> = None;

    for (vout, txo) in tx.output.iter().enumerate() {
        let Some(info) = parse_marker_script(&txo.script_pubkey) else {
            continue;
        };

        match info.op {
            MarkerOp::Deposit => {
                if let Some(sc) = cache.get_sidechain_mut(info.sidechain_id) {
                    sc.sub_escrow(txo.value.to_sat() as i64);
                }
            }

            MarkerOp::BundleCommit => {
                if let Some(sc) = cache.get_sidechain_mut(info.sidechain_id) {
                    if sc
                        .get_bundle(&info.payload)
                        .is_some_and(|b| b.first_seen_height() == height)
                    {
                        sc.remove_bundle(&info.payload);
                    }
                }
            }

            MarkerOp::VoteYes => {
                if !is_coinbase {
                    continue;
                }

                if let Some(sc) = cache.get_sidechain_mut(info.sidechain_id) {
                    let mut drop_record = false;

                    if let Some(bundle) = sc.get_bundle_mut(&info.payload) {
                        // Same window predicate the connect path used at this
                        // height, so counted votes come back off and ignored
                        // ones stay ignored.
                        if in_vote_window(height, bundle.first_seen_height(), params) {
                            bundle.remove_vote();
                            if bundle.approved() && bundle.yes_votes() < params.vote_threshold {
                                bundle.set_approved(false);
                            }
                        }

                        // A vote introduced this record if it's first seen
                        // here; once its votes are gone, drop the record so
                        // the pre-connect bundle map comes back exactly.
                        drop_record =
                            bundle.first_seen_height() == height && bundle.yes_votes() == 0;
                    }

                    if drop_record {
                        sc.remove_bundle(&info.payload);
                    }
                }
            }

            MarkerOp::Execute { n_withdrawals } => {
                execute = Some((vout, info, n_withdrawals));
            }
        }
    }

    if let Some((marker_vout, info, n_withdrawals)) = execute {
        if let Some(sc) = cache.get_sidechain_mut(info.sidechain_id) {
            let withdraw_sum: i64 = tx
                .output
                .iter()
                .skip(marker_vout + 1)
                .take(n_withdrawals as usize)
                .map(|w| w.value.to_sat() as i64)
                .sum();

            sc.add_escrow(withdraw_sum);
            if let Some(bundle) = sc.get_bundle_mut(&info.payload) {
                bundle.set_executed(false);
            }
        }
    }
}

/// Whether a vote landing at `height` still counts for a bundle first seen
/// at `first_seen_height`.  The window is inclusive.  Connect and disconnect
/// both route through here so the two directions can't disagree.
fn in_vote_window(height: u64, first_seen_height: u64, params: &DrivechainParams) -> bool {
    height
        .checked_sub(first_seen_height)
        .is_some_and(|age| age <= params.vote_window)
}
