use bitcoin::Script;

use crate::utils::{next_bytes, next_op, next_u32_le};

use super::{
    MarkerInfo, MarkerOp, BUNDLE_COMMIT_TAG, DEPOSIT_TAG, EXECUTE_TAG, OP_DRIVECHAIN, VOTE_YES_TAG,
};

/// Tries to decode an output script as a drivechain marker.
///
/// Expected layout, as data pushes after the opcode:
/// `OP_DRIVECHAIN <sidechain_id: 1> <payload: 32> <tag: 1> [<n_withdrawals: 4 LE>]`
/// where the tail push exists exactly for the execute tag.
///
/// Returns `None` for anything that isn't a bit-exact marker: wrong opcode,
/// wrong push sizes, unknown tag, missing execute tail, zero withdrawals, or
/// trailing bytes.  Non-marker outputs are the common case, so absence is
/// silent.
pub fn parse_marker_script(script: &Script) -> Option<MarkerInfo> {
    let mut insns = script.instructions();

    if next_op(&mut insns)? != OP_DRIVECHAIN {
        return None;
    }

    let id_push = next_bytes(&mut insns)?;
    if id_push.len() != 1 {
        return None;
    }
    let sidechain_id = id_push[0];

    let payload: [u8; 32] = next_bytes(&mut insns)?.try_into().ok()?;

    let tag_push = next_bytes(&mut insns)?;
    if tag_push.len() != 1 {
        return None;
    }

    let op = match tag_push[0] {
        DEPOSIT_TAG => MarkerOp::Deposit,
        BUNDLE_COMMIT_TAG => MarkerOp::BundleCommit,
        VOTE_YES_TAG => MarkerOp::VoteYes,
        EXECUTE_TAG => {
            let n_withdrawals = next_u32_le(&mut insns)?;
            if n_withdrawals == 0 {
                return None;
            }
            MarkerOp::Execute { n_withdrawals }
        }
        _ => return None,
    };

    // Anything after the last required push, including a malformed
    // instruction, disqualifies the script.
    if insns.next().is_some() {
        return None;
    }

    Some(MarkerInfo {
        sidechain_id,
        payload: payload.into(),
        op,
    })
}
