use bitcoin::{blockdata::script, ScriptBuf};
use drivechain_primitives::buf::Buf32;

use super::{MarkerInfo, MarkerOp, OP_DRIVECHAIN};

/// Builds the canonical script for a marker.  Inverse of
/// [`parse_marker_script`](super::parse_marker_script) for every valid
/// [`MarkerInfo`].
pub fn build_marker_script(info: &MarkerInfo) -> ScriptBuf {
    let mut builder = script::Builder::new()
        .push_opcode(OP_DRIVECHAIN)
        .push_slice([info.sidechain_id])
        .push_slice(info.payload.0)
        .push_slice([info.op.tag()]);

    if let MarkerOp::Execute { n_withdrawals } = info.op {
        builder = builder.push_slice(n_withdrawals.to_le_bytes());
    }

    builder.into_script()
}

/// Script locking an output's value into a sidechain's escrow pool.
pub fn build_deposit_script(sidechain_id: u8, payload: Buf32) -> ScriptBuf {
    build_marker_script(&MarkerInfo {
        sidechain_id,
        payload,
        op: MarkerOp::Deposit,
    })
}

/// Script announcing a candidate withdrawal bundle.
pub fn build_bundle_commit_script(sidechain_id: u8, bundle_hash: Buf32) -> ScriptBuf {
    build_marker_script(&MarkerInfo {
        sidechain_id,
        payload: bundle_hash,
        op: MarkerOp::BundleCommit,
    })
}

/// Script carrying a coinbase yes-vote for a bundle.
pub fn build_vote_yes_script(sidechain_id: u8, bundle_hash: Buf32) -> ScriptBuf {
    build_marker_script(&MarkerInfo {
        sidechain_id,
        payload: bundle_hash,
        op: MarkerOp::VoteYes,
    })
}

/// Script authorizing payout of an approved bundle across the
/// `n_withdrawals` outputs that follow the marker.
pub fn build_execute_script(sidechain_id: u8, bundle_hash: Buf32, n_withdrawals: u32) -> ScriptBuf {
    build_marker_script(&MarkerInfo {
        sidechain_id,
        payload: bundle_hash,
        op: MarkerOp::Execute { n_withdrawals },
    })
}

#[cfg(test)]
mod tests {
    use drivechain_primitives::buf::Buf32;

    use super::{build_deposit_script, build_execute_script};

    #[test]
    fn test_deposit_script_bytes() {
        let script = build_deposit_script(1, Buf32::zero());

        let mut expected = vec![0xb4, 0x01, 0x01, 0x20];
        expected.extend_from_slice(&[0u8; 32]);
        expected.extend_from_slice(&[0x01, 0x00]);

        assert_eq!(script.as_bytes(), &expected[..]);
    }

    #[test]
    fn test_execute_script_bytes() {
        let script = build_execute_script(9, Buf32::from([0x11; 32]), 2);

        let mut expected = vec![0xb4, 0x01, 0x09, 0x20];
        expected.extend_from_slice(&[0x11; 32]);
        expected.extend_from_slice(&[0x01, 0x03]);
        expected.extend_from_slice(&[0x04, 0x02, 0x00, 0x00, 0x00]);

        assert_eq!(script.as_bytes(), &expected[..]);
    }
}
