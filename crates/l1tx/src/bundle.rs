//! Canonical hashing of a withdrawal bundle laid out in a transaction.

use bitcoin::Transaction;
use drivechain_primitives::{buf::Buf32, hash};

/// Computes the canonical bundle hash over the `n_withdrawals` outputs that
/// follow the execute marker at `marker_vout`.
///
/// The preimage is, for each withdrawal output in order, the output value as
/// 8 little-endian bytes, one script length byte, then the raw script bytes,
/// all concatenated and double-SHA-256d.  The caller must already have
/// checked that the outputs exist and that every script fits the length byte;
/// this panics on a transaction that was not validated that way.
pub fn compute_bundle_hash(tx: &Transaction, marker_vout: usize, n_withdrawals: u32) -> Buf32 {
    let mut buf = Vec::with_capacity(n_withdrawals as usize * 64);

    for k in 0..n_withdrawals as usize {
        let w = &tx.output[marker_vout + 1 + k];

        buf.extend_from_slice(&w.value.to_sat().to_le_bytes());

        let spk = w.script_pubkey.as_bytes();
        debug_assert!(spk.len() <= u8::MAX as usize);
        buf.push(spk.len() as u8);
        buf.extend_from_slice(spk);
    }

    hash::sha256d(&buf)
}

#[cfg(test)]
mod tests {
    use bitcoin::{Amount, ScriptBuf, TxOut};
    use drivechain_primitives::hash;
    use drivechain_test_utils::bitcoin::create_test_tx;

    use super::compute_bundle_hash;

    #[test]
    fn test_bundle_hash_image() {
        let script_a = ScriptBuf::from_bytes(vec![0x51, 0x52, 0x53]);
        let script_b = ScriptBuf::from_bytes(vec![0x00; 20]);

        let tx = create_test_tx(vec![
            TxOut {
                value: Amount::from_sat(0),
                script_pubkey: ScriptBuf::new(),
            },
            TxOut {
                value: Amount::from_sat(6000),
                script_pubkey: script_a.clone(),
            },
            TxOut {
                value: Amount::from_sat(3000),
                script_pubkey: script_b.clone(),
            },
        ]);

        let mut image = Vec::new();
        image.extend_from_slice(&6000u64.to_le_bytes());
        image.push(script_a.len() as u8);
        image.extend_from_slice(script_a.as_bytes());
        image.extend_from_slice(&3000u64.to_le_bytes());
        image.push(script_b.len() as u8);
        image.extend_from_slice(script_b.as_bytes());

        assert_eq!(compute_bundle_hash(&tx, 0, 2), hash::sha256d(&image));
    }

    #[test]
    fn test_bundle_hash_offset_and_count() {
        // Same outputs reachable through different (marker, count) views hash
        // differently unless the views coincide.
        let outs: Vec<TxOut> = (0..4)
            .map(|i| TxOut {
                value: Amount::from_sat(1000 * (i + 1)),
                script_pubkey: ScriptBuf::from_bytes(vec![i as u8; 4]),
            })
            .collect();
        let tx = create_test_tx(outs);

        let h_full = compute_bundle_hash(&tx, 0, 3);
        let h_short = compute_bundle_hash(&tx, 0, 2);
        let h_shifted = compute_bundle_hash(&tx, 1, 2);

        assert_ne!(h_full, h_short);
        assert_ne!(h_full, h_shifted);
        assert_ne!(h_short, h_shifted);
    }
}
