//! Scanning transactions for marker outputs.

use bitcoin::{Script, Transaction};

use crate::marker::{parse_marker_script, MarkerInfo};

/// Whether an output script decodes as a drivechain marker.
pub fn is_marker_script(script: &Script) -> bool {
    parse_marker_script(script).is_some()
}

/// Scans a transaction's outputs for markers, yielding `(vout, info)` pairs
/// in output order.
pub fn scan_tx_markers(tx: &Transaction) -> impl Iterator<Item = (usize, MarkerInfo)> + '_ {
    tx.output
        .iter()
        .enumerate()
        .filter_map(|(vout, txo)| parse_marker_script(&txo.script_pubkey).map(|info| (vout, info)))
}
