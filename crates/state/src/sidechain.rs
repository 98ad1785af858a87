//! Sidechain escrow pool and withdrawal bundle records.

use std::collections::BTreeMap;

use arbitrary::Arbitrary;
use borsh::{BorshDeserialize, BorshSerialize};
use drivechain_primitives::buf::Buf32;

/// A sidechain's escrow pool and the withdrawal bundles proposed against it.
///
/// Records are created lazily the first time any marker references the id
/// and are never removed.
#[derive(Clone, Debug, Eq, PartialEq, Arbitrary, BorshDeserialize, BorshSerialize)]
pub struct Sidechain {
    /// One-byte identifier, same as the map key.
    id: u8,

    /// Funds locked for this sidechain, in sats.  Never negative.
    escrow_balance: i64,

    /// Height the pool was first referenced at.
    creation_height: u64,

    /// Always true once created; a deactivation path doesn't exist yet.
    is_active: bool,

    /// Candidate withdrawal bundles by hash.
    ///
    /// Iterates in hash order.
    bundles: BTreeMap<Buf32, Bundle>,
}

impl Sidechain {
    /// Fresh pool as first referenced at `creation_height`.
    pub fn new(id: u8, creation_height: u64) -> Self {
        Self {
            id,
            escrow_balance: 0,
            creation_height,
            is_active: true,
            bundles: BTreeMap::new(),
        }
    }

    pub fn id(&self) -> u8 {
        self.id
    }

    pub fn escrow_balance(&self) -> i64 {
        self.escrow_balance
    }

    pub fn creation_height(&self) -> u64 {
        self.creation_height
    }

    pub fn is_active(&self) -> bool {
        self.is_active
    }

    /// Adds deposited funds to the pool.
    pub fn add_escrow(&mut self, amt: i64) {
        self.escrow_balance += amt;
    }

    /// Takes funds out of the pool.  The caller enforces solvency; the
    /// balance must never actually go negative.
    pub fn sub_escrow(&mut self, amt: i64) {
        self.escrow_balance -= amt;
        debug_assert!(self.escrow_balance >= 0, "state: escrow balance negative");
    }

    /// Gets a bundle by its hash.
    pub fn get_bundle(&self, hash: &Buf32) -> Option<&Bundle> {
        self.bundles.get(hash)
    }

    /// Gets a mut ref to a bundle by its hash.
    pub fn get_bundle_mut(&mut self, hash: &Buf32) -> Option<&mut Bundle> {
        self.bundles.get_mut(hash)
    }

    /// Gets a bundle, creating it as first seen at `height` if the hash is
    /// new under this sidechain.
    pub fn get_or_create_bundle(&mut self, hash: Buf32, height: u64) -> &mut Bundle {
        self.bundles
            .entry(hash)
            .or_insert_with(|| Bundle::new(hash, height))
    }

    /// Drops a bundle record.  Only disconnect does this, when reverting the
    /// block that introduced the record.
    pub fn remove_bundle(&mut self, hash: &Buf32) {
        self.bundles.remove(hash);
    }

    /// Bundles in hash order.
    pub fn bundles(&self) -> impl Iterator<Item = &Bundle> {
        self.bundles.values()
    }

    pub fn num_bundles(&self) -> usize {
        self.bundles.len()
    }
}

/// A candidate withdrawal bundle, content-addressed by the canonical hash of
/// its ordered withdrawal outputs.
#[derive(Clone, Debug, Eq, PartialEq, Arbitrary, BorshDeserialize, BorshSerialize)]
pub struct Bundle {
    /// Canonical hash committing to the ordered withdrawal outputs.
    hash: Buf32,

    /// Height a commit or coinbase vote first referenced this hash.
    first_seen_height: u64,

    /// Coinbase yes-votes accumulated inside the vote window.
    yes_votes: u32,

    /// Set when `yes_votes` first reaches the threshold.  Disconnect can
    /// take it back.
    approved: bool,

    /// Set by the one execute that paid the bundle out.
    executed: bool,
}

impl Bundle {
    /// Fresh bundle as first seen at `height`.
    pub fn new(hash: Buf32, height: u64) -> Self {
        Self {
            hash,
            first_seen_height: height,
            yes_votes: 0,
            approved: false,
            executed: false,
        }
    }

    pub fn hash(&self) -> Buf32 {
        self.hash
    }

    pub fn first_seen_height(&self) -> u64 {
        self.first_seen_height
    }

    pub fn yes_votes(&self) -> u32 {
        self.yes_votes
    }

    pub fn approved(&self) -> bool {
        self.approved
    }

    pub fn executed(&self) -> bool {
        self.executed
    }

    /// Counts one more yes-vote.
    pub fn add_vote(&mut self) {
        self.yes_votes += 1;
    }

    /// Takes one yes-vote back, never below zero.
    pub fn remove_vote(&mut self) {
        self.yes_votes = self.yes_votes.saturating_sub(1);
    }

    pub fn set_approved(&mut self, approved: bool) {
        self.approved = approved;
    }

    pub fn set_executed(&mut self, executed: bool) {
        self.executed = executed;
    }
}

#[cfg(test)]
mod tests {
    use drivechain_primitives::buf::Buf32;

    use super::Sidechain;

    #[test]
    fn test_get_or_create_bundle_idempotent() {
        let mut sc = Sidechain::new(1, 100);

        let hash = Buf32::from([3; 32]);
        sc.get_or_create_bundle(hash, 100).add_vote();

        // Re-creating at a later height keeps the original first-seen.
        let bundle = sc.get_or_create_bundle(hash, 200);
        assert_eq!(bundle.first_seen_height(), 100);
        assert_eq!(bundle.yes_votes(), 1);
        assert_eq!(sc.num_bundles(), 1);
    }

    #[test]
    fn test_bundles_iterate_in_hash_order() {
        let mut sc = Sidechain::new(1, 100);
        sc.get_or_create_bundle(Buf32::from([9; 32]), 100);
        sc.get_or_create_bundle(Buf32::from([1; 32]), 101);
        sc.get_or_create_bundle(Buf32::from([5; 32]), 102);

        let hashes: Vec<_> = sc.bundles().map(|b| b.hash()).collect();
        let mut sorted = hashes.clone();
        sorted.sort();
        assert_eq!(hashes, sorted);
    }

    #[test]
    fn test_remove_vote_saturates() {
        let mut sc = Sidechain::new(1, 100);
        let bundle = sc.get_or_create_bundle(Buf32::zero(), 100);
        bundle.remove_vote();
        assert_eq!(bundle.yes_votes(), 0);
    }
}
