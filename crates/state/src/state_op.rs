//! Low-level operations we can make to write to the escrow state.
//!
//! Block transitions never touch a committed [`EscrowState`] directly; they
//! run against a [`StateCache`] scratch copy so a block that fails half-way
//! through its consensus checks leaves nothing behind.

use crate::{escrow_state::EscrowState, sidechain::Sidechain};

/// Cache that writes to a scratch copy of the state, keeping the original
/// around in case we need to reference it.  Finalizing yields the new state;
/// dropping the cache discards every write.
#[derive(Clone, Debug)]
pub struct StateCache {
    /// Original state that we started from.
    original_state: EscrowState,

    /// New state that we're modifying.
    new_state: EscrowState,
}

impl StateCache {
    pub fn new(state: EscrowState) -> Self {
        Self {
            original_state: state.clone(),
            new_state: state,
        }
    }

    // Basic accessors.

    pub fn state(&self) -> &EscrowState {
        &self.new_state
    }

    fn state_mut(&mut self) -> &mut EscrowState {
        &mut self.new_state
    }

    pub fn original_state(&self) -> &EscrowState {
        &self.original_state
    }

    /// Whether nothing has been written yet.
    pub fn is_unchanged(&self) -> bool {
        self.original_state == self.new_state
    }

    /// Consumes the cache, returning the state with all writes applied.
    pub fn finalize(self) -> EscrowState {
        self.new_state
    }

    // Primitive manipulation functions.  Consensus policy stays with the
    // transition logic; these just hand out the records it works on.

    /// Gets a sidechain in the scratch state, creating it as first
    /// referenced at `height` if the id is new.
    pub fn get_or_create_sidechain(&mut self, id: u8, height: u64) -> &mut Sidechain {
        self.state_mut().get_or_create_sidechain(id, height)
    }

    /// Gets a mut ref to a sidechain in the scratch state, if it exists.
    pub fn get_sidechain_mut(&mut self, id: u8) -> Option<&mut Sidechain> {
        self.state_mut().get_sidechain_mut(id)
    }
}

#[cfg(test)]
mod tests {
    use crate::escrow_state::EscrowState;

    use super::StateCache;

    #[test]
    fn test_cache_isolates_writes() {
        let mut committed = EscrowState::new_empty();
        committed.get_or_create_sidechain(1, 100).add_escrow(1000);

        let mut cache = StateCache::new(committed.clone());
        assert!(cache.is_unchanged());

        cache.get_or_create_sidechain(1, 100).sub_escrow(400);
        cache.get_or_create_sidechain(2, 105);
        assert!(!cache.is_unchanged());

        // The committed copy and the cache's original are untouched.
        assert_eq!(committed.get_sidechain(1).unwrap().escrow_balance(), 1000);
        assert!(committed.get_sidechain(2).is_none());
        assert_eq!(cache.original_state(), &committed);

        let new_state = cache.finalize();
        assert_eq!(new_state.get_sidechain(1).unwrap().escrow_balance(), 600);
        assert!(new_state.get_sidechain(2).is_some());
    }
}
