//! Toplevel escrow state, the thing block transitions mutate.

use std::collections::BTreeMap;

use arbitrary::Arbitrary;
use borsh::{BorshDeserialize, BorshSerialize};

use crate::sidechain::Sidechain;

/// All sidechain escrow pools, keyed by id.
///
/// Reads may happen at any time, but writes only ever come from block
/// connect/disconnect, which the outer validation driver serializes.
#[derive(Clone, Debug, Default, Eq, PartialEq, Arbitrary, BorshDeserialize, BorshSerialize)]
pub struct EscrowState {
    /// Pools by sidechain id.
    ///
    /// Iterates in id order.
    sidechains: BTreeMap<u8, Sidechain>,
}

impl EscrowState {
    pub fn new_empty() -> Self {
        Self {
            sidechains: BTreeMap::new(),
        }
    }

    /// Gets a sidechain by id.
    pub fn get_sidechain(&self, id: u8) -> Option<&Sidechain> {
        self.sidechains.get(&id)
    }

    /// Gets a mut ref to a sidechain by id.
    pub fn get_sidechain_mut(&mut self, id: u8) -> Option<&mut Sidechain> {
        self.sidechains.get_mut(&id)
    }

    /// Gets a sidechain, creating it as first referenced at `height` if the
    /// id is new.
    pub fn get_or_create_sidechain(&mut self, id: u8, height: u64) -> &mut Sidechain {
        self.sidechains
            .entry(id)
            .or_insert_with(|| Sidechain::new(id, height))
    }

    /// Sidechains in id order.
    pub fn sidechains(&self) -> impl Iterator<Item = &Sidechain> {
        self.sidechains.values()
    }

    pub fn num_sidechains(&self) -> usize {
        self.sidechains.len()
    }
}
